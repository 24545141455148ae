/// Terminal hand-off produced by a flow.
///
/// Browsers assign `window.location` for `Visit` and auto-submit a form for
/// `PostForm`; headless hosts decide for themselves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    /// Follow a location
    Visit(String),
    /// POST `fields` to `url`, typically an external SSO hand-off
    PostForm {
        url: String,
        fields: Vec<(String, String)>,
    },
}

impl Navigation {
    /// The URL the flow hands off to
    #[must_use]
    pub fn target(&self) -> &str {
        match self {
            Self::Visit(to) => to,
            Self::PostForm { url, .. } => url,
        }
    }
}

/// Where a finished flow sends the user. Injected into the executor so the
/// library never navigates on its own.
pub trait Navigator: Send {
    fn navigate(&mut self, navigation: Navigation);
}

/// Navigator that remembers every navigation it was asked to perform
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    pub navigations: Vec<Navigation>,
}

impl RecordingNavigator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn last(&self) -> Option<&Navigation> {
        self.navigations.last()
    }

    #[must_use]
    pub fn count(&self) -> usize {
        self.navigations.len()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&mut self, navigation: Navigation) {
        self.navigations.push(navigation);
    }
}
