use crate::flow::challenge::{AutosubmitChallenge, Challenge};
use crate::flow::form::{Answers, Form, Submission};
use crate::flow::navigator::Navigation;
use crate::flow::registry::{Stage, StageKind, Terminal};

pub const COMPONENT: &str = "ak-stage-autosubmit";

/// Terminal stage used for SAML and similar hand-offs: the server supplies
/// a form body that must be POSTed to an external URL.
#[derive(Debug, Default)]
pub struct AutosubmitStage;

impl Stage for AutosubmitStage {
    fn component(&self) -> &'static str {
        COMPONENT
    }

    fn kind(&self, _: &Challenge) -> StageKind {
        StageKind::Terminal
    }

    fn render(&self, challenge: &Challenge) -> Form {
        let payload: AutosubmitChallenge = challenge.parse().unwrap_or_default();
        let mut form = Form::new(COMPONENT);

        if payload.url.is_empty() {
            form.push_info("Continuing.");
        } else {
            form.push_info(format!("Continuing to {}.", payload.url));
        }

        form
    }

    fn response(&self, _: &Challenge, _: &Answers) -> Submission {
        Submission::new()
    }

    fn terminal(&self, challenge: &Challenge) -> Option<Terminal> {
        let payload: AutosubmitChallenge = challenge.parse().unwrap_or_default();

        if payload.url.is_empty() {
            return Some(Terminal::Failed {
                error: Some("autosubmit challenge without a URL".to_string()),
                request_id: None,
            });
        }

        Some(Terminal::Navigate(Navigation::PostForm {
            url: payload.url,
            fields: payload.attrs.into_iter().collect(),
        }))
    }
}
