use crate::flow::executor::StageView;
use crate::flow::form::{Answers, FieldKind};
use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// What an interactor decided to do with a rendered stage
#[derive(Debug, Clone)]
pub enum Interaction {
    Submit(Answers),
    Cancel,
}

/// Fills the forms an interactive stage renders. Injected into the executor
/// so the loop stays free of any input mechanism.
#[async_trait]
pub trait Interactor: Send {
    async fn fill(&mut self, view: &StageView) -> Interaction;
}

/// Interactor that answers purely from a prepared map, for automation and
/// tests. Values ride in [`SecretString`] because they are usually
/// credentials.
///
/// Seeing the same component a second time means the scripted answers did
/// not satisfy it; the flow is cancelled instead of looping forever.
#[derive(Debug, Default)]
pub struct ScriptedInteractor {
    answers: HashMap<String, SecretString>,
    seen: HashSet<String>,
}

impl ScriptedInteractor {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn from_answers(answers: impl IntoIterator<Item = (String, SecretString)>) -> Self {
        Self {
            answers: answers.into_iter().collect(),
            seen: HashSet::new(),
        }
    }

    #[must_use]
    pub fn answer(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.answers
            .insert(key.into(), SecretString::from(value.into()));
        self
    }
}

#[async_trait]
impl Interactor for ScriptedInteractor {
    async fn fill(&mut self, view: &StageView) -> Interaction {
        if !self.seen.insert(view.component.clone()) {
            debug!(component = %view.component, "stage repeated, cancelling");
            return Interaction::Cancel;
        }

        let mut answers = Answers::new();

        for field in &view.form.fields {
            if matches!(field.kind, FieldKind::Hidden | FieldKind::Static) {
                continue;
            }

            let Some(value) = self.answers.get(&field.key) else {
                continue;
            };
            let raw = value.expose_secret();

            match field.kind {
                FieldKind::Checkbox => {
                    answers.set(&field.key, matches!(raw, "true" | "yes" | "on" | "1"));
                }
                FieldKind::Number => match raw.parse::<i64>() {
                    Ok(number) => answers.set(&field.key, number),
                    Err(_) => answers.set(&field.key, raw),
                },
                _ => answers.set(&field.key, raw),
            }
        }

        Interaction::Submit(answers)
    }
}
