use crate::flow::challenge::Challenge;
use crate::flow::form::{Answers, Form, Submission};
use crate::flow::navigator::Navigation;
use crate::flow::stages;
use std::collections::HashMap;
use std::sync::Arc;

/// How the executor drives a stage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageKind {
    /// Needs answers from an interactor before it can be submitted
    Interactive,
    /// Submits immediately, without interaction
    Automatic,
    /// Ends the flow; nothing is submitted afterwards
    Terminal,
}

/// Resolution of a terminal stage
#[derive(Debug, Clone, PartialEq)]
pub enum Terminal {
    /// Hand off to the navigator
    Navigate(Navigation),
    /// The policy engine denied access
    Denied { message: Option<String> },
    /// The flow failed server-side
    Failed {
        error: Option<String>,
        request_id: Option<String>,
    },
    /// Nothing is registered for this component
    Unsupported { component: String },
}

/// Handler for one challenge component.
///
/// Stages are headless: `render` produces a [`Form`] value the host presents
/// any way it likes, and `response` builds exactly the fields the stage
/// defines. Neither may mutate the challenge.
pub trait Stage: Send + Sync {
    /// The component tag this stage answers for
    fn component(&self) -> &'static str;

    fn kind(&self, challenge: &Challenge) -> StageKind;

    fn render(&self, challenge: &Challenge) -> Form;

    fn response(&self, challenge: &Challenge, answers: &Answers) -> Submission;

    /// Only meaningful for [`StageKind::Terminal`] stages
    fn terminal(&self, _challenge: &Challenge) -> Option<Terminal> {
        None
    }
}

/// Open-world dispatch table from component tag to stage.
///
/// Unknown tags resolve to a fallback stage instead of failing, so a newer
/// server never breaks the loop. `register` extends or replaces entries at
/// runtime; the executor needs no changes for new stages.
pub struct StageRegistry {
    stages: HashMap<String, Arc<dyn Stage>>,
    fallback: Arc<dyn Stage>,
}

impl StageRegistry {
    /// An empty registry; everything resolves to the fallback
    #[must_use]
    pub fn new() -> Self {
        Self {
            stages: HashMap::new(),
            fallback: Arc::new(stages::unsupported::UnsupportedStage),
        }
    }

    /// Registry with all built-in stages
    #[must_use]
    pub fn defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(stages::identification::IdentificationStage));
        registry.register(Arc::new(stages::password::PasswordStage));
        registry.register(Arc::new(stages::redirect::RedirectStage));
        registry.register(Arc::new(stages::autosubmit::AutosubmitStage));
        registry.register(Arc::new(
            stages::authenticator_validate::AuthenticatorValidateStage,
        ));
        registry.register(Arc::new(stages::prompt::PromptStage));
        registry.register(Arc::new(stages::consent::ConsentStage));
        registry.register(Arc::new(stages::dummy::DummyStage));
        registry.register(Arc::new(stages::access_denied::AccessDeniedStage));
        registry.register(Arc::new(stages::flow_error::FlowErrorStage));
        registry.register(Arc::new(stages::captcha::CaptchaStage));
        registry
    }

    pub fn register(&mut self, stage: Arc<dyn Stage>) {
        self.stages.insert(stage.component().to_string(), stage);
    }

    /// Never fails: unknown components resolve to the fallback stage
    #[must_use]
    pub fn resolve(&self, component: &str) -> Arc<dyn Stage> {
        self.stages
            .get(component)
            .cloned()
            .unwrap_or_else(|| Arc::clone(&self.fallback))
    }

    #[must_use]
    pub fn contains(&self, component: &str) -> bool {
        self.stages.contains_key(component)
    }
}

impl Default for StageRegistry {
    fn default() -> Self {
        Self::defaults()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn challenge(component: &str) -> Challenge {
        serde_json::from_value(json!({"component": component})).unwrap()
    }

    #[test]
    fn test_defaults_resolve_known_components() {
        let registry = StageRegistry::defaults();

        for component in [
            "ak-stage-identification",
            "ak-stage-password",
            "xak-flow-redirect",
            "ak-stage-autosubmit",
            "ak-stage-authenticator-validate",
            "ak-stage-prompt",
            "ak-stage-consent",
            "ak-stage-dummy",
            "ak-stage-access-denied",
            "ak-stage-flow-error",
            "ak-stage-captcha",
        ] {
            assert!(registry.contains(component), "missing {component}");
            assert_eq!(registry.resolve(component).component(), component);
        }
    }

    #[test]
    fn test_unknown_component_resolves_to_fallback() {
        let registry = StageRegistry::defaults();
        assert!(!registry.contains("ak-stage-telepathy"));

        let stage = registry.resolve("ak-stage-telepathy");
        let challenge = challenge("ak-stage-telepathy");

        assert_eq!(stage.kind(&challenge), StageKind::Terminal);
        assert_eq!(
            stage.terminal(&challenge),
            Some(Terminal::Unsupported {
                component: "ak-stage-telepathy".to_string()
            })
        );
    }

    #[test]
    fn test_register_replaces_existing_stage() {
        struct QuietPassword;

        impl Stage for QuietPassword {
            fn component(&self) -> &'static str {
                "ak-stage-password"
            }

            fn kind(&self, _: &Challenge) -> StageKind {
                StageKind::Automatic
            }

            fn render(&self, challenge: &Challenge) -> Form {
                Form::new(challenge.component.clone())
            }

            fn response(&self, _: &Challenge, _: &Answers) -> Submission {
                Submission::new()
            }
        }

        let mut registry = StageRegistry::defaults();
        registry.register(Arc::new(QuietPassword));

        let stage = registry.resolve("ak-stage-password");
        assert_eq!(stage.kind(&challenge("ak-stage-password")), StageKind::Automatic);
    }
}
