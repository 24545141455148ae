use crate::flow::challenge::{AccessDeniedChallenge, Challenge};
use crate::flow::form::{Answers, Form, Submission};
use crate::flow::registry::{Stage, StageKind, Terminal};

pub const COMPONENT: &str = "ak-stage-access-denied";

/// Terminal stage: the policy engine rejected the user
#[derive(Debug, Default)]
pub struct AccessDeniedStage;

impl Stage for AccessDeniedStage {
    fn component(&self) -> &'static str {
        COMPONENT
    }

    fn kind(&self, _: &Challenge) -> StageKind {
        StageKind::Terminal
    }

    fn render(&self, challenge: &Challenge) -> Form {
        let payload: AccessDeniedChallenge = challenge.parse().unwrap_or_default();
        let mut form = Form::new(COMPONENT);

        match payload.error_message {
            Some(message) => form.push_info(message),
            None => form.push_info("Access denied."),
        }

        form
    }

    fn response(&self, _: &Challenge, _: &Answers) -> Submission {
        Submission::new()
    }

    fn terminal(&self, challenge: &Challenge) -> Option<Terminal> {
        let payload: AccessDeniedChallenge = challenge.parse().unwrap_or_default();
        Some(Terminal::Denied {
            message: payload.error_message,
        })
    }
}
