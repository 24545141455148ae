use crate::flow::challenge::{Challenge, ConsentChallenge};
use crate::flow::form::{Answers, Form, Submission};
use crate::flow::registry::{Stage, StageKind};
use serde_json::Value;

pub const COMPONENT: &str = "ak-stage-consent";

/// Lists the permissions an application asks for; submitting the stage is
/// the approval. The server token is echoed back untouched.
#[derive(Debug, Default)]
pub struct ConsentStage;

impl Stage for ConsentStage {
    fn component(&self) -> &'static str {
        COMPONENT
    }

    fn kind(&self, _: &Challenge) -> StageKind {
        StageKind::Interactive
    }

    fn render(&self, challenge: &Challenge) -> Form {
        let payload: ConsentChallenge = challenge.parse().unwrap_or_default();
        let mut form = Form::new(COMPONENT);

        if let Some(header) = &payload.header_text {
            form.push_info(header.clone());
        }

        for permission in payload.permissions.iter().chain(&payload.additional_permissions) {
            form.push_info(format!("- {}", permission.name));
        }

        form
    }

    fn response(&self, challenge: &Challenge, _: &Answers) -> Submission {
        let payload: ConsentChallenge = challenge.parse().unwrap_or_default();
        let mut submission = Submission::new();
        submission.insert("token".to_string(), Value::String(payload.token));
        submission
    }
}
