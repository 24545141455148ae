use crate::flow::challenge::Challenge;
use crate::flow::form::{Answers, Form, Submission};
use crate::flow::registry::{Stage, StageKind};

pub const COMPONENT: &str = "ak-stage-dummy";

/// Test stage used by flow authors: a bare confirmation with no inputs
#[derive(Debug, Default)]
pub struct DummyStage;

impl Stage for DummyStage {
    fn component(&self) -> &'static str {
        COMPONENT
    }

    fn kind(&self, _: &Challenge) -> StageKind {
        StageKind::Interactive
    }

    fn render(&self, challenge: &Challenge) -> Form {
        let mut form = Form::new(COMPONENT);

        match challenge.field("name").and_then(serde_json::Value::as_str) {
            Some(name) => form.push_info(format!("{name}: confirm to continue.")),
            None => form.push_info("Confirm to continue."),
        }

        form
    }

    fn response(&self, _: &Challenge, _: &Answers) -> Submission {
        Submission::new()
    }
}
