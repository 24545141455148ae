use crate::flow::challenge::Challenge;
use crate::flow::form::{Answers, Form, Submission};
use crate::flow::registry::{Stage, StageKind, Terminal};

/// Fallback for components nothing is registered for.
///
/// Renders a message naming the component and ends the flow; dispatching an
/// unknown challenge is never an error.
#[derive(Debug, Default)]
pub struct UnsupportedStage;

impl Stage for UnsupportedStage {
    fn component(&self) -> &'static str {
        "unsupported"
    }

    fn kind(&self, _: &Challenge) -> StageKind {
        StageKind::Terminal
    }

    fn render(&self, challenge: &Challenge) -> Form {
        let mut form = Form::new(challenge.component.clone());
        form.push_info(format!("Unsupported stage: {}", challenge.component));
        form
    }

    fn response(&self, _: &Challenge, _: &Answers) -> Submission {
        Submission::new()
    }

    fn terminal(&self, challenge: &Challenge) -> Option<Terminal> {
        Some(Terminal::Unsupported {
            component: challenge.component.clone(),
        })
    }
}
