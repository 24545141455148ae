use crate::flow::challenge::{Challenge, RedirectChallenge};
use crate::flow::form::{Answers, Form, Submission};
use crate::flow::navigator::Navigation;
use crate::flow::registry::{Stage, StageKind, Terminal};

pub const COMPONENT: &str = "xak-flow-redirect";

/// Terminal stage: the flow is done, follow `to` exactly once
#[derive(Debug, Default)]
pub struct RedirectStage;

impl Stage for RedirectStage {
    fn component(&self) -> &'static str {
        COMPONENT
    }

    fn kind(&self, _: &Challenge) -> StageKind {
        StageKind::Terminal
    }

    fn render(&self, challenge: &Challenge) -> Form {
        let mut form = Form::new(COMPONENT);

        match challenge.parse::<RedirectChallenge>() {
            Ok(payload) => form.push_info(format!("Redirecting to {}.", payload.to)),
            Err(_) => form.push_info("Redirecting."),
        }

        form
    }

    fn response(&self, _: &Challenge, _: &Answers) -> Submission {
        Submission::new()
    }

    fn terminal(&self, challenge: &Challenge) -> Option<Terminal> {
        match challenge.parse::<RedirectChallenge>() {
            Ok(payload) => Some(Terminal::Navigate(Navigation::Visit(payload.to))),
            Err(_) => Some(Terminal::Failed {
                error: Some("redirect challenge without a destination".to_string()),
                request_id: None,
            }),
        }
    }
}
