use crate::flow::challenge::{Challenge, FlowErrorChallenge};
use crate::flow::form::{Answers, Form, Submission};
use crate::flow::registry::{Stage, StageKind, Terminal};

pub const COMPONENT: &str = "ak-stage-flow-error";

/// Terminal stage: something went wrong server-side while planning or
/// executing the flow. Carries a request id for support lookups.
#[derive(Debug, Default)]
pub struct FlowErrorStage;

impl Stage for FlowErrorStage {
    fn component(&self) -> &'static str {
        COMPONENT
    }

    fn kind(&self, _: &Challenge) -> StageKind {
        StageKind::Terminal
    }

    fn render(&self, challenge: &Challenge) -> Form {
        let payload: FlowErrorChallenge = challenge.parse().unwrap_or_default();
        let mut form = Form::new(COMPONENT);

        match payload.error {
            Some(error) => form.push_info(error),
            None => form.push_info("Something went wrong."),
        }

        if let Some(request_id) = payload.request_id {
            form.push_info(format!("Request ID: {request_id}"));
        }

        form
    }

    fn response(&self, _: &Challenge, _: &Answers) -> Submission {
        Submission::new()
    }

    fn terminal(&self, challenge: &Challenge) -> Option<Terminal> {
        let payload: FlowErrorChallenge = challenge.parse().unwrap_or_default();
        Some(Terminal::Failed {
            error: payload.error,
            request_id: payload.request_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_terminal_carries_error_and_request_id() {
        let challenge: Challenge = serde_json::from_value(json!({
            "component": COMPONENT,
            "error": "Flow does not apply to current user.",
            "request_id": "01J9Z9"
        }))
        .unwrap();

        assert_eq!(
            FlowErrorStage.terminal(&challenge),
            Some(Terminal::Failed {
                error: Some("Flow does not apply to current user.".to_string()),
                request_id: Some("01J9Z9".to_string()),
            })
        );

        let form = FlowErrorStage.render(&challenge);
        assert!(form.info.iter().any(|line| line.contains("01J9Z9")));
    }
}
