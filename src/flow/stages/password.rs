use crate::flow::challenge::{Challenge, PasswordChallenge};
use crate::flow::form::{Answers, Field, FieldKind, Form, Submission};
use crate::flow::registry::{Stage, StageKind};

pub const COMPONENT: &str = "ak-stage-password";

#[derive(Debug, Default)]
pub struct PasswordStage;

impl Stage for PasswordStage {
    fn component(&self) -> &'static str {
        COMPONENT
    }

    fn kind(&self, _: &Challenge) -> StageKind {
        StageKind::Interactive
    }

    fn render(&self, challenge: &Challenge) -> Form {
        let payload: PasswordChallenge = challenge.parse().unwrap_or_default();
        let mut form = Form::new(COMPONENT);

        if !payload.pending_user.is_empty() {
            form.push_info(format!("Welcome, {}.", payload.pending_user));
        }

        form.fields
            .push(Field::new("password", "Password", FieldKind::Password).required());

        if let Some(recovery) = &payload.recovery_url {
            form.push_info(format!("Forgot password: {recovery}"));
        }

        form
    }

    fn response(&self, _: &Challenge, answers: &Answers) -> Submission {
        let mut submission = Submission::new();

        if let Some(password) = answers.get("password") {
            submission.insert("password".to_string(), password.clone());
        }

        submission
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_render_greets_pending_user() {
        let challenge: Challenge = serde_json::from_value(json!({
            "component": COMPONENT,
            "pending_user": "ken",
            "pending_user_avatar": null
        }))
        .unwrap();

        let form = PasswordStage.render(&challenge);

        assert!(form.info.iter().any(|line| line.contains("ken")));
        assert_eq!(form.field("password").unwrap().kind, FieldKind::Password);
    }

    #[test]
    fn test_response_is_password_only() {
        let challenge: Challenge =
            serde_json::from_value(json!({"component": COMPONENT, "pending_user": "ken"})).unwrap();

        let answers = Answers::new()
            .with("password", "hunter2")
            .with("uid_field", "should-not-leak");

        let submission = PasswordStage.response(&challenge, &answers);

        assert_eq!(
            serde_json::Value::Object(submission),
            json!({"password": "hunter2"})
        );
    }
}
