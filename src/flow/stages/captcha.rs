use crate::flow::challenge::{CaptchaChallenge, Challenge};
use crate::flow::form::{Answers, Field, FieldKind, Form, Submission};
use crate::flow::registry::{Stage, StageKind};

pub const COMPONENT: &str = "ak-stage-captcha";

/// Captcha verification. Headless hosts cannot run the widget; the token
/// has to be produced out-of-band and supplied as an answer.
#[derive(Debug, Default)]
pub struct CaptchaStage;

impl Stage for CaptchaStage {
    fn component(&self) -> &'static str {
        COMPONENT
    }

    fn kind(&self, _: &Challenge) -> StageKind {
        StageKind::Interactive
    }

    fn render(&self, challenge: &Challenge) -> Form {
        let payload: CaptchaChallenge = challenge.parse().unwrap_or_default();
        let mut form = Form::new(COMPONENT);

        form.push_info(format!(
            "Captcha verification required (site key {}, widget {}).",
            payload.site_key, payload.js_url
        ));

        form.fields
            .push(Field::new("token", "Captcha token", FieldKind::Text).required());

        form
    }

    fn response(&self, _: &Challenge, answers: &Answers) -> Submission {
        let mut submission = Submission::new();

        if let Some(token) = answers.get("token") {
            submission.insert("token".to_string(), token.clone());
        }

        submission
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_render_and_response() {
        let challenge: Challenge = serde_json::from_value(json!({
            "component": COMPONENT,
            "site_key": "6LeIxAcT",
            "js_url": "https://www.recaptcha.net/recaptcha/api.js",
            "interactive": false
        }))
        .unwrap();

        let form = CaptchaStage.render(&challenge);
        assert!(form.info.iter().any(|line| line.contains("6LeIxAcT")));

        let answers = Answers::new().with("token", "resp-token");
        let submission = CaptchaStage.response(&challenge, &answers);

        assert_eq!(
            serde_json::Value::Object(submission),
            json!({"token": "resp-token"})
        );
    }
}
