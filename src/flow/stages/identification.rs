use crate::flow::challenge::{Challenge, IdentificationChallenge};
use crate::flow::form::{Answers, Field, FieldKind, Form, Submission};
use crate::flow::registry::{Stage, StageKind};

pub const COMPONENT: &str = "ak-stage-identification";

/// First stage of most flows: asks who is signing in, optionally together
/// with the password when the server folded both steps into one.
#[derive(Debug, Default)]
pub struct IdentificationStage;

fn uid_label(user_fields: Option<&Vec<String>>) -> String {
    let Some(fields) = user_fields else {
        return "Email or Username".to_string();
    };

    if fields.is_empty() {
        return "Email or Username".to_string();
    }

    fields
        .iter()
        .map(|field| {
            let mut chars = field.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" or ")
}

impl Stage for IdentificationStage {
    fn component(&self) -> &'static str {
        COMPONENT
    }

    fn kind(&self, _: &Challenge) -> StageKind {
        StageKind::Interactive
    }

    fn render(&self, challenge: &Challenge) -> Form {
        let payload: IdentificationChallenge = challenge.parse().unwrap_or_default();
        let mut form = Form::new(COMPONENT);

        if let Some(application) = &payload.application_pre {
            form.push_info(format!("Log in to continue to {application}."));
        }

        let label = uid_label(payload.user_fields.as_ref());
        form.fields.push(
            Field::new("uid_field", label.clone(), FieldKind::Text)
                .required()
                .placeholder(label),
        );

        if payload.password_fields {
            form.fields
                .push(Field::new("password", "Password", FieldKind::Password).required());
        }

        // The server can attach a captcha sub-stage; the token is supplied
        // out-of-band by the host.
        if challenge.field("captcha_stage").is_some_and(|v| !v.is_null()) {
            form.fields
                .push(Field::new("captcha_token", "Captcha token", FieldKind::Hidden));
        }

        for source in &payload.sources {
            form.push_info(format!("External source available: {}", source.name));
        }

        if let Some(enroll) = &payload.enroll_url {
            form.push_info(format!("Need an account? Sign up: {enroll}"));
        }

        if let Some(recovery) = &payload.recovery_url {
            form.push_info(format!("Forgot password: {recovery}"));
        }

        form
    }

    fn response(&self, challenge: &Challenge, answers: &Answers) -> Submission {
        let payload: IdentificationChallenge = challenge.parse().unwrap_or_default();
        let mut submission = Submission::new();

        if let Some(uid) = answers.get("uid_field") {
            submission.insert("uid_field".to_string(), uid.clone());
        }

        if payload.password_fields {
            if let Some(password) = answers.get("password") {
                submission.insert("password".to_string(), password.clone());
            }
        }

        if let Some(token) = answers.get("captcha_token") {
            submission.insert("captcha_token".to_string(), token.clone());
        }

        submission
    }
}
