use crate::flow::challenge::{AuthenticatorValidationChallenge, Challenge, DeviceChallenge};
use crate::flow::form::{Answers, Field, FieldKind, Form, Submission};
use crate::flow::registry::{Stage, StageKind};

pub const COMPONENT: &str = "ak-stage-authenticator-validate";

/// Second factor validation. WebAuthn devices need a platform authenticator
/// and are filtered out here; the remaining device classes are all
/// code-based and share a single input.
#[derive(Debug, Default)]
pub struct AuthenticatorValidateStage;

fn usable_devices(payload: &AuthenticatorValidationChallenge) -> Vec<&DeviceChallenge> {
    payload
        .device_challenges
        .iter()
        .filter(|device| device.device_class != "webauthn")
        .collect()
}

fn code_label(devices: &[&DeviceChallenge]) -> &'static str {
    match devices {
        [single] => match single.device_class.as_str() {
            "totp" => "Authenticator code",
            "static" => "Recovery code",
            "sms" => "SMS code",
            "email" => "Email code",
            _ => "Code",
        },
        _ => "Code",
    }
}

impl Stage for AuthenticatorValidateStage {
    fn component(&self) -> &'static str {
        COMPONENT
    }

    fn kind(&self, _: &Challenge) -> StageKind {
        StageKind::Interactive
    }

    fn render(&self, challenge: &Challenge) -> Form {
        let payload: AuthenticatorValidationChallenge = challenge.parse().unwrap_or_default();
        let devices = usable_devices(&payload);
        let mut form = Form::new(COMPONENT);

        if devices.is_empty() {
            form.push_info("No code-based authenticator device is available here.");
        } else {
            let classes: Vec<&str> = devices
                .iter()
                .map(|device| device.device_class.as_str())
                .collect();
            form.push_info(format!("Available devices: {}.", classes.join(", ")));
        }

        form.fields
            .push(Field::new("code", code_label(&devices), FieldKind::Text).required());

        form
    }

    fn response(&self, _: &Challenge, answers: &Answers) -> Submission {
        let mut submission = Submission::new();

        if let Some(code) = answers.get("code") {
            submission.insert("code".to_string(), code.clone());
        }

        submission
    }
}
