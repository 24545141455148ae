use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashMap};

/// A single step of a flow as sent by the executor endpoint.
///
/// The `component` tag decides which stage handles the challenge. Everything
/// the envelope does not model explicitly is kept in `extra`, so unknown
/// components and new server-side fields always decode.
#[derive(Debug, Clone, Deserialize)]
pub struct Challenge {
    pub component: String,
    #[serde(default)]
    pub flow_info: Option<FlowInfo>,
    #[serde(default)]
    pub response_errors: Option<HashMap<String, Vec<ErrorDetail>>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Challenge {
    /// Decode the stage-specific fields of the envelope into a typed payload.
    ///
    /// # Errors
    ///
    /// Returns an error if the fields do not match the payload shape
    pub fn parse<T: serde::de::DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_value(Value::Object(self.extra.clone()))
    }

    /// Raw access to a stage-specific field
    #[must_use]
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.extra.get(key)
    }

    #[must_use]
    pub fn title(&self) -> Option<&str> {
        self.flow_info.as_ref().and_then(|info| info.title.as_deref())
    }
}

/// Flow metadata carried alongside most challenges
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FlowInfo {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub background: Option<String>,
    #[serde(default)]
    pub cancel_url: Option<String>,
    #[serde(default)]
    pub layout: Option<String>,
}

/// One validation error, keyed per field in `response_errors`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ErrorDetail {
    pub string: String,
    #[serde(default)]
    pub code: String,
}

/// Key under which form-level errors travel in `response_errors`
pub const NON_FIELD_ERRORS: &str = "non_field_errors";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct IdentificationChallenge {
    #[serde(default)]
    pub user_fields: Option<Vec<String>>,
    #[serde(default)]
    pub password_fields: bool,
    #[serde(default)]
    pub allow_show_password: bool,
    #[serde(default)]
    pub application_pre: Option<String>,
    #[serde(default)]
    pub primary_action: Option<String>,
    #[serde(default)]
    pub sources: Vec<LoginSource>,
    #[serde(default)]
    pub show_source_labels: bool,
    #[serde(default)]
    pub enroll_url: Option<String>,
    #[serde(default)]
    pub recovery_url: Option<String>,
    #[serde(default)]
    pub passwordless_url: Option<String>,
}

/// An external login source advertised by the identification stage
#[derive(Debug, Clone, Deserialize)]
pub struct LoginSource {
    pub name: String,
    #[serde(default)]
    pub icon_url: Option<String>,
    #[serde(default)]
    pub challenge: Option<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PasswordChallenge {
    #[serde(default)]
    pub pending_user: String,
    #[serde(default)]
    pub pending_user_avatar: Option<String>,
    #[serde(default)]
    pub recovery_url: Option<String>,
    #[serde(default)]
    pub allow_show_password: bool,
}

/// Terminal challenge: follow `to` and stop the loop
#[derive(Debug, Clone, Deserialize)]
pub struct RedirectChallenge {
    pub to: String,
}

/// Terminal challenge: hand `attrs` off to `url` as a form POST.
///
/// `attrs` is ordered so the hand-off is deterministic.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AutosubmitChallenge {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub attrs: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthenticatorValidationChallenge {
    #[serde(default)]
    pub device_challenges: Vec<DeviceChallenge>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DeviceChallenge {
    pub device_class: String,
    #[serde(default)]
    pub device_uid: String,
    #[serde(default)]
    pub challenge: Option<Value>,
    #[serde(default)]
    pub last_used: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PromptChallenge {
    #[serde(default)]
    pub fields: Vec<PromptField>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PromptField {
    pub field_key: String,
    #[serde(default)]
    pub label: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub placeholder: String,
    #[serde(default)]
    pub initial_value: String,
    #[serde(default)]
    pub order: i64,
    #[serde(default)]
    pub choices: Option<Vec<String>>,
    #[serde(default)]
    pub sub_text: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConsentChallenge {
    #[serde(default)]
    pub header_text: Option<String>,
    #[serde(default)]
    pub permissions: Vec<ConsentPermission>,
    #[serde(default)]
    pub additional_permissions: Vec<ConsentPermission>,
    #[serde(default)]
    pub token: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ConsentPermission {
    #[serde(default)]
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AccessDeniedChallenge {
    #[serde(default)]
    pub error_message: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FlowErrorChallenge {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub request_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CaptchaChallenge {
    #[serde(default)]
    pub site_key: String,
    #[serde(default)]
    pub js_url: String,
    #[serde(default)]
    pub interactive: bool,
}
