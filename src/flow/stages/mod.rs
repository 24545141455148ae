//! Built-in stage handlers, one per challenge component.

pub mod access_denied;
pub mod authenticator_validate;
pub mod autosubmit;
pub mod captcha;
pub mod consent;
pub mod dummy;
pub mod flow_error;
pub mod identification;
pub mod password;
pub mod prompt;
pub mod redirect;
pub mod unsupported;
