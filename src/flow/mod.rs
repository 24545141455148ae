//! Challenge/response flow execution against an identity provider.
//!
//! The server drives: every GET or POST on the executor endpoint returns a
//! challenge tagged with a `component`, a registry maps the tag to a stage,
//! and the stage renders a headless form and builds the response. The loop
//! ends with a redirect, a denial, or a flow error.

pub mod challenge;
pub mod client;
pub mod error;
pub mod executor;
pub mod form;
pub mod interactor;
pub mod navigator;
pub mod registry;
pub mod retry;
pub mod stages;

pub use challenge::{Challenge, ErrorDetail, FlowInfo};
pub use client::{is_valid_slug, FlowClient, FlowClientBuilder};
pub use error::FlowError;
pub use executor::{FlowExecutor, FlowOutcome, FlowPhase, StageView};
pub use form::{Answers, Field, FieldKind, Form, Submission};
pub use interactor::{Interaction, Interactor, ScriptedInteractor};
pub use navigator::{Navigation, Navigator, RecordingNavigator};
pub use registry::{Stage, StageKind, StageRegistry, Terminal};
pub use retry::RetryPolicy;
