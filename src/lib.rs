//! # Fluo
//!
//! `fluo` is a headless client for server-driven identity flows. The server
//! owns the flow plan, the client fetches one challenge at a time, renders it
//! as an abstract form, submits answers and follows the terminal redirect.
//!
//! ## Protocol
//!
//! - **Challenges:** Every step of a flow is a JSON challenge tagged by a
//!   `component` discriminant. Validation failures come back with status 400
//!   and are challenges too, re-rendered with their field errors attached.
//! - **Session:** All state lives server side, keyed by the session cookie.
//!   The client never interprets flow state beyond the current challenge.
//! - **Open set:** Unknown components render as a terminal notice instead of
//!   failing, servers grow new stages faster than clients learn them.

pub mod api;
pub mod cli;
pub mod flow;
pub mod wizard;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);
