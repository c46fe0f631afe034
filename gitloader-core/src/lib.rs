//! Git Loader core library — domain types and request validation.
//!
//! - [`types`] — requests, outcomes, status events, the secret token newtype
//! - [`error`] — [`RequestError`]

pub mod error;
pub mod types;

pub use error::RequestError;
pub use types::{
    folder_name, CloneOutcome, CloneRequest, FailureKind, SecretToken, Severity, StatusEvent,
    SyncMode, SyncOutcome, SyncPhase, SyncRequest, TOOL_NAME,
};
