//! Error types for gitloader-core.

use std::path::PathBuf;

use thiserror::Error;

/// Request validation failures. Raised before any work starts.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RequestError {
    /// One or more required fields were empty.
    #[error("please fill all fields (missing: {})", .fields.join(", "))]
    MissingField { fields: Vec<&'static str> },

    /// The source path does not exist or is not a directory.
    #[error("source is not a directory: {path}")]
    SourceNotDirectory { path: PathBuf },
}
