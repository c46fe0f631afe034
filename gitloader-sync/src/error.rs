//! Error types for gitloader-sync.

use std::path::PathBuf;

use thiserror::Error;

use gitloader_core::{FailureKind, RequestError};

/// All errors that can arise inside one sync or clone run.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The request failed validation.
    #[error("invalid request: {0}")]
    Request(#[from] RequestError),

    /// The source folder lies inside the scratch directory.
    #[error("source must not be nested inside the scratch directory ({source_dir} is inside {staging})")]
    NestedSource {
        source_dir: PathBuf,
        staging: PathBuf,
    },

    /// The git binary could not be started at all.
    #[error("failed to run {program}: {source}")]
    Spawn {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The git binary ran and exited non-zero.
    #[error("`{command}` failed ({}): {}", exit_label(.code), pick_output(.stdout, .stderr))]
    Tool {
        command: String,
        code: Option<i32>,
        stdout: String,
        stderr: String,
    },

    /// An I/O error, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Anything the engine did not anticipate.
    #[error("{0}")]
    Unexpected(String),
}

impl SyncError {
    /// Category used to pick the failure headline.
    pub fn kind(&self) -> FailureKind {
        match self {
            SyncError::Spawn { .. } | SyncError::Tool { .. } => FailureKind::Tool,
            SyncError::Request(_) | SyncError::NestedSource { .. } => FailureKind::InvalidInput,
            SyncError::Io { .. } => FailureKind::Io,
            SyncError::Unexpected(_) => FailureKind::Unexpected,
        }
    }

    /// The tool's own diagnostic: stderr, or stdout when stderr is empty.
    ///
    /// Returns the error's display text for non-tool errors.
    pub fn message(&self) -> String {
        match self {
            SyncError::Tool { stdout, stderr, .. } => pick_output(stdout, stderr).to_string(),
            other => other.to_string(),
        }
    }
}

fn exit_label(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit {code}"),
        None => "terminated by signal".to_string(),
    }
}

fn pick_output<'a>(stdout: &'a str, stderr: &'a str) -> &'a str {
    if stderr.is_empty() {
        stdout
    } else {
        stderr
    }
}

/// Convenience constructor for [`SyncError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> SyncError {
    SyncError::Io {
        path: path.into(),
        source,
    }
}
