//! Domain types shared by the sync engine and its front-ends.
//!
//! All path fields use `PathBuf`; never `&str` or `String` for filesystem paths.
//! Outcome and event types are serializable so front-ends can emit them as JSON.

use std::fmt;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::RequestError;

/// Name the engine signs its commits with.
pub const TOOL_NAME: &str = "Git Loader";

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// An access token for the remote. Zeroed on drop, never printed.
#[derive(Clone, Default, Zeroize, ZeroizeOnDrop)]
pub struct SecretToken(String);

impl SecretToken {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Borrow the raw token. Only the credential injector should call this.
    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Debug for SecretToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SecretToken([REDACTED])")
    }
}

impl fmt::Display for SecretToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[REDACTED]")
    }
}

impl From<String> for SecretToken {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for SecretToken {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// How the local folder is reconciled with the tracked tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SyncMode {
    /// Merge new and changed files into the existing tree.
    #[default]
    Update,
    /// Clear the tracked tree (except `.git`) before copying.
    Replace,
}

impl fmt::Display for SyncMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncMode::Update => write!(f, "update"),
            SyncMode::Replace => write!(f, "replace"),
        }
    }
}

/// How a status event should be presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Success,
    Error,
}

/// States of one sync run, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncPhase {
    Preparing,
    Cloning,
    Replacing,
    Copying,
    ConfiguringIdentity,
    Staging,
    DiffCheck,
    Committing,
    Pushing,
    NoChange,
    Done,
    Failed,
}

impl SyncPhase {
    /// Short progress label shown to the user on entering the phase.
    pub fn label(self) -> &'static str {
        match self {
            SyncPhase::Preparing => "Preparing temporary directory...",
            SyncPhase::Cloning => "Cloning repository...",
            SyncPhase::Replacing => "Replacing repository contents...",
            SyncPhase::Copying => "Copying folder contents...",
            SyncPhase::ConfiguringIdentity => "Configuring Git user...",
            SyncPhase::Staging => "Adding changes...",
            SyncPhase::DiffCheck => "Checking for changes...",
            SyncPhase::Committing => "Committing changes...",
            SyncPhase::Pushing => "Pushing to remote...",
            SyncPhase::NoChange => "No changes to commit.",
            SyncPhase::Done => "Push successful!",
            SyncPhase::Failed => "Unexpected error occurred.",
        }
    }

    pub fn severity(self) -> Severity {
        match self {
            SyncPhase::Done => Severity::Success,
            SyncPhase::Failed => Severity::Error,
            _ => Severity::Info,
        }
    }

    /// `true` for phases that end a run.
    pub fn is_terminal(self) -> bool {
        matches!(self, SyncPhase::NoChange | SyncPhase::Done | SyncPhase::Failed)
    }
}

impl fmt::Display for SyncPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Category of a failed run; selects the headline shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// The external tool exited non-zero (auth, network, push rejection...).
    Tool,
    /// The request was well-formed but unusable (source nested in scratch).
    InvalidInput,
    /// A filesystem copy or delete failed.
    Io,
    /// Anything else, including a panic in the background unit.
    Unexpected,
}

impl FailureKind {
    pub fn headline(self) -> &'static str {
        match self {
            FailureKind::Tool => "Git error occurred.",
            _ => "Unexpected error occurred.",
        }
    }
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

/// Everything one sync run needs.
#[derive(Debug, Clone)]
pub struct SyncRequest {
    pub source_directory: PathBuf,
    pub remote_url: String,
    pub credential_token: SecretToken,
    pub mode: SyncMode,
}

impl SyncRequest {
    pub fn new(
        source_directory: impl Into<PathBuf>,
        remote_url: impl Into<String>,
        credential_token: impl Into<SecretToken>,
        mode: SyncMode,
    ) -> Self {
        Self {
            source_directory: source_directory.into(),
            remote_url: remote_url.into(),
            credential_token: credential_token.into(),
            mode,
        }
    }

    /// Check required fields, then that the source is an existing directory.
    ///
    /// Missing fields are all reported together.
    pub fn validate(&self) -> Result<(), RequestError> {
        let mut missing = Vec::new();
        if self.source_directory.as_os_str().is_empty() {
            missing.push("source");
        }
        if self.remote_url.trim().is_empty() {
            missing.push("remote");
        }
        if self.credential_token.is_blank() {
            missing.push("token");
        }
        if !missing.is_empty() {
            return Err(RequestError::MissingField { fields: missing });
        }
        if !self.source_directory.is_dir() {
            return Err(RequestError::SourceNotDirectory {
                path: self.source_directory.clone(),
            });
        }
        Ok(())
    }

    /// Base name of the source folder, ignoring trailing separators.
    pub fn folder_name(&self) -> String {
        folder_name(&self.source_directory)
    }
}

/// Base name of `path`; resolves `.`/`..` through the filesystem when needed.
pub fn folder_name(path: &Path) -> String {
    if let Some(name) = path.file_name() {
        return name.to_string_lossy().into_owned();
    }
    std::fs::canonicalize(path)
        .ok()
        .and_then(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
        .unwrap_or_else(|| path.display().to_string())
}

/// A plain clone of a remote into a local destination.
#[derive(Debug, Clone)]
pub struct CloneRequest {
    pub remote_url: String,
    pub destination_path: PathBuf,
    pub credential_token: Option<SecretToken>,
}

impl CloneRequest {
    pub fn new(remote_url: impl Into<String>, destination_path: impl Into<PathBuf>) -> Self {
        Self {
            remote_url: remote_url.into(),
            destination_path: destination_path.into(),
            credential_token: None,
        }
    }

    pub fn with_token(mut self, token: impl Into<SecretToken>) -> Self {
        self.credential_token = Some(token.into());
        self
    }

    pub fn validate(&self) -> Result<(), RequestError> {
        let mut missing = Vec::new();
        if self.remote_url.trim().is_empty() {
            missing.push("remote");
        }
        if self.destination_path.as_os_str().is_empty() {
            missing.push("destination");
        }
        if missing.is_empty() {
            Ok(())
        } else {
            Err(RequestError::MissingField { fields: missing })
        }
    }
}

// ---------------------------------------------------------------------------
// Events and outcomes
// ---------------------------------------------------------------------------

/// One progress notification from a running operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusEvent {
    pub phase: SyncPhase,
    pub message: String,
    pub severity: Severity,
    pub at: DateTime<Utc>,
}

impl StatusEvent {
    /// Event for entering `phase`, using its default label and severity.
    pub fn enter(phase: SyncPhase) -> Self {
        Self {
            phase,
            message: phase.label().to_string(),
            severity: phase.severity(),
            at: Utc::now(),
        }
    }

    pub fn failed(kind: FailureKind) -> Self {
        Self {
            phase: SyncPhase::Failed,
            message: kind.headline().to_string(),
            severity: Severity::Error,
            at: Utc::now(),
        }
    }
}

/// Terminal result of one sync run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SyncOutcome {
    Pushed { commit_message: String },
    NoChanges,
    Failed { kind: FailureKind, detail: String },
}

impl SyncOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, SyncOutcome::Failed { .. })
    }
}

/// Terminal result of one clone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum CloneOutcome {
    Succeeded { destination: PathBuf },
    Failed { detail: String },
}

impl CloneOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, CloneOutcome::Failed { .. })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
