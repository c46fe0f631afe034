//! Engine configuration.
//!
//! Plain struct with defaults; front-ends override individual fields from
//! their own flags. Nothing here is read from disk or the environment.

use std::path::{Path, PathBuf};

use gitloader_core::TOOL_NAME;

/// Directory name used by [`StagingLayout::Fixed`] when built with
/// [`StagingLayout::fixed_in`].
pub const FIXED_SCRATCH_NAME: &str = "gitloader-staging";

/// Prefix of the per-run scratch directories of [`StagingLayout::Unique`].
pub const UNIQUE_SCRATCH_PREFIX: &str = "gitloader-push-";

/// Where scratch working copies live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StagingLayout {
    /// A fresh `gitloader-push-<uuid>` directory under `root` per run.
    Unique { root: PathBuf },
    /// One well-known directory. Runs are serialized on it.
    Fixed { path: PathBuf },
}

impl StagingLayout {
    pub fn unique_in(root: impl Into<PathBuf>) -> Self {
        Self::Unique { root: root.into() }
    }

    /// Fixed layout at `<dir>/gitloader-staging`.
    pub fn fixed_in(dir: &Path) -> Self {
        Self::Fixed {
            path: dir.join(FIXED_SCRATCH_NAME),
        }
    }
}

impl Default for StagingLayout {
    fn default() -> Self {
        Self::Unique {
            root: std::env::temp_dir(),
        }
    }
}

/// Settings shared by every run of an [`crate::Engine`].
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Path or name of the `git` executable.
    pub git_program: PathBuf,
    /// Committer identity written to the scratch repository's local config.
    pub committer_name: String,
    pub committer_email: String,
    /// Remote branch every push targets.
    pub branch: String,
    /// Name embedded in commit messages.
    pub tool_name: String,
    pub staging: StagingLayout,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            git_program: PathBuf::from("git"),
            committer_name: TOOL_NAME.to_string(),
            committer_email: "git-loader@users.noreply.localhost".to_string(),
            branch: "main".to_string(),
            tool_name: TOOL_NAME.to_string(),
            staging: StagingLayout::default(),
        }
    }
}

impl EngineConfig {
    /// Commit message for a push of the folder named `folder`.
    pub fn commit_message(&self, folder: &str) -> String {
        format!("Pushed folder {folder} via {}", self.tool_name)
    }

    /// Refspec handed to `git push origin`.
    pub fn push_refspec(&self) -> String {
        format!("HEAD:{}", self.branch)
    }
}
