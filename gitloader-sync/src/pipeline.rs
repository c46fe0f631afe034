//! Sync orchestration — the state machine of one push.
//!
//! ```text
//! Preparing → Cloning → (Replacing) → Copying → ConfiguringIdentity
//!   → Staging → DiffCheck → (Committing → Pushing → Done) | NoChange
//! ```
//!
//! Any step may fail; the run then ends in `Failed`. The scratch directory is
//! a scoped resource and is removed on every path. Every git call receives an
//! explicit working directory; the process working directory is never touched.

use std::sync::Arc;

use gitloader_core::{StatusEvent, SyncOutcome, SyncPhase, SyncRequest};

use crate::clone;
use crate::config::EngineConfig;
use crate::error::SyncError;
use crate::reconcile;
use crate::reporter::StatusReporter;
use crate::runner::{CommandOutput, CommandRunner, Credential, GitCli, GitCommand};
use crate::staging::StagingManager;

/// Configured sync engine. Cheap to share behind an `Arc`.
pub struct Engine {
    config: EngineConfig,
    runner: Arc<dyn CommandRunner>,
    staging: StagingManager,
}

impl Engine {
    /// Engine that runs the configured `git` binary.
    pub fn new(config: EngineConfig) -> Self {
        let runner = Arc::new(GitCli::new(config.git_program.clone()));
        Self::with_runner(config, runner)
    }

    /// Engine with a caller-supplied command runner.
    pub fn with_runner(config: EngineConfig, runner: Arc<dyn CommandRunner>) -> Self {
        let staging = StagingManager::new(config.staging.clone());
        Self {
            config,
            runner,
            staging,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub(crate) fn runner(&self) -> &dyn CommandRunner {
        self.runner.as_ref()
    }

    /// Run one sync to completion on the current thread.
    ///
    /// Never returns an error: every failure is reported through `reporter`
    /// and folded into [`SyncOutcome::Failed`].
    ///
    /// Blocks the calling thread on git child processes and, with
    /// [`StagingLayout::Fixed`](crate::StagingLayout::Fixed), on the scratch
    /// directory's file lock until the holding run finishes. From async code
    /// use [`spawn_sync`](crate::spawn_sync), or call this inside
    /// `tokio::task::spawn_blocking`.
    pub fn sync(&self, request: &SyncRequest, reporter: &dyn StatusReporter) -> SyncOutcome {
        tracing::info!(
            source = %request.source_directory.display(),
            mode = %request.mode,
            "starting sync",
        );
        match self.try_sync(request, reporter) {
            Ok(outcome) => {
                tracing::info!(?outcome, "sync finished");
                outcome
            }
            Err(err) => {
                let kind = err.kind();
                tracing::error!(error = %err, ?kind, "sync failed");
                reporter.report(StatusEvent::failed(kind));
                SyncOutcome::Failed {
                    kind,
                    detail: err.to_string(),
                }
            }
        }
    }

    /// Clone `request.remote_url` into `request.destination_path`.
    pub fn clone_repository(
        &self,
        request: &gitloader_core::CloneRequest,
    ) -> gitloader_core::CloneOutcome {
        clone::clone_repository(self.runner(), request)
    }

    fn try_sync(
        &self,
        request: &SyncRequest,
        reporter: &dyn StatusReporter,
    ) -> Result<SyncOutcome, SyncError> {
        request.validate()?;
        let enter = |phase: SyncPhase| reporter.report(StatusEvent::enter(phase));

        enter(SyncPhase::Preparing);
        let staging = self.staging.acquire()?;
        let checkout = staging.path();
        let credential = Credential::new(request.credential_token.clone());

        enter(SyncPhase::Cloning);
        let parent = checkout.parent().unwrap_or(checkout);
        self.git(
            GitCommand::new(["clone".to_string(), request.remote_url.clone()])
                .in_dir(parent)
                .arg(checkout.to_string_lossy())
                .with_credential(credential.clone()),
        )?;

        let checkout = checkout.to_path_buf();
        let report = reconcile::reconcile(&request.source_directory, &checkout, request.mode, &enter)?;
        tracing::debug!(?report, "reconciled scratch checkout");

        enter(SyncPhase::ConfiguringIdentity);
        self.git(
            GitCommand::new(["config", "--local", "user.email", self.config.committer_email.as_str()])
                .in_dir(&checkout),
        )?;
        self.git(
            GitCommand::new(["config", "--local", "user.name", self.config.committer_name.as_str()])
                .in_dir(&checkout),
        )?;

        enter(SyncPhase::Staging);
        self.git(GitCommand::new(["add", "."]).in_dir(&checkout))?;

        enter(SyncPhase::DiffCheck);
        let status = self.git(GitCommand::new(["status", "--porcelain"]).in_dir(&checkout))?;
        if status.stdout.trim().is_empty() {
            enter(SyncPhase::NoChange);
            staging.release();
            return Ok(SyncOutcome::NoChanges);
        }

        let message = self.config.commit_message(&request.folder_name());
        enter(SyncPhase::Committing);
        self.git(GitCommand::new(["commit", "-m", message.as_str()]).in_dir(&checkout))?;

        enter(SyncPhase::Pushing);
        self.git(
            GitCommand::new(["push".to_string(), "origin".to_string(), self.config.push_refspec()])
                .in_dir(&checkout)
                .with_credential(credential),
        )?;

        enter(SyncPhase::Done);
        staging.release();
        Ok(SyncOutcome::Pushed {
            commit_message: message,
        })
    }

    fn git(&self, command: GitCommand) -> Result<CommandOutput, SyncError> {
        self.runner.run(&command)
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("config", &self.config)
            .field("staging", &self.staging)
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
