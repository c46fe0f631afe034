//! `gitloader clone` — plain clone of a remote into a local directory.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Result;
use clap::Args;

use gitloader_core::CloneRequest;
use gitloader_sync::{spawn_clone, Engine, EngineConfig};

use crate::output::{self, Format};

/// Arguments for `gitloader clone`.
#[derive(Args, Debug)]
pub struct CloneArgs {
    /// Repository URL.
    pub url: String,

    /// Directory to clone into.
    pub destination: PathBuf,

    /// Optional access token for private remotes.
    #[arg(long)]
    pub token: Option<String>,

    /// Emit the outcome as a JSON line.
    #[arg(long)]
    pub json: bool,
}

impl CloneArgs {
    pub async fn run(self, config: EngineConfig) -> Result<ExitCode> {
        let mut request = CloneRequest::new(self.url, self.destination);
        if let Some(token) = self.token.filter(|t| !t.trim().is_empty()) {
            request = request.with_token(token);
        }

        let engine = Arc::new(Engine::new(config));
        let outcome = spawn_clone(engine, request)?.outcome().await;
        output::clone_outcome(Format::from_flag(self.json), &outcome)?;

        Ok(if outcome.is_failure() {
            ExitCode::FAILURE
        } else {
            ExitCode::SUCCESS
        })
    }
}
