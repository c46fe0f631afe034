//! `gitloader push` — mirror a local folder into a remote repository.

use std::io::{self, BufRead};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;

use gitloader_core::{SecretToken, SyncMode, SyncOutcome, SyncRequest};
use gitloader_sync::{spawn_sync, Engine, EngineConfig};

use crate::output::{self, Format};
use crate::ModeArg;

/// Arguments for `gitloader push`.
#[derive(Args, Debug)]
pub struct PushArgs {
    /// Local folder whose contents are pushed.
    pub source: PathBuf,

    /// HTTPS URL of the destination repository.
    #[arg(long)]
    pub remote: String,

    /// Access token used for clone and push.
    #[arg(long, conflicts_with = "token_stdin")]
    pub token: Option<String>,

    /// Read the access token from the first line of stdin.
    #[arg(long)]
    pub token_stdin: bool,

    /// `update` keeps files the folder does not mention; `replace` mirrors it.
    #[arg(long, default_value = "update")]
    pub mode: ModeArg,

    /// Shorthand for `--mode replace`.
    #[arg(long, conflicts_with = "mode")]
    pub replace: bool,

    /// Emit status events and the outcome as JSON lines.
    #[arg(long)]
    pub json: bool,
}

impl PushArgs {
    pub async fn run(self, config: EngineConfig) -> Result<ExitCode> {
        let token = self.resolve_token()?;
        let mode = if self.replace {
            SyncMode::Replace
        } else {
            self.mode.into()
        };
        let request = SyncRequest::new(self.source, self.remote, token, mode);

        let engine = Arc::new(Engine::new(config));
        let handle = spawn_sync(engine, request)?;

        let format = Format::from_flag(self.json);
        let outcome = handle
            .run_to_completion(|event| output::event(format, event))
            .await;
        output::sync_outcome(format, &outcome)?;

        Ok(match outcome {
            SyncOutcome::Failed { .. } => ExitCode::FAILURE,
            SyncOutcome::Pushed { .. } | SyncOutcome::NoChanges => ExitCode::SUCCESS,
        })
    }

    fn resolve_token(&self) -> Result<SecretToken> {
        if self.token_stdin {
            let mut line = String::new();
            io::stdin()
                .lock()
                .read_line(&mut line)
                .context("failed to read token from stdin")?;
            return Ok(SecretToken::new(line.trim_end_matches(['\r', '\n'])));
        }
        Ok(self.token.clone().map(SecretToken::from).unwrap_or_default())
    }
}
