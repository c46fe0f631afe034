//! Plain clone of a remote into a local destination.

use gitloader_core::{CloneOutcome, CloneRequest};

use crate::error::{io_err, SyncError};
use crate::runner::{CommandRunner, Credential, GitCommand};

/// Clone `request.remote_url` into `request.destination_path`.
///
/// One git invocation. On failure the tool's own error text is returned
/// unchanged (apart from URL userinfo masking).
pub fn clone_repository(runner: &dyn CommandRunner, request: &CloneRequest) -> CloneOutcome {
    tracing::info!(
        destination = %request.destination_path.display(),
        "cloning repository",
    );
    match try_clone(runner, request) {
        Ok(destination) => {
            tracing::info!(destination = %destination.display(), "clone finished");
            CloneOutcome::Succeeded { destination }
        }
        Err(err) => {
            tracing::error!(error = %err, "clone failed");
            CloneOutcome::Failed {
                detail: err.message(),
            }
        }
    }
}

fn try_clone(
    runner: &dyn CommandRunner,
    request: &CloneRequest,
) -> Result<std::path::PathBuf, SyncError> {
    request.validate()?;
    let destination = std::path::absolute(&request.destination_path)
        .map_err(|e| io_err(&request.destination_path, e))?;

    let mut command = GitCommand::new(["clone".to_string(), request.remote_url.clone()])
        .arg(destination.to_string_lossy());
    if let Some(parent) = destination.parent().filter(|p| p.is_dir()) {
        command = command.in_dir(parent);
    }
    if let Some(token) = &request.credential_token {
        command = command.with_credential(Credential::new(token.clone()));
    }
    runner.run(&command)?;
    Ok(destination)
}
