//! Scripted [`CommandRunner`] for state-machine tests that need no git.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::error::SyncError;
use crate::reconcile::METADATA_DIR;
use crate::runner::{CommandOutput, CommandRunner, GitCommand};

/// One recorded invocation.
#[derive(Debug, Clone)]
pub(crate) struct Call {
    pub args: Vec<String>,
    pub cwd: Option<PathBuf>,
    pub authenticated: bool,
}

/// Pretends to be git: `clone` creates a checkout, `status` answers from the
/// script, everything else succeeds unless told to fail.
#[derive(Debug, Default)]
pub(crate) struct ScriptedRunner {
    status: String,
    clone_files: Vec<(String, String)>,
    failures: HashMap<String, String>,
    panic_on: Option<String>,
    calls: Mutex<Vec<Call>>,
    snapshots: Mutex<HashMap<String, Vec<String>>>,
}

impl ScriptedRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Output of `git status --porcelain`.
    pub fn with_status(mut self, porcelain: &str) -> Self {
        self.status = porcelain.to_string();
        self
    }

    /// A file the fake clone puts into the checkout.
    pub fn with_clone_file(mut self, relative: &str, content: &str) -> Self {
        self.clone_files.push((relative.to_string(), content.to_string()));
        self
    }

    /// Make `subcommand` exit 128 with `stderr`.
    pub fn failing_on(mut self, subcommand: &str, stderr: &str) -> Self {
        self.failures.insert(subcommand.to_string(), stderr.to_string());
        self
    }

    pub fn panicking_on(mut self, subcommand: &str) -> Self {
        self.panic_on = Some(subcommand.to_string());
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_to(&self, subcommand: &str) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|c| c.args.first().map(String::as_str) == Some(subcommand))
            .collect()
    }

    pub fn subcommands(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| c.args.first().cloned())
            .collect()
    }

    /// Sorted top-level entries (minus `.git`) of the working directory at
    /// the time `subcommand` ran.
    pub fn snapshot_at(&self, subcommand: &str) -> Option<Vec<String>> {
        self.snapshots.lock().unwrap().get(subcommand).cloned()
    }

    fn fake_clone(&self, dest: &Path) -> Result<(), SyncError> {
        fs::create_dir_all(dest.join(METADATA_DIR)).map_err(|e| SyncError::Unexpected(e.to_string()))?;
        for (relative, content) in &self.clone_files {
            let path = dest.join(relative);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).map_err(|e| SyncError::Unexpected(e.to_string()))?;
            }
            fs::write(&path, content).map_err(|e| SyncError::Unexpected(e.to_string()))?;
        }
        Ok(())
    }
}

fn top_level(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .map(|entries| {
            entries
                .filter_map(Result::ok)
                .map(|e| e.file_name().to_string_lossy().into_owned())
                .filter(|name| name != METADATA_DIR)
                .collect()
        })
        .unwrap_or_default();
    names.sort();
    names
}

impl CommandRunner for ScriptedRunner {
    fn run(&self, command: &GitCommand) -> Result<CommandOutput, SyncError> {
        let subcommand = command.subcommand().unwrap_or_default().to_string();
        self.calls.lock().unwrap().push(Call {
            args: command.args().to_vec(),
            cwd: command.cwd().map(Path::to_path_buf),
            authenticated: command.credential().is_some(),
        });
        if let Some(cwd) = command.cwd() {
            self.snapshots
                .lock()
                .unwrap()
                .insert(subcommand.clone(), top_level(cwd));
        }

        if self.panic_on.as_deref() == Some(subcommand.as_str()) {
            panic!("scripted panic in git {subcommand}");
        }
        if let Some(stderr) = self.failures.get(&subcommand) {
            return Err(SyncError::Tool {
                command: command.display(),
                code: Some(128),
                stdout: String::new(),
                stderr: stderr.clone(),
            });
        }

        let mut output = CommandOutput {
            exit_code: Some(0),
            ..CommandOutput::default()
        };
        match subcommand.as_str() {
            "clone" => {
                let dest = command
                    .args()
                    .last()
                    .map(PathBuf::from)
                    .ok_or_else(|| SyncError::Unexpected("clone without destination".into()))?;
                self.fake_clone(&dest)?;
            }
            "status" => output.stdout = self.status.clone(),
            _ => {}
        }
        Ok(output)
    }
}
