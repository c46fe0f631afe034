//! # gitloader-sync
//!
//! The synchronization engine: push a local folder into a remote git
//! repository through a disposable scratch checkout, or clone a remote.
//!
//! Build an [`Engine`] from an [`EngineConfig`], then either call
//! [`Engine::sync`] on a thread that may block, or hand the request to
//! [`spawn_sync`] and drain the returned [`SyncHandle`] from async code.

pub mod background;
pub mod clone;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod reconcile;
pub mod reporter;
pub mod runner;
pub mod staging;

#[cfg(test)]
mod testing;

pub use background::{spawn_clone, spawn_sync, CloneHandle, SyncHandle};
pub use config::{EngineConfig, StagingLayout};
pub use error::SyncError;
pub use pipeline::Engine;
pub use reconcile::ReconcileReport;
pub use reporter::{ChannelReporter, MemoryReporter, NullReporter, StatusReporter};
pub use runner::{CommandOutput, CommandRunner, Credential, GitCli, GitCommand};
pub use staging::{StagingArea, StagingManager};
