//! Infrastructure layer: snapshot files and configuration.

pub mod config;
pub mod snapshot;

pub use config::{AppConfig, ConfigError};
pub use snapshot::{Snapshot, SnapshotError, read_snapshot, write_snapshot};
