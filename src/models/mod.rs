//! Data models for jobs, backends and snapshots.
//!
//! This module provides the record types the dashboard aggregates over,
//! the snapshot that groups them, and the configuration types.

mod backend;
mod config;
mod job;
mod snapshot;

pub use backend::{Backend, BackendStatus};
pub use config::{
    ConfigError, DashboardConfig, DisplayConfig, ExportConfig, RefreshConfig, SourceConfig,
    DEFAULT_REFRESH_SECS,
};
pub use job::{Job, JobStatus};
pub use snapshot::{Snapshot, SnapshotDocument, SnapshotError, TrendPoint};
