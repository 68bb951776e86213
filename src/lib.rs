//! qdash - quantum job and backend dashboard core
//!
//! The library holds the record store, derivations, filtering, export and
//! refresh clock. The `qdash` binary layers a CLI and a terminal dashboard
//! on top of [`dashboard::Dashboard`].

pub mod dashboard;
pub mod formatting;
pub mod models;
pub mod source;

pub use dashboard::Dashboard;
pub use source::{DemoSource, FetchError, JsonFileSource, SnapshotSource};
