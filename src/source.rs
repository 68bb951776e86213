//! Snapshot sources
//!
//! A source supplies a fresh (jobs, backends, trends) snapshot on demand.
//! The dashboard depends only on [`SnapshotSource`]; the built-in demo data
//! set and a JSON file re-read on every fetch are provided here.

use std::num::NonZeroU32;
use std::path::{Path, PathBuf};

use chrono::Local;
use thiserror::Error;

use crate::models::{
    Backend, BackendStatus, Job, JobStatus, Snapshot, SnapshotDocument, SnapshotError, TrendPoint,
};

/// A snapshot could not be fetched.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("could not read snapshot '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("could not parse snapshot '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid snapshot: {0}")]
    Invalid(#[from] SnapshotError),
    #[error("fetch worker failed: {0}")]
    Worker(String),
}

/// Anything that can produce a snapshot on demand.
pub trait SnapshotSource: Send + Sync {
    /// Fetch a complete, validated snapshot.
    fn fetch_snapshot(&self) -> Result<Snapshot, FetchError>;

    /// Short description for status lines and logs.
    fn describe(&self) -> String;
}

/// The built-in demo data set.
#[derive(Debug, Clone, Copy, Default)]
pub struct DemoSource;

impl DemoSource {
    #[must_use]
    pub fn jobs() -> Vec<Job> {
        let job = |id: &str, status: JobStatus, backend: &str, created: &str, duration: Option<&str>, shots: u32| Job {
            id: id.to_string(),
            status,
            backend: backend.to_string(),
            created: created.to_string(),
            duration: duration.map(str::to_string),
            shots: NonZeroU32::new(shots).unwrap_or(NonZeroU32::MIN),
        };

        vec![
            job("QJ-1001", JobStatus::Running, "ibmq_manila", "2025-09-09 10:00", None, 1024),
            job("QJ-1002", JobStatus::Waiting, "ibmq_qasm", "2025-09-09 10:05", None, 512),
            job("QJ-1003", JobStatus::Finished, "ibmq_montreal", "2025-09-09 09:50", Some("2m 10s"), 2048),
            job("QJ-1004", JobStatus::Finished, "ibmq_montreal", "2025-09-09 09:30", Some("1m 34s"), 1024),
            job("QJ-1005", JobStatus::Failed, "ibmq_toronto", "2025-09-09 09:20", Some("30s"), 256),
        ]
    }

    #[must_use]
    pub fn backends() -> Vec<Backend> {
        let backend = |name: &str, status: BackendStatus, queue: u32, avg_time: Option<f64>, uptime: f64, error_rate: Option<f64>| Backend {
            name: name.to_string(),
            status,
            queue,
            avg_time,
            uptime,
            error_rate,
        };

        vec![
            backend("ibmq_manila", BackendStatus::Online, 5, Some(45.0), 99.5, Some(0.02)),
            backend("ibmq_qasm", BackendStatus::Online, 12, Some(60.0), 97.8, Some(0.05)),
            backend("ibmq_montreal", BackendStatus::Online, 3, Some(38.0), 98.2, Some(0.03)),
            backend("ibmq_toronto", BackendStatus::Maintenance, 0, None, 92.1, None),
        ]
    }

    #[must_use]
    pub fn trends() -> Vec<TrendPoint> {
        let point = |time: &str, running, finished, failed| TrendPoint {
            time: time.to_string(),
            running,
            finished,
            failed,
        };

        vec![
            point("09:00", 2, 3, 1),
            point("09:30", 1, 4, 1),
            point("10:00", 3, 5, 1),
        ]
    }
}

impl SnapshotSource for DemoSource {
    fn fetch_snapshot(&self) -> Result<Snapshot, FetchError> {
        Ok(Snapshot::new(
            Self::jobs(),
            Self::backends(),
            Self::trends(),
            Local::now(),
        )?)
    }

    fn describe(&self) -> String {
        "demo data".to_string()
    }
}

/// Reads a JSON snapshot document from disk on every fetch.
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SnapshotSource for JsonFileSource {
    fn fetch_snapshot(&self) -> Result<Snapshot, FetchError> {
        let content = std::fs::read_to_string(&self.path).map_err(|source| FetchError::Io {
            path: self.path.clone(),
            source,
        })?;

        let document: SnapshotDocument =
            serde_json::from_str(&content).map_err(|source| FetchError::Parse {
                path: self.path.clone(),
                source,
            })?;

        tracing::debug!(
            path = %self.path.display(),
            jobs = document.jobs.len(),
            backends = document.backends.len(),
            "Read snapshot document"
        );

        Ok(document.into_snapshot(Local::now())?)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("qdash_source_{}_{}.json", name, std::process::id()))
    }

    #[test]
    fn test_demo_source_shape() {
        let snap = DemoSource.fetch_snapshot().unwrap();
        assert_eq!(snap.jobs().len(), 5);
        assert_eq!(snap.backends().len(), 4);
        assert_eq!(snap.trends().len(), 3);
        assert_eq!(snap.jobs()[0].id, "QJ-1001");
    }

    #[test]
    fn test_json_file_source_reads_document() {
        let path = temp_path("ok");
        let doc = SnapshotDocument {
            jobs: DemoSource::jobs(),
            backends: DemoSource::backends(),
            trends: vec![],
        };
        std::fs::write(&path, serde_json::to_string(&doc).unwrap()).unwrap();

        let snap = JsonFileSource::new(&path).fetch_snapshot().unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(snap.jobs(), DemoSource::jobs().as_slice());
        assert_eq!(snap.backends()[3].status, BackendStatus::Maintenance);
    }

    #[test]
    fn test_json_file_source_missing_file() {
        let err = JsonFileSource::new("/nonexistent/qdash.json")
            .fetch_snapshot()
            .unwrap_err();
        assert!(matches!(err, FetchError::Io { .. }));
    }

    #[test]
    fn test_json_file_source_bad_json() {
        let path = temp_path("bad");
        std::fs::write(&path, "{\"jobs\": [").unwrap();
        let err = JsonFileSource::new(&path).fetch_snapshot().unwrap_err();
        std::fs::remove_file(&path).ok();
        assert!(matches!(err, FetchError::Parse { .. }));
    }

    #[test]
    fn test_json_file_source_duplicate_ids() {
        let path = temp_path("dup");
        let mut jobs = DemoSource::jobs();
        jobs.push(jobs[0].clone());
        let doc = SnapshotDocument {
            jobs,
            backends: vec![],
            trends: vec![],
        };
        std::fs::write(&path, serde_json::to_string(&doc).unwrap()).unwrap();
        let err = JsonFileSource::new(&path).fetch_snapshot().unwrap_err();
        std::fs::remove_file(&path).ok();
        assert!(matches!(err, FetchError::Invalid(SnapshotError::DuplicateJob(_))));
    }
}
