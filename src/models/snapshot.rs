//! Immutable snapshots of the job and backend lists.
//!
//! A snapshot is built once, validated, and then only ever replaced as a
//! whole. Readers holding an older snapshot keep a consistent
//! (jobs, backends) pair from the same capture.

use std::collections::HashSet;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{Backend, Job};

/// One pre-aggregated bucket of the job trend chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendPoint {
    /// Bucket label, e.g. `09:30`.
    pub time: String,
    pub running: u32,
    pub finished: u32,
    pub failed: u32,
}

/// A snapshot violated one of its uniqueness invariants.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SnapshotError {
    #[error("duplicate job id '{0}'")]
    DuplicateJob(String),
    #[error("duplicate backend name '{0}'")]
    DuplicateBackend(String),
}

/// Jobs, backends and trend buckets captured at one instant.
#[derive(Debug, Clone)]
pub struct Snapshot {
    jobs: Vec<Job>,
    backends: Vec<Backend>,
    trends: Vec<TrendPoint>,
    captured_at: DateTime<Local>,
}

impl Snapshot {
    /// Build a snapshot, rejecting duplicate job ids or backend names.
    pub fn new(
        jobs: Vec<Job>,
        backends: Vec<Backend>,
        trends: Vec<TrendPoint>,
        captured_at: DateTime<Local>,
    ) -> Result<Self, SnapshotError> {
        let mut seen = HashSet::with_capacity(jobs.len());
        if let Some(dup) = jobs.iter().find(|j| !seen.insert(j.id.as_str())) {
            return Err(SnapshotError::DuplicateJob(dup.id.clone()));
        }

        let mut seen = HashSet::with_capacity(backends.len());
        if let Some(dup) = backends.iter().find(|b| !seen.insert(b.name.as_str())) {
            return Err(SnapshotError::DuplicateBackend(dup.name.clone()));
        }

        Ok(Self {
            jobs,
            backends,
            trends,
            captured_at,
        })
    }

    /// A snapshot with no records, used before the first successful load.
    #[must_use]
    pub fn empty(captured_at: DateTime<Local>) -> Self {
        Self {
            jobs: Vec::new(),
            backends: Vec::new(),
            trends: Vec::new(),
            captured_at,
        }
    }

    #[must_use]
    pub fn jobs(&self) -> &[Job] {
        &self.jobs
    }

    #[must_use]
    pub fn backends(&self) -> &[Backend] {
        &self.backends
    }

    #[must_use]
    pub fn trends(&self) -> &[TrendPoint] {
        &self.trends
    }

    #[must_use]
    pub fn captured_at(&self) -> DateTime<Local> {
        self.captured_at
    }

    /// Look up a job by id.
    #[must_use]
    pub fn job(&self, id: &str) -> Option<&Job> {
        self.jobs.iter().find(|j| j.id == id)
    }
}

/// On-disk JSON shape of a snapshot: `{"jobs": [...], "backends": [...], "trends": [...]}`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SnapshotDocument {
    pub jobs: Vec<Job>,
    pub backends: Vec<Backend>,
    #[serde(default)]
    pub trends: Vec<TrendPoint>,
}

impl SnapshotDocument {
    /// Validate the document and stamp it with its capture time.
    pub fn into_snapshot(self, captured_at: DateTime<Local>) -> Result<Snapshot, SnapshotError> {
        Snapshot::new(self.jobs, self.backends, self.trends, captured_at)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BackendStatus, JobStatus};
    use std::num::NonZeroU32;

    fn job(id: &str) -> Job {
        Job {
            id: id.to_string(),
            status: JobStatus::Running,
            backend: "ibmq_manila".to_string(),
            created: "2025-09-09 10:00".to_string(),
            duration: None,
            shots: NonZeroU32::new(256).unwrap(),
        }
    }

    fn backend(name: &str) -> Backend {
        Backend {
            name: name.to_string(),
            status: BackendStatus::Online,
            queue: 1,
            avg_time: Some(40.0),
            uptime: 99.0,
            error_rate: Some(0.01),
        }
    }

    #[test]
    fn test_snapshot_rejects_duplicate_job() {
        let result = Snapshot::new(vec![job("QJ-1"), job("QJ-1")], vec![], vec![], Local::now());
        assert_eq!(
            result.unwrap_err(),
            SnapshotError::DuplicateJob("QJ-1".to_string())
        );
    }

    #[test]
    fn test_snapshot_rejects_duplicate_backend() {
        let result = Snapshot::new(vec![], vec![backend("a"), backend("a")], vec![], Local::now());
        assert_eq!(
            result.unwrap_err(),
            SnapshotError::DuplicateBackend("a".to_string())
        );
    }

    #[test]
    fn test_snapshot_preserves_order_and_lookup() {
        let snap = Snapshot::new(
            vec![job("QJ-2"), job("QJ-1")],
            vec![backend("b"), backend("a")],
            vec![],
            Local::now(),
        )
        .unwrap();
        assert_eq!(snap.jobs()[0].id, "QJ-2");
        assert_eq!(snap.backends()[1].name, "a");
        assert!(snap.job("QJ-1").is_some());
        assert!(snap.job("QJ-9").is_none());
    }

    #[test]
    fn test_document_trends_default_to_empty() {
        let doc: SnapshotDocument = serde_json::from_str(r#"{"jobs":[],"backends":[]}"#).unwrap();
        let snap = doc.into_snapshot(Local::now()).unwrap();
        assert!(snap.trends().is_empty());
    }
}
