//! Job list export
//!
//! Export always covers the full job list of the current snapshot, never
//! just the filtered view. Encoding is pure; writing goes through a
//! [`FileSink`] so the encoders can be tested without touching the disk.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::models::Job;

/// Fixed CSV header row.
pub const CSV_HEADER: &str = "Job ID,Status,Backend,Submitted At,Duration,Shots";

/// CSV placeholder for a job without a duration.
pub const CSV_MISSING: &str = "-";

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("export of {filename} refused: {reason}")]
    Refused { filename: String, reason: String },
    #[error("failed to encode jobs as JSON: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Destination for exported bytes.
pub trait FileSink {
    /// Persist `bytes` under `filename`, returning where they ended up.
    fn save(&self, bytes: &[u8], filename: &str) -> Result<PathBuf, ExportError>;
}

/// Writes export files into a directory.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl FileSink for DirectorySink {
    fn save(&self, bytes: &[u8], filename: &str) -> Result<PathBuf, ExportError> {
        let path = self.dir.join(filename);
        std::fs::write(&path, bytes).map_err(|source| ExportError::Io {
            path: path.clone(),
            source,
        })?;
        Ok(path)
    }
}

/// Export file formats.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum ExportFormat {
    #[default]
    Csv,
    Json,
}

impl ExportFormat {
    #[must_use]
    pub fn filename(self) -> &'static str {
        match self {
            Self::Csv => "jobs.csv",
            Self::Json => "jobs.json",
        }
    }

    /// Encode the jobs in this format.
    pub fn encode(self, jobs: &[Job]) -> Result<Vec<u8>, ExportError> {
        match self {
            Self::Csv => Ok(jobs_to_csv(jobs)),
            Self::Json => jobs_to_json(jobs),
        }
    }
}

/// Encode jobs as CSV: the fixed header, then one row per job.
///
/// Lines are joined with `\n` and values are written unquoted, so ids or
/// backend names containing commas produce extra columns.
#[must_use]
pub fn jobs_to_csv(jobs: &[Job]) -> Vec<u8> {
    let mut lines = Vec::with_capacity(jobs.len() + 1);
    lines.push(CSV_HEADER.to_string());
    lines.extend(jobs.iter().map(csv_row));
    lines.join("\n").into_bytes()
}

fn csv_row(job: &Job) -> String {
    format!(
        "{},{},{},{},{},{}",
        job.id,
        job.status,
        job.backend,
        job.created,
        job.duration.as_deref().unwrap_or(CSV_MISSING),
        job.shots
    )
}

/// Encode jobs as a pretty-printed JSON array.
pub fn jobs_to_json(jobs: &[Job]) -> Result<Vec<u8>, ExportError> {
    Ok(serde_json::to_vec_pretty(jobs)?)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::models::JobStatus;
    use crate::source::DemoSource;
    use std::cell::RefCell;
    use std::num::NonZeroU32;

    /// Sink that keeps everything in memory.
    #[derive(Default)]
    pub(crate) struct MemorySink {
        pub(crate) saved: RefCell<Vec<(String, Vec<u8>)>>,
    }

    impl FileSink for MemorySink {
        fn save(&self, bytes: &[u8], filename: &str) -> Result<PathBuf, ExportError> {
            self.saved
                .borrow_mut()
                .push((filename.to_string(), bytes.to_vec()));
            Ok(PathBuf::from(filename))
        }
    }

    /// Sink that rejects every save.
    pub(crate) struct RefusingSink;

    impl FileSink for RefusingSink {
        fn save(&self, _bytes: &[u8], filename: &str) -> Result<PathBuf, ExportError> {
            Err(ExportError::Refused {
                filename: filename.to_string(),
                reason: "read-only".to_string(),
            })
        }
    }

    #[test]
    fn test_csv_single_running_job() {
        let job = Job {
            id: "QJ-1001".to_string(),
            status: JobStatus::Running,
            backend: "ibmq_manila".to_string(),
            created: "2025-09-09 10:00".to_string(),
            duration: None,
            shots: NonZeroU32::new(1024).unwrap(),
        };
        let csv = String::from_utf8(jobs_to_csv(&[job])).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(
            lines,
            vec![CSV_HEADER, "QJ-1001,running,ibmq_manila,2025-09-09 10:00,-,1024"]
        );
        assert!(!csv.ends_with('\n'));
    }

    #[test]
    fn test_csv_empty_is_header_only() {
        assert_eq!(jobs_to_csv(&[]), CSV_HEADER.as_bytes());
    }

    #[test]
    fn test_csv_keeps_duration_and_unknown_status() {
        let mut jobs = DemoSource::jobs();
        jobs[0].status = JobStatus::Unknown("queued".to_string());
        let csv = String::from_utf8(jobs_to_csv(&jobs)).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 6);
        assert!(lines[1].starts_with("QJ-1001,queued,"));
        assert_eq!(lines[3], "QJ-1003,finished,ibmq_montreal,2025-09-09 09:50,2m 10s,2048");
    }

    #[test]
    fn test_json_export_roundtrips_jobs() {
        let jobs = DemoSource::jobs();
        let bytes = jobs_to_json(&jobs).unwrap();
        let parsed: Vec<Job> = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(parsed, jobs);
    }

    #[test]
    fn test_format_filenames() {
        assert_eq!(ExportFormat::Csv.filename(), "jobs.csv");
        assert_eq!(ExportFormat::Json.filename(), "jobs.json");
    }

    #[test]
    fn test_directory_sink_writes_file() {
        let dir = std::env::temp_dir().join(format!("qdash_export_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let sink = DirectorySink::new(&dir);

        let path = sink.save(b"hello", "jobs.csv").unwrap();
        assert_eq!(path, dir.join("jobs.csv"));
        assert_eq!(std::fs::read(&path).unwrap(), b"hello");
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_directory_sink_missing_dir_fails() {
        let sink = DirectorySink::new("/nonexistent/qdash/export");
        let err = sink.save(b"x", "jobs.csv").unwrap_err();
        assert!(matches!(err, ExportError::Io { .. }));
        assert!(err.to_string().contains("jobs.csv"));
    }
}
