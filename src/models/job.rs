//! Job records and job status.
//!
//! `JobStatus` is closed over the four states the provider reports today but
//! keeps any other literal in `Unknown` so that derivations never drop or
//! reject a record just because its status is new.

use std::fmt;
use std::num::NonZeroU32;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Formats accepted by [`Job::submitted_at`], tried in order.
const SUBMITTED_FORMATS: &[&str] = &["%Y-%m-%d %H:%M", "%Y-%m-%d %H:%M:%S"];

/// Status of a submitted job.
///
/// Serialized as the lowercase literal (`"running"`, `"waiting"`, ...).
/// Any other string round-trips verbatim through `Unknown`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum JobStatus {
    Running,
    Waiting,
    Finished,
    Failed,
    Unknown(String),
}

impl JobStatus {
    /// The statuses offered by the status filter, in display order.
    pub const KNOWN: [JobStatus; 4] = [
        JobStatus::Running,
        JobStatus::Waiting,
        JobStatus::Finished,
        JobStatus::Failed,
    ];

    /// Parse a status literal. Never fails: unrecognized input becomes `Unknown`.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s {
            "running" => Self::Running,
            "waiting" => Self::Waiting,
            "finished" => Self::Finished,
            "failed" => Self::Failed,
            other => Self::Unknown(other.to_string()),
        }
    }

    /// The literal status string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Running => "running",
            Self::Waiting => "waiting",
            Self::Finished => "finished",
            Self::Failed => "failed",
            Self::Unknown(s) => s,
        }
    }

    /// Human label used by summary cards and filter menus.
    #[must_use]
    pub fn label(&self) -> &str {
        match self {
            Self::Running => "Running",
            Self::Waiting => "Waiting",
            Self::Finished => "Finished",
            Self::Failed => "Failed",
            Self::Unknown(s) => s,
        }
    }

    /// Finished and failed jobs carry a duration; the others do not.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Finished | Self::Failed)
    }
}

impl From<String> for JobStatus {
    fn from(s: String) -> Self {
        Self::parse(&s)
    }
}

impl From<JobStatus> for String {
    fn from(status: JobStatus) -> Self {
        match status {
            JobStatus::Unknown(s) => s,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One submitted unit of work.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    /// Stable unique identifier, e.g. `QJ-1001`.
    pub id: String,
    pub status: JobStatus,
    /// Name of the backend the job was submitted to. Not checked against the
    /// backend list; dangling references are allowed.
    pub backend: String,
    /// Submission time as supplied by the source (`YYYY-MM-DD HH:MM`).
    pub created: String,
    /// Present once the job has finished or failed.
    #[serde(default)]
    pub duration: Option<String>,
    pub shots: NonZeroU32,
}

impl Job {
    /// Parse `created` into a timestamp, if it is in a recognized format.
    ///
    /// Accepts `YYYY-MM-DD HH:MM`, `YYYY-MM-DD HH:MM:SS` and RFC 3339.
    #[must_use]
    pub fn submitted_at(&self) -> Option<NaiveDateTime> {
        let raw = self.created.trim();
        SUBMITTED_FORMATS
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
            .or_else(|| {
                chrono::DateTime::parse_from_rfc3339(raw)
                    .ok()
                    .map(|dt| dt.naive_local())
            })
    }

    /// Duration for on-screen display, with an em dash placeholder.
    #[must_use]
    pub fn duration_display(&self) -> &str {
        self.duration.as_deref().unwrap_or("—")
    }
}
