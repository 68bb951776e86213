//! Backend (compute resource) records.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Operational status of a backend.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum BackendStatus {
    Online,
    Maintenance,
    Offline,
    Unknown(String),
}

impl BackendStatus {
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s {
            "online" => Self::Online,
            "maintenance" => Self::Maintenance,
            "offline" => Self::Offline,
            other => Self::Unknown(other.to_string()),
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Online => "online",
            Self::Maintenance => "maintenance",
            Self::Offline => "offline",
            Self::Unknown(s) => s,
        }
    }

    #[must_use]
    pub fn is_online(&self) -> bool {
        matches!(self, Self::Online)
    }
}

impl From<String> for BackendStatus {
    fn from(s: String) -> Self {
        Self::parse(&s)
    }
}

impl From<BackendStatus> for String {
    fn from(status: BackendStatus) -> Self {
        match status {
            BackendStatus::Unknown(s) => s,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for BackendStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One compute resource jobs can be submitted to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Backend {
    /// Unique backend name, e.g. `ibmq_manila`.
    pub name: String,
    pub status: BackendStatus,
    /// Number of jobs waiting on this backend.
    pub queue: u32,
    /// Average job time in seconds; absent when the backend cannot be queried.
    #[serde(default)]
    pub avg_time: Option<f64>,
    /// Uptime percentage in [0, 100].
    pub uptime: f64,
    /// Error rate in [0, 1]; absent when not measurable.
    #[serde(default)]
    pub error_rate: Option<f64>,
}

impl Backend {
    /// Error rate as a percentage, if measured.
    #[must_use]
    pub fn error_rate_percent(&self) -> Option<f64> {
        self.error_rate.map(|r| r * 100.0)
    }
}
