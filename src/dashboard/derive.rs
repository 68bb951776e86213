//! Derivation engine
//!
//! Pure functions from snapshot contents to view artifacts: status counts,
//! chart series, summary cards and the busiest backend. Every function
//! returns a well-defined empty result for empty input.

use serde::Serialize;

use crate::models::{Backend, Job, JobStatus, TrendPoint};

/// Occurrences of each distinct job status, in order of first occurrence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusCounts {
    entries: Vec<(JobStatus, usize)>,
}

impl StatusCounts {
    /// Count for a status, 0 when absent.
    #[must_use]
    pub fn get(&self, status: &JobStatus) -> usize {
        self.entries
            .iter()
            .find(|(s, _)| s == status)
            .map_or(0, |(_, n)| *n)
    }

    /// Sum of all counts; equals the number of jobs counted.
    #[must_use]
    pub fn total(&self) -> usize {
        self.entries.iter().map(|(_, n)| n).sum()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&JobStatus, usize)> {
        self.entries.iter().map(|(s, n)| (s, *n))
    }
}

/// One `{label, value}` pair fed to a chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SeriesPoint {
    pub label: String,
    pub value: u64,
}

/// Values for the summary cards.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct JobSummary {
    pub total: usize,
    pub running: usize,
    pub waiting: usize,
    pub finished: usize,
    pub failed: usize,
}

impl JobSummary {
    /// Jobs whose status is not one of the four known ones.
    #[must_use]
    pub fn other(&self) -> usize {
        self.total - (self.running + self.waiting + self.finished + self.failed)
    }
}

/// Count jobs per status. Unknown statuses are counted under their literal.
#[must_use]
pub fn status_counts(jobs: &[Job]) -> StatusCounts {
    let mut entries: Vec<(JobStatus, usize)> = Vec::new();
    for job in jobs {
        match entries.iter_mut().find(|(s, _)| *s == job.status) {
            Some((_, n)) => *n += 1,
            None => entries.push((job.status.clone(), 1)),
        }
    }
    StatusCounts { entries }
}

/// Pie chart series: one point per distinct status, first occurrence first.
#[must_use]
pub fn pie_series(jobs: &[Job]) -> Vec<SeriesPoint> {
    status_counts(jobs)
        .iter()
        .map(|(status, n)| SeriesPoint {
            label: status.as_str().to_string(),
            value: n as u64,
        })
        .collect()
}

/// Bar chart series: one point per backend with its queue depth.
#[must_use]
pub fn bar_series(backends: &[Backend]) -> Vec<SeriesPoint> {
    backends
        .iter()
        .map(|b| SeriesPoint {
            label: b.name.clone(),
            value: u64::from(b.queue),
        })
        .collect()
}

/// Backend with the deepest queue. On ties the first one in sequence wins.
#[must_use]
pub fn busiest_backend(backends: &[Backend]) -> Option<&Backend> {
    backends.iter().fold(None, |best: Option<&Backend>, b| match best {
        Some(current) if current.queue >= b.queue => Some(current),
        _ => Some(b),
    })
}

/// Trend buckets are pre-aggregated by the source and passed through as-is.
#[must_use]
pub fn trend_series(trends: &[TrendPoint]) -> &[TrendPoint] {
    trends
}

#[must_use]
pub fn job_summary(jobs: &[Job]) -> JobSummary {
    let counts = status_counts(jobs);
    JobSummary {
        total: counts.total(),
        running: counts.get(&JobStatus::Running),
        waiting: counts.get(&JobStatus::Waiting),
        finished: counts.get(&JobStatus::Finished),
        failed: counts.get(&JobStatus::Failed),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::BackendStatus;
    use crate::source::DemoSource;
    use std::num::NonZeroU32;

    fn job(id: &str, status: &str) -> Job {
        Job {
            id: id.to_string(),
            status: JobStatus::parse(status),
            backend: "ibmq_qasm".to_string(),
            created: "2025-09-09 10:00".to_string(),
            duration: None,
            shots: NonZeroU32::new(100).unwrap(),
        }
    }

    fn backend(name: &str, queue: u32) -> Backend {
        Backend {
            name: name.to_string(),
            status: BackendStatus::Online,
            queue,
            avg_time: None,
            uptime: 99.0,
            error_rate: None,
        }
    }

    #[test]
    fn test_status_counts_sum_equals_job_count() {
        let cases: Vec<Vec<Job>> = vec![
            vec![],
            DemoSource::jobs(),
            vec![job("a", "failed"), job("b", "failed"), job("c", "queued")],
        ];
        for jobs in cases {
            assert_eq!(status_counts(&jobs).total(), jobs.len());
        }
    }

    #[test]
    fn test_status_counts_empty() {
        let counts = status_counts(&[]);
        assert!(counts.is_empty());
        assert_eq!(counts.get(&JobStatus::Running), 0);
    }

    #[test]
    fn test_status_counts_keeps_unknown_literal() {
        let counts = status_counts(&[job("a", "queued"), job("b", "running"), job("c", "queued")]);
        assert_eq!(counts.get(&JobStatus::Unknown("queued".to_string())), 2);
        assert_eq!(counts.get(&JobStatus::Running), 1);
    }

    #[test]
    fn test_pie_series_first_occurrence_order() {
        let jobs = vec![
            job("a", "waiting"),
            job("b", "failed"),
            job("c", "waiting"),
            job("d", "cancelled"),
        ];
        let series = pie_series(&jobs);
        let labels: Vec<&str> = series.iter().map(|p| p.label.as_str()).collect();
        assert_eq!(labels, vec!["waiting", "failed", "cancelled"]);
        assert_eq!(series[0].value, 2);
    }

    #[test]
    fn test_bar_series_follows_backend_order() {
        assert!(bar_series(&[]).is_empty());
        let series = bar_series(&DemoSource::backends());
        assert_eq!(series.len(), 4);
        assert_eq!(series[1], SeriesPoint { label: "ibmq_qasm".to_string(), value: 12 });
        assert_eq!(series[3].value, 0);
    }

    #[test]
    fn test_busiest_backend_empty_and_single() {
        assert!(busiest_backend(&[]).is_none());
        let only = vec![backend("solo", 0)];
        assert_eq!(busiest_backend(&only).map(|b| b.name.as_str()), Some("solo"));
    }

    #[test]
    fn test_busiest_backend_first_wins_ties() {
        let backends = vec![backend("a", 3), backend("b", 7), backend("c", 7), backend("d", 1)];
        assert_eq!(busiest_backend(&backends).map(|b| b.name.as_str()), Some("b"));

        let tied = vec![backend("x", 4), backend("y", 4)];
        assert_eq!(busiest_backend(&tied).map(|b| b.name.as_str()), Some("x"));
    }

    #[test]
    fn test_busiest_backend_demo_data() {
        let backends = DemoSource::backends();
        assert_eq!(busiest_backend(&backends).map(|b| b.name.as_str()), Some("ibmq_qasm"));
    }

    #[test]
    fn test_trend_series_passthrough() {
        let trends = DemoSource::trends();
        assert_eq!(trend_series(&trends), trends.as_slice());
    }

    #[test]
    fn test_job_summary() {
        let summary = job_summary(&DemoSource::jobs());
        assert_eq!(
            summary,
            JobSummary { total: 5, running: 1, waiting: 1, finished: 2, failed: 1 }
        );
        assert_eq!(summary.other(), 0);

        let summary = job_summary(&[job("a", "queued")]);
        assert_eq!(summary.total, 1);
        assert_eq!(summary.other(), 1);
    }
}
