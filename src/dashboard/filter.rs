//! Job filtering for the table view
//!
//! A job is shown when it passes both the status filter and the id search:
//! - Status filter: `all`, or an exact status match
//! - Search: case-insensitive substring of the job id; empty matches everything
//!
//! Filtering is stable: surviving jobs keep their relative order.

use std::fmt;
use std::str::FromStr;

use crate::models::{Job, JobStatus};

/// Status filter applied to the job table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum StatusFilter {
    #[default]
    All,
    Only(JobStatus),
}

impl StatusFilter {
    /// Parse a filter value. `all` or empty means no filtering; anything
    /// else is a status literal. Known statuses match in any case.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        let s = s.trim();
        if s.is_empty() || s.eq_ignore_ascii_case("all") {
            return Self::All;
        }
        let known = JobStatus::KNOWN
            .iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s));
        match known {
            Some(status) => Self::Only(status.clone()),
            None => Self::Only(JobStatus::parse(s)),
        }
    }

    /// Step through all, running, waiting, finished, failed and back to all.
    /// A filter on an unknown status steps back to all.
    #[must_use]
    pub fn cycle(&self) -> Self {
        match self {
            Self::All => Self::Only(JobStatus::Running),
            Self::Only(current) => {
                let pos = JobStatus::KNOWN.iter().position(|s| s == current);
                match pos.and_then(|i| JobStatus::KNOWN.get(i + 1)) {
                    Some(next) => Self::Only(next.clone()),
                    None => Self::All,
                }
            }
        }
    }

    #[must_use]
    pub fn label(&self) -> &str {
        match self {
            Self::All => "All",
            Self::Only(status) => status.label(),
        }
    }

    #[must_use]
    pub fn matches(&self, job: &Job) -> bool {
        match self {
            Self::All => true,
            Self::Only(status) => job.status == *status,
        }
    }
}

impl FromStr for StatusFilter {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("all"),
            Self::Only(status) => f.write_str(status.as_str()),
        }
    }
}

/// Case-insensitive substring match of `search` within the job id.
#[must_use]
pub fn id_matches(job: &Job, search: &str) -> bool {
    id_contains(job, &search.to_lowercase())
}

/// `needle` must already be lowercase
fn id_contains(job: &Job, needle: &str) -> bool {
    needle.is_empty() || job.id.to_lowercase().contains(needle)
}

/// Jobs passing both the status filter and the id search, in input order.
#[must_use]
pub fn filter_jobs<'a>(jobs: &'a [Job], filter: &StatusFilter, search: &str) -> Vec<&'a Job> {
    let needle = search.to_lowercase();
    jobs.iter()
        .filter(|job| filter.matches(job))
        .filter(|job| id_contains(job, &needle))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::DemoSource;

    fn ids<'a>(jobs: &[&'a Job]) -> Vec<&'a str> {
        jobs.iter().map(|j| j.id.as_str()).collect()
    }

    #[test]
    fn test_all_with_empty_search_is_identity() {
        let jobs = DemoSource::jobs();
        let visible = filter_jobs(&jobs, &StatusFilter::All, "");
        assert_eq!(visible.len(), jobs.len());
        assert!(visible.iter().zip(jobs.iter()).all(|(a, b)| *a == b));
    }

    #[test]
    fn test_status_filter_keeps_order() {
        let mut jobs = DemoSource::jobs();
        let mut extra = jobs[4].clone();
        extra.id = "QJ-0999".to_string();
        jobs.insert(1, extra);

        let visible = filter_jobs(&jobs, &StatusFilter::Only(JobStatus::Failed), "");
        assert_eq!(ids(&visible), vec!["QJ-0999", "QJ-1005"]);
    }

    #[test]
    fn test_search_by_id_fragment() {
        let jobs = DemoSource::jobs();
        let visible = filter_jobs(&jobs, &StatusFilter::All, "1003");
        assert_eq!(ids(&visible), vec!["QJ-1003"]);
    }

    #[test]
    fn test_search_is_case_insensitive() {
        let jobs = DemoSource::jobs();
        assert_eq!(filter_jobs(&jobs, &StatusFilter::All, "qj-100").len(), 5);
        assert!(id_matches(&jobs[0], "qj-1001"));
        assert!(!id_matches(&jobs[0], "manila"));
    }

    #[test]
    fn test_filter_and_search_are_anded() {
        let jobs = DemoSource::jobs();
        let finished = StatusFilter::Only(JobStatus::Finished);
        assert_eq!(ids(&filter_jobs(&jobs, &finished, "1004")), vec!["QJ-1004"]);
        assert!(filter_jobs(&jobs, &finished, "1001").is_empty());
        assert!(filter_jobs(&[], &finished, "").is_empty());
    }

    #[test]
    fn test_parse_filter() {
        assert_eq!(StatusFilter::parse("all"), StatusFilter::All);
        assert_eq!(StatusFilter::parse(" ALL "), StatusFilter::All);
        assert_eq!(StatusFilter::parse(""), StatusFilter::All);
        assert_eq!(
            StatusFilter::parse("waiting"),
            StatusFilter::Only(JobStatus::Waiting)
        );
        assert_eq!(
            "queued".parse::<StatusFilter>().unwrap(),
            StatusFilter::Only(JobStatus::Unknown("queued".to_string()))
        );
    }

    #[test]
    fn test_parse_known_status_in_any_case() {
        assert_eq!(
            StatusFilter::parse("Running"),
            StatusFilter::Only(JobStatus::Running)
        );
        assert_eq!(
            StatusFilter::parse(" FAILED "),
            StatusFilter::Only(JobStatus::Failed)
        );

        let jobs = DemoSource::jobs();
        let running = filter_jobs(&jobs, &StatusFilter::parse("Running"), "");
        assert_eq!(running.len(), 1);
        assert_eq!(running[0].status, JobStatus::Running);

        // Unknown literals keep their spelling
        assert_eq!(
            StatusFilter::parse("Queued"),
            StatusFilter::Only(JobStatus::Unknown("Queued".to_string()))
        );
    }

    #[test]
    fn test_filter_search_agrees_with_id_matches() {
        let jobs = DemoSource::jobs();
        for search in ["", "qj", "QJ-100", "1005", "Q", "manila", "J-10"] {
            let expected: Vec<&str> = jobs
                .iter()
                .filter(|job| id_matches(job, search))
                .map(|job| job.id.as_str())
                .collect();
            assert_eq!(
                ids(&filter_jobs(&jobs, &StatusFilter::All, search)),
                expected,
                "search {:?}",
                search
            );
        }
    }

    #[test]
    fn test_cycle_order() {
        let mut filter = StatusFilter::All;
        let mut seen = Vec::new();
        for _ in 0..5 {
            filter = filter.cycle();
            seen.push(filter.to_string());
        }
        assert_eq!(seen, vec!["running", "waiting", "finished", "failed", "all"]);

        let unknown = StatusFilter::Only(JobStatus::Unknown("queued".to_string()));
        assert_eq!(unknown.cycle(), StatusFilter::All);
    }
}
