//! Dashboard controller
//!
//! `Dashboard` is the single owner of mutable dashboard state: the record
//! store, the view state (search, status filter, selection), the refresh
//! clock and the warnings collected along the way. Every derived view is
//! recomputed from the current snapshot on each call.

pub mod clock;
pub mod derive;
pub mod export;
pub mod filter;
pub mod selection;
pub mod store;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Local};

use crate::models::{Backend, Job, Snapshot, TrendPoint};
use crate::source::{FetchError, SnapshotSource};

pub use clock::{
    ManualScheduler, RefreshClock, RefreshPhase, Scheduler, TickCallback, TimerHandle,
    TokioScheduler,
};
pub use derive::{JobSummary, SeriesPoint, StatusCounts};
pub use export::{DirectorySink, ExportError, ExportFormat, FileSink};
pub use filter::StatusFilter;
pub use selection::{Selection, SelectionError};
pub use store::RecordStore;

/// Oldest warnings are dropped beyond this many.
const MAX_WARNINGS: usize = 16;

/// Ephemeral per-session view state.
#[derive(Debug, Clone, Default)]
pub struct ViewState {
    pub search: String,
    pub filter: StatusFilter,
    pub selection: Selection,
}

/// Result of a refresh attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// A new snapshot was installed.
    Replaced,
    /// A refresh was already in flight; nothing happened.
    Coalesced,
    /// The fetch failed; the previous snapshot is still shown.
    Failed(String),
}

/// Where an export went and how many jobs it contained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exported {
    pub path: PathBuf,
    pub jobs: usize,
}

pub struct Dashboard {
    source: Arc<dyn SnapshotSource>,
    store: RecordStore,
    view: ViewState,
    clock: RefreshClock,
    warnings: Vec<String>,
}

impl Dashboard {
    /// Create a dashboard and perform the initial load.
    ///
    /// A failed initial load is not fatal: the dashboard starts empty and
    /// records a warning.
    pub fn new(source: Arc<dyn SnapshotSource>, period: Duration) -> Self {
        let mut clock = RefreshClock::new(period);
        let mut warnings = Vec::new();

        let initial = match source.fetch_snapshot() {
            Ok(snapshot) => {
                clock.finish(snapshot.captured_at());
                tracing::info!(
                    source = %source.describe(),
                    jobs = snapshot.jobs().len(),
                    backends = snapshot.backends().len(),
                    "Loaded initial snapshot"
                );
                snapshot
            }
            Err(e) => {
                tracing::warn!(source = %source.describe(), "Initial snapshot load failed: {}", e);
                warnings.push(format!("Initial load failed: {}", e));
                Snapshot::empty(Local::now())
            }
        };

        Self {
            source,
            store: RecordStore::new(initial),
            view: ViewState::default(),
            clock,
            warnings,
        }
    }

    #[must_use]
    pub fn source(&self) -> Arc<dyn SnapshotSource> {
        Arc::clone(&self.source)
    }

    #[must_use]
    pub fn snapshot(&self) -> &Snapshot {
        self.store.snapshot()
    }

    /// Shared handle to the current snapshot, stable across later refreshes.
    #[must_use]
    pub fn current(&self) -> Arc<Snapshot> {
        self.store.current()
    }

    #[must_use]
    pub fn view(&self) -> &ViewState {
        &self.view
    }

    #[must_use]
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    pub fn clear_warnings(&mut self) {
        self.warnings.clear();
    }

    fn push_warning(&mut self, warning: String) {
        if self.warnings.len() >= MAX_WARNINGS {
            self.warnings.remove(0);
        }
        self.warnings.push(warning);
    }

    // ---- refresh ----

    /// Fetch and install a new snapshot synchronously.
    pub fn refresh(&mut self) -> RefreshOutcome {
        if !self.begin_refresh() {
            return RefreshOutcome::Coalesced;
        }
        let result = self.source.fetch_snapshot();
        self.complete_refresh(result)
    }

    /// Mark a refresh as in flight. Returns false if one already is.
    pub fn begin_refresh(&mut self) -> bool {
        let started = self.clock.begin();
        if !started {
            tracing::debug!("Refresh already in flight, coalescing");
        }
        started
    }

    /// Finish an in-flight refresh with the fetch result.
    ///
    /// Without a matching `begin_refresh` the result is dropped and the
    /// outcome is `Coalesced`.
    pub fn complete_refresh(&mut self, result: Result<Snapshot, FetchError>) -> RefreshOutcome {
        if self.clock.phase() == RefreshPhase::Idle {
            tracing::debug!("No refresh in flight, dropping fetch result");
            return RefreshOutcome::Coalesced;
        }
        match result {
            Ok(snapshot) => {
                let at = snapshot.captured_at();
                tracing::debug!(
                    jobs = snapshot.jobs().len(),
                    backends = snapshot.backends().len(),
                    "Snapshot replaced"
                );
                self.store.replace(snapshot);
                self.clock.finish(at);
                RefreshOutcome::Replaced
            }
            Err(e) => {
                tracing::warn!(source = %self.source.describe(), "Snapshot fetch failed: {}", e);
                let message = e.to_string();
                self.push_warning(format!("Refresh failed: {}", message));
                self.clock.abort();
                RefreshOutcome::Failed(message)
            }
        }
    }

    #[must_use]
    pub fn phase(&self) -> RefreshPhase {
        self.clock.phase()
    }

    #[must_use]
    pub fn last_updated(&self) -> Option<DateTime<Local>> {
        self.clock.last_updated()
    }

    #[must_use]
    pub fn period(&self) -> Duration {
        self.clock.period()
    }

    #[must_use]
    pub fn is_armed(&self) -> bool {
        self.clock.is_armed()
    }

    /// Arm the periodic refresh timer. `on_tick` runs once per period.
    pub fn arm(&mut self, scheduler: &dyn Scheduler, on_tick: TickCallback) {
        self.clock.arm(scheduler, on_tick);
    }

    /// Disarm the refresh timer.
    pub fn teardown(&mut self) {
        self.clock.teardown();
    }

    // ---- view state ----

    pub fn set_search(&mut self, search: impl Into<String>) {
        self.view.search = search.into();
    }

    pub fn set_filter(&mut self, filter: StatusFilter) {
        self.view.filter = filter;
    }

    pub fn select(&mut self, id: &str) -> Result<(), SelectionError> {
        self.view.selection.select(self.store.snapshot(), id)
    }

    pub fn clear_selection(&mut self) {
        self.view.selection.clear();
    }

    /// The selected job, or `None` if nothing is selected or the selection
    /// no longer exists in the current snapshot.
    #[must_use]
    pub fn selected_job(&self) -> Option<&Job> {
        self.view.selection.resolve(self.store.snapshot())
    }

    // ---- derived views ----

    #[must_use]
    pub fn status_counts(&self) -> StatusCounts {
        derive::status_counts(self.snapshot().jobs())
    }

    #[must_use]
    pub fn pie_series(&self) -> Vec<SeriesPoint> {
        derive::pie_series(self.snapshot().jobs())
    }

    #[must_use]
    pub fn bar_series(&self) -> Vec<SeriesPoint> {
        derive::bar_series(self.snapshot().backends())
    }

    #[must_use]
    pub fn busiest_backend(&self) -> Option<&Backend> {
        derive::busiest_backend(self.snapshot().backends())
    }

    #[must_use]
    pub fn trend_series(&self) -> &[TrendPoint] {
        derive::trend_series(self.snapshot().trends())
    }

    #[must_use]
    pub fn summary(&self) -> JobSummary {
        derive::job_summary(self.snapshot().jobs())
    }

    /// Jobs passing the current filter and search.
    #[must_use]
    pub fn visible_jobs(&self) -> Vec<&Job> {
        filter::filter_jobs(self.snapshot().jobs(), &self.view.filter, &self.view.search)
    }

    // ---- export ----

    /// Export the full job list, ignoring filter and search.
    pub fn export(&self, sink: &dyn FileSink, format: ExportFormat) -> Result<Exported, ExportError> {
        let jobs = self.snapshot().jobs();
        let filename = format.filename();
        let bytes = format.encode(jobs)?;

        match sink.save(&bytes, filename) {
            Ok(path) => {
                tracing::info!(path = %path.display(), jobs = jobs.len(), "Exported jobs");
                Ok(Exported {
                    path,
                    jobs: jobs.len(),
                })
            }
            Err(e) => {
                tracing::warn!(filename, "Export failed: {}", e);
                Err(e)
            }
        }
    }

    pub fn export_csv(&self, sink: &dyn FileSink) -> Result<usize, ExportError> {
        self.export(sink, ExportFormat::Csv).map(|e| e.jobs)
    }

    pub fn export_json(&self, sink: &dyn FileSink) -> Result<usize, ExportError> {
        self.export(sink, ExportFormat::Json).map(|e| e.jobs)
    }
}

#[cfg(test)]
mod tests {
    use super::export::tests::{MemorySink, RefusingSink};
    use super::*;
    use crate::models::JobStatus;
    use crate::source::DemoSource;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Demo data that counts fetches and can be switched to fail or to
    /// drop a job.
    #[derive(Default)]
    struct ScriptedSource {
        fetches: AtomicUsize,
        failing: AtomicBool,
        without_first_job: AtomicBool,
    }

    impl SnapshotSource for ScriptedSource {
        fn fetch_snapshot(&self) -> Result<Snapshot, FetchError> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            if self.failing.load(Ordering::SeqCst) {
                return Err(FetchError::Io {
                    path: PathBuf::from("scripted.json"),
                    source: std::io::Error::other("boom"),
                });
            }
            let mut jobs = DemoSource::jobs();
            if self.without_first_job.load(Ordering::SeqCst) {
                jobs.remove(0);
            }
            Ok(Snapshot::new(jobs, DemoSource::backends(), DemoSource::trends(), Local::now())?)
        }

        fn describe(&self) -> String {
            "scripted".to_string()
        }
    }

    fn dashboard() -> (Arc<ScriptedSource>, Dashboard) {
        let source = Arc::new(ScriptedSource::default());
        let dash = Dashboard::new(source.clone(), Duration::from_secs(30));
        (source, dash)
    }

    #[test]
    fn test_initial_load() {
        let (source, dash) = dashboard();
        assert_eq!(source.fetches.load(Ordering::SeqCst), 1);
        assert_eq!(dash.snapshot().jobs().len(), 5);
        assert!(dash.last_updated().is_some());
        assert!(dash.warnings().is_empty());
        assert_eq!(dash.phase(), RefreshPhase::Idle);
    }

    #[test]
    fn test_failed_initial_load_starts_empty() {
        let source = Arc::new(ScriptedSource::default());
        source.failing.store(true, Ordering::SeqCst);
        let dash = Dashboard::new(source, Duration::from_secs(30));

        assert!(dash.snapshot().jobs().is_empty());
        assert!(dash.busiest_backend().is_none());
        assert!(dash.last_updated().is_none());
        assert_eq!(dash.warnings().len(), 1);
    }

    #[test]
    fn test_failed_refresh_keeps_last_good_snapshot() {
        let (source, mut dash) = dashboard();
        let before = dash.last_updated();
        source.failing.store(true, Ordering::SeqCst);

        let outcome = dash.refresh();
        assert!(matches!(outcome, RefreshOutcome::Failed(ref m) if m.contains("boom")));
        assert_eq!(dash.snapshot().jobs().len(), 5);
        assert_eq!(dash.last_updated(), before);
        assert_eq!(dash.phase(), RefreshPhase::Idle);
        assert_eq!(dash.warnings().len(), 1);
    }

    #[test]
    fn test_refresh_while_in_flight_is_coalesced() {
        let (source, mut dash) = dashboard();
        assert!(dash.begin_refresh());
        assert_eq!(dash.refresh(), RefreshOutcome::Coalesced);
        assert_eq!(source.fetches.load(Ordering::SeqCst), 1);

        let result = source.fetch_snapshot();
        assert_eq!(dash.complete_refresh(result), RefreshOutcome::Replaced);
        assert_eq!(dash.refresh(), RefreshOutcome::Replaced);
    }

    #[test]
    fn test_complete_without_begin_is_dropped() {
        let (source, mut dash) = dashboard();
        let stamp = dash.last_updated();

        let outcome = dash.complete_refresh(Ok(Snapshot::empty(Local::now())));
        assert_eq!(outcome, RefreshOutcome::Coalesced);
        assert_eq!(dash.snapshot().jobs().len(), 5);
        assert_eq!(dash.last_updated(), stamp);

        source.failing.store(true, Ordering::SeqCst);
        let outcome = dash.complete_refresh(source.fetch_snapshot());
        assert_eq!(outcome, RefreshOutcome::Coalesced);
        assert!(dash.warnings().is_empty());
        assert_eq!(dash.phase(), RefreshPhase::Idle);
    }

    #[test]
    fn test_stale_selection_after_refresh() {
        let (source, mut dash) = dashboard();
        dash.select("QJ-1001").unwrap();
        assert_eq!(dash.selected_job().map(|j| j.id.as_str()), Some("QJ-1001"));

        source.without_first_job.store(true, Ordering::SeqCst);
        assert_eq!(dash.refresh(), RefreshOutcome::Replaced);
        assert!(dash.selected_job().is_none());
        assert!(dash.select("QJ-1001").is_err());
    }

    #[test]
    fn test_view_state_drives_visible_jobs() {
        let (_, mut dash) = dashboard();
        dash.select("QJ-1003").unwrap();
        dash.set_filter(StatusFilter::Only(JobStatus::Finished));
        assert_eq!(dash.visible_jobs().len(), 2);

        dash.set_search("1004");
        let visible: Vec<&str> = dash.visible_jobs().iter().map(|j| j.id.as_str()).collect();
        assert_eq!(visible, vec!["QJ-1004"]);
        // Filtering does not touch the selection
        assert_eq!(dash.selected_job().map(|j| j.id.as_str()), Some("QJ-1003"));

        dash.clear_selection();
        assert!(dash.selected_job().is_none());
    }

    #[test]
    fn test_export_ignores_filter() {
        let (_, mut dash) = dashboard();
        dash.set_filter(StatusFilter::Only(JobStatus::Failed));
        dash.set_search("1005");

        let sink = MemorySink::default();
        assert_eq!(dash.export_csv(&sink).unwrap(), 5);
        assert_eq!(dash.export_json(&sink).unwrap(), 5);

        let saved = sink.saved.borrow();
        assert_eq!(saved[0].0, "jobs.csv");
        assert_eq!(String::from_utf8_lossy(&saved[0].1).lines().count(), 6);
        assert_eq!(saved[1].0, "jobs.json");
    }

    #[test]
    fn test_export_refused_is_surfaced() {
        let (_, dash) = dashboard();
        let err = dash.export_csv(&RefusingSink).unwrap_err();
        assert!(matches!(err, ExportError::Refused { .. }));
    }

    #[test]
    fn test_derived_views_follow_snapshot() {
        let (_, dash) = dashboard();
        assert_eq!(dash.status_counts().total(), 5);
        assert_eq!(dash.pie_series().len(), 4);
        assert_eq!(dash.bar_series().len(), 4);
        assert_eq!(dash.busiest_backend().map(|b| b.queue), Some(12));
        assert_eq!(dash.trend_series().len(), 3);
        assert_eq!(dash.summary().finished, 2);
    }

    fn armed_dashboard() -> (Arc<ScriptedSource>, Arc<Mutex<Dashboard>>, ManualScheduler) {
        let (source, dash) = dashboard();
        let dash = Arc::new(Mutex::new(dash));
        let scheduler = ManualScheduler::new();

        let ticked = Arc::clone(&dash);
        dash.lock().unwrap().arm(
            &scheduler,
            Box::new(move || {
                ticked.lock().unwrap().refresh();
            }),
        );
        (source, dash, scheduler)
    }

    #[test]
    fn test_one_period_triggers_one_refresh() {
        let (source, dash, scheduler) = armed_dashboard();
        let initial = dash.lock().unwrap().current();
        let stamp = dash.lock().unwrap().last_updated();

        scheduler.advance(Duration::from_secs(30));

        assert_eq!(source.fetches.load(Ordering::SeqCst), 2);
        let dash = dash.lock().unwrap();
        assert!(!Arc::ptr_eq(&initial, &dash.current()));
        assert!(dash.last_updated() >= stamp);
        assert_eq!(dash.last_updated(), Some(dash.snapshot().captured_at()));
    }

    #[test]
    fn test_teardown_before_period_prevents_refresh() {
        let (source, dash, scheduler) = armed_dashboard();
        let initial = dash.lock().unwrap().current();

        scheduler.advance(Duration::from_secs(15));
        dash.lock().unwrap().teardown();
        scheduler.advance(Duration::from_secs(120));

        assert_eq!(source.fetches.load(Ordering::SeqCst), 1);
        let dash = dash.lock().unwrap();
        assert!(!dash.is_armed());
        assert!(Arc::ptr_eq(&initial, &dash.current()));
    }

    #[test]
    fn test_drop_disarms_timer() {
        let scheduler = ManualScheduler::new();
        let fired = Arc::new(AtomicUsize::new(0));
        {
            let (_, mut dash) = dashboard();
            let fired = Arc::clone(&fired);
            dash.arm(
                &scheduler,
                Box::new(move || {
                    fired.fetch_add(1, Ordering::SeqCst);
                }),
            );
            assert_eq!(scheduler.armed(), 1);
        }
        scheduler.advance(Duration::from_secs(60));
        assert_eq!(fired.load(Ordering::SeqCst), 0);
        assert_eq!(scheduler.armed(), 0);
    }
}
