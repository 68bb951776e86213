//! Application state and core logic for the TUI
//!
//! `App` wraps the dashboard controller with terminal-only state: the job
//! list cursor, the active modal, feedback and the theme. Updates follow a
//! TEA-inspired pattern of mutable state and method-based handlers.

mod state;

pub use state::{FeedbackState, ListState, ModalState, Toast};

use qdash::Dashboard;
use qdash::dashboard::{DirectorySink, ExportFormat, RefreshOutcome, StatusFilter};
use qdash::models::{DashboardConfig, Job};
use qdash::source::FetchError;
use tokio::sync::mpsc;

use crate::tui::event::{DataEvent, EventResult, InputEvent, KeyAction};
use crate::tui::theme::Theme;

/// Main application state
pub struct App {
    // Lifecycle
    pub running: bool,

    pub modal: ModalState,

    // Core state: snapshot, view state, refresh clock
    pub dashboard: Dashboard,

    pub jobs_list: ListState,

    pub feedback: FeedbackState,

    pub theme: Theme,
    pub id_max_length: usize,
    export_sink: DirectorySink,

    // Communication
    pub data_tx: mpsc::Sender<DataEvent>,
}

impl App {
    /// Create the app around an already-loaded dashboard.
    pub fn new(
        mut dashboard: Dashboard,
        config: &DashboardConfig,
        config_warnings: Vec<String>,
        data_tx: mpsc::Sender<DataEvent>,
    ) -> Self {
        dashboard.set_filter(StatusFilter::parse(&config.display.default_filter));

        let mut feedback = FeedbackState::new(config_warnings);
        if let Some(warning) = dashboard.warnings().last() {
            feedback.set_error(warning.clone());
        }

        Self {
            running: true,
            modal: ModalState::None,
            dashboard,
            jobs_list: ListState::default(),
            feedback,
            theme: Theme::from_name(&config.display.theme),
            id_max_length: config.display.id_max_length,
            export_sink: DirectorySink::new(config.export.directory_or_cwd()),
            data_tx,
        }
    }

    /// Handle an input event
    pub fn handle_input(&mut self, event: InputEvent) -> EventResult {
        match event {
            InputEvent::Key(key_event) => {
                let in_search = self.modal.is_editing_search();
                let action = KeyAction::from_key_event(key_event, in_search);
                self.handle_action(action)
            }
            InputEvent::Resize(_, _) => EventResult::Continue,
        }
    }

    /// Handle a key action
    fn handle_action(&mut self, action: KeyAction) -> EventResult {
        // Help overlay takes priority
        if matches!(self.modal, ModalState::Help) {
            return match action {
                KeyAction::Escape | KeyAction::ShowHelp | KeyAction::Quit => {
                    self.modal = ModalState::None;
                    EventResult::Continue
                }
                _ => EventResult::Unchanged,
            };
        }

        match &self.modal {
            ModalState::Search { .. } => return self.handle_search_action(action),
            ModalState::Detail => return self.handle_detail_action(action),
            _ => {}
        }

        if let Some(result) = self.handle_navigation(&action) {
            return result;
        }

        match action {
            KeyAction::Quit => {
                self.running = false;
                EventResult::Quit
            }
            KeyAction::Select => {
                self.open_detail();
                EventResult::Continue
            }
            KeyAction::Refresh => {
                if self.request_refresh() {
                    EventResult::Continue
                } else {
                    EventResult::Unchanged
                }
            }
            KeyAction::CycleFilter => {
                let next = self.dashboard.view().filter.cycle();
                self.dashboard.set_filter(next);
                self.clamp_jobs_list();
                EventResult::Continue
            }
            KeyAction::QuickSearch => {
                let initial = self.dashboard.view().search.clone();
                self.modal = ModalState::Search {
                    cursor: initial.len(),
                    edit_buffer: initial,
                };
                EventResult::Continue
            }
            KeyAction::ExportCsv => {
                self.export(ExportFormat::Csv);
                EventResult::Continue
            }
            KeyAction::ExportJson => {
                self.export(ExportFormat::Json);
                EventResult::Continue
            }
            KeyAction::ShowHelp => {
                self.modal = ModalState::Help;
                EventResult::Continue
            }
            KeyAction::Escape => {
                if self.dashboard.view().search.is_empty() {
                    EventResult::Unchanged
                } else {
                    self.dashboard.set_search("");
                    self.clamp_jobs_list();
                    EventResult::Continue
                }
            }
            _ => EventResult::Unchanged,
        }
    }

    /// Handle navigation actions (returns Some if action was handled)
    fn handle_navigation(&mut self, action: &KeyAction) -> Option<EventResult> {
        let len = self.dashboard.visible_jobs().len();
        let list = &mut self.jobs_list;
        match action {
            KeyAction::MoveUp => list.move_up(len),
            KeyAction::MoveDown => list.move_down(len),
            KeyAction::MoveToTop => list.move_to_top(),
            KeyAction::MoveToBottom => list.move_to_bottom(len),
            KeyAction::PageUp => list.page_up(len),
            KeyAction::PageDown => list.page_down(len),
            _ => return None,
        }
        Some(EventResult::Continue)
    }

    fn handle_search_action(&mut self, action: KeyAction) -> EventResult {
        let ModalState::Search { edit_buffer, cursor } = &mut self.modal else {
            return EventResult::Unchanged;
        };

        match action {
            KeyAction::SearchChar(c) => {
                edit_buffer.insert(*cursor, c);
                *cursor += c.len_utf8();
            }
            KeyAction::SearchBackspace => {
                if let Some(prev) = edit_buffer[..*cursor].chars().next_back() {
                    *cursor -= prev.len_utf8();
                    edit_buffer.remove(*cursor);
                }
            }
            KeyAction::SearchClear => {
                edit_buffer.clear();
                *cursor = 0;
            }
            KeyAction::Select => {
                let search = std::mem::take(edit_buffer);
                self.modal = ModalState::None;
                self.dashboard.set_search(search);
                self.jobs_list.move_to_top();
                self.clamp_jobs_list();
            }
            KeyAction::Escape => {
                self.modal = ModalState::None;
            }
            _ => return EventResult::Unchanged,
        }
        EventResult::Continue
    }

    fn handle_detail_action(&mut self, action: KeyAction) -> EventResult {
        match action {
            KeyAction::Escape | KeyAction::Select | KeyAction::Quit => {
                self.close_detail();
                EventResult::Continue
            }
            _ => EventResult::Unchanged,
        }
    }

    /// Handle a data event
    pub fn handle_data(&mut self, event: DataEvent) -> EventResult {
        match event {
            DataEvent::RefreshTick => {
                if self.request_refresh() {
                    EventResult::Continue
                } else {
                    EventResult::Unchanged
                }
            }
            DataEvent::SnapshotFetched(result) => {
                match self.dashboard.complete_refresh(result) {
                    RefreshOutcome::Failed(message) => {
                        self.feedback.set_error(format!("Refresh failed: {}", message));
                    }
                    RefreshOutcome::Replaced | RefreshOutcome::Coalesced => {}
                }
                self.clamp_jobs_list();
                // The selected job may be gone from the new snapshot
                if self.modal == ModalState::Detail && self.dashboard.selected_job().is_none() {
                    self.close_detail();
                }
                EventResult::Continue
            }
        }
    }

    /// Job under the cursor in the filtered table
    #[must_use]
    pub fn focused_job(&self) -> Option<&Job> {
        self.dashboard
            .visible_jobs()
            .get(self.jobs_list.selected)
            .copied()
    }

    fn open_detail(&mut self) {
        let Some(id) = self.focused_job().map(|j| j.id.clone()) else {
            return;
        };
        match self.dashboard.select(&id) {
            Ok(()) => self.modal = ModalState::Detail,
            Err(e) => self.feedback.set_error(e.to_string()),
        }
    }

    fn close_detail(&mut self) {
        self.dashboard.clear_selection();
        self.modal = ModalState::None;
    }

    fn clamp_jobs_list(&mut self) {
        let len = self.dashboard.visible_jobs().len();
        self.jobs_list.clamp(len);
    }

    /// Start a background refresh unless one is already running.
    ///
    /// Returns false when the request was coalesced.
    fn request_refresh(&mut self) -> bool {
        if !self.dashboard.begin_refresh() {
            return false;
        }

        let source = self.dashboard.source();
        let data_tx = self.data_tx.clone();

        tokio::spawn(async move {
            let result = tokio::task::spawn_blocking(move || source.fetch_snapshot())
                .await
                .unwrap_or_else(|e| Err(FetchError::Worker(e.to_string())));

            // Must not be dropped: the clock stays in Refreshing until it arrives
            if data_tx.send(DataEvent::SnapshotFetched(result)).await.is_err() {
                tracing::debug!("Event loop gone before fetch result was delivered");
            }
        });
        true
    }

    fn export(&mut self, format: ExportFormat) {
        match self.dashboard.export(&self.export_sink, format) {
            Ok(exported) => {
                self.feedback.set_toast(Toast::success(format!(
                    "Exported {} jobs to {}",
                    exported.jobs,
                    exported.path.display()
                )));
            }
            Err(e) => {
                self.feedback.set_toast(Toast::failure(e.to_string()));
            }
        }
    }
}
