//! Application state types for the TUI
//!
//! - Modal states (Help, Search, Detail)
//! - Selection and navigation state (ListState)
//! - Feedback state for errors, warnings and toasts

use std::time::{Duration, Instant};

// ============================================================================
// Toast Feedback
// ============================================================================

/// Short-lived notice shown in the status bar after an action
#[derive(Debug, Clone)]
pub struct Toast {
    pub message: String,
    pub success: bool,
    pub timestamp: Instant,
}

impl Toast {
    pub fn success(message: String) -> Self {
        Self {
            message,
            success: true,
            timestamp: Instant::now(),
        }
    }

    pub fn failure(message: String) -> Self {
        Self {
            message,
            success: false,
            timestamp: Instant::now(),
        }
    }

    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.timestamp.elapsed() < Duration::from_secs(3)
    }
}

// ============================================================================
// List Navigation State
// ============================================================================

/// List state with selection and scroll tracking
#[derive(Debug, Clone, Default)]
pub struct ListState {
    pub selected: usize,
    pub scroll_offset: usize,
    pub visible_count: usize,
}

impl ListState {
    pub fn clamp(&mut self, list_len: usize) {
        if list_len == 0 {
            self.selected = 0;
            self.scroll_offset = 0;
        } else {
            self.selected = self.selected.min(list_len - 1);
            if self.selected < self.scroll_offset {
                self.scroll_offset = self.selected;
            } else if self.visible_count > 0
                && self.selected >= self.scroll_offset + self.visible_count
            {
                self.scroll_offset = self.selected.saturating_sub(self.visible_count - 1);
            }
        }
    }

    pub fn move_up(&mut self, list_len: usize) {
        if self.selected > 0 {
            self.selected -= 1;
            self.clamp(list_len);
        }
    }

    pub fn move_down(&mut self, list_len: usize) {
        if list_len > 0 && self.selected < list_len - 1 {
            self.selected += 1;
            self.clamp(list_len);
        }
    }

    pub fn move_to_top(&mut self) {
        self.selected = 0;
        self.scroll_offset = 0;
    }

    pub fn move_to_bottom(&mut self, list_len: usize) {
        if list_len > 0 {
            self.selected = list_len - 1;
            if self.visible_count > 0 {
                self.scroll_offset = list_len.saturating_sub(self.visible_count);
            }
        }
    }

    pub fn page_up(&mut self, list_len: usize) {
        let jump = self.visible_count.max(1) / 2;
        self.selected = self.selected.saturating_sub(jump);
        self.clamp(list_len);
    }

    pub fn page_down(&mut self, list_len: usize) {
        let jump = self.visible_count.max(1) / 2;
        self.selected = self.selected.saturating_add(jump);
        self.clamp(list_len);
    }
}

// ============================================================================
// Modal State
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ModalState {
    #[default]
    None,
    Help,
    /// Search editing mode - edit_buffer is a draft until Enter
    Search {
        edit_buffer: String,
        cursor: usize,
    },
    /// Job detail overlay for the dashboard's selected job
    Detail,
}

impl ModalState {
    #[must_use]
    pub fn is_active(&self) -> bool {
        !matches!(self, ModalState::None)
    }

    #[must_use]
    pub fn is_editing_search(&self) -> bool {
        matches!(self, ModalState::Search { .. })
    }

    /// Draft search text while editing
    #[must_use]
    pub fn search_buffer(&self) -> Option<&str> {
        match self {
            ModalState::Search { edit_buffer, .. } => Some(edit_buffer),
            _ => None,
        }
    }
}

// ============================================================================
// Feedback State
// ============================================================================

pub struct FeedbackState {
    last_error: Option<(String, Instant)>,
    error_display_duration: Duration,
    pub config_warnings: Vec<String>,
    toast: Option<Toast>,
}

impl FeedbackState {
    pub fn new(config_warnings: Vec<String>) -> Self {
        Self {
            last_error: None,
            error_display_duration: Duration::from_secs(5),
            config_warnings,
            toast: None,
        }
    }

    pub fn set_error(&mut self, msg: String) {
        self.last_error = Some((msg, Instant::now()));
    }

    #[must_use]
    pub fn current_error(&self) -> Option<&str> {
        self.last_error
            .as_ref()
            .filter(|(_, t)| t.elapsed() < self.error_display_duration)
            .map(|(msg, _)| msg.as_str())
    }

    pub fn set_toast(&mut self, toast: Toast) {
        self.toast = Some(toast);
    }

    #[must_use]
    pub fn current_toast(&self) -> Option<&Toast> {
        self.toast.as_ref().filter(|t| t.is_visible())
    }
}
