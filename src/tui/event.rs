//! Event types for the TUI
//!
//! This module implements a dual-channel event architecture:
//! - InputEvent: Priority channel for user input (never dropped)
//! - DataEvent: Data channel for timer ticks and fetch results

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use qdash::models::Snapshot;
use qdash::source::FetchError;

/// Input events from the terminal (priority channel - never dropped)
#[derive(Debug, Clone)]
pub enum InputEvent {
    /// Keyboard input
    Key(KeyEvent),
    /// Terminal resize
    Resize(u16, u16),
}

/// Data and control events
#[derive(Debug)]
pub enum DataEvent {
    /// The refresh timer fired
    RefreshTick,

    /// A background fetch finished
    SnapshotFetched(Result<Snapshot, FetchError>),
}

/// Result of processing an event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventResult {
    /// Continue running, UI needs redraw
    Continue,
    /// Continue running, no UI change needed
    Unchanged,
    /// Quit the application
    Quit,
}

/// Key action mappings for the TUI
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    // Navigation
    MoveUp,
    MoveDown,
    MoveToTop,
    MoveToBottom,
    PageUp,
    PageDown,

    // Actions
    Select,
    Refresh,
    CycleFilter,
    QuickSearch,
    ExportCsv,  // 'e'
    ExportJson, // 'E'

    // UI
    ShowHelp,
    Escape,
    Quit,

    // Search mode specific
    SearchClear,
    SearchBackspace,
    SearchChar(char),

    // Unknown/unhandled
    Unknown,
}

impl KeyAction {
    /// Map a key event to an action based on current mode
    pub fn from_key_event(event: KeyEvent, in_search_mode: bool) -> Self {
        let KeyEvent {
            code, modifiers, ..
        } = event;

        // Search mode has different mappings
        if in_search_mode {
            return match code {
                KeyCode::Esc => KeyAction::Escape,
                KeyCode::Enter => KeyAction::Select,
                KeyCode::Backspace => KeyAction::SearchBackspace,
                KeyCode::Char('u') if modifiers.contains(KeyModifiers::CONTROL) => {
                    KeyAction::SearchClear
                }
                KeyCode::Char(c) => KeyAction::SearchChar(c),
                _ => KeyAction::Unknown,
            };
        }

        match code {
            KeyCode::Char('q') => KeyAction::Quit,

            // Ctrl+ combinations must come before bare character matches
            KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => KeyAction::Quit,
            KeyCode::Char('d') if modifiers.contains(KeyModifiers::CONTROL) => KeyAction::PageDown,
            KeyCode::Char('u') if modifiers.contains(KeyModifiers::CONTROL) => KeyAction::PageUp,

            // Navigation
            KeyCode::Char('j') | KeyCode::Down => KeyAction::MoveDown,
            KeyCode::Char('k') | KeyCode::Up => KeyAction::MoveUp,
            KeyCode::Char('g') | KeyCode::Home => KeyAction::MoveToTop,
            KeyCode::Char('G') | KeyCode::End => KeyAction::MoveToBottom,
            KeyCode::PageDown => KeyAction::PageDown,
            KeyCode::PageUp => KeyAction::PageUp,

            // Actions
            KeyCode::Enter => KeyAction::Select,
            KeyCode::Char('r') => KeyAction::Refresh,
            KeyCode::Char('f') => KeyAction::CycleFilter,
            KeyCode::Char('/') => KeyAction::QuickSearch,
            KeyCode::Char('e') => KeyAction::ExportCsv,
            KeyCode::Char('E') => KeyAction::ExportJson,

            // Help
            KeyCode::Char('?') | KeyCode::F(1) => KeyAction::ShowHelp,
            KeyCode::Esc => KeyAction::Escape,

            _ => KeyAction::Unknown,
        }
    }
}
