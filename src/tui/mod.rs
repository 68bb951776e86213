//! Terminal User Interface for qdash
//!
//! This module provides an interactive dashboard of quantum jobs and
//! backends. It features:
//! - Periodic refresh driven by the dashboard's refresh clock
//! - Dual-channel event architecture (priority input, data updates)
//! - Keyboard-driven navigation, search, status filter and export
//! - Graceful degradation when a refresh fails

pub mod app;
pub mod event;
pub mod runtime;
pub mod theme;
pub mod ui;

use std::io::{self, IsTerminal, stdout};

use anyhow::{Result, bail};
use crossterm::{
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use qdash::Dashboard;
use qdash::dashboard::TokioScheduler;
use qdash::models::DashboardConfig;
use ratatui::prelude::*;

use crate::tui::app::App;
use crate::tui::runtime::{
    TuiRuntime, create_channels, refresh_tick_callback, run_event_loop, spawn_input_task,
};

/// Terminal capability requirements for TUI mode
#[derive(Debug)]
pub struct TerminalCapabilities {
    pub is_tty: bool,
    pub term_type: String,
}

impl TerminalCapabilities {
    pub fn detect() -> Self {
        Self {
            is_tty: stdout().is_terminal(),
            term_type: std::env::var("TERM").unwrap_or_default(),
        }
    }

    pub fn supports_alternate_screen(&self) -> bool {
        !matches!(self.term_type.as_str(), "dumb" | "" | "unknown")
    }

    pub fn is_suitable(&self) -> bool {
        self.is_tty && self.supports_alternate_screen()
    }

    pub fn error_message(&self) -> String {
        if !self.is_tty {
            "TUI mode requires an interactive terminal (stdout is not a TTY).\n\
             Hint: Use non-TUI commands like 'qdash jobs' or 'qdash status' instead."
                .to_string()
        } else {
            format!(
                "Terminal type '{}' may not support TUI mode.\n\
                 Hint: Set TERM to a supported value (e.g., xterm-256color) or use CLI mode.",
                if self.term_type.is_empty() { "(unset)" } else { &self.term_type }
            )
        }
    }
}

/// Run the TUI application
pub async fn run_tui(
    dashboard: Dashboard,
    config: DashboardConfig,
    config_warnings: Vec<String>,
) -> Result<()> {
    let capabilities = TerminalCapabilities::detect();
    if !capabilities.is_suitable() {
        bail!("{}", capabilities.error_message());
    }

    let mut terminal = setup_terminal()?;

    let (input_tx, input_rx, data_tx, data_rx) = create_channels();

    let mut app = App::new(dashboard, &config, config_warnings, data_tx.clone());
    app.dashboard
        .arm(&TokioScheduler::current(), refresh_tick_callback(data_tx));

    let mut runtime = TuiRuntime::new();
    runtime.track(spawn_input_task(input_tx, runtime.cancel_token()));

    let result = run_event_loop(app, input_rx, data_rx, |app| {
        terminal.draw(|frame| ui::render(app, frame))?;
        Ok(())
    })
    .await;

    // Disarm the refresh timer before anything else goes away
    let result = result.map(|mut app| app.dashboard.teardown());

    runtime.shutdown().await;
    restore_terminal(&mut terminal)?;

    result
}

/// Setup the terminal for TUI mode
fn setup_terminal() -> Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

/// Restore the terminal to normal mode
fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

/// Run the TUI with the tokio runtime (entry point from main)
pub fn run(dashboard: Dashboard, config: DashboardConfig, config_warnings: Vec<String>) -> Result<()> {
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(run_tui(dashboard, config, config_warnings))
}
