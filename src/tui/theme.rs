//! Theme definitions for the TUI
//!
//! This module provides colorblind-safe themes for both dark and light terminals.
//! The default is "dark" but users can configure "light" via config file or env var.

use qdash::models::{BackendStatus, JobStatus};
use ratatui::style::Color;

/// Available theme names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ThemeName {
    #[default]
    Dark,
    Light,
}

impl ThemeName {
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "light" => ThemeName::Light,
            _ => ThemeName::Dark,
        }
    }
}

/// Color theme for the TUI
#[derive(Debug, Clone)]
pub struct Theme {
    pub name: ThemeName,

    // Base colors
    pub fg: Color,
    pub muted: Color,
    pub border: Color,
    pub border_focused: Color,

    // Job status colors (colorblind-safe)
    pub running: Color,
    pub waiting: Color,
    pub finished: Color,
    pub failed: Color,
    pub failed_row_bg: Color,

    // Backend status colors
    pub online: Color,
    pub maintenance: Color,
    pub offline: Color,

    // UI elements
    pub selected_bg: Color,
    pub selected_fg: Color,
    pub header_bg: Color,
    pub header_fg: Color,
    pub stale_indicator: Color,

    // Charts and bars
    pub bar: Color,
    pub progress_full: Color,
    pub progress_warn: Color,
    pub progress_crit: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self::dark()
    }
}

impl Theme {
    /// Create a dark theme (default)
    pub fn dark() -> Self {
        Self {
            name: ThemeName::Dark,

            fg: Color::White,
            muted: Color::DarkGray,
            border: Color::DarkGray,
            border_focused: Color::Cyan,

            running: Color::Rgb(0, 200, 0),
            waiting: Color::Rgb(255, 180, 0),
            finished: Color::Rgb(80, 160, 255),
            failed: Color::Rgb(255, 80, 80),
            failed_row_bg: Color::Rgb(70, 20, 20),

            online: Color::Rgb(100, 180, 100),
            maintenance: Color::Rgb(255, 200, 100),
            offline: Color::Rgb(255, 80, 80),

            selected_bg: Color::Rgb(60, 60, 80),
            selected_fg: Color::White,
            header_bg: Color::Rgb(40, 80, 120),
            header_fg: Color::White,
            stale_indicator: Color::Rgb(255, 100, 100),

            bar: Color::Rgb(80, 160, 255),
            progress_full: Color::Rgb(0, 200, 0),
            progress_warn: Color::Rgb(255, 180, 0),
            progress_crit: Color::Rgb(255, 80, 80),
        }
    }

    /// Create a light theme
    /// Uses darker, more saturated colors for visibility on light backgrounds
    pub fn light() -> Self {
        Self {
            name: ThemeName::Light,

            fg: Color::Black,
            muted: Color::Rgb(120, 120, 120),
            border: Color::Rgb(120, 120, 120),
            border_focused: Color::Rgb(0, 100, 180),

            running: Color::Rgb(0, 140, 0),
            waiting: Color::Rgb(200, 120, 0),
            finished: Color::Rgb(0, 80, 180),
            failed: Color::Rgb(200, 0, 0),
            failed_row_bg: Color::Rgb(255, 220, 220),

            online: Color::Rgb(60, 120, 60),
            maintenance: Color::Rgb(180, 140, 60),
            offline: Color::Rgb(200, 0, 0),

            selected_bg: Color::Rgb(200, 220, 255),
            selected_fg: Color::Black,
            header_bg: Color::Rgb(180, 200, 230),
            header_fg: Color::Black,
            stale_indicator: Color::Rgb(200, 0, 0),

            bar: Color::Rgb(0, 80, 180),
            progress_full: Color::Rgb(0, 140, 0),
            progress_warn: Color::Rgb(200, 120, 0),
            progress_crit: Color::Rgb(200, 0, 0),
        }
    }

    /// Create theme from name string
    pub fn from_name(name: &str) -> Self {
        match ThemeName::from_str(name) {
            ThemeName::Dark => Self::dark(),
            ThemeName::Light => Self::light(),
        }
    }

    pub fn job_status_color(&self, status: &JobStatus) -> Color {
        match status {
            JobStatus::Running => self.running,
            JobStatus::Waiting => self.waiting,
            JobStatus::Finished => self.finished,
            JobStatus::Failed => self.failed,
            JobStatus::Unknown(_) => self.fg,
        }
    }

    pub fn backend_status_color(&self, status: &BackendStatus) -> Color {
        match status {
            BackendStatus::Online => self.online,
            BackendStatus::Maintenance => self.maintenance,
            BackendStatus::Offline => self.offline,
            BackendStatus::Unknown(_) => self.muted,
        }
    }

    /// Color for a queue depth relative to the deepest queue
    pub fn queue_color(&self, queue: u32, max: u32) -> Color {
        let percent = if max == 0 {
            0.0
        } else {
            f64::from(queue) / f64::from(max) * 100.0
        };
        if percent >= 95.0 {
            self.progress_crit
        } else if percent >= 60.0 {
            self.progress_warn
        } else {
            self.progress_full
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_theme_from_name() {
        assert_eq!(Theme::from_name("dark").name, ThemeName::Dark);
        assert_eq!(Theme::from_name("LIGHT").name, ThemeName::Light);
        // Unknown defaults to dark
        assert_eq!(Theme::from_name("solarized").name, ThemeName::Dark);
    }

    #[test]
    fn test_status_colors() {
        let theme = Theme::dark();
        assert_eq!(theme.job_status_color(&JobStatus::Running), theme.running);
        assert_eq!(theme.job_status_color(&JobStatus::Failed), theme.failed);
        assert_eq!(theme.job_status_color(&JobStatus::parse("queued")), theme.fg);
        assert_eq!(theme.backend_status_color(&BackendStatus::Maintenance), theme.maintenance);
    }

    #[test]
    fn test_queue_color() {
        let theme = Theme::dark();
        assert_eq!(theme.queue_color(0, 0), theme.progress_full);
        assert_eq!(theme.queue_color(3, 12), theme.progress_full);
        assert_eq!(theme.queue_color(8, 12), theme.progress_warn);
        assert_eq!(theme.queue_color(12, 12), theme.progress_crit);
    }
}
