//! Overlay and popup rendering
//!
//! Handles rendering of help, search input, job detail popup, and toast notifications.

use qdash::formatting::{format_percent, format_seconds};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

use crate::tui::app::{App, ModalState, Toast};
use crate::tui::theme::Theme;

use super::widgets::{centered_rect, detail_row, section_header};

const MISSING: &str = "—";

pub fn render_help_overlay(frame: &mut Frame, area: Rect, theme: &Theme) {
    let popup_area = centered_rect(60, 70, area);

    // Clear the area first
    frame.render_widget(Clear, popup_area);

    let heading = |text: &'static str| {
        Line::from(vec![Span::styled(
            text,
            Style::default().fg(theme.border_focused).bold(),
        )])
    };

    let help_text = vec![
        Line::from(vec![Span::styled(
            "qdash - Keyboard Shortcuts",
            Style::default().bold(),
        )]),
        Line::from(""),
        heading("Navigation"),
        Line::from("  j / Down       Move selection down"),
        Line::from("  k / Up         Move selection up"),
        Line::from("  g / Home       Jump to top"),
        Line::from("  G / End        Jump to bottom"),
        Line::from("  Ctrl+d / PgDn  Page down"),
        Line::from("  Ctrl+u / PgUp  Page up"),
        Line::from(""),
        heading("Jobs"),
        Line::from("  Enter          View job details"),
        Line::from("  /              Search by job ID"),
        Line::from("  f              Cycle status filter"),
        Line::from("  Esc            Clear search"),
        Line::from(""),
        heading("General"),
        Line::from("  r              Refresh now"),
        Line::from("  e              Export all jobs to CSV"),
        Line::from("  E (shift)      Export all jobs to JSON"),
        Line::from("  ?/F1           Show this help"),
        Line::from("  q              Quit application"),
        Line::from(""),
        Line::from(vec![Span::styled(
            "Press ? or Esc to close this help",
            Style::default().fg(theme.border),
        )]),
    ];

    let help_para = Paragraph::new(help_text)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.border_focused))
                .title(" Help "),
        )
        .style(Style::default().fg(theme.fg));

    frame.render_widget(help_para, popup_area);
}

pub fn render_search_overlay(app: &App, frame: &mut Frame, area: Rect, theme: &Theme) {
    let ModalState::Search { edit_buffer, cursor } = &app.modal else {
        return;
    };

    let popup_area = Rect {
        x: area.x + 2,
        y: area.y + 1,
        width: area.width.saturating_sub(4).min(50),
        height: 3,
    };

    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.border_focused))
        .title(" Search Job ID ");

    let inner = block.inner(popup_area);
    frame.render_widget(block, popup_area);

    let prefix = "/";
    let para = Paragraph::new(format!("{}{}", prefix, edit_buffer))
        .style(Style::default().fg(theme.fg));
    frame.render_widget(para, inner);

    let cursor_col = edit_buffer[..*cursor].chars().count();
    frame.set_cursor_position((inner.x + (prefix.len() + cursor_col) as u16, inner.y));
}

/// Render the job detail popup for the dashboard's selected job
pub fn render_job_detail_popup(app: &App, frame: &mut Frame, area: Rect, theme: &Theme) {
    // A selection that went stale resolves to nothing; draw no popup
    let Some(job) = app.dashboard.selected_job() else {
        return;
    };

    let popup_area = centered_rect(60, 60, area);
    frame.render_widget(Clear, popup_area);

    let status_color = theme.job_status_color(&job.status);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(status_color))
        .title(format!(" Job {} [{}] ", job.id, job.status.label()));

    let inner = block.inner(popup_area);
    frame.render_widget(block, popup_area);

    let muted = Style::default().fg(theme.muted);
    let or_missing = |value: Option<String>| match value {
        Some(v) => Span::raw(v),
        None => Span::styled(MISSING, muted),
    };

    let mut lines = vec![
        Line::from(""),
        detail_row(
            "Status:",
            Span::styled(job.status.label(), Style::default().fg(status_color).bold()),
        ),
        detail_row("Backend:", Span::raw(job.backend.as_str())),
        detail_row("Created:", Span::raw(job.created.as_str())),
        detail_row("Duration:", or_missing(job.duration.clone())),
        detail_row("Shots:", Span::raw(job.shots.to_string())),
        Line::from(""),
        section_header("Backend", theme),
    ];

    let backend = app
        .dashboard
        .snapshot()
        .backends()
        .iter()
        .find(|b| b.name == job.backend);

    match backend {
        Some(b) => {
            lines.push(detail_row(
                "Status:",
                Span::styled(
                    b.status.as_str(),
                    Style::default().fg(theme.backend_status_color(&b.status)),
                ),
            ));
            lines.push(detail_row("Queue:", Span::raw(b.queue.to_string())));
            lines.push(detail_row("Avg. Time:", or_missing(b.avg_time.map(format_seconds))));
            lines.push(detail_row("Uptime:", Span::raw(format_percent(b.uptime))));
            lines.push(detail_row(
                "Error Rate:",
                or_missing(b.error_rate_percent().map(format_percent)),
            ));
        }
        None => {
            lines.push(Line::from(Span::styled(
                format!("  '{}' is not in the backend list", job.backend),
                muted,
            )));
        }
    }

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled("  Press Esc or Enter to close", muted)));

    let para = Paragraph::new(lines)
        .style(Style::default().fg(theme.fg))
        .wrap(Wrap { trim: false });
    frame.render_widget(para, inner);
}

/// Render a toast in the bottom-right corner
pub fn render_toast(toast: &Toast, frame: &mut Frame, area: Rect, theme: &Theme) {
    let width = (toast.message.chars().count() as u16 + 4).min(area.width);
    let toast_area = Rect {
        x: area.x + area.width.saturating_sub(width + 1),
        y: area.y + area.height.saturating_sub(5),
        width,
        height: 3_u16.min(area.height),
    };

    let color = if toast.success {
        theme.running
    } else {
        theme.failed
    };

    frame.render_widget(Clear, toast_area);
    let para = Paragraph::new(toast.message.as_str())
        .style(Style::default().fg(color))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(color)),
        );
    frame.render_widget(para, toast_area);
}
