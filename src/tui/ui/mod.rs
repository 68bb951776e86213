//! UI rendering for the TUI
//!
//! This module handles all rendering using ratatui. The rendering is event-driven -
//! we only render when an event triggers a state change, plus a slow redraw tick
//! so toasts and errors expire on screen.

mod backends;
mod charts;
mod jobs;
mod overlays;
mod widgets;

use chrono::Local;
use qdash::dashboard::RefreshPhase;
use qdash::formatting::format_clock;
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::tui::app::{App, ModalState};
use crate::tui::theme::Theme;

use backends::render_backends_view;
use charts::render_charts;
use jobs::render_jobs_view;
use overlays::{render_help_overlay, render_job_detail_popup, render_search_overlay, render_toast};

/// Render the entire TUI
pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    // Main layout: header, cards, tables, charts, footer
    let layout = Layout::vertical([
        Constraint::Length(1),  // Info bar
        Constraint::Length(3),  // Summary cards
        Constraint::Min(8),     // Jobs and backends
        Constraint::Length(10), // Charts
        Constraint::Length(2),  // Status bar
    ])
    .split(area);

    let body = Layout::horizontal([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(layout[2]);

    let visible_rows = {
        let app: &App = app;
        let theme = &app.theme;

        render_info_bar(app, frame, layout[0], theme);
        render_summary_cards(app, frame, layout[1], theme);
        let rows = render_jobs_view(app, frame, body[0], theme);
        render_backends_view(app, frame, body[1], theme);
        render_charts(app, frame, layout[3], theme);
        render_status_bar(app, frame, layout[4], theme);

        // Overlays (render in order of z-index)
        match &app.modal {
            ModalState::Help => render_help_overlay(frame, area, theme),
            ModalState::Search { .. } => render_search_overlay(app, frame, area, theme),
            ModalState::Detail => render_job_detail_popup(app, frame, area, theme),
            ModalState::None => {}
        }

        if let Some(toast) = app.feedback.current_toast() {
            render_toast(toast, frame, area, theme);
        }

        rows
    };

    // Page navigation jumps by what the table can actually show
    app.jobs_list.visible_count = visible_rows;
}

fn render_info_bar(app: &App, frame: &mut Frame, area: Rect, theme: &Theme) {
    let view = app.dashboard.view();

    let updated = match app.dashboard.last_updated() {
        Some(at) => format!("Last updated {}", format_clock(&at)),
        None => "Never updated".to_string(),
    };

    let mut info = format!(
        " qdash | {} | {} | Filter: {}",
        app.dashboard.source().describe(),
        updated,
        view.filter.label()
    );
    if !view.search.is_empty() {
        info.push_str(&format!(" | Search: {}", view.search));
    }

    let style = if is_stale(app) {
        Style::default().fg(theme.stale_indicator)
    } else {
        Style::default().fg(theme.border)
    };

    frame.render_widget(Paragraph::new(info).style(style), area);
}

/// Data is stale once two refresh periods pass without a successful update
fn is_stale(app: &App) -> bool {
    let Some(at) = app.dashboard.last_updated() else {
        return true;
    };
    let age = Local::now().signed_duration_since(at);
    age.num_seconds() > 2 * app.dashboard.period().as_secs() as i64
}

fn render_summary_cards(app: &App, frame: &mut Frame, area: Rect, theme: &Theme) {
    let summary = app.dashboard.summary();

    let cards = [
        ("Total Jobs", summary.total, theme.fg),
        ("Running", summary.running, theme.running),
        ("Waiting", summary.waiting, theme.waiting),
        ("Finished", summary.finished, theme.finished),
        ("Failed", summary.failed, theme.failed),
    ];

    let columns = Layout::horizontal([Constraint::Ratio(1, cards.len() as u32); 5]).split(area);

    for ((title, value, color), column) in cards.into_iter().zip(columns.iter()) {
        let card = Paragraph::new(Line::from(Span::styled(
            value.to_string(),
            Style::default().fg(color).bold(),
        )))
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.border))
                .title(format!(" {} ", title)),
        );
        frame.render_widget(card, *column);
    }
}

fn render_status_bar(app: &App, frame: &mut Frame, area: Rect, theme: &Theme) {
    let layout = Layout::vertical([Constraint::Length(1), Constraint::Length(1)]).split(area);

    let keybinds = match &app.modal {
        ModalState::Search { .. } => " Enter:apply  Esc:cancel  Ctrl+u:clear ",
        ModalState::Detail => " Esc/Enter:close  q:close ",
        ModalState::Help => " ?/Esc:close ",
        ModalState::None => {
            " j/k:move  Enter:detail  /:search  f:filter  r:refresh  e/E:export  ?:help  q:quit "
        }
    };
    let keybinds_para = Paragraph::new(keybinds).style(Style::default().fg(theme.border));
    frame.render_widget(keybinds_para, layout[0]);

    let mut status_parts = Vec::new();

    let summary = app.dashboard.summary();
    status_parts.push(Span::styled(" Jobs: ", Style::default().fg(theme.border)));
    status_parts.push(Span::styled(
        format!("{} running", summary.running),
        Style::default().fg(theme.running),
    ));
    status_parts.push(Span::raw(", "));
    status_parts.push(Span::styled(
        format!("{} waiting", summary.waiting),
        Style::default().fg(theme.waiting),
    ));

    let offline = app
        .dashboard
        .snapshot()
        .backends()
        .iter()
        .filter(|b| !b.status.is_online())
        .count();
    if offline > 0 {
        status_parts.push(Span::raw(" | "));
        status_parts.push(Span::styled(
            format!("{} backends not online", offline),
            Style::default().fg(theme.maintenance),
        ));
    }

    status_parts.push(Span::raw(" | "));
    match app.dashboard.phase() {
        RefreshPhase::Refreshing => status_parts.push(Span::styled(
            "Refreshing...",
            Style::default().fg(theme.waiting),
        )),
        RefreshPhase::Idle => status_parts.push(Span::styled(
            format!("Every {}s", app.dashboard.period().as_secs()),
            Style::default().fg(theme.border),
        )),
    }

    // Config warnings display (persistent until fixed)
    if !app.feedback.config_warnings.is_empty() {
        let warning_text = if app.feedback.config_warnings.len() == 1 {
            format!(" | WARN: {}", app.feedback.config_warnings[0])
        } else {
            format!(
                " | WARN: {} (+{} more)",
                app.feedback.config_warnings[0],
                app.feedback.config_warnings.len() - 1
            )
        };
        status_parts.push(Span::styled(
            warning_text,
            Style::default().fg(theme.progress_warn),
        ));
    }

    // Error display (temporary, auto-dismisses)
    if let Some(error) = app.feedback.current_error() {
        status_parts.push(Span::styled(
            format!(" | ERROR: {} ", error),
            Style::default().fg(theme.failed),
        ));
    }

    frame.render_widget(Paragraph::new(Line::from(status_parts)), layout[1]);
}
