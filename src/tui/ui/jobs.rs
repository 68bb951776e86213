//! Jobs table rendering

use qdash::formatting::truncate_string;
use qdash::models::{Job, JobStatus};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Cell, Paragraph, Row, Table};

use crate::tui::app::App;
use crate::tui::theme::Theme;

use super::widgets::{calculate_scroll_offset, create_table_header};

/// Render the filtered job list. Returns the number of rows that fit.
pub fn render_jobs_view(app: &App, frame: &mut Frame, area: Rect, theme: &Theme) -> usize {
    let jobs = app.dashboard.visible_jobs();
    let total = app.dashboard.snapshot().jobs().len();

    let title = if jobs.len() == total {
        format!(" Jobs ({}) ", total)
    } else {
        format!(" Jobs ({} of {}) ", jobs.len(), total)
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.border_focused))
        .title(title);

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let available_height = inner.height.saturating_sub(1) as usize; // -1 for header

    if jobs.is_empty() {
        let msg = if total == 0 {
            "No jobs in snapshot"
        } else {
            "No jobs match the current filter"
        };
        let para = Paragraph::new(msg)
            .style(Style::default().fg(theme.muted))
            .alignment(Alignment::Center);
        frame.render_widget(para, inner);
        return available_height;
    }

    let header = create_table_header(
        &["ID", "Status", "Backend", "Created", "Duration", "Shots"],
        theme,
    );

    let selected = app.jobs_list.selected;
    let scroll_offset = calculate_scroll_offset(selected, available_height, jobs.len());

    let rows: Vec<Row> = jobs
        .iter()
        .enumerate()
        .skip(scroll_offset)
        .take(available_height)
        .map(|(idx, job)| job_to_row(job, idx == selected, app.id_max_length, theme))
        .collect();

    let widths = [
        Constraint::Length(app.id_max_length.clamp(4, 24) as u16),
        Constraint::Length(10),
        Constraint::Min(12),
        Constraint::Length(16),
        Constraint::Length(9),
        Constraint::Length(7),
    ];

    let table = Table::new(rows, widths).header(header);
    frame.render_widget(table, inner);

    available_height
}

fn job_to_row<'a>(job: &'a Job, is_selected: bool, id_max_length: usize, theme: &Theme) -> Row<'a> {
    let status_color = theme.job_status_color(&job.status);

    let row_style = if is_selected {
        Style::default().bg(theme.selected_bg).fg(theme.selected_fg)
    } else if job.status == JobStatus::Failed {
        Style::default().bg(theme.failed_row_bg)
    } else {
        Style::default()
    };

    let duration_style = if job.duration.is_some() {
        Style::default()
    } else {
        Style::default().fg(theme.muted)
    };

    Row::new(vec![
        Cell::from(truncate_string(&job.id, id_max_length)),
        Cell::from(job.status.label().to_string()).style(Style::default().fg(status_color)),
        Cell::from(job.backend.as_str()),
        Cell::from(job.created.as_str()),
        Cell::from(job.duration_display()).style(duration_style),
        Cell::from(job.shots.to_string()),
    ])
    .style(row_style)
}
