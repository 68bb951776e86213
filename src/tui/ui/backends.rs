//! Backends panel rendering

use qdash::formatting::{format_percent, format_seconds};
use qdash::models::Backend;
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Cell, Paragraph, Row, Table};

use crate::tui::app::App;
use crate::tui::theme::Theme;

use super::widgets::{create_queue_bar, create_table_header};

const QUEUE_BAR_WIDTH: usize = 10;

pub fn render_backends_view(app: &App, frame: &mut Frame, area: Rect, theme: &Theme) {
    let backends = app.dashboard.snapshot().backends();

    let busiest = match app.dashboard.busiest_backend() {
        Some(b) => Line::from(vec![
            Span::raw(" Busiest: "),
            Span::styled(b.name.as_str(), Style::default().fg(theme.border_focused).bold()),
            Span::raw(format!(" with a queue of {} ", b.queue)),
        ]),
        None => Line::from(" Busiest: no backends "),
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.border))
        .title(format!(" Backends ({}) ", backends.len()))
        .title_bottom(busiest);

    let inner = block.inner(area);
    frame.render_widget(block, area);

    if backends.is_empty() {
        let para = Paragraph::new("No backends in snapshot")
            .style(Style::default().fg(theme.muted))
            .alignment(Alignment::Center);
        frame.render_widget(para, inner);
        return;
    }

    let max_queue = backends.iter().map(|b| b.queue).max().unwrap_or(0);

    let header = create_table_header(
        &["Backend", "Status", "Queue", "", "Avg. Time", "Uptime", "Errors"],
        theme,
    );

    let rows: Vec<Row> = backends
        .iter()
        .take(inner.height.saturating_sub(1) as usize)
        .map(|b| backend_to_row(b, max_queue, theme))
        .collect();

    let widths = [
        Constraint::Min(14),
        Constraint::Length(12),
        Constraint::Length(5),
        Constraint::Length(QUEUE_BAR_WIDTH as u16 + 2),
        Constraint::Length(11),
        Constraint::Length(7),
        Constraint::Length(7),
    ];

    let table = Table::new(rows, widths).header(header);
    frame.render_widget(table, inner);
}

fn backend_to_row<'a>(backend: &'a Backend, max_queue: u32, theme: &Theme) -> Row<'a> {
    let status_color = theme.backend_status_color(&backend.status);

    // Unqueryable backends report no average time
    let avg_time = match backend.avg_time {
        Some(secs) => Cell::from(format!("⏱ {}", format_seconds(secs))),
        None => Cell::from("—").style(Style::default().fg(theme.muted)),
    };
    let errors = match backend.error_rate_percent() {
        Some(pct) => Cell::from(format_percent(pct)),
        None => Cell::from("—").style(Style::default().fg(theme.muted)),
    };

    Row::new(vec![
        Cell::from(backend.name.as_str()),
        Cell::from(backend.status.as_str()).style(Style::default().fg(status_color)),
        Cell::from(backend.queue.to_string()),
        Cell::from(create_queue_bar(backend.queue, max_queue, QUEUE_BAR_WIDTH, theme)),
        avg_time,
        Cell::from(format_percent(backend.uptime)),
        errors,
    ])
}
