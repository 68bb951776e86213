//! Chart panels: status distribution, queue depth and job trends

use qdash::dashboard::SeriesPoint;
use qdash::models::JobStatus;
use ratatui::prelude::*;
use ratatui::symbols;
use ratatui::widgets::{
    Axis, Bar, BarChart, BarGroup, Block, Borders, Chart, Dataset, GraphType, Paragraph,
};

use crate::tui::app::App;
use crate::tui::theme::Theme;

pub fn render_charts(app: &App, frame: &mut Frame, area: Rect, theme: &Theme) {
    let layout = Layout::horizontal([
        Constraint::Percentage(30),
        Constraint::Percentage(30),
        Constraint::Percentage(40),
    ])
    .split(area);

    let distribution = app.dashboard.pie_series();
    let distribution_bars: Vec<Bar> = distribution
        .iter()
        .map(|p| {
            let color = theme.job_status_color(&JobStatus::parse(&p.label));
            series_bar(p, color)
        })
        .collect();
    render_bar_chart(frame, layout[0], " Job Status ", &distribution_bars, theme);

    let queues = app.dashboard.bar_series();
    let queue_bars: Vec<Bar> = queues.iter().map(|p| series_bar(p, theme.bar)).collect();
    render_bar_chart(frame, layout[1], " Queue Depth ", &queue_bars, theme);

    render_trend_chart(app, frame, layout[2], theme);
}

fn series_bar(point: &SeriesPoint, color: Color) -> Bar<'_> {
    Bar::default()
        .value(point.value)
        .label(Line::from(point.label.as_str()))
        .style(Style::default().fg(color))
        .value_style(Style::default().fg(Color::Black).bg(color))
}

fn render_bar_chart(frame: &mut Frame, area: Rect, title: &str, bars: &[Bar], theme: &Theme) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.border))
        .title(title.to_string());

    if bars.is_empty() {
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(
            Paragraph::new("No data")
                .style(Style::default().fg(theme.muted))
                .alignment(Alignment::Center),
            inner,
        );
        return;
    }

    let bar_width = bar_width(area.width.saturating_sub(2), bars.len());

    let chart = BarChart::default()
        .block(block)
        .data(BarGroup::default().bars(bars))
        .bar_width(bar_width)
        .bar_gap(1)
        .label_style(Style::default().fg(theme.fg));

    frame.render_widget(chart, area);
}

/// Spread `bars` over `inner_width` columns with a one-column gap between them
fn bar_width(inner_width: u16, bars: usize) -> u16 {
    let count = u16::try_from(bars).unwrap_or(u16::MAX).max(1);
    (inner_width.saturating_sub(count - 1) / count).clamp(1, 12)
}

fn render_trend_chart(app: &App, frame: &mut Frame, area: Rect, theme: &Theme) {
    let trends = app.dashboard.trend_series();

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.border))
        .title(" Job Trends ");

    if trends.is_empty() {
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(
            Paragraph::new("No trend data")
                .style(Style::default().fg(theme.muted))
                .alignment(Alignment::Center),
            inner,
        );
        return;
    }

    let points = |value: fn(&qdash::models::TrendPoint) -> u32| -> Vec<(f64, f64)> {
        trends
            .iter()
            .enumerate()
            .map(|(i, t)| (i as f64, f64::from(value(t))))
            .collect()
    };
    let running = points(|t| t.running);
    let finished = points(|t| t.finished);
    let failed = points(|t| t.failed);

    let y_max = trends
        .iter()
        .map(|t| t.running.max(t.finished).max(t.failed))
        .max()
        .unwrap_or(0)
        .max(1);

    let datasets = vec![
        trend_dataset("running", &running, theme.running),
        trend_dataset("finished", &finished, theme.finished),
        trend_dataset("failed", &failed, theme.failed),
    ];

    let x_labels: Vec<Span> = match (trends.first(), trends.last()) {
        (Some(first), Some(last)) if trends.len() > 1 => {
            vec![Span::raw(first.time.as_str()), Span::raw(last.time.as_str())]
        }
        (Some(only), _) => vec![Span::raw(only.time.as_str())],
        _ => Vec::new(),
    };

    let chart = Chart::new(datasets)
        .block(block)
        .x_axis(
            Axis::default()
                .style(Style::default().fg(theme.muted))
                .bounds([0.0, (trends.len().saturating_sub(1)).max(1) as f64])
                .labels(x_labels),
        )
        .y_axis(
            Axis::default()
                .style(Style::default().fg(theme.muted))
                .bounds([0.0, f64::from(y_max)])
                .labels(vec![Span::raw("0"), Span::raw(y_max.to_string())]),
        );

    frame.render_widget(chart, area);
}

fn trend_dataset<'a>(name: &'a str, data: &'a [(f64, f64)], color: Color) -> Dataset<'a> {
    Dataset::default()
        .name(name)
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(color))
        .data(data)
}
