//! Display and formatting functions for the one-shot CLI

use owo_colors::OwoColorize;
use qdash::Dashboard;
use qdash::dashboard::StatusCounts;
use qdash::formatting::{
    format_clock, format_number, format_percent, format_seconds, layout, queue_bar,
    truncate_string,
};
use qdash::models::{Backend, BackendStatus, Job, JobStatus};
use tabled::{
    Table, Tabled,
    settings::{Alignment, Modify, Style, Width, object::Rows},
};

const BOX_WIDTH: usize = 78;

/// Color a job status literal
pub fn format_job_status(status: &JobStatus) -> String {
    let s = status.as_str();
    match status {
        JobStatus::Running => s.green().to_string(),
        JobStatus::Waiting => s.yellow().to_string(),
        JobStatus::Finished => s.bright_blue().to_string(),
        JobStatus::Failed => s.red().to_string(),
        JobStatus::Unknown(_) => s.white().to_string(),
    }
}

/// Color a backend status with a state indicator
pub fn format_backend_status(status: &BackendStatus) -> String {
    let s = status.as_str();
    match status {
        BackendStatus::Online => format!("{} {}", "●".green(), s.green()),
        BackendStatus::Maintenance => format!("{} {}", "◐".yellow(), s.yellow()),
        BackendStatus::Offline => format!("{} {}", "○".bright_red(), s.bright_red()),
        BackendStatus::Unknown(_) => format!("{} {}", "○".bright_black(), s.white()),
    }
}

/// Strip ANSI color codes to calculate visible width
fn strip_ansi(s: &str) -> String {
    let mut result = String::new();
    let mut in_escape = false;

    for ch in s.chars() {
        if ch == '\x1b' {
            in_escape = true;
        } else if in_escape && ch == 'm' {
            in_escape = false;
        } else if !in_escape {
            result.push(ch);
        }
    }

    result
}

/// Pad a line to fit within the box
fn pad_line(content: &str) -> String {
    let visible_len = strip_ansi(content).chars().count();
    let padding = " ".repeat(BOX_WIDTH.saturating_sub(visible_len));
    format!("{}{}{}{}", "│".blue(), content, padding, "│".blue())
}

fn box_top(title: &str) -> String {
    let title = format!(" {} ", title);
    let side = BOX_WIDTH.saturating_sub(title.chars().count());
    let left = side / 2;
    format!(
        "╭{}{}{}╮",
        "─".repeat(left),
        title,
        "─".repeat(side - left)
    )
    .blue()
    .to_string()
}

fn box_blank() -> String {
    format!("│{}│", " ".repeat(BOX_WIDTH)).blue().to_string()
}

fn box_bottom() -> String {
    format!("╰{}╯", "─".repeat(BOX_WIDTH)).blue().to_string()
}

/// Create a distribution bar for a share of the total
fn create_bar(count: usize, total: usize) -> String {
    let filled = if total == 0 {
        0
    } else {
        ((count as f64 / total as f64) * layout::BAR_LENGTH as f64).round() as usize
    };
    let filled = filled.min(layout::BAR_LENGTH);
    format!(
        "{}{}",
        "█".repeat(filled),
        "░".repeat(layout::BAR_LENGTH - filled).white()
    )
}

/// Busiest backend as a one-line leaderboard entry
pub fn format_busiest(busiest: Option<&Backend>) -> String {
    match busiest {
        Some(b) => format!("{} with a queue of {}", b.name.bold(), b.queue),
        None => "no backends".bright_black().to_string(),
    }
}

fn format_distribution(counts: &StatusCounts) -> String {
    let mut output = String::new();
    let total = counts.total();
    if counts.is_empty() {
        output.push_str(&format!("{}\n", pad_line(&format!("  {}", "No jobs".yellow()))));
        return output;
    }
    for (status, n) in counts.iter() {
        let line = format!(
            "  {:<12} {} {:>4}",
            format_job_status(status),
            create_bar(n, total),
            n
        );
        output.push_str(&format!("{}\n", pad_line(&line)));
    }
    output
}

/// Summary cards, busiest backend and status distribution
pub fn format_summary(dash: &Dashboard) -> String {
    let summary = dash.summary();
    let mut output = String::new();

    output.push_str(&format!("\n{}\n", box_top("Quantum Dashboard")));
    output.push_str(&format!("{}\n", box_blank()));

    let updated = dash
        .last_updated()
        .map_or_else(|| "never".to_string(), |t| format_clock(&t));
    let header = format!(
        "  {} (last updated {})",
        dash.source().describe().bold(),
        updated
    );
    output.push_str(&format!("{}\n", pad_line(&header)));
    output.push_str(&format!("{}\n", box_blank()));

    let jobs_line = format!(
        "  {}: {} total • {} running • {} waiting • {} finished • {}",
        "Jobs".yellow(),
        summary.total,
        summary.running,
        summary.waiting,
        summary.finished,
        format!("{} failed", summary.failed).red()
    );
    output.push_str(&format!("{}\n", pad_line(&jobs_line)));

    let backends = dash.snapshot().backends();
    let online = backends.iter().filter(|b| b.status.is_online()).count();
    let mut backends_line = format!(
        "  {}: {} total • {} online",
        "Backends".green(),
        backends.len(),
        online
    );
    if let Some(avg) = average_backend_time(backends) {
        backends_line.push_str(&format!(" • avg. time {}s", avg));
    }
    output.push_str(&format!("{}\n", pad_line(&backends_line)));

    let busiest_line = format!(
        "  {}: {}",
        "Busiest".magenta(),
        format_busiest(dash.busiest_backend())
    );
    output.push_str(&format!("{}\n", pad_line(&busiest_line)));

    output.push_str(&format!("{}\n", box_blank()));
    output.push_str(&format!("{}\n", box_bottom()));

    output.push_str(&format!("\n{}\n", box_top("Status Distribution")));
    output.push_str(&format!("{}\n", box_blank()));
    output.push_str(&format_distribution(&dash.status_counts()));
    output.push_str(&format!("{}\n", box_blank()));
    output.push_str(&box_bottom());
    output.push_str(&format_warnings(dash.warnings()));

    output
}

/// One `warning:` line per entry, each on its own line below a frame
pub fn format_warnings(warnings: &[String]) -> String {
    warnings
        .iter()
        .map(|warning| format!("\n{} {}", "warning:".yellow().bold(), warning))
        .collect()
}

/// Table row for job display
#[derive(Tabled)]
struct JobRow {
    #[tabled(rename = "Job ID")]
    id: String,

    #[tabled(rename = "Status")]
    status: String,

    #[tabled(rename = "Backend")]
    backend: String,

    #[tabled(rename = "Submitted At")]
    submitted: String,

    #[tabled(rename = "Duration")]
    duration: String,

    #[tabled(rename = "Shots")]
    shots: String,
}

/// Display jobs in a table format; failed jobs are highlighted
pub fn format_jobs(jobs: &[&Job], id_max_length: usize) -> String {
    if jobs.is_empty() {
        return "No jobs found".yellow().to_string();
    }

    let rows: Vec<JobRow> = jobs
        .iter()
        .map(|job| {
            let id = truncate_string(&job.id, id_max_length);
            JobRow {
                id: if job.status == JobStatus::Failed {
                    id.red().bold().to_string()
                } else {
                    id
                },
                status: format_job_status(&job.status),
                backend: job.backend.clone(),
                submitted: job.created.clone(),
                duration: job.duration_display().to_string(),
                shots: job.shots.to_string(),
            }
        })
        .collect();

    let mut table = Table::new(rows);
    table
        .with(Style::rounded())
        .with(Width::wrap(200).keep_words(true))
        .with(Modify::new(Rows::first()).with(Alignment::center()));

    table.to_string()
}

/// Table row for backend display
#[derive(Tabled)]
struct BackendRow {
    #[tabled(rename = "Backend")]
    name: String,

    #[tabled(rename = "Status")]
    status: String,

    #[tabled(rename = "Queue")]
    queue: String,

    #[tabled(rename = "Avg. Time")]
    avg_time: String,

    #[tabled(rename = "Uptime")]
    uptime: String,

    #[tabled(rename = "Error Rate")]
    error_rate: String,
}

/// Display backends with queue bars scaled to the deepest queue
pub fn format_backends(backends: &[Backend], busiest: Option<&Backend>) -> String {
    if backends.is_empty() {
        return "No backends found".yellow().to_string();
    }

    let max_queue = busiest.map_or(0, |b| b.queue);
    let rows: Vec<BackendRow> = backends
        .iter()
        .map(|b| {
            let bar = queue_bar(b.queue, max_queue, 10);
            let is_busiest = busiest.is_some_and(|top| top.name == b.name);
            BackendRow {
                name: if is_busiest {
                    b.name.bold().to_string()
                } else {
                    b.name.clone()
                },
                status: format_backend_status(&b.status),
                queue: format!("{:>3} {}", b.queue, bar),
                avg_time: b.avg_time.map_or_else(|| "—".to_string(), format_seconds),
                uptime: format_percent(b.uptime),
                error_rate: b
                    .error_rate_percent()
                    .map_or_else(|| "—".to_string(), format_percent),
            }
        })
        .collect();

    let mut table = Table::new(rows);
    table
        .with(Style::rounded())
        .with(Modify::new(Rows::first()).with(Alignment::center()));

    let mut output = table.to_string();
    output.push_str(&format!("\nBusiest backend: {}", format_busiest(busiest)));
    output
}

/// Key/value detail view of a single job
pub fn format_job_details(job: &Job) -> String {
    let fields = [
        ("Job ID", job.id.clone()),
        ("Status", format_job_status(&job.status)),
        ("Backend", job.backend.clone()),
        ("Submitted", job.created.clone()),
        ("Duration", job.duration_display().to_string()),
        ("Shots", job.shots.to_string()),
    ];

    let mut output = String::new();
    output.push_str(&format!("\n{}\n", box_top("Job Details")));
    for (label, value) in fields {
        output.push_str(&format!(
            "{}\n",
            pad_line(&format!("  {:<10} {}", format!("{}:", label).bold(), value))
        ));
    }
    output.push_str(&box_bottom());
    output
}

/// Average of the optional backend times, for the footer line
pub fn average_backend_time(backends: &[Backend]) -> Option<String> {
    let times: Vec<f64> = backends.iter().filter_map(|b| b.avg_time).collect();
    if times.is_empty() {
        return None;
    }
    Some(format_number(times.iter().sum::<f64>() / times.len() as f64))
}
