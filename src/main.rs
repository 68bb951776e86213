//! qdash - quantum job and backend dashboard

mod display;
mod tui;

use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand};
use crossterm::{
    cursor::{Hide, Show},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen},
};
use qdash::dashboard::{DirectorySink, ExportFormat, StatusFilter};
use qdash::models::DashboardConfig;
use qdash::{Dashboard, DemoSource, JsonFileSource, SnapshotSource};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "qdash")]
#[command(about = "Dashboard for quantum jobs and backends", long_about = None)]
#[command(version)]
struct Cli {
    /// Read snapshots from this JSON file instead of the demo data
    #[arg(long, global = true, value_name = "PATH")]
    snapshot: Option<PathBuf>,

    /// Refresh period in seconds for the interactive dashboard
    #[arg(long, global = true, value_name = "SECONDS",
          value_parser = clap::value_parser!(u64).range(1..))]
    interval: Option<u64>,

    /// Directory export files are written to
    #[arg(long, global = true, value_name = "DIR")]
    export_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show summary cards, busiest backend and status distribution
    Status {
        /// Watch mode: refresh every N seconds
        #[arg(short, long, value_name = "SECONDS", default_value = "0")]
        watch: f64,
    },

    /// Show the job table
    Jobs {
        /// Only show jobs with this status: running, waiting, finished, failed
        /// or all (case-insensitive)
        #[arg(short, long, value_name = "STATUS")]
        status: Option<String>,

        /// Only show jobs whose id contains this text (case-insensitive)
        #[arg(short = 'q', long, value_name = "TEXT")]
        search: Option<String>,

        /// Watch mode: refresh every N seconds
        #[arg(short, long, value_name = "SECONDS", default_value = "0")]
        watch: f64,
    },

    /// Show backend status and queue depth
    Backends {
        /// Watch mode: refresh every N seconds
        #[arg(short, long, value_name = "SECONDS", default_value = "0")]
        watch: f64,
    },

    /// Show detailed information for a specific job
    Job {
        /// Job ID to inspect
        job_id: String,
    },

    /// Export all jobs to a file in the export directory
    Export {
        #[arg(short, long, value_enum, default_value_t)]
        format: ExportFormat,
    },

    /// Launch interactive TUI mode
    #[command(alias = "ui")]
    Tui,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let tui_mode = matches!(cli.command, Some(Commands::Tui));

    init_logging(tui_mode)?;

    let (mut config, config_warnings) =
        DashboardConfig::load().context("Failed to load configuration")?;

    // Command-line flags take precedence over files and environment
    if let Some(path) = cli.snapshot {
        config.source.snapshot_path = Some(path);
    }
    if let Some(secs) = cli.interval {
        config.refresh.interval_secs = secs;
    }
    if let Some(dir) = cli.export_dir {
        config.export.directory = Some(dir);
    }

    let source: Arc<dyn SnapshotSource> = match &config.source.snapshot_path {
        Some(path) => Arc::new(JsonFileSource::new(path)),
        None => Arc::new(DemoSource),
    };
    let mut dash = Dashboard::new(source, config.refresh.period());

    // The TUI shows these in its status bar instead
    if !tui_mode {
        for warning in &config_warnings {
            eprintln!("Warning: {}", warning);
        }
    }

    match cli.command {
        Some(Commands::Tui) => {
            tui::run(dash, config, config_warnings)?;
        }
        Some(Commands::Status { watch }) => {
            run_or_watch(&mut dash, watch, |dash| Ok(display::format_summary(dash)))?;
        }
        Some(Commands::Jobs { status, search, watch }) => {
            if let Some(status) = status {
                dash.set_filter(StatusFilter::parse(&status));
            }
            if let Some(search) = search {
                dash.set_search(search);
            }
            let id_max_length = config.display.id_max_length;
            report_warnings(&mut dash);
            run_or_watch(&mut dash, watch, |dash| Ok(jobs_frame(dash, id_max_length)))?;
        }
        Some(Commands::Backends { watch }) => {
            report_warnings(&mut dash);
            run_or_watch(&mut dash, watch, |dash| Ok(backends_frame(dash)))?;
        }
        Some(Commands::Job { job_id }) => {
            report_warnings(&mut dash);
            println!("{}", handle_job_command(&mut dash, &job_id)?);
        }
        Some(Commands::Export { format }) => {
            report_warnings(&mut dash);
            let sink = DirectorySink::new(config.export.directory_or_cwd());
            let exported = dash.export(&sink, format)?;
            println!(
                "Exported {} jobs to {}",
                exported.jobs,
                exported.path.display()
            );
        }
        None => {
            // Default: show status
            println!("{}", display::format_summary(&dash));
        }
    }

    Ok(())
}

/// Set up `tracing` output. The TUI owns the terminal, so it only logs to a file.
fn init_logging(tui_mode: bool) -> Result<()> {
    let filter = EnvFilter::try_from_env("QDASH_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));

    if tui_mode {
        let Some(path) = std::env::var_os("QDASH_LOG_FILE") else {
            return Ok(());
        };
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("Failed to open log file {}", PathBuf::from(&path).display()))?;
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_ansi(false)
            .with_writer(std::sync::Mutex::new(file))
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(io::stderr)
            .init();
    }
    Ok(())
}

/// Print dashboard warnings (e.g. a failed load) to stderr and forget them
fn report_warnings(dash: &mut Dashboard) {
    for warning in dash.warnings() {
        eprintln!("Warning: {}", warning);
    }
    dash.clear_warnings();
}

/// Filtered job table followed by any pending warnings
fn jobs_frame(dash: &Dashboard, id_max_length: usize) -> String {
    let mut frame = display::format_jobs(&dash.visible_jobs(), id_max_length);
    frame.push_str(&display::format_warnings(dash.warnings()));
    frame
}

/// Backend table followed by any pending warnings
fn backends_frame(dash: &Dashboard) -> String {
    let mut frame = display::format_backends(dash.snapshot().backends(), dash.busiest_backend());
    frame.push_str(&display::format_warnings(dash.warnings()));
    frame
}

/// Render once, or keep re-rendering every `watch` seconds
fn run_or_watch<F>(dash: &mut Dashboard, watch: f64, mut render: F) -> Result<()>
where
    F: FnMut(&mut Dashboard) -> Result<String>,
{
    if watch > 0.0 {
        watch_loop(watch, || watch_frame(dash, &mut render))
    } else {
        println!("{}", render(dash)?);
        Ok(())
    }
}

/// Refresh and render one watch frame. Warnings are shown in the frame
/// they were raised in, then dropped.
fn watch_frame<F>(dash: &mut Dashboard, render: &mut F) -> Result<String>
where
    F: FnMut(&mut Dashboard) -> Result<String>,
{
    dash.refresh();
    let frame = render(dash);
    dash.clear_warnings();
    frame
}

/// Watch loop that repeatedly executes a command with flicker-free updates
fn watch_loop<F>(interval: f64, mut command: F) -> Result<()>
where
    F: FnMut() -> Result<String>,
{
    // Set up Ctrl+C handler
    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();

    ctrlc::set_handler(move || {
        r.store(false, Ordering::SeqCst);
    })
    .map_err(|e| anyhow!("Error setting Ctrl-C handler: {}", e))?;

    // Enter alternate screen buffer and hide cursor for clean display
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, Hide)?;

    // Ensure we clean up on exit
    let cleanup = || -> Result<()> {
        let mut stdout = io::stdout();
        execute!(stdout, Show, LeaveAlternateScreen)?;
        Ok(())
    };

    let result = (|| -> Result<()> {
        while running.load(Ordering::SeqCst) {
            let timestamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S");

            let output = match command() {
                Ok(s) => s,
                Err(e) => format!("Error: {}", e),
            };

            let screen_content = format!(
                "{}\n\nLast updated: {} | Refreshing every {}s | Press Ctrl+C to exit",
                output, timestamp, interval
            );

            // Write everything at once with synchronized update (DEC private mode)
            // This prevents the terminal from rendering until the full frame is written
            write!(stdout, "\x1B[?2026h")?; // Begin synchronized update
            write!(stdout, "\x1B[H{}\x1B[J", screen_content)?;
            write!(stdout, "\x1B[?2026l")?; // End synchronized update
            stdout.flush()?;

            sleep_while_running(Duration::from_secs_f64(interval), &running);
        }
        Ok(())
    })();

    // Always clean up terminal state
    cleanup()?;

    // Print exit message on main screen
    println!("Watch mode stopped.");

    result
}

/// Sleep in short slices so Ctrl+C does not wait out a long interval
fn sleep_while_running(total: Duration, running: &AtomicBool) {
    let slice = Duration::from_millis(100);
    let mut remaining = total;
    while running.load(Ordering::SeqCst) && !remaining.is_zero() {
        let step = remaining.min(slice);
        thread::sleep(step);
        remaining -= step;
    }
}

fn handle_job_command(dash: &mut Dashboard, job_id: &str) -> Result<String> {
    dash.select(job_id)?;
    let job = dash
        .selected_job()
        .ok_or_else(|| anyhow!("Job '{}' disappeared from the snapshot", job_id))?;
    Ok(display::format_job_details(job))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use qdash::models::SnapshotDocument;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["qdash", "jobs", "--status", "failed", "--interval", "5"])
            .unwrap();
        assert_eq!(cli.interval, Some(5));
        assert!(matches!(
            cli.command,
            Some(Commands::Jobs { status: Some(ref s), .. }) if s == "failed"
        ));
    }

    #[test]
    fn test_interval_must_be_positive() {
        assert!(Cli::try_parse_from(["qdash", "--interval", "0"]).is_err());
    }

    #[test]
    fn test_export_format_defaults_to_csv() {
        let cli = Cli::try_parse_from(["qdash", "export"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Export { format: ExportFormat::Csv })));

        let cli = Cli::try_parse_from(["qdash", "export", "--format", "json"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Export { format: ExportFormat::Json })));
    }

    fn snapshot_file(name: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("qdash_main_{}_{}.json", name, std::process::id()));
        let doc = SnapshotDocument {
            jobs: DemoSource::jobs(),
            backends: DemoSource::backends(),
            trends: vec![],
        };
        std::fs::write(&path, serde_json::to_string(&doc).unwrap()).unwrap();
        path
    }

    #[test]
    fn test_watch_frame_reports_failed_refresh() {
        let path = snapshot_file("watch_jobs");
        let mut dash = Dashboard::new(Arc::new(JsonFileSource::new(&path)), Duration::from_secs(30));
        std::fs::remove_file(&path).unwrap();

        let mut render = |dash: &mut Dashboard| Ok(jobs_frame(dash, 24));
        let frame = watch_frame(&mut dash, &mut render).unwrap();
        assert!(frame.contains("QJ-1001"));
        assert_eq!(frame.matches("Refresh failed").count(), 1);
        assert!(dash.warnings().is_empty());

        // Each failing frame reports its own failure once
        let frame = watch_frame(&mut dash, &mut render).unwrap();
        assert_eq!(frame.matches("Refresh failed").count(), 1);
    }

    #[test]
    fn test_backends_watch_frame_reports_failed_refresh() {
        let path = snapshot_file("watch_backends");
        let mut dash = Dashboard::new(Arc::new(JsonFileSource::new(&path)), Duration::from_secs(30));

        let mut render = |dash: &mut Dashboard| Ok(backends_frame(dash));
        let frame = watch_frame(&mut dash, &mut render).unwrap();
        assert!(!frame.contains("Refresh failed"));

        std::fs::remove_file(&path).unwrap();
        let frame = watch_frame(&mut dash, &mut render).unwrap();
        assert!(frame.contains("ibmq_manila"));
        assert!(frame.contains("Refresh failed"));
    }

    #[test]
    fn test_job_command_unknown_id() {
        let mut dash = Dashboard::new(Arc::new(DemoSource), Duration::from_secs(30));
        assert!(handle_job_command(&mut dash, "QJ-9999").is_err());
        let details = handle_job_command(&mut dash, "QJ-1002").unwrap();
        assert!(details.contains("QJ-1002"));
    }
}
