mod logging;
mod tables;
mod tui;

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use rollcall_core::usecase::dashboard::DashboardUseCase;
use rollcall_core::usecase::report::ReportUseCase;
use rollcall_core::config::MAX_DAYS;
use rollcall_core::{demo_store, parse_day, resolve_seed, today, AttendanceService, Config, TrendScope};
use tracing::info;

#[derive(Parser)]
#[command(name = "rollcall")]
#[command(about = "Track and report school attendance", long_about = None)]
struct Cli {
    /// Path to a JSON config file (default: ~/.rollcall/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Seed for the generated demo data
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Show class statistics for a day (today, yesterday, -3d, 2024-01-31)
    Dashboard {
        #[arg(long, default_value = "today")]
        date: String,
    },
    /// List students, optionally filtered by name, roll number or email
    Students {
        #[arg(long)]
        search: Option<String>,
    },
    /// Show attendance statistics for one student (id or roll number)
    Student {
        key: String,
    },
    /// Show the daily attendance rate for recent days
    Trend {
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..=MAX_DAYS as i64))]
        days: Option<u32>,
    },
    /// Generate the final attendance report
    Report {
        #[arg(long, value_enum, default_value_t = ReportFormat::Markdown)]
        format: ReportFormat,
        /// Write to this file instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Open the Terminal User Interface
    Tui,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ReportFormat {
    Markdown,
    Json,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut config = Config::load(cli.config.as_deref())?;
    if cli.seed.is_some() {
        config.seed = cli.seed;
    }

    let _guard = logging::init(&config.log_dir()?, cli.verbose)?;

    let today = today();
    let seed = resolve_seed(config.seed);
    let store = demo_store(seed, today, config.history_days)?;
    let service = AttendanceService::new(store);
    info!(seed, %today, "rollcall started");

    match cli.command {
        Some(Commands::Dashboard { date }) => {
            let date = parse_day(&date, today)?;
            let dashboard = DashboardUseCase::new(&service).build(date, 10)?;
            tables::print_dashboard(&dashboard);
        }
        Some(Commands::Students { search }) => {
            let students = service.search_students(search.as_deref().unwrap_or(""))?;
            tables::print_students(&students);
        }
        Some(Commands::Student { key }) => {
            let student = service.resolve_student(&key)?;
            let stats = service.student_stats(&student.id)?;
            tables::print_student(&student, &stats);
        }
        Some(Commands::Trend { days }) => {
            let days = days.unwrap_or(config.trend_days);
            let points = service.trend(TrendScope::All, days, today)?;
            tables::print_trend(&points);
        }
        Some(Commands::Report { format, out }) => {
            let report = ReportUseCase::new(&service).build(today, config.trend_days, config.low_attendance_threshold)?;
            let content = match format {
                ReportFormat::Markdown => report.to_markdown(),
                ReportFormat::Json => report.to_json()?,
            };
            match out {
                Some(path) => {
                    fs::write(&path, content)
                        .with_context(|| format!("Failed to write report to {}", path.display()))?;
                    println!("Report written to {}", path.display());
                }
                None => print!("{}", content),
            }
        }
        Some(Commands::Tui) | None => {
            tui::run(service, config, today)?;
        }
    }
    Ok(())
}
