//! qualtrack CLI - shop qualification progress.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use qualtrack_certification::GateState;
use qualtrack_core::{Clock, Enrollment, FixedClock, Schedule, StudentId, SystemClock, TaskId};
use qualtrack_progress::{
    build_report, Pace, ProgramOverview, Projection, QualificationTracker, StudentReport,
    TrackerConfig,
};
use qualtrack_storage::MemoryStore;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "qualtrack")]
#[command(about = "Shop qualification progress tracker", long_about = None)]
struct Cli {
    /// Schedule file (JSON); the built-in curriculum is used when omitted
    #[arg(long, global = true)]
    schedule: Option<PathBuf>,

    /// Evaluate as of this date (YYYY-MM-DD) instead of today
    #[arg(long, global = true)]
    as_of: Option<NaiveDate>,

    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List categories and tasks
    Schedule {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Validate the file given with --schedule
    Validate,
    /// Report for one student
    Report {
        /// Student id
        #[arg(long, default_value = "student")]
        student: String,
        /// Enrollment start date
        #[arg(long)]
        start_date: NaiveDate,
        /// Signed-off task ids, comma separated
        #[arg(long, value_delimiter = ',')]
        completed: Vec<String>,
        /// Written exam pass date
        #[arg(long)]
        written_exam_date: Option<NaiveDate>,
        /// Oral board pass date
        #[arg(long)]
        oral_board_date: Option<NaiveDate>,
        /// Certificate number
        #[arg(long)]
        certificate: Option<String>,
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Program-wide overview from a roster file
    Overview {
        /// Roster file (JSON)
        #[arg(long)]
        roster: PathBuf,
        /// Flag on-track students with less slack than this
        #[arg(long, default_value = "30")]
        margin_days: i64,
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let clock: Box<dyn Clock> = match cli.as_of {
        Some(date) => Box::new(FixedClock::at_date(date)),
        None => Box::new(SystemClock),
    };

    match cli.command {
        Commands::Schedule { json } => {
            let schedule = load_schedule(cli.schedule.as_deref())?;
            if json {
                println!("{}", serde_json::to_string_pretty(&schedule)?);
                return Ok(());
            }

            println!(
                "Curriculum: {} tasks, {} months",
                schedule.total_tasks(),
                schedule.program().time_limit_months
            );
            for category in schedule.categories() {
                println!("  {}. {} ({} tasks)", category.id, category.title, category.tasks.len());
                for task in &category.tasks {
                    println!("     {:<5} {}", task.id, task.description);
                }
            }
        }
        Commands::Validate => {
            let Some(file) = cli.schedule.as_deref() else {
                anyhow::bail!("validate requires --schedule <file>");
            };
            let schedule = load_schedule(Some(file))?;
            println!(
                "{}: OK ({} categories, {} tasks, {} months)",
                file.display(),
                schedule.categories().len(),
                schedule.total_tasks(),
                schedule.program().time_limit_months
            );
        }
        Commands::Report {
            student,
            start_date,
            completed,
            written_exam_date,
            oral_board_date,
            certificate,
            json,
        } => {
            let schedule = load_schedule(cli.schedule.as_deref())?;
            let enrollment = Enrollment {
                student_id: StudentId::new(student),
                start_date,
                written_exam_date,
                oral_board_date,
                certificate_number: certificate,
            };
            let completed: HashSet<TaskId> = completed
                .iter()
                .map(|s| s.trim())
                .filter(|s| !s.is_empty())
                .map(TaskId::from)
                .collect();

            let report = build_report(&schedule, &enrollment, &completed, clock.now())?;
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print_report(&report);
            }
        }
        Commands::Overview {
            roster,
            margin_days,
            json,
        } => {
            let schedule = Arc::new(load_schedule(cli.schedule.as_deref())?);
            let store = MemoryStore::load_roster(&roster)
                .await
                .with_context(|| format!("loading roster {}", roster.display()))?;

            let tracker = QualificationTracker::new(Arc::new(store), schedule, clock)
                .with_config(TrackerConfig::default().with_at_risk_margin(margin_days));
            let overview = tracker.program_overview().await?;
            info!(students = overview.students.len(), "Computed overview");

            if json {
                println!("{}", serde_json::to_string_pretty(&overview)?);
            } else {
                print_overview(&overview);
            }
        }
    }

    Ok(())
}

fn load_schedule(path: Option<&Path>) -> Result<Schedule> {
    let Some(path) = path else {
        return Ok(Schedule::standard());
    };
    debug!("Loading schedule from {}", path.display());
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading schedule {}", path.display()))?;
    Schedule::from_json(&raw).with_context(|| format!("invalid schedule {}", path.display()))
}

fn format_pace(pace: Pace) -> String {
    match pace {
        Pace::Known(days) => format!("{:.1} days/task", days),
        Pace::Unknown => "unknown".to_string(),
    }
}

fn format_projection(projection: Projection) -> String {
    match projection {
        Projection::Days(days) => format!("{} days", days),
        Projection::Unknown => "unknown".to_string(),
    }
}

fn format_gate_state(state: GateState) -> &'static str {
    match state {
        GateState::Done => "DONE",
        GateState::Active => "ACTIVE",
        GateState::Locked => "LOCKED",
    }
}

fn print_report(report: &StudentReport) {
    let overall = &report.progress.overall;
    println!("Student: {}", report.student_id);
    println!("  Started: {}", report.start_date);
    println!(
        "  Progress: {}/{} ({}%)",
        overall.total_done, overall.total_tasks, overall.percent
    );
    for category in &report.progress.categories {
        println!(
            "    {}. {:<28} {:>2}/{:<2} {:>3}%",
            category.id, category.title, category.done_count, category.total_tasks, category.percent
        );
    }

    let pace = &report.pace;
    println!("  Elapsed: {} days, remaining: {} days", pace.elapsed_days, pace.remaining_days);
    println!("  Pace: {}", format_pace(pace.pace_per_task));
    println!("  Needed: {}", format_projection(pace.projected_days_needed));
    if let Some(date) = pace.projected_completion {
        println!("  Projected completion: {}", date);
    }
    println!("  Deadline: {}", pace.deadline);
    println!(
        "  Status: {}",
        if pace.complete {
            "COMPLETE"
        } else if pace.on_track {
            "ON TRACK"
        } else {
            "AT RISK"
        }
    );

    println!("  Certification:");
    for gate in &report.gates {
        println!("    {}. {:<20} {}", gate.step, gate.gate, format_gate_state(gate.state));
    }
}

fn print_overview(overview: &ProgramOverview) {
    println!("Program overview ({})", overview.generated_at.date_naive());
    println!(
        "  Students: {}  certified: {}  complete: {}  on track: {}  tight: {}  at risk: {}",
        overview.students.len(),
        overview.certified,
        overview.complete,
        overview.on_track,
        overview.tight,
        overview.at_risk
    );
    println!("  Average completion: {:.1}%", overview.average_percent);

    for category in &overview.categories {
        println!("    {}. {:<28} {:>5.1}%", category.id, category.title, category.average_percent);
    }

    for student in &overview.students {
        println!(
            "  {:<16} {:>3}% {:<10} {}",
            student.student_id,
            student.percent,
            student.standing.as_str(),
            student.current_gate.map(|g| g.as_str()).unwrap_or("-"),
        );
    }

    for issue in &overview.issues {
        println!("  ! {}: {}", issue.student_id, issue.reason);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_report_args_parse() {
        let cli = Cli::try_parse_from([
            "qualtrack",
            "--as-of",
            "2026-06-01",
            "report",
            "--start-date",
            "2026-02-21",
            "--completed",
            "1-1,1-2,2-1",
        ])
        .unwrap();
        assert_eq!(cli.as_of, NaiveDate::from_ymd_opt(2026, 6, 1));
        match cli.command {
            Commands::Report { completed, start_date, .. } => {
                assert_eq!(completed, vec!["1-1", "1-2", "2-1"]);
                assert_eq!(start_date, NaiveDate::from_ymd_opt(2026, 2, 21).unwrap());
            }
            _ => panic!("expected report"),
        }
    }

    #[test]
    fn test_validate_reads_schedule_flag() {
        let cli = Cli::try_parse_from(["qualtrack", "validate", "--schedule", "curriculum.json"]).unwrap();
        assert!(matches!(cli.command, Commands::Validate));
        assert_eq!(cli.schedule, Some(PathBuf::from("curriculum.json")));
    }

    #[test]
    fn test_default_schedule() {
        assert_eq!(load_schedule(None).unwrap().total_tasks(), 65);
    }

    #[test]
    fn test_formatting() {
        assert_eq!(format_pace(Pace::Known(2.4)), "2.4 days/task");
        assert_eq!(format_pace(Pace::Unknown), "unknown");
        assert_eq!(format_projection(Projection::Days(55)), "55 days");
        assert_eq!(format_gate_state(GateState::Locked), "LOCKED");
    }
}
