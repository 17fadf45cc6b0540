use chrono::{Local, NaiveDate};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use timetable_core::outline::load_outline;
use timetable_core::types::parse_weekday;
use timetable_core::*;

/// Bounds on the nominal session length accepted from users
const MIN_HOURS_PER_SESSION: f64 = 0.5;
const MAX_HOURS_PER_SESSION: f64 = 4.0;

#[derive(Parser)]
#[command(name = "timetable")]
#[command(about = "Study timetable generator for RUTA study guides", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Use a specific config file instead of the default location
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a timetable and print a summary
    Generate {
        #[command(flatten)]
        args: GenerateArgs,

        /// Write the schedule JSON to this file
        #[arg(long, short)]
        output: Option<PathBuf>,

        /// Print the schedule JSON to stdout instead of the summary
        #[arg(long, conflicts_with = "output")]
        json: bool,
    },

    /// Generate a timetable and export it as iCalendar or CSV
    Export {
        #[command(flatten)]
        args: GenerateArgs,

        /// Output format
        #[arg(long, value_enum, default_value_t = ExportFormat::Ics)]
        format: ExportFormat,

        /// Output file (defaults to timetable.ics / timetable.csv)
        #[arg(long, short)]
        output: Option<PathBuf>,

        /// Calendar title
        #[arg(long)]
        title: Option<String>,
    },

    /// Manage the configuration file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Write a config file filled with the default settings
    Init {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },

    /// Print the config file location
    Path,
}

#[derive(Args)]
struct GenerateArgs {
    /// Outline JSON file (a product with `content_json`, or a bare outline)
    #[arg(long)]
    outline: Option<PathBuf>,

    /// Exam date (YYYY-MM-DD)
    #[arg(long)]
    exam_date: NaiveDate,

    /// First day of the timetable (YYYY-MM-DD, defaults to today)
    #[arg(long)]
    start_date: Option<NaiveDate>,

    /// Comma-separated study days, e.g. Monday,Wednesday,Friday
    #[arg(long, value_delimiter = ',')]
    study_days: Option<Vec<String>>,

    /// Nominal session length in hours (0.5 - 4)
    #[arg(long)]
    hours_per_session: Option<f64>,

    /// Preferred time of day
    #[arg(long, value_parser = ["morning", "afternoon", "evening"])]
    time: Option<String>,

    /// Study pace
    #[arg(long, value_parser = ["relaxed", "normal", "intensive"])]
    pace: Option<String>,
}

#[derive(Clone, Copy, ValueEnum)]
enum ExportFormat {
    Ics,
    Csv,
}

impl ExportFormat {
    fn extension(self) -> &'static str {
        match self {
            ExportFormat::Ics => "ics",
            ExportFormat::Csv => "csv",
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    if cli.verbose {
        timetable_core::logging::init_with_level("debug");
    } else {
        timetable_core::logging::init();
    }

    match cli.command {
        Commands::Generate { args, output, json } => {
            cmd_generate(&args, output, json, &load_config(cli.config.as_deref())?)
        }
        Commands::Export {
            args,
            format,
            output,
            title,
        } => cmd_export(&args, format, output, title, &load_config(cli.config.as_deref())?),
        Commands::Config { action } => {
            let path = cli.config.unwrap_or_else(Config::default_config_path);
            cmd_config(action, &path)
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
}

fn cmd_config(action: ConfigAction, path: &Path) -> Result<()> {
    match action {
        ConfigAction::Init { force } => {
            if path.exists() && !force {
                return Err(Error::Config(format!(
                    "{} already exists (use --force to overwrite)",
                    path.display()
                )));
            }
            Config::default().save_to(path)?;
            println!("✓ Wrote default config to {}", path.display());
        }
        ConfigAction::Path => println!("{}", path.display()),
    }
    Ok(())
}

fn cmd_generate(
    args: &GenerateArgs,
    output: Option<PathBuf>,
    json: bool,
    config: &Config,
) -> Result<()> {
    let (outline, schedule) = run_generation(args, config)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&schedule)?);
        return Ok(());
    }

    display_schedule(&schedule, outline.title.as_deref());

    if let Some(path) = output {
        let contents = serde_json::to_string_pretty(&schedule)?;
        write_atomic(&path, contents.as_bytes())?;
        println!("✓ Schedule written to {}", path.display());
    }

    Ok(())
}

fn cmd_export(
    args: &GenerateArgs,
    format: ExportFormat,
    output: Option<PathBuf>,
    title: Option<String>,
    config: &Config,
) -> Result<()> {
    let (outline, schedule) = run_generation(args, config)?;
    let path = output.unwrap_or_else(|| PathBuf::from(format!("timetable.{}", format.extension())));

    let contents = match format {
        ExportFormat::Ics => {
            let mut options = config.export.ical_options();
            options.calendar_name = calendar_title(title, outline.title.as_deref(), config);
            to_ical(&schedule, &options)
        }
        ExportFormat::Csv => to_csv_string(&schedule)?,
    };

    write_atomic(&path, contents.as_bytes())?;

    println!(
        "✓ Exported {} sessions to {}",
        schedule.total_sessions,
        path.display()
    );
    Ok(())
}

/// Load the outline, validate the request and run the generator
fn run_generation(args: &GenerateArgs, config: &Config) -> Result<(ContentOutline, Schedule)> {
    let outline = match &args.outline {
        Some(path) => load_outline(path)?,
        None => {
            tracing::info!("No outline given, generating a generic timetable");
            ContentOutline::default()
        }
    };

    let request = build_request(args, config)?;
    let schedule = generate(&outline, &request)?;

    Ok((outline, schedule))
}

/// Merge command-line values over config defaults and validate the result
fn build_request(args: &GenerateArgs, config: &Config) -> Result<GenerationRequest> {
    let defaults = &config.generation;

    let day_names = args
        .study_days
        .clone()
        .unwrap_or_else(|| defaults.study_days.clone());
    let study_days = day_names
        .iter()
        .filter(|name| !name.trim().is_empty())
        .map(|name| {
            parse_weekday(name)
                .ok_or_else(|| Error::InvalidRequest(format!("Invalid day: {}", name)))
        })
        .collect::<Result<Vec<_>>>()?;
    if study_days.is_empty() {
        return Err(Error::InvalidRequest(
            "At least one study day is required".into(),
        ));
    }

    let hours_per_session = args.hours_per_session.unwrap_or(defaults.hours_per_session);
    if !(MIN_HOURS_PER_SESSION..=MAX_HOURS_PER_SESSION).contains(&hours_per_session) {
        return Err(Error::InvalidRequest(format!(
            "Hours per session must be between {} and {}",
            MIN_HOURS_PER_SESSION, MAX_HOURS_PER_SESSION
        )));
    }

    let start_date = args
        .start_date
        .unwrap_or_else(|| Local::now().date_naive());
    if args.exam_date <= start_date {
        return Err(Error::InvalidRequest(format!(
            "Exam date {} must be after the start date {}",
            args.exam_date, start_date
        )));
    }

    Ok(GenerationRequest {
        exam_date: args.exam_date,
        study_days,
        hours_per_session,
        preferred_time: args
            .time
            .as_deref()
            .map(TimeOfDay::from_label)
            .unwrap_or(defaults.preferred_time),
        pace: args
            .pace
            .as_deref()
            .map(Pace::from_label)
            .unwrap_or(defaults.pace),
        start_date: Some(start_date),
        fill_threshold: defaults.fill_threshold,
    })
}

fn calendar_title(title: Option<String>, outline_title: Option<&str>, config: &Config) -> String {
    title
        .or_else(|| outline_title.map(|t| format!("{} Study Plan", t)))
        .unwrap_or_else(|| config.export.calendar_name.clone())
}

/// Write a file by renaming a synced temp file over the destination
fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    std::fs::create_dir_all(&parent)?;

    let mut temp = NamedTempFile::new_in(&parent)?;
    temp.write_all(contents)?;
    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|e| Error::Io(e.error))?;

    tracing::debug!("Wrote {} bytes to {:?}", contents.len(), path);
    Ok(())
}

fn display_schedule(schedule: &Schedule, title: Option<&str>) {
    println!("\n╭─────────────────────────────────────────╮");
    println!("│  STUDY TIMETABLE");
    println!("╰─────────────────────────────────────────╯");
    println!();
    if let Some(title) = title {
        println!("  {}", title);
    }
    println!(
        "  {} → exam on {} ({} weeks)",
        schedule.start_date, schedule.exam_date, schedule.total_weeks
    );
    println!(
        "  Sessions: {}  Hours: {:.1}",
        schedule.total_sessions, schedule.total_hours
    );
    if schedule.dropped_sessions > 0 {
        println!(
            "  ⚠ {} of {} sessions did not fit",
            schedule.dropped_sessions, schedule.allocated_sessions
        );
    }
    println!();

    let mut current_week = 0;
    for session in &schedule.sessions {
        if session.week_number != current_week {
            current_week = session.week_number;
            for milestone in schedule.milestones_in_week(current_week) {
                println!("      ★ {}", milestone.title);
            }
        }
        println!(
            "  W{:<2} {} {:<9} {} {:>3}m  {}",
            session.week_number,
            session.date,
            session.weekday_name,
            session.time_of_day.format("%H:%M"),
            session.duration_minutes,
            session.primary_topic
        );
    }

    if !schedule.milestones.is_empty() {
        println!();
        println!("  Milestones:");
        for milestone in &schedule.milestones {
            match schedule.week_span(milestone.week_number) {
                Some((from, to)) => println!(
                    "  → Week {}: {} ({} – {})",
                    milestone.week_number, milestone.title, from, to
                ),
                None => println!("  → Week {}: {}", milestone.week_number, milestone.title),
            }
        }
    }

    println!();
}
