//! Healthlog CLI
//!
//! Command-line front end for the health journal:
//! - Add and edit records
//! - Browse days
//! - Compute averages
//! - Import/Export data

use anyhow::{bail, Context};
use chrono::{Local, NaiveDate, NaiveTime};
use clap::{Parser, Subcommand};
use healthlog::config::{generate_default_config, Config, LoggingConfig};
use healthlog::export::{self, ExportFormat};
use healthlog::journal::{Journal, Record, RecordEdit, TimeSlot, DATE_FORMAT, TIME_FORMAT};
use healthlog::{CsvImporter, JournalDirectory, Session};
use std::path::PathBuf;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "healthlog")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Personal health journal")]
#[command(long_about = "Healthlog keeps a daily journal of glucose readings, meals, activity and mood.\nRecords are grouped into morning, afternoon and evening slots per day.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// User whose journal to use
    #[arg(short, long, global = true)]
    pub user: Option<String>,

    /// Config file (default: search standard locations)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Override the data directory
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Add or replace a record
    Add {
        /// Date (MM/DD/YYYY, YYYY-MM-DD, or "today")
        #[arg(short, long, default_value = "today")]
        date: String,
        /// Time slot (morning, afternoon, evening)
        #[arg(short, long)]
        slot: TimeSlot,
        /// Glucose reading
        #[arg(short, long, default_value_t = 0, allow_negative_numbers = true)]
        glucose: i64,
        /// Meal eaten (empty = none)
        #[arg(long, default_value = "")]
        meal: String,
        /// Carbs in the meal
        #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
        carbs: i64,
        /// Activity description
        #[arg(long, default_value = "")]
        activity: String,
        /// Activity start time (h:mm AM/PM)
        #[arg(long)]
        start: Option<String>,
        /// Activity end time (h:mm AM/PM)
        #[arg(long)]
        end: Option<String>,
        /// Mood
        #[arg(long, default_value = "")]
        mood: String,
    },

    /// Change selected fields of an existing record
    Edit {
        /// Date (MM/DD/YYYY, YYYY-MM-DD, or "today")
        #[arg(short, long)]
        date: String,
        /// Time slot (morning, afternoon, evening)
        #[arg(short, long)]
        slot: TimeSlot,
        /// New glucose reading
        #[arg(short, long, allow_negative_numbers = true)]
        glucose: Option<i64>,
        /// New meal (empty clears the meal and its carbs)
        #[arg(long)]
        meal: Option<String>,
        /// New carbs for the meal
        #[arg(long, allow_negative_numbers = true)]
        carbs: Option<i64>,
        /// New activity (empty clears the activity and its times)
        #[arg(long)]
        activity: Option<String>,
        /// New activity start time (h:mm AM/PM)
        #[arg(long)]
        start: Option<String>,
        /// New activity end time (h:mm AM/PM)
        #[arg(long)]
        end: Option<String>,
        /// New mood
        #[arg(long)]
        mood: Option<String>,
    },

    /// Remove a record from a day
    Clear {
        /// Date (MM/DD/YYYY, YYYY-MM-DD, or "today")
        #[arg(short, long)]
        date: String,
        /// Time slot (morning, afternoon, evening)
        #[arg(short, long)]
        slot: TimeSlot,
    },

    /// Show one day (default: the latest)
    Show {
        /// Date (MM/DD/YYYY, YYYY-MM-DD, or "today")
        #[arg(short, long)]
        date: Option<String>,
    },

    /// List all days
    List,

    /// Show averages and ratings
    Averages {
        /// Days to go back (0 means the latest day only)
        #[arg(short, long)]
        days: Option<usize>,
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Remove days without records
    Prune,

    /// Export the journal
    Export {
        /// Output format (csv, json)
        #[arg(short, long, default_value = "csv")]
        format: ExportFormat,
        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Import records from CSV
    Import {
        /// Path to CSV file
        path: PathBuf,
        /// Dry run (don't actually import)
        #[arg(long)]
        dry_run: bool,
    },

    /// List users with journals
    Users,

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::load_with_env(path)?,
        None => Config::load_default(),
    };
    if let Some(dir) = &cli.data_dir {
        config.storage.data_dir = dir.to_string_lossy().to_string();
    }

    init_logging(&config.logging)?;

    let directory = JournalDirectory::from_config(&config.storage);
    tracing::debug!(data_dir = %directory.root().display(), "Using data directory");

    match cli.command {
        Commands::Add {
            date,
            slot,
            glucose,
            meal,
            carbs,
            activity,
            start,
            end,
            mood,
        } => {
            let date = parse_date(&date)?;
            let start = start.as_deref().map(parse_time).transpose()?;
            let end = end.as_deref().map(parse_time).transpose()?;
            let record = Record::new(glucose, meal, carbs, activity, start, end, mood)?;

            let mut session = Session::open_or_create(&directory, require_user(&cli.user)?)?;
            let day = session.journal_mut().store_mut().get_or_insert(date);
            let replaced = day.record(slot).is_some_and(|existing| existing != &record);
            day.set_record(slot, Some(record));
            session.close()?;

            if replaced {
                println!("Replaced {} record for {}", slot, date.format(DATE_FORMAT));
            } else {
                println!("Saved {} record for {}", slot, date.format(DATE_FORMAT));
            }
        }

        Commands::Edit {
            date,
            slot,
            glucose,
            meal,
            carbs,
            activity,
            start,
            end,
            mood,
        } => {
            let date = parse_date(&date)?;
            let edit = RecordEdit {
                glucose,
                meal,
                carbs,
                activity,
                activity_start: start.as_deref().map(parse_time).transpose()?,
                activity_end: end.as_deref().map(parse_time).transpose()?,
                mood,
            };
            if edit.is_empty() {
                bail!("Nothing to edit; pass at least one field");
            }

            let mut session = Session::open(&directory, require_user(&cli.user)?)?;
            match edit_record(session.journal_mut(), date, slot, &edit) {
                Ok(true) => {
                    session.close()?;
                    println!("Updated {} record for {}", slot, date.format(DATE_FORMAT));
                }
                Ok(false) => {
                    session.discard();
                    println!("No change to {} record for {}", slot, date.format(DATE_FORMAT));
                }
                Err(e) => {
                    session.discard();
                    return Err(e);
                }
            }
        }

        Commands::Clear { date, slot } => {
            let date = parse_date(&date)?;
            let mut session = Session::open(&directory, require_user(&cli.user)?)?;
            let removed = session
                .journal_mut()
                .store_mut()
                .find_mut(date)
                .and_then(|day| day.take_record(slot));
            session.close()?;

            match removed {
                Some(_) => println!("Cleared {} record for {}", slot, date.format(DATE_FORMAT)),
                None => println!("No {} record for {}", slot, date.format(DATE_FORMAT)),
            }
        }

        Commands::Show { date } => {
            let journal = directory.load(require_user(&cli.user)?)?;
            let store = journal.store();

            let day = match date {
                Some(d) => {
                    let date = parse_date(&d)?;
                    store
                        .find(date)
                        .with_context(|| format!("No records for {}", date.format(DATE_FORMAT)))?
                }
                None => store.tail().context("No days found")?,
            };

            println!("{}", day);
            if let Some(prev) = store.previous(day.date()) {
                println!("Previous day: {}", prev.date().format(DATE_FORMAT));
            }
            if let Some(next) = store.next(day.date()) {
                println!("Next day:     {}", next.date().format(DATE_FORMAT));
            }
        }

        Commands::List => {
            let journal = directory.load(require_user(&cli.user)?)?;
            if journal.store().is_empty() {
                println!("No days found.");
                return Ok(());
            }

            println!("{:<12} {:>7} {:>8} {:>6}", "DATE", "RECORDS", "GLUCOSE", "MEALS");
            for day in journal.store() {
                let avg = if day.record_count() > 0 {
                    day.aggregate_glucose() as f64 / day.record_count() as f64
                } else {
                    0.0
                };
                println!(
                    "{:<12} {:>7} {:>8.1} {:>6}",
                    day.date().format(DATE_FORMAT).to_string(),
                    day.record_count(),
                    avg,
                    day.meals_eaten_count()
                );
            }
        }

        Commands::Averages { days, json } => {
            let journal = directory.load(require_user(&cli.user)?)?;
            if journal.store().is_empty() {
                println!("No records found. Averages unavailable.");
                return Ok(());
            }

            let days_back = days.unwrap_or(config.stats.default_days_back);
            let summary = journal.statistics().summary(days_back);

            if json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                println!("{}", summary);
            }
        }

        Commands::Prune => {
            let mut session = Session::open(&directory, require_user(&cli.user)?)?;
            let removed = session.journal_mut().store_mut().prune_empty();
            session.close()?;
            println!("Removed {} empty day(s)", removed);
        }

        Commands::Export { format, output } => {
            let journal = directory.load(require_user(&cli.user)?)?;
            let content = export::export(&journal, format)?;

            match output {
                Some(path) => {
                    std::fs::write(&path, content)?;
                    println!("Exported to {:?}", path);
                }
                None => print!("{}", content),
            }
        }

        Commands::Import { path, dry_run } => {
            let result = CsvImporter::new().import(&path)?;

            println!(
                "Parsed {} record(s), {} row(s) failed",
                result.rows_processed, result.rows_failed
            );
            for err in &result.errors {
                eprintln!("  {}", err);
            }

            if dry_run {
                println!("Dry run: nothing written");
                return Ok(());
            }

            let mut session = Session::open_or_create(&directory, require_user(&cli.user)?)?;
            let written = result.apply(session.journal_mut());
            session.close()?;
            println!("Imported {} record(s)", written);
        }

        Commands::Users => {
            for stem in directory.list()? {
                match directory.load(&stem) {
                    Ok(journal) => println!("{}", journal.name()),
                    Err(e) => {
                        tracing::warn!(user = %stem, error = %e, "Unreadable journal");
                        println!("{} (unreadable)", stem);
                    }
                }
            }
        }

        Commands::Config { output } => {
            let content = generate_default_config();
            match output {
                Some(path) => {
                    std::fs::write(&path, content)?;
                    println!("Config written to {:?}", path);
                }
                None => print!("{}", content),
            }
        }
    }

    Ok(())
}

fn init_logging(config: &LoggingConfig) -> anyhow::Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("healthlog={}", config.level).into());

    let writer = match &config.file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path))?;
            BoxMakeWriter::new(std::sync::Mutex::new(file))
        }
        None => BoxMakeWriter::new(std::io::stderr),
    };

    let registry = tracing_subscriber::registry().with(filter);
    if config.format == "json" {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(writer))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(writer))
            .init();
    }

    Ok(())
}

/// Apply a field-level edit to one slot. Returns false if nothing changed.
fn edit_record(
    journal: &mut Journal,
    date: NaiveDate,
    slot: TimeSlot,
    edit: &RecordEdit,
) -> anyhow::Result<bool> {
    let record = journal
        .store_mut()
        .find_mut(date)
        .and_then(|day| day.record_mut(slot))
        .with_context(|| format!("No {} record for {}", slot, date.format(DATE_FORMAT)))?;

    Ok(edit.apply(record)?)
}

fn require_user(user: &Option<String>) -> anyhow::Result<&str> {
    match user.as_deref().map(str::trim) {
        Some(name) if !name.is_empty() => Ok(name),
        _ => bail!("No user given; pass --user <NAME>"),
    }
}

/// Parse a date: "today"/"0", MM/DD/YYYY, or YYYY-MM-DD
fn parse_date(s: &str) -> anyhow::Result<NaiveDate> {
    let s = s.trim();
    if s.eq_ignore_ascii_case("today") || s == "0" {
        return Ok(Local::now().date_naive());
    }

    [DATE_FORMAT, "%Y-%m-%d"]
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
        .with_context(|| format!("Invalid date: {} (use MM/DD/YYYY or today)", s))
}

/// Parse a clock time: h:mm AM/PM or 24-hour HH:MM
fn parse_time(s: &str) -> anyhow::Result<NaiveTime> {
    let s = s.trim();
    [TIME_FORMAT, "%H:%M"]
        .iter()
        .find_map(|fmt| NaiveTime::parse_from_str(s, fmt).ok())
        .with_context(|| format!("Invalid time: {} (use h:mm AM/PM)", s))
}
