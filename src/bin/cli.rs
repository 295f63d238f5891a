//! hnpress CLI
//!
//! Records the best stories per day and turns them into periodical issues.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use chrono::{Days, NaiveDate, Utc};
use clap::{Parser, Subcommand};
use hnpress::{
    error::{AppError, Result},
    models::{Config, DateWindow, ItemId, Period, SortCriteria, parse_day},
    pipeline::{self, AppContext, IssueOptions, IssueWindow},
    services::ListingSource,
    storage::Database,
};

/// Days covered by a backfill without `--start-date`.
const BACKFILL_DAYS: u64 = 7;

/// hnpress - Hacker News periodical builder
#[derive(Parser, Debug)]
#[command(
    name = "hnpress",
    version,
    about = "Numbered, navigable Hacker News periodicals"
)]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "hnpress.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Record today's best stories feed
    Update,

    /// Record archived best stories for past days
    Backfill {
        /// First day to fetch (YYYY-MM-DD, default: a week ago)
        #[arg(long, value_parser = parse_day)]
        start_date: Option<NaiveDate>,

        /// Day to stop before (YYYY-MM-DD, default: today)
        #[arg(long, value_parser = parse_day)]
        end_date: Option<NaiveDate>,

        /// Archive to read from
        #[arg(long, default_value = "daemonology")]
        source: ListingSource,
    },

    /// Build an issue from the recorded best stories
    NewIssue {
        /// daily, weekly or monthly
        #[arg(long, default_value = "weekly")]
        period: Period,

        /// Last day covered by the period (default: today, UTC)
        #[arg(long, value_parser = parse_day)]
        as_of: Option<NaiveDate>,

        /// Range such as "last 2 weeks" or 2024-01-01..2024-01-08; overrides --period
        #[arg(long)]
        custom_range: Option<String>,

        /// Maximum number of stories
        #[arg(long, default_value_t = pipeline::DEFAULT_LIMIT)]
        limit: usize,

        /// time, time-reverse, points or total-comments
        #[arg(long, default_value = "points")]
        sort_criteria: SortCriteria,

        /// Write the issue under this directory and skip recording it
        #[arg(long)]
        output: Option<PathBuf>,

        /// Do not record the issue in the database
        #[arg(long)]
        no_persist: bool,
    },

    /// Build an issue from hand-picked stories
    CustomIssue {
        /// Story id to include (repeatable)
        #[arg(long = "story-id", required = true)]
        story_ids: Vec<ItemId>,

        /// Write the issue under this directory and skip recording it
        #[arg(long)]
        output: Option<PathBuf>,

        /// time, time-reverse, points or total-comments
        #[arg(long, default_value = "points")]
        sort_criteria: SortCriteria,
    },

    /// List generated issues
    List,

    /// List recorded best stories
    ListBest,

    /// Apply pending database migrations
    MigrateDb,

    /// Validate the configuration file
    Validate,
}

/// Initialize logging based on verbosity flag and configured level.
fn init_logging(verbose: bool, config_path: &Path) {
    let level = if verbose {
        "debug".to_string()
    } else {
        Config::load(config_path)
            .map(|c| c.logging.level)
            .unwrap_or_else(|_| "info".to_string())
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose, &cli.config);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            ExitCode::from(e.exit_code())
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let today = Utc::now().date_naive();
    let load = || Config::load_or_default(&cli.config);

    match cli.command {
        Command::Update => {
            let ctx = AppContext::new(load()?)?;
            pipeline::run_update(&ctx, today).await?;
        }

        Command::Backfill {
            start_date,
            end_date,
            source,
        } => {
            let window = backfill_window(start_date, end_date, today)?;
            let ctx = AppContext::new(load()?)?;
            let stats = pipeline::run_backfill(&ctx, window, source).await?;
            if !stats.failed_days.is_empty() {
                log::warn!("{} days could not be fetched", stats.failed_days.len());
            }
        }

        Command::NewIssue {
            period,
            as_of,
            custom_range,
            limit,
            sort_criteria,
            output,
            no_persist,
        } => {
            let window = match custom_range {
                Some(range) => IssueWindow::Custom { range, today },
                None => IssueWindow::Period {
                    period,
                    as_of: as_of.unwrap_or(today),
                },
            };
            let options = IssueOptions {
                criteria: sort_criteria,
                limit,
                output,
                persist: !no_persist,
            };
            let ctx = AppContext::new(load()?)?;
            let report = pipeline::run_new_issue(&ctx, &window, &options).await?;
            println!("{}", report.dir.display());
        }

        Command::CustomIssue {
            story_ids,
            output,
            sort_criteria,
        } => {
            let options = IssueOptions {
                criteria: sort_criteria,
                output,
                ..IssueOptions::default()
            };
            let ctx = AppContext::new(load()?)?;
            let report = pipeline::run_custom_issue(&ctx, &story_ids, &options).await?;
            println!("{}", report.dir.display());
        }

        Command::List => {
            let ctx = AppContext::new(load()?)?;
            let issues = ctx.issues.list()?;
            if issues.is_empty() {
                log::info!("No issues generated yet.");
            }
            for issue in issues {
                println!(
                    "{}\t{}\t{}\t{} stories\t{}",
                    issue.id,
                    issue.created_at.format("%Y-%m-%d %H:%M"),
                    issue.period,
                    issue.num_stories,
                    issue.meta.long_title
                );
            }
        }

        Command::ListBest => {
            let ctx = AppContext::new(load()?)?;
            for record in ctx.best_stories.all()? {
                println!("{}\t{}", record.day, record.story_id);
            }
        }

        Command::MigrateDb => {
            let config = load()?;
            config.validate()?;
            let db = Database::open(&config.storage.db_path)?;
            log::info!(
                "Database {} is at schema version {}",
                config.storage.db_path.display(),
                db.schema_version()?
            );
        }

        Command::Validate => validate_config(&cli.config)?,
    }

    Ok(())
}

/// Backfill range; the end defaults to today and the start to a week before it.
fn backfill_window(
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    today: NaiveDate,
) -> Result<DateWindow> {
    let end = end.unwrap_or(today);
    let start = match start {
        Some(day) => day,
        None => end
            .checked_sub_days(Days::new(BACKFILL_DAYS))
            .ok_or_else(|| AppError::validation(format!("no week before {end}")))?,
    };
    DateWindow::new(start, end)
}

/// Parse and check the config file itself; a missing file is an error here.
fn validate_config(path: &Path) -> Result<()> {
    log::info!("Validating configuration {}...", path.display());
    if let Err(e) = Config::load_validated(path) {
        log::error!("Config validation failed: {}", e);
        return Err(e);
    }
    log::info!("Config OK");
    Ok(())
}
