//! Tradewatch CLI — run the disclosure watch once or on a timer.
//!
//! Commands:
//! - `run` — one pass of the pipeline (what a host scheduler invokes)
//! - `watch` — built-in interval timer firing `run` every tick
//! - `scan` — offline scan of a local record file
//! - `clean` — remove scratch files left behind by an aborted run
//!
//! Run settings come from the environment (`TRADES_ZIP_URL`, `TRADER_NAME`,
//! `FROM_EMAIL`, `TO_EMAIL`, `PDF_BASE_URL`, `SENDGRID_API_KEY`, `TRADES_DIR`,
//! `FETCH_DOCUMENTS`) and are re-read on every tick.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;
use tradewatch_core::config::WatchConfig;
use tradewatch_core::{
    any_on, cleanup, run_once, scan_trades, HttpSource, NotifyOutcome, RunContext, RunReport, Schedule,
    SendGridMailer, TimerInfo,
};

#[derive(Parser)]
#[command(
    name = "tradewatch",
    about = "Tradewatch — email when a watched trader files a new disclosure"
)]
struct Cli {
    /// Optional TOML file with schedule, fetch and mail settings.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the pipeline once.
    Run {
        /// Treat this date as today (YYYY-MM-DD). Defaults to the local date.
        #[arg(long)]
        today: Option<String>,

        /// Mark this invocation as a late timer firing.
        #[arg(long, default_value_t = false)]
        past_due: bool,
    },
    /// Run the pipeline on a fixed interval until stopped.
    Watch {
        /// Seconds between ticks. Overrides the config file.
        #[arg(long)]
        interval_secs: Option<u64>,

        /// Fire the first tick immediately.
        #[arg(long, default_value_t = false)]
        run_on_startup: bool,

        /// Stop after this many ticks.
        #[arg(long)]
        max_ticks: Option<u64>,
    },
    /// Scan a local record file and print the trader's disclosures.
    Scan {
        /// Path to the tab-separated record file.
        #[arg(long)]
        file: PathBuf,

        /// Trader name to match (exact, case-sensitive).
        #[arg(long)]
        trader: String,

        /// Highlight disclosures on this date (YYYY-MM-DD). Defaults to the local date.
        #[arg(long)]
        today: Option<String>,
    },
    /// Remove the archive and extracted files from the scratch directory.
    Clean,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt().with_env_filter(log_filter()).init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => WatchConfig::from_file(path)?,
        None => WatchConfig::default(),
    };

    match cli.command {
        Commands::Run { today, past_due } => {
            let today = parse_today(today.as_deref())?;
            if past_due {
                info!("the timer is past due");
            }
            let report = run_tick(&config, today)?;
            print_summary(&report);
            Ok(())
        }
        Commands::Watch {
            interval_secs,
            run_on_startup,
            max_ticks,
        } => run_watch(config, interval_secs, run_on_startup, max_ticks),
        Commands::Scan {
            file,
            trader,
            today,
        } => run_scan(&file, &trader, parse_today(today.as_deref())?),
        Commands::Clean => run_clean(),
    }
}

/// `RUST_LOG` when set and valid, `info` otherwise.
fn log_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

fn parse_today(arg: Option<&str>) -> Result<NaiveDate> {
    match arg {
        Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .with_context(|| format!("invalid --today '{s}', expected YYYY-MM-DD")),
        None => Ok(chrono::Local::now().date_naive()),
    }
}

/// One pass with production collaborators and a freshly read environment.
fn run_tick(config: &WatchConfig, today: NaiveDate) -> Result<RunReport> {
    let ctx = RunContext::from_env();
    let source = HttpSource::new(&config.fetch)?;
    let mailer = SendGridMailer::new(&config.mail, &ctx.mail_api_key)?;
    let report = run_once(&ctx, today, &source, &mailer)?;
    Ok(report)
}

fn run_watch(
    mut config: WatchConfig,
    interval_secs: Option<u64>,
    run_on_startup: bool,
    max_ticks: Option<u64>,
) -> Result<()> {
    if let Some(secs) = interval_secs {
        config.schedule.interval_secs = secs;
    }
    if run_on_startup {
        config.schedule.run_on_startup = true;
    }
    config.validate()?;

    let schedule = Schedule::from_config(&config.schedule);
    info!(
        interval_secs = schedule.interval().as_secs(),
        run_on_startup = config.schedule.run_on_startup,
        "watching"
    );

    schedule.run(max_ticks, |timer: &TimerInfo| {
        if timer.past_due {
            info!(
                tick = timer.tick,
                late_secs = timer.lateness.as_secs(),
                "the timer is past due"
            );
        }
        let today = chrono::Local::now().date_naive();
        match run_tick(&config, today) {
            Ok(report) => print_summary(&report),
            Err(e) => error!(tick = timer.tick, error = %format!("{e:#}"), "run aborted"),
        }
    });

    Ok(())
}

fn run_scan(file: &std::path::Path, trader: &str, today: NaiveDate) -> Result<()> {
    let trades = scan_trades(file, trader)?;

    if trades.is_empty() {
        println!("No disclosures for {trader} in {}", file.display());
        return Ok(());
    }

    println!("Disclosures for {trader}: {}", trades.len());
    if any_on(&trades, today) {
        println!("Filed today ({today}): a run would send a notification.");
    }
    println!();
    println!("{:<12} {:<14} {}", "Date", "Document ID", "Today");
    println!("{}", "-".repeat(34));
    for trade in &trades {
        let mark = if trade.is_on(today) { "*" } else { "" };
        println!(
            "{:<12} {:<14} {}",
            trade.disclosure_date.to_string(),
            trade.document_id,
            mark
        );
    }
    Ok(())
}

fn run_clean() -> Result<()> {
    let ctx = RunContext::from_env();
    let report = cleanup(&ctx.layout(), &[]);
    for path in &report.removed {
        println!("Removed: {}", path.display());
    }
    for (path, reason) in &report.failed {
        warn!(path = %path.display(), reason = %reason, "not removed");
    }
    println!(
        "Done. Removed {} file(s), {} already absent.",
        report.removed.len(),
        report.missing.len()
    );
    Ok(())
}

fn print_summary(report: &RunReport) {
    let notify = match &report.notify {
        NotifyOutcome::Skipped => "not sent".to_string(),
        NotifyOutcome::Sent { status } => format!("sent (HTTP {status})"),
        NotifyOutcome::Failed { reason } => format!("FAILED: {reason}"),
    };
    info!(
        today = %report.today,
        trades = report.trades.len(),
        dated_today = report.todays_count,
        documents = report.documents_fetched,
        notification = %notify,
        removed = report.cleanup.removed.len(),
        "run complete"
    );
}
