//! Tradewatch Core — the disclosure watch pipeline.
//!
//! One run downloads the published disclosure archive, extracts it, scans the
//! tab-separated record file for a single trader, and emails the trader's
//! disclosures when any of them is dated today:
//! - Archive fetch behind the `ArchiveSource` trait (blocking reqwest in production)
//! - Zip extraction into an explicit scratch layout
//! - Record scanning and descending date sort
//! - Date filter gate
//! - Notification behind the `Mailer` trait (SendGrid in production)
//! - Best-effort cleanup
//! - Interval scheduler with past-due detection

pub mod cleanup;
pub mod config;
pub mod domain;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod filter;
pub mod layout;
pub mod notify;
pub mod pipeline;
pub mod scan;
pub mod schedule;

pub use cleanup::{cleanup, CleanupReport};
pub use config::{ConfigError, RunContext, WatchConfig};
pub use domain::TradeRecord;
pub use error::{Result, WatchError};
pub use extract::extract_archive;
pub use fetch::{fetch_archive, ArchiveSource, FetchOutcome, HttpSource};
pub use filter::{any_on, trades_on};
pub use layout::ScratchLayout;
pub use notify::{notify, EmailMessage, MailError, Mailer, NotifyOutcome, SendGridMailer};
pub use pipeline::{run_once, RunReport};
pub use scan::{scan_reader, scan_trades, ScanError};
pub use schedule::{Schedule, TimerInfo};
