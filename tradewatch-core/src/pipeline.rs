//! Orchestrator — one pass of the pipeline per timer tick.
//!
//! `fetch → extract → scan → filter-by-date → (notify?) → cleanup`
//!
//! Fetch, extract and scan errors abort the pass with cleanup skipped, so the
//! archive and extracted files stay on disk and the next tick reuses or
//! overwrites them. Notification and cleanup never fail the pass.

use crate::cleanup::{cleanup, CleanupReport};
use crate::config::RunContext;
use crate::domain::TradeRecord;
use crate::error::Result;
use crate::extract::extract_archive;
use crate::fetch::{fetch_archive, ArchiveSource, FetchOutcome};
use crate::filter::trades_on;
use crate::layout::ScratchLayout;
use crate::notify::{notify, Mailer, NotifyOutcome};
use crate::scan::scan_trades;
use chrono::NaiveDate;
use tracing::{info, warn};

/// Summary of one completed pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub today: NaiveDate,
    pub fetch: FetchOutcome,
    /// Every disclosure of the trader in the archive, newest first.
    pub trades: Vec<TradeRecord>,
    /// How many of `trades` are dated `today`.
    pub todays_count: usize,
    pub documents_fetched: usize,
    pub notify: NotifyOutcome,
    pub cleanup: CleanupReport,
}

impl RunReport {
    pub fn notified(&self) -> bool {
        matches!(self.notify, NotifyOutcome::Sent { .. })
    }
}

/// Run the whole pipeline once for `today`.
pub fn run_once(
    ctx: &RunContext,
    today: NaiveDate,
    source: &dyn ArchiveSource,
    mailer: &dyn Mailer,
) -> Result<RunReport> {
    let layout = ctx.layout();
    info!(
        trader = %ctx.trader_name,
        %today,
        scratch = %layout.base_dir().display(),
        "run started"
    );

    let fetch = fetch_archive(source, &ctx.archive_url, &layout.archive_path())?;
    extract_archive(&layout.archive_path(), &layout.extract_dir())?;
    let trades = scan_trades(&layout.record_file(), &ctx.trader_name)?;

    let todays = trades_on(&trades, today);
    info!(
        trades = trades.len(),
        dated_today = todays.len(),
        "trades matched"
    );

    let documents_fetched = if ctx.fetch_documents {
        fetch_documents(source, &layout, &todays, &ctx.pdf_base_url)
    } else {
        0
    };

    let notify_outcome = if todays.is_empty() {
        info!("no disclosures dated today, not notifying");
        NotifyOutcome::Skipped
    } else {
        // The full list goes out, not only today's entries.
        notify(&trades, ctx, mailer)
    };

    let cleanup_report = cleanup(&layout, &trades);

    Ok(RunReport {
        today,
        fetch,
        todays_count: todays.len(),
        trades,
        documents_fetched,
        notify: notify_outcome,
        cleanup: cleanup_report,
    })
}

/// Download the filed PDF of each trade next to the extracted records.
/// Failures are logged and skipped.
fn fetch_documents(
    source: &dyn ArchiveSource,
    layout: &ScratchLayout,
    trades: &[TradeRecord],
    pdf_base_url: &str,
) -> usize {
    let mut fetched = 0;
    for trade in trades {
        let Some(dest) = layout.artifact_path(trade) else {
            warn!(document_id = %trade.document_id, "document id is not a plain file name, skipping");
            continue;
        };
        let url = trade.pdf_url(pdf_base_url);
        match fetch_archive(source, &url, &dest) {
            Ok(_) => fetched += 1,
            Err(e) => warn!(document_id = %trade.document_id, error = %e, "document fetch failed"),
        }
    }
    fetched
}
