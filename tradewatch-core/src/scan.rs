//! Record scanner — pulls one trader's disclosures out of the tab-separated
//! record file.
//!
//! Column layout (0-indexed, no header assumed):
//! - field 1: trader name, matched exactly and case-sensitively
//! - field `len - 2`: filing date, `MM/DD/YYYY`
//! - field 8: document id
//!
//! Only rows naming the trader are validated. A matching row that is too short
//! or carries an unparseable date aborts the scan.

use crate::domain::TradeRecord;
use crate::error::{Result, WatchError};
use chrono::NaiveDate;
use std::io::Read;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info};

pub const DATE_FORMAT: &str = "%m/%d/%Y";

const TRADER_FIELD: usize = 1;
const DOCUMENT_FIELD: usize = 8;
const MIN_FIELDS: usize = DOCUMENT_FIELD + 1;

/// Scan the record file at `path` for `trader`, newest first.
pub fn scan_trades(path: &Path, trader: &str) -> Result<Vec<TradeRecord>> {
    if !path.is_file() {
        return Err(WatchError::RecordFileNotFound {
            path: path.to_path_buf(),
        });
    }
    let file = std::fs::File::open(path).map_err(|e| WatchError::io(path, e))?;
    let trades = scan_reader(file, trader).map_err(|e| e.at(path))?;

    info!(
        path = %path.display(),
        trader,
        trades = trades.len(),
        "record file scanned"
    );
    Ok(trades)
}

/// Scan any reader; errors carry line numbers but no path.
pub fn scan_reader<R: Read>(reader: R, trader: &str) -> std::result::Result<Vec<TradeRecord>, ScanError> {
    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .flexible(true)
        .quoting(false)
        .from_reader(reader);

    let mut trades = Vec::new();
    let mut record = csv::ByteRecord::new();

    loop {
        match rdr.read_byte_record(&mut record) {
            Ok(true) => {}
            Ok(false) => break,
            Err(e) => {
                return Err(ScanError {
                    line: rdr.position().line(),
                    reason: e.to_string(),
                })
            }
        }

        if record.get(TRADER_FIELD) != Some(trader.as_bytes()) {
            continue;
        }

        let line = record.position().map_or(0, |p| p.line());
        let trade = parse_row(&record).map_err(|reason| ScanError { line, reason })?;
        debug!(line, date = %trade.disclosure_date, document_id = %trade.document_id, "matched row");
        trades.push(trade);
    }

    sort_newest_first(&mut trades);
    Ok(trades)
}

/// Descending by date, then by document id on equal dates.
pub fn sort_newest_first(trades: &mut [TradeRecord]) {
    trades.sort_by(|a, b| b.cmp(a));
}

fn parse_row(record: &csv::ByteRecord) -> std::result::Result<TradeRecord, String> {
    if record.len() < MIN_FIELDS {
        return Err(format!(
            "expected at least {MIN_FIELDS} fields, found {}",
            record.len()
        ));
    }

    let raw_date = field(record, record.len() - 2);
    let disclosure_date = NaiveDate::parse_from_str(&raw_date, DATE_FORMAT)
        .map_err(|e| format!("invalid date '{raw_date}': {e}"))?;

    // Opaque, never trimmed.
    let document_id = field(record, DOCUMENT_FIELD);

    Ok(TradeRecord {
        disclosure_date,
        document_id,
    })
}

fn field(record: &csv::ByteRecord, index: usize) -> String {
    String::from_utf8_lossy(record.get(index).unwrap_or_default()).into_owned()
}

/// Scanner failure before the file path is known.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("line {line}: {reason}")]
pub struct ScanError {
    pub line: u64,
    pub reason: String,
}

impl ScanError {
    fn at(self, path: &Path) -> WatchError {
        WatchError::Parse {
            path: path.to_path_buf(),
            line: self.line,
            reason: self.reason,
        }
    }
}
