//! Date filter: which of the trader's disclosures were filed on a given day.

use crate::domain::TradeRecord;
use chrono::NaiveDate;

/// Trades dated `day`, in input order. The input is left untouched.
pub fn trades_on(trades: &[TradeRecord], day: NaiveDate) -> Vec<TradeRecord> {
    trades.iter().filter(|t| t.is_on(day)).cloned().collect()
}

/// True when at least one trade is dated `day`.
pub fn any_on(trades: &[TradeRecord], day: NaiveDate) -> bool {
    trades.iter().any(|t| t.is_on(day))
}
