//! TradeRecord — a single disclosure filed by the watched trader.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One disclosure: the date it was filed and the document that describes it.
///
/// Field order matters: the derived `Ord` compares by date first and document
/// id second, which is the ordering the scanner sorts on.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TradeRecord {
    pub disclosure_date: NaiveDate,
    pub document_id: String,
}

impl TradeRecord {
    pub fn new(disclosure_date: NaiveDate, document_id: impl Into<String>) -> Self {
        Self {
            disclosure_date,
            document_id: document_id.into(),
        }
    }

    /// Link to the filed PDF: the base URL followed directly by the document id.
    pub fn pdf_url(&self, base_url: &str) -> String {
        format!("{base_url}{}", self.document_id)
    }

    /// File name used when the document is stored next to the extracted records.
    pub fn artifact_file_name(&self) -> String {
        format!("{}.pdf", self.document_id)
    }

    pub fn is_on(&self, date: NaiveDate) -> bool {
        self.disclosure_date == date
    }
}
