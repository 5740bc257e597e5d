//! Scratch directory layout for one run.
//!
//! ```text
//! <trades_dir>/
//!   2025FD.zip            downloaded archive
//!   extracted/
//!     2025FD.txt          tab-separated records
//!     2025FD.xml          companion file shipped in the same archive
//!     <document_id>.pdf   per-trade artifacts
//! ```
//!
//! Two runs sharing a layout race on the same files; give concurrent runs
//! distinct trades dirs.

use crate::domain::TradeRecord;
use std::path::{Component, Path, PathBuf};

pub const DEFAULT_ARCHIVE_NAME: &str = "disclosures.zip";
const EXTRACT_DIR: &str = "extracted";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScratchLayout {
    base_dir: PathBuf,
    archive_name: String,
}

impl ScratchLayout {
    pub fn new(base_dir: impl Into<PathBuf>, archive_name: impl Into<String>) -> Self {
        Self {
            base_dir: base_dir.into(),
            archive_name: archive_name.into(),
        }
    }

    /// Name the archive after the last path segment of its URL.
    pub fn for_archive_url(base_dir: impl Into<PathBuf>, url: &str) -> Self {
        Self::new(base_dir, archive_name_from_url(url))
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn archive_path(&self) -> PathBuf {
        self.base_dir.join(&self.archive_name)
    }

    pub fn extract_dir(&self) -> PathBuf {
        self.base_dir.join(EXTRACT_DIR)
    }

    pub fn record_file(&self) -> PathBuf {
        self.extract_dir().join(format!("{}.txt", self.stem()))
    }

    pub fn auxiliary_file(&self) -> PathBuf {
        self.extract_dir().join(format!("{}.xml", self.stem()))
    }

    /// Where the trade's document is stored, or `None` when its id would not
    /// stay a single file name inside the extract dir.
    pub fn artifact_path(&self, trade: &TradeRecord) -> Option<PathBuf> {
        let id = trade.document_id.as_str();
        let mut components = Path::new(id).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(_)), None) if !id.contains(['/', '\\']) => {
                Some(self.extract_dir().join(trade.artifact_file_name()))
            }
            _ => None,
        }
    }

    /// Fixed paths removed by every cleanup, in removal order.
    pub fn fixed_paths(&self) -> [PathBuf; 3] {
        [self.archive_path(), self.record_file(), self.auxiliary_file()]
    }

    fn stem(&self) -> &str {
        Path::new(&self.archive_name)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(&self.archive_name)
    }
}

fn archive_name_from_url(url: &str) -> String {
    let path = url.split(['?', '#']).next().unwrap_or_default();
    let path = path.split_once("://").map_or(path, |(_, rest)| rest);
    match path.split_once('/') {
        Some((_, tail)) => tail
            .rsplit('/')
            .next()
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| DEFAULT_ARCHIVE_NAME.to_string()),
        None => DEFAULT_ARCHIVE_NAME.to_string(),
    }
}
