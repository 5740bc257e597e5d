//! Best-effort removal of scratch files after a run.

use crate::domain::TradeRecord;
use crate::layout::ScratchLayout;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// What cleanup found on disk.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleanupReport {
    pub removed: Vec<PathBuf>,
    pub missing: Vec<PathBuf>,
    /// Paths that exist but could not be removed, with the reason.
    pub failed: Vec<(PathBuf, String)>,
}

impl CleanupReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Remove the archive, the record file, its companion and one artifact per
/// trade. Nothing here is an error: missing files and removal failures are
/// logged and collected in the report.
pub fn cleanup(layout: &ScratchLayout, trades: &[TradeRecord]) -> CleanupReport {
    let mut report = CleanupReport::default();

    let artifacts = trades.iter().filter_map(|t| {
        let path = layout.artifact_path(t);
        if path.is_none() {
            warn!(document_id = %t.document_id, "document id is not a plain file name, skipping");
        }
        path
    });

    for path in layout.fixed_paths().into_iter().chain(artifacts) {
        remove_one(&path, &mut report);
    }

    info!(
        removed = report.removed.len(),
        missing = report.missing.len(),
        failed = report.failed.len(),
        "cleanup finished"
    );
    report
}

fn remove_one(path: &Path, report: &mut CleanupReport) {
    match std::fs::remove_file(path) {
        Ok(()) => {
            debug!(path = %path.display(), "removed");
            report.removed.push(path.to_path_buf());
        }
        Err(e) if e.kind() == ErrorKind::NotFound => {
            info!(path = %path.display(), "nothing to remove, file not found");
            report.missing.push(path.to_path_buf());
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "could not remove file");
            report.failed.push((path.to_path_buf(), e.to_string()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn touch(path: &Path) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, b"x").unwrap();
    }

    #[test]
    fn removes_fixed_paths_and_trade_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let layout = ScratchLayout::new(dir.path(), "2025FD.zip");
        let trade = TradeRecord::new(NaiveDate::from_ymd_opt(2025, 1, 17).unwrap(), "DOC2");
        for p in layout.fixed_paths() {
            touch(&p);
        }
        let artifact = layout.artifact_path(&trade).unwrap();
        touch(&artifact);

        let report = cleanup(&layout, std::slice::from_ref(&trade));

        assert_eq!(report.removed.len(), 4);
        assert!(report.missing.is_empty());
        assert!(report.is_clean());
        assert!(!layout.archive_path().exists());
        assert!(!artifact.exists());
    }

    #[test]
    fn missing_files_are_reported_not_failed() {
        let dir = tempfile::tempdir().unwrap();
        let layout = ScratchLayout::new(dir.path(), "2025FD.zip");
        touch(&layout.record_file());

        let report = cleanup(&layout, &[]);

        assert_eq!(report.removed, vec![layout.record_file()]);
        assert_eq!(report.missing.len(), 2);
        assert!(report.is_clean());
    }

    #[test]
    fn running_twice_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let layout = ScratchLayout::new(dir.path(), "2025FD.zip");
        for p in layout.fixed_paths() {
            touch(&p);
        }

        let first = cleanup(&layout, &[]);
        let second = cleanup(&layout, &[]);

        assert_eq!(first.removed.len(), 3);
        assert!(second.removed.is_empty());
        assert_eq!(second.missing.len(), 3);
        assert!(second.is_clean());
    }

    #[test]
    fn never_removes_outside_the_scratch_dir() {
        let dir = tempfile::tempdir().unwrap();
        let layout = ScratchLayout::new(dir.path().join("scratch"), "2025FD.zip");
        let victim = dir.path().join("victim.pdf");
        touch(&victim);
        let trade = TradeRecord::new(NaiveDate::from_ymd_opt(2025, 1, 17).unwrap(), "../../victim");

        let report = cleanup(&layout, &[trade]);

        assert!(victim.exists());
        assert_eq!(report.removed.len() + report.missing.len(), 3);
        assert!(report.is_clean());
    }

    #[test]
    fn leaves_unrelated_files_alone() {
        let dir = tempfile::tempdir().unwrap();
        let layout = ScratchLayout::new(dir.path(), "2025FD.zip");
        let keep = layout.extract_dir().join("notes.txt");
        touch(&keep);

        cleanup(&layout, &[]);

        assert!(keep.exists());
    }
}
