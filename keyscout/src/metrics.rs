use tracing::info;

use crate::search::scanner::{FileScan, ScanOutcome};

/// Per-search scanning statistics.
///
/// Workers never share a counter: each builds its own `ScanStats` from the
/// values its scans return and the collecting side merges them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanStats {
    /// Files handed to a scanner
    pub files_scanned: u64,
    /// Files that could not be opened or read
    pub files_unreadable: u64,
    /// Files whose scan stopped once every keyword matched
    pub early_exits: u64,
    /// Files containing invalid UTF-8
    pub lossy_files: u64,
    /// Lines read across all files
    pub lines_read: u64,
}

impl ScanStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the outcome of one file scan
    pub fn record(&mut self, scan: &FileScan) {
        self.files_scanned += 1;
        self.lines_read += scan.lines_read;
        if scan.lossy {
            self.lossy_files += 1;
        }
        match scan.outcome {
            ScanOutcome::Unreadable => self.files_unreadable += 1,
            ScanOutcome::EarlyExit => self.early_exits += 1,
            ScanOutcome::Completed => {}
        }
    }

    /// Folds another worker's statistics into this one
    pub fn merge(&mut self, other: &ScanStats) {
        self.files_scanned += other.files_scanned;
        self.files_unreadable += other.files_unreadable;
        self.early_exits += other.early_exits;
        self.lossy_files += other.lossy_files;
        self.lines_read += other.lines_read;
    }

    /// Logs the statistics
    pub fn log_stats(&self) {
        info!(
            "Scan stats:\n\
             Files scanned: {}\n\
             Unreadable files: {}\n\
             Early exits: {}\n\
             Files with invalid UTF-8: {}\n\
             Lines read: {}",
            self.files_scanned,
            self.files_unreadable,
            self.early_exits,
            self.lossy_files,
            self.lines_read
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan(outcome: ScanOutcome, lines_read: u64, lossy: bool) -> FileScan {
        FileScan {
            outcome,
            lines_read,
            lossy,
            ..Default::default()
        }
    }

    #[test]
    fn test_record_outcomes() {
        let mut stats = ScanStats::new();
        stats.record(&scan(ScanOutcome::Completed, 10, false));
        stats.record(&scan(ScanOutcome::EarlyExit, 2, true));
        stats.record(&scan(ScanOutcome::Unreadable, 0, false));

        assert_eq!(stats.files_scanned, 3);
        assert_eq!(stats.early_exits, 1);
        assert_eq!(stats.files_unreadable, 1);
        assert_eq!(stats.lossy_files, 1);
        assert_eq!(stats.lines_read, 12);
    }

    #[test]
    fn test_merge() {
        let mut first = ScanStats::new();
        first.record(&scan(ScanOutcome::Completed, 5, false));
        let mut second = ScanStats::new();
        second.record(&scan(ScanOutcome::EarlyExit, 1, false));
        second.record(&scan(ScanOutcome::Unreadable, 0, false));

        first.merge(&second);
        assert_eq!(first.files_scanned, 3);
        assert_eq!(first.early_exits, 1);
        assert_eq!(first.files_unreadable, 1);
        assert_eq!(first.lines_read, 6);
    }
}
