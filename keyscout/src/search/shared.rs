use rayon::prelude::*;
use rayon::ThreadPoolBuilder;
use std::num::NonZeroUsize;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use super::cancel::CancelToken;
use super::scanner::{FileScan, LineScanner, ScanOutcome};
use crate::errors::{ScanError, SearchResult};

/// Runs one file's scan, turning a panic into an unreadable result for that file only
fn scan_guarded<F>(path: &Path, scan: F) -> FileScan
where
    F: FnOnce(&Path) -> FileScan,
{
    panic::catch_unwind(AssertUnwindSafe(|| scan(path))).unwrap_or_else(|_| {
        warn!("Scan task panicked for {}", path.display());
        FileScan {
            outcome: ScanOutcome::Unreadable,
            ..Default::default()
        }
    })
}

/// Scans `files` on a dedicated pool of exactly `worker_count` threads.
///
/// Each file is an independent task returning a pure value, so nothing is
/// shared or locked during scanning. The pool threads are scoped to this call
/// and have all exited by the time it returns. Result order is unspecified.
pub fn run_shared(
    files: &[PathBuf],
    scanner: &LineScanner,
    worker_count: NonZeroUsize,
    token: &CancelToken,
) -> SearchResult<Vec<(PathBuf, FileScan)>> {
    scan_on_pool(files, worker_count, token, |path| scanner.scan(path))
}

fn scan_on_pool<F>(
    files: &[PathBuf],
    worker_count: NonZeroUsize,
    token: &CancelToken,
    scan: F,
) -> SearchResult<Vec<(PathBuf, FileScan)>>
where
    F: Fn(&Path) -> FileScan + Sync,
{
    debug!(
        "Scanning {} files on a shared pool of {} threads",
        files.len(),
        worker_count
    );

    let scans: Vec<Option<(PathBuf, FileScan)>> = ThreadPoolBuilder::new()
        .num_threads(worker_count.get())
        .thread_name(|i| format!("keyscout-shared-{}", i))
        .build_scoped(
            |thread| thread.run(),
            |pool| {
                pool.install(|| {
                    files
                        .par_iter()
                        .map(|path| {
                            if token.is_cancelled() {
                                return None;
                            }
                            Some((path.clone(), scan_guarded(path, &scan)))
                        })
                        .collect()
                })
            },
        )
        .map_err(|e| ScanError::pool_setup(e.to_string()))?;

    let skipped = scans.iter().filter(|scan| scan.is_none()).count();
    if skipped > 0 {
        debug!("{} files skipped after cancellation", skipped);
        token.check()?;
    }

    Ok(scans.into_iter().flatten().collect())
}
