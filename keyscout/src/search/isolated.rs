use crossbeam_channel::{unbounded, Receiver, RecvTimeoutError, Sender};
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::thread::{self, JoinHandle};
use tracing::{debug, error, trace};

use super::cancel::CancelToken;
use super::scanner::{FileScan, LineScanner};
use crate::errors::{ScanError, SearchResult};
use crate::metrics::ScanStats;
use crate::results::MatchEvent;

/// Message sent from an isolated worker to the collector
#[derive(Debug)]
pub enum WorkerMessage {
    /// One keyword found in one file
    Match(MatchEvent),
    /// Sentinel: the worker has sent all of its matches
    Done {
        worker: usize,
        stats: ScanStats,
        /// Whether the worker stopped early because the token fired
        interrupted: bool,
    },
}

/// Output of the isolated-worker pool
#[derive(Debug, Default)]
pub struct IsolatedOutput {
    pub matches: Vec<MatchEvent>,
    pub stats: ScanStats,
}

/// Splits `items` into `buckets` chunks; item `i` lands in chunk `i % buckets`
pub fn partition_round_robin<T: Clone>(items: &[T], buckets: usize) -> Vec<Vec<T>> {
    let buckets = buckets.max(1);
    let mut chunks: Vec<Vec<T>> = (0..buckets)
        .map(|_| Vec::with_capacity(items.len() / buckets + 1))
        .collect();
    for (i, item) in items.iter().enumerate() {
        chunks[i % buckets].push(item.clone());
    }
    chunks
}

/// Body of one isolated worker.
///
/// Owns its files, its scanner and its statistics. Everything it learns leaves
/// through `sender`, and the `Done` sentinel is always the last message.
fn worker_loop<F>(
    worker: usize,
    files: Vec<PathBuf>,
    scan: F,
    sender: Sender<WorkerMessage>,
    token: CancelToken,
) where
    F: Fn(&Path) -> FileScan,
{
    let mut stats = ScanStats::new();
    let mut interrupted = false;

    for path in files {
        if token.is_cancelled() {
            interrupted = true;
            break;
        }
        let result = scan(&path);
        stats.record(&result);
        for keyword in result.found {
            let event = MatchEvent::new(keyword, path.clone());
            if sender.send(WorkerMessage::Match(event)).is_err() {
                // Collector is gone; nobody is waiting for the sentinel
                return;
            }
        }
    }

    trace!("Worker {} finished, sending sentinel", worker);
    let _ = sender.send(WorkerMessage::Done {
        worker,
        stats,
        interrupted,
    });
}

fn spawn_workers<F>(
    chunks: Vec<Vec<PathBuf>>,
    scan: &F,
    sender: &Sender<WorkerMessage>,
    token: &CancelToken,
) -> (Vec<JoinHandle<()>>, Option<ScanError>)
where
    F: Fn(&Path) -> FileScan + Clone + Send + 'static,
{
    let mut handles = Vec::with_capacity(chunks.len());

    for (worker, chunk) in chunks.into_iter().enumerate() {
        let scan = scan.clone();
        let sender = sender.clone();
        let token = token.clone();

        let spawned = thread::Builder::new()
            .name(format!("keyscout-isolated-{}", worker))
            .spawn(move || worker_loop(worker, chunk, scan, sender, token));

        match spawned {
            Ok(handle) => handles.push(handle),
            Err(e) => {
                return (
                    handles,
                    Some(ScanError::pool_setup(format!(
                        "failed to spawn worker {}: {}",
                        worker, e
                    ))),
                )
            }
        }
    }

    (handles, None)
}

/// Receives until every worker has sent its sentinel.
///
/// Blocks on the channel; with a deadline the wait is bounded by it. A worker
/// that dies without a sentinel drops its sender, so once every live worker
/// is done the channel disconnects instead of blocking forever.
fn collect(
    receiver: &Receiver<WorkerMessage>,
    workers: usize,
    token: &CancelToken,
) -> (IsolatedOutput, Vec<bool>, bool, Option<ScanError>) {
    let mut output = IsolatedOutput::default();
    let mut finished = vec![false; workers];
    let mut interrupted = false;
    let mut done = 0;

    while done < workers {
        let received = match token.deadline() {
            Some(deadline) => receiver.recv_deadline(deadline),
            None => receiver
                .recv()
                .map_err(|_| RecvTimeoutError::Disconnected),
        };

        match received {
            Ok(WorkerMessage::Match(event)) => output.matches.push(event),
            Ok(WorkerMessage::Done {
                worker,
                stats,
                interrupted: stopped,
            }) => {
                done += 1;
                finished[worker] = true;
                interrupted |= stopped;
                output.stats.merge(&stats);
            }
            Err(RecvTimeoutError::Timeout) => {
                token.cancel();
                let err = token.check().err().unwrap_or(ScanError::Cancelled);
                return (output, finished, interrupted, Some(err));
            }
            Err(RecvTimeoutError::Disconnected) => {
                let worker = finished.iter().position(|f| !f).unwrap_or(0);
                return (
                    output,
                    finished,
                    interrupted,
                    Some(ScanError::worker_crashed(worker)),
                );
            }
        }
    }

    (output, finished, interrupted, None)
}

/// Scans `files` on isolated worker threads that report over a channel.
///
/// Files are dealt round-robin to `min(worker_count, files.len())` workers.
/// Each worker scans its chunk sequentially and shares nothing mutable with
/// the collector or its siblings. Every worker is joined before returning,
/// on success and on failure alike.
pub fn run_isolated(
    files: &[PathBuf],
    scanner: &LineScanner,
    worker_count: NonZeroUsize,
    token: &CancelToken,
) -> SearchResult<IsolatedOutput> {
    let scanner = scanner.clone();
    run_workers(files, worker_count, token, move |path: &Path| scanner.scan(path))
}

fn run_workers<F>(
    files: &[PathBuf],
    worker_count: NonZeroUsize,
    token: &CancelToken,
    scan: F,
) -> SearchResult<IsolatedOutput>
where
    F: Fn(&Path) -> FileScan + Clone + Send + 'static,
{
    let workers = worker_count.get().min(files.len());
    if workers == 0 {
        debug!("No files to scan, no isolated workers started");
        return Ok(IsolatedOutput::default());
    }

    debug!(
        "Scanning {} files on {} isolated workers",
        files.len(),
        workers
    );

    let chunks = partition_round_robin(files, workers);
    let (sender, receiver) = unbounded();

    let (handles, spawn_error) = spawn_workers(chunks, &scan, &sender, token);
    // Only workers hold senders from here on
    drop(sender);

    let (output, finished, interrupted, mut failure) = match spawn_error {
        Some(err) => {
            token.cancel();
            (IsolatedOutput::default(), vec![false; workers], true, Some(err))
        }
        None => collect(&receiver, workers, token),
    };

    // Unblock workers still sending so the joins below cannot stall
    drop(receiver);

    for (worker, handle) in handles.into_iter().enumerate() {
        if handle.join().is_err() {
            error!("Isolated worker {} panicked", worker);
            if !finished[worker] && !matches!(failure, Some(ScanError::PoolSetup(_))) {
                failure = Some(ScanError::worker_crashed(worker));
            }
        }
    }

    if let Some(err) = failure {
        return Err(err);
    }
    if interrupted {
        token.check()?;
    }

    Ok(output)
}
