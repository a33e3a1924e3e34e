/// Concurrent keyword scanning.
///
/// Both strategies share the same [`LineScanner`] and differ only in how
/// files reach it and how matches come back:
///
/// 1. **Shared pool** ([`run_shared`]): a rayon pool of exactly
///    `worker_count` threads. Each file is a task returning a pure value and
///    the calling thread aggregates after the pool drains.
///    ```rust,ignore
///    let scans: Vec<_> = pool.install(|| files.par_iter().map(|f| scan(f)).collect());
///    ```
///
/// 2. **Isolated workers** ([`run_isolated`]): files are dealt round-robin
///    into chunks, one OS thread per chunk. Workers own their data and talk
///    to the collector only through a crossbeam channel of
///    [`WorkerMessage`]s, finishing with a `Done` sentinel.
///    ```rust,ignore
///    while done < workers {
///        match rx.recv()? {
///            WorkerMessage::Match(event) => aggregator.record_event(event),
///            WorkerMessage::Done { .. } => done += 1,
///        }
///    }
///    ```
///
/// Either way, every worker thread is joined before the search returns and
/// a [`CancelToken`] lets callers stop a search early.
pub mod cancel;
pub mod engine;
pub mod isolated;
pub mod scanner;
pub mod shared;

pub use cancel::CancelToken;
pub use engine::{search, search_path, search_with_stats, search_with_token};
pub use isolated::{partition_round_robin, run_isolated, IsolatedOutput, WorkerMessage};
pub use scanner::{FileScan, LineScanner, ScanOutcome};
pub use shared::run_shared;
