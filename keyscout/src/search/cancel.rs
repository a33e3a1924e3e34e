use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::errors::{ScanError, SearchResult};

/// Cooperative stop signal for one search.
///
/// Workers poll it before each file. It fires when [`CancelToken::cancel`] is
/// called from any clone, or when the optional deadline passes.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
    deadline: Option<(Instant, Duration)>,
}

impl CancelToken {
    /// A token that only fires when cancelled explicitly
    pub fn new() -> Self {
        Self::default()
    }

    /// A token that also fires once `timeout` has elapsed from now
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            cancelled: Arc::new(AtomicBool::new(false)),
            deadline: Instant::now()
                .checked_add(timeout)
                .map(|at| (at, timeout)),
        }
    }

    pub fn from_timeout(timeout: Option<Duration>) -> Self {
        timeout.map_or_else(Self::new, Self::with_timeout)
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline.map(|(at, _)| at)
    }

    fn timed_out(&self) -> bool {
        self.deadline.is_some_and(|(at, _)| Instant::now() >= at)
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire) || self.timed_out()
    }

    /// Converts a fired token into the matching error
    pub fn check(&self) -> SearchResult<()> {
        match self.deadline {
            Some((_, timeout)) if self.timed_out() => Err(ScanError::Timeout(timeout)),
            _ if self.cancelled.load(Ordering::Acquire) => Err(ScanError::Cancelled),
            _ => Ok(()),
        }
    }
}
