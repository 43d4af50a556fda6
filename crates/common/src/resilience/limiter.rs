//! Concurrency limiter for a named resource
//!
//! At most `max_concurrent` tasks run at once. Everyone else waits in a FIFO
//! queue and is admitted one at a time as running tasks finish, whether the
//! finished task succeeded or failed. Waiters have no timeout; the only way
//! to release them without running their task is [`ConcurrencyLimiter::close`].

use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::Semaphore;
use tracing::{debug, instrument, warn};

/// Concurrency used when none is configured.
pub const DEFAULT_MAX_CONCURRENT: usize = 5;

/// Errors raised by the limiter itself, never by the task it runs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LimiterError {
    #[error("limiter '{name}' was closed before the task was admitted")]
    Closed { name: String },
    #[error("max_concurrent must be greater than 0")]
    InvalidConcurrency,
}

/// Point-in-time view of a limiter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LimiterMetrics {
    pub name: String,
    pub max_concurrent: usize,
    /// Tasks currently holding a slot.
    pub active: usize,
    /// Callers waiting for a slot.
    pub queued: usize,
    /// Tasks that ran to completion (either outcome).
    pub completed: u64,
}

impl LimiterMetrics {
    /// Check if every slot is taken
    pub const fn is_saturated(&self) -> bool {
        self.active >= self.max_concurrent
    }
}

/// FIFO admission gate bounding concurrent in-flight work.
///
/// # Examples
///
/// ```rust
/// use listsync_common::resilience::ConcurrencyLimiter;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let limiter = ConcurrencyLimiter::new("api", 5)?;
///
/// let value = limiter.execute(|| async { 42 }).await?;
/// assert_eq!(value, 42);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct ConcurrencyLimiter {
    name: Arc<str>,
    max_concurrent: usize,
    semaphore: Arc<Semaphore>,
    queued: Arc<AtomicUsize>,
    completed: Arc<AtomicU64>,
}

impl ConcurrencyLimiter {
    /// Create a limiter admitting `max_concurrent` tasks at a time.
    pub fn new(name: impl Into<String>, max_concurrent: usize) -> Result<Self, LimiterError> {
        if max_concurrent == 0 {
            return Err(LimiterError::InvalidConcurrency);
        }

        let name: String = name.into();
        Ok(Self {
            name: Arc::from(name),
            max_concurrent,
            semaphore: Arc::new(Semaphore::new(max_concurrent)),
            queued: Arc::new(AtomicUsize::new(0)),
            completed: Arc::new(AtomicU64::new(0)),
        })
    }

    /// Limiter with the default concurrency of five.
    pub fn with_default_concurrency(name: impl Into<String>) -> Self {
        let name: String = name.into();
        Self {
            name: Arc::from(name),
            max_concurrent: DEFAULT_MAX_CONCURRENT,
            semaphore: Arc::new(Semaphore::new(DEFAULT_MAX_CONCURRENT)),
            queued: Arc::new(AtomicUsize::new(0)),
            completed: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Run `task` once a slot is free.
    ///
    /// The task's own output is returned untouched; the slot is released
    /// when the task future completes or is dropped.
    #[instrument(skip(self, task), fields(limiter = %self.name))]
    pub async fn execute<F, Fut, T>(&self, task: F) -> Result<T, LimiterError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        let permit = {
            let _waiting = QueuedGuard::enter(&self.queued);
            self.semaphore.acquire().await.map_err(|_| {
                warn!(limiter = %self.name, "limiter closed while waiting for a slot");
                LimiterError::Closed { name: self.name.to_string() }
            })?
        };

        debug!(active = self.active(), queued = self.queued(), "slot acquired");
        let output = task().await;
        drop(permit);
        self.completed.fetch_add(1, Ordering::Relaxed);

        Ok(output)
    }

    /// Reject every queued and future caller.
    ///
    /// Tasks already running keep their slot until they finish.
    pub fn close(&self) {
        self.semaphore.close();
    }

    /// Set by [`close`](Self::close); new callers get `LimiterError::Closed`.
    pub fn is_closed(&self) -> bool {
        self.semaphore.is_closed()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub const fn max_concurrent(&self) -> usize {
        self.max_concurrent
    }

    /// Tasks currently holding a slot.
    pub fn active(&self) -> usize {
        self.max_concurrent.saturating_sub(self.semaphore.available_permits())
    }

    /// Callers waiting for a slot.
    pub fn queued(&self) -> usize {
        self.queued.load(Ordering::Acquire)
    }

    /// Snapshot for logging; the fields may be mutually stale by a task.
    pub fn metrics(&self) -> LimiterMetrics {
        LimiterMetrics {
            name: self.name.to_string(),
            max_concurrent: self.max_concurrent,
            active: self.active(),
            queued: self.queued(),
            completed: self.completed.load(Ordering::Acquire),
        }
    }
}

impl fmt::Debug for ConcurrencyLimiter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConcurrencyLimiter")
            .field("name", &self.name)
            .field("max_concurrent", &self.max_concurrent)
            .field("active", &self.active())
            .field("queued", &self.queued())
            .finish()
    }
}

/// Keeps the queued gauge honest when a waiting caller is cancelled.
struct QueuedGuard<'a> {
    counter: &'a AtomicUsize,
}

impl<'a> QueuedGuard<'a> {
    fn enter(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::AcqRel);
        Self { counter }
    }
}

impl Drop for QueuedGuard<'_> {
    fn drop(&mut self) {
        self.counter.fetch_sub(1, Ordering::AcqRel);
    }
}
