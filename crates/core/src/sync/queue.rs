//! Per-domain operation queue
//!
//! [`OperationQueue::add_operation`] stamps and appends without waiting on
//! the network, then wakes the worker. [`OperationQueue::sync`] is the one
//! sync cycle: snapshot, encode, send, drop acknowledged entries. Cycles
//! never overlap, and the entry set is left untouched when a cycle fails.
//! While anything remains pending the worker retries after a fixed delay.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use listsync_common::time::{Clock, SystemClock};
use listsync_domain::constants::DEFAULT_QUEUE_RETRY_DELAY_MS;
use listsync_domain::{
    OperationId, OperationPayload, PendingOperation, SyncDomain, SyncError, UserId,
};
use parking_lot::Mutex;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use super::pending::PendingSet;
use super::ports::{ApiRequest, ApiTransport, OperationCodec};

/// Result of one call to [`OperationQueue::sync`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Another cycle was running or nothing was pending.
    Skipped,
    /// The server answered; `acked` entries were removed.
    Acknowledged { acked: usize, remaining: usize },
    /// Transport, server or codec failure; nothing was removed.
    Failed { remaining: usize, error: SyncError },
}

/// Buffer of pending mutations for one data family.
pub struct OperationQueue {
    domain: SyncDomain,
    user_id: UserId,
    transport: Arc<dyn ApiTransport>,
    codec: Arc<dyn OperationCodec>,
    clock: Arc<dyn Clock>,
    retry_delay: Duration,
    pending: Mutex<PendingSet>,
    syncing: AtomicBool,
    wake: Notify,
}

impl OperationQueue {
    /// Empty queue on the system clock with the default retry delay.
    pub fn new(
        domain: SyncDomain,
        user_id: UserId,
        transport: Arc<dyn ApiTransport>,
        codec: Arc<dyn OperationCodec>,
    ) -> Self {
        Self {
            domain,
            user_id,
            transport,
            codec,
            clock: Arc::new(SystemClock),
            retry_delay: Duration::from_millis(DEFAULT_QUEUE_RETRY_DELAY_MS),
            pending: Mutex::new(PendingSet::new()),
            syncing: AtomicBool::new(false),
            wake: Notify::new(),
        }
    }

    /// Clock used for the wall-clock `created_at` stamp.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Fixed delay between cycles while entries remain pending.
    #[must_use]
    pub const fn with_retry_delay(mut self, retry_delay: Duration) -> Self {
        self.retry_delay = retry_delay;
        self
    }

    /// Data family this queue posts for; fixes the endpoint.
    pub const fn domain(&self) -> SyncDomain {
        self.domain
    }

    /// Wait between a failed cycle and the next attempt.
    pub const fn retry_delay(&self) -> Duration {
        self.retry_delay
    }

    /// Stamp and append an operation, then wake the worker.
    ///
    /// Returns immediately with the assigned identifier.
    pub fn add_operation(&self, payload: OperationPayload) -> OperationId {
        if payload.domain() != self.domain {
            warn!(
                domain = %self.domain,
                handler_id = payload.handler_id(),
                "operation submitted to a queue for another domain"
            );
        }

        let created_at: DateTime<Utc> = self.clock.system_time().into();
        let (operation_id, logical_timestamp, pending) = {
            let mut pending = self.pending.lock();
            let op = pending.stamp(payload, &self.user_id, created_at);
            (op.id().clone(), op.logical_timestamp(), pending.len())
        };

        debug!(
            domain = %self.domain,
            operation_id = %operation_id,
            logical_timestamp = logical_timestamp.0,
            pending,
            "operation queued"
        );
        self.wake.notify_waiters();
        operation_id
    }

    /// Run one sync cycle.
    ///
    /// No-op when a cycle is already in flight or nothing is pending.
    /// Failures are reported in the outcome, never raised.
    #[instrument(skip(self), fields(domain = %self.domain))]
    pub async fn sync(&self) -> SyncOutcome {
        if self.syncing.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire).is_err() {
            debug!("sync already in flight");
            return SyncOutcome::Skipped;
        }
        let _flag = SyncingFlag(&self.syncing);

        let batch = self.pending.lock().snapshot();
        if batch.is_empty() {
            return SyncOutcome::Skipped;
        }

        debug!(batch_size = batch.len(), "sending batch");
        match self.transmit(&batch).await {
            Ok(acknowledged) => {
                let (acked, remaining) = {
                    let mut pending = self.pending.lock();
                    let acked = pending.acknowledge(&acknowledged);
                    (acked, pending.len())
                };
                if acked < batch.len() {
                    warn!(
                        batch_size = batch.len(),
                        acked,
                        "server did not acknowledge every operation; retrying the rest"
                    );
                } else {
                    info!(acked, remaining, "batch acknowledged");
                }
                SyncOutcome::Acknowledged { acked, remaining }
            }
            Err(error) => {
                let remaining = self.pending_len();
                warn!(error = %error, remaining, "sync cycle failed; keeping pending operations");
                SyncOutcome::Failed { remaining, error }
            }
        }
    }

    async fn transmit(&self, batch: &[PendingOperation]) -> Result<Vec<OperationId>, SyncError> {
        let body = self.codec.encode_batch(batch)?;
        let request = ApiRequest::new(self.domain.endpoint(), self.codec.content_type(), body);
        let response = self.transport.post(request).await?;
        self.codec.decode_acknowledgements(&response)
    }

    /// Entries not yet acknowledged, including any in the current cycle.
    pub fn pending_len(&self) -> usize {
        self.pending.lock().len()
    }

    /// Ordered copy of the pending entries.
    pub fn pending_snapshot(&self) -> Vec<PendingOperation> {
        self.pending.lock().snapshot()
    }

    /// True while a cycle holds the single-flight slot.
    pub fn is_syncing(&self) -> bool {
        self.syncing.load(Ordering::Acquire)
    }

    /// Drain until empty, waiting `retry_delay` between cycles.
    ///
    /// A submission during the wait starts the next cycle at once, since no
    /// cycle is in flight then. Submissions that land while a cycle is in
    /// flight are picked up after the delay. Returns when nothing is
    /// pending or `cancel` fires.
    pub async fn drain(&self, cancel: &CancellationToken) {
        loop {
            let outcome = self.sync().await;
            let submitted = self.wake.notified();
            if self.pending_len() == 0 {
                return;
            }
            debug!(
                ?outcome,
                delay_ms = u64::try_from(self.retry_delay.as_millis()).unwrap_or(u64::MAX),
                "operations still pending; scheduling retry"
            );
            tokio::select! {
                () = cancel.cancelled() => return,
                () = submitted => debug!("operation submitted during retry wait; syncing now"),
                () = tokio::time::sleep(self.retry_delay) => {}
            }
        }
    }

    /// Spawn [`run`](Self::run) on the current runtime.
    pub fn spawn_worker(self: &Arc<Self>, cancel: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(Arc::clone(self).run(cancel))
    }

    /// Background loop: wait for a submission, then drain.
    ///
    /// Anything still pending when `cancel` fires is discarded.
    pub async fn run(self: Arc<Self>, cancel: CancellationToken) {
        info!(domain = %self.domain, "queue worker started");
        loop {
            // Registered before the emptiness check so a submission in
            // between is not missed.
            let submitted = self.wake.notified();
            if self.pending_len() == 0 {
                tokio::select! {
                    () = cancel.cancelled() => break,
                    () = submitted => {}
                }
            }
            if cancel.is_cancelled() {
                break;
            }
            self.drain(&cancel).await;
        }

        let dropped = self.pending.lock().clear();
        if dropped > 0 {
            warn!(domain = %self.domain, dropped, "queue stopped with unsent operations");
        }
        info!(domain = %self.domain, "queue worker stopped");
    }
}

impl std::fmt::Debug for OperationQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OperationQueue")
            .field("domain", &self.domain)
            .field("pending", &self.pending_len())
            .field("syncing", &self.is_syncing())
            .finish_non_exhaustive()
    }
}

/// Clears the in-flight flag on every exit path of a cycle.
struct SyncingFlag<'a>(&'a AtomicBool);

impl Drop for SyncingFlag<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Owns the background task driving one queue.
pub struct QueueWorker {
    queue: Arc<OperationQueue>,
    cancellation: CancellationToken,
    task_handle: Option<JoinHandle<()>>,
    join_timeout: Duration,
}

impl QueueWorker {
    /// Idle worker; nothing runs until [`start`](Self::start).
    pub fn new(queue: Arc<OperationQueue>) -> Self {
        Self {
            queue,
            cancellation: CancellationToken::new(),
            task_handle: None,
            join_timeout: Duration::from_secs(5),
        }
    }

    /// Spawn the worker as a child of `parent`, so cancelling the parent
    /// stops it too.
    pub fn start_with_parent(&mut self, parent: &CancellationToken) -> Result<(), SyncError> {
        if self.is_running() {
            return Err(SyncError::Config("queue worker already running".into()));
        }

        self.cancellation = parent.child_token();
        self.task_handle = Some(self.queue.spawn_worker(self.cancellation.clone()));
        Ok(())
    }

    /// Spawn with a fresh root token.
    ///
    /// # Errors
    ///
    /// `SyncError::Config` if already running.
    pub fn start(&mut self) -> Result<(), SyncError> {
        self.start_with_parent(&CancellationToken::new())
    }

    /// Cancel the loop and wait for it to finish.
    pub async fn stop(&mut self) -> Result<(), SyncError> {
        let Some(handle) = self.task_handle.take() else {
            return Err(SyncError::Config("queue worker not running".into()));
        };

        self.cancellation.cancel();
        match tokio::time::timeout(self.join_timeout, handle).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => {
                warn!("queue worker task panicked: {}", e);
                Err(SyncError::Cancelled("queue worker task panicked".into()))
            }
            Err(_) => {
                warn!("queue worker did not stop within timeout");
                Err(SyncError::Cancelled("queue worker stop timed out".into()))
            }
        }
    }

    pub const fn is_running(&self) -> bool {
        self.task_handle.is_some()
    }

    /// Queue driven by this worker.
    pub const fn queue(&self) -> &Arc<OperationQueue> {
        &self.queue
    }
}
