//! Persistent push-channel connection manager
//!
//! The run loop cycles `Disconnected -> Connecting -> Connected ->
//! Disconnected` until [`ConnectionManager::close`] is called. Every close,
//! failed connect or heartbeat timeout is followed by a reconnect after the
//! current backoff delay; a successful open resets the delay to its floor.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use listsync_common::resilience::ReconnectBackoff;
use listsync_domain::constants::{CLOSE_CODE_TOKEN_EXPIRED, HEARTBEAT_FRAME};
use listsync_domain::{ConnectionState, RealtimeConfig, SyncError, SyncEvent, SyncResult};
use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use super::heartbeat::HeartbeatWatchdog;
use super::ports::{ChannelConnector, ChannelFrame, PushChannel, PushSignalHandler};
use crate::auth::TokenAuthority;

/// Why a connected session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SessionEnd {
    Cancelled,
    Closed { code: Option<u16> },
    HeartbeatTimeout,
}

/// One step of the connected pump, resolved outside `select!` so the
/// channel can be borrowed again.
enum PumpStep {
    Cancelled,
    Tick,
    Frame(SyncResult<ChannelFrame>),
}

struct ConnectionShared {
    connector: Arc<dyn ChannelConnector>,
    authority: Arc<TokenAuthority>,
    handler: Arc<dyn PushSignalHandler>,
    heartbeat_interval: Duration,
    max_missed_heartbeats: u32,
    backoff: Mutex<ReconnectBackoff>,
    missed: AtomicU32,
    state: watch::Sender<ConnectionState>,
}

/// Owner of the one logical push connection.
pub struct ConnectionManager {
    shared: Arc<ConnectionShared>,
    cancellation: Mutex<CancellationToken>,
    task_handle: Mutex<Option<JoinHandle<()>>>,
}

impl ConnectionManager {
    /// Build a manager from the realtime settings. Does not connect.
    pub fn new(
        connector: Arc<dyn ChannelConnector>,
        authority: Arc<TokenAuthority>,
        handler: Arc<dyn PushSignalHandler>,
        config: &RealtimeConfig,
    ) -> SyncResult<Self> {
        let backoff = ReconnectBackoff::new(config.initial_retry_delay(), config.max_retry_delay())
            .map_err(|e| SyncError::Config(e.to_string()))?;
        if config.heartbeat_interval().is_zero() || config.max_missed_heartbeats == 0 {
            return Err(SyncError::Config(
                "heartbeat interval and missed-heartbeat threshold must be non-zero".into(),
            ));
        }

        let (state, _) = watch::channel(ConnectionState::Disconnected);
        Ok(Self {
            shared: Arc::new(ConnectionShared {
                connector,
                authority,
                handler,
                heartbeat_interval: config.heartbeat_interval(),
                max_missed_heartbeats: config.max_missed_heartbeats,
                backoff: Mutex::new(backoff),
                missed: AtomicU32::new(0),
                state,
            }),
            cancellation: Mutex::new(CancellationToken::new()),
            task_handle: Mutex::new(None),
        })
    }

    /// Spawn the connect/reconnect loop.
    pub fn start(&self) -> SyncResult<()> {
        let mut task_handle = self.task_handle.lock();
        if task_handle.is_some() {
            return Err(SyncError::Config("connection manager already started".into()));
        }

        let cancel = {
            let mut cancellation = self.cancellation.lock();
            if cancellation.is_cancelled() {
                *cancellation = CancellationToken::new();
            }
            cancellation.clone()
        };
        let shared = Arc::clone(&self.shared);
        *task_handle = Some(tokio::spawn(shared.run(cancel)));
        info!("connection manager started");
        Ok(())
    }

    /// Tear down the channel and stop reconnecting.
    ///
    /// The only way to end the loop. Safe to call when not started.
    #[instrument(skip(self))]
    pub async fn close(&self) {
        self.cancellation.lock().cancel();
        let handle = self.task_handle.lock().take();
        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                warn!("connection task ended abnormally: {}", e);
            }
        }
        self.shared.set_state(ConnectionState::Disconnected);
        info!("connection manager closed");
    }

    pub fn state(&self) -> ConnectionState {
        *self.shared.state.borrow()
    }

    /// Receiver that observes every state transition.
    pub fn subscribe_state(&self) -> watch::Receiver<ConnectionState> {
        self.shared.state.subscribe()
    }

    /// Delay that will be used before the next reconnect.
    pub fn current_retry_delay(&self) -> Duration {
        self.shared.backoff.lock().current()
    }

    /// Watchdog ticks since the last heartbeat frame on the current socket.
    pub fn missed_heartbeats(&self) -> u32 {
        self.shared.missed.load(Ordering::Acquire)
    }

    /// Connection task spawned and not yet finished.
    pub fn is_running(&self) -> bool {
        self.task_handle.lock().as_ref().is_some_and(|handle| !handle.is_finished())
    }
}

impl Drop for ConnectionManager {
    fn drop(&mut self) {
        self.cancellation.get_mut().cancel();
    }
}

impl ConnectionShared {
    async fn run(self: Arc<Self>, cancel: CancellationToken) {
        loop {
            self.set_state(ConnectionState::Connecting);
            let access_token = self.authority.access_token();

            let connected = tokio::select! {
                () = cancel.cancelled() => break,
                result = self.connector.connect(&access_token) => result,
            };

            let refresh_first = match connected {
                Ok(mut channel) => {
                    self.backoff.lock().reset();
                    self.set_state(ConnectionState::Connected);
                    let end = self.pump(channel.as_mut(), &cancel).await;
                    channel.close().await;
                    self.set_state(ConnectionState::Disconnected);

                    match end {
                        SessionEnd::Cancelled => break,
                        SessionEnd::HeartbeatTimeout => false,
                        SessionEnd::Closed { code } => {
                            debug!(?code, "push channel closed");
                            code == Some(CLOSE_CODE_TOKEN_EXPIRED)
                        }
                    }
                }
                Err(error) => {
                    self.set_state(ConnectionState::Disconnected);
                    warn!(error = %error, "push channel connect failed");
                    matches!(error, SyncError::AuthExpired(_))
                }
            };

            if refresh_first {
                info!("access token expired; refreshing before reconnect");
                let refreshed = tokio::select! {
                    () = cancel.cancelled() => break,
                    result = self.authority.refresh() => result,
                };
                if let Err(error) = refreshed {
                    warn!(error = %error, "token refresh before reconnect failed");
                }
            }

            let delay = self.backoff.lock().next_delay();
            info!(
                delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                "scheduling reconnect"
            );
            tokio::select! {
                () = cancel.cancelled() => break,
                () = tokio::time::sleep(delay) => {}
            }
        }

        self.set_state(ConnectionState::Disconnected);
        debug!("connection loop stopped");
    }

    /// Drive one open channel until it closes, times out or is cancelled.
    async fn pump(&self, channel: &mut dyn PushChannel, cancel: &CancellationToken) -> SessionEnd {
        let mut watchdog = HeartbeatWatchdog::new(self.max_missed_heartbeats);
        self.missed.store(0, Ordering::Release);

        let mut ticker =
            interval_at(Instant::now() + self.heartbeat_interval, self.heartbeat_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            let step = tokio::select! {
                () = cancel.cancelled() => PumpStep::Cancelled,
                _ = ticker.tick() => PumpStep::Tick,
                frame = channel.recv() => PumpStep::Frame(frame),
            };

            match step {
                PumpStep::Cancelled => return SessionEnd::Cancelled,
                PumpStep::Tick => {
                    let expired = watchdog.on_tick();
                    self.missed.store(watchdog.missed(), Ordering::Release);
                    if expired {
                        warn!(
                            missed = watchdog.missed(),
                            "too many missed heartbeats; force-closing push channel"
                        );
                        return SessionEnd::HeartbeatTimeout;
                    }
                }
                PumpStep::Frame(Ok(ChannelFrame::Text(text))) if text == HEARTBEAT_FRAME => {
                    watchdog.on_heartbeat();
                    self.missed.store(0, Ordering::Release);
                    if let Err(error) = channel.send_text(HEARTBEAT_FRAME).await {
                        warn!(error = %error, "failed to echo heartbeat");
                        return SessionEnd::Closed { code: None };
                    }
                }
                PumpStep::Frame(Ok(ChannelFrame::Text(text))) => {
                    let event = SyncEvent::parse(&text);
                    debug!(?event, "push signal received");
                    self.handler.on_signal(event);
                }
                PumpStep::Frame(Ok(ChannelFrame::Closed { code })) => {
                    return SessionEnd::Closed { code };
                }
                PumpStep::Frame(Err(error)) => {
                    warn!(error = %error, "push channel failed");
                    return SessionEnd::Closed { code: None };
                }
            }
        }
    }

    fn set_state(&self, next: ConnectionState) {
        let previous = self.state.send_replace(next);
        if previous != next {
            debug!(from = %previous, to = %next, "connection state changed");
            self.handler.on_state_change(next);
        }
    }
}
