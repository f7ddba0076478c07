//! Liveness Monitor: heartbeat bookkeeping and the periodic eviction sweep.
//!
//! Only connections that created or entered a room are tracked. Every sweep
//! pings tracked connections and evicts those silent for longer than the
//! heartbeat timeout, which bounds eviction to `timeout + sweep_interval`
//! after the last acknowledgement.

use std::{collections::HashMap, sync::Arc, time::Duration};

use tokio::{
    sync::Mutex,
    task::JoinHandle,
    time::{Instant, MissedTickBehavior},
};

use crate::{
    config::TimingConfig,
    domain::{ConnectionId, MessagePusher},
    infrastructure::dto::websocket::ServerEvent,
};

use super::{disconnect_connection::DisconnectConnectionUseCase, notify::push_event};

/// Last heartbeat acknowledgement per tracked connection.
#[derive(Default)]
pub struct HeartbeatTracker {
    last_seen: Mutex<HashMap<ConnectionId, Instant>>,
}

impl HeartbeatTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start (or refresh) tracking of a connection.
    pub async fn track(&self, connection_id: ConnectionId) {
        self.last_seen
            .lock()
            .await
            .insert(connection_id, Instant::now());
    }

    /// Refresh a tracked connection. Returns `false` for untracked connections,
    /// which stay untracked.
    pub async fn record_ack(&self, connection_id: &ConnectionId) -> bool {
        match self.last_seen.lock().await.get_mut(connection_id) {
            Some(last_seen) => {
                *last_seen = Instant::now();
                true
            }
            None => false,
        }
    }

    pub async fn untrack(&self, connection_id: &ConnectionId) -> bool {
        self.last_seen.lock().await.remove(connection_id).is_some()
    }

    pub async fn is_tracked(&self, connection_id: &ConnectionId) -> bool {
        self.last_seen.lock().await.contains_key(connection_id)
    }

    pub async fn tracked(&self) -> Vec<ConnectionId> {
        self.last_seen.lock().await.keys().copied().collect()
    }

    /// Untrack the connection if it has been silent longer than `timeout` at
    /// `now`. The check and the removal happen under one lock, so an
    /// acknowledgement arriving concurrently either saves the connection or
    /// comes too late.
    async fn evict_if_stale(
        &self,
        connection_id: &ConnectionId,
        now: Instant,
        timeout: Duration,
    ) -> Option<Duration> {
        let mut last_seen = self.last_seen.lock().await;
        let silent = now.saturating_duration_since(*last_seen.get(connection_id)?);
        if silent > timeout {
            last_seen.remove(connection_id);
            Some(silent)
        } else {
            None
        }
    }
}

/// What one sweep did.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SweepReport {
    pub pinged: usize,
    pub evicted: Vec<ConnectionId>,
    /// Connections the transport no longer knows about.
    pub dropped: usize,
}

pub struct LivenessMonitor {
    tracker: Arc<HeartbeatTracker>,
    message_pusher: Arc<dyn MessagePusher>,
    disconnect: Arc<DisconnectConnectionUseCase>,
    sweep_interval: Duration,
    heartbeat_timeout: Duration,
}

impl LivenessMonitor {
    pub fn new(
        tracker: Arc<HeartbeatTracker>,
        message_pusher: Arc<dyn MessagePusher>,
        disconnect: Arc<DisconnectConnectionUseCase>,
        timing: &TimingConfig,
    ) -> Self {
        Self {
            tracker,
            message_pusher,
            disconnect,
            sweep_interval: timing.sweep_interval,
            heartbeat_timeout: timing.heartbeat_timeout,
        }
    }

    pub async fn sweep(&self) -> SweepReport {
        let now = Instant::now();
        let mut report = SweepReport::default();

        for connection_id in self.tracker.tracked().await {
            if !self.message_pusher.is_connected(&connection_id).await {
                self.tracker.untrack(&connection_id).await;
                report.dropped += 1;
                continue;
            }

            match self
                .tracker
                .evict_if_stale(&connection_id, now, self.heartbeat_timeout)
                .await
            {
                Some(silent) => {
                    tracing::info!(
                        "Connection '{}' timed out after {:?} without heartbeat",
                        connection_id,
                        silent
                    );
                    self.message_pusher.disconnect(&connection_id).await;
                    self.disconnect.execute(&connection_id).await;
                    report.evicted.push(connection_id);
                }
                None => {
                    push_event(
                        self.message_pusher.as_ref(),
                        &connection_id,
                        &ServerEvent::Heartbeat,
                    )
                    .await;
                    report.pinged += 1;
                }
            }
        }

        report
    }

    /// Run the sweep every `sweep_interval` until the returned task is aborted.
    pub fn spawn(self: Arc<Self>) -> JoinHandle<()> {
        tokio::spawn(async move {
            let period = self.sweep_interval;
            let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            tracing::info!(
                "Liveness sweep every {:?}, timeout {:?}",
                period,
                self.heartbeat_timeout
            );
            loop {
                ticker.tick().await;
                let report = self.sweep().await;
                if !report.evicted.is_empty() || report.dropped > 0 {
                    tracing::debug!("Liveness sweep: {:?}", report);
                }
            }
        })
    }
}
