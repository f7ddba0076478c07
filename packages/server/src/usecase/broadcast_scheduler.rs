//! Broadcast Scheduler: one repeating delivery task per connection.
//!
//! A connection's [`Subscription`] decides what it receives every tick. The
//! scheduler owns one slot per connection; replacing a subscription aborts the
//! slot's task and installs the new one while holding the slot table lock, so
//! two tasks for the same connection can never coexist.
//!
//! Deliveries read the registry on every tick. A room snapshot therefore
//! reflects every edit made since the previous tick without re-subscribing.

use std::{collections::HashMap, sync::Arc, time::Duration};

use tokio::{
    sync::Mutex,
    task::JoinHandle,
    time::{Instant, MissedTickBehavior},
};

use crate::{
    domain::{ConnectionId, MessagePushError, MessagePusher, RoomRepository, Subscription},
    infrastructure::dto::websocket::ServerEvent,
};

struct Slot {
    subscription: Subscription,
    task: JoinHandle<()>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Delivery {
    Sent,
    Skipped,
    /// The connection is gone; stop delivering.
    Gone,
}

pub struct BroadcastScheduler {
    repository: Arc<dyn RoomRepository>,
    message_pusher: Arc<dyn MessagePusher>,
    tick_interval: Duration,
    slots: Mutex<HashMap<ConnectionId, Slot>>,
}

impl BroadcastScheduler {
    pub fn new(
        repository: Arc<dyn RoomRepository>,
        message_pusher: Arc<dyn MessagePusher>,
        tick_interval: Duration,
    ) -> Self {
        Self {
            repository,
            message_pusher,
            tick_interval,
            slots: Mutex::new(HashMap::new()),
        }
    }

    /// Replace the connection's subscription.
    ///
    /// The previous task is aborted, one delivery is pushed right away and a
    /// repeating task is armed. Subscribing to [`Subscription::None`] only
    /// cancels.
    pub async fn subscribe(&self, connection_id: ConnectionId, subscription: Subscription) {
        let mut slots = self.slots.lock().await;
        if let Some(previous) = slots.remove(&connection_id) {
            previous.task.abort();
        }
        if subscription.is_none() {
            return;
        }

        let delivery = deliver(
            self.repository.as_ref(),
            self.message_pusher.as_ref(),
            &connection_id,
            &subscription,
        )
        .await;
        if delivery == Delivery::Gone {
            tracing::debug!("Connection '{}' is gone; not arming delivery", connection_id);
            return;
        }

        let task = tokio::spawn(delivery_loop(
            self.repository.clone(),
            self.message_pusher.clone(),
            connection_id,
            subscription.clone(),
            self.tick_interval,
        ));
        tracing::debug!("Connection '{}' subscribed to {:?}", connection_id, subscription);
        slots.insert(connection_id, Slot { subscription, task });
    }

    pub async fn unsubscribe(&self, connection_id: &ConnectionId) {
        if let Some(previous) = self.slots.lock().await.remove(connection_id) {
            previous.task.abort();
            tracing::debug!("Connection '{}' unsubscribed", connection_id);
        }
    }

    pub async fn subscription(&self, connection_id: &ConnectionId) -> Subscription {
        self.slots
            .lock()
            .await
            .get(connection_id)
            .map(|slot| slot.subscription.clone())
            .unwrap_or_default()
    }

    /// Number of delivery tasks still running.
    pub async fn active_tasks(&self) -> usize {
        self.slots
            .lock()
            .await
            .values()
            .filter(|slot| !slot.task.is_finished())
            .count()
    }

    /// Abort every delivery task.
    pub async fn shutdown(&self) {
        for (_, slot) in self.slots.lock().await.drain() {
            slot.task.abort();
        }
    }
}

async fn delivery_loop(
    repository: Arc<dyn RoomRepository>,
    message_pusher: Arc<dyn MessagePusher>,
    connection_id: ConnectionId,
    subscription: Subscription,
    tick_interval: Duration,
) {
    let mut ticker = tokio::time::interval_at(Instant::now() + tick_interval, tick_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        ticker.tick().await;
        let delivery = deliver(
            repository.as_ref(),
            message_pusher.as_ref(),
            &connection_id,
            &subscription,
        )
        .await;
        if delivery == Delivery::Gone {
            tracing::debug!("Stopping deliveries to departed connection '{}'", connection_id);
            break;
        }
    }
}

async fn deliver(
    repository: &dyn RoomRepository,
    message_pusher: &dyn MessagePusher,
    connection_id: &ConnectionId,
    subscription: &Subscription,
) -> Delivery {
    let event = match subscription {
        Subscription::None => return Delivery::Skipped,
        Subscription::RoomList => {
            let rooms = repository.list_rooms().await;
            ServerEvent::RoomList(rooms.iter().map(Into::into).collect())
        }
        Subscription::RoomSnapshot(room_id) => match repository.snapshot(room_id).await {
            Ok(room) => ServerEvent::RoomSnapshot(room.into()),
            Err(e) => {
                tracing::debug!("Skipping delivery to '{}': {}", connection_id, e);
                return Delivery::Skipped;
            }
        },
    };

    let json = match event.to_json() {
        Ok(json) => json,
        Err(e) => {
            tracing::error!("Failed to serialize delivery for '{}': {}", connection_id, e);
            return Delivery::Skipped;
        }
    };

    match message_pusher.push_to(connection_id, &json).await {
        Ok(()) => Delivery::Sent,
        Err(MessagePushError::ClientNotFound(_)) => Delivery::Gone,
        Err(e) => {
            tracing::warn!("Delivery to '{}' failed: {}", connection_id, e);
            Delivery::Gone
        }
    }
}
