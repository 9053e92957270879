//! Topic based publish/subscribe fan-out for cabin state changes.
//!
//! Every subscriber owns an unbounded queue, so events reach a given
//! subscriber in publish order and are never dropped. Order across
//! subscribers is unspecified.

use crate::cabin::CabinState;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use tokio::sync::mpsc;
use tracing::trace;

/// Topic the cabin publishes its state changes on.
pub const CABIN_STATE_TOPIC: &str = "elevator:state_changed";

/// Which observable attribute changed, together with its new value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StateChange {
    Floor(i32),
    DoorsOpen(bool),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub topic: String,
    pub change: StateChange,
    /// Full cabin state taken right after the change was applied.
    pub snapshot: CabinState,
}

pub type Subscription = mpsc::UnboundedReceiver<Notification>;

#[derive(Debug)]
struct Subscriber {
    id: String,
    tx: mpsc::UnboundedSender<Notification>,
}

#[derive(Debug, Clone, Default)]
pub struct NotificationBus {
    topics: Arc<RwLock<HashMap<String, Vec<Subscriber>>>>,
}

impl NotificationBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `subscriber` for `topic` and return its delivery queue.
    ///
    /// Subscribing again with the same id replaces the previous queue, which
    /// is closed as a result.
    pub fn subscribe(&self, subscriber: impl Into<String>, topic: &str) -> Subscription {
        let id = subscriber.into();
        let (tx, rx) = mpsc::unbounded_channel();

        let mut topics = self.topics.write().unwrap_or_else(PoisonError::into_inner);
        let subscribers = topics.entry(topic.to_owned()).or_default();
        subscribers.retain(|s| s.id != id);
        subscribers.push(Subscriber { id, tx });

        rx
    }

    /// Deliver a change to everyone subscribed to `topic`.
    ///
    /// Returns the number of subscribers the event reached. Subscribers whose
    /// queue has been dropped are forgotten here.
    pub fn publish(&self, topic: &str, change: StateChange, snapshot: &CabinState) -> usize {
        let mut topics = self.topics.write().unwrap_or_else(PoisonError::into_inner);
        let Some(subscribers) = topics.get_mut(topic) else {
            return 0;
        };

        subscribers.retain(|s| {
            let notification = Notification {
                topic: topic.to_owned(),
                change,
                snapshot: *snapshot,
            };
            let delivered = s.tx.send(notification).is_ok();
            if !delivered {
                trace!(subscriber = %s.id, topic, "dropping closed subscriber");
            }
            delivered
        });

        subscribers.len()
    }

    pub fn subscriber_count(&self, topic: &str) -> usize {
        self.topics
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(topic)
            .map_or(0, Vec::len)
    }
}
