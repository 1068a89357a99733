//! Fan-out of scanner events to subscribers
//!
//! Each subscriber owns a bounded queue. Publishing never waits: a full
//! queue loses that one event, a closed queue loses its subscriber.

use super::events::ScannerEvent;
use crate::alert::Alert;
use crate::telemetry::{increment_counter, CounterMetric};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::sync::RwLock;
use uuid::Uuid;

/// Identifies one subscriber
pub type SubscriptionId = Uuid;

/// Default per-subscriber queue depth
pub const DEFAULT_SUBSCRIBER_BUFFER: usize = 256;

/// Receiving end handed to a subscriber
pub struct Subscription {
    id: SubscriptionId,
    events: mpsc::Receiver<ScannerEvent>,
}

impl Subscription {
    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    /// Wait for the next event; `None` once unsubscribed
    pub async fn recv(&mut self) -> Option<ScannerEvent> {
        self.events.recv().await
    }

    /// Take an already-queued event without waiting
    pub fn try_recv(&mut self) -> Option<ScannerEvent> {
        self.events.try_recv().ok()
    }
}

/// Publish/subscribe hub for [`ScannerEvent`]s
#[derive(Clone)]
pub struct BroadcastChannel {
    subscribers: Arc<RwLock<HashMap<SubscriptionId, mpsc::Sender<ScannerEvent>>>>,
    buffer: usize,
}

impl BroadcastChannel {
    /// Create a channel whose subscribers each buffer up to `buffer` events
    pub fn new(buffer: usize) -> Self {
        Self {
            subscribers: Arc::new(RwLock::new(HashMap::new())),
            buffer: buffer.max(1),
        }
    }

    /// Register a subscriber, queueing `snapshot` as its first event
    pub async fn subscribe(&self, snapshot: Vec<Alert>) -> Subscription {
        let (tx, rx) = mpsc::channel(self.buffer);
        let alert_count = snapshot.len();

        // A fresh queue always has room for the first event
        let _ = tx.try_send(ScannerEvent::Snapshot(snapshot));

        let id = Uuid::new_v4();
        let mut subscribers = self.subscribers.write().await;
        subscribers.insert(id, tx);

        tracing::info!(
            subscriber = %id,
            alerts = alert_count,
            subscribers = subscribers.len(),
            "Subscriber registered"
        );

        Subscription { id, events: rx }
    }

    /// Remove a subscriber; its queue closes once drained
    pub async fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let removed = self.subscribers.write().await.remove(&id).is_some();
        if removed {
            tracing::info!(subscriber = %id, "Subscriber removed");
        }
        removed
    }

    /// Deliver an event to every subscriber without waiting
    ///
    /// Returns how many subscribers received it.
    pub async fn publish(&self, event: ScannerEvent) -> usize {
        let mut delivered = 0;
        let mut closed = Vec::new();

        {
            let subscribers = self.subscribers.read().await;
            for (id, tx) in subscribers.iter() {
                match tx.try_send(event.clone()) {
                    Ok(()) => delivered += 1,
                    Err(TrySendError::Full(_)) => {
                        tracing::warn!(
                            subscriber = %id,
                            event = event.type_name(),
                            "Subscriber queue full, dropping event"
                        );
                        increment_counter(CounterMetric::BroadcastDropped, 1);
                    }
                    Err(TrySendError::Closed(_)) => closed.push(*id),
                }
            }
        }

        if !closed.is_empty() {
            let mut subscribers = self.subscribers.write().await;
            for id in closed {
                subscribers.remove(&id);
                tracing::debug!(subscriber = %id, "Dropped disconnected subscriber");
            }
        }

        delivered
    }

    pub async fn subscriber_count(&self) -> usize {
        self.subscribers.read().await.len()
    }
}

impl Default for BroadcastChannel {
    fn default() -> Self {
        Self::new(DEFAULT_SUBSCRIBER_BUFFER)
    }
}
