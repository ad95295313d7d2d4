//! # Event Publisher
//!
//! Fan-out to every live subscriber mailbox, waiting for room.

use crate::subscriber::{EventSubscriber, Subscription};
use crate::DEFAULT_CHANNEL_CAPACITY;
use async_trait::async_trait;
use parking_lot::Mutex;
use shared_types::LedgerEvent;
use tokio::sync::mpsc;
use tracing::debug;

/// Trait for publishing ledger events to the bus.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Deliver `event` to every live subscriber, waiting while any mailbox
    /// is full.
    ///
    /// Returns the number of subscribers that received it.
    async fn publish(&self, event: LedgerEvent) -> usize;
}

/// In-memory event bus: one bounded `mpsc` mailbox per subscriber.
pub struct InMemoryEventBus {
    mailboxes: Mutex<Vec<mpsc::Sender<LedgerEvent>>>,
    capacity: usize,
}

impl InMemoryEventBus {
    /// Create a bus with the default mailbox capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    /// Create a bus whose mailboxes hold `capacity` events (at least one).
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            mailboxes: Mutex::new(Vec::new()),
            capacity: capacity.max(1),
        }
    }

    /// Open a mailbox receiving every event published from now on.
    #[must_use]
    pub fn subscribe(&self) -> Subscription {
        let (sender, receiver) = mpsc::channel(self.capacity);
        self.mailboxes.lock().push(sender);
        debug!(capacity = self.capacity, "New subscription created");
        Subscription::new(receiver)
    }
}

impl Default for InMemoryEventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSubscriber for InMemoryEventBus {
    fn subscribe(&self) -> Subscription {
        InMemoryEventBus::subscribe(self)
    }
}

#[async_trait]
impl EventPublisher for InMemoryEventBus {
    async fn publish(&self, event: LedgerEvent) -> usize {
        // Never hold the lock across a send
        let mailboxes = self.mailboxes.lock().clone();

        let mut delivered = 0;
        for mailbox in &mailboxes {
            if mailbox.send(event.clone()).await.is_ok() {
                delivered += 1;
            }
        }

        if delivered < mailboxes.len() {
            self.mailboxes.lock().retain(|mailbox| !mailbox.is_closed());
            debug!(
                dropped = mailboxes.len() - delivered,
                "Closed subscriptions removed"
            );
        }

        debug!(
            kind = event.kind().as_str(),
            receivers = delivered,
            "Event published"
        );
        delivered
    }
}
