//! # Event Subscriber
//!
//! The receiving end of one subscriber's mailbox.

use shared_types::LedgerEvent;
use tokio::sync::mpsc;

/// Anything that hands out subscriptions.
pub trait EventSubscriber: Send + Sync {
    /// Open a mailbox receiving every event published from now on.
    fn subscribe(&self) -> Subscription;
}

/// A subscriber's mailbox.
///
/// Dropping it closes the mailbox; publishers skip it from then on.
pub struct Subscription {
    receiver: mpsc::Receiver<LedgerEvent>,
}

impl Subscription {
    pub(crate) fn new(receiver: mpsc::Receiver<LedgerEvent>) -> Self {
        Self { receiver }
    }

    /// Receive the next event.
    ///
    /// Returns `None` once the bus is dropped and the mailbox is drained.
    pub async fn recv(&mut self) -> Option<LedgerEvent> {
        self.receiver.recv().await
    }
}
