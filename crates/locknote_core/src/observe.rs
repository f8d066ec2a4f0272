//! Subscriber registry for the live all-notes collection.
//!
//! # Responsibility
//! - Track explicitly registered snapshot subscribers.
//! - Fan one refreshed snapshot out to every live subscriber.
//!
//! # Invariants
//! - A subscriber receives snapshots in publish order.
//! - Subscribers whose receiving side is gone are pruned on the next publish.
//! - Registration never blocks on subscriber progress (channels are unbounded).

use crate::model::note::NoteSnapshot;
use log::debug;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::mpsc::{self, error::TryRecvError, UnboundedReceiver, UnboundedSender};

/// Handle identifying one registration in a `NotesObserver`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

#[derive(Default)]
struct Registry {
    subscribers: HashMap<SubscriptionId, UnboundedSender<NoteSnapshot>>,
}

/// Publish side of the observable all-notes collection.
///
/// Cloning yields another handle to the same registry.
#[derive(Clone, Default)]
pub struct NotesObserver {
    registry: Arc<Mutex<Registry>>,
    next_id: Arc<AtomicU64>,
}

impl NotesObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a subscriber and hands it `initial` right away.
    pub fn subscribe(&self, initial: NoteSnapshot) -> NotesSubscription {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let (tx, rx) = mpsc::unbounded_channel();
        // The receiver is alive in this scope, send cannot fail.
        let _ = tx.send(initial);
        self.lock().subscribers.insert(id, tx);
        debug!("event=notes_subscribe module=observe status=ok subscription_id={}", id.0);

        NotesSubscription {
            id,
            receiver: rx,
            observer: self.clone(),
        }
    }

    /// Removes a registration. Returns `false` when it was already gone.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let removed = self.lock().subscribers.remove(&id).is_some();
        debug!(
            "event=notes_unsubscribe module=observe status=ok subscription_id={} removed={}",
            id.0, removed
        );
        removed
    }

    /// Sends `snapshot` to every subscriber and returns how many received it.
    pub fn publish(&self, snapshot: &NoteSnapshot) -> usize {
        let mut registry = self.lock();
        registry
            .subscribers
            .retain(|_, sender| sender.send(Arc::clone(snapshot)).is_ok());
        registry.subscribers.len()
    }

    /// Number of currently registered subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.lock().subscribers.len()
    }

    fn lock(&self) -> MutexGuard<'_, Registry> {
        // A panicking subscriber cannot leave the map half-updated.
        self.registry.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Receive side of one registration.
///
/// Not tied to any lifecycle: call `unsubscribe` when done. A dropped
/// subscription is pruned lazily by the next publish.
pub struct NotesSubscription {
    id: SubscriptionId,
    receiver: UnboundedReceiver<NoteSnapshot>,
    observer: NotesObserver,
}

impl NotesSubscription {
    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    /// Waits for the next snapshot. Returns `None` after `unsubscribe`.
    pub async fn recv(&mut self) -> Option<NoteSnapshot> {
        self.receiver.recv().await
    }

    /// Returns a queued snapshot without waiting.
    pub fn try_recv(&mut self) -> Option<NoteSnapshot> {
        match self.receiver.try_recv() {
            Ok(snapshot) => Some(snapshot),
            Err(TryRecvError::Empty | TryRecvError::Disconnected) => None,
        }
    }

    /// Drains everything queued and returns the most recent snapshot.
    pub fn latest(&mut self) -> Option<NoteSnapshot> {
        let mut latest = None;
        while let Some(snapshot) = self.try_recv() {
            latest = Some(snapshot);
        }
        latest
    }

    /// Unregisters from the observer; snapshots already queued stay readable.
    pub fn unsubscribe(&mut self) -> bool {
        self.observer.unsubscribe(self.id)
    }
}
