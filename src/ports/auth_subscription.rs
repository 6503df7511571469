//! Auth change subscriptions.
//!
//! Providers keep an [`AuthListeners`] registry and hand out
//! [`AuthSubscription`] handles. Each subscriber gets its own unbounded
//! channel, so events arrive in emission order and none are coalesced.
//! Dropping the handle unsubscribes.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use tokio::sync::mpsc;

use crate::domain::auth::AuthChangeEvent;

type Senders = HashMap<u64, mpsc::UnboundedSender<AuthChangeEvent>>;

/// Registry of live auth change subscribers.
#[derive(Default)]
pub struct AuthListeners {
    next_id: AtomicU64,
    senders: Mutex<Senders>,
}

impl AuthListeners {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new subscriber.
    pub fn subscribe(self: &Arc<Self>) -> AuthSubscription {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (sender, receiver) = mpsc::unbounded_channel();
        self.senders().insert(id, sender);

        tracing::debug!(subscription_id = id, "Auth change subscriber registered");

        AuthSubscription {
            id,
            receiver,
            listeners: Arc::downgrade(self),
        }
    }

    /// Delivers `event` to every live subscriber, pruning closed ones.
    pub fn emit(&self, event: AuthChangeEvent) {
        let mut senders = self.senders();
        senders.retain(|_, sender| sender.send(event.clone()).is_ok());
        tracing::debug!(kind = ?event.kind, subscribers = senders.len(), "Auth change emitted");
    }

    /// Number of registered subscribers.
    pub fn len(&self) -> usize {
        self.senders().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn remove(&self, id: u64) {
        if self.senders().remove(&id).is_some() {
            tracing::debug!(subscription_id = id, "Auth change subscriber released");
        }
    }

    fn senders(&self) -> MutexGuard<'_, Senders> {
        self.senders.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for AuthListeners {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthListeners")
            .field("subscribers", &self.len())
            .finish()
    }
}

/// Handle to an auth change subscription.
///
/// Released by [`AuthSubscription::unsubscribe`] or on drop, whichever comes
/// first.
pub struct AuthSubscription {
    id: u64,
    receiver: mpsc::UnboundedReceiver<AuthChangeEvent>,
    listeners: Weak<AuthListeners>,
}

impl AuthSubscription {
    /// Waits for the next event. Returns `None` once the subscription is
    /// released or the provider is gone and all queued events are drained.
    pub async fn recv(&mut self) -> Option<AuthChangeEvent> {
        self.receiver.recv().await
    }

    /// Returns the next queued event without waiting.
    pub fn try_recv(&mut self) -> Option<AuthChangeEvent> {
        self.receiver.try_recv().ok()
    }

    /// Releases the subscription. Safe to call more than once.
    pub fn unsubscribe(&mut self) {
        if let Some(listeners) = self.listeners.upgrade() {
            listeners.remove(self.id);
        }
        self.listeners = Weak::new();
    }

    pub fn is_active(&self) -> bool {
        self.listeners.strong_count() > 0
    }
}

impl Drop for AuthSubscription {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}

impl fmt::Debug for AuthSubscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthSubscription")
            .field("id", &self.id)
            .field("active", &self.is_active())
            .finish()
    }
}
