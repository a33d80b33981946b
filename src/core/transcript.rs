//! Ordered, append-only message log plus the single in-flight flag.
//!
//! The store is shared behind an `Arc` between the event loop (read-only
//! rendering) and the exchange controller (the only writer).

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use tracing::trace;

use crate::core::message::Message;

#[derive(Debug, Default)]
pub struct TranscriptStore {
    messages: RwLock<Vec<Message>>,
    pending: AtomicBool,
}

impl TranscriptStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    pub fn append(&self, message: Message) {
        let mut messages = self
            .messages
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        trace!(role = message.role.as_str(), index = messages.len(), "Appending message");
        messages.push(message);
    }

    pub fn set_pending(&self, flag: bool) {
        self.pending.store(flag, Ordering::SeqCst);
    }

    pub fn is_pending(&self) -> bool {
        self.pending.load(Ordering::SeqCst)
    }

    /// Snapshot of the transcript in insertion order.
    pub fn get_all(&self) -> Vec<Message> {
        self.with_messages(|messages| messages.to_vec())
    }

    /// Borrowing read used by the renderer to avoid cloning every frame.
    pub fn with_messages<R>(&self, f: impl FnOnce(&[Message]) -> R) -> R {
        let messages = self.messages.read().unwrap_or_else(PoisonError::into_inner);
        f(&messages)
    }

    pub fn len(&self) -> usize {
        self.with_messages(|messages| messages.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Flip pending from false to true in one step.
    ///
    /// Returns `None` if another exchange already holds the flag. The flag is
    /// released when the returned guard is dropped, including during unwinding.
    pub fn try_begin_exchange(self: &Arc<Self>) -> Option<PendingGuard> {
        self.pending
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .ok()
            .map(|_| PendingGuard {
                store: Arc::clone(self),
            })
    }
}

/// Holds the pending flag for the lifetime of one exchange cycle.
#[derive(Debug)]
pub struct PendingGuard {
    store: Arc<TranscriptStore>,
}

impl PendingGuard {
    pub fn store(&self) -> &TranscriptStore {
        &self.store
    }
}

impl Drop for PendingGuard {
    fn drop(&mut self) {
        self.store.set_pending(false);
    }
}
