//! The asynchronous message queue.
//!
//! A single FIFO shared by every window of a runtime. Posting never blocks on
//! the receiver: the entry is appended and delivered by the next
//! [`UiRuntime::flush`](crate::UiRuntime::flush). The queue is bounded; the
//! ring buffer is allocated to capacity up front so entries recycle slots.
//!
//! The queue is the only part of the runtime reachable from other threads,
//! through a [`PostHandle`].

use std::collections::{HashSet, VecDeque};
use std::sync::Arc;

use parking_lot::Mutex;
use static_assertions::assert_impl_all;

use crate::logging::targets;
use crate::message::Message;
use crate::record::WindowId;

/// A message waiting for delivery.
#[derive(Debug)]
pub(crate) struct QueuedMessage {
    pub(crate) target: WindowId,
    pub(crate) message: Message,
}

struct QueueState {
    entries: VecDeque<QueuedMessage>,
    /// Windows that may receive posted messages.
    live: HashSet<WindowId>,
    closed: bool,
}

/// A bounded FIFO of posted messages.
pub struct MessageQueue {
    state: Mutex<QueueState>,
    capacity: usize,
}

impl MessageQueue {
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            state: Mutex::new(QueueState {
                entries: VecDeque::with_capacity(capacity),
                live: HashSet::new(),
                closed: false,
            }),
            capacity,
        }
    }

    /// Maximum number of pending entries.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of pending entries.
    pub fn len(&self) -> usize {
        self.state.lock().entries.len()
    }

    /// Whether no entries are pending.
    pub fn is_empty(&self) -> bool {
        self.state.lock().entries.is_empty()
    }

    /// Append a message for `target`.
    ///
    /// Returns `false` when the queue is full or closed, or when `target` is
    /// not a live window.
    pub fn post(&self, target: WindowId, message: Message) -> bool {
        let mut state = self.state.lock();
        if state.closed || !state.live.contains(&target) {
            tracing::trace!(target: targets::QUEUE, ?target, "post to dead window rejected");
            return false;
        }
        if state.entries.len() >= self.capacity {
            tracing::debug!(
                target: targets::QUEUE,
                ?target,
                capacity = self.capacity,
                "message queue full"
            );
            return false;
        }
        tracing::trace!(target: targets::QUEUE, ?target, message = message.name(), "posted");
        state.entries.push_back(QueuedMessage { target, message });
        true
    }

    pub(crate) fn register(&self, id: WindowId) {
        self.state.lock().live.insert(id);
    }

    pub(crate) fn unregister(&self, id: WindowId) {
        self.state.lock().live.remove(&id);
    }

    pub(crate) fn pop(&self) -> Option<QueuedMessage> {
        self.state.lock().entries.pop_front()
    }

    /// Remove every pending entry for `id`; returns how many were removed.
    pub(crate) fn clear_for(&self, id: WindowId) -> usize {
        let mut state = self.state.lock();
        let before = state.entries.len();
        state.entries.retain(|entry| entry.target != id);
        before - state.entries.len()
    }

    pub(crate) fn clear_all(&self) -> usize {
        let mut state = self.state.lock();
        let removed = state.entries.len();
        state.entries.clear();
        removed
    }

    /// Stop accepting posts and drop pending entries.
    pub(crate) fn close(&self) {
        let mut state = self.state.lock();
        state.closed = true;
        state.entries.clear();
        state.live.clear();
    }
}

/// A thread-safe handle for posting messages to a runtime.
///
/// Obtained from [`UiRuntime::post_handle`](crate::UiRuntime::post_handle).
/// Posts become visible to the UI thread at its next flush.
#[derive(Clone)]
pub struct PostHandle(pub(crate) Arc<MessageQueue>);

impl PostHandle {
    /// Post a message. See [`MessageQueue::post`].
    pub fn post(&self, target: WindowId, message: Message) -> bool {
        self.0.post(target, message)
    }

    /// Number of pending entries.
    pub fn pending(&self) -> usize {
        self.0.len()
    }
}

impl std::fmt::Debug for PostHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PostHandle")
            .field("pending", &self.0.len())
            .field("capacity", &self.0.capacity)
            .finish()
    }
}

assert_impl_all!(MessageQueue: Send, Sync);
assert_impl_all!(PostHandle: Clone, Send, Sync);
