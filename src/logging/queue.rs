// SPDX-License-Identifier: Apache-2.0 OR MIT
// Unbounded FIFO of filtered messages awaiting the writer thread

use crossbeam_queue::SegQueue;

/// Lock-free multiple-producer FIFO of pending log lines
///
/// Any number of threads may enqueue concurrently. Only the writer thread
/// dequeues, so every message comes out in exactly the order it went in.
/// The queue is unbounded: enqueue never blocks and never drops.
#[derive(Default)]
pub struct MessageQueue {
    messages: SegQueue<String>,
}

impl MessageQueue {
    /// Create an empty queue
    pub fn new() -> Self {
        Self {
            messages: SegQueue::new(),
        }
    }

    /// Append a message to the tail
    #[inline]
    pub fn enqueue(&self, message: String) {
        self.messages.push(message);
    }

    /// Remove and return the head, if any
    #[inline]
    pub fn try_dequeue(&self) -> Option<String> {
        self.messages.pop()
    }

    /// Number of messages currently queued
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Check if the queue is empty
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

impl std::fmt::Debug for MessageQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MessageQueue")
            .field("len", &self.len())
            .finish()
    }
}
