//! Transient notifications.

use std::collections::VecDeque;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub id: u64,
    pub kind: ToastKind,
    pub message: String,
    remaining: u32,
}

/// Bounded queue of toasts. Each toast lives for a number of ticks; the
/// oldest is dropped when the queue is full.
#[derive(Debug, Clone)]
pub struct Toasts {
    queue: VecDeque<Toast>,
    capacity: usize,
    lifetime: u32,
    next_id: u64,
}

impl Default for Toasts {
    fn default() -> Self {
        Self::new(5, 3)
    }
}

impl Toasts {
    pub fn new(capacity: usize, lifetime: u32) -> Self {
        Self {
            queue: VecDeque::with_capacity(capacity),
            capacity: capacity.max(1),
            lifetime: lifetime.max(1),
            next_id: 0,
        }
    }

    pub fn success(&mut self, message: impl Into<String>) -> u64 {
        self.push(ToastKind::Success, message.into())
    }

    pub fn error(&mut self, message: impl Into<String>) -> u64 {
        self.push(ToastKind::Error, message.into())
    }

    fn push(&mut self, kind: ToastKind, message: String) -> u64 {
        if self.queue.len() == self.capacity {
            self.queue.pop_front();
        }
        let id = self.next_id;
        self.next_id += 1;
        self.queue.push_back(Toast {
            id,
            kind,
            message,
            remaining: self.lifetime,
        });
        id
    }

    pub fn dismiss(&mut self, id: u64) -> bool {
        let before = self.queue.len();
        self.queue.retain(|toast| toast.id != id);
        self.queue.len() != before
    }

    /// Age every toast by one tick and drop the expired ones.
    pub fn tick(&mut self) {
        for toast in &mut self.queue {
            toast.remaining = toast.remaining.saturating_sub(1);
        }
        self.queue.retain(|toast| toast.remaining > 0);
    }

    /// Remove and return everything queued, oldest first.
    pub fn drain(&mut self) -> Vec<Toast> {
        self.queue.drain(..).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Toast> {
        self.queue.iter()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}
