//! One-shot effects (toasts, navigation) emitted by controllers

use std::collections::VecDeque;

/// A transition-triggered event meant to be consumed exactly once
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Informational toast
    Toast(String),
    /// Error toast
    Error(String),
    /// The list was replaced from page 1; scroll back up
    ScrollToTop,
    /// Login succeeded; leave the login screen
    NavigateHome,
}

impl Effect {
    /// Whether this effect reports a failure
    pub const fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }
}

/// Bounded FIFO of undelivered effects
///
/// When full, the oldest effect is dropped (and logged) to make room, so an
/// unobserved screen cannot grow without bound. `pop`/`drain` hand each
/// effect to exactly one consumer, in order.
#[derive(Debug)]
pub struct EffectQueue {
    queue: VecDeque<Effect>,
    capacity: usize,
    dropped: u64,
}

impl EffectQueue {
    /// Capacity used when none is configured
    pub const DEFAULT_CAPACITY: usize = 32;

    /// Create a queue holding at most `capacity` effects (minimum 1)
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            queue: VecDeque::with_capacity(capacity),
            capacity,
            dropped: 0,
        }
    }

    /// Queue an effect, evicting the oldest when full
    pub fn push(&mut self, effect: Effect) {
        if self.queue.len() == self.capacity
            && let Some(oldest) = self.queue.pop_front()
        {
            self.dropped += 1;
            tracing::warn!(?oldest, "Effect queue full, dropping oldest effect");
        }
        self.queue.push_back(effect);
    }

    /// Take the next effect
    pub fn pop(&mut self) -> Option<Effect> {
        self.queue.pop_front()
    }

    /// Take every queued effect in order
    pub fn drain(&mut self) -> Vec<Effect> {
        self.queue.drain(..).collect()
    }

    /// Look at queued effects without consuming them
    pub fn iter(&self) -> impl Iterator<Item = &Effect> {
        self.queue.iter()
    }

    /// Number of queued effects
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Whether nothing is queued
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// How many effects were evicted since creation
    pub const fn dropped(&self) -> u64 {
        self.dropped
    }
}

impl Default for EffectQueue {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CAPACITY)
    }
}
