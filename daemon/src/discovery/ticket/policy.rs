//! Wait-time policies: how long a requester must wait before redeeming.

use std::num::NonZeroUsize;

use lru::LruCache;

use disco_common::time::TimestampMillis;

use crate::discovery::topic::Topic;

/// Computes the wait time for a new ticket on a topic.
///
/// Implementations must be monotonic under pressure: a ticket issued while an
/// earlier one for the same topic is still waiting gets a wait time at least
/// as long as the earlier ticket's remaining wait.
pub trait WaitTimePolicy: Send {
    fn next_wait_time(&mut self, topic: &Topic, now: TimestampMillis) -> u64;
}

/// Linear backoff per topic.
///
/// Each topic has a next free slot. A ticket waits until that slot (and at
/// least `base_wait`), then pushes the slot `spacing` past its own redemption
/// time. Topics idle long enough fall back to `base_wait`.
///
/// At most `max_topics` topics are tracked. A topic is only forgotten once its
/// slot has passed, so no ticket for it is still waiting. When every tracked
/// topic is busy, an untracked topic waits as long as the busiest one.
pub struct LinearBackoff {
    base_wait: u64,
    spacing: u64,
    slots: LruCache<Topic, TimestampMillis>,
    // latest redemption time handed to a topic that could not be tracked
    overflow: TimestampMillis,
}

impl LinearBackoff {
    pub fn new(base_wait: u64, spacing: u64, max_topics: NonZeroUsize) -> Self {
        Self {
            base_wait,
            spacing,
            slots: LruCache::new(max_topics),
            overflow: 0,
        }
    }

    /// Number of topics with tracked pressure.
    pub fn tracked_topics(&self) -> usize {
        self.slots.len()
    }

    // Drop the topics whose slot has passed if there is no room for a new one
    fn make_room(&mut self, now: TimestampMillis) -> bool {
        if self.slots.len() < self.slots.cap().get() {
            return true;
        }

        let idle: Vec<Topic> = self
            .slots
            .iter()
            .filter(|(_, slot)| **slot <= now)
            .map(|(topic, _)| topic.clone())
            .collect();
        for topic in &idle {
            self.slots.pop(topic);
        }
        !idle.is_empty()
    }
}

impl WaitTimePolicy for LinearBackoff {
    fn next_wait_time(&mut self, topic: &Topic, now: TimestampMillis) -> u64 {
        let slot = match self.slots.get(topic).copied() {
            Some(slot) => slot,
            // the topic may hold tickets charged while it was untracked
            None if self.make_room(now) => self.overflow.max(now),
            None => {
                let busiest = self.slots.iter().map(|(_, slot)| *slot).fold(self.overflow, u64::max);
                let wait = busiest.saturating_sub(now).max(self.base_wait);
                self.overflow = now.saturating_add(wait);
                return wait;
            }
        };

        let wait = slot.saturating_sub(now).max(self.base_wait);
        let next_slot = now.saturating_add(wait).saturating_add(self.spacing);
        self.slots.put(topic.clone(), next_slot);
        wait
    }
}

/// Always the same wait.
#[derive(Debug, Clone, Copy)]
pub struct FixedWait(pub u64);

impl WaitTimePolicy for FixedWait {
    fn next_wait_time(&mut self, _: &Topic, _: TimestampMillis) -> u64 {
        self.0
    }
}
