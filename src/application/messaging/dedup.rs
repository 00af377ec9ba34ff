//! Bounded recent-id set for update deduplication
//!
//! Push delivery may retry on a perceived timeout and pull batches can
//! overlap at the boundary after a restart, so an update id that was
//! already processed must not be dispatched twice.

use std::collections::{HashSet, VecDeque};

/// Ring of the last `capacity` update ids. Membership checks are O(1);
/// the oldest id is evicted once the capacity is reached, so memory
/// stays bounded regardless of uptime.
pub struct RecentIds {
    seen: HashSet<i64>,
    order: VecDeque<i64>,
    capacity: usize,
}

impl RecentIds {
    pub fn new(capacity: usize) -> Self {
        Self {
            seen: HashSet::with_capacity(capacity),
            order: VecDeque::with_capacity(capacity),
            capacity: capacity.max(1),
        }
    }

    /// Record an id. Returns `false` if it was already present, in which
    /// case the caller must drop the update.
    pub fn insert(&mut self, id: i64) -> bool {
        if self.seen.contains(&id) {
            return false;
        }
        if self.order.len() == self.capacity {
            if let Some(oldest) = self.order.pop_front() {
                self.seen.remove(&oldest);
            }
        }
        self.order.push_back(id);
        self.seen.insert(id);
        true
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
