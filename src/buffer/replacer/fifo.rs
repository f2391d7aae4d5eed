//! FIFO (First-In-First-Out) replacement policy.

use std::collections::{HashSet, VecDeque};

use crate::common::BlockId;

/// A simple FIFO eviction policy.
///
/// Evicts blocks in the order they were brought into the cache. Re-reading a
/// cached block does not move it.
pub struct FifoReplacer {
    /// Queue of cached block ids in insertion order (front = oldest).
    queue: VecDeque<BlockId>,

    /// Set for O(1) membership check.
    in_queue: HashSet<BlockId>,
}

impl FifoReplacer {
    /// Create a new FIFO replacer.
    pub fn new() -> Self {
        Self {
            queue: VecDeque::new(),
            in_queue: HashSet::new(),
        }
    }

    /// Record that a block entered the cache.
    ///
    /// Only adds to the queue if not already present.
    pub fn record_insert(&mut self, block_id: BlockId) {
        if self.in_queue.insert(block_id) {
            self.queue.push_back(block_id);
        }
    }

    /// Select the oldest block as the eviction victim.
    pub fn evict(&mut self) -> Option<BlockId> {
        let block_id = self.queue.pop_front()?;
        self.in_queue.remove(&block_id);
        Some(block_id)
    }

    /// Forget a block that left the cache some other way.
    pub fn remove(&mut self, block_id: BlockId) {
        if self.in_queue.remove(&block_id) {
            self.queue.retain(|&queued| queued != block_id);
        }
    }

    /// Number of tracked blocks.
    pub fn size(&self) -> usize {
        self.queue.len()
    }
}

impl Default for FifoReplacer {
    fn default() -> Self {
        Self::new()
    }
}
