//! Block Cache - a write-through caching layer over any block store.
//!
//! The [`BlockCache`] provides:
//! - Bounded in-memory caching of recently used blocks
//! - Write-through, so the inner store is always current
//! - Pluggable eviction (FIFO today)
//! - Accounting for the tree's allocate/deallocate notifications

use std::collections::HashMap;
use std::sync::atomic::Ordering;

use parking_lot::Mutex;

use crate::buffer::replacer::FifoReplacer;
use crate::buffer::CacheStats;
use crate::common::{BlockId, Error, Result};
use crate::storage::block::Block;
use crate::storage::{check_range, check_size, BlockStore};

/// Caches up to `capacity` blocks of an inner [`BlockStore`].
///
/// # Architecture
/// ```text
/// ┌──────────────────────────────────────────────┐
/// │                 BlockCache                   │
/// │  ┌────────────────────┐  ┌──────────────┐    │
/// │  │ blocks             │  │  replacer    │    │
/// │  │ BlockId → Block    │  │ FifoReplacer │    │
/// │  └────────────────────┘  └──────────────┘    │
/// │            │ miss / write-through            │
/// │            ▼                                 │
/// │  ┌────────────────────┐  ┌──────────────┐    │
/// │  │ inner: S           │  │ stats        │    │
/// │  └────────────────────┘  └──────────────┘    │
/// └──────────────────────────────────────────────┘
/// ```
///
/// Because every write goes straight to the inner store, a cached block is
/// never dirty and eviction never does I/O.
///
/// # Usage
/// ```
/// use blocktree::buffer::BlockCache;
/// use blocktree::storage::{BlockStore, MemoryBlockStore};
/// use blocktree::BlockId;
///
/// let cache = BlockCache::new(MemoryBlockStore::new(512, 8), 4).unwrap();
/// let _ = cache.read_block(BlockId::new(1)).unwrap(); // miss
/// let _ = cache.read_block(BlockId::new(1)).unwrap(); // hit
/// assert_eq!(cache.stats().snapshot().cache_hits, 1);
/// ```
pub struct BlockCache<S: BlockStore> {
    /// The store being cached.
    inner: S,

    /// Cached blocks plus the eviction order, under one lock.
    state: Mutex<CacheState>,

    /// Performance statistics.
    stats: CacheStats,

    /// Maximum number of cached blocks (immutable after construction).
    capacity: usize,
}

struct CacheState {
    blocks: HashMap<BlockId, Block>,
    replacer: FifoReplacer,
}

impl<S: BlockStore> BlockCache<S> {
    /// Wrap `inner` with a cache of `capacity` blocks.
    ///
    /// # Errors
    /// `Error::InvalidConfig` if `capacity` is 0.
    pub fn new(inner: S, capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(Error::InvalidConfig("cache capacity must be > 0".into()));
        }

        Ok(Self {
            inner,
            state: Mutex::new(CacheState {
                blocks: HashMap::with_capacity(capacity),
                replacer: FifoReplacer::new(),
            }),
            stats: CacheStats::new(),
            capacity,
        })
    }

    /// Get cache statistics.
    pub fn stats(&self) -> &CacheStats {
        &self.stats
    }

    /// Maximum number of cached blocks.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of blocks currently cached.
    pub fn len(&self) -> usize {
        self.state.lock().blocks.len()
    }

    /// True if nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Check whether a block is cached, without touching stats.
    pub fn contains(&self, id: BlockId) -> bool {
        self.state.lock().blocks.contains_key(&id)
    }

    /// Drop a block from the cache. The inner store is unaffected.
    pub fn invalidate(&self, id: BlockId) {
        let mut state = self.state.lock();
        if state.blocks.remove(&id).is_some() {
            state.replacer.remove(id);
        }
    }

    /// Drop every cached block.
    pub fn clear(&self) {
        let mut state = self.state.lock();
        state.blocks.clear();
        state.replacer = FifoReplacer::new();
    }

    /// Borrow the inner store.
    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Unwrap the inner store.
    pub fn into_inner(self) -> S {
        self.inner
    }

    /// Place a copy of `block` in the cache, evicting if full.
    fn cache_insert(&self, state: &mut CacheState, id: BlockId, block: &Block) {
        if !state.blocks.contains_key(&id) && state.blocks.len() >= self.capacity {
            if let Some(victim) = state.replacer.evict() {
                state.blocks.remove(&victim);
                self.stats.evictions.fetch_add(1, Ordering::Relaxed);
            }
        }

        state.blocks.insert(id, block.clone());
        state.replacer.record_insert(id);
    }
}

impl<S: BlockStore> BlockStore for BlockCache<S> {
    fn block_size(&self) -> usize {
        self.inner.block_size()
    }

    fn num_blocks(&self) -> u32 {
        self.inner.num_blocks()
    }

    fn read_block(&self, id: BlockId) -> Result<Block> {
        let mut state = self.state.lock();

        if let Some(block) = state.blocks.get(&id) {
            self.stats.cache_hits.fetch_add(1, Ordering::Relaxed);
            return Ok(block.clone());
        }

        self.stats.cache_misses.fetch_add(1, Ordering::Relaxed);

        let block = self.inner.read_block(id)?;
        self.stats.blocks_read.fetch_add(1, Ordering::Relaxed);

        self.cache_insert(&mut state, id, &block);
        Ok(block)
    }

    fn write_block(&self, id: BlockId, block: &Block) -> Result<()> {
        check_range(id, self.inner.num_blocks())?;
        check_size(block, self.inner.block_size())?;

        let mut state = self.state.lock();

        // Write-through first; a failed write leaves the cache untouched
        self.inner.write_block(id, block)?;
        self.stats.blocks_written.fetch_add(1, Ordering::Relaxed);

        self.cache_insert(&mut state, id, block);
        Ok(())
    }

    fn notify_allocate_block(&self, id: BlockId) {
        self.stats.blocks_allocated.fetch_add(1, Ordering::Relaxed);
        self.inner.notify_allocate_block(id);
    }

    fn notify_deallocate_block(&self, id: BlockId) {
        self.stats.blocks_deallocated.fetch_add(1, Ordering::Relaxed);
        self.inner.notify_deallocate_block(id);
    }
}
