//! Block caching.
//!
//! The cache sits between the B-tree and a block store. It keeps a bounded
//! set of recently used blocks in memory and writes through to the store.
//!
//! # Components
//! - [`BlockCache`] - The caching [`BlockStore`](crate::storage::BlockStore) adapter
//! - [`CacheStats`] - Performance and allocation accounting
//! - [`replacer`] - Eviction policy implementations

mod block_cache;
pub mod replacer;
mod stats;

pub use block_cache::BlockCache;
pub use stats::{CacheStats, CacheStatsSnapshot};
