//! Blocktree - A disk-backed B-tree index over fixed-size blocks.
//!
//! # Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                           Blocktree                             │
//! ├─────────────────────────────────────────────────────────────────┤
//! │  ┌─────────────────────────────────────────────────────────┐   │
//! │  │              Index Layer (index/btree/)                  │   │
//! │  │   BTreeIndex: lookup / insert / update + splits          │   │
//! │  │   Free-list allocator, display, sanity check             │   │
//! │  └─────────────────────────────────────────────────────────┘   │
//! │                              ↓                                  │
//! │  ┌─────────────────────────────────────────────────────────┐   │
//! │  │          Block Cache (buffer/)  [Optional]               │   │
//! │  │      BlockCache + FifoReplacer + CacheStats              │   │
//! │  └─────────────────────────────────────────────────────────┘   │
//! │                              ↓                                  │
//! │  ┌─────────────────────────────────────────────────────────┐   │
//! │  │           Storage Layer (storage/)                       │   │
//! │  │   BlockStore trait: MemoryBlockStore | DiskBlockStore    │   │
//! │  │   Block + BlockHeader (CRC32 checksummed)                │   │
//! │  └─────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//! - [`common`] - Shared primitives (BlockId, Error, config)
//! - [`storage`] - Block formats and block stores
//! - [`buffer`] - Write-through block cache
//! - [`index`] - The B-tree index
//!
//! # Quick Start
//! ```no_run
//! use blocktree::{BTreeIndex, DiskBlockStore, IndexOptions};
//!
//! // A 1 MiB file of 4 KiB blocks
//! let store = DiskBlockStore::create("my_index.db", 4096, 256).unwrap();
//! let mut tree = BTreeIndex::create(store, IndexOptions::new(8, 8)).unwrap();
//!
//! tree.insert(&1u64.to_be_bytes(), &42u64.to_be_bytes()).unwrap();
//! let value = tree.lookup(&1u64.to_be_bytes()).unwrap();
//!
//! let store = tree.detach().unwrap();
//! store.sync().unwrap();
//! ```

pub mod buffer;
pub mod common;
pub mod index;
pub mod storage;

// Re-export commonly used items at crate root for convenience
pub use common::config::{IndexOptions, DEFAULT_BLOCK_SIZE};
pub use common::{BlockId, Error, Result};

pub use buffer::{BlockCache, CacheStats, CacheStatsSnapshot};
pub use index::{BTreeIndex, DisplayMode};
pub use storage::block::{Block, BlockHeader, NodeType};
pub use storage::{BlockStore, DiskBlockStore, MemoryBlockStore};
