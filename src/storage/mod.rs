//! Storage layer - block I/O and block formats.
//!
//! This module handles persistent storage:
//! - [`BlockStore`] - The read/write-by-id contract the tree is built on
//! - [`MemoryBlockStore`] - In-memory store for tests and scratch indexes
//! - [`DiskBlockStore`] - Low-level file I/O
//! - [`block`] - Block types and layouts

pub mod block;
mod block_store;
mod disk_store;
mod memory;

pub use block_store::BlockStore;
pub(crate) use block_store::{check_range, check_size};
pub use disk_store::DiskBlockStore;
pub use memory::MemoryBlockStore;
