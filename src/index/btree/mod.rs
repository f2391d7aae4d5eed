//! Disk-backed B-tree over a [`BlockStore`](crate::storage::BlockStore).
//!
//! # Components
//! - [`BTreeIndex`] - Lifecycle, lookup, update, insert
//! - [`node`] - Decoded node model and block encoding
//! - `allocator` - Free-list allocation on the index
//! - [`DisplayMode`] - Debug dumps of the tree
//! - `sanity` - Structural invariant checker

mod allocator;
mod display;
pub mod node;
mod sanity;
mod tree;

pub use display::DisplayMode;
pub use node::{Geometry, Superblock};
pub use tree::BTreeIndex;
