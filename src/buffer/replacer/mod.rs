//! Eviction policy implementations (replacers).
//!
//! Currently implements:
//! - [`FifoReplacer`] - Evicts the block that entered the cache first

mod fifo;

pub use fifo::FifoReplacer;
