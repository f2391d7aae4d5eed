//! Common types and utilities shared across blocktree.
//!
//! This module contains fundamental primitives used throughout the codebase:
//! - Configuration constants and [`IndexOptions`](config::IndexOptions)
//! - Error types
//! - Identifiers ([`BlockId`])

mod block_id;
pub mod config;
pub mod error;

pub use block_id::BlockId;
pub use error::{Error, Result};
