//! Block types and layout.
//!
//! This module contains:
//! - [`Block`] - The raw fixed-size data container
//! - [`BlockHeader`] - Metadata at the start of every block
//! - [`NodeType`] - Discriminator for the node stored in a block

#[allow(clippy::module_inception)]
mod block;
mod block_header;

pub use block::Block;
pub use block_header::{BlockHeader, NodeType};
