//! Block store contract consumed by the B-tree.

use crate::common::{BlockId, Error, Result};
use crate::storage::block::Block;

/// Durable, fixed-geometry storage addressed by block id.
///
/// The B-tree only ever reads and writes whole blocks by id. Caching,
/// eviction, and durability are the store's business. Methods take `&self`
/// so read-only tree operations can run on a shared reference; stores use
/// interior mutability for their own state.
///
/// The allocation hooks are accounting only and must not change what
/// `read_block` returns.
pub trait BlockStore {
    /// Size of every block in bytes.
    fn block_size(&self) -> usize;

    /// Total addressable blocks (ids `0..num_blocks`).
    fn num_blocks(&self) -> u32;

    /// Read a block.
    ///
    /// # Errors
    /// - `Error::BlockOutOfRange` if `id >= num_blocks()`
    fn read_block(&self, id: BlockId) -> Result<Block>;

    /// Write a block.
    ///
    /// # Errors
    /// - `Error::BlockOutOfRange` if `id >= num_blocks()`
    /// - `Error::BlockSizeMismatch` if `block.len() != block_size()`
    fn write_block(&self, id: BlockId, block: &Block) -> Result<()>;

    /// The tree took `id` off its free list.
    fn notify_allocate_block(&self, _id: BlockId) {}

    /// The tree returned `id` to its free list.
    fn notify_deallocate_block(&self, _id: BlockId) {}
}

impl<S: BlockStore + ?Sized> BlockStore for Box<S> {
    fn block_size(&self) -> usize {
        (**self).block_size()
    }

    fn num_blocks(&self) -> u32 {
        (**self).num_blocks()
    }

    fn read_block(&self, id: BlockId) -> Result<Block> {
        (**self).read_block(id)
    }

    fn write_block(&self, id: BlockId, block: &Block) -> Result<()> {
        (**self).write_block(id, block)
    }

    fn notify_allocate_block(&self, id: BlockId) {
        (**self).notify_allocate_block(id)
    }

    fn notify_deallocate_block(&self, id: BlockId) {
        (**self).notify_deallocate_block(id)
    }
}

/// Bounds check shared by the store implementations.
pub(crate) fn check_range(id: BlockId, num_blocks: u32) -> Result<()> {
    if id.0 >= num_blocks {
        return Err(Error::BlockOutOfRange {
            block: id,
            num_blocks,
        });
    }
    Ok(())
}

/// Size check shared by the store implementations.
pub(crate) fn check_size(block: &Block, block_size: usize) -> Result<()> {
    if block.len() != block_size {
        return Err(Error::BlockSizeMismatch {
            expected: block_size,
            actual: block.len(),
        });
    }
    Ok(())
}
