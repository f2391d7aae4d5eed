//! Block identifier type.

use std::fmt;

/// Identifies a block in a [`BlockStore`](crate::storage::BlockStore).
///
/// Using `u32` allows for 4 billion blocks, and is also the width a block id
/// takes when it is serialized as a child pointer or free-list link.
///
/// Block 0 always holds the superblock, so it can never be a child or a free
/// block. The tree reuses id 0 as the "no block" marker: it terminates the
/// free list and marks the empty slot of a freshly formatted root.
///
/// # Example
/// ```
/// use blocktree::BlockId;
///
/// let block_id = BlockId::new(42);
/// assert!(!block_id.is_nil());
/// assert!(BlockId::NIL.is_nil());
/// ```
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlockId(pub u32);

impl BlockId {
    /// The "no block" marker (free-list terminator, empty root slot).
    pub const NIL: BlockId = BlockId(0);

    /// Create a new BlockId.
    #[inline]
    pub fn new(id: u32) -> Self {
        BlockId(id)
    }

    /// Check if this id is the nil marker.
    #[inline]
    pub fn is_nil(&self) -> bool {
        *self == Self::NIL
    }

    /// Byte offset of this block in a store with the given block size.
    #[inline]
    pub fn offset(&self, block_size: usize) -> u64 {
        (self.0 as u64) * (block_size as u64)
    }
}

impl From<u32> for BlockId {
    fn from(id: u32) -> Self {
        BlockId(id)
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Block({})", self.0)
    }
}
