//! Block - the fixed-size unit of storage.
//!
//! A [`Block`] is a raw byte buffer that serves as the unit of I/O between a
//! [`BlockStore`](crate::storage::BlockStore) and the B-tree. Its size is
//! fixed per store and queried with `block_size()`.

use super::block_header::BlockHeader;

/// A block of data.
///
/// Unlike a page with a compile-time size, a block's length comes from the
/// store it belongs to, so the bytes live on the heap. Stores check the
/// length on every write.
///
/// # Example
/// ```
/// use blocktree::storage::block::Block;
///
/// let mut block = Block::new(512);
/// block.as_mut_slice()[0] = 0xFF;
/// assert_eq!(block.as_slice()[0], 0xFF);
/// assert_eq!(block.len(), 512);
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct Block {
    data: Box<[u8]>,
}

impl Block {
    /// Create a new zeroed block.
    pub fn new(size: usize) -> Self {
        Self {
            data: vec![0u8; size].into_boxed_slice(),
        }
    }

    /// Wrap existing bytes.
    pub fn from_bytes(data: impl Into<Box<[u8]>>) -> Self {
        Self { data: data.into() }
    }

    /// Get immutable slice of block data.
    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    /// Get mutable slice of block data.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Size of the block in bytes.
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// True for a zero-length block.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Zero out the entire block.
    pub fn reset(&mut self) {
        self.data.fill(0);
    }

    /// Read the block header.
    pub fn header(&self) -> BlockHeader {
        BlockHeader::from_bytes(&self.data)
    }

    /// Write a block header.
    pub fn set_header(&mut self, header: &BlockHeader) {
        header.write_to(&mut self.data);
    }

    /// Compute and store checksum in the header.
    ///
    /// Call this after all modifications to the block are complete.
    pub fn update_checksum(&mut self) {
        let checksum = BlockHeader::compute_checksum(&self.data);
        self.data[BlockHeader::OFFSET_CHECKSUM..BlockHeader::OFFSET_CHECKSUM + 4]
            .copy_from_slice(&checksum.to_le_bytes());
    }

    /// Verify the block checksum is valid.
    pub fn verify_checksum(&self) -> bool {
        self.header().verify_checksum(&self.data)
    }
}

impl std::fmt::Debug for Block {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Block")
            .field("len", &self.data.len())
            .field("header", &self.header())
            .finish()
    }
}

// ============================================================================
// TESTS
// ============================================================================
