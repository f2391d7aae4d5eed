//! Configuration constants and index options.

use crate::common::{Error, Result};

/// Default block size in bytes (4KB).
///
/// Matches the OS page size on most systems. Stores may use any size large
/// enough to hold a header plus two entries of the configured widths.
pub const DEFAULT_BLOCK_SIZE: usize = 4096;

/// Size of the header at the start of every block.
pub const NODE_HEADER_SIZE: usize = 24;

/// Serialized width of a block id (child pointers, free-list links).
pub const BLOCK_ID_SIZE: usize = 4;

/// Block that holds the superblock. Fixed by convention.
pub const SUPERBLOCK_INDEX: u32 = 0;

/// Marker stored in the superblock body ("BTIX").
pub const SUPERBLOCK_MAGIC: u32 = 0x4254_4958;

/// On-disk format version written at format time.
pub const FORMAT_VERSION: u16 = 1;

/// Smallest number of entries a node must be able to hold for splits to
/// leave both halves non-empty.
pub const MIN_NODE_CAPACITY: usize = 2;

/// Per-tree options fixed at creation time.
///
/// # Example
/// ```
/// use blocktree::IndexOptions;
///
/// let options = IndexOptions::new(8, 16);
/// assert!(options.unique);
/// assert!(options.validate().is_ok());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexOptions {
    /// Width of every key in bytes.
    pub keysize: usize,
    /// Width of every value in bytes.
    pub valuesize: usize,
    /// Accepted for compatibility. The tree always keeps one entry per key.
    pub unique: bool,
}

impl IndexOptions {
    /// Unique-key options with the given widths.
    pub fn new(keysize: usize, valuesize: usize) -> Self {
        Self {
            keysize,
            valuesize,
            unique: true,
        }
    }

    /// Set the `unique` flag.
    pub fn with_unique(mut self, unique: bool) -> Self {
        self.unique = unique;
        self
    }

    /// Check the widths are non-zero and fit the header's 16-bit fields.
    pub fn validate(&self) -> Result<()> {
        if self.keysize == 0 || self.keysize > u16::MAX as usize {
            return Err(Error::InvalidConfig(format!(
                "keysize must be in 1..={}, got {}",
                u16::MAX,
                self.keysize
            )));
        }
        if self.valuesize == 0 || self.valuesize > u16::MAX as usize {
            return Err(Error::InvalidConfig(format!(
                "valuesize must be in 1..={}, got {}",
                u16::MAX,
                self.valuesize
            )));
        }
        Ok(())
    }
}
