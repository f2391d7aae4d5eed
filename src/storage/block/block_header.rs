//! Block header and node type definitions.
//!
//! Every block starts with a [`BlockHeader`] containing:
//! - [`NodeType`] discriminator
//! - Fixed key/value widths of the owning tree
//! - Entry count, root and free-list links
//! - CRC32 checksum for integrity

use crate::common::config::NODE_HEADER_SIZE;
use crate::common::BlockId;

/// Type of node stored in a block.
///
/// Uses `#[repr(u8)]` to guarantee a 1-byte representation for serialization.
/// Zero is reserved so that a block that was never formatted is recognizable.
#[repr(u8)]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum NodeType {
    /// Never formatted, or an unknown tag.
    #[default]
    Invalid = 0,
    /// Block on the free list.
    Unallocated = 1,
    /// Tree metadata (root and free-list heads).
    Superblock = 2,
    /// Entry point of the tree.
    Root = 3,
    /// Non-root interior node.
    Interior = 4,
    /// Leaf holding key/value pairs.
    Leaf = 5,
}

impl NodeType {
    /// Convert from u8, returning Invalid for unknown values.
    pub fn from_u8(value: u8) -> Self {
        match value {
            1 => NodeType::Unallocated,
            2 => NodeType::Superblock,
            3 => NodeType::Root,
            4 => NodeType::Interior,
            5 => NodeType::Leaf,
            _ => NodeType::Invalid,
        }
    }

    /// Human-readable name used by the diagnostic dump.
    pub fn name(&self) -> &'static str {
        match self {
            NodeType::Invalid => "Invalid",
            NodeType::Unallocated => "Unallocated",
            NodeType::Superblock => "Superblock",
            NodeType::Root => "Root",
            NodeType::Interior => "Interior",
            NodeType::Leaf => "Leaf",
        }
    }
}

/// Metadata stored at the beginning of every block.
///
/// # Layout (24 bytes)
/// ```text
/// Offset  Size  Field
/// ------  ----  -----
/// 0       1     node_type (NodeType as u8)
/// 1       3     reserved (zero)
/// 4       2     keysize (little-endian)
/// 6       2     valuesize (little-endian)
/// 8       4     numkeys (little-endian)
/// 12      4     rootnode (BlockId, little-endian)
/// 16      4     freelist (BlockId, little-endian)
/// 20      4     checksum (CRC32, little-endian)
/// ```
///
/// `rootnode` and `freelist` are meaningful in the superblock. An
/// unallocated block keeps its free-list successor in `freelist`; tree nodes
/// leave both at zero.
///
/// # Checksum
/// The checksum is computed over the entire block with the checksum field
/// itself set to zero. This allows verification without special handling.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BlockHeader {
    pub node_type: NodeType,
    pub keysize: u16,
    pub valuesize: u16,
    pub numkeys: u32,
    pub rootnode: BlockId,
    pub freelist: BlockId,
    pub checksum: u32,
}

impl BlockHeader {
    /// Size of the header in bytes.
    pub const SIZE: usize = NODE_HEADER_SIZE;

    /// Offset of each field within the header.
    pub const OFFSET_NODE_TYPE: usize = 0;
    pub const OFFSET_KEYSIZE: usize = 4;
    pub const OFFSET_VALUESIZE: usize = 6;
    pub const OFFSET_NUMKEYS: usize = 8;
    pub const OFFSET_ROOTNODE: usize = 12;
    pub const OFFSET_FREELIST: usize = 16;
    pub const OFFSET_CHECKSUM: usize = 20;

    /// Create a header of the given type for a tree with these widths.
    ///
    /// Counts, links and checksum start at zero.
    pub fn new(node_type: NodeType, keysize: u16, valuesize: u16) -> Self {
        Self {
            node_type,
            keysize,
            valuesize,
            ..Self::default()
        }
    }

    /// Read a header from the beginning of a byte slice.
    ///
    /// # Panics
    /// Panics if `data.len() < BlockHeader::SIZE`.
    pub fn from_bytes(data: &[u8]) -> Self {
        assert!(data.len() >= Self::SIZE, "buffer too small for BlockHeader");

        Self {
            node_type: NodeType::from_u8(data[Self::OFFSET_NODE_TYPE]),
            keysize: read_u16(data, Self::OFFSET_KEYSIZE),
            valuesize: read_u16(data, Self::OFFSET_VALUESIZE),
            numkeys: read_u32(data, Self::OFFSET_NUMKEYS),
            rootnode: BlockId(read_u32(data, Self::OFFSET_ROOTNODE)),
            freelist: BlockId(read_u32(data, Self::OFFSET_FREELIST)),
            checksum: read_u32(data, Self::OFFSET_CHECKSUM),
        }
    }

    /// Write this header to the beginning of a byte slice.
    ///
    /// # Panics
    /// Panics if `data.len() < BlockHeader::SIZE`.
    pub fn write_to(&self, data: &mut [u8]) {
        assert!(data.len() >= Self::SIZE, "buffer too small for BlockHeader");

        data[Self::OFFSET_NODE_TYPE] = self.node_type as u8;
        data[Self::OFFSET_NODE_TYPE + 1..Self::OFFSET_KEYSIZE].fill(0);
        data[Self::OFFSET_KEYSIZE..Self::OFFSET_KEYSIZE + 2]
            .copy_from_slice(&self.keysize.to_le_bytes());
        data[Self::OFFSET_VALUESIZE..Self::OFFSET_VALUESIZE + 2]
            .copy_from_slice(&self.valuesize.to_le_bytes());
        data[Self::OFFSET_NUMKEYS..Self::OFFSET_NUMKEYS + 4]
            .copy_from_slice(&self.numkeys.to_le_bytes());
        data[Self::OFFSET_ROOTNODE..Self::OFFSET_ROOTNODE + 4]
            .copy_from_slice(&self.rootnode.0.to_le_bytes());
        data[Self::OFFSET_FREELIST..Self::OFFSET_FREELIST + 4]
            .copy_from_slice(&self.freelist.0.to_le_bytes());
        data[Self::OFFSET_CHECKSUM..Self::OFFSET_CHECKSUM + 4]
            .copy_from_slice(&self.checksum.to_le_bytes());
    }

    /// Compute CRC32 checksum of a block.
    ///
    /// The checksum field (bytes 20-23) is fed as zeros, so the checksum
    /// doesn't include itself.
    pub fn compute_checksum(block_data: &[u8]) -> u32 {
        let mut hasher = crc32fast::Hasher::new();

        hasher.update(&block_data[..Self::OFFSET_CHECKSUM]);
        hasher.update(&[0u8; 4]);
        hasher.update(&block_data[Self::OFFSET_CHECKSUM + 4..]);

        hasher.finalize()
    }

    /// Verify that the stored checksum matches the computed checksum.
    pub fn verify_checksum(&self, block_data: &[u8]) -> bool {
        self.checksum == Self::compute_checksum(block_data)
    }
}

#[inline]
fn read_u16(data: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes([data[offset], data[offset + 1]])
}

#[inline]
fn read_u32(data: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        data[offset],
        data[offset + 1],
        data[offset + 2],
        data[offset + 3],
    ])
}

// ============================================================================
// TESTS
// ============================================================================
