//! In-memory node model and its block encoding.
//!
//! A [`Node`] is the decoded form of one block. The tree reads a node, edits
//! the owned copy, and writes it back; nothing holds on to a node across an
//! allocation or a write of another block.
//!
//! # Body layouts
//! ```text
//! Unallocated   (no body, header.freelist = next free block)
//! Superblock    magic:u32 version:u16
//! Root/Interior child0 key0 child1 key1 ... keyN-1 childN
//! Leaf          key0 value0 key1 value1 ... keyN-1 valueN-1
//! ```
//!
//! Keys compare as unsigned byte strings. Encode fixed-width integers
//! big-endian if numeric order is wanted.

use crate::common::config::{
    IndexOptions, BLOCK_ID_SIZE, FORMAT_VERSION, MIN_NODE_CAPACITY, NODE_HEADER_SIZE,
    SUPERBLOCK_MAGIC,
};
use crate::common::{BlockId, Error, Result};
use crate::storage::block::{Block, BlockHeader, NodeType};

/// Block size and entry widths of one tree, with the derived capacities.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Geometry {
    block_size: usize,
    keysize: usize,
    valuesize: usize,
}

impl Geometry {
    /// Derive the geometry for `options` on blocks of `block_size` bytes.
    ///
    /// # Errors
    /// `Error::InvalidConfig` if either node kind would hold fewer than two
    /// entries.
    pub fn new(block_size: usize, options: &IndexOptions) -> Result<Self> {
        options.validate()?;

        let geometry = Self {
            block_size,
            keysize: options.keysize,
            valuesize: options.valuesize,
        };

        if block_size < NODE_HEADER_SIZE + BLOCK_ID_SIZE
            || geometry.leaf_capacity() < MIN_NODE_CAPACITY
            || geometry.interior_capacity() < MIN_NODE_CAPACITY
        {
            return Err(Error::InvalidConfig(format!(
                "block size {} is too small for keysize {} and valuesize {}",
                block_size, options.keysize, options.valuesize
            )));
        }

        Ok(geometry)
    }

    #[inline]
    pub fn block_size(&self) -> usize {
        self.block_size
    }

    #[inline]
    pub fn keysize(&self) -> usize {
        self.keysize
    }

    #[inline]
    pub fn valuesize(&self) -> usize {
        self.valuesize
    }

    /// Maximum key/value pairs in a leaf.
    pub fn leaf_capacity(&self) -> usize {
        self.block_size.saturating_sub(NODE_HEADER_SIZE) / (self.keysize + self.valuesize)
    }

    /// Maximum separator keys in a root or interior node.
    ///
    /// Accounts for the extra trailing child pointer.
    pub fn interior_capacity(&self) -> usize {
        self.block_size
            .saturating_sub(NODE_HEADER_SIZE + BLOCK_ID_SIZE)
            / (self.keysize + BLOCK_ID_SIZE)
    }

    fn header(&self, node_type: NodeType) -> BlockHeader {
        BlockHeader::new(node_type, self.keysize as u16, self.valuesize as u16)
    }
}

/// Tree-wide metadata kept in the superblock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Superblock {
    pub keysize: usize,
    pub valuesize: usize,
    /// Current root node.
    pub rootnode: BlockId,
    /// Head of the free-block chain, `NIL` when empty.
    pub freelist: BlockId,
}

impl Superblock {
    /// Decode a superblock without knowing the tree geometry.
    ///
    /// Used when mounting, before the widths are known.
    pub fn from_block(id: BlockId, block: &Block) -> Result<Self> {
        let header = checked_header(id, block)?;
        if header.node_type != NodeType::Superblock {
            return Err(Error::insane(format!(
                "{} is a {} block, expected a superblock",
                id,
                header.node_type.name()
            )));
        }

        let body = &block.as_slice()[NODE_HEADER_SIZE..];
        let magic = u32::from_le_bytes([body[0], body[1], body[2], body[3]]);
        let version = u16::from_le_bytes([body[4], body[5]]);
        if magic != SUPERBLOCK_MAGIC || version != FORMAT_VERSION {
            return Err(Error::insane(format!(
                "{} has magic {:#010x} version {}, not a tree superblock",
                id, magic, version
            )));
        }

        Ok(Self {
            keysize: header.keysize as usize,
            valuesize: header.valuesize as usize,
            rootnode: header.rootnode,
            freelist: header.freelist,
        })
    }
}

/// Body shared by `Root` and `Interior` nodes.
///
/// Routing: every key under `children[i]` is `< keys[i]`, and every key under
/// `children[i + 1]` is `>= keys[i]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InteriorNode {
    pub keys: Vec<Vec<u8>>,
    /// Always `keys.len() + 1` entries.
    pub children: Vec<BlockId>,
}

impl InteriorNode {
    /// A keyless node with an empty child slot (fresh root).
    pub fn empty() -> Self {
        Self {
            keys: Vec::new(),
            children: vec![BlockId::NIL],
        }
    }

    #[inline]
    pub fn numkeys(&self) -> usize {
        self.keys.len()
    }

    /// Index of the child whose subtree may hold `key`.
    pub fn child_slot(&self, key: &[u8]) -> usize {
        self.keys.partition_point(|separator| separator.as_slice() <= key)
    }

    /// Place a promoted separator: key at `slot`, new right child at `slot + 1`.
    pub fn insert_separator(&mut self, slot: usize, separator: Vec<u8>, right: BlockId) {
        self.keys.insert(slot, separator);
        self.children.insert(slot + 1, right);
    }

    /// Split an overfull node.
    ///
    /// `self` keeps the lowest `n / 2` keys, the next key is returned for
    /// promotion, and the remaining keys and their children move to the
    /// returned right node.
    pub fn split(&mut self) -> (Vec<u8>, InteriorNode) {
        let mid = self.keys.len() / 2;

        let right_keys = self.keys.split_off(mid + 1);
        let right_children = self.children.split_off(mid + 1);
        let promoted = self.keys.pop().unwrap_or_default();

        (
            promoted,
            InteriorNode {
                keys: right_keys,
                children: right_children,
            },
        )
    }
}

/// Body of a leaf: sorted, unique keys with their values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LeafNode {
    pub keys: Vec<Vec<u8>>,
    pub values: Vec<Vec<u8>>,
}

impl LeafNode {
    /// A leaf holding a single entry.
    pub fn with_entry(key: &[u8], value: &[u8]) -> Self {
        Self {
            keys: vec![key.to_vec()],
            values: vec![value.to_vec()],
        }
    }

    #[inline]
    pub fn numkeys(&self) -> usize {
        self.keys.len()
    }

    /// `Ok(slot)` of an exact match, or `Err(slot)` where `key` belongs.
    pub fn find(&self, key: &[u8]) -> std::result::Result<usize, usize> {
        self.keys.binary_search_by(|probe| probe.as_slice().cmp(key))
    }

    /// Insert at `slot`, shifting greater entries right.
    pub fn insert_at(&mut self, slot: usize, key: &[u8], value: &[u8]) {
        self.keys.insert(slot, key.to_vec());
        self.values.insert(slot, value.to_vec());
    }

    /// Split an overfull leaf.
    ///
    /// `self` keeps the lowest `ceil(n / 2)` entries and the rest move to the
    /// returned right leaf.
    pub fn split(&mut self) -> LeafNode {
        let keep = self.keys.len().div_ceil(2);
        LeafNode {
            keys: self.keys.split_off(keep),
            values: self.values.split_off(keep),
        }
    }

    /// Entries in key order.
    pub fn entries(&self) -> impl Iterator<Item = (&[u8], &[u8])> {
        self.keys
            .iter()
            .map(Vec::as_slice)
            .zip(self.values.iter().map(Vec::as_slice))
    }
}

/// Decoded contents of one block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Unallocated { next: BlockId },
    Superblock(Superblock),
    Root(InteriorNode),
    Interior(InteriorNode),
    Leaf(LeafNode),
}

impl Node {
    /// The tag written to the block header.
    pub fn node_type(&self) -> NodeType {
        match self {
            Node::Unallocated { .. } => NodeType::Unallocated,
            Node::Superblock(_) => NodeType::Superblock,
            Node::Root(_) => NodeType::Root,
            Node::Interior(_) => NodeType::Interior,
            Node::Leaf(_) => NodeType::Leaf,
        }
    }

    /// Serialize into a fresh block with its checksum set.
    ///
    /// # Errors
    /// `Error::Insane` if the node is over capacity or an entry has the
    /// wrong width.
    pub fn encode(&self, geometry: &Geometry) -> Result<Block> {
        let mut block = Block::new(geometry.block_size);
        let mut header = geometry.header(self.node_type());

        match self {
            Node::Unallocated { next } => {
                header.freelist = *next;
            }
            Node::Superblock(superblock) => {
                header.rootnode = superblock.rootnode;
                header.freelist = superblock.freelist;
                let body = &mut block.as_mut_slice()[NODE_HEADER_SIZE..];
                body[0..4].copy_from_slice(&SUPERBLOCK_MAGIC.to_le_bytes());
                body[4..6].copy_from_slice(&FORMAT_VERSION.to_le_bytes());
            }
            Node::Root(interior) | Node::Interior(interior) => {
                let n = interior.numkeys();
                if n > geometry.interior_capacity() || interior.children.len() != n + 1 {
                    return Err(Error::insane(format!(
                        "cannot encode interior node with {} keys and {} children",
                        n,
                        interior.children.len()
                    )));
                }
                header.numkeys = n as u32;

                let stride = BLOCK_ID_SIZE + geometry.keysize;
                let data = block.as_mut_slice();
                for (i, child) in interior.children.iter().enumerate() {
                    let at = NODE_HEADER_SIZE + i * stride;
                    data[at..at + BLOCK_ID_SIZE].copy_from_slice(&child.0.to_le_bytes());
                }
                for (i, key) in interior.keys.iter().enumerate() {
                    check_width("key", key, geometry.keysize)?;
                    let at = NODE_HEADER_SIZE + i * stride + BLOCK_ID_SIZE;
                    data[at..at + geometry.keysize].copy_from_slice(key);
                }
            }
            Node::Leaf(leaf) => {
                let n = leaf.numkeys();
                if n > geometry.leaf_capacity() || leaf.values.len() != n {
                    return Err(Error::insane(format!(
                        "cannot encode leaf with {} keys and {} values",
                        n,
                        leaf.values.len()
                    )));
                }
                header.numkeys = n as u32;

                let stride = geometry.keysize + geometry.valuesize;
                let data = block.as_mut_slice();
                for (i, (key, value)) in leaf.entries().enumerate() {
                    check_width("key", key, geometry.keysize)?;
                    check_width("value", value, geometry.valuesize)?;
                    let at = NODE_HEADER_SIZE + i * stride;
                    data[at..at + geometry.keysize].copy_from_slice(key);
                    data[at + geometry.keysize..at + stride].copy_from_slice(value);
                }
            }
        }

        block.set_header(&header);
        block.update_checksum();
        Ok(block)
    }

    /// Deserialize block `id`.
    ///
    /// # Errors
    /// - `Error::ChecksumMismatch` if the block fails its checksum
    /// - `Error::Insane` for an unknown tag, widths that disagree with the
    ///   tree, or an entry count past capacity
    pub fn decode(id: BlockId, block: &Block, geometry: &Geometry) -> Result<Node> {
        if block.len() != geometry.block_size {
            return Err(Error::BlockSizeMismatch {
                expected: geometry.block_size,
                actual: block.len(),
            });
        }

        let header = checked_header(id, block)?;
        if header.keysize as usize != geometry.keysize
            || header.valuesize as usize != geometry.valuesize
        {
            return Err(Error::insane(format!(
                "{} records keysize {} valuesize {}, tree uses {} and {}",
                id, header.keysize, header.valuesize, geometry.keysize, geometry.valuesize
            )));
        }

        let n = header.numkeys as usize;
        let data = block.as_slice();

        let node = match header.node_type {
            NodeType::Unallocated => Node::Unallocated {
                next: header.freelist,
            },
            NodeType::Superblock => Node::Superblock(Superblock::from_block(id, block)?),
            NodeType::Root | NodeType::Interior => {
                if n > geometry.interior_capacity() {
                    return Err(Error::insane(format!(
                        "{} claims {} keys, interior capacity is {}",
                        id,
                        n,
                        geometry.interior_capacity()
                    )));
                }

                let stride = BLOCK_ID_SIZE + geometry.keysize;
                let children = (0..=n)
                    .map(|i| {
                        let at = NODE_HEADER_SIZE + i * stride;
                        BlockId(u32::from_le_bytes([
                            data[at],
                            data[at + 1],
                            data[at + 2],
                            data[at + 3],
                        ]))
                    })
                    .collect();
                let keys = (0..n)
                    .map(|i| {
                        let at = NODE_HEADER_SIZE + i * stride + BLOCK_ID_SIZE;
                        data[at..at + geometry.keysize].to_vec()
                    })
                    .collect();

                let interior = InteriorNode { keys, children };
                if header.node_type == NodeType::Root {
                    Node::Root(interior)
                } else {
                    Node::Interior(interior)
                }
            }
            NodeType::Leaf => {
                if n > geometry.leaf_capacity() {
                    return Err(Error::insane(format!(
                        "{} claims {} entries, leaf capacity is {}",
                        id,
                        n,
                        geometry.leaf_capacity()
                    )));
                }

                let stride = geometry.keysize + geometry.valuesize;
                let mut leaf = LeafNode {
                    keys: Vec::with_capacity(n),
                    values: Vec::with_capacity(n),
                };
                for i in 0..n {
                    let at = NODE_HEADER_SIZE + i * stride;
                    leaf.keys.push(data[at..at + geometry.keysize].to_vec());
                    leaf.values
                        .push(data[at + geometry.keysize..at + stride].to_vec());
                }
                Node::Leaf(leaf)
            }
            NodeType::Invalid => {
                return Err(Error::insane(format!("{} has no valid node type", id)));
            }
        };

        Ok(node)
    }
}

/// Read the header of block `id`, verifying its checksum first.
fn checked_header(id: BlockId, block: &Block) -> Result<BlockHeader> {
    if block.len() < NODE_HEADER_SIZE + 6 {
        return Err(Error::insane(format!("{} is too small to hold a node", id)));
    }
    if !block.verify_checksum() {
        return Err(Error::ChecksumMismatch(id));
    }
    Ok(block.header())
}

fn check_width(what: &str, bytes: &[u8], expected: usize) -> Result<()> {
    if bytes.len() != expected {
        return Err(Error::insane(format!(
            "{} is {} bytes, expected {}",
            what,
            bytes.len(),
            expected
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn geometry(block_size: usize, keysize: usize, valuesize: usize) -> Geometry {
        Geometry::new(block_size, &IndexOptions::new(keysize, valuesize)).unwrap()
    }

    fn key(n: u32) -> Vec<u8> {
        n.to_be_bytes().to_vec()
    }

    #[test]
    fn test_capacities() {
        let g = geometry(512, 4, 4);
        assert_eq!(g.leaf_capacity(), 61);
        assert_eq!(g.interior_capacity(), 60);

        let g = geometry(4096, 8, 16);
        assert_eq!(g.leaf_capacity(), (4096 - 24) / 24);
        assert_eq!(g.interior_capacity(), (4096 - 24 - 4) / 12);
    }

    #[test]
    fn test_geometry_rejects_tiny_blocks() {
        // Leaf would hold a single entry
        let result = Geometry::new(64, &IndexOptions::new(16, 16));
        assert!(matches!(result, Err(Error::InvalidConfig(_))));
        assert!(Geometry::new(16, &IndexOptions::new(1, 1)).is_err());
    }

    #[test]
    fn test_child_slot_routes_equal_keys_right() {
        let node = InteriorNode {
            keys: vec![key(10), key(20)],
            children: vec![BlockId(1), BlockId(2), BlockId(3)],
        };

        assert_eq!(node.child_slot(&key(5)), 0);
        assert_eq!(node.child_slot(&key(10)), 1);
        assert_eq!(node.child_slot(&key(15)), 1);
        assert_eq!(node.child_slot(&key(20)), 2);
        assert_eq!(node.child_slot(&key(99)), 2);
    }

    #[test]
    fn test_interior_insert_separator() {
        let mut node = InteriorNode {
            keys: vec![key(10)],
            children: vec![BlockId(1), BlockId(2)],
        };

        node.insert_separator(1, key(20), BlockId(3));
        node.insert_separator(0, key(5), BlockId(4));

        assert_eq!(node.keys, vec![key(5), key(10), key(20)]);
        assert_eq!(
            node.children,
            vec![BlockId(1), BlockId(4), BlockId(2), BlockId(3)]
        );
    }

    #[test]
    fn test_interior_split_moves_middle_key_up() {
        let mut node = InteriorNode {
            keys: (1..=5).map(key).collect(),
            children: (10..16).map(BlockId).collect(),
        };

        let (promoted, right) = node.split();

        assert_eq!(promoted, key(3));
        assert_eq!(node.keys, vec![key(1), key(2)]);
        assert_eq!(node.children, vec![BlockId(10), BlockId(11), BlockId(12)]);
        assert_eq!(right.keys, vec![key(4), key(5)]);
        assert_eq!(right.children, vec![BlockId(13), BlockId(14), BlockId(15)]);
    }

    #[test]
    fn test_leaf_split_is_left_biased() {
        let mut leaf = LeafNode::default();
        for i in 0..7 {
            leaf.insert_at(i, &key(i as u32), &key(100 + i as u32));
        }

        let right = leaf.split();

        assert_eq!(leaf.numkeys(), 4);
        assert_eq!(right.numkeys(), 3);
        assert_eq!(right.keys[0], key(4));
        assert_eq!(right.values[0], key(104));
    }

    #[test]
    fn test_leaf_find() {
        let mut leaf = LeafNode::with_entry(&key(10), &key(1));
        leaf.insert_at(1, &key(30), &key(3));

        assert_eq!(leaf.find(&key(10)), Ok(0));
        assert_eq!(leaf.find(&key(30)), Ok(1));
        assert_eq!(leaf.find(&key(20)), Err(1));
        assert_eq!(leaf.find(&key(40)), Err(2));
    }

    #[test]
    fn test_encode_decode_each_variant() {
        let g = geometry(512, 4, 4);
        let id = BlockId(7);

        let nodes = vec![
            Node::Unallocated { next: BlockId(8) },
            Node::Superblock(Superblock {
                keysize: 4,
                valuesize: 4,
                rootnode: BlockId(1),
                freelist: BlockId(2),
            }),
            Node::Root(InteriorNode::empty()),
            Node::Interior(InteriorNode {
                keys: vec![key(10), key(20)],
                children: vec![BlockId(3), BlockId(4), BlockId(5)],
            }),
            Node::Leaf(LeafNode {
                keys: vec![key(1), key(2)],
                values: vec![key(11), key(12)],
            }),
        ];

        for node in nodes {
            let block = node.encode(&g).unwrap();
            assert_eq!(block.header().node_type, node.node_type());
            assert_eq!(Node::decode(id, &block, &g).unwrap(), node);
        }
    }

    #[test]
    fn test_full_nodes_fit_in_block() {
        let g = geometry(512, 4, 4);

        let leaf = Node::Leaf(LeafNode {
            keys: (0..61).map(key).collect(),
            values: (0..61).map(key).collect(),
        });
        let block = leaf.encode(&g).unwrap();
        assert_eq!(Node::decode(BlockId(1), &block, &g).unwrap(), leaf);

        let interior = Node::Interior(InteriorNode {
            keys: (0..60).map(key).collect(),
            children: (1..=61).map(BlockId).collect(),
        });
        let block = interior.encode(&g).unwrap();
        assert_eq!(Node::decode(BlockId(1), &block, &g).unwrap(), interior);
    }

    #[test]
    fn test_encode_rejects_overfull_leaf() {
        let g = geometry(512, 4, 4);
        let leaf = Node::Leaf(LeafNode {
            keys: (0..62).map(key).collect(),
            values: (0..62).map(key).collect(),
        });

        assert!(matches!(leaf.encode(&g), Err(Error::Insane(_))));
    }

    #[test]
    fn test_decode_detects_corruption() {
        let g = geometry(512, 4, 4);
        let mut block = Node::Leaf(LeafNode::with_entry(&key(1), &key(2)))
            .encode(&g)
            .unwrap();

        block.as_mut_slice()[NODE_HEADER_SIZE] ^= 0xFF;

        assert!(matches!(
            Node::decode(BlockId(3), &block, &g),
            Err(Error::ChecksumMismatch(BlockId(3)))
        ));
    }

    #[test]
    fn test_decode_rejects_unformatted_and_mismatched_blocks() {
        let g = geometry(512, 4, 4);

        // A zeroed block fails its checksum
        assert!(Node::decode(BlockId(1), &Block::new(512), &g).is_err());

        // A block written for other widths
        let other = geometry(512, 8, 8);
        let block = Node::Leaf(LeafNode::default()).encode(&other).unwrap();
        assert!(matches!(
            Node::decode(BlockId(1), &block, &g),
            Err(Error::Insane(_))
        ));
    }

    #[test]
    fn test_superblock_from_block_checks_magic() {
        let g = geometry(512, 4, 4);
        let mut block = Node::Superblock(Superblock {
            keysize: 4,
            valuesize: 4,
            rootnode: BlockId(1),
            freelist: BlockId::NIL,
        })
        .encode(&g)
        .unwrap();

        let superblock = Superblock::from_block(BlockId(0), &block).unwrap();
        assert_eq!(superblock.rootnode, BlockId(1));
        assert!(superblock.freelist.is_nil());

        block.as_mut_slice()[NODE_HEADER_SIZE] = 0;
        block.update_checksum();
        assert!(matches!(
            Superblock::from_block(BlockId(0), &block),
            Err(Error::Insane(_))
        ));
    }
}
