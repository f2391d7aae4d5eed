//! The B-tree index: lifecycle, lookup, update and insert.

use tracing::{debug, trace, warn};

use crate::common::config::{IndexOptions, SUPERBLOCK_INDEX};
use crate::common::{BlockId, Error, Result};
use crate::index::btree::node::{Geometry, InteriorNode, LeafNode, Node, Superblock};
use crate::storage::BlockStore;

/// An ordered index of fixed-width byte keys to fixed-width byte values,
/// stored as a B-tree in the blocks of a [`BlockStore`].
///
/// # Layout
/// ```text
/// Block 0        superblock (root id, free-list head, widths)
/// Block 1        initial root
/// Blocks 2..N    free list at format time, handed out as the tree grows
/// ```
///
/// The in-memory [`Superblock`] is the authoritative copy between attach and
/// detach. Every change to the root or free-list head is written through
/// before the call that made it returns.
///
/// # Usage
/// ```
/// use blocktree::{BTreeIndex, IndexOptions};
/// use blocktree::storage::MemoryBlockStore;
///
/// let store = MemoryBlockStore::new(512, 64);
/// let mut tree = BTreeIndex::create(store, IndexOptions::new(4, 4)).unwrap();
///
/// tree.insert(b"key1", b"val1").unwrap();
/// assert_eq!(tree.lookup(b"key1").unwrap(), b"val1");
///
/// let store = tree.detach().unwrap();
/// let tree = BTreeIndex::open(store, IndexOptions::new(4, 4)).unwrap();
/// assert_eq!(tree.lookup(b"key1").unwrap(), b"val1");
/// ```
pub struct BTreeIndex<S: BlockStore> {
    pub(crate) store: S,
    pub(crate) superblock: Superblock,
    pub(crate) superblock_index: BlockId,
    pub(crate) geometry: Geometry,
    options: IndexOptions,
}

/// Result of inserting below a node.
enum InsertOutcome {
    /// The entry was placed without changing this node's parent.
    Done,
    /// The child split; the parent must add `separator` with `sibling` to
    /// its right.
    Split { separator: Vec<u8>, sibling: BlockId },
}

#[derive(Clone, Copy)]
enum ResolveOp<'a> {
    Lookup,
    Update(&'a [u8]),
}

impl<S: BlockStore> BTreeIndex<S> {
    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Format a new tree in `store` (shorthand for `attach(store, 0, true, ..)`).
    pub fn create(store: S, options: IndexOptions) -> Result<Self> {
        Self::attach(store, BlockId(SUPERBLOCK_INDEX), true, options)
    }

    /// Mount an existing tree (shorthand for `attach(store, 0, false, ..)`).
    pub fn open(store: S, options: IndexOptions) -> Result<Self> {
        Self::attach(store, BlockId(SUPERBLOCK_INDEX), false, options)
    }

    /// Attach to the tree whose superblock lives at `superblock_index`.
    ///
    /// With `create`, the store is formatted first: superblock at block 0, an
    /// empty root at block 1, and every other block chained into the free
    /// list. Any failed write is returned immediately and leaves the store
    /// partially formatted.
    ///
    /// Without `create`, only the superblock is read.
    ///
    /// # Errors
    /// - `Error::InvalidConfig` if `superblock_index` is not 0, the options
    ///   don't fit the store's blocks, the store has fewer than two blocks,
    ///   or a mounted tree was built with different widths
    /// - `Error::Insane` / `Error::ChecksumMismatch` if block 0 is not a
    ///   valid superblock
    pub fn attach(
        store: S,
        superblock_index: BlockId,
        create: bool,
        options: IndexOptions,
    ) -> Result<Self> {
        if superblock_index != BlockId(SUPERBLOCK_INDEX) {
            return Err(Error::InvalidConfig(format!(
                "superblock must live at block {}, got {}",
                SUPERBLOCK_INDEX, superblock_index.0
            )));
        }

        let geometry = Geometry::new(store.block_size(), &options)?;
        if !options.unique {
            warn!("non-unique indexes are not supported; keys stay unique");
        }

        if create {
            format_store(&store, &geometry, superblock_index)?;
        }

        let superblock = Superblock::from_block(superblock_index, &store.read_block(superblock_index)?)?;
        if superblock.keysize != options.keysize || superblock.valuesize != options.valuesize {
            return Err(Error::InvalidConfig(format!(
                "tree was built with keysize {} valuesize {}, options ask for {} and {}",
                superblock.keysize, superblock.valuesize, options.keysize, options.valuesize
            )));
        }

        let num_blocks = store.num_blocks();
        if superblock.rootnode.is_nil()
            || superblock.rootnode.0 >= num_blocks
            || superblock.freelist.0 >= num_blocks
        {
            return Err(Error::insane(format!(
                "superblock points outside the store (root {}, free list {}, {} blocks)",
                superblock.rootnode, superblock.freelist, num_blocks
            )));
        }

        debug!(
            root = superblock.rootnode.0,
            freelist = superblock.freelist.0,
            keysize = options.keysize,
            valuesize = options.valuesize,
            "mounted b-tree"
        );

        Ok(Self {
            store,
            superblock,
            superblock_index,
            geometry,
            options,
        })
    }

    /// Persist the superblock and hand the store back.
    ///
    /// Other blocks are already written; flushing them to stable storage is
    /// the store's job.
    pub fn detach(self) -> Result<S> {
        self.persist_superblock()?;
        debug!(root = self.superblock.rootnode.0, "detached b-tree");
        Ok(self.store)
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// The in-memory superblock.
    pub fn superblock(&self) -> &Superblock {
        &self.superblock
    }

    /// The underlying block store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Block geometry and node capacities.
    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    /// Options the tree was attached with.
    pub fn options(&self) -> &IndexOptions {
        &self.options
    }

    // ========================================================================
    // Lookup / Update / Delete
    // ========================================================================

    /// Find the value stored under `key`.
    ///
    /// # Errors
    /// - `Error::NotFound` if the key is absent
    /// - `Error::KeySizeMismatch` if `key` has the wrong width
    pub fn lookup(&self, key: &[u8]) -> Result<Vec<u8>> {
        self.check_key(key)?;
        self.resolve(self.superblock.rootnode, ResolveOp::Lookup, key)
    }

    /// Overwrite the value of an existing key in place.
    ///
    /// # Errors
    /// - `Error::NotFound` if the key is absent (nothing is written)
    /// - `Error::KeySizeMismatch` / `Error::ValueSizeMismatch`
    pub fn update(&mut self, key: &[u8], value: &[u8]) -> Result<()> {
        self.check_key(key)?;
        self.check_value(value)?;
        self.resolve(self.superblock.rootnode, ResolveOp::Update(value), key)
            .map(|_| ())
    }

    /// Remove a key. Not supported: always fails without touching the store.
    pub fn delete(&mut self, _key: &[u8]) -> Result<()> {
        Err(Error::Unimplemented("delete"))
    }

    /// Shared descent for lookup and update. Returns the value found (the
    /// previous value for an update).
    fn resolve(&self, id: BlockId, op: ResolveOp<'_>, key: &[u8]) -> Result<Vec<u8>> {
        match self.read_node(id)? {
            Node::Root(interior) => match route(&interior, key, true) {
                Some(child) => self.resolve(child, op, key),
                None => Err(Error::NotFound),
            },
            Node::Interior(interior) => match route(&interior, key, false) {
                Some(child) => self.resolve(child, op, key),
                None => Err(Error::NotFound),
            },
            Node::Leaf(mut leaf) => {
                let slot = leaf.find(key).map_err(|_| Error::NotFound)?;
                match op {
                    ResolveOp::Lookup => Ok(leaf.values.swap_remove(slot)),
                    ResolveOp::Update(value) => {
                        let old = std::mem::replace(&mut leaf.values[slot], value.to_vec());
                        self.write_node(id, &Node::Leaf(leaf))?;
                        Ok(old)
                    }
                }
            }
            other => Err(Error::insane(format!(
                "descent reached {} of type {}",
                id,
                other.node_type().name()
            ))),
        }
    }

    // ========================================================================
    // Insert
    // ========================================================================

    /// Insert `key` with `value`, or overwrite the value if the key exists.
    ///
    /// A full leaf splits, and the split may cascade up to the root, which
    /// then gains a new parent. Every block the cascade will take is counted
    /// up front, so running out of space fails before anything is written.
    /// Each level is written before its parent is touched; an I/O failure
    /// part-way leaves the levels below committed.
    ///
    /// # Errors
    /// - `Error::NoSpace` if the free list cannot cover every split
    /// - `Error::KeySizeMismatch` / `Error::ValueSizeMismatch`
    pub fn insert(&mut self, key: &[u8], value: &[u8]) -> Result<()> {
        self.check_key(key)?;
        self.check_value(value)?;

        let needed = self.blocks_needed(key)?;
        if needed > 0 && !self.has_free_blocks(needed)? {
            return Err(Error::NoSpace);
        }

        match self.insert_below(self.superblock.rootnode, key, value)? {
            InsertOutcome::Done => Ok(()),
            // The root absorbs its own splits in `split_root`
            InsertOutcome::Split { .. } => Err(Error::insane("root node returned a promotion")),
        }
    }

    /// Blocks an insert of `key` will allocate: one per node that splits on
    /// the way up, plus the new root if the root splits too.
    fn blocks_needed(&self, key: &[u8]) -> Result<usize> {
        // Interior fill along the path, root first
        let mut path = Vec::new();
        let mut id = self.superblock.rootnode;

        let leaf = loop {
            match self.read_node(id)? {
                Node::Root(interior) | Node::Interior(interior) => {
                    if interior.keys.is_empty() && interior.children[0].is_nil() {
                        // First entry: one block for the first leaf
                        return Ok(1);
                    }
                    path.push(interior.numkeys());
                    id = match route(&interior, key, path.len() == 1) {
                        Some(child) => child,
                        None => return Err(Error::insane(format!("interior {} has no keys", id))),
                    };
                }
                Node::Leaf(leaf) => break leaf,
                other => {
                    return Err(Error::insane(format!(
                        "insert reached {} of type {}",
                        id,
                        other.node_type().name()
                    )))
                }
            }
        };

        if leaf.find(key).is_ok() || leaf.numkeys() < self.geometry.leaf_capacity() {
            return Ok(0);
        }

        let mut needed = 1;
        for (depth, &numkeys) in path.iter().enumerate().rev() {
            if numkeys < self.geometry.interior_capacity() {
                break;
            }
            // A splitting root also needs its new parent
            needed += if depth == 0 { 2 } else { 1 };
        }
        Ok(needed)
    }

    fn insert_below(&mut self, id: BlockId, key: &[u8], value: &[u8]) -> Result<InsertOutcome> {
        match self.read_node(id)? {
            Node::Root(interior) => self.insert_into_interior(id, interior, true, key, value),
            Node::Interior(interior) => self.insert_into_interior(id, interior, false, key, value),
            Node::Leaf(leaf) => self.insert_into_leaf(id, leaf, key, value),
            other => Err(Error::insane(format!(
                "insert reached {} of type {}",
                id,
                other.node_type().name()
            ))),
        }
    }

    fn insert_into_leaf(
        &mut self,
        id: BlockId,
        mut leaf: LeafNode,
        key: &[u8],
        value: &[u8],
    ) -> Result<InsertOutcome> {
        let slot = match leaf.find(key) {
            Ok(slot) => {
                // Existing key: update in place, never a duplicate
                leaf.values[slot] = value.to_vec();
                self.write_node(id, &Node::Leaf(leaf))?;
                return Ok(InsertOutcome::Done);
            }
            Err(slot) => slot,
        };

        leaf.insert_at(slot, key, value);
        if leaf.numkeys() <= self.geometry.leaf_capacity() {
            self.write_node(id, &Node::Leaf(leaf))?;
            return Ok(InsertOutcome::Done);
        }

        let sibling = self.allocate_node()?;
        let right = leaf.split();
        let separator = right.keys[0].clone();

        debug!(
            leaf = id.0,
            sibling = sibling.0,
            left = leaf.numkeys(),
            right = right.numkeys(),
            "split leaf"
        );

        self.write_node(sibling, &Node::Leaf(right))?;
        self.write_node(id, &Node::Leaf(leaf))?;

        Ok(InsertOutcome::Split { separator, sibling })
    }

    fn insert_into_interior(
        &mut self,
        id: BlockId,
        mut interior: InteriorNode,
        is_root: bool,
        key: &[u8],
        value: &[u8],
    ) -> Result<InsertOutcome> {
        if interior.keys.is_empty() {
            if !is_root {
                return Err(Error::insane(format!("interior {} has no keys", id)));
            }
            if interior.children[0].is_nil() {
                // First entry in an empty tree: give the root its only leaf
                let leaf = self.allocate_node()?;
                self.write_node(leaf, &Node::Leaf(LeafNode::with_entry(key, value)))?;
                interior.children[0] = leaf;
                self.write_node(id, &Node::Root(interior))?;
                debug!(root = id.0, leaf = leaf.0, "allocated first leaf");
                return Ok(InsertOutcome::Done);
            }
        }

        let slot = interior.child_slot(key);
        let child = interior.children[slot];

        // Nothing below writes this block, so the copy in hand stays current
        let (separator, sibling) = match self.insert_below(child, key, value)? {
            InsertOutcome::Done => return Ok(InsertOutcome::Done),
            InsertOutcome::Split { separator, sibling } => (separator, sibling),
        };

        interior.insert_separator(slot, separator, sibling);
        if interior.numkeys() <= self.geometry.interior_capacity() {
            let node = if is_root {
                Node::Root(interior)
            } else {
                Node::Interior(interior)
            };
            self.write_node(id, &node)?;
            return Ok(InsertOutcome::Done);
        }

        if is_root {
            self.split_root(id, interior)?;
            return Ok(InsertOutcome::Done);
        }

        let sibling = self.allocate_node()?;
        let (promoted, right) = interior.split();

        debug!(
            node = id.0,
            sibling = sibling.0,
            left = interior.numkeys(),
            right = right.numkeys(),
            "split interior node"
        );

        self.write_node(sibling, &Node::Interior(right))?;
        self.write_node(id, &Node::Interior(interior))?;

        Ok(InsertOutcome::Split {
            separator: promoted,
            sibling,
        })
    }

    /// Split an overfull root and grow the tree by one level.
    ///
    /// The old root block becomes the left interior child of a newly
    /// allocated root. `insert` has already checked both blocks are free.
    fn split_root(&mut self, id: BlockId, mut interior: InteriorNode) -> Result<()> {
        let sibling = self.allocate_node()?;
        let new_root = self.allocate_node()?;

        let (promoted, right) = interior.split();

        self.write_node(sibling, &Node::Interior(right))?;
        self.write_node(id, &Node::Interior(interior))?;
        self.write_node(
            new_root,
            &Node::Root(InteriorNode {
                keys: vec![promoted],
                children: vec![id, sibling],
            }),
        )?;

        self.superblock.rootnode = new_root;
        self.persist_superblock()?;

        debug!(
            old_root = id.0,
            sibling = sibling.0,
            new_root = new_root.0,
            "split root"
        );
        Ok(())
    }

    // ========================================================================
    // Block I/O
    // ========================================================================

    /// Read and decode block `id`.
    pub(crate) fn read_node(&self, id: BlockId) -> Result<Node> {
        let block = self.store.read_block(id)?;
        Node::decode(id, &block, &self.geometry)
    }

    /// Encode `node` and write it to block `id`.
    pub(crate) fn write_node(&self, id: BlockId, node: &Node) -> Result<()> {
        write_node_to(&self.store, &self.geometry, id, node)
    }

    /// Write the in-memory superblock to its block.
    pub(crate) fn persist_superblock(&self) -> Result<()> {
        self.write_node(self.superblock_index, &Node::Superblock(self.superblock))
    }

    fn check_key(&self, key: &[u8]) -> Result<()> {
        if key.len() != self.geometry.keysize() {
            return Err(Error::KeySizeMismatch {
                expected: self.geometry.keysize(),
                actual: key.len(),
            });
        }
        Ok(())
    }

    fn check_value(&self, value: &[u8]) -> Result<()> {
        if value.len() != self.geometry.valuesize() {
            return Err(Error::ValueSizeMismatch {
                expected: self.geometry.valuesize(),
                actual: value.len(),
            });
        }
        Ok(())
    }
}

/// Child of `interior` to descend into for `key`.
///
/// `None` for a keyless node, except a root that already owns its first
/// leaf in `children[0]`.
fn route(interior: &InteriorNode, key: &[u8], is_root: bool) -> Option<BlockId> {
    if interior.keys.is_empty() {
        let only = interior.children[0];
        return (is_root && !only.is_nil()).then_some(only);
    }
    Some(interior.children[interior.child_slot(key)])
}

fn write_node_to<S: BlockStore>(
    store: &S,
    geometry: &Geometry,
    id: BlockId,
    node: &Node,
) -> Result<()> {
    let block = node.encode(geometry)?;
    store.write_block(id, &block)?;
    trace!(block = id.0, node_type = node.node_type().name(), "wrote node");
    Ok(())
}

/// Write a fresh superblock, empty root, and free-list chain.
fn format_store<S: BlockStore>(
    store: &S,
    geometry: &Geometry,
    superblock_index: BlockId,
) -> Result<()> {
    let num_blocks = store.num_blocks();
    if num_blocks < 2 {
        return Err(Error::InvalidConfig(format!(
            "store needs at least 2 blocks, has {}",
            num_blocks
        )));
    }

    let root = BlockId(superblock_index.0 + 1);
    let first_free = if num_blocks > 2 {
        BlockId(superblock_index.0 + 2)
    } else {
        BlockId::NIL
    };

    let superblock = Superblock {
        keysize: geometry.keysize(),
        valuesize: geometry.valuesize(),
        rootnode: root,
        freelist: first_free,
    };

    store.notify_allocate_block(superblock_index);
    write_node_to(store, geometry, superblock_index, &Node::Superblock(superblock))?;

    store.notify_allocate_block(root);
    write_node_to(store, geometry, root, &Node::Root(InteriorNode::empty()))?;

    for i in (superblock_index.0 + 2)..num_blocks {
        let next = if i + 1 == num_blocks {
            BlockId::NIL
        } else {
            BlockId(i + 1)
        };
        write_node_to(store, geometry, BlockId(i), &Node::Unallocated { next })?;
    }

    debug!(
        blocks = num_blocks,
        block_size = geometry.block_size(),
        leaf_capacity = geometry.leaf_capacity(),
        interior_capacity = geometry.interior_capacity(),
        "formatted b-tree"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryBlockStore;

    fn key(n: u32) -> [u8; 4] {
        n.to_be_bytes()
    }

    fn create_test_tree(num_blocks: u32) -> BTreeIndex<MemoryBlockStore> {
        BTreeIndex::create(MemoryBlockStore::new(512, num_blocks), IndexOptions::new(4, 4)).unwrap()
    }

    #[test]
    fn test_format_layout() {
        let tree = create_test_tree(8);

        assert_eq!(tree.superblock().rootnode, BlockId(1));
        assert_eq!(tree.superblock().freelist, BlockId(2));
        assert_eq!(tree.read_node(BlockId(1)).unwrap(), Node::Root(InteriorNode::empty()));
        assert_eq!(
            tree.read_node(BlockId(2)).unwrap(),
            Node::Unallocated { next: BlockId(3) }
        );
        assert_eq!(
            tree.read_node(BlockId(7)).unwrap(),
            Node::Unallocated { next: BlockId::NIL }
        );
    }

    #[test]
    fn test_format_two_block_store_has_empty_free_list() {
        let tree = create_test_tree(2);
        assert!(tree.superblock().freelist.is_nil());
    }

    #[test]
    fn test_format_rejects_single_block_store() {
        let result = BTreeIndex::create(MemoryBlockStore::new(512, 1), IndexOptions::new(4, 4));
        assert!(matches!(result, Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn test_attach_requires_block_zero() {
        let result = BTreeIndex::attach(
            MemoryBlockStore::new(512, 8),
            BlockId(3),
            true,
            IndexOptions::new(4, 4),
        );
        assert!(matches!(result, Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn test_open_unformatted_store_fails() {
        let result = BTreeIndex::open(MemoryBlockStore::new(512, 8), IndexOptions::new(4, 4));
        assert!(matches!(result, Err(Error::ChecksumMismatch(BlockId(0)))));
    }

    #[test]
    fn test_open_with_other_widths_fails() {
        let store = create_test_tree(8).detach().unwrap();
        let result = BTreeIndex::open(store, IndexOptions::new(8, 4));
        assert!(matches!(result, Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn test_lookup_empty_tree() {
        let tree = create_test_tree(8);
        assert!(matches!(tree.lookup(&key(1)), Err(Error::NotFound)));
    }

    #[test]
    fn test_first_insert_allocates_leaf() {
        let mut tree = create_test_tree(8);
        tree.insert(&key(5), &key(50)).unwrap();

        let Node::Root(root) = tree.read_node(BlockId(1)).unwrap() else {
            panic!("block 1 should stay the root");
        };
        assert!(root.keys.is_empty());
        assert_eq!(root.children, vec![BlockId(2)]);
        assert_eq!(tree.superblock().freelist, BlockId(3));
        assert_eq!(tree.lookup(&key(5)).unwrap(), key(50));
    }

    #[test]
    fn test_wrong_widths_rejected() {
        let mut tree = create_test_tree(8);

        assert!(matches!(
            tree.insert(b"abc", b"defg"),
            Err(Error::KeySizeMismatch { expected: 4, actual: 3 })
        ));
        assert!(matches!(
            tree.insert(b"abcd", b"de"),
            Err(Error::ValueSizeMismatch { expected: 4, actual: 2 })
        ));
        assert!(matches!(tree.lookup(b"toolong"), Err(Error::KeySizeMismatch { .. })));
    }

    #[test]
    fn test_update_in_place() {
        let mut tree = create_test_tree(8);
        tree.insert(&key(1), &key(10)).unwrap();

        tree.update(&key(1), &key(11)).unwrap();
        assert_eq!(tree.lookup(&key(1)).unwrap(), key(11));

        assert!(matches!(tree.update(&key(2), &key(20)), Err(Error::NotFound)));
    }

    #[test]
    fn test_leaf_split_promotes_first_right_key() {
        let mut tree = create_test_tree(8);
        for i in 1..=62 {
            tree.insert(&key(i), &key(i * 10)).unwrap();
        }

        let Node::Root(root) = tree.read_node(tree.superblock().rootnode).unwrap() else {
            panic!("expected root");
        };
        assert_eq!(root.keys, vec![key(32).to_vec()]);
        assert_eq!(root.children.len(), 2);

        let Node::Leaf(left) = tree.read_node(root.children[0]).unwrap() else {
            panic!("expected leaf");
        };
        let Node::Leaf(right) = tree.read_node(root.children[1]).unwrap() else {
            panic!("expected leaf");
        };
        assert_eq!(left.numkeys(), 31);
        assert_eq!(right.numkeys(), 31);
        assert_eq!(right.keys[0], key(32).to_vec());
    }

    #[test]
    fn test_root_split_grows_tree() {
        let mut tree = create_test_tree(256);

        // Enough ascending keys to overflow a 60-key root
        let n = 61 * 35;
        for i in 0..n {
            tree.insert(&key(i), &key(i)).unwrap();
        }

        let root_id = tree.superblock().rootnode;
        assert_ne!(root_id, BlockId(1));

        let Node::Root(root) = tree.read_node(root_id).unwrap() else {
            panic!("expected root");
        };
        assert_eq!(root.keys.len(), 1);
        assert_eq!(root.children[0], BlockId(1));
        assert!(matches!(tree.read_node(BlockId(1)).unwrap(), Node::Interior(_)));

        for i in 0..n {
            assert_eq!(tree.lookup(&key(i)).unwrap(), key(i));
        }
    }

    #[test]
    fn test_no_space_on_split() {
        // Superblock, root, and one free block for the first leaf
        let mut tree = create_test_tree(3);

        for i in 0..61 {
            tree.insert(&key(i), &key(i)).unwrap();
        }
        let before = *tree.superblock();

        assert!(matches!(tree.insert(&key(100), &key(1)), Err(Error::NoSpace)));
        assert_eq!(*tree.superblock(), before);

        // Existing keys can still be updated
        tree.insert(&key(3), &key(33)).unwrap();
        assert_eq!(tree.lookup(&key(3)).unwrap(), key(33));
    }

    #[test]
    fn test_delete_unimplemented() {
        let mut tree = create_test_tree(8);
        tree.insert(&key(1), &key(1)).unwrap();

        assert!(matches!(tree.delete(&key(1)), Err(Error::Unimplemented("delete"))));
        assert_eq!(tree.lookup(&key(1)).unwrap(), key(1));
    }
}
