//! Free-list block allocation.
//!
//! Free blocks form a singly linked chain of `Unallocated` nodes. The head
//! lives in the superblock and each link in the node header's free-list
//! field. Allocation pops the head; deallocation pushes onto it.

use std::collections::HashSet;

use tracing::trace;

use crate::common::{BlockId, Error, Result};
use crate::index::btree::node::Node;
use crate::index::btree::BTreeIndex;
use crate::storage::BlockStore;

impl<S: BlockStore> BTreeIndex<S> {
    /// Take the first block off the free list.
    ///
    /// The superblock is persisted with the new head before returning. The
    /// caller owns the block and must write a node into it.
    ///
    /// # Errors
    /// - `Error::NoSpace` if the free list is empty (nothing changes)
    /// - `Error::Insane` if the head is not an `Unallocated` block
    pub fn allocate_node(&mut self) -> Result<BlockId> {
        let id = self.superblock.freelist;
        if id.is_nil() {
            return Err(Error::NoSpace);
        }

        let next = match self.read_node(id)? {
            Node::Unallocated { next } => next,
            other => {
                return Err(Error::insane(format!(
                    "free-list head {} is a {} block",
                    id,
                    other.node_type().name()
                )))
            }
        };

        self.superblock.freelist = next;
        self.persist_superblock()?;
        self.store.notify_allocate_block(id);

        trace!(block = id.0, next_free = next.0, "allocated block");
        Ok(id)
    }

    /// Return a block to the head of the free list.
    ///
    /// The caller must have unlinked the block from the tree already.
    ///
    /// # Errors
    /// - `Error::Insane` for the superblock, the current root, a block that
    ///   is already free, or an id outside the store
    pub fn deallocate_node(&mut self, id: BlockId) -> Result<()> {
        if id == self.superblock_index {
            return Err(Error::insane("cannot deallocate the superblock"));
        }
        if id == self.superblock.rootnode {
            return Err(Error::insane(format!("cannot deallocate the root {}", id)));
        }
        if let Node::Unallocated { .. } = self.read_node(id)? {
            return Err(Error::insane(format!("{} is already free", id)));
        }

        self.write_node(
            id,
            &Node::Unallocated {
                next: self.superblock.freelist,
            },
        )?;
        self.superblock.freelist = id;
        self.persist_superblock()?;
        self.store.notify_deallocate_block(id);

        trace!(block = id.0, "deallocated block");
        Ok(())
    }

    /// Number of blocks on the free list.
    pub fn free_block_count(&self) -> Result<usize> {
        Ok(self.free_list_blocks()?.len())
    }

    /// Walk the free list from the head, in order.
    ///
    /// # Errors
    /// `Error::Insane` if a link leaves the store, loops, or lands on a block
    /// that is not `Unallocated`.
    pub(crate) fn free_list_blocks(&self) -> Result<Vec<BlockId>> {
        let num_blocks = self.store.num_blocks();
        let mut seen = HashSet::new();
        let mut blocks = Vec::new();

        let mut id = self.superblock.freelist;
        while !id.is_nil() {
            if id.0 >= num_blocks {
                return Err(Error::insane(format!(
                    "free list links to {} past the end of the store",
                    id
                )));
            }
            if !seen.insert(id) {
                return Err(Error::insane(format!("free list loops back to {}", id)));
            }

            match self.read_node(id)? {
                Node::Unallocated { next } => {
                    blocks.push(id);
                    id = next;
                }
                other => {
                    return Err(Error::insane(format!(
                        "free list reaches {} block {}",
                        other.node_type().name(),
                        id
                    )))
                }
            }
        }

        Ok(blocks)
    }

    /// True if at least `n` blocks can be allocated. Stops walking after `n`.
    pub(crate) fn has_free_blocks(&self, n: usize) -> Result<bool> {
        let mut id = self.superblock.freelist;
        for _ in 0..n {
            if id.is_nil() {
                return Ok(false);
            }
            id = match self.read_node(id)? {
                Node::Unallocated { next } => next,
                other => {
                    return Err(Error::insane(format!(
                        "free list reaches {} block {}",
                        other.node_type().name(),
                        id
                    )))
                }
            };
        }
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use crate::common::config::IndexOptions;
    use crate::common::{BlockId, Error};
    use crate::index::btree::node::{LeafNode, Node};
    use crate::index::btree::BTreeIndex;
    use crate::storage::{BlockStore, MemoryBlockStore};

    fn create_test_tree(num_blocks: u32) -> BTreeIndex<MemoryBlockStore> {
        BTreeIndex::create(MemoryBlockStore::new(256, num_blocks), IndexOptions::new(4, 4)).unwrap()
    }

    #[test]
    fn test_allocate_pops_in_order() {
        let mut tree = create_test_tree(5);
        assert_eq!(tree.free_block_count().unwrap(), 3);

        assert_eq!(tree.allocate_node().unwrap(), BlockId(2));
        assert_eq!(tree.allocate_node().unwrap(), BlockId(3));
        assert_eq!(tree.allocate_node().unwrap(), BlockId(4));
        assert_eq!(tree.free_block_count().unwrap(), 0);
    }

    #[test]
    fn test_allocate_persists_head() {
        let mut tree = create_test_tree(5);
        tree.allocate_node().unwrap();

        let on_disk = tree.read_node(BlockId(0)).unwrap();
        assert_eq!(on_disk, Node::Superblock(*tree.superblock()));
        assert_eq!(tree.superblock().freelist, BlockId(3));
    }

    #[test]
    fn test_allocate_empty_free_list() {
        let mut tree = create_test_tree(3);
        tree.allocate_node().unwrap();

        let snapshot = tree.store().snapshot();
        assert!(matches!(tree.allocate_node(), Err(Error::NoSpace)));
        assert_eq!(tree.store().snapshot(), snapshot);
    }

    #[test]
    fn test_deallocate_pushes_head() {
        let mut tree = create_test_tree(5);
        let a = tree.allocate_node().unwrap();
        let b = tree.allocate_node().unwrap();
        tree.write_node(a, &Node::Leaf(LeafNode::default())).unwrap();
        tree.write_node(b, &Node::Leaf(LeafNode::default())).unwrap();

        tree.deallocate_node(a).unwrap();
        assert_eq!(tree.superblock().freelist, a);
        assert_eq!(tree.free_list_blocks().unwrap(), vec![a, BlockId(4)]);

        // LIFO reuse
        assert_eq!(tree.allocate_node().unwrap(), a);
    }

    #[test]
    fn test_deallocate_rejects_protected_blocks() {
        let mut tree = create_test_tree(5);

        assert!(matches!(tree.deallocate_node(BlockId(0)), Err(Error::Insane(_))));
        assert!(matches!(tree.deallocate_node(BlockId(1)), Err(Error::Insane(_))));
        // Still on the free list
        assert!(matches!(tree.deallocate_node(BlockId(2)), Err(Error::Insane(_))));
        assert_eq!(tree.free_block_count().unwrap(), 3);
    }

    #[test]
    fn test_allocate_rejects_corrupt_head() {
        let mut tree = create_test_tree(5);
        tree.write_node(BlockId(2), &Node::Leaf(LeafNode::default())).unwrap();

        assert!(matches!(tree.allocate_node(), Err(Error::Insane(_))));
        assert_eq!(tree.superblock().freelist, BlockId(2));
    }

    #[test]
    fn test_free_list_cycle_detected() {
        let tree = create_test_tree(5);
        tree.write_node(BlockId(4), &Node::Unallocated { next: BlockId(2) }).unwrap();

        assert!(matches!(tree.free_list_blocks(), Err(Error::Insane(_))));
    }

    #[test]
    fn test_has_free_blocks() {
        let mut tree = create_test_tree(4);
        assert!(tree.has_free_blocks(2).unwrap());
        assert!(!tree.has_free_blocks(3).unwrap());

        tree.allocate_node().unwrap();
        assert!(tree.has_free_blocks(1).unwrap());
        assert!(!tree.has_free_blocks(2).unwrap());
    }

    #[test]
    fn test_allocation_notifies_store() {
        use crate::buffer::BlockCache;

        let cache = BlockCache::new(MemoryBlockStore::new(256, 6), 4).unwrap();
        let mut tree = BTreeIndex::create(cache, IndexOptions::new(4, 4)).unwrap();

        // Format announces the superblock and root
        assert_eq!(tree.store().stats().snapshot().blocks_allocated, 2);

        let id = tree.allocate_node().unwrap();
        tree.write_node(id, &Node::Leaf(LeafNode::default())).unwrap();
        tree.deallocate_node(id).unwrap();

        let snapshot = tree.store().stats().snapshot();
        assert_eq!(snapshot.blocks_allocated, 3);
        assert_eq!(snapshot.blocks_deallocated, 1);
        assert_eq!(tree.store().num_blocks(), 6);
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(64))]

            /// `true` allocates, `false` frees the most recently allocated block.
            #[test]
            fn test_free_list_conservation(ops in prop::collection::vec(any::<bool>(), 0..64)) {
                let mut tree = create_test_tree(16);
                let total = tree.free_block_count().unwrap();
                let mut held = Vec::new();

                for allocate in ops {
                    if allocate {
                        match tree.allocate_node() {
                            Ok(id) => {
                                tree.write_node(id, &Node::Leaf(LeafNode::default())).unwrap();
                                held.push(id);
                            }
                            Err(Error::NoSpace) => prop_assert_eq!(held.len(), total),
                            Err(other) => return Err(TestCaseError::fail(other.to_string())),
                        }
                    } else if let Some(id) = held.pop() {
                        tree.deallocate_node(id).unwrap();
                    }

                    prop_assert_eq!(tree.free_block_count().unwrap() + held.len(), total);
                }

                let free = tree.free_list_blocks().unwrap();
                prop_assert!(held.iter().all(|id| !free.contains(id)));
            }
        }
    }
}
