//! Structural invariant checker.

use std::collections::HashSet;

use crate::common::{BlockId, Error, Result};
use crate::index::btree::node::{InteriorNode, LeafNode, Node};
use crate::index::btree::BTreeIndex;
use crate::storage::BlockStore;

/// Key range a subtree must stay inside: `lower <= key < upper`.
#[derive(Clone, Copy)]
struct Bounds<'a> {
    lower: Option<&'a [u8]>,
    upper: Option<&'a [u8]>,
}

impl Bounds<'_> {
    fn contains(&self, key: &[u8]) -> bool {
        self.lower.map_or(true, |lower| key >= lower) && self.upper.map_or(true, |upper| key < upper)
    }
}

/// State carried through one walk.
struct Walk {
    visited: HashSet<BlockId>,
    leaf_depth: Option<usize>,
}

impl<S: BlockStore> BTreeIndex<S> {
    /// Check every structural invariant of the tree and its free list.
    ///
    /// Verifies the on-disk superblock matches the in-memory copy, that the
    /// only `Root` is the superblock's root, that every reachable node is
    /// well-formed with strictly increasing keys inside its routing bounds,
    /// that all leaves sit at one depth, that no block is reachable twice,
    /// and that the free list is a terminated chain disjoint from the tree.
    ///
    /// # Errors
    /// `Error::Insane` naming the first offending block. I/O errors from the
    /// store pass through unchanged.
    pub fn sanity_check(&self) -> Result<()> {
        self.check_superblock().map_err(as_insane)?;

        let root = self.superblock.rootnode;
        let mut walk = Walk {
            visited: HashSet::new(),
            leaf_depth: None,
        };
        walk.visited.insert(self.superblock_index);

        let all = Bounds {
            lower: None,
            upper: None,
        };
        self.check_subtree(root, true, all, 0, &mut walk)
            .map_err(as_insane)?;

        for id in self.free_list_blocks().map_err(as_insane)? {
            if walk.visited.contains(&id) {
                return Err(Error::insane(format!(
                    "{} is on the free list and reachable from the tree",
                    id
                )));
            }
        }

        Ok(())
    }

    fn check_superblock(&self) -> Result<()> {
        match self.read_node(self.superblock_index)? {
            Node::Superblock(on_disk) if on_disk == self.superblock => Ok(()),
            Node::Superblock(on_disk) => Err(Error::insane(format!(
                "{} holds {:?}, in memory {:?}",
                self.superblock_index, on_disk, self.superblock
            ))),
            other => Err(Error::insane(format!(
                "{} is a {} block, expected the superblock",
                self.superblock_index,
                other.node_type().name()
            ))),
        }
    }

    fn check_subtree(
        &self,
        id: BlockId,
        is_root: bool,
        bounds: Bounds<'_>,
        depth: usize,
        walk: &mut Walk,
    ) -> Result<()> {
        if id.is_nil() || id.0 >= self.store.num_blocks() {
            return Err(Error::insane(format!("tree links to invalid block {}", id)));
        }
        if !walk.visited.insert(id) {
            return Err(Error::insane(format!("{} is reachable twice", id)));
        }

        match self.read_node(id)? {
            Node::Root(interior) if is_root => {
                self.check_interior(id, &interior, true, bounds, depth, walk)
            }
            Node::Interior(interior) if !is_root => {
                self.check_interior(id, &interior, false, bounds, depth, walk)
            }
            Node::Leaf(leaf) if !is_root => check_leaf(id, &leaf, bounds, depth, walk),
            other if is_root => Err(Error::insane(format!(
                "root {} is tagged {}",
                id,
                other.node_type().name()
            ))),
            other => Err(Error::insane(format!(
                "{} below the root is tagged {}",
                id,
                other.node_type().name()
            ))),
        }
    }

    fn check_interior(
        &self,
        id: BlockId,
        interior: &InteriorNode,
        is_root: bool,
        bounds: Bounds<'_>,
        depth: usize,
        walk: &mut Walk,
    ) -> Result<()> {
        if interior.keys.is_empty() {
            if !is_root {
                return Err(Error::insane(format!("interior {} has no keys", id)));
            }
            let only = interior.children[0];
            if only.is_nil() {
                // Empty tree
                return Ok(());
            }
            return self.check_subtree(only, false, bounds, depth + 1, walk);
        }

        check_keys(id, &interior.keys, bounds)?;

        let n = interior.numkeys();
        for (i, &child) in interior.children.iter().enumerate() {
            let child_bounds = Bounds {
                lower: if i == 0 {
                    bounds.lower
                } else {
                    Some(interior.keys[i - 1].as_slice())
                },
                upper: if i == n {
                    bounds.upper
                } else {
                    Some(interior.keys[i].as_slice())
                },
            };
            self.check_subtree(child, false, child_bounds, depth + 1, walk)?;
        }
        Ok(())
    }
}

fn check_leaf(
    id: BlockId,
    leaf: &LeafNode,
    bounds: Bounds<'_>,
    depth: usize,
    walk: &mut Walk,
) -> Result<()> {
    check_keys(id, &leaf.keys, bounds)?;

    match walk.leaf_depth {
        None => walk.leaf_depth = Some(depth),
        Some(expected) if expected != depth => {
            return Err(Error::insane(format!(
                "leaf {} at depth {}, other leaves at depth {}",
                id, depth, expected
            )))
        }
        Some(_) => {}
    }
    Ok(())
}

/// Keys strictly increasing and inside `bounds`.
fn check_keys(id: BlockId, keys: &[Vec<u8>], bounds: Bounds<'_>) -> Result<()> {
    if let Some(i) = keys.windows(2).position(|pair| pair[0] >= pair[1]) {
        return Err(Error::insane(format!(
            "{} keys out of order at slot {}",
            id,
            i + 1
        )));
    }
    if let Some(i) = keys.iter().position(|key| !bounds.contains(key)) {
        return Err(Error::insane(format!(
            "{} key at slot {} is outside its parent's routing range",
            id, i
        )));
    }
    Ok(())
}

/// A checksum failure during a check is a corrupted tree, not a store fault.
fn as_insane(err: Error) -> Error {
    match err {
        Error::ChecksumMismatch(id) => Error::insane(format!("{} fails its checksum", id)),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::config::{IndexOptions, NODE_HEADER_SIZE};
    use crate::storage::MemoryBlockStore;

    fn key(n: u32) -> [u8; 4] {
        n.to_be_bytes()
    }

    fn create_filled_tree(count: u32) -> BTreeIndex<MemoryBlockStore> {
        let mut tree =
            BTreeIndex::create(MemoryBlockStore::new(512, 32), IndexOptions::new(4, 4)).unwrap();
        for i in 0..count {
            tree.insert(&key(i * 7 % 1000), &key(i)).unwrap();
        }
        tree
    }

    #[test]
    fn test_sane_after_format_and_inserts() {
        assert!(create_filled_tree(0).sanity_check().is_ok());
        assert!(create_filled_tree(1).sanity_check().is_ok());
        assert!(create_filled_tree(500).sanity_check().is_ok());
    }

    #[test]
    fn test_detects_corrupt_free_list() {
        let tree = create_filled_tree(10);
        let head = tree.superblock().freelist;

        // Point the head back at itself
        tree.write_node(head, &Node::Unallocated { next: head }).unwrap();

        assert!(matches!(tree.sanity_check(), Err(Error::Insane(_))));
    }

    #[test]
    fn test_detects_mistagged_block() {
        let tree = create_filled_tree(100);
        let Node::Root(root) = tree.read_node(tree.superblock().rootnode).unwrap() else {
            panic!("expected root");
        };

        // A leaf retagged as an interior node
        tree.write_node(root.children[0], &Node::Interior(InteriorNode::empty()))
            .unwrap();

        assert!(matches!(tree.sanity_check(), Err(Error::Insane(_))));
    }

    #[test]
    fn test_detects_out_of_order_keys() {
        let tree = create_filled_tree(20);
        let Node::Root(root) = tree.read_node(tree.superblock().rootnode).unwrap() else {
            panic!("expected root");
        };
        let leaf_id = root.children[0];
        let Node::Leaf(mut leaf) = tree.read_node(leaf_id).unwrap() else {
            panic!("expected leaf");
        };

        leaf.keys.swap(0, 1);
        tree.write_node(leaf_id, &Node::Leaf(leaf)).unwrap();

        assert!(matches!(tree.sanity_check(), Err(Error::Insane(_))));
    }

    #[test]
    fn test_detects_key_outside_routing_range() {
        let tree = create_filled_tree(100);
        let Node::Root(root) = tree.read_node(tree.superblock().rootnode).unwrap() else {
            panic!("expected root");
        };
        let leaf_id = root.children[0];
        let Node::Leaf(mut leaf) = tree.read_node(leaf_id).unwrap() else {
            panic!("expected leaf");
        };

        // Largest possible key belongs in the rightmost leaf
        let last = leaf.keys.len() - 1;
        leaf.keys[last] = vec![0xFF; 4];
        tree.write_node(leaf_id, &Node::Leaf(leaf)).unwrap();

        assert!(matches!(tree.sanity_check(), Err(Error::Insane(_))));
    }

    #[test]
    fn test_detects_checksum_failure_as_insane() {
        let tree = create_filled_tree(10);
        let root = tree.superblock().rootnode;
        tree.store()
            .corrupt(root, NODE_HEADER_SIZE + 2, &[0xAA])
            .unwrap();

        assert!(matches!(tree.sanity_check(), Err(Error::Insane(_))));
    }

    #[test]
    fn test_detects_stale_superblock() {
        let mut tree = create_filled_tree(10);
        tree.superblock.freelist = BlockId::NIL;

        assert!(matches!(tree.sanity_check(), Err(Error::Insane(_))));
    }

    #[test]
    fn test_detects_free_block_in_tree() {
        let tree = create_filled_tree(10);
        let Node::Root(root) = tree.read_node(tree.superblock().rootnode).unwrap() else {
            panic!("expected root");
        };
        let free = tree.superblock().freelist;

        // Link the free-list head into the tree as a second child
        let mut root = root;
        root.keys.push(key(5000).to_vec());
        root.children.push(free);
        tree.write_node(tree.superblock().rootnode, &Node::Root(root))
            .unwrap();

        assert!(matches!(tree.sanity_check(), Err(Error::Insane(_))));
    }
}
