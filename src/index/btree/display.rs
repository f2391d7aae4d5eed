//! Text dumps of the tree for debugging.

use crate::common::{BlockId, Error, Result};
use crate::index::btree::node::{InteriorNode, Node};
use crate::index::btree::BTreeIndex;
use crate::storage::BlockStore;

/// Output format for [`BTreeIndex::display`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayMode {
    /// One line per node in pre-order: `id: Root: *c0 k0 *c1`.
    Depth,
    /// A Graphviz digraph with one labelled statement per node and one edge
    /// per child pointer.
    DepthDot,
    /// Every `(key,value)` pair in ascending key order, one per line.
    SortedKeyVal,
}

impl<S: BlockStore> BTreeIndex<S> {
    /// Render the tree by walking it depth-first from the root.
    ///
    /// Bytes are shown with ASCII escaping, so printable keys read as text.
    ///
    /// # Errors
    /// Any read or decode error hit during the walk.
    pub fn display(&self, mode: DisplayMode) -> Result<String> {
        let mut out = String::new();
        if mode == DisplayMode::DepthDot {
            out.push_str("digraph tree {\n");
        }
        self.display_subtree(self.superblock.rootnode, mode, &mut out)?;
        if mode == DisplayMode::DepthDot {
            out.push_str("}\n");
        }
        Ok(out)
    }

    fn display_subtree(&self, id: BlockId, mode: DisplayMode, out: &mut String) -> Result<()> {
        let node = self.read_node(id)?;
        let interior = match &node {
            Node::Root(interior) | Node::Interior(interior) => Some(interior),
            Node::Leaf(_) => None,
            other => {
                return Err(Error::insane(format!(
                    "tree walk reached {} of type {}",
                    id,
                    other.node_type().name()
                )))
            }
        };

        match mode {
            DisplayMode::Depth => {
                out.push_str(&describe(id, &node));
                out.push('\n');
            }
            DisplayMode::DepthDot => {
                out.push_str(&format!(
                    "  {} [ label=\"{}\" ];\n",
                    id.0,
                    escape_dot(&describe(id, &node))
                ));
                for child in interior.into_iter().flat_map(live_children) {
                    out.push_str(&format!("  {} -> {};\n", id.0, child.0));
                }
            }
            DisplayMode::SortedKeyVal => {
                if let Node::Leaf(leaf) = &node {
                    for (key, value) in leaf.entries() {
                        out.push_str(&format!("({},{})\n", escape(key), escape(value)));
                    }
                }
            }
        }

        for child in interior.into_iter().flat_map(live_children) {
            self.display_subtree(child, mode, out)?;
        }
        Ok(())
    }
}

/// Children worth visiting; an empty root's only slot is `NIL`.
fn live_children(interior: &InteriorNode) -> impl Iterator<Item = BlockId> + '_ {
    interior.children.iter().copied().filter(|child| !child.is_nil())
}

/// One-line summary of a tree node.
fn describe(id: BlockId, node: &Node) -> String {
    let mut line = format!("{}: {}:", id.0, node.node_type().name());
    match node {
        Node::Root(interior) | Node::Interior(interior) => {
            for (i, child) in interior.children.iter().enumerate() {
                if i > 0 {
                    line.push(' ');
                    line.push_str(&escape(&interior.keys[i - 1]));
                }
                line.push_str(&format!(" *{}", child.0));
            }
        }
        Node::Leaf(leaf) => {
            for (key, value) in leaf.entries() {
                line.push_str(&format!(" {} {}", escape(key), escape(value)));
            }
        }
        Node::Unallocated { .. } | Node::Superblock(_) => {}
    }
    line
}

/// ASCII-escape raw bytes.
fn escape(bytes: &[u8]) -> String {
    bytes
        .iter()
        .flat_map(|&b| std::ascii::escape_default(b))
        .map(char::from)
        .collect()
}

/// Quote a label for a Graphviz string literal.
fn escape_dot(label: &str) -> String {
    label.replace('\\', "\\\\").replace('"', "\\\"")
}
