use super::{Entry, Node, NodeIndex, NodeKind, Tree};

use crate::calc::Calculator;
use crate::error::Result;
use crate::primitive::Envelope;

impl<T: PartialEq, C: Calculator> Tree<T, C> {
    /// Removes one entry equal to `(envelope, data)`. Returns `false` if there was none.
    ///
    /// The path from the affected leaf up to the root is condensed afterwards; entries of
    /// leaves that underflow along the way are reinserted.
    pub fn delete(&mut self, envelope: &Envelope, data: &T) -> Result<bool> {
        self.space.check(envelope)?;

        let Some(leaf) = self.find_leaf(self.root, envelope, data) else {
            return Ok(false);
        };

        let removed = self.nodes[leaf].remove_entry(envelope, data);
        debug_assert!(removed.is_some());

        self.len -= 1;
        self.condense(leaf)?;

        Ok(true)
    }

    pub fn contains(&self, envelope: &Envelope, data: &T) -> Result<bool> {
        self.space.check(envelope)?;
        Ok(self.find_leaf(self.root, envelope, data).is_some())
    }

    fn find_leaf(&self, node: NodeIndex, envelope: &Envelope, data: &T) -> Option<NodeIndex> {
        let this = &self.nodes[node];

        if !this.boundary.intersects(envelope) {
            return None;
        }

        match &this.kind {
            NodeKind::Leaf(entries) => entries
                .iter()
                .any(|e| e.envelope == *envelope && e.data == *data)
                .then_some(node),
            NodeKind::Internal(children) => children
                .iter()
                .find_map(|&c| self.find_leaf(c, envelope, data)),
        }
    }
}

/* ---------------------------------------- Condensation ---------------------------------------- */

enum TrimAction {
    Keep,
    Drop,
    Splice(NodeIndex),
    Evict,
}

impl<T, C: Calculator> Tree<T, C> {
    /// Walks from `from` up to the root trimming children on the way, then reinserts the
    /// entries of every evicted leaf.
    fn condense(&mut self, from: NodeIndex) -> Result<()> {
        let mut orphans = Vec::new();

        self.refresh_boundary(from);
        let mut cursor = self.nodes[from].parent;

        while let Some(node) = cursor {
            self.trim_children(node, &mut orphans);
            self.refresh_boundary(node);
            cursor = self.nodes[node].parent;
        }

        self.collapse_root();

        if !orphans.is_empty() {
            log::debug!("reinserting {} entries of underflowed leaves", orphans.len());
        }

        for entry in orphans {
            self.insert_entry(entry)?;
        }

        Ok(())
    }

    /// Examines children of `node` back to front: drops empty ones, splices internal
    /// children holding a single grandchild, and evicts underflowing leaves.
    fn trim_children(&mut self, node: NodeIndex, orphans: &mut Vec<Entry<T>>) {
        let underflow = self.param.underflow_threshold();
        let mut index = self.nodes[node].len();

        while index > 0 {
            index -= 1;

            let child = self.nodes[node].children()[index];
            let action = match &self.nodes[child] {
                this if this.is_empty() => TrimAction::Drop,
                Node {
                    kind: NodeKind::Internal(grandchildren),
                    ..
                } if grandchildren.len() == 1 => TrimAction::Splice(grandchildren[0]),
                Node {
                    kind: NodeKind::Leaf(entries),
                    ..
                } if entries.len() <= underflow => TrimAction::Evict,
                _ => TrimAction::Keep,
            };

            let children = match self.nodes[node].kind.as_internal_mut() {
                Some(children) => children,
                None => unreachable!("trimming children of a leaf"),
            };

            match action {
                TrimAction::Keep => continue,
                TrimAction::Drop | TrimAction::Evict => {
                    children.remove(index);
                }
                TrimAction::Splice(grandchild) => {
                    children[index] = grandchild;
                    self.nodes[grandchild].set_parent(Some(node));

                    // Re-examine the spliced node at the same position.
                    index += 1;
                }
            }

            if let Some(mut removed) = self.nodes.remove(child) {
                orphans.append(&mut removed.take_entries());
            }
        }
    }

    /// Shrinks the tree from the top while the root is an internal node with fewer than
    /// two children.
    fn collapse_root(&mut self) {
        loop {
            let root = self.root;

            if self.nodes[root].is_leaf() {
                break;
            }

            match *self.nodes[root].children() {
                [] => {
                    self.nodes[root] = Node::leaf(self.space.dimension, Vec::new());
                    break;
                }
                [only] => {
                    self.nodes.remove(root);
                    self.nodes[only].set_parent(None);
                    self.root = only;

                    log::debug!("root collapsed; tree height shrinks to {}", self.height());
                }
                _ => break,
            }
        }
    }
}
