use super::{NodeIndex, NodeKind, Tree};

impl<T, C> Tree<T, C> {
    /// Walks the whole tree and checks its structural invariants: parent links, cached
    /// boundaries, fill limits, element count, and that no node leaked in the arena.
    ///
    /// Intended for tests and debugging; this visits every node.
    #[doc(hidden)]
    pub fn __debug_verify_tree_state(&self) -> Result<(), String> {
        let root = self.root;

        if self.nodes[root].parent.is_some() {
            return Err(format!("root {root:?} has a parent"));
        }

        let mut visited = 0;
        let entries = self.verify_recurse(root, &mut visited)?;

        if entries != self.len {
            return Err(format!("{entries} entries stored, but len() is {}", self.len));
        }

        if visited != self.nodes.len() {
            return Err(format!(
                "{visited} nodes reachable, but arena holds {}",
                self.nodes.len()
            ));
        }

        Ok(())
    }

    fn verify_recurse(&self, node: NodeIndex, visited: &mut usize) -> Result<usize, String> {
        *visited += 1;

        let this = &self.nodes[node];
        let is_root = node == self.root;
        let max = self.param.max_elements as usize;

        if this.len() > max {
            return Err(format!("{node:?} holds {} elements, over {max}", this.len()));
        }

        if this.boundary != self.compute_boundary(node) {
            return Err(format!("{node:?} has a stale boundary"));
        }

        match &this.kind {
            NodeKind::Leaf(entries) => {
                if !is_root && entries.len() < self.param.min_fill() {
                    return Err(format!(
                        "leaf {node:?} holds {} entries, under {}",
                        entries.len(),
                        self.param.min_fill()
                    ));
                }

                Ok(entries.len())
            }
            NodeKind::Internal(children) => {
                if children.len() < 2 {
                    return Err(format!(
                        "internal {node:?} has {} children",
                        children.len()
                    ));
                }

                let mut sum = 0;

                for &child in children {
                    let Some(child_node) = self.nodes.get(child) else {
                        return Err(format!("{node:?} refers to disposed child {child:?}"));
                    };

                    if child_node.parent != Some(node) {
                        return Err(format!("{child:?} does not point back to {node:?}"));
                    }

                    sum += self.verify_recurse(child, visited)?;
                }

                Ok(sum)
            }
        }
    }
}
