use super::{Entry, NodeIndex, Tree};

use crate::calc::Calculator;
use crate::error::{Error, Result};
use crate::primitive::Envelope;

impl<T, C: Calculator> Tree<T, C> {
    /// Indexes `data` under `envelope`.
    ///
    /// Fails without touching the tree if the envelope does not live in this tree's
    /// space, or if it covers no point at all.
    pub fn insert(&mut self, envelope: Envelope, data: T) -> Result<()> {
        self.space.check(&envelope)?;

        if envelope.is_empty() {
            return Err(Error::EmptyEnvelope);
        }

        self.insert_entry(Entry { envelope, data })?;
        self.len += 1;

        Ok(())
    }

    /// Inserts an already validated entry, growing the tree from the top while the root
    /// overflows. Does not touch the element count.
    pub(super) fn insert_entry(&mut self, entry: Entry<T>) -> Result<()> {
        let max = self.param.max_elements as usize;
        self.insert_recurse(self.root, entry)?;

        // Grafts can leave several overflowing children below the root; one root split
        // may not be enough.
        while self.nodes[self.root].len() > max {
            let (minus, plus) = self.split_node(self.root)?;
            let new_root = self.make_internal(vec![minus, plus]);

            self.root = new_root;
            self.split_overflowing_children(new_root)?;
            self.refresh_boundary(new_root);

            log::debug!("root overflowed; tree height grows to {}", self.height());
        }

        Ok(())
    }

    fn insert_recurse(&mut self, node: NodeIndex, entry: Entry<T>) -> Result<()> {
        if self.nodes[node].is_leaf() {
            self.nodes[node].add_entry(entry);
            return Ok(());
        }

        let target = self.choose_subtree(node, &entry.envelope);

        self.insert_recurse(target, entry)?;

        // Overlapping leaves are rebalanced before anything is split, which may spare a
        // split altogether.
        self.graft_overlapping_leaves(node)?;
        self.split_overflowing_children(node)?;
        self.refresh_boundary(node);

        Ok(())
    }

    /// Picks the child of internal `node` which should receive `envelope`.
    fn choose_subtree(&self, node: NodeIndex, envelope: &Envelope) -> NodeIndex {
        let children = self.nodes[node].children();
        assert!(
            !children.is_empty(),
            "subtree selection reached an internal node without children"
        );

        if let [only] = children[..] {
            return only;
        }

        if let Some(&inside) = children
            .iter()
            .find(|&&c| self.nodes[c].boundary.contains(envelope))
        {
            return inside;
        }

        let cost = |c: NodeIndex| self.calc.enlargement(&self.nodes[c].boundary, envelope);

        let mut best = children[0];
        let mut best_cost = cost(best);
        let mut best_count = None;

        for &child in &children[1..] {
            let child_cost = cost(child);

            if child_cost < best_cost {
                best = child;
                best_cost = child_cost;
                best_count = None;
            } else if child_cost == best_cost {
                // Counting is a subtree walk, so only done when enlargement ties.
                let count = self.count_entries(child);

                if count < *best_count.get_or_insert_with(|| self.count_entries(best)) {
                    best = child;
                    best_count = Some(count);
                }
            }
        }

        best
    }

    /// Splits every child of `node` holding more than `max_elements` elements, until
    /// none does. Both halves take the place of the original child.
    fn split_overflowing_children(&mut self, node: NodeIndex) -> Result<()> {
        let max = self.param.max_elements as usize;

        loop {
            let overflow = self.nodes[node]
                .children()
                .iter()
                .position(|&c| self.nodes[c].len() > max);

            let Some(index) = overflow else {
                break;
            };

            let child = self.nodes[node].children()[index];
            let (minus, plus) = self.split_node(child)?;

            if let Some(children) = self.nodes[node].kind.as_internal_mut() {
                children.splice(index..=index, [minus, plus]);
            }

            self.nodes[minus].set_parent(Some(node));
            self.nodes[plus].set_parent(Some(node));
        }

        Ok(())
    }
}
