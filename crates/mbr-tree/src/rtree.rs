mod graft;
mod insert;
mod split;
mod trim;
mod verify;

use enum_as_inner::EnumAsInner;
use slotmap::SlotMap;

use crate::calc::{Calculator, EuclideanCalculator};
use crate::error::{Error, Result};
use crate::primitive::{Envelope, Space};

pub use split::SplitPolicy;

/* ---------------------------------------------------------------------------------------------- */
/*                                             R-TREE                                             */
/* ---------------------------------------------------------------------------------------------- */

/// Configuration of a [`Tree`], fixed for its lifetime.
#[non_exhaustive]
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TreeParameter {
    /// Fan-out threshold. A node holding more than this many entries (leaf) or children
    /// (internal) is split before the public call returns.
    pub max_elements: u32,

    /// Seed selection heuristic used whenever a node is split.
    pub split_policy: SplitPolicy,
}

impl Default for TreeParameter {
    fn default() -> Self {
        Self::new(8)
    }
}

impl TreeParameter {
    pub fn new(max_elements: u32) -> Self {
        Self {
            max_elements,
            split_policy: SplitPolicy::Linear,
        }
    }

    pub fn with(mut self, visit: impl FnOnce(&mut Self)) -> Self {
        visit(&mut self);
        self
    }

    /// A non-root leaf holding this many entries or fewer is evicted on condensation.
    pub fn underflow_threshold(&self) -> usize {
        self.max_elements as usize / 3
    }

    /// Smallest population of a non-root leaf; one above the underflow threshold.
    pub fn min_fill(&self) -> usize {
        self.underflow_threshold() + 1
    }

    fn validate(&self) -> Result<()> {
        if self.max_elements < 2 {
            return Err(Error::InvalidCapacity(self.max_elements));
        }

        Ok(())
    }
}

/// A mutable R-tree over n-dimensional bounding boxes.
///
/// Entries are inserted with an envelope and an opaque payload. Two entries are the same
/// entry, for deletion purposes, if both their envelopes and their payloads compare
/// equal.
///
/// Nodes live in an arena owned by the tree; each node knows its parent, and its
/// cached boundary is kept equal to the union of its contents whenever a public call
/// returns.
pub struct Tree<T, C = EuclideanCalculator> {
    nodes: SlotMap<NodeIndex, Node<T>>,
    root: NodeIndex,
    param: TreeParameter,
    space: Space,
    calc: C,
    len: usize,
}

/// An indexed envelope together with the payload it was inserted with.
#[derive(Clone, Debug, PartialEq)]
pub struct Entry<T> {
    envelope: Envelope,
    data: T,
}

struct Node<T> {
    parent: Option<NodeIndex>,
    boundary: Envelope,
    kind: NodeKind<T>,
}

#[derive(EnumAsInner)]
enum NodeKind<T> {
    Leaf(Vec<Entry<T>>),
    Internal(Vec<NodeIndex>),
}

slotmap::new_key_type! {
    /// Index of tree node
    struct NodeIndex;
}

/* --------------------------------------- Public Tree API -------------------------------------- */

impl<T, C: Calculator> Tree<T, C> {
    pub fn new(
        max_elements: u32,
        space: Space,
        calculator: C,
        split_policy: SplitPolicy,
    ) -> Result<Self> {
        let param = TreeParameter::new(max_elements).with(|x| x.split_policy = split_policy);
        Self::with_parameter(param, space, calculator)
    }

    pub fn with_parameter(param: TreeParameter, space: Space, calculator: C) -> Result<Self> {
        param.validate()?;

        let mut nodes = SlotMap::with_key();
        let root = nodes.insert(Node::leaf(space.dimension, Vec::new()));

        Ok(Self {
            nodes,
            root,
            param,
            space,
            calc: calculator,
            len: 0,
        })
    }

    /// Appends every entry whose envelope intersects `query` to `into`. The destination
    /// is not cleared first.
    pub fn search<'a>(
        &'a self,
        query: &Envelope,
        into: &mut impl Extend<&'a Entry<T>>,
    ) -> Result<()> {
        self.space.check(query)?;
        self.visit_intersecting(self.root, query, &mut |entry| {
            into.extend(std::iter::once(entry))
        });
        Ok(())
    }

    /// Callback flavor of [`Tree::search`].
    pub fn search_with(
        &self,
        query: &Envelope,
        mut on_hit: impl FnMut(&Entry<T>),
    ) -> Result<()> {
        self.space.check(query)?;
        self.visit_intersecting(self.root, query, &mut |entry| on_hit(entry));
        Ok(())
    }

    /// Removes every entry, leaving an empty leaf as root.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.root = self.nodes.insert(Node::leaf(self.space.dimension, Vec::new()));
        self.len = 0;
    }
}

impl<T, C> Tree<T, C> {
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of nodes on the longest root-to-leaf path; an empty tree has height 1.
    pub fn height(&self) -> usize {
        fn recurse<T>(nodes: &SlotMap<NodeIndex, Node<T>>, node: NodeIndex) -> usize {
            1 + nodes[node]
                .children()
                .iter()
                .map(|&child| recurse(nodes, child))
                .max()
                .unwrap_or(0)
        }

        recurse(&self.nodes, self.root)
    }

    /// Envelope covering every stored entry; empty if the tree is.
    pub fn boundary(&self) -> &Envelope {
        &self.nodes[self.root].boundary
    }

    pub fn parameter(&self) -> &TreeParameter {
        &self.param
    }

    pub fn space(&self) -> &Space {
        &self.space
    }

    pub fn calculator(&self) -> &C {
        &self.calc
    }

    /// Visits every stored entry, in no particular order.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            nodes: &self.nodes,
            stack: vec![self.root],
            current: Default::default(),
        }
    }
}

impl<'a, T, C> IntoIterator for &'a Tree<T, C> {
    type Item = &'a Entry<T>;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/* ---------------------------------------- Internal APIs --------------------------------------- */

impl<T, C> Tree<T, C> {
    fn visit_intersecting<'a>(
        &'a self,
        node: NodeIndex,
        query: &Envelope,
        on_hit: &mut impl FnMut(&'a Entry<T>),
    ) {
        let node = &self.nodes[node];

        if !node.boundary.intersects(query) {
            return;
        }

        match &node.kind {
            NodeKind::Leaf(entries) => entries
                .iter()
                .filter(|entry| entry.envelope.intersects(query))
                .for_each(|entry| on_hit(entry)),
            NodeKind::Internal(children) => {
                for &child in children {
                    self.visit_intersecting(child, query, on_hit);
                }
            }
        }
    }

    /// Recomputes the cached boundary of a single node from its direct contents.
    fn refresh_boundary(&mut self, node: NodeIndex) {
        let boundary = self.compute_boundary(node);
        self.nodes[node].boundary = boundary;
    }

    fn compute_boundary(&self, node: NodeIndex) -> Envelope {
        let mut boundary = Envelope::empty(self.space.dimension);

        match &self.nodes[node].kind {
            NodeKind::Leaf(entries) => entries
                .iter()
                .for_each(|entry| boundary.extend(&entry.envelope)),
            NodeKind::Internal(children) => children
                .iter()
                .for_each(|&child| boundary.extend(&self.nodes[child].boundary)),
        }

        boundary
    }

    /// Total number of entries stored under `node`.
    fn count_entries(&self, node: NodeIndex) -> usize {
        match &self.nodes[node].kind {
            NodeKind::Leaf(entries) => entries.len(),
            NodeKind::Internal(children) => {
                children.iter().map(|&c| self.count_entries(c)).sum()
            }
        }
    }

    /// Creates a detached leaf node holding `entries`.
    fn make_leaf(&mut self, entries: Vec<Entry<T>>) -> NodeIndex {
        self.nodes.insert(Node::leaf(self.space.dimension, entries))
    }

    /// Creates a detached internal node over `children`. A single child is returned
    /// as-is instead of being wrapped.
    fn make_internal(&mut self, children: Vec<NodeIndex>) -> NodeIndex {
        if let [only] = children[..] {
            self.nodes[only].parent = None;
            return only;
        }

        let node = self.nodes.insert(Node {
            parent: None,
            boundary: Envelope::empty(self.space.dimension),
            kind: NodeKind::Internal(Vec::with_capacity(children.len())),
        });

        for child in children {
            self.attach(node, child);
        }

        self.refresh_boundary(node);
        node
    }

    /// Appends `child` to the children of `parent`. Boundaries are left to the caller.
    fn attach(&mut self, parent: NodeIndex, child: NodeIndex) {
        self.nodes[child].set_parent(Some(parent));

        if let Some(children) = self.nodes[parent].kind.as_internal_mut() {
            children.push(child);
        } else {
            unreachable!("attempt to attach a child to a leaf node");
        }
    }
}

/* ------------------------------------------- Node API ------------------------------------------- */

impl<T> Node<T> {
    fn leaf(dimension: usize, entries: Vec<Entry<T>>) -> Self {
        let mut boundary = Envelope::empty(dimension);
        entries.iter().for_each(|e| boundary.extend(&e.envelope));

        Self {
            parent: None,
            boundary,
            kind: NodeKind::Leaf(entries),
        }
    }

    fn is_leaf(&self) -> bool {
        matches!(self.kind, NodeKind::Leaf(_))
    }

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of direct elements: entries of a leaf, or children of an internal node.
    fn len(&self) -> usize {
        match &self.kind {
            NodeKind::Leaf(entries) => entries.len(),
            NodeKind::Internal(children) => children.len(),
        }
    }

    fn children(&self) -> &[NodeIndex] {
        match &self.kind {
            NodeKind::Leaf(_) => &[],
            NodeKind::Internal(children) => children,
        }
    }

    fn set_parent(&mut self, parent: Option<NodeIndex>) {
        self.parent = parent;
    }

    /// Appends an entry to a leaf, growing its boundary.
    fn add_entry(&mut self, entry: Entry<T>) {
        if let NodeKind::Leaf(entries) = &mut self.kind {
            self.boundary.extend(&entry.envelope);
            entries.push(entry);
        } else {
            unreachable!("attempt to add an entry to an internal node");
        }
    }

    /// Removes the first entry matching both `envelope` and `data`. The boundary goes
    /// stale, and is refreshed by the caller.
    fn remove_entry(&mut self, envelope: &Envelope, data: &T) -> Option<Entry<T>>
    where
        T: PartialEq,
    {
        let entries = self.kind.as_leaf_mut()?;
        let index = entries
            .iter()
            .position(|e| e.envelope == *envelope && e.data == *data)?;

        Some(entries.remove(index))
    }

    fn take_entries(&mut self) -> Vec<Entry<T>> {
        match &mut self.kind {
            NodeKind::Leaf(entries) => std::mem::take(entries),
            NodeKind::Internal(_) => Vec::new(),
        }
    }
}

/* ----------------------------------------- Entry Type ----------------------------------------- */

impl<T> Entry<T> {
    pub fn new(envelope: Envelope, data: T) -> Self {
        Self { envelope, data }
    }

    pub fn envelope(&self) -> &Envelope {
        &self.envelope
    }

    pub fn data(&self) -> &T {
        &self.data
    }

    pub fn into_data(self) -> T {
        self.data
    }
}

impl<T> std::ops::Deref for Entry<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.data
    }
}

/* ------------------------------------------ Iterator ------------------------------------------ */

pub struct Iter<'a, T> {
    nodes: &'a SlotMap<NodeIndex, Node<T>>,
    stack: Vec<NodeIndex>,
    current: std::slice::Iter<'a, Entry<T>>,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a Entry<T>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(entry) = self.current.next() {
                return Some(entry);
            }

            let nodes = self.nodes;
            match &nodes[self.stack.pop()?].kind {
                NodeKind::Leaf(entries) => self.current = entries.iter(),
                NodeKind::Internal(children) => self.stack.extend_from_slice(children),
            }
        }
    }
}

/* ---------------------------------------------------------------------------------------------- */
/*                                              TESTS                                             */
/* ---------------------------------------------------------------------------------------------- */
