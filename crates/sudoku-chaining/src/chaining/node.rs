//! Candidate nodes and the search-time ancestry arena.
//!
//! A [`NodeSlot`] names a claim "digit d lies in one of these cells"; a
//! [`Node`] adds polarity. During search each discovered node is pushed into
//! a [`NodeArena`] together with the index of the node it was expanded from,
//! so a path is recovered by walking parent indices back to the root.

use std::fmt;
use std::ops::Not;

use crate::bitset::CellSet;
use crate::fabric::cell_name;

/// Polarity-free identity of a candidate claim: a cell set and a digit.
///
/// A single-cell slot is an ordinary candidate; a slot with more cells is a
/// grouped claim that is true when the digit sits in any of its cells.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeSlot {
    pub cells: CellSet,
    pub digit: u8,
}

impl NodeSlot {
    pub fn new(cells: CellSet, digit: u8) -> Self {
        debug_assert!(!cells.is_empty());
        NodeSlot { cells, digit }
    }

    /// Slot for one candidate.
    pub fn single(cell: usize, digit: u8) -> Self {
        NodeSlot {
            cells: CellSet::single(cell),
            digit,
        }
    }

    pub fn is_grouped(&self) -> bool {
        self.cells.count() > 1
    }

    /// The cell of a single-cell slot.
    pub fn cell(&self) -> Option<usize> {
        if self.is_grouped() {
            None
        } else {
            self.cells.first()
        }
    }
}

impl fmt::Debug for NodeSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self)
    }
}

impl fmt::Display for NodeSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<String> = self.cells.iter().map(cell_name).collect();
        if names.len() == 1 {
            write!(f, "{}({})", names[0], self.digit)
        } else {
            write!(f, "[{}]({})", names.join(","), self.digit)
        }
    }
}

/// A candidate claim together with its polarity.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Node {
    pub slot: NodeSlot,
    pub is_on: bool,
}

impl Node {
    pub fn on(slot: NodeSlot) -> Self {
        Node { slot, is_on: true }
    }

    pub fn off(slot: NodeSlot) -> Self {
        Node { slot, is_on: false }
    }

    pub fn cells(&self) -> CellSet {
        self.slot.cells
    }

    pub fn digit(&self) -> u8 {
        self.slot.digit
    }

    /// Polarity-ignored equality.
    pub fn same_slot(&self, other: &Node) -> bool {
        self.slot == other.slot
    }
}

impl Not for Node {
    type Output = Node;

    fn not(self) -> Node {
        Node {
            slot: self.slot,
            is_on: !self.is_on,
        }
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self)
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", if self.is_on { "+" } else { "-" }, self.slot)
    }
}

// ==================== Ancestry arena ====================

/// Handle of a node pushed into a [`NodeArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(u32);

#[derive(Debug, Clone)]
struct ArenaEntry {
    node: Node,
    parent: Option<NodeId>,
    depth: u32,
}

/// Append-only store of search nodes; each entry records its parent's index.
#[derive(Debug, Default, Clone)]
pub struct NodeArena {
    entries: Vec<ArenaEntry>,
}

impl NodeArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop every entry, keeping the allocation for the next search.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Push a parentless node.
    pub fn root(&mut self, node: Node) -> NodeId {
        self.insert(node, None, 1)
    }

    /// Push `node` discovered while expanding `parent`.
    pub fn push(&mut self, node: Node, parent: NodeId) -> NodeId {
        let depth = self.entry(parent).depth + 1;
        self.insert(node, Some(parent), depth)
    }

    fn insert(&mut self, node: Node, parent: Option<NodeId>, depth: u32) -> NodeId {
        let id = NodeId(self.entries.len() as u32);
        self.entries.push(ArenaEntry {
            node,
            parent,
            depth,
        });
        id
    }

    fn entry(&self, id: NodeId) -> &ArenaEntry {
        &self.entries[id.0 as usize]
    }

    pub fn node(&self, id: NodeId) -> Node {
        self.entry(id).node
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.entry(id).parent
    }

    /// Number of nodes on the path from the root to `id`, inclusive.
    pub fn depth(&self, id: NodeId) -> usize {
        self.entry(id).depth as usize
    }

    /// Whether `node` (polarity included) appears on the path from the root
    /// to `id`, `id` itself included.
    pub fn is_ancestor(&self, id: NodeId, node: &Node) -> bool {
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            let entry = self.entry(current);
            if entry.node == *node {
                return true;
            }
            cursor = entry.parent;
        }
        false
    }

    /// Nodes from the root to `id`, root first.
    pub fn path(&self, id: NodeId) -> Vec<Node> {
        let mut nodes = Vec::with_capacity(self.depth(id));
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            let entry = self.entry(current);
            nodes.push(entry.node);
            cursor = entry.parent;
        }
        nodes.reverse();
        nodes
    }

    /// Ancestry-aware equality: both nodes and their whole parent chains match.
    pub fn chain_eq(&self, a: NodeId, b: NodeId) -> bool {
        let (mut x, mut y) = (Some(a), Some(b));
        loop {
            match (x, y) {
                (None, None) => return true,
                (Some(i), Some(j)) => {
                    if i == j {
                        return true;
                    }
                    let (ei, ej) = (self.entry(i), self.entry(j));
                    if ei.node != ej.node {
                        return false;
                    }
                    x = ei.parent;
                    y = ej.parent;
                }
                _ => return false,
            }
        }
    }
}
