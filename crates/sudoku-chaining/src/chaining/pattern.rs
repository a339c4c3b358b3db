//! Chain and loop patterns produced by the driver.
//!
//! A [`ChainPattern::Chain`] is a discontinuous nice loop: its nodes run from
//! the start claim to the start's negation. A [`ChainPattern::Loop`] is a
//! continuous nice loop whose closing link, from the last node back to the
//! first, is strong and not stored twice.

use std::collections::BTreeSet;
use std::fmt;

use super::link::Inference;
use super::node::{Node, NodeSlot};
use crate::bitset::CellSet;
use crate::fabric::CandidateFabric;
use crate::step::Conclusion;

/// How a discontinuous chain closes on its start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ChainKind {
    /// Start off implies start on: the start is true.
    StrongClosure,
    /// Start on implies start off: the start is false.
    WeakClosure,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ChainPattern {
    Chain { nodes: Vec<Node>, kind: ChainKind },
    Loop { nodes: Vec<Node> },
}

impl ChainPattern {
    pub fn chain(nodes: Vec<Node>, kind: ChainKind) -> Self {
        let pattern = ChainPattern::Chain { nodes, kind };
        debug_assert!(pattern.is_alternating(), "non-alternating chain {}", pattern);
        pattern
    }

    pub fn cycle(nodes: Vec<Node>) -> Self {
        debug_assert!(nodes.len() >= 4 && nodes.len() % 2 == 0);
        let pattern = ChainPattern::Loop { nodes };
        debug_assert!(pattern.is_alternating(), "non-alternating loop {}", pattern);
        pattern
    }

    /// Nodes in traversal order.
    pub fn nodes(&self) -> &[Node] {
        match self {
            ChainPattern::Chain { nodes, .. } | ChainPattern::Loop { nodes } => nodes,
        }
    }

    pub fn len(&self) -> usize {
        self.nodes().len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes().is_empty()
    }

    pub fn is_loop(&self) -> bool {
        matches!(self, ChainPattern::Loop { .. })
    }

    pub fn kind(&self) -> Option<ChainKind> {
        match self {
            ChainPattern::Chain { kind, .. } => Some(*kind),
            ChainPattern::Loop { .. } => None,
        }
    }

    /// Link kinds between consecutive nodes; a loop includes its closing link.
    ///
    /// Reaching an on node takes a strong link, reaching an off node a weak one.
    pub fn links(&self) -> Vec<Inference> {
        let nodes = self.nodes();
        let mut links: Vec<Inference> = nodes.windows(2).map(|w| link_into(&w[1])).collect();
        if self.is_loop() {
            if let Some(first) = nodes.first() {
                links.push(link_into(first));
            }
        }
        links
    }

    /// Whether strong and weak links strictly alternate, closing link included.
    pub fn is_alternating(&self) -> bool {
        let links = self.links();
        let open_ok = links.windows(2).all(|w| w[0] != w[1]);
        match self {
            ChainPattern::Chain { .. } => !links.is_empty() && open_ok,
            ChainPattern::Loop { .. } => {
                open_ok && links.len() % 2 == 0 && links.first() != links.last()
            }
        }
    }

    /// Distinct slots in ascending order.
    pub fn slots(&self) -> Vec<NodeSlot> {
        let set: BTreeSet<NodeSlot> = self.nodes().iter().map(|n| n.slot).collect();
        set.into_iter().collect()
    }

    /// Every node uses one digit.
    pub fn is_x(&self) -> bool {
        self.digits().len() == 1
    }

    pub fn is_grouped(&self) -> bool {
        self.nodes().iter().any(|n| n.slot.is_grouped())
    }

    /// Distinct digits, ascending.
    pub fn digits(&self) -> Vec<u8> {
        let set: BTreeSet<u8> = self.nodes().iter().map(Node::digit).collect();
        set.into_iter().collect()
    }

    /// Whether `slot` appears in the pattern with either polarity.
    pub fn contains(&self, slot: &NodeSlot) -> bool {
        self.nodes().iter().any(|n| n.slot == *slot)
    }

    /// Union of all cells touched by the pattern.
    pub fn cells(&self) -> CellSet {
        self.nodes()
            .iter()
            .fold(CellSet::empty(), |acc, n| acc | n.cells())
    }

    /// Placements and eliminations proven by the pattern, sorted.
    pub fn conclusions(&self, fabric: &CandidateFabric) -> Vec<Conclusion> {
        let mut found = BTreeSet::new();
        match self {
            ChainPattern::Chain { nodes, kind } => {
                let Some(start) = nodes.first() else {
                    return Vec::new();
                };
                let slot = start.slot;
                match (kind, slot.cell()) {
                    (ChainKind::StrongClosure, Some(cell)) => {
                        found.insert(Conclusion::Placement {
                            cell,
                            digit: slot.digit,
                        });
                    }
                    (ChainKind::StrongClosure, None) => {
                        let targets =
                            slot.cells.peer_intersection() & fabric.candidate_map(slot.digit);
                        for cell in targets.iter() {
                            found.insert(Conclusion::Elimination {
                                cell,
                                digit: slot.digit,
                            });
                        }
                    }
                    (ChainKind::WeakClosure, _) => {
                        for cell in (slot.cells & fabric.candidate_map(slot.digit)).iter() {
                            found.insert(Conclusion::Elimination {
                                cell,
                                digit: slot.digit,
                            });
                        }
                    }
                }
            }
            ChainPattern::Loop { .. } => {
                for (a, b) in self.weak_pairs() {
                    loop_eliminations(fabric, &a, &b, &mut found);
                }
            }
        }
        found.into_iter().collect()
    }

    /// Endpoints of every weak link, closing link included.
    fn weak_pairs(&self) -> Vec<(NodeSlot, NodeSlot)> {
        let nodes = self.nodes();
        let n = nodes.len();
        let pair_count = if self.is_loop() { n } else { n.saturating_sub(1) };
        (0..pair_count)
            .filter_map(|i| {
                let (a, b) = (nodes[i], nodes[(i + 1) % n]);
                (!b.is_on).then_some((a.slot, b.slot))
            })
            .collect()
    }
}

/// Reaching `to` uses a strong link when it is on, a weak link otherwise.
fn link_into(to: &Node) -> Inference {
    if to.is_on {
        Inference::Strong
    } else {
        Inference::Weak
    }
}

/// A weak link inside a continuous loop holds as a strong link too.
fn loop_eliminations(
    fabric: &CandidateFabric,
    a: &NodeSlot,
    b: &NodeSlot,
    found: &mut BTreeSet<Conclusion>,
) {
    let mut eliminate = |cell: usize, digit: u8| {
        if fabric.has_cand(cell, digit) {
            found.insert(Conclusion::Elimination { cell, digit });
        }
    };

    if a.digit == b.digit {
        let seen = (a.cells | b.cells).peer_intersection() & fabric.candidate_map(a.digit);
        for cell in seen.iter() {
            eliminate(cell, a.digit);
        }
        return;
    }

    match (a.cell(), b.cell()) {
        (Some(c1), Some(c2)) if c1 == c2 => {
            for digit in fabric.cell_cands[c1].iter() {
                if digit != a.digit && digit != b.digit {
                    eliminate(c1, digit);
                }
            }
        }
        (Some(c1), Some(c2)) if fabric.sees(c1, c2) => {
            eliminate(c1, b.digit);
            eliminate(c2, a.digit);
        }
        _ => {}
    }
}

impl fmt::Display for ChainPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let nodes = self.nodes();
        let links = self.links();
        for (i, node) in nodes.iter().enumerate() {
            if i > 0 {
                write!(f, " {} ", links[i - 1])?;
            }
            write!(f, "{}", node.slot)?;
        }
        if let (true, Some(first), Some(last)) = (self.is_loop(), nodes.first(), links.last()) {
            write!(f, " {} {}", last, first.slot)?;
        }
        Ok(())
    }
}
