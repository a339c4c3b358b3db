//! Link families, link-type masks and the strong/weak link dictionaries.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::ops::BitOr;

use serde::{Deserialize, Serialize};

use super::node::{Node, NodeSlot};
use crate::bitset::CellSet;
use crate::error::ChainingError;

/// One family of link-producing rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u16)]
pub enum LinkType {
    SingleDigit = 1,
    SingleCell = 2,
    LockedCandidates = 4,
    AlmostLockedSets = 8,
    Fish = 16,
    Wing = 32,
    Rectangle = 64,
}

impl LinkType {
    pub const ALL: [LinkType; 7] = [
        LinkType::SingleDigit,
        LinkType::SingleCell,
        LinkType::LockedCandidates,
        LinkType::AlmostLockedSets,
        LinkType::Fish,
        LinkType::Wing,
        LinkType::Rectangle,
    ];

    pub const fn bit(self) -> u16 {
        self as u16
    }

    /// Elementary families only look at one house or one cell at a time.
    pub const fn is_elementary(self) -> bool {
        LinkTypes::ELEMENTARY.contains(self)
    }
}

impl fmt::Display for LinkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LinkType::SingleDigit => write!(f, "Single Digit"),
            LinkType::SingleCell => write!(f, "Single Cell"),
            LinkType::LockedCandidates => write!(f, "Locked Candidates"),
            LinkType::AlmostLockedSets => write!(f, "Almost Locked Sets"),
            LinkType::Fish => write!(f, "Fish"),
            LinkType::Wing => write!(f, "Wing"),
            LinkType::Rectangle => write!(f, "Rectangle"),
        }
    }
}

/// A set of [`LinkType`]s.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
pub struct LinkTypes(u16);

impl LinkTypes {
    pub const NONE: LinkTypes = LinkTypes(0);
    pub const ELEMENTARY: LinkTypes = LinkTypes(1 | 2 | 4);
    pub const ADVANCED: LinkTypes = LinkTypes(8 | 16 | 32 | 64);
    pub const ALL: LinkTypes = LinkTypes(0x7F);

    /// Validate raw bits; any bit outside the defined families is rejected.
    pub fn from_bits(bits: u16) -> Result<Self, ChainingError> {
        if bits & !Self::ALL.0 != 0 {
            Err(ChainingError::UndefinedLinkType(bits))
        } else {
            Ok(LinkTypes(bits))
        }
    }

    pub const fn bits(self) -> u16 {
        self.0
    }

    pub const fn contains(self, link_type: LinkType) -> bool {
        self.0 & link_type.bit() != 0
    }

    pub fn insert(&mut self, link_type: LinkType) {
        self.0 |= link_type.bit();
    }

    pub const fn union(self, other: LinkTypes) -> LinkTypes {
        LinkTypes(self.0 | other.0)
    }

    pub const fn difference(self, other: LinkTypes) -> LinkTypes {
        LinkTypes(self.0 & !other.0)
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Families in declaration order.
    pub fn iter(self) -> impl Iterator<Item = LinkType> {
        LinkType::ALL.into_iter().filter(move |t| self.contains(*t))
    }
}

impl fmt::Debug for LinkTypes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl From<LinkType> for LinkTypes {
    fn from(link_type: LinkType) -> Self {
        LinkTypes(link_type.bit())
    }
}

impl TryFrom<u16> for LinkTypes {
    type Error = ChainingError;

    fn try_from(bits: u16) -> Result<Self, Self::Error> {
        LinkTypes::from_bits(bits)
    }
}

impl From<LinkTypes> for u16 {
    fn from(types: LinkTypes) -> u16 {
        types.0
    }
}

impl FromIterator<LinkType> for LinkTypes {
    fn from_iter<I: IntoIterator<Item = LinkType>>(iter: I) -> Self {
        let mut types = LinkTypes::NONE;
        for t in iter {
            types.insert(t);
        }
        types
    }
}

impl BitOr for LinkTypes {
    type Output = LinkTypes;
    fn bitor(self, rhs: LinkTypes) -> LinkTypes {
        self.union(rhs)
    }
}

impl BitOr<LinkType> for LinkTypes {
    type Output = LinkTypes;
    fn bitor(self, rhs: LinkType) -> LinkTypes {
        self.union(rhs.into())
    }
}

/// Which grouped nodes a link family may produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum LinkOption {
    /// Single-cell nodes only.
    None,
    /// Groups confined to one box-line intersection.
    Intersection,
    /// Groups confined to one house.
    House,
    /// Any group.
    #[default]
    All,
}

impl LinkOption {
    /// Whether a node over `cells` is admissible under this option.
    pub fn allows(self, cells: CellSet) -> bool {
        if cells.count() <= 1 {
            return true;
        }
        match self {
            LinkOption::None => false,
            LinkOption::Intersection => cells.is_in_intersection(),
            LinkOption::House => cells.is_in_single_house(),
            LinkOption::All => true,
        }
    }
}

/// Kind of a link between two nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Inference {
    /// At least one endpoint is true.
    Strong,
    /// At most one endpoint is true.
    Weak,
}

impl Inference {
    /// Polarity a neighbor takes when reached through this link.
    pub const fn target_polarity(self) -> bool {
        matches!(self, Inference::Strong)
    }
}

impl fmt::Display for Inference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Inference::Strong => write!(f, "="),
            Inference::Weak => write!(f, "-"),
        }
    }
}

/// Symmetric adjacency of node slots for one [`Inference`] kind.
///
/// Keys and members are polarity-free; the driver assigns polarity when it
/// walks an entry (strong: off to on, weak: on to off).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkDictionary {
    kind: Inference,
    entries: BTreeMap<NodeSlot, BTreeSet<NodeSlot>>,
}

impl LinkDictionary {
    pub fn new(kind: Inference) -> Self {
        LinkDictionary {
            kind,
            entries: BTreeMap::new(),
        }
    }

    pub fn kind(&self) -> Inference {
        self.kind
    }

    /// Record a link in both directions. Returns whether it was new.
    pub fn add(&mut self, a: NodeSlot, b: NodeSlot) -> bool {
        if a == b {
            return false;
        }
        let fresh = self.entries.entry(a).or_default().insert(b);
        self.entries.entry(b).or_default().insert(a);
        fresh
    }

    pub fn contains(&self, a: &NodeSlot, b: &NodeSlot) -> bool {
        self.entries.get(a).is_some_and(|set| set.contains(b))
    }

    /// Linked slots of `slot`, ascending.
    pub fn linked(&self, slot: &NodeSlot) -> impl Iterator<Item = &NodeSlot> {
        self.entries.get(slot).into_iter().flatten()
    }

    /// Nodes implied by `node` through this dictionary.
    ///
    /// Only a node of the matching polarity has successors: an off node for
    /// strong links, an on node for weak links.
    pub fn successors<'a>(&'a self, node: &Node) -> impl Iterator<Item = Node> + 'a {
        let polarity = self.kind.target_polarity();
        let source = if node.is_on != polarity {
            self.entries.get(&node.slot)
        } else {
            None
        };
        source.into_iter().flatten().map(move |&slot| Node {
            slot,
            is_on: polarity,
        })
    }

    /// Union every entry of `other` into `self`.
    pub fn merge(&mut self, other: LinkDictionary) {
        debug_assert_eq!(self.kind, other.kind);
        for (key, members) in other.entries {
            self.entries.entry(key).or_default().extend(members);
        }
    }

    /// Number of directed entries (each link counts twice).
    pub fn len(&self) -> usize {
        self.entries.values().map(BTreeSet::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of slots with at least one link.
    pub fn key_count(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&NodeSlot, &BTreeSet<NodeSlot>)> {
        self.entries.iter()
    }

    /// Whether every entry has its mirror entry.
    pub fn is_symmetric(&self) -> bool {
        self.entries
            .iter()
            .all(|(a, members)| members.iter().all(|b| self.contains(b, a)))
    }

    /// Whether every entry of `other` is present in `self`.
    pub fn is_superset_of(&self, other: &LinkDictionary) -> bool {
        other
            .entries
            .iter()
            .all(|(a, members)| members.iter().all(|b| self.contains(a, b)))
    }
}
