//! Relaxed pattern equality.
//!
//! Two patterns are the same result when they are the same variant (a loop,
//! or a chain with the same closure) over the same set of slots. Traversal
//! direction, start point and node polarity do not matter.

use std::hash::{Hash, Hasher};

use super::node::NodeSlot;
use super::pattern::{ChainKind, ChainPattern};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Shape {
    Chain(ChainKind),
    Loop,
}

/// A [`ChainPattern`] compared by variant and slot set only.
#[derive(Debug, Clone)]
pub struct RelaxedPattern {
    pattern: ChainPattern,
    shape: Shape,
    key: Vec<NodeSlot>,
}

impl RelaxedPattern {
    pub fn new(pattern: ChainPattern) -> Self {
        let shape = match pattern.kind() {
            Some(kind) => Shape::Chain(kind),
            None => Shape::Loop,
        };
        let key = pattern.slots();
        RelaxedPattern {
            pattern,
            shape,
            key,
        }
    }

    pub fn pattern(&self) -> &ChainPattern {
        &self.pattern
    }

    pub fn into_inner(self) -> ChainPattern {
        self.pattern
    }
}

impl From<ChainPattern> for RelaxedPattern {
    fn from(pattern: ChainPattern) -> Self {
        RelaxedPattern::new(pattern)
    }
}

impl PartialEq for RelaxedPattern {
    fn eq(&self, other: &Self) -> bool {
        self.shape == other.shape && self.key == other.key
    }
}

impl Eq for RelaxedPattern {}

impl Hash for RelaxedPattern {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.shape.hash(state);
        self.key.hash(state);
    }
}
