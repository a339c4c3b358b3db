//! Bidirectional alternating breadth-first chain search.
//!
//! Every candidate is tried as a start twice, once on and once off. An on
//! node is discharged through weak links and an off node through strong
//! links, so the two pending queues alternate by construction:
//!
//! - `pending_weak` holds on nodes, expanded through the weak dictionary;
//! - `pending_strong` holds off nodes, expanded through the strong dictionary.
//!
//! Reaching the start's negation closes a chain; reaching the on start again
//! through a strong link closes a loop.

use std::collections::{HashSet, VecDeque};

use log::{debug, trace};

use super::cache::AnalysisCache;
use super::dedup::RelaxedPattern;
use super::link::LinkDictionary;
use super::node::{Node, NodeArena, NodeId, NodeSlot};
use super::pattern::{ChainKind, ChainPattern};
use crate::cancel::{self, CancellationToken};
use crate::error::ChainingError;

/// Shortest loop the driver reports, in nodes.
pub const MIN_LOOP_LEN: usize = 4;

/// Reusable search state; one instance runs any number of starts.
pub struct ChainSearch<'a> {
    strong: &'a LinkDictionary,
    weak: &'a LinkDictionary,
    token: Option<&'a CancellationToken>,
    arena: NodeArena,
    pending_strong: VecDeque<NodeId>,
    pending_weak: VecDeque<NodeId>,
    visited_strong: HashSet<NodeSlot>,
    visited_weak: HashSet<NodeSlot>,
    found: HashSet<RelaxedPattern>,
    order: Vec<RelaxedPattern>,
}

impl<'a> ChainSearch<'a> {
    pub fn new(strong: &'a LinkDictionary, weak: &'a LinkDictionary) -> Self {
        ChainSearch {
            strong,
            weak,
            token: None,
            arena: NodeArena::new(),
            pending_strong: VecDeque::new(),
            pending_weak: VecDeque::new(),
            visited_strong: HashSet::new(),
            visited_weak: HashSet::new(),
            found: HashSet::new(),
            order: Vec::new(),
        }
    }

    /// Observe `token` before every node expansion.
    pub fn with_token(mut self, token: &'a CancellationToken) -> Self {
        self.token = Some(token);
        self
    }

    /// Search from `slot` assumed on, then assumed off.
    pub fn search_slot(&mut self, slot: NodeSlot) -> Result<(), ChainingError> {
        self.search_from(Node::on(slot))?;
        self.search_from(Node::off(slot))
    }

    /// One breadth-first run from `start`.
    ///
    /// A cancelled run stops at the next expansion; patterns it already
    /// emitted are kept.
    pub fn search_from(&mut self, start: Node) -> Result<(), ChainingError> {
        self.arena.clear();
        self.pending_strong.clear();
        self.pending_weak.clear();
        self.visited_strong.clear();
        self.visited_weak.clear();

        let root = self.arena.root(start);
        if start.is_on {
            self.visited_weak.insert(start.slot);
            self.pending_weak.push_back(root);
        } else {
            self.visited_strong.insert(start.slot);
            self.pending_strong.push_back(root);
        }

        let before = self.order.len();
        // One pop per queue per round; both frontiers stay in level order.
        while !self.pending_weak.is_empty() || !self.pending_strong.is_empty() {
            if let Some(id) = self.pending_weak.pop_front() {
                cancel::check(self.token)?;
                self.expand_weak(start, id);
            }
            if let Some(id) = self.pending_strong.pop_front() {
                cancel::check(self.token)?;
                self.expand_strong(start, id);
            }
        }
        trace!(
            "start {}: {} nodes, {} new patterns",
            start,
            self.arena.len(),
            self.order.len() - before
        );
        Ok(())
    }

    fn expand_weak(&mut self, start: Node, id: NodeId) {
        let current = self.arena.node(id);
        let weak = self.weak;
        for next in weak.successors(&current) {
            if next == !start {
                let nodes = self.path_to(id, next);
                self.emit(ChainPattern::chain(nodes, ChainKind::WeakClosure));
            } else if !self.arena.is_ancestor(id, &next) && self.visited_strong.insert(next.slot)
            {
                let child = self.arena.push(next, id);
                self.pending_strong.push_back(child);
            }
        }
    }

    fn expand_strong(&mut self, start: Node, id: NodeId) {
        let current = self.arena.node(id);
        let strong = self.strong;
        for next in strong.successors(&current) {
            if next == !start {
                let nodes = self.path_to(id, next);
                self.emit(ChainPattern::chain(nodes, ChainKind::StrongClosure));
            } else if next == start {
                if self.arena.depth(id) >= MIN_LOOP_LEN {
                    let nodes = self.arena.path(id);
                    self.emit(ChainPattern::cycle(nodes));
                }
            } else if !self.arena.is_ancestor(id, &next) && self.visited_weak.insert(next.slot) {
                let child = self.arena.push(next, id);
                self.pending_weak.push_back(child);
            }
        }
    }

    fn path_to(&self, id: NodeId, last: Node) -> Vec<Node> {
        let mut nodes = self.arena.path(id);
        nodes.push(last);
        nodes
    }

    fn emit(&mut self, pattern: ChainPattern) {
        let relaxed = RelaxedPattern::new(pattern);
        if self.found.insert(relaxed.clone()) {
            self.order.push(relaxed);
        }
    }

    /// Distinct patterns found so far, sorted by length, then by nodes.
    pub fn into_patterns(self) -> Vec<ChainPattern> {
        let mut patterns: Vec<ChainPattern> = self
            .order
            .into_iter()
            .map(RelaxedPattern::into_inner)
            .collect();
        patterns.sort_by(|a, b| a.len().cmp(&b.len()).then_with(|| a.cmp(b)));
        patterns
    }
}

/// Run the search from every slot in `starts` over the given dictionaries.
pub fn find_patterns(
    strong: &LinkDictionary,
    weak: &LinkDictionary,
    starts: impl IntoIterator<Item = NodeSlot>,
    token: Option<&CancellationToken>,
) -> Result<Vec<ChainPattern>, ChainingError> {
    let mut search = ChainSearch::new(strong, weak);
    if let Some(token) = token {
        search = search.with_token(token);
    }
    let mut start_count = 0usize;
    for slot in starts {
        cancel::check(token)?;
        search.search_slot(slot)?;
        start_count += 1;
    }
    let patterns = search.into_patterns();
    debug!(
        "chain search: {} starts, {} distinct patterns",
        start_count,
        patterns.len()
    );
    Ok(patterns)
}

/// Search every candidate of every empty cell against the cached links.
pub fn search_cached(
    cache: &AnalysisCache,
    token: Option<&CancellationToken>,
) -> Result<Vec<ChainPattern>, ChainingError> {
    let fabric = cache.fabric();
    let starts = fabric.empty.iter().flat_map(|cell| {
        fabric.cell_cands[cell]
            .iter()
            .map(move |digit| NodeSlot::single(cell, digit))
    });
    find_patterns(cache.strong_links(), cache.weak_links(), starts, token)
}
