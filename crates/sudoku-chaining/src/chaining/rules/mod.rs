//! Chaining rules: one link-producing strategy per [`LinkType`].
//!
//! Each rule reads a [`RuleContext`] and appends entries to a strong or a weak
//! [`LinkDictionary`]. Rules never touch the grid and keep no state, so the
//! closed [`ChainingRule`] enum is the whole dispatch table.
//!
//! Elementary: single digit (X), single cell (Y), locked candidates.
//! Advanced: almost locked sets, fish, wings, rectangles.

mod almost_locked_sets;
mod fish;
mod locked_candidates;
mod rectangles;
mod single_cell;
mod single_digit;
mod wings;

use std::fmt;

use super::link::{LinkDictionary, LinkType, LinkTypes};
use super::node::NodeSlot;
use crate::bitset::CellSet;
use crate::cancel::{self, CancellationToken};
use crate::error::ChainingError;
use crate::fabric::CandidateFabric;
use crate::options::ChainingOptions;

/// Everything a rule may read while collecting links.
#[derive(Clone, Copy)]
pub struct RuleContext<'a> {
    pub fabric: &'a CandidateFabric,
    pub options: &'a ChainingOptions,
    pub token: Option<&'a CancellationToken>,
}

impl<'a> RuleContext<'a> {
    pub fn new(fabric: &'a CandidateFabric, options: &'a ChainingOptions) -> Self {
        RuleContext {
            fabric,
            options,
            token: None,
        }
    }

    pub fn with_token(mut self, token: &'a CancellationToken) -> Self {
        self.token = Some(token);
        self
    }

    pub fn check_cancelled(&self) -> Result<(), ChainingError> {
        cancel::check(self.token)
    }

    /// Whether `link_type` may emit a node over `cells`.
    pub fn allows(&self, link_type: LinkType, cells: CellSet) -> bool {
        !cells.is_empty() && self.options.link_option(link_type).allows(cells)
    }
}

/// A link-producing strategy, keyed by its family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ChainingRule {
    SingleDigit,
    SingleCell,
    LockedCandidates,
    AlmostLockedSets,
    Fish,
    Wing,
    Rectangle,
}

impl ChainingRule {
    pub const ALL: [ChainingRule; 7] = [
        ChainingRule::SingleDigit,
        ChainingRule::SingleCell,
        ChainingRule::LockedCandidates,
        ChainingRule::AlmostLockedSets,
        ChainingRule::Fish,
        ChainingRule::Wing,
        ChainingRule::Rectangle,
    ];

    pub const fn for_link_type(link_type: LinkType) -> Self {
        match link_type {
            LinkType::SingleDigit => ChainingRule::SingleDigit,
            LinkType::SingleCell => ChainingRule::SingleCell,
            LinkType::LockedCandidates => ChainingRule::LockedCandidates,
            LinkType::AlmostLockedSets => ChainingRule::AlmostLockedSets,
            LinkType::Fish => ChainingRule::Fish,
            LinkType::Wing => ChainingRule::Wing,
            LinkType::Rectangle => ChainingRule::Rectangle,
        }
    }

    pub const fn link_type(self) -> LinkType {
        match self {
            ChainingRule::SingleDigit => LinkType::SingleDigit,
            ChainingRule::SingleCell => LinkType::SingleCell,
            ChainingRule::LockedCandidates => LinkType::LockedCandidates,
            ChainingRule::AlmostLockedSets => LinkType::AlmostLockedSets,
            ChainingRule::Fish => LinkType::Fish,
            ChainingRule::Wing => LinkType::Wing,
            ChainingRule::Rectangle => LinkType::Rectangle,
        }
    }

    /// Rules matching every family in `types`, in family order.
    pub fn resolve(types: LinkTypes) -> Vec<ChainingRule> {
        types.iter().map(ChainingRule::for_link_type).collect()
    }

    /// Append this rule's strong links to `dict`.
    pub fn collect_strong_links(
        self,
        ctx: &RuleContext<'_>,
        dict: &mut LinkDictionary,
    ) -> Result<(), ChainingError> {
        match self {
            ChainingRule::SingleDigit => single_digit::collect_strong(ctx, dict),
            ChainingRule::SingleCell => single_cell::collect_strong(ctx, dict),
            ChainingRule::LockedCandidates => locked_candidates::collect_strong(ctx, dict),
            ChainingRule::AlmostLockedSets => almost_locked_sets::collect_strong(ctx, dict),
            ChainingRule::Fish => fish::collect_strong(ctx, dict),
            ChainingRule::Wing => wings::collect_strong(ctx, dict),
            ChainingRule::Rectangle => rectangles::collect_strong(ctx, dict),
        }
    }

    /// Append this rule's weak links to `dict`.
    pub fn collect_weak_links(
        self,
        ctx: &RuleContext<'_>,
        dict: &mut LinkDictionary,
    ) -> Result<(), ChainingError> {
        match self {
            ChainingRule::SingleDigit => single_digit::collect_weak(ctx, dict),
            ChainingRule::SingleCell => single_cell::collect_weak(ctx, dict),
            ChainingRule::LockedCandidates => locked_candidates::collect_weak(ctx, dict),
            ChainingRule::AlmostLockedSets => almost_locked_sets::collect_weak(ctx, dict),
            ChainingRule::Fish => fish::collect_weak(ctx, dict),
            ChainingRule::Wing => wings::collect_weak(ctx, dict),
            ChainingRule::Rectangle => rectangles::collect_weak(ctx, dict),
        }
    }
}

impl fmt::Display for ChainingRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} rule", self.link_type())
    }
}

// ==================== Shared helpers ====================

/// Weak links from a grouped slot to every outside candidate of its digit
/// that sees all of the group's cells.
pub(crate) fn add_group_weak_links(
    fabric: &CandidateFabric,
    slot: NodeSlot,
    dict: &mut LinkDictionary,
) {
    if !slot.is_grouped() {
        return;
    }
    let targets = slot.cells.peer_intersection() & fabric.candidate_map(slot.digit);
    for cell in targets.iter() {
        dict.add(slot, NodeSlot::single(cell, slot.digit));
    }
}

/// Strong links from a list of endpoint pairs.
fn add_pairs(pairs: &[(NodeSlot, NodeSlot)], dict: &mut LinkDictionary) {
    for &(a, b) in pairs {
        dict.add(a, b);
    }
}

/// Weak links for every grouped endpoint in a list of pairs.
fn add_endpoint_weak_links(
    fabric: &CandidateFabric,
    pairs: &[(NodeSlot, NodeSlot)],
    dict: &mut LinkDictionary,
) {
    for &(a, b) in pairs {
        add_group_weak_links(fabric, a, dict);
        add_group_weak_links(fabric, b, dict);
    }
}

/// Split `cells` into exactly two parts by box, row or column, where each part
/// is a single cell or sits inside one box-line intersection.
pub(crate) fn split_in_two(cells: CellSet) -> Option<(CellSet, CellSet)> {
    if cells.count() < 2 {
        return None;
    }
    for base in [18usize, 0, 9] {
        let parts: Vec<CellSet> = (base..base + 9)
            .map(|h| cells & CellSet::house(h))
            .filter(|p| !p.is_empty())
            .collect();
        if parts.len() == 2
            && parts
                .iter()
                .all(|p| p.count() == 1 || p.is_in_intersection())
        {
            return Some((parts[0], parts[1]));
        }
    }
    None
}

fn combinations(items: &[usize], k: usize) -> Vec<Vec<usize>> {
    let mut result = Vec::new();
    if k == 0 || k > items.len() {
        return result;
    }
    let mut indices: Vec<usize> = (0..k).collect();
    loop {
        result.push(indices.iter().map(|&i| items[i]).collect());
        let mut i = k;
        loop {
            if i == 0 {
                return result;
            }
            i -= 1;
            indices[i] += 1;
            if indices[i] <= items.len() - k + i {
                break;
            }
        }
        for j in (i + 1)..k {
            indices[j] = indices[j - 1] + 1;
        }
    }
}
