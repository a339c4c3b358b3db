//! Almost-locked-set links.
//!
//! An ALS is N empty cells of one house holding N+1 digits. For any two of
//! its digits x and y, at least one of "x in the ALS" and "y in the ALS" is
//! true, which links the x-cells group strongly to the y-cells group.

use std::collections::HashSet;

use super::{add_endpoint_weak_links, add_pairs, RuleContext};
use crate::bitset::{BitSet, CellSet};
use crate::chaining::link::{LinkDictionary, LinkType};
use crate::chaining::node::NodeSlot;
use crate::error::ChainingError;

/// An Almost Locked Set: N cells with N+1 candidates in a single house.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Als {
    pub cells: CellSet,
    pub candidates: BitSet,
}

/// Enumerate every ALS of 2..=`max_als_size` cells, each cell set once.
pub(crate) fn enumerate_als(ctx: &RuleContext<'_>) -> Result<Vec<Als>, ChainingError> {
    let fab = ctx.fabric;
    let max_size = ctx.options.max_als_size;
    let mut seen: HashSet<CellSet> = HashSet::new();
    let mut result = Vec::new();

    for sector in 0..27 {
        ctx.check_cancelled()?;
        let empty: Vec<usize> = (CellSet::house(sector) & fab.empty).iter().collect();

        // Gosper's hack over n-bit subsets of the house's empty cells
        for n in 2..=empty.len().min(max_size) {
            let mask_limit = 1u32 << empty.len();
            let mut set = (1u32 << n) - 1;
            while set < mask_limit {
                let mut cells = CellSet::empty();
                let mut union = BitSet::empty();
                for (bit, &cell) in empty.iter().enumerate() {
                    if set & (1 << bit) != 0 {
                        cells.insert(cell);
                        union = union.union(&fab.cell_cands[cell]);
                    }
                }

                if union.count() == (n + 1) as u32 && seen.insert(cells) {
                    result.push(Als {
                        cells,
                        candidates: union,
                    });
                }

                let c = set & set.wrapping_neg();
                let r = set + c;
                set = (((r ^ set) >> 2) / c) | r;
            }
        }
    }
    Ok(result)
}

/// Strong-link endpoints of every ALS digit pair.
fn als_links(ctx: &RuleContext<'_>) -> Result<Vec<(NodeSlot, NodeSlot)>, ChainingError> {
    let fab = ctx.fabric;
    let mut pairs = Vec::new();
    for als in enumerate_als(ctx)? {
        for pair in als.candidates.subsets(2) {
            let mut digits = pair.iter();
            let (Some(x), Some(y)) = (digits.next(), digits.next()) else {
                continue;
            };
            let xs = als.cells & fab.candidate_map(x);
            let ys = als.cells & fab.candidate_map(y);
            if ctx.allows(LinkType::AlmostLockedSets, xs)
                && ctx.allows(LinkType::AlmostLockedSets, ys)
            {
                pairs.push((NodeSlot::new(xs, x), NodeSlot::new(ys, y)));
            }
        }
    }
    Ok(pairs)
}

pub(super) fn collect_strong(
    ctx: &RuleContext<'_>,
    dict: &mut LinkDictionary,
) -> Result<(), ChainingError> {
    let pairs = als_links(ctx)?;
    add_pairs(&pairs, dict);
    Ok(())
}

pub(super) fn collect_weak(
    ctx: &RuleContext<'_>,
    dict: &mut LinkDictionary,
) -> Result<(), ChainingError> {
    let pairs = als_links(ctx)?;
    add_endpoint_weak_links(ctx.fabric, &pairs, dict);
    Ok(())
}
