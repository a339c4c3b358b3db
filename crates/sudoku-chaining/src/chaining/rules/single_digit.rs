//! Single-digit (X) links: conjugate pairs and same-house exclusions.

use super::RuleContext;
use crate::chaining::link::LinkDictionary;
use crate::chaining::node::NodeSlot;
use crate::error::ChainingError;

/// Exactly two cells of a house hold the digit: strong link between them.
pub(super) fn collect_strong(
    ctx: &RuleContext<'_>,
    dict: &mut LinkDictionary,
) -> Result<(), ChainingError> {
    let fab = ctx.fabric;
    for digit in 1..=9u8 {
        for sector in 0..27 {
            let cells = fab.sector_candidates(sector, digit);
            if cells.count() != 2 {
                continue;
            }
            let mut it = cells.iter();
            if let (Some(a), Some(b)) = (it.next(), it.next()) {
                dict.add(NodeSlot::single(a, digit), NodeSlot::single(b, digit));
            }
        }
    }
    Ok(())
}

/// Any two cells of a house holding the digit exclude each other.
pub(super) fn collect_weak(
    ctx: &RuleContext<'_>,
    dict: &mut LinkDictionary,
) -> Result<(), ChainingError> {
    let fab = ctx.fabric;
    for digit in 1..=9u8 {
        for sector in 0..27 {
            let cells: Vec<usize> = fab.sector_cells_with_candidate(sector, digit);
            for i in 0..cells.len() {
                for j in (i + 1)..cells.len() {
                    dict.add(
                        NodeSlot::single(cells[i], digit),
                        NodeSlot::single(cells[j], digit),
                    );
                }
            }
        }
    }
    Ok(())
}
