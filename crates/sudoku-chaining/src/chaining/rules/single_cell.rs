//! Single-cell (Y) links between the candidates of one cell.

use super::RuleContext;
use crate::chaining::link::LinkDictionary;
use crate::chaining::node::NodeSlot;
use crate::error::ChainingError;

/// A bivalue cell holds one of its two digits: strong link between them.
pub(super) fn collect_strong(
    ctx: &RuleContext<'_>,
    dict: &mut LinkDictionary,
) -> Result<(), ChainingError> {
    let fab = ctx.fabric;
    for cell in fab.bivalue.iter() {
        let cands = fab.cell_cands[cell];
        if let Some(x) = cands.first() {
            if let Some(y) = cands.next_after(x) {
                dict.add(NodeSlot::single(cell, x), NodeSlot::single(cell, y));
            }
        }
    }
    Ok(())
}

/// Any two candidates of one cell exclude each other.
pub(super) fn collect_weak(
    ctx: &RuleContext<'_>,
    dict: &mut LinkDictionary,
) -> Result<(), ChainingError> {
    let fab = ctx.fabric;
    for cell in fab.empty.iter() {
        for pair in fab.cell_cands[cell].subsets(2) {
            let mut digits = pair.iter();
            if let (Some(x), Some(y)) = (digits.next(), digits.next()) {
                dict.add(NodeSlot::single(cell, x), NodeSlot::single(cell, y));
            }
        }
    }
    Ok(())
}
