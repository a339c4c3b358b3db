//! Fish links over base and cover lines.
//!
//! Core: n base lines each hold the digit exactly once, so n placements lie
//! in their candidates. n-1 cover lines can absorb at most n-1 of them, so at
//! least one placement sits in the uncovered remainder. A remainder that
//! splits into exactly two nodes gives a strong link between them.

use super::{add_endpoint_weak_links, add_pairs, combinations, split_in_two, RuleContext};
use crate::bitset::CellSet;
use crate::chaining::link::{LinkDictionary, LinkType};
use crate::chaining::node::NodeSlot;
use crate::error::ChainingError;
use crate::fabric::{SECTOR_COL_BASE, SECTOR_ROW_BASE};

/// Strong-link endpoints of every fish remainder that splits in two.
fn fish_links(ctx: &RuleContext<'_>) -> Result<Vec<(NodeSlot, NodeSlot)>, ChainingError> {
    let fab = ctx.fabric;
    let mut pairs = Vec::new();

    for digit in 1..=9u8 {
        ctx.check_cancelled()?;
        let cands = fab.candidate_map(digit);
        for (base_kind, cover_kind) in [
            (SECTOR_ROW_BASE, SECTOR_COL_BASE),
            (SECTOR_COL_BASE, SECTOR_ROW_BASE),
        ] {
            let lines: Vec<usize> = (base_kind..base_kind + 9)
                .filter(|&l| (cands & CellSet::house(l)).count() >= 2)
                .collect();

            for size in 2..=ctx.options.max_fish_size {
                for bases in combinations(&lines, size) {
                    let base_cells = bases
                        .iter()
                        .fold(CellSet::empty(), |acc, &l| acc | (cands & CellSet::house(l)));
                    let cover_lines: Vec<usize> = (cover_kind..cover_kind + 9)
                        .filter(|&c| base_cells.intersects(CellSet::house(c)))
                        .collect();

                    for covers in combinations(&cover_lines, size - 1) {
                        let covered = covers
                            .iter()
                            .fold(CellSet::empty(), |acc, &c| acc | CellSet::house(c));
                        let Some((a, b)) = split_in_two(base_cells - covered) else {
                            continue;
                        };
                        if ctx.allows(LinkType::Fish, a) && ctx.allows(LinkType::Fish, b) {
                            pairs.push((NodeSlot::new(a, digit), NodeSlot::new(b, digit)));
                        }
                    }
                }
            }
        }
    }
    Ok(pairs)
}

pub(super) fn collect_strong(
    ctx: &RuleContext<'_>,
    dict: &mut LinkDictionary,
) -> Result<(), ChainingError> {
    let pairs = fish_links(ctx)?;
    add_pairs(&pairs, dict);
    Ok(())
}

pub(super) fn collect_weak(
    ctx: &RuleContext<'_>,
    dict: &mut LinkDictionary,
) -> Result<(), ChainingError> {
    let pairs = fish_links(ctx)?;
    add_endpoint_weak_links(ctx.fabric, &pairs, dict);
    Ok(())
}
