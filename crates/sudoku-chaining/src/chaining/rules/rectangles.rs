//! Uniqueness-based rectangle links.
//!
//! These rely on the uniqueness assumption (puzzle has exactly one solution).
//! Four empty cells over two rows, two columns and two boxes that all hold
//! digits {x,y} cannot all resolve to x or y, so some extra digit must be
//! true in the roof cells.

use super::{add_endpoint_weak_links, add_pairs, RuleContext};
use crate::bitset::{BitSet, CellSet};
use crate::chaining::link::{LinkDictionary, LinkType};
use crate::chaining::node::NodeSlot;
use crate::error::ChainingError;
use crate::fabric::{box_of, cell_index, SECTOR_COL_BASE, SECTOR_ROW_BASE};

/// Split the roof's z-cells into a row pair or a column pair of nodes.
fn split_roof(cells: CellSet, rows: [usize; 2], cols: [usize; 2]) -> Option<(CellSet, CellSet)> {
    let by_rows = rows.map(|r| cells & CellSet::house(SECTOR_ROW_BASE + r));
    if by_rows.iter().all(|p| !p.is_empty()) {
        return Some((by_rows[0], by_rows[1]));
    }
    let by_cols = cols.map(|c| cells & CellSet::house(SECTOR_COL_BASE + c));
    if by_cols.iter().all(|p| !p.is_empty()) {
        return Some((by_cols[0], by_cols[1]));
    }
    None
}

fn rectangle_links(ctx: &RuleContext<'_>) -> Result<Vec<(NodeSlot, NodeSlot)>, ChainingError> {
    let fab = ctx.fabric;
    let mut pairs = Vec::new();

    for r1 in 0..9 {
        ctx.check_cancelled()?;
        for r2 in (r1 + 1)..9 {
            for c1 in 0..9 {
                for c2 in (c1 + 1)..9 {
                    let corners = [
                        cell_index(r1, c1),
                        cell_index(r1, c2),
                        cell_index(r2, c1),
                        cell_index(r2, c2),
                    ];
                    if corners.iter().any(|&c| !fab.empty.contains(c)) {
                        continue;
                    }
                    let mut boxes: Vec<usize> = corners.iter().map(|&c| box_of(c)).collect();
                    boxes.sort_unstable();
                    boxes.dedup();
                    if boxes.len() != 2 {
                        continue;
                    }

                    let cands = corners.map(|c| fab.cell_cands[c]);
                    let common = cands
                        .iter()
                        .fold(BitSet::all_9(), |acc, c| acc.intersection(c));
                    let union = cands.iter().fold(BitSet::empty(), |acc, c| acc.union(c));

                    for floor in common.subsets(2) {
                        let extras = union.difference(&floor);
                        let holding = |d: u8| -> CellSet {
                            corners
                                .iter()
                                .copied()
                                .filter(|&c| fab.cell_cands[c].contains(d))
                                .collect()
                        };
                        match extras.count() {
                            1 => {
                                let Some(z) = extras.first() else { continue };
                                let Some((a, b)) = split_roof(holding(z), [r1, r2], [c1, c2])
                                else {
                                    continue;
                                };
                                if ctx.allows(LinkType::Rectangle, a)
                                    && ctx.allows(LinkType::Rectangle, b)
                                {
                                    pairs.push((NodeSlot::new(a, z), NodeSlot::new(b, z)));
                                }
                            }
                            2 => {
                                let mut it = extras.iter();
                                let (Some(z1), Some(z2)) = (it.next(), it.next()) else {
                                    continue;
                                };
                                let (a, b) = (holding(z1), holding(z2));
                                if a.is_in_single_house()
                                    && b.is_in_single_house()
                                    && ctx.allows(LinkType::Rectangle, a)
                                    && ctx.allows(LinkType::Rectangle, b)
                                {
                                    pairs.push((NodeSlot::new(a, z1), NodeSlot::new(b, z2)));
                                }
                            }
                            _ => {}
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
    let pairs = rectangle_links(ctx)?;
    add_pairs(&pairs, dict);
    Ok(())
}

pub(super) fn collect_weak(
    ctx: &RuleContext<'_>,
    dict: &mut LinkDictionary,
) -> Result<(), ChainingError> {
    let pairs = rectangle_links(ctx)?;
    add_endpoint_weak_links(ctx.fabric, &pairs, dict);
    Ok(())
}
