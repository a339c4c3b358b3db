//! Wing links: XY-Wing, XYZ-Wing and W-Wing pincers.
//!
//! Each wing proves that at least one of its two pincer claims holds, which
//! is recorded as a strong link between them.

use super::{add_endpoint_weak_links, add_pairs, RuleContext};
use crate::bitset::{BitSet, CellSet};
use crate::chaining::link::{LinkDictionary, LinkType};
use crate::chaining::node::NodeSlot;
use crate::error::ChainingError;
use crate::fabric::CandidateFabric;

/// The two digits of a bivalue cell.
fn pair_of(cands: BitSet) -> Option<(u8, u8)> {
    let x = cands.first()?;
    let y = cands.next_after(x)?;
    Some((x, y))
}

/// XY-Wing: pivot {x,y}, pincers {x,z} and {y,z} both seeing the pivot.
fn xy_wings(fab: &CandidateFabric, pairs: &mut Vec<(NodeSlot, NodeSlot)>) {
    let bivalues: Vec<usize> = fab.bivalue.iter().collect();
    for &pivot in &bivalues {
        let pc = fab.cell_cands[pivot];
        let Some((x, y)) = pair_of(pc) else { continue };
        for &p1 in &bivalues {
            if p1 == pivot || !fab.sees(pivot, p1) {
                continue;
            }
            let c1 = fab.cell_cands[p1];
            if !c1.contains(x) || c1.contains(y) {
                continue;
            }
            let Some(z) = c1.difference(&pc).first() else {
                continue;
            };
            let want = BitSet::from_slice(&[y, z]);
            for &p2 in &bivalues {
                if p2 == pivot || p2 == p1 || !fab.sees(pivot, p2) {
                    continue;
                }
                if fab.cell_cands[p2] == want {
                    pairs.push((NodeSlot::single(p1, z), NodeSlot::single(p2, z)));
                }
            }
        }
    }
}

/// XYZ-Wing: pivot {x,y,z}, pincers {x,z} and {y,z} both seeing the pivot.
/// Links one pincer's z with z in {pivot, other pincer}.
fn xyz_wings(ctx: &RuleContext<'_>, pairs: &mut Vec<(NodeSlot, NodeSlot)>) {
    let fab = ctx.fabric;
    let bivalues: Vec<usize> = fab.bivalue.iter().collect();
    for pivot in fab.empty.iter() {
        let pc = fab.cell_cands[pivot];
        if pc.count() != 3 {
            continue;
        }
        let pincers: Vec<usize> = bivalues
            .iter()
            .copied()
            .filter(|&c| fab.sees(pivot, c) && fab.cell_cands[c].difference(&pc).is_empty())
            .collect();
        for &p1 in &pincers {
            for &p2 in &pincers {
                let (c1, c2) = (fab.cell_cands[p1], fab.cell_cands[p2]);
                if p1 == p2 || c1 == c2 {
                    continue;
                }
                let Some(z) = c1.intersection(&c2).first() else {
                    continue;
                };
                let group: CellSet = [pivot, p2].into_iter().collect();
                if ctx.allows(LinkType::Wing, group) {
                    pairs.push((NodeSlot::single(p1, z), NodeSlot::new(group, z)));
                }
            }
        }
    }
}

/// W-Wing: two bivalue cells {x,y} bridged by a conjugate pair on x; links
/// their y candidates.
fn w_wings(fab: &CandidateFabric, pairs: &mut Vec<(NodeSlot, NodeSlot)>) {
    let bivalues: Vec<usize> = fab.bivalue.iter().collect();
    for i in 0..bivalues.len() {
        for j in (i + 1)..bivalues.len() {
            let (c1, c2) = (bivalues[i], bivalues[j]);
            if fab.cell_cands[c1] != fab.cell_cands[c2] {
                continue;
            }
            let Some((x, y)) = pair_of(fab.cell_cands[c1]) else {
                continue;
            };

            for &(link_val, other_val) in &[(x, y), (y, x)] {
                let bridged = (0..27).any(|sector| {
                    let link = fab.sector_candidates(sector, link_val);
                    if link.count() != 2 || link.contains(c1) || link.contains(c2) {
                        return false;
                    }
                    let mut it = link.iter();
                    let (Some(l1), Some(l2)) = (it.next(), it.next()) else {
                        return false;
                    };
                    (fab.sees(c1, l1) && fab.sees(c2, l2)) || (fab.sees(c1, l2) && fab.sees(c2, l1))
                });
                if bridged {
                    pairs.push((
                        NodeSlot::single(c1, other_val),
                        NodeSlot::single(c2, other_val),
                    ));
                }
            }
        }
    }
}

fn wing_links(ctx: &RuleContext<'_>) -> Result<Vec<(NodeSlot, NodeSlot)>, ChainingError> {
    let mut pairs = Vec::new();
    xy_wings(ctx.fabric, &mut pairs);
    ctx.check_cancelled()?;
    xyz_wings(ctx, &mut pairs);
    ctx.check_cancelled()?;
    w_wings(ctx.fabric, &mut pairs);
    Ok(pairs)
}

pub(super) fn collect_strong(
    ctx: &RuleContext<'_>,
    dict: &mut LinkDictionary,
) -> Result<(), ChainingError> {
    let pairs = wing_links(ctx)?;
    add_pairs(&pairs, dict);
    Ok(())
}

pub(super) fn collect_weak(
    ctx: &RuleContext<'_>,
    dict: &mut LinkDictionary,
) -> Result<(), ChainingError> {
    let pairs = wing_links(ctx)?;
    add_endpoint_weak_links(ctx.fabric, &pairs, dict);
    Ok(())
}
