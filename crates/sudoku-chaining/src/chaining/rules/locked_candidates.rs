//! Locked-candidate links: grouped nodes over box-line intersections.
//!
//! A line splits into three box segments; a box splits into three row
//! segments and three column segments. A segment holding the digit in two or
//! more cells is a grouped node.

use super::RuleContext;
use crate::bitset::CellSet;
use crate::chaining::link::{LinkDictionary, LinkType};
use crate::chaining::node::NodeSlot;
use crate::error::ChainingError;
use crate::fabric::SECTOR_BOX_BASE;

/// Segment partitions of a house: one for a line, two for a box.
fn partitions(sector: usize) -> Vec<[CellSet; 3]> {
    let house = CellSet::house(sector);
    if sector < SECTOR_BOX_BASE {
        let boxes: Vec<usize> = (SECTOR_BOX_BASE..SECTOR_BOX_BASE + 9)
            .filter(|&b| CellSet::house(b).intersects(house))
            .collect();
        vec![std::array::from_fn(|i| house & CellSet::house(boxes[i]))]
    } else {
        let b = sector - SECTOR_BOX_BASE;
        let (row0, col0) = ((b / 3) * 3, (b % 3) * 3);
        vec![
            std::array::from_fn(|i| house & CellSet::house(row0 + i)),
            std::array::from_fn(|i| house & CellSet::house(9 + col0 + i)),
        ]
    }
}

/// The digit fills exactly two segments of a house, one of them grouped.
pub(super) fn collect_strong(
    ctx: &RuleContext<'_>,
    dict: &mut LinkDictionary,
) -> Result<(), ChainingError> {
    let fab = ctx.fabric;
    for sector in 0..27 {
        let parts = partitions(sector);
        for digit in 1..=9u8 {
            let cands = fab.sector_candidates(sector, digit);
            if cands.count() < 3 {
                continue;
            }
            for partition in &parts {
                let filled: Vec<CellSet> = partition
                    .iter()
                    .map(|&seg| seg & cands)
                    .filter(|seg| !seg.is_empty())
                    .collect();
                if filled.len() != 2 {
                    continue;
                }
                let (a, b) = (filled[0], filled[1]);
                if ctx.allows(LinkType::LockedCandidates, a)
                    && ctx.allows(LinkType::LockedCandidates, b)
                {
                    dict.add(NodeSlot::new(a, digit), NodeSlot::new(b, digit));
                }
            }
        }
    }
    Ok(())
}

/// A grouped segment excludes every other candidate and every disjoint
/// segment of the digit in the same house.
pub(super) fn collect_weak(
    ctx: &RuleContext<'_>,
    dict: &mut LinkDictionary,
) -> Result<(), ChainingError> {
    let fab = ctx.fabric;
    for sector in 0..27 {
        let parts = partitions(sector);
        for digit in 1..=9u8 {
            let cands = fab.sector_candidates(sector, digit);
            if cands.count() < 3 {
                continue;
            }
            let groups: Vec<CellSet> = parts
                .iter()
                .flatten()
                .map(|&seg| seg & cands)
                .filter(|&g| g.count() >= 2 && ctx.allows(LinkType::LockedCandidates, g))
                .collect();
            for (i, &group) in groups.iter().enumerate() {
                let node = NodeSlot::new(group, digit);
                for cell in (cands - group).iter() {
                    dict.add(node, NodeSlot::single(cell, digit));
                }
                for &other in &groups[i + 1..] {
                    if !group.intersects(other) {
                        dict.add(node, NodeSlot::new(other, digit));
                    }
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{assert_sound, collect};
    use super::super::ChainingRule;
    use super::*;
    use crate::chaining::link::LinkOption;
    use crate::fabric::cell_index;
    use crate::grid::{Grid, GridView};
    use crate::options::ChainingOptions;

    /// Row 1 keeps digit 4 only in r1c1, r1c2 (box 1) and r1c8 (box 3).
    fn row_one_grid() -> Grid {
        let mut grid = Grid::empty();
        for col in [2, 3, 4, 5, 6, 8] {
            grid.remove_candidate(cell_index(0, col), 4);
        }
        grid
    }

    #[test]
    fn test_partitions_shape() {
        let row = partitions(0);
        assert_eq!(row.len(), 1);
        assert!(row[0].iter().all(|s| s.count() == 3));
        let block = partitions(SECTOR_BOX_BASE + 4);
        assert_eq!(block.len(), 2);
        assert!(block[0][0].contains(cell_index(3, 3)));
        assert!(block[1][2].contains(cell_index(5, 5)));
    }

    #[test]
    fn test_group_strong_link_in_row() {
        let grid = row_one_grid();
        let (strong, weak) = collect(
            &grid,
            ChainingRule::LockedCandidates,
            &ChainingOptions::default(),
        );
        let group: CellSet = [cell_index(0, 0), cell_index(0, 1)].into_iter().collect();
        let g = NodeSlot::new(group, 4);
        let single = NodeSlot::single(cell_index(0, 7), 4);
        assert!(strong.contains(&g, &single));
        assert!(strong.is_symmetric());

        // Group excludes the rest of box 1 on digit 4
        assert!(weak.contains(&g, &NodeSlot::single(cell_index(1, 2), 4)));
        assert!(!weak.contains(&g, &NodeSlot::single(cell_index(0, 0), 4)));
    }

    #[test]
    fn test_link_option_none_disables_groups() {
        let grid = row_one_grid();
        let options = ChainingOptions::default()
            .with_link_option(LinkType::LockedCandidates, LinkOption::None);
        let (strong, weak) = collect(&grid, ChainingRule::LockedCandidates, &options);
        assert!(strong.is_empty());
        assert!(weak.is_empty());
    }

    #[test]
    fn test_links_sound_on_real_puzzle() {
        let grid = Grid::from_string(
            "530070000600195000098000060800060003400803001700020006060000280000419005000080079",
        )
        .unwrap()
        .with_solution(
            "534678912672195348198342567859761423426853791713924856961537284287419635345286179",
        )
        .unwrap();
        let (strong, weak) = collect(
            &grid,
            ChainingRule::LockedCandidates,
            &ChainingOptions::default(),
        );
        assert!(strong.is_symmetric());
        assert!(weak.is_symmetric());
        assert_sound(&grid.solution().unwrap(), &strong, &weak);
    }
}
