//! CandidateFabric: derived, dual-indexed candidate state built from a grid view.
//!
//! Answers "which cells of house H can hold digit d?", "which cells are
//! bivalue?" and "do these two cells see each other?" in O(1). Every chaining
//! rule and searcher reads `&CandidateFabric`; nothing writes it after
//! construction.

use crate::bitset::{BitSet, CellSet};
use crate::grid::GridView;

/// House index convention: 0..8 = rows, 9..17 = columns, 18..26 = boxes.
pub const SECTOR_ROW_BASE: usize = 0;
pub const SECTOR_COL_BASE: usize = 9;
pub const SECTOR_BOX_BASE: usize = 18;

/// Convert (row, col) to linear cell index
#[inline]
pub fn cell_index(row: usize, col: usize) -> usize {
    row * 9 + col
}

/// Convert linear cell index back to (row, col)
#[inline]
pub fn cell_pos(idx: usize) -> (usize, usize) {
    (idx / 9, idx % 9)
}

/// Box (0..8) containing a cell
#[inline]
pub fn box_of(idx: usize) -> usize {
    let (r, c) = cell_pos(idx);
    (r / 3) * 3 + c / 3
}

/// 1-based `r{row}c{col}` name of a cell
pub fn cell_name(idx: usize) -> String {
    let (r, c) = cell_pos(idx);
    format!("r{}c{}", r + 1, c + 1)
}

/// Long-form house name for explanations.
pub fn sector_name(sector: usize) -> String {
    if sector < SECTOR_COL_BASE {
        format!("row {}", sector + 1)
    } else if sector < SECTOR_BOX_BASE {
        format!("column {}", sector - SECTOR_COL_BASE + 1)
    } else {
        format!("box {}", sector - SECTOR_BOX_BASE + 1)
    }
}

/// Get the 9 cell indices belonging to a sector
pub fn sector_cells(sector: usize) -> [usize; 9] {
    if sector < SECTOR_COL_BASE {
        let row = sector;
        std::array::from_fn(|col| cell_index(row, col))
    } else if sector < SECTOR_BOX_BASE {
        let col = sector - SECTOR_COL_BASE;
        std::array::from_fn(|row| cell_index(row, col))
    } else {
        let box_idx = sector - SECTOR_BOX_BASE;
        let box_row = (box_idx / 3) * 3;
        let box_col = (box_idx % 3) * 3;
        std::array::from_fn(|i| cell_index(box_row + i / 3, box_col + i % 3))
    }
}

/// Which 3 sectors a cell belongs to: [row_sector, col_sector, box_sector]
#[inline]
pub fn cell_sectors(idx: usize) -> [usize; 3] {
    let (row, col) = cell_pos(idx);
    [
        SECTOR_ROW_BASE + row,
        SECTOR_COL_BASE + col,
        SECTOR_BOX_BASE + box_of(idx),
    ]
}

/// Dual-indexed candidate state, built once per analysis from a grid view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateFabric {
    /// Per-cell candidates (empty for filled cells)
    pub cell_cands: [BitSet; 81],
    /// Placed values (None if empty)
    pub values: [Option<u8>; 81],
    /// digit_cells[digit-1] = cells holding `digit` as a candidate
    pub digit_cells: [CellSet; 9],
    /// value_cells[digit-1] = cells already filled with `digit`
    pub value_cells: [CellSet; 9],
    /// Empty cells
    pub empty: CellSet,
    /// Empty cells with exactly two candidates
    pub bivalue: CellSet,
    /// Known solution, when the grid view supplies one
    pub solution: Option<[u8; 81]>,
}

impl CandidateFabric {
    /// Build the fabric from a grid snapshot.
    pub fn from_grid<G: GridView + ?Sized>(grid: &G) -> Self {
        let empty = grid.empty_cells();
        CandidateFabric {
            cell_cands: std::array::from_fn(|idx| {
                if empty.contains(idx) {
                    grid.candidates(idx)
                } else {
                    BitSet::empty()
                }
            }),
            values: std::array::from_fn(|idx| grid.value(idx)),
            digit_cells: std::array::from_fn(|d| grid.candidate_map(d as u8 + 1)),
            value_cells: std::array::from_fn(|d| grid.value_map(d as u8 + 1)),
            empty,
            bivalue: grid.bivalue_cells(),
            solution: grid.solution(),
        }
    }

    /// Check if two cells see each other (same row, col, or box)
    #[inline]
    pub fn sees(&self, a: usize, b: usize) -> bool {
        CellSet::peers(a).contains(b)
    }

    /// Check if cell has candidate
    #[inline]
    pub fn has_cand(&self, idx: usize, digit: u8) -> bool {
        self.cell_cands[idx].contains(digit)
    }

    /// Cells holding `digit` as a candidate.
    #[inline]
    pub fn candidate_map(&self, digit: u8) -> CellSet {
        self.digit_cells[(digit - 1) as usize]
    }

    /// Cells of `sector` that have `digit` as a candidate.
    #[inline]
    pub fn sector_candidates(&self, sector: usize, digit: u8) -> CellSet {
        self.candidate_map(digit) & CellSet::house(sector)
    }

    /// Same as [`sector_candidates`](Self::sector_candidates), as a list of cell indices.
    pub fn sector_cells_with_candidate(&self, sector: usize, digit: u8) -> Vec<usize> {
        self.sector_candidates(sector, digit).iter().collect()
    }

    /// Get candidate count for digit in sector
    #[inline]
    pub fn sector_cand_count(&self, sector: usize, digit: u8) -> u32 {
        self.sector_candidates(sector, digit).count()
    }

    /// Number of empty cells
    #[inline]
    pub fn empty_count(&self) -> usize {
        self.empty.count() as usize
    }

    /// Whether every cell holds a value.
    pub fn is_solved(&self) -> bool {
        self.empty.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Grid;

    const PUZZLE: &str =
        "530070000600195000098000060800060003400803001700020006060000280000419005000080079";

    #[test]
    fn test_cell_index_roundtrip() {
        for row in 0..9 {
            for col in 0..9 {
                let idx = cell_index(row, col);
                assert_eq!(cell_pos(idx), (row, col));
            }
        }
        assert_eq!(cell_name(cell_index(2, 4)), "r3c5");
    }

    #[test]
    fn test_sector_cells() {
        assert_eq!(sector_cells(0), [0, 1, 2, 3, 4, 5, 6, 7, 8]);
        assert_eq!(sector_cells(9), [0, 9, 18, 27, 36, 45, 54, 63, 72]);
        assert_eq!(sector_cells(18), [0, 1, 2, 9, 10, 11, 18, 19, 20]);
        for sector in 0..27 {
            let set: CellSet = sector_cells(sector).into_iter().collect();
            assert_eq!(set, CellSet::house(sector));
        }
        assert_eq!(cell_sectors(cell_index(4, 7)), [4, 16, 23]);
        assert_eq!(sector_name(20), "box 3");
    }

    #[test]
    fn test_fabric_from_grid() {
        let grid = Grid::from_string(PUZZLE).unwrap();
        let fab = CandidateFabric::from_grid(&grid);

        assert_eq!(fab.values[0], Some(5));
        assert!(fab.value_cells[4].contains(0));

        let idx = cell_index(0, 2);
        assert!(fab.values[idx].is_none());
        assert!(!fab.cell_cands[idx].is_empty());
        assert!(!fab.cell_cands[idx].contains(5));
        assert_eq!(fab.empty_count(), 51);

        for cell in fab.bivalue.iter() {
            assert_eq!(fab.cell_cands[cell].count(), 2);
        }
        for d in 1..=9u8 {
            for cell in fab.candidate_map(d).iter() {
                assert!(fab.has_cand(cell, d));
            }
        }
    }

    /// A view that supplies only values and candidates.
    struct Bare(Grid);

    impl GridView for Bare {
        fn candidates(&self, cell: usize) -> BitSet {
            self.0.candidates(cell)
        }
        fn value(&self, cell: usize) -> Option<u8> {
            self.0.value(cell)
        }
    }

    #[test]
    fn test_fabric_uses_view_maps() {
        let grid = Grid::from_string(PUZZLE).unwrap();
        let fab = CandidateFabric::from_grid(&Bare(grid.clone()));
        assert_eq!(fab.empty, grid.empty_cells());
        assert_eq!(fab.bivalue, grid.bivalue_cells());
        for d in 1..=9u8 {
            assert_eq!(fab.candidate_map(d), grid.candidate_map(d));
            assert_eq!(fab.value_cells[(d - 1) as usize], grid.value_map(d));
        }
        assert_eq!(fab.solution, None);
        assert_eq!(fab.is_solved(), grid.is_solved());
    }

    #[test]
    fn test_sees() {
        let grid = Grid::from_string(PUZZLE).unwrap();
        let fab = CandidateFabric::from_grid(&grid);

        assert!(fab.sees(0, 5));
        assert!(fab.sees(0, 9));
        assert!(fab.sees(0, 10));
        assert!(!fab.sees(0, 40));
        assert!(!fab.sees(0, 0));
    }
}
