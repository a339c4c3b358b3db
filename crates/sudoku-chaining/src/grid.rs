//! Read-only grid interface consumed by the engine, plus a small concrete grid.
//!
//! The engine only ever reads a grid through [`GridView`]. [`Grid`] is a
//! minimal implementation used by tests and demos: it parses 81-character
//! strings, keeps pencil-mark candidates, and can carry a known solution.

use std::fmt;

use crate::bitset::{BitSet, CellSet};
use crate::fabric::cell_pos;

/// Read-only view of a Sudoku grid.
pub trait GridView {
    /// Candidate digits of `cell`; empty for filled cells.
    fn candidates(&self, cell: usize) -> BitSet;

    /// Value placed in `cell`, if any.
    fn value(&self, cell: usize) -> Option<u8>;

    /// Known solution of the puzzle, if the view carries one.
    fn solution(&self) -> Option<[u8; 81]> {
        None
    }

    /// Cells holding `digit` as a candidate.
    fn candidate_map(&self, digit: u8) -> CellSet {
        (0..81)
            .filter(|&c| self.value(c).is_none() && self.candidates(c).contains(digit))
            .collect()
    }

    /// Cells filled with `digit`.
    fn value_map(&self, digit: u8) -> CellSet {
        (0..81).filter(|&c| self.value(c) == Some(digit)).collect()
    }

    /// Cells without a value.
    fn empty_cells(&self) -> CellSet {
        (0..81).filter(|&c| self.value(c).is_none()).collect()
    }

    /// Empty cells with exactly two candidates.
    fn bivalue_cells(&self) -> CellSet {
        (0..81)
            .filter(|&c| self.value(c).is_none() && self.candidates(c).count() == 2)
            .collect()
    }

    /// Whether every cell holds a value.
    fn is_solved(&self) -> bool {
        self.empty_cells().is_empty()
    }
}

/// A 9x9 grid of values with pencil-mark candidates.
#[derive(Clone, PartialEq, Eq)]
pub struct Grid {
    values: [Option<u8>; 81],
    candidates: [BitSet; 81],
    solution: Option<[u8; 81]>,
}

impl Default for Grid {
    fn default() -> Self {
        Self::empty()
    }
}

impl Grid {
    /// A grid with no values and every candidate present.
    pub fn empty() -> Self {
        Grid {
            values: [None; 81],
            candidates: [BitSet::all_9(); 81],
            solution: None,
        }
    }

    /// Parse an 81-character puzzle (`1-9` for values, `0` or `.` for empty).
    ///
    /// Candidates are computed from the placed values.
    pub fn from_string(s: &str) -> Option<Self> {
        let values = parse_digits(s)?;
        let mut grid = Grid::empty();
        for (idx, v) in values.into_iter().enumerate() {
            grid.values[idx] = v;
        }
        grid.recalculate_candidates();
        Some(grid)
    }

    /// Attach a known solution (81 digits, no blanks).
    pub fn with_solution(mut self, s: &str) -> Option<Self> {
        let digits = parse_digits(s)?;
        let mut solution = [0u8; 81];
        for (idx, d) in digits.into_iter().enumerate() {
            solution[idx] = d?;
        }
        self.solution = Some(solution);
        Some(self)
    }

    /// Reset every empty cell's candidates to the digits its peers allow.
    pub fn recalculate_candidates(&mut self) {
        for idx in 0..81 {
            if self.values[idx].is_some() {
                self.candidates[idx] = BitSet::empty();
                continue;
            }
            let mut cands = BitSet::all_9();
            for peer in CellSet::peers(idx).iter() {
                if let Some(v) = self.values[peer] {
                    cands.remove(v);
                }
            }
            self.candidates[idx] = cands;
        }
    }

    /// Place `digit` and strike it from the peers' candidates.
    pub fn set_value(&mut self, cell: usize, digit: u8) {
        self.values[cell] = Some(digit);
        self.candidates[cell] = BitSet::empty();
        for peer in CellSet::peers(cell).iter() {
            self.candidates[peer].remove(digit);
        }
    }

    /// Remove one candidate; returns whether it was present.
    pub fn remove_candidate(&mut self, cell: usize, digit: u8) -> bool {
        let present = self.values[cell].is_none() && self.candidates[cell].contains(digit);
        self.candidates[cell].remove(digit);
        present
    }

    /// Overwrite the candidates of an empty cell.
    pub fn set_candidates(&mut self, cell: usize, candidates: BitSet) {
        if self.values[cell].is_none() {
            self.candidates[cell] = candidates;
        }
    }

    pub fn empty_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_none()).count()
    }
}

fn parse_digits(s: &str) -> Option<Vec<Option<u8>>> {
    let cells: Vec<Option<u8>> = s
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| match c {
            '0' | '.' => Some(None),
            '1'..='9' => Some(Some(c as u8 - b'0')),
            _ => None,
        })
        .collect::<Option<Vec<_>>>()?;
    if cells.len() == 81 {
        Some(cells)
    } else {
        None
    }
}

impl GridView for Grid {
    fn candidates(&self, cell: usize) -> BitSet {
        self.candidates[cell]
    }

    fn value(&self, cell: usize) -> Option<u8> {
        self.values[cell]
    }

    fn solution(&self) -> Option<[u8; 81]> {
        self.solution
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for idx in 0..81 {
            let (row, col) = cell_pos(idx);
            if col > 0 && col % 3 == 0 {
                write!(f, "| ")?;
            }
            match self.values[idx] {
                Some(v) => write!(f, "{} ", v)?,
                None => write!(f, ". ")?,
            }
            if col == 8 {
                writeln!(f)?;
                if row % 3 == 2 && row < 8 {
                    writeln!(f, "------+-------+------")?;
                }
            }
        }
        Ok(())
    }
}

impl fmt::Debug for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let line: String = self
            .values
            .iter()
            .map(|v| v.map_or('.', |d| (b'0' + d) as char))
            .collect();
        write!(f, "Grid({})", line)
    }
}
