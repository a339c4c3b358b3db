//! Bit-level set primitives: 9-bit digit masks and 81-bit cell sets.
//!
//! Every operation here is pure and allocation-free. Cell indices are linear
//! (`row * 9 + col`), digits are `1..=9`.

use std::fmt;
use std::ops::{BitAnd, BitAndAssign, BitOr, BitOrAssign, Not, Sub, SubAssign};

use serde::{Deserialize, Serialize};

use crate::fabric::{cell_name, sector_cells};

// ==================== Digit masks ====================

const DIGIT_MASK: u16 = 0x1FF;

/// A set of digits 1..=9 stored as bits 0..8 of a `u16`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct BitSet(u16);

impl BitSet {
    /// The empty digit set.
    pub const fn empty() -> Self {
        BitSet(0)
    }

    /// All nine digits.
    pub const fn all_9() -> Self {
        BitSet(DIGIT_MASK)
    }

    /// A set holding only `digit`.
    pub const fn single(digit: u8) -> Self {
        BitSet(1 << (digit - 1))
    }

    /// Build from a slice of digits.
    pub fn from_slice(digits: &[u8]) -> Self {
        digits.iter().fold(BitSet::empty(), |acc, &d| acc.with(d))
    }

    /// Build from raw bits; bits above 8 are discarded.
    pub const fn from_raw(bits: u16) -> Self {
        BitSet(bits & DIGIT_MASK)
    }

    /// Raw bit representation.
    pub const fn raw(self) -> u16 {
        self.0
    }

    #[inline]
    pub const fn contains(self, digit: u8) -> bool {
        digit >= 1 && digit <= 9 && self.0 & (1 << (digit - 1)) != 0
    }

    #[inline]
    pub fn insert(&mut self, digit: u8) {
        self.0 |= 1 << (digit - 1);
    }

    #[inline]
    pub fn remove(&mut self, digit: u8) {
        self.0 &= !(1 << (digit - 1));
    }

    /// Copy of `self` with `digit` added.
    pub const fn with(self, digit: u8) -> Self {
        BitSet(self.0 | (1 << (digit - 1)))
    }

    #[inline]
    pub const fn count(self) -> u32 {
        self.0.count_ones()
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub const fn union(&self, other: &BitSet) -> BitSet {
        BitSet(self.0 | other.0)
    }

    pub const fn intersection(&self, other: &BitSet) -> BitSet {
        BitSet(self.0 & other.0)
    }

    pub const fn difference(&self, other: &BitSet) -> BitSet {
        BitSet(self.0 & !other.0)
    }

    /// Digits not in `self`.
    pub const fn complement(&self) -> BitSet {
        BitSet(!self.0 & DIGIT_MASK)
    }

    /// Smallest digit in the set.
    pub fn first(self) -> Option<u8> {
        self.next_after(0)
    }

    /// Smallest digit strictly greater than `p` (`p = 0` yields the first digit).
    pub fn next_after(self, p: u8) -> Option<u8> {
        if p >= 9 {
            return None;
        }
        let rest = self.0 & (DIGIT_MASK << p) & DIGIT_MASK;
        if rest == 0 {
            None
        } else {
            Some(rest.trailing_zeros() as u8 + 1)
        }
    }

    /// Iterate digits in increasing order.
    pub fn iter(self) -> DigitIter {
        DigitIter(self.0)
    }

    /// Every `k`-sized subset of the set, in Gosper order.
    pub fn subsets(self, k: usize) -> DigitSubsets {
        let mut digits = [0u8; 9];
        let mut n = 0;
        for d in self.iter() {
            digits[n] = d;
            n += 1;
        }
        DigitSubsets {
            digits,
            limit: 1u32 << n,
            current: if k <= n { (1u32 << k) - 1 } else { 0 },
            done: k > n,
        }
    }
}

impl fmt::Debug for BitSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl fmt::Display for BitSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for d in self.iter() {
            write!(f, "{}", d)?;
        }
        Ok(())
    }
}

impl FromIterator<u8> for BitSet {
    fn from_iter<I: IntoIterator<Item = u8>>(iter: I) -> Self {
        iter.into_iter().fold(BitSet::empty(), |acc, d| acc.with(d))
    }
}

/// Ascending digit iterator over a [`BitSet`].
#[derive(Debug, Clone)]
pub struct DigitIter(u16);

impl Iterator for DigitIter {
    type Item = u8;

    fn next(&mut self) -> Option<u8> {
        if self.0 == 0 {
            return None;
        }
        let d = self.0.trailing_zeros() as u8 + 1;
        self.0 &= self.0 - 1;
        Some(d)
    }
}

/// Fixed-size subsets of a digit mask (see [`BitSet::subsets`]).
#[derive(Debug, Clone)]
pub struct DigitSubsets {
    digits: [u8; 9],
    limit: u32,
    current: u32,
    done: bool,
}

impl Iterator for DigitSubsets {
    type Item = BitSet;

    fn next(&mut self) -> Option<BitSet> {
        if self.done {
            return None;
        }
        let set = self.current;
        let mut out = BitSet::empty();
        let mut bits = set;
        while bits != 0 {
            out.insert(self.digits[bits.trailing_zeros() as usize]);
            bits &= bits - 1;
        }

        // Gosper's hack: next subset of same size
        if set == 0 {
            self.done = true;
        } else {
            let c = set & set.wrapping_neg();
            let r = set + c;
            let next = (((r ^ set) >> 2) / c) | r;
            if next >= self.limit {
                self.done = true;
            } else {
                self.current = next;
            }
        }
        Some(out)
    }
}

// ==================== Cell sets ====================

const CELL_MASK: u128 = (1u128 << 81) - 1;

const fn build_house_maps() -> [u128; 27] {
    let mut maps = [0u128; 27];
    let mut cell = 0;
    while cell < 81 {
        let row = cell / 9;
        let col = cell % 9;
        let bx = (row / 3) * 3 + col / 3;
        maps[row] |= 1u128 << cell;
        maps[9 + col] |= 1u128 << cell;
        maps[18 + bx] |= 1u128 << cell;
        cell += 1;
    }
    maps
}

const fn build_peer_maps() -> [u128; 81] {
    let houses = build_house_maps();
    let mut maps = [0u128; 81];
    let mut cell = 0;
    while cell < 81 {
        let row = cell / 9;
        let col = cell % 9;
        let bx = (row / 3) * 3 + col / 3;
        maps[cell] = (houses[row] | houses[9 + col] | houses[18 + bx]) & !(1u128 << cell);
        cell += 1;
    }
    maps
}

/// Cells of each house: rows 0..8, columns 9..17, boxes 18..26.
pub const HOUSE_MAPS: [u128; 27] = build_house_maps();

/// The 20 peers of each cell.
pub const PEER_MAPS: [u128; 81] = build_peer_maps();

/// A set of cells stored as bits 0..80 of a `u128`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct CellSet(u128);

impl CellSet {
    pub const fn empty() -> Self {
        CellSet(0)
    }

    /// All 81 cells.
    pub const fn full() -> Self {
        CellSet(CELL_MASK)
    }

    pub const fn single(cell: usize) -> Self {
        CellSet(1u128 << cell)
    }

    pub const fn from_raw(bits: u128) -> Self {
        CellSet(bits & CELL_MASK)
    }

    pub const fn raw(self) -> u128 {
        self.0
    }

    /// The nine cells of `house`.
    pub const fn house(house: usize) -> Self {
        CellSet(HOUSE_MAPS[house])
    }

    /// The 20 cells sharing a house with `cell`.
    pub const fn peers(cell: usize) -> Self {
        CellSet(PEER_MAPS[cell])
    }

    #[inline]
    pub const fn contains(self, cell: usize) -> bool {
        cell < 81 && self.0 & (1u128 << cell) != 0
    }

    #[inline]
    pub fn insert(&mut self, cell: usize) {
        self.0 |= 1u128 << cell;
    }

    #[inline]
    pub fn remove(&mut self, cell: usize) {
        self.0 &= !(1u128 << cell);
    }

    #[inline]
    pub const fn count(self) -> u32 {
        self.0.count_ones()
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub const fn is_subset(self, other: CellSet) -> bool {
        self.0 & !other.0 == 0
    }

    pub const fn intersects(self, other: CellSet) -> bool {
        self.0 & other.0 != 0
    }

    /// Lowest cell index in the set.
    pub fn first(self) -> Option<usize> {
        if self.0 == 0 {
            None
        } else {
            Some(self.0.trailing_zeros() as usize)
        }
    }

    /// Iterate cells in increasing order.
    pub fn iter(self) -> CellIter {
        CellIter(self.0)
    }

    /// Houses containing every cell of the set, ascending. Empty for an empty set.
    pub fn houses(self) -> impl Iterator<Item = usize> {
        (0..27).filter(move |&h| self.0 != 0 && self.0 & !HOUSE_MAPS[h] == 0)
    }

    /// Whether all cells lie in one row, column or box.
    pub fn is_in_single_house(self) -> bool {
        self.houses().next().is_some()
    }

    /// Whether all cells lie in one box-line intersection (both a box and a line).
    pub fn is_in_intersection(self) -> bool {
        let mut line = false;
        let mut block = false;
        for h in self.houses() {
            if h < 18 {
                line = true;
            } else {
                block = true;
            }
        }
        line && block
    }

    /// Positions (bits 0..8) of the set's cells within `house`.
    pub fn reduce_to_house(self, house: usize) -> u16 {
        let mut mask = 0u16;
        for (i, &cell) in sector_cells(house).iter().enumerate() {
            if self.contains(cell) {
                mask |= 1 << i;
            }
        }
        mask
    }

    /// Cells outside the set that see every cell of the set.
    pub fn peer_intersection(self) -> CellSet {
        if self.0 == 0 {
            return CellSet::empty();
        }
        self.iter()
            .fold(CellSet::full(), |acc, cell| acc & CellSet::peers(cell))
            - self
    }
}

impl fmt::Debug for CellSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set()
            .entries(self.iter().map(DebugCell))
            .finish()
    }
}

struct DebugCell(usize);

impl fmt::Debug for DebugCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&cell_name(self.0))
    }
}

impl BitAnd for CellSet {
    type Output = CellSet;
    fn bitand(self, rhs: CellSet) -> CellSet {
        CellSet(self.0 & rhs.0)
    }
}

impl BitOr for CellSet {
    type Output = CellSet;
    fn bitor(self, rhs: CellSet) -> CellSet {
        CellSet(self.0 | rhs.0)
    }
}

impl Sub for CellSet {
    type Output = CellSet;
    fn sub(self, rhs: CellSet) -> CellSet {
        CellSet(self.0 & !rhs.0)
    }
}

impl Not for CellSet {
    type Output = CellSet;
    fn not(self) -> CellSet {
        CellSet(!self.0 & CELL_MASK)
    }
}

impl BitAndAssign for CellSet {
    fn bitand_assign(&mut self, rhs: CellSet) {
        self.0 &= rhs.0;
    }
}

impl BitOrAssign for CellSet {
    fn bitor_assign(&mut self, rhs: CellSet) {
        self.0 |= rhs.0;
    }
}

impl SubAssign for CellSet {
    fn sub_assign(&mut self, rhs: CellSet) {
        self.0 &= !rhs.0;
    }
}

impl FromIterator<usize> for CellSet {
    fn from_iter<I: IntoIterator<Item = usize>>(iter: I) -> Self {
        let mut set = CellSet::empty();
        for cell in iter {
            set.insert(cell);
        }
        set
    }
}

/// Ascending cell iterator over a [`CellSet`].
#[derive(Debug, Clone)]
pub struct CellIter(u128);

impl Iterator for CellIter {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        if self.0 == 0 {
            return None;
        }
        let cell = self.0.trailing_zeros() as usize;
        self.0 &= self.0 - 1;
        Some(cell)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.0.count_ones() as usize;
        (n, Some(n))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fabric::cell_index;

    #[test]
    fn test_bitset_basic_ops() {
        let a = BitSet::from_slice(&[1, 4, 9]);
        let b = BitSet::from_slice(&[4, 5]);
        assert_eq!(a.count(), 3);
        assert!(a.contains(9));
        assert!(!a.contains(2));
        assert_eq!(a.union(&b).iter().collect::<Vec<_>>(), vec![1, 4, 5, 9]);
        assert_eq!(a.intersection(&b), BitSet::single(4));
        assert_eq!(a.difference(&b), BitSet::from_slice(&[1, 9]));
        assert_eq!(a.complement().count(), 6);
        assert!(a.intersection(&BitSet::empty()).is_empty());
        assert_eq!(BitSet::empty().iter().count(), 0);
    }

    #[test]
    fn test_bitset_next_after() {
        let a = BitSet::from_slice(&[2, 5, 9]);
        assert_eq!(a.first(), Some(2));
        assert_eq!(a.next_after(2), Some(5));
        assert_eq!(a.next_after(5), Some(9));
        assert_eq!(a.next_after(9), None);
        assert_eq!(BitSet::empty().first(), None);
    }

    #[test]
    fn test_bitset_subsets() {
        let a = BitSet::from_slice(&[1, 4, 9]);
        let pairs: Vec<BitSet> = a.subsets(2).collect();
        assert_eq!(pairs.len(), 3);
        assert!(pairs.contains(&BitSet::from_slice(&[1, 4])));
        assert!(pairs.contains(&BitSet::from_slice(&[4, 9])));
        assert!(pairs.contains(&BitSet::from_slice(&[1, 9])));

        assert_eq!(BitSet::all_9().subsets(3).count(), 84);
        assert_eq!(a.subsets(3).collect::<Vec<_>>(), vec![a]);
        assert_eq!(a.subsets(4).count(), 0);
        assert_eq!(BitSet::empty().subsets(1).count(), 0);
    }

    #[test]
    fn test_house_maps() {
        assert_eq!(CellSet::house(0).iter().collect::<Vec<_>>(), (0..9).collect::<Vec<_>>());
        assert_eq!(
            CellSet::house(9).iter().collect::<Vec<_>>(),
            vec![0, 9, 18, 27, 36, 45, 54, 63, 72]
        );
        assert_eq!(
            CellSet::house(18).iter().collect::<Vec<_>>(),
            vec![0, 1, 2, 9, 10, 11, 18, 19, 20]
        );
        for h in 0..27 {
            assert_eq!(CellSet::house(h).count(), 9);
        }
    }

    #[test]
    fn test_peer_maps() {
        for cell in 0..81 {
            let peers = CellSet::peers(cell);
            assert_eq!(peers.count(), 20);
            assert!(!peers.contains(cell));
        }
        assert!(CellSet::peers(0).contains(10));
        assert!(!CellSet::peers(0).contains(40));
    }

    #[test]
    fn test_cellset_ops() {
        let a: CellSet = [0, 1, 2].into_iter().collect();
        let b: CellSet = [2, 3].into_iter().collect();
        assert_eq!((a & b).iter().collect::<Vec<_>>(), vec![2]);
        assert_eq!((a | b).count(), 4);
        assert_eq!((a - b).iter().collect::<Vec<_>>(), vec![0, 1]);
        assert_eq!((!a).count(), 78);
        assert!((a & CellSet::empty()).is_empty());
        assert_eq!(CellSet::empty().iter().count(), 0);
        assert!(CellSet::single(2).is_subset(a));
        assert!(!b.is_subset(a));
    }

    #[test]
    fn test_cellset_single_house() {
        let row_pair: CellSet = [cell_index(0, 0), cell_index(0, 5)].into_iter().collect();
        assert!(row_pair.is_in_single_house());
        assert!(!row_pair.is_in_intersection());
        assert_eq!(row_pair.houses().collect::<Vec<_>>(), vec![0]);

        let mini_line: CellSet = [cell_index(0, 0), cell_index(0, 1)].into_iter().collect();
        assert!(mini_line.is_in_intersection());
        assert_eq!(mini_line.houses().collect::<Vec<_>>(), vec![0, 18]);

        let scattered: CellSet = [cell_index(0, 0), cell_index(4, 4)].into_iter().collect();
        assert!(!scattered.is_in_single_house());
        assert_eq!(CellSet::empty().houses().count(), 0);
    }

    #[test]
    fn test_reduce_to_house_and_peer_intersection() {
        let cells: CellSet = [cell_index(0, 0), cell_index(0, 4)].into_iter().collect();
        assert_eq!(cells.reduce_to_house(0), 0b1_0001);
        assert_eq!(cells.reduce_to_house(9), 0b1);
        assert_eq!(cells.reduce_to_house(1), 0);

        let common = cells.peer_intersection();
        // Remaining row 0 cells only
        assert_eq!(common.count(), 7);
        assert!(common.contains(cell_index(0, 8)));
        assert!(!common.contains(cell_index(1, 1)));
        assert!(CellSet::empty().peer_intersection().is_empty());
    }
}
