//! Property-based tests for link collection and chain search.
//!
//! Grids are built by blanking random cells of a known solution, so every
//! candidate set still holds the true digit and each collected link and
//! derived conclusion can be checked against it.

use std::collections::HashSet;

use proptest::prelude::*;
use sudoku_chaining::chaining::search_cached;
use sudoku_chaining::{
    AnalysisCache, ChainPattern, ChainingOptions, Conclusion, Grid, LinkDictionary, LinkType,
    LinkTypes, NodeSlot, RelaxedPattern,
};

const SOLUTION: &str =
    "534678912672195348198342567859761423426853791713924856961537284287419635345286179";

fn solution() -> Vec<u8> {
    SOLUTION.bytes().map(|b| b - b'0').collect()
}

fn blanked(cells: &[usize]) -> Grid {
    let mut digits: Vec<u8> = SOLUTION.bytes().collect();
    for &cell in cells {
        digits[cell] = b'0';
    }
    let puzzle = String::from_utf8(digits).unwrap();
    Grid::from_string(&puzzle).unwrap()
}

fn holds(slot: &NodeSlot, solution: &[u8]) -> bool {
    slot.cells.iter().any(|cell| solution[cell] == slot.digit)
}

fn collected(grid: &Grid, types: LinkTypes) -> AnalysisCache {
    let mut cache = AnalysisCache::new(grid);
    cache
        .collect_links(types, &ChainingOptions::elementary(), None)
        .unwrap();
    cache
}

fn same_links(a: &LinkDictionary, b: &LinkDictionary) -> bool {
    a.is_superset_of(b) && b.is_superset_of(a)
}

fn blanks() -> impl Strategy<Value = Vec<usize>> {
    prop::collection::btree_set(0usize..81, 20..56).prop_map(|set| set.into_iter().collect())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    /// Links are symmetric and hold in the solution: a strong pair always
    /// has a true end, a weak pair never has two.
    #[test]
    fn prop_links_symmetric_and_sound(cells in blanks()) {
        let solution = solution();
        let cache = collected(&blanked(&cells), LinkTypes::ELEMENTARY);
        prop_assert!(cache.strong_links().is_symmetric());
        prop_assert!(cache.weak_links().is_symmetric());

        for (a, linked) in cache.strong_links().iter() {
            for b in linked {
                prop_assert!(holds(a, &solution) || holds(b, &solution), "{} = {}", a, b);
            }
        }
        for (a, linked) in cache.weak_links().iter() {
            for b in linked {
                prop_assert!(!(holds(a, &solution) && holds(b, &solution)), "{} - {}", a, b);
            }
        }
    }

    /// Asking again changes nothing; asking in pieces matches asking at once.
    #[test]
    fn prop_collection_idempotent_and_additive(cells in blanks()) {
        let grid = blanked(&cells);
        let direct = collected(&grid, LinkTypes::ELEMENTARY);

        let mut repeated = collected(&grid, LinkTypes::ELEMENTARY);
        repeated
            .collect_links(LinkTypes::ELEMENTARY, &ChainingOptions::elementary(), None)
            .unwrap();
        prop_assert!(same_links(direct.strong_links(), repeated.strong_links()));
        prop_assert!(same_links(direct.weak_links(), repeated.weak_links()));

        let mut pieces = collected(&grid, LinkType::SingleDigit.into());
        pieces
            .collect_links(
                LinkTypes::from(LinkType::LockedCandidates) | LinkType::SingleCell,
                &ChainingOptions::elementary(),
                None,
            )
            .unwrap();
        prop_assert_eq!(pieces.collected(), LinkTypes::ELEMENTARY);
        prop_assert!(same_links(direct.strong_links(), pieces.strong_links()));
        prop_assert!(same_links(direct.weak_links(), pieces.weak_links()));
    }

    /// Every pattern alternates, loops are even and at least four long, no
    /// two patterns are relaxed duplicates, and every conclusion is true.
    #[test]
    fn prop_patterns_well_formed(cells in blanks()) {
        let solution = solution();
        let cache = collected(&blanked(&cells), LinkTypes::ELEMENTARY);
        let patterns = search_cached(&cache, None).unwrap();

        let mut seen = HashSet::new();
        for pattern in &patterns {
            prop_assert!(pattern.is_alternating(), "{}", pattern);
            if let ChainPattern::Loop { nodes } = pattern {
                prop_assert!(nodes.len() >= 4 && nodes.len() % 2 == 0, "{}", pattern);
            } else {
                prop_assert!(pattern.len() >= 3, "{}", pattern);
            }
            prop_assert!(seen.insert(RelaxedPattern::new(pattern.clone())), "duplicate {}", pattern);

            for conclusion in pattern.conclusions(cache.fabric()) {
                match conclusion {
                    Conclusion::Placement { cell, digit } => {
                        prop_assert_eq!(solution[cell], digit, "{}", pattern)
                    }
                    Conclusion::Elimination { cell, digit } => {
                        prop_assert_ne!(solution[cell], digit, "{}", pattern)
                    }
                }
            }
        }

        prop_assert_eq!(search_cached(&cache, None).unwrap(), patterns);
    }
}
