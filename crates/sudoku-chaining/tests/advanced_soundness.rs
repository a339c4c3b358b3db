//! Every link family switched on, checked against known unique solutions.

use sudoku_chaining::{
    collect_chain_patterns, default_searchers, CancellationToken, CandidateFabric, ChainPattern,
    ChainingOptions, Conclusion, GatherOptions, Grid, StepGatherer,
};

/// (puzzle, solution) pairs with a unique solution each.
const PUZZLES: [(&str, &str); 3] = [
    (
        "530070000600195000098000060800060003400803001700020006060000280000419005000080079",
        "534678912672195348198342567859761423426853791713924856961537284287419635345286179",
    ),
    (
        "000000010400000000020000000000050407008000300001090000300400200050100000000806000",
        "693784512487512936125963874932651487568247391741398625319475268856129743274836159",
    ),
    (
        "800000000003600000070090200050007000000045700000100030001000068008500010090000400",
        "812753649943682175675491283154237896369845721287169534521974368438526917796318452",
    ),
];

fn digits(solution: &str) -> Vec<u8> {
    solution.bytes().map(|b| b - b'0').collect()
}

fn assert_sound(conclusions: &[Conclusion], solution: &[u8], context: &dyn std::fmt::Display) {
    for conclusion in conclusions {
        match *conclusion {
            Conclusion::Placement { cell, digit } => {
                assert_eq!(solution[cell], digit, "bad placement in {}", context)
            }
            Conclusion::Elimination { cell, digit } => {
                assert_ne!(solution[cell], digit, "bad elimination in {}", context)
            }
        }
    }
}

#[test]
fn test_advanced_patterns_are_sound() {
    let options = ChainingOptions::advanced();
    for (puzzle, solution) in PUZZLES {
        let grid = Grid::from_string(puzzle).unwrap();
        let solution = digits(solution);
        let patterns = collect_chain_patterns(&grid, &options, None).unwrap();

        let fabric = CandidateFabric::from_grid(&grid);
        for pattern in &patterns {
            assert!(pattern.is_alternating(), "{}", pattern);
            if let ChainPattern::Loop { nodes } = pattern {
                assert!(nodes.len() >= 4 && nodes.len() % 2 == 0, "{}", pattern);
            }
            assert_sound(&pattern.conclusions(&fabric), &solution, pattern);
        }
    }
}

#[test]
fn test_sparse_grid_yields_patterns() {
    let (puzzle, _) = PUZZLES[1];
    let grid = Grid::from_string(puzzle).unwrap();
    let patterns = collect_chain_patterns(
        &grid,
        &ChainingOptions::advanced(),
        None,
    )
    .unwrap();
    assert!(!patterns.is_empty());
}

#[test]
fn test_gathered_advanced_steps_are_sound() {
    let options = ChainingOptions::advanced();
    let gatherer = StepGatherer::new(GatherOptions::default())
        .unwrap()
        .with_searchers(default_searchers(options));
    for (puzzle, solution) in PUZZLES {
        let grid = Grid::from_string(puzzle).unwrap();
        let solution = digits(solution);
        let steps = gatherer
            .gather(&grid, &CancellationToken::new())
            .unwrap()
            .unwrap();
        for step in &steps {
            assert_sound(&step.conclusions, &solution, step);
        }
    }
}
