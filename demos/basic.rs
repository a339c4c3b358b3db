//! Basic example of using the chaining engine

use sudoku_chaining::{
    collect_chain_patterns, default_searchers, CancellationToken, ChainingOptions, GatherOptions,
    Grid, LinkTypes, StepGatherer,
};

fn main() {
    // Parse a puzzle from a string
    let puzzle_string =
        "530070000600195000098000060800060003400803001700020006060000280000419005000080079";
    let Some(grid) = Grid::from_string(puzzle_string) else {
        println!("Could not parse puzzle");
        return;
    };
    println!("Parsed puzzle:");
    println!("{}", grid);
    println!("Empty cells: {}\n", grid.empty_count());

    // Raw chain patterns from the elementary link families
    let options = ChainingOptions::elementary();
    match collect_chain_patterns(&grid, &options, None) {
        Ok(patterns) => {
            let loops = patterns.iter().filter(|p| p.is_loop()).count();
            println!(
                "Found {} chain patterns ({} loops)",
                patterns.len(),
                loops
            );
            for pattern in patterns.iter().take(5) {
                println!("  {}", pattern);
            }
        }
        Err(e) => println!("Chain search failed: {}", e),
    }

    // Every searcher at once, with every link family
    println!("\n--- Gathering steps ---\n");
    let options = ChainingOptions::advanced().with_link_types(LinkTypes::ALL);
    let gatherer = match StepGatherer::new(GatherOptions::default()) {
        Ok(gatherer) => gatherer.with_searchers(default_searchers(options)),
        Err(e) => {
            println!("Could not start worker pool: {}", e);
            return;
        }
    };

    let token = CancellationToken::new();
    let handle = match gatherer.start(&grid, &token) {
        Ok(handle) => handle,
        Err(e) => {
            println!("Invalid configuration: {}", e);
            return;
        }
    };
    handle.on_completed(|| println!("(gathering finished)"));

    match handle.wait() {
        Ok(steps) => {
            println!("{} steps:", steps.len());
            for step in steps.iter().take(20) {
                println!("  {}", step);
            }
        }
        Err(e) => println!("Gathering failed: {}", e),
    }
}
