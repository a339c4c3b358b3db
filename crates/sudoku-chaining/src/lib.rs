//! Sudoku chain-inference engine.
//!
//! Collects strong and weak links between candidates with one rule per
//! technique family, searches them for alternating chains and loops, and
//! gathers the resulting steps from several searchers concurrently.
//!
//! ```no_run
//! use sudoku_chaining::{
//!     default_searchers, CancellationToken, ChainingOptions, GatherOptions, Grid, StepGatherer,
//! };
//!
//! let grid = Grid::from_string(
//!     "530070000600195000098000060800060003400803001700020006060000280000419005000080079",
//! )
//! .unwrap();
//! let gatherer = StepGatherer::new(GatherOptions::default())
//!     .unwrap()
//!     .with_searchers(default_searchers(ChainingOptions::default()));
//! let steps = gatherer.gather(&grid, &CancellationToken::new()).unwrap().unwrap();
//! for step in steps {
//!     println!("{step}");
//! }
//! ```

pub mod bitset;
pub mod cancel;
pub mod chaining;
pub mod error;
pub mod fabric;
pub mod gather;
pub mod grid;
pub mod options;
pub mod searchers;
pub mod step;

pub use bitset::{BitSet, CellSet};
pub use cancel::CancellationToken;
pub use chaining::{
    collect_chain_patterns, AnalysisCache, ChainKind, ChainPattern, Inference, LinkDictionary,
    LinkOption, LinkType, LinkTypes, Node, NodeSlot, RelaxedPattern,
};
pub use error::ChainingError;
pub use fabric::CandidateFabric;
pub use gather::{
    ContinuationMode, GatherError, GatherHandle, GatherOptions, GatherResult, SearcherFailure,
    StepGatherer,
};
pub use grid::{Grid, GridView};
pub use options::ChainingOptions;
pub use searchers::{default_searchers, SearchContext, StepSearcher};
pub use step::{Conclusion, ProofCertificate, Step, Technique};
