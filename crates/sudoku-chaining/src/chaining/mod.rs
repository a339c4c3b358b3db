//! Chain inference: candidate nodes, strong/weak links, the rules that
//! collect them, and the alternating search that turns them into chains
//! and loops.

pub mod cache;
pub mod dedup;
pub mod driver;
pub mod link;
pub mod node;
pub mod pattern;
pub mod rules;

pub use cache::AnalysisCache;
pub use dedup::RelaxedPattern;
pub use driver::{find_patterns, search_cached, ChainSearch};
pub use link::{Inference, LinkDictionary, LinkOption, LinkType, LinkTypes};
pub use node::{Node, NodeArena, NodeId, NodeSlot};
pub use pattern::{ChainKind, ChainPattern};
pub use rules::{ChainingRule, RuleContext};

use log::debug;

use crate::cancel::CancellationToken;
use crate::error::ChainingError;
use crate::grid::GridView;
use crate::options::ChainingOptions;

/// Collect the links requested by `options` on `grid` and return every
/// distinct chain and loop.
pub fn collect_chain_patterns<G: GridView + ?Sized>(
    grid: &G,
    options: &ChainingOptions,
    token: Option<&CancellationToken>,
) -> Result<Vec<ChainPattern>, ChainingError> {
    options.validate()?;
    if grid.is_solved() {
        debug!("grid already solved, no chains to find");
        return Ok(Vec::new());
    }
    let mut cache = AnalysisCache::new(grid);
    cache.collect_links(options.link_types, options, token)?;
    search_cached(&cache, token)
}
