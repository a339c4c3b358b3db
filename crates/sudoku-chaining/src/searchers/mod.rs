//! Step searchers run by the gathering façade.
//!
//! A searcher gets one synchronous [`StepSearcher::prepare`] call with
//! mutable access to the shared [`AnalysisCache`] before any work is fanned
//! out, then a [`StepSearcher::search`] call on a pool thread that may only
//! read it.

mod chains;
mod intersections;
mod singles;

pub use chains::ChainingSearcher;
pub use intersections::IntersectionSearcher;
pub use singles::SinglesSearcher;

use crate::cancel::CancellationToken;
use crate::chaining::cache::AnalysisCache;
use crate::error::ChainingError;
use crate::options::ChainingOptions;
use crate::step::Step;

/// Priority of the singles searcher; lower runs first in the merged output.
pub const PRIORITY_SINGLES: u32 = 10;
/// Priority of the intersection searcher.
pub const PRIORITY_INTERSECTIONS: u32 = 20;
/// Priority of the chaining searcher.
pub const PRIORITY_CHAINS: u32 = 50;

/// Read-only inputs of one search call.
#[derive(Clone, Copy)]
pub struct SearchContext<'a> {
    pub cache: &'a AnalysisCache,
    pub token: &'a CancellationToken,
}

impl<'a> SearchContext<'a> {
    pub fn new(cache: &'a AnalysisCache, token: &'a CancellationToken) -> Self {
        SearchContext { cache, token }
    }

    pub fn check_cancelled(&self) -> Result<(), ChainingError> {
        self.token.check()
    }
}

/// One independent technique searcher.
pub trait StepSearcher: Send + Sync {
    /// Name for logs and failure reports
    fn name(&self) -> &str;

    /// Bucket key of this searcher's steps in the merged output.
    fn priority(&self) -> u32;

    /// Check configuration before anything runs.
    fn validate(&self) -> Result<(), ChainingError> {
        Ok(())
    }

    /// Fill whatever the search needs into the cache. Runs on the calling
    /// thread, before fan-out.
    fn prepare(
        &self,
        _cache: &mut AnalysisCache,
        _token: &CancellationToken,
    ) -> Result<(), ChainingError> {
        Ok(())
    }

    /// Find steps. Must check the token inside long loops and return
    /// `Err(Cancelled)` once it fires.
    fn search(&self, ctx: &SearchContext<'_>) -> Result<Vec<Step>, ChainingError>;
}

/// The default searcher set: singles, intersections and chains.
pub fn default_searchers(options: ChainingOptions) -> Vec<Box<dyn StepSearcher>> {
    vec![
        Box::new(SinglesSearcher),
        Box::new(IntersectionSearcher),
        Box::new(ChainingSearcher::new(options)),
    ]
}
