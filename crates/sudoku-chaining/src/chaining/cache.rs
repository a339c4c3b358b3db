//! Per-analysis cache: derived grid projections plus the accumulated link
//! dictionaries and the mask of link families already collected.
//!
//! One [`AnalysisCache`] serves one grid. It is filled synchronously through
//! [`AnalysisCache::collect_links`] and is only read afterwards, so it can be
//! shared behind an `Arc` by searchers running in parallel.

use log::debug;

use super::link::{Inference, LinkDictionary, LinkTypes};
use super::rules::{ChainingRule, RuleContext};
use crate::cancel::CancellationToken;
use crate::error::ChainingError;
use crate::fabric::CandidateFabric;
use crate::grid::GridView;
use crate::options::ChainingOptions;

#[derive(Debug, Clone)]
pub struct AnalysisCache {
    fabric: CandidateFabric,
    strong: LinkDictionary,
    weak: LinkDictionary,
    collected: LinkTypes,
}

impl AnalysisCache {
    pub fn new<G: GridView + ?Sized>(grid: &G) -> Self {
        AnalysisCache {
            fabric: CandidateFabric::from_grid(grid),
            strong: LinkDictionary::new(Inference::Strong),
            weak: LinkDictionary::new(Inference::Weak),
            collected: LinkTypes::NONE,
        }
    }

    /// Start a new analysis pass on `grid`, dropping every collected link.
    pub fn reset<G: GridView + ?Sized>(&mut self, grid: &G) {
        *self = AnalysisCache::new(grid);
    }

    pub fn fabric(&self) -> &CandidateFabric {
        &self.fabric
    }

    pub fn strong_links(&self) -> &LinkDictionary {
        &self.strong
    }

    pub fn weak_links(&self) -> &LinkDictionary {
        &self.weak
    }

    /// Families whose links are already in the dictionaries.
    pub fn collected(&self) -> LinkTypes {
        self.collected
    }

    /// Make sure the dictionaries hold every link of the families in `types`.
    ///
    /// Families collected earlier in this pass are skipped, so repeated and
    /// overlapping requests only ever add links. A family whose rule fails
    /// leaves the dictionaries untouched and stays uncollected. Returns the
    /// rules matching `types`.
    pub fn collect_links(
        &mut self,
        types: LinkTypes,
        options: &ChainingOptions,
        token: Option<&CancellationToken>,
    ) -> Result<Vec<ChainingRule>, ChainingError> {
        LinkTypes::from_bits(types.bits())?;
        options.validate()?;

        let rules = ChainingRule::resolve(types);
        let mut ctx = RuleContext::new(&self.fabric, options);
        if let Some(token) = token {
            ctx = ctx.with_token(token);
        }

        for &rule in &rules {
            let link_type = rule.link_type();
            if self.collected.contains(link_type) {
                debug!("{} already collected, skipping", link_type);
                continue;
            }
            ctx.check_cancelled()?;

            let mut strong = LinkDictionary::new(Inference::Strong);
            let mut weak = LinkDictionary::new(Inference::Weak);
            rule.collect_strong_links(&ctx, &mut strong)?;
            rule.collect_weak_links(&ctx, &mut weak)?;
            debug!(
                "{}: {} strong and {} weak entries",
                rule,
                strong.len(),
                weak.len()
            );

            self.strong.merge(strong);
            self.weak.merge(weak);
            self.collected.insert(link_type);
        }
        Ok(rules)
    }
}
