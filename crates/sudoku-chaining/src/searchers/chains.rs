//! Adapter from chain patterns to steps.

use log::debug;

use super::{SearchContext, StepSearcher, PRIORITY_CHAINS};
use crate::cancel::CancellationToken;
use crate::chaining::cache::AnalysisCache;
use crate::chaining::driver;
use crate::chaining::pattern::ChainPattern;
use crate::error::ChainingError;
use crate::options::ChainingOptions;
use crate::step::{ProofCertificate, Step, Technique};

/// Runs the alternating chain search with its own link options.
#[derive(Debug, Clone)]
pub struct ChainingSearcher {
    options: ChainingOptions,
}

impl ChainingSearcher {
    pub fn new(options: ChainingOptions) -> Self {
        ChainingSearcher { options }
    }

    pub fn options(&self) -> &ChainingOptions {
        &self.options
    }
}

impl Default for ChainingSearcher {
    fn default() -> Self {
        ChainingSearcher::new(ChainingOptions::default())
    }
}

/// Report name of a pattern.
pub(crate) fn technique_of(pattern: &ChainPattern) -> Technique {
    match (pattern.is_x(), pattern.is_loop(), pattern.is_grouped()) {
        (true, false, false) => Technique::XChain,
        (true, true, false) => Technique::XCycle,
        (true, false, true) => Technique::GroupedXChain,
        (true, true, true) => Technique::GroupedXCycle,
        (false, false, false) => Technique::Aic,
        (false, true, false) => Technique::ContinuousNiceLoop,
        (false, false, true) => Technique::GroupedAic,
        (false, true, true) => Technique::GroupedContinuousNiceLoop,
    }
}

impl StepSearcher for ChainingSearcher {
    fn name(&self) -> &str {
        "chains"
    }

    fn priority(&self) -> u32 {
        PRIORITY_CHAINS
    }

    fn validate(&self) -> Result<(), ChainingError> {
        self.options.validate()
    }

    fn prepare(
        &self,
        cache: &mut AnalysisCache,
        token: &CancellationToken,
    ) -> Result<(), ChainingError> {
        let rules = cache.collect_links(self.options.link_types, &self.options, Some(token))?;
        debug!("chains: {} rules prepared", rules.len());
        Ok(())
    }

    fn search(&self, ctx: &SearchContext<'_>) -> Result<Vec<Step>, ChainingError> {
        let fabric = ctx.cache.fabric();
        let patterns = driver::search_cached(ctx.cache, Some(ctx.token))?;

        let mut steps = Vec::with_capacity(patterns.len());
        for pattern in patterns {
            let conclusions = pattern.conclusions(fabric);
            if self.options.require_conclusions && conclusions.is_empty() {
                continue;
            }
            let technique = technique_of(&pattern);
            let explanation = format!(
                "{}: chain of length {}: {}.",
                technique,
                pattern.len(),
                pattern
            );
            let proof = ProofCertificate::Chain {
                links: pattern.links(),
                closed: pattern.is_loop(),
                nodes: pattern.nodes().to_vec(),
            };
            steps.push(
                Step::new(technique, conclusions)
                    .with_cells(pattern.cells().iter())
                    .with_explanation(explanation)
                    .with_proof(proof),
            );
        }
        Ok(steps)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chaining::link::LinkTypes;
    use crate::chaining::node::{Node, NodeSlot};
    use crate::chaining::pattern::ChainKind;
    use crate::grid::Grid;
    use crate::step::Conclusion;

    const PUZZLE: &str =
        "530070000600195000098000060800060003400803001700020006060000280000419005000080079";
    const SOLUTION: &str =
        "534678912672195348198342567859761423426853791713924856961537284287419635345286179";

    #[test]
    fn test_technique_classification() {
        let group = NodeSlot::new([0, 1].into_iter().collect(), 4);
        let x = ChainPattern::chain(
            vec![
                Node::off(NodeSlot::single(5, 4)),
                Node::on(NodeSlot::single(8, 4)),
                Node::off(group),
                Node::on(NodeSlot::single(5, 4)),
            ],
            ChainKind::StrongClosure,
        );
        assert_eq!(technique_of(&x), Technique::GroupedXChain);

        let aic = ChainPattern::cycle(vec![
            Node::on(NodeSlot::single(0, 1)),
            Node::off(NodeSlot::single(0, 2)),
            Node::on(NodeSlot::single(4, 2)),
            Node::off(NodeSlot::single(4, 1)),
        ]);
        assert_eq!(technique_of(&aic), Technique::ContinuousNiceLoop);
    }

    #[test]
    fn test_prepare_then_search() {
        let grid = Grid::from_string(PUZZLE).unwrap();
        let mut cache = AnalysisCache::new(&grid);
        let token = CancellationToken::new();
        let searcher = ChainingSearcher::default();
        searcher.validate().unwrap();
        searcher.prepare(&mut cache, &token).unwrap();
        assert_eq!(cache.collected(), LinkTypes::ELEMENTARY);

        let steps = searcher
            .search(&SearchContext::new(&cache, &token))
            .unwrap();
        assert!(!steps.is_empty());

        let solution: Vec<u8> = SOLUTION.bytes().map(|b| b - b'0').collect();
        for step in &steps {
            assert!(step.technique.is_chain());
            assert!(!step.conclusions.is_empty());
            assert!(matches!(step.proof, Some(ProofCertificate::Chain { .. })));
            for c in &step.conclusions {
                match c {
                    Conclusion::Placement { cell, digit } => assert_eq!(solution[*cell], *digit),
                    Conclusion::Elimination { cell, digit } => assert_ne!(solution[*cell], *digit),
                }
            }
        }
    }

    #[test]
    fn test_search_without_prepare_finds_nothing() {
        let cache = AnalysisCache::new(&Grid::from_string(PUZZLE).unwrap());
        let token = CancellationToken::new();
        let steps = ChainingSearcher::default()
            .search(&SearchContext::new(&cache, &token))
            .unwrap();
        assert!(steps.is_empty());
    }
}
