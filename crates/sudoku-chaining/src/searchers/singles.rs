//! Naked and hidden singles.

use std::collections::BTreeSet;

use super::{SearchContext, StepSearcher, PRIORITY_SINGLES};
use crate::error::ChainingError;
use crate::fabric::{cell_name, sector_name, CandidateFabric};
use crate::step::{Conclusion, ProofCertificate, Step, Technique};

#[derive(Debug, Clone, Copy, Default)]
pub struct SinglesSearcher;

fn naked_singles(fab: &CandidateFabric) -> Vec<Step> {
    fab.empty
        .iter()
        .filter_map(|cell| {
            let cands = fab.cell_cands[cell];
            if cands.count() != 1 {
                return None;
            }
            let digit = cands.first()?;
            Some(
                Step::new(Technique::NakedSingle, vec![Conclusion::Placement { cell, digit }])
                    .with_cells([cell])
                    .with_explanation(format!(
                        "Cell {} can only be {} - it's the only candidate left.",
                        cell_name(cell),
                        digit
                    ))
                    .with_proof(ProofCertificate::Basic {
                        kind: "Naked Single",
                    }),
            )
        })
        .collect()
}

fn hidden_singles(ctx: &SearchContext<'_>) -> Result<Vec<Step>, ChainingError> {
    let fab = ctx.cache.fabric();
    let mut seen = BTreeSet::new();
    let mut steps = Vec::new();
    for sector in 0..27 {
        ctx.check_cancelled()?;
        for digit in 1..=9u8 {
            let cells = fab.sector_candidates(sector, digit);
            if cells.count() != 1 {
                continue;
            }
            let Some(cell) = cells.first() else { continue };
            // Naked singles are reported by their own pass
            if fab.cell_cands[cell].count() == 1 || !seen.insert((cell, digit)) {
                continue;
            }
            steps.push(
                Step::new(Technique::HiddenSingle, vec![Conclusion::Placement { cell, digit }])
                    .with_cells([cell])
                    .with_explanation(format!(
                        "{} can only go in cell {} in {}.",
                        digit,
                        cell_name(cell),
                        sector_name(sector)
                    ))
                    .with_proof(ProofCertificate::Basic {
                        kind: "Hidden Single",
                    }),
            );
        }
    }
    Ok(steps)
}

impl StepSearcher for SinglesSearcher {
    fn name(&self) -> &str {
        "singles"
    }

    fn priority(&self) -> u32 {
        PRIORITY_SINGLES
    }

    fn search(&self, ctx: &SearchContext<'_>) -> Result<Vec<Step>, ChainingError> {
        ctx.check_cancelled()?;
        let mut steps = naked_singles(ctx.cache.fabric());
        steps.extend(hidden_singles(ctx)?);
        Ok(steps)
    }
}
