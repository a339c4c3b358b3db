//! Pointing pairs and box/line reductions.
//!
//! Both are size-1 fish: when a digit's candidates in a base house all lie
//! inside one cover house, the digit leaves the rest of the cover.

use super::{SearchContext, StepSearcher, PRIORITY_INTERSECTIONS};
use crate::error::ChainingError;
use crate::fabric::{sector_name, CandidateFabric, SECTOR_BOX_BASE};
use crate::step::{Conclusion, ProofCertificate, Step, Technique};

#[derive(Debug, Clone, Copy, Default)]
pub struct IntersectionSearcher;

fn intersection_step(
    fab: &CandidateFabric,
    technique: Technique,
    digit: u8,
    base: usize,
    cover: usize,
) -> Option<Step> {
    let base_cells = fab.sector_candidates(base, digit);
    let count = base_cells.count();
    if !(2..=3).contains(&count) {
        return None;
    }
    let cover_cells = fab.sector_candidates(cover, digit);
    // All base cells must lie within the cover sector
    if !base_cells.is_subset(cover_cells) {
        return None;
    }
    let elim = cover_cells - base_cells;
    if elim.is_empty() {
        return None;
    }

    let conclusions = elim
        .iter()
        .map(|cell| Conclusion::Elimination { cell, digit })
        .collect();
    Some(
        Step::new(technique, conclusions)
            .with_cells(base_cells.iter())
            .with_explanation(format!(
                "{}: {} is confined to {} in {}, eliminating from rest of {}.",
                technique,
                digit,
                sector_name(base),
                sector_name(cover),
                sector_name(cover)
            ))
            .with_proof(ProofCertificate::Intersection {
                digit,
                base_sector: base,
                cover_sector: cover,
            }),
    )
}

impl StepSearcher for IntersectionSearcher {
    fn name(&self) -> &str {
        "intersections"
    }

    fn priority(&self) -> u32 {
        PRIORITY_INTERSECTIONS
    }

    fn search(&self, ctx: &SearchContext<'_>) -> Result<Vec<Step>, ChainingError> {
        let fab = ctx.cache.fabric();
        let mut steps = Vec::new();

        // Box to line
        for box_idx in 0..9 {
            ctx.check_cancelled()?;
            let base = SECTOR_BOX_BASE + box_idx;
            for digit in 1..=9u8 {
                steps.extend(
                    (0..SECTOR_BOX_BASE).filter_map(|cover| {
                        intersection_step(fab, Technique::PointingPair, digit, base, cover)
                    }),
                );
            }
        }

        // Line to box
        for line in 0..SECTOR_BOX_BASE {
            ctx.check_cancelled()?;
            for digit in 1..=9u8 {
                steps.extend((0..9).filter_map(|box_idx| {
                    intersection_step(
                        fab,
                        Technique::BoxLineReduction,
                        digit,
                        line,
                        SECTOR_BOX_BASE + box_idx,
                    )
                }));
            }
        }
        Ok(steps)
    }
}
