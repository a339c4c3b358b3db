//! Step records handed to the gathering façade's consumer.
//!
//! Searchers return `Step`s: what was found, what it proves, which cells it
//! involves, a one-line explanation and an optional structural proof.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::chaining::link::Inference;
use crate::chaining::node::Node;
use crate::fabric::cell_name;

/// Technique a step was found with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Technique {
    // Singles
    NakedSingle,
    HiddenSingle,

    // Intersections
    PointingPair,
    BoxLineReduction,

    // Single-digit chains
    XChain,
    XCycle,
    GroupedXChain,
    GroupedXCycle,

    // Multi-digit chains
    Aic,
    ContinuousNiceLoop,
    GroupedAic,
    GroupedContinuousNiceLoop,
}

impl Technique {
    pub fn is_chain(&self) -> bool {
        *self >= Technique::XChain
    }
}

impl fmt::Display for Technique {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Technique::NakedSingle => write!(f, "Naked Single"),
            Technique::HiddenSingle => write!(f, "Hidden Single"),
            Technique::PointingPair => write!(f, "Pointing Pair"),
            Technique::BoxLineReduction => write!(f, "Box/Line Reduction"),
            Technique::XChain => write!(f, "X-Chain"),
            Technique::XCycle => write!(f, "X-Cycle"),
            Technique::GroupedXChain => write!(f, "Grouped X-Chain"),
            Technique::GroupedXCycle => write!(f, "Grouped X-Cycle"),
            Technique::Aic => write!(f, "AIC"),
            Technique::ContinuousNiceLoop => write!(f, "Continuous Nice Loop"),
            Technique::GroupedAic => write!(f, "Grouped AIC"),
            Technique::GroupedContinuousNiceLoop => write!(f, "Grouped Continuous Nice Loop"),
        }
    }
}

/// One proven fact about the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Conclusion {
    /// Place this digit in this cell
    Placement { cell: usize, digit: u8 },
    /// Remove this candidate from this cell
    Elimination { cell: usize, digit: u8 },
}

impl Conclusion {
    pub fn cell(&self) -> usize {
        match self {
            Conclusion::Placement { cell, .. } | Conclusion::Elimination { cell, .. } => *cell,
        }
    }

    pub fn digit(&self) -> u8 {
        match self {
            Conclusion::Placement { digit, .. } | Conclusion::Elimination { digit, .. } => *digit,
        }
    }
}

impl fmt::Display for Conclusion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Conclusion::Placement { cell, digit } => write!(f, "{}={}", cell_name(*cell), digit),
            Conclusion::Elimination { cell, digit } => {
                write!(f, "{}<>{}", cell_name(*cell), digit)
            }
        }
    }
}

// ==================== Proof Certificates ====================

/// Structural evidence justifying a step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProofCertificate {
    /// Direct deduction from cell or house constraints.
    Basic { kind: &'static str },
    /// A digit confined to the intersection of two houses.
    Intersection {
        digit: u8,
        base_sector: usize,
        cover_sector: usize,
    },
    /// Alternating inference path; `closed` when the last link returns to
    /// the first node.
    Chain {
        nodes: Vec<Node>,
        links: Vec<Inference>,
        closed: bool,
    },
}

/// A finding from a searcher.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Step {
    pub technique: Technique,
    pub conclusions: Vec<Conclusion>,
    /// Cells the reasoning looks at
    pub involved_cells: Vec<usize>,
    pub explanation: String,
    /// Structural proof (not serialized)
    #[serde(skip)]
    pub proof: Option<ProofCertificate>,
}

impl Step {
    pub fn new(technique: Technique, conclusions: Vec<Conclusion>) -> Self {
        Step {
            technique,
            conclusions,
            involved_cells: Vec::new(),
            explanation: String::new(),
            proof: None,
        }
    }

    pub fn with_cells(mut self, cells: impl IntoIterator<Item = usize>) -> Self {
        self.involved_cells = cells.into_iter().collect();
        self
    }

    pub fn with_explanation(mut self, explanation: impl Into<String>) -> Self {
        self.explanation = explanation.into();
        self
    }

    pub fn with_proof(mut self, proof: ProofCertificate) -> Self {
        self.proof = Some(proof);
        self
    }

    pub fn placements(&self) -> impl Iterator<Item = &Conclusion> {
        self.conclusions
            .iter()
            .filter(|c| matches!(c, Conclusion::Placement { .. }))
    }

    pub fn eliminations(&self) -> impl Iterator<Item = &Conclusion> {
        self.conclusions
            .iter()
            .filter(|c| matches!(c, Conclusion::Elimination { .. }))
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let conclusions: Vec<String> = self.conclusions.iter().map(|c| c.to_string()).collect();
        write!(f, "{}: {} => {}", self.technique, self.explanation, conclusions.join(", "))
    }
}
