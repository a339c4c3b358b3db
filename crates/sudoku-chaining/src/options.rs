//! Configuration for link collection and chain search.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::chaining::link::{LinkOption, LinkType, LinkTypes};
use crate::error::ChainingError;

/// Options controlling which links are collected and how patterns are kept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChainingOptions {
    /// Link families requested for chain search.
    pub link_types: LinkTypes,
    /// Grouped-node policy per family; missing entries mean [`LinkOption::All`].
    pub link_options: BTreeMap<LinkType, LinkOption>,
    /// Largest almost locked set (in cells) the ALS family enumerates.
    pub max_als_size: usize,
    /// Largest base-line count the fish family enumerates.
    pub max_fish_size: usize,
    /// Drop patterns that yield no placement or elimination.
    pub require_conclusions: bool,
}

impl Default for ChainingOptions {
    fn default() -> Self {
        Self {
            link_types: LinkTypes::ELEMENTARY,
            link_options: BTreeMap::new(),
            max_als_size: 4,
            max_fish_size: 3,
            require_conclusions: true,
        }
    }
}

impl ChainingOptions {
    /// Single-digit, single-cell and locked-candidate links.
    pub fn elementary() -> Self {
        Self::default()
    }

    /// Every link family.
    pub fn advanced() -> Self {
        Self {
            link_types: LinkTypes::ALL,
            ..Self::default()
        }
    }

    /// Builder: request a different set of link families.
    pub fn with_link_types(mut self, link_types: LinkTypes) -> Self {
        self.link_types = link_types;
        self
    }

    /// Builder: set the grouped-node policy of one family.
    pub fn with_link_option(mut self, link_type: LinkType, option: LinkOption) -> Self {
        self.link_options.insert(link_type, option);
        self
    }

    pub fn link_option(&self, link_type: LinkType) -> LinkOption {
        self.link_options
            .get(&link_type)
            .copied()
            .unwrap_or_default()
    }

    /// Check ranges; called before any collection work starts.
    pub fn validate(&self) -> Result<(), ChainingError> {
        LinkTypes::from_bits(self.link_types.bits())?;
        if !(2..=8).contains(&self.max_als_size) {
            return Err(ChainingError::invalid_option(
                "max_als_size",
                format!("{} is outside 2..=8", self.max_als_size),
            ));
        }
        if !(2..=4).contains(&self.max_fish_size) {
            return Err(ChainingError::invalid_option(
                "max_fish_size",
                format!("{} is outside 2..=4", self.max_fish_size),
            ));
        }
        Ok(())
    }
}
