//! Error types shared by the link collector, the chain driver and the
//! gathering façade.

use thiserror::Error;

/// Canonical error type for the chaining engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChainingError {
    /// A link-type mask carried bits that name no link family.
    #[error("undefined link type bits: {0:#06x}")]
    UndefinedLinkType(u16),
    /// A configuration value was out of range.
    #[error("invalid option `{name}`: {reason}")]
    InvalidOption { name: &'static str, reason: String },
    /// The worker pool could not be created.
    #[error("failed to build worker pool: {0}")]
    ThreadPool(String),
    /// The shared cancellation token was observed.
    #[error("operation cancelled")]
    Cancelled,
    /// A searcher panicked while running on the pool.
    #[error("searcher `{searcher}` panicked: {message}")]
    SearcherPanicked { searcher: String, message: String },
}

impl ChainingError {
    /// Convenience constructor for [`ChainingError::InvalidOption`].
    pub fn invalid_option(name: &'static str, reason: impl Into<String>) -> Self {
        ChainingError::InvalidOption {
            name,
            reason: reason.into(),
        }
    }

    /// Whether this error is the cooperative cancellation outcome.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, ChainingError::Cancelled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        assert_eq!(
            ChainingError::UndefinedLinkType(0x80).to_string(),
            "undefined link type bits: 0x0080"
        );
        assert_eq!(
            ChainingError::invalid_option("max_fish_size", "must be in 2..=4").to_string(),
            "invalid option `max_fish_size`: must be in 2..=4"
        );
        assert!(ChainingError::Cancelled.is_cancelled());
        assert!(!ChainingError::ThreadPool("x".into()).is_cancelled());
    }
}
