//! Cooperative cancellation shared by every unit of work in one analysis.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::ChainingError;

/// Cloneable flag; every clone observes the same cancellation.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    flag: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// `Err(Cancelled)` once the token has been cancelled.
    pub fn check(&self) -> Result<(), ChainingError> {
        if self.is_cancelled() {
            Err(ChainingError::Cancelled)
        } else {
            Ok(())
        }
    }
}

/// `check` on an optional token.
pub(crate) fn check(token: Option<&CancellationToken>) -> Result<(), ChainingError> {
    token.map_or(Ok(()), CancellationToken::check)
}
