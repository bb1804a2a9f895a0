//! Cooperative cancellation for in-flight searches.
//!
//! A search checks its token between cell expansions, so cancellation
//! takes effect within one settled cell. Each preview supersedes the
//! previous one by tripping the old token before starting; the
//! superseded search then reports
//! [`Cancelled`](crate::types::LiveWireError::Cancelled) instead of
//! delivering a stale path.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Cloneable cancellation flag shared between a search and its owner.
///
/// Clones observe the same flag; a fresh token starts uncancelled.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    /// Create a new, uncancelled token.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Trip the flag. Idempotent.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    /// Whether the flag has been tripped.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_uncancelled() {
        assert!(!CancelToken::new().is_cancelled());
    }

    #[test]
    fn cancel_is_visible_through_clones() {
        let token = CancelToken::new();
        let clone = token.clone();
        token.cancel();
        assert!(clone.is_cancelled());
    }

    #[test]
    fn fresh_token_is_independent() {
        let old = CancelToken::new();
        old.cancel();
        let new = CancelToken::new();
        assert!(!new.is_cancelled());
    }
}
