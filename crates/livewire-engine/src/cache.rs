//! Memoization of finder results keyed by (anchor, target) pixel pairs.
//!
//! The cursor often revisits pixels during a preview drag, and the
//! commit click re-queries the exact pair the last preview computed, so
//! a hit skips the whole search. Keys are *ordered* pairs: link costs
//! are symmetric but paths are reconstructed directionally, and the two
//! directions are cached independently.
//!
//! The cache is the only state shared between searches, so lookups and
//! stores go through a lock; concurrent stores are last-write-wins.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use crate::types::{Dimensions, PathSegment, Pixel};

/// Path memoization cache, invalidated wholesale on image change.
#[derive(Debug, Default)]
pub struct PathCache {
    inner: RwLock<CacheInner>,
}

#[derive(Debug, Default)]
struct CacheInner {
    entries: HashMap<(Pixel, Pixel), PathSegment>,
    /// Dimensions the entries were computed under; a mismatch on the
    /// next validation clears the cache.
    dimensions: Option<Dimensions>,
}

impl PathCache {
    /// Create an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a cached path for the ordered `(anchor, target)` pair.
    #[must_use]
    pub fn lookup(&self, anchor: Pixel, target: Pixel) -> Option<PathSegment> {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        inner.entries.get(&(anchor, target)).cloned()
    }

    /// Store a path for the ordered `(anchor, target)` pair,
    /// overwriting any previous entry (last write wins).
    pub fn store(&self, anchor: Pixel, target: Pixel, path: PathSegment) {
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        inner.entries.insert((anchor, target), path);
    }

    /// Drop every entry.
    pub fn invalidate_all(&self) {
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        inner.entries.clear();
        inner.dimensions = None;
    }

    /// Clear the cache if `dimensions` differ from those the entries
    /// were stored under, then record the new dimensions.
    ///
    /// Called by the finder before every search so a resized image can
    /// never serve paths computed for the old grid.
    pub fn validate_dimensions(&self, dimensions: Dimensions) {
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        if inner.dimensions != Some(dimensions) {
            inner.entries.clear();
            inner.dimensions = Some(dimensions);
        }
    }

    /// Number of cached paths.
    #[must_use]
    pub fn len(&self) -> usize {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        inner.entries.len()
    }

    /// Returns `true` if no paths are cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
