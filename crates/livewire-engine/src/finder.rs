//! Search orchestration: memoization, cancellation, and progress.
//!
//! [`PathFinder`] owns the reusable [`SearchState`] buffer and the
//! [`PathCache`], and drives one [`Search`] at a time to completion.
//! A cache hit returns immediately with no state mutation; a miss runs
//! the expansion, stores the result, and records a [`FindReport`] for
//! diagnostics display.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::cache::PathCache;
use crate::cancel::CancelToken;
use crate::search::{Search, SearchDiagnostics, SearchState, SearchStep};
use crate::types::{Dimensions, LiveWireConfig, LiveWireError, PathSegment, Pixel, RgbaImage};

/// Serde support for `std::time::Duration` as fractional seconds.
mod duration_serde {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    /// Serialize a `Duration` as fractional seconds (`f64`).
    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        duration.as_secs_f64().serialize(serializer)
    }

    /// Deserialize a `Duration` from fractional seconds (`f64`).
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(secs).map_err(|_| {
            serde::de::Error::custom(
                "duration seconds must be finite, non-negative, and representable as a Duration",
            )
        })
    }
}

/// Diagnostics from the most recent [`PathFinder::find`] call.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct FindReport {
    /// Whether the result came from the cache without searching.
    pub cache_hit: bool,
    /// Expansion counters (all zero on a cache hit).
    pub diagnostics: SearchDiagnostics,
    /// Wall-clock duration of the call (seconds when serialized).
    #[serde(with = "duration_serde")]
    pub duration: Duration,
}

/// Outcome of [`PathFinder::begin`]: either a memoized path or a
/// ready-to-step search.
#[derive(Debug)]
pub enum Lookup<'a> {
    /// The pair was cached; no search was started.
    Hit(PathSegment),
    /// Cache miss: a seeded search the caller drives via
    /// [`Search::step`]. Completed results are not stored
    /// automatically; use [`PathFinder::cache`] to memoize them.
    Search(Search<'a>),
}

/// Orchestrates repeated shortest-path queries over one image grid.
#[derive(Debug, Default)]
pub struct PathFinder {
    config: LiveWireConfig,
    state: SearchState,
    cache: PathCache,
    last_report: FindReport,
}

impl PathFinder {
    /// Create a finder with the given configuration.
    #[must_use]
    pub fn new(config: LiveWireConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Current configuration.
    #[must_use]
    pub const fn config(&self) -> &LiveWireConfig {
        &self.config
    }

    /// Replace the configuration.
    ///
    /// Invalidates the cache: memoized paths are only valid under the
    /// penalty they were computed with.
    pub fn set_config(&mut self, config: LiveWireConfig) {
        if config != self.config {
            self.config = config;
            self.cache.invalidate_all();
        }
    }

    /// The memoization cache.
    #[must_use]
    pub const fn cache(&self) -> &PathCache {
        &self.cache
    }

    /// Report from the most recent [`find`](Self::find) call.
    #[must_use]
    pub const fn last_report(&self) -> &FindReport {
        &self.last_report
    }

    /// Check the cache and, on a miss, seed a search for the caller to
    /// drive incrementally.
    ///
    /// The same image-identity caveat as [`find`](Self::find) applies.
    ///
    /// # Errors
    ///
    /// Returns [`LiveWireError::InvalidPixel`] if either endpoint lies
    /// outside the image.
    pub fn begin<'a>(
        &'a mut self,
        image: &'a RgbaImage,
        anchor: Pixel,
        target: Pixel,
    ) -> Result<Lookup<'a>, LiveWireError> {
        self.cache.validate_dimensions(Dimensions::of(image));
        if let Some(hit) = self.cache.lookup(anchor, target) {
            return Ok(Lookup::Hit(hit));
        }
        let search = Search::new(image, &mut self.state, anchor, target, &self.config)?;
        Ok(Lookup::Search(search))
    }

    /// Find the minimum-cost path from `anchor` to `target`.
    ///
    /// Returns the cached path when available; otherwise runs a full
    /// search, invoking `observer` for every settled cell and checking
    /// `cancel` between expansions, then memoizes the result.
    ///
    /// The cache self-invalidates when the image dimensions change, but
    /// it cannot detect new pixel content behind the same dimensions:
    /// callers that swap in a different same-sized image must first
    /// call [`PathCache::invalidate_all`] on [`cache`](Self::cache), as
    /// `SegmentationSession::replace_image` does.
    ///
    /// # Errors
    ///
    /// Returns [`LiveWireError::InvalidPixel`] for out-of-bounds
    /// endpoints, [`LiveWireError::Cancelled`] if the token trips
    /// mid-search, and [`LiveWireError::PathNotFound`] if the frontier
    /// exhausts without reaching the target. Nothing is cached on
    /// error.
    pub fn find(
        &mut self,
        image: &RgbaImage,
        anchor: Pixel,
        target: Pixel,
        cancel: &CancelToken,
        mut observer: Option<&mut dyn FnMut(Pixel, f64)>,
    ) -> Result<PathSegment, LiveWireError> {
        let started = Instant::now();
        self.cache.validate_dimensions(Dimensions::of(image));

        if let Some(hit) = self.cache.lookup(anchor, target) {
            self.last_report = FindReport {
                cache_hit: true,
                diagnostics: SearchDiagnostics::default(),
                duration: started.elapsed(),
            };
            return Ok(hit);
        }

        let mut search = Search::new(image, &mut self.state, anchor, target, &self.config)?;
        loop {
            if cancel.is_cancelled() {
                return Err(LiveWireError::Cancelled);
            }
            match search.step() {
                SearchStep::Settled { pixel, cost } => {
                    if let Some(ref mut observer) = observer {
                        observer(pixel, cost);
                    }
                }
                SearchStep::Finished => break,
            }
        }

        let diagnostics = search.diagnostics();
        let segment = search.finish()?;
        self.cache.store(anchor, target, segment.clone());
        self.last_report = FindReport {
            cache_hit: false,
            diagnostics,
            duration: started.elapsed(),
        };
        Ok(segment)
    }
}
