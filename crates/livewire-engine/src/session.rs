//! Segmentation session: committed segments, pending anchor, and the
//! live preview path.
//!
//! The session is the engine's boundary with the host UI. Clicks map to
//! [`set_anchor`](SegmentationSession::set_anchor) and
//! [`commit`](SegmentationSession::commit), pointer moves to
//! [`preview`](SegmentationSession::preview), and the toolbar to
//! [`undo`](SegmentationSession::undo) and
//! [`reset`](SegmentationSession::reset). The session never draws; it
//! returns pixel sequences and cost values for a renderer to consume.
//!
//! Every mutation is atomic: state fields are written only after a
//! search has succeeded, so a failed or cancelled operation leaves the
//! session exactly as it found it.

use std::fmt;

use crate::cancel::CancelToken;
use crate::finder::{FindReport, PathFinder};
use crate::types::{Dimensions, LiveWireConfig, LiveWireError, PathSegment, Pixel, RgbaImage};

/// Callback invoked for every settled cell `(pixel, total cost)`,
/// for frontier visualization.
pub type ProgressObserver = Box<dyn FnMut(Pixel, f64)>;

/// Interactive segmentation state over one image.
///
/// Owns the image buffer, the path finder (with its memoization cache),
/// the stack of committed segments, and the ephemeral anchor/preview
/// state. Created when an image is loaded; replaced or reset when the
/// image changes.
pub struct SegmentationSession {
    image: RgbaImage,
    finder: PathFinder,
    /// Committed segments, oldest first. Grows via commit, shrinks via
    /// undo (pop), clears via reset.
    segments: Vec<PathSegment>,
    anchor: Option<Pixel>,
    temp_path: Option<PathSegment>,
    /// Token of the most recently started search; a new preview
    /// supersedes the previous one by tripping it, and reset trips it
    /// to abort any in-flight operation.
    active_cancel: CancelToken,
    /// Cost of the most recent preview/commit path.
    latest_cost: Option<f64>,
    /// Minimum preview cost seen since the current anchor was set.
    min_cost: Option<f64>,
    observer: Option<ProgressObserver>,
}

impl fmt::Debug for SegmentationSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SegmentationSession")
            .field("dimensions", &self.dimensions())
            .field("segments", &self.segments.len())
            .field("anchor", &self.anchor)
            .field("temp_path", &self.temp_path.as_ref().map(PathSegment::len))
            .field("latest_cost", &self.latest_cost)
            .field("min_cost", &self.min_cost)
            .field("observer", &self.observer.is_some())
            .finish_non_exhaustive()
    }
}

impl SegmentationSession {
    /// Create a session over the given image.
    #[must_use]
    pub fn new(image: RgbaImage, config: LiveWireConfig) -> Self {
        Self {
            image,
            finder: PathFinder::new(config),
            segments: Vec::new(),
            anchor: None,
            temp_path: None,
            active_cancel: CancelToken::new(),
            latest_cost: None,
            min_cost: None,
            observer: None,
        }
    }

    /// Dimensions of the session's image.
    #[must_use]
    pub fn dimensions(&self) -> Dimensions {
        Dimensions::of(&self.image)
    }

    /// The session's image buffer.
    #[must_use]
    pub const fn image(&self) -> &RgbaImage {
        &self.image
    }

    /// Committed segments, oldest first.
    #[must_use]
    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    /// The pending anchor, if one is set.
    #[must_use]
    pub const fn anchor(&self) -> Option<Pixel> {
        self.anchor
    }

    /// The current preview path, if any.
    #[must_use]
    pub const fn temp_path(&self) -> Option<&PathSegment> {
        self.temp_path.as_ref()
    }

    /// Cost of the most recent preview or commit path, for display.
    #[must_use]
    pub const fn latest_cost(&self) -> Option<f64> {
        self.latest_cost
    }

    /// Minimum preview cost seen since the current anchor was set,
    /// for display. Cleared when the anchor clears.
    #[must_use]
    pub const fn min_cost(&self) -> Option<f64> {
        self.min_cost
    }

    /// Report from the most recent search.
    #[must_use]
    pub const fn last_report(&self) -> &FindReport {
        self.finder.last_report()
    }

    /// Current finder configuration.
    #[must_use]
    pub const fn config(&self) -> &LiveWireConfig {
        self.finder.config()
    }

    /// Replace the finder configuration (invalidates the path cache).
    pub fn set_config(&mut self, config: LiveWireConfig) {
        self.finder.set_config(config);
    }

    /// Install or clear the progress observer invoked for every settled
    /// cell during subsequent searches.
    pub fn set_progress_observer(&mut self, observer: Option<ProgressObserver>) {
        self.observer = observer;
    }

    /// Token of the most recently started operation. Tripping it from
    /// another thread aborts that operation at its next expansion.
    #[must_use]
    pub fn cancel_handle(&self) -> CancelToken {
        self.active_cancel.clone()
    }

    /// Set the anchor for the next segment.
    ///
    /// Clears any previous preview path and the per-anchor cost
    /// displays.
    ///
    /// # Errors
    ///
    /// Returns [`LiveWireError::AnchorAlreadySet`] if an anchor is
    /// pending (commit or abandon it first), or
    /// [`LiveWireError::InvalidPixel`] if the pixel is out of bounds.
    /// No state changes on error.
    pub fn set_anchor(&mut self, pixel: Pixel) -> Result<(), LiveWireError> {
        if self.anchor.is_some() {
            return Err(LiveWireError::AnchorAlreadySet);
        }
        self.check_bounds(pixel)?;

        self.anchor = Some(pixel);
        self.temp_path = None;
        self.latest_cost = None;
        self.min_cost = None;
        Ok(())
    }

    /// Compute the live preview path from the anchor to `query` and
    /// store it as the temp path.
    ///
    /// Safe to call on every pointer move: starting a preview
    /// supersedes any prior in-flight one by tripping its cancel token
    /// first, so at most one preview search is ever active and a stale
    /// result can never overwrite a newer temp path. A superseded
    /// search yields `Ok(None)` with the temp path untouched;
    /// cancellation is not an error at this level.
    ///
    /// # Errors
    ///
    /// Returns [`LiveWireError::NoAnchorSet`] if no anchor is pending,
    /// [`LiveWireError::InvalidPixel`] for an out-of-bounds query (both
    /// rejected before any search state is touched), or
    /// [`LiveWireError::PathNotFound`] if the target is unreachable
    /// (the temp path is cleared in that case).
    pub fn preview(&mut self, query: Pixel) -> Result<Option<&PathSegment>, LiveWireError> {
        let cancel = self.supersede();
        self.preview_with_cancel(query, &cancel)
    }

    /// [`preview`](Self::preview) with a caller-supplied cancel token,
    /// for hosts that manage their own preview lifecycle (e.g. a worker
    /// thread cancelling from the UI thread).
    ///
    /// # Errors
    ///
    /// As [`preview`](Self::preview); a tripped token yields `Ok(None)`.
    pub fn preview_with_cancel(
        &mut self,
        query: Pixel,
        cancel: &CancelToken,
    ) -> Result<Option<&PathSegment>, LiveWireError> {
        let anchor = self.anchor.ok_or(LiveWireError::NoAnchorSet)?;
        self.check_bounds(query)?;

        // Reborrow the boxed observer at the local lifetime the finder
        // expects; `as_deref_mut` would pin the trait object to 'static.
        let observer = self
            .observer
            .as_mut()
            .map(|o| &mut **o as &mut dyn FnMut(Pixel, f64));
        match self.finder.find(&self.image, anchor, query, cancel, observer) {
            Ok(segment) => {
                let cost = segment.cost();
                self.latest_cost = Some(cost);
                self.min_cost = Some(self.min_cost.map_or(cost, |m| m.min(cost)));
                self.temp_path = Some(segment);
                Ok(self.temp_path.as_ref())
            }
            Err(LiveWireError::Cancelled) => Ok(None),
            Err(LiveWireError::PathNotFound { anchor, target }) => {
                self.temp_path = None;
                Err(LiveWireError::PathNotFound { anchor, target })
            }
            Err(other) => Err(other),
        }
    }

    /// Finalize the current segment: compute the path from the anchor
    /// to `query`, append it to the committed segments, and clear the
    /// anchor and preview state.
    ///
    /// Returns the committed segment.
    ///
    /// # Errors
    ///
    /// Returns [`LiveWireError::NoAnchorSet`] if no anchor is pending,
    /// [`LiveWireError::InvalidPixel`] for an out-of-bounds query,
    /// [`LiveWireError::PathNotFound`] if the target is unreachable,
    /// or [`LiveWireError::Cancelled`] if an external reset aborted the
    /// search. On error nothing is appended and the anchor stays set.
    pub fn commit(&mut self, query: Pixel) -> Result<&PathSegment, LiveWireError> {
        let anchor = self.anchor.ok_or(LiveWireError::NoAnchorSet)?;
        self.check_bounds(query)?;
        let cancel = self.supersede();

        let observer = self
            .observer
            .as_mut()
            .map(|o| &mut **o as &mut dyn FnMut(Pixel, f64));
        let segment = self
            .finder
            .find(&self.image, anchor, query, &cancel, observer)?;

        self.latest_cost = Some(segment.cost());
        self.min_cost = None;
        let index = self.segments.len();
        self.segments.push(segment);
        self.anchor = None;
        self.temp_path = None;
        Ok(&self.segments[index])
    }

    /// Pop the most recently committed segment, if any, and abandon any
    /// in-progress selection (anchor and preview are cleared either
    /// way). A no-op on an empty stack, not an error.
    pub fn undo(&mut self) {
        self.active_cancel.cancel();
        self.segments.pop();
        self.clear_selection();
    }

    /// Clear all committed segments, the pending selection, and the
    /// path cache, and abort any in-flight search. Idempotent.
    pub fn reset(&mut self) {
        self.active_cancel.cancel();
        self.segments.clear();
        self.clear_selection();
        self.finder.cache().invalidate_all();
    }

    /// Swap in a new image buffer.
    ///
    /// Computed paths do not survive an image change: the session is
    /// reset and the cache invalidated.
    pub fn replace_image(&mut self, image: RgbaImage) {
        self.image = image;
        self.reset();
    }

    /// Clear anchor, preview, and the per-anchor cost displays.
    fn clear_selection(&mut self) {
        self.anchor = None;
        self.temp_path = None;
        self.latest_cost = None;
        self.min_cost = None;
    }

    /// Trip the previous operation's token and install a fresh one.
    fn supersede(&mut self) -> CancelToken {
        self.active_cancel.cancel();
        self.active_cancel = CancelToken::new();
        self.active_cancel.clone()
    }

    fn check_bounds(&self, pixel: Pixel) -> Result<(), LiveWireError> {
        let dimensions = self.dimensions();
        if dimensions.contains(pixel) {
            Ok(())
        } else {
            Err(LiveWireError::InvalidPixel { pixel, dimensions })
        }
    }
}
