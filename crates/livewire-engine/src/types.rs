//! Shared types for the live-wire segmentation engine.

use serde::{Deserialize, Serialize};

/// Re-export `RgbaImage` so downstream crates can supply image buffers
/// without depending on `image` directly.
pub use image::RgbaImage;

/// Linear index of a grid cell: `y * width + x`.
///
/// Used to address the parallel arrays in
/// [`SearchState`](crate::search::SearchState).
pub type CellIndex = usize;

/// An integer pixel coordinate inside an image grid.
///
/// Valid pixels satisfy `x < width` and `y < height` for the image they
/// refer to; validity is checked at the engine boundary, not here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Pixel {
    /// Horizontal position (pixels from left edge).
    pub x: u32,
    /// Vertical position (pixels from top edge).
    pub y: u32,
}

impl Pixel {
    /// Create a new pixel coordinate.
    #[must_use]
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    /// Linearize to a [`CellIndex`] for a grid of the given width.
    #[must_use]
    pub const fn to_index(self, width: u32) -> CellIndex {
        self.y as usize * width as usize + self.x as usize
    }

    /// Inverse of [`to_index`](Self::to_index) for a grid of the given
    /// width. Requires `width > 0`.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub const fn from_index(index: CellIndex, width: u32) -> Self {
        Self {
            x: (index % width as usize) as u32,
            y: (index / width as usize) as u32,
        }
    }

    /// Whether `other` is one of this pixel's up-to-8 grid neighbors.
    #[must_use]
    pub const fn is_adjacent(self, other: Self) -> bool {
        let dx = self.x.abs_diff(other.x);
        let dy = self.y.abs_diff(other.y);
        dx <= 1 && dy <= 1 && (dx | dy) != 0
    }
}

/// Image dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Dimensions {
    /// Dimensions of an image buffer.
    #[must_use]
    pub fn of(image: &RgbaImage) -> Self {
        Self {
            width: image.width(),
            height: image.height(),
        }
    }

    /// Whether the pixel lies inside `[0, width) x [0, height)`.
    #[must_use]
    pub const fn contains(self, pixel: Pixel) -> bool {
        pixel.x < self.width && pixel.y < self.height
    }

    /// Total number of grid cells (`width * height`).
    #[must_use]
    pub const fn cell_count(self) -> usize {
        self.width as usize * self.height as usize
    }
}

/// An ordered sequence of pixels from anchor to target inclusive,
/// produced by one search, together with its total traversal cost.
///
/// Immutable once returned by the finder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathSegment {
    pixels: Vec<Pixel>,
    total_cost: f64,
}

impl PathSegment {
    /// Create a new segment from an ordered pixel sequence and its cost.
    #[must_use]
    pub const fn new(pixels: Vec<Pixel>, total_cost: f64) -> Self {
        Self { pixels, total_cost }
    }

    /// Returns `true` if the segment has no pixels.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    /// Number of pixels in the segment.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.pixels.len()
    }

    /// The anchor end of the segment, if any.
    #[must_use]
    pub fn first(&self) -> Option<&Pixel> {
        self.pixels.first()
    }

    /// The target end of the segment, if any.
    #[must_use]
    pub fn last(&self) -> Option<&Pixel> {
        self.pixels.last()
    }

    /// All pixels, anchor first.
    #[must_use]
    pub fn pixels(&self) -> &[Pixel] {
        &self.pixels
    }

    /// Consumes the segment and returns the underlying pixel vector.
    #[must_use]
    pub fn into_pixels(self) -> Vec<Pixel> {
        self.pixels
    }

    /// Total accumulated link cost from anchor to target.
    #[must_use]
    pub const fn cost(&self) -> f64 {
        self.total_cost
    }
}

/// Configuration for the live-wire path finder.
///
/// Results are only comparable (and cacheable) under a fixed
/// configuration; [`SegmentationSession`](crate::session::SegmentationSession)
/// invalidates its path cache when the configuration changes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LiveWireConfig {
    /// Additive per-edge cost biasing the search toward paths with
    /// fewer pixels. Zero leaves the pure color-gradient cost.
    ///
    /// Must be non-negative; negative values would break Dijkstra's
    /// non-negative-weight requirement.
    pub path_length_penalty: f64,
}

impl LiveWireConfig {
    /// Default per-edge path-length penalty (disabled).
    pub const DEFAULT_PATH_LENGTH_PENALTY: f64 = 0.0;
}

impl Default for LiveWireConfig {
    fn default() -> Self {
        Self {
            path_length_penalty: Self::DEFAULT_PATH_LENGTH_PENALTY,
        }
    }
}

/// Errors reported by the live-wire engine.
///
/// Every variant is recoverable: the operation that raised it leaves
/// session and search state untouched, and the caller may retry with
/// valid input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LiveWireError {
    /// A supplied pixel lies outside the image bounds.
    #[error("pixel ({}, {}) outside image bounds {}x{}", pixel.x, pixel.y, dimensions.width, dimensions.height)]
    InvalidPixel {
        /// The out-of-bounds pixel.
        pixel: Pixel,
        /// The bounds it was checked against.
        dimensions: Dimensions,
    },

    /// `preview` or `commit` was invoked without an anchor.
    #[error("no anchor set; call set_anchor first")]
    NoAnchorSet,

    /// `set_anchor` was invoked while an anchor is already pending.
    #[error("anchor already set; commit or abandon the pending selection first")]
    AnchorAlreadySet,

    /// The frontier was exhausted without reaching the target.
    ///
    /// Cannot occur on a connected 8-adjacency grid with finite costs,
    /// but degenerate configurations are reported rather than looping.
    #[error("no path found from ({}, {}) to ({}, {})", anchor.x, anchor.y, target.x, target.y)]
    PathNotFound {
        /// The search anchor.
        anchor: Pixel,
        /// The unreached target.
        target: Pixel,
    },

    /// The search was cancelled before completing.
    ///
    /// Raised when a preview is superseded by a newer one or the
    /// session is reset mid-search; never surfaced to the session user.
    #[error("search cancelled")]
    Cancelled,
}
