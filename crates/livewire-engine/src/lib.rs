//! livewire-engine: Interactive live-wire segmentation (sans-IO).
//!
//! Computes minimum-cost paths between user-selected pixels over an
//! implicit 8-connected grid, where each link is weighted by the
//! Euclidean distance between neighboring RGB colors. Paths hug strong
//! color boundaries, which is what makes click-to-click edge tracing
//! feel "magnetic".
//!
//! This crate has **no I/O or rendering dependencies** -- it operates
//! on in-memory [`RgbaImage`] buffers and returns structured pixel
//! paths. Image loading and overlay drawing live in the host (see the
//! `livewire-trace` binary).
//!
//! Layers, bottom up:
//!
//! - [`cost`]: the link cost function over an image.
//! - [`frontier`]: min-priority queue with lazy deletion.
//! - [`search`]: one incremental Dijkstra expansion, steppable and
//!   cancellable.
//! - [`finder`]: memoization of completed paths across searches.
//! - [`session`]: anchors, previews, committed segments, undo/reset.

pub mod cache;
pub mod cancel;
pub mod cost;
pub mod finder;
pub mod frontier;
pub mod search;
pub mod session;
pub mod types;

pub use cache::PathCache;
pub use cancel::CancelToken;
pub use finder::{FindReport, Lookup, PathFinder};
pub use search::{Search, SearchDiagnostics, SearchState, SearchStatus, SearchStep};
pub use session::SegmentationSession;
pub use types::{
    Dimensions, LiveWireConfig, LiveWireError, PathSegment, Pixel, RgbaImage,
};

/// Compute the minimum-cost path between two pixels of an image.
///
/// One-shot convenience over [`PathFinder`] for callers that do not
/// need caching, cancellation, or session state. The returned
/// segment's pixels run from `anchor` to `target` inclusive, each
/// consecutive pair 8-adjacent.
///
/// # Errors
///
/// Returns [`LiveWireError::InvalidPixel`] if either endpoint is
/// outside the image, or [`LiveWireError::PathNotFound`] if the target
/// is unreachable.
pub fn find_path(
    image: &RgbaImage,
    anchor: Pixel,
    target: Pixel,
    config: &LiveWireConfig,
) -> Result<PathSegment, LiveWireError> {
    let mut finder = PathFinder::new(*config);
    finder.find(image, anchor, target, &CancelToken::new(), None)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use image::Rgba;

    /// A 4x4 image with a white diagonal band on black.
    fn diagonal_band() -> RgbaImage {
        RgbaImage::from_fn(4, 4, |x, y| {
            if x == y {
                Rgba([255, 255, 255, 255])
            } else {
                Rgba([0, 0, 0, 255])
            }
        })
    }

    #[test]
    fn find_path_connects_the_endpoints() {
        let image = diagonal_band();
        let path = find_path(
            &image,
            Pixel::new(0, 3),
            Pixel::new(3, 0),
            &LiveWireConfig::default(),
        )
        .unwrap();

        assert_eq!(path.first(), Some(&Pixel::new(0, 3)));
        assert_eq!(path.last(), Some(&Pixel::new(3, 0)));
        for pair in path.pixels().windows(2) {
            assert!(pair[0].is_adjacent(pair[1]));
        }
    }

    #[test]
    fn find_path_rejects_out_of_bounds_endpoints() {
        let image = diagonal_band();
        let config = LiveWireConfig::default();
        assert!(matches!(
            find_path(&image, Pixel::new(4, 0), Pixel::new(0, 0), &config),
            Err(LiveWireError::InvalidPixel { .. })
        ));
        assert!(matches!(
            find_path(&image, Pixel::new(0, 0), Pixel::new(0, 4), &config),
            Err(LiveWireError::InvalidPixel { .. })
        ));
    }

    #[test]
    fn find_path_follows_the_cheap_band() {
        // Staying on the white diagonal costs zero per link; leaving it
        // costs a full black/white transition. The optimal path is the
        // diagonal itself.
        let image = diagonal_band();
        let path = find_path(
            &image,
            Pixel::new(0, 0),
            Pixel::new(3, 3),
            &LiveWireConfig::default(),
        )
        .unwrap();

        let expected: Vec<Pixel> = (0..4).map(|i| Pixel::new(i, i)).collect();
        assert_eq!(path.pixels(), &expected[..]);
        assert!(path.cost().abs() < f64::EPSILON);
    }
}
