//! Link cost derivation from image color data.
//!
//! The cost of traversing between two adjacent pixels is the Euclidean
//! distance between their RGB color vectors: zero where colors are
//! identical, large across strong edges. A minimum-cost path between
//! two points on a boundary therefore runs along the boundary rather
//! than across it.

use image::RgbaImage;

use crate::types::{Dimensions, Pixel};

/// Derives traversal costs from a borrowed image buffer.
///
/// Pure and stateless: the same pixel pair always yields the same cost
/// for the lifetime of the borrow. The alpha channel is ignored.
#[derive(Debug, Clone, Copy)]
pub struct CostField<'a> {
    image: &'a RgbaImage,
}

impl<'a> CostField<'a> {
    /// Borrow an image buffer for cost queries.
    #[must_use]
    pub const fn new(image: &'a RgbaImage) -> Self {
        Self { image }
    }

    /// Dimensions of the underlying image.
    #[must_use]
    pub fn dimensions(&self) -> Dimensions {
        Dimensions::of(self.image)
    }

    /// Cost of traversing from `p` to `q`.
    ///
    /// Defined for 8-adjacent in-bounds pixel pairs; callers (the
    /// search loop) only ever query such pairs. Symmetric:
    /// `link_cost(p, q) == link_cost(q, p)`. Always non-negative.
    #[must_use]
    pub fn link_cost(&self, p: Pixel, q: Pixel) -> f64 {
        debug_assert!(p.is_adjacent(q), "link cost queried for non-adjacent pixels");

        let a = self.image.get_pixel(p.x, p.y).0;
        let b = self.image.get_pixel(q.x, q.y).0;

        // RGB channels only; alpha carries no boundary information.
        let dr = f64::from(a[0]) - f64::from(b[0]);
        let dg = f64::from(a[1]) - f64::from(b[1]);
        let db = f64::from(a[2]) - f64::from(b[2]);
        db.mul_add(db, dr.mul_add(dr, dg * dg)).sqrt()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn two_pixel_image(left: [u8; 4], right: [u8; 4]) -> RgbaImage {
        let mut img = RgbaImage::new(2, 1);
        img.put_pixel(0, 0, Rgba(left));
        img.put_pixel(1, 0, Rgba(right));
        img
    }

    #[test]
    fn identical_colors_cost_zero() {
        let img = two_pixel_image([120, 80, 40, 255], [120, 80, 40, 255]);
        let field = CostField::new(&img);
        let cost = field.link_cost(Pixel::new(0, 0), Pixel::new(1, 0));
        assert!(cost.abs() < f64::EPSILON);
    }

    #[test]
    fn black_white_cost_is_channel_distance() {
        let img = two_pixel_image([0, 0, 0, 255], [255, 255, 255, 255]);
        let field = CostField::new(&img);
        let cost = field.link_cost(Pixel::new(0, 0), Pixel::new(1, 0));
        let expected = (3.0_f64 * 255.0 * 255.0).sqrt();
        assert!((cost - expected).abs() < 1e-9, "got {cost}, expected {expected}");
    }

    #[test]
    fn cost_is_symmetric() {
        let img = two_pixel_image([10, 200, 30, 255], [90, 15, 220, 255]);
        let field = CostField::new(&img);
        let forward = field.link_cost(Pixel::new(0, 0), Pixel::new(1, 0));
        let backward = field.link_cost(Pixel::new(1, 0), Pixel::new(0, 0));
        assert!((forward - backward).abs() < f64::EPSILON);
    }

    #[test]
    fn alpha_is_ignored() {
        let opaque = two_pixel_image([50, 60, 70, 255], [50, 60, 70, 255]);
        let transparent = two_pixel_image([50, 60, 70, 0], [50, 60, 70, 255]);
        let a = CostField::new(&opaque).link_cost(Pixel::new(0, 0), Pixel::new(1, 0));
        let b = CostField::new(&transparent).link_cost(Pixel::new(0, 0), Pixel::new(1, 0));
        assert!((a - b).abs() < f64::EPSILON);
    }

    #[test]
    fn single_channel_difference() {
        let img = two_pixel_image([0, 0, 0, 255], [0, 100, 0, 255]);
        let field = CostField::new(&img);
        let cost = field.link_cost(Pixel::new(0, 0), Pixel::new(1, 0));
        assert!((cost - 100.0).abs() < 1e-9);
    }
}
