//! Integration test: cross-check engine paths against a brute-force
//! shortest-path reference on small randomized images.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use livewire_engine::{find_path, LiveWireConfig, PathSegment, Pixel, RgbaImage};

/// Deterministic LCG so the randomized images are reproducible.
struct Lcg(u64);

impl Lcg {
    fn next_byte(&mut self) -> u8 {
        self.0 = self
            .0
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);
        (self.0 >> 56) as u8
    }
}

fn random_image(width: u32, height: u32, seed: u64) -> RgbaImage {
    let mut rng = Lcg(seed);
    RgbaImage::from_fn(width, height, |_, _| {
        image::Rgba([rng.next_byte(), rng.next_byte(), rng.next_byte(), 255])
    })
}

fn link_cost(image: &RgbaImage, p: Pixel, q: Pixel) -> f64 {
    let a = image.get_pixel(p.x, p.y).0;
    let b = image.get_pixel(q.x, q.y).0;
    let dr = f64::from(a[0]) - f64::from(b[0]);
    let dg = f64::from(a[1]) - f64::from(b[1]);
    let db = f64::from(a[2]) - f64::from(b[2]);
    (dr * dr + dg * dg + db * db).sqrt()
}

/// Reference shortest-path cost by exhaustive relaxation (no heap, no
/// early exit): repeatedly scan every cell and relax its neighbors
/// until nothing improves.
fn reference_cost(image: &RgbaImage, anchor: Pixel, target: Pixel) -> f64 {
    let (width, height) = image.dimensions();
    let cells = (width * height) as usize;
    let mut cost = vec![f64::INFINITY; cells];
    cost[(anchor.y * width + anchor.x) as usize] = 0.0;

    let mut changed = true;
    while changed {
        changed = false;
        for y in 0..height {
            for x in 0..width {
                let here = (y * width + x) as usize;
                if cost[here].is_infinite() {
                    continue;
                }
                for dy in -1_i64..=1 {
                    for dx in -1_i64..=1 {
                        if dx == 0 && dy == 0 {
                            continue;
                        }
                        let (nx, ny) = (i64::from(x) + dx, i64::from(y) + dy);
                        if nx < 0 || ny < 0 || nx >= i64::from(width) || ny >= i64::from(height) {
                            continue;
                        }
                        let (nx, ny) = (nx as u32, ny as u32);
                        let there = (ny * width + nx) as usize;
                        let relaxed =
                            cost[here] + link_cost(image, Pixel::new(x, y), Pixel::new(nx, ny));
                        if relaxed < cost[there] {
                            cost[there] = relaxed;
                            changed = true;
                        }
                    }
                }
            }
        }
    }
    cost[(target.y * width + target.x) as usize]
}

/// A returned path must start at the anchor, end at the target, move
/// only between 8-adjacent pixels, never revisit a pixel, and carry a
/// total cost equal to the sum of its link costs.
fn assert_well_formed(image: &RgbaImage, path: &PathSegment, anchor: Pixel, target: Pixel) {
    assert_eq!(path.first(), Some(&anchor));
    assert_eq!(path.last(), Some(&target));

    let mut seen = std::collections::HashSet::new();
    for pixel in path.pixels() {
        assert!(seen.insert(*pixel), "path revisits {pixel:?}");
    }

    let mut sum = 0.0;
    for pair in path.pixels().windows(2) {
        assert!(
            pair[0].is_adjacent(pair[1]),
            "{:?} and {:?} are not 8-adjacent",
            pair[0],
            pair[1]
        );
        sum += link_cost(image, pair[0], pair[1]);
    }
    assert!(
        (sum - path.cost()).abs() < 1e-9,
        "reported cost {} != recomputed {sum}",
        path.cost()
    );
}

#[test]
fn matches_brute_force_on_random_images() {
    let config = LiveWireConfig::default();
    let cases = [
        (5, 5, Pixel::new(0, 0), Pixel::new(4, 4)),
        (5, 5, Pixel::new(4, 0), Pixel::new(0, 4)),
        (6, 4, Pixel::new(0, 2), Pixel::new(5, 1)),
        (3, 7, Pixel::new(1, 0), Pixel::new(1, 6)),
    ];

    for seed in 1..=20_u64 {
        for (width, height, anchor, target) in cases {
            let image = random_image(width, height, seed);
            let path = find_path(&image, anchor, target, &config).unwrap();
            assert_well_formed(&image, &path, anchor, target);

            let expected = reference_cost(&image, anchor, target);
            assert!(
                (path.cost() - expected).abs() < 1e-9,
                "seed {seed}, {width}x{height} {anchor:?} -> {target:?}: \
                 engine {} vs reference {expected}",
                path.cost()
            );
        }
    }
}

#[test]
fn three_pixel_strip_has_the_known_cost() {
    // black | white | black: each link is a full RGB transition.
    let image = RgbaImage::from_fn(3, 1, |x, _| {
        if x == 1 {
            image::Rgba([255, 255, 255, 255])
        } else {
            image::Rgba([0, 0, 0, 255])
        }
    });

    let path = find_path(
        &image,
        Pixel::new(0, 0),
        Pixel::new(2, 0),
        &LiveWireConfig::default(),
    )
    .unwrap();

    let transition = (3.0_f64 * 255.0 * 255.0).sqrt();
    assert_eq!(path.len(), 3);
    assert!((path.cost() - 2.0 * transition).abs() < 1e-9);
}

#[test]
fn equal_cost_ties_prefer_fewer_pixels() {
    // On a uniform image every link costs zero, so all monotone routes
    // tie on cost. The tie must resolve to the shortest pixel
    // sequence: Chebyshev distance plus one.
    let config = LiveWireConfig::default();
    let cases = [
        (8, 8, Pixel::new(0, 0), Pixel::new(7, 7)),
        (9, 5, Pixel::new(1, 4), Pixel::new(8, 0)),
        (9, 5, Pixel::new(0, 0), Pixel::new(8, 4)),
        (6, 6, Pixel::new(5, 2), Pixel::new(0, 2)),
    ];

    for (width, height, anchor, target) in cases {
        let image =
            RgbaImage::from_pixel(width, height, image::Rgba([90, 120, 200, 255]));
        let path = find_path(&image, anchor, target, &config).unwrap();
        assert_well_formed(&image, &path, anchor, target);

        let chebyshev = anchor.x.abs_diff(target.x).max(anchor.y.abs_diff(target.y));
        assert!(path.cost().abs() < f64::EPSILON);
        assert_eq!(
            path.len(),
            chebyshev as usize + 1,
            "{anchor:?} -> {target:?} on {width}x{height} must take the shortest tie"
        );
    }
}

#[test]
fn anchor_equal_to_target_is_a_single_pixel_path() {
    let image = random_image(4, 4, 7);
    let pixel = Pixel::new(2, 1);
    let path = find_path(&image, pixel, pixel, &LiveWireConfig::default()).unwrap();
    assert_eq!(path.pixels(), &[pixel]);
    assert!(path.cost().abs() < f64::EPSILON);
}

#[test]
fn identical_inputs_yield_identical_paths() {
    let image = random_image(6, 6, 99);
    let config = LiveWireConfig::default();
    let anchor = Pixel::new(0, 5);
    let target = Pixel::new(5, 0);

    let first = find_path(&image, anchor, target, &config).unwrap();
    for _ in 0..5 {
        let again = find_path(&image, anchor, target, &config).unwrap();
        assert_eq!(first, again);
    }
    eprintln!(
        "stable path: {} pixels, cost {:.3}",
        first.len(),
        first.cost()
    );
}
