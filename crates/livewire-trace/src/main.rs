//! livewire-trace: replay a click script through the live-wire engine
//! and render the traced segments over the source image.
//!
//! Clicks alternate anchor / commit, matching the interactive
//! convention: the 1st, 3rd, 5th... click sets an anchor, each
//! following click commits the minimum-cost path from that anchor.
//! A trailing unpaired click leaves a pending anchor, which can be
//! combined with `--preview` to render the live preview path.
//!
//! # Usage
//!
//! ```text
//! cargo run --release --bin livewire-trace -- photo.png \
//!     --output traced.png 10,20 200,40 200,40 180,300
//! ```

#![allow(clippy::print_stdout, clippy::print_stderr)]

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use image::{Rgba, RgbaImage};
use livewire_engine::{
    FindReport, LiveWireConfig, PathSegment, Pixel, SegmentationSession,
};
use tiny_skia::{LineCap, LineJoin, Paint, PathBuilder, Pixmap, Stroke, StrokeDash, Transform};

/// Replay a click script through the live-wire engine, print per-path
/// search diagnostics, and render the traced segments over the image.
#[derive(Parser)]
#[command(name = "livewire-trace", version)]
struct Cli {
    /// Path to the input image (PNG, JPEG, BMP, WebP).
    image_path: PathBuf,

    /// Clicks as "X,Y" pixel coordinates, in order. Odd-numbered
    /// clicks set an anchor, even-numbered clicks commit a segment.
    #[arg(value_name = "X,Y", required = true)]
    clicks: Vec<String>,

    /// Write the rendered overlay image (PNG recommended).
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Render the preview path from a trailing unpaired anchor to this
    /// point, as a dashed overlay.
    #[arg(long, value_name = "X,Y")]
    preview: Option<String>,

    /// Additive per-edge path-length penalty.
    #[arg(long, default_value_t = LiveWireConfig::DEFAULT_PATH_LENGTH_PENALTY)]
    penalty: f64,

    /// Stroke width for rendered paths, in pixels.
    #[arg(long, default_value_t = 2.0)]
    line_width: f32,

    /// Output diagnostics as JSON instead of a human-readable report.
    #[arg(long)]
    json: bool,
}

/// One committed or previewed path plus the search report behind it.
struct TraceRecord {
    anchor: Pixel,
    target: Pixel,
    preview: bool,
    pixels: usize,
    cost: f64,
    report: FindReport,
}

/// Parse an "X,Y" click into a pixel coordinate.
fn parse_pixel(s: &str) -> Result<Pixel, String> {
    let (x_str, y_str) = s
        .split_once(',')
        .ok_or_else(|| format!("click must be 'X,Y', got: '{s}'"))?;
    let x: u32 = x_str
        .trim()
        .parse()
        .map_err(|e| format!("invalid click X '{x_str}': {e}"))?;
    let y: u32 = y_str
        .trim()
        .parse()
        .map_err(|e| format!("invalid click Y '{y_str}': {e}"))?;
    Ok(Pixel::new(x, y))
}

// ---------------------------------------------------------------------------
// Overlay rendering via tiny-skia
// ---------------------------------------------------------------------------

/// Stroke a pixel path through cell centers. Committed segments are
/// solid dark red; the preview is dashed translucent red.
#[allow(clippy::cast_precision_loss)]
fn stroke_segment(pixmap: &mut Pixmap, segment: &PathSegment, line_width: f32, preview: bool) {
    let mut pb = PathBuilder::new();
    if let Some(first) = segment.first() {
        pb.move_to(first.x as f32 + 0.5, first.y as f32 + 0.5);
        for p in &segment.pixels()[1..] {
            pb.line_to(p.x as f32 + 0.5, p.y as f32 + 0.5);
        }
    }
    let Some(path) = pb.finish() else {
        return;
    };

    let mut paint = Paint::default();
    if preview {
        paint.set_color_rgba8(255, 64, 64, 200);
    } else {
        paint.set_color_rgba8(139, 0, 0, 255);
    }
    paint.anti_alias = true;

    let stroke = Stroke {
        width: line_width,
        line_cap: LineCap::Round,
        line_join: LineJoin::Round,
        dash: if preview {
            StrokeDash::new(vec![4.0, 4.0], 0.0)
        } else {
            None
        },
        ..Stroke::default()
    };

    pixmap.stroke_path(&path, &paint, &stroke, Transform::identity(), None);
}

/// Composite the stroke pixmap (premultiplied RGBA) over the original
/// image with a straight source-over blend.
#[allow(clippy::cast_possible_truncation)]
fn composite_over(original: &RgbaImage, overlay: &Pixmap) -> RgbaImage {
    let data = overlay.data();
    let mut out = original.clone();

    for (i, pixel) in out.pixels_mut().enumerate() {
        let off = i * 4;
        let a = u16::from(data[off + 3]);
        if a == 0 {
            continue;
        }
        // Overlay channels are premultiplied, so source-over reduces to
        // src + dst * (1 - alpha).
        let blend = |src: u8, dst: u8| -> u8 {
            let v = u16::from(src) + u16::from(dst) * (255 - a) / 255;
            v.min(255) as u8
        };
        *pixel = Rgba([
            blend(data[off], pixel[0]),
            blend(data[off + 1], pixel[1]),
            blend(data[off + 2], pixel[2]),
            blend(data[off + 3], pixel[3]),
        ]);
    }
    out
}

// ---------------------------------------------------------------------------
// Diagnostics output
// ---------------------------------------------------------------------------

fn print_report(records: &[TraceRecord]) {
    println!(
        "{:<4} {:>9} {:>9} {:>7} {:>10} {:>6} {:>9} {:>7} {:>11}",
        "#", "anchor", "target", "pixels", "cost", "cache", "settled", "stale", "duration",
    );
    println!("{}", "-".repeat(80));
    for (i, r) in records.iter().enumerate() {
        let kind = if r.preview { "p" } else { "" };
        println!(
            "{:<4} {:>9} {:>9} {:>7} {:>10.2} {:>6} {:>9} {:>7} {:>9.3}ms",
            format!("{}{kind}", i + 1),
            format!("{},{}", r.anchor.x, r.anchor.y),
            format!("{},{}", r.target.x, r.target.y),
            r.pixels,
            r.cost,
            if r.report.cache_hit { "hit" } else { "miss" },
            r.report.diagnostics.cells_settled,
            r.report.diagnostics.stale_entries,
            r.report.duration.as_secs_f64() * 1000.0,
        );
    }
}

fn json_report(records: &[TraceRecord]) -> serde_json::Value {
    serde_json::Value::Array(
        records
            .iter()
            .map(|r| {
                serde_json::json!({
                    "anchor": { "x": r.anchor.x, "y": r.anchor.y },
                    "target": { "x": r.target.x, "y": r.target.y },
                    "preview": r.preview,
                    "pixels": r.pixels,
                    "cost": r.cost,
                    "cache_hit": r.report.cache_hit,
                    "cells_settled": r.report.diagnostics.cells_settled,
                    "stale_entries": r.report.diagnostics.stale_entries,
                    "frontier_pushes": r.report.diagnostics.frontier_pushes,
                    "duration_secs": r.report.duration.as_secs_f64(),
                })
            })
            .collect(),
    )
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

#[allow(clippy::too_many_lines)]
fn main() -> ExitCode {
    let cli = Cli::parse();

    let clicks: Vec<Pixel> = match cli.clicks.iter().map(|s| parse_pixel(s)).collect() {
        Ok(clicks) => clicks,
        Err(msg) => {
            eprintln!("{msg}");
            return ExitCode::FAILURE;
        }
    };

    let image = match image::open(&cli.image_path) {
        Ok(img) => img.to_rgba8(),
        Err(e) => {
            eprintln!("Error reading {}: {e}", cli.image_path.display());
            return ExitCode::FAILURE;
        }
    };
    let (width, height) = image.dimensions();
    eprintln!(
        "Image: {} ({width}x{height}), {} clicks",
        cli.image_path.display(),
        clicks.len(),
    );

    let config = LiveWireConfig {
        path_length_penalty: cli.penalty,
    };
    let mut session = SegmentationSession::new(image, config);
    let mut records = Vec::new();

    // Replay the script: odd clicks anchor, even clicks commit.
    for pair in clicks.chunks(2) {
        let anchor = pair[0];
        if let Err(e) = session.set_anchor(anchor) {
            eprintln!("Click {anchor:?}: {e}");
            return ExitCode::FAILURE;
        }
        let Some(&target) = pair.get(1) else {
            break;
        };
        match session.commit(target) {
            Ok(segment) => {
                records.push(TraceRecord {
                    anchor,
                    target,
                    preview: false,
                    pixels: segment.len(),
                    cost: segment.cost(),
                    report: *session.last_report(),
                });
            }
            Err(e) => {
                eprintln!("Path {anchor:?} -> {target:?}: {e}");
                return ExitCode::FAILURE;
            }
        }
    }

    // Optional preview from a trailing unpaired anchor.
    if let Some(ref spec) = cli.preview {
        let target = match parse_pixel(spec) {
            Ok(p) => p,
            Err(msg) => {
                eprintln!("--preview: {msg}");
                return ExitCode::FAILURE;
            }
        };
        let Some(anchor) = session.anchor() else {
            eprintln!("--preview requires an odd number of clicks (a pending anchor)");
            return ExitCode::FAILURE;
        };
        match session.preview(target) {
            Ok(Some(segment)) => {
                records.push(TraceRecord {
                    anchor,
                    target,
                    preview: true,
                    pixels: segment.len(),
                    cost: segment.cost(),
                    report: *session.last_report(),
                });
            }
            Ok(None) => {}
            Err(e) => {
                eprintln!("Preview {anchor:?} -> {target:?}: {e}");
                return ExitCode::FAILURE;
            }
        }
    }

    if cli.json {
        match serde_json::to_string_pretty(&json_report(&records)) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                eprintln!("Error serializing diagnostics: {e}");
                return ExitCode::FAILURE;
            }
        }
    } else {
        print_report(&records);
    }

    if let Some(ref output) = cli.output {
        let Some(mut pixmap) = Pixmap::new(width, height) else {
            eprintln!("Image dimensions {width}x{height} are not renderable");
            return ExitCode::FAILURE;
        };
        for segment in session.segments() {
            stroke_segment(&mut pixmap, segment, cli.line_width, false);
        }
        if let Some(preview) = session.temp_path() {
            stroke_segment(&mut pixmap, preview, cli.line_width, true);
        }

        let composed = composite_over(session.image(), &pixmap);
        if let Err(e) = composed.save(output) {
            eprintln!("Error writing {}: {e}", output.display());
            return ExitCode::FAILURE;
        }
        eprintln!("Overlay written to {}", output.display());
    }

    ExitCode::SUCCESS
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn parse_pixel_accepts_whitespace() {
        assert_eq!(parse_pixel("10, 20").unwrap(), Pixel::new(10, 20));
        assert_eq!(parse_pixel("0,0").unwrap(), Pixel::new(0, 0));
    }

    #[test]
    fn parse_pixel_rejects_malformed_input() {
        assert!(parse_pixel("10").is_err());
        assert!(parse_pixel("10,").is_err());
        assert!(parse_pixel("-1,5").is_err());
        assert!(parse_pixel("a,b").is_err());
    }
}
