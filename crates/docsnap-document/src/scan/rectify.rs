// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Rectification — turn a photo of a page into a flat, cropped scan.
//
// `Rectifier` is the seam the capture pipeline calls through. `SoftScanner`
// is the built-in implementation: outline detection followed by a
// four-point perspective warp.

use docsnap_core::error::{DocsnapError, Result};
use image::{Rgba, RgbaImage};
use imageproc::geometric_transformations::{Interpolation, Projection, warp_into};
use tracing::{info, instrument, warn};

use crate::scan::outline::{DEFAULT_ANALYSIS_WIDTH, Quad, detect_document_outline};

/// A routine that straightens a document photo.
///
/// Both buffers are 4-channel 8-bit. On success `output` holds the corrected
/// scan (its size is chosen by the implementation). On failure `output` must
/// be left untouched.
pub trait Rectifier: Send {
    fn rectify(&self, input: &RgbaImage, output: &mut RgbaImage) -> Result<()>;
}

impl<T: Rectifier + ?Sized> Rectifier for Box<T> {
    fn rectify(&self, input: &RgbaImage, output: &mut RgbaImage) -> Result<()> {
        (**self).rectify(input, output)
    }
}

/// Software document scanner.
#[derive(Debug, Clone, Copy)]
pub struct SoftScanner {
    /// Width of the working copy used for outline detection.
    pub analysis_width: u32,
}

impl Default for SoftScanner {
    fn default() -> Self {
        Self {
            analysis_width: DEFAULT_ANALYSIS_WIDTH,
        }
    }
}

impl SoftScanner {
    pub fn new(analysis_width: u32) -> Self {
        Self { analysis_width }
    }
}

impl Rectifier for SoftScanner {
    #[instrument(skip_all, fields(width = input.width(), height = input.height()))]
    fn rectify(&self, input: &RgbaImage, output: &mut RgbaImage) -> Result<()> {
        let quad = detect_document_outline(input, self.analysis_width).ok_or_else(|| {
            warn!("No document outline found");
            DocsnapError::ExternalProcessing("no document outline found".into())
        })?;

        let warped = four_point_transform(input, &quad)?;
        info!(
            out_w = warped.width(),
            out_h = warped.height(),
            "Document rectified"
        );
        *output = warped;
        Ok(())
    }
}

/// Warp the region bounded by `quad` onto an upright rectangle.
///
/// The rectangle is as wide as the longer of the top and bottom edges and as
/// tall as the longer of the left and right edges.
pub fn four_point_transform(image: &RgbaImage, quad: &Quad) -> Result<RgbaImage> {
    let dist = |a: (f32, f32), b: (f32, f32)| ((a.0 - b.0).powi(2) + (a.1 - b.1).powi(2)).sqrt();

    let width_top = dist(quad.top_left, quad.top_right);
    let width_bottom = dist(quad.bottom_left, quad.bottom_right);
    let height_left = dist(quad.top_left, quad.bottom_left);
    let height_right = dist(quad.top_right, quad.bottom_right);

    let out_w = width_top.max(width_bottom).round() as u32;
    let out_h = height_left.max(height_right).round() as u32;
    if out_w < 2 || out_h < 2 {
        return Err(DocsnapError::ExternalProcessing(format!(
            "document outline too small ({out_w}x{out_h})"
        )));
    }

    let (w, h) = ((out_w - 1) as f32, (out_h - 1) as f32);
    let dest: [(f32, f32); 4] = [(0.0, 0.0), (w, 0.0), (w, h), (0.0, h)];

    let projection = Projection::from_control_points(quad.corners(), dest).ok_or_else(|| {
        DocsnapError::ExternalProcessing("degenerate document outline".into())
    })?;

    let mut warped = RgbaImage::new(out_w, out_h);
    warp_into(
        image,
        &projection,
        Interpolation::Bilinear,
        Rgba([255, 255, 255, 255]),
        &mut warped,
    );
    Ok(warped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scan::outline::order_corners;

    fn within(actual: u32, expected: u32, pct: f32) -> bool {
        (actual as f32 - expected as f32).abs() <= expected as f32 * pct
    }

    #[test]
    fn straightens_synthetic_page() {
        // 200x300 dark frame with a 120x200 bright page.
        let img = RgbaImage::from_fn(200, 300, |x, y| {
            if (40..160).contains(&x) && (50..250).contains(&y) {
                Rgba([240, 240, 240, 255])
            } else {
                Rgba([30, 30, 30, 255])
            }
        });
        let mut out = RgbaImage::new(0, 0);
        SoftScanner::default().rectify(&img, &mut out).unwrap();

        assert!(within(out.width(), 120, 0.1), "width {}", out.width());
        assert!(within(out.height(), 200, 0.1), "height {}", out.height());
        let centre = out.get_pixel(out.width() / 2, out.height() / 2);
        assert!(centre.0[0] > 200);
    }

    #[test]
    fn blank_image_fails_and_leaves_output_alone() {
        let img = RgbaImage::from_pixel(100, 100, Rgba([10, 10, 10, 255]));
        let mut out = RgbaImage::from_pixel(3, 3, Rgba([1, 2, 3, 4]));
        let err = SoftScanner::default().rectify(&img, &mut out).unwrap_err();
        assert!(matches!(err, DocsnapError::ExternalProcessing(_)));
        assert_eq!(out, RgbaImage::from_pixel(3, 3, Rgba([1, 2, 3, 4])));
    }

    #[test]
    fn four_point_transform_uses_longest_edges() {
        let img = RgbaImage::from_pixel(100, 100, Rgba([200, 200, 200, 255]));
        let quad = order_corners([(10.0, 10.0), (70.0, 12.0), (80.0, 90.0), (5.0, 80.0)]);
        let out = four_point_transform(&img, &quad).unwrap();
        // top 60.03, bottom 75.66; left 70.18, right 78.64
        assert_eq!(out.dimensions(), (76, 79));
    }

    #[test]
    fn collapsed_quad_is_rejected() {
        let img = RgbaImage::new(10, 10);
        let quad = order_corners([(1.0, 1.0); 4]);
        assert!(four_point_transform(&img, &quad).is_err());
    }

    #[test]
    fn boxed_rectifier_delegates() {
        let boxed: Box<dyn Rectifier> = Box::new(SoftScanner::new(300));
        let img = RgbaImage::from_pixel(20, 20, Rgba([0, 0, 0, 255]));
        let mut out = RgbaImage::new(0, 0);
        assert!(boxed.rectify(&img, &mut out).is_err());
    }
}
