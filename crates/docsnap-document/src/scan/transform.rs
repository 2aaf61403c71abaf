// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scan transform — fit a captured still to the display before scanning.
//
// The still is shrunk uniformly (never enlarged) so that it fits the display
// surface, then transposed and mirrored horizontally. Transpose followed by a
// horizontal flip is a 90° clockwise rotation, which turns the sensor's
// landscape orientation into the portrait orientation the display uses.

use docsnap_core::error::DocsnapError;
use image::{ImageBuffer, Pixel, RgbaImage, imageops};
use tracing::{debug, instrument};

use crate::image::processor::resize_area;

/// Uniform scale factor that fits a `src_w` x `src_h` image into a
/// `target_w` x `target_h` surface.
///
/// Returns `1.0` when the source already fits on both axes. Otherwise returns
/// the smaller of the two per-axis ratios, so the scaled image fits on both
/// axes and touches the target on at least one of them.
pub fn compute_downscale_ratio(src_w: u32, src_h: u32, target_w: u32, target_h: u32) -> f64 {
    if src_w <= target_w && src_h <= target_h {
        return 1.0;
    }
    let ratio_h = target_h as f64 / src_h as f64;
    let ratio_w = target_w as f64 / src_w as f64;
    ratio_h.min(ratio_w)
}

/// Dimensions of a `width` x `height` image scaled by `ratio`, rounded to the
/// nearest pixel and never collapsing an axis to zero.
pub fn scaled_dimensions(width: u32, height: u32, ratio: f64) -> (u32, u32) {
    let scale = |v: u32| ((v as f64 * ratio).round() as u32).max(1);
    (scale(width), scale(height))
}

/// Swap rows and columns: pixel `(x, y)` of the input lands at `(y, x)`.
pub fn transpose<P>(image: &ImageBuffer<P, Vec<P::Subpixel>>) -> ImageBuffer<P, Vec<P::Subpixel>>
where
    P: Pixel,
{
    let (width, height) = image.dimensions();
    ImageBuffer::from_fn(height, width, |x, y| *image.get_pixel(y, x))
}

/// Apply the scan transform to a captured image.
///
/// 1. Area-averaging resample to `round(w * ratio)` x `round(h * ratio)`
///    (skipped when the ratio leaves the size unchanged).
/// 2. Transpose.
/// 3. Mirror horizontally.
///
/// The output of an `N x M` input resampled to `N' x M'` is `M' x N'`.
#[instrument(skip(image), fields(width = image.width(), height = image.height()))]
pub fn apply_transform(image: &RgbaImage, ratio: f64) -> Result<RgbaImage, DocsnapError> {
    if !(ratio > 0.0 && ratio.is_finite()) {
        return Err(DocsnapError::ImageError(format!(
            "invalid downscale ratio {ratio}"
        )));
    }

    let (scaled_w, scaled_h) = scaled_dimensions(image.width(), image.height(), ratio);
    let resized = resize_area(image, scaled_w, scaled_h)?;

    let mut rotated = transpose(&resized);
    imageops::flip_horizontal_in_place(&mut rotated);

    debug!(
        scaled_w,
        scaled_h,
        out_w = rotated.width(),
        out_h = rotated.height(),
        "Scan transform applied"
    );
    Ok(rotated)
}

/// Convenience wrapper: compute the ratio for `display` and apply the
/// transform in one step.
pub fn fit_to_display(
    image: &RgbaImage,
    display_w: u32,
    display_h: u32,
) -> Result<RgbaImage, DocsnapError> {
    let ratio = compute_downscale_ratio(image.width(), image.height(), display_w, display_h);
    apply_transform(image, ratio)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn ratio_is_one_when_source_fits() {
        assert_eq!(compute_downscale_ratio(800, 600, 1080, 1920), 1.0);
        assert_eq!(compute_downscale_ratio(1080, 1920, 1080, 1920), 1.0);
    }

    #[test]
    fn ratio_for_phone_sized_still() {
        let ratio = compute_downscale_ratio(3000, 4000, 1080, 1920);
        assert!((ratio - 0.36).abs() < 1e-9);
        assert_eq!(scaled_dimensions(3000, 4000, ratio), (1080, 1440));
    }

    #[test]
    fn ratio_fits_both_axes_and_touches_one() {
        let cases = [
            (4000, 3000, 1080, 1920),
            (640, 2000, 720, 1280),
            (5000, 100, 1000, 1000),
            (1081, 1921, 1080, 1920),
        ];
        for (sw, sh, tw, th) in cases {
            let r = compute_downscale_ratio(sw, sh, tw, th);
            assert!(r <= 1.0);
            let w = sw as f64 * r;
            let h = sh as f64 * r;
            assert!(w <= tw as f64 + 1e-6 && h <= th as f64 + 1e-6, "{sw}x{sh} overflows");
            assert!(
                (w - tw as f64).abs() < 1e-6 || (h - th as f64).abs() < 1e-6,
                "{sw}x{sh} is not maximal"
            );
        }
    }

    #[test]
    fn transform_swaps_dimensions() {
        let img = RgbaImage::from_pixel(300, 400, Rgba([200, 200, 200, 255]));
        let ratio = compute_downscale_ratio(300, 400, 108, 192);
        let out = apply_transform(&img, ratio).unwrap();
        assert_eq!(out.dimensions(), (144, 108));
    }

    #[test]
    fn unit_ratio_matches_clockwise_rotation() {
        let img = RgbaImage::from_fn(5, 3, |x, y| Rgba([x as u8 * 40, y as u8 * 80, 7, 255]));
        let out = apply_transform(&img, 1.0).unwrap();
        assert_eq!(out, imageops::rotate90(&img));
    }

    #[test]
    fn transpose_moves_pixels() {
        let img = RgbaImage::from_fn(2, 3, |x, y| Rgba([x as u8, y as u8, 0, 255]));
        let t = transpose(&img);
        assert_eq!(t.dimensions(), (3, 2));
        assert_eq!(t.get_pixel(2, 1), &Rgba([1, 2, 0, 255]));
    }

    #[test]
    fn non_positive_ratio_is_rejected() {
        let img = RgbaImage::new(4, 4);
        assert!(apply_transform(&img, 0.0).is_err());
        assert!(apply_transform(&img, f64::NAN).is_err());
    }
}
