// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Document outline detection — find the page quadrilateral in a photo.
//
// Works on a downscaled copy: lightness channel, blur, fixed threshold, then
// the largest contour that simplifies to four vertices. Used both by the
// rectifier and by the live preview hint.

use image::{GrayImage, Luma, Rgba, RgbaImage};
use imageproc::contours::find_contours;
use imageproc::drawing::draw_line_segment_mut;
use imageproc::filter::gaussian_blur_f32;
use imageproc::geometry::{approximate_polygon_dp, arc_length};
use imageproc::point::Point;
use tracing::{debug, instrument};

use crate::image::processor::resize_area;

/// Width the working copy is shrunk to before contour search.
pub const DEFAULT_ANALYSIS_WIDTH: u32 = 500;

/// Lightness above which a pixel counts as paper.
const LIGHTNESS_THRESHOLD: u8 = 150;

/// Blur applied before thresholding.
const BLUR_SIGMA: f32 = 1.5;

/// Polygon simplification tolerance as a fraction of the contour perimeter.
const APPROX_EPSILON_FACTOR: f64 = 0.05;

/// Colour of the preview outline.
pub const OUTLINE_COLOUR: Rgba<u8> = Rgba([0, 255, 0, 255]);

/// Stroke width of the preview outline in pixels.
pub const OUTLINE_THICKNESS: u32 = 3;

/// A document quadrilateral in image coordinates, corners in clockwise order
/// starting at the top-left.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quad {
    pub top_left: (f32, f32),
    pub top_right: (f32, f32),
    pub bottom_right: (f32, f32),
    pub bottom_left: (f32, f32),
}

impl Quad {
    /// Corners as `[tl, tr, br, bl]`.
    pub fn corners(&self) -> [(f32, f32); 4] {
        [
            self.top_left,
            self.top_right,
            self.bottom_right,
            self.bottom_left,
        ]
    }

    /// Multiply every coordinate by `factor`.
    pub fn scaled(&self, factor: f32) -> Self {
        let s = |(x, y): (f32, f32)| (x * factor, y * factor);
        Self {
            top_left: s(self.top_left),
            top_right: s(self.top_right),
            bottom_right: s(self.bottom_right),
            bottom_left: s(self.bottom_left),
        }
    }
}

/// HLS lightness of every pixel, `(max + min) / 2` over the colour channels.
pub fn lightness(image: &RgbaImage) -> GrayImage {
    GrayImage::from_fn(image.width(), image.height(), |x, y| {
        let [r, g, b, _] = image.get_pixel(x, y).0;
        let max = r.max(g).max(b) as u16;
        let min = r.min(g).min(b) as u16;
        Luma([((max + min + 1) / 2) as u8])
    })
}

/// Blurred, thresholded lightness mask: paper is 255, everything else 0.
pub fn lightness_mask(image: &RgbaImage) -> GrayImage {
    let mut mask = gaussian_blur_f32(&lightness(image), BLUR_SIGMA);
    for pixel in mask.pixels_mut() {
        pixel.0[0] = if pixel.0[0] > LIGHTNESS_THRESHOLD { 255 } else { 0 };
    }
    mask
}

/// Find the document outline in `image`.
///
/// The search runs on a copy shrunk to `analysis_width` (images narrower than
/// that are used as-is); the returned quad is scaled back to `image`'s
/// coordinates. Returns `None` when no contour simplifies to four vertices.
#[instrument(skip(image), fields(width = image.width(), height = image.height()))]
pub fn detect_document_outline(image: &RgbaImage, analysis_width: u32) -> Option<Quad> {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return None;
    }

    let (working, ratio) = if analysis_width > 0 && width > analysis_width {
        let ratio = width as f32 / analysis_width as f32;
        let scaled_h = ((height as f32 / ratio).round() as u32).max(1);
        match resize_area(image, analysis_width, scaled_h) {
            Ok(small) => (small, ratio),
            Err(err) => {
                debug!(error = %err, "Could not shrink frame for outline search");
                return None;
            }
        }
    } else {
        (image.clone(), 1.0)
    };

    let mask = lightness_mask(&working);
    let mut contours: Vec<Vec<Point<i32>>> = find_contours::<i32>(&mask)
        .into_iter()
        .map(|contour| contour.points)
        .filter(|points| points.len() >= 4)
        .collect();
    contours.sort_by(|a, b| polygon_area(b).total_cmp(&polygon_area(a)));
    debug!(contour_count = contours.len(), "Contours found");

    let quad = contours.iter().find_map(|points| {
        let epsilon = APPROX_EPSILON_FACTOR * arc_length(points, true);
        if epsilon <= 0.0 {
            return None;
        }
        let approx = dedupe_vertices(approximate_polygon_dp(points, epsilon, true), epsilon);
        if approx.len() != 4 {
            return None;
        }
        let corners = [approx[0], approx[1], approx[2], approx[3]]
            .map(|p| (p.x as f32, p.y as f32));
        Some(order_corners(corners))
    })?;

    let quad = quad.scaled(ratio);
    debug!(
        top_left = ?quad.top_left,
        top_right = ?quad.top_right,
        bottom_right = ?quad.bottom_right,
        bottom_left = ?quad.bottom_left,
        "Document outline found"
    );
    Some(quad)
}

/// Sort four points into top-left, top-right, bottom-right, bottom-left.
///
/// The top-left has the smallest `x + y`, the bottom-right the largest; the
/// top-right has the largest `x - y`, the bottom-left the smallest.
pub fn order_corners(points: [(f32, f32); 4]) -> Quad {
    let by = |key: fn(&(f32, f32)) -> f32, max: bool| {
        let mut best = points[0];
        for p in &points[1..] {
            let better = if max { key(p) > key(&best) } else { key(p) < key(&best) };
            if better {
                best = *p;
            }
        }
        best
    };
    Quad {
        top_left: by(|p| p.0 + p.1, false),
        top_right: by(|p| p.0 - p.1, true),
        bottom_right: by(|p| p.0 + p.1, true),
        bottom_left: by(|p| p.0 - p.1, false),
    }
}

/// Area of a polygon given by its vertices in order (CW or CCW).
pub fn shoelace_area(corners: &[(f32, f32)]) -> f32 {
    let n = corners.len();
    let mut area = 0.0f32;
    for i in 0..n {
        let j = (i + 1) % n;
        area += corners[i].0 * corners[j].1;
        area -= corners[j].0 * corners[i].1;
    }
    area.abs() / 2.0
}

fn polygon_area(points: &[Point<i32>]) -> f32 {
    let corners: Vec<(f32, f32)> = points.iter().map(|p| (p.x as f32, p.y as f32)).collect();
    shoelace_area(&corners)
}

/// Drop vertices closer than `tolerance` to their predecessor, including the
/// wrap-around from the last vertex back to the first.
fn dedupe_vertices(points: Vec<Point<i32>>, tolerance: f64) -> Vec<Point<i32>> {
    let close = |a: &Point<i32>, b: &Point<i32>| {
        let dx = (a.x - b.x) as f64;
        let dy = (a.y - b.y) as f64;
        (dx * dx + dy * dy).sqrt() < tolerance
    };
    let mut out: Vec<Point<i32>> = Vec::with_capacity(points.len());
    for p in points {
        if out.last().is_some_and(|last| close(last, &p)) {
            continue;
        }
        out.push(p);
    }
    while out.len() > 1 && close(&out[0], &out[out.len() - 1]) {
        out.pop();
    }
    out
}

/// Draw `quad` onto `frame` as a closed green outline.
pub fn draw_outline(frame: &mut RgbaImage, quad: &Quad) {
    let corners = quad.corners();
    let half = (OUTLINE_THICKNESS / 2) as i32;
    for i in 0..corners.len() {
        let start = corners[i];
        let end = corners[(i + 1) % corners.len()];
        for dx in -half..=half {
            for dy in -half..=half {
                let (ox, oy) = (dx as f32, dy as f32);
                draw_line_segment_mut(
                    frame,
                    (start.0 + ox, start.1 + oy),
                    (end.0 + ox, end.1 + oy),
                    OUTLINE_COLOUR,
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Dark background with a bright page from (x0, y0) to (x1, y1).
    fn page(w: u32, h: u32, x0: u32, y0: u32, x1: u32, y1: u32) -> RgbaImage {
        RgbaImage::from_fn(w, h, |x, y| {
            if (x0..x1).contains(&x) && (y0..y1).contains(&y) {
                Rgba([240, 240, 235, 255])
            } else {
                Rgba([30, 30, 40, 255])
            }
        })
    }

    fn near(a: (f32, f32), b: (f32, f32), tol: f32) -> bool {
        (a.0 - b.0).abs() <= tol && (a.1 - b.1).abs() <= tol
    }

    #[test]
    fn lightness_is_mid_of_extremes() {
        let img = RgbaImage::from_pixel(1, 1, Rgba([200, 100, 0, 255]));
        assert_eq!(lightness(&img).get_pixel(0, 0).0[0], 100);
    }

    #[test]
    fn order_corners_from_any_permutation() {
        let quad = order_corners([(90.0, 5.0), (10.0, 95.0), (5.0, 10.0), (95.0, 90.0)]);
        assert_eq!(quad.top_left, (5.0, 10.0));
        assert_eq!(quad.top_right, (90.0, 5.0));
        assert_eq!(quad.bottom_right, (95.0, 90.0));
        assert_eq!(quad.bottom_left, (10.0, 95.0));
    }

    #[test]
    fn shoelace_area_rectangle() {
        let area = shoelace_area(&[(0.0, 0.0), (10.0, 0.0), (10.0, 5.0), (0.0, 5.0)]);
        assert!((area - 50.0).abs() < 1e-3, "Expected 50.0, got {}", area);
    }

    #[test]
    fn finds_bright_page() {
        let img = page(200, 300, 40, 50, 160, 250);
        let quad = detect_document_outline(&img, DEFAULT_ANALYSIS_WIDTH).expect("page outline");
        assert!(near(quad.top_left, (40.0, 50.0), 6.0), "{:?}", quad);
        assert!(near(quad.bottom_right, (159.0, 249.0), 6.0), "{:?}", quad);
    }

    #[test]
    fn outline_is_scaled_back_from_analysis_copy() {
        let img = page(1000, 800, 200, 100, 800, 700);
        let quad = detect_document_outline(&img, DEFAULT_ANALYSIS_WIDTH).expect("page outline");
        assert!(near(quad.top_left, (200.0, 100.0), 12.0), "{:?}", quad);
        assert!(near(quad.bottom_right, (800.0, 700.0), 12.0), "{:?}", quad);
    }

    #[test]
    fn blank_frame_has_no_outline() {
        let img = RgbaImage::from_pixel(120, 80, Rgba([20, 20, 20, 255]));
        assert!(detect_document_outline(&img, DEFAULT_ANALYSIS_WIDTH).is_none());
    }

    #[test]
    fn draw_outline_paints_edges_green() {
        let mut frame = RgbaImage::from_pixel(50, 50, Rgba([0, 0, 0, 255]));
        let quad = order_corners([(10.0, 10.0), (40.0, 10.0), (40.0, 40.0), (10.0, 40.0)]);
        draw_outline(&mut frame, &quad);
        assert_eq!(*frame.get_pixel(25, 10), OUTLINE_COLOUR);
        assert_eq!(*frame.get_pixel(25, 11), OUTLINE_COLOUR);
        assert_eq!(*frame.get_pixel(25, 25), Rgba([0, 0, 0, 255]));
    }
}
