// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// CLI subcommands.

pub mod config;
pub mod preview;
pub mod scan;

use std::path::PathBuf;

use docsnap_capture::default_data_dir;

/// The `--data-dir` override, or the platform default.
fn resolve_data_dir(overridden: Option<&PathBuf>) -> PathBuf {
    overridden.cloned().unwrap_or_else(default_data_dir)
}

/// Writes a 400x300 photo of a bright page on a dark desk to `path`.
#[cfg(test)]
fn write_page_photo(path: &std::path::Path) {
    use image::{Rgba, RgbaImage};

    let photo = RgbaImage::from_fn(400, 300, |x, y| {
        if (60..340).contains(&x) && (40..260).contains(&y) {
            Rgba([240, 238, 232, 255])
        } else {
            Rgba([28, 26, 30, 255])
        }
    });
    photo.save(path).unwrap();
}
