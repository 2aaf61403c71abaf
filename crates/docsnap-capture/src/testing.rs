// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Fixtures shared by the flow and driver tests.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use docsnap_bridge::MediaIndex;
use docsnap_core::OutputFormat;
use docsnap_core::error::Result;
use docsnap_document::ImageProcessor;
use image::{Rgba, RgbaImage};

use crate::storage::ScanStorage;

/// A 400x300 landscape photo of a bright page on a dark desk.
pub fn page_photo() -> RgbaImage {
    RgbaImage::from_fn(400, 300, |x, y| {
        if (60..340).contains(&x) && (40..260).contains(&y) {
            Rgba([240, 238, 232, 255])
        } else {
            Rgba([28, 26, 30, 255])
        }
    })
}

/// `page_photo` encoded the way a camera would hand it over.
pub fn page_still() -> Vec<u8> {
    ImageProcessor::from_rgba(page_photo())
        .encode(OutputFormat::Jpeg)
        .unwrap()
}

/// Storage rooted in `dir` with an existing pictures directory.
pub fn storage_in(dir: &Path) -> ScanStorage {
    let storage = ScanStorage::new(dir.join("data").join("photo.jpg"), dir.join("Pictures"));
    storage.ensure_dirs().unwrap();
    storage
}

/// Media index that remembers what it was asked to register.
#[derive(Clone, Default)]
pub struct RecordingIndex(pub Arc<Mutex<Vec<PathBuf>>>);

impl MediaIndex for RecordingIndex {
    fn register_image(&self, path: &Path, _mime_type: &str) -> Result<()> {
        self.0.lock().unwrap().push(path.to_path_buf());
        Ok(())
    }
}
