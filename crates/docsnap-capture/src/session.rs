// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Capture session — the buffers and decision belonging to one photo.

use std::path::{Path, PathBuf};

use docsnap_core::{ReviewDecision, SessionId};
use image::RgbaImage;
use tracing::debug;

/// State owned by a single capture, from the shutter press until the user's
/// decision is final.
#[derive(Debug)]
pub struct CaptureSession {
    id: SessionId,
    target_path: PathBuf,
    raw_image: Option<RgbaImage>,
    corrected_image: Option<RgbaImage>,
    decision: ReviewDecision,
}

impl CaptureSession {
    pub fn new(target_path: impl Into<PathBuf>) -> Self {
        let session = Self {
            id: SessionId::new(),
            target_path: target_path.into(),
            raw_image: None,
            corrected_image: None,
            decision: ReviewDecision::Pending,
        };
        debug!(session = %session.id, path = %session.target_path.display(), "Capture session created");
        session
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    /// The transient file holding this session's raw capture.
    pub fn target_path(&self) -> &Path {
        &self.target_path
    }

    pub fn decision(&self) -> ReviewDecision {
        self.decision
    }

    pub(crate) fn set_decision(&mut self, decision: ReviewDecision) {
        self.decision = decision;
    }

    pub fn raw_image(&self) -> Option<&RgbaImage> {
        self.raw_image.as_ref()
    }

    pub fn set_raw_image(&mut self, image: RgbaImage) {
        self.raw_image = Some(image);
    }

    pub fn corrected_image(&self) -> Option<&RgbaImage> {
        self.corrected_image.as_ref()
    }

    pub fn set_corrected_image(&mut self, image: RgbaImage) {
        self.corrected_image = Some(image);
    }

    /// Whether any image buffer is still held.
    pub fn holds_buffers(&self) -> bool {
        self.raw_image.is_some() || self.corrected_image.is_some()
    }

    /// Drop both image buffers. Safe to call any number of times; returns
    /// `true` only for the call that actually freed something.
    pub fn release_buffers(&mut self) -> bool {
        let released = self.raw_image.take().is_some() | self.corrected_image.take().is_some();
        if released {
            debug!(session = %self.id, "Session buffers released");
        }
        released
    }
}
