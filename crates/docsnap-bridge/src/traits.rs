// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Platform-agnostic trait definitions for the camera and the media index.

use std::path::Path;

use docsnap_core::error::Result;
use docsnap_core::types::Resolution;
use image::RgbaImage;

/// Unified bridge that groups the native capabilities docsnap needs.
pub trait PlatformBridge: MediaIndex {
    /// Human-readable platform name (e.g. "Android 14").
    fn platform_name(&self) -> &str;

    /// Open the back camera. The returned device pushes its output into
    /// `events`.
    fn open_camera(
        &self,
        events: tokio::sync::mpsc::UnboundedSender<CameraEvent>,
    ) -> Result<Box<dyn CameraDevice>>;
}

/// Asynchronous output of a camera device.
#[derive(Debug, Clone)]
pub enum CameraEvent {
    /// A live preview frame, 4-channel 8-bit.
    PreviewFrame(RgbaImage),
    /// The encoded bytes (usually JPEG) of a requested still capture.
    /// Delivered exactly once per `request_still`.
    StillCaptured(Vec<u8>),
}

/// An opened camera, exclusively owned by one camera session.
pub trait CameraDevice: Send {
    /// Still-capture resolutions supported by the sensor.
    fn supported_picture_sizes(&self) -> Result<Vec<Resolution>>;

    /// Apply the still-capture resolution.
    fn set_picture_size(&mut self, size: Resolution) -> Result<()>;

    /// Start or stop delivering `CameraEvent::PreviewFrame`s.
    fn set_preview_delivery(&mut self, enabled: bool) -> Result<()>;

    /// Ask the sensor for a single still. The bytes arrive later as
    /// `CameraEvent::StillCaptured`.
    fn request_still(&mut self) -> Result<()>;
}

impl<T: CameraDevice + ?Sized> CameraDevice for Box<T> {
    fn supported_picture_sizes(&self) -> Result<Vec<Resolution>> {
        (**self).supported_picture_sizes()
    }

    fn set_picture_size(&mut self, size: Resolution) -> Result<()> {
        (**self).set_picture_size(size)
    }

    fn set_preview_delivery(&mut self, enabled: bool) -> Result<()> {
        (**self).set_preview_delivery(enabled)
    }

    fn request_still(&mut self) -> Result<()> {
        (**self).request_still()
    }
}

/// The device gallery / media store.
pub trait MediaIndex: Send {
    /// Make a newly written image visible to other apps.
    fn register_image(&self, path: &Path, mime_type: &str) -> Result<()>;
}

impl<T: MediaIndex + ?Sized> MediaIndex for Box<T> {
    fn register_image(&self, path: &Path, mime_type: &str) -> Result<()> {
        (**self).register_image(path, mime_type)
    }
}
