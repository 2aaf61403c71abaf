// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Replay camera — a `CameraDevice` that answers still requests with a fixed
// encoded image. Used by the desktop CLI and by tests in place of a sensor.

use docsnap_core::error::{DocsnapError, Result};
use docsnap_core::types::Resolution;
use image::RgbaImage;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info, warn};

use crate::traits::{CameraDevice, CameraEvent};

/// Camera that replays pre-recorded output.
pub struct ReplayCamera {
    sizes: Vec<Resolution>,
    still: Vec<u8>,
    events: UnboundedSender<CameraEvent>,
    picture_size: Option<Resolution>,
    preview_enabled: bool,
    still_requests: usize,
}

impl ReplayCamera {
    /// Create a camera advertising `sizes` whose every still is `still`.
    /// Preview delivery starts enabled, as on a freshly started preview.
    pub fn new(sizes: Vec<Resolution>, still: Vec<u8>, events: UnboundedSender<CameraEvent>) -> Self {
        Self {
            sizes,
            still,
            events,
            picture_size: None,
            preview_enabled: true,
            still_requests: 0,
        }
    }

    /// The still-capture resolution last applied, if any.
    pub fn picture_size(&self) -> Option<Resolution> {
        self.picture_size
    }

    /// Whether preview frames are currently being delivered.
    pub fn preview_enabled(&self) -> bool {
        self.preview_enabled
    }

    /// How many stills have been requested so far.
    pub fn still_requests(&self) -> usize {
        self.still_requests
    }

    /// Deliver a preview frame. Returns `false` (and drops the frame) while
    /// preview delivery is disabled or nobody is listening.
    pub fn push_preview(&self, frame: RgbaImage) -> bool {
        if !self.preview_enabled {
            debug!("preview delivery disabled, dropping frame");
            return false;
        }
        self.events.send(CameraEvent::PreviewFrame(frame)).is_ok()
    }
}

impl CameraDevice for ReplayCamera {
    fn supported_picture_sizes(&self) -> Result<Vec<Resolution>> {
        Ok(self.sizes.clone())
    }

    fn set_picture_size(&mut self, size: Resolution) -> Result<()> {
        if !self.sizes.contains(&size) {
            return Err(DocsnapError::Bridge(format!(
                "picture size {size} is not supported"
            )));
        }
        info!(%size, "picture size applied");
        self.picture_size = Some(size);
        Ok(())
    }

    fn set_preview_delivery(&mut self, enabled: bool) -> Result<()> {
        debug!(enabled, "preview delivery toggled");
        self.preview_enabled = enabled;
        Ok(())
    }

    fn request_still(&mut self) -> Result<()> {
        if self.preview_enabled {
            warn!("still requested while preview delivery is on");
        }
        self.still_requests += 1;
        self.events
            .send(CameraEvent::StillCaptured(self.still.clone()))
            .map_err(|_| DocsnapError::Bridge("camera event channel closed".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn camera() -> (ReplayCamera, tokio::sync::mpsc::UnboundedReceiver<CameraEvent>) {
        let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
        let cam = ReplayCamera::new(
            vec![Resolution::new(640, 480), Resolution::new(1920, 1080)],
            vec![0xFF, 0xD8, 0xFF],
            tx,
        );
        (cam, rx)
    }

    #[test]
    fn still_request_emits_bytes_once() {
        let (mut cam, mut rx) = camera();
        cam.set_preview_delivery(false).unwrap();
        cam.request_still().unwrap();

        match rx.try_recv() {
            Ok(CameraEvent::StillCaptured(bytes)) => assert_eq!(bytes, vec![0xFF, 0xD8, 0xFF]),
            other => panic!("expected still, got {other:?}"),
        }
        assert!(rx.try_recv().is_err());
        assert_eq!(cam.still_requests(), 1);
    }

    #[test]
    fn preview_is_dropped_while_disabled() {
        let (mut cam, mut rx) = camera();
        let frame = RgbaImage::from_pixel(4, 4, Rgba([1, 2, 3, 255]));

        cam.set_preview_delivery(false).unwrap();
        assert!(!cam.push_preview(frame.clone()));
        assert!(rx.try_recv().is_err());

        cam.set_preview_delivery(true).unwrap();
        assert!(cam.push_preview(frame));
        assert!(matches!(rx.try_recv(), Ok(CameraEvent::PreviewFrame(_))));
    }

    #[test]
    fn unsupported_picture_size_is_rejected() {
        let (mut cam, _rx) = camera();
        assert!(cam.set_picture_size(Resolution::new(1, 1)).is_err());
        cam.set_picture_size(Resolution::new(1920, 1080)).unwrap();
        assert_eq!(cam.picture_size(), Some(Resolution::new(1920, 1080)));
    }
}
