// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Camera session — the single owner of an opened camera device.

use docsnap_bridge::CameraDevice;
use docsnap_core::Resolution;
use docsnap_core::error::{DocsnapError, Result};
use tracing::{debug, info};

/// Exclusive handle on a camera device plus the bookkeeping the pipeline
/// needs: the applied picture size, whether preview frames are flowing and
/// whether a still request is outstanding.
pub struct CameraSession<C> {
    device: C,
    picture_size: Option<Resolution>,
    preview_enabled: bool,
    still_outstanding: bool,
}

impl<C: CameraDevice> CameraSession<C> {
    /// Take ownership of `device`. Preview delivery is assumed to be running,
    /// as it is on a freshly opened camera.
    pub fn new(device: C) -> Self {
        Self {
            device,
            picture_size: None,
            preview_enabled: true,
            still_outstanding: false,
        }
    }

    pub fn device(&self) -> &C {
        &self.device
    }

    pub fn picture_size(&self) -> Option<Resolution> {
        self.picture_size
    }

    pub fn preview_enabled(&self) -> bool {
        self.preview_enabled
    }

    pub fn still_outstanding(&self) -> bool {
        self.still_outstanding
    }

    pub fn supported_picture_sizes(&self) -> Result<Vec<Resolution>> {
        self.device.supported_picture_sizes()
    }

    /// Apply the still-capture resolution. Refused while a still is in flight.
    pub fn set_picture_size(&mut self, size: Resolution) -> Result<()> {
        if self.still_outstanding {
            return Err(DocsnapError::InvalidState(
                "cannot change picture size while a still capture is in flight".into(),
            ));
        }
        self.device.set_picture_size(size)?;
        self.picture_size = Some(size);
        Ok(())
    }

    /// Start or stop preview frame delivery. A no-op when already in the
    /// requested state.
    pub fn set_preview_delivery(&mut self, enabled: bool) -> Result<()> {
        if self.preview_enabled == enabled {
            return Ok(());
        }
        self.device.set_preview_delivery(enabled)?;
        self.preview_enabled = enabled;
        debug!(enabled, "Preview delivery changed");
        Ok(())
    }

    /// Ask the device for one still. At most one request may be outstanding.
    pub fn request_still(&mut self) -> Result<()> {
        if self.still_outstanding {
            return Err(DocsnapError::InvalidState(
                "a still capture is already outstanding".into(),
            ));
        }
        self.still_outstanding = true;
        if let Err(e) = self.device.request_still() {
            self.still_outstanding = false;
            return Err(e);
        }
        info!("Still capture requested");
        Ok(())
    }

    /// Mark the outstanding still as delivered.
    pub fn still_delivered(&mut self) {
        self.still_outstanding = false;
    }
}
