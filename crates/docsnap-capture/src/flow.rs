// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scan flow — aim, capture, process, review, decide.
//
// Owns the camera (through the capture controller), the preview gate, the
// rectifier and the media index, and holds at most one capture session at a
// time. Every failure after the shutter press releases the session and puts
// the flow back into `Aiming`.

use docsnap_bridge::{CameraDevice, MediaIndex};
use docsnap_core::error::{DocsnapError, Result, classify_error};
use docsnap_core::{DisplayExtent, FlowPhase, Resolution, ScanOutcome, ScannerConfig, SessionId};
use docsnap_document::ImageProcessor;
use docsnap_document::Rectifier;
use docsnap_document::scan::fit_to_display;
use image::RgbaImage;
use tracing::{debug, info, instrument, warn};

use crate::analysis::PreviewGate;
use crate::camera::CameraSession;
use crate::controller::{CaptureController, CaptureTicket};
use crate::invoker::invoke_rectification;
use crate::lifecycle::{CameraViewLifecycle, PreviewAction, ViewEvent};
use crate::review::Review;
use crate::session::CaptureSession;
use crate::storage::ScanStorage;

/// The capture-to-review pipeline for one camera.
pub struct ScanFlow<C, R, M> {
    controller: CaptureController<C>,
    gate: PreviewGate,
    rectifier: R,
    media: M,
    storage: ScanStorage,
    config: ScannerConfig,
    display: DisplayExtent,
    resolution: Resolution,
    view: Option<CameraViewLifecycle>,
    capture: Option<(CaptureSession, CaptureTicket)>,
    review: Option<Review>,
}

impl<C, R, M> ScanFlow<C, R, M>
where
    C: CameraDevice,
    R: Rectifier,
    M: MediaIndex,
{
    /// Take ownership of `camera` and configure its best still resolution.
    /// Configuration errors abort construction.
    #[instrument(skip_all, fields(width = extent.width, height = extent.height))]
    pub fn new(
        camera: C,
        rectifier: R,
        media: M,
        storage: ScanStorage,
        config: ScannerConfig,
        extent: DisplayExtent,
    ) -> Result<Self> {
        config.validate()?;
        if extent.width == 0 || extent.height == 0 {
            return Err(DocsnapError::Configuration(format!(
                "display extent must be non-zero, got {}x{}",
                extent.width, extent.height
            )));
        }
        let gate = PreviewGate::from_config(&config)?;
        let mut controller = CaptureController::new(CameraSession::new(camera));
        let resolution = controller.configure_best_resolution()?;
        info!(%resolution, "Scan flow ready");

        Ok(Self {
            controller,
            gate,
            rectifier,
            media,
            storage,
            config,
            display: extent,
            resolution,
            view: None,
            capture: None,
            review: None,
        })
    }

    pub fn phase(&self) -> FlowPhase {
        if self.review.is_some() {
            FlowPhase::Reviewing
        } else if self.capture.is_some() {
            FlowPhase::Capturing
        } else {
            FlowPhase::Aiming
        }
    }

    pub fn config(&self) -> &ScannerConfig {
        &self.config
    }

    pub fn storage(&self) -> &ScanStorage {
        &self.storage
    }

    pub fn resolution(&self) -> Resolution {
        self.resolution
    }

    pub fn controller(&self) -> &CaptureController<C> {
        &self.controller
    }

    /// The owned camera device.
    pub fn camera(&self) -> &C {
        self.controller.camera().device()
    }

    pub fn gate(&self) -> &PreviewGate {
        &self.gate
    }

    pub fn review(&self) -> Option<&Review> {
        self.review.as_ref()
    }

    // -- Preview --------------------------------------------------------------

    /// Throttle timer callback.
    pub fn tick(&mut self) {
        self.gate.tick();
    }

    pub fn set_analysis_enabled(&mut self, enabled: bool) {
        debug!(enabled, "Preview analysis toggled");
        self.gate.set_enabled(enabled);
    }

    /// Preview frame callback. Returns the buffer to display.
    pub fn on_preview_frame(&mut self, frame: RgbaImage) -> &RgbaImage {
        self.gate.on_preview_frame(frame)
    }

    /// Feed a view lifecycle event and start/stop preview delivery to match.
    /// While a still is outstanding the capture controller owns delivery, so
    /// the change is applied once the still has been handled.
    pub fn view_event(&mut self, event: ViewEvent) -> Result<PreviewAction> {
        let action = self.view.get_or_insert_with(CameraViewLifecycle::new).handle(event);
        if self.controller.state().is_in_flight() {
            debug!(?action, "Capture in flight, preview change deferred");
            return Ok(action);
        }
        let camera = self.controller.camera_mut();
        match action {
            PreviewAction::None => {}
            PreviewAction::Start => camera.set_preview_delivery(true)?,
            PreviewAction::Stop => camera.set_preview_delivery(false)?,
            PreviewAction::Restart => {
                camera.set_preview_delivery(false)?;
                camera.set_preview_delivery(true)?;
            }
        }
        Ok(action)
    }

    fn sync_preview_with_view(&mut self) {
        let Some(view) = &self.view else {
            return;
        };
        let wanted = view.is_started();
        if let Err(e) = self.controller.camera_mut().set_preview_delivery(wanted) {
            warn!(error = %e, "Could not apply deferred preview change");
        }
    }

    // -- Capture --------------------------------------------------------------

    /// Shutter press. Fails with `InvalidState` while a capture is in flight
    /// or a scan is under review.
    pub fn take_picture(&mut self) -> Result<SessionId> {
        if self.review.is_some() {
            return Err(DocsnapError::InvalidState(
                "a scan is still under review".into(),
            ));
        }
        if self.controller.state().is_in_flight() {
            return Err(DocsnapError::InvalidState(
                "a capture is already in flight".into(),
            ));
        }
        if let Err(e) = self.storage.remove_transient() {
            warn!(error = %e, "Could not clear previous transient capture");
        }

        let ticket = self.controller.take_picture(self.storage.transient_path())?;
        let session = CaptureSession::new(self.storage.transient_path());
        let id = session.id();
        self.capture = Some((session, ticket));
        info!(session = %id, "Capture started");
        Ok(id)
    }

    /// Still callback: write, decode, fit to the display, rectify and open a
    /// review.
    ///
    /// A write or decode failure ends the session and returns the error; the
    /// flow is back in `Aiming`. A rectification failure still opens the
    /// review, without a corrected image, so the user can reject it.
    #[instrument(skip_all, fields(len = bytes.len()))]
    pub fn on_still_captured(&mut self, bytes: &[u8]) -> Result<&Review> {
        let Some((mut session, mut ticket)) = self.capture.take() else {
            self.controller.on_still_captured(bytes);
            return Err(DocsnapError::InvalidState("no capture in flight".into()));
        };

        self.controller.on_still_captured(bytes);
        self.sync_preview_with_view();

        let path = match ticket.try_take() {
            Some(Ok(path)) => path,
            Some(Err(e)) => return Err(self.abort(session, e)),
            None => {
                let e = DocsnapError::InvalidState("capture completion was not delivered".into());
                return Err(self.abort(session, e));
            }
        };

        let raw = match ImageProcessor::open(&path) {
            Ok(processor) => processor.into_rgba8(),
            Err(e) => return Err(self.abort(session, e)),
        };
        let transformed = match fit_to_display(&raw, self.display.width, self.display.height) {
            Ok(image) => image,
            Err(e) => return Err(self.abort(session, e)),
        };
        session.set_raw_image(raw);

        let processing_error = match invoke_rectification(&self.rectifier, &transformed) {
            Ok(corrected) => {
                session.set_corrected_image(corrected);
                None
            }
            Err(e) => Some(e.to_string()),
        };

        info!(
            session = %session.id(),
            corrected = processing_error.is_none(),
            "Scan ready for review"
        );
        Ok(self.review.insert(Review::new(session, processing_error)))
    }

    /// End a failed capture: release buffers, drop the transient file and
    /// hand the error back.
    fn abort(&mut self, mut session: CaptureSession, err: DocsnapError) -> DocsnapError {
        session.release_buffers();
        if let Err(e) = self.storage.remove_transient() {
            warn!(error = %e, "Could not delete transient capture");
        }
        warn!(
            session = %session.id(),
            error = %err,
            class = ?classify_error(&err),
            "Capture failed, back to aiming"
        );
        err
    }

    // -- Review ---------------------------------------------------------------

    /// Accept the scan under review. On failure the review stays open.
    pub fn accept(&mut self) -> Result<ScanOutcome> {
        let review = self
            .review
            .as_mut()
            .ok_or_else(|| DocsnapError::InvalidState("no scan under review".into()))?;
        let outcome = review.accept(&self.storage, self.config.output_format, &self.media)?;
        self.review = None;
        Ok(outcome)
    }

    /// Reject the scan under review.
    pub fn reject(&mut self) -> Result<ScanOutcome> {
        let review = self
            .review
            .as_mut()
            .ok_or_else(|| DocsnapError::InvalidState("no scan under review".into()))?;
        let outcome = review.reject(&self.storage)?;
        self.review = None;
        Ok(outcome)
    }
}
