// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Capture controller — takes one still photo at a time.
//
// Preview delivery is switched off before the still is requested and switched
// back on once the still has been written, so the preview and still pipelines
// never share a buffer. Completion is reported once through a `CaptureTicket`.

use std::path::{Path, PathBuf};

use docsnap_bridge::CameraDevice;
use docsnap_core::error::{DocsnapError, Result};
use docsnap_core::{CaptureState, Resolution};
use tokio::sync::oneshot;
use tracing::{debug, error, info, instrument, warn};

use crate::camera::CameraSession;
use crate::resolution::configure_best_resolution;

/// Completion handle for one `take_picture` call. Resolves exactly once with
/// the path of the written still or the error that stopped it.
#[derive(Debug)]
pub struct CaptureTicket {
    rx: oneshot::Receiver<Result<PathBuf>>,
}

impl CaptureTicket {
    /// The completion, if it has been delivered.
    pub fn try_take(&mut self) -> Option<Result<PathBuf>> {
        match self.rx.try_recv() {
            Ok(result) => Some(result),
            Err(oneshot::error::TryRecvError::Empty) => None,
            Err(oneshot::error::TryRecvError::Closed) => Some(Err(DocsnapError::InvalidState(
                "capture was abandoned before completing".into(),
            ))),
        }
    }

    /// Wait for the completion.
    pub async fn wait(self) -> Result<PathBuf> {
        self.rx.await.unwrap_or_else(|_| {
            Err(DocsnapError::InvalidState(
                "capture was abandoned before completing".into(),
            ))
        })
    }
}

struct PendingCapture {
    target: PathBuf,
    done: oneshot::Sender<Result<PathBuf>>,
}

/// Drives `Idle -> AwaitingStill -> WritingFile -> PreviewRestored`.
pub struct CaptureController<C> {
    camera: CameraSession<C>,
    state: CaptureState,
    pending: Option<PendingCapture>,
}

impl<C: CameraDevice> CaptureController<C> {
    pub fn new(camera: CameraSession<C>) -> Self {
        Self {
            camera,
            state: CaptureState::Idle,
            pending: None,
        }
    }

    pub fn state(&self) -> CaptureState {
        self.state
    }

    pub fn camera(&self) -> &CameraSession<C> {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut CameraSession<C> {
        &mut self.camera
    }

    /// Select and apply the best still resolution. Refused mid-capture.
    pub fn configure_best_resolution(&mut self) -> Result<Resolution> {
        if self.state.is_in_flight() {
            return Err(DocsnapError::InvalidState(
                "resolution cannot change while a capture is in flight".into(),
            ));
        }
        configure_best_resolution(&mut self.camera)
    }

    /// Request a still that will be written to `target`.
    ///
    /// Allowed from `Idle` and `PreviewRestored`; a second call while a still
    /// is outstanding fails with `InvalidState`.
    #[instrument(skip(self, target), fields(target = %target.as_ref().display()))]
    pub fn take_picture(&mut self, target: impl AsRef<Path>) -> Result<CaptureTicket> {
        if self.state.is_in_flight() {
            return Err(DocsnapError::InvalidState(format!(
                "capture already in progress ({:?})",
                self.state
            )));
        }

        self.camera.set_preview_delivery(false)?;
        if let Err(e) = self.camera.request_still() {
            warn!(error = %e, "Still request failed, restoring preview");
            if let Err(restore) = self.camera.set_preview_delivery(true) {
                error!(error = %restore, "Could not restore preview delivery");
            }
            return Err(e);
        }

        let (done, rx) = oneshot::channel();
        self.pending = Some(PendingCapture {
            target: target.as_ref().to_path_buf(),
            done,
        });
        self.state = CaptureState::AwaitingStill;
        Ok(CaptureTicket { rx })
    }

    /// Handle the camera's still callback.
    ///
    /// Writes `bytes` verbatim to the target, re-enables preview delivery
    /// (even when the write failed) and resolves the ticket. Returns `false`
    /// when no still was requested, in which case the bytes are dropped.
    #[instrument(skip(self, bytes), fields(len = bytes.len()))]
    pub fn on_still_captured(&mut self, bytes: &[u8]) -> bool {
        let Some(pending) = self.pending.take() else {
            warn!("Still delivered with no capture outstanding, ignoring");
            return false;
        };
        self.camera.still_delivered();

        self.state = CaptureState::WritingFile;
        let result = std::fs::write(&pending.target, bytes)
            .map(|()| pending.target.clone())
            .map_err(DocsnapError::from);
        match &result {
            Ok(path) => info!(path = %path.display(), "Still written"),
            Err(e) => error!(path = %pending.target.display(), error = %e, "Could not write still"),
        }

        if let Err(e) = self.camera.set_preview_delivery(true) {
            error!(error = %e, "Could not restore preview delivery");
        }
        self.state = CaptureState::PreviewRestored;

        if pending.done.send(result).is_err() {
            debug!("Capture ticket dropped before completion");
        }
        true
    }
}
