// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Review state machine — the user's accept/reject decision on a scan.
//
// `Reviewing -> Accepted` persists the corrected image and deletes the
// transient capture; `Reviewing -> Rejected` only deletes. Either way the
// session's buffers are released and exactly one outcome is produced.

use chrono::{Local, NaiveDateTime};
use docsnap_bridge::MediaIndex;
use docsnap_core::error::{DocsnapError, Result};
use docsnap_core::{OutputFormat, ReviewDecision, ScanOutcome};
use docsnap_document::ImageProcessor;
use image::RgbaImage;
use tracing::{info, instrument, warn};

use crate::session::CaptureSession;
use crate::storage::ScanStorage;

/// A scan awaiting the user's decision.
#[derive(Debug)]
pub struct Review {
    session: CaptureSession,
    processing_error: Option<String>,
}

impl Review {
    /// Enter review for `session`. A session whose rectification failed
    /// carries the failure in `processing_error`; it can only be rejected.
    pub fn new(session: CaptureSession, processing_error: Option<String>) -> Self {
        Self {
            session,
            processing_error,
        }
    }

    pub fn session(&self) -> &CaptureSession {
        &self.session
    }

    pub fn decision(&self) -> ReviewDecision {
        self.session.decision()
    }

    pub fn is_open(&self) -> bool {
        self.decision() == ReviewDecision::Pending
    }

    /// The image shown to the user, if rectification succeeded.
    pub fn corrected_image(&self) -> Option<&RgbaImage> {
        self.session.corrected_image()
    }

    /// Why there is no corrected image, if rectification failed.
    pub fn processing_error(&self) -> Option<&str> {
        self.processing_error.as_deref()
    }

    fn ensure_open(&self) -> Result<()> {
        if self.is_open() {
            Ok(())
        } else {
            Err(DocsnapError::InvalidState(format!(
                "review already finished ({:?})",
                self.decision()
            )))
        }
    }

    /// Discard the scan: release buffers, delete the transient capture and
    /// report `accepted = false`.
    #[instrument(skip_all, fields(session = %self.session.id()))]
    pub fn reject(&mut self, storage: &ScanStorage) -> Result<ScanOutcome> {
        self.ensure_open()?;

        self.session.release_buffers();
        remove_transient(storage);
        self.session.set_decision(ReviewDecision::Rejected);

        info!("Scan rejected");
        Ok(self.outcome(false, None))
    }

    /// Keep the scan, saved now.
    pub fn accept(
        &mut self,
        storage: &ScanStorage,
        format: OutputFormat,
        media: &dyn MediaIndex,
    ) -> Result<ScanOutcome> {
        self.accept_at(storage, format, media, Local::now().naive_local())
    }

    /// Keep the scan: write the corrected image to the pictures directory,
    /// delete the transient capture, release buffers, report
    /// `accepted = true` and register the file with the media index.
    ///
    /// Without a corrected image this fails with `ExternalProcessing` and the
    /// review stays open so it can still be rejected. If the permanent write
    /// fails the review also stays open; no partial file is left behind.
    #[instrument(skip_all, fields(session = %self.session.id()))]
    pub fn accept_at(
        &mut self,
        storage: &ScanStorage,
        format: OutputFormat,
        media: &dyn MediaIndex,
        timestamp: NaiveDateTime,
    ) -> Result<ScanOutcome> {
        self.ensure_open()?;

        let corrected = self.session.corrected_image().ok_or_else(|| {
            DocsnapError::ExternalProcessing(
                self.processing_error
                    .clone()
                    .unwrap_or_else(|| "no corrected image to save".into()),
            )
        })?;

        let bytes = ImageProcessor::from_rgba(corrected.clone()).encode(format)?;
        let saved = storage.scan_path(timestamp, format);
        storage.write_atomic(&saved, &bytes)?;

        remove_transient(storage);
        self.session.release_buffers();
        self.session.set_decision(ReviewDecision::Accepted);
        info!(path = %saved.display(), "Scan accepted");

        if let Err(e) = media.register_image(&saved, format.mime_type()) {
            warn!(path = %saved.display(), error = %e, "Could not register scan with media index");
        }

        Ok(self.outcome(true, Some(saved)))
    }

    fn outcome(&self, accepted: bool, saved_path: Option<std::path::PathBuf>) -> ScanOutcome {
        ScanOutcome {
            session: self.session.id(),
            accepted,
            transient_path: self.session.target_path().to_path_buf(),
            saved_path,
        }
    }
}

fn remove_transient(storage: &ScanStorage) {
    if let Err(e) = storage.remove_transient() {
        warn!(path = %storage.transient_path().display(), error = %e, "Could not delete transient capture");
    }
}
