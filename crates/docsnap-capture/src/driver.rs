// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Event driver — the single task every callback is serialised onto.
//
// Timer ticks, camera events and user commands all arrive here and are
// applied to the `ScanFlow` one at a time, so no two callbacks ever touch a
// capture session concurrently.

use docsnap_bridge::{CameraDevice, CameraEvent, MediaIndex};
use docsnap_core::error::{DocsnapError, classify_error};
use docsnap_core::human_errors::{HumanError, humanize_error};
use docsnap_core::{ErrorClass, FlowPhase, ScanOutcome, SessionId};
use docsnap_document::Rectifier;
use image::RgbaImage;
use tokio::sync::{mpsc, watch};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::flow::ScanFlow;
use crate::lifecycle::ViewEvent;

/// Input from the user or the hosting view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserCommand {
    /// Shutter press.
    Capture,
    /// Toggle the preview outline hint.
    SetAnalysis(bool),
    Accept,
    Reject,
    View(ViewEvent),
    /// Stop the driver and hand the flow back.
    Shutdown,
}

/// What the driver reports back to the UI.
#[derive(Debug, Clone)]
pub enum FlowEvent {
    CaptureStarted(SessionId),
    /// A scan is on the display awaiting a decision. `corrected` is false
    /// when rectification failed and only rejection is possible.
    ReviewReady { session: SessionId, corrected: bool },
    /// The review finished; this is the decision signal.
    Decided(ScanOutcome),
    /// Something went wrong; the flow is back to aiming unless a review is
    /// still open.
    Failed { class: ErrorClass, error: HumanError },
}

/// Run the flow until `Shutdown` or until the command channel closes, then
/// return it.
///
/// The display channel always carries the frame that should be on screen:
/// the latest preview frame while aiming, the corrected scan while reviewing.
/// Preview frames that arrive during a review still reach the gate but are
/// not shown; once the review is decided the latest one is published.
pub async fn run_driver<C, R, M>(
    mut flow: ScanFlow<C, R, M>,
    mut camera_events: mpsc::UnboundedReceiver<CameraEvent>,
    mut commands: mpsc::Receiver<UserCommand>,
    events: mpsc::UnboundedSender<FlowEvent>,
    display: watch::Sender<Option<RgbaImage>>,
) -> ScanFlow<C, R, M>
where
    C: CameraDevice,
    R: Rectifier,
    M: MediaIndex,
{
    let mut ticker = tokio::time::interval(flow.config().throttle_period());
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut camera_open = true;

    info!(period = ?flow.config().throttle_period(), "Scan driver started");
    loop {
        tokio::select! {
            _ = ticker.tick() => flow.tick(),

            event = camera_events.recv(), if camera_open => match event {
                Some(CameraEvent::PreviewFrame(frame)) => {
                    let reviewing = flow.phase() == FlowPhase::Reviewing;
                    let shown = flow.on_preview_frame(frame);
                    if !reviewing {
                        display.send_replace(Some(shown.clone()));
                    }
                }
                Some(CameraEvent::StillCaptured(bytes)) => {
                    handle_still(&mut flow, &bytes, &events, &display);
                }
                None => {
                    warn!("Camera event channel closed");
                    camera_open = false;
                }
            },

            command = commands.recv() => match command {
                Some(UserCommand::Shutdown) | None => {
                    debug!("Scan driver received shutdown");
                    break;
                }
                Some(command) => handle_command(&mut flow, command, &events, &display),
            },
        }
    }
    info!("Scan driver stopped");
    flow
}

fn handle_still<C, R, M>(
    flow: &mut ScanFlow<C, R, M>,
    bytes: &[u8],
    events: &mpsc::UnboundedSender<FlowEvent>,
    display: &watch::Sender<Option<RgbaImage>>,
) where
    C: CameraDevice,
    R: Rectifier,
    M: MediaIndex,
{
    match flow.on_still_captured(bytes) {
        Ok(review) => {
            let session = review.session().id();
            let corrected = review.corrected_image().cloned();
            let has_corrected = corrected.is_some();
            if corrected.is_some() {
                display.send_replace(corrected);
            }
            emit(
                events,
                FlowEvent::ReviewReady {
                    session,
                    corrected: has_corrected,
                },
            );
        }
        Err(e) => report(events, &e),
    }
}

fn handle_command<C, R, M>(
    flow: &mut ScanFlow<C, R, M>,
    command: UserCommand,
    events: &mpsc::UnboundedSender<FlowEvent>,
    display: &watch::Sender<Option<RgbaImage>>,
) where
    C: CameraDevice,
    R: Rectifier,
    M: MediaIndex,
{
    debug!(?command, "User command");
    let result = match command {
        UserCommand::Capture => flow.take_picture().map(FlowEvent::CaptureStarted).map(Some),
        UserCommand::SetAnalysis(enabled) => {
            flow.set_analysis_enabled(enabled);
            Ok(None)
        }
        UserCommand::Accept => flow.accept().map(FlowEvent::Decided).map(Some),
        UserCommand::Reject => flow.reject().map(FlowEvent::Decided).map(Some),
        UserCommand::View(event) => flow.view_event(event).map(|_| None),
        UserCommand::Shutdown => Ok(None),
    };
    match result {
        Ok(Some(event)) => {
            if matches!(event, FlowEvent::Decided(_)) {
                display.send_replace(flow.gate().latest_frame().cloned());
            }
            emit(events, event)
        }
        Ok(None) => {}
        Err(e) => report(events, &e),
    }
}

fn report(events: &mpsc::UnboundedSender<FlowEvent>, err: &DocsnapError) {
    let class = classify_error(err);
    warn!(error = %err, ?class, "Scan flow error");
    emit(
        events,
        FlowEvent::Failed {
            class,
            error: humanize_error(err),
        },
    );
}

fn emit(events: &mpsc::UnboundedSender<FlowEvent>, event: FlowEvent) {
    if events.send(event).is_err() {
        debug!("Flow event receiver dropped");
    }
}
