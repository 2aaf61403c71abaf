// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// docsnap-capture — The capture-to-review pipeline.
//
// Chooses the camera's best still resolution, throttles preview analysis,
// takes one still at a time, fits it to the display, rectifies it and runs
// the accept/reject review. `ScanFlow` ties the parts together and
// `run_driver` serialises every callback onto one tokio task.

pub mod analysis;
pub mod camera;
pub mod controller;
pub mod driver;
pub mod flow;
pub mod invoker;
pub mod lifecycle;
pub mod resolution;
pub mod review;
pub mod session;
pub mod storage;
pub mod throttle;

#[cfg(test)]
mod testing;

pub use analysis::{FrameAnalyzer, OutlineHint, PreviewGate};
pub use camera::CameraSession;
pub use controller::{CaptureController, CaptureTicket};
pub use driver::{FlowEvent, UserCommand, run_driver};
pub use flow::ScanFlow;
pub use invoker::invoke_rectification;
pub use lifecycle::{CameraViewLifecycle, PreviewAction, ViewEvent};
pub use resolution::{configure_best_resolution, select_best_resolution};
pub use review::Review;
pub use session::CaptureSession;
pub use storage::{ScanStorage, default_data_dir, default_pictures_dir, scan_file_name};
pub use throttle::FrameThrottle;
