// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the docsnap capture pipeline.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a capture session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A still-capture resolution reported by the camera.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Resolution {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Pixel count, widened so 16k sensors cannot overflow.
    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }
}

impl std::fmt::Display for Resolution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Size of the surface the reviewed scan is rendered on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayExtent {
    pub width: u32,
    pub height: u32,
}

impl DisplayExtent {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl Default for DisplayExtent {
    /// A portrait 1080p phone screen.
    fn default() -> Self {
        Self::new(1080, 1920)
    }
}

impl std::str::FromStr for DisplayExtent {
    type Err = String;

    /// Parse `"<width>x<height>"`, e.g. `"1080x1920"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (w, h) = s
            .split_once(['x', 'X'])
            .ok_or_else(|| format!("expected <width>x<height>, got {s:?}"))?;
        let width: u32 = w.trim().parse().map_err(|e| format!("bad width {w:?}: {e}"))?;
        let height: u32 = h.trim().parse().map_err(|e| format!("bad height {h:?}: {e}"))?;
        if width == 0 || height == 0 {
            return Err(format!("display extent must be non-zero, got {s:?}"));
        }
        Ok(Self { width, height })
    }
}

/// Lifecycle states of the still-capture controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CaptureState {
    /// No still requested yet.
    Idle,
    /// Preview delivery disabled, waiting for the camera to hand over the still.
    AwaitingStill,
    /// Writing the raw still to the transient file.
    WritingFile,
    /// Preview delivery re-enabled after a completed capture.
    PreviewRestored,
}

impl CaptureState {
    /// Whether a still request is outstanding.
    pub fn is_in_flight(&self) -> bool {
        matches!(self, Self::AwaitingStill | Self::WritingFile)
    }
}

/// The user's verdict on a reviewed scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReviewDecision {
    Pending,
    Accepted,
    Rejected,
}

/// How the frame throttle behaves once it has triggered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThrottleMode {
    /// Stays armed forever once the trigger count is reached.
    #[default]
    Latched,
    /// Fires once, then never again.
    OneShot,
    /// Re-arms every `trigger_every` ticks after each analysis.
    Periodic,
}

/// Encoding used for the permanent copy of an accepted scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    #[default]
    Png,
    Jpeg,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
        }
    }
}

/// Coarse phase of the capture flow, as the UI sees it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FlowPhase {
    /// Live preview, waiting for the user to press capture.
    Aiming,
    /// Still requested, waiting for the camera.
    Capturing,
    /// A scan is on screen awaiting accept/reject.
    Reviewing,
}

/// Decision signal handed back to the originating flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanOutcome {
    pub session: SessionId,
    pub accepted: bool,
    /// The transient raw capture the decision refers to.
    pub transient_path: PathBuf,
    /// Where the accepted scan was written.
    pub saved_path: Option<PathBuf>,
}

/// Classification of errors for the propagation policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorClass {
    /// Logged and absorbed; the flow returns to aiming.
    Recoverable,
    /// Aborts pipeline initialisation.
    Fatal,
}
