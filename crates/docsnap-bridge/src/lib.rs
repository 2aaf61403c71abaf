// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>

//! docsnap — Camera and media-index bridge abstractions.
//!
//! The capture pipeline never talks to a camera driver directly. It owns a
//! `CameraDevice` and receives the device's asynchronous output as
//! `CameraEvent`s on a channel, so native bridges only have to forward their
//! callbacks into that channel.

pub mod replay;
pub mod stub;
pub mod traits;

pub use replay::ReplayCamera;
pub use traits::{CameraDevice, CameraEvent, MediaIndex, PlatformBridge};

/// Retrieves the bridge implementation for the target operating system.
///
/// Desktop and CI builds get the stub, whose media index and camera report
/// `PlatformUnavailable`.
pub fn platform_bridge() -> Box<dyn traits::PlatformBridge> {
    Box::new(stub::StubBridge)
}
