// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Camera view lifecycle — when the live preview should be running.

use tracing::debug;

/// Inputs from the hosting view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewEvent {
    Enable,
    Disable,
    PermissionGranted,
    PermissionRevoked,
    SurfaceChanged,
    SurfaceDestroyed,
}

/// What the preview should do in response to a `ViewEvent`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreviewAction {
    None,
    Start,
    Stop,
    /// Stop, then start again (new surface geometry).
    Restart,
}

/// The preview runs iff the view is enabled, camera permission is granted
/// and a surface exists.
#[derive(Debug, Clone, Default)]
pub struct CameraViewLifecycle {
    enabled: bool,
    permission: bool,
    surface: bool,
    started: bool,
}

impl CameraViewLifecycle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    fn should_run(&self) -> bool {
        self.enabled && self.permission && self.surface
    }

    /// Apply `event` and return the preview transition it causes.
    pub fn handle(&mut self, event: ViewEvent) -> PreviewAction {
        let had_surface = self.surface;
        match event {
            ViewEvent::Enable => self.enabled = true,
            ViewEvent::Disable => self.enabled = false,
            ViewEvent::PermissionGranted => self.permission = true,
            ViewEvent::PermissionRevoked => self.permission = false,
            ViewEvent::SurfaceChanged => self.surface = true,
            ViewEvent::SurfaceDestroyed => self.surface = false,
        }

        let target = self.should_run();
        let action = match (self.started, target) {
            (false, true) => PreviewAction::Start,
            (true, false) => PreviewAction::Stop,
            (true, true) if event == ViewEvent::SurfaceChanged && had_surface => {
                PreviewAction::Restart
            }
            _ => PreviewAction::None,
        };
        self.started = target;
        debug!(?event, ?action, "Camera view lifecycle");
        action
    }

    pub fn enable(&mut self) -> PreviewAction {
        self.handle(ViewEvent::Enable)
    }

    pub fn disable(&mut self) -> PreviewAction {
        self.handle(ViewEvent::Disable)
    }

    pub fn grant_permission(&mut self) -> PreviewAction {
        self.handle(ViewEvent::PermissionGranted)
    }

    pub fn revoke_permission(&mut self) -> PreviewAction {
        self.handle(ViewEvent::PermissionRevoked)
    }

    pub fn surface_changed(&mut self) -> PreviewAction {
        self.handle(ViewEvent::SurfaceChanged)
    }

    pub fn surface_destroyed(&mut self) -> PreviewAction {
        self.handle(ViewEvent::SurfaceDestroyed)
    }
}
