// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Stub bridge for desktop/CI builds where no native camera or media store exists.
//
// Every trait method returns `PlatformUnavailable`.

use std::path::Path;

use docsnap_core::error::{DocsnapError, Result};

use crate::traits::*;

/// No-op bridge returned on platforms without a native bridge.
pub struct StubBridge;

impl PlatformBridge for StubBridge {
    fn platform_name(&self) -> &str {
        "Desktop (stub)"
    }

    fn open_camera(
        &self,
        _events: tokio::sync::mpsc::UnboundedSender<CameraEvent>,
    ) -> Result<Box<dyn CameraDevice>> {
        tracing::warn!("PlatformBridge::open_camera called on stub bridge");
        Err(DocsnapError::PlatformUnavailable)
    }
}

impl MediaIndex for StubBridge {
    fn register_image(&self, path: &Path, _mime_type: &str) -> Result<()> {
        tracing::warn!(path = %path.display(), "MediaIndex::register_image called on stub bridge");
        Err(DocsnapError::PlatformUnavailable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stub_reports_platform_unavailable() {
        let bridge = StubBridge;
        let (tx, _rx) = tokio::sync::mpsc::unbounded_channel();
        assert!(matches!(
            bridge.open_camera(tx),
            Err(DocsnapError::PlatformUnavailable)
        ));
        assert!(matches!(
            bridge.register_image(Path::new("/tmp/x.png"), "image/png"),
            Err(DocsnapError::PlatformUnavailable)
        ));
    }
}
