// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scan invoker — hand a transformed capture to the rectifier and take
// ownership of what comes back.

use docsnap_core::error::{DocsnapError, Result};
use docsnap_document::Rectifier;
use image::RgbaImage;
use tracing::{debug, instrument, warn};

/// Run `rectifier` over `image`.
///
/// Allocates the empty output buffer, lets the rectifier fill it and returns
/// it. Any failure is reported as `ExternalProcessing`; the rectifier's
/// internals are not interpreted.
#[instrument(skip_all, fields(width = image.width(), height = image.height()))]
pub fn invoke_rectification<R: Rectifier + ?Sized>(
    rectifier: &R,
    image: &RgbaImage,
) -> Result<RgbaImage> {
    let mut output = RgbaImage::new(0, 0);
    if let Err(e) = rectifier.rectify(image, &mut output) {
        warn!(error = %e, "Rectification failed");
        return Err(match e {
            DocsnapError::ExternalProcessing(_) => e,
            other => DocsnapError::ExternalProcessing(other.to_string()),
        });
    }
    if output.width() == 0 || output.height() == 0 {
        return Err(DocsnapError::ExternalProcessing(
            "rectifier produced an empty image".into(),
        ));
    }
    debug!(
        out_w = output.width(),
        out_h = output.height(),
        "Corrected image received"
    );
    Ok(output)
}
