// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scanning pipeline — display-fit transform, document outline detection and
// perspective rectification.

pub mod outline;
pub mod rectify;
pub mod transform;

pub use rectify::{Rectifier, SoftScanner};
pub use outline::{Quad, detect_document_outline, draw_outline};
pub use transform::{apply_transform, compute_downscale_ratio, fit_to_display};
