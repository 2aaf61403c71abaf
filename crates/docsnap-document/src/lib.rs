// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// docsnap-document — Image handling for the docsnap capture pipeline.
//
// Provides decoding/encoding of captured stills, the display-fit scan
// transform (area downscale + transpose + mirror), document outline
// detection for preview hints, and the software rectifier.

pub mod image;
pub mod scan;

pub use crate::image::processor::ImageProcessor;
pub use crate::scan::outline::Quad;
pub use crate::scan::rectify::{Rectifier, SoftScanner};
