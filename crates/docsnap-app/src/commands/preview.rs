// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// `docsnap preview` — run the outline hint on a single image.

use std::path::{Path, PathBuf};

use clap::Args;
use docsnap_core::OutputFormat;
use docsnap_core::error::Result;
use docsnap_document::ImageProcessor;
use docsnap_document::scan::{Quad, detect_document_outline, draw_outline};
use image::RgbaImage;
use tracing::info;

#[derive(Debug, Args)]
pub struct PreviewArgs {
    /// Image to analyse
    pub input: PathBuf,

    /// Where to write the annotated PNG
    #[arg(short, long)]
    pub output: PathBuf,

    /// Width the image is shrunk to before outline detection
    #[arg(long, default_value = "500")]
    pub analysis_width: u32,
}

pub fn run(args: PreviewArgs) -> std::result::Result<(), Box<dyn std::error::Error>> {
    let (frame, quad) = outline_preview(&args.input, args.analysis_width)?;
    match quad {
        Some(quad) => {
            println!("Document outline:");
            for (x, y) in quad.corners() {
                println!("  ({x:.0}, {y:.0})");
            }
        }
        None => println!("No document outline found."),
    }

    let png = ImageProcessor::from_rgba(frame).encode(OutputFormat::Png)?;
    std::fs::write(&args.output, png)?;
    println!("Wrote {}", args.output.display());
    Ok(())
}

/// Load `input` and draw the detected outline on it, if any.
fn outline_preview(input: &Path, analysis_width: u32) -> Result<(RgbaImage, Option<Quad>)> {
    let mut frame = ImageProcessor::open(input)?.into_rgba8();
    let quad = detect_document_outline(&frame, analysis_width);
    if let Some(quad) = &quad {
        draw_outline(&mut frame, quad);
    }
    info!(found = quad.is_some(), "Outline preview");
    Ok((frame, quad))
}
