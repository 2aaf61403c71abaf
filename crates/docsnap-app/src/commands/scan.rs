// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// `docsnap scan` — one capture through the full pipeline.
//
// A replay camera stands in for the sensor: it advertises the input image's
// size (and half of it) and answers the still request with the input bytes.
// The scan then goes through the same driver a UI would use: the view comes
// up, the shutter is pressed, the review opens and the chosen decision is
// sent back.

use std::error::Error;
use std::path::{Path, PathBuf};

use clap::{Args, ValueEnum};
use docsnap_bridge::{ReplayCamera, platform_bridge};
use docsnap_capture::{FlowEvent, ScanFlow, ScanStorage, UserCommand, ViewEvent, run_driver};
use docsnap_core::{DisplayExtent, OutputFormat, Resolution, ScanOutcome, ScannerConfig};
use docsnap_document::{ImageProcessor, SoftScanner};
use image::RgbaImage;
use tokio::sync::{mpsc, watch};
use tracing::{info, warn};

use super::resolve_data_dir;

/// What to do with the scan once it is under review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Decision {
    Accept,
    Reject,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    Png,
    Jpeg,
}

impl From<Format> for OutputFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Png => OutputFormat::Png,
            Format::Jpeg => OutputFormat::Jpeg,
        }
    }
}

#[derive(Debug, Args)]
pub struct ScanArgs {
    /// Image replayed as the camera still
    pub input: PathBuf,

    /// Display surface the scan is fitted to, as WIDTHxHEIGHT
    #[arg(short, long, default_value = "1080x1920")]
    pub display: DisplayExtent,

    /// Decision sent once the scan is under review
    #[arg(long, value_enum, default_value = "accept")]
    pub decision: Decision,

    /// Directory holding config.json and the transient capture
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    /// Where accepted scans are saved (default: ~/Pictures)
    #[arg(long)]
    pub pictures_dir: Option<PathBuf>,

    /// Encoding of the saved scan (default: from config)
    #[arg(long, value_enum)]
    pub format: Option<Format>,

    /// Also write the reviewed image, as shown on the display, to this path
    #[arg(long)]
    pub review_out: Option<PathBuf>,

    /// Print the outcome as JSON
    #[arg(long)]
    pub json: bool,
}

pub async fn run(args: ScanArgs) -> Result<(), Box<dyn Error>> {
    let outcome = scan(&args).await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else if let Some(path) = &outcome.saved_path {
        println!("Scan {} saved to {}", outcome.session, path.display());
    } else {
        println!("Scan {} discarded", outcome.session);
    }
    Ok(())
}

async fn scan(args: &ScanArgs) -> Result<ScanOutcome, Box<dyn Error>> {
    let data_dir = resolve_data_dir(args.data_dir.as_ref());
    let mut config = ScannerConfig::load_or_default(&data_dir);
    if let Some(dir) = &args.pictures_dir {
        config.pictures_dir = Some(dir.clone());
    }
    if let Some(format) = args.format {
        config.output_format = format.into();
    }
    let storage = ScanStorage::from_config(&data_dir, &config);
    storage.ensure_dirs()?;

    let still = std::fs::read(&args.input)?;
    let full = {
        let probe = ImageProcessor::from_bytes(&still)?;
        Resolution::new(probe.width(), probe.height())
    };
    let sizes = vec![
        Resolution::new((full.width / 2).max(1), (full.height / 2).max(1)),
        full,
    ];

    let (camera_tx, camera_rx) = mpsc::unbounded_channel();
    let camera = ReplayCamera::new(sizes, still, camera_tx);
    let bridge = platform_bridge();
    info!(platform = bridge.platform_name(), "Media index");

    let flow = ScanFlow::new(
        camera,
        SoftScanner::new(config.analysis_width),
        bridge,
        storage,
        config,
        args.display,
    )?;
    info!(resolution = %flow.resolution(), "Replay camera configured");

    let (command_tx, command_rx) = mpsc::channel(8);
    let (event_tx, mut events) = mpsc::unbounded_channel();
    let (display_tx, display_rx) = watch::channel(None);
    let driver = tokio::spawn(run_driver(flow, camera_rx, command_rx, event_tx, display_tx));

    for event in [
        ViewEvent::Enable,
        ViewEvent::PermissionGranted,
        ViewEvent::SurfaceChanged,
    ] {
        send(&command_tx, UserCommand::View(event)).await?;
    }
    send(&command_tx, UserCommand::Capture).await?;

    let result: Result<ScanOutcome, Box<dyn Error>> = loop {
        let Some(event) = events.recv().await else {
            break Err("scan driver stopped unexpectedly".into());
        };
        match event {
            FlowEvent::CaptureStarted(session) => info!(%session, "Capture started"),
            FlowEvent::ReviewReady { session, corrected } => {
                if let Some(path) = &args.review_out {
                    let shown = display_rx.borrow().clone();
                    if let Err(e) = write_review(shown, path) {
                        warn!(error = %e, path = %path.display(), "Could not write review image");
                    }
                }
                let command = match (corrected, args.decision) {
                    (true, Decision::Accept) => UserCommand::Accept,
                    (false, Decision::Accept) => {
                        warn!(%session, "No corrected scan to keep, rejecting");
                        UserCommand::Reject
                    }
                    (_, Decision::Reject) => UserCommand::Reject,
                };
                send(&command_tx, command).await?;
            }
            FlowEvent::Decided(outcome) => break Ok(outcome),
            FlowEvent::Failed { class, error } => {
                warn!(?class, suggestion = %error.suggestion, "{}", error.message);
                break Err(format!("{} {}", error.message, error.suggestion).into());
            }
        }
    };

    if command_tx.send(UserCommand::Shutdown).await.is_err() {
        warn!("Scan driver already stopped");
    }
    let flow = driver.await?;
    info!(phase = ?flow.phase(), "Scan driver joined");
    result
}

async fn send(commands: &mpsc::Sender<UserCommand>, command: UserCommand) -> Result<(), Box<dyn Error>> {
    commands
        .send(command)
        .await
        .map_err(|_| "scan driver stopped".into())
}

fn write_review(shown: Option<RgbaImage>, path: &Path) -> Result<(), Box<dyn Error>> {
    let frame = shown.ok_or("nothing on the display")?;
    let png = ImageProcessor::from_rgba(frame).encode(OutputFormat::Png)?;
    std::fs::write(path, png)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::write_page_photo;

    fn args_in(dir: &Path, decision: Decision) -> ScanArgs {
        let input = dir.join("page.png");
        write_page_photo(&input);
        ScanArgs {
            input,
            display: DisplayExtent::default(),
            decision,
            data_dir: Some(dir.join("data")),
            pictures_dir: Some(dir.join("Pictures")),
            format: Some(Format::Png),
            review_out: Some(dir.join("review.png")),
            json: false,
        }
    }

    #[tokio::test]
    async fn accepted_scan_lands_in_pictures() {
        let dir = tempfile::tempdir().unwrap();
        let args = args_in(dir.path(), Decision::Accept);

        let outcome = scan(&args).await.unwrap();
        assert!(outcome.accepted);
        let saved = outcome.saved_path.unwrap();
        assert!(saved.starts_with(dir.path().join("Pictures")));
        assert_eq!(saved.extension().and_then(|e| e.to_str()), Some("png"));
        assert!(saved.exists());
        assert!(!outcome.transient_path.exists());
        assert!(dir.path().join("review.png").exists());
    }

    #[tokio::test]
    async fn rejected_scan_leaves_nothing_behind() {
        let dir = tempfile::tempdir().unwrap();
        let args = args_in(dir.path(), Decision::Reject);

        let outcome = scan(&args).await.unwrap();
        assert!(!outcome.accepted);
        assert!(outcome.saved_path.is_none());
        assert!(!outcome.transient_path.exists());
        let saved = std::fs::read_dir(dir.path().join("Pictures")).unwrap().count();
        assert_eq!(saved, 0);
    }

    #[tokio::test]
    async fn undecodable_input_fails_before_capture() {
        let dir = tempfile::tempdir().unwrap();
        let mut args = args_in(dir.path(), Decision::Accept);
        std::fs::write(&args.input, b"not an image").unwrap();
        args.review_out = None;

        assert!(scan(&args).await.is_err());
    }
}
