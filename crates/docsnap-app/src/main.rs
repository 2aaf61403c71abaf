// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// docsnap — camera document capture, rectification and review
//
// Entry point. Initialises logging and dispatches to the subcommands.
// Logs go to stderr so `scan --json` output stays machine-readable.

mod commands;

use clap::{Parser, Subcommand};

use commands::config::ConfigArgs;
use commands::preview::PreviewArgs;
use commands::scan::ScanArgs;

#[derive(Parser)]
#[command(name = "docsnap")]
#[command(about = "Capture, rectify and review document scans")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one capture through the pipeline, replaying an image as the camera still
    Scan(ScanArgs),

    /// Draw the detected document outline onto an image
    Preview(PreviewArgs),

    /// Show or reset the stored scanner configuration
    Config(ConfigArgs),
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    tracing::info!("docsnap starting");

    let cli = Cli::parse();
    match cli.command {
        Commands::Scan(args) => commands::scan::run(args).await,
        Commands::Preview(args) => commands::preview::run(args),
        Commands::Config(args) => commands::config::run(args),
    }
}
