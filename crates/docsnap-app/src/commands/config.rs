// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// `docsnap config` — print or reset the stored configuration.

use std::path::PathBuf;

use clap::Args;
use docsnap_core::ScannerConfig;
use docsnap_core::config::CONFIG_FILE;
use tracing::warn;

use super::resolve_data_dir;

#[derive(Debug, Args)]
pub struct ConfigArgs {
    /// Directory holding config.json and the transient capture
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    /// Overwrite the stored configuration with the defaults
    #[arg(long)]
    pub reset: bool,
}

pub fn run(args: ConfigArgs) -> Result<(), Box<dyn std::error::Error>> {
    let data_dir = resolve_data_dir(args.data_dir.as_ref());
    let config = if args.reset {
        let config = ScannerConfig::default();
        std::fs::create_dir_all(&data_dir)?;
        config.save(&data_dir)?;
        println!("Wrote defaults to {}", data_dir.join(CONFIG_FILE).display());
        config
    } else {
        ScannerConfig::load_or_default(&data_dir)
    };

    if let Err(e) = config.validate() {
        warn!(error = %e, "Stored configuration is invalid");
    }
    println!("{}", serde_json::to_string_pretty(&config)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reset_writes_loadable_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let data_dir = dir.path().join("docsnap");

        run(ConfigArgs {
            data_dir: Some(data_dir.clone()),
            reset: true,
        })
        .unwrap();

        assert!(data_dir.join(CONFIG_FILE).exists());
        assert_eq!(ScannerConfig::load_or_default(&data_dir), ScannerConfig::default());
    }
}
