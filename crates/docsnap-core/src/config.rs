// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scanner configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{DocsnapError, Result};
use crate::types::{OutputFormat, ThrottleMode};

/// File name of the persisted configuration inside the data directory.
pub const CONFIG_FILE: &str = "config.json";

/// Persistent scanner settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScannerConfig {
    /// Period of the throttle timer in milliseconds (default 100).
    pub throttle_period_ms: u64,
    /// Ticks before preview analysis is allowed (default 5, ~500ms).
    pub throttle_trigger_every: u64,
    /// What the throttle does after it first triggers.
    pub throttle_mode: ThrottleMode,
    /// Whether the outline hint is drawn on preview frames at start-up.
    pub analysis_enabled: bool,
    /// Width preview frames are shrunk to before outline detection.
    pub analysis_width: u32,
    /// Encoding of accepted scans.
    pub output_format: OutputFormat,
    /// Name of the single transient raw-capture file.
    pub transient_file_name: String,
    /// Override for the public pictures directory.
    pub pictures_dir: Option<PathBuf>,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            throttle_period_ms: 100,
            throttle_trigger_every: 5,
            throttle_mode: ThrottleMode::Latched,
            analysis_enabled: false,
            analysis_width: 500,
            output_format: OutputFormat::Png,
            transient_file_name: "photo.jpg".into(),
            pictures_dir: None,
        }
    }
}

impl ScannerConfig {
    /// Throttle timer period as a `Duration`.
    pub fn throttle_period(&self) -> Duration {
        Duration::from_millis(self.throttle_period_ms)
    }

    /// Reject values the pipeline cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.throttle_period_ms == 0 {
            return Err(DocsnapError::Configuration(
                "throttle_period_ms must be positive".into(),
            ));
        }
        if self.throttle_trigger_every == 0 {
            return Err(DocsnapError::Configuration(
                "throttle_trigger_every must be positive".into(),
            ));
        }
        if self.analysis_width == 0 {
            return Err(DocsnapError::Configuration(
                "analysis_width must be positive".into(),
            ));
        }
        if self.transient_file_name.is_empty() {
            return Err(DocsnapError::Configuration(
                "transient_file_name must not be empty".into(),
            ));
        }
        Ok(())
    }

    /// Load the configuration stored in `data_dir`, falling back to defaults
    /// when the file is missing or unreadable.
    pub fn load_or_default(data_dir: &Path) -> Self {
        let path = data_dir.join(CONFIG_FILE);
        let data = match std::fs::read_to_string(&path) {
            Ok(data) => data,
            Err(_) => {
                debug!(path = %path.display(), "no config file, using defaults");
                return Self::default();
            }
        };
        match serde_json::from_str(&data) {
            Ok(config) => config,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "invalid config file, using defaults");
                Self::default()
            }
        }
    }

    /// Persist the configuration as pretty JSON inside `data_dir`.
    pub fn save(&self, data_dir: &Path) -> Result<()> {
        let path = data_dir.join(CONFIG_FILE);
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(&path, json)?;
        Ok(())
    }
}
