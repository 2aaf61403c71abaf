// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Frame throttle — a tick counter that decides when preview frames may be
// forwarded to analysis.

use std::time::Duration;

use docsnap_core::error::{DocsnapError, Result};
use docsnap_core::{ScannerConfig, ThrottleMode};

/// Periodic tick counter gating preview analysis.
///
/// A timer owned by the driver calls [`FrameThrottle::tick`] every `period`.
/// The counter only ever grows.
#[derive(Debug, Clone)]
pub struct FrameThrottle {
    ticks: u64,
    period: Duration,
    trigger_every: u64,
    mode: ThrottleMode,
    last_analyzed_at: Option<u64>,
}

impl FrameThrottle {
    pub fn new(period: Duration, trigger_every: u64, mode: ThrottleMode) -> Result<Self> {
        if period.is_zero() {
            return Err(DocsnapError::Configuration(
                "throttle period must be positive".into(),
            ));
        }
        if trigger_every == 0 {
            return Err(DocsnapError::Configuration(
                "throttle trigger count must be positive".into(),
            ));
        }
        Ok(Self {
            ticks: 0,
            period,
            trigger_every,
            mode,
            last_analyzed_at: None,
        })
    }

    pub fn from_config(config: &ScannerConfig) -> Result<Self> {
        Self::new(
            config.throttle_period(),
            config.throttle_trigger_every,
            config.throttle_mode,
        )
    }

    /// Advance the counter by one timer period.
    pub fn tick(&mut self) {
        self.ticks = self.ticks.saturating_add(1);
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn mode(&self) -> ThrottleMode {
        self.mode
    }

    /// Whether a frame arriving now may be analysed. Pure: never changes the
    /// counter or the re-arm state.
    pub fn should_analyze(&self) -> bool {
        if self.ticks < self.trigger_every {
            return false;
        }
        match (self.mode, self.last_analyzed_at) {
            (ThrottleMode::Latched, _) => true,
            (_, None) => true,
            (ThrottleMode::OneShot, Some(_)) => false,
            (ThrottleMode::Periodic, Some(last)) => self.ticks - last >= self.trigger_every,
        }
    }

    /// Record that analysis ran at the current tick.
    pub fn mark_analyzed(&mut self) {
        if self.mode != ThrottleMode::Latched {
            self.last_analyzed_at = Some(self.ticks);
        }
    }
}
