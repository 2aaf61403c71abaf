// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Preview analysis gate — decides which live frames are analysed and keeps
// the most recent frame for display.

use docsnap_core::ScannerConfig;
use docsnap_core::error::Result;
use docsnap_document::scan::outline::{detect_document_outline, draw_outline};
use image::RgbaImage;
use tracing::trace;

use crate::throttle::FrameThrottle;

/// Per-frame analysis run on throttled preview frames.
pub trait FrameAnalyzer: Send {
    /// Inspect `frame`, possibly drawing on it.
    fn analyze(&mut self, frame: &mut RgbaImage);
}

impl<T: FrameAnalyzer + ?Sized> FrameAnalyzer for Box<T> {
    fn analyze(&mut self, frame: &mut RgbaImage) {
        (**self).analyze(frame)
    }
}

/// Draws the detected document outline onto the frame as a framing hint.
#[derive(Debug, Clone, Copy)]
pub struct OutlineHint {
    pub analysis_width: u32,
}

impl FrameAnalyzer for OutlineHint {
    fn analyze(&mut self, frame: &mut RgbaImage) {
        if let Some(quad) = detect_document_outline(frame, self.analysis_width) {
            draw_outline(frame, &quad);
        }
    }
}

/// Throttle + user toggle + non-empty check in front of a `FrameAnalyzer`.
pub struct PreviewGate {
    throttle: FrameThrottle,
    enabled: bool,
    analyzer: Box<dyn FrameAnalyzer>,
    latest: Option<RgbaImage>,
    analyzed_frames: u64,
}

impl PreviewGate {
    pub fn new(throttle: FrameThrottle, enabled: bool, analyzer: Box<dyn FrameAnalyzer>) -> Self {
        Self {
            throttle,
            enabled,
            analyzer,
            latest: None,
            analyzed_frames: 0,
        }
    }

    /// Gate with the outline hint, configured from `config`.
    pub fn from_config(config: &ScannerConfig) -> Result<Self> {
        Ok(Self::new(
            FrameThrottle::from_config(config)?,
            config.analysis_enabled,
            Box::new(OutlineHint {
                analysis_width: config.analysis_width,
            }),
        ))
    }

    pub fn tick(&mut self) {
        self.throttle.tick();
    }

    pub fn throttle(&self) -> &FrameThrottle {
        &self.throttle
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// How many frames have reached the analyzer.
    pub fn analyzed_frames(&self) -> u64 {
        self.analyzed_frames
    }

    /// Whether `frame` would be analysed right now.
    pub fn admits(&self, frame: &RgbaImage) -> bool {
        self.enabled
            && self.throttle.should_analyze()
            && frame.width() > 0
            && frame.height() > 0
    }

    /// Take a delivered preview frame, analyse it if the gate admits it, and
    /// return the buffer to display. Only this most recent frame is kept.
    pub fn on_preview_frame(&mut self, mut frame: RgbaImage) -> &RgbaImage {
        if self.admits(&frame) {
            self.analyzer.analyze(&mut frame);
            self.throttle.mark_analyzed();
            self.analyzed_frames += 1;
            trace!(ticks = self.throttle.ticks(), "Preview frame analysed");
        }
        self.latest.insert(frame)
    }

    /// The most recently delivered frame.
    pub fn latest_frame(&self) -> Option<&RgbaImage> {
        self.latest.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docsnap_core::ThrottleMode;
    use docsnap_document::scan::outline::OUTLINE_COLOUR;
    use image::Rgba;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    struct Counting(Arc<AtomicUsize>);

    impl FrameAnalyzer for Counting {
        fn analyze(&mut self, _frame: &mut RgbaImage) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn gate(mode: ThrottleMode, enabled: bool) -> (PreviewGate, Arc<AtomicUsize>) {
        let count = Arc::new(AtomicUsize::new(0));
        let throttle = FrameThrottle::new(Duration::from_millis(100), 5, mode).unwrap();
        let gate = PreviewGate::new(throttle, enabled, Box::new(Counting(count.clone())));
        (gate, count)
    }

    fn frame() -> RgbaImage {
        RgbaImage::from_pixel(8, 8, Rgba([50, 50, 50, 255]))
    }

    #[test]
    fn nothing_is_analysed_before_the_throttle_triggers() {
        let (mut gate, count) = gate(ThrottleMode::Latched, true);
        for _ in 0..4 {
            gate.tick();
            gate.on_preview_frame(frame());
        }
        assert_eq!(count.load(Ordering::SeqCst), 0);
        gate.tick();
        gate.on_preview_frame(frame());
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn disabled_gate_never_analyses() {
        let (mut gate, count) = gate(ThrottleMode::Latched, false);
        for _ in 0..10 {
            gate.tick();
        }
        gate.on_preview_frame(frame());
        assert_eq!(count.load(Ordering::SeqCst), 0);
        gate.set_enabled(true);
        gate.on_preview_frame(frame());
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn empty_frame_is_never_analysed() {
        let (mut gate, count) = gate(ThrottleMode::Latched, true);
        for _ in 0..10 {
            gate.tick();
        }
        let shown = gate.on_preview_frame(RgbaImage::new(0, 0));
        assert_eq!(shown.dimensions(), (0, 0));
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn one_shot_gate_analyses_a_single_frame() {
        let (mut gate, count) = gate(ThrottleMode::OneShot, true);
        for _ in 0..20 {
            gate.tick();
            gate.on_preview_frame(frame());
        }
        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert_eq!(gate.analyzed_frames(), 1);
    }

    #[test]
    fn latest_frame_is_what_was_returned() {
        let (mut gate, _count) = gate(ThrottleMode::Latched, false);
        gate.on_preview_frame(RgbaImage::new(3, 3));
        gate.on_preview_frame(RgbaImage::new(5, 2));
        assert_eq!(gate.latest_frame().map(|f| f.dimensions()), Some((5, 2)));
    }

    #[test]
    fn outline_hint_draws_on_a_page() {
        let mut page = RgbaImage::from_fn(120, 160, |x, y| {
            if (20..100).contains(&x) && (30..130).contains(&y) {
                Rgba([240, 240, 240, 255])
            } else {
                Rgba([20, 20, 20, 255])
            }
        });
        OutlineHint { analysis_width: 500 }.analyze(&mut page);
        assert!(page.pixels().any(|p| *p == OUTLINE_COLOUR));
    }
}
