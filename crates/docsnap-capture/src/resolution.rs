// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Resolution selector — pick the largest still-capture size the camera offers.

use docsnap_bridge::CameraDevice;
use docsnap_core::Resolution;
use docsnap_core::error::{DocsnapError, Result};
use tracing::{info, instrument};

use crate::camera::CameraSession;

/// Return the candidate with the greatest pixel area.
///
/// The first candidate is the initial best and ties keep the earlier entry,
/// so the result is deterministic for any ordering.
pub fn select_best_resolution(candidates: &[Resolution]) -> Result<Resolution> {
    let (first, rest) = candidates.split_first().ok_or_else(|| {
        DocsnapError::Configuration("camera reported no still-capture resolutions".into())
    })?;
    let mut best = *first;
    for candidate in rest {
        if candidate.area() > best.area() {
            best = *candidate;
        }
    }
    Ok(best)
}

/// Query the camera's picture sizes, pick the best and apply it.
///
/// Must run before the first still request; refused with `InvalidState` while
/// a capture is in flight.
#[instrument(skip(camera))]
pub fn configure_best_resolution<C: CameraDevice>(
    camera: &mut CameraSession<C>,
) -> Result<Resolution> {
    if camera.still_outstanding() {
        return Err(DocsnapError::InvalidState(
            "resolution cannot change while a capture is in flight".into(),
        ));
    }
    let candidates = camera.supported_picture_sizes()?;
    let best = select_best_resolution(&candidates)?;
    camera.set_picture_size(best)?;
    info!(
        width = best.width,
        height = best.height,
        candidates = candidates.len(),
        "Still-capture resolution selected"
    );
    Ok(best)
}

#[cfg(test)]
mod tests {
    use super::*;
    use docsnap_bridge::ReplayCamera;

    #[test]
    fn picks_largest_area() {
        let candidates = [
            Resolution::new(640, 480),
            Resolution::new(1920, 1080),
            Resolution::new(1280, 720),
        ];
        assert_eq!(
            select_best_resolution(&candidates).unwrap(),
            Resolution::new(1920, 1080)
        );
    }

    #[test]
    fn result_dominates_every_candidate() {
        let candidates = [
            Resolution::new(4000, 3000),
            Resolution::new(3000, 4000),
            Resolution::new(4096, 2160),
            Resolution::new(100, 100),
            Resolution::new(1, 12_000_000),
        ];
        let best = select_best_resolution(&candidates).unwrap();
        assert!(candidates.contains(&best));
        assert!(candidates.iter().all(|c| best.area() >= c.area()));
    }

    #[test]
    fn ties_keep_first_seen() {
        let candidates = [
            Resolution::new(800, 600),
            Resolution::new(600, 800),
            Resolution::new(480, 1000),
        ];
        assert_eq!(
            select_best_resolution(&candidates).unwrap(),
            Resolution::new(800, 600)
        );
    }

    #[test]
    fn empty_candidates_are_a_configuration_error() {
        assert!(matches!(
            select_best_resolution(&[]),
            Err(DocsnapError::Configuration(_))
        ));
    }

    #[test]
    fn configure_applies_best_size() {
        let (tx, _rx) = tokio::sync::mpsc::unbounded_channel();
        let mut camera = CameraSession::new(ReplayCamera::new(
            vec![Resolution::new(640, 480), Resolution::new(2048, 1536)],
            vec![],
            tx,
        ));
        let chosen = configure_best_resolution(&mut camera).unwrap();
        assert_eq!(chosen, Resolution::new(2048, 1536));
        assert_eq!(camera.device().picture_size(), Some(chosen));
    }

    #[test]
    fn configure_is_refused_during_capture() {
        let (tx, _rx) = tokio::sync::mpsc::unbounded_channel();
        let mut camera = CameraSession::new(ReplayCamera::new(
            vec![Resolution::new(640, 480)],
            vec![],
            tx,
        ));
        camera.request_still().unwrap();
        assert!(matches!(
            configure_best_resolution(&mut camera),
            Err(DocsnapError::InvalidState(_))
        ));
    }
}
