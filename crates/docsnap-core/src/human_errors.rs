// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Human-readable error messages shown when a capture goes wrong.
//
// Every technical error is mapped to plain English with a clear suggestion.
// The flow always drops back to the live camera afterwards, so the message
// tells the user what to do on the next attempt.

use crate::error::DocsnapError;

/// Severity of an error from the user's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Try the same thing again.
    Transient,
    /// User must do something first (free space, grant permission, reframe).
    ActionRequired,
    /// The device cannot do this at all.
    Permanent,
}

/// A human-readable error with plain English message and actionable suggestion.
#[derive(Debug, Clone)]
pub struct HumanError {
    /// Plain English summary (shown as a heading).
    pub message: String,
    /// What the user should try (shown as body text).
    pub suggestion: String,
    /// Whether pressing capture again is likely to work.
    pub retriable: bool,
    /// Severity level (drives icon/colour in UI).
    pub severity: Severity,
}

/// Convert a `DocsnapError` into a `HumanError`.
pub fn humanize_error(err: &DocsnapError) -> HumanError {
    match err {
        DocsnapError::Configuration(_) => HumanError {
            message: "The camera couldn't be set up for photos.".into(),
            suggestion: "Close the scanner and open it again. If this keeps happening, this camera may not support still photos.".into(),
            retriable: false,
            severity: Severity::Permanent,
        },

        DocsnapError::InvalidState(_) => HumanError {
            message: "Still working on the last photo.".into(),
            suggestion: "Wait a moment, then press the capture button again.".into(),
            retriable: true,
            severity: Severity::Transient,
        },

        DocsnapError::ExternalProcessing(_) => HumanError {
            message: "We couldn't find the document edges.".into(),
            suggestion: "Place the page on a dark surface, fit all four corners in the frame, and try again.".into(),
            retriable: true,
            severity: Severity::ActionRequired,
        },

        DocsnapError::ImageError(_) => HumanError {
            message: "The photo came out unreadable.".into(),
            suggestion: "Hold the device steady and take the photo again.".into(),
            retriable: true,
            severity: Severity::Transient,
        },

        DocsnapError::Io(io_err) => match io_err.kind() {
            std::io::ErrorKind::PermissionDenied => HumanError {
                message: "The app isn't allowed to save pictures.".into(),
                suggestion: "Allow storage access for the scanner in your device settings.".into(),
                retriable: false,
                severity: Severity::ActionRequired,
            },
            std::io::ErrorKind::StorageFull => HumanError {
                message: "Your device is out of space.".into(),
                suggestion: "Delete some photos or apps, then scan again.".into(),
                retriable: false,
                severity: Severity::ActionRequired,
            },
            _ => HumanError {
                message: "The photo couldn't be saved.".into(),
                suggestion: "Try again. If this keeps happening, your device's storage may be full.".into(),
                retriable: true,
                severity: Severity::Transient,
            },
        },

        DocsnapError::Serialization(_) => HumanError {
            message: "The scanner settings are damaged.".into(),
            suggestion: "The default settings will be used. You can change them again in Settings.".into(),
            retriable: true,
            severity: Severity::Transient,
        },

        DocsnapError::Bridge(_) => HumanError {
            message: "The camera stopped responding.".into(),
            suggestion: "Close other apps that might be using the camera, then try again.".into(),
            retriable: true,
            severity: Severity::Transient,
        },

        DocsnapError::PlatformUnavailable => HumanError {
            message: "This feature isn't available on your device.".into(),
            suggestion: "Some features require a phone or tablet with a camera.".into(),
            retriable: false,
            severity: Severity::Permanent,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn busy_capture_is_transient() {
        let human = humanize_error(&DocsnapError::InvalidState("capture in flight".into()));
        assert_eq!(human.severity, Severity::Transient);
        assert!(human.retriable);
    }

    #[test]
    fn missing_outline_needs_user_action() {
        let human = humanize_error(&DocsnapError::ExternalProcessing("no quad".into()));
        assert_eq!(human.severity, Severity::ActionRequired);
    }

    #[test]
    fn disk_full_needs_user_action() {
        let err = DocsnapError::Io(std::io::Error::from(std::io::ErrorKind::StorageFull));
        let human = humanize_error(&err);
        assert_eq!(human.severity, Severity::ActionRequired);
        assert!(!human.retriable);
    }

    #[test]
    fn no_resolution_is_permanent() {
        let human = humanize_error(&DocsnapError::Configuration("empty".into()));
        assert_eq!(human.severity, Severity::Permanent);
    }
}
