// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for docsnap.

use thiserror::Error;

use crate::types::ErrorClass;

/// Top-level error type for all docsnap operations.
#[derive(Debug, Error)]
pub enum DocsnapError {
    // -- Pipeline setup --
    #[error("camera configuration failed: {0}")]
    Configuration(String),

    #[error("invalid state: {0}")]
    InvalidState(String),

    // -- Processing --
    #[error("rectification failed: {0}")]
    ExternalProcessing(String),

    #[error("image processing failed: {0}")]
    ImageError(String),

    // -- Storage / persistence --
    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // -- Platform bridge --
    #[error("platform bridge error: {0}")]
    Bridge(String),

    #[error("feature not available on this platform")]
    PlatformUnavailable,
}

impl DocsnapError {
    /// Whether the capture flow can absorb this error and return to aiming.
    ///
    /// Only configuration errors escape the capture/review boundary; they
    /// abort pipeline start-up.
    pub fn class(&self) -> ErrorClass {
        classify_error(self)
    }
}

/// Classify a `DocsnapError` for the propagation policy.
pub fn classify_error(err: &DocsnapError) -> ErrorClass {
    match err {
        DocsnapError::Configuration(_) => ErrorClass::Fatal,
        DocsnapError::PlatformUnavailable => ErrorClass::Fatal,

        DocsnapError::InvalidState(_)
        | DocsnapError::ExternalProcessing(_)
        | DocsnapError::ImageError(_)
        | DocsnapError::Io(_)
        | DocsnapError::Serialization(_)
        | DocsnapError::Bridge(_) => ErrorClass::Recoverable,
    }
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, DocsnapError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configuration_is_fatal() {
        let err = DocsnapError::Configuration("no picture sizes".into());
        assert_eq!(err.class(), ErrorClass::Fatal);
    }

    #[test]
    fn io_and_rectification_are_recoverable() {
        let io = DocsnapError::Io(std::io::Error::other("disk full"));
        assert_eq!(classify_error(&io), ErrorClass::Recoverable);

        let ext = DocsnapError::ExternalProcessing("no outline".into());
        assert_eq!(classify_error(&ext), ErrorClass::Recoverable);
    }
}
