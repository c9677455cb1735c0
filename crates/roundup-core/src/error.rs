// SPDX-FileCopyrightText: 2026 Roundup Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the roundup survey bot.

use thiserror::Error;

/// The primary error type used across the roundup adapter traits and core
/// operations.
///
/// Expected branches of the survey flow (an answer from a participant who
/// never started the form, for instance) are modeled as result variants on
/// the engine side, not as errors here.
#[derive(Debug, Error)]
pub enum RoundupError {
    /// Configuration errors (invalid TOML, missing required fields, type mismatches).
    #[error("configuration error: {0}")]
    Config(String),

    /// Tabular store errors (table creation, permission grant, row append, row read).
    ///
    /// Failures of this class are transient from the participant's point of
    /// view: the in-progress session is retained and the submission can be
    /// retried.
    #[error("storage error: {message}")]
    Storage {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Chat transport errors (send, edit, delete, document upload).
    ///
    /// Tolerated and logged in fan-out paths; a delivery failure for one
    /// recipient never aborts a batch affecting other recipients.
    #[error("channel error: {message}")]
    Channel {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A back-navigation target was outside the current question bounds.
    ///
    /// Navigation targets round-trip through the transport as opaque
    /// callback data, so they are validated defensively on the way back in.
    #[error("navigation target {target} out of range for {len} questions")]
    InvalidNavigation { target: usize, len: usize },

    /// An operator-only action was invoked by a non-operator.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl RoundupError {
    /// Shorthand for a [`RoundupError::Storage`] without an underlying source.
    pub fn storage(message: impl Into<String>) -> Self {
        RoundupError::Storage {
            message: message.into(),
            source: None,
        }
    }

    /// Shorthand for a [`RoundupError::Channel`] without an underlying source.
    pub fn channel(message: impl Into<String>) -> Self {
        RoundupError::Channel {
            message: message.into(),
            source: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_formats_carry_context() {
        let err = RoundupError::InvalidNavigation { target: 7, len: 4 };
        assert_eq!(
            err.to_string(),
            "navigation target 7 out of range for 4 questions"
        );

        let err = RoundupError::storage("append failed");
        assert_eq!(err.to_string(), "storage error: append failed");
    }
}
