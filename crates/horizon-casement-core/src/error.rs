//! Error types for Horizon Casement.
//!
//! Most entry points of the runtime never fail loudly: an invalid window handle
//! degrades to a no-op and a full message queue is reported as `false`. The
//! errors below cover the places where a failure carries information worth
//! logging: behavior handlers, the persisted profile, and the clipboard.
//! None of them propagate past the dispatch boundary.

use std::path::PathBuf;

use crate::record::WindowId;

/// A specialized Result type for Horizon Casement operations.
pub type Result<T> = std::result::Result<T, CasementError>;

/// The main error type for Horizon Casement operations.
#[derive(Debug, thiserror::Error)]
pub enum CasementError {
    /// The window handle is invalid or the window has been destroyed.
    #[error("invalid or destroyed window {0:?}")]
    InvalidWindow(WindowId),

    /// The asynchronous message queue is at capacity.
    #[error("message queue is full ({capacity} entries)")]
    QueueFull {
        /// The configured queue capacity.
        capacity: usize,
    },

    /// A behavior failed while handling a message.
    #[error("{class} failed to handle {message}: {reason}")]
    Behavior {
        /// Class name of the failing behavior.
        class: &'static str,
        /// Name of the message being handled.
        message: &'static str,
        /// Human-readable failure description.
        reason: String,
    },

    /// A profile value could not be parsed.
    #[error("invalid profile value for [{section}] {key}: {value:?}")]
    ProfileValue {
        /// Profile section.
        section: String,
        /// Profile key.
        key: String,
        /// The raw value that failed to parse.
        value: String,
    },

    /// The profile file could not be read or written.
    #[error("profile I/O error on '{path}': {source}")]
    ProfileIo {
        /// Path of the profile file.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The profile file could not be parsed.
    #[error("failed to parse profile '{path}': {message}")]
    ProfileParse {
        /// Path of the profile file.
        path: PathBuf,
        /// Parser message.
        message: String,
    },

    /// The clipboard could not be accessed.
    #[error("clipboard unavailable: {0}")]
    Clipboard(String),
}

impl CasementError {
    /// Create a behavior error.
    pub fn behavior(class: &'static str, message: &'static str, reason: impl Into<String>) -> Self {
        Self::Behavior {
            class,
            message,
            reason: reason.into(),
        }
    }

    /// Create a profile value error.
    pub fn profile_value(
        section: impl Into<String>,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self::ProfileValue {
            section: section.into(),
            key: key.into(),
            value: value.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_behavior_error_display() {
        let err = CasementError::behavior("Edit", "Paste", "clipboard locked");
        assert_eq!(err.to_string(), "Edit failed to handle Paste: clipboard locked");
    }

    #[test]
    fn test_profile_value_display() {
        let err = CasementError::profile_value("placement", "main", "1,2,x");
        assert!(err.to_string().contains("[placement] main"));
    }
}
