//! Error types for lockview operations.

use crate::domain::ElementId;
use std::io;
use thiserror::Error;

/// The error type for lockview operations.
#[derive(Debug, Error)]
pub enum Error {
    /// The request never produced a response.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The collaborator answered with a non-success status.
    #[error("{code} {text}")]
    Status {
        /// Numeric status code.
        code: u16,
        /// Status text, shown to the user verbatim.
        text: String,
    },

    /// The response body could not be decoded.
    #[error("Malformed response body: {0}")]
    MalformedBody(String),

    /// IO error occurred.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// No element with this id is mounted.
    #[error("Unknown element: {0}")]
    UnknownElement(ElementId),

    /// The element exists but is not an edge.
    #[error("Element is not an edge: {0}")]
    NotAnEdge(ElementId),

    /// The graph has not been loaded yet.
    #[error("Graph not loaded")]
    NotLoaded,

    /// A replay script step could not be parsed.
    #[error("Script error at line {line}: {reason}")]
    Script {
        /// 1-based line number of the failing step.
        line: usize,
        /// What went wrong.
        reason: String,
    },

    /// A transform engine operation failed.
    #[error("Transform error: {0}")]
    Transform(#[from] lockview_transform::Error),
}

impl Error {
    /// The text shown in the loading indicator for this error.
    ///
    /// Status errors show only their status text; everything else shows its
    /// full description.
    #[must_use]
    pub fn indicator_text(&self) -> String {
        match self {
            Self::Status { text, .. } => text.clone(),
            other => other.to_string(),
        }
    }
}

/// A specialized Result type for lockview operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_indicator_text_is_status_text() {
        let err = Error::Status {
            code: 404,
            text: "Not Found".to_string(),
        };
        assert_eq!(err.indicator_text(), "Not Found");
        assert_eq!(err.to_string(), "404 Not Found");
    }

    #[test]
    fn test_other_indicator_text_is_description() {
        let err = Error::Transport("connection refused".to_string());
        assert_eq!(err.indicator_text(), "Transport error: connection refused");
    }
}
