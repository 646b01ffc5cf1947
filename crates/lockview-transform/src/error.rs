//! Error types for lockview-transform operations.

use thiserror::Error;

/// The error type for transform operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// The container has no usable area, so no projection exists for it.
    #[error("Degenerate container: {width}x{height} has no usable area")]
    DegenerateContainer {
        /// Container width in pixels.
        width: f64,
        /// Container height in pixels.
        height: f64,
    },

    /// The transform has a zero or non-finite scale and cannot be inverted.
    #[error("Singular transform: scale ({sx}, {sy}) is not invertible")]
    SingularTransform {
        /// Horizontal scale.
        sx: f64,
        /// Vertical scale.
        sy: f64,
    },
}

/// A specialized Result type for transform operations.
pub type Result<T> = std::result::Result<T, Error>;
