//! Error types for planar image processing.

use thiserror::Error;

/// Main error type for the planar_imgproc library.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// A parameter violates the precondition of the operation.
    #[error("invalid parameter {name}: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    /// Kernel weights do not form a `diameter x diameter` matrix.
    #[error("kernel of radius {radius} needs {expected} weights, got {actual}")]
    KernelShape {
        radius: usize,
        expected: usize,
        actual: usize,
    },

    /// Images combined pixel by pixel have different dimensions.
    #[error(
        "image size mismatch: expected {expected_width}x{expected_height}, got {width}x{height}"
    )]
    SizeMismatch {
        expected_width: usize,
        expected_height: usize,
        width: usize,
        height: usize,
    },

    /// A per-pixel function was given the wrong number of images.
    #[error("per-pixel function takes {expected} values, got {actual} images")]
    ArityMismatch { expected: usize, actual: usize },

    /// An edge-extension policy produced an index outside the plane.
    #[error("edge policy mapped coordinate {coord} to {mapped}, outside 0..{limit}")]
    EdgeOutOfRange {
        coord: isize,
        mapped: usize,
        limit: usize,
    },

    /// Image dimensions cannot be represented.
    #[error("image dimensions {width}x{height} overflow")]
    DimensionOverflow { width: usize, height: usize },
}

impl Error {
    pub(crate) fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }
}

/// Result type alias for planar_imgproc operations.
pub type Result<T> = std::result::Result<T, Error>;
