//! Error taxonomy shared by the kernel, the calibration math, and host glue.

/// Errors produced by volume construction, the polynomial transform, and
/// calibration fitting.
#[derive(Debug, thiserror::Error)]
pub enum VoxcalError {
    /// Rejected input: wrong component count, empty coefficients, missing
    /// image data, mismatched buffers, or degenerate fitting data.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The output buffer could not be allocated.
    #[error("out of memory: failed to allocate {bytes} bytes")]
    OutOfMemory { bytes: usize },
}

impl VoxcalError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, VoxcalError>;
