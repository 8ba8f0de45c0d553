//! Error types for the LUT engine.

/// Errors surfaced by the LUT engine.
///
/// Degradations the engine can absorb (undersized Hald images, out-of-range
/// strength) never show up here; they are logged and replaced by a defined
/// fallback.
#[derive(Debug, thiserror::Error)]
pub enum LutError {
    #[error("cube dimension {0} is outside the supported range 2..=256")]
    InvalidDimension(u32),
    #[error("cube dimension mismatch: cube has {actual} samples per axis, caller passed {expected}")]
    DimensionMismatch { expected: u32, actual: u32 },
    #[error("image size mismatch: expected {expected:?}, got {actual:?}")]
    SizeMismatch {
        expected: (u32, u32),
        actual: (u32, u32),
    },
    #[error("pixel buffer holds {actual} pixels, {width}x{height} needs {expected}")]
    PixelCount {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },
    #[error("cube buffer holds {actual} samples, dimension {dimension} needs {expected}")]
    CubeLength {
        dimension: u32,
        expected: usize,
        actual: usize,
    },
    #[error("failed to decode image: {0}")]
    Decode(#[from] image::ImageError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid engine config: {0}")]
    Config(#[from] serde_json::Error),
    #[error(transparent)]
    Backend(#[from] BackendError),
}

/// Failures reported by a [`CubeBackend`](crate::transform::CubeBackend).
#[derive(Debug, Clone, thiserror::Error)]
pub enum BackendError {
    /// The accelerator could not be acquired. Callers may retry on the
    /// software path.
    #[error("backend unavailable: {0}")]
    Unavailable(String),
    /// The backend was acquired but the transform itself failed.
    #[error("backend failed: {0}")]
    Failed(String),
}

impl BackendError {
    /// Whether the software path can stand in for this failure.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }
}
