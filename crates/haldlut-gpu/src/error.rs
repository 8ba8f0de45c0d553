//! GPU backend error types.

use haldlut_core::{BackendError, LutError};

/// Errors from acquiring or driving the GPU.
#[derive(Debug, thiserror::Error)]
pub enum GpuError {
    #[error("no GPU adapter: {0}")]
    NoAdapter(#[from] wgpu::RequestAdapterError),

    #[error("failed to create GPU device: {0}")]
    RequestDevice(#[from] wgpu::RequestDeviceError),

    #[error("image of {bytes} bytes exceeds the device storage binding limit of {limit}")]
    ImageTooLarge { bytes: u64, limit: u64 },

    #[error("cube dimension {dimension} exceeds the device 3D texture limit of {limit}")]
    CubeTooLarge { dimension: u32, limit: u32 },

    #[error("{width}x{height} image needs more workgroups than the device allows ({limit} per axis)")]
    DispatchTooLarge { width: u32, height: u32, limit: u32 },

    #[error("failed to map readback buffer: {0}")]
    BufferMap(#[from] wgpu::BufferAsyncError),

    #[error("readback callback was dropped before completing")]
    MapCallbackDropped,

    #[error("device poll failed: {0}")]
    Poll(#[from] wgpu::PollError),

    #[error("GPU validation error: {0}")]
    Validation(String),

    #[error("readback produced an invalid image: {0}")]
    Readback(#[from] LutError),
}

impl From<GpuError> for BackendError {
    /// Acquisition and limit failures are recoverable: the engine retries
    /// on the CPU. Anything that went wrong mid-dispatch is not.
    fn from(err: GpuError) -> Self {
        match err {
            GpuError::NoAdapter(_)
            | GpuError::RequestDevice(_)
            | GpuError::ImageTooLarge { .. }
            | GpuError::CubeTooLarge { .. }
            | GpuError::DispatchTooLarge { .. } => BackendError::Unavailable(err.to_string()),
            GpuError::BufferMap(_)
            | GpuError::MapCallbackDropped
            | GpuError::Poll(_)
            | GpuError::Validation(_)
            | GpuError::Readback(_) => BackendError::Failed(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limit_errors_are_recoverable() {
        let err: BackendError = GpuError::ImageTooLarge {
            bytes: 1 << 30,
            limit: 1 << 27,
        }
        .into();
        assert!(err.is_recoverable());

        let err: BackendError = GpuError::CubeTooLarge {
            dimension: 256,
            limit: 128,
        }
        .into();
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_dispatch_errors_are_fatal() {
        let err: BackendError = GpuError::MapCallbackDropped.into();
        assert!(!err.is_recoverable());
        let err: BackendError = GpuError::Validation("bad binding".into()).into();
        assert!(matches!(err, BackendError::Failed(msg) if msg.contains("bad binding")));
    }
}
