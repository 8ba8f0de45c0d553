//! haldlut GPU — wgpu compute backend for applying color cubes.
//!
//! Implements [`haldlut_core::CubeBackend`] so a [`GpuCubeEngine`] can be
//! dropped into a [`haldlut_core::LutEngine`]. Use [`select_backend`] to probe
//! for an adapter and fall back to the software path when none exists.

pub mod buffers;
pub mod error;
pub mod lut_applicator;
pub mod pipeline;
pub mod readback;
pub mod select;
pub mod session;

pub use error::GpuError;
pub use lut_applicator::Interpolation;
pub use pipeline::GpuCubeEngine;
pub use select::{BackendInfo, describe_backends, detect_backends, engine_from_config, select_backend};
pub use session::GpuLutSession;

/// Device features the cube shader needs. Core WebGPU is enough.
pub fn required_features() -> wgpu::Features {
    wgpu::Features::empty()
}
