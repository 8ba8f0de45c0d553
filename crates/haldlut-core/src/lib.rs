//! haldlut core — Hald LUT decoding, caching, and application.
//!
//! This crate holds the cube extractor, the LRU cube cache, the software
//! trilinear backend, and the strength blender. No GPU dependencies; the
//! accelerated backend lives in `haldlut-gpu` and plugs in through
//! [`CubeBackend`].

pub mod blend;
pub mod cache;
pub mod config;
pub mod engine;
pub mod error;
pub mod hald;
pub mod image;
pub mod transform;

// Re-exports for convenience.
pub use cache::{CacheStats, CubeCache, CubeKey};
pub use config::{BackendPreference, EngineConfig};
pub use engine::LutEngine;
pub use error::{BackendError, LutError};
pub use hald::{HaldLayout, HaldLutImage, LutIdentity};
pub use image::Image;
pub use transform::CubeBackend;
pub use transform::cube::ColorCube;
pub use transform::software::SoftwareCubeEngine;
