//! The single entry point: cache lookup, cube application, strength blend.

use crate::blend;
use crate::cache::CubeCache;
use crate::config::EngineConfig;
use crate::error::LutError;
use crate::hald::HaldLutImage;
use crate::image::Image;
use crate::transform::cube::{self, ColorCube};
use crate::transform::software::SoftwareCubeEngine;
use crate::transform::{CubeBackend, apply_with_dimension};

/// Applies Hald LUTs to images.
///
/// Owns the cube cache and a backend chosen at construction. Share it
/// between threads behind an `Arc`; `transform` only takes `&self`.
pub struct LutEngine {
    cache: CubeCache,
    backend: Box<dyn CubeBackend>,
    software: SoftwareCubeEngine,
}

impl Default for LutEngine {
    fn default() -> Self {
        Self::software(&EngineConfig::default())
    }
}

impl LutEngine {
    /// Engine that runs every transform on the CPU.
    pub fn software(config: &EngineConfig) -> Self {
        let software = SoftwareCubeEngine::new(config.parallel, config.parallel_threshold);
        Self {
            cache: CubeCache::new(),
            backend: Box::new(software.clone()),
            software,
        }
    }

    /// Engine using `backend`, with the CPU path as fallback when the backend
    /// reports itself unavailable.
    pub fn with_backend(backend: Box<dyn CubeBackend>, config: &EngineConfig) -> Self {
        tracing::debug!(backend = backend.name(), "LUT engine created");
        Self {
            cache: CubeCache::new(),
            backend,
            software: SoftwareCubeEngine::new(config.parallel, config.parallel_threshold),
        }
    }

    /// Name of the primary backend.
    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    /// The cube cache shared by all transforms on this engine.
    pub fn cache(&self) -> &CubeCache {
        &self.cache
    }

    /// Grade `source` with `lut` decoded at `dimension`, then blend back
    /// toward the original by `strength`.
    ///
    /// `strength` is clamped to `[0, 1]`. Undersized LUT images are not an
    /// error; missing samples take identity values.
    pub fn transform(
        &self,
        source: &Image,
        lut: &HaldLutImage,
        dimension: u32,
        strength: f32,
    ) -> Result<Image, LutError> {
        cube::check_dimension(dimension)?;
        let strength = blend::clamp_strength(strength);

        let cube = self.cache.get_or_extract(lut, dimension);
        let graded = self.apply_cube(source, &cube, dimension)?;

        if strength < 1.0 {
            blend::composite(source, &graded, strength)
        } else {
            Ok(graded)
        }
    }

    /// [`transform`](Self::transform) at full strength.
    pub fn transform_full(
        &self,
        source: &Image,
        lut: &HaldLutImage,
        dimension: u32,
    ) -> Result<Image, LutError> {
        self.transform(source, lut, dimension, 1.0)
    }

    /// Run `cube` through the primary backend, retrying on the CPU if the
    /// accelerator could not be acquired.
    pub fn apply_cube(
        &self,
        source: &Image,
        cube: &ColorCube,
        dimension: u32,
    ) -> Result<Image, LutError> {
        tracing::debug!(
            backend = self.backend.name(),
            width = source.width(),
            height = source.height(),
            dimension,
            "applying cube"
        );
        match apply_with_dimension(self.backend.as_ref(), source, cube, dimension) {
            Err(LutError::Backend(e)) if e.is_recoverable() => {
                tracing::warn!(
                    backend = self.backend.name(),
                    "{e}; falling back to software path"
                );
                apply_with_dimension(&self.software, source, cube, dimension)
            }
            other => other,
        }
    }
}
