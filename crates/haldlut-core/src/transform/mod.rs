//! Cube representation and the backends that apply it to images.

pub mod cube;
pub mod software;

use crate::error::{BackendError, LutError};
use crate::image::Image;
use cube::ColorCube;

/// A way of running a [`ColorCube`] over an image.
///
/// Implementations are interchangeable at the call site: same output size,
/// alpha untouched, color channels within one unit of the software path.
pub trait CubeBackend: Send + Sync {
    /// Short backend name for logs.
    fn name(&self) -> &'static str;

    /// Transform every pixel of `source` through `cube`.
    fn apply(&self, source: &Image, cube: &ColorCube) -> Result<Image, BackendError>;
}

impl<T: CubeBackend + ?Sized> CubeBackend for Box<T> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn apply(&self, source: &Image, cube: &ColorCube) -> Result<Image, BackendError> {
        (**self).apply(source, cube)
    }
}

/// Apply `cube` after checking that it really has `dimension` samples per
/// axis.
pub fn apply_with_dimension(
    backend: &dyn CubeBackend,
    source: &Image,
    cube: &ColorCube,
    dimension: u32,
) -> Result<Image, LutError> {
    if cube.dimension() != dimension {
        return Err(LutError::DimensionMismatch {
            expected: dimension,
            actual: cube.dimension(),
        });
    }
    Ok(backend.apply(source, cube)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use software::SoftwareCubeEngine;

    #[test]
    fn test_apply_with_dimension_rejects_mismatch() {
        let cube = ColorCube::identity(4).unwrap();
        let image = Image::filled(2, 2, [1, 2, 3, 4]);
        let err = apply_with_dimension(&SoftwareCubeEngine::default(), &image, &cube, 5)
            .unwrap_err();
        assert!(matches!(
            err,
            LutError::DimensionMismatch {
                expected: 5,
                actual: 4
            }
        ));
    }

    #[test]
    fn test_boxed_backend_delegates() {
        let backend: Box<dyn CubeBackend> = Box::new(SoftwareCubeEngine::default());
        assert_eq!(backend.name(), "software");
        let cube = ColorCube::identity(2).unwrap();
        let out = apply_with_dimension(&backend, &Image::filled(1, 1, [0, 0, 0, 7]), &cube, 2)
            .unwrap();
        assert_eq!(out.pixels(), &[[0, 0, 0, 7]]);
    }
}
