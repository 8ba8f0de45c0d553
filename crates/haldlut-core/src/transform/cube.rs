//! Dense 3D color cube decoded from a Hald LUT.

use crate::error::LutError;

/// Smallest cube side that still has interpolation neighbors.
pub const MIN_DIMENSION: u32 = 2;
/// Largest cube side an 8-bit channel can address.
pub const MAX_DIMENSION: u32 = 256;

/// A 3D lookup table with 8-bit RGBA samples.
///
/// Samples are stored flat with `r` varying slowest and `b` fastest:
/// `index = ((r * D) + g) * D + b`. The GPU backend uploads this buffer
/// unchanged as a 3D texture, so the layout and the R, G, B, A byte order
/// must not change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorCube {
    dimension: u32,
    samples: Vec<[u8; 4]>,
}

impl ColorCube {
    /// Wrap an existing sample buffer. The length must be exactly `D³`.
    pub fn from_samples(dimension: u32, samples: Vec<[u8; 4]>) -> Result<Self, LutError> {
        check_dimension(dimension)?;
        let expected = sample_count(dimension);
        if samples.len() != expected {
            return Err(LutError::CubeLength {
                dimension,
                expected,
                actual: samples.len(),
            });
        }
        Ok(Self { dimension, samples })
    }

    /// Caller guarantees `samples.len() == D³` and a valid dimension.
    pub(crate) fn from_samples_unchecked(dimension: u32, samples: Vec<[u8; 4]>) -> Self {
        debug_assert_eq!(samples.len(), sample_count(dimension));
        Self { dimension, samples }
    }

    /// Build a cube by evaluating `f(r, g, b)` in storage order.
    pub fn from_fn(
        dimension: u32,
        mut f: impl FnMut(u32, u32, u32) -> [u8; 4],
    ) -> Result<Self, LutError> {
        check_dimension(dimension)?;
        let mut samples = Vec::with_capacity(sample_count(dimension));
        for r in 0..dimension {
            for g in 0..dimension {
                for b in 0..dimension {
                    samples.push(f(r, g, b));
                }
            }
        }
        Ok(Self { dimension, samples })
    }

    /// The no-op cube: every coordinate maps to itself scaled to 0..=255.
    pub fn identity(dimension: u32) -> Result<Self, LutError> {
        Self::from_fn(dimension, |r, g, b| identity_sample(r, g, b, dimension))
    }

    /// Samples per axis.
    pub fn dimension(&self) -> u32 {
        self.dimension
    }

    /// All samples in storage order.
    pub fn samples(&self) -> &[[u8; 4]] {
        &self.samples
    }

    /// Raw bytes, `4 * D³` long.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.samples)
    }

    /// Linear sample index of `(r, g, b)`.
    #[inline]
    pub fn index(&self, r: u32, g: u32, b: u32) -> usize {
        let d = self.dimension as usize;
        ((r as usize * d) + g as usize) * d + b as usize
    }

    /// Sample at `(r, g, b)`. Panics if a coordinate is `>= D`.
    #[inline]
    pub fn sample(&self, r: u32, g: u32, b: u32) -> [u8; 4] {
        self.samples[self.index(r, g, b)]
    }
}

/// Identity value at `(r, g, b)` for a cube of side `dimension`, using
/// integer arithmetic.
#[inline]
pub fn identity_sample(r: u32, g: u32, b: u32, dimension: u32) -> [u8; 4] {
    let max = dimension - 1;
    [
        (r * 255 / max) as u8,
        (g * 255 / max) as u8,
        (b * 255 / max) as u8,
        255,
    ]
}

/// `D³`.
pub fn sample_count(dimension: u32) -> usize {
    let d = dimension as usize;
    d * d * d
}

/// Reject dimensions without interpolation neighbors or beyond 8-bit range.
pub fn check_dimension(dimension: u32) -> Result<(), LutError> {
    if (MIN_DIMENSION..=MAX_DIMENSION).contains(&dimension) {
        Ok(())
    } else {
        Err(LutError::InvalidDimension(dimension))
    }
}
