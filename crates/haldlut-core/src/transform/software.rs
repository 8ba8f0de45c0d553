//! CPU cube application: trilinear interpolation per pixel.

use glam::DVec3;
use rayon::prelude::*;

use crate::error::BackendError;
use crate::image::Image;
use crate::transform::CubeBackend;
use crate::transform::cube::ColorCube;

/// Below this many pixels the transform runs on the calling thread.
pub const DEFAULT_PARALLEL_THRESHOLD: usize = 16 * 1024;

/// Applies a [`ColorCube`] on the CPU with rayon.
///
/// Every pixel is computed independently, so the output does not depend on
/// how rayon splits the buffer.
#[derive(Debug, Clone)]
pub struct SoftwareCubeEngine {
    parallel: bool,
    parallel_threshold: usize,
}

impl Default for SoftwareCubeEngine {
    fn default() -> Self {
        Self {
            parallel: true,
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
        }
    }
}

impl SoftwareCubeEngine {
    /// Engine that parallelizes images with at least `parallel_threshold`
    /// pixels, or never when `parallel` is false.
    pub fn new(parallel: bool, parallel_threshold: usize) -> Self {
        Self {
            parallel,
            parallel_threshold,
        }
    }

    /// Transform every pixel of `source` through `cube`.
    pub fn apply(&self, source: &Image, cube: &ColorCube) -> Image {
        let pixels = if self.parallel && source.len() >= self.parallel_threshold {
            source
                .pixels()
                .par_iter()
                .map(|&px| lookup_trilinear(cube, px))
                .collect()
        } else {
            source
                .pixels()
                .iter()
                .map(|&px| lookup_trilinear(cube, px))
                .collect()
        };
        Image::from_raw_parts(source.width(), source.height(), pixels)
    }
}

impl CubeBackend for SoftwareCubeEngine {
    fn name(&self) -> &'static str {
        "software"
    }

    fn apply(&self, source: &Image, cube: &ColorCube) -> Result<Image, BackendError> {
        Ok(SoftwareCubeEngine::apply(self, source, cube))
    }
}

/// Grade one RGBA pixel. Alpha passes through untouched.
///
/// Corners are blended along r first, then g, then b, and the result is
/// truncated to 8 bits. Changing that order changes low bits of the output.
#[inline]
pub fn lookup_trilinear(cube: &ColorCube, [r, g, b, a]: [u8; 4]) -> [u8; 4] {
    let max_index = cube.dimension() - 1;
    // Multiply before dividing so grid points land on exact integers.
    let coord = DVec3::new(r as f64, g as f64, b as f64) * max_index as f64 / 255.0;

    let base = coord.floor();
    let frac = coord - base;
    let (r0, g0, b0) = (base.x as u32, base.y as u32, base.z as u32);
    let r1 = (r0 + 1).min(max_index);
    let g1 = (g0 + 1).min(max_index);
    let b1 = (b0 + 1).min(max_index);

    let c000 = cube.sample(r0, g0, b0);
    let c001 = cube.sample(r0, g0, b1);
    let c010 = cube.sample(r0, g1, b0);
    let c011 = cube.sample(r0, g1, b1);
    let c100 = cube.sample(r1, g0, b0);
    let c101 = cube.sample(r1, g0, b1);
    let c110 = cube.sample(r1, g1, b0);
    let c111 = cube.sample(r1, g1, b1);

    let (fr, fg, fb) = (frac.x, frac.y, frac.z);
    let (fr1, fg1, fb1) = (1.0 - fr, 1.0 - fg, 1.0 - fb);

    let channel = |c: usize| -> u8 {
        let v = ((c000[c] as f64 * fr1 + c100[c] as f64 * fr) * fg1
            + (c010[c] as f64 * fr1 + c110[c] as f64 * fr) * fg)
            * fb1
            + ((c001[c] as f64 * fr1 + c101[c] as f64 * fr) * fg1
                + (c011[c] as f64 * fr1 + c111[c] as f64 * fr) * fg)
                * fb;
        // Saturating float-to-int cast truncates toward zero.
        v as u8
    };

    [channel(0), channel(1), channel(2), a]
}
