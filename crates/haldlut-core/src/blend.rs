//! Strength blending between the original and the graded image.
//!
//! The graded image is painted over the original with a uniform coverage of
//! `floor(strength * 255)`, the same 8-bit paint alpha a raster canvas would
//! use. Each color channel is mixed in integer arithmetic with rounding:
//!
//! ```text
//! out = (orig * (255 - a) + graded * a + 127) / 255
//! ```
//!
//! The original's alpha is kept; blending never introduces transparency.

use rayon::prelude::*;

use crate::error::LutError;
use crate::image::Image;

/// Clamp a strength factor into `[0, 1]`. NaN counts as zero.
pub fn clamp_strength(strength: f32) -> f32 {
    if strength.is_nan() {
        tracing::warn!("blend strength is NaN, treating as 0");
        return 0.0;
    }
    if !(0.0..=1.0).contains(&strength) {
        tracing::warn!("blend strength {strength} outside [0, 1], clamping");
    }
    strength.clamp(0.0, 1.0)
}

/// 8-bit paint coverage for a strength factor.
pub fn coverage(strength: f32) -> u8 {
    (clamp_strength(strength) * 255.0) as u8
}

/// Composite `transformed` over `original` with the given strength.
///
/// Both images must have the same dimensions. `strength == 1` returns the
/// transformed colors unchanged and `strength == 0` returns the original.
pub fn composite(original: &Image, transformed: &Image, strength: f32) -> Result<Image, LutError> {
    if original.dimensions() != transformed.dimensions() {
        return Err(LutError::SizeMismatch {
            expected: original.dimensions(),
            actual: transformed.dimensions(),
        });
    }

    let a = coverage(strength) as u32;
    let pixels: Vec<[u8; 4]> = original
        .pixels()
        .par_iter()
        .zip(transformed.pixels().par_iter())
        .map(|(o, t)| mix_pixel(*o, *t, a))
        .collect();

    Ok(Image::from_raw_parts(
        original.width(),
        original.height(),
        pixels,
    ))
}

#[inline]
fn mix_pixel(orig: [u8; 4], graded: [u8; 4], a: u32) -> [u8; 4] {
    let mix = |c: usize| ((orig[c] as u32 * (255 - a) + graded[c] as u32 * a + 127) / 255) as u8;
    [mix(0), mix(1), mix(2), orig[3]]
}
