//! Hald LUT images and cube extraction.
//!
//! A Hald image bakes a 3D color cube into a 2D picture. Extraction walks
//! every cube coordinate, finds the pixel that encodes it, and copies its RGB
//! into a [`ColorCube`]. Coordinates whose pixel lies outside the image fall
//! back to the identity value, so a truncated or undersized LUT degrades to a
//! no-op gradient instead of failing.

use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::image::Image;
use crate::transform::cube::{self, ColorCube, identity_sample};

/// Number of tiles per axis in the tiled layout.
pub const TILES_PER_AXIS: u32 = 8;

/// How cube coordinates are packed into the Hald image.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HaldLayout {
    /// 8×8 grid of `D×D` tiles:
    /// `x = b + (r % 8)·D + (g % 8)·8D`, `y = g / 8 + (r / 8)·8`.
    #[default]
    Tiled8x8,
    /// Classic Hald CLUT ordering with red fastest:
    /// `index = r + g·D + b·D²`.
    Linear,
}

impl HaldLayout {
    /// Flat pixel index encoding cube coordinate `(r, g, b)`.
    #[inline]
    pub fn pixel_index(self, r: u32, g: u32, b: u32, dimension: u32, width: u32) -> usize {
        let d = dimension as usize;
        let (r, g, b) = (r as usize, g as usize, b as usize);
        match self {
            Self::Tiled8x8 => {
                let tiles = TILES_PER_AXIS as usize;
                let x = b + (r % tiles) * d + (g % tiles) * d * tiles;
                let y = g / tiles + (r / tiles) * tiles;
                y * width as usize + x
            }
            Self::Linear => r + g * d + b * d * d,
        }
    }
}

impl fmt::Display for HaldLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tiled8x8 => write!(f, "tiled 8x8"),
            Self::Linear => write!(f, "linear"),
        }
    }
}

/// Stable identity of a LUT asset, used as the cache key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LutIdentity(u64);

impl LutIdentity {
    /// Fingerprint of the image geometry and pixel contents.
    pub fn of_content(image: &Image) -> Self {
        let mut hasher = std::hash::DefaultHasher::new();
        0u8.hash(&mut hasher);
        image.dimensions().hash(&mut hasher);
        image.as_bytes().hash(&mut hasher);
        Self(hasher.finish())
    }

    /// Fingerprint of an asset name.
    pub fn of_name(name: &str) -> Self {
        let mut hasher = std::hash::DefaultHasher::new();
        1u8.hash(&mut hasher);
        name.hash(&mut hasher);
        Self(hasher.finish())
    }

    /// The raw 64-bit fingerprint.
    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for LutIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

/// An image that encodes a 3D cube, plus the identity the cache keys on.
#[derive(Debug, Clone)]
pub struct HaldLutImage {
    image: Image,
    identity: LutIdentity,
    layout: HaldLayout,
    name: Option<String>,
}

impl HaldLutImage {
    /// Wrap an image using the tiled layout and a content fingerprint.
    pub fn new(image: Image) -> Self {
        let identity = LutIdentity::of_content(&image);
        Self {
            image,
            identity,
            layout: HaldLayout::default(),
            name: None,
        }
    }

    /// Wrap an image whose identity is its asset name.
    ///
    /// Names must be unique per logical LUT; two different images registered
    /// under one name share cache entries.
    pub fn named(name: impl Into<String>, image: Image) -> Self {
        let name = name.into();
        Self {
            identity: LutIdentity::of_name(&name),
            image,
            layout: HaldLayout::default(),
            name: Some(name),
        }
    }

    /// Use a different pixel layout.
    pub fn with_layout(mut self, layout: HaldLayout) -> Self {
        self.layout = layout;
        self
    }

    /// The encoded image.
    pub fn image(&self) -> &Image {
        &self.image
    }

    /// Cache identity of this LUT.
    pub fn identity(&self) -> LutIdentity {
        self.identity
    }

    /// Pixel layout.
    pub fn layout(&self) -> HaldLayout {
        self.layout
    }

    /// Asset name, if the LUT was registered by name.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Side length of a tiled Hald image for cube side `dimension`.
    pub fn expected_side(dimension: u32) -> u32 {
        dimension * TILES_PER_AXIS
    }

    /// Guess the cube dimension from the image geometry.
    pub fn inferred_dimension(&self) -> Option<u32> {
        let (w, h) = self.image.dimensions();
        match self.layout {
            HaldLayout::Tiled8x8 => {
                (w == h && w % TILES_PER_AXIS == 0 && w >= 2 * TILES_PER_AXIS)
                    .then_some(w / TILES_PER_AXIS)
            }
            HaldLayout::Linear => {
                let total = w as u64 * h as u64;
                let d = (total as f64).cbrt().round() as u64;
                (d >= 2 && d * d * d == total).then_some(d as u32)
            }
        }
    }

    /// Whether extracting a cube of side `dimension` needs the fallback for
    /// at least one sample.
    pub fn is_undersized(&self, dimension: u32) -> bool {
        let len = self.image.len();
        let width = self.image.width();
        (0..dimension).any(|r| {
            (0..dimension).any(|g| {
                (0..dimension).any(|b| self.layout.pixel_index(r, g, b, dimension, width) >= len)
            })
        })
    }
}

/// Decode `lut` into a cube of side `dimension` using its own layout.
///
/// Never fails for a valid dimension: samples outside the image become the
/// identity value. `dimension` must satisfy [`cube::check_dimension`]; the
/// engine validates it before calling.
pub fn extract(lut: &HaldLutImage, dimension: u32) -> ColorCube {
    extract_counted(lut.image(), dimension, lut.layout()).0
}

/// Decode with an explicit layout.
pub fn extract_with_layout(image: &Image, dimension: u32, layout: HaldLayout) -> ColorCube {
    extract_counted(image, dimension, layout).0
}

/// Decode and also report how many samples fell back to identity.
pub(crate) fn extract_counted(
    image: &Image,
    dimension: u32,
    layout: HaldLayout,
) -> (ColorCube, usize) {
    debug_assert!(cube::check_dimension(dimension).is_ok());
    let pixels = image.pixels();
    let width = image.width();
    let mut fallbacks = 0usize;

    let mut samples = Vec::with_capacity(cube::sample_count(dimension));
    for r in 0..dimension {
        for g in 0..dimension {
            for b in 0..dimension {
                let index = layout.pixel_index(r, g, b, dimension, width);
                match pixels.get(index) {
                    Some(&[pr, pg, pb, _]) => samples.push([pr, pg, pb, 255]),
                    None => {
                        fallbacks += 1;
                        samples.push(identity_sample(r, g, b, dimension));
                    }
                }
            }
        }
    }

    (ColorCube::from_samples_unchecked(dimension, samples), fallbacks)
}
