//! End-to-end properties of `LutEngine::transform`.

use std::sync::Arc;
use std::thread;

use haldlut_core::hald::HaldLayout;
use haldlut_core::transform::cube::identity_sample;
use haldlut_core::{EngineConfig, HaldLutImage, Image, LutEngine, LutError};

/// Tiled Hald image that decodes to the identity cube. The tiled layout is
/// collision-free up to D = 8.
fn tiled_identity_hald(dimension: u32) -> Image {
    let side = HaldLutImage::expected_side(dimension);
    let mut pixels = vec![[0, 0, 0, 255]; (side * side) as usize];
    for r in 0..dimension {
        for g in 0..dimension {
            for b in 0..dimension {
                let i = HaldLayout::Tiled8x8.pixel_index(r, g, b, dimension, side);
                pixels[i] = identity_sample(r, g, b, dimension);
            }
        }
    }
    Image::new(side, side, pixels).unwrap()
}

/// Tiled Hald image that swaps the red and blue channels.
fn tiled_swap_hald(dimension: u32) -> Image {
    let side = HaldLutImage::expected_side(dimension);
    let mut pixels = vec![[0, 0, 0, 255]; (side * side) as usize];
    for r in 0..dimension {
        for g in 0..dimension {
            for b in 0..dimension {
                let i = HaldLayout::Tiled8x8.pixel_index(r, g, b, dimension, side);
                let [ir, ig, ib, _] = identity_sample(r, g, b, dimension);
                pixels[i] = [ib, ig, ir, 255];
            }
        }
    }
    Image::new(side, side, pixels).unwrap()
}

fn test_image() -> Image {
    Image::from_fn(37, 23, |x, y| {
        [
            (x * 7) as u8,
            (y * 11) as u8,
            ((x * y) % 256) as u8,
            (255 - x) as u8,
        ]
    })
}

#[test]
fn identity_hald_is_near_noop() {
    let engine = LutEngine::default();
    let lut = HaldLutImage::new(tiled_identity_hald(8));
    let source = test_image();
    let out = engine.transform(&source, &lut, 8, 1.0).unwrap();

    assert_eq!(out.dimensions(), source.dimensions());
    for (src, dst) in source.pixels().iter().zip(out.pixels()) {
        for c in 0..3 {
            assert!((src[c] as i32 - dst[c] as i32).abs() <= 1, "{src:?} -> {dst:?}");
        }
        assert_eq!(src[3], dst[3], "alpha must pass through");
    }
}

#[test]
fn channel_swap_hald_swaps_channels() {
    let engine = LutEngine::default();
    let lut = HaldLutImage::new(tiled_swap_hald(8));
    let source = Image::filled(2, 2, [255, 0, 0, 255]);
    let out = engine.transform(&source, &lut, 8, 1.0).unwrap();
    assert!(out.pixels().iter().all(|p| *p == [0, 0, 255, 255]));
}

#[test]
fn undersized_hald_never_reads_out_of_bounds() {
    let engine = LutEngine::default();
    let source = test_image();
    for (w, h) in [(0, 0), (1, 1), (3, 2), (16, 16), (63, 64)] {
        let lut = HaldLutImage::new(Image::filled(w, h, [9, 9, 9, 255]));
        let out = engine.transform(&source, &lut, 16, 1.0).unwrap();
        assert_eq!(out.dimensions(), source.dimensions());
    }
}

#[test]
fn empty_hald_behaves_as_identity() {
    let engine = LutEngine::default();
    let lut = HaldLutImage::new(Image::filled(0, 0, [0; 4]));
    let source = test_image();
    let out = engine.transform(&source, &lut, 33, 1.0).unwrap();
    for (src, dst) in source.pixels().iter().zip(out.pixels()) {
        for c in 0..3 {
            assert!((src[c] as i32 - dst[c] as i32).abs() <= 1);
        }
    }
}

#[test]
fn transform_is_deterministic() {
    let engine = LutEngine::default();
    let lut = HaldLutImage::new(tiled_swap_hald(4));
    let source = test_image();
    let first = engine.transform(&source, &lut, 4, 0.6).unwrap();
    let second = engine.transform(&source, &lut, 4, 0.6).unwrap();
    assert_eq!(first.as_bytes(), second.as_bytes());

    let fresh = LutEngine::default();
    let third = fresh.transform(&source, &lut, 4, 0.6).unwrap();
    assert_eq!(first, third);
}

#[test]
fn strength_endpoints_through_engine() {
    let engine = LutEngine::default();
    let lut = HaldLutImage::new(tiled_swap_hald(4));
    let source = test_image();
    let full = engine.transform(&source, &lut, 4, 1.0).unwrap();
    let none = engine.transform(&source, &lut, 4, 0.0).unwrap();
    assert_eq!(none, source);
    assert_eq!(engine.transform(&source, &lut, 4, 7.0).unwrap(), full);
    assert_eq!(engine.cache().stats().extractions, 1);
}

#[test]
fn dimension_out_of_range_is_an_error() {
    let engine = LutEngine::default();
    let lut = HaldLutImage::new(tiled_identity_hald(2));
    assert!(matches!(
        engine.transform(&test_image(), &lut, 0, 1.0),
        Err(LutError::InvalidDimension(0))
    ));
    assert!(matches!(
        engine.transform(&test_image(), &lut, 300, 1.0),
        Err(LutError::InvalidDimension(300))
    ));
}

#[test]
fn concurrent_transforms_share_one_extraction() {
    let engine = Arc::new(LutEngine::software(&EngineConfig::default()));
    let lut = Arc::new(HaldLutImage::new(tiled_swap_hald(8)));
    let source = Arc::new(test_image());

    let results: Vec<Image> = (0..6)
        .map(|_| {
            let engine = Arc::clone(&engine);
            let lut = Arc::clone(&lut);
            let source = Arc::clone(&source);
            thread::spawn(move || engine.transform(&source, &lut, 8, 1.0).unwrap())
        })
        .collect::<Vec<_>>()
        .into_iter()
        .map(|h| h.join().expect("worker panicked"))
        .collect();

    assert!(results.windows(2).all(|w| w[0] == w[1]));
    assert_eq!(engine.cache().stats().extractions, 1);
}

#[test]
fn hald_png_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("swap.png");
    tiled_swap_hald(4).save(&path).unwrap();

    let lut = HaldLutImage::named("swap.png", Image::open(&path).unwrap());
    assert_eq!(lut.inferred_dimension(), Some(4));

    let engine = LutEngine::default();
    let out = engine
        .transform(&Image::filled(1, 1, [255, 0, 0, 128]), &lut, 4, 1.0)
        .unwrap();
    assert_eq!(out.pixels(), &[[0, 0, 255, 128]]);
}
