//! Grade an image with a Hald LUT.

use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};
use haldlut_core::{HaldLutImage, Image, LutEngine};
use tracing::info;

use crate::ApplyArgs;
use crate::config::resolve_engine_config;

pub fn run(args: ApplyArgs, config_file: Option<&Path>) -> Result<()> {
    let config = resolve_engine_config(config_file, args.backend, args.no_parallel)?;
    let source = Image::open(&args.input)
        .with_context(|| format!("failed to read {}", args.input.display()))?;
    let lut = super::resolve_lut(&args.lut, args.library.as_deref())?.with_layout(args.layout.into());
    let dimension = pick_dimension(&lut, args.dimension)?;

    let engine = haldlut_gpu::engine_from_config(&config);
    let graded = grade(&engine, &source, &lut, dimension, args.strength)?;

    graded
        .save(&args.output)
        .with_context(|| format!("failed to write {}", args.output.display()))?;
    info!(output = %args.output.display(), "done");
    Ok(())
}

/// Explicit dimension, else whatever the LUT image's geometry implies.
fn pick_dimension(lut: &HaldLutImage, requested: Option<u32>) -> Result<u32> {
    if let Some(dimension) = requested {
        return Ok(dimension);
    }
    let (width, height) = lut.image().dimensions();
    lut.inferred_dimension().with_context(|| {
        format!("cannot infer a cube dimension from a {width}x{height} {} LUT; pass --dimension", lut.layout())
    })
}

fn grade(
    engine: &LutEngine,
    source: &Image,
    lut: &HaldLutImage,
    dimension: u32,
    strength: f32,
) -> Result<Image> {
    let start = Instant::now();
    let graded = engine
        .transform(source, lut, dimension, strength)
        .context("LUT transform failed")?;
    info!(
        backend = engine.backend_name(),
        width = source.width(),
        height = source.height(),
        dimension,
        strength,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "graded image"
    );
    Ok(graded)
}

#[cfg(test)]
mod tests {
    use haldlut_core::{BackendPreference, EngineConfig};

    use super::*;
    use crate::LayoutArg;

    fn software_engine() -> LutEngine {
        LutEngine::software(&EngineConfig {
            backend: BackendPreference::Software,
            ..Default::default()
        })
    }

    #[test]
    fn test_pick_dimension_prefers_explicit() {
        let lut = HaldLutImage::new(Image::filled(512, 512, [0; 4]));
        assert_eq!(pick_dimension(&lut, Some(17)).unwrap(), 17);
        assert_eq!(pick_dimension(&lut, None).unwrap(), 64);
    }

    #[test]
    fn test_pick_dimension_fails_on_odd_geometry() {
        let lut = HaldLutImage::new(Image::filled(30, 7, [0; 4]));
        let err = pick_dimension(&lut, None).unwrap_err();
        assert!(err.to_string().contains("--dimension"));
    }

    #[test]
    fn test_grade_red_lut() {
        let lut = HaldLutImage::new(Image::filled(16, 16, [255, 0, 0, 255]));
        let white = Image::filled(3, 2, [255, 255, 255, 255]);
        let out = grade(&software_engine(), &white, &lut, 2, 0.5).unwrap();
        assert!(out.pixels().iter().all(|p| *p == [255, 128, 128, 255]));
    }

    #[test]
    fn test_run_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.png");
        let lut_path = dir.path().join("red.png");
        let output = dir.path().join("out.png");
        Image::filled(4, 4, [255, 255, 255, 255]).save(&input).unwrap();
        Image::filled(16, 16, [255, 0, 0, 255]).save(&lut_path).unwrap();

        let args = ApplyArgs {
            input,
            lut: lut_path.to_string_lossy().into_owned(),
            output: output.clone(),
            library: None,
            dimension: None,
            strength: 1.0,
            backend: Some(BackendPreference::Software),
            no_parallel: true,
            layout: LayoutArg::Tiled,
        };
        run(args, None).unwrap();

        let graded = Image::open(&output).unwrap();
        assert!(graded.pixels().iter().all(|p| *p == [255, 0, 0, 255]));
    }
}
