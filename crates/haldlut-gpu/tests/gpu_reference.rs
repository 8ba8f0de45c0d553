//! GPU integration tests. Need a real wgpu adapter; each test returns early
//! when none is present.
//!
//! Run with: `cargo test -p haldlut-gpu`

use std::sync::{Mutex, OnceLock};

use haldlut_core::{ColorCube, EngineConfig, HaldLutImage, Image, LutEngine, SoftwareCubeEngine};
use haldlut_gpu::{GpuCubeEngine, Interpolation};

/// Create a test engine, or `None` if this machine has no adapter.
fn create_test_engine() -> Option<GpuCubeEngine> {
    let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());
    let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
        power_preference: wgpu::PowerPreference::HighPerformance,
        ..Default::default()
    }))
    .ok()?;

    let (device, queue) = pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor {
        label: Some("haldlut_test_device"),
        required_features: haldlut_gpu::required_features(),
        required_limits: adapter.limits(),
        ..Default::default()
    }))
    .expect("adapter found but device creation failed");

    Some(GpuCubeEngine::new(device, queue))
}

fn gpu_test_lock() -> &'static Mutex<()> {
    static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    LOCK.get_or_init(|| Mutex::new(()))
}

fn test_gradient(width: u32, height: u32) -> Image {
    Image::from_fn(width, height, |x, y| {
        [
            (x * 255 / (width - 1)) as u8,
            (y * 255 / (height - 1)) as u8,
            ((x + y) * 3 % 256) as u8,
            (x * 17 % 256) as u8,
        ]
    })
}

fn max_channel_diff(a: &Image, b: &Image) -> i32 {
    a.pixels()
        .iter()
        .zip(b.pixels())
        .flat_map(|(p, q)| (0..3).map(move |c| (p[c] as i32 - q[c] as i32).abs()))
        .max()
        .unwrap_or(0)
}

#[test]
fn test_gpu_identity_matches_software() {
    let _lock = gpu_test_lock().lock().expect("gpu test lock poisoned");
    let Some(gpu) = create_test_engine() else {
        eprintln!("no GPU adapter; skipping");
        return;
    };

    let source = test_gradient(67, 41);
    let software = SoftwareCubeEngine::default();
    for dimension in [2, 17, 33] {
        let cube = ColorCube::identity(dimension).unwrap();
        let cpu = software.apply(&source, &cube);
        let out = gpu.apply_cube(&source, &cube).expect("gpu apply failed");
        assert_eq!(out.dimensions(), source.dimensions());
        let diff = max_channel_diff(&cpu, &out);
        assert!(diff <= 1, "D={dimension}: GPU differs from software by {diff}");
    }
}

#[test]
fn test_gpu_preserves_alpha() {
    let _lock = gpu_test_lock().lock().expect("gpu test lock poisoned");
    let source = test_gradient(16, 16);
    let cube = ColorCube::from_fn(5, |_, _, _| [10, 20, 30, 255]).unwrap();

    for interpolation in [Interpolation::Corners, Interpolation::Sampler] {
        let Some(gpu) = create_test_engine() else {
            eprintln!("no GPU adapter; skipping");
            return;
        };
        let gpu = gpu.with_interpolation(interpolation);
        let out = gpu.apply_cube(&source, &cube).expect("gpu apply failed");
        for (src, dst) in source.pixels().iter().zip(out.pixels()) {
            assert_eq!(src[3], dst[3], "alpha changed under {interpolation:?}");
            for (c, want) in [10, 20, 30].into_iter().enumerate() {
                assert!((dst[c] as i32 - want).abs() <= 1, "{dst:?} under {interpolation:?}");
            }
        }
    }
}

#[test]
fn test_gpu_is_deterministic() {
    let _lock = gpu_test_lock().lock().expect("gpu test lock poisoned");
    let Some(gpu) = create_test_engine() else {
        eprintln!("no GPU adapter; skipping");
        return;
    };

    let source = test_gradient(33, 29);
    let cube = ColorCube::from_fn(9, |r, g, b| {
        [(b * 31) as u8, (r * 31) as u8, (g * 31) as u8, 255]
    })
    .unwrap();
    let first = gpu.apply_cube(&source, &cube).expect("gpu apply failed");
    let second = gpu.apply_cube(&source, &cube).expect("gpu apply failed");
    assert_eq!(first.as_bytes(), second.as_bytes());
}

#[test]
fn test_gpu_engine_red_lut_scenario() {
    let _lock = gpu_test_lock().lock().expect("gpu test lock poisoned");
    let Some(gpu) = create_test_engine() else {
        eprintln!("no GPU adapter; skipping");
        return;
    };

    let engine = LutEngine::with_backend(Box::new(gpu), &EngineConfig::default());
    assert_eq!(engine.backend_name(), "gpu");
    let lut = HaldLutImage::new(Image::filled(16, 16, [255, 0, 0, 255]));
    let white = Image::filled(1, 1, [255, 255, 255, 255]);

    let full = engine.transform(&white, &lut, 2, 1.0).expect("transform failed");
    assert_eq!(full.pixels(), &[[255, 0, 0, 255]]);
    let half = engine.transform(&white, &lut, 2, 0.5).expect("transform failed");
    assert_eq!(half.pixels(), &[[255, 128, 128, 255]]);
}

#[test]
fn test_gpu_empty_image() {
    let _lock = gpu_test_lock().lock().expect("gpu test lock poisoned");
    let Some(gpu) = create_test_engine() else {
        eprintln!("no GPU adapter; skipping");
        return;
    };

    let empty = Image::filled(0, 0, [0; 4]);
    let out = gpu
        .apply_cube(&empty, &ColorCube::identity(4).unwrap())
        .expect("empty image should not touch the device");
    assert!(out.is_empty());
}
