//! Backend probing and selection.

use haldlut_core::{BackendPreference, CubeBackend, EngineConfig, LutEngine, SoftwareCubeEngine};

use crate::error::GpuError;
use crate::pipeline::GpuCubeEngine;

/// What a probe found for one backend.
#[derive(Debug, Clone)]
pub struct BackendInfo {
    pub name: &'static str,
    pub available: bool,
    pub description: String,
}

/// Look for a GPU adapter without creating a device.
pub fn probe_adapter() -> Result<wgpu::AdapterInfo, GpuError> {
    let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());
    let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
        power_preference: wgpu::PowerPreference::HighPerformance,
        ..Default::default()
    }))?;
    Ok(adapter.get_info())
}

/// Probe every backend. The software backend is always available.
pub fn detect_backends() -> Vec<BackendInfo> {
    let gpu = match probe_adapter() {
        Ok(info) => BackendInfo {
            name: "gpu",
            available: true,
            description: format!("{} ({:?})", info.name, info.backend),
        },
        Err(e) => BackendInfo {
            name: "gpu",
            available: false,
            description: e.to_string(),
        },
    };
    let software = BackendInfo {
        name: "software",
        available: true,
        description: format!("CPU trilinear, {} worker threads", cpu_threads()),
    };
    vec![gpu, software]
}

fn cpu_threads() -> usize {
    std::thread::available_parallelism().map_or(1, |n| n.get())
}

/// Human-readable backend listing, one line per backend.
pub fn describe_backends() -> String {
    detect_backends()
        .iter()
        .map(|b| {
            let mark = if b.available { "+" } else { "-" };
            format!("[{mark}] {}: {}", b.name, b.description)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Build the backend `config` asks for, settling on software when no GPU
/// can be acquired.
pub fn select_backend(config: &EngineConfig) -> Box<dyn CubeBackend> {
    let software = || -> Box<dyn CubeBackend> {
        Box::new(SoftwareCubeEngine::new(
            config.parallel,
            config.parallel_threshold,
        ))
    };

    match config.backend {
        BackendPreference::Software => software(),
        preference => match GpuCubeEngine::create_blocking() {
            Ok(engine) => Box::new(engine),
            Err(e) => {
                if preference == BackendPreference::Gpu {
                    tracing::warn!("GPU backend requested but unavailable: {e}; using software");
                } else {
                    tracing::debug!("no GPU backend ({e}); using software");
                }
                software()
            }
        },
    }
}

/// An engine wired to whichever backend `config` selects.
pub fn engine_from_config(config: &EngineConfig) -> LutEngine {
    LutEngine::with_backend(select_backend(config), config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_software_preference_never_touches_gpu() {
        let config = EngineConfig {
            backend: BackendPreference::Software,
            ..Default::default()
        };
        assert_eq!(select_backend(&config).name(), "software");
        assert_eq!(engine_from_config(&config).backend_name(), "software");
    }

    #[test]
    fn test_detect_lists_both_backends() {
        let backends = detect_backends();
        assert_eq!(backends.len(), 2);
        assert!(backends.iter().any(|b| b.name == "software" && b.available));
        assert!(backends.iter().any(|b| b.name == "gpu"));
    }

    #[test]
    fn test_describe_marks_software_available() {
        let text = describe_backends();
        assert!(text.lines().any(|l| l.starts_with("[+] software")));
    }
}
