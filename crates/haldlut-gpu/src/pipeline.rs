//! GPU cube backend: owns the device and dispatches one session per apply.

use haldlut_core::{BackendError, ColorCube, CubeBackend, Image};

use crate::error::GpuError;
use crate::lut_applicator::{Interpolation, LutApplicator, WORKGROUP_SIZE};
use crate::readback;
use crate::session::GpuLutSession;

/// Applies color cubes with a wgpu compute shader.
pub struct GpuCubeEngine {
    device: wgpu::Device,
    queue: wgpu::Queue,
    applicator: LutApplicator,
    interpolation: Interpolation,
    adapter_name: String,
}

impl GpuCubeEngine {
    /// Wrap an existing device and queue.
    pub fn new(device: wgpu::Device, queue: wgpu::Queue) -> Self {
        let applicator = LutApplicator::new(&device);
        Self {
            device,
            queue,
            applicator,
            interpolation: Interpolation::default(),
            adapter_name: String::from("external"),
        }
    }

    /// Request an adapter and device, blocking the calling thread.
    pub fn create_blocking() -> Result<Self, GpuError> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());
        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            ..Default::default()
        }))?;
        let info = adapter.get_info();

        let (device, queue) = pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor {
            label: Some("haldlut_device"),
            required_features: crate::required_features(),
            required_limits: adapter.limits(),
            ..Default::default()
        }))?;

        tracing::info!(adapter = %info.name, backend = ?info.backend, "GPU cube engine initialized");
        let mut engine = Self::new(device, queue);
        engine.adapter_name = info.name;
        Ok(engine)
    }

    /// Choose how the shader interpolates between cube samples.
    pub fn with_interpolation(mut self, interpolation: Interpolation) -> Self {
        self.interpolation = interpolation;
        self
    }

    pub fn interpolation(&self) -> Interpolation {
        self.interpolation
    }

    /// Name of the adapter backing this engine.
    pub fn adapter_name(&self) -> &str {
        &self.adapter_name
    }

    /// Apply `cube` to `source` on the GPU.
    pub fn apply_cube(&self, source: &Image, cube: &ColorCube) -> Result<Image, GpuError> {
        if source.is_empty() {
            return Ok(source.clone());
        }
        let limit = self.device.limits().max_compute_workgroups_per_dimension;
        if source.width().div_ceil(WORKGROUP_SIZE) > limit
            || source.height().div_ceil(WORKGROUP_SIZE) > limit
        {
            return Err(GpuError::DispatchTooLarge {
                width: source.width(),
                height: source.height(),
                limit,
            });
        }

        self.device.push_error_scope(wgpu::ErrorFilter::Validation);
        let result = self.dispatch(source, cube);
        if let Some(err) = pollster::block_on(self.device.pop_error_scope()) {
            return Err(GpuError::Validation(err.to_string()));
        }
        result
    }

    fn dispatch(&self, source: &Image, cube: &ColorCube) -> Result<Image, GpuError> {
        let session =
            GpuLutSession::new(&self.device, &self.queue, source, cube, self.interpolation)?;

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("haldlut_apply_encoder"),
            });
        self.applicator.dispatch(
            &self.device,
            &mut encoder,
            &session.source,
            &session.cube,
            &session.output,
            &session.params,
        );
        readback::copy_to_staging(&mut encoder, &session.output, &session.staging);
        self.queue.submit(std::iter::once(encoder.finish()));

        session.download(&self.device)
    }
}

impl CubeBackend for GpuCubeEngine {
    fn name(&self) -> &'static str {
        "gpu"
    }

    fn apply(&self, source: &Image, cube: &ColorCube) -> Result<Image, BackendError> {
        self.apply_cube(source, cube).map_err(BackendError::from)
    }
}
