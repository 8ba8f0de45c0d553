//! Per-transform GPU resources.

use haldlut_core::{ColorCube, Image};
use wgpu::util::DeviceExt;

use crate::buffers::{GpuCubeHandle, GpuImageHandle};
use crate::error::GpuError;
use crate::lut_applicator::{ApplyParamsGpu, Interpolation};
use crate::readback;

/// Everything one cube application allocates on the device.
///
/// Dropping the session destroys every buffer and the cube texture, so an
/// early return anywhere in the dispatch releases GPU memory immediately.
pub struct GpuLutSession {
    pub source: GpuImageHandle,
    pub output: GpuImageHandle,
    pub cube: GpuCubeHandle,
    pub params: wgpu::Buffer,
    pub staging: wgpu::Buffer,
}

impl GpuLutSession {
    /// Upload `source` and `cube` and allocate the output and staging buffers.
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        source: &Image,
        cube: &ColorCube,
        interpolation: Interpolation,
    ) -> Result<Self, GpuError> {
        let source = GpuImageHandle::upload(device, source)?;
        let output = GpuImageHandle::create_output(device, source.width, source.height)?;
        let cube = GpuCubeHandle::upload(device, queue, cube)?;

        let params = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("haldlut_apply_params_uniform"),
            contents: bytemuck::bytes_of(&ApplyParamsGpu::new(&source, &cube, interpolation)),
            usage: wgpu::BufferUsages::UNIFORM,
        });
        let staging = readback::create_staging(device, &output);

        Ok(Self {
            source,
            output,
            cube,
            params,
            staging,
        })
    }

    /// Block until the output is on the host and return it.
    pub fn download(&self, device: &wgpu::Device) -> Result<Image, GpuError> {
        readback::read_staging(device, &self.output, &self.staging)
    }
}

impl Drop for GpuLutSession {
    fn drop(&mut self) {
        self.source.buffer.destroy();
        self.output.buffer.destroy();
        self.params.destroy();
        self.staging.destroy();
        self.cube.texture.destroy();
    }
}
