//! GPU compute pass for applying a color cube to a source image.

use std::num::NonZeroU64;

use bytemuck::{Pod, Zeroable};

use crate::buffers::{GpuCubeHandle, GpuImageHandle};

/// Threads per workgroup along each axis; matches `@workgroup_size` in the shader.
pub const WORKGROUP_SIZE: u32 = 8;

/// How the shader interpolates between cube samples.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Interpolation {
    /// Fetch the eight corners and blend in the shader, truncating like the
    /// CPU path. Stays within one unit of software output.
    #[default]
    Corners,
    /// Let the texture sampler do the trilinear filtering. Rounds, and the
    /// sampler's fixed-point weights may add another unit of error.
    Sampler,
}

impl Interpolation {
    fn shader_mode(self) -> u32 {
        match self {
            Self::Corners => 0,
            Self::Sampler => 1,
        }
    }
}

/// Uniform block for `apply_lut.wgsl`.
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct ApplyParamsGpu {
    pub width: u32,
    pub height: u32,
    pub dimension: u32,
    pub mode: u32,
}

impl ApplyParamsGpu {
    pub fn new(source: &GpuImageHandle, cube: &GpuCubeHandle, interpolation: Interpolation) -> Self {
        Self {
            width: source.width,
            height: source.height,
            dimension: cube.dimension,
            mode: interpolation.shader_mode(),
        }
    }
}

/// Manages the `apply_lut.wgsl` compute pipeline.
pub struct LutApplicator {
    pipeline: wgpu::ComputePipeline,
    bind_group_layout: wgpu::BindGroupLayout,
}

impl LutApplicator {
    /// Create the apply pipeline. Compiles `apply_lut.wgsl`.
    pub fn new(device: &wgpu::Device) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("haldlut_apply_lut_shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("../shaders/apply_lut.wgsl").into()),
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("haldlut_apply_lut_layout"),
            entries: &[
                // binding 0: source pixels
                storage_entry(0, true),
                // binding 1: output pixels
                storage_entry(1, false),
                // binding 2: cube 3D texture
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D3,
                        multisampled: false,
                    },
                    count: None,
                },
                // binding 3: cube sampler
                wgpu::BindGroupLayoutEntry {
                    binding: 3,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
                // binding 4: params uniform
                wgpu::BindGroupLayoutEntry {
                    binding: 4,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: NonZeroU64::new(
                            std::mem::size_of::<ApplyParamsGpu>() as u64
                        ),
                    },
                    count: None,
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("haldlut_apply_lut_pipeline_layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
            label: Some("haldlut_apply_lut_pipeline"),
            layout: Some(&pipeline_layout),
            module: &shader,
            entry_point: Some("apply_lut"),
            compilation_options: wgpu::PipelineCompilationOptions::default(),
            cache: None,
        });

        Self {
            pipeline,
            bind_group_layout,
        }
    }

    /// Record the apply pass onto `encoder`.
    ///
    /// `params` must already hold an [`ApplyParamsGpu`] for this dispatch.
    /// The caller submits the encoder.
    pub fn dispatch(
        &self,
        device: &wgpu::Device,
        encoder: &mut wgpu::CommandEncoder,
        source: &GpuImageHandle,
        cube: &GpuCubeHandle,
        output: &GpuImageHandle,
        params: &wgpu::Buffer,
    ) {
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("haldlut_apply_lut_bind_group"),
            layout: &self.bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: source.buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: output.buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::TextureView(&cube.texture_view),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: wgpu::BindingResource::Sampler(&cube.sampler),
                },
                wgpu::BindGroupEntry {
                    binding: 4,
                    resource: params.as_entire_binding(),
                },
            ],
        });

        let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
            label: Some("haldlut_apply_lut_pass"),
            timestamp_writes: None,
        });
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &bind_group, &[]);
        pass.dispatch_workgroups(
            source.width.div_ceil(WORKGROUP_SIZE),
            source.height.div_ceil(WORKGROUP_SIZE),
            1,
        );
    }
}

fn storage_entry(binding: u32, read_only: bool) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::COMPUTE,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Storage { read_only },
            has_dynamic_offset: false,
            min_binding_size: NonZeroU64::new(4),
        },
        count: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_params_layout_matches_shader() {
        // Four u32 fields, 16 bytes, no padding.
        assert_eq!(std::mem::size_of::<ApplyParamsGpu>(), 16);
    }

    #[test]
    fn test_interpolation_modes() {
        assert_eq!(Interpolation::default(), Interpolation::Corners);
        assert_eq!(Interpolation::Corners.shader_mode(), 0);
        assert_eq!(Interpolation::Sampler.shader_mode(), 1);
    }
}
