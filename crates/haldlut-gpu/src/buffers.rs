//! GPU buffer and texture management for cube application.

use haldlut_core::{ColorCube, Image};
use wgpu::util::DeviceExt;

use crate::error::GpuError;

/// Handle to a GPU image stored as a storage buffer of packed RGBA8 `u32`s.
pub struct GpuImageHandle {
    pub buffer: wgpu::Buffer,
    pub width: u32,
    pub height: u32,
}

impl GpuImageHandle {
    /// Upload an [`Image`] to the GPU as a storage buffer.
    pub fn upload(device: &wgpu::Device, image: &Image) -> Result<Self, GpuError> {
        check_binding_size(device, byte_size(image.width(), image.height()))?;
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("haldlut_image_upload"),
            contents: image.as_bytes(),
            usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST,
        });
        Ok(Self {
            buffer,
            width: image.width(),
            height: image.height(),
        })
    }

    /// Create an uninitialized GPU image buffer for output.
    pub fn create_output(device: &wgpu::Device, width: u32, height: u32) -> Result<Self, GpuError> {
        let size = byte_size(width, height);
        check_binding_size(device, size)?;
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("haldlut_image_output"),
            size,
            usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_SRC,
            mapped_at_creation: false,
        });
        Ok(Self {
            buffer,
            width,
            height,
        })
    }

    /// Pixel count.
    pub fn pixel_count(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// Buffer size in bytes.
    pub fn byte_size(&self) -> u64 {
        byte_size(self.width, self.height)
    }
}

fn byte_size(width: u32, height: u32) -> u64 {
    width as u64 * height as u64 * 4
}

fn check_binding_size(device: &wgpu::Device, bytes: u64) -> Result<(), GpuError> {
    let limit = device.limits().max_storage_buffer_binding_size as u64;
    if bytes > limit {
        return Err(GpuError::ImageTooLarge { bytes, limit });
    }
    Ok(())
}

/// Handle to a color cube uploaded as a 3D texture.
///
/// Texel `(x, y, z)` holds the sample for `(b, g, r)`, so the cube's flat
/// buffer uploads without reordering.
pub struct GpuCubeHandle {
    pub texture: wgpu::Texture,
    pub texture_view: wgpu::TextureView,
    pub sampler: wgpu::Sampler,
    pub dimension: u32,
}

impl GpuCubeHandle {
    /// Allocate a `D×D×D` `Rgba8Unorm` texture and copy `cube` into it.
    pub fn upload(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        cube: &ColorCube,
    ) -> Result<Self, GpuError> {
        let dimension = cube.dimension();
        let limit = device.limits().max_texture_dimension_3d;
        if dimension > limit {
            return Err(GpuError::CubeTooLarge { dimension, limit });
        }

        let size = wgpu::Extent3d {
            width: dimension,
            height: dimension,
            depth_or_array_layers: dimension,
        };
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("haldlut_cube_texture_3d"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D3,
            format: wgpu::TextureFormat::Rgba8Unorm,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            cube.as_bytes(),
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(dimension * 4),
                rows_per_image: Some(dimension),
            },
            size,
        );

        let texture_view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("haldlut_cube_sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        Ok(Self {
            texture,
            texture_view,
            sampler,
            dimension,
        })
    }
}
