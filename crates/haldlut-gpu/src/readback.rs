//! GPU-to-CPU image download.

use std::sync::mpsc;

use haldlut_core::Image;

use crate::buffers::GpuImageHandle;
use crate::error::GpuError;

/// Staging buffer sized for one image download.
pub fn create_staging(device: &wgpu::Device, handle: &GpuImageHandle) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("haldlut_image_staging"),
        size: handle.byte_size(),
        usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
        mapped_at_creation: false,
    })
}

/// Record a copy from `handle` into `staging`.
pub fn copy_to_staging(
    encoder: &mut wgpu::CommandEncoder,
    handle: &GpuImageHandle,
    staging: &wgpu::Buffer,
) {
    encoder.copy_buffer_to_buffer(&handle.buffer, 0, staging, 0, handle.byte_size());
}

/// Map `staging`, block until the GPU is done, and read it back as an
/// [`Image`] of the handle's dimensions.
pub fn read_staging(
    device: &wgpu::Device,
    handle: &GpuImageHandle,
    staging: &wgpu::Buffer,
) -> Result<Image, GpuError> {
    let slice = staging.slice(..);
    let (tx, rx) = mpsc::channel();
    slice.map_async(wgpu::MapMode::Read, move |result| {
        // The receiver only disappears if the caller already bailed out.
        let _ = tx.send(result);
    });
    device.poll(wgpu::PollType::wait_indefinitely())?;
    rx.recv().map_err(|_| GpuError::MapCallbackDropped)??;

    let pixels = {
        let data = slice.get_mapped_range();
        bytemuck::cast_slice::<u8, [u8; 4]>(&data).to_vec()
    };
    staging.unmap();

    Ok(Image::new(handle.width, handle.height, pixels)?)
}
