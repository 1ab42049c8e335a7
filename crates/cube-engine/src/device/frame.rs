/// A single acquired frame.
///
/// Short-lived: holding the surface texture prevents acquisition of the next
/// frame, so hand it back to `Gpu::submit` within the same activation.
pub struct GpuFrame {
    pub surface_texture: wgpu::SurfaceTexture,
    pub view: wgpu::TextureView,
    pub encoder: wgpu::CommandEncoder,
}
