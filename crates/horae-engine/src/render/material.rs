use bytemuck::{Pod, Zeroable};

use crate::paint::Color;

use super::texture::GpuTexture;

/// Surface parameters of a lit material.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct MaterialParams {
    /// Base color, linear premultiplied. Ignored while `use_texture` is set.
    pub color: Color,
    pub use_texture: bool,
    pub metalness: f32,
    pub roughness: f32,
    /// Multiplies the final fragment, 0..=1.
    pub opacity: f32,
    /// Texture coordinate scale. Repeat addressing is assumed.
    pub uv_scale: [f32; 2],
}

impl Default for MaterialParams {
    fn default() -> Self {
        Self {
            color: Color::WHITE,
            use_texture: false,
            metalness: 0.0,
            roughness: 1.0,
            opacity: 1.0,
            uv_scale: [1.0, 1.0],
        }
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub(super) struct MaterialUniform {
    pub color: [f32; 4],
    /// x: use_texture, y: metalness, z: roughness, w: opacity
    pub params: [f32; 4],
    /// xy: uv scale, zw: uv offset
    pub uv: [f32; 4],
}

impl From<&MaterialParams> for MaterialUniform {
    fn from(p: &MaterialParams) -> Self {
        Self {
            color: p.color.to_array(),
            params: [
                if p.use_texture { 1.0 } else { 0.0 },
                p.metalness.clamp(0.0, 1.0),
                p.roughness.clamp(0.0, 1.0),
                p.opacity.clamp(0.0, 1.0),
            ],
            uv: [p.uv_scale[0], p.uv_scale[1], 0.0, 0.0],
        }
    }
}

/// Material uniform plus its bind group (uniform, texture, sampler).
///
/// The bound texture is not owned: callers keep it alive and call `rebind`
/// (or recreate the material) before destroying it.
pub struct GpuMaterial {
    uniform: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    params: MaterialParams,
}

impl GpuMaterial {
    pub(super) fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        layout: &wgpu::BindGroupLayout,
        sampler: &wgpu::Sampler,
        texture: &GpuTexture,
        params: MaterialParams,
    ) -> Self {
        let uniform = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("horae material ubo"),
            size: std::mem::size_of::<MaterialUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        queue.write_buffer(&uniform, 0, bytemuck::bytes_of(&MaterialUniform::from(&params)));
        let bind_group = Self::make_bind_group(device, layout, sampler, &uniform, texture);
        Self {
            uniform,
            bind_group,
            params,
        }
    }

    fn make_bind_group(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        sampler: &wgpu::Sampler,
        uniform: &wgpu::Buffer,
        texture: &GpuTexture,
    ) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("horae material bind group"),
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: uniform.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(texture.view()),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(sampler),
                },
            ],
        })
    }

    #[inline]
    pub fn params(&self) -> &MaterialParams {
        &self.params
    }

    /// Uploads new parameters. The bound texture is unchanged.
    pub fn write(&mut self, queue: &wgpu::Queue, params: MaterialParams) {
        self.params = params;
        queue.write_buffer(
            &self.uniform,
            0,
            bytemuck::bytes_of(&MaterialUniform::from(&params)),
        );
    }

    pub(super) fn rebind(
        &mut self,
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        sampler: &wgpu::Sampler,
        texture: &GpuTexture,
    ) {
        self.bind_group = Self::make_bind_group(device, layout, sampler, &self.uniform, texture);
    }

    #[inline]
    pub(super) fn bind_group(&self) -> &wgpu::BindGroup {
        &self.bind_group
    }

    pub fn destroy(self) {
        self.uniform.destroy();
    }
}
