//! Shared GPU types and utilities used by the scene renderer.

use std::num::NonZeroU64;

use bytemuck::{Pod, Zeroable};

// ── blend ─────────────────────────────────────────────────────────────────

pub(super) fn premul_alpha_blend() -> wgpu::BlendState {
    wgpu::BlendState {
        color: wgpu::BlendComponent {
            src_factor: wgpu::BlendFactor::One,
            dst_factor: wgpu::BlendFactor::OneMinusSrcAlpha,
            operation: wgpu::BlendOperation::Add,
        },
        alpha: wgpu::BlendComponent {
            src_factor: wgpu::BlendFactor::One,
            dst_factor: wgpu::BlendFactor::OneMinusSrcAlpha,
            operation: wgpu::BlendOperation::Add,
        },
    }
}

// ── uniforms ──────────────────────────────────────────────────────────────

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub(super) struct CameraUniform {
    pub view_proj: [[f32; 4]; 4],
    pub eye: [f32; 4],
}

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub(super) struct DrawUniform {
    pub model: [[f32; 4]; 4],
    /// x: shadow opacity (shadow pipeline only)
    pub shadow: [f32; 4],
}

/// Stride between per-draw uniforms inside the dynamic-offset buffer.
///
/// 256 is the WebGPU default `min_uniform_buffer_offset_alignment`.
pub(super) const DRAW_UNIFORM_STRIDE: u64 = 256;

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub(super) struct BackdropUniform {
    /// xy: uv scale, zw: uv offset
    pub uv_transform: [f32; 4],
}

// ── binding sizes ─────────────────────────────────────────────────────────

/// Minimum binding size for a uniform of type `T`.
///
/// Every uniform here is a non-empty `#[repr(C)]` struct, so the fallback
/// is never taken; it keeps pipeline creation free of `unwrap`.
pub(super) fn min_binding_size<T>() -> Option<NonZeroU64> {
    NonZeroU64::new(std::mem::size_of::<T>() as u64)
}

pub(super) fn uniform_entry<T>(
    binding: u32,
    visibility: wgpu::ShaderStages,
    has_dynamic_offset: bool,
) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset,
            min_binding_size: min_binding_size::<T>(),
        },
        count: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draw_uniform_fits_in_stride() {
        assert!(std::mem::size_of::<DrawUniform>() as u64 <= DRAW_UNIFORM_STRIDE);
    }

    #[test]
    fn uniforms_are_16_byte_multiples() {
        assert_eq!(std::mem::size_of::<CameraUniform>() % 16, 0);
        assert_eq!(std::mem::size_of::<DrawUniform>() % 16, 0);
        assert_eq!(std::mem::size_of::<BackdropUniform>() % 16, 0);
    }
}
