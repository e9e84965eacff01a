use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TextureError {
    #[error("texture is empty ({width}x{height})")]
    Empty { width: u32, height: u32 },
    #[error("texture {width}x{height} exceeds device limit {max}")]
    TooLarge { width: u32, height: u32, max: u32 },
    #[error("expected {expected} bytes of RGBA8 data, got {actual}")]
    SizeMismatch { expected: usize, actual: usize },
}

/// Sampled 2D color texture (sRGB, RGBA8).
pub struct GpuTexture {
    texture: wgpu::Texture,
    view: wgpu::TextureView,
    width: u32,
    height: u32,
}

impl GpuTexture {
    /// Uploads tightly packed straight-alpha RGBA8 pixels.
    pub fn from_rgba8(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        label: &str,
        width: u32,
        height: u32,
        pixels: &[u8],
    ) -> Result<Self, TextureError> {
        validate_rgba8(
            width,
            height,
            pixels.len(),
            device.limits().max_texture_dimension_2d,
        )?;

        let size = wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        };
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
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
            pixels,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(width * 4),
                rows_per_image: Some(height),
            },
            size,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Ok(Self {
            texture,
            view,
            width,
            height,
        })
    }

    /// 1x1 opaque white, bound wherever a material samples no image.
    pub fn placeholder(device: &wgpu::Device, queue: &wgpu::Queue) -> Result<Self, TextureError> {
        Self::from_rgba8(device, queue, "horae placeholder texture", 1, 1, &[255; 4])
    }

    #[inline]
    pub fn view(&self) -> &wgpu::TextureView {
        &self.view
    }

    #[inline]
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Width over height.
    #[inline]
    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height.max(1) as f32
    }

    pub fn destroy(self) {
        self.texture.destroy();
    }
}

fn validate_rgba8(width: u32, height: u32, len: usize, max: u32) -> Result<(), TextureError> {
    if width == 0 || height == 0 {
        return Err(TextureError::Empty { width, height });
    }
    if width > max || height > max {
        return Err(TextureError::TooLarge { width, height, max });
    }
    let expected = width as usize * height as usize * 4;
    if len != expected {
        return Err(TextureError::SizeMismatch {
            expected,
            actual: len,
        });
    }
    Ok(())
}
