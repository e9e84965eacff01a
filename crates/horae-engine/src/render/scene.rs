use glam::{Mat4, Vec3, Vec4};

use super::common::{
    BackdropUniform, CameraUniform, DrawUniform, DRAW_UNIFORM_STRIDE, premul_alpha_blend,
    uniform_entry,
};
use super::lights::{Lights, LightsUniform};
use super::material::{GpuMaterial, MaterialParams, MaterialUniform};
use super::mesh::{GpuMesh, MeshVertex};
use super::texture::{GpuTexture, TextureError};
use super::{RenderCtx, RenderTarget, Viewport};
use crate::device::DEPTH_FORMAT;

/// One lit mesh draw.
pub struct DrawItem<'a> {
    pub mesh: &'a GpuMesh,
    pub material: &'a GpuMaterial,
    pub model: Mat4,
    pub casts_shadow: bool,
}

/// Fullscreen image drawn behind everything, cover-fitted to the viewport.
pub struct Backdrop<'a> {
    pub material: &'a GpuMaterial,
    /// Width over height of the bound image.
    pub image_aspect: f32,
}

/// Flat shadow: shadow casters re-drawn squashed onto a horizontal plane.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ShadowPass {
    pub projection: Mat4,
    pub opacity: f32,
}

impl ShadowPass {
    /// Projects geometry along `toward_light` onto the plane `y = plane_y`.
    ///
    /// Returns `None` when the light is at or below the horizon.
    pub fn directional(plane_y: f32, toward_light: Vec3, opacity: f32) -> Option<Self> {
        let l = toward_light.normalize_or_zero();
        if l.y <= 1e-4 {
            return None;
        }
        let projection = Mat4::from_cols(
            Vec4::new(l.y, 0.0, 0.0, 0.0),
            Vec4::new(-l.x, 0.0, -l.z, 0.0),
            Vec4::new(0.0, 0.0, l.y, 0.0),
            Vec4::new(l.x * plane_y, l.y * plane_y, l.z * plane_y, l.y),
        );
        Some(Self {
            projection,
            opacity: opacity.clamp(0.0, 1.0),
        })
    }
}

/// Everything the renderer needs for one frame.
pub struct DrawScene<'a> {
    pub view_proj: Mat4,
    pub eye: Vec3,
    pub lights: Lights,
    pub backdrop: Option<Backdrop<'a>>,
    pub items: &'a [DrawItem<'a>],
    pub shadow: Option<ShadowPass>,
}

/// Lit-mesh renderer with optional backdrop and planar shadows.
///
/// Owns the pipelines, bind group layouts, a shared sampler, and a 1x1
/// placeholder texture for materials that sample no image.
pub struct SceneRenderer {
    pipeline_format: wgpu::TextureFormat,
    mesh_pipeline: wgpu::RenderPipeline,
    shadow_pipeline: wgpu::RenderPipeline,
    backdrop_pipeline: wgpu::RenderPipeline,

    frame_layout: wgpu::BindGroupLayout,
    draw_layout: wgpu::BindGroupLayout,
    material_layout: wgpu::BindGroupLayout,
    backdrop_layout: wgpu::BindGroupLayout,

    camera_ubo: wgpu::Buffer,
    lights_ubo: wgpu::Buffer,
    frame_bind_group: wgpu::BindGroup,

    draw_ubo: Option<wgpu::Buffer>,
    draw_bind_group: Option<wgpu::BindGroup>,
    draw_capacity: usize,

    backdrop_ubo: wgpu::Buffer,
    backdrop_bind_group: wgpu::BindGroup,

    sampler: wgpu::Sampler,
    placeholder: GpuTexture,
}

impl SceneRenderer {
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        surface_format: wgpu::TextureFormat,
    ) -> Result<Self, TextureError> {
        let frame_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("horae frame bgl"),
            entries: &[
                uniform_entry::<CameraUniform>(
                    0,
                    wgpu::ShaderStages::VERTEX_FRAGMENT,
                    false,
                ),
                uniform_entry::<LightsUniform>(1, wgpu::ShaderStages::FRAGMENT, false),
            ],
        });
        let draw_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("horae draw bgl"),
            entries: &[uniform_entry::<DrawUniform>(
                0,
                wgpu::ShaderStages::VERTEX_FRAGMENT,
                true,
            )],
        });
        let material_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("horae material bgl"),
            entries: &[
                uniform_entry::<MaterialUniform>(0, wgpu::ShaderStages::VERTEX_FRAGMENT, false),
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });
        let backdrop_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("horae backdrop bgl"),
            entries: &[uniform_entry::<BackdropUniform>(
                0,
                wgpu::ShaderStages::VERTEX,
                false,
            )],
        });

        let camera_ubo = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("horae camera ubo"),
            size: std::mem::size_of::<CameraUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let lights_ubo = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("horae lights ubo"),
            size: std::mem::size_of::<LightsUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let frame_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("horae frame bind group"),
            layout: &frame_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: camera_ubo.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: lights_ubo.as_entire_binding(),
                },
            ],
        });

        let backdrop_ubo = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("horae backdrop ubo"),
            size: std::mem::size_of::<BackdropUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let backdrop_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("horae backdrop bind group"),
            layout: &backdrop_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: backdrop_ubo.as_entire_binding(),
            }],
        });

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("horae material sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            address_mode_w: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::MipmapFilterMode::Nearest,
            ..Default::default()
        });
        let placeholder = GpuTexture::placeholder(device, queue)?;

        let (mesh_pipeline, shadow_pipeline, backdrop_pipeline) = build_pipelines(
            device,
            surface_format,
            [&frame_layout, &draw_layout, &material_layout],
            [&material_layout, &backdrop_layout],
        );

        Ok(Self {
            pipeline_format: surface_format,
            mesh_pipeline,
            shadow_pipeline,
            backdrop_pipeline,
            frame_layout,
            draw_layout,
            material_layout,
            backdrop_layout,
            camera_ubo,
            lights_ubo,
            frame_bind_group,
            draw_ubo: None,
            draw_bind_group: None,
            draw_capacity: 0,
            backdrop_ubo,
            backdrop_bind_group,
            sampler,
            placeholder,
        })
    }

    /// Creates a material sampling `texture`, or the white placeholder.
    pub fn create_material(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        texture: Option<&GpuTexture>,
        params: MaterialParams,
    ) -> GpuMaterial {
        GpuMaterial::new(
            device,
            queue,
            &self.material_layout,
            &self.sampler,
            texture.unwrap_or(&self.placeholder),
            params,
        )
    }

    /// Points `material` at `texture` (or the placeholder).
    pub fn bind_texture(
        &self,
        device: &wgpu::Device,
        material: &mut GpuMaterial,
        texture: Option<&GpuTexture>,
    ) {
        material.rebind(
            device,
            &self.material_layout,
            &self.sampler,
            texture.unwrap_or(&self.placeholder),
        );
    }

    /// Draws `scene` into `target`. Color and depth are loaded, not cleared.
    pub fn render(
        &mut self,
        ctx: &RenderCtx<'_>,
        target: &mut RenderTarget<'_>,
        scene: &DrawScene<'_>,
    ) {
        self.ensure_pipelines(ctx);

        let shadow_casters: Vec<&DrawItem<'_>> = match scene.shadow {
            Some(_) => scene.items.iter().filter(|i| i.casts_shadow).collect(),
            None => Vec::new(),
        };
        let draw_count = scene.items.len() + shadow_casters.len();
        self.ensure_draw_capacity(ctx, draw_count);

        self.write_frame_uniforms(ctx, scene);
        if let Some(backdrop) = &scene.backdrop {
            let u = BackdropUniform {
                uv_transform: cover_uv_transform(ctx.viewport, backdrop.image_aspect),
            };
            ctx.queue
                .write_buffer(&self.backdrop_ubo, 0, bytemuck::bytes_of(&u));
        }

        if draw_count > 0 {
            let Some(draw_ubo) = self.draw_ubo.as_ref() else { return };
            let mut staging = vec![0u8; draw_count * DRAW_UNIFORM_STRIDE as usize];
            let mut write = |slot: usize, u: DrawUniform| {
                let start = slot * DRAW_UNIFORM_STRIDE as usize;
                let bytes = bytemuck::bytes_of(&u);
                staging[start..start + bytes.len()].copy_from_slice(bytes);
            };
            for (slot, item) in scene.items.iter().enumerate() {
                write(
                    slot,
                    DrawUniform {
                        model: item.model.to_cols_array_2d(),
                        shadow: [0.0; 4],
                    },
                );
            }
            if let Some(shadow) = scene.shadow {
                for (k, item) in shadow_casters.iter().enumerate() {
                    write(
                        scene.items.len() + k,
                        DrawUniform {
                            model: (shadow.projection * item.model).to_cols_array_2d(),
                            shadow: [shadow.opacity, 0.0, 0.0, 0.0],
                        },
                    );
                }
            }
            ctx.queue.write_buffer(draw_ubo, 0, &staging);
        }

        let mut rpass = target.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("horae scene pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target.color_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: target.depth_view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        if let Some(backdrop) = &scene.backdrop {
            if backdrop.material.params().opacity > 0.0 {
                rpass.set_pipeline(&self.backdrop_pipeline);
                rpass.set_bind_group(0, backdrop.material.bind_group(), &[]);
                rpass.set_bind_group(1, &self.backdrop_bind_group, &[]);
                rpass.draw(0..3, 0..1);
            }
        }

        let Some(draw_bind_group) = self.draw_bind_group.as_ref() else { return };

        rpass.set_pipeline(&self.mesh_pipeline);
        rpass.set_bind_group(0, &self.frame_bind_group, &[]);
        for (slot, item) in scene.items.iter().enumerate() {
            let offset = (slot as u64 * DRAW_UNIFORM_STRIDE) as u32;
            rpass.set_bind_group(1, draw_bind_group, &[offset]);
            rpass.set_bind_group(2, item.material.bind_group(), &[]);
            item.mesh.draw(&mut rpass);
        }

        if scene.shadow.is_some() && !shadow_casters.is_empty() {
            rpass.set_pipeline(&self.shadow_pipeline);
            for (k, item) in shadow_casters.iter().enumerate() {
                let slot = scene.items.len() + k;
                let offset = (slot as u64 * DRAW_UNIFORM_STRIDE) as u32;
                rpass.set_bind_group(1, draw_bind_group, &[offset]);
                rpass.set_bind_group(2, item.material.bind_group(), &[]);
                item.mesh.draw(&mut rpass);
            }
        }
    }

    /// Releases the renderer-owned buffers and the placeholder texture.
    pub fn destroy(self) {
        self.camera_ubo.destroy();
        self.lights_ubo.destroy();
        self.backdrop_ubo.destroy();
        if let Some(ubo) = self.draw_ubo {
            ubo.destroy();
        }
        self.placeholder.destroy();
    }

    fn ensure_pipelines(&mut self, ctx: &RenderCtx<'_>) {
        if self.pipeline_format == ctx.surface_format {
            return;
        }
        log::debug!(
            "SceneRenderer: surface format changed to {:?}; rebuilding pipelines",
            ctx.surface_format
        );
        let (mesh, shadow, backdrop) = build_pipelines(
            ctx.device,
            ctx.surface_format,
            [&self.frame_layout, &self.draw_layout, &self.material_layout],
            [&self.material_layout, &self.backdrop_layout],
        );
        self.mesh_pipeline = mesh;
        self.shadow_pipeline = shadow;
        self.backdrop_pipeline = backdrop;
        self.pipeline_format = ctx.surface_format;
    }

    fn ensure_draw_capacity(&mut self, ctx: &RenderCtx<'_>, required: usize) {
        if required <= self.draw_capacity && self.draw_ubo.is_some() {
            return;
        }

        let new_cap = required.next_power_of_two().max(8);
        let ubo = ctx.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("horae draw ubo"),
            size: new_cap as u64 * DRAW_UNIFORM_STRIDE,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let bind_group = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("horae draw bind group"),
            layout: &self.draw_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: &ubo,
                    offset: 0,
                    size: wgpu::BufferSize::new(std::mem::size_of::<DrawUniform>() as u64),
                }),
            }],
        });

        if let Some(old) = self.draw_ubo.replace(ubo) {
            old.destroy();
        }
        self.draw_bind_group = Some(bind_group);
        self.draw_capacity = new_cap;
    }

    fn write_frame_uniforms(&self, ctx: &RenderCtx<'_>, scene: &DrawScene<'_>) {
        let camera = CameraUniform {
            view_proj: scene.view_proj.to_cols_array_2d(),
            eye: scene.eye.extend(1.0).to_array(),
        };
        ctx.queue
            .write_buffer(&self.camera_ubo, 0, bytemuck::bytes_of(&camera));
        ctx.queue.write_buffer(
            &self.lights_ubo,
            0,
            bytemuck::bytes_of(&scene.lights.to_uniform()),
        );
    }
}

/// Scales and offsets screen uvs so an image of `image_aspect` covers the
/// viewport without distortion, cropping the overflowing axis evenly.
pub(super) fn cover_uv_transform(viewport: Viewport, image_aspect: f32) -> [f32; 4] {
    let screen = viewport.aspect();
    if !(image_aspect.is_finite() && image_aspect > 0.0) {
        return [1.0, 1.0, 0.0, 0.0];
    }
    if screen > image_aspect {
        let sy = image_aspect / screen;
        [1.0, sy, 0.0, (1.0 - sy) * 0.5]
    } else {
        let sx = screen / image_aspect;
        [sx, 1.0, (1.0 - sx) * 0.5, 0.0]
    }
}

fn build_pipelines(
    device: &wgpu::Device,
    format: wgpu::TextureFormat,
    mesh_layouts: [&wgpu::BindGroupLayout; 3],
    backdrop_layouts: [&wgpu::BindGroupLayout; 2],
) -> (wgpu::RenderPipeline, wgpu::RenderPipeline, wgpu::RenderPipeline) {
    let mesh_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("horae mesh shader"),
        source: wgpu::ShaderSource::Wgsl(include_str!("shaders/mesh.wgsl").into()),
    });
    let backdrop_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("horae backdrop shader"),
        source: wgpu::ShaderSource::Wgsl(include_str!("shaders/backdrop.wgsl").into()),
    });

    let mesh_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("horae mesh pipeline layout"),
        bind_group_layouts: &mesh_layouts,
        immediate_size: 0,
    });
    let backdrop_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("horae backdrop pipeline layout"),
        bind_group_layouts: &backdrop_layouts,
        immediate_size: 0,
    });

    let color_target = [Some(wgpu::ColorTargetState {
        format,
        blend: Some(premul_alpha_blend()),
        write_mask: wgpu::ColorWrites::ALL,
    })];
    let primitive = wgpu::PrimitiveState {
        topology: wgpu::PrimitiveTopology::TriangleList,
        strip_index_format: None,
        front_face: wgpu::FrontFace::Ccw,
        cull_mode: None,
        polygon_mode: wgpu::PolygonMode::Fill,
        unclipped_depth: false,
        conservative: false,
    };
    let depth = |write: bool, compare: wgpu::CompareFunction| wgpu::DepthStencilState {
        format: DEPTH_FORMAT,
        depth_write_enabled: write,
        depth_compare: compare,
        stencil: wgpu::StencilState::default(),
        bias: wgpu::DepthBiasState::default(),
    };

    let mesh_pipeline = |label: &str, fs: &str, depth_state: wgpu::DepthStencilState| {
        device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(label),
            layout: Some(&mesh_layout),
            vertex: wgpu::VertexState {
                module: &mesh_shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[MeshVertex::layout()],
            },
            fragment: Some(wgpu::FragmentState {
                module: &mesh_shader,
                entry_point: Some(fs),
                compilation_options: Default::default(),
                targets: &color_target,
            }),
            primitive,
            depth_stencil: Some(depth_state),
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        })
    };

    let lit = mesh_pipeline(
        "horae mesh pipeline",
        "fs_main",
        depth(true, wgpu::CompareFunction::Less),
    );
    let shadow = mesh_pipeline(
        "horae shadow pipeline",
        "fs_shadow",
        depth(false, wgpu::CompareFunction::LessEqual),
    );

    let backdrop = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("horae backdrop pipeline"),
        layout: Some(&backdrop_layout),
        vertex: wgpu::VertexState {
            module: &backdrop_shader,
            entry_point: Some("vs_main"),
            compilation_options: Default::default(),
            buffers: &[],
        },
        fragment: Some(wgpu::FragmentState {
            module: &backdrop_shader,
            entry_point: Some("fs_main"),
            compilation_options: Default::default(),
            targets: &color_target,
        }),
        primitive,
        depth_stencil: Some(depth(false, wgpu::CompareFunction::Always)),
        multisample: wgpu::MultisampleState::default(),
        multiview_mask: None,
        cache: None,
    });

    (lit, shadow, backdrop)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shadow_projects_onto_plane() {
        let pass = ShadowPass::directional(-2.6, Vec3::new(1.0, 2.0, 3.0), 0.12).unwrap();
        let p = pass.projection * Vec4::new(0.5, 1.0, -0.25, 1.0);
        let p = p.truncate() / p.w;
        assert!((p.y + 2.6).abs() < 1e-5);

        // Moving along the light direction lands on the same shadow point.
        let l = Vec3::new(1.0, 2.0, 3.0).normalize();
        let q = Vec3::new(0.5, 1.0, -0.25) + l * 0.7;
        let q = pass.projection * q.extend(1.0);
        let q = q.truncate() / q.w;
        assert!((p - q).length() < 1e-4);
    }

    #[test]
    fn shadow_requires_light_above_horizon() {
        assert!(ShadowPass::directional(0.0, Vec3::new(1.0, 0.0, 0.0), 0.5).is_none());
        assert!(ShadowPass::directional(0.0, Vec3::new(0.0, -1.0, 0.0), 0.5).is_none());
    }

    #[test]
    fn cover_crops_height_on_wide_screens() {
        let t = cover_uv_transform(Viewport::new(1600.0, 800.0), 1.0);
        assert_eq!(t[0], 1.0);
        assert!((t[1] - 0.5).abs() < 1e-6);
        assert!((t[3] - 0.25).abs() < 1e-6);
    }

    #[test]
    fn cover_crops_width_on_tall_screens() {
        let t = cover_uv_transform(Viewport::new(500.0, 1000.0), 2.0);
        assert!((t[0] - 0.25).abs() < 1e-6);
        assert_eq!(t[1], 1.0);
        assert!((t[2] - 0.375).abs() < 1e-6);
    }

    #[test]
    fn cover_ignores_bad_aspect() {
        assert_eq!(
            cover_uv_transform(Viewport::new(10.0, 10.0), f32::NAN),
            [1.0, 1.0, 0.0, 0.0]
        );
    }
}
