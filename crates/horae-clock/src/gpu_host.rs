//! `ResourceHost` over the engine's wgpu objects, plus frame submission.

use horae_engine::render::{
    Backdrop, DrawItem, DrawScene, GpuMaterial, GpuMesh, GpuTexture, MaterialParams, RenderCtx,
    RenderTarget, SceneRenderer,
};

use crate::assets::DecodedImage;
use crate::error::ResourceError;
use crate::mesh::MeshData;
use crate::resources::{ResourceHost, SceneResources};
use crate::scene::SceneFrame;
use crate::style::StyleTarget;

/// Owns the renderer and clones of the device handles.
///
/// Every object it creates must come back through `dispose_*` (or
/// `SceneResources::teardown_all`) before `destroy`.
pub struct WgpuHost {
    device: wgpu::Device,
    queue: wgpu::Queue,
    renderer: SceneRenderer,
}

impl WgpuHost {
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        format: wgpu::TextureFormat,
    ) -> Result<Self, ResourceError> {
        let renderer = SceneRenderer::new(device, queue, format)?;
        Ok(Self {
            device: device.clone(),
            queue: queue.clone(),
            renderer,
        })
    }

    /// Draws the labels (and backdrop, shadows) described by `frame`.
    ///
    /// Ids in `frame` are checked against `resources`; anything that no
    /// longer matches is skipped.
    pub fn draw(
        &mut self,
        ctx: &RenderCtx<'_>,
        target: &mut RenderTarget<'_>,
        resources: &SceneResources<Self>,
        frame: &SceneFrame,
    ) {
        let items: Vec<DrawItem<'_>> = frame
            .labels
            .iter()
            .flatten()
            .filter_map(|label| {
                let (geometry_id, mesh) = resources.geometry(label.kind)?;
                let (material_id, material) = resources.material(label.kind.target())?;
                if geometry_id != label.geometry || material_id != label.material {
                    return None;
                }
                Some(DrawItem {
                    mesh,
                    material,
                    model: frame.group,
                    casts_shadow: true,
                })
            })
            .collect();

        let backdrop = frame.backdrop.and_then(|id| {
            let (material_id, material) = resources.material(StyleTarget::Background)?;
            let (_, texture) = resources.texture(StyleTarget::Background)?;
            (material_id == id).then(|| Backdrop {
                material,
                image_aspect: texture.aspect(),
            })
        });

        let scene = DrawScene {
            view_proj: frame.view_proj,
            eye: frame.eye,
            lights: frame.lights,
            backdrop,
            items: &items,
            shadow: frame.shadow,
        };
        self.renderer.render(ctx, target, &scene);
    }

    /// Releases renderer-owned buffers. Scene objects must be gone already.
    pub fn destroy(self) {
        self.renderer.destroy();
    }
}

impl ResourceHost for WgpuHost {
    type Geometry = GpuMesh;
    type Material = GpuMaterial;
    type Texture = GpuTexture;

    fn create_geometry(&mut self, mesh: &MeshData) -> GpuMesh {
        GpuMesh::upload(&self.device, "label", &mesh.vertices, &mesh.indices)
    }

    fn create_texture(&mut self, image: &DecodedImage) -> Result<GpuTexture, ResourceError> {
        let texture = GpuTexture::from_rgba8(
            &self.device,
            &self.queue,
            "style image",
            image.width,
            image.height,
            &image.pixels,
        )?;
        Ok(texture)
    }

    fn create_material(
        &mut self,
        params: &MaterialParams,
        texture: Option<&GpuTexture>,
    ) -> GpuMaterial {
        self.renderer
            .create_material(&self.device, &self.queue, texture, *params)
    }

    fn write_material(&mut self, material: &mut GpuMaterial, params: &MaterialParams) {
        material.write(&self.queue, *params);
    }

    fn bind_texture(&mut self, material: &mut GpuMaterial, texture: Option<&GpuTexture>) {
        self.renderer.bind_texture(&self.device, material, texture);
    }

    fn dispose_geometry(&mut self, geometry: GpuMesh) {
        geometry.destroy();
    }

    fn dispose_material(&mut self, material: GpuMaterial) {
        material.destroy();
    }

    fn dispose_texture(&mut self, texture: GpuTexture) {
        texture.destroy();
    }
}
