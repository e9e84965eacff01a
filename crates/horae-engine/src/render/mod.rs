//! GPU rendering subsystem.
//!
//! The renderer draws a small 3D scene: an optional image backdrop, lit
//! triangle meshes, and their planar ground shadows. Every GPU object a
//! caller can create (`GpuMesh`, `GpuMaterial`, `GpuTexture`) has an explicit
//! `destroy`; ownership and release timing belong to the caller.
//!
//! Convention:
//! - right-handed world space, +Y up, camera looking down -Z
//! - colors are linear premultiplied (`paint::Color`)

mod common;
mod ctx;
mod lights;
mod material;
mod mesh;
mod scene;
mod texture;

pub use ctx::{RenderCtx, RenderTarget, Viewport};
pub use lights::{Lights, PointLight};
pub use material::{GpuMaterial, MaterialParams};
pub use mesh::{GpuMesh, MeshVertex};
pub use scene::{Backdrop, DrawItem, DrawScene, SceneRenderer, ShadowPass};
pub use texture::{GpuTexture, TextureError};
