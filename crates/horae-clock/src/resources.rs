//! Ownership of every GPU object the scene allocates.
//!
//! `SceneResources` is the single owner. Everything else refers to objects by
//! `ResourceId`. Each replacement creates the new object, disposes the old one,
//! then installs the new one, all inside the same call.

use std::array;
use std::fmt;

use horae_engine::render::MaterialParams;

use crate::assets::DecodedImage;
use crate::error::ResourceError;
use crate::mesh::MeshData;
use crate::style::{LabelKind, StyleTarget};

/// Identity of one live allocation. Never reused.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct ResourceId(u64);

impl ResourceId {
    #[inline]
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    #[inline]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Creates and releases the concrete GPU objects.
///
/// All calls happen on the render thread. `dispose_*` releases immediately.
pub trait ResourceHost {
    type Geometry;
    type Material;
    type Texture;

    fn create_geometry(&mut self, mesh: &MeshData) -> Self::Geometry;
    fn create_texture(&mut self, image: &DecodedImage) -> Result<Self::Texture, ResourceError>;
    fn create_material(
        &mut self,
        params: &MaterialParams,
        texture: Option<&Self::Texture>,
    ) -> Self::Material;

    /// Updates parameters in place. Never allocates.
    fn write_material(&mut self, material: &mut Self::Material, params: &MaterialParams);
    /// Re-points `material` at `texture`, or at a neutral placeholder.
    fn bind_texture(&mut self, material: &mut Self::Material, texture: Option<&Self::Texture>);

    fn dispose_geometry(&mut self, geometry: Self::Geometry);
    fn dispose_material(&mut self, material: Self::Material);
    fn dispose_texture(&mut self, texture: Self::Texture);
}

/// Number of live objects per kind.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct LiveCounts {
    pub geometries: usize,
    pub materials: usize,
    pub textures: usize,
}

impl LiveCounts {
    pub fn total(&self) -> usize {
        self.geometries + self.materials + self.textures
    }
}

struct Entry<T> {
    id: ResourceId,
    object: T,
}

/// Registry of live allocations: one geometry per label, one material and
/// at most one texture per style target.
pub struct SceneResources<H: ResourceHost> {
    next_id: u64,
    geometries: [Option<Entry<H::Geometry>>; 2],
    materials: [Option<Entry<H::Material>>; 3],
    textures: [Option<Entry<H::Texture>>; 3],
}

impl<H: ResourceHost> Default for SceneResources<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H: ResourceHost> SceneResources<H> {
    pub fn new() -> Self {
        Self {
            next_id: 1,
            geometries: array::from_fn(|_| None),
            materials: array::from_fn(|_| None),
            textures: array::from_fn(|_| None),
        }
    }

    fn mint(&mut self) -> ResourceId {
        let id = ResourceId(self.next_id);
        self.next_id += 1;
        id
    }

    pub fn replace_geometry(
        &mut self,
        host: &mut H,
        kind: LabelKind,
        mesh: &MeshData,
    ) -> ResourceId {
        let object = host.create_geometry(mesh);
        let id = self.mint();
        if let Some(old) = self.geometries[kind.index()].take() {
            log::trace!("{kind:?} geometry {} -> {id}", old.id);
            host.dispose_geometry(old.object);
        }
        self.geometries[kind.index()] = Some(Entry { id, object });
        id
    }

    /// Creates a fresh material for `target` bound to its current texture.
    pub fn replace_material(
        &mut self,
        host: &mut H,
        target: StyleTarget,
        params: &MaterialParams,
    ) -> ResourceId {
        let texture = self.textures[target.index()].as_ref().map(|e| &e.object);
        let object = host.create_material(params, texture);
        let id = self.mint();
        if let Some(old) = self.materials[target.index()].take() {
            log::trace!("{target} material {} -> {id}", old.id);
            host.dispose_material(old.object);
        }
        self.materials[target.index()] = Some(Entry { id, object });
        id
    }

    /// Returns the existing material for `target`, creating it on first use.
    pub fn ensure_material(
        &mut self,
        host: &mut H,
        target: StyleTarget,
        params: &MaterialParams,
    ) -> ResourceId {
        match &self.materials[target.index()] {
            Some(e) => e.id,
            None => self.replace_material(host, target, params),
        }
    }

    /// Writes `params` into the live material. `false` if there is none yet.
    pub fn write_material(
        &mut self,
        host: &mut H,
        target: StyleTarget,
        params: &MaterialParams,
    ) -> bool {
        match self.materials[target.index()].as_mut() {
            Some(e) => {
                host.write_material(&mut e.object, params);
                true
            }
            None => false,
        }
    }

    /// Uploads `image` as the texture of `target`, disposing the previous one.
    ///
    /// The target's material is re-pointed before the old texture is released.
    /// On error nothing changes.
    pub fn replace_texture(
        &mut self,
        host: &mut H,
        target: StyleTarget,
        image: &DecodedImage,
    ) -> Result<ResourceId, ResourceError> {
        let object = host.create_texture(image)?;
        let id = self.mint();
        if let Some(material) = self.materials[target.index()].as_mut() {
            host.bind_texture(&mut material.object, Some(&object));
        }
        if let Some(old) = self.textures[target.index()].take() {
            log::trace!("{target} texture {} -> {id}", old.id);
            host.dispose_texture(old.object);
        }
        self.textures[target.index()] = Some(Entry { id, object });
        Ok(id)
    }

    /// Disposes the texture of `target`, if any. Returns whether one existed.
    pub fn dispose_texture(&mut self, host: &mut H, target: StyleTarget) -> bool {
        let Some(old) = self.textures[target.index()].take() else {
            return false;
        };
        if let Some(material) = self.materials[target.index()].as_mut() {
            host.bind_texture(&mut material.object, None);
        }
        log::trace!("{target} texture {} disposed", old.id);
        host.dispose_texture(old.object);
        true
    }

    /// Disposes everything. The registry is empty (and reusable) afterwards.
    pub fn teardown_all(&mut self, host: &mut H) {
        let before = self.live();
        for slot in &mut self.geometries {
            if let Some(e) = slot.take() {
                host.dispose_geometry(e.object);
            }
        }
        for slot in &mut self.materials {
            if let Some(e) = slot.take() {
                host.dispose_material(e.object);
            }
        }
        for slot in &mut self.textures {
            if let Some(e) = slot.take() {
                host.dispose_texture(e.object);
            }
        }
        log::debug!(
            "scene resources torn down ({} geometries, {} materials, {} textures)",
            before.geometries,
            before.materials,
            before.textures
        );
    }

    pub fn live(&self) -> LiveCounts {
        LiveCounts {
            geometries: self.geometries.iter().flatten().count(),
            materials: self.materials.iter().flatten().count(),
            textures: self.textures.iter().flatten().count(),
        }
    }

    pub fn geometry(&self, kind: LabelKind) -> Option<(ResourceId, &H::Geometry)> {
        self.geometries[kind.index()]
            .as_ref()
            .map(|e| (e.id, &e.object))
    }

    pub fn material(&self, target: StyleTarget) -> Option<(ResourceId, &H::Material)> {
        self.materials[target.index()]
            .as_ref()
            .map(|e| (e.id, &e.object))
    }

    pub fn texture(&self, target: StyleTarget) -> Option<(ResourceId, &H::Texture)> {
        self.textures[target.index()]
            .as_ref()
            .map(|e| (e.id, &e.object))
    }
}
