use glam::Vec3;
use horae_engine::render::MeshVertex;

/// Axis-aligned bounding box.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    #[inline]
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    #[inline]
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }
}

/// CPU-side indexed triangle list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshData {
    pub vertices: Vec<MeshVertex>,
    pub indices: Vec<u32>,
}

impl MeshData {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn aabb(&self) -> Option<Aabb> {
        let first = Vec3::from_array(self.vertices.first()?.position);
        let (min, max) = self
            .vertices
            .iter()
            .map(|v| Vec3::from_array(v.position))
            .fold((first, first), |(lo, hi), p| (lo.min(p), hi.max(p)));
        Some(Aabb { min, max })
    }

    /// Moves `other`'s triangles into `self`.
    pub fn append(&mut self, other: MeshData) {
        let base = self.vertices.len() as u32;
        self.vertices.extend(other.vertices);
        self.indices.extend(other.indices.into_iter().map(|i| i + base));
    }

    pub fn translate(&mut self, by: Vec3) {
        for v in &mut self.vertices {
            v.position = (Vec3::from_array(v.position) + by).to_array();
        }
    }

    /// Appends one unshared triangle.
    pub(crate) fn push_triangle(&mut self, a: MeshVertex, b: MeshVertex, c: MeshVertex) {
        let base = self.vertices.len() as u32;
        self.vertices.extend([a, b, c]);
        self.indices.extend([base, base + 1, base + 2]);
    }

    pub(crate) fn push_quad(&mut self, q: [MeshVertex; 4]) {
        let base = self.vertices.len() as u32;
        self.vertices.extend(q);
        self.indices
            .extend([base, base + 1, base + 2, base, base + 2, base + 3]);
    }
}
