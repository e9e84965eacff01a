use std::f32::consts::FRAC_PI_2;

use glam::{Vec2, Vec3};
use horae_engine::render::MeshVertex;
use lyon_tessellation::math::point;
use lyon_tessellation::path::Path;
use lyon_tessellation::{
    BuffersBuilder, FillOptions, FillRule, FillTessellator, FillVertex, VertexBuffers,
};

use crate::config::ExtrudeParams;
use crate::error::TextMeshError;
use crate::mesh::MeshData;

use super::outline::{signed_area, Contour};

/// Sharpest corner whose miter is not shortened (1 / cos of half the angle).
const MITER_LIMIT: f32 = 4.0;

const CAP_TOLERANCE: f32 = 0.0005;

/// Extrudes the contours of one shape (one glyph) into a closed solid.
///
/// The solid spans z in `[-bevel_thickness, depth + bevel_thickness]`.
/// Winding is normalized so the largest contour runs counter-clockwise;
/// nested contours keep their relative winding, which the non-zero cap fill
/// relies on.
pub fn extrude_contours(
    contours: &[Contour],
    params: &ExtrudeParams,
) -> Result<MeshData, TextMeshError> {
    let mut mesh = MeshData::new();
    if contours.is_empty() {
        return Ok(mesh);
    }

    let contours = normalize_winding(contours);
    let rings = ring_profile(params);
    let miters: Vec<Vec<Vec2>> = contours.iter().map(|c| miter_directions(c)).collect();

    for (contour, miter) in contours.iter().zip(&miters) {
        push_walls(&mut mesh, contour, miter, &rings);
    }

    let (back_z, back_off) = rings[0];
    let (front_z, _) = rings[rings.len() - 1];
    let cap_outline: Vec<Contour> = contours
        .iter()
        .zip(&miters)
        .map(|(c, m)| offset(c, m, back_off))
        .collect();
    push_caps(&mut mesh, &cap_outline, back_z, front_z)?;

    Ok(mesh)
}

fn normalize_winding(contours: &[Contour]) -> Vec<Contour> {
    let largest = contours
        .iter()
        .map(|c| signed_area(c))
        .max_by(|a, b| a.abs().total_cmp(&b.abs()))
        .unwrap_or(0.0);

    contours
        .iter()
        .map(|c| {
            let mut c = c.clone();
            if largest < 0.0 {
                c.reverse();
            }
            c
        })
        .collect()
}

/// (z, outward offset) per ring, from the back cap to the front cap.
fn ring_profile(p: &ExtrudeParams) -> Vec<(f32, f32)> {
    let depth = p.depth.max(0.0);
    if !p.bevel_enabled || p.bevel_segments == 0 {
        return vec![(0.0, 0.0), (depth, 0.0)];
    }

    let segments = p.bevel_segments;
    let step = |b: u32| {
        let t = b as f32 / segments as f32 * FRAC_PI_2;
        (
            p.bevel_thickness * t.cos(),
            p.bevel_size * t.sin() + p.bevel_offset,
        )
    };

    let back = (0..=segments).map(|b| {
        let (dz, off) = step(b);
        (-dz, off)
    });
    let front = (0..=segments).rev().map(|b| {
        let (dz, off) = step(b);
        (depth + dz, off)
    });
    back.chain(front).collect()
}

/// Outward offset direction per vertex, pre-scaled so edges move by one unit.
fn miter_directions(contour: &[Vec2]) -> Vec<Vec2> {
    let n = contour.len();
    (0..n)
        .map(|i| {
            let prev = contour[(i + n - 1) % n];
            let cur = contour[i];
            let next = contour[(i + 1) % n];
            let n0 = edge_normal(prev, cur);
            let n1 = edge_normal(cur, next);
            let m = (n0 + n1).normalize_or_zero();
            if m == Vec2::ZERO {
                return n0;
            }
            m / m.dot(n0).max(1.0 / MITER_LIMIT)
        })
        .collect()
}

/// Right-hand normal of a counter-clockwise edge, i.e. pointing out of the solid.
fn edge_normal(a: Vec2, b: Vec2) -> Vec2 {
    let d = (b - a).normalize_or_zero();
    Vec2::new(d.y, -d.x)
}

fn offset(contour: &[Vec2], miter: &[Vec2], by: f32) -> Contour {
    contour
        .iter()
        .zip(miter)
        .map(|(&p, &m)| p + m * by)
        .collect()
}

fn push_walls(mesh: &mut MeshData, contour: &[Vec2], miter: &[Vec2], rings: &[(f32, f32)]) {
    let n = contour.len();

    // u runs along the outline, v along z.
    let mut arc = Vec::with_capacity(n + 1);
    arc.push(0.0);
    for i in 0..n {
        let next = arc[i] + contour[i].distance(contour[(i + 1) % n]);
        arc.push(next);
    }

    for pair in rings.windows(2) {
        let (z0, off0) = pair[0];
        let (z1, off1) = pair[1];
        for i in 0..n {
            let j = (i + 1) % n;
            let p00 = (contour[i] + miter[i] * off0).extend(z0);
            let p01 = (contour[j] + miter[j] * off0).extend(z0);
            let p10 = (contour[i] + miter[i] * off1).extend(z1);
            let p11 = (contour[j] + miter[j] * off1).extend(z1);

            let mut normal = (p01 - p00).cross(p10 - p00);
            if normal.length_squared() < 1e-14 {
                normal = (p01 - p00).cross(p11 - p01);
            }
            let normal = normal
                .try_normalize()
                .unwrap_or_else(|| edge_normal(contour[i], contour[j]).extend(0.0))
                .to_array();

            let v = |p: Vec3, u: f32| MeshVertex {
                position: p.to_array(),
                normal,
                uv: [u, p.z],
            };
            mesh.push_quad([
                v(p00, arc[i]),
                v(p01, arc[i + 1]),
                v(p11, arc[i + 1]),
                v(p10, arc[i]),
            ]);
        }
    }
}

fn push_caps(
    mesh: &mut MeshData,
    outline: &[Contour],
    back_z: f32,
    front_z: f32,
) -> Result<(), TextMeshError> {
    let mut builder = Path::builder();
    for c in outline.iter().filter(|c| c.len() >= 3) {
        builder.begin(point(c[0].x, c[0].y));
        for p in &c[1..] {
            builder.line_to(point(p.x, p.y));
        }
        builder.end(true);
    }
    let path = builder.build();

    let mut buffers: VertexBuffers<Vec2, u32> = VertexBuffers::new();
    FillTessellator::new()
        .tessellate_path(
            &path,
            &FillOptions::tolerance(CAP_TOLERANCE).with_fill_rule(FillRule::NonZero),
            &mut BuffersBuilder::new(&mut buffers, |v: FillVertex| {
                let p = v.position();
                Vec2::new(p.x, p.y)
            }),
        )
        .map_err(|e| TextMeshError::Tessellation(format!("{e:?}")))?;

    for (z, facing) in [(front_z, 1.0f32), (back_z, -1.0f32)] {
        let base = mesh.vertices.len() as u32;
        mesh.vertices.extend(buffers.vertices.iter().map(|p| MeshVertex {
            position: [p.x, p.y, z],
            normal: [0.0, 0.0, facing],
            uv: [p.x, p.y],
        }));
        for tri in buffers.indices.chunks_exact(3) {
            let (a, b, c) = (tri[0], tri[1], tri[2]);
            let pa = buffers.vertices[a as usize];
            let pb = buffers.vertices[b as usize];
            let pc = buffers.vertices[c as usize];
            // Counter-clockwise as seen from the side the cap faces.
            let ccw = (pb - pa).perp_dot(pc - pa) * facing >= 0.0;
            let (b, c) = if ccw { (b, c) } else { (c, b) };
            mesh.indices.extend([base + a, base + b, base + c]);
        }
    }
    Ok(())
}
