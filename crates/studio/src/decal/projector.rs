//! Decal projection: a thin oriented box is intersected against a
//! part mesh, producing a surface-conforming textured patch.
//!
//! The box sits at the attachment point, spans `size.x` along the
//! tangent and `size.y` along the bitangent, and extends half of
//! `size.z` to either side of the surface along the normal. Every
//! mesh triangle is clipped against the six box planes; survivors are
//! fanned back into triangles with texture coordinates spanning the
//! box cross-section.

use glam::{Mat3, Vec3};
use shared::PartId;
use uuid::Uuid;

use super::{Decal, DecalInstance};
use crate::error::StudioError;
use crate::geometry::tangent_frame;
use crate::texture::TextureHandle;
use crate::viewport::mesh::{DecalMeshData, MeshData};

/// A vertex mid-clip: position in decal space, normal in part frame
#[derive(Clone, Copy)]
struct ClipVertex {
    position: Vec3,
    normal: Vec3,
}

/// Project a new decal onto a part surface.
///
/// `part_point` is the hit point in the part's frame at `part_scale`
/// (the same frame the realized patch is emitted in); `surface_normal`
/// orients the patch and is captured into the decal record.
#[allow(clippy::too_many_arguments)]
pub fn project(
    part_id: &PartId,
    mesh: &MeshData,
    part_scale: f32,
    part_point: Vec3,
    surface_normal: Vec3,
    size: Vec3,
    texture: TextureHandle,
    visible: bool,
) -> Result<Decal, StudioError> {
    let orientation = tangent_frame(surface_normal);
    let patch = realize(part_id, mesh, part_scale, part_point, orientation, size)?;

    Ok(Decal {
        id: Uuid::new_v4().to_string(),
        part: part_id.clone(),
        local_position: part_point,
        orientation,
        nominal_size: size,
        placed_at_scale: part_scale,
        texture,
        instance: DecalInstance {
            mesh: patch,
            visible,
        },
    })
}

/// Rebuild the surface-conforming patch for a decal volume centered
/// at `center` with basis `basis` and extents `size`, all in the
/// part's frame at `part_scale`.
///
/// Zero surviving triangles is a [`StudioError::NoSurfaceIntersection`],
/// not a panic: the volume may graze the surface and miss.
pub fn realize(
    part_id: &PartId,
    mesh: &MeshData,
    part_scale: f32,
    center: Vec3,
    basis: Mat3,
    size: Vec3,
) -> Result<DecalMeshData, StudioError> {
    // basis is orthonormal, so the transpose maps part frame -> decal space
    let into_decal = basis.transpose();
    let half = size * 0.5;

    let mut vertices: Vec<f32> = Vec::new();

    for tri in 0..mesh.triangle_count() {
        let mut poly: Vec<ClipVertex> = (0..3)
            .map(|corner| {
                let index = mesh.indices[tri * 3 + corner] as usize;
                ClipVertex {
                    position: into_decal * (mesh.position(index) * part_scale - center),
                    normal: mesh.normal(index),
                }
            })
            .collect();

        for (axis, sign) in [
            (0, 1.0),
            (0, -1.0),
            (1, 1.0),
            (1, -1.0),
            (2, 1.0),
            (2, -1.0),
        ] {
            if poly.len() < 3 {
                break;
            }
            poly = clip_polygon(&poly, axis, sign, half[axis]);
        }
        if poly.len() < 3 {
            continue;
        }

        for i in 1..poly.len() - 1 {
            for v in [poly[0], poly[i], poly[i + 1]] {
                emit(&mut vertices, v, basis, center, size);
            }
        }
    }

    if vertices.is_empty() {
        return Err(StudioError::NoSurfaceIntersection(part_id.clone()));
    }
    Ok(DecalMeshData { vertices })
}

/// Sutherland-Hodgman clip of a polygon against one box plane:
/// `sign * position[axis] <= limit` is inside
fn clip_polygon(poly: &[ClipVertex], axis: usize, sign: f32, limit: f32) -> Vec<ClipVertex> {
    let mut out = Vec::with_capacity(poly.len() + 1);

    for i in 0..poly.len() {
        let a = poly[i];
        let b = poly[(i + 1) % poly.len()];
        let da = sign * a.position[axis] - limit;
        let db = sign * b.position[axis] - limit;

        let a_inside = da <= 0.0;
        let b_inside = db <= 0.0;

        if a_inside {
            out.push(a);
        }
        if a_inside != b_inside {
            let t = da / (da - db);
            out.push(ClipVertex {
                position: a.position.lerp(b.position, t),
                normal: a.normal.lerp(b.normal, t),
            });
        }
    }

    out
}

fn emit(vertices: &mut Vec<f32>, v: ClipVertex, basis: Mat3, center: Vec3, size: Vec3) {
    let p = basis * v.position + center;
    let n = v.normal.normalize_or_zero();
    let u = v.position.x / size.x + 0.5;
    let w = v.position.y / size.y + 0.5;
    vertices.extend_from_slice(&[p.x, p.y, p.z, n.x, n.y, n.z, u, w]);
}
