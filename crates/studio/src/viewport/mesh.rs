//! CPU-side mesh buffers and procedural part builders.

use glam::{Vec2, Vec3};

use crate::geometry::Aabb;

/// Part surface mesh: interleaved [pos.x, pos.y, pos.z, norm.x, norm.y, norm.z]
#[derive(Clone)]
pub struct MeshData {
    /// 6 floats per vertex: position(3) + normal(3)
    pub vertices: Vec<f32>,
    pub indices: Vec<u32>,
}

impl MeshData {
    pub const STRIDE: usize = 6;

    pub fn vertex_count(&self) -> usize {
        self.vertices.len() / Self::STRIDE
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn position(&self, vertex: usize) -> Vec3 {
        let base = vertex * Self::STRIDE;
        Vec3::new(
            self.vertices[base],
            self.vertices[base + 1],
            self.vertices[base + 2],
        )
    }

    pub fn normal(&self, vertex: usize) -> Vec3 {
        let base = vertex * Self::STRIDE;
        Vec3::new(
            self.vertices[base + 3],
            self.vertices[base + 4],
            self.vertices[base + 5],
        )
    }

    /// Corner positions of a triangle by triangle index
    pub fn triangle(&self, tri: usize) -> [Vec3; 3] {
        [
            self.position(self.indices[tri * 3] as usize),
            self.position(self.indices[tri * 3 + 1] as usize),
            self.position(self.indices[tri * 3 + 2] as usize),
        ]
    }

    /// Bounds in the mesh's own (authored) coordinates
    pub fn aabb(&self) -> Aabb {
        Aabb::from_points((0..self.vertex_count()).map(|i| self.position(i)))
    }
}

/// Realized decal patch: non-indexed triangle soup, interleaved
/// [pos(3), normal(3), uv(2)]. Always derived, regenerated on rescale.
#[derive(Clone)]
pub struct DecalMeshData {
    /// 8 floats per vertex: position(3) + normal(3) + texcoord(2)
    pub vertices: Vec<f32>,
}

impl DecalMeshData {
    pub const STRIDE: usize = 8;

    pub fn vertex_count(&self) -> usize {
        self.vertices.len() / Self::STRIDE
    }

    pub fn triangle_count(&self) -> usize {
        self.vertex_count() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    pub fn position(&self, vertex: usize) -> Vec3 {
        let base = vertex * Self::STRIDE;
        Vec3::new(
            self.vertices[base],
            self.vertices[base + 1],
            self.vertices[base + 2],
        )
    }

    pub fn normal(&self, vertex: usize) -> Vec3 {
        let base = vertex * Self::STRIDE;
        Vec3::new(
            self.vertices[base + 3],
            self.vertices[base + 4],
            self.vertices[base + 5],
        )
    }

    pub fn uv(&self, vertex: usize) -> Vec2 {
        let base = vertex * Self::STRIDE;
        Vec2::new(self.vertices[base + 6], self.vertices[base + 7])
    }

    pub fn aabb(&self) -> Aabb {
        Aabb::from_points((0..self.vertex_count()).map(|i| self.position(i)))
    }
}

// ── Procedural part builders ─────────────────────────────────

/// Hemispherical dome, base ring on the XZ plane, apex at +Y
pub fn dome(radius: f32, rings: u32, sectors: u32) -> MeshData {
    let mut vertices = Vec::new();
    let mut indices = Vec::new();

    for r in 0..=rings {
        let phi = std::f32::consts::FRAC_PI_2 * r as f32 / rings as f32;
        let sp = phi.sin();
        let cp = phi.cos();

        for s in 0..=sectors {
            let theta = std::f32::consts::TAU * s as f32 / sectors as f32;
            let n = Vec3::new(sp * theta.cos(), cp, sp * theta.sin());
            push_vert(&mut vertices, n * radius, n);
        }
    }

    for r in 0..rings {
        for s in 0..sectors {
            let i0 = r * (sectors + 1) + s;
            let i1 = i0 + 1;
            let i2 = i0 + sectors + 1;
            let i3 = i2 + 1;
            indices.extend_from_slice(&[i0, i2, i1, i1, i2, i3]);
        }
    }

    MeshData { vertices, indices }
}

/// Shallow cylinder (a dished plate): side wall plus both caps,
/// centered on the Y axis with the bottom at y = 0
pub fn disc(radius: f32, height: f32, segments: u32) -> MeshData {
    let mut vertices = Vec::new();
    let mut indices = Vec::new();

    // Side wall
    for i in 0..segments {
        let a0 = (i as f32) * std::f32::consts::TAU / segments as f32;
        let a1 = ((i + 1) as f32) * std::f32::consts::TAU / segments as f32;

        let n0 = Vec3::new(a0.cos(), 0.0, a0.sin());
        let n1 = Vec3::new(a1.cos(), 0.0, a1.sin());

        let base = (vertices.len() / MeshData::STRIDE) as u32;
        push_vert(&mut vertices, n0 * radius, n0);
        push_vert(&mut vertices, n1 * radius, n1);
        push_vert(&mut vertices, n1 * radius + Vec3::Y * height, n1);
        push_vert(&mut vertices, n0 * radius + Vec3::Y * height, n0);

        indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }

    add_cap(&mut vertices, &mut indices, radius, height, segments, Vec3::Y);
    add_cap(&mut vertices, &mut indices, radius, 0.0, segments, Vec3::NEG_Y);

    MeshData { vertices, indices }
}

/// Axis-aligned box centered at the origin
pub fn slab(w: f32, h: f32, d: f32) -> MeshData {
    let hw = w * 0.5;
    let hh = h * 0.5;
    let hd = d * 0.5;

    let faces: [([Vec3; 4], Vec3); 6] = [
        // Front (+Z)
        ([Vec3::new(-hw, -hh, hd), Vec3::new(hw, -hh, hd), Vec3::new(hw, hh, hd), Vec3::new(-hw, hh, hd)], Vec3::Z),
        // Back (-Z)
        ([Vec3::new(hw, -hh, -hd), Vec3::new(-hw, -hh, -hd), Vec3::new(-hw, hh, -hd), Vec3::new(hw, hh, -hd)], Vec3::NEG_Z),
        // Right (+X)
        ([Vec3::new(hw, -hh, hd), Vec3::new(hw, -hh, -hd), Vec3::new(hw, hh, -hd), Vec3::new(hw, hh, hd)], Vec3::X),
        // Left (-X)
        ([Vec3::new(-hw, -hh, -hd), Vec3::new(-hw, -hh, hd), Vec3::new(-hw, hh, hd), Vec3::new(-hw, hh, -hd)], Vec3::NEG_X),
        // Top (+Y)
        ([Vec3::new(-hw, hh, hd), Vec3::new(hw, hh, hd), Vec3::new(hw, hh, -hd), Vec3::new(-hw, hh, -hd)], Vec3::Y),
        // Bottom (-Y)
        ([Vec3::new(-hw, -hh, -hd), Vec3::new(hw, -hh, -hd), Vec3::new(hw, -hh, hd), Vec3::new(-hw, -hh, hd)], Vec3::NEG_Y),
    ];

    let mut vertices = Vec::with_capacity(24 * MeshData::STRIDE);
    let mut indices = Vec::with_capacity(36);

    for (quad, normal) in &faces {
        let base = (vertices.len() / MeshData::STRIDE) as u32;
        for v in quad {
            push_vert(&mut vertices, *v, *normal);
        }
        indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }

    MeshData { vertices, indices }
}

/// Flat rectangle in the XY plane facing +Z, centered at the origin
pub fn panel(w: f32, h: f32) -> MeshData {
    let hw = w * 0.5;
    let hh = h * 0.5;

    let mut vertices = Vec::with_capacity(4 * MeshData::STRIDE);
    for v in [
        Vec3::new(-hw, -hh, 0.0),
        Vec3::new(hw, -hh, 0.0),
        Vec3::new(hw, hh, 0.0),
        Vec3::new(-hw, hh, 0.0),
    ] {
        push_vert(&mut vertices, v, Vec3::Z);
    }

    MeshData {
        vertices,
        indices: vec![0, 1, 2, 0, 2, 3],
    }
}

// ── Helpers ──────────────────────────────────────────────────

fn push_vert(v: &mut Vec<f32>, p: Vec3, n: Vec3) {
    v.extend_from_slice(&[p.x, p.y, p.z, n.x, n.y, n.z]);
}

fn add_cap(
    vertices: &mut Vec<f32>,
    indices: &mut Vec<u32>,
    radius: f32,
    y: f32,
    segments: u32,
    normal: Vec3,
) {
    let center_idx = (vertices.len() / MeshData::STRIDE) as u32;
    push_vert(vertices, Vec3::new(0.0, y, 0.0), normal);

    for i in 0..segments {
        let angle = (i as f32) * std::f32::consts::TAU / segments as f32;
        push_vert(
            vertices,
            Vec3::new(radius * angle.cos(), y, radius * angle.sin()),
            normal,
        );
    }

    for i in 0..segments {
        let next = (i + 1) % segments;
        if normal.y > 0.0 {
            indices.extend_from_slice(&[center_idx, center_idx + 1 + next, center_idx + 1 + i]);
        } else {
            indices.extend_from_slice(&[center_idx, center_idx + 1 + i, center_idx + 1 + next]);
        }
    }
}
