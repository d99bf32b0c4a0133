//! Decal patch validation utilities.
//!
//! `DecalPatchValidator` checks realized decal geometry: stride,
//! triangle-soup shape, unit normals, texture coordinates in range.

use crate::geometry::Aabb;
use crate::viewport::mesh::DecalMeshData;

/// Validator for realized decal patches.
pub struct DecalPatchValidator<'a> {
    patch: &'a DecalMeshData,
}

impl<'a> DecalPatchValidator<'a> {
    pub fn new(patch: &'a DecalMeshData) -> Self {
        Self { patch }
    }

    pub fn vertex_count(&self) -> usize {
        self.patch.vertex_count()
    }

    pub fn triangle_count(&self) -> usize {
        self.patch.triangle_count()
    }

    /// Check that the vertex buffer length is a multiple of the stride.
    pub fn is_stride_valid(&self) -> bool {
        self.patch.vertices.len() % DecalMeshData::STRIDE == 0
    }

    /// Patches are non-indexed triangle soup: three vertices per face.
    pub fn is_soup_valid(&self) -> bool {
        self.patch.vertex_count() % 3 == 0
    }

    /// Check that all vertex normals have unit length (within epsilon).
    pub fn are_normals_normalized(&self, epsilon: f32) -> bool {
        (0..self.patch.vertex_count()).all(|i| (self.patch.normal(i).length() - 1.0).abs() <= epsilon)
    }

    /// Check that all texture coordinates lie in [0, 1] (within epsilon).
    pub fn are_uvs_in_range(&self, epsilon: f32) -> bool {
        (0..self.patch.vertex_count()).all(|i| {
            let uv = self.patch.uv(i);
            (-epsilon..=1.0 + epsilon).contains(&uv.x) && (-epsilon..=1.0 + epsilon).contains(&uv.y)
        })
    }

    pub fn aabb(&self) -> Aabb {
        self.patch.aabb()
    }

    /// Run all checks and return a list of error messages.
    /// An empty list means the patch is valid.
    pub fn validate_all(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if !self.is_stride_valid() {
            errors.push(format!(
                "Vertex buffer length {} is not a multiple of {}",
                self.patch.vertices.len(),
                DecalMeshData::STRIDE
            ));
        }

        if !self.is_soup_valid() {
            errors.push(format!(
                "Vertex count {} is not a multiple of 3",
                self.patch.vertex_count()
            ));
        }

        if self.patch.vertex_count() > 0 && !self.are_normals_normalized(0.01) {
            errors.push("Some normals are not unit-length (epsilon=0.01)".to_string());
        }

        if !self.are_uvs_in_range(1e-4) {
            errors.push("Some texture coordinates fall outside [0, 1]".to_string());
        }

        errors
    }
}
