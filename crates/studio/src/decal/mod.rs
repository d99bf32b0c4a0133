//! Decal records and their realized geometry.

pub mod projector;
pub mod registry;

use glam::{Mat3, Vec3};
use shared::{DecalDescription, DecalId, PartId};

use crate::texture::TextureHandle;
use crate::viewport::mesh::DecalMeshData;

/// Renderable realization of a decal. Derived data: disposable,
/// rebuilt whenever the assembly scale changes.
#[derive(Clone)]
pub struct DecalInstance {
    /// Patch geometry in the owning part's frame at the decal's
    /// recorded scale
    pub mesh: DecalMeshData,
    pub visible: bool,
}

/// A user-placed decoration attached to exactly one part.
///
/// `(part, local_position, orientation, nominal_size, placed_at_scale)`
/// is the source of truth; the instance is always reconstructible from
/// it and is never consulted for anything but drawing.
#[derive(Clone)]
pub struct Decal {
    pub id: DecalId,
    pub part: PartId,
    /// Attachment point in the part's frame at `placed_at_scale`
    pub local_position: Vec3,
    /// (tangent, bitangent, normal) columns captured at placement
    /// time and never recomputed from a later raycast
    pub orientation: Mat3,
    /// Width / height / projection depth at `placed_at_scale`
    pub nominal_size: Vec3,
    /// Assembly scale at which position and size were recorded
    pub placed_at_scale: f32,
    /// Shared by reference: one upload can back many decals
    pub texture: TextureHandle,
    pub instance: DecalInstance,
}

impl Decal {
    /// Serializable record for session export
    pub fn describe(&self) -> DecalDescription {
        DecalDescription {
            id: self.id.clone(),
            part: self.part.clone(),
            position: vec3_to_f64(self.local_position),
            tangent: vec3_to_f64(self.orientation.x_axis),
            bitangent: vec3_to_f64(self.orientation.y_axis),
            normal: vec3_to_f64(self.orientation.z_axis),
            size: vec3_to_f64(self.nominal_size),
            placed_at_scale: self.placed_at_scale as f64,
            texture: self.texture.source().clone(),
        }
    }
}

fn vec3_to_f64(v: Vec3) -> [f64; 3] {
    [v.x as f64, v.y as f64, v.z as f64]
}
