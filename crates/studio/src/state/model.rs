//! Surface parts, the scalable assembly, and model resolution.

use glam::{Mat4, Vec3};
use shared::{PartId, PartRole};

use super::settings::ModelBindings;
use crate::error::StudioError;
use crate::geometry::Aabb;
use crate::texture::TextureHandle;
use crate::viewport::mesh::MeshData;

/// A named renderable region of the composite object. Parts are never
/// destroyed during a session, only shown or hidden.
pub struct SurfacePart {
    pub id: PartId,
    /// Sub-mesh name in the source model
    pub name: String,
    pub role: PartRole,
    /// Surface mesh in authored (unscaled) coordinates
    pub mesh: MeshData,
    /// Authored offset of the part origin inside its group
    pub offset: Vec3,
    pub visible: bool,
    /// Whole-surface texture map, if the user applied one
    pub surface_texture: Option<TextureHandle>,
}

impl SurfacePart {
    fn new(role: PartRole, source: NamedMesh) -> Self {
        Self {
            id: role.id().to_string(),
            name: source.name,
            role,
            mesh: source.mesh,
            offset: source.offset,
            visible: true,
            surface_texture: None,
        }
    }
}

/// One named sub-mesh delivered by an [`AssetSource`]
pub struct NamedMesh {
    pub name: String,
    pub mesh: MeshData,
    pub offset: Vec3,
}

/// A loaded model: the named sub-meshes of the composite object
pub struct ModelAssets {
    pub meshes: Vec<NamedMesh>,
}

/// Model source collaborator. Actual asset decoding (GLTF etc.) lives
/// outside the core; the core only consumes named sub-meshes.
pub trait AssetSource {
    fn load_model(&mut self) -> Result<ModelAssets, String>;
}

/// The group of parts that scale together under one rescale
pub struct Assembly {
    /// Member parts in resolver iteration order
    pub parts: Vec<SurfacePart>,
    /// Current uniform scale factor (1.0 = authored baseline)
    pub scale: f32,
    /// World translation; re-seating adjusts the vertical component
    pub position: Vec3,
}

impl Assembly {
    pub fn new() -> Self {
        Self {
            parts: Vec::new(),
            scale: 1.0,
            position: Vec3::ZERO,
        }
    }

    pub fn part(&self, role: PartRole) -> Option<&SurfacePart> {
        self.parts.iter().find(|p| p.role == role)
    }

    pub fn part_mut(&mut self, role: PartRole) -> Option<&mut SurfacePart> {
        self.parts.iter_mut().find(|p| p.role == role)
    }

    pub fn part_by_id(&self, id: &str) -> Option<&SurfacePart> {
        self.parts.iter().find(|p| p.id == id)
    }

    /// World origin of a member part's frame
    pub fn part_origin(&self, part: &SurfacePart) -> Vec3 {
        self.position + part.offset * self.scale
    }

    /// Authored part coordinates -> world
    pub fn world_from_part(&self, part: &SurfacePart) -> Mat4 {
        Mat4::from_translation(self.part_origin(part)) * Mat4::from_scale(Vec3::splat(self.scale))
    }

    /// World bounds over all member parts, regardless of visibility
    pub fn bounds(&self) -> Aabb {
        self.parts.iter().fold(Aabb::EMPTY, |acc, part| {
            acc.union(&part.mesh.aabb().transformed(&self.world_from_part(part)))
        })
    }

    /// Both structural parts present? Until then only the pre-load
    /// default view is reachable.
    pub fn is_resolved(&self) -> bool {
        self.part(PartRole::Lid).is_some() && self.part(PartRole::Plate).is_some()
    }
}

impl Default for Assembly {
    fn default() -> Self {
        Self::new()
    }
}

/// Outcome of matching a model's sub-meshes against the bindings
pub struct ResolvedModel {
    /// Scalable parts (lid, then plate) that were found
    pub parts: Vec<SurfacePart>,
    pub stand: Option<SurfacePart>,
    /// One [`StudioError::MissingAsset`] per absent sub-mesh
    pub missing: Vec<StudioError>,
}

/// Match named sub-meshes to structural roles. A missing sub-mesh is
/// reported, not fatal: the remaining parts keep working.
pub fn resolve_parts(mut assets: ModelAssets, bindings: &ModelBindings) -> ResolvedModel {
    let mut parts = Vec::new();
    let mut missing = Vec::new();

    for (role, name) in [
        (PartRole::Lid, bindings.lid.as_str()),
        (PartRole::Plate, bindings.plate.as_str()),
    ] {
        match take_mesh(&mut assets.meshes, name) {
            Some(source) => parts.push(SurfacePart::new(role, source)),
            None => missing.push(StudioError::MissingAsset(name.to_string())),
        }
    }

    let stand = match take_mesh(&mut assets.meshes, &bindings.stand) {
        Some(source) => Some(SurfacePart::new(PartRole::Stand, source)),
        None => {
            missing.push(StudioError::MissingAsset(bindings.stand.clone()));
            None
        }
    };

    ResolvedModel {
        parts,
        stand,
        missing,
    }
}

fn take_mesh(meshes: &mut Vec<NamedMesh>, name: &str) -> Option<NamedMesh> {
    let index = meshes.iter().position(|m| m.name == name)?;
    Some(meshes.remove(index))
}
