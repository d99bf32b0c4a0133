//! Factory fixtures: the procedural vessel model and ready-made
//! sessions used by tests and the demo driver.

use glam::Vec3;
use shared::{DecalId, ImageSource};

use crate::render::NullRenderer;
use crate::state::{AssetSource, ModelAssets, NamedMesh, Session, StudioSettings};
use crate::texture::ImmediateTextureLoader;
use crate::viewport::mesh::{disc, dome, slab, MeshData};
use crate::viewport::picking::SurfaceHit;

pub const LID_RADIUS: f32 = 0.9;
pub const PLATE_RADIUS: f32 = 1.0;
pub const PLATE_HEIGHT: f32 = 0.2;
/// Authored rest height of the plate above the stand top. The model
/// ships slightly lifted; re-seating closes the gap on rescale.
pub const PLATE_LIFT: f32 = 0.3;

// ── Part meshes ─────────────────────────────────────────────────

pub fn lid_mesh() -> MeshData {
    dome(LID_RADIUS, 12, 24)
}

pub fn plate_mesh() -> MeshData {
    disc(PLATE_RADIUS, PLATE_HEIGHT, 24)
}

pub fn stand_mesh() -> MeshData {
    slab(4.0, 0.2, 4.0)
}

// ── Model factories ─────────────────────────────────────────────

/// The composite vessel: lid resting on the plate, stand top at y = 0
pub fn vessel_assets() -> ModelAssets {
    ModelAssets {
        meshes: vec![
            NamedMesh {
                name: "lid".to_string(),
                mesh: lid_mesh(),
                offset: Vec3::new(0.0, PLATE_LIFT + PLATE_HEIGHT, 0.0),
            },
            NamedMesh {
                name: "plate".to_string(),
                mesh: plate_mesh(),
                offset: Vec3::new(0.0, PLATE_LIFT, 0.0),
            },
            NamedMesh {
                name: "stand".to_string(),
                mesh: stand_mesh(),
                offset: Vec3::new(0.0, -0.1, 0.0),
            },
        ],
    }
}

/// The vessel with one named sub-mesh removed
pub fn vessel_assets_without(missing: &str) -> ModelAssets {
    let mut assets = vessel_assets();
    assets.meshes.retain(|m| m.name != missing);
    assets
}

/// Asset source yielding the procedural vessel
pub struct ProceduralVessel;

impl AssetSource for ProceduralVessel {
    fn load_model(&mut self) -> Result<ModelAssets, String> {
        Ok(vessel_assets())
    }
}

// ── Session factories ───────────────────────────────────────────

/// Session with no model installed
pub fn empty_session() -> Session {
    Session::new(StudioSettings::default(), Box::new(NullRenderer))
}

/// Session with the vessel installed, no stamp yet
pub fn vessel_session() -> Session {
    let mut session = empty_session();
    session.install_model(vessel_assets());
    session
}

/// Session with the vessel installed and a sticker stamp loaded
pub fn ready_session() -> (Session, ImmediateTextureLoader) {
    let mut session = vessel_session();
    let mut loader = ImmediateTextureLoader::new();
    session.upload_stamp(
        &mut loader,
        ImageSource::Sticker {
            id: "star".to_string(),
        },
    );
    session.pump(&mut loader);
    (session, loader)
}

/// Stamp the active texture at the lid's +Z equator point (surface
/// normal `(0, 0, 1)`), bypassing the pointer path for tests that
/// need an exactly known placement.
pub fn stamp_lid_center(session: &mut Session) -> Option<DecalId> {
    let part = session.assembly.part_by_id("lid")?;
    let origin = session.part_origin(part);
    let scale = session.assembly.scale;
    let hit = SurfaceHit {
        part: "lid".to_string(),
        point: origin + Vec3::new(0.0, 0.0, LID_RADIUS * scale),
        normal: Vec3::Z,
        distance: 1.0,
        triangle: 0,
    };
    session.place_at(hit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::PartRole;

    #[test]
    fn test_vessel_assets_complete() {
        let assets = vessel_assets();
        let names: Vec<_> = assets.meshes.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["lid", "plate", "stand"]);
        assert!(assets.meshes.iter().all(|m| !m.mesh.is_empty()));
    }

    #[test]
    fn test_vessel_assets_without() {
        let assets = vessel_assets_without("lid");
        assert_eq!(assets.meshes.len(), 2);
        assert!(assets.meshes.iter().all(|m| m.name != "lid"));
    }

    #[test]
    fn test_vessel_stacks_bottom_up() {
        let mut session = vessel_session();
        let stand_top = session.stand_bounds().max.y;
        assert!((stand_top - 0.0).abs() < 1e-5);

        let plate = session.part_bounds(PartRole::Plate);
        let lid = session.part_bounds(PartRole::Lid);
        // Lid base meets the plate top
        assert!((lid.min.y - plate.max.y).abs() < 1e-4);
        // Authored lift above the stand
        assert!((plate.min.y - PLATE_LIFT).abs() < 1e-4);

        // All parts resolved: views are reachable
        session.go_to(shared::ViewMode::Lid);
        assert_eq!(session.view, shared::ViewMode::Lid);
    }

    #[test]
    fn test_ready_session_has_stamp() {
        let (session, _loader) = ready_session();
        assert!(session.stamp().is_some());
        assert!(session.assembly.is_resolved());
    }

    #[test]
    fn test_stamp_lid_center_places_one_decal() {
        let (mut session, _loader) = ready_session();
        assert!(stamp_lid_center(&mut session).is_some());
        assert_eq!(session.registry.count(&"lid".to_string()), 1);
    }

    #[test]
    fn test_procedural_source_loads() {
        let mut session = empty_session();
        let mut source = ProceduralVessel;
        session.load_from(&mut source).unwrap();
        assert!(session.assembly.is_resolved());
        assert!(session.stand.is_some());
    }
}
