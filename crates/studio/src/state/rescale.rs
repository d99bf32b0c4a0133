//! Rescale engine: uniform resizing to a real-world target dimension,
//! with every placed decal regenerated at the new scale and the
//! assembly re-seated on its stand.

use glam::Mat4;

use super::Session;
use crate::decal::{projector, Decal, DecalInstance};
use crate::error::StudioError;
use shared::PartId;

impl Session {
    /// Resize the assembly so its real-world diameter becomes
    /// `new_diameter` (same unit as the baseline setting).
    ///
    /// Every registered decal is removed, its position and size scaled
    /// proportionally, and its geometry rebuilt from the original
    /// placement orientation; no raycast is repeated. A decal whose
    /// regeneration fails is dropped with a diagnostic while the rest
    /// proceed.
    pub fn rescale(&mut self, new_diameter: f32) {
        if !(new_diameter > 0.0) {
            tracing::warn!(new_diameter, "ignoring non-positive rescale target");
            return;
        }
        if !self.assembly.is_resolved() {
            tracing::debug!("rescale ignored: model not resolved");
            return;
        }

        let factor = new_diameter / self.settings.baseline_diameter;
        let previous_scale = self.assembly.scale;

        // Pull every scalable part's decals out, keeping the records
        let ids: Vec<PartId> = self.assembly.parts.iter().map(|p| p.id.clone()).collect();
        let mut retained = Vec::new();
        for id in &ids {
            retained.extend(self.registry.remove_all(id));
        }

        self.assembly.scale = factor;

        for decal in retained {
            // The position scales with the part, the extents with the
            // assembly; orientation is preserved from placement time.
            let position = decal.local_position * (factor / decal.placed_at_scale);
            let size = decal.nominal_size * (factor / previous_scale);

            let Some(part) = self.assembly.part_by_id(&decal.part) else {
                tracing::warn!(part = %decal.part, decal = %decal.id, "dropping decal of unknown part");
                continue;
            };
            let visible = part.visible;

            match projector::realize(&decal.part, &part.mesh, factor, position, decal.orientation, size)
            {
                Ok(mesh) => {
                    self.registry.add(Decal {
                        local_position: position,
                        nominal_size: size,
                        placed_at_scale: factor,
                        instance: DecalInstance { mesh, visible },
                        ..decal
                    });
                }
                Err(error) => {
                    // One lost decal must not abort the rest
                    tracing::warn!(%error, decal = %decal.id, "decal dropped during rescale");
                }
            }
        }

        self.reseat();
        self.request_render();
    }

    /// Translate the assembly vertically so its lowest point meets
    /// the stand's highest point.
    pub(super) fn reseat(&mut self) {
        let Some(stand) = &self.stand else {
            tracing::warn!("re-seating skipped: no stand");
            return;
        };
        let stand_bounds = stand
            .mesh
            .aabb()
            .transformed(&Mat4::from_translation(stand.offset));
        let assembly_bounds = self.assembly.bounds();
        if stand_bounds.is_empty() || assembly_bounds.is_empty() {
            tracing::warn!(
                error = %StudioError::EmptyBounds("assembly or stand".to_string()),
                "re-seating skipped"
            );
            return;
        }
        self.assembly.position.y += stand_bounds.max.y - assembly_bounds.min.y;
    }
}

#[cfg(test)]
mod tests {
    use glam::{Mat3, Vec3};

    use crate::decal::{Decal, DecalInstance};
    use crate::fixtures::{ready_session, stamp_lid_center, LID_RADIUS};
    use crate::texture::TextureHandle;
    use crate::viewport::mesh::DecalMeshData;

    #[test]
    fn test_scale_factor_from_baseline() {
        let (mut session, _loader) = ready_session();
        session.rescale(13.35);
        assert!((session.assembly.scale - 0.5).abs() < 1e-6);

        session.rescale(26.7);
        assert!((session.assembly.scale - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_rescale_without_decals_is_clean() {
        let (mut session, _loader) = ready_session();
        session.rescale(53.4);
        assert!((session.assembly.scale - 2.0).abs() < 1e-6);
        assert_eq!(session.registry.total(), 0);
    }

    #[test]
    fn test_decal_position_and_size_scale_proportionally() {
        let (mut session, _loader) = ready_session();
        stamp_lid_center(&mut session).unwrap();

        session.rescale(13.35);

        let lid = "lid".to_string();
        let decal = &session.registry.decals(&lid)[0];
        let expected = Vec3::new(0.0, 0.0, LID_RADIUS) * 0.5;
        assert!((decal.local_position - expected).length() < 1e-5);
        assert!((decal.nominal_size - Vec3::new(0.01, 0.01, 0.005)).length() < 1e-6);
        assert!((decal.placed_at_scale - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_realized_geometry_halves_with_scale() {
        let (mut session, _loader) = ready_session();
        stamp_lid_center(&mut session).unwrap();

        let lid = "lid".to_string();
        let before = session.registry.decals(&lid)[0].instance.mesh.aabb().size();
        session.rescale(13.35);
        let after = session.registry.decals(&lid)[0].instance.mesh.aabb().size();

        // The patch hugs a gently curved surface, so the footprint
        // tracks the nominal size closely.
        assert!((after.x / before.x - 0.5).abs() < 0.05);
        assert!((after.y / before.y - 0.5).abs() < 0.05);
    }

    #[test]
    fn test_orientation_preserved_across_rescale() {
        let (mut session, _loader) = ready_session();
        stamp_lid_center(&mut session).unwrap();

        let lid = "lid".to_string();
        let before = session.registry.decals(&lid)[0].orientation;
        session.rescale(40.0);
        let after = session.registry.decals(&lid)[0].orientation;
        assert_eq!(before, after);
    }

    #[test]
    fn test_reseat_rests_assembly_on_stand() {
        let (mut session, _loader) = ready_session();
        stamp_lid_center(&mut session).unwrap();

        for diameter in [13.35, 26.7, 53.4, 7.0] {
            session.rescale(diameter);
            let assembly_min = session.assembly.bounds().min.y;
            let stand_top = session.stand_bounds().max.y;
            assert!(
                (assembly_min - stand_top).abs() < 1e-4,
                "gap after rescale({diameter}): {assembly_min} vs {stand_top}"
            );
        }
    }

    #[test]
    fn test_failing_decal_dropped_others_survive() {
        let (mut session, _loader) = ready_session();
        let good = stamp_lid_center(&mut session).unwrap();

        // A corrupt record far off the surface: its regeneration
        // cannot intersect anything.
        session.registry.add(Decal {
            id: "bogus".to_string(),
            part: "lid".to_string(),
            local_position: Vec3::new(100.0, 100.0, 100.0),
            orientation: Mat3::IDENTITY,
            nominal_size: Vec3::new(0.02, 0.02, 0.01),
            placed_at_scale: 1.0,
            texture: TextureHandle::new(shared::ImageSource::Sticker {
                id: "x".to_string(),
            }),
            instance: DecalInstance {
                mesh: DecalMeshData { vertices: vec![] },
                visible: true,
            },
        });

        session.rescale(13.35);

        let lid = "lid".to_string();
        assert_eq!(session.registry.count(&lid), 1);
        assert_eq!(session.registry.decals(&lid)[0].id, good);
    }

    #[test]
    fn test_non_positive_target_ignored() {
        let (mut session, _loader) = ready_session();
        session.rescale(0.0);
        assert!((session.assembly.scale - 1.0).abs() < 1e-6);
        session.rescale(-5.0);
        assert!((session.assembly.scale - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_rescale_twice_composes_from_baseline() {
        let (mut session, _loader) = ready_session();
        stamp_lid_center(&mut session).unwrap();

        session.rescale(13.35);
        session.rescale(26.7);

        let lid = "lid".to_string();
        let decal = &session.registry.decals(&lid)[0];
        // Back at baseline: the record matches the original placement
        let expected = Vec3::new(0.0, 0.0, LID_RADIUS);
        assert!((decal.local_position - expected).length() < 1e-5);
        assert!((decal.nominal_size - Vec3::new(0.02, 0.02, 0.01)).length() < 1e-6);
    }
}
