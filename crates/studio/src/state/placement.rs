//! Pointer-down handling: resolve the pointer against the visible
//! surfaces and stamp the active decal texture at the hit point.

use glam::{Vec2, Vec3};
use shared::DecalId;

use super::Session;
use crate::decal::projector;
use crate::viewport::picking::{self, PickTarget, SurfaceHit};

impl Session {
    /// Resolve a pointer position against the currently visible
    /// assembly parts. Hidden parts are never hit-testable; the stand
    /// is not a decal surface and is never tested at all.
    pub fn resolve_pointer(&self, screen: Vec2) -> Option<SurfaceHit> {
        let ray = self.camera.screen_ray(screen, self.viewport);
        let targets: Vec<PickTarget> = self
            .assembly
            .parts
            .iter()
            .filter(|p| p.visible)
            .map(|p| PickTarget {
                part: &p.id,
                mesh: &p.mesh,
                world_from_local: self.world_from_part(p),
            })
            .collect();
        picking::resolve(&ray, &targets)
    }

    /// Pointer-down on the canvas. Without an active stamp, or
    /// without a surface under the pointer, nothing is placed; a
    /// frame is rendered either way.
    pub fn pointer_down(&mut self, screen: Vec2) -> Option<DecalId> {
        let placed = self
            .resolve_pointer(screen)
            .and_then(|hit| self.place_at(hit));
        self.request_render();
        placed
    }

    /// Project and register a decal at an already-resolved surface
    /// hit. Fails quietly when the clipped volume misses the surface:
    /// the decoration action simply has no effect.
    pub fn place_at(&mut self, hit: SurfaceHit) -> Option<DecalId> {
        let stamp = self.stamp.clone()?;
        let part = self.assembly.part_by_id(&hit.part)?;
        let part_point = hit.point - self.assembly.part_origin(part);
        let size = Vec3::from(self.settings.stamp_size);

        match projector::project(
            &part.id,
            &part.mesh,
            self.assembly.scale,
            part_point,
            hit.normal,
            size,
            stamp,
            part.visible,
        ) {
            Ok(decal) => {
                let id = decal.id.clone();
                self.save_history();
                self.registry.add(decal);
                Some(id)
            }
            Err(error) => {
                tracing::warn!(%error, part = %hit.part, "decal placement skipped");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use glam::{Vec2, Vec3};
    use shared::ViewMode;

    use crate::fixtures::{ready_session, stamp_lid_center, vessel_session, LID_RADIUS};
    use crate::viewport::picking::SurfaceHit;

    fn viewport_center(session: &crate::state::Session) -> Vec2 {
        Vec2::new(session.viewport.width * 0.5, session.viewport.height * 0.5)
    }

    #[test]
    fn test_placement_scenario_on_lid() {
        let (mut session, _loader) = ready_session();
        stamp_lid_center(&mut session).unwrap();

        let lid = "lid".to_string();
        assert_eq!(session.registry.count(&lid), 1);

        let decal = &session.registry.decals(&lid)[0];
        assert!((decal.local_position - Vec3::new(0.0, 0.0, LID_RADIUS)).length() < 1e-5);
        assert_eq!(decal.orientation.z_axis, Vec3::Z);
        assert_eq!(decal.nominal_size, Vec3::new(0.02, 0.02, 0.01));
        assert!(!decal.instance.mesh.is_empty());
    }

    #[test]
    fn test_pointer_down_without_stamp_is_noop() {
        let mut session = vessel_session();
        session.go_to(ViewMode::Lid);
        let placed = session.pointer_down(viewport_center(&session));
        assert!(placed.is_none());
        assert_eq!(session.registry.total(), 0);
    }

    #[test]
    fn test_pointer_down_places_on_framed_lid() {
        let (mut session, _loader) = ready_session();
        session.go_to(ViewMode::Lid);

        let placed = session.pointer_down(viewport_center(&session));
        assert!(placed.is_some());
        assert_eq!(session.registry.count(&"lid".to_string()), 1);
        assert_eq!(session.registry.count(&"plate".to_string()), 0);
    }

    #[test]
    fn test_pointer_down_renders_even_on_miss() {
        let (mut session, _loader) = ready_session();
        session.go_to(ViewMode::Lid);

        let frames = session.frames_rendered();
        // Top-left corner: the ray flies past the framed lid
        let placed = session.pointer_down(Vec2::new(1.0, 1.0));
        assert!(placed.is_none());
        assert_eq!(session.frames_rendered(), frames + 1);
    }

    #[test]
    fn test_hidden_part_is_never_hit() {
        let (mut session, _loader) = ready_session();
        session.go_to(ViewMode::Plate);

        // Sweep the viewport: nothing may resolve to the hidden lid
        for sx in 0..8 {
            for sy in 0..8 {
                let screen = Vec2::new(
                    session.viewport.width * (sx as f32 + 0.5) / 8.0,
                    session.viewport.height * (sy as f32 + 0.5) / 8.0,
                );
                if let Some(hit) = session.resolve_pointer(screen) {
                    assert_eq!(hit.part, "plate");
                }
            }
        }
    }

    #[test]
    fn test_stand_is_not_a_decal_surface() {
        let (mut session, _loader) = ready_session();
        // Full view, sweep low across the stand area
        for sx in 0..8 {
            let screen = Vec2::new(
                session.viewport.width * (sx as f32 + 0.5) / 8.0,
                session.viewport.height * 0.95,
            );
            if let Some(hit) = session.resolve_pointer(screen) {
                assert_ne!(hit.part, "stand");
            }
        }
    }

    #[test]
    fn test_grazing_volume_places_nothing() {
        let (mut session, _loader) = ready_session();
        // A hit fabricated far off the lid surface: projection finds
        // no triangles and the placement is skipped, not a crash.
        let bogus = SurfaceHit {
            part: "lid".to_string(),
            point: Vec3::new(50.0, 50.0, 50.0),
            normal: Vec3::Z,
            distance: 1.0,
            triangle: 0,
        };
        assert!(session.place_at(bogus).is_none());
        assert_eq!(session.registry.total(), 0);
    }

    #[test]
    fn test_stamp_reused_across_placements() {
        let (mut session, _loader) = ready_session();
        let a = stamp_lid_center(&mut session).unwrap();
        session.go_to(ViewMode::Plate);
        let b = session.pointer_down(viewport_center(&session)).unwrap();
        assert_ne!(a, b);

        let lid = session.registry.decals(&"lid".to_string())[0].texture.clone();
        let plate = session.registry.decals(&"plate".to_string())[0].texture.clone();
        assert!(lid.shares(&plate));
    }
}
