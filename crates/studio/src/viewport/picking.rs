//! Ray casting against part meshes: broad-phase AABB test,
//! Möller-Trumbore triangle intersection, and the pointer-to-surface
//! resolver used for decal placement.

use glam::{Mat4, Vec3};
use shared::PartId;

use super::mesh::MeshData;
use crate::geometry::Aabb;

/// A ray in world space
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

/// Ray-AABB intersection using the slab method.
/// Returns the distance along the ray to the nearest hit, or None.
pub fn ray_aabb(ray: &Ray, aabb: &Aabb) -> Option<f32> {
    let inv_dir = Vec3::new(
        1.0 / ray.direction.x,
        1.0 / ray.direction.y,
        1.0 / ray.direction.z,
    );

    let t1 = (aabb.min.x - ray.origin.x) * inv_dir.x;
    let t2 = (aabb.max.x - ray.origin.x) * inv_dir.x;
    let t3 = (aabb.min.y - ray.origin.y) * inv_dir.y;
    let t4 = (aabb.max.y - ray.origin.y) * inv_dir.y;
    let t5 = (aabb.min.z - ray.origin.z) * inv_dir.z;
    let t6 = (aabb.max.z - ray.origin.z) * inv_dir.z;

    let tmin = t1.min(t2).max(t3.min(t4)).max(t5.min(t6));
    let tmax = t1.max(t2).min(t3.max(t4)).min(t5.max(t6));

    if tmax < 0.0 || tmin > tmax {
        return None;
    }

    Some(if tmin < 0.0 { tmax } else { tmin })
}

/// Möller-Trumbore ray-triangle intersection.
/// Returns the distance along the ray if hit, or None.
pub fn ray_triangle_intersect(ray: &Ray, v0: Vec3, v1: Vec3, v2: Vec3) -> Option<f32> {
    const EPSILON: f32 = 1e-7;

    let edge1 = v1 - v0;
    let edge2 = v2 - v0;
    let h = ray.direction.cross(edge2);
    let a = edge1.dot(h);

    // Ray is parallel to triangle
    if a.abs() < EPSILON {
        return None;
    }

    let f = 1.0 / a;
    let s = ray.origin - v0;
    let u = f * s.dot(h);

    if !(0.0..=1.0).contains(&u) {
        return None;
    }

    let q = s.cross(edge1);
    let v = f * ray.direction.dot(q);

    if v < 0.0 || u + v > 1.0 {
        return None;
    }

    let t = f * edge2.dot(q);

    // Intersection is behind ray origin
    if t > EPSILON {
        Some(t)
    } else {
        None
    }
}

/// One hit-testable surface: a part's mesh plus its world transform.
/// Callers pass only currently visible parts; hidden parts must never
/// be hit-testable.
pub struct PickTarget<'a> {
    pub part: &'a PartId,
    pub mesh: &'a MeshData,
    pub world_from_local: Mat4,
}

/// Result of resolving a pointer ray against the eligible surfaces
#[derive(Clone, Debug)]
pub struct SurfaceHit {
    /// The part that was hit
    pub part: PartId,
    /// Hit point in world space
    pub point: Vec3,
    /// Geometric face normal in world space, facing the ray origin
    pub normal: Vec3,
    /// Distance along the (unit-direction) world ray
    pub distance: f32,
    /// Index of the hit triangle in the part mesh
    pub triangle: usize,
}

/// Find the nearest surface intersected by the ray.
///
/// Targets are tested in slice order and triangles in index order, so
/// identical inputs always produce the identical hit.
pub fn resolve(ray: &Ray, targets: &[PickTarget]) -> Option<SurfaceHit> {
    let mut best: Option<SurfaceHit> = None;

    for target in targets {
        let world_bounds = target.mesh.aabb().transformed(&target.world_from_local);
        if world_bounds.is_empty() {
            continue;
        }
        let Some(approach) = ray_aabb(ray, &world_bounds) else {
            continue;
        };
        if best.as_ref().is_some_and(|b| approach >= b.distance) {
            continue;
        }

        // Intersect in part-local space. The local direction is not
        // renormalized, so the ray parameter stays comparable to world
        // distances across targets.
        let local_from_world = target.world_from_local.inverse();
        let local_ray = Ray {
            origin: local_from_world.transform_point3(ray.origin),
            direction: local_from_world.transform_vector3(ray.direction),
        };

        for tri in 0..target.mesh.triangle_count() {
            let [v0, v1, v2] = target.mesh.triangle(tri);
            if let Some(t) = ray_triangle_intersect(&local_ray, v0, v1, v2) {
                if best.as_ref().is_none_or(|b| t < b.distance) {
                    let local_normal = (v1 - v0).cross(v2 - v0);
                    let mut normal = target
                        .world_from_local
                        .transform_vector3(local_normal)
                        .normalize_or_zero();
                    // Decals face the viewer: keep the normal on the
                    // ray-origin side of the surface.
                    if normal.dot(ray.direction) > 0.0 {
                        normal = -normal;
                    }
                    let local_point = local_ray.origin + local_ray.direction * t;
                    best = Some(SurfaceHit {
                        part: target.part.clone(),
                        point: target.world_from_local.transform_point3(local_point),
                        normal,
                        distance: t,
                        triangle: tri,
                    });
                }
            }
        }
    }

    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::viewport::mesh::{panel, slab};

    fn forward_ray(origin: Vec3) -> Ray {
        Ray {
            origin,
            direction: Vec3::NEG_Z,
        }
    }

    #[test]
    fn test_ray_aabb_hit_and_miss() {
        let aabb = Aabb::from_points([Vec3::splat(-1.0), Vec3::splat(1.0)]);
        let hit = ray_aabb(&forward_ray(Vec3::new(0.0, 0.0, 5.0)), &aabb);
        assert_eq!(hit, Some(4.0));

        let miss = ray_aabb(&forward_ray(Vec3::new(5.0, 0.0, 5.0)), &aabb);
        assert!(miss.is_none());
    }

    #[test]
    fn test_ray_aabb_from_inside() {
        let aabb = Aabb::from_points([Vec3::splat(-1.0), Vec3::splat(1.0)]);
        let hit = ray_aabb(&forward_ray(Vec3::ZERO), &aabb);
        assert_eq!(hit, Some(1.0));
    }

    #[test]
    fn test_ray_triangle_basic() {
        let ray = forward_ray(Vec3::new(0.25, 0.25, 1.0));
        let t = ray_triangle_intersect(
            &ray,
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
        );
        assert_eq!(t, Some(1.0));
    }

    #[test]
    fn test_ray_triangle_behind_origin() {
        let ray = forward_ray(Vec3::new(0.25, 0.25, -1.0));
        let t = ray_triangle_intersect(
            &ray,
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
        );
        assert!(t.is_none());
    }

    #[test]
    fn test_resolve_nearest_of_two() {
        let near_id: PartId = "near".to_string();
        let far_id: PartId = "far".to_string();
        let mesh = panel(2.0, 2.0);

        // Same mesh at z=0 and z=-3; listing far first must not matter.
        let targets = [
            PickTarget {
                part: &far_id,
                mesh: &mesh,
                world_from_local: Mat4::from_translation(Vec3::new(0.0, 0.0, -3.0)),
            },
            PickTarget {
                part: &near_id,
                mesh: &mesh,
                world_from_local: Mat4::IDENTITY,
            },
        ];

        let hit = resolve(&forward_ray(Vec3::new(0.1, 0.1, 5.0)), &targets).unwrap();
        assert_eq!(hit.part, "near");
        assert!((hit.distance - 5.0).abs() < 1e-5);
        assert!(hit.normal.dot(Vec3::Z) > 0.99);
    }

    #[test]
    fn test_resolve_miss() {
        let id: PartId = "p".to_string();
        let mesh = panel(1.0, 1.0);
        let targets = [PickTarget {
            part: &id,
            mesh: &mesh,
            world_from_local: Mat4::IDENTITY,
        }];
        assert!(resolve(&forward_ray(Vec3::new(3.0, 0.0, 5.0)), &targets).is_none());
    }

    #[test]
    fn test_resolve_scaled_target_distance() {
        let id: PartId = "p".to_string();
        let mesh = slab(2.0, 2.0, 2.0);
        // Scaled 0.5: front face moves from z=1 to z=0.5.
        let targets = [PickTarget {
            part: &id,
            mesh: &mesh,
            world_from_local: Mat4::from_scale(Vec3::splat(0.5)),
        }];
        let hit = resolve(&forward_ray(Vec3::new(0.0, 0.0, 5.0)), &targets).unwrap();
        assert!((hit.distance - 4.5).abs() < 1e-4);
        assert!((hit.point.z - 0.5).abs() < 1e-4);
    }

    #[test]
    fn test_resolve_deterministic() {
        let id: PartId = "p".to_string();
        let mesh = slab(2.0, 2.0, 2.0);
        let targets = [PickTarget {
            part: &id,
            mesh: &mesh,
            world_from_local: Mat4::IDENTITY,
        }];
        let ray = forward_ray(Vec3::new(0.3, 0.2, 5.0));
        let a = resolve(&ray, &targets).unwrap();
        let b = resolve(&ray, &targets).unwrap();
        assert_eq!(a.point, b.point);
        assert_eq!(a.normal, b.normal);
        assert_eq!(a.distance, b.distance);
        assert_eq!(a.triangle, b.triangle);
    }

    #[test]
    fn test_resolve_normal_faces_viewer() {
        let id: PartId = "p".to_string();
        let mesh = panel(2.0, 2.0);
        let targets = [PickTarget {
            part: &id,
            mesh: &mesh,
            world_from_local: Mat4::IDENTITY,
        }];
        // Approach the panel from behind: the reported normal must
        // still face the ray origin.
        let ray = Ray {
            origin: Vec3::new(0.0, 0.0, -5.0),
            direction: Vec3::Z,
        };
        let hit = resolve(&ray, &targets).unwrap();
        assert!(hit.normal.dot(Vec3::NEG_Z) > 0.99);
    }
}
