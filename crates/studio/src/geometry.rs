//! Pure geometry helpers: bounding boxes and tangent frames.

use glam::{Mat3, Mat4, Vec3};

/// World "up" reference used for decal tangent construction
pub const WORLD_UP: Vec3 = Vec3::Y;

/// Secondary reference when a surface normal is parallel to [`WORLD_UP`]
const FALLBACK_REFERENCE: Vec3 = Vec3::X;

/// Axis-aligned bounding box with an explicit empty state.
///
/// An empty box (`min > max` on every axis) is the result of bounding
/// nothing; callers must check [`Aabb::is_empty`] before using center
/// or size.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    /// The empty box; inserting any point makes it non-empty
    pub const EMPTY: Self = Self {
        min: Vec3::splat(f32::MAX),
        max: Vec3::splat(f32::MIN),
    };

    /// True when no point has ever been inserted
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    /// Grow to contain `point`
    pub fn insert(&mut self, point: Vec3) {
        self.min = self.min.min(point);
        self.max = self.max.max(point);
    }

    /// Bound a set of points; empty input yields [`Aabb::EMPTY`]
    pub fn from_points(points: impl IntoIterator<Item = Vec3>) -> Self {
        let mut aabb = Self::EMPTY;
        for p in points {
            aabb.insert(p);
        }
        aabb
    }

    /// Smallest box containing both operands
    pub fn union(&self, other: &Aabb) -> Aabb {
        if self.is_empty() {
            return *other;
        }
        if other.is_empty() {
            return *self;
        }
        Aabb {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// Center of the bounding box
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Extents along each axis
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    /// Largest extent over the three axes
    pub fn max_dim(&self) -> f32 {
        let s = self.size();
        s.x.max(s.y).max(s.z)
    }

    /// Bounds of this box under an affine transform (all 8 corners)
    pub fn transformed(&self, matrix: &Mat4) -> Aabb {
        if self.is_empty() {
            return Self::EMPTY;
        }
        let mut out = Self::EMPTY;
        for i in 0..8 {
            let corner = Vec3::new(
                if i & 1 == 0 { self.min.x } else { self.max.x },
                if i & 2 == 0 { self.min.y } else { self.max.y },
                if i & 4 == 0 { self.min.z } else { self.max.z },
            );
            out.insert(matrix.transform_point3(corner));
        }
        out
    }
}

/// Build an orthonormal basis (tangent, bitangent, normal) from a
/// surface normal, using [`WORLD_UP`] as the primary reference.
///
/// When the normal is parallel to the up reference the cross product
/// degenerates; the fallback reference keeps the tangent finite.
/// Columns of the returned matrix are (tangent, bitangent, normal),
/// so it maps decal-local coordinates into the surface frame.
pub fn tangent_frame(normal: Vec3) -> Mat3 {
    let n = normal.normalize();
    let mut tangent = WORLD_UP.cross(n);
    if tangent.length_squared() < 1e-10 {
        tangent = FALLBACK_REFERENCE.cross(n);
    }
    let tangent = tangent.normalize();
    let bitangent = n.cross(tangent).normalize();
    Mat3::from_cols(tangent, bitangent, n)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_aabb() {
        let aabb = Aabb::EMPTY;
        assert!(aabb.is_empty());
        assert!(Aabb::from_points([]).is_empty());
    }

    #[test]
    fn test_insert_and_center() {
        let aabb = Aabb::from_points([Vec3::new(-1.0, 0.0, 2.0), Vec3::new(3.0, 4.0, 6.0)]);
        assert!(!aabb.is_empty());
        assert_eq!(aabb.center(), Vec3::new(1.0, 2.0, 4.0));
        assert_eq!(aabb.size(), Vec3::new(4.0, 4.0, 4.0));
        assert_eq!(aabb.max_dim(), 4.0);
    }

    #[test]
    fn test_union_with_empty() {
        let a = Aabb::from_points([Vec3::ZERO, Vec3::ONE]);
        assert_eq!(a.union(&Aabb::EMPTY), a);
        assert_eq!(Aabb::EMPTY.union(&a), a);
        assert!(Aabb::EMPTY.union(&Aabb::EMPTY).is_empty());
    }

    #[test]
    fn test_transformed_scales_and_translates() {
        let a = Aabb::from_points([Vec3::ZERO, Vec3::ONE]);
        let m = Mat4::from_translation(Vec3::new(0.0, 5.0, 0.0)) * Mat4::from_scale(Vec3::splat(2.0));
        let t = a.transformed(&m);
        assert_eq!(t.min, Vec3::new(0.0, 5.0, 0.0));
        assert_eq!(t.max, Vec3::new(2.0, 7.0, 2.0));
    }

    #[test]
    fn test_transformed_empty_stays_empty() {
        let m = Mat4::from_scale(Vec3::splat(3.0));
        assert!(Aabb::EMPTY.transformed(&m).is_empty());
    }

    fn assert_orthonormal(basis: Mat3) {
        let t = basis.x_axis;
        let b = basis.y_axis;
        let n = basis.z_axis;
        for v in [t, b, n] {
            assert!(v.is_finite());
            assert!((v.length() - 1.0).abs() < 1e-5, "non-unit axis {v:?}");
        }
        assert!(t.dot(b).abs() < 1e-5);
        assert!(t.dot(n).abs() < 1e-5);
        assert!(b.dot(n).abs() < 1e-5);
    }

    #[test]
    fn test_tangent_frame_general() {
        let basis = tangent_frame(Vec3::new(0.0, 0.0, 1.0));
        assert_orthonormal(basis);
        assert_eq!(basis.z_axis, Vec3::Z);
    }

    #[test]
    fn test_tangent_frame_degenerate_up() {
        // Normal parallel to the up reference: the fallback must keep
        // the basis finite and orthonormal.
        let basis = tangent_frame(Vec3::new(0.0, 1.0, 0.0));
        assert_orthonormal(basis);
        assert_eq!(basis.z_axis, Vec3::Y);
    }

    #[test]
    fn test_tangent_frame_degenerate_down() {
        let basis = tangent_frame(Vec3::new(0.0, -1.0, 0.0));
        assert_orthonormal(basis);
    }

    #[test]
    fn test_tangent_frame_unnormalized_input() {
        let basis = tangent_frame(Vec3::new(0.0, 0.0, 10.0));
        assert_orthonormal(basis);
        assert_eq!(basis.z_axis, Vec3::Z);
    }
}
