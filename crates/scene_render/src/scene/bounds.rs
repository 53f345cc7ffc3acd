//! Axis-aligned bounding boxes

use crate::foundation::math::{Mat4, Point3, Vec3};

/// Axis-Aligned Bounding Box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    /// Minimum corner of the bounding box
    pub min: Point3,

    /// Maximum corner of the bounding box
    pub max: Point3,
}

impl Aabb {
    /// Create a new AABB from min and max points
    pub fn new(min: Point3, max: Point3) -> Self {
        Self { min, max }
    }

    /// Tight box over a set of points; `None` when the set is empty
    pub fn from_points(points: impl IntoIterator<Item = Point3>) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let mut aabb = Self::new(first, first);
        for p in iter {
            aabb.grow(p);
        }
        Some(aabb)
    }

    /// Expand the box to contain a point
    pub fn grow(&mut self, p: Point3) {
        self.min = Point3::new(
            self.min.x.min(p.x),
            self.min.y.min(p.y),
            self.min.z.min(p.z),
        );
        self.max = Point3::new(
            self.max.x.max(p.x),
            self.max.y.max(p.y),
            self.max.z.max(p.z),
        );
    }

    /// Expand the box to contain another box
    pub fn union(&mut self, other: &Aabb) {
        self.grow(other.min);
        self.grow(other.max);
    }

    /// Get the center of the AABB
    pub fn center(&self) -> Point3 {
        Point3::from((self.min.coords + self.max.coords) * 0.5)
    }

    /// Edge lengths along each axis
    pub fn dimensions(&self) -> Vec3 {
        self.max - self.min
    }

    /// Radius of the bounding sphere around the box center
    pub fn radius(&self) -> f32 {
        self.dimensions().norm() * 0.5
    }

    /// Box containing this box under an affine transform
    ///
    /// Transforms all eight corners, so the result stays conservative
    /// under rotation.
    pub fn transformed(&self, matrix: &Mat4) -> Self {
        let corners = [
            Point3::new(self.min.x, self.min.y, self.min.z),
            Point3::new(self.max.x, self.min.y, self.min.z),
            Point3::new(self.min.x, self.max.y, self.min.z),
            Point3::new(self.max.x, self.max.y, self.min.z),
            Point3::new(self.min.x, self.min.y, self.max.z),
            Point3::new(self.max.x, self.min.y, self.max.z),
            Point3::new(self.min.x, self.max.y, self.max.z),
            Point3::new(self.max.x, self.max.y, self.max.z),
        ];
        // Unwrap is fine: eight corners are never empty.
        Self::from_points(corners.iter().map(|c| matrix.transform_point(c))).unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_from_points_and_dimensions() {
        let aabb = Aabb::from_points(vec![
            Point3::new(-1.0, 0.0, 2.0),
            Point3::new(3.0, -2.0, 5.0),
            Point3::new(0.0, 1.0, 3.0),
        ])
        .unwrap();

        assert_eq!(aabb.min, Point3::new(-1.0, -2.0, 2.0));
        assert_eq!(aabb.max, Point3::new(3.0, 1.0, 5.0));
        assert_eq!(aabb.dimensions(), Vec3::new(4.0, 3.0, 3.0));
    }

    #[test]
    fn test_from_points_empty() {
        assert!(Aabb::from_points(std::iter::empty()).is_none());
    }

    #[test]
    fn test_center() {
        let aabb = Aabb::new(Point3::new(0.0, 0.0, 0.0), Point3::new(2.0, 4.0, 6.0));
        assert_eq!(aabb.center(), Point3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn test_transformed_translation() {
        let aabb = Aabb::new(Point3::new(-1.0, -1.0, -1.0), Point3::new(1.0, 1.0, 1.0));
        let moved = aabb.transformed(&Mat4::new_translation(&Vec3::new(5.0, 0.0, 0.0)));

        assert_relative_eq!(moved.min, Point3::new(4.0, -1.0, -1.0));
        assert_relative_eq!(moved.max, Point3::new(6.0, 1.0, 1.0));
    }

    #[test]
    fn test_transformed_rotation_stays_conservative() {
        let aabb = Aabb::new(Point3::new(-1.0, -1.0, -1.0), Point3::new(1.0, 1.0, 1.0));
        let rotation = nalgebra::Rotation3::from_euler_angles(0.0, std::f32::consts::FRAC_PI_4, 0.0)
            .to_homogeneous();
        let rotated = aabb.transformed(&rotation);

        // A rotated unit cube's box grows to sqrt(2) along the rotated axes.
        assert_relative_eq!(rotated.max.x, 2.0f32.sqrt(), epsilon = 1e-5);
        assert_relative_eq!(rotated.max.z, 2.0f32.sqrt(), epsilon = 1e-5);
    }
}
