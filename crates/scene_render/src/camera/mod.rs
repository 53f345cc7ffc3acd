//! Camera ingestion
//!
//! Parses externally supplied camera-pose files into camera
//! descriptors and transforms them into scene space. One record per
//! line, whitespace separated:
//!
//! ```text
//! px py pz  dx dy dz  ux uy uz  [fov]
//! ```
//!
//! Position, view direction, up vector, and an optional vertical field
//! of view in radians. Malformed records fail with the offending
//! 1-based line number.

use thiserror::Error;

use crate::foundation::math::{utils, Mat4, Mat4Ext, Point3, Vec3};

/// Default vertical field of view (50 degrees) when a record omits it
pub const DEFAULT_FOV_DEG: f32 = 50.0;

/// Default near clip distance for parsed cameras
pub const DEFAULT_NEAR: f32 = 10.0;

/// Default far clip distance for parsed cameras
pub const DEFAULT_FAR: f32 = 40000.0;

/// Camera record parse failure, pointing at the offending line
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("malformed camera record at line {line}: {reason}")]
pub struct ParseError {
    /// 1-based line number of the malformed record
    pub line: usize,

    /// What was wrong with the record
    pub reason: String,
}

/// A single camera pose with its optics
///
/// Immutable after parse except for the one world-transform
/// application performed by [`CameraSet::apply_transform`].
#[derive(Debug, Clone, PartialEq)]
pub struct CameraDescriptor {
    /// Camera position in world space
    pub position: Point3,

    /// View direction (normalized)
    pub direction: Vec3,

    /// Up vector (normalized)
    pub up: Vec3,

    /// Vertical field of view in radians
    pub fov: f32,

    /// Aspect ratio (width / height)
    pub aspect: f32,

    /// Near clip distance
    pub near: f32,

    /// Far clip distance
    pub far: f32,
}

impl CameraDescriptor {
    /// Default camera for the overview frame: 50 degree fov, matching
    /// the historical tool defaults
    pub fn default_with_aspect(aspect: f32) -> Self {
        Self {
            position: Point3::origin(),
            direction: -Vec3::z(),
            up: Vec3::y(),
            fov: utils::deg_to_rad(DEFAULT_FOV_DEG),
            aspect,
            near: DEFAULT_NEAR,
            far: DEFAULT_FAR,
        }
    }

    /// World-to-view matrix for this pose
    pub fn view_matrix(&self) -> Mat4 {
        let eye = self.position.coords;
        Mat4::look_at(eye, eye + self.direction, self.up)
    }

    /// Projection matrix for this camera's optics
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective(self.fov, self.aspect, self.near, self.far)
    }

    /// Apply an affine transform to the pose, in place
    ///
    /// The position transforms as a point, direction and up as vectors
    /// (renormalized afterwards).
    pub fn apply_transform(&mut self, matrix: &Mat4) {
        self.position = matrix.transform_point(&self.position);
        self.direction = matrix.transform_vector(&self.direction).normalize();
        self.up = matrix.transform_vector(&self.up).normalize();
    }
}

/// An ordered set of camera descriptors parsed from a camera file
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CameraSet {
    descriptors: Vec<CameraDescriptor>,
}

impl CameraSet {
    /// Parse a camera file's contents
    ///
    /// Blank lines are skipped but still count toward the reported
    /// line numbers. Records appear in the returned set in file order.
    pub fn parse(text: &str, aspect: f32) -> Result<Self, ParseError> {
        let mut descriptors = Vec::new();
        for (index, line) in text.lines().enumerate() {
            let line_no = index + 1;
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            descriptors.push(Self::parse_record(trimmed, line_no, aspect)?);
        }
        Ok(Self { descriptors })
    }

    fn parse_record(record: &str, line: usize, aspect: f32) -> Result<CameraDescriptor, ParseError> {
        let fields: Vec<f32> = record
            .split_whitespace()
            .map(str::parse)
            .collect::<Result<_, _>>()
            .map_err(|e| ParseError {
                line,
                reason: format!("non-numeric field: {e}"),
            })?;

        if fields.len() != 9 && fields.len() != 10 {
            return Err(ParseError {
                line,
                reason: format!("expected 9 or 10 fields, found {}", fields.len()),
            });
        }

        let direction = Vec3::new(fields[3], fields[4], fields[5]);
        let up = Vec3::new(fields[6], fields[7], fields[8]);
        if direction.norm() == 0.0 || up.norm() == 0.0 {
            return Err(ParseError {
                line,
                reason: "zero-length direction or up vector".to_string(),
            });
        }

        Ok(CameraDescriptor {
            position: Point3::new(fields[0], fields[1], fields[2]),
            direction: direction.normalize(),
            up: up.normalize(),
            fov: fields
                .get(9)
                .copied()
                .unwrap_or_else(|| utils::deg_to_rad(DEFAULT_FOV_DEG)),
            aspect,
            near: DEFAULT_NEAR,
            far: DEFAULT_FAR,
        })
    }

    /// Number of cameras in the set
    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    /// Whether the set is empty
    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// The descriptors, in file order
    pub fn cameras(&self) -> &[CameraDescriptor] {
        &self.descriptors
    }

    /// Apply the scene's world transform to every descriptor, in place,
    /// preserving order
    ///
    /// Caller contract: invoke exactly once per set, after scene
    /// assembly has produced the authoritative world matrix. Applying
    /// it twice silently double-transforms the cameras; this is not
    /// re-validated here.
    pub fn apply_transform(&mut self, matrix: &Mat4) {
        for descriptor in &mut self.descriptors {
            descriptor.apply_transform(matrix);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const TWO_CAMERAS: &str = "\
0 0 5  0 0 -1  0 1 0  0.8
1 2 3  1 0 0  0 1 0
";

    #[test]
    fn test_parse_yields_records_in_file_order() {
        let set = CameraSet::parse(TWO_CAMERAS, 4.0 / 3.0).unwrap();
        assert_eq!(set.len(), 2);
        assert_eq!(set.cameras()[0].position, Point3::new(0.0, 0.0, 5.0));
        assert_eq!(set.cameras()[1].position, Point3::new(1.0, 2.0, 3.0));
        assert_relative_eq!(set.cameras()[0].fov, 0.8);
    }

    #[test]
    fn test_parse_is_deterministic() {
        let a = CameraSet::parse(TWO_CAMERAS, 1.5).unwrap();
        let b = CameraSet::parse(TWO_CAMERAS, 1.5).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_parse_defaults_fov_when_absent() {
        let set = CameraSet::parse("0 0 0  0 0 -1  0 1 0", 1.0).unwrap();
        assert_relative_eq!(set.cameras()[0].fov, utils::deg_to_rad(DEFAULT_FOV_DEG));
    }

    #[test]
    fn test_parse_reports_offending_line() {
        let err = CameraSet::parse("0 0 0  0 0 -1  0 1 0\n\n0 0 nope  0 0 -1  0 1 0", 1.0)
            .unwrap_err();
        assert_eq!(err.line, 3);
    }

    #[test]
    fn test_parse_rejects_wrong_arity() {
        let err = CameraSet::parse("1 2 3 4", 1.0).unwrap_err();
        assert_eq!(err.line, 1);
        assert!(err.reason.contains("expected 9 or 10 fields"));
    }

    #[test]
    fn test_parse_rejects_degenerate_vectors() {
        let err = CameraSet::parse("0 0 0  0 0 0  0 1 0", 1.0).unwrap_err();
        assert_eq!(err.line, 1);
    }

    #[test]
    fn test_apply_transform_round_trip() {
        let mut set = CameraSet::parse(TWO_CAMERAS, 1.0).unwrap();
        let original = set.clone();

        let rotation = nalgebra::Rotation3::from_euler_angles(0.3, 0.7, -0.2).to_homogeneous();
        let matrix = Mat4::new_translation(&Vec3::new(10.0, -4.0, 2.5)) * rotation;
        let inverse = matrix.try_inverse().unwrap();

        set.apply_transform(&matrix);
        set.apply_transform(&inverse);

        for (restored, expected) in set.cameras().iter().zip(original.cameras()) {
            assert_relative_eq!(restored.position, expected.position, epsilon = 1e-4);
            assert_relative_eq!(restored.direction, expected.direction, epsilon = 1e-4);
            assert_relative_eq!(restored.up, expected.up, epsilon = 1e-4);
        }
    }

    #[test]
    fn test_view_matrix_centers_on_position() {
        let set = CameraSet::parse("0 0 5  0 0 -1  0 1 0", 1.0).unwrap();
        let view = set.cameras()[0].view_matrix();
        let mapped = view.transform_point(&Point3::new(0.0, 0.0, 5.0));
        assert_relative_eq!(mapped, Point3::origin(), epsilon = 1e-5);
    }
}
