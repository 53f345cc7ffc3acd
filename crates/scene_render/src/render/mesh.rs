//! Mesh geometry

use crate::foundation::math::{Point3, Vec3};

/// A single mesh vertex
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    /// Position in model space
    pub position: [f32; 3],

    /// Surface normal
    pub normal: [f32; 3],
}

/// How the index list is interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MeshTopology {
    /// Indices form triangles (3 per primitive)
    #[default]
    Triangles,

    /// Indices form line segments (2 per primitive); used for camera
    /// frustum wireframes in the overview frame
    Lines,
}

/// Indexed mesh geometry in model space
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Mesh {
    /// Vertex data
    pub vertices: Vec<Vertex>,

    /// Primitive indices into `vertices`
    pub indices: Vec<u32>,

    /// Primitive interpretation of the index list
    pub topology: MeshTopology,
}

impl Mesh {
    /// Create a triangle mesh from vertices and indices
    pub fn new(vertices: Vec<Vertex>, indices: Vec<u32>) -> Self {
        Self {
            vertices,
            indices,
            topology: MeshTopology::Triangles,
        }
    }

    /// Create a line-list mesh from vertices and segment indices
    pub fn lines(vertices: Vec<Vertex>, indices: Vec<u32>) -> Self {
        Self {
            vertices,
            indices,
            topology: MeshTopology::Lines,
        }
    }

    /// Number of primitives in the mesh
    pub fn primitive_count(&self) -> usize {
        match self.topology {
            MeshTopology::Triangles => self.indices.len() / 3,
            MeshTopology::Lines => self.indices.len() / 2,
        }
    }

    /// Iterate over vertex positions as points
    pub fn positions(&self) -> impl Iterator<Item = Point3> + '_ {
        self.vertices
            .iter()
            .map(|v| Point3::new(v.position[0], v.position[1], v.position[2]))
    }

    /// Axis-aligned unit-ish cube centered at the origin
    ///
    /// Used by tests and as placeholder geometry; `half_extent` is the
    /// distance from center to each face.
    pub fn cube(half_extent: f32) -> Self {
        let h = half_extent;
        let corners = [
            [-h, -h, -h],
            [h, -h, -h],
            [h, h, -h],
            [-h, h, -h],
            [-h, -h, h],
            [h, -h, h],
            [h, h, h],
            [-h, h, h],
        ];
        // (face normal, corner indices), two triangles per face
        let faces: [(Vec3, [usize; 4]); 6] = [
            (-Vec3::z(), [0, 1, 2, 3]),
            (Vec3::z(), [5, 4, 7, 6]),
            (-Vec3::x(), [4, 0, 3, 7]),
            (Vec3::x(), [1, 5, 6, 2]),
            (-Vec3::y(), [4, 5, 1, 0]),
            (Vec3::y(), [3, 2, 6, 7]),
        ];

        let mut vertices = Vec::with_capacity(24);
        let mut indices = Vec::with_capacity(36);
        for (normal, quad) in &faces {
            let base = vertices.len() as u32;
            for &corner in quad {
                vertices.push(Vertex {
                    position: corners[corner],
                    normal: [normal.x, normal.y, normal.z],
                });
            }
            indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
        }
        Self::new(vertices, indices)
    }
}
