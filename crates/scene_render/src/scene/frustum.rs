//! Camera frustum wireframes
//!
//! Builds the line-list geometry the overview frame uses to show
//! where each rendered camera sat. Frustum nodes are appended after
//! all per-camera frames are written, so they never appear in the
//! per-camera output.

use crate::camera::CameraDescriptor;
use crate::render::{Material, Mesh, Vertex};
use crate::scene::container::{NodeKind, SceneNode};

/// Flat color used for frustum wireframes in the overview frame
pub const FRUSTUM_COLOR: [u8; 3] = [230, 60, 60];

/// Build a line-list mesh tracing the camera's view volume
///
/// Eight corners (four on the near plane, four on the far plane) and
/// twelve edges: the two plane rectangles plus the four connecting
/// edges. Corners are placed in world space from the camera's pose
/// and projection parameters.
pub fn make_camera_frustum(camera: &CameraDescriptor) -> Mesh {
    let forward = camera.direction.normalize();
    let right = forward.cross(&camera.up).normalize();
    let true_up = right.cross(&forward);

    let tan_half = (camera.fov * 0.5).tan();
    let origin = camera.position.coords;

    let mut vertices = Vec::with_capacity(8);
    for &distance in &[camera.near, camera.far] {
        let half_height = tan_half * distance;
        let half_width = half_height * camera.aspect;
        let center = origin + forward * distance;

        for &(sx, sy) in &[(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)] {
            let corner = center + right * (sx * half_width) + true_up * (sy * half_height);
            vertices.push(Vertex {
                position: [corner.x, corner.y, corner.z],
                normal: [0.0, 0.0, 0.0],
            });
        }
    }

    // Near rectangle, far rectangle, connecting edges.
    let indices = vec![
        0, 1, 1, 2, 2, 3, 3, 0, //
        4, 5, 5, 6, 6, 7, 7, 4, //
        0, 4, 1, 5, 2, 6, 3, 7,
    ];

    Mesh::lines(vertices, indices)
}

/// Build a frustum scene node for the camera at the given index
pub fn frustum_node(index: usize, camera: &CameraDescriptor) -> SceneNode {
    SceneNode::new(
        format!("frustum-{index}"),
        NodeKind::Frustum {
            mesh: make_camera_frustum(camera),
            material: Material::flat(FRUSTUM_COLOR),
        },
    )
}
