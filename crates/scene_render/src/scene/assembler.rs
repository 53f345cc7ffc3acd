//! Scene assembly
//!
//! Wraps a resolved asset into a canonical [`SceneContainer`]. The
//! assembly order matters: compaction removes dangling model
//! references first, then the default light and camera placeholder
//! nodes go in, then world transforms propagate, and only then is the
//! world bounding box computed (light and camera nodes are ignored by
//! the box, but node insertion order affects matrix propagation).

use crate::assets::{Asset, AssetError, ModelInstance};
use crate::foundation::math::Transform;
use crate::scene::{
    container::{Light, NodeIdentity, NodeKind, SceneNode},
    SceneContainer,
};

/// Assembles resolved assets into scene containers
pub struct SceneAssembler;

impl SceneAssembler {
    /// Wrap a resolved asset into a scene container
    ///
    /// A full scene asset maps node-per-instance; a single object
    /// asset synthesizes a container holding just that object, with
    /// the object's source metadata copied onto the container.
    pub fn assemble(asset: Asset) -> Result<SceneContainer, AssetError> {
        let (info, transform, instances) = match asset {
            Asset::Scene(scene) => (scene.info, scene.transform, scene.instances),
            Asset::Object { info, instance } => (info, Transform::identity(), vec![*instance]),
        };

        let mut scene = SceneContainer::new(info);
        scene.set_world_transform(transform.to_matrix());
        for instance in instances {
            scene.insert(node_from_instance(instance));
        }

        let removed = scene.compactify();
        if removed > 0 {
            log::warn!(
                "Compacted {} unresolved node(s) out of {}",
                removed,
                scene.info.full_id
            );
        }

        scene.insert(SceneNode::new(
            "default-light",
            NodeKind::Light(Light::default_hemisphere()),
        ));
        scene.insert(SceneNode::new("default-camera", NodeKind::CameraPlaceholder));

        scene.update_world_transforms();
        scene.compute_bounds();

        Ok(scene)
    }
}

fn node_from_instance(instance: ModelInstance) -> SceneNode {
    let identity = NodeIdentity {
        instance_id: instance.instance_id.clone(),
        model_id: instance.model_id,
        categories: instance.categories,
        type_tag: instance.type_tag,
    };

    let kind = match instance.mesh {
        Some(mesh) => NodeKind::Object {
            mesh,
            material: instance.material,
            identity,
        },
        None => NodeKind::Unresolved { identity },
    };

    SceneNode::with_transform(instance.instance_id, instance.transform, kind)
}
