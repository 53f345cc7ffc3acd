//! Scene container: the node arena owned by the render pipeline

use slotmap::SlotMap;

use crate::assets::AssetInfo;
use crate::foundation::math::{Mat4, Transform, Vec3};
use crate::render::{Material, Mesh};
use crate::scene::Aabb;

slotmap::new_key_type! {
    /// Stable key for a scene node
    pub struct NodeKey;
}

/// Semantic identity of a renderable node
///
/// The index allocator resolves a node's identity in this order:
/// model-backed instances expose their category set, other nodes a
/// lower-cased type tag; in encode-index mode the unique instance id
/// is used instead.
#[derive(Debug, Clone, Default)]
pub struct NodeIdentity {
    /// Unique id of the placed instance
    pub instance_id: String,

    /// Reusable model id, when model-backed
    pub model_id: Option<String>,

    /// Semantic category labels
    pub categories: Vec<String>,

    /// Free-form type tag for non-model nodes
    pub type_tag: Option<String>,
}

impl NodeIdentity {
    /// Category-level identity: first category of a model-backed
    /// instance, else the lower-cased type tag
    pub fn category_identity(&self) -> Option<String> {
        if self.model_id.is_some() {
            self.categories.first().map(|c| c.to_lowercase())
        } else {
            self.type_tag.as_ref().map(|t| t.to_lowercase())
        }
    }
}

/// Hemisphere-style scene light
#[derive(Debug, Clone)]
pub struct Light {
    /// Direction the light points (normalized)
    pub direction: Vec3,

    /// Color from above
    pub sky_color: [f32; 3],

    /// Color from below
    pub ground_color: [f32; 3],
}

impl Light {
    /// The default hemisphere light added during assembly
    pub fn default_hemisphere() -> Self {
        Self {
            direction: Vec3::new(0.0, -1.0, 0.0),
            sky_color: [1.0, 1.0, 1.0],
            ground_color: [0.4, 0.4, 0.4],
        }
    }
}

/// What a scene node is
#[derive(Debug, Clone)]
pub enum NodeKind {
    /// Renderable geometry with its material and semantic identity
    Object {
        /// Geometry in node-local space
        mesh: Mesh,
        /// Surface material (mutated in place by the index allocator)
        material: Material,
        /// Semantic identity
        identity: NodeIdentity,
    },

    /// A scene light; ignored by bounding-box computation
    Light(Light),

    /// Default camera placeholder; ignored by bounding-box computation
    CameraPlaceholder,

    /// Camera frustum wireframe, added for the overview frame only
    Frustum {
        /// Wireframe line geometry
        mesh: Mesh,
        /// Flat line color
        material: Material,
    },

    /// Placeholder for an instance whose model failed to resolve;
    /// removed by compaction before any bounding-box math
    Unresolved {
        /// Identity of the dangling instance
        identity: NodeIdentity,
    },
}

/// A node in the scene
#[derive(Debug, Clone)]
pub struct SceneNode {
    /// Display name, used in diagnostics
    pub name: String,

    /// Placement relative to the scene
    pub local_transform: Transform,

    /// Cached world transform, valid after
    /// [`SceneContainer::update_world_transforms`]
    pub world_transform: Mat4,

    /// Node payload
    pub kind: NodeKind,
}

impl SceneNode {
    /// Create a node at the scene origin
    pub fn new(name: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            name: name.into(),
            local_transform: Transform::identity(),
            world_transform: Mat4::identity(),
            kind,
        }
    }

    /// Create a node with a placement transform
    pub fn with_transform(name: impl Into<String>, transform: Transform, kind: NodeKind) -> Self {
        Self {
            name: name.into(),
            local_transform: transform,
            world_transform: Mat4::identity(),
            kind,
        }
    }
}

/// The single scene owned and mutated by the render pipeline
///
/// Nodes live in a slotmap arena; a separate order list preserves
/// insertion order, which is what makes index allocation and render
/// walks deterministic.
pub struct SceneContainer {
    nodes: SlotMap<NodeKey, SceneNode>,
    order: Vec<NodeKey>,

    /// Source metadata of the asset this scene was assembled from
    pub info: AssetInfo,

    world_transform: Mat4,
    bounds: Option<Aabb>,
}

impl SceneContainer {
    /// Create an empty container for the given asset
    pub fn new(info: AssetInfo) -> Self {
        Self {
            nodes: SlotMap::with_key(),
            order: Vec::new(),
            info,
            world_transform: Mat4::identity(),
            bounds: None,
        }
    }

    /// Insert a node at the end of the walk order
    pub fn insert(&mut self, node: SceneNode) -> NodeKey {
        let key = self.nodes.insert(node);
        self.order.push(key);
        key
    }

    /// Remove a node
    pub fn remove(&mut self, key: NodeKey) -> Option<SceneNode> {
        self.order.retain(|k| *k != key);
        self.nodes.remove(key)
    }

    /// Number of nodes
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Whether the container has no nodes
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// The scene's world transform
    pub fn world_transform(&self) -> &Mat4 {
        &self.world_transform
    }

    /// Set the scene's world transform
    pub fn set_world_transform(&mut self, matrix: Mat4) {
        self.world_transform = matrix;
    }

    /// Iterate nodes in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (NodeKey, &SceneNode)> + '_ {
        self.order.iter().map(move |k| (*k, &self.nodes[*k]))
    }

    /// Visit every renderable object mutably, in insertion order
    ///
    /// Slotmap's own `iter_mut` does not preserve insertion order, so
    /// the walk goes through the order list.
    pub fn for_each_object_mut<F>(&mut self, mut f: F)
    where
        F: FnMut(&NodeIdentity, &mut Material),
    {
        for key in &self.order {
            if let Some(node) = self.nodes.get_mut(*key) {
                if let NodeKind::Object {
                    identity, material, ..
                } = &mut node.kind
                {
                    f(identity, material);
                }
            }
        }
    }

    /// Remove every node whose model reference failed to resolve
    ///
    /// Returns the number of nodes removed. Must run before bounding
    /// box computation: a box over unresolved nodes would be
    /// undefined.
    pub fn compactify(&mut self) -> usize {
        let dangling: Vec<NodeKey> = self
            .iter()
            .filter(|(_, node)| matches!(node.kind, NodeKind::Unresolved { .. }))
            .map(|(key, _)| key)
            .collect();
        for key in &dangling {
            if let Some(node) = self.nodes.get(*key) {
                log::warn!("Removing unresolved node {:?}", node.name);
            }
            self.remove(*key);
        }
        dangling.len()
    }

    /// Recompute every node's cached world transform
    pub fn update_world_transforms(&mut self) {
        let world = self.world_transform;
        for key in &self.order {
            let node = &mut self.nodes[*key];
            node.world_transform = world * node.local_transform.to_matrix();
        }
    }

    /// Recompute the world bounding box over renderable geometry
    ///
    /// Light, camera, and frustum nodes are ignored. Call strictly
    /// after compaction and after world transforms are up to date.
    pub fn compute_bounds(&mut self) {
        let mut bounds: Option<Aabb> = None;
        for (_, node) in self.iter() {
            let NodeKind::Object { mesh, .. } = &node.kind else {
                continue;
            };
            let Some(local) = Aabb::from_points(mesh.positions()) else {
                continue;
            };
            let world = local.transformed(&node.world_transform);
            match &mut bounds {
                Some(b) => b.union(&world),
                None => bounds = Some(world),
            }
        }
        self.bounds = bounds;
    }

    /// The world bounding box, if the scene has renderable geometry
    pub fn bounds(&self) -> Option<&Aabb> {
        self.bounds.as_ref()
    }

    /// Number of frustum wireframe nodes currently in the scene
    pub fn frustum_count(&self) -> usize {
        self.iter()
            .filter(|(_, node)| matches!(node.kind, NodeKind::Frustum { .. }))
            .count()
    }

    /// The first light node, if any
    pub fn light(&self) -> Option<&Light> {
        self.iter().find_map(|(_, node)| match &node.kind {
            NodeKind::Light(light) => Some(light),
            _ => None,
        })
    }

    /// Texture paths still waiting to be loaded, with their node keys
    pub fn pending_textures(&self) -> Vec<(NodeKey, std::path::PathBuf)> {
        self.iter()
            .filter_map(|(key, node)| match &node.kind {
                NodeKind::Object { material, .. } if material.texture_pending() => material
                    .texture_path
                    .clone()
                    .map(|path| (key, path)),
                _ => None,
            })
            .collect()
    }

    /// Store a loaded texture on a node's material
    pub fn set_texture(&mut self, key: NodeKey, texture: crate::assets::ImageData) {
        if let Some(node) = self.nodes.get_mut(key) {
            if let NodeKind::Object { material, .. } = &mut node.kind {
                material.texture = Some(texture);
            }
        }
    }
}
