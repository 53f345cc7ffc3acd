//! Scene container and assembly
//!
//! A [`SceneContainer`] is the single mutable scene owned by the
//! pipeline for the process lifetime: a flat list of renderable nodes
//! under one world transform, plus the world bounding box computed at
//! assembly time. The [`SceneAssembler`] wraps a resolved asset into a
//! canonical container; frustum wireframes for the overview frame are
//! produced by [`frustum::make_camera_frustum`].

pub mod assembler;
pub mod bounds;
pub mod container;
pub mod frustum;

pub use assembler::SceneAssembler;
pub use bounds::Aabb;
pub use container::{Light, NodeIdentity, NodeKey, NodeKind, SceneContainer, SceneNode};
