//! # Scene Management Module
//!
//! Retained scene graph for the renderer. Geometry, materials and textures are
//! stored once and referenced by handle, so many objects can share them while
//! each keeps its own [`Transform`].
//!
//! ## Key Components
//!
//! - [`Scene`] - container for meshes, objects, groups, lights, fog and camera
//! - [`SceneObject`] - a drawable: geometry handle, material name, transform, shadow flags
//! - [`Group`] - transform node parenting objects and lights
//! - [`Vertex3D`] - GPU vertex with position, normal and texture coordinates

pub mod object;
pub mod scene;
pub mod transform;
pub mod vertex;

pub use object::{DrawMesh, Mesh, ObjectUniform, SceneObject};
pub use scene::{Group, Scene, SceneStatistics};
pub use transform::Transform;
pub use vertex::Vertex3D;

/// Handle to a mesh stored in [`Scene::meshes`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GeometryId(pub usize);

/// Handle to an object stored in [`Scene::objects`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjectId(pub usize);

/// Handle to a group stored in [`Scene::groups`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GroupId(pub usize);

/// Handle to a light stored in [`Scene::lights`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LightId(pub usize);
