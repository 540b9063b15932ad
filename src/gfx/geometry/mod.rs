//! # Procedural Geometry Generation
//!
//! Generates the primitive shapes the scene is built from, so no model files
//! are needed. Everything is Y-up, centred on the origin, with outward normals,
//! counter-clockwise front faces and texture coordinates whose `v` axis points
//! down the image (row 0 of a texture is `v = 0`).
//!
//! ## Supported Primitives
//!
//! - **Box**: axis-aligned box with per-face UVs
//! - **Cone**: closed cone with a configurable number of sides
//! - **Plane**: subdivided plane in the XY plane facing +Z
//! - **Sphere**: UV sphere with configurable resolution
//!
//! ## Usage
//!
//! ```rust
//! use haunted_house::gfx::geometry::{generate_box, generate_cone, generate_sphere};
//!
//! let walls = generate_box(4.0, 2.5, 4.0);
//! let roof = generate_cone(3.5, 1.0, 4);
//! let bush = generate_sphere(1.0, 16, 16);
//! assert_eq!(walls.triangle_count(), 12);
//! # let _ = (roof, bush);
//! ```

pub mod primitives;

pub use primitives::*;

use crate::gfx::scene::vertex::Vertex3D;

/// Represents generated geometry data ready for GPU upload
#[derive(Debug, Clone, Default)]
pub struct GeometryData {
    /// Vertex positions (x, y, z)
    pub vertices: Vec<[f32; 3]>,
    /// Texture coordinates (u, v)
    pub tex_coords: Vec<[f32; 2]>,
    /// Normal vectors (x, y, z)
    pub normals: Vec<[f32; 3]>,
    /// Triangle indices (counter-clockwise winding)
    pub indices: Vec<u32>,
}

impl GeometryData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Appends one vertex and returns its index
    pub(crate) fn push_vertex(&mut self, position: [f32; 3], normal: [f32; 3], uv: [f32; 2]) -> u32 {
        let index = self.vertices.len() as u32;
        self.vertices.push(position);
        self.normals.push(normal);
        self.tex_coords.push(uv);
        index
    }

    /// Interleaves the attribute streams into the renderer's vertex format
    pub fn to_vertices(&self) -> Vec<Vertex3D> {
        self.vertices
            .iter()
            .enumerate()
            .map(|(i, &position)| Vertex3D {
                position,
                normal: self.normals.get(i).copied().unwrap_or([0.0, 1.0, 0.0]),
                tex_coords: self.tex_coords.get(i).copied().unwrap_or([0.0, 0.0]),
            })
            .collect()
    }
}
