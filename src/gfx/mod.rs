//! # Graphics Module
//!
//! Everything needed to put the haunted house on screen: the orbit camera,
//! a retained scene graph, procedural geometry, lights with shadow maps,
//! materials backed by asynchronously loaded textures, and the wgpu render
//! engine that draws it all.
//!
//! - **Camera** ([`camera`]) - damped orbit controls and viewport sizing
//! - **Scene** ([`scene`]) - objects, groups, lights and fog
//! - **Resources** ([`resources`]) - materials, textures and global uniforms
//! - **Rendering** ([`rendering`]) - pipelines, shadow passes and the frame loop

pub mod camera;
pub mod color;
pub mod geometry;
pub mod lights;
pub mod rendering;
pub mod resources;
pub mod scene;

pub use camera::orbit_camera::OrbitCamera;
pub use color::Color;
pub use rendering::render_engine::RenderEngine;
