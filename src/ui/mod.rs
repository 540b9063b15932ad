//! # User Interface Module
//!
//! Dear ImGui overlay used for the light tuning panel.
//!
//! [`UiManager`] owns the imgui context and its winit/wgpu glue. The panel
//! contents live with the scene code in [`crate::haunted::debug_panel`].
//!
//! When the pointer is over a UI window the host withholds mouse input from
//! the orbit camera.

pub mod manager;

pub use manager::UiManager;
