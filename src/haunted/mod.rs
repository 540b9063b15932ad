//! # Haunted house scene
//!
//! Scene content on top of the [`gfx`](crate::gfx) engine:
//!
//! - [`composer`] - builds the static scene once at startup
//! - [`graves`] - random grave placement around the house
//! - [`ghosts`] - per-frame ghost light paths
//! - [`debug_panel`] - ImGui controls for the ambient and moon lights

pub mod composer;
pub mod debug_panel;
pub mod ghosts;
pub mod graves;

pub use composer::{compose, HauntedScene};
pub use debug_panel::DebugPanel;
pub use ghosts::{advance, GhostFrame, GhostRig};
pub use graves::{generate_grave_field, GraveFieldParams, GravePlacement};
