//! GPU resource management
//!
//! Materials, textures and the global uniform shared by every pipeline.

pub mod global_bindings;
pub mod material;
pub mod texture_library;
pub mod texture_loader;
pub mod texture_resource;

pub use global_bindings::{GlobalBindings, GlobalUBO, GlobalUniform};
pub use material::{Material, MaterialManager, Side, TextureMaps};
pub use texture_library::{ColorSpace, TextureId, TextureLibrary};
pub use texture_loader::{ImageData, TextureLoader};
pub use texture_resource::TextureResource;
