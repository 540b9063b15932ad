//! Error types for the haunted house application
//!
//! Startup failures are fatal and bubble up to `main`. Asset failures are
//! reported per texture and never stop the render loop.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while bringing up or running the application
#[derive(Debug, Error)]
pub enum HauntError {
    #[error("failed to create event loop: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),

    #[error("failed to create window: {0}")]
    Window(#[from] winit::error::OsError),

    #[error("failed to create rendering surface: {0}")]
    Surface(#[from] wgpu::CreateSurfaceError),

    #[error("no compatible GPU adapter: {0}")]
    Adapter(#[from] wgpu::RequestAdapterError),

    #[error("failed to open GPU device: {0}")]
    Device(#[from] wgpu::RequestDeviceError),

    #[error("surface reports no supported texture formats")]
    NoSurfaceFormat,

    #[error("GPU ran out of memory while acquiring a frame")]
    OutOfMemory,
}

/// Errors raised while loading a texture from disk
#[derive(Debug, Error)]
pub enum AssetError {
    #[error("failed to decode {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("texture loader thread unavailable: {0}")]
    Worker(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, HauntError>;
