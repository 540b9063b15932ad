//! Haunted House
//!
//! A night scene rendered with wgpu and winit: a textured house on a grass
//! plane, a random grave field, fog, and three ghost lights circling the
//! house. Built on a small retained-mode engine in [`gfx`].

pub mod app;
pub mod clock;
pub mod config;
pub mod error;
pub mod gfx;
pub mod haunted;
pub mod ui;
pub mod wgpu_utils;

pub use app::{AppContext, HauntedApp};
pub use config::AppConfig;
pub use error::{AssetError, HauntError};

/// Loads the configuration and runs the haunted house until the window closes
pub fn run() -> anyhow::Result<()> {
    use anyhow::Context;

    let config = AppConfig::load()?;
    log::info!(
        "Starting '{}' with assets from {}",
        config.title,
        config.asset_root.display()
    );

    let app = HauntedApp::new(config).context("initialise application")?;
    app.run().context("run event loop")
}
