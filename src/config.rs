//! Application configuration
//!
//! Loaded from an optional TOML file (`HAUNT_CONFIG`, default `haunted.toml`).
//! A missing file means defaults. Environment variables override the file.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

const DEFAULT_CONFIG_FILE: &str = "haunted.toml";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Window title
    pub title: String,
    /// Initial logical window width
    pub width: u32,
    /// Initial logical window height
    pub height: u32,
    /// Static file root the texture paths are resolved against
    pub asset_root: PathBuf,
    /// Fixed seed for the grave field; `None` draws a fresh layout every run
    pub grave_seed: Option<u64>,
    /// Synchronise presentation with the display refresh
    pub vsync: bool,
    /// Show the light tuning panel
    pub show_debug_panel: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            title: "Haunted House".to_string(),
            width: 1280,
            height: 800,
            asset_root: PathBuf::from("static"),
            grave_seed: None,
            vsync: true,
            show_debug_panel: true,
        }
    }
}

impl AppConfig {
    /// Loads the configuration file named by `HAUNT_CONFIG` (or `haunted.toml`)
    /// and applies environment overrides
    pub fn load() -> Result<Self> {
        let path = std::env::var_os("HAUNT_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));

        let mut config = if path.is_file() {
            Self::load_from(&path)?
        } else {
            log::debug!("No config file at {}, using defaults", path.display());
            Self::default()
        };

        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Reads and parses a TOML configuration file
    pub fn load_from(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read {}", path.display()))?;
        Self::from_toml_str(&text).with_context(|| format!("parse {}", path.display()))
    }

    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).context("parse haunted house TOML")
    }

    /// Applies `HAUNT_*` overrides looked up through `lookup`
    ///
    /// Values that fail to parse are ignored with a warning.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(root) = lookup("HAUNT_ASSET_ROOT") {
            self.asset_root = PathBuf::from(root);
        }
        if let Some(seed) = lookup("HAUNT_SEED") {
            match seed.parse() {
                Ok(seed) => self.grave_seed = Some(seed),
                Err(_) => log::warn!("Ignoring HAUNT_SEED={seed:?}: not an unsigned integer"),
            }
        }
        if let Some(vsync) = lookup("HAUNT_VSYNC") {
            match vsync.parse() {
                Ok(vsync) => self.vsync = vsync,
                Err(_) => log::warn!("Ignoring HAUNT_VSYNC={vsync:?}: expected true or false"),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn partial_file_keeps_defaults() {
        let config = AppConfig::from_toml_str("width = 640\ngrave_seed = 7\n").unwrap();
        assert_eq!(config.width, 640);
        assert_eq!(config.height, 800);
        assert_eq!(config.grave_seed, Some(7));
        assert_eq!(config.asset_root, PathBuf::from("static"));
    }

    #[test]
    fn rejects_wrong_types() {
        assert!(AppConfig::from_toml_str("width = \"wide\"").is_err());
    }

    #[test]
    fn environment_overrides_file_values() {
        let env: HashMap<&str, &str> = [
            ("HAUNT_ASSET_ROOT", "/srv/haunted"),
            ("HAUNT_SEED", "42"),
            ("HAUNT_VSYNC", "false"),
        ]
        .into_iter()
        .collect();

        let mut config = AppConfig::default();
        config.apply_overrides(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.asset_root, PathBuf::from("/srv/haunted"));
        assert_eq!(config.grave_seed, Some(42));
        assert!(!config.vsync);
    }

    #[test]
    fn unparsable_override_is_ignored() {
        let mut config = AppConfig::default();
        config.apply_overrides(|key| (key == "HAUNT_SEED").then(|| "minus one".to_string()));
        assert_eq!(config.grave_seed, None);
    }
}
