//! Registry of the textures a scene references
//!
//! Materials hold [`TextureId`]s, not images. The render engine resolves each
//! id to a GPU texture once its file has been decoded.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// How texel values are interpreted when sampled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorSpace {
    /// Color data, decoded from sRGB to linear by the sampler
    Srgb,
    /// Non-color data (normals, roughness, occlusion...) sampled as stored
    Linear,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextureId(pub usize);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureDesc {
    /// Path relative to the asset root
    pub path: PathBuf,
    pub color_space: ColorSpace,
}

#[derive(Debug, Default)]
pub struct TextureLibrary {
    descs: Vec<TextureDesc>,
    lookup: HashMap<(PathBuf, ColorSpace), TextureId>,
}

impl TextureLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a texture file; registering the same file twice yields the same id
    pub fn register(&mut self, path: impl AsRef<Path>, color_space: ColorSpace) -> TextureId {
        let path = path.as_ref().to_path_buf();
        if let Some(id) = self.lookup.get(&(path.clone(), color_space)) {
            return *id;
        }
        let id = TextureId(self.descs.len());
        self.descs.push(TextureDesc {
            path: path.clone(),
            color_space,
        });
        self.lookup.insert((path, color_space), id);
        id
    }

    pub fn get(&self, id: TextureId) -> Option<&TextureDesc> {
        self.descs.get(id.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (TextureId, &TextureDesc)> {
        self.descs
            .iter()
            .enumerate()
            .map(|(index, desc)| (TextureId(index), desc))
    }

    pub fn len(&self) -> usize {
        self.descs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_file_is_registered_once() {
        let mut library = TextureLibrary::new();
        let bricks = library.register("textures/bricks/roughness.jpg", ColorSpace::Linear);
        let grass = library.register("textures/bricks/roughness.jpg", ColorSpace::Linear);
        assert_eq!(bricks, grass);
        assert_eq!(library.len(), 1);
    }

    #[test]
    fn color_space_distinguishes_entries() {
        let mut library = TextureLibrary::new();
        let srgb = library.register("a.jpg", ColorSpace::Srgb);
        let linear = library.register("a.jpg", ColorSpace::Linear);
        assert_ne!(srgb, linear);
        assert_eq!(library.get(linear).map(|d| d.color_space), Some(ColorSpace::Linear));
    }

    #[test]
    fn iteration_follows_registration_order() {
        let mut library = TextureLibrary::new();
        library.register("first.jpg", ColorSpace::Srgb);
        library.register("second.jpg", ColorSpace::Linear);
        let paths: Vec<_> = library.iter().map(|(_, d)| d.path.clone()).collect();
        assert_eq!(paths, vec![PathBuf::from("first.jpg"), PathBuf::from("second.jpg")]);
    }
}
