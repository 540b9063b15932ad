//! Texture resource management for wgpu
//!
//! Provides utilities for creating GPU textures, views and samplers for depth
//! buffers, shadow maps and decoded material images.

use std::collections::HashMap;

use super::texture_library::{ColorSpace, TextureId};
use super::texture_loader::ImageData;

/// GPU texture resource containing texture, view, and sampler
#[derive(Clone)]
pub struct TextureResource {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub sampler: wgpu::Sampler,
}

impl TextureResource {
    /// Standard depth buffer format used throughout the engine
    pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

    /// Creates a depth texture matching the surface configuration
    pub fn create_depth_texture(
        device: &wgpu::Device,
        config: &wgpu::SurfaceConfiguration,
        label: &str,
    ) -> Self {
        let size = wgpu::Extent3d {
            width: config.width.max(1),
            height: config.height.max(1),
            depth_or_array_layers: 1,
        };

        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: Self::DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[Self::DEPTH_FORMAT],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        Self {
            texture,
            view,
            sampler: Self::comparison_sampler(device, label),
        }
    }

    /// Square depth map rendered from a single light
    pub fn create_shadow_map(device: &wgpu::Device, size: u32, label: &str) -> Self {
        Self::create_shadow_map_array(device, size, 1, label, wgpu::TextureViewDimension::D2)
    }

    /// Stack of square depth maps sampled as one array texture
    ///
    /// Each layer can be rendered to separately through [`TextureResource::layer_view`].
    pub fn create_shadow_layers(device: &wgpu::Device, size: u32, layers: u32, label: &str) -> Self {
        Self::create_shadow_map_array(
            device,
            size,
            layers.max(1),
            label,
            wgpu::TextureViewDimension::D2Array,
        )
    }

    fn create_shadow_map_array(
        device: &wgpu::Device,
        size: u32,
        layers: u32,
        label: &str,
        dimension: wgpu::TextureViewDimension,
    ) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width: size,
                height: size,
                depth_or_array_layers: layers,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: Self::DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });

        let view = texture.create_view(&wgpu::TextureViewDescriptor {
            label: Some(label),
            dimension: Some(dimension),
            ..Default::default()
        });

        Self {
            texture,
            view,
            sampler: Self::comparison_sampler(device, label),
        }
    }

    /// Render-target view of one layer of a shadow map
    pub fn layer_view(&self, layer: u32) -> wgpu::TextureView {
        self.texture.create_view(&wgpu::TextureViewDescriptor {
            label: Some("Shadow Layer"),
            dimension: Some(wgpu::TextureViewDimension::D2),
            base_array_layer: layer,
            array_layer_count: Some(1),
            ..Default::default()
        })
    }

    fn comparison_sampler(device: &wgpu::Device, label: &str) -> wgpu::Sampler {
        // Shadow lookups go through textureSampleCompare
        device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some(&format!("{} Sampler", label)),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            compare: Some(wgpu::CompareFunction::LessEqual),
            lod_min_clamp: 0.0,
            lod_max_clamp: 100.0,
            ..Default::default()
        })
    }

    /// Uploads a decoded image and every level of its mip chain
    ///
    /// Color data is stored as sRGB so sampling returns linear values.
    pub fn from_image(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        image: &ImageData,
        label: &str,
        color_space: ColorSpace,
    ) -> Self {
        let format = match color_space {
            ColorSpace::Srgb => wgpu::TextureFormat::Rgba8UnormSrgb,
            ColorSpace::Linear => wgpu::TextureFormat::Rgba8Unorm,
        };

        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width: image.width().max(1),
                height: image.height().max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: image.mip_level_count().max(1),
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        for (mip_level, level) in image.levels.iter().enumerate() {
            queue.write_texture(
                wgpu::TexelCopyTextureInfo {
                    texture: &texture,
                    mip_level: mip_level as u32,
                    origin: wgpu::Origin3d::ZERO,
                    aspect: wgpu::TextureAspect::All,
                },
                &level.pixels,
                wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(4 * level.width),
                    rows_per_image: Some(level.height),
                },
                wgpu::Extent3d {
                    width: level.width,
                    height: level.height,
                    depth_or_array_layers: 1,
                },
            );
        }

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        // Materials bind their own sampler; this one is only for ad-hoc use
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some(&format!("{} Sampler", label)),
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        Self {
            texture,
            view,
            sampler,
        }
    }
}

/// Stand-in bound for a texture slot that is empty or still loading
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placeholder {
    White,
    Black,
    /// Tangent-space normal pointing straight out of the surface
    FlatNormal,
}

impl Placeholder {
    pub fn rgba(self) -> [u8; 4] {
        match self {
            Placeholder::White => [255, 255, 255, 255],
            Placeholder::Black => [0, 0, 0, 255],
            Placeholder::FlatNormal => [128, 128, 255, 255],
        }
    }
}

/// Uploaded material textures keyed by id, plus the placeholders
pub struct GpuTextureStore {
    loaded: HashMap<TextureId, TextureResource>,
    white: TextureResource,
    black: TextureResource,
    flat_normal: TextureResource,
}

impl GpuTextureStore {
    pub fn new(device: &wgpu::Device, queue: &wgpu::Queue) -> Self {
        let placeholder = |p: Placeholder, label: &str| {
            TextureResource::from_image(
                device,
                queue,
                &ImageData::solid_color(p.rgba()),
                label,
                ColorSpace::Linear,
            )
        };
        Self {
            loaded: HashMap::new(),
            white: placeholder(Placeholder::White, "White Placeholder"),
            black: placeholder(Placeholder::Black, "Black Placeholder"),
            flat_normal: placeholder(Placeholder::FlatNormal, "Flat Normal Placeholder"),
        }
    }

    pub fn insert(&mut self, id: TextureId, texture: TextureResource) {
        self.loaded.insert(id, texture);
    }

    pub fn contains(&self, id: TextureId) -> bool {
        self.loaded.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.loaded.len()
    }

    pub fn is_empty(&self) -> bool {
        self.loaded.is_empty()
    }

    /// View for `id`, or the placeholder while it is missing
    pub fn view(&self, id: Option<TextureId>, placeholder: Placeholder) -> &wgpu::TextureView {
        match id.and_then(|id| self.loaded.get(&id)) {
            Some(texture) => &texture.view,
            None => match placeholder {
                Placeholder::White => &self.white.view,
                Placeholder::Black => &self.black.view,
                Placeholder::FlatNormal => &self.flat_normal.view,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flat_normal_decodes_to_positive_z() {
        let [r, g, b, _] = Placeholder::FlatNormal.rgba();
        let decode = |c: u8| c as f32 / 255.0 * 2.0 - 1.0;
        assert!(decode(r).abs() < 0.01);
        assert!(decode(g).abs() < 0.01);
        assert_eq!(decode(b), 1.0);
    }
}
