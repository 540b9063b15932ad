//! Material system for the standard lit shader
//!
//! Materials are stored in [`MaterialManager`] and objects reference them by
//! name. A material owns a uniform buffer, a sampler and a bind group holding
//! its seven texture slots; empty or still-loading slots are bound to
//! placeholders until the decoded image arrives.

use std::collections::HashMap;

use wgpu::Device;

use super::texture_library::TextureId;
use super::texture_resource::{GpuTextureStore, Placeholder};
use crate::gfx::color::Color;
use crate::wgpu_utils::{
    binding_builder::{BindGroupBuilder, BindGroupLayoutBuilder, BindGroupLayoutWithDesc},
    binding_types,
    uniform_buffer::UniformBuffer,
};

/// Material ID for referencing materials
pub type MaterialId = String;

/// Which faces are rasterized
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Side {
    #[default]
    Front,
    Double,
}

/// Texture addressing outside [0, 1]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WrapMode {
    #[default]
    ClampToEdge,
    Repeat,
}

impl WrapMode {
    fn address_mode(self) -> wgpu::AddressMode {
        match self {
            WrapMode::ClampToEdge => wgpu::AddressMode::ClampToEdge,
            WrapMode::Repeat => wgpu::AddressMode::Repeat,
        }
    }
}

/// Texture slots of a material
///
/// Channel conventions: alpha from green, occlusion from red, roughness from
/// green, metalness from blue. Displacement is read in the vertex stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TextureMaps {
    pub color: Option<TextureId>,
    pub alpha: Option<TextureId>,
    pub ambient_occlusion: Option<TextureId>,
    pub displacement: Option<TextureId>,
    pub normal: Option<TextureId>,
    pub metalness: Option<TextureId>,
    pub roughness: Option<TextureId>,
}

impl TextureMaps {
    /// Every texture referenced, in binding order
    pub fn iter(&self) -> impl Iterator<Item = TextureId> {
        [
            self.color,
            self.alpha,
            self.ambient_occlusion,
            self.displacement,
            self.normal,
            self.metalness,
            self.roughness,
        ]
        .into_iter()
        .flatten()
    }

    pub fn references(&self, id: TextureId) -> bool {
        self.iter().any(|t| t == id)
    }
}

/// Pipelines a material can select: (name, transparent, side)
pub const PIPELINE_VARIANTS: [(&str, bool, Side); 4] = [
    ("Standard", false, Side::Front),
    ("StandardDoubleSided", false, Side::Double),
    ("StandardTransparent", true, Side::Front),
    ("StandardTransparentDoubleSided", true, Side::Double),
];

/// GPU uniform data for materials
///
/// MUST match `MaterialUniform` in `standard.wgsl`.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MaterialUniform {
    /// Linear base color, alpha = opacity for transparent materials
    pub color: [f32; 4],
    /// roughness, metalness, displacement scale, occlusion intensity
    pub surface: [f32; 4],
    /// uv repeat in xy
    pub uv_transform: [f32; 4],
}

type MaterialUBO = UniformBuffer<MaterialUniform>;

/// Bind group layout shared by every material
///
/// uniform, sampler, then the texture slots in [`TextureMaps::iter`] order.
pub fn material_bind_group_layout(device: &Device) -> BindGroupLayoutWithDesc {
    let mut builder = BindGroupLayoutBuilder::new()
        .next_binding_rendering(binding_types::uniform())
        .next_binding_rendering(binding_types::sampler(wgpu::SamplerBindingType::Filtering));
    for _ in 0..7 {
        builder = builder.next_binding_rendering(binding_types::texture_2d());
    }
    builder.create(device, "Material Bind Group Layout")
}

struct MaterialGpuResources {
    ubo: MaterialUBO,
    sampler: wgpu::Sampler,
    bind_group: wgpu::BindGroup,
}

/// Surface description for the standard lit shader
pub struct Material {
    pub name: String,
    pub color: Color,
    pub opacity: f32,
    pub roughness: f32,
    pub metalness: f32,
    pub transparent: bool,
    pub side: Side,
    pub maps: TextureMaps,
    pub displacement_scale: f32,
    pub ao_intensity: f32,
    pub uv_repeat: [f32; 2],
    pub wrap: WrapMode,

    gpu: Option<MaterialGpuResources>,
    textures_changed: bool,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            name: "default".to_string(),
            color: Color::WHITE,
            opacity: 1.0,
            roughness: 1.0,
            metalness: 0.0,
            transparent: false,
            side: Side::Front,
            maps: TextureMaps::default(),
            displacement_scale: 1.0,
            ao_intensity: 1.0,
            uv_repeat: [1.0, 1.0],
            wrap: WrapMode::ClampToEdge,
            gpu: None,
            textures_changed: false,
        }
    }
}

impl Material {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    /// Enables blending; the alpha map, if any, multiplies `opacity`
    pub fn with_transparency(mut self, opacity: f32) -> Self {
        self.transparent = true;
        self.opacity = opacity.clamp(0.0, 1.0);
        self
    }

    pub fn with_roughness(mut self, roughness: f32) -> Self {
        self.roughness = roughness.clamp(0.0, 1.0);
        self
    }

    pub fn with_metalness(mut self, metalness: f32) -> Self {
        self.metalness = metalness.clamp(0.0, 1.0);
        self
    }

    pub fn with_side(mut self, side: Side) -> Self {
        self.side = side;
        self
    }

    pub fn with_maps(mut self, maps: TextureMaps) -> Self {
        self.maps = maps;
        self
    }

    pub fn with_displacement_scale(mut self, scale: f32) -> Self {
        self.displacement_scale = scale;
        self
    }

    /// Tiles every map `u` × `v` times across the surface
    pub fn with_repeat(mut self, u: f32, v: f32) -> Self {
        self.uv_repeat = [u, v];
        self.wrap = WrapMode::Repeat;
        self
    }

    pub fn pipeline_name(&self) -> &'static str {
        PIPELINE_VARIANTS
            .iter()
            .find(|(_, transparent, side)| *transparent == self.transparent && *side == self.side)
            .map_or("Standard", |(name, _, _)| name)
    }

    pub fn uniform(&self) -> MaterialUniform {
        let alpha = if self.transparent { self.opacity } else { 1.0 };
        let displacement = if self.maps.displacement.is_some() {
            self.displacement_scale
        } else {
            0.0
        };
        MaterialUniform {
            color: [self.color.r, self.color.g, self.color.b, alpha],
            surface: [self.roughness, self.metalness, displacement, self.ao_intensity],
            uv_transform: [self.uv_repeat[0], self.uv_repeat[1], 0.0, 0.0],
        }
    }

    /// Flags the bind group for a rebuild if `id` is one of this material's maps
    pub fn texture_ready(&mut self, id: TextureId) -> bool {
        let affected = self.maps.references(id);
        self.textures_changed |= affected;
        affected
    }

    pub fn textures_changed(&self) -> bool {
        self.textures_changed
    }

    /// Creates GPU resources on first call, then keeps them in sync
    pub fn update_gpu_resources(
        &mut self,
        device: &Device,
        queue: &wgpu::Queue,
        layout: &BindGroupLayoutWithDesc,
        store: &GpuTextureStore,
    ) {
        let uniform = self.uniform();
        match &mut self.gpu {
            Some(gpu) if !self.textures_changed => {
                gpu.ubo.update_content(queue, uniform);
            }
            Some(gpu) => {
                gpu.ubo.update_content(queue, uniform);
                gpu.bind_group =
                    Self::create_bind_group(device, layout, &gpu.ubo, &gpu.sampler, &self.maps, store, &self.name);
                self.textures_changed = false;
            }
            None => {
                let mut ubo = MaterialUBO::new(device);
                ubo.update_content(queue, uniform);
                let address_mode = self.wrap.address_mode();
                let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
                    label: Some(&format!("{} Sampler", self.name)),
                    address_mode_u: address_mode,
                    address_mode_v: address_mode,
                    address_mode_w: address_mode,
                    mag_filter: wgpu::FilterMode::Linear,
                    min_filter: wgpu::FilterMode::Linear,
                    mipmap_filter: wgpu::FilterMode::Linear,
                    ..Default::default()
                });
                let bind_group =
                    Self::create_bind_group(device, layout, &ubo, &sampler, &self.maps, store, &self.name);
                self.gpu = Some(MaterialGpuResources {
                    ubo,
                    sampler,
                    bind_group,
                });
                self.textures_changed = false;
            }
        }
    }

    fn create_bind_group(
        device: &Device,
        layout: &BindGroupLayoutWithDesc,
        ubo: &MaterialUBO,
        sampler: &wgpu::Sampler,
        maps: &TextureMaps,
        store: &GpuTextureStore,
        name: &str,
    ) -> wgpu::BindGroup {
        BindGroupBuilder::new(layout)
            .resource(ubo.binding_resource())
            .sampler(sampler)
            .texture(store.view(maps.color, Placeholder::White))
            .texture(store.view(maps.alpha, Placeholder::White))
            .texture(store.view(maps.ambient_occlusion, Placeholder::White))
            .texture(store.view(maps.displacement, Placeholder::Black))
            .texture(store.view(maps.normal, Placeholder::FlatNormal))
            .texture(store.view(maps.metalness, Placeholder::White))
            .texture(store.view(maps.roughness, Placeholder::White))
            .create(device, &format!("{} Material Bind Group", name))
    }

    pub fn get_bind_group(&self) -> Option<&wgpu::BindGroup> {
        self.gpu.as_ref().map(|gpu| &gpu.bind_group)
    }
}

/// Manages all materials in the scene
///
/// Objects reference materials by name; unknown names fall back to the
/// default material.
pub struct MaterialManager {
    materials: HashMap<MaterialId, Material>,
    default_material: Material,
}

impl MaterialManager {
    pub fn new() -> Self {
        Self {
            materials: HashMap::new(),
            default_material: Material::default(),
        }
    }

    pub fn add_material(&mut self, material: Material) {
        if self.materials.contains_key(&material.name) {
            log::warn!("Material '{}' replaced", material.name);
        }
        self.materials.insert(material.name.clone(), material);
    }

    pub fn get_material(&self, id: &str) -> Option<&Material> {
        self.materials.get(id)
    }

    pub fn get_material_mut(&mut self, id: &str) -> Option<&mut Material> {
        self.materials.get_mut(id)
    }

    pub fn get_default_material(&self) -> &Material {
        &self.default_material
    }

    /// Material for an object, falling back to the default
    pub fn get_material_for_object(&self, material_id: &str) -> &Material {
        self.get_material(material_id)
            .unwrap_or(&self.default_material)
    }

    pub fn list_materials(&self) -> Vec<&MaterialId> {
        self.materials.keys().collect()
    }

    /// Flags every material using `id`; returns how many were affected
    pub fn mark_texture_ready(&mut self, id: TextureId) -> usize {
        self.materials
            .values_mut()
            .map(|material| material.texture_ready(id))
            .filter(|affected| *affected)
            .count()
    }

    pub fn update_all_gpu_resources(
        &mut self,
        device: &Device,
        queue: &wgpu::Queue,
        layout: &BindGroupLayoutWithDesc,
        store: &GpuTextureStore,
    ) {
        self.default_material
            .update_gpu_resources(device, queue, layout, store);
        for material in self.materials.values_mut() {
            material.update_gpu_resources(device, queue, layout, store);
        }
    }
}

impl Default for MaterialManager {
    fn default() -> Self {
        Self::new()
    }
}
