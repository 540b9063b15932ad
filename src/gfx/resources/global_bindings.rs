//! Global uniform bindings for camera, lights, fog and shadow maps
//!
//! Everything here is shared by all objects in a frame and bound to slot 0 of
//! the standard pipelines.

use cgmath::{InnerSpace, Matrix4, SquareMatrix, Vector3};

use crate::gfx::{
    color::Color,
    lights::{directional_shadow_matrix, point_shadow_matrices, LightKind},
    scene::Scene,
};
use crate::wgpu_utils::{
    binding_builder::{BindGroupBuilder, BindGroupLayoutBuilder, BindGroupLayoutWithDesc},
    binding_types,
    uniform_buffer::UniformBuffer,
};

/// Point lights the standard shader evaluates
pub const MAX_POINT_LIGHTS: usize = 4;

/// Shadow cameras per point light, one per cube face
pub const CUBE_FACE_COUNT: usize = 6;

/// Shadow views: the directional light first, then every point-light face
pub const SHADOW_VIEW_COUNT: usize = 1 + MAX_POINT_LIGHTS * CUBE_FACE_COUNT;

/// MUST match `PointLight` in `standard.wgsl`.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct PointLightUniform {
    /// World position, w = cutoff distance
    pub position: [f32; 4],
    /// Color times intensity, w = decay exponent
    pub color: [f32; 4],
    /// casts shadow, depth bias, texel size (PCF tap spacing), unused
    pub shadow: [f32; 4],
}

/// Per-frame global data
///
/// MUST match `Globals` in `standard.wgsl`.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct GlobalUniform {
    pub view_proj: [[f32; 4]; 4],
    pub camera_position: [f32; 4],
    /// Unit view direction; fog depth is measured along it
    pub camera_forward: [f32; 4],
    /// Summed ambient color times intensity
    pub ambient: [f32; 4],
    /// Unit vector towards the directional light, w = casts shadow
    pub moon_direction: [f32; 4],
    /// Color times intensity, w = depth bias
    pub moon_color: [f32; 4],
    pub moon_view_proj: [[f32; 4]; 4],
    /// w = fog enabled
    pub fog_color: [f32; 4],
    /// near, far, point light count, directional shadow texel size (PCF tap spacing)
    pub fog_range: [f32; 4],
    pub point_lights: [PointLightUniform; MAX_POINT_LIGHTS],
    /// Layer `light * 6 + face` of the point shadow array
    pub point_view_proj: [[[f32; 4]; 4]; MAX_POINT_LIGHTS * CUBE_FACE_COUNT],
}

impl Default for GlobalUniform {
    fn default() -> Self {
        let identity: [[f32; 4]; 4] = Matrix4::identity().into();
        Self {
            view_proj: identity,
            camera_position: [0.0, 0.0, 0.0, 1.0],
            camera_forward: [0.0, 0.0, -1.0, 0.0],
            ambient: [0.0; 4],
            moon_direction: [0.0, 1.0, 0.0, 0.0],
            moon_color: [0.0; 4],
            moon_view_proj: identity,
            fog_color: [0.0; 4],
            fog_range: [0.0, 1.0, 0.0, 1.0],
            point_lights: [PointLightUniform::default(); MAX_POINT_LIGHTS],
            point_view_proj: [identity; MAX_POINT_LIGHTS * CUBE_FACE_COUNT],
        }
    }
}

impl GlobalUniform {
    /// Packs camera, lights and fog of `scene` into shader layout
    ///
    /// Point lights beyond [`MAX_POINT_LIGHTS`] are dropped; only the first
    /// directional light is used.
    pub fn from_scene(scene: &Scene) -> Self {
        let camera = &scene.camera_manager.camera;
        let mut uniform = Self {
            view_proj: camera.uniform.view_proj,
            camera_position: camera.uniform.view_position,
            ..Default::default()
        };
        let forward = camera.target - camera.eye;
        if forward.magnitude2() > 0.0 {
            let forward = forward.normalize();
            uniform.camera_forward = [forward.x, forward.y, forward.z, 0.0];
        }

        let mut ambient = Color::BLACK;
        let mut has_directional = false;
        let mut point_count = 0;

        for light in &scene.lights {
            match &light.kind {
                LightKind::Ambient => {
                    ambient.r += light.color.r * light.intensity;
                    ambient.g += light.color.g * light.intensity;
                    ambient.b += light.color.b * light.intensity;
                }
                LightKind::Directional { target, shadow, .. } => {
                    if has_directional {
                        log::warn!("Directional light '{}' ignored, only one is supported", light.name);
                        continue;
                    }
                    has_directional = true;
                    let position = scene.light_world_position(light).unwrap_or(Vector3::unit_y());
                    let towards = position - *target;
                    let direction = if towards.magnitude2() > 0.0 {
                        towards.normalize()
                    } else {
                        Vector3::unit_y()
                    };
                    let casts = if shadow.is_some() { 1.0 } else { 0.0 };
                    uniform.moon_direction = [direction.x, direction.y, direction.z, casts];
                    uniform.moon_color =
                        light.color.premultiplied(light.intensity, shadow.map_or(0.0, |s| s.bias));
                    if let Some(shadow) = shadow {
                        uniform.moon_view_proj =
                            directional_shadow_matrix(position, *target, shadow).into();
                        uniform.fog_range[3] = 1.0 / shadow.map_size as f32;
                    }
                }
                LightKind::Point {
                    distance,
                    decay,
                    shadow,
                    ..
                } => {
                    if point_count == MAX_POINT_LIGHTS {
                        log::warn!(
                            "Point light '{}' ignored, at most {} are supported",
                            light.name,
                            MAX_POINT_LIGHTS
                        );
                        continue;
                    }
                    let position = scene.light_world_position(light).unwrap_or(Vector3::unit_y());
                    uniform.point_lights[point_count] = PointLightUniform {
                        position: [position.x, position.y, position.z, *distance],
                        color: light.color.premultiplied(light.intensity, *decay),
                        shadow: match shadow {
                            Some(shadow) => [1.0, shadow.bias, 1.0 / shadow.map_size as f32, 0.0],
                            None => [0.0; 4],
                        },
                    };
                    if let Some(shadow) = shadow {
                        let faces = point_shadow_matrices(position, shadow);
                        for (face, matrix) in faces.into_iter().enumerate() {
                            uniform.point_view_proj[point_count * CUBE_FACE_COUNT + face] =
                                matrix.into();
                        }
                    }
                    point_count += 1;
                }
            }
        }

        uniform.ambient = ambient.premultiplied(1.0, 0.0);
        uniform.fog_range[2] = point_count as f32;
        if let Some(fog) = &scene.fog {
            uniform.fog_color = [fog.color.r, fog.color.g, fog.color.b, 1.0];
            uniform.fog_range[0] = fog.near;
            uniform.fog_range[1] = fog.far;
        }
        uniform
    }

    /// Light view-projection rendered into shadow view `index`
    pub fn shadow_view(&self, index: usize) -> Option<[[f32; 4]; 4]> {
        match index {
            0 => Some(self.moon_view_proj),
            i => self.point_view_proj.get(i - 1).copied(),
        }
    }
}

/// Type alias for the global uniform buffer
pub type GlobalUBO = UniformBuffer<GlobalUniform>;

/// Manages bind group layouts and bind groups for global uniforms
///
/// Binding order: uniform, shadow comparison sampler, directional shadow map,
/// point shadow layers.
pub struct GlobalBindings {
    bind_group_layout: BindGroupLayoutWithDesc,
    bind_group: Option<wgpu::BindGroup>,
}

impl GlobalBindings {
    pub fn new(device: &wgpu::Device) -> Self {
        let bind_group_layout = BindGroupLayoutBuilder::new()
            .next_binding_rendering(binding_types::uniform())
            .next_binding_fragment(binding_types::sampler(wgpu::SamplerBindingType::Comparison))
            .next_binding_fragment(binding_types::depth_texture_2d())
            .next_binding_fragment(binding_types::depth_texture_2d_array())
            .create(device, "Globals Bind Group");

        GlobalBindings {
            bind_group_layout,
            bind_group: None,
        }
    }

    /// Creates the bind group; must run again whenever a shadow map is recreated
    pub fn create_bind_group(
        &mut self,
        device: &wgpu::Device,
        ubo: &GlobalUBO,
        shadow_sampler: &wgpu::Sampler,
        directional_shadow: &wgpu::TextureView,
        point_shadows: &wgpu::TextureView,
    ) {
        self.bind_group = Some(
            BindGroupBuilder::new(&self.bind_group_layout)
                .resource(ubo.binding_resource())
                .sampler(shadow_sampler)
                .texture(directional_shadow)
                .texture(point_shadows)
                .create(device, "Global Bind Group"),
        );
    }

    pub fn bind_group_layout(&self) -> &wgpu::BindGroupLayout {
        &self.bind_group_layout.layout
    }

    /// `None` until [`GlobalBindings::create_bind_group`] has run
    pub fn bind_group(&self) -> Option<&wgpu::BindGroup> {
        self.bind_group.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::camera::{CameraManager, OrbitCamera};
    use crate::gfx::lights::{Fog, Light, ShadowConfig};
    use crate::gfx::scene::Transform;
    use approx::assert_relative_eq;
    use cgmath::Point3;

    fn scene() -> Scene {
        let camera = OrbitCamera::looking_at(Point3::new(4.0, 2.0, 5.0), Point3::new(0.0, 0.0, 0.0), 1.0);
        Scene::new(CameraManager::new(camera))
    }

    #[test]
    fn uniform_is_sixteen_byte_aligned() {
        assert_eq!(std::mem::size_of::<PointLightUniform>(), 48);
        assert_eq!(std::mem::size_of::<GlobalUniform>() % 16, 0);
    }

    #[test]
    fn ambient_lights_accumulate() {
        let mut scene = scene();
        scene.add_light(Light::ambient("a", Color::linear(1.0, 0.5, 0.0), 0.5));
        scene.add_light(Light::ambient("b", Color::WHITE, 0.25));
        let uniform = GlobalUniform::from_scene(&scene);
        assert_relative_eq!(uniform.ambient[0], 0.75);
        assert_relative_eq!(uniform.ambient[1], 0.5);
        assert_relative_eq!(uniform.ambient[2], 0.25);
    }

    #[test]
    fn directional_light_points_from_target_to_light() {
        let mut scene = scene();
        scene.add_light(
            Light::directional("moon", Color::WHITE, 0.12, Vector3::new(4.0, 5.0, -2.0))
                .with_shadow(ShadowConfig::directional()),
        );
        let uniform = GlobalUniform::from_scene(&scene);
        let expected = Vector3::new(4.0f32, 5.0, -2.0).normalize();
        assert_relative_eq!(uniform.moon_direction[0], expected.x, epsilon = 1e-6);
        assert_relative_eq!(uniform.moon_direction[1], expected.y, epsilon = 1e-6);
        assert_relative_eq!(uniform.moon_direction[2], expected.z, epsilon = 1e-6);
        assert_eq!(uniform.moon_direction[3], 1.0);
        assert_relative_eq!(uniform.fog_range[3], 1.0 / 512.0);
        assert_relative_eq!(uniform.moon_color[0], 0.12);
    }

    #[test]
    fn grouped_point_light_uses_world_position() {
        let mut scene = scene();
        let house = scene.add_group("house", Transform::from_position(1.0, 0.0, 0.0));
        scene.add_light(
            Light::point("door", Color::WHITE, 1.0, 7.0)
                .at(0.0, 2.2, 2.7)
                .in_group(house)
                .with_shadow(ShadowConfig::point(256, 7.0)),
        );
        let uniform = GlobalUniform::from_scene(&scene);
        let light = uniform.point_lights[0];
        assert_relative_eq!(light.position[0], 1.0);
        assert_relative_eq!(light.position[1], 2.2);
        assert_relative_eq!(light.position[3], 7.0);
        assert_eq!(light.color[3], 1.0);
        assert_eq!(light.shadow[0], 1.0);
        assert_relative_eq!(light.shadow[2], 1.0 / 256.0);
        assert_eq!(uniform.fog_range[2], 1.0);
        assert_ne!(uniform.shadow_view(1), uniform.shadow_view(2));
    }

    #[test]
    fn extra_point_lights_are_dropped() {
        let mut scene = scene();
        for i in 0..MAX_POINT_LIGHTS + 2 {
            scene.add_light(Light::point(&format!("p{i}"), Color::WHITE, 1.0, 3.0));
        }
        let uniform = GlobalUniform::from_scene(&scene);
        assert_eq!(uniform.fog_range[2], MAX_POINT_LIGHTS as f32);
    }

    #[test]
    fn fog_is_packed_when_present() {
        let mut scene = scene();
        assert_eq!(GlobalUniform::from_scene(&scene).fog_color[3], 0.0);
        scene.fog = Some(Fog::linear(Color::linear(0.1, 0.2, 0.3), 1.0, 15.0));
        let uniform = GlobalUniform::from_scene(&scene);
        assert_eq!(uniform.fog_color, [0.1, 0.2, 0.3, 1.0]);
        assert_eq!(&uniform.fog_range[..2], &[1.0, 15.0]);
    }

    #[test]
    fn fog_depth_runs_along_the_view_direction() {
        let uniform = GlobalUniform::from_scene(&scene());
        let expected = Vector3::new(-4.0f32, -2.0, -5.0).normalize();
        assert_relative_eq!(uniform.camera_forward[0], expected.x, epsilon = 1e-5);
        assert_relative_eq!(uniform.camera_forward[1], expected.y, epsilon = 1e-5);
        assert_relative_eq!(uniform.camera_forward[2], expected.z, epsilon = 1e-5);

        // A point beside the target is as deep as the target itself
        let eye = Vector3::new(4.0f32, 2.0, 5.0);
        let forward = Vector3::from([
            uniform.camera_forward[0],
            uniform.camera_forward[1],
            uniform.camera_forward[2],
        ]);
        let side = forward.cross(Vector3::unit_y()).normalize();
        let centre_depth = (Vector3::new(0.0, 0.0, 0.0) - eye).dot(forward);
        let edge_depth = (side * 3.0 - eye).dot(forward);
        assert_relative_eq!(centre_depth, edge_depth, epsilon = 1e-4);
    }

    #[test]
    fn shadow_views_cover_moon_and_every_face() {
        let uniform = GlobalUniform::default();
        assert!(uniform.shadow_view(0).is_some());
        assert!(uniform.shadow_view(SHADOW_VIEW_COUNT - 1).is_some());
        assert!(uniform.shadow_view(SHADOW_VIEW_COUNT).is_none());
    }
}
