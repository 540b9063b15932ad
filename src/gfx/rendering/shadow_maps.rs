//! Depth maps rendered from each shadow-casting light
//!
//! The directional light renders into its own map. Point lights render six
//! perspective views each into one layered texture, at layer
//! `light * 6 + face`.

use crate::gfx::{
    resources::{
        global_bindings::{GlobalUniform, CUBE_FACE_COUNT, MAX_POINT_LIGHTS, SHADOW_VIEW_COUNT},
        texture_resource::TextureResource,
    },
    scene::{DrawMesh, Scene},
};
use crate::wgpu_utils::{
    binding_types, BindGroupBuilder, BindGroupLayoutBuilder, BindGroupLayoutWithDesc, UniformBuffer,
};

/// Light camera used while rendering one shadow view
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ShadowViewUniform {
    pub view_proj: [[f32; 4]; 4],
}

struct ShadowView {
    ubo: UniformBuffer<ShadowViewUniform>,
    bind_group: wgpu::BindGroup,
    target: wgpu::TextureView,
}

/// Shadow views that need rendering this frame, by index
///
/// Index 0 is the directional light; `1 + light * 6 + face` the point faces.
pub fn active_shadow_views(globals: &GlobalUniform) -> Vec<usize> {
    let mut active = Vec::new();
    if globals.moon_direction[3] > 0.5 {
        active.push(0);
    }
    let point_count = (globals.fog_range[2] as usize).min(MAX_POINT_LIGHTS);
    for (light, point) in globals.point_lights[..point_count].iter().enumerate() {
        if point.shadow[0] > 0.5 {
            active.extend((0..CUBE_FACE_COUNT).map(|face| 1 + light * CUBE_FACE_COUNT + face));
        }
    }
    active
}

pub struct ShadowMaps {
    pub directional: TextureResource,
    pub point_layers: TextureResource,
    view_layout: BindGroupLayoutWithDesc,
    views: Vec<ShadowView>,
}

impl ShadowMaps {
    /// Allocates the maps; sizes come from the lights' shadow configurations
    pub fn new(device: &wgpu::Device, directional_size: u32, point_size: u32) -> Self {
        let (directional, point_layers) = Self::create_maps(device, directional_size, point_size);

        let view_layout = BindGroupLayoutBuilder::new()
            .next_binding_vertex(binding_types::uniform())
            .create(device, "Shadow View Bind Group");

        let views = (0..SHADOW_VIEW_COUNT)
            .map(|index| {
                let ubo = UniformBuffer::new(device);
                let bind_group = BindGroupBuilder::new(&view_layout)
                    .resource(ubo.binding_resource())
                    .create(device, &format!("Shadow View {}", index));
                ShadowView {
                    ubo,
                    bind_group,
                    target: Self::target_view(&directional, &point_layers, index),
                }
            })
            .collect();

        Self {
            directional,
            point_layers,
            view_layout,
            views,
        }
    }

    /// Reallocates the maps at new resolutions, keeping the view uniforms
    ///
    /// Bind groups sampling the old maps must be recreated afterwards.
    pub fn resize(&mut self, device: &wgpu::Device, directional_size: u32, point_size: u32) {
        let (directional, point_layers) = Self::create_maps(device, directional_size, point_size);
        for (index, view) in self.views.iter_mut().enumerate() {
            view.target = Self::target_view(&directional, &point_layers, index);
        }
        self.directional = directional;
        self.point_layers = point_layers;
        log::info!(
            "Shadow maps: directional {}², point {}² x {} layers",
            directional_size,
            point_size,
            MAX_POINT_LIGHTS * CUBE_FACE_COUNT
        );
    }

    fn create_maps(
        device: &wgpu::Device,
        directional_size: u32,
        point_size: u32,
    ) -> (TextureResource, TextureResource) {
        let directional =
            TextureResource::create_shadow_map(device, directional_size.max(1), "Directional Shadow Map");
        let point_layers = TextureResource::create_shadow_layers(
            device,
            point_size.max(1),
            (MAX_POINT_LIGHTS * CUBE_FACE_COUNT) as u32,
            "Point Shadow Maps",
        );
        (directional, point_layers)
    }

    fn target_view(
        directional: &TextureResource,
        point_layers: &TextureResource,
        index: usize,
    ) -> wgpu::TextureView {
        match index {
            0 => directional.layer_view(0),
            i => point_layers.layer_view((i - 1) as u32),
        }
    }

    pub fn view_layout(&self) -> &wgpu::BindGroupLayout {
        &self.view_layout.layout
    }

    /// Copies the light cameras of `globals` into the per-view uniforms
    pub fn update(&mut self, queue: &wgpu::Queue, globals: &GlobalUniform) {
        for (index, view) in self.views.iter_mut().enumerate() {
            if let Some(view_proj) = globals.shadow_view(index) {
                view.ubo.update_content(queue, ShadowViewUniform { view_proj });
            }
        }
    }

    /// Renders every casting object into each active shadow view
    pub fn render(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        scene: &Scene,
        pipeline: &wgpu::RenderPipeline,
        globals: &GlobalUniform,
    ) {
        for index in active_shadow_views(globals) {
            let Some(view) = self.views.get(index) else {
                continue;
            };
            let mut shadow_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Shadow Depth Pass"),
                color_attachments: &[],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &view.target,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            shadow_pass.set_pipeline(pipeline);
            shadow_pass.set_bind_group(0, &view.bind_group, &[]);

            for object in scene.shadow_casters() {
                let (Some(transform), Some(mesh)) =
                    (object.get_transform_bind_group(), scene.mesh(object.geometry))
                else {
                    continue;
                };
                shadow_pass.set_bind_group(1, transform, &[]);
                shadow_pass.draw_mesh(mesh);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_casting_lights_means_no_passes() {
        assert!(active_shadow_views(&GlobalUniform::default()).is_empty());
    }

    #[test]
    fn each_casting_point_light_adds_six_faces() {
        let mut globals = GlobalUniform::default();
        globals.moon_direction[3] = 1.0;
        globals.fog_range[2] = 3.0;
        globals.point_lights[0].shadow[0] = 1.0;
        globals.point_lights[2].shadow[0] = 1.0;

        let views = active_shadow_views(&globals);
        assert_eq!(views.len(), 1 + 12);
        assert_eq!(views[0], 0);
        assert_eq!(&views[1..7], &[1, 2, 3, 4, 5, 6]);
        assert_eq!(&views[7..], &[13, 14, 15, 16, 17, 18]);
    }

    #[test]
    fn lights_past_the_count_are_ignored() {
        let mut globals = GlobalUniform::default();
        globals.fog_range[2] = 1.0;
        globals.point_lights[1].shadow[0] = 1.0;
        assert!(active_shadow_views(&globals).is_empty());
    }
}
