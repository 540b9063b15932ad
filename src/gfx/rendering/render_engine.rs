//! WGPU-based render service for the haunted house scene
//!
//! Owns the surface, device and every GPU resource that is not per-object:
//! pipelines, global uniforms, shadow maps and uploaded material textures.
//! Each frame renders the shadow views, then the scene (opaque first,
//! transparent back to front), then the UI overlay.

use std::path::Path;
use std::sync::Arc;

use wgpu::{Device, TextureFormat};

use crate::error::{HauntError, Result};
use crate::gfx::{
    resources::{
        global_bindings::{GlobalBindings, GlobalUBO, GlobalUniform},
        material::{material_bind_group_layout, Side, PIPELINE_VARIANTS},
        texture_loader::TextureLoader,
        texture_resource::{GpuTextureStore, TextureResource},
    },
    scene::{DrawMesh, Scene},
};
use crate::wgpu_utils::{binding_types, BindGroupLayoutBuilder, BindGroupLayoutWithDesc};

use super::pipeline_manager::{PipelineConfig, PipelineManager};
use super::shadow_maps::ShadowMaps;

const SHADOW_PIPELINE: &str = "Shadow";

/// Core rendering engine managing GPU resources and draw calls
pub struct RenderEngine {
    surface: wgpu::Surface<'static>,
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,
    config: wgpu::SurfaceConfiguration,
    depth_texture: TextureResource,
    format: TextureFormat,
    pub pipeline_manager: PipelineManager,
    global_ubo: GlobalUBO,
    global_bindings: GlobalBindings,
    globals: GlobalUniform,
    transform_layout: BindGroupLayoutWithDesc,
    material_layout: BindGroupLayoutWithDesc,
    shadow_maps: ShadowMaps,
    textures: GpuTextureStore,
    loader: TextureLoader,
    clear_color: wgpu::Color,
}

impl RenderEngine {
    /// Creates the render service for a window surface of `width` × `height` pixels
    pub async fn new(
        window: impl Into<wgpu::SurfaceTarget<'static>>,
        width: u32,
        height: u32,
        vsync: bool,
    ) -> Result<RenderEngine> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let surface = instance.create_surface(window)?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await?;
        log::info!("Using adapter: {}", adapter.get_info().name);

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("WGPU Device"),
                required_features: wgpu::Features::default(),
                required_limits: wgpu::Limits {
                    max_texture_dimension_2d: 4096,
                    ..wgpu::Limits::downlevel_defaults()
                },
                memory_hints: wgpu::MemoryHints::default(),
                trace: wgpu::Trace::Off,
            })
            .await?;

        // Lighting runs in linear space; the sRGB surface encodes on write
        let surface_capabilities = surface.get_capabilities(&adapter);
        let format = surface_capabilities
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .or_else(|| surface_capabilities.formats.first().copied())
            .ok_or(HauntError::NoSurfaceFormat)?;

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: width.max(1),
            height: height.max(1),
            present_mode: present_mode(vsync),
            alpha_mode: surface_capabilities
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let depth_texture =
            TextureResource::create_depth_texture(&device, &config, "depth_texture");

        // Real sizes are known once the scene's lights are
        let shadow_maps = ShadowMaps::new(&device, 1, 1);

        let global_ubo = GlobalUBO::new(&device);
        let mut global_bindings = GlobalBindings::new(&device);
        global_bindings.create_bind_group(
            &device,
            &global_ubo,
            &shadow_maps.directional.sampler,
            &shadow_maps.directional.view,
            &shadow_maps.point_layers.view,
        );

        let transform_layout = BindGroupLayoutBuilder::new()
            .next_binding_rendering(binding_types::uniform())
            .create(&device, "Transform Bind Group Layout");
        let material_layout = material_bind_group_layout(&device);
        let textures = GpuTextureStore::new(&device, &queue);

        let device_handle: Arc<Device> = device.into();
        let queue_handle: Arc<wgpu::Queue> = queue.into();
        let mut pipeline_manager = PipelineManager::new(device_handle.clone());

        pipeline_manager.load_shader("standard", include_str!("standard.wgsl"));
        pipeline_manager.load_shader("shadow", include_str!("shadow_pass.wgsl"));

        // No culling so thin geometry still occludes from behind
        pipeline_manager.register_pipeline(
            SHADOW_PIPELINE,
            PipelineConfig::default()
                .with_label("SHADOW")
                .with_shader("shadow")
                .with_depth_stencil(TextureResource::DEPTH_FORMAT)
                .with_depth_bias(2, 2.0)
                .with_cull_mode(None)
                .with_bind_group_layouts(vec![
                    shadow_maps.view_layout().clone(),
                    transform_layout.layout.clone(),
                ])
                .with_vertex_only(),
        );

        for (name, transparent, side) in PIPELINE_VARIANTS {
            pipeline_manager.register_pipeline(
                name,
                surface_pipeline(name, transparent, side, format).with_bind_group_layouts(vec![
                    global_bindings.bind_group_layout().clone(),
                    transform_layout.layout.clone(),
                    material_layout.layout.clone(),
                ]),
            );
        }

        if let Err(errors) = pipeline_manager.create_all_pipelines() {
            for error in errors {
                log::error!("{}", error);
            }
        }

        Ok(RenderEngine {
            device: device_handle,
            config,
            format,
            surface,
            queue: queue_handle,
            depth_texture,
            pipeline_manager,
            global_bindings,
            global_ubo,
            globals: GlobalUniform::default(),
            transform_layout,
            material_layout,
            shadow_maps,
            textures,
            loader: TextureLoader::new(),
            clear_color: wgpu::Color::BLACK,
        })
    }

    /// Creates GPU resources for a freshly composed scene and starts loading its textures
    ///
    /// Texture paths are resolved against `asset_root`.
    pub fn prepare_scene(&mut self, scene: &mut Scene, asset_root: &Path) {
        let (directional_size, point_size) = scene.shadow_map_sizes();
        self.shadow_maps
            .resize(&self.device, directional_size, point_size);
        self.global_bindings.create_bind_group(
            &self.device,
            &self.global_ubo,
            &self.shadow_maps.directional.sampler,
            &self.shadow_maps.directional.view,
            &self.shadow_maps.point_layers.view,
        );

        scene.init_gpu_resources(&self.device, &self.transform_layout);
        scene.material_manager.update_all_gpu_resources(
            &self.device,
            &self.queue,
            &self.material_layout,
            &self.textures,
        );

        let requests = scene
            .textures
            .iter()
            .map(|(id, desc)| (id, asset_root.join(&desc.path)))
            .collect::<Vec<_>>();
        log::info!(
            "Loading {} textures from {}",
            requests.len(),
            asset_root.display()
        );
        self.loader.request_all(requests);

        self.clear_color = scene.background.to_wgpu();
    }

    /// Uploads finished textures and per-frame uniforms
    ///
    /// Never blocks on texture decoding.
    pub fn sync(&mut self, scene: &mut Scene) {
        for loaded in self.loader.poll() {
            match loaded.result {
                Ok(image) => {
                    let Some(desc) = scene.textures.get(loaded.id) else {
                        continue;
                    };
                    let label = loaded.path.display().to_string();
                    let texture = TextureResource::from_image(
                        &self.device,
                        &self.queue,
                        &image,
                        &label,
                        desc.color_space,
                    );
                    self.textures.insert(loaded.id, texture);
                    let affected = scene.material_manager.mark_texture_ready(loaded.id);
                    log::debug!(
                        "Loaded {} ({}x{}, {} materials)",
                        label,
                        image.width(),
                        image.height(),
                        affected
                    );
                }
                Err(err) => log::error!("{}", err),
            }
        }

        scene.update_all_transforms(&self.queue);
        scene.material_manager.update_all_gpu_resources(
            &self.device,
            &self.queue,
            &self.material_layout,
            &self.textures,
        );

        self.globals = GlobalUniform::from_scene(scene);
        self.global_ubo.update_content(&self.queue, self.globals);
        self.shadow_maps.update(&self.queue, &self.globals);
    }

    /// Renders shadows, the scene and an optional UI overlay
    ///
    /// A lost or outdated surface is reconfigured and the frame skipped.
    pub fn render_frame<F>(&mut self, scene: &Scene, ui_callback: Option<F>) -> Result<()>
    where
        F: FnOnce(&wgpu::Device, &wgpu::Queue, &mut wgpu::CommandEncoder, &wgpu::TextureView),
    {
        let surface_texture = match self.surface.get_current_texture() {
            Ok(texture) => texture,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                log::warn!("Surface lost or outdated, reconfiguring");
                self.surface.configure(&self.device, &self.config);
                return Ok(());
            }
            Err(wgpu::SurfaceError::OutOfMemory) => return Err(HauntError::OutOfMemory),
            Err(err) => {
                log::warn!("Skipping frame: {}", err);
                return Ok(());
            }
        };

        let surface_texture_view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        if let Some(shadow_pipeline) = self.pipeline_manager.pipeline(SHADOW_PIPELINE) {
            self.shadow_maps
                .render(&mut encoder, scene, shadow_pipeline, &self.globals);
        }

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Main Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &surface_texture_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear_color),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_texture.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            render_pass.set_bind_group(0, self.global_bindings.bind_group(), &[]);

            let mut current_pipeline = None;
            for id in scene.draw_order() {
                let Some(object) = scene.object(id) else {
                    continue;
                };
                let material = scene.get_material_for_object(object);
                let (Some(transform), Some(material_bind_group), Some(mesh)) = (
                    object.get_transform_bind_group(),
                    material.get_bind_group(),
                    scene.mesh(object.geometry),
                ) else {
                    log::trace!("Skipping '{}': GPU resources not ready", object.name);
                    continue;
                };

                let pipeline_name = material.pipeline_name();
                if current_pipeline != Some(pipeline_name) {
                    let Some(pipeline) = self.pipeline_manager.pipeline(pipeline_name) else {
                        continue;
                    };
                    render_pass.set_pipeline(pipeline);
                    current_pipeline = Some(pipeline_name);
                }

                render_pass.set_bind_group(1, transform, &[]);
                render_pass.set_bind_group(2, material_bind_group, &[]);
                render_pass.draw_mesh(mesh);
            }
        }

        if let Some(ui_callback) = ui_callback {
            ui_callback(
                &self.device,
                &self.queue,
                &mut encoder,
                &surface_texture_view,
            );
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        surface_texture.present();
        Ok(())
    }

    /// Resizes the surface and recreates the depth buffer
    ///
    /// Zero-sized requests (minimised window) are ignored.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        if (width, height) == (self.config.width, self.config.height) {
            return;
        }

        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&self.device, &self.config);

        self.depth_texture =
            TextureResource::create_depth_texture(&self.device, &self.config, "depth_texture");
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.format
    }

    /// Textures requested but not uploaded yet
    pub fn pending_textures(&self) -> usize {
        self.loader.pending()
    }
}

/// Lit surface pipeline for one material variant
///
/// Transparent variants blend and still write depth; only their draw order
/// differs from opaque ones.
fn surface_pipeline(name: &str, transparent: bool, side: Side, format: TextureFormat) -> PipelineConfig {
    let blend = if transparent {
        wgpu::BlendState::ALPHA_BLENDING
    } else {
        wgpu::BlendState::REPLACE
    };
    let cull_mode = match side {
        Side::Front => Some(wgpu::Face::Back),
        Side::Double => None,
    };
    PipelineConfig::default()
        .with_label(name)
        .with_shader("standard")
        .with_depth_stencil(TextureResource::DEPTH_FORMAT)
        .with_cull_mode(cull_mode)
        .with_color_target(format, blend)
}

fn present_mode(vsync: bool) -> wgpu::PresentMode {
    if vsync {
        wgpu::PresentMode::AutoVsync
    } else {
        wgpu::PresentMode::AutoNoVsync
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn validate(source: &str) -> naga::Module {
        let module = naga::front::wgsl::parse_str(source).unwrap();
        naga::valid::Validator::new(
            naga::valid::ValidationFlags::all(),
            naga::valid::Capabilities::all(),
        )
        .validate(&module)
        .unwrap();
        module
    }

    fn has_function(module: &naga::Module, name: &str) -> bool {
        module
            .functions
            .iter()
            .any(|(_, function)| function.name.as_deref() == Some(name))
    }

    #[test]
    fn shaders_validate() {
        let standard = validate(include_str!("standard.wgsl"));
        assert!(has_function(&standard, "moon_shadow_factor"));
        assert!(has_function(&standard, "point_shadow_factor"));
        validate(include_str!("shadow_pass.wgsl"));
    }

    #[test]
    fn shadow_lookups_filter_a_texel_neighbourhood() {
        let source = include_str!("standard.wgsl");
        assert!(source.contains("const PCF_RADIUS: i32 = 1;"));
        assert!(source.contains("let texel = globals.fog_range.w;"));
        assert!(source.contains("let texel = light.shadow.z;"));
        assert_eq!(source.matches("vec2<f32>(f32(x), f32(y)) * texel").count(), 2);
    }

    #[test]
    fn transparent_variants_blend_over_a_depth_tested_target() {
        for (name, transparent, side) in PIPELINE_VARIANTS {
            let config = surface_pipeline(name, transparent, side, TextureFormat::Bgra8UnormSrgb);
            let target = config.color_targets[0].as_ref().unwrap();
            let expected = if transparent {
                wgpu::BlendState::ALPHA_BLENDING
            } else {
                wgpu::BlendState::REPLACE
            };
            assert_eq!(target.blend, Some(expected), "{name}");
            assert_eq!(config.depth_format, Some(TextureResource::DEPTH_FORMAT), "{name}");
            assert!(!config.vertex_only, "{name}");
        }
    }

    #[test]
    fn double_sided_variants_disable_culling() {
        for (name, transparent, side) in PIPELINE_VARIANTS {
            let config = surface_pipeline(name, transparent, side, TextureFormat::Bgra8UnormSrgb);
            match side {
                Side::Front => assert_eq!(config.cull_mode, Some(wgpu::Face::Back), "{name}"),
                Side::Double => assert_eq!(config.cull_mode, None, "{name}"),
            }
        }
    }
}
