//! Application host
//!
//! Owns the window, the render engine and the [`AppContext`], and drives them
//! from the winit event loop: one ghost update, camera update and frame per
//! redraw, with the next redraw requested as soon as the loop goes idle.

use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;
use winit::{
    application::ApplicationHandler,
    dpi::LogicalSize,
    event::{DeviceEvent, DeviceId, ElementState, KeyEvent, MouseButton, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowAttributes, WindowId},
};

use crate::clock::Clock;
use crate::config::AppConfig;
use crate::error::{HauntError, Result};
use crate::gfx::{camera::Viewport, rendering::RenderEngine, scene::Scene};
use crate::haunted::{compose, ghosts, DebugPanel, GhostRig};
use crate::ui::UiManager;

/// Everything the scene needs between frames
///
/// Built once from the composed scene and handed to the host.
pub struct AppContext {
    pub scene: Scene,
    pub clock: Clock,
    pub ghosts: GhostRig,
    pub debug_panel: DebugPanel,
    pub viewport: Viewport,
}

impl AppContext {
    /// Composes the haunted house for `viewport`
    ///
    /// A configured grave seed makes the grave field reproducible.
    pub fn new(config: &AppConfig, viewport: Viewport) -> Self {
        let haunted = match config.grave_seed {
            Some(seed) => {
                log::info!("Grave field seed: {}", seed);
                compose(&mut StdRng::seed_from_u64(seed), viewport.aspect())
            }
            None => compose(&mut rand::rng(), viewport.aspect()),
        };

        let mut debug_panel = DebugPanel::new(haunted.ambient, haunted.moon);
        debug_panel.visible = config.show_debug_panel;

        Self {
            scene: haunted.scene,
            clock: Clock::start(),
            ghosts: haunted.ghosts,
            debug_panel,
            viewport,
        }
    }

    /// Advances the ghosts to the current scene time and updates the camera
    pub fn tick(&mut self) {
        let frame = ghosts::advance(self.clock.elapsed_secs());
        self.ghosts.apply(&mut self.scene, &frame);
        self.scene.update();
    }

    /// Applies a new window size or pixel ratio to the camera
    ///
    /// A collapsed viewport keeps the previous size and aspect.
    pub fn resize(&mut self, viewport: Viewport) {
        if viewport.is_empty() {
            return;
        }
        self.viewport = viewport;
        self.scene
            .camera_manager
            .camera
            .resize_projection(viewport.aspect());
    }
}

type UiPass = fn(&wgpu::Device, &wgpu::Queue, &mut wgpu::CommandEncoder, &wgpu::TextureView);

pub struct HauntedApp {
    event_loop: EventLoop<()>,
    state: AppState,
}

struct AppState {
    config: AppConfig,
    window: Option<Arc<Window>>,
    render_engine: Option<RenderEngine>,
    ui_manager: Option<UiManager>,
    context: AppContext,
    error: Option<HauntError>,
}

impl HauntedApp {
    /// Creates the event loop and composes the scene
    ///
    /// The window and GPU resources are created once the event loop resumes.
    pub fn new(config: AppConfig) -> Result<Self> {
        let event_loop = EventLoop::new()?;
        let viewport = Viewport::new(config.width as f64, config.height as f64, 1.0);
        let context = AppContext::new(&config, viewport);

        Ok(Self {
            event_loop,
            state: AppState {
                config,
                window: None,
                render_engine: None,
                ui_manager: None,
                context,
                error: None,
            },
        })
    }

    /// Runs until the window closes
    pub fn run(mut self) -> Result<()> {
        self.event_loop.set_control_flow(ControlFlow::Poll);
        self.event_loop.run_app(&mut self.state)?;

        match self.state.error.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

impl AppState {
    fn fail(&mut self, event_loop: &ActiveEventLoop, err: HauntError) {
        log::error!("{}", err);
        self.error = Some(err);
        event_loop.exit();
    }

    fn create_window(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let attributes = WindowAttributes::default()
            .with_title(self.config.title.clone())
            .with_inner_size(LogicalSize::new(self.config.width, self.config.height));
        let window = Arc::new(event_loop.create_window(attributes)?);

        let viewport = Viewport::from_physical(window.inner_size(), window.scale_factor());
        let (width, height) = viewport.surface_size();
        log::info!(
            "Window {}x{} at pixel ratio {}",
            viewport.logical_width,
            viewport.logical_height,
            viewport.pixel_ratio
        );

        let mut renderer = pollster::block_on(RenderEngine::new(
            window.clone(),
            width,
            height,
            self.config.vsync,
        ))?;
        renderer.prepare_scene(&mut self.context.scene, &self.config.asset_root);
        log::info!("Loading {} textures in the background", renderer.pending_textures());
        self.context.resize(viewport);

        self.ui_manager = Some(UiManager::new(
            renderer.device(),
            renderer.queue(),
            renderer.surface_format(),
            &window,
            viewport.pixel_ratio,
        ));
        self.render_engine = Some(renderer);
        self.window = Some(window);
        Ok(())
    }

    fn apply_viewport(&mut self, viewport: Viewport) {
        if viewport.is_empty() {
            log::debug!("Window minimised; keeping the current surface");
            return;
        }
        self.context.resize(viewport);
        let (width, height) = viewport.surface_size();
        if let Some(render_engine) = self.render_engine.as_mut() {
            render_engine.resize(width, height);
        }
        if let Some(ui_manager) = self.ui_manager.as_mut() {
            ui_manager.set_pixel_ratio(viewport.pixel_ratio);
        }
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let (Some(render_engine), Some(window)) = (self.render_engine.as_mut(), self.window.as_ref())
        else {
            return;
        };

        self.context.tick();
        render_engine.sync(&mut self.context.scene);

        let panel = self.context.debug_panel;
        let result = match self.ui_manager.as_mut() {
            Some(ui_manager) if panel.visible => {
                let scene = &mut self.context.scene;
                ui_manager.update_logic(window, |ui| panel.draw(ui, scene));
                let draw_ui = |device: &wgpu::Device,
                               queue: &wgpu::Queue,
                               encoder: &mut wgpu::CommandEncoder,
                               view: &wgpu::TextureView| {
                    ui_manager.render_display_only(device, queue, encoder, view)
                };
                render_engine.render_frame(&self.context.scene, Some(draw_ui))
            }
            _ => render_engine.render_frame(&self.context.scene, None::<UiPass>),
        };

        if let Err(err) = result {
            self.fail(event_loop, err);
        }
    }
}

impl ApplicationHandler for AppState {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        if let Err(err) = self.create_window(event_loop) {
            self.fail(event_loop, err);
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, window_id: WindowId, event: WindowEvent) {
        let Some(window) = self.window.clone() else {
            return;
        };

        let ui_captured = match self.ui_manager.as_mut() {
            Some(ui_manager) if self.context.debug_panel.visible => {
                let ui_event: winit::event::Event<()> = winit::event::Event::WindowEvent {
                    window_id,
                    event: event.clone(),
                };
                ui_manager.handle_input(&window, &ui_event)
            }
            _ => false,
        };

        let camera = &mut self.context.scene.camera_manager;
        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(KeyCode::Escape),
                        state: ElementState::Pressed,
                        ..
                    },
                ..
            } => event_loop.exit(),
            WindowEvent::KeyboardInput { event, .. } => {
                // Releases always reach the camera so shift never sticks
                if !ui_captured || event.state == ElementState::Released {
                    camera.process_keyboard_event(&event);
                }
            }
            WindowEvent::MouseInput {
                button: MouseButton::Left,
                state,
                ..
            } => match state {
                ElementState::Pressed if !ui_captured => camera.set_mouse_pressed(true),
                ElementState::Released => camera.set_mouse_pressed(false),
                _ => (),
            },
            WindowEvent::MouseWheel { delta, .. } if !ui_captured => camera.process_scroll(&delta),
            WindowEvent::Resized(size) => {
                self.apply_viewport(Viewport::from_physical(size, window.scale_factor()));
            }
            WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                self.apply_viewport(Viewport::from_physical(window.inner_size(), scale_factor));
            }
            WindowEvent::RedrawRequested => self.redraw(event_loop),
            _ => (),
        }
    }

    fn device_event(&mut self, _event_loop: &ActiveEventLoop, _device_id: DeviceId, event: DeviceEvent) {
        if let DeviceEvent::MouseMotion { delta } = event {
            self.context.scene.camera_manager.process_mouse_motion(delta);
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = self.window.as_ref() {
            window.request_redraw();
        }
    }
}
