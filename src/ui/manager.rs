//! Dear ImGui integration for the debug panel
//!
//! Wraps the imgui context, the winit platform glue and the wgpu renderer so
//! the host only has to forward events, build a frame and draw it on top of
//! the scene.

use imgui::{Context, FontConfig, FontSource, MouseCursor};
use imgui_wgpu::{Renderer, RendererConfig};
use imgui_winit_support::{HiDpiMode, WinitPlatform};
use std::time::Instant;
use wgpu::{CommandEncoder, Device, Queue, TextureFormat, TextureView};
use winit::{
    event::{Event, WindowEvent},
    window::Window,
};

const FONT_SIZE: f32 = 13.0;

/// ImGui UI manager
///
/// The UI is laid out in logical pixels and rasterised at the same capped
/// pixel ratio as the scene surface.
pub struct UiManager {
    pub context: Context,
    platform: WinitPlatform,
    renderer: Renderer,
    last_frame: Instant,
    last_cursor: Option<MouseCursor>,
    pixel_ratio: f32,
}

impl UiManager {
    /// Creates the UI for `window`, drawing into targets of `output_color_format`
    pub fn new(
        device: &Device,
        queue: &Queue,
        output_color_format: TextureFormat,
        window: &Window,
        pixel_ratio: f64,
    ) -> Self {
        let mut context = Context::create();
        context.set_ini_filename(None);

        let mut platform = WinitPlatform::new(&mut context);
        platform.attach_window(context.io_mut(), window, HiDpiMode::Default);

        context.fonts().add_font(&[FontSource::DefaultFontData {
            config: Some(FontConfig {
                oversample_h: 1,
                pixel_snap_h: true,
                size_pixels: FONT_SIZE * pixel_ratio as f32,
                ..Default::default()
            }),
        }]);
        context.io_mut().font_global_scale = 1.0 / pixel_ratio as f32;

        // The renderer must not encode twice when the target already does
        let renderer_config = if output_color_format.is_srgb() {
            RendererConfig {
                texture_format: output_color_format,
                ..RendererConfig::new()
            }
        } else {
            RendererConfig {
                texture_format: output_color_format,
                ..RendererConfig::new_srgb()
            }
        };
        let renderer = Renderer::new(&mut context, device, queue, renderer_config);

        let mut manager = Self {
            context,
            platform,
            renderer,
            last_frame: Instant::now(),
            last_cursor: None,
            pixel_ratio: pixel_ratio as f32,
        };
        manager.set_pixel_ratio(pixel_ratio);
        manager
    }

    /// Applies a new capped pixel ratio after a resize or scale change
    pub fn set_pixel_ratio(&mut self, pixel_ratio: f64) {
        self.pixel_ratio = pixel_ratio as f32;
        self.context.io_mut().display_framebuffer_scale = [self.pixel_ratio, self.pixel_ratio];
    }

    /// Forwards a window event to imgui
    ///
    /// Returns true if the UI wants the input, in which case the camera
    /// should not see it.
    pub fn handle_input<T>(&mut self, window: &Window, event: &Event<T>) -> bool {
        let Event::WindowEvent {
            event: window_event,
            ..
        } = event
        else {
            return false;
        };

        match window_event {
            WindowEvent::CursorMoved { .. }
            | WindowEvent::MouseInput { .. }
            | WindowEvent::MouseWheel { .. }
            | WindowEvent::KeyboardInput { .. }
            | WindowEvent::ModifiersChanged(_)
            | WindowEvent::Resized(_)
            | WindowEvent::ScaleFactorChanged { .. }
            | WindowEvent::Focused(_) => {
                self.platform
                    .handle_event(self.context.io_mut(), window, event);
                // The platform resets the scale to the raw factor
                self.context.io_mut().display_framebuffer_scale =
                    [self.pixel_ratio, self.pixel_ratio];
                self.wants_input()
            }
            _ => false,
        }
    }

    /// True while the pointer is over a window or a widget has keyboard focus
    pub fn wants_input(&self) -> bool {
        let io = self.context.io();
        io.want_capture_mouse || io.want_capture_keyboard
    }

    /// Builds this frame's UI with `run_ui`
    ///
    /// Returns whether the UI wants input capture.
    pub fn update_logic<F>(&mut self, window: &Window, run_ui: F) -> bool
    where
        F: FnOnce(&imgui::Ui),
    {
        let now = Instant::now();
        self.context
            .io_mut()
            .update_delta_time(now - self.last_frame);
        self.last_frame = now;

        if let Err(err) = self.platform.prepare_frame(self.context.io_mut(), window) {
            log::warn!("Skipping UI frame: {}", err);
            return false;
        }

        let ui = self.context.frame();
        run_ui(ui);

        if self.last_cursor != ui.mouse_cursor() {
            self.last_cursor = ui.mouse_cursor();
            self.platform.prepare_render(ui, window);
        }

        self.wants_input()
    }

    /// Draws the UI built by the last [`UiManager::update_logic`] over `color_attachment`
    pub fn render_display_only(
        &mut self,
        device: &Device,
        queue: &Queue,
        encoder: &mut CommandEncoder,
        color_attachment: &TextureView,
    ) {
        let draw_data = self.context.render();

        if draw_data.display_size[0] <= 0.0 || draw_data.display_size[1] <= 0.0 {
            return;
        }

        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("imgui_render_pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: color_attachment,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        if let Err(err) = self
            .renderer
            .render(draw_data, queue, device, &mut render_pass)
        {
            log::error!("Failed to render UI: {}", err);
        }
    }
}
