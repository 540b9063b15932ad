use winit::{
    dpi::PhysicalPosition,
    event::{ElementState, KeyEvent, MouseScrollDelta},
    keyboard::{KeyCode, PhysicalKey},
};

use super::orbit_camera::OrbitCamera;

/// Distance scale applied per wheel notch
const ZOOM_STEP: f32 = 0.95;
/// Pixel-precise wheels report this many pixels per notch
const PIXELS_PER_LINE: f32 = 50.0;

/// Orbit controls: drag to rotate, shift-drag to pan, wheel to zoom
///
/// Input only accumulates pending motion. [`CameraController::update`] applies
/// it once per frame; with damping enabled each frame applies
/// `damping_factor` of what is pending and keeps the rest, so the camera
/// eases to a stop after the mouse is released.
pub struct CameraController {
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub pan_speed: f32,
    pub enable_damping: bool,
    pub damping_factor: f32,
    pending_yaw: f32,
    pending_pitch: f32,
    pending_pan: (f32, f32),
    pending_zoom: f32,
    is_shift_held: bool,
    is_mouse_pressed: bool,
}

impl CameraController {
    pub fn new(rotate_speed: f32, zoom_speed: f32) -> Self {
        Self {
            rotate_speed,
            zoom_speed,
            pan_speed: 0.01,
            enable_damping: false,
            damping_factor: 0.05,
            pending_yaw: 0.0,
            pending_pitch: 0.0,
            pending_pan: (0.0, 0.0),
            pending_zoom: 1.0,
            is_shift_held: false,
            is_mouse_pressed: false,
        }
    }

    pub fn with_damping(mut self, damping_factor: f32) -> Self {
        self.enable_damping = true;
        self.damping_factor = damping_factor.clamp(f32::EPSILON, 1.0);
        self
    }

    pub fn set_mouse_pressed(&mut self, pressed: bool) {
        self.is_mouse_pressed = pressed;
    }

    pub fn set_shift_held(&mut self, held: bool) {
        if held != self.is_shift_held {
            log::trace!("Shift state changed: {held}");
        }
        self.is_shift_held = held;
    }

    /// Raw mouse motion in pixels; only counts while the button is held
    pub fn process_mouse_motion(&mut self, delta: (f64, f64)) {
        if !self.is_mouse_pressed {
            return;
        }
        let (dx, dy) = (delta.0 as f32, delta.1 as f32);
        if self.is_shift_held {
            self.pending_pan.0 -= dx * self.pan_speed;
            self.pending_pan.1 += dy * self.pan_speed;
        } else {
            self.pending_yaw -= dx * self.rotate_speed;
            self.pending_pitch += dy * self.rotate_speed;
        }
    }

    pub fn process_scroll(&mut self, delta: &MouseScrollDelta) {
        let notches = match delta {
            MouseScrollDelta::LineDelta(_, lines) => *lines,
            MouseScrollDelta::PixelDelta(PhysicalPosition { y, .. }) => *y as f32 / PIXELS_PER_LINE,
        };
        // Scrolling up (positive) moves the camera closer
        self.pending_zoom *= ZOOM_STEP.powf(notches * self.zoom_speed);
    }

    pub fn process_keyed_events(&mut self, event: &KeyEvent, camera: &mut OrbitCamera) {
        match event {
            KeyEvent {
                physical_key: PhysicalKey::Code(KeyCode::ShiftLeft | KeyCode::ShiftRight),
                state,
                ..
            } => self.set_shift_held(*state == ElementState::Pressed),
            KeyEvent {
                physical_key: PhysicalKey::Code(KeyCode::KeyC),
                state: ElementState::Pressed,
                ..
            } if self.is_shift_held => {
                log::info!("Resetting camera to its initial position");
                self.stop();
                camera.reset_to_default();
            }
            _ => (),
        }
    }

    /// Applies pending motion to the camera; call once per frame
    pub fn update(&mut self, camera: &mut OrbitCamera) {
        let factor = if self.enable_damping {
            self.damping_factor
        } else {
            1.0
        };

        if self.pending_yaw != 0.0 {
            camera.add_yaw(self.pending_yaw * factor);
        }
        if self.pending_pitch != 0.0 {
            camera.add_pitch(self.pending_pitch * factor);
        }
        if self.pending_pan != (0.0, 0.0) {
            camera.pan((self.pending_pan.0 * factor, self.pending_pan.1 * factor));
        }
        if self.pending_zoom != 1.0 {
            camera.zoom(self.pending_zoom);
            self.pending_zoom = 1.0;
        }

        let keep = 1.0 - factor;
        self.pending_yaw = settle(self.pending_yaw * keep);
        self.pending_pitch = settle(self.pending_pitch * keep);
        self.pending_pan = (
            settle(self.pending_pan.0 * keep),
            settle(self.pending_pan.1 * keep),
        );
    }

    /// Drops any motion still pending
    pub fn stop(&mut self) {
        self.pending_yaw = 0.0;
        self.pending_pitch = 0.0;
        self.pending_pan = (0.0, 0.0);
        self.pending_zoom = 1.0;
    }

    /// True while a shift-drag is in progress
    pub fn is_panning(&self) -> bool {
        self.is_mouse_pressed && self.is_shift_held
    }
}

impl Default for CameraController {
    fn default() -> Self {
        Self::new(0.005, 1.0).with_damping(0.05)
    }
}

/// Snaps negligible residual motion to zero so damping terminates
fn settle(value: f32) -> f32 {
    if value.abs() < 1e-6 {
        0.0
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use cgmath::{InnerSpace, Vector3, Zero};

    fn camera() -> OrbitCamera {
        OrbitCamera::new(5.0, 0.3, 0.0, Vector3::zero(), 1.0)
    }

    #[test]
    fn motion_without_button_is_ignored() {
        let mut controller = CameraController::new(0.01, 1.0);
        let mut cam = camera();
        controller.process_mouse_motion((100.0, 0.0));
        controller.update(&mut cam);
        assert_eq!(cam.yaw, 0.0);
    }

    #[test]
    fn undamped_drag_applies_immediately() {
        let mut controller = CameraController::new(0.01, 1.0);
        let mut cam = camera();
        controller.set_mouse_pressed(true);
        controller.process_mouse_motion((-50.0, 0.0));
        controller.update(&mut cam);
        assert_relative_eq!(cam.yaw, 0.5);

        controller.update(&mut cam);
        assert_relative_eq!(cam.yaw, 0.5);
    }

    #[test]
    fn damped_drag_eases_to_the_full_rotation() {
        let mut controller = CameraController::new(0.01, 1.0).with_damping(0.05);
        let mut cam = camera();
        controller.set_mouse_pressed(true);
        controller.process_mouse_motion((-50.0, 0.0));
        controller.set_mouse_pressed(false);

        controller.update(&mut cam);
        assert_relative_eq!(cam.yaw, 0.5 * 0.05, epsilon = 1e-6);

        for _ in 0..1000 {
            controller.update(&mut cam);
        }
        assert_relative_eq!(cam.yaw, 0.5, epsilon = 1e-4);
    }

    #[test]
    fn shift_drag_pans_instead_of_rotating() {
        let mut controller = CameraController::new(0.01, 1.0);
        let mut cam = camera();
        controller.set_shift_held(true);
        controller.set_mouse_pressed(true);
        assert!(controller.is_panning());

        controller.process_mouse_motion((10.0, 0.0));
        controller.update(&mut cam);
        assert_eq!(cam.yaw, 0.0);
        assert!(cam.target.magnitude() > 0.0);
    }

    #[test]
    fn scrolling_up_moves_closer() {
        let mut controller = CameraController::default();
        let mut cam = camera();
        controller.process_scroll(&MouseScrollDelta::LineDelta(0.0, 2.0));
        controller.update(&mut cam);
        assert_relative_eq!(cam.distance, 5.0 * 0.95 * 0.95, epsilon = 1e-5);

        controller.process_scroll(&MouseScrollDelta::LineDelta(0.0, -2.0));
        controller.update(&mut cam);
        assert_relative_eq!(cam.distance, 5.0, epsilon = 1e-4);
    }
}
