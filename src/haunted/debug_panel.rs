//! Light tuning panel
//!
//! Exposes the ambient and moon light to live editing. Every control clamps
//! to its range and snaps to a 0.001 grid, so typed-in values behave like
//! dragged ones.

use crate::gfx::scene::{LightId, Scene};

/// A bounded numeric control
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DebugParam {
    pub label: &'static str,
    pub min: f32,
    pub max: f32,
    pub step: f32,
}

impl DebugParam {
    pub const fn new(label: &'static str, min: f32, max: f32) -> Self {
        Self {
            label,
            min,
            max,
            step: 0.001,
        }
    }

    /// Clamps `value` into range, then rounds it to the nearest step
    pub fn quantise(&self, value: f32) -> f32 {
        if !value.is_finite() {
            return self.min;
        }
        let clamped = value.clamp(self.min, self.max);
        let snapped = self.min + ((clamped - self.min) / self.step).round() * self.step;
        snapped.clamp(self.min, self.max)
    }
}

/// What a panel control edits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    AmbientIntensity,
    MoonIntensity,
    MoonX,
    MoonY,
    MoonZ,
}

pub const CONTROLS: [(Control, DebugParam); 5] = [
    (
        Control::AmbientIntensity,
        DebugParam::new("Ambient Light Intensity", 0.0, 1.0),
    ),
    (
        Control::MoonIntensity,
        DebugParam::new("Moon Light Intensity", 0.0, 1.0),
    ),
    (Control::MoonX, DebugParam::new("x", -5.0, 5.0)),
    (Control::MoonY, DebugParam::new("y", -5.0, 5.0)),
    (Control::MoonZ, DebugParam::new("z", -5.0, 5.0)),
];

/// Panel bound to the scene's ambient and moon lights
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DebugPanel {
    pub ambient: LightId,
    pub moon: LightId,
    pub visible: bool,
}

impl DebugPanel {
    pub fn new(ambient: LightId, moon: LightId) -> Self {
        Self {
            ambient,
            moon,
            visible: true,
        }
    }

    /// Current value of `control`, or `None` if its light is missing
    pub fn value(&self, scene: &Scene, control: Control) -> Option<f32> {
        match control {
            Control::AmbientIntensity => scene.light(self.ambient).map(|l| l.intensity),
            Control::MoonIntensity => scene.light(self.moon).map(|l| l.intensity),
            Control::MoonX => scene.light(self.moon)?.position().map(|p| p.x),
            Control::MoonY => scene.light(self.moon)?.position().map(|p| p.y),
            Control::MoonZ => scene.light(self.moon)?.position().map(|p| p.z),
        }
    }

    /// Writes a quantised `value` to the light behind `control`
    pub fn set(&self, scene: &mut Scene, control: Control, param: &DebugParam, value: f32) {
        let value = param.quantise(value);
        match control {
            Control::AmbientIntensity => {
                if let Some(light) = scene.light_mut(self.ambient) {
                    light.intensity = value;
                }
            }
            Control::MoonIntensity => {
                if let Some(light) = scene.light_mut(self.moon) {
                    light.intensity = value;
                }
            }
            Control::MoonX | Control::MoonY | Control::MoonZ => {
                let Some(position) = scene
                    .light_mut(self.moon)
                    .and_then(|light| light.position_mut())
                else {
                    return;
                };
                match control {
                    Control::MoonX => position.x = value,
                    Control::MoonY => position.y = value,
                    _ => position.z = value,
                }
            }
        }
    }

    /// Draws the panel and applies any edits to `scene`
    pub fn draw(&self, ui: &imgui::Ui, scene: &mut Scene) {
        if !self.visible {
            return;
        }
        let display_size = ui.io().display_size;
        ui.window("Debug")
            .size([320.0, 0.0], imgui::Condition::FirstUseEver)
            .position(
                [(display_size[0] - 340.0).max(0.0), 20.0],
                imgui::Condition::FirstUseEver,
            )
            .always_auto_resize(true)
            .collapsible(true)
            .build(|| {
                for (control, param) in &CONTROLS {
                    let Some(mut value) = self.value(scene, *control) else {
                        continue;
                    };
                    if ui
                        .slider_config(param.label, param.min, param.max)
                        .display_format("%.3f")
                        .build(&mut value)
                    {
                        self.set(scene, *control, param, value);
                    }
                }
            });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::camera::{CameraManager, OrbitCamera};
    use crate::gfx::color::Color;
    use crate::gfx::lights::Light;
    use approx::assert_relative_eq;
    use cgmath::{Point3, Vector3};

    fn panel_scene() -> (Scene, DebugPanel) {
        let camera = OrbitCamera::looking_at(Point3::new(4.0, 2.0, 5.0), Point3::new(0.0, 0.0, 0.0), 1.0);
        let mut scene = Scene::new(CameraManager::new(camera));
        let ambient = scene.add_light(Light::ambient("ambient", Color::WHITE, 0.12));
        let moon = scene.add_light(Light::directional(
            "moon",
            Color::WHITE,
            0.12,
            Vector3::new(4.0, 5.0, -2.0),
        ));
        (scene, DebugPanel::new(ambient, moon))
    }

    fn param(control: Control) -> DebugParam {
        CONTROLS
            .iter()
            .find(|(c, _)| *c == control)
            .map(|(_, p)| *p)
            .unwrap()
    }

    #[test]
    fn quantise_clamps_to_range() {
        let p = DebugParam::new("x", -5.0, 5.0);
        assert_eq!(p.quantise(9.0), 5.0);
        assert_eq!(p.quantise(-12.0), -5.0);
        assert_eq!(p.quantise(f32::NAN), -5.0);
    }

    #[test]
    fn quantise_snaps_to_thousandths() {
        let p = DebugParam::new("intensity", 0.0, 1.0);
        assert_relative_eq!(p.quantise(0.12345), 0.123, epsilon = 1e-6);
        assert_relative_eq!(p.quantise(0.9996), 1.0, epsilon = 1e-6);
    }

    #[test]
    fn ranges_match_the_panel_layout() {
        assert_eq!(param(Control::AmbientIntensity).max, 1.0);
        assert_eq!(param(Control::MoonIntensity).min, 0.0);
        for c in [Control::MoonX, Control::MoonY, Control::MoonZ] {
            assert_eq!((param(c).min, param(c).max), (-5.0, 5.0));
            assert_eq!(param(c).step, 0.001);
        }
    }

    #[test]
    fn controls_read_the_bound_lights() {
        let (scene, panel) = panel_scene();
        assert_eq!(panel.value(&scene, Control::AmbientIntensity), Some(0.12));
        assert_eq!(panel.value(&scene, Control::MoonY), Some(5.0));
        assert_eq!(panel.value(&scene, Control::MoonZ), Some(-2.0));
    }

    #[test]
    fn edits_are_quantised_and_applied() {
        let (mut scene, panel) = panel_scene();
        panel.set(&mut scene, Control::MoonIntensity, &param(Control::MoonIntensity), 1.7);
        panel.set(&mut scene, Control::MoonX, &param(Control::MoonX), -1.23456);

        let moon = scene.light(panel.moon).unwrap();
        assert_eq!(moon.intensity, 1.0);
        assert_relative_eq!(moon.position().unwrap().x, -1.235, epsilon = 1e-5);
        assert_eq!(scene.light(panel.ambient).unwrap().intensity, 0.12);
    }
}
