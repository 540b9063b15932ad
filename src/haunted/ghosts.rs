//! Ghost light animation
//!
//! Three coloured point lights drift around the house. Their positions are a
//! pure function of the scene time, so the host only has to feed in the
//! clock and copy the result onto the lights.

use cgmath::Vector3;

use crate::gfx::scene::{LightId, Scene};

/// Ghost positions for one frame, in world space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GhostFrame {
    pub positions: [Vector3<f32>; 3],
}

/// Positions of the three ghosts `t` seconds after the scene loaded
///
/// Ghost 1 circles at radius 4 and bobs once per π seconds. Ghost 2 circles
/// the other way with a beating bob. Ghost 3 wanders between radius 6 and 8.
pub fn advance(t: f32) -> GhostFrame {
    let a1 = t * 0.5;
    let ghost1 = Vector3::new(a1.cos() * 4.0, (t * 2.0).sin(), a1.sin() * 4.0);

    let a2 = -t * 0.32;
    let ghost2 = Vector3::new(
        a2.cos() * 4.0,
        (t * 2.0).sin() + (t * 1.2).sin(),
        a2.sin() * 4.0,
    );

    let a3 = -t * 0.18;
    let radius_x = 7.0 + (t * 0.32).sin();
    let radius_z = 7.0 + (t * 0.5).sin();
    let ghost3 = Vector3::new(
        a3.cos() * radius_x,
        (t * 4.0).sin() + (t * 2.5).sin(),
        a3.sin() * radius_z,
    );

    GhostFrame {
        positions: [ghost1, ghost2, ghost3],
    }
}

/// Handles of the three ghost lights in the scene
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GhostRig {
    pub lights: [LightId; 3],
}

impl GhostRig {
    /// Moves the ghost lights to the positions of `frame`
    pub fn apply(&self, scene: &mut Scene, frame: &GhostFrame) {
        for (id, position) in self.lights.iter().zip(frame.positions) {
            match scene.light_mut(*id).and_then(|light| light.position_mut()) {
                Some(target) => *target = position,
                None => log::warn!("Ghost light {:?} has no position", id),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::camera::{CameraManager, OrbitCamera};
    use crate::gfx::color::Color;
    use crate::gfx::lights::Light;
    use approx::assert_relative_eq;
    use cgmath::Point3;
    use std::f32::consts::PI;

    #[test]
    fn starts_on_the_positive_x_axis() {
        let frame = advance(0.0);
        assert_eq!(frame.positions[0], Vector3::new(4.0, 0.0, 0.0));
        assert_eq!(frame.positions[1], Vector3::new(4.0, 0.0, 0.0));
        assert_eq!(frame.positions[2], Vector3::new(7.0, 0.0, 0.0));
    }

    #[test]
    fn first_ghost_repeats_every_four_pi() {
        for &t in &[0.0_f32, 0.7, 3.3, 12.5] {
            let now = advance(t).positions[0];
            let later = advance(t + 4.0 * PI).positions[0];
            assert_relative_eq!(now.x, later.x, epsilon = 1e-3);
            assert_relative_eq!(now.z, later.z, epsilon = 1e-3);
        }
    }

    #[test]
    fn circling_ghosts_stay_on_radius_four() {
        for step in 0..200 {
            let frame = advance(step as f32 * 0.37);
            for ghost in &frame.positions[..2] {
                assert_relative_eq!(ghost.x.hypot(ghost.z), 4.0, epsilon = 1e-4);
            }
        }
    }

    #[test]
    fn wandering_ghost_radius_terms_stay_between_six_and_eight() {
        for step in 0..500 {
            let t = step as f32 * 0.21;
            let ghost = advance(t).positions[2];
            let a3 = -t * 0.18;
            // Recover each radius term from the axis it scales
            if a3.cos().abs() > 0.1 {
                let rx = ghost.x / a3.cos();
                assert!((6.0 - 1e-3..=8.0 + 1e-3).contains(&rx), "rx {rx} at t {t}");
            }
            if a3.sin().abs() > 0.1 {
                let rz = ghost.z / a3.sin();
                assert!((6.0 - 1e-3..=8.0 + 1e-3).contains(&rz), "rz {rz} at t {t}");
            }
        }
    }

    #[test]
    fn bobbing_is_bounded() {
        for step in 0..300 {
            let frame = advance(step as f32 * 0.13);
            assert!(frame.positions[0].y.abs() <= 1.0);
            assert!(frame.positions[1].y.abs() <= 2.0);
            assert!(frame.positions[2].y.abs() <= 2.0);
        }
    }

    #[test]
    fn rig_moves_only_its_lights() {
        let camera = OrbitCamera::looking_at(Point3::new(4.0, 2.0, 5.0), Point3::new(0.0, 0.0, 0.0), 1.0);
        let mut scene = Scene::new(CameraManager::new(camera));
        let door = scene.add_light(Light::point("door", Color::WHITE, 1.0, 7.0).at(0.0, 2.2, 2.7));
        let lights = [
            scene.add_light(Light::point("ghost1", Color::WHITE, 2.0, 3.0)),
            scene.add_light(Light::point("ghost2", Color::WHITE, 2.0, 3.0)),
            scene.add_light(Light::point("ghost3", Color::WHITE, 2.0, 3.0)),
        ];
        let rig = GhostRig { lights };

        let frame = advance(2.5);
        rig.apply(&mut scene, &frame);

        for (id, expected) in lights.iter().zip(frame.positions) {
            assert_eq!(scene.light(*id).unwrap().position(), Some(expected));
        }
        assert_eq!(
            scene.light(door).unwrap().position(),
            Some(Vector3::new(0.0, 2.2, 2.7))
        );
    }
}
