//! Procedural grave field
//!
//! Graves are scattered on an annulus around the house. Each grave takes four
//! independent draws from the injected random source: angle, radius and two
//! tilt angles.

use cgmath::Vector3;
use rand::Rng;
use std::f32::consts::TAU;

use crate::gfx::scene::Transform;

/// Shape of the grave annulus and of a single grave
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GraveFieldParams {
    pub count: usize,
    /// Inner radius of the annulus
    pub min_radius: f32,
    /// Radial width of the annulus
    pub radius_span: f32,
    pub grave_height: f32,
    /// Sinks the stone so tilted graves never show their base
    pub sink: f32,
    /// Full range of the y and z tilt, centred on zero
    pub max_tilt: f32,
}

impl GraveFieldParams {
    /// The haunted house field: 50 graves between radius 3 and 9
    ///
    /// The inner radius is one unit less than the house width.
    pub fn around_house(house_width: f32) -> Self {
        Self {
            count: 50,
            min_radius: house_width - 1.0,
            radius_span: 6.0,
            grave_height: 0.8,
            sink: 0.1,
            max_tilt: 0.4,
        }
    }

    pub fn max_radius(&self) -> f32 {
        self.min_radius + self.radius_span
    }
}

/// Position and tilt of one grave
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GravePlacement {
    pub position: Vector3<f32>,
    /// Euler XYZ in radians; x is always 0
    pub rotation: Vector3<f32>,
}

impl GravePlacement {
    pub fn transform(&self) -> Transform {
        Transform::from_position(self.position.x, self.position.y, self.position.z).with_rotation(
            self.rotation.x,
            self.rotation.y,
            self.rotation.z,
        )
    }

    /// Distance from the vertical axis through the house
    pub fn radius(&self) -> f32 {
        self.position.x.hypot(self.position.z)
    }
}

/// Draws `params.count` grave placements from `rng`
pub fn generate_grave_field<R: Rng + ?Sized>(
    rng: &mut R,
    params: &GraveFieldParams,
) -> Vec<GravePlacement> {
    let y = params.grave_height * 0.5 - params.sink;
    (0..params.count)
        .map(|_| {
            let angle = rng.random::<f32>() * TAU;
            let radius = params.min_radius + rng.random::<f32>() * params.radius_span;
            let tilt_y = (rng.random::<f32>() - 0.5) * params.max_tilt;
            let tilt_z = (rng.random::<f32>() - 0.5) * params.max_tilt;
            GravePlacement {
                position: Vector3::new(angle.sin() * radius, y, angle.cos() * radius),
                rotation: Vector3::new(0.0, tilt_y, tilt_z),
            }
        })
        .collect()
}
