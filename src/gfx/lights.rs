//! # Lights, shadows and fog
//!
//! Scene lights are plain data. The render engine packs them into the global
//! uniform each frame and derives the shadow camera matrices from them.

use cgmath::{ortho, perspective, Deg, EuclideanSpace, InnerSpace, Matrix4, Point3, Vector3};

use crate::gfx::camera::orbit_camera::OPENGL_TO_WGPU_MATRIX;
use crate::gfx::color::Color;
use crate::gfx::scene::GroupId;

/// Shadow map parameters of a shadow-casting light
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShadowConfig {
    /// Square shadow map resolution in texels
    pub map_size: u32,
    pub near: f32,
    pub far: f32,
    /// Half-size of the orthographic frustum (directional lights only)
    pub half_extent: f32,
    /// Depth bias subtracted before the shadow comparison
    pub bias: f32,
}

impl ShadowConfig {
    /// Default directional shadow camera: 512 texels covering +-5 units
    pub fn directional() -> Self {
        Self {
            map_size: 512,
            near: 0.5,
            far: 500.0,
            half_extent: 5.0,
            bias: 0.0001,
        }
    }

    /// Omnidirectional shadow with the given resolution and far plane
    pub fn point(map_size: u32, far: f32) -> Self {
        Self {
            map_size,
            near: 0.5,
            far,
            half_extent: 0.0,
            bias: 0.001,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LightKind {
    Ambient,
    Directional {
        position: Vector3<f32>,
        target: Vector3<f32>,
        shadow: Option<ShadowConfig>,
    },
    Point {
        position: Vector3<f32>,
        /// Cutoff distance; 0 means unlimited range
        distance: f32,
        decay: f32,
        shadow: Option<ShadowConfig>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Light {
    pub name: String,
    pub color: Color,
    pub intensity: f32,
    pub kind: LightKind,
    /// Group whose transform positions this light
    pub parent: Option<GroupId>,
}

impl Light {
    pub fn ambient(name: &str, color: Color, intensity: f32) -> Self {
        Self::with_kind(name, color, intensity, LightKind::Ambient)
    }

    /// Directional light shining from `position` towards the origin
    pub fn directional(name: &str, color: Color, intensity: f32, position: Vector3<f32>) -> Self {
        Self::with_kind(
            name,
            color,
            intensity,
            LightKind::Directional {
                position,
                target: Vector3::new(0.0, 0.0, 0.0),
                shadow: None,
            },
        )
    }

    /// Point light with linear falloff to zero at `distance`
    pub fn point(name: &str, color: Color, intensity: f32, distance: f32) -> Self {
        Self::with_kind(
            name,
            color,
            intensity,
            LightKind::Point {
                position: Vector3::new(0.0, 0.0, 0.0),
                distance,
                decay: 1.0,
                shadow: None,
            },
        )
    }

    fn with_kind(name: &str, color: Color, intensity: f32, kind: LightKind) -> Self {
        Self {
            name: name.to_string(),
            color,
            intensity,
            kind,
            parent: None,
        }
    }

    pub fn at(mut self, x: f32, y: f32, z: f32) -> Self {
        if let Some(position) = self.position_mut() {
            *position = Vector3::new(x, y, z);
        }
        self
    }

    /// Enables shadow casting; ignored for ambient lights
    pub fn with_shadow(mut self, config: ShadowConfig) -> Self {
        match &mut self.kind {
            LightKind::Ambient => {
                log::warn!("Ambient light '{}' cannot cast shadows", self.name)
            }
            LightKind::Directional { shadow, .. } | LightKind::Point { shadow, .. } => {
                *shadow = Some(config)
            }
        }
        self
    }

    pub fn in_group(mut self, group: GroupId) -> Self {
        self.parent = Some(group);
        self
    }

    /// Local position, `None` for ambient lights
    pub fn position(&self) -> Option<Vector3<f32>> {
        match &self.kind {
            LightKind::Ambient => None,
            LightKind::Directional { position, .. } | LightKind::Point { position, .. } => {
                Some(*position)
            }
        }
    }

    pub fn position_mut(&mut self) -> Option<&mut Vector3<f32>> {
        match &mut self.kind {
            LightKind::Ambient => None,
            LightKind::Directional { position, .. } | LightKind::Point { position, .. } => {
                Some(position)
            }
        }
    }

    pub fn shadow(&self) -> Option<&ShadowConfig> {
        match &self.kind {
            LightKind::Ambient => None,
            LightKind::Directional { shadow, .. } | LightKind::Point { shadow, .. } => {
                shadow.as_ref()
            }
        }
    }

    pub fn is_point(&self) -> bool {
        matches!(self.kind, LightKind::Point { .. })
    }
}

/// Linear distance fog
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fog {
    pub color: Color,
    pub near: f32,
    pub far: f32,
}

impl Fog {
    pub fn linear(color: Color, near: f32, far: f32) -> Self {
        Self { color, near, far }
    }

    /// Fog blend weight at `distance` from the eye, smoothstepped between near and far
    pub fn factor(&self, distance: f32) -> f32 {
        if self.far <= self.near {
            return if distance >= self.far { 1.0 } else { 0.0 };
        }
        let t = ((distance - self.near) / (self.far - self.near)).clamp(0.0, 1.0);
        t * t * (3.0 - 2.0 * t)
    }
}

/// View-projection of a directional light's orthographic shadow camera
pub fn directional_shadow_matrix(
    position: Vector3<f32>,
    target: Vector3<f32>,
    shadow: &ShadowConfig,
) -> Matrix4<f32> {
    let mut eye = position;
    if (eye - target).magnitude2() < 1e-8 {
        eye = target + Vector3::unit_y();
    }
    let direction = (target - eye).normalize();
    let up = if direction.y.abs() > 0.999 {
        Vector3::unit_z()
    } else {
        Vector3::unit_y()
    };

    let view = Matrix4::look_at_rh(Point3::from_vec(eye), Point3::from_vec(target), up);
    let e = shadow.half_extent;
    let projection = ortho(-e, e, -e, e, shadow.near, shadow.far);
    OPENGL_TO_WGPU_MATRIX * projection * view
}

/// Cube face look directions and up vectors, in +X -X +Y -Y +Z -Z order
const CUBE_FACES: [([f32; 3], [f32; 3]); 6] = [
    ([1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
    ([-1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
    ([0.0, 1.0, 0.0], [0.0, 0.0, 1.0]),
    ([0.0, -1.0, 0.0], [0.0, 0.0, -1.0]),
    ([0.0, 0.0, 1.0], [0.0, 1.0, 0.0]),
    ([0.0, 0.0, -1.0], [0.0, 1.0, 0.0]),
];

/// View-projections of the six 90 degree shadow cameras around a point light
///
/// The fragment shader picks the face from the dominant axis of the
/// light-to-fragment vector, so face order must stay +X -X +Y -Y +Z -Z.
pub fn point_shadow_matrices(position: Vector3<f32>, shadow: &ShadowConfig) -> [Matrix4<f32>; 6] {
    let projection = OPENGL_TO_WGPU_MATRIX * perspective(Deg(90.0), 1.0, shadow.near, shadow.far);
    let eye = Point3::from_vec(position);
    CUBE_FACES.map(|(dir, up)| {
        let view = Matrix4::look_to_rh(eye, Vector3::from(dir), Vector3::from(up));
        projection * view
    })
}
