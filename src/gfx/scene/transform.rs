use cgmath::{Matrix4, Rad, Vector3};

/// Position, Euler rotation and scale of a scene node
///
/// Rotation is intrinsic XYZ in radians. The local matrix is `T * R * S`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vector3<f32>,
    pub rotation: Vector3<f32>,
    pub scale: Vector3<f32>,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vector3::new(0.0, 0.0, 0.0),
            rotation: Vector3::new(0.0, 0.0, 0.0),
            scale: Vector3::new(1.0, 1.0, 1.0),
        }
    }
}

impl Transform {
    pub fn from_position(x: f32, y: f32, z: f32) -> Self {
        Self {
            position: Vector3::new(x, y, z),
            ..Self::default()
        }
    }

    pub fn with_rotation(mut self, x: f32, y: f32, z: f32) -> Self {
        self.rotation = Vector3::new(x, y, z);
        self
    }

    pub fn with_uniform_scale(mut self, scale: f32) -> Self {
        self.scale = Vector3::new(scale, scale, scale);
        self
    }

    pub fn rotation_matrix(&self) -> Matrix4<f32> {
        Matrix4::from_angle_x(Rad(self.rotation.x))
            * Matrix4::from_angle_y(Rad(self.rotation.y))
            * Matrix4::from_angle_z(Rad(self.rotation.z))
    }

    pub fn matrix(&self) -> Matrix4<f32> {
        Matrix4::from_translation(self.position)
            * self.rotation_matrix()
            * Matrix4::from_nonuniform_scale(self.scale.x, self.scale.y, self.scale.z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use cgmath::{Point3, Transform as _};
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn identity_by_default() {
        let p = Transform::default()
            .matrix()
            .transform_point(Point3::new(1.0, 2.0, 3.0));
        assert_eq!(p, Point3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn scales_then_rotates_then_translates() {
        let t = Transform::from_position(0.0, 1.0, 0.0)
            .with_rotation(0.0, FRAC_PI_2, 0.0)
            .with_uniform_scale(2.0);
        let p = t.matrix().transform_point(Point3::new(1.0, 0.0, 0.0));
        // (1,0,0) -> scaled (2,0,0) -> yaw 90 deg to (0,0,-2) -> lifted by 1
        assert_relative_eq!(p.x, 0.0, epsilon = 1e-6);
        assert_relative_eq!(p.y, 1.0, epsilon = 1e-6);
        assert_relative_eq!(p.z, -2.0, epsilon = 1e-6);
    }

    #[test]
    fn floor_rotation_lays_plane_flat() {
        let floor = Transform::default().with_rotation(-FRAC_PI_2, 0.0, 0.0);
        let normal = floor.matrix().transform_vector(Vector3::new(0.0, 0.0, 1.0));
        assert_relative_eq!(normal.y, 1.0, epsilon = 1e-6);
    }
}
