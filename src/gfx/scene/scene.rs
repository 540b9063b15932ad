use cgmath::{EuclideanSpace, InnerSpace, Matrix4, Point3, SquareMatrix, Transform as _, Vector3};

use super::object::{Mesh, SceneObject};
use super::transform::Transform;
use super::{GeometryId, GroupId, LightId, ObjectId};
use crate::gfx::{
    camera::camera_utils::CameraManager,
    color::Color,
    geometry::GeometryData,
    lights::{Fog, Light},
    resources::material::{Material, MaterialManager},
    resources::texture_library::TextureLibrary,
};
use crate::wgpu_utils::BindGroupLayoutWithDesc;

/// Transform node parenting objects and lights
#[derive(Debug, Clone, PartialEq)]
pub struct Group {
    pub name: String,
    pub transform: Transform,
}

/// Retained scene graph: geometry, materials, textures, objects, lights and fog
pub struct Scene {
    pub camera_manager: CameraManager,
    pub objects: Vec<SceneObject>,
    pub groups: Vec<Group>,
    pub meshes: Vec<Mesh>,
    pub lights: Vec<Light>,
    pub material_manager: MaterialManager,
    pub textures: TextureLibrary,
    pub fog: Option<Fog>,
    pub background: Color,
}

impl Scene {
    pub fn new(camera_manager: CameraManager) -> Self {
        Self {
            camera_manager,
            objects: Vec::new(),
            groups: Vec::new(),
            meshes: Vec::new(),
            lights: Vec::new(),
            material_manager: MaterialManager::new(),
            textures: TextureLibrary::new(),
            fog: None,
            background: Color::BLACK,
        }
    }

    /// Updates the scene (camera matrices, etc.)
    pub fn update(&mut self) {
        self.camera_manager.update();
    }

    pub fn add_mesh(&mut self, data: &GeometryData) -> GeometryId {
        self.meshes.push(Mesh::from_geometry(data));
        GeometryId(self.meshes.len() - 1)
    }

    pub fn add_group(&mut self, name: &str, transform: Transform) -> GroupId {
        self.groups.push(Group {
            name: name.to_string(),
            transform,
        });
        GroupId(self.groups.len() - 1)
    }

    pub fn add_object(&mut self, object: SceneObject) -> ObjectId {
        if self.material_manager.get_material(&object.material).is_none() {
            log::warn!(
                "Object '{}' uses unknown material '{}', default material will be used",
                object.name,
                object.material
            );
        }
        self.objects.push(object);
        ObjectId(self.objects.len() - 1)
    }

    pub fn add_light(&mut self, light: Light) -> LightId {
        self.lights.push(light);
        LightId(self.lights.len() - 1)
    }

    pub fn object(&self, id: ObjectId) -> Option<&SceneObject> {
        self.objects.get(id.0)
    }

    pub fn object_mut(&mut self, id: ObjectId) -> Option<&mut SceneObject> {
        self.objects.get_mut(id.0)
    }

    pub fn light(&self, id: LightId) -> Option<&Light> {
        self.lights.get(id.0)
    }

    pub fn light_mut(&mut self, id: LightId) -> Option<&mut Light> {
        self.lights.get_mut(id.0)
    }

    pub fn mesh(&self, id: GeometryId) -> Option<&Mesh> {
        self.meshes.get(id.0)
    }

    pub fn group_matrix(&self, group: Option<GroupId>) -> Matrix4<f32> {
        group
            .and_then(|id| self.groups.get(id.0))
            .map(|g| g.transform.matrix())
            .unwrap_or_else(Matrix4::identity)
    }

    /// Parent group matrix times the object's local matrix
    pub fn world_matrix(&self, object: &SceneObject) -> Matrix4<f32> {
        self.group_matrix(object.parent) * object.transform.matrix()
    }

    /// World-space position of a positional light
    pub fn light_world_position(&self, light: &Light) -> Option<Vector3<f32>> {
        let local = light.position()?;
        let world = self
            .group_matrix(light.parent)
            .transform_point(Point3::from_vec(local));
        Some(world.to_vec())
    }

    /// Uploads mesh buffers and creates per-object transform bindings
    ///
    /// Must be called after the GPU context is available and before rendering.
    pub fn init_gpu_resources(&mut self, device: &wgpu::Device, transform_layout: &BindGroupLayoutWithDesc) {
        for mesh in &mut self.meshes {
            mesh.init_gpu_resources(device);
        }
        for object in &mut self.objects {
            object.init_gpu_resources(device, transform_layout);
        }
    }

    /// Recomputes world matrices and syncs the changed ones to the GPU
    pub fn update_all_transforms(&mut self, queue: &wgpu::Queue) {
        let group_matrices: Vec<Matrix4<f32>> =
            self.groups.iter().map(|g| g.transform.matrix()).collect();
        for object in &mut self.objects {
            let parent = object
                .parent
                .and_then(|id| group_matrices.get(id.0).copied())
                .unwrap_or_else(Matrix4::identity);
            let world = parent * object.transform.matrix();
            object.update_transform(queue, world);
        }
    }

    /// Returns the object's material, or the default material if it has none
    pub fn get_material_for_object(&self, object: &SceneObject) -> &Material {
        self.material_manager.get_material_for_object(&object.material)
    }

    /// Visible objects in submission order
    ///
    /// Opaque objects come first in insertion order, followed by transparent
    /// ones sorted back to front from the camera.
    pub fn draw_order(&self) -> Vec<ObjectId> {
        let eye = self.camera_manager.camera.eye().to_vec();
        let mut opaque = Vec::new();
        let mut transparent = Vec::new();

        for (index, object) in self.objects.iter().enumerate() {
            if !object.visible {
                continue;
            }
            if self.get_material_for_object(object).transparent {
                let centre = self.world_matrix(object).w.truncate();
                transparent.push((ObjectId(index), (centre - eye).magnitude2()));
            } else {
                opaque.push(ObjectId(index));
            }
        }

        transparent.sort_by(|a, b| b.1.total_cmp(&a.1));
        opaque.extend(transparent.into_iter().map(|(id, _)| id));
        opaque
    }

    pub fn shadow_casters(&self) -> impl Iterator<Item = &SceneObject> {
        self.objects.iter().filter(|o| o.visible && o.cast_shadow)
    }

    /// Shadow map resolutions needed by the lights: (directional, point)
    ///
    /// Point lights share one layered texture, so the largest point request wins.
    /// A size of 1 means no light of that kind casts shadows.
    pub fn shadow_map_sizes(&self) -> (u32, u32) {
        let mut directional = 1;
        let mut point = 1;
        for light in &self.lights {
            if let Some(shadow) = light.shadow() {
                if light.is_point() {
                    point = point.max(shadow.map_size);
                } else {
                    directional = directional.max(shadow.map_size);
                }
            }
        }
        (directional, point)
    }

    /// Gets statistics about the scene
    pub fn get_statistics(&self) -> SceneStatistics {
        let mesh_of = |object: &SceneObject| self.mesh(object.geometry);
        SceneStatistics {
            object_count: self.objects.len(),
            light_count: self.lights.len(),
            material_count: self.material_manager.list_materials().len(),
            total_triangles: self
                .objects
                .iter()
                .filter_map(mesh_of)
                .map(|m| m.index_count() / 3)
                .sum(),
            total_vertices: self
                .objects
                .iter()
                .filter_map(mesh_of)
                .map(|m| m.vertex_count())
                .sum(),
        }
    }
}

/// Scene statistics for debugging and UI display
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SceneStatistics {
    pub object_count: usize,
    pub light_count: usize,
    pub material_count: usize,
    pub total_triangles: u32,
    pub total_vertices: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::camera::camera_utils::CameraManager;
    use crate::gfx::camera::orbit_camera::OrbitCamera;
    use crate::gfx::color::Color;
    use crate::gfx::geometry::generate_box;
    use crate::gfx::lights::ShadowConfig;
    use approx::assert_relative_eq;

    fn empty_scene() -> Scene {
        let camera = OrbitCamera::looking_at(Point3::new(0.0, 0.0, 10.0), Point3::new(0.0, 0.0, 0.0), 1.0);
        Scene::new(CameraManager::new(camera))
    }

    #[test]
    fn grouped_objects_inherit_group_transform() {
        let mut scene = empty_scene();
        let cube = scene.add_mesh(&generate_box(1.0, 1.0, 1.0));
        let house = scene.add_group("house", Transform::from_position(10.0, 0.0, 0.0));
        let id = scene.add_object(
            SceneObject::new("door", cube, "door")
                .with_transform(Transform::from_position(0.0, 1.0, 2.0))
                .in_group(house),
        );

        let world = scene.world_matrix(scene.object(id).unwrap());
        assert_eq!(world.w.truncate(), Vector3::new(10.0, 1.0, 2.0));
    }

    #[test]
    fn grouped_light_position_is_world_space() {
        let mut scene = empty_scene();
        let house = scene.add_group("house", Transform::from_position(0.0, 1.0, 0.0));
        let light = Light::point("door light", Color::WHITE, 1.0, 7.0)
            .at(0.0, 2.2, 2.7)
            .in_group(house);
        let position = scene.light_world_position(&light).unwrap();
        assert_relative_eq!(position.y, 3.2, epsilon = 1e-6);
        assert_relative_eq!(position.z, 2.7, epsilon = 1e-6);
    }

    #[test]
    fn transparent_objects_draw_last_back_to_front() {
        let mut scene = empty_scene();
        scene
            .material_manager
            .add_material(Material::new("glass").with_transparency(0.5));
        scene.material_manager.add_material(Material::new("stone"));
        let cube = scene.add_mesh(&generate_box(1.0, 1.0, 1.0));

        let near = scene.add_object(
            SceneObject::new("near", cube, "glass").with_transform(Transform::from_position(0.0, 0.0, 5.0)),
        );
        let stone = scene.add_object(SceneObject::new("stone", cube, "stone"));
        let far = scene.add_object(
            SceneObject::new("far", cube, "glass").with_transform(Transform::from_position(0.0, 0.0, -5.0)),
        );
        let mut hidden = SceneObject::new("hidden", cube, "stone");
        hidden.visible = false;
        scene.add_object(hidden);

        assert_eq!(scene.draw_order(), vec![stone, far, near]);
    }

    #[test]
    fn shadow_map_sizes_follow_lights() {
        let mut scene = empty_scene();
        assert_eq!(scene.shadow_map_sizes(), (1, 1));

        scene.add_light(
            Light::directional("moon", Color::WHITE, 0.12, Vector3::new(4.0, 5.0, -2.0))
                .with_shadow(ShadowConfig::directional()),
        );
        scene.add_light(Light::point("a", Color::WHITE, 1.0, 7.0).with_shadow(ShadowConfig::point(256, 7.0)));
        scene.add_light(Light::point("b", Color::WHITE, 1.0, 7.0));
        assert_eq!(scene.shadow_map_sizes(), (512, 256));
    }

    #[test]
    fn statistics_count_shared_geometry_per_object() {
        let mut scene = empty_scene();
        let cube = scene.add_mesh(&generate_box(1.0, 1.0, 1.0));
        scene.add_object(SceneObject::new("a", cube, "default"));
        scene.add_object(SceneObject::new("b", cube, "default"));
        let stats = scene.get_statistics();
        assert_eq!(stats.object_count, 2);
        assert_eq!(stats.total_triangles, 24);
        assert_eq!(stats.total_vertices, 48);
    }
}
