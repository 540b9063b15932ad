//! Static composition of the haunted house scene
//!
//! Everything is built once: textures, materials, shared geometry, the house
//! group, bushes, graves, floor, lights, fog and camera. Only the ghost lights
//! move afterwards.

use cgmath::{Point3, Vector3};
use rand::Rng;
use std::f32::consts::{FRAC_PI_2, FRAC_PI_4};

use super::ghosts::GhostRig;
use super::graves::{generate_grave_field, GraveFieldParams};
use crate::gfx::{
    camera::{CameraManager, OrbitCamera},
    color::Color,
    geometry::{generate_box, generate_cone, generate_plane, generate_sphere},
    lights::{Fog, Light, ShadowConfig},
    resources::{
        material::{Material, Side, TextureMaps},
        texture_library::{ColorSpace, TextureLibrary},
    },
    scene::{GroupId, LightId, ObjectId, Scene, SceneObject, Transform},
};

pub const HOUSE_WIDTH: f32 = 4.0;
pub const WALLS_HEIGHT: f32 = 2.5;
pub const ROOF_HEIGHT: f32 = 1.0;
pub const DOOR_HEIGHT: f32 = 2.0;

const MOON_COLOR: u32 = 0xb9d5ff;
const FOG_COLOR: u32 = 0x262837;

const POINT_SHADOW_SIZE: u32 = 256;
const POINT_SHADOW_FAR: f32 = 7.0;

/// Bush scale and position, all sharing one sphere and one material
const BUSHES: [(f32, [f32; 3]); 4] = [
    (0.5, [0.8, 0.2, 2.2]),
    (0.25, [1.4, 0.1, 2.1]),
    (0.4, [-0.8, 0.1, 2.2]),
    (0.15, [-1.0, 0.05, 2.6]),
];

const GHOSTS: [(&str, u32); 3] = [
    ("ghost1", 0xff00ff),
    ("ghost2", 0x00ffff),
    ("ghost3", 0xffff00),
];

/// The composed scene plus handles to everything that changes at runtime
pub struct HauntedScene {
    pub scene: Scene,
    pub house: GroupId,
    pub graves: GroupId,
    pub bushes: [ObjectId; 4],
    pub ambient: LightId,
    pub moon: LightId,
    pub door_light: LightId,
    pub ghosts: GhostRig,
}

/// Builds the haunted house for a viewport of the given aspect ratio
///
/// `rng` drives the grave field only.
pub fn compose<R: Rng + ?Sized>(rng: &mut R, aspect: f32) -> HauntedScene {
    let camera = OrbitCamera::looking_at(
        Point3::new(4.0, 2.0, 5.0),
        Point3::new(0.0, 0.0, 0.0),
        aspect,
    );
    let mut scene = Scene::new(CameraManager::new(camera));

    register_materials(&mut scene);

    // House
    let house = scene.add_group("house", Transform::default());

    let walls_geometry = scene.add_mesh(&generate_box(HOUSE_WIDTH, WALLS_HEIGHT, HOUSE_WIDTH));
    scene.add_object(
        SceneObject::new("walls", walls_geometry, "bricks")
            .with_transform(Transform::from_position(0.0, WALLS_HEIGHT * 0.5, 0.0))
            .casting_shadow()
            .receiving_shadow()
            .in_group(house),
    );

    let roof_geometry = scene.add_mesh(&generate_cone(3.5, ROOF_HEIGHT, 4));
    scene.add_object(
        SceneObject::new("roof", roof_geometry, "roof")
            .with_transform(
                Transform::from_position(0.0, WALLS_HEIGHT + ROOF_HEIGHT * 0.5, 0.0)
                    .with_rotation(0.0, FRAC_PI_4, 0.0),
            )
            .in_group(house),
    );

    // Dense grid so the height map has vertices to push
    let door_geometry = scene.add_mesh(&generate_plane(DOOR_HEIGHT, DOOR_HEIGHT, 50, 50));
    scene.add_object(
        SceneObject::new("door", door_geometry, "door")
            .with_transform(Transform::from_position(
                0.0,
                DOOR_HEIGHT * 0.46,
                HOUSE_WIDTH * 0.5 + 0.01,
            ))
            .in_group(house),
    );

    // Bushes
    let bush_geometry = scene.add_mesh(&generate_sphere(1.0, 16, 16));
    let bushes = BUSHES.map(|(scale, [x, y, z])| {
        scene.add_object(
            SceneObject::new("bush", bush_geometry, "bush")
                .with_transform(Transform::from_position(x, y, z).with_uniform_scale(scale))
                .casting_shadow(),
        )
    });

    // Graves
    let graves = scene.add_group("graves", Transform::default());
    let grave_params = GraveFieldParams::around_house(HOUSE_WIDTH);
    let grave_geometry = scene.add_mesh(&generate_box(0.6, grave_params.grave_height, 0.2));
    for (index, placement) in generate_grave_field(rng, &grave_params).iter().enumerate() {
        scene.add_object(
            SceneObject::new(&format!("grave{}", index), grave_geometry, "grave")
                .with_transform(placement.transform())
                .casting_shadow()
                .in_group(graves),
        );
    }

    // Floor
    let floor_geometry = scene.add_mesh(&generate_plane(20.0, 20.0, 1, 1));
    scene.add_object(
        SceneObject::new("floor", floor_geometry, "grass")
            .with_transform(Transform::default().with_rotation(-FRAC_PI_2, 0.0, 0.0))
            .receiving_shadow(),
    );

    // Lights
    let moon_color = Color::from_hex(MOON_COLOR);
    let ambient = scene.add_light(Light::ambient("ambient", moon_color, 0.12));
    let moon = scene.add_light(
        Light::directional("moon", moon_color, 0.12, Vector3::new(4.0, 5.0, -2.0))
            .with_shadow(ShadowConfig::directional()),
    );
    let door_light = scene.add_light(
        Light::point("door light", Color::from_hex(0xff7d46), 1.0, 7.0)
            .at(0.0, 2.2, 2.7)
            .with_shadow(ShadowConfig::point(POINT_SHADOW_SIZE, POINT_SHADOW_FAR))
            .in_group(house),
    );
    let ghosts = GhostRig {
        lights: GHOSTS.map(|(name, color)| {
            scene.add_light(
                Light::point(name, Color::from_hex(color), 2.0, 3.0)
                    .with_shadow(ShadowConfig::point(POINT_SHADOW_SIZE, POINT_SHADOW_FAR)),
            )
        }),
    };

    // Fog doubles as the clear color so the ground fades into the sky
    let fog_color = Color::from_hex(FOG_COLOR);
    scene.fog = Some(Fog::linear(fog_color, 1.0, 15.0));
    scene.background = fog_color;

    let stats = scene.get_statistics();
    log::info!(
        "Composed haunted house: {} objects, {} lights, {} textures, {} triangles",
        stats.object_count,
        stats.light_count,
        scene.textures.len(),
        stats.total_triangles
    );

    HauntedScene {
        scene,
        house,
        graves,
        bushes,
        ambient,
        moon,
        door_light,
        ghosts,
    }
}

fn register_materials(scene: &mut Scene) {
    let textures = &mut scene.textures;
    let door = TextureMaps {
        color: Some(textures.register("textures/door/color.jpg", ColorSpace::Srgb)),
        alpha: Some(textures.register("textures/door/alpha.jpg", ColorSpace::Linear)),
        ambient_occlusion: Some(
            textures.register("textures/door/ambientOcclusion.jpg", ColorSpace::Linear),
        ),
        displacement: Some(textures.register("textures/door/height.jpg", ColorSpace::Linear)),
        normal: Some(textures.register("textures/door/normal.jpg", ColorSpace::Linear)),
        metalness: Some(textures.register("textures/door/metalness.jpg", ColorSpace::Linear)),
        roughness: Some(textures.register("textures/door/roughness.jpg", ColorSpace::Linear)),
    };
    let bricks = brick_maps(textures);
    let grass = TextureMaps {
        color: Some(textures.register("textures/grass/color.jpg", ColorSpace::Srgb)),
        ambient_occlusion: Some(
            textures.register("textures/grass/ambientOcclusion.jpg", ColorSpace::Linear),
        ),
        normal: Some(textures.register("textures/grass/normal.jpg", ColorSpace::Linear)),
        // Shared with the walls
        roughness: bricks.roughness,
        ..TextureMaps::default()
    };

    let materials = &mut scene.material_manager;
    materials.add_material(
        Material::new("bricks")
            .with_maps(bricks)
            .with_transparency(1.0),
    );
    materials.add_material(Material::new("roof").with_color(Color::from_hex(0xb35f45)));
    materials.add_material(
        Material::new("door")
            .with_maps(door)
            .with_transparency(1.0)
            .with_displacement_scale(0.1),
    );
    materials.add_material(Material::new("bush").with_color(Color::from_hex(0x89c894)));
    materials.add_material(Material::new("grave").with_color(Color::from_hex(0xb2b6b1)));
    materials.add_material(
        Material::new("grass")
            .with_maps(grass)
            .with_repeat(8.0, 8.0)
            .with_side(Side::Double),
    );
}

fn brick_maps(textures: &mut TextureLibrary) -> TextureMaps {
    TextureMaps {
        color: Some(textures.register("textures/bricks/color.jpg", ColorSpace::Srgb)),
        ambient_occlusion: Some(
            textures.register("textures/bricks/ambientOcclusion.jpg", ColorSpace::Linear),
        ),
        normal: Some(textures.register("textures/bricks/normal.jpg", ColorSpace::Linear)),
        roughness: Some(textures.register("textures/bricks/roughness.jpg", ColorSpace::Linear)),
        ..TextureMaps::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::lights::LightKind;
    use approx::assert_relative_eq;
    use cgmath::InnerSpace;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn haunted() -> HauntedScene {
        compose(&mut StdRng::seed_from_u64(7), 16.0 / 9.0)
    }

    fn object<'a>(scene: &'a Scene, name: &str) -> &'a SceneObject {
        scene
            .objects
            .iter()
            .find(|o| o.name == name)
            .unwrap_or_else(|| panic!("no object named {name}"))
    }

    #[test]
    fn scene_holds_house_bushes_graves_and_floor() {
        let haunted = haunted();
        let scene = &haunted.scene;
        // walls, roof, door, 4 bushes, 50 graves, floor
        assert_eq!(scene.objects.len(), 3 + 4 + 50 + 1);
        let graves = scene
            .objects
            .iter()
            .filter(|o| o.parent == Some(haunted.graves))
            .count();
        assert_eq!(graves, 50);
        for name in ["walls", "roof", "door"] {
            assert_eq!(object(scene, name).parent, Some(haunted.house));
        }
    }

    #[test]
    fn fourteen_distinct_textures_are_registered() {
        let scene = haunted().scene;
        // 15 references, grass roughness reuses the brick one
        assert_eq!(scene.textures.len(), 14);
        let grass = scene.material_manager.get_material("grass").unwrap();
        let bricks = scene.material_manager.get_material("bricks").unwrap();
        assert_eq!(grass.maps.roughness, bricks.maps.roughness);
        assert_eq!(grass.uv_repeat, [8.0, 8.0]);
        assert_eq!(grass.side, Side::Double);
    }

    #[test]
    fn house_parts_are_placed_from_wall_dimensions() {
        let scene = haunted().scene;
        assert_eq!(object(&scene, "walls").transform.position.y, 1.25);
        let roof = object(&scene, "roof");
        assert_eq!(roof.transform.position.y, 3.0);
        assert_relative_eq!(roof.transform.rotation.y, FRAC_PI_4);
        let door = object(&scene, "door");
        assert_relative_eq!(door.transform.position.y, 0.92);
        assert_relative_eq!(door.transform.position.z, 2.01);
    }

    #[test]
    fn shadow_flags_follow_the_scene() {
        let scene = haunted().scene;
        let walls = object(&scene, "walls");
        assert!(walls.cast_shadow && walls.receive_shadow);
        let floor = object(&scene, "floor");
        assert!(floor.receive_shadow && !floor.cast_shadow);
        assert!(!object(&scene, "roof").cast_shadow);
        assert!(!object(&scene, "door").cast_shadow);
        assert!(scene
            .objects
            .iter()
            .filter(|o| o.name == "bush" || o.name.starts_with("grave"))
            .all(|o| o.cast_shadow));
    }

    #[test]
    fn bushes_share_geometry_and_material() {
        let haunted = haunted();
        let scene = &haunted.scene;
        let first = scene.object(haunted.bushes[0]).unwrap();
        for id in haunted.bushes {
            let bush = scene.object(id).unwrap();
            assert_eq!(bush.geometry, first.geometry);
            assert_eq!(bush.material, first.material);
        }
    }

    #[test]
    fn moving_one_bush_leaves_the_others_alone() {
        let mut haunted = haunted();
        let before: Vec<Transform> = haunted
            .bushes
            .iter()
            .map(|id| haunted.scene.object(*id).unwrap().transform)
            .collect();
        let bush_color = haunted.scene.material_manager.get_material("bush").unwrap().color;
        let sphere = haunted.scene.object(haunted.bushes[0]).unwrap().geometry;
        let vertex_count = haunted.scene.mesh(sphere).unwrap().vertex_count();

        haunted
            .scene
            .object_mut(haunted.bushes[1])
            .unwrap()
            .transform
            .position
            .x += 3.0;

        for (index, id) in haunted.bushes.iter().enumerate() {
            let transform = haunted.scene.object(*id).unwrap().transform;
            if index == 1 {
                assert_relative_eq!(transform.position.x, before[1].position.x + 3.0);
            } else {
                assert_eq!(transform, before[index]);
            }
        }
        assert_eq!(
            haunted.scene.material_manager.get_material("bush").unwrap().color,
            bush_color
        );
        assert_eq!(haunted.scene.mesh(sphere).unwrap().vertex_count(), vertex_count);
    }

    #[test]
    fn every_non_ambient_light_casts_shadows() {
        let haunted = haunted();
        let scene = &haunted.scene;
        assert_eq!(scene.lights.len(), 6);
        for light in &scene.lights {
            match light.kind {
                LightKind::Ambient => assert!(light.shadow().is_none()),
                LightKind::Directional { .. } => {
                    assert_eq!(light.shadow().map(|s| s.map_size), Some(512))
                }
                LightKind::Point { .. } => {
                    let shadow = light.shadow().unwrap();
                    assert_eq!(shadow.map_size, 256);
                    assert_eq!(shadow.far, 7.0);
                }
            }
        }
        assert_eq!(scene.shadow_map_sizes(), (512, 256));
    }

    #[test]
    fn door_light_rides_with_the_house() {
        let haunted = haunted();
        let light = haunted.scene.light(haunted.door_light).unwrap();
        assert_eq!(light.parent, Some(haunted.house));
        assert_eq!(light.intensity, 1.0);
        for id in haunted.ghosts.lights {
            let ghost = haunted.scene.light(id).unwrap();
            assert_eq!(ghost.intensity, 2.0);
            assert!(matches!(ghost.kind, LightKind::Point { distance, .. } if distance == 3.0));
        }
    }

    #[test]
    fn fog_matches_background() {
        let scene = haunted().scene;
        let fog = scene.fog.unwrap();
        assert_eq!(fog.near, 1.0);
        assert_eq!(fog.far, 15.0);
        assert_eq!(fog.color, scene.background);
    }

    #[test]
    fn camera_starts_at_four_two_five() {
        let scene = haunted().scene;
        let camera = &scene.camera_manager.camera;
        let eye = camera.eye();
        assert_relative_eq!(eye.x, 4.0, epsilon = 1e-4);
        assert_relative_eq!(eye.y, 2.0, epsilon = 1e-4);
        assert_relative_eq!(eye.z, 5.0, epsilon = 1e-4);
        assert_relative_eq!(camera.aspect, 16.0 / 9.0);
        assert!(camera.target.magnitude() < 1e-6);
        assert!(scene.camera_manager.controller.enable_damping);
    }
}
