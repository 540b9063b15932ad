//! # Primitive Shape Generation
//!
//! All shapes are generated with outward normals and texture coordinates.

use super::GeometryData;
use std::f32::consts::{PI, TAU};

/// One box face: outward normal plus the in-plane right and up axes
///
/// `right x up == normal`, which makes the quad counter-clockwise seen from
/// outside.
const BOX_FACES: [([f32; 3], [f32; 3], [f32; 3]); 6] = [
    ([1.0, 0.0, 0.0], [0.0, 0.0, -1.0], [0.0, 1.0, 0.0]),
    ([-1.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, 1.0, 0.0]),
    ([0.0, 1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, -1.0]),
    ([0.0, -1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]),
    ([0.0, 0.0, 1.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
    ([0.0, 0.0, -1.0], [-1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
];

/// Generate an axis-aligned box centred at the origin
///
/// Each face carries its own four vertices so normals stay flat and every
/// face maps the full `[0, 1]` texture square.
pub fn generate_box(width: f32, height: f32, depth: f32) -> GeometryData {
    let half = [width * 0.5, height * 0.5, depth * 0.5];
    let extent = |axis: [f32; 3]| -> f32 {
        axis[0].abs() * half[0] + axis[1].abs() * half[1] + axis[2].abs() * half[2]
    };

    let mut data = GeometryData::new();
    for (normal, right, up) in BOX_FACES {
        let depth_offset = extent(normal);
        let half_w = extent(right);
        let half_h = extent(up);

        let corner = |sx: f32, sy: f32| -> [f32; 3] {
            [
                normal[0] * depth_offset + right[0] * half_w * sx + up[0] * half_h * sy,
                normal[1] * depth_offset + right[1] * half_w * sx + up[1] * half_h * sy,
                normal[2] * depth_offset + right[2] * half_w * sx + up[2] * half_h * sy,
            ]
        };

        let base = data.push_vertex(corner(-1.0, -1.0), normal, [0.0, 1.0]);
        data.push_vertex(corner(1.0, -1.0), normal, [1.0, 1.0]);
        data.push_vertex(corner(1.0, 1.0), normal, [1.0, 0.0]);
        data.push_vertex(corner(-1.0, 1.0), normal, [0.0, 0.0]);

        data.indices
            .extend_from_slice(&[base, base + 1, base + 2, base + 2, base + 3, base]);
    }
    data
}

/// Generate a UV sphere
///
/// `width_segments` slices around the Y axis, `height_segments` stacks from
/// pole to pole. The seam column is duplicated so UVs wrap cleanly.
pub fn generate_sphere(radius: f32, width_segments: u32, height_segments: u32) -> GeometryData {
    let width_segments = width_segments.max(3);
    let height_segments = height_segments.max(2);
    let mut data = GeometryData::new();

    for iy in 0..=height_segments {
        let v = iy as f32 / height_segments as f32;
        for ix in 0..=width_segments {
            let u = ix as f32 / width_segments as f32;
            let normal = [
                -(u * TAU).cos() * (v * PI).sin(),
                (v * PI).cos(),
                (u * TAU).sin() * (v * PI).sin(),
            ];
            let position = [normal[0] * radius, normal[1] * radius, normal[2] * radius];
            data.push_vertex(position, normal, [u, v]);
        }
    }

    let row = width_segments + 1;
    for iy in 0..height_segments {
        for ix in 0..width_segments {
            let a = iy * row + ix + 1;
            let b = iy * row + ix;
            let c = (iy + 1) * row + ix;
            let d = (iy + 1) * row + ix + 1;

            // The pole rows collapse to a single point, skip their degenerate halves
            if iy != 0 {
                data.indices.extend_from_slice(&[a, b, d]);
            }
            if iy != height_segments - 1 {
                data.indices.extend_from_slice(&[b, c, d]);
            }
        }
    }
    data
}

/// Generate a subdivided plane in the XY plane, facing +Z
pub fn generate_plane(width: f32, height: f32, width_segments: u32, height_segments: u32) -> GeometryData {
    let width_segments = width_segments.max(1);
    let height_segments = height_segments.max(1);
    let mut data = GeometryData::new();

    for y in 0..=height_segments {
        let fy = y as f32 / height_segments as f32;
        for x in 0..=width_segments {
            let fx = x as f32 / width_segments as f32;
            data.push_vertex(
                [(fx - 0.5) * width, (fy - 0.5) * height, 0.0],
                [0.0, 0.0, 1.0],
                [fx, 1.0 - fy],
            );
        }
    }

    let row = width_segments + 1;
    for y in 0..height_segments {
        for x in 0..width_segments {
            let i = y * row + x;
            let above = i + row;
            data.indices
                .extend_from_slice(&[i, i + 1, above, above, i + 1, above + 1]);
        }
    }
    data
}

/// Generate a closed cone standing on the XZ plane, apex up
///
/// The base sits at `-height / 2`. With four radial segments this is a
/// square pyramid whose corners lie on the X and Z axes.
pub fn generate_cone(radius: f32, height: f32, radial_segments: u32) -> GeometryData {
    let radial_segments = radial_segments.max(3);
    let half_height = height * 0.5;
    let slope = radius / height;
    let mut data = GeometryData::new();

    // Side: an apex ring (one vertex per column so UVs stay continuous) and a base ring
    for ring in 0..=1u32 {
        let v = ring as f32;
        let ring_radius = v * radius;
        for x in 0..=radial_segments {
            let u = x as f32 / radial_segments as f32;
            let (sin, cos) = (u * TAU).sin_cos();
            let normal = normalize([sin, slope, cos]);
            data.push_vertex(
                [ring_radius * sin, half_height - v * height, ring_radius * cos],
                normal,
                [u, v],
            );
        }
    }

    let row = radial_segments + 1;
    for x in 0..radial_segments {
        let apex = x;
        let base = row + x;
        data.indices.extend_from_slice(&[base, base + 1, apex + 1]);
    }

    // Base cap, facing down
    let centre_start = data.vertices.len() as u32;
    for _ in 0..radial_segments {
        data.push_vertex([0.0, -half_height, 0.0], [0.0, -1.0, 0.0], [0.5, 0.5]);
    }
    let rim_start = data.vertices.len() as u32;
    for x in 0..=radial_segments {
        let (sin, cos) = (x as f32 / radial_segments as f32 * TAU).sin_cos();
        data.push_vertex(
            [radius * sin, -half_height, radius * cos],
            [0.0, -1.0, 0.0],
            [sin * 0.5 + 0.5, 0.5 - cos * 0.5],
        );
    }
    for x in 0..radial_segments {
        let centre = centre_start + x;
        let rim = rim_start + x;
        data.indices.extend_from_slice(&[rim + 1, rim, centre]);
    }
    data
}

fn normalize(v: [f32; 3]) -> [f32; 3] {
    let len = (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt();
    if len > 0.0 {
        [v[0] / len, v[1] / len, v[2] / len]
    } else {
        v
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    /// Every triangle's geometric normal must agree with its vertex normals
    fn assert_outward_winding(data: &GeometryData) {
        for tri in data.indices.chunks(3) {
            let [a, b, c] = [tri[0], tri[1], tri[2]].map(|i| data.vertices[i as usize]);
            let ab = [b[0] - a[0], b[1] - a[1], b[2] - a[2]];
            let ac = [c[0] - a[0], c[1] - a[1], c[2] - a[2]];
            let face = [
                ab[1] * ac[2] - ab[2] * ac[1],
                ab[2] * ac[0] - ab[0] * ac[2],
                ab[0] * ac[1] - ab[1] * ac[0],
            ];
            let n = data.normals[tri[0] as usize];
            let dot = face[0] * n[0] + face[1] * n[1] + face[2] * n[2];
            assert!(dot > 0.0, "triangle {tri:?} winds against its normal");
        }
    }

    #[test]
    fn test_box_generation() {
        let walls = generate_box(4.0, 2.5, 4.0);
        assert_eq!(walls.vertex_count(), 24);
        assert_eq!(walls.triangle_count(), 12);
        assert_outward_winding(&walls);

        let max_y = walls.vertices.iter().map(|v| v[1]).fold(f32::MIN, f32::max);
        let max_z = walls.vertices.iter().map(|v| v[2]).fold(f32::MIN, f32::max);
        assert_relative_eq!(max_y, 1.25);
        assert_relative_eq!(max_z, 2.0);
    }

    #[test]
    fn test_grave_box_is_thin() {
        let grave = generate_box(0.6, 0.8, 0.2);
        let min_z = grave.vertices.iter().map(|v| v[2]).fold(f32::MAX, f32::min);
        assert_relative_eq!(min_z, -0.1);
    }

    #[test]
    fn test_sphere_generation() {
        let sphere = generate_sphere(1.0, 16, 16);
        assert_eq!(sphere.vertex_count(), 17 * 17);
        // Two triangles per quad, minus one per quad on each pole row
        assert_eq!(sphere.triangle_count(), 16 * 16 * 2 - 2 * 16);
        assert_eq!(sphere.normals.len(), sphere.tex_coords.len());
        assert_outward_winding(&sphere);

        for v in &sphere.vertices {
            let r = (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt();
            assert_relative_eq!(r, 1.0, epsilon = 1e-5);
        }
    }

    #[test]
    fn test_plane_generation() {
        let plane = generate_plane(2.0, 2.0, 2, 2);
        assert_eq!(plane.vertex_count(), 9);
        assert_eq!(plane.indices.len(), 24);
        assert!(plane.normals.iter().all(|n| *n == [0.0, 0.0, 1.0]));
        assert_outward_winding(&plane);

        // Top-left corner samples the top-left of the image
        let top_left = plane
            .vertices
            .iter()
            .position(|v| v[0] == -1.0 && v[1] == 1.0)
            .unwrap();
        assert_eq!(plane.tex_coords[top_left], [0.0, 0.0]);
    }

    #[test]
    fn test_door_plane_resolution() {
        let door = generate_plane(2.0, 2.0, 50, 50);
        assert_eq!(door.vertex_count(), 51 * 51);
        assert_eq!(door.triangle_count(), 50 * 50 * 2);
    }

    #[test]
    fn test_cone_generation() {
        let roof = generate_cone(3.5, 1.0, 4);
        assert_eq!(roof.triangle_count(), 4 + 4);
        assert_outward_winding(&roof);

        let apex = roof.vertices.iter().map(|v| v[1]).fold(f32::MIN, f32::max);
        let base = roof.vertices.iter().map(|v| v[1]).fold(f32::MAX, f32::min);
        assert_relative_eq!(apex, 0.5);
        assert_relative_eq!(base, -0.5);

        // First base corner lies on +Z
        let corner = roof.vertices[5];
        assert_relative_eq!(corner[0], 0.0, epsilon = 1e-6);
        assert_relative_eq!(corner[2], 3.5);
    }
}
