use cgmath::{Matrix, Matrix4, SquareMatrix};
use wgpu::util::DeviceExt;

use super::transform::Transform;
use super::vertex::Vertex3D;
use super::{GeometryId, GroupId};
use crate::gfx::geometry::GeometryData;
use crate::gfx::resources::material::MaterialId;
use crate::wgpu_utils::{BindGroupBuilder, BindGroupLayoutWithDesc, UniformBuffer};

/// Vertex and index data of one geometry, shared by every object that uses it
pub struct Mesh {
    vertices: Vec<Vertex3D>,
    indices: Vec<u32>,
    vertex_buffer: Option<wgpu::Buffer>,
    index_buffer: Option<wgpu::Buffer>,
}

impl Mesh {
    pub fn from_geometry(data: &GeometryData) -> Self {
        Self {
            vertices: data.to_vertices(),
            indices: data.indices.clone(),
            vertex_buffer: None,
            index_buffer: None,
        }
    }

    pub fn vertex_count(&self) -> u32 {
        self.vertices.len() as u32
    }

    pub fn index_count(&self) -> u32 {
        self.indices.len() as u32
    }

    pub fn vertices(&self) -> &[Vertex3D] {
        &self.vertices
    }

    /// Uploads the vertex and index buffers; a no-op once uploaded
    pub fn init_gpu_resources(&mut self, device: &wgpu::Device) {
        if self.vertex_buffer.is_some() {
            return;
        }
        self.vertex_buffer = Some(device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Mesh Vertex Buffer"),
            contents: bytemuck::cast_slice(&self.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        }));
        self.index_buffer = Some(device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Mesh Index Buffer"),
            contents: bytemuck::cast_slice(&self.indices),
            usage: wgpu::BufferUsages::INDEX,
        }));
    }
}

/// Per-object uniform: world matrix, normal matrix and shading flags
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ObjectUniform {
    pub model: [[f32; 4]; 4],
    pub normal_matrix: [[f32; 4]; 4],
    /// x: receives shadows
    pub flags: [f32; 4],
}

impl ObjectUniform {
    pub fn new(world: Matrix4<f32>, receive_shadow: bool) -> Self {
        // Inverse transpose keeps normals perpendicular under non-uniform scale
        let normal_matrix = world
            .invert()
            .map(|inverse| inverse.transpose())
            .unwrap_or_else(Matrix4::identity);
        Self {
            model: world.into(),
            normal_matrix: normal_matrix.into(),
            flags: [if receive_shadow { 1.0 } else { 0.0 }, 0.0, 0.0, 0.0],
        }
    }
}

pub struct ObjectGpuResources {
    pub transform_buffer: UniformBuffer<ObjectUniform>,
    pub transform_bind_group: wgpu::BindGroup,
}

/// A drawable node: shared geometry + shared material + its own transform
pub struct SceneObject {
    pub name: String,
    pub geometry: GeometryId,
    pub material: MaterialId,
    pub transform: Transform,
    pub cast_shadow: bool,
    pub receive_shadow: bool,
    pub parent: Option<GroupId>,
    pub visible: bool,
    pub gpu_resources: Option<ObjectGpuResources>,
}

impl SceneObject {
    pub fn new(name: &str, geometry: GeometryId, material: &str) -> Self {
        Self {
            name: name.to_string(),
            geometry,
            material: material.to_string(),
            transform: Transform::default(),
            cast_shadow: false,
            receive_shadow: false,
            parent: None,
            visible: true,
            gpu_resources: None,
        }
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    pub fn casting_shadow(mut self) -> Self {
        self.cast_shadow = true;
        self
    }

    pub fn receiving_shadow(mut self) -> Self {
        self.receive_shadow = true;
        self
    }

    pub fn in_group(mut self, group: GroupId) -> Self {
        self.parent = Some(group);
        self
    }

    pub fn init_gpu_resources(&mut self, device: &wgpu::Device, layout: &BindGroupLayoutWithDesc) {
        let transform_buffer = UniformBuffer::new(device);
        let transform_bind_group = BindGroupBuilder::new(layout)
            .resource(transform_buffer.binding_resource())
            .create(device, &format!("Transform Bind Group: {}", self.name));
        self.gpu_resources = Some(ObjectGpuResources {
            transform_buffer,
            transform_bind_group,
        });
    }

    /// Writes the world matrix to the GPU when it changed since the last upload
    pub fn update_transform(&mut self, queue: &wgpu::Queue, world: Matrix4<f32>) {
        let receive_shadow = self.receive_shadow;
        if let Some(gpu) = &mut self.gpu_resources {
            gpu.transform_buffer
                .update_content(queue, ObjectUniform::new(world, receive_shadow));
        }
    }

    pub fn get_transform_bind_group(&self) -> Option<&wgpu::BindGroup> {
        self.gpu_resources
            .as_ref()
            .map(|res| &res.transform_bind_group)
    }
}

pub trait DrawMesh {
    fn draw_mesh(&mut self, mesh: &Mesh);
}

impl DrawMesh for wgpu::RenderPass<'_> {
    fn draw_mesh(&mut self, mesh: &Mesh) {
        let (Some(vertex_buffer), Some(index_buffer)) = (&mesh.vertex_buffer, &mesh.index_buffer)
        else {
            return;
        };
        self.set_vertex_buffer(0, vertex_buffer.slice(..));
        self.set_index_buffer(index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        self.draw_indexed(0..mesh.index_count(), 0, 0..1);
    }
}
