// Copyright 2025 the vantage authors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! CPU-side mesh generation for the primitive shapes the demo scenes draw,
//! and a small library owning one vertex buffer per shape.

use std::borrow::Cow;
use std::mem;

use vantage_core::math::{Vec3, PI, TAU};
use vantage_core::renderer::api::{
    BufferDescriptor, BufferId, BufferUsage, VertexAttributeDescriptor,
    VertexBufferLayoutDescriptor, VertexFormat, VertexStepMode,
};
use vantage_core::renderer::error::ResourceError;
use vantage_core::renderer::traits::{GraphicsDevice, RenderPass};

/// The primitive shapes available to the demo scenes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShapeKind {
    /// A unit cube (half-extent 1) centered on the origin.
    Cube,
    /// A unit UV-sphere centered on the origin.
    Sphere,
    /// An octahedral bone from the origin to `(0, 1, 0)`.
    Bone,
}

/// One mesh vertex: interleaved position and normal.
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ShapeVertex {
    /// Object-space position.
    pub position: [f32; 3],
    /// Unit normal.
    pub normal: [f32; 3],
}

fn vertex(position: Vec3, normal: Vec3) -> ShapeVertex {
    ShapeVertex {
        position: [position.x, position.y, position.z],
        normal: [normal.x, normal.y, normal.z],
    }
}

/// Generates the 36 vertices of a unit cube with per-face normals.
pub fn generate_cube() -> Vec<ShapeVertex> {
    // One entry per face: (normal, four corners counter-clockwise when seen
    // from outside).
    let faces: [(Vec3, [Vec3; 4]); 6] = [
        (
            Vec3::new(0.0, 0.0, 1.0),
            [
                Vec3::new(-1.0, -1.0, 1.0),
                Vec3::new(1.0, -1.0, 1.0),
                Vec3::new(1.0, 1.0, 1.0),
                Vec3::new(-1.0, 1.0, 1.0),
            ],
        ),
        (
            Vec3::new(0.0, 0.0, -1.0),
            [
                Vec3::new(1.0, -1.0, -1.0),
                Vec3::new(-1.0, -1.0, -1.0),
                Vec3::new(-1.0, 1.0, -1.0),
                Vec3::new(1.0, 1.0, -1.0),
            ],
        ),
        (
            Vec3::new(1.0, 0.0, 0.0),
            [
                Vec3::new(1.0, -1.0, 1.0),
                Vec3::new(1.0, -1.0, -1.0),
                Vec3::new(1.0, 1.0, -1.0),
                Vec3::new(1.0, 1.0, 1.0),
            ],
        ),
        (
            Vec3::new(-1.0, 0.0, 0.0),
            [
                Vec3::new(-1.0, -1.0, -1.0),
                Vec3::new(-1.0, -1.0, 1.0),
                Vec3::new(-1.0, 1.0, 1.0),
                Vec3::new(-1.0, 1.0, -1.0),
            ],
        ),
        (
            Vec3::new(0.0, 1.0, 0.0),
            [
                Vec3::new(-1.0, 1.0, 1.0),
                Vec3::new(1.0, 1.0, 1.0),
                Vec3::new(1.0, 1.0, -1.0),
                Vec3::new(-1.0, 1.0, -1.0),
            ],
        ),
        (
            Vec3::new(0.0, -1.0, 0.0),
            [
                Vec3::new(-1.0, -1.0, -1.0),
                Vec3::new(1.0, -1.0, -1.0),
                Vec3::new(1.0, -1.0, 1.0),
                Vec3::new(-1.0, -1.0, 1.0),
            ],
        ),
    ];

    let mut vertices = Vec::with_capacity(36);
    for (normal, corners) in faces {
        for tri in [[0, 1, 2], [0, 2, 3]] {
            for index in tri {
                vertices.push(vertex(corners[index], normal));
            }
        }
    }
    vertices
}

/// Generates a unit UV-sphere with `slices` longitudinal and `slices / 2`
/// latitudinal subdivisions. Normals equal positions on a unit sphere.
pub fn generate_sphere(slices: u32) -> Vec<ShapeVertex> {
    let slices = slices.max(3);
    let stacks = (slices / 2).max(2);

    let point = |stack: u32, slice: u32| -> Vec3 {
        let phi = PI * stack as f32 / stacks as f32;
        let theta = TAU * slice as f32 / slices as f32;
        Vec3::new(
            phi.sin() * theta.cos(),
            phi.cos(),
            phi.sin() * theta.sin(),
        )
    };

    let mut vertices = Vec::with_capacity((slices * stacks * 6) as usize);
    for stack in 0..stacks {
        for slice in 0..slices {
            let p00 = point(stack, slice);
            let p01 = point(stack, slice + 1);
            let p10 = point(stack + 1, slice);
            let p11 = point(stack + 1, slice + 1);

            // Top and bottom rows degenerate to single triangles at the poles.
            if stack != 0 {
                vertices.push(vertex(p00, p00));
                vertices.push(vertex(p10, p10));
                vertices.push(vertex(p01, p01));
            }
            if stack != stacks - 1 {
                vertices.push(vertex(p01, p01));
                vertices.push(vertex(p10, p10));
                vertices.push(vertex(p11, p11));
            }
        }
    }
    vertices
}

/// Generates an octahedral bone: a square ring at a quarter of the length,
/// tapering to the joint at the origin and the tip at `(0, 1, 0)`.
pub fn generate_bone(width: f32) -> Vec<ShapeVertex> {
    let half = width * 0.5;
    let ring_y = 0.25;
    let ring = [
        Vec3::new(half, ring_y, half),
        Vec3::new(half, ring_y, -half),
        Vec3::new(-half, ring_y, -half),
        Vec3::new(-half, ring_y, half),
    ];
    let joint = Vec3::ZERO;
    let tip = Vec3::new(0.0, 1.0, 0.0);

    let mut vertices = Vec::with_capacity(24);
    for side in 0..4 {
        let a = ring[side];
        let b = ring[(side + 1) % 4];

        let down_normal = (a - joint).cross(b - joint).normalize();
        vertices.push(vertex(joint, down_normal));
        vertices.push(vertex(a, down_normal));
        vertices.push(vertex(b, down_normal));

        let up_normal = (b - tip).cross(a - tip).normalize();
        vertices.push(vertex(tip, up_normal));
        vertices.push(vertex(b, up_normal));
        vertices.push(vertex(a, up_normal));
    }
    vertices
}

/// Owns one static vertex buffer per shape and dispatches draws by
/// [`ShapeKind`].
#[derive(Debug)]
pub struct ShapeLibrary {
    cube_buffer: BufferId,
    cube_count: u32,
    sphere_buffer: BufferId,
    sphere_count: u32,
    bone_buffer: BufferId,
    bone_count: u32,
}

impl ShapeLibrary {
    /// Generates and uploads all three shapes.
    pub fn new(device: &dyn GraphicsDevice) -> Result<Self, ResourceError> {
        let cube = generate_cube();
        let sphere = generate_sphere(64);
        let bone = generate_bone(0.25);

        let upload = |label: &'static str, data: &[ShapeVertex]| {
            device.create_buffer_with_data(
                &BufferDescriptor {
                    label: Some(Cow::Borrowed(label)),
                    size: mem::size_of_val(data) as u64,
                    usage: BufferUsage::VERTEX | BufferUsage::COPY_DST,
                },
                bytemuck::cast_slice(data),
            )
        };

        Ok(Self {
            cube_buffer: upload("cube vertices", &cube)?,
            cube_count: cube.len() as u32,
            sphere_buffer: upload("sphere vertices", &sphere)?,
            sphere_count: sphere.len() as u32,
            bone_buffer: upload("bone vertices", &bone)?,
            bone_count: bone.len() as u32,
        })
    }

    /// Releases the vertex buffers.
    pub fn destroy(&self, device: &dyn GraphicsDevice) {
        for buffer in [self.cube_buffer, self.sphere_buffer, self.bone_buffer] {
            if let Err(e) = device.destroy_buffer(buffer) {
                log::warn!("failed to destroy shape buffer: {e}");
            }
        }
    }

    /// The vertex layout shared by every shape pipeline.
    pub fn vertex_layout<'a>() -> VertexBufferLayoutDescriptor<'a> {
        VertexBufferLayoutDescriptor {
            array_stride: mem::size_of::<ShapeVertex>() as u64,
            step_mode: VertexStepMode::Vertex,
            attributes: Cow::Borrowed(&[
                VertexAttributeDescriptor {
                    shader_location: 0,
                    format: VertexFormat::Float32x3,
                    offset: 0,
                },
                VertexAttributeDescriptor {
                    shader_location: 1,
                    format: VertexFormat::Float32x3,
                    offset: mem::size_of::<[f32; 3]>() as u64,
                },
            ]),
        }
    }

    /// The vertex count of a shape's mesh.
    pub fn vertex_count(&self, shape: ShapeKind) -> u32 {
        match shape {
            ShapeKind::Cube => self.cube_count,
            ShapeKind::Sphere => self.sphere_count,
            ShapeKind::Bone => self.bone_count,
        }
    }

    /// Binds the shape's vertex buffer and records the draw.
    pub fn draw<'pass>(&'pass self, pass: &mut (dyn RenderPass<'pass> + '_), shape: ShapeKind) {
        let (buffer, count) = match shape {
            ShapeKind::Cube => (&self.cube_buffer, self.cube_count),
            ShapeKind::Sphere => (&self.sphere_buffer, self.sphere_count),
            ShapeKind::Bone => (&self.bone_buffer, self.bone_count),
        };
        pass.set_vertex_buffer(0, buffer, 0);
        pass.draw(0..count, 0..1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn normals_are_unit(vertices: &[ShapeVertex]) {
        for v in vertices {
            let n = Vec3::new(v.normal[0], v.normal[1], v.normal[2]);
            assert_relative_eq!(n.length(), 1.0, epsilon = 1e-4);
        }
    }

    #[test]
    fn cube_has_36_vertices_with_unit_normals() {
        let cube = generate_cube();
        assert_eq!(cube.len(), 36);
        normals_are_unit(&cube);
    }

    #[test]
    fn sphere_vertices_lie_on_unit_sphere() {
        let sphere = generate_sphere(24);
        assert!(!sphere.is_empty());
        assert_eq!(sphere.len() % 3, 0);
        for v in &sphere {
            let p = Vec3::new(v.position[0], v.position[1], v.position[2]);
            assert_relative_eq!(p.length(), 1.0, epsilon = 1e-4);
        }
        normals_are_unit(&sphere);
    }

    #[test]
    fn sphere_pole_rows_are_triangles_not_quads() {
        // stacks = slices / 2; interior rows contribute 6 vertices per
        // slice, the two pole rows 3 each.
        let slices = 8;
        let stacks = slices / 2;
        let expected = (slices * 3 * 2) + (slices * (stacks - 2) * 6);
        assert_eq!(generate_sphere(slices as u32).len(), expected);
    }

    #[test]
    fn bone_spans_origin_to_tip() {
        let bone = generate_bone(0.25);
        assert_eq!(bone.len(), 24);
        normals_are_unit(&bone);
        let max_y = bone.iter().map(|v| v.position[1]).fold(f32::MIN, f32::max);
        let min_y = bone.iter().map(|v| v.position[1]).fold(f32::MAX, f32::min);
        assert_eq!(max_y, 1.0);
        assert_eq!(min_y, 0.0);
    }
}
