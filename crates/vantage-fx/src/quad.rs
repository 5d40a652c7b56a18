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

//! A static fullscreen quad shared by every post-processing pass.

use std::borrow::Cow;
use std::mem;

use vantage_core::renderer::api::{
    BufferDescriptor, BufferId, BufferUsage, VertexAttributeDescriptor,
    VertexBufferLayoutDescriptor, VertexFormat, VertexStepMode,
};
use vantage_core::renderer::error::ResourceError;
use vantage_core::renderer::traits::{GraphicsDevice, RenderPass};

/// One corner of the fullscreen quad.
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ScreenVertex {
    /// Clip-space position.
    pub position: [f32; 2],
    /// Texture coordinate (top-left origin).
    pub texcoord: [f32; 2],
}

/// The four corners of the screen as a triangle strip, with V flipped so the
/// top of the sampled image lands at the top of the screen.
pub const SCREEN_QUAD_VERTICES: [ScreenVertex; 4] = [
    ScreenVertex {
        position: [-1.0, -1.0],
        texcoord: [0.0, 1.0],
    },
    ScreenVertex {
        position: [1.0, -1.0],
        texcoord: [1.0, 1.0],
    },
    ScreenVertex {
        position: [-1.0, 1.0],
        texcoord: [0.0, 0.0],
    },
    ScreenVertex {
        position: [1.0, 1.0],
        texcoord: [1.0, 0.0],
    },
];

/// Owns the fullscreen quad vertex buffer and issues the single draw call
/// covering the target.
#[derive(Debug)]
pub struct ScreenQuad {
    vertex_buffer: BufferId,
}

impl ScreenQuad {
    /// Uploads the static quad geometry.
    pub fn new(device: &dyn GraphicsDevice) -> Result<Self, ResourceError> {
        let descriptor = BufferDescriptor {
            label: Some(Cow::Borrowed("screen quad vertices")),
            size: mem::size_of_val(&SCREEN_QUAD_VERTICES) as u64,
            usage: BufferUsage::VERTEX | BufferUsage::COPY_DST,
        };
        let vertex_buffer =
            device.create_buffer_with_data(&descriptor, bytemuck::cast_slice(&SCREEN_QUAD_VERTICES))?;
        Ok(Self { vertex_buffer })
    }

    /// The vertex layout every fullscreen pipeline uses.
    pub fn vertex_layout<'a>() -> VertexBufferLayoutDescriptor<'a> {
        VertexBufferLayoutDescriptor {
            array_stride: mem::size_of::<ScreenVertex>() as u64,
            step_mode: VertexStepMode::Vertex,
            attributes: Cow::Borrowed(&[
                VertexAttributeDescriptor {
                    shader_location: 0,
                    format: VertexFormat::Float32x2,
                    offset: 0,
                },
                VertexAttributeDescriptor {
                    shader_location: 1,
                    format: VertexFormat::Float32x2,
                    offset: mem::size_of::<[f32; 2]>() as u64,
                },
            ]),
        }
    }

    /// Binds the quad and records the covering draw. Pipeline and bind
    /// groups must already be set on the pass.
    pub fn draw<'pass>(&'pass self, pass: &mut (dyn RenderPass<'pass> + '_)) {
        pass.set_vertex_buffer(0, &self.vertex_buffer, 0);
        pass.draw(0..SCREEN_QUAD_VERTICES.len() as u32, 0..1);
    }

    /// Releases the vertex buffer.
    pub fn destroy(&self, device: &dyn GraphicsDevice) {
        if let Err(e) = device.destroy_buffer(self.vertex_buffer) {
            log::warn!("failed to destroy screen quad vertex buffer: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quad_covers_clip_space() {
        let xs: Vec<f32> = SCREEN_QUAD_VERTICES.iter().map(|v| v.position[0]).collect();
        let ys: Vec<f32> = SCREEN_QUAD_VERTICES.iter().map(|v| v.position[1]).collect();
        assert_eq!(xs.iter().cloned().fold(f32::MAX, f32::min), -1.0);
        assert_eq!(xs.iter().cloned().fold(f32::MIN, f32::max), 1.0);
        assert_eq!(ys.iter().cloned().fold(f32::MAX, f32::min), -1.0);
        assert_eq!(ys.iter().cloned().fold(f32::MIN, f32::max), 1.0);
    }

    #[test]
    fn vertex_layout_matches_struct() {
        let layout = ScreenQuad::vertex_layout();
        assert_eq!(layout.array_stride, 16);
        assert_eq!(layout.attributes.len(), 2);
        assert_eq!(layout.attributes[1].offset, 8);
    }
}
