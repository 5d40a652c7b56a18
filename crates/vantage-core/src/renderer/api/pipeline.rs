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

//! Defines all data structures used to configure a graphics render pipeline.

use crate::renderer::api::bind_group::BindGroupLayoutId;
use crate::renderer::api::common::{SampleCount, TextureFormat};
use crate::renderer::api::shader::ShaderModuleId;
use crate::vantage_bitflags;
use std::borrow::Cow;

/// The memory format of a single vertex attribute's data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VertexFormat {
    /// Two 32-bit float components.
    Float32x2,
    /// Three 32-bit float components.
    Float32x3,
    /// Four 32-bit float components.
    Float32x4,
}

/// Defines how often the GPU advances to the next element in a vertex buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VertexStepMode {
    /// The GPU advances to the next element for each vertex.
    Vertex,
    /// The GPU advances to the next element only for each new instance.
    Instance,
}

/// Defines how vertices are connected to form a geometric primitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveTopology {
    /// Every three vertices form an isolated triangle.
    TriangleList,
    /// Vertices form a connected triangle strip.
    TriangleStrip,
}

/// Defines which face of a triangle to cull (not render).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CullMode {
    /// Cull front-facing triangles.
    Front,
    /// Cull back-facing triangles.
    Back,
}

/// The comparison function used for depth testing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CompareFunction {
    /// The test passes if the new value is less than the existing value.
    Less,
    /// The test passes if the new value is greater than or equal to the
    /// existing value. Used by the demo scenes' reversed-Z depth scheme.
    GreaterEqual,
    /// The test always passes.
    #[default]
    Always,
}

/// A factor in a blend equation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlendFactor {
    /// The factor is `0.0`.
    Zero,
    /// The factor is `1.0`.
    One,
    /// The factor is the source alpha component.
    SrcAlpha,
    /// The factor is `1.0 - src.a`.
    OneMinusSrcAlpha,
}

/// The operation used to combine source and destination colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlendOperation {
    /// The result is `source + destination`.
    Add,
}

/// Describes a single vertex attribute within a vertex buffer layout.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VertexAttributeDescriptor {
    /// The input location of this attribute in the vertex shader.
    pub shader_location: u32,
    /// The format of the attribute's data.
    pub format: VertexFormat,
    /// The byte offset of this attribute from the start of the vertex.
    pub offset: u64,
}

/// Describes the memory layout of a single vertex buffer.
#[derive(Debug, Clone)]
pub struct VertexBufferLayoutDescriptor<'a> {
    /// The byte distance between consecutive elements in the buffer.
    pub array_stride: u64,
    /// How often the vertex buffer is advanced.
    pub step_mode: VertexStepMode,
    /// The attributes contained within each element of the buffer.
    pub attributes: Cow<'a, [VertexAttributeDescriptor]>,
}

/// Describes the state for primitive assembly and rasterization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PrimitiveStateDescriptor {
    /// The topology of the primitives.
    pub topology: PrimitiveTopology,
    /// The face culling mode, or `None` to disable culling.
    pub cull_mode: Option<CullMode>,
}

impl Default for PrimitiveStateDescriptor {
    fn default() -> Self {
        PrimitiveStateDescriptor {
            topology: PrimitiveTopology::TriangleList,
            cull_mode: None,
        }
    }
}

/// Describes the state for depth testing.
#[derive(Debug, Clone, PartialEq)]
pub struct DepthStencilStateDescriptor {
    /// The format of the depth texture.
    pub format: TextureFormat,
    /// If `true`, depth values will be written to the depth buffer.
    pub depth_write_enabled: bool,
    /// The comparison function used for the depth test.
    pub depth_compare: CompareFunction,
}

/// Describes a complete blend equation for one component group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlendComponentDescriptor {
    /// The blend factor for the source color.
    pub src_factor: BlendFactor,
    /// The blend factor for the destination color.
    pub dst_factor: BlendFactor,
    /// The operation combining source and destination.
    pub operation: BlendOperation,
}

/// Describes the blend state for a single color target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlendStateDescriptor {
    /// The blend equation for the RGB color components.
    pub color: BlendComponentDescriptor,
    /// The blend equation for the alpha component.
    pub alpha: BlendComponentDescriptor,
}

impl BlendStateDescriptor {
    /// Standard `src.a * src + (1 - src.a) * dst` alpha blending.
    pub const ALPHA_BLENDING: Self = Self {
        color: BlendComponentDescriptor {
            src_factor: BlendFactor::SrcAlpha,
            dst_factor: BlendFactor::OneMinusSrcAlpha,
            operation: BlendOperation::Add,
        },
        alpha: BlendComponentDescriptor {
            src_factor: BlendFactor::SrcAlpha,
            dst_factor: BlendFactor::OneMinusSrcAlpha,
            operation: BlendOperation::Add,
        },
    };
}

vantage_bitflags! {
    /// A bitmask to enable or disable writes to individual color channels.
    pub struct ColorWrites: u8 {
        /// Enable writes to the red channel.
        const R = 0b0001;
        /// Enable writes to the green channel.
        const G = 0b0010;
        /// Enable writes to the blue channel.
        const B = 0b0100;
        /// Enable writes to the alpha channel.
        const A = 0b1000;
        /// Enable writes to all channels.
        const ALL = Self::R.bits() | Self::G.bits() | Self::B.bits() | Self::A.bits();
    }
}

/// Describes the state of a single color target in a render pass.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ColorTargetStateDescriptor {
    /// The texture format of this color target.
    pub format: TextureFormat,
    /// The blending state for this target. `None` disables blending.
    pub blend: Option<BlendStateDescriptor>,
    /// A bitmask controlling which color channels are written to.
    pub write_mask: ColorWrites,
}

impl ColorTargetStateDescriptor {
    /// An opaque (non-blended) color target of the given format.
    pub fn opaque(format: TextureFormat) -> Self {
        Self {
            format,
            blend: None,
            write_mask: ColorWrites::ALL,
        }
    }
}

/// Describes the multisampling state for a render pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MultisampleStateDescriptor {
    /// The number of samples per pixel.
    pub count: SampleCount,
}

impl Default for MultisampleStateDescriptor {
    fn default() -> Self {
        Self {
            count: SampleCount::X1,
        }
    }
}

/// A complete descriptor for a render pipeline.
///
/// Aggregates all the state the GPU needs to render primitives.
#[derive(Debug, Clone)]
pub struct RenderPipelineDescriptor<'a> {
    /// An optional debug label.
    pub label: Option<Cow<'a, str>>,
    /// The pipeline layout (ordered bind-group layouts).
    pub layout: PipelineLayoutId,
    /// The compiled vertex shader module.
    pub vertex_shader_module: ShaderModuleId,
    /// The compiled fragment shader module, if any.
    pub fragment_shader_module: Option<ShaderModuleId>,
    /// The layout of the vertex buffers.
    pub vertex_buffers_layout: Cow<'a, [VertexBufferLayoutDescriptor<'a>]>,
    /// The state for primitive assembly and rasterization.
    pub primitive_state: PrimitiveStateDescriptor,
    /// The state for depth testing. `None` disables the depth test.
    pub depth_stencil_state: Option<DepthStencilStateDescriptor>,
    /// The states of all color targets this pipeline renders to.
    pub color_target_states: Cow<'a, [ColorTargetStateDescriptor]>,
    /// The multisampling state.
    pub multisample_state: MultisampleStateDescriptor,
}

/// An opaque handle to a compiled render pipeline state object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RenderPipelineId(pub usize);

/// An opaque handle to a pipeline layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PipelineLayoutId(pub usize);

/// A descriptor for a [`PipelineLayoutId`].
///
/// Defines the ordered set of bind-group layouts a pipeline can access.
#[derive(Debug, Clone, Default)]
pub struct PipelineLayoutDescriptor<'a> {
    /// An optional debug label.
    pub label: Option<Cow<'a, str>>,
    /// The bind-group layouts, in group-index order.
    pub bind_group_layouts: Cow<'a, [BindGroupLayoutId]>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_primitive_state() {
        let state = PrimitiveStateDescriptor::default();
        assert_eq!(state.topology, PrimitiveTopology::TriangleList);
        assert_eq!(state.cull_mode, None);
    }

    #[test]
    fn color_writes_all_covers_every_channel() {
        assert_eq!(
            ColorWrites::ALL,
            ColorWrites::R | ColorWrites::G | ColorWrites::B | ColorWrites::A
        );
    }

    #[test]
    fn opaque_target_disables_blending() {
        let target = ColorTargetStateDescriptor::opaque(TextureFormat::Rgba8Unorm);
        assert!(target.blend.is_none());
        assert_eq!(target.write_mask, ColorWrites::ALL);
    }
}
