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

//! Defines data structures for bind groups and bind group layouts.
//!
//! Bind groups are the mechanism for binding resources (buffers, textures,
//! samplers) to shaders. They abstract over the binding models of the
//! various graphics APIs (descriptor sets, bind groups, root tables).

use crate::renderer::api::buffer::BufferId;
use crate::renderer::api::texture::{SamplerId, TextureId};
use crate::vantage_bitflags;

vantage_bitflags! {
    /// Which shader stages can access a resource binding.
    pub struct ShaderStageFlags: u32 {
        /// Visible to the vertex shader stage.
        const VERTEX = 1 << 0;
        /// Visible to the fragment shader stage.
        const FRAGMENT = 1 << 1;
        /// Visible to both graphics stages.
        const VERTEX_FRAGMENT = Self::VERTEX.bits() | Self::FRAGMENT.bits();
    }
}

/// An opaque handle to a bind group layout resource.
///
/// A layout describes the structure and types of resources that will be
/// bound, without naming the actual resources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BindGroupLayoutId(pub usize);

/// An opaque handle to a bind group resource.
///
/// A bind group names the actual resources bound for a matching layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BindGroupId(pub usize);

/// Describes the type of buffer binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferBindingType {
    /// A uniform buffer.
    Uniform,
}

/// The type of texture sample a binding expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureSampleType {
    /// A floating-point texture sample.
    Float {
        /// Whether the texture can be filtered by a linear sampler.
        filterable: bool,
    },
    /// A depth texture sample.
    Depth,
}

/// The type of sampler a binding expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SamplerBindingType {
    /// A filtering sampler.
    Filtering,
    /// A non-filtering (nearest) sampler.
    NonFiltering,
}

/// The type of resource bound at a binding point.
#[derive(Debug, Clone)]
pub enum BindingType {
    /// A uniform buffer binding.
    Buffer {
        /// The type of buffer binding.
        ty: BufferBindingType,
    },
    /// A sampled texture binding.
    Texture {
        /// The type of sample the shader performs.
        sample_type: TextureSampleType,
    },
    /// A sampler binding.
    Sampler(SamplerBindingType),
}

/// Describes a single binding entry in a bind group layout.
#[derive(Debug, Clone)]
pub struct BindGroupLayoutEntry {
    /// The binding index (e.g. `@binding(0)` in WGSL).
    pub binding: u32,
    /// Which shader stages can access this binding.
    pub visibility: ShaderStageFlags,
    /// The type of resource being bound.
    pub ty: BindingType,
}

/// Describes a bind group layout to be created.
#[derive(Debug, Clone)]
pub struct BindGroupLayoutDescriptor<'a> {
    /// An optional debug label.
    pub label: Option<&'a str>,
    /// The entries in this bind group layout.
    pub entries: &'a [BindGroupLayoutEntry],
}

/// Describes a single resource binding in a bind group.
#[derive(Debug, Clone, Copy)]
pub enum BindingResource {
    /// Binds a whole buffer.
    Buffer(BufferId),
    /// Binds a sampled texture.
    Texture(TextureId),
    /// Binds a sampler.
    Sampler(SamplerId),
}

/// A single entry in a bind group.
#[derive(Debug, Clone, Copy)]
pub struct BindGroupEntry {
    /// The binding index.
    pub binding: u32,
    /// The resource to bind.
    pub resource: BindingResource,
}

/// Describes a bind group to be created.
#[derive(Debug, Clone)]
pub struct BindGroupDescriptor<'a> {
    /// An optional debug label.
    pub label: Option<&'a str>,
    /// The layout this bind group conforms to.
    pub layout: BindGroupLayoutId,
    /// The resources to bind at each binding point.
    pub entries: &'a [BindGroupEntry],
}
