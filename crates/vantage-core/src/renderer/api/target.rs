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

//! Render targets, resource states, and state-transition barriers.
//!
//! A render target is an image that can both be rendered to and sampled in
//! a later pass. Which of those is legal at any moment is tracked by an
//! explicit [`ResourceState`]; passes must transition a target with a
//! [`RenderTargetBarrier`] before using it in the other role. Skipping a
//! transition is a backend-reported error and fatal to the frame.

use crate::math::{Extent2D, LinearRgba};
use crate::renderer::api::common::{SampleCount, TextureFormat};
use crate::renderer::api::texture::TextureId;
use std::borrow::Cow;

/// The access state a render target is currently in.
///
/// The terminal state between frames is always [`ResourceState::ShaderResource`]
/// for sampled targets; a target enters [`ResourceState::RenderTarget`] (or
/// [`ResourceState::DepthWrite`] for depth targets) only for the duration of
/// the passes that write it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceState {
    /// Readable from shaders as a sampled texture.
    ShaderResource,
    /// Writable as a color attachment.
    RenderTarget,
    /// Writable as a depth attachment.
    DepthWrite,
    /// Ready for presentation by the swap chain.
    Present,
}

/// The clear value a render target is initialized with when a pass loads it
/// with a clear operation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ClearValue {
    /// A color clear value.
    Color(LinearRgba),
    /// A depth clear value.
    Depth(f32),
}

/// A descriptor used to create a render target.
#[derive(Debug, Clone)]
pub struct RenderTargetDescriptor<'a> {
    /// An optional debug label.
    pub label: Option<Cow<'a, str>>,
    /// The dimensions of the target.
    pub extent: Extent2D,
    /// The texel format of the target.
    pub format: TextureFormat,
    /// The number of samples per pixel.
    pub sample_count: SampleCount,
    /// The value the target is cleared to.
    pub clear_value: ClearValue,
    /// The state the target starts its life in.
    pub initial_state: ResourceState,
}

/// An opaque handle to a render target resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RenderTargetId(pub usize);

/// A created render target together with the immutable properties passes
/// need when targeting or sampling it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderTarget {
    /// The handle identifying this target to the device.
    pub id: RenderTargetId,
    /// The shader-readable texture backing this target.
    pub texture: TextureId,
    /// The dimensions of the target.
    pub extent: Extent2D,
    /// The texel format of the target.
    pub format: TextureFormat,
    /// The number of samples per pixel.
    pub sample_count: SampleCount,
}

/// A single resource-state transition recorded into a command stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderTargetBarrier {
    /// The target being transitioned.
    pub target: RenderTargetId,
    /// The state the target is expected to currently be in.
    pub from: ResourceState,
    /// The state the target transitions to.
    pub to: ResourceState,
}

impl RenderTargetBarrier {
    /// Creates a transition barrier for `target`.
    pub const fn new(target: RenderTargetId, from: ResourceState, to: ResourceState) -> Self {
        Self { target, from, to }
    }
}
