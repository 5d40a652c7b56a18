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

//! Data structures used for recording and describing GPU commands.

use crate::math::LinearRgba;
use crate::renderer::api::target::RenderTargetId;

/// An opaque handle to a recorded command buffer that is ready for submission.
///
/// Returned by `CommandEncoder::finish` and consumed by
/// `GraphicsDevice::submit_command_buffer`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct CommandBufferId(pub u64);

/// Describes the operation to perform on an attachment at the start of a
/// render pass.
#[derive(Clone, Debug, PartialEq)]
pub enum LoadOp<V> {
    /// The existing contents of the attachment are loaded into the pass.
    Load,
    /// The attachment is cleared to the specified value before the pass.
    Clear(V),
}

/// Describes the operation to perform on an attachment at the end of a
/// render pass.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StoreOp {
    /// The results of the pass are stored to the attachment's memory.
    Store,
    /// The results of the pass are discarded. A possible optimization on
    /// tile-based architectures.
    Discard,
}

/// Defines the load and store operations for a single attachment.
#[derive(Debug, Clone)]
pub struct Operations<V> {
    /// The operation at the beginning of the pass.
    pub load: LoadOp<V>,
    /// The operation at the end of the pass.
    pub store: StoreOp,
}

impl<V> Operations<V> {
    /// Clear at pass start, store at pass end.
    pub fn clear(value: V) -> Self {
        Self {
            load: LoadOp::Clear(value),
            store: StoreOp::Store,
        }
    }

    /// Load existing contents, store at pass end.
    pub fn load() -> Self {
        Self {
            load: LoadOp::Load,
            store: StoreOp::Store,
        }
    }
}

/// A description of a single color attachment for a render pass.
#[derive(Debug, Clone)]
pub struct RenderPassColorAttachment<'a> {
    /// The render target that will be rendered to.
    pub target: &'a RenderTargetId,
    /// The load and store operations for this attachment.
    pub ops: Operations<LinearRgba>,
}

/// A description of a depth attachment for a render pass.
#[derive(Debug, Clone)]
pub struct RenderPassDepthAttachment<'a> {
    /// The depth render target.
    pub target: &'a RenderTargetId,
    /// The load and store operations for the depth aspect.
    pub depth_ops: Operations<f32>,
}

/// A descriptor for a render pass, grouping the attachments used by a single
/// rendering operation.
#[derive(Debug, Default, Clone)]
pub struct RenderPassDescriptor<'a> {
    /// An optional debug label for the render pass.
    pub label: Option<&'a str>,
    /// The color attachments used in the pass.
    pub color_attachments: &'a [RenderPassColorAttachment<'a>],
    /// An optional depth attachment for this pass.
    pub depth_attachment: Option<RenderPassDepthAttachment<'a>>,
}

/// A viewport rectangle with a depth range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    /// The x-coordinate of the viewport's top-left corner, in pixels.
    pub x: f32,
    /// The y-coordinate of the viewport's top-left corner, in pixels.
    pub y: f32,
    /// The width of the viewport, in pixels.
    pub width: f32,
    /// The height of the viewport, in pixels.
    pub height: f32,
    /// The minimum depth of the viewport's depth range.
    pub min_depth: f32,
    /// The maximum depth of the viewport's depth range.
    pub max_depth: f32,
}

impl Viewport {
    /// A full-extent viewport with the standard `[0, 1]` depth range.
    pub fn covering(width: u32, height: u32) -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width: width as f32,
            height: height as f32,
            min_depth: 0.0,
            max_depth: 1.0,
        }
    }
}

/// A scissor rectangle in pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScissorRect {
    /// The x-coordinate of the rectangle's top-left corner.
    pub x: u32,
    /// The y-coordinate of the rectangle's top-left corner.
    pub y: u32,
    /// The width of the rectangle.
    pub width: u32,
    /// The height of the rectangle.
    pub height: u32,
}

impl ScissorRect {
    /// A full-extent scissor rectangle.
    pub fn covering(width: u32, height: u32) -> Self {
        Self {
            x: 0,
            y: 0,
            width,
            height,
        }
    }
}
