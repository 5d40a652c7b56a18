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

use crate::renderer::api::{
    BindGroupId, BufferId, CommandBufferId, IndexFormat, RenderPassDescriptor,
    RenderPipelineId, RenderTargetBarrier, ScissorRect, Viewport,
};
use std::ops::Range;

/// A trait representing an active render pass, used for recording drawing
/// commands.
///
/// A `RenderPass` object is obtained from a [`CommandEncoder`]. The `'pass`
/// lifetime ties the pass to the encoder that created it: only one pass can
/// be active at a time, and dropping the pass object ends the pass.
pub trait RenderPass<'pass> {
    /// Sets the active render pipeline for subsequent draw calls.
    fn set_pipeline(&mut self, pipeline: &'pass RenderPipelineId);

    /// Binds a bind group at the given group index.
    fn set_bind_group(&mut self, index: u32, bind_group: &'pass BindGroupId);

    /// Binds a vertex buffer to a specific slot.
    fn set_vertex_buffer(&mut self, slot: u32, buffer: &'pass BufferId, offset: u64);

    /// Binds an index buffer for indexed drawing.
    fn set_index_buffer(&mut self, buffer: &'pass BufferId, offset: u64, index_format: IndexFormat);

    /// Sets the viewport transform for subsequent draw calls.
    fn set_viewport(&mut self, viewport: Viewport);

    /// Sets the scissor rectangle for subsequent draw calls.
    fn set_scissor(&mut self, scissor: ScissorRect);

    /// Records a non-indexed draw call.
    fn draw(&mut self, vertices: Range<u32>, instances: Range<u32>);

    /// Records an indexed draw call.
    fn draw_indexed(&mut self, indices: Range<u32>, base_vertex: i32, instances: Range<u32>);
}

/// A trait for an object that records a sequence of GPU commands.
///
/// A `CommandEncoder` is the tool for building a [`CommandBufferId`]. All
/// recording happens on one logical thread per frame; there is no internal
/// synchronization and none is needed.
pub trait CommandEncoder {
    /// Begins a new render pass, returning a `RenderPass` object.
    ///
    /// The returned object borrows the encoder mutably, so only one pass can
    /// be active at a time. Dropping it ends the pass.
    fn begin_render_pass<'encoder>(
        &'encoder mut self,
        descriptor: &RenderPassDescriptor<'_>,
    ) -> Box<dyn RenderPass<'encoder> + 'encoder>;

    /// Records resource-state transitions. Each barrier's `from` state must
    /// match the target's current state; a mismatch is a backend-reported
    /// error and fatal to the frame.
    fn resource_barrier(&mut self, barriers: &[RenderTargetBarrier]);

    /// Finalizes the recording and returns a handle to the resulting
    /// command buffer. Consumes the encoder.
    fn finish(self: Box<Self>) -> CommandBufferId;
}
