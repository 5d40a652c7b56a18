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

//! Command recording for the headless backend.

use std::ops::Range;
use std::sync::{Arc, Mutex};

use vantage_core::renderer::api::{
    BindGroupId, BufferId, CommandBufferId, IndexFormat, RenderPassDescriptor, RenderPipelineId,
    RenderTargetBarrier, RenderTargetId, ResourceState, ScissorRect, Viewport,
};
use vantage_core::renderer::traits::{CommandEncoder, RenderPass};

use super::device::Registry;

/// One recorded command. The headless backend keeps the full stream per
/// command buffer so tests can assert on pass structure and draw counts.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordedCommand {
    /// A render pass began with these attachments.
    BeginPass {
        /// The pass label, if any.
        label: Option<String>,
        /// The color attachments bound by the pass.
        color_targets: Vec<RenderTargetId>,
        /// The depth attachment bound by the pass, if any.
        depth_target: Option<RenderTargetId>,
    },
    /// The active render pass ended.
    EndPass,
    /// A pipeline was bound.
    SetPipeline(RenderPipelineId),
    /// A bind group was bound at a group index.
    SetBindGroup(u32, BindGroupId),
    /// A vertex buffer was bound at a slot.
    SetVertexBuffer(u32, BufferId),
    /// An index buffer was bound.
    SetIndexBuffer(BufferId, IndexFormat),
    /// The viewport was set.
    SetViewport(Viewport),
    /// The scissor rectangle was set.
    SetScissor(ScissorRect),
    /// A non-indexed draw call.
    Draw {
        /// The vertex range drawn.
        vertices: Range<u32>,
        /// The instance range drawn.
        instances: Range<u32>,
    },
    /// An indexed draw call.
    DrawIndexed {
        /// The index range drawn.
        indices: Range<u32>,
        /// The instance range drawn.
        instances: Range<u32>,
    },
    /// A set of resource-state barriers.
    Barriers(Vec<RenderTargetBarrier>),
}

/// Records commands against the shared registry.
///
/// Barriers and attachment-state checks are applied at record time; with no
/// GPU behind the backend, recording order is execution order.
#[derive(Debug)]
pub struct HeadlessCommandEncoder {
    registry: Arc<Mutex<Registry>>,
    label: Option<String>,
    commands: Vec<RecordedCommand>,
}

impl HeadlessCommandEncoder {
    pub(crate) fn new(registry: Arc<Mutex<Registry>>, label: Option<String>) -> Self {
        log::trace!("command encoder created: {label:?}");
        Self {
            registry,
            label,
            commands: Vec::new(),
        }
    }
}

impl CommandEncoder for HeadlessCommandEncoder {
    fn begin_render_pass<'encoder>(
        &'encoder mut self,
        descriptor: &RenderPassDescriptor<'_>,
    ) -> Box<dyn RenderPass<'encoder> + 'encoder> {
        let color_targets: Vec<RenderTargetId> = descriptor
            .color_attachments
            .iter()
            .map(|a| *a.target)
            .collect();
        let depth_target = descriptor.depth_attachment.as_ref().map(|a| *a.target);

        {
            let mut r = self.registry.lock().expect("headless registry poisoned");
            for target in &color_targets {
                r.check_attachment_state(*target, ResourceState::RenderTarget);
            }
            if let Some(depth) = depth_target {
                r.check_attachment_state(depth, ResourceState::DepthWrite);
            }
        }

        self.commands.push(RecordedCommand::BeginPass {
            label: descriptor.label.map(str::to_string),
            color_targets,
            depth_target,
        });
        Box::new(HeadlessRenderPass {
            commands: &mut self.commands,
        })
    }

    fn resource_barrier(&mut self, barriers: &[RenderTargetBarrier]) {
        let mut r = self.registry.lock().expect("headless registry poisoned");
        for barrier in barriers {
            r.apply_barrier(barrier);
        }
        self.commands
            .push(RecordedCommand::Barriers(barriers.to_vec()));
    }

    fn finish(self: Box<Self>) -> CommandBufferId {
        let mut r = self.registry.lock().expect("headless registry poisoned");
        let id = r.allocate_command_buffer();
        log::trace!(
            "command encoder finished: {:?} ({} commands)",
            self.label,
            self.commands.len()
        );
        r.command_buffers.insert(id.0, self.commands);
        id
    }
}

/// An active render pass over the encoder's command stream.
#[derive(Debug)]
struct HeadlessRenderPass<'a> {
    commands: &'a mut Vec<RecordedCommand>,
}

impl<'pass> RenderPass<'pass> for HeadlessRenderPass<'_> {
    fn set_pipeline(&mut self, pipeline: &'pass RenderPipelineId) {
        self.commands.push(RecordedCommand::SetPipeline(*pipeline));
    }

    fn set_bind_group(&mut self, index: u32, bind_group: &'pass BindGroupId) {
        self.commands
            .push(RecordedCommand::SetBindGroup(index, *bind_group));
    }

    fn set_vertex_buffer(&mut self, slot: u32, buffer: &'pass BufferId, _offset: u64) {
        self.commands
            .push(RecordedCommand::SetVertexBuffer(slot, *buffer));
    }

    fn set_index_buffer(
        &mut self,
        buffer: &'pass BufferId,
        _offset: u64,
        index_format: IndexFormat,
    ) {
        self.commands
            .push(RecordedCommand::SetIndexBuffer(*buffer, index_format));
    }

    fn set_viewport(&mut self, viewport: Viewport) {
        self.commands.push(RecordedCommand::SetViewport(viewport));
    }

    fn set_scissor(&mut self, scissor: ScissorRect) {
        self.commands.push(RecordedCommand::SetScissor(scissor));
    }

    fn draw(&mut self, vertices: Range<u32>, instances: Range<u32>) {
        self.commands.push(RecordedCommand::Draw {
            vertices,
            instances,
        });
    }

    fn draw_indexed(&mut self, indices: Range<u32>, _base_vertex: i32, instances: Range<u32>) {
        self.commands.push(RecordedCommand::DrawIndexed {
            indices,
            instances,
        });
    }
}

impl Drop for HeadlessRenderPass<'_> {
    fn drop(&mut self) {
        self.commands.push(RecordedCommand::EndPass);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graphics::headless::HeadlessGraphicsDevice;
    use std::borrow::Cow;
    use vantage_core::math::{Extent2D, LinearRgba};
    use vantage_core::renderer::api::{
        ClearValue, Operations, RenderPassColorAttachment, RenderTargetDescriptor, SampleCount,
        TextureFormat,
    };
    use vantage_core::renderer::traits::GraphicsDevice;

    #[test]
    fn pass_records_begin_and_end() {
        let device = HeadlessGraphicsDevice::new();
        let target = device
            .create_render_target(&RenderTargetDescriptor {
                label: Some(Cow::Borrowed("pass target")),
                extent: Extent2D::new(8, 8),
                format: TextureFormat::Rgba8Unorm,
                sample_count: SampleCount::X1,
                clear_value: ClearValue::Color(LinearRgba::BLACK),
                initial_state: ResourceState::RenderTarget,
            })
            .unwrap();

        let mut encoder = device.create_command_encoder(Some("frame"));
        {
            let mut pass = encoder.begin_render_pass(&RenderPassDescriptor {
                label: Some("color"),
                color_attachments: &[RenderPassColorAttachment {
                    target: &target.id,
                    ops: Operations::clear(LinearRgba::BLACK),
                }],
                depth_attachment: None,
            });
            pass.draw(0..4, 0..1);
        }
        let buffer = encoder.finish();
        device.submit_command_buffer(buffer);

        let stream = device.command_stream(buffer).unwrap();
        assert!(matches!(stream[0], RecordedCommand::BeginPass { .. }));
        assert!(matches!(
            stream[1],
            RecordedCommand::Draw {
                vertices: Range { start: 0, end: 4 },
                ..
            }
        ));
        assert_eq!(stream[2], RecordedCommand::EndPass);
        assert!(device.take_state_violations().is_empty());
    }

    #[test]
    fn binding_an_unready_attachment_is_a_violation() {
        let device = HeadlessGraphicsDevice::new();
        let target = device
            .create_render_target(&RenderTargetDescriptor {
                label: None,
                extent: Extent2D::new(8, 8),
                format: TextureFormat::Rgba8Unorm,
                sample_count: SampleCount::X1,
                clear_value: ClearValue::Color(LinearRgba::BLACK),
                initial_state: ResourceState::ShaderResource,
            })
            .unwrap();

        let mut encoder = device.create_command_encoder(None);
        {
            let _pass = encoder.begin_render_pass(&RenderPassDescriptor {
                label: None,
                color_attachments: &[RenderPassColorAttachment {
                    target: &target.id,
                    ops: Operations::clear(LinearRgba::BLACK),
                }],
                depth_attachment: None,
            });
        }
        let _ = encoder.finish();

        let violations = device.take_state_violations();
        assert_eq!(violations.len(), 1);
        assert!(violations[0].contains("ShaderResource"));
    }
}
