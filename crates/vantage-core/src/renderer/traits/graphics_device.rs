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

use crate::math::{Extent3D, Origin3D};
use crate::renderer::api::*;
use crate::renderer::error::ResourceError;
use crate::renderer::traits::CommandEncoder;
use std::fmt::Debug;

/// The device-facing half of the rendering abstraction.
///
/// Every resource-creation call returns a `Result` so callers can check the
/// outcome before using the handle; the returned IDs stay valid until the
/// matching `destroy_*` call.
pub trait GraphicsDevice: Send + Sync + Debug + 'static {
    /// Creates a shader module from the provided descriptor.
    fn create_shader_module(
        &self,
        descriptor: &ShaderModuleDescriptor,
    ) -> Result<ShaderModuleId, ResourceError>;

    /// Destroys the shader module associated with the given ID.
    fn destroy_shader_module(&self, id: ShaderModuleId) -> Result<(), ResourceError>;

    /// Creates a pipeline layout from the provided descriptor.
    fn create_pipeline_layout(
        &self,
        descriptor: &PipelineLayoutDescriptor,
    ) -> Result<PipelineLayoutId, ResourceError>;

    /// Destroys a pipeline layout.
    fn destroy_pipeline_layout(&self, id: PipelineLayoutId) -> Result<(), ResourceError>;

    /// Creates a render pipeline from the provided descriptor.
    fn create_render_pipeline(
        &self,
        descriptor: &RenderPipelineDescriptor,
    ) -> Result<RenderPipelineId, ResourceError>;

    /// Destroys the render pipeline associated with the given ID.
    fn destroy_render_pipeline(&self, id: RenderPipelineId) -> Result<(), ResourceError>;

    /// Creates a new GPU buffer.
    fn create_buffer(&self, descriptor: &BufferDescriptor) -> Result<BufferId, ResourceError>;

    /// Creates a new GPU buffer and initializes it with the provided data.
    /// More efficient for static buffers than create-then-write.
    fn create_buffer_with_data(
        &self,
        descriptor: &BufferDescriptor,
        data: &[u8],
    ) -> Result<BufferId, ResourceError>;

    /// Destroys a GPU buffer.
    fn destroy_buffer(&self, id: BufferId) -> Result<(), ResourceError>;

    /// Writes data to a GPU buffer at the given byte offset.
    fn write_buffer(&self, id: BufferId, offset: u64, data: &[u8]) -> Result<(), ResourceError>;

    /// Creates a new GPU texture.
    fn create_texture(&self, descriptor: &TextureDescriptor) -> Result<TextureId, ResourceError>;

    /// Destroys a GPU texture.
    fn destroy_texture(&self, id: TextureId) -> Result<(), ResourceError>;

    /// Writes pixel data to a region of a GPU texture.
    fn write_texture(
        &self,
        texture_id: TextureId,
        data: &[u8],
        bytes_per_row: Option<u32>,
        offset: Origin3D,
        size: Extent3D,
    ) -> Result<(), ResourceError>;

    /// Creates a new sampler.
    fn create_sampler(&self, descriptor: &SamplerDescriptor) -> Result<SamplerId, ResourceError>;

    /// Destroys a sampler.
    fn destroy_sampler(&self, id: SamplerId) -> Result<(), ResourceError>;

    /// Creates a bind group layout.
    fn create_bind_group_layout(
        &self,
        descriptor: &BindGroupLayoutDescriptor,
    ) -> Result<BindGroupLayoutId, ResourceError>;

    /// Destroys a bind group layout.
    fn destroy_bind_group_layout(&self, id: BindGroupLayoutId) -> Result<(), ResourceError>;

    /// Creates a bind group. Every resource referenced by the descriptor
    /// must be alive.
    fn create_bind_group(
        &self,
        descriptor: &BindGroupDescriptor,
    ) -> Result<BindGroupId, ResourceError>;

    /// Destroys a bind group.
    fn destroy_bind_group(&self, id: BindGroupId) -> Result<(), ResourceError>;

    /// Creates a render target. The returned value carries the sampled
    /// texture handle and the immutable properties passes need.
    fn create_render_target(
        &self,
        descriptor: &RenderTargetDescriptor,
    ) -> Result<RenderTarget, ResourceError>;

    /// Destroys a render target and its backing texture.
    fn destroy_render_target(&self, id: RenderTargetId) -> Result<(), ResourceError>;

    /// Creates a new command encoder to record GPU commands.
    fn create_command_encoder(&self, label: Option<&str>) -> Box<dyn CommandEncoder>;

    /// Submits a previously recorded command buffer to the GPU for execution.
    fn submit_command_buffer(&self, command_buffer: CommandBufferId);
}
