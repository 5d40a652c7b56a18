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

//! The headless `GraphicsDevice` implementation.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use vantage_core::math::{Extent2D, Extent3D, Origin3D};
use vantage_core::renderer::api::*;
use vantage_core::renderer::error::ResourceError;
use vantage_core::renderer::traits::{CommandEncoder, GraphicsDevice};

use super::command::{HeadlessCommandEncoder, RecordedCommand};

#[derive(Debug)]
pub(crate) struct BufferRecord {
    pub size: u64,
    pub data: Vec<u8>,
}

#[derive(Debug)]
pub(crate) struct TextureRecord {
    pub size: Extent3D,
    pub format: TextureFormat,
}

#[derive(Debug)]
pub(crate) struct RenderTargetRecord {
    pub extent: Extent2D,
    pub format: TextureFormat,
    pub state: ResourceState,
    pub texture: TextureId,
}

/// The shared bookkeeping behind a [`HeadlessGraphicsDevice`] and the
/// encoders it hands out.
#[derive(Debug, Default)]
pub(crate) struct Registry {
    next_id: usize,
    next_command_buffer: u64,
    pub buffers: HashMap<usize, BufferRecord>,
    pub textures: HashMap<usize, TextureRecord>,
    pub samplers: HashMap<usize, ()>,
    pub shaders: HashMap<usize, ()>,
    pub pipeline_layouts: HashMap<usize, ()>,
    pub pipelines: HashMap<usize, ()>,
    pub bind_group_layouts: HashMap<usize, usize>,
    pub bind_groups: HashMap<usize, Vec<BindGroupEntry>>,
    pub render_targets: HashMap<usize, RenderTargetRecord>,
    pub command_buffers: HashMap<u64, Vec<RecordedCommand>>,
    pub submitted: Vec<CommandBufferId>,
    pub state_violations: Vec<String>,
}

impl Registry {
    fn allocate_id(&mut self) -> usize {
        self.next_id += 1;
        self.next_id
    }

    pub(crate) fn allocate_command_buffer(&mut self) -> CommandBufferId {
        self.next_command_buffer += 1;
        CommandBufferId(self.next_command_buffer)
    }

    pub(crate) fn record_violation(&mut self, message: String) {
        log::error!("resource state violation: {message}");
        self.state_violations.push(message);
    }

    /// Applies a barrier, recording a violation when the expected `from`
    /// state does not match the tracked state.
    pub(crate) fn apply_barrier(&mut self, barrier: &RenderTargetBarrier) {
        match self.render_targets.get_mut(&barrier.target.0) {
            Some(record) => {
                let current = record.state;
                record.state = barrier.to;
                if current != barrier.from {
                    self.record_violation(format!(
                        "barrier on {:?} expected {:?} but target is in {:?}",
                        barrier.target, barrier.from, current
                    ));
                }
            }
            None => {
                self.record_violation(format!("barrier on unknown target {:?}", barrier.target));
            }
        }
    }

    /// Checks that an attachment is in the state a pass requires.
    pub(crate) fn check_attachment_state(&mut self, id: RenderTargetId, required: ResourceState) {
        match self.render_targets.get(&id.0) {
            Some(record) if record.state == required => {}
            Some(record) => {
                let state = record.state;
                self.record_violation(format!(
                    "attachment {id:?} bound while in {state:?}, requires {required:?}"
                ));
            }
            None => {
                self.record_violation(format!("attachment on unknown target {id:?}"));
            }
        }
    }
}

/// A `GraphicsDevice` that allocates handles and tracks state without a GPU.
///
/// Cloning the device is cheap and shares the underlying registry, so an
/// application shell and its tests can both observe the same state.
#[derive(Debug, Clone, Default)]
pub struct HeadlessGraphicsDevice {
    registry: Arc<Mutex<Registry>>,
}

impl HeadlessGraphicsDevice {
    /// Creates an empty device.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Registry> {
        self.registry.lock().expect("headless registry poisoned")
    }

    /// Returns the current state of a render target, if it is alive.
    pub fn render_target_state(&self, id: RenderTargetId) -> Option<ResourceState> {
        self.lock().render_targets.get(&id.0).map(|r| r.state)
    }

    /// Returns the extent of a render target, if it is alive.
    pub fn render_target_extent(&self, id: RenderTargetId) -> Option<Extent2D> {
        self.lock().render_targets.get(&id.0).map(|r| r.extent)
    }

    /// Returns the format of a render target, if it is alive.
    pub fn render_target_format(&self, id: RenderTargetId) -> Option<TextureFormat> {
        self.lock().render_targets.get(&id.0).map(|r| r.format)
    }

    /// Returns the number of currently alive resources of every kind.
    pub fn live_resource_count(&self) -> usize {
        let r = self.lock();
        r.buffers.len()
            + r.textures.len()
            + r.samplers.len()
            + r.shaders.len()
            + r.pipeline_layouts.len()
            + r.pipelines.len()
            + r.bind_group_layouts.len()
            + r.bind_groups.len()
            + r.render_targets.len()
    }

    /// Returns the number of render targets currently alive.
    pub fn live_render_target_count(&self) -> usize {
        self.lock().render_targets.len()
    }

    /// Returns a copy of a buffer's current contents, if it is alive.
    pub fn buffer_data(&self, id: BufferId) -> Option<Vec<u8>> {
        self.lock().buffers.get(&id.0).map(|b| b.data.clone())
    }

    /// Returns the recorded command stream of a finished command buffer.
    pub fn command_stream(&self, id: CommandBufferId) -> Option<Vec<RecordedCommand>> {
        self.lock().command_buffers.get(&id.0).cloned()
    }

    /// Returns the command buffers submitted so far, in submission order.
    pub fn submissions(&self) -> Vec<CommandBufferId> {
        self.lock().submitted.clone()
    }

    /// Drains and returns every resource-state violation recorded so far.
    pub fn take_state_violations(&self) -> Vec<String> {
        std::mem::take(&mut self.lock().state_violations)
    }

    pub(crate) fn registry(&self) -> Arc<Mutex<Registry>> {
        Arc::clone(&self.registry)
    }
}

impl GraphicsDevice for HeadlessGraphicsDevice {
    fn create_shader_module(
        &self,
        descriptor: &ShaderModuleDescriptor,
    ) -> Result<ShaderModuleId, ResourceError> {
        let ShaderSourceData::Wgsl(source) = &descriptor.source;
        if source.trim().is_empty() {
            return Err(ResourceError::Shader(
                vantage_core::renderer::error::ShaderError::CompilationError {
                    label: descriptor.label.unwrap_or("unlabeled").to_string(),
                    details: "empty shader source".to_string(),
                },
            ));
        }
        let mut r = self.lock();
        let id = r.allocate_id();
        r.shaders.insert(id, ());
        Ok(ShaderModuleId(id))
    }

    fn destroy_shader_module(&self, id: ShaderModuleId) -> Result<(), ResourceError> {
        self.lock()
            .shaders
            .remove(&id.0)
            .map(|_| ())
            .ok_or(ResourceError::InvalidHandle)
    }

    fn create_pipeline_layout(
        &self,
        descriptor: &PipelineLayoutDescriptor,
    ) -> Result<PipelineLayoutId, ResourceError> {
        let mut r = self.lock();
        for layout in descriptor.bind_group_layouts.iter() {
            if !r.bind_group_layouts.contains_key(&layout.0) {
                return Err(ResourceError::InvalidHandle);
            }
        }
        let id = r.allocate_id();
        r.pipeline_layouts.insert(id, ());
        Ok(PipelineLayoutId(id))
    }

    fn destroy_pipeline_layout(&self, id: PipelineLayoutId) -> Result<(), ResourceError> {
        self.lock()
            .pipeline_layouts
            .remove(&id.0)
            .map(|_| ())
            .ok_or(ResourceError::InvalidHandle)
    }

    fn create_render_pipeline(
        &self,
        descriptor: &RenderPipelineDescriptor,
    ) -> Result<RenderPipelineId, ResourceError> {
        let mut r = self.lock();
        if !r.shaders.contains_key(&descriptor.vertex_shader_module.0) {
            return Err(ResourceError::Pipeline(
                vantage_core::renderer::error::PipelineError::InvalidShaderModule {
                    id: descriptor.vertex_shader_module,
                    pipeline_label: descriptor.label.as_deref().map(str::to_string),
                },
            ));
        }
        if let Some(fragment) = descriptor.fragment_shader_module {
            if !r.shaders.contains_key(&fragment.0) {
                return Err(ResourceError::Pipeline(
                    vantage_core::renderer::error::PipelineError::InvalidShaderModule {
                        id: fragment,
                        pipeline_label: descriptor.label.as_deref().map(str::to_string),
                    },
                ));
            }
        }
        if !r.pipeline_layouts.contains_key(&descriptor.layout.0) {
            return Err(ResourceError::InvalidHandle);
        }
        let id = r.allocate_id();
        r.pipelines.insert(id, ());
        Ok(RenderPipelineId(id))
    }

    fn destroy_render_pipeline(&self, id: RenderPipelineId) -> Result<(), ResourceError> {
        self.lock()
            .pipelines
            .remove(&id.0)
            .map(|_| ())
            .ok_or(ResourceError::InvalidHandle)
    }

    fn create_buffer(&self, descriptor: &BufferDescriptor) -> Result<BufferId, ResourceError> {
        let mut r = self.lock();
        let id = r.allocate_id();
        r.buffers.insert(
            id,
            BufferRecord {
                size: descriptor.size,
                data: vec![0; descriptor.size as usize],
            },
        );
        Ok(BufferId(id))
    }

    fn create_buffer_with_data(
        &self,
        descriptor: &BufferDescriptor,
        data: &[u8],
    ) -> Result<BufferId, ResourceError> {
        if data.len() as u64 > descriptor.size {
            return Err(ResourceError::OutOfBounds);
        }
        let id = self.create_buffer(descriptor)?;
        self.write_buffer(id, 0, data)?;
        Ok(id)
    }

    fn destroy_buffer(&self, id: BufferId) -> Result<(), ResourceError> {
        self.lock()
            .buffers
            .remove(&id.0)
            .map(|_| ())
            .ok_or(ResourceError::InvalidHandle)
    }

    fn write_buffer(&self, id: BufferId, offset: u64, data: &[u8]) -> Result<(), ResourceError> {
        let mut r = self.lock();
        let record = r.buffers.get_mut(&id.0).ok_or(ResourceError::InvalidHandle)?;
        let end = offset
            .checked_add(data.len() as u64)
            .ok_or(ResourceError::OutOfBounds)?;
        if end > record.size {
            return Err(ResourceError::OutOfBounds);
        }
        record.data[offset as usize..end as usize].copy_from_slice(data);
        Ok(())
    }

    fn create_texture(&self, descriptor: &TextureDescriptor) -> Result<TextureId, ResourceError> {
        if descriptor.size.width == 0 || descriptor.size.height == 0 {
            return Err(ResourceError::InvalidDescriptor(
                "texture extent must be non-zero".to_string(),
            ));
        }
        let mut r = self.lock();
        let id = r.allocate_id();
        r.textures.insert(
            id,
            TextureRecord {
                size: descriptor.size,
                format: descriptor.format,
            },
        );
        Ok(TextureId(id))
    }

    fn destroy_texture(&self, id: TextureId) -> Result<(), ResourceError> {
        self.lock()
            .textures
            .remove(&id.0)
            .map(|_| ())
            .ok_or(ResourceError::InvalidHandle)
    }

    fn write_texture(
        &self,
        texture_id: TextureId,
        data: &[u8],
        bytes_per_row: Option<u32>,
        offset: Origin3D,
        size: Extent3D,
    ) -> Result<(), ResourceError> {
        let r = self.lock();
        let record = r
            .textures
            .get(&texture_id.0)
            .ok_or(ResourceError::InvalidHandle)?;
        if offset.x + size.width > record.size.width || offset.y + size.height > record.size.height
        {
            return Err(ResourceError::OutOfBounds);
        }
        let row = bytes_per_row
            .unwrap_or(size.width * record.format.bytes_per_pixel())
            as usize;
        let required = row * size.height as usize * size.depth_or_array_layers.max(1) as usize;
        if data.len() < required {
            return Err(ResourceError::OutOfBounds);
        }
        Ok(())
    }

    fn create_sampler(&self, _descriptor: &SamplerDescriptor) -> Result<SamplerId, ResourceError> {
        let mut r = self.lock();
        let id = r.allocate_id();
        r.samplers.insert(id, ());
        Ok(SamplerId(id))
    }

    fn destroy_sampler(&self, id: SamplerId) -> Result<(), ResourceError> {
        self.lock()
            .samplers
            .remove(&id.0)
            .map(|_| ())
            .ok_or(ResourceError::InvalidHandle)
    }

    fn create_bind_group_layout(
        &self,
        descriptor: &BindGroupLayoutDescriptor,
    ) -> Result<BindGroupLayoutId, ResourceError> {
        let mut r = self.lock();
        let id = r.allocate_id();
        r.bind_group_layouts.insert(id, descriptor.entries.len());
        Ok(BindGroupLayoutId(id))
    }

    fn destroy_bind_group_layout(&self, id: BindGroupLayoutId) -> Result<(), ResourceError> {
        self.lock()
            .bind_group_layouts
            .remove(&id.0)
            .map(|_| ())
            .ok_or(ResourceError::InvalidHandle)
    }

    fn create_bind_group(
        &self,
        descriptor: &BindGroupDescriptor,
    ) -> Result<BindGroupId, ResourceError> {
        let mut r = self.lock();
        let expected = *r
            .bind_group_layouts
            .get(&descriptor.layout.0)
            .ok_or(ResourceError::InvalidHandle)?;
        if descriptor.entries.len() != expected {
            return Err(ResourceError::InvalidDescriptor(format!(
                "bind group has {} entries, layout expects {}",
                descriptor.entries.len(),
                expected
            )));
        }
        for entry in descriptor.entries {
            let alive = match entry.resource {
                BindingResource::Buffer(buffer) => r.buffers.contains_key(&buffer.0),
                BindingResource::Texture(texture) => r.textures.contains_key(&texture.0),
                BindingResource::Sampler(sampler) => r.samplers.contains_key(&sampler.0),
            };
            if !alive {
                return Err(ResourceError::InvalidHandle);
            }
        }
        let id = r.allocate_id();
        r.bind_groups.insert(id, descriptor.entries.to_vec());
        Ok(BindGroupId(id))
    }

    fn destroy_bind_group(&self, id: BindGroupId) -> Result<(), ResourceError> {
        self.lock()
            .bind_groups
            .remove(&id.0)
            .map(|_| ())
            .ok_or(ResourceError::InvalidHandle)
    }

    fn create_render_target(
        &self,
        descriptor: &RenderTargetDescriptor,
    ) -> Result<RenderTarget, ResourceError> {
        if descriptor.extent.width == 0 || descriptor.extent.height == 0 {
            return Err(ResourceError::InvalidDescriptor(
                "render target extent must be non-zero".to_string(),
            ));
        }
        let mut r = self.lock();
        let texture_id = r.allocate_id();
        r.textures.insert(
            texture_id,
            TextureRecord {
                size: descriptor.extent.to_3d(),
                format: descriptor.format,
            },
        );
        let id = r.allocate_id();
        r.render_targets.insert(
            id,
            RenderTargetRecord {
                extent: descriptor.extent,
                format: descriptor.format,
                state: descriptor.initial_state,
                texture: TextureId(texture_id),
            },
        );
        Ok(RenderTarget {
            id: RenderTargetId(id),
            texture: TextureId(texture_id),
            extent: descriptor.extent,
            format: descriptor.format,
            sample_count: descriptor.sample_count,
        })
    }

    fn destroy_render_target(&self, id: RenderTargetId) -> Result<(), ResourceError> {
        let mut r = self.lock();
        let record = r
            .render_targets
            .remove(&id.0)
            .ok_or(ResourceError::InvalidHandle)?;
        r.textures.remove(&record.texture.0);
        Ok(())
    }

    fn create_command_encoder(&self, label: Option<&str>) -> Box<dyn CommandEncoder> {
        Box::new(HeadlessCommandEncoder::new(
            self.registry(),
            label.map(str::to_string),
        ))
    }

    fn submit_command_buffer(&self, command_buffer: CommandBufferId) {
        let mut r = self.lock();
        if !r.command_buffers.contains_key(&command_buffer.0) {
            r.record_violation(format!("submitted unknown command buffer {command_buffer:?}"));
            return;
        }
        r.submitted.push(command_buffer);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::borrow::Cow;

    fn color_target(device: &HeadlessGraphicsDevice, state: ResourceState) -> RenderTarget {
        device
            .create_render_target(&RenderTargetDescriptor {
                label: Some(Cow::Borrowed("test target")),
                extent: Extent2D::new(64, 32),
                format: TextureFormat::Rgba8Unorm,
                sample_count: SampleCount::X1,
                clear_value: ClearValue::Color(vantage_core::math::LinearRgba::BLACK),
                initial_state: state,
            })
            .expect("target creation should succeed")
    }

    #[test]
    fn create_and_destroy_round_trip() {
        let device = HeadlessGraphicsDevice::new();
        let buffer = device
            .create_buffer(&BufferDescriptor {
                label: None,
                size: 16,
                usage: BufferUsage::UNIFORM,
            })
            .unwrap();
        assert_eq!(device.live_resource_count(), 1);
        device.destroy_buffer(buffer).unwrap();
        assert_eq!(device.live_resource_count(), 0);
        assert!(matches!(
            device.destroy_buffer(buffer),
            Err(ResourceError::InvalidHandle)
        ));
    }

    #[test]
    fn write_buffer_bounds_are_checked() {
        let device = HeadlessGraphicsDevice::new();
        let buffer = device
            .create_buffer(&BufferDescriptor {
                label: None,
                size: 8,
                usage: BufferUsage::UNIFORM,
            })
            .unwrap();
        device.write_buffer(buffer, 4, &[1, 2, 3, 4]).unwrap();
        assert_eq!(device.buffer_data(buffer).unwrap()[4..], [1, 2, 3, 4]);
        assert!(matches!(
            device.write_buffer(buffer, 6, &[0; 4]),
            Err(ResourceError::OutOfBounds)
        ));
    }

    #[test]
    fn render_target_owns_its_texture() {
        let device = HeadlessGraphicsDevice::new();
        let target = color_target(&device, ResourceState::ShaderResource);
        // Target plus its backing texture.
        assert_eq!(device.live_resource_count(), 2);
        device.destroy_render_target(target.id).unwrap();
        assert_eq!(device.live_resource_count(), 0);
    }

    #[test]
    fn barrier_mismatch_is_recorded_not_fatal() {
        let device = HeadlessGraphicsDevice::new();
        let target = color_target(&device, ResourceState::ShaderResource);

        let mut encoder = device.create_command_encoder(Some("test"));
        encoder.resource_barrier(&[RenderTargetBarrier::new(
            target.id,
            ResourceState::RenderTarget,
            ResourceState::ShaderResource,
        )]);
        let buffer = encoder.finish();
        device.submit_command_buffer(buffer);

        let violations = device.take_state_violations();
        assert_eq!(violations.len(), 1);
        assert!(violations[0].contains("expected RenderTarget"));
    }

    #[test]
    fn bind_group_validates_entry_count_and_liveness() {
        let device = HeadlessGraphicsDevice::new();
        let layout = device
            .create_bind_group_layout(&BindGroupLayoutDescriptor {
                label: None,
                entries: &[BindGroupLayoutEntry {
                    binding: 0,
                    visibility: ShaderStageFlags::FRAGMENT,
                    ty: BindingType::Buffer {
                        ty: BufferBindingType::Uniform,
                    },
                }],
            })
            .unwrap();

        let missing = BufferId(999);
        let err = device.create_bind_group(&BindGroupDescriptor {
            label: None,
            layout,
            entries: &[BindGroupEntry {
                binding: 0,
                resource: BindingResource::Buffer(missing),
            }],
        });
        assert!(matches!(err, Err(ResourceError::InvalidHandle)));

        let err = device.create_bind_group(&BindGroupDescriptor {
            label: None,
            layout,
            entries: &[],
        });
        assert!(matches!(err, Err(ResourceError::InvalidDescriptor(_))));
    }
}
