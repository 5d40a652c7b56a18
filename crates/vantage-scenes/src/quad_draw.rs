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

//! Alpha-blended textured quads: a shared renderer (geometry, pipeline,
//! sampler) plus per-quad transforms with one uniform slot per frame in
//! flight.

use std::borrow::Cow;
use std::mem;

use vantage_core::math::Mat4;
use vantage_core::renderer::api::*;
use vantage_core::renderer::error::ResourceError;
use vantage_core::renderer::reload::ReloadFlags;
use vantage_core::renderer::traits::{GraphicsDevice, RenderPass};

use crate::shaders;

/// One corner of a quad.
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct QuadVertex {
    /// Pre-transform position.
    pub position: [f32; 2],
    /// Texture coordinate.
    pub texcoord: [f32; 2],
}

const QUAD_VERTICES: [QuadVertex; 4] = [
    QuadVertex {
        position: [-1.0, -1.0],
        texcoord: [0.0, 1.0],
    },
    QuadVertex {
        position: [1.0, -1.0],
        texcoord: [1.0, 1.0],
    },
    QuadVertex {
        position: [-1.0, 1.0],
        texcoord: [0.0, 0.0],
    },
    QuadVertex {
        position: [1.0, 1.0],
        texcoord: [1.0, 0.0],
    },
];

/// The per-quad uniform block.
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
struct QuadUniform {
    transform: Mat4,
}

/// GPU objects shared by every quad: the vertex buffer, the sampler, and
/// the alpha-blended pipeline.
#[derive(Debug)]
pub struct QuadRenderer {
    vertex_buffer: BufferId,

    // Gated by ReloadFlags::SHADER.
    sampler: Option<SamplerId>,
    vertex_shader: Option<ShaderModuleId>,
    fragment_shader: Option<ShaderModuleId>,
    uniform_layout: Option<BindGroupLayoutId>,
    texture_layout: Option<BindGroupLayoutId>,
    pipeline_layout: Option<PipelineLayoutId>,
    pipeline: Option<RenderPipelineId>,
}

impl QuadRenderer {
    /// Uploads the shared quad geometry.
    pub fn new(device: &dyn GraphicsDevice) -> Result<Self, ResourceError> {
        let vertex_buffer = device.create_buffer_with_data(
            &BufferDescriptor {
                label: Some(Cow::Borrowed("quad vertices")),
                size: mem::size_of_val(&QUAD_VERTICES) as u64,
                usage: BufferUsage::VERTEX | BufferUsage::COPY_DST,
            },
            bytemuck::cast_slice(&QUAD_VERTICES),
        )?;
        Ok(Self {
            vertex_buffer,
            sampler: None,
            vertex_shader: None,
            fragment_shader: None,
            uniform_layout: None,
            texture_layout: None,
            pipeline_layout: None,
            pipeline: None,
        })
    }

    /// Creates the shader-gated objects against the given color format.
    pub fn load(
        &mut self,
        device: &dyn GraphicsDevice,
        reload: ReloadFlags,
        color_format: TextureFormat,
    ) -> Result<(), ResourceError> {
        if !reload.affects_shaders() {
            return Ok(());
        }

        self.sampler = Some(device.create_sampler(&SamplerDescriptor::clamped(
            "quad sampler",
            FilterMode::Linear,
        ))?);

        let vertex_shader = device.create_shader_module(&ShaderModuleDescriptor {
            label: Some("quad vs"),
            source: ShaderSourceData::Wgsl(Cow::Borrowed(shaders::QUAD_WGSL)),
            stage: ShaderStage::Vertex,
            entry_point: "vs_main",
        })?;
        let fragment_shader = device.create_shader_module(&ShaderModuleDescriptor {
            label: Some("quad fs"),
            source: ShaderSourceData::Wgsl(Cow::Borrowed(shaders::QUAD_WGSL)),
            stage: ShaderStage::Fragment,
            entry_point: "fs_main",
        })?;

        let uniform_layout = device.create_bind_group_layout(&BindGroupLayoutDescriptor {
            label: Some("quad transform"),
            entries: &[BindGroupLayoutEntry {
                binding: 0,
                visibility: ShaderStageFlags::VERTEX,
                ty: BindingType::Buffer {
                    ty: BufferBindingType::Uniform,
                },
            }],
        })?;
        let texture_layout = device.create_bind_group_layout(&BindGroupLayoutDescriptor {
            label: Some("quad texture"),
            entries: &[
                BindGroupLayoutEntry {
                    binding: 0,
                    visibility: ShaderStageFlags::FRAGMENT,
                    ty: BindingType::Texture {
                        sample_type: TextureSampleType::Float { filterable: true },
                    },
                },
                BindGroupLayoutEntry {
                    binding: 1,
                    visibility: ShaderStageFlags::FRAGMENT,
                    ty: BindingType::Sampler(SamplerBindingType::Filtering),
                },
            ],
        })?;

        let pipeline_layout = device.create_pipeline_layout(&PipelineLayoutDescriptor {
            label: Some(Cow::Borrowed("quad layout")),
            bind_group_layouts: Cow::Owned(vec![uniform_layout, texture_layout]),
        })?;

        self.pipeline = Some(device.create_render_pipeline(&RenderPipelineDescriptor {
            label: Some(Cow::Borrowed("quad")),
            layout: pipeline_layout,
            vertex_shader_module: vertex_shader,
            fragment_shader_module: Some(fragment_shader),
            vertex_buffers_layout: Cow::Owned(vec![VertexBufferLayoutDescriptor {
                array_stride: mem::size_of::<QuadVertex>() as u64,
                step_mode: VertexStepMode::Vertex,
                attributes: Cow::Owned(vec![
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
            }]),
            primitive_state: PrimitiveStateDescriptor {
                topology: PrimitiveTopology::TriangleStrip,
                cull_mode: None,
            },
            depth_stencil_state: None,
            color_target_states: Cow::Owned(vec![ColorTargetStateDescriptor {
                format: color_format,
                blend: Some(BlendStateDescriptor::ALPHA_BLENDING),
                write_mask: ColorWrites::ALL,
            }]),
            multisample_state: MultisampleStateDescriptor::default(),
        })?);

        self.vertex_shader = Some(vertex_shader);
        self.fragment_shader = Some(fragment_shader);
        self.uniform_layout = Some(uniform_layout);
        self.texture_layout = Some(texture_layout);
        self.pipeline_layout = Some(pipeline_layout);
        Ok(())
    }

    /// Destroys the shader-gated objects.
    pub fn unload(&mut self, device: &dyn GraphicsDevice, reload: ReloadFlags) {
        if !reload.affects_shaders() {
            return;
        }
        let results = [
            self.pipeline
                .take()
                .map(|p| device.destroy_render_pipeline(p)),
            self.pipeline_layout
                .take()
                .map(|l| device.destroy_pipeline_layout(l)),
            self.uniform_layout
                .take()
                .map(|l| device.destroy_bind_group_layout(l)),
            self.texture_layout
                .take()
                .map(|l| device.destroy_bind_group_layout(l)),
            self.vertex_shader
                .take()
                .map(|s| device.destroy_shader_module(s)),
            self.fragment_shader
                .take()
                .map(|s| device.destroy_shader_module(s)),
            self.sampler.take().map(|s| device.destroy_sampler(s)),
        ];
        for result in results.into_iter().flatten() {
            if let Err(e) = result {
                log::warn!("failed to destroy quad renderer resource: {e}");
            }
        }
    }

    /// Destroys the shared geometry.
    pub fn exit(&self, device: &dyn GraphicsDevice) {
        if let Err(e) = device.destroy_buffer(self.vertex_buffer) {
            log::warn!("failed to destroy quad vertex buffer: {e}");
        }
    }

    /// The uniform (group 0) layout, once loaded.
    pub fn uniform_layout(&self) -> Option<BindGroupLayoutId> {
        self.uniform_layout
    }

    /// The texture (group 1) layout, once loaded.
    pub fn texture_layout(&self) -> Option<BindGroupLayoutId> {
        self.texture_layout
    }

    /// The shared sampler, once loaded.
    pub fn sampler(&self) -> Option<SamplerId> {
        self.sampler
    }
}

/// One textured quad with a transform and per-frame uniform slots.
#[derive(Debug)]
pub struct Quad {
    texture: TextureId,
    /// The quad's world transform; written into the frame slot by
    /// [`Quad::pre_draw`].
    pub transform: Mat4,
    uniform_buffers: Vec<BufferId>,
    uniform_bind_groups: Vec<BindGroupId>,
    texture_bind_group: Option<BindGroupId>,
}

impl Quad {
    /// Wraps an existing texture with an identity transform.
    pub fn new(texture: TextureId) -> Self {
        Self {
            texture,
            transform: Mat4::IDENTITY,
            uniform_buffers: Vec::new(),
            uniform_bind_groups: Vec::new(),
            texture_bind_group: None,
        }
    }

    /// Creates one uniform buffer per frame in flight.
    pub fn init(
        &mut self,
        device: &dyn GraphicsDevice,
        frame_count: u32,
    ) -> Result<(), ResourceError> {
        for index in 0..frame_count {
            self.uniform_buffers
                .push(device.create_buffer(&BufferDescriptor {
                    label: Some(Cow::Owned(format!("quad uniform {index}"))),
                    size: mem::size_of::<QuadUniform>() as u64,
                    usage: BufferUsage::UNIFORM | BufferUsage::COPY_DST,
                })?);
        }
        Ok(())
    }

    /// Destroys the uniform buffers. The texture belongs to the scene.
    pub fn exit(&mut self, device: &dyn GraphicsDevice) {
        for buffer in self.uniform_buffers.drain(..) {
            if let Err(e) = device.destroy_buffer(buffer) {
                log::warn!("failed to destroy quad uniform buffer: {e}");
            }
        }
    }

    /// Builds the bind groups against the renderer's layouts.
    pub fn load(
        &mut self,
        device: &dyn GraphicsDevice,
        renderer: &QuadRenderer,
        reload: ReloadFlags,
    ) -> Result<(), ResourceError> {
        if !reload.affects_shaders() {
            return Ok(());
        }

        let uniform_layout = renderer.uniform_layout().ok_or(ResourceError::NotFound)?;
        let texture_layout = renderer.texture_layout().ok_or(ResourceError::NotFound)?;
        let sampler = renderer.sampler().ok_or(ResourceError::NotFound)?;

        for buffer in &self.uniform_buffers {
            self.uniform_bind_groups
                .push(device.create_bind_group(&BindGroupDescriptor {
                    label: Some("quad transform"),
                    layout: uniform_layout,
                    entries: &[BindGroupEntry {
                        binding: 0,
                        resource: BindingResource::Buffer(*buffer),
                    }],
                })?);
        }

        self.texture_bind_group = Some(device.create_bind_group(&BindGroupDescriptor {
            label: Some("quad texture"),
            layout: texture_layout,
            entries: &[
                BindGroupEntry {
                    binding: 0,
                    resource: BindingResource::Texture(self.texture),
                },
                BindGroupEntry {
                    binding: 1,
                    resource: BindingResource::Sampler(sampler),
                },
            ],
        })?);
        Ok(())
    }

    /// Destroys the bind groups.
    pub fn unload(&mut self, device: &dyn GraphicsDevice, reload: ReloadFlags) {
        if !reload.affects_shaders() {
            return;
        }
        for bind_group in self.uniform_bind_groups.drain(..) {
            if let Err(e) = device.destroy_bind_group(bind_group) {
                log::warn!("failed to destroy quad bind group: {e}");
            }
        }
        if let Some(bind_group) = self.texture_bind_group.take() {
            if let Err(e) = device.destroy_bind_group(bind_group) {
                log::warn!("failed to destroy quad texture bind group: {e}");
            }
        }
    }

    /// Writes the transform into this frame's uniform slot.
    pub fn pre_draw(
        &self,
        device: &dyn GraphicsDevice,
        frame_index: u32,
    ) -> Result<(), ResourceError> {
        let buffer = self
            .uniform_buffers
            .get(frame_index as usize)
            .ok_or(ResourceError::NotFound)?;
        let uniform = QuadUniform {
            transform: self.transform,
        };
        device.write_buffer(*buffer, 0, bytemuck::bytes_of(&uniform))
    }

    /// Binds pipeline, bind groups, and geometry, then draws the quad.
    pub fn draw<'pass>(
        &'pass self,
        pass: &mut (dyn RenderPass<'pass> + '_),
        renderer: &'pass QuadRenderer,
        frame_index: u32,
    ) -> Result<(), ResourceError> {
        let pipeline = renderer.pipeline.as_ref().ok_or(ResourceError::NotFound)?;
        let uniforms = self
            .uniform_bind_groups
            .get(frame_index as usize)
            .ok_or(ResourceError::NotFound)?;
        let texture = self
            .texture_bind_group
            .as_ref()
            .ok_or(ResourceError::NotFound)?;

        pass.set_pipeline(pipeline);
        pass.set_bind_group(0, uniforms);
        pass.set_bind_group(1, texture);
        pass.set_vertex_buffer(0, &renderer.vertex_buffer, 0);
        pass.draw(0..QUAD_VERTICES.len() as u32, 0..1);
        Ok(())
    }
}
