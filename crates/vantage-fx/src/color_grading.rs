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

//! The color-grading stage: a single full-screen pass sampling the input
//! image and a baked color lookup table with nearest-neighbor filtering.

use std::borrow::Cow;

use vantage_core::math::LinearRgba;
use vantage_core::renderer::api::*;
use vantage_core::renderer::error::{RenderError, ResourceError};
use vantage_core::renderer::reload::ReloadFlags;
use vantage_core::renderer::traits::{CommandEncoder, GraphicsDevice, RenderPass as _};

use crate::quad::ScreenQuad;
use crate::shaders;

/// The color-grading stage. The LUT texture lives from construction to
/// [`ColorGradingStage::exit`]; shader objects follow the reload gating; no
/// stage-internal render targets exist.
#[derive(Debug)]
pub struct ColorGradingStage {
    lut_texture: TextureId,

    // Gated by ReloadFlags::SHADER.
    sampler: Option<SamplerId>,
    vertex_shader: Option<ShaderModuleId>,
    fragment_shader: Option<ShaderModuleId>,
    bind_group_layout: Option<BindGroupLayoutId>,
    pipeline_layout: Option<PipelineLayoutId>,
    pipeline: Option<RenderPipelineId>,

    // Refreshed on every load.
    bind_group: Option<BindGroupId>,
    output: Option<RenderTarget>,
}

impl ColorGradingStage {
    /// Uploads the lookup table and prepares an unloaded stage.
    pub fn new(device: &dyn GraphicsDevice, lut: &CpuTexture) -> Result<Self, ResourceError> {
        if !lut.is_consistent() {
            return Err(ResourceError::InvalidDescriptor(
                "color grading LUT pixel data does not match its extent".to_string(),
            ));
        }

        let lut_texture =
            device.create_texture(&lut.to_descriptor(Some(Cow::Borrowed("color grading lut"))))?;
        device.write_texture(lut_texture, &lut.pixels, None, Default::default(), lut.size)?;

        Ok(Self {
            lut_texture,
            sampler: None,
            vertex_shader: None,
            fragment_shader: None,
            bind_group_layout: None,
            pipeline_layout: None,
            pipeline: None,
            bind_group: None,
            output: None,
        })
    }

    /// Creates the resources selected by `reload` and wires the stage to
    /// read `input` and write `output`.
    pub fn load(
        &mut self,
        device: &dyn GraphicsDevice,
        reload: ReloadFlags,
        input: TextureId,
        output: &RenderTarget,
    ) -> Result<(), ResourceError> {
        if reload.affects_shaders() {
            self.sampler = Some(device.create_sampler(&SamplerDescriptor::clamped(
                "color grading",
                FilterMode::Nearest,
            ))?);

            let vertex_shader = device.create_shader_module(&ShaderModuleDescriptor {
                label: Some("color grading vs"),
                source: ShaderSourceData::Wgsl(Cow::Borrowed(shaders::COLOR_GRADING_WGSL)),
                stage: ShaderStage::Vertex,
                entry_point: "vs_main",
            })?;
            let fragment_shader = device.create_shader_module(&ShaderModuleDescriptor {
                label: Some("color grading fs"),
                source: ShaderSourceData::Wgsl(Cow::Borrowed(shaders::COLOR_GRADING_WGSL)),
                stage: ShaderStage::Fragment,
                entry_point: "fs_main",
            })?;

            let bind_group_layout = device.create_bind_group_layout(&BindGroupLayoutDescriptor {
                label: Some("color grading bindings"),
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
                        ty: BindingType::Texture {
                            sample_type: TextureSampleType::Float { filterable: false },
                        },
                    },
                    BindGroupLayoutEntry {
                        binding: 2,
                        visibility: ShaderStageFlags::FRAGMENT,
                        ty: BindingType::Sampler(SamplerBindingType::NonFiltering),
                    },
                ],
            })?;

            let pipeline_layout = device.create_pipeline_layout(&PipelineLayoutDescriptor {
                label: Some(Cow::Borrowed("color grading layout")),
                bind_group_layouts: Cow::Owned(vec![bind_group_layout]),
            })?;

            self.pipeline = Some(device.create_render_pipeline(&RenderPipelineDescriptor {
                label: Some(Cow::Borrowed("color grading")),
                layout: pipeline_layout,
                vertex_shader_module: vertex_shader,
                fragment_shader_module: Some(fragment_shader),
                vertex_buffers_layout: Cow::Owned(vec![ScreenQuad::vertex_layout()]),
                primitive_state: PrimitiveStateDescriptor {
                    topology: PrimitiveTopology::TriangleStrip,
                    cull_mode: None,
                },
                depth_stencil_state: None,
                color_target_states: Cow::Owned(vec![ColorTargetStateDescriptor::opaque(
                    output.format,
                )]),
                multisample_state: MultisampleStateDescriptor::default(),
            })?);

            self.vertex_shader = Some(vertex_shader);
            self.fragment_shader = Some(fragment_shader);
            self.bind_group_layout = Some(bind_group_layout);
            self.pipeline_layout = Some(pipeline_layout);
        }

        self.refresh_bind_group(device, input)?;
        self.output = Some(*output);
        Ok(())
    }

    fn refresh_bind_group(
        &mut self,
        device: &dyn GraphicsDevice,
        input: TextureId,
    ) -> Result<(), ResourceError> {
        if let Some(old) = self.bind_group.take() {
            device.destroy_bind_group(old)?;
        }

        let layout = self.bind_group_layout.ok_or(ResourceError::NotFound)?;
        let sampler = self.sampler.ok_or(ResourceError::NotFound)?;

        self.bind_group = Some(device.create_bind_group(&BindGroupDescriptor {
            label: Some("color grading bindings"),
            layout,
            entries: &[
                BindGroupEntry {
                    binding: 0,
                    resource: BindingResource::Texture(input),
                },
                BindGroupEntry {
                    binding: 1,
                    resource: BindingResource::Texture(self.lut_texture),
                },
                BindGroupEntry {
                    binding: 2,
                    resource: BindingResource::Sampler(sampler),
                },
            ],
        })?);
        Ok(())
    }

    /// Releases the resources selected by `reload`.
    pub fn unload(&mut self, device: &dyn GraphicsDevice, reload: ReloadFlags) {
        if let Some(bind_group) = self.bind_group.take() {
            if let Err(e) = device.destroy_bind_group(bind_group) {
                log::warn!("failed to destroy color grading bind group: {e}");
            }
        }

        if reload.affects_shaders() {
            let results = [
                self.pipeline
                    .take()
                    .map(|p| device.destroy_render_pipeline(p)),
                self.pipeline_layout
                    .take()
                    .map(|l| device.destroy_pipeline_layout(l)),
                self.bind_group_layout
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
                    log::warn!("failed to destroy color grading resource: {e}");
                }
            }
        }
    }

    /// Destroys the construction-time LUT texture.
    pub fn exit(&mut self, device: &dyn GraphicsDevice) {
        if let Err(e) = device.destroy_texture(self.lut_texture) {
            log::warn!("failed to destroy color grading lut: {e}");
        }
    }

    /// Records the single grading pass into the stage output. The output's
    /// state machine belongs to the caller.
    pub fn draw<'pass>(
        &'pass self,
        encoder: &mut dyn CommandEncoder,
        quad: &'pass ScreenQuad,
    ) -> Result<(), RenderError> {
        let (Some(pipeline), Some(bind_group), Some(output)) = (
            self.pipeline.as_ref(),
            self.bind_group.as_ref(),
            self.output.as_ref(),
        ) else {
            return Err(RenderError::RenderingFailed(
                "color grading stage drawn before load".to_string(),
            ));
        };

        let mut pass = encoder.begin_render_pass(&RenderPassDescriptor {
            label: Some("color grading"),
            color_attachments: &[RenderPassColorAttachment {
                target: &output.id,
                ops: Operations::clear(LinearRgba::TRANSPARENT),
            }],
            depth_attachment: None,
        });
        pass.set_viewport(Viewport::covering(output.extent.width, output.extent.height));
        pass.set_scissor(ScissorRect::covering(
            output.extent.width,
            output.extent.height,
        ));
        pass.set_pipeline(pipeline);
        pass.set_bind_group(0, bind_group);
        quad.draw(pass.as_mut());

        Ok(())
    }

    /// The grading pipeline, if the shader partition is loaded.
    pub fn pipeline(&self) -> Option<RenderPipelineId> {
        self.pipeline
    }
}
