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

//! The SMAA anti-aliasing stage: three fixed sub-passes over two
//! stage-internal render targets.
//!
//! 1. **Edge detection** reads the stage input and writes a 2-channel edge
//!    mask.
//! 2. **Blending-weight calculation** reads the edge mask plus the two
//!    precomputed lookup tables and writes 4-channel coverage weights.
//! 3. **Neighborhood blending** reads the stage input and the weights and
//!    writes the stage output.
//!
//! The edge and weight buffers belong to this stage and are distinct from
//! the chain-level intermediate targets; both live in `ShaderResource`
//! state between draws and are transitioned around the sub-pass that
//! writes them.

use std::borrow::Cow;

use vantage_core::math::{Extent2D, LinearRgba};
use vantage_core::renderer::api::*;
use vantage_core::renderer::error::{RenderError, ResourceError};
use vantage_core::renderer::reload::ReloadFlags;
use vantage_core::renderer::traits::{CommandEncoder, GraphicsDevice, RenderPass as _};

use crate::quad::ScreenQuad;
use crate::shaders;

/// Dimensions of the precomputed area table (two channels per texel).
pub const AREA_TABLE_EXTENT: Extent2D = Extent2D::new(160, 560);
/// Dimensions of the precomputed search table (one channel per texel).
pub const SEARCH_TABLE_EXTENT: Extent2D = Extent2D::new(64, 16);

/// The raw bytes of the two precomputed SMAA lookup tables.
///
/// The tables are baked offline; the hosting application supplies them from
/// its content directory.
#[derive(Debug, Clone)]
pub struct SmaaLookupTables {
    /// `Rg8Unorm` area table, [`AREA_TABLE_EXTENT`] texels.
    pub area: Vec<u8>,
    /// `R8Unorm` search table, [`SEARCH_TABLE_EXTENT`] texels.
    pub search: Vec<u8>,
}

impl SmaaLookupTables {
    /// Tables of the right dimensions filled with zeroes. Every weight
    /// lookup then resolves to zero coverage, so blending is a no-op; good
    /// enough for headless runs and tests.
    pub fn zeroed() -> Self {
        Self {
            area: vec![0; (AREA_TABLE_EXTENT.width * AREA_TABLE_EXTENT.height * 2) as usize],
            search: vec![0; (SEARCH_TABLE_EXTENT.width * SEARCH_TABLE_EXTENT.height) as usize],
        }
    }

    /// Checks both byte lengths against the fixed table dimensions.
    pub fn validate(&self) -> Result<(), ResourceError> {
        let area_len = (AREA_TABLE_EXTENT.width * AREA_TABLE_EXTENT.height * 2) as usize;
        if self.area.len() != area_len {
            return Err(ResourceError::InvalidDescriptor(format!(
                "SMAA area table is {} bytes, expected {}",
                self.area.len(),
                area_len
            )));
        }
        let search_len = (SEARCH_TABLE_EXTENT.width * SEARCH_TABLE_EXTENT.height) as usize;
        if self.search.len() != search_len {
            return Err(ResourceError::InvalidDescriptor(format!(
                "SMAA search table is {} bytes, expected {}",
                self.search.len(),
                search_len
            )));
        }
        Ok(())
    }
}

#[derive(Debug)]
struct SmaaShaderSet {
    edges_vs: ShaderModuleId,
    edges_fs: ShaderModuleId,
    weights_vs: ShaderModuleId,
    weights_fs: ShaderModuleId,
    blend_vs: ShaderModuleId,
    blend_fs: ShaderModuleId,
}

impl SmaaShaderSet {
    fn all(&self) -> [ShaderModuleId; 6] {
        [
            self.edges_vs,
            self.edges_fs,
            self.weights_vs,
            self.weights_fs,
            self.blend_vs,
            self.blend_fs,
        ]
    }
}

/// The SMAA stage. Lookup textures live from construction to [`SmaaStage::exit`];
/// everything else follows the reload-flag gating described on
/// [`ReloadFlags`].
#[derive(Debug)]
pub struct SmaaStage {
    area_texture: TextureId,
    search_texture: TextureId,

    // Gated by ReloadFlags::SHADER.
    linear_sampler: Option<SamplerId>,
    point_sampler: Option<SamplerId>,
    shader_set: Option<SmaaShaderSet>,
    bind_group_layout: Option<BindGroupLayoutId>,
    pipeline_layout: Option<PipelineLayoutId>,
    edge_pipeline: Option<RenderPipelineId>,
    weight_pipeline: Option<RenderPipelineId>,
    blend_pipeline: Option<RenderPipelineId>,

    // Gated by ReloadFlags::RESIZE | ReloadFlags::RENDER_TARGET.
    edges_target: Option<RenderTarget>,
    blend_target: Option<RenderTarget>,

    // Refreshed on every load.
    bind_group: Option<BindGroupId>,
    output: Option<RenderTarget>,
}

impl SmaaStage {
    /// Uploads the lookup tables and prepares an unloaded stage.
    pub fn new(
        device: &dyn GraphicsDevice,
        tables: &SmaaLookupTables,
    ) -> Result<Self, ResourceError> {
        tables.validate()?;

        let area_texture = device.create_texture(&TextureDescriptor {
            label: Some(Cow::Borrowed("smaa area table")),
            size: AREA_TABLE_EXTENT.to_3d(),
            mip_level_count: 1,
            sample_count: SampleCount::X1,
            format: TextureFormat::Rg8Unorm,
            usage: TextureUsage::TEXTURE_BINDING | TextureUsage::COPY_DST,
        })?;
        device.write_texture(
            area_texture,
            &tables.area,
            None,
            Default::default(),
            AREA_TABLE_EXTENT.to_3d(),
        )?;

        let search_texture = device.create_texture(&TextureDescriptor {
            label: Some(Cow::Borrowed("smaa search table")),
            size: SEARCH_TABLE_EXTENT.to_3d(),
            mip_level_count: 1,
            sample_count: SampleCount::X1,
            format: TextureFormat::R8Unorm,
            usage: TextureUsage::TEXTURE_BINDING | TextureUsage::COPY_DST,
        })?;
        device.write_texture(
            search_texture,
            &tables.search,
            None,
            Default::default(),
            SEARCH_TABLE_EXTENT.to_3d(),
        )?;

        Ok(Self {
            area_texture,
            search_texture,
            linear_sampler: None,
            point_sampler: None,
            shader_set: None,
            bind_group_layout: None,
            pipeline_layout: None,
            edge_pipeline: None,
            weight_pipeline: None,
            blend_pipeline: None,
            edges_target: None,
            blend_target: None,
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
        if reload.affects_sized_targets() {
            self.destroy_sized_targets(device);

            self.edges_target = Some(device.create_render_target(&RenderTargetDescriptor {
                label: Some(Cow::Borrowed("smaa edges")),
                extent: output.extent,
                format: TextureFormat::Rg8Unorm,
                sample_count: SampleCount::X1,
                clear_value: ClearValue::Color(LinearRgba::TRANSPARENT),
                initial_state: ResourceState::ShaderResource,
            })?);

            self.blend_target = Some(device.create_render_target(&RenderTargetDescriptor {
                label: Some(Cow::Borrowed("smaa blend weights")),
                extent: output.extent,
                format: TextureFormat::Rgba8Unorm,
                sample_count: SampleCount::X1,
                clear_value: ClearValue::Color(LinearRgba::TRANSPARENT),
                initial_state: ResourceState::ShaderResource,
            })?);
        }

        if reload.affects_shaders() {
            self.linear_sampler = Some(device.create_sampler(&SamplerDescriptor::clamped(
                "smaa linear",
                FilterMode::Linear,
            ))?);
            self.point_sampler = Some(device.create_sampler(&SamplerDescriptor::clamped(
                "smaa point",
                FilterMode::Nearest,
            ))?);

            let shader_set = SmaaShaderSet {
                edges_vs: create_shader(device, "smaa edges vs", shaders::SMAA_EDGES_WGSL, ShaderStage::Vertex)?,
                edges_fs: create_shader(device, "smaa edges fs", shaders::SMAA_EDGES_WGSL, ShaderStage::Fragment)?,
                weights_vs: create_shader(device, "smaa weights vs", shaders::SMAA_WEIGHTS_WGSL, ShaderStage::Vertex)?,
                weights_fs: create_shader(device, "smaa weights fs", shaders::SMAA_WEIGHTS_WGSL, ShaderStage::Fragment)?,
                blend_vs: create_shader(device, "smaa blend vs", shaders::SMAA_BLEND_WGSL, ShaderStage::Vertex)?,
                blend_fs: create_shader(device, "smaa blend fs", shaders::SMAA_BLEND_WGSL, ShaderStage::Fragment)?,
            };

            // One layout covering the union of the three sub-passes'
            // bindings; each shader declares the subset it reads.
            let bind_group_layout = device.create_bind_group_layout(&BindGroupLayoutDescriptor {
                label: Some("smaa bindings"),
                entries: &[
                    texture_entry(0),
                    texture_entry(1),
                    texture_entry(2),
                    texture_entry(3),
                    texture_entry(4),
                    BindGroupLayoutEntry {
                        binding: 5,
                        visibility: ShaderStageFlags::FRAGMENT,
                        ty: BindingType::Sampler(SamplerBindingType::Filtering),
                    },
                    BindGroupLayoutEntry {
                        binding: 6,
                        visibility: ShaderStageFlags::FRAGMENT,
                        ty: BindingType::Sampler(SamplerBindingType::NonFiltering),
                    },
                ],
            })?;

            let pipeline_layout = device.create_pipeline_layout(&PipelineLayoutDescriptor {
                label: Some(Cow::Borrowed("smaa layout")),
                bind_group_layouts: Cow::Owned(vec![bind_group_layout]),
            })?;

            self.edge_pipeline = Some(create_fullscreen_pipeline(
                device,
                "smaa edge detect",
                pipeline_layout,
                shader_set.edges_vs,
                shader_set.edges_fs,
                TextureFormat::Rg8Unorm,
            )?);
            self.weight_pipeline = Some(create_fullscreen_pipeline(
                device,
                "smaa blending weight",
                pipeline_layout,
                shader_set.weights_vs,
                shader_set.weights_fs,
                TextureFormat::Rgba8Unorm,
            )?);
            self.blend_pipeline = Some(create_fullscreen_pipeline(
                device,
                "smaa neighborhood blend",
                pipeline_layout,
                shader_set.blend_vs,
                shader_set.blend_fs,
                output.format,
            )?);

            self.shader_set = Some(shader_set);
            self.bind_group_layout = Some(bind_group_layout);
            self.pipeline_layout = Some(pipeline_layout);
        }

        // The bind group references targets from both reload partitions, so
        // it is rebuilt whenever either changed.
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
        let edges = self.edges_target.as_ref().ok_or(ResourceError::NotFound)?;
        let blend = self.blend_target.as_ref().ok_or(ResourceError::NotFound)?;
        let linear = self.linear_sampler.ok_or(ResourceError::NotFound)?;
        let point = self.point_sampler.ok_or(ResourceError::NotFound)?;

        self.bind_group = Some(device.create_bind_group(&BindGroupDescriptor {
            label: Some("smaa bindings"),
            layout,
            entries: &[
                BindGroupEntry {
                    binding: 0,
                    resource: BindingResource::Texture(input),
                },
                BindGroupEntry {
                    binding: 1,
                    resource: BindingResource::Texture(self.area_texture),
                },
                BindGroupEntry {
                    binding: 2,
                    resource: BindingResource::Texture(self.search_texture),
                },
                BindGroupEntry {
                    binding: 3,
                    resource: BindingResource::Texture(edges.texture),
                },
                BindGroupEntry {
                    binding: 4,
                    resource: BindingResource::Texture(blend.texture),
                },
                BindGroupEntry {
                    binding: 5,
                    resource: BindingResource::Sampler(linear),
                },
                BindGroupEntry {
                    binding: 6,
                    resource: BindingResource::Sampler(point),
                },
            ],
        })?);
        Ok(())
    }

    /// Releases the resources selected by `reload`.
    pub fn unload(&mut self, device: &dyn GraphicsDevice, reload: ReloadFlags) {
        if let Some(bind_group) = self.bind_group.take() {
            destroy_or_warn(device.destroy_bind_group(bind_group), "smaa bind group");
        }

        if reload.affects_shaders() {
            for pipeline in [
                self.edge_pipeline.take(),
                self.weight_pipeline.take(),
                self.blend_pipeline.take(),
            ]
            .into_iter()
            .flatten()
            {
                destroy_or_warn(device.destroy_render_pipeline(pipeline), "smaa pipeline");
            }
            if let Some(layout) = self.pipeline_layout.take() {
                destroy_or_warn(device.destroy_pipeline_layout(layout), "smaa pipeline layout");
            }
            if let Some(layout) = self.bind_group_layout.take() {
                destroy_or_warn(
                    device.destroy_bind_group_layout(layout),
                    "smaa bind group layout",
                );
            }
            if let Some(set) = self.shader_set.take() {
                for shader in set.all() {
                    destroy_or_warn(device.destroy_shader_module(shader), "smaa shader");
                }
            }
            for sampler in [self.linear_sampler.take(), self.point_sampler.take()]
                .into_iter()
                .flatten()
            {
                destroy_or_warn(device.destroy_sampler(sampler), "smaa sampler");
            }
        }

        if reload.affects_sized_targets() {
            self.destroy_sized_targets(device);
        }
    }

    fn destroy_sized_targets(&mut self, device: &dyn GraphicsDevice) {
        for target in [self.blend_target.take(), self.edges_target.take()]
            .into_iter()
            .flatten()
        {
            destroy_or_warn(device.destroy_render_target(target.id), "smaa target");
        }
    }

    /// Destroys the construction-time lookup textures.
    pub fn exit(&mut self, device: &dyn GraphicsDevice) {
        destroy_or_warn(device.destroy_texture(self.area_texture), "smaa area table");
        destroy_or_warn(
            device.destroy_texture(self.search_texture),
            "smaa search table",
        );
    }

    /// Records the three sub-passes. The stage output's state machine is the
    /// caller's; the two internal buffers are transitioned here.
    pub fn draw<'pass>(
        &'pass self,
        encoder: &mut dyn CommandEncoder,
        quad: &'pass ScreenQuad,
    ) -> Result<(), RenderError> {
        let edges = self.edges_target.as_ref();
        let blend = self.blend_target.as_ref();
        let (Some(edges), Some(blend), Some(output)) = (edges, blend, self.output.as_ref()) else {
            return Err(RenderError::RenderingFailed(
                "SMAA stage drawn before load".to_string(),
            ));
        };
        let (Some(edge_pipeline), Some(weight_pipeline), Some(blend_pipeline), Some(bind_group)) = (
            self.edge_pipeline.as_ref(),
            self.weight_pipeline.as_ref(),
            self.blend_pipeline.as_ref(),
            self.bind_group.as_ref(),
        ) else {
            return Err(RenderError::RenderingFailed(
                "SMAA stage drawn before shader load".to_string(),
            ));
        };

        // Pass 1: edge detection.
        encoder.resource_barrier(&[RenderTargetBarrier::new(
            edges.id,
            ResourceState::ShaderResource,
            ResourceState::RenderTarget,
        )]);
        {
            let mut pass = encoder.begin_render_pass(&RenderPassDescriptor {
                label: Some("smaa edge detect"),
                color_attachments: &[RenderPassColorAttachment {
                    target: &edges.id,
                    ops: Operations::clear(LinearRgba::TRANSPARENT),
                }],
                depth_attachment: None,
            });
            pass.set_viewport(Viewport::covering(edges.extent.width, edges.extent.height));
            pass.set_scissor(ScissorRect::covering(edges.extent.width, edges.extent.height));
            pass.set_pipeline(edge_pipeline);
            pass.set_bind_group(0, bind_group);
            quad.draw(pass.as_mut());
        }

        // Pass 2: blending-weight calculation.
        encoder.resource_barrier(&[
            RenderTargetBarrier::new(
                edges.id,
                ResourceState::RenderTarget,
                ResourceState::ShaderResource,
            ),
            RenderTargetBarrier::new(
                blend.id,
                ResourceState::ShaderResource,
                ResourceState::RenderTarget,
            ),
        ]);
        {
            let mut pass = encoder.begin_render_pass(&RenderPassDescriptor {
                label: Some("smaa blending weight"),
                color_attachments: &[RenderPassColorAttachment {
                    target: &blend.id,
                    ops: Operations::clear(LinearRgba::TRANSPARENT),
                }],
                depth_attachment: None,
            });
            pass.set_viewport(Viewport::covering(blend.extent.width, blend.extent.height));
            pass.set_scissor(ScissorRect::covering(blend.extent.width, blend.extent.height));
            pass.set_pipeline(weight_pipeline);
            pass.set_bind_group(0, bind_group);
            quad.draw(pass.as_mut());
        }

        // Pass 3: neighborhood blend into the stage output.
        encoder.resource_barrier(&[RenderTargetBarrier::new(
            blend.id,
            ResourceState::RenderTarget,
            ResourceState::ShaderResource,
        )]);
        {
            let mut pass = encoder.begin_render_pass(&RenderPassDescriptor {
                label: Some("smaa neighborhood blend"),
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
            pass.set_pipeline(blend_pipeline);
            pass.set_bind_group(0, bind_group);
            quad.draw(pass.as_mut());
        }

        Ok(())
    }

    /// The three sub-pass pipelines, if the shader partition is loaded.
    pub fn pipelines(&self) -> Option<[RenderPipelineId; 3]> {
        Some([
            self.edge_pipeline?,
            self.weight_pipeline?,
            self.blend_pipeline?,
        ])
    }

    /// The stage-internal edge and weight targets, if loaded.
    pub fn internal_targets(&self) -> Option<(&RenderTarget, &RenderTarget)> {
        Some((self.edges_target.as_ref()?, self.blend_target.as_ref()?))
    }
}

fn create_shader(
    device: &dyn GraphicsDevice,
    label: &str,
    source: &'static str,
    stage: ShaderStage,
) -> Result<ShaderModuleId, ResourceError> {
    let entry_point = match stage {
        ShaderStage::Vertex => "vs_main",
        ShaderStage::Fragment => "fs_main",
    };
    device.create_shader_module(&ShaderModuleDescriptor {
        label: Some(label),
        source: ShaderSourceData::Wgsl(Cow::Borrowed(source)),
        stage,
        entry_point,
    })
}

fn create_fullscreen_pipeline(
    device: &dyn GraphicsDevice,
    label: &str,
    layout: PipelineLayoutId,
    vertex_shader: ShaderModuleId,
    fragment_shader: ShaderModuleId,
    color_format: TextureFormat,
) -> Result<RenderPipelineId, ResourceError> {
    device.create_render_pipeline(&RenderPipelineDescriptor {
        label: Some(Cow::Owned(label.to_string())),
        layout,
        vertex_shader_module: vertex_shader,
        fragment_shader_module: Some(fragment_shader),
        vertex_buffers_layout: Cow::Owned(vec![ScreenQuad::vertex_layout()]),
        primitive_state: PrimitiveStateDescriptor {
            topology: PrimitiveTopology::TriangleStrip,
            cull_mode: None,
        },
        depth_stencil_state: None,
        color_target_states: Cow::Owned(vec![ColorTargetStateDescriptor::opaque(color_format)]),
        multisample_state: MultisampleStateDescriptor::default(),
    })
}

fn texture_entry(binding: u32) -> BindGroupLayoutEntry {
    BindGroupLayoutEntry {
        binding,
        visibility: ShaderStageFlags::FRAGMENT,
        ty: BindingType::Texture {
            sample_type: TextureSampleType::Float { filterable: true },
        },
    }
}

fn destroy_or_warn(result: Result<(), ResourceError>, what: &str) {
    if let Err(e) = result {
        log::warn!("failed to destroy {what}: {e}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zeroed_tables_validate() {
        assert!(SmaaLookupTables::zeroed().validate().is_ok());
    }

    #[test]
    fn truncated_tables_are_rejected() {
        let mut tables = SmaaLookupTables::zeroed();
        tables.area.pop();
        assert!(matches!(
            tables.validate(),
            Err(ResourceError::InvalidDescriptor(_))
        ));

        let mut tables = SmaaLookupTables::zeroed();
        tables.search.push(0);
        assert!(tables.validate().is_err());
    }
}
