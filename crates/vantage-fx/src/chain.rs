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

//! The post-processing chain: an ordered sequence of full-screen stages
//! with the intermediate targets and barriers that route image data
//! between them.
//!
//! Addressing rule: stage 0 reads the chain's external input texture and
//! every later stage reads the previous stage's intermediate target; every
//! stage except the last writes its own intermediate target, the last
//! writes the caller-supplied output. With `n` active stages there are
//! exactly `n - 1` intermediates.

use std::borrow::Cow;

use vantage_core::math::LinearRgba;
use vantage_core::renderer::api::{
    ClearValue, CpuTexture, RenderPipelineId, RenderTarget, RenderTargetBarrier,
    RenderTargetDescriptor, RenderTargetId, ResourceState, SampleCount, TextureFormat, TextureId,
};
use vantage_core::renderer::error::{RenderError, ResourceError};
use vantage_core::renderer::reload::ReloadFlags;
use vantage_core::renderer::traits::{CommandEncoder, GraphicsDevice};

use crate::color_grading::ColorGradingStage;
use crate::quad::ScreenQuad;
use crate::smaa::{SmaaLookupTables, SmaaStage};

/// The format of chain-owned intermediate targets.
pub const INTERMEDIATE_FORMAT: TextureFormat = TextureFormat::Rgba8Unorm;

/// Identifies a stage type in the active stage list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageKind {
    /// The SMAA anti-aliasing stage.
    Smaa,
    /// The color-grading stage.
    ColorGrading,
}

/// An active stage. The set is closed and small, so a sum type rather than
/// an open trait.
#[derive(Debug)]
enum Stage {
    Smaa(SmaaStage),
    ColorGrading(ColorGradingStage),
}

impl Stage {
    fn kind(&self) -> StageKind {
        match self {
            Stage::Smaa(_) => StageKind::Smaa,
            Stage::ColorGrading(_) => StageKind::ColorGrading,
        }
    }

    fn load(
        &mut self,
        device: &dyn GraphicsDevice,
        reload: ReloadFlags,
        input: TextureId,
        output: &RenderTarget,
    ) -> Result<(), ResourceError> {
        match self {
            Stage::Smaa(stage) => stage.load(device, reload, input, output),
            Stage::ColorGrading(stage) => stage.load(device, reload, input, output),
        }
    }

    fn unload(&mut self, device: &dyn GraphicsDevice, reload: ReloadFlags) {
        match self {
            Stage::Smaa(stage) => stage.unload(device, reload),
            Stage::ColorGrading(stage) => stage.unload(device, reload),
        }
    }

    fn draw<'pass>(
        &'pass self,
        encoder: &mut dyn CommandEncoder,
        quad: &'pass ScreenQuad,
    ) -> Result<(), RenderError> {
        match self {
            Stage::Smaa(stage) => stage.draw(encoder, quad),
            Stage::ColorGrading(stage) => stage.draw(encoder, quad),
        }
    }

    fn exit(&mut self, device: &dyn GraphicsDevice) {
        match self {
            Stage::Smaa(stage) => stage.exit(device),
            Stage::ColorGrading(stage) => stage.exit(device),
        }
    }

    fn pipelines(&self) -> Vec<RenderPipelineId> {
        match self {
            Stage::Smaa(stage) => stage.pipelines().map(|p| p.to_vec()).unwrap_or_default(),
            Stage::ColorGrading(stage) => stage.pipeline().into_iter().collect(),
        }
    }
}

/// Configuration for [`PostProcessChain::new`]. Fixed for the lifetime of
/// the chain; build a new chain to change it.
#[derive(Debug, Clone, Default)]
pub struct PostProcessOptions {
    /// Enables the SMAA stage.
    pub enable_smaa: bool,
    /// Enables the color-grading stage.
    pub enable_color_grading: bool,
    /// The SMAA lookup tables; required when `enable_smaa` is set.
    pub smaa_tables: Option<SmaaLookupTables>,
    /// The color lookup table; required when `enable_color_grading` is set.
    pub color_grading_lut: Option<CpuTexture>,
}

/// Composes the enabled stages and routes image data between them.
#[derive(Debug)]
pub struct PostProcessChain {
    screen_quad: ScreenQuad,
    stages: Vec<Stage>,
    intermediates: Vec<RenderTarget>,
    io: Vec<(TextureId, RenderTargetId)>,
    output_id: Option<RenderTargetId>,
}

impl PostProcessChain {
    /// Builds the active stage list in fixed priority order (SMAA, then
    /// color grading) and creates construction-time resources.
    ///
    /// Fails if a stage is enabled without its auxiliary input.
    pub fn new(
        device: &dyn GraphicsDevice,
        options: PostProcessOptions,
    ) -> Result<Self, ResourceError> {
        let screen_quad = ScreenQuad::new(device)?;
        let mut stages = Vec::new();

        if options.enable_smaa {
            let tables = options.smaa_tables.as_ref().ok_or_else(|| {
                ResourceError::InvalidDescriptor(
                    "SMAA enabled without lookup tables".to_string(),
                )
            })?;
            stages.push(Stage::Smaa(SmaaStage::new(device, tables)?));
        }
        if options.enable_color_grading {
            let lut = options.color_grading_lut.as_ref().ok_or_else(|| {
                ResourceError::InvalidDescriptor(
                    "color grading enabled without a LUT".to_string(),
                )
            })?;
            stages.push(Stage::ColorGrading(ColorGradingStage::new(device, lut)?));
        }

        log::info!(
            "post-process chain configured with {} stage(s): {:?}",
            stages.len(),
            stages.iter().map(Stage::kind).collect::<Vec<_>>()
        );

        Ok(Self {
            screen_quad,
            stages,
            intermediates: Vec::new(),
            io: Vec::new(),
            output_id: None,
        })
    }

    /// Allocates intermediates (when the reload affects sized targets),
    /// resolves each stage's input/output per the addressing rule, and
    /// delegates stage-specific load work.
    ///
    /// Sub-steps are gated by `reload` so a resize does not recompile
    /// shaders and a shader reload does not reallocate targets.
    pub fn load(
        &mut self,
        device: &dyn GraphicsDevice,
        reload: ReloadFlags,
        output: &RenderTarget,
        input: TextureId,
    ) -> Result<(), ResourceError> {
        if self.stages.len() > 1 && reload.affects_sized_targets() {
            self.destroy_intermediates(device);
            for index in 0..self.stages.len() - 1 {
                self.intermediates
                    .push(device.create_render_target(&RenderTargetDescriptor {
                        label: Some(Cow::Owned(format!("post-process intermediate {index}"))),
                        extent: output.extent,
                        format: INTERMEDIATE_FORMAT,
                        sample_count: SampleCount::X1,
                        clear_value: ClearValue::Color(LinearRgba::TRANSPARENT),
                        initial_state: ResourceState::ShaderResource,
                    })?);
            }
        }

        if self.intermediates.len() + 1 != self.stages.len().max(1) {
            return Err(ResourceError::InvalidDescriptor(
                "chain loaded without its intermediate targets".to_string(),
            ));
        }

        self.io.clear();
        for index in 0..self.stages.len() {
            let stage_input = if index == 0 {
                input
            } else {
                self.intermediates[index - 1].texture
            };
            let stage_output = if index + 1 == self.stages.len() {
                *output
            } else {
                self.intermediates[index]
            };
            self.stages[index].load(device, reload, stage_input, &stage_output)?;
            self.io.push((stage_input, stage_output.id));
        }
        self.output_id = Some(output.id);
        Ok(())
    }

    /// Inverse of [`PostProcessChain::load`] under the same gating.
    pub fn unload(&mut self, device: &dyn GraphicsDevice, reload: ReloadFlags) {
        for stage in &mut self.stages {
            stage.unload(device, reload);
        }
        if reload.affects_sized_targets() {
            self.destroy_intermediates(device);
        }
        self.io.clear();
        self.output_id = None;
    }

    fn destroy_intermediates(&mut self, device: &dyn GraphicsDevice) {
        for target in self.intermediates.drain(..) {
            if let Err(e) = device.destroy_render_target(target.id) {
                log::warn!("failed to destroy post-process intermediate: {e}");
            }
        }
    }

    /// Records every active stage in order.
    ///
    /// Each intermediate is transitioned `ShaderResource -> RenderTarget`
    /// around the stage that writes it and back afterwards, so consecutive
    /// stages can safely sample each other's output. The final stage writes
    /// `output` with no extra transition; that target's state machine is the
    /// caller's.
    pub fn draw(&self, encoder: &mut dyn CommandEncoder, output: &RenderTarget) -> Result<(), RenderError> {
        if self.stages.is_empty() {
            return Ok(());
        }
        if self.output_id != Some(output.id) {
            log::warn!(
                "post-process chain drawn against {:?} but loaded for {:?}",
                output.id,
                self.output_id
            );
        }

        for (index, stage) in self.stages.iter().enumerate() {
            let is_last = index + 1 == self.stages.len();
            if is_last {
                stage.draw(encoder, &self.screen_quad)?;
            } else {
                let target = self.intermediates[index].id;
                encoder.resource_barrier(&[RenderTargetBarrier::new(
                    target,
                    ResourceState::ShaderResource,
                    ResourceState::RenderTarget,
                )]);
                stage.draw(encoder, &self.screen_quad)?;
                encoder.resource_barrier(&[RenderTargetBarrier::new(
                    target,
                    ResourceState::RenderTarget,
                    ResourceState::ShaderResource,
                )]);
            }
        }
        Ok(())
    }

    /// Destroys construction-time resources. The chain must be unloaded
    /// first.
    pub fn exit(&mut self, device: &dyn GraphicsDevice) {
        for stage in &mut self.stages {
            stage.exit(device);
        }
        self.screen_quad.destroy(device);
        self.stages.clear();
    }

    /// The number of active stages.
    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }

    /// The active stage kinds, in execution order.
    pub fn stage_kinds(&self) -> Vec<StageKind> {
        self.stages.iter().map(Stage::kind).collect()
    }

    /// The number of chain-owned intermediate targets currently allocated.
    pub fn intermediate_count(&self) -> usize {
        self.intermediates.len()
    }

    /// The chain-owned intermediate targets, in stage order.
    pub fn intermediates(&self) -> &[RenderTarget] {
        &self.intermediates
    }

    /// The `(input texture, output target)` pair resolved for stage
    /// `index` at the last load.
    pub fn stage_io(&self, index: usize) -> Option<(TextureId, RenderTargetId)> {
        self.io.get(index).copied()
    }

    /// The pipeline handles owned by stage `index`, if loaded. Stable
    /// across resize-only reload cycles.
    pub fn stage_pipelines(&self, index: usize) -> Vec<RenderPipelineId> {
        self.stages
            .get(index)
            .map(Stage::pipelines)
            .unwrap_or_default()
    }
}
