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

//! The four-phase per-frame contract every demo scene implements.

use vantage_core::renderer::api::RenderTarget;
use vantage_core::renderer::error::RenderError;
use vantage_core::renderer::reload::ReloadFlags;
use vantage_core::renderer::traits::{CommandEncoder, GraphicsDevice};

/// The targets a scene renders into for one frame.
#[derive(Debug, Clone, Copy)]
pub struct SceneTargets<'a> {
    /// The color target the scene's main pass writes.
    pub color: &'a RenderTarget,
    /// The depth target, when the hosting shell allocated one.
    pub depth: Option<&'a RenderTarget>,
}

/// A demo scene driven by the hosting application shell.
///
/// Lifecycle: `init` once, then any number of `load`/`unload` cycles gated
/// by [`ReloadFlags`], then `exit` once. Per frame the shell calls
/// `update` (CPU state), `pre_draw` (write the current frame slot's
/// uniforms), and `draw` (record rendering commands).
///
/// `frame_index` cycles through the frames-in-flight slots; a scene keeps
/// one uniform-buffer copy per slot so the CPU never overwrites data the
/// GPU has not consumed yet.
pub trait Scene {
    /// A short human-readable name for logs.
    fn name(&self) -> &str;

    /// Creates lifetime-long GPU resources (vertex buffers, per-frame
    /// uniform buffers, textures).
    fn init(&mut self, device: &dyn GraphicsDevice, frame_count: u32) -> Result<(), RenderError>;

    /// Destroys everything `init` created.
    fn exit(&mut self, device: &dyn GraphicsDevice);

    /// Creates the resources selected by `reload` (shaders, pipelines,
    /// sized targets) against the given output targets.
    fn load(
        &mut self,
        device: &dyn GraphicsDevice,
        reload: ReloadFlags,
        targets: &SceneTargets<'_>,
    ) -> Result<(), RenderError>;

    /// Destroys the resources selected by `reload`.
    fn unload(&mut self, device: &dyn GraphicsDevice, reload: ReloadFlags);

    /// Advances CPU-side state (camera, lights, animation).
    fn update(&mut self, delta_time: f32, width: u32, height: u32);

    /// Writes the current frame slot's uniform data.
    fn pre_draw(&self, device: &dyn GraphicsDevice, frame_index: u32) -> Result<(), RenderError>;

    /// Records the scene's passes for this frame.
    fn draw(
        &self,
        encoder: &mut dyn CommandEncoder,
        targets: &SceneTargets<'_>,
        frame_index: u32,
    ) -> Result<(), RenderError>;
}
