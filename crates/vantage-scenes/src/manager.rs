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

//! Owns the current scene and performs deferred scene swaps.

use vantage_core::renderer::error::RenderError;
use vantage_core::renderer::reload::ReloadFlags;
use vantage_core::renderer::traits::{CommandEncoder, GraphicsDevice};

use crate::scene::{Scene, SceneTargets};

/// Holds the active scene and an optional pending replacement.
///
/// A requested swap takes effect at the top of the next `update`: the old
/// scene is unloaded with [`ReloadFlags::ALL`] and exited, the replacement
/// initialized and loaded with `ALL`. Swapping mid-frame would pull GPU
/// objects out from under recorded commands.
pub struct SceneManager {
    current: Box<dyn Scene>,
    next: Option<Box<dyn Scene>>,
    frame_count: u32,
}

impl SceneManager {
    /// Creates a manager around an initial scene. The scene is not yet
    /// initialized; call [`SceneManager::init`].
    pub fn new(initial: Box<dyn Scene>, frame_count: u32) -> Self {
        Self {
            current: initial,
            next: None,
            frame_count,
        }
    }

    /// Initializes the current scene.
    pub fn init(&mut self, device: &dyn GraphicsDevice) -> Result<(), RenderError> {
        log::info!("initializing scene '{}'", self.current.name());
        self.current.init(device, self.frame_count)
    }

    /// Exits the current scene.
    pub fn exit(&mut self, device: &dyn GraphicsDevice) {
        log::info!("exiting scene '{}'", self.current.name());
        self.current.exit(device);
    }

    /// Queues `scene` to replace the current one at the next `update`.
    pub fn set_next(&mut self, scene: Box<dyn Scene>) {
        self.next = Some(scene);
    }

    /// The active scene's name.
    pub fn current_name(&self) -> &str {
        self.current.name()
    }

    /// Performs a pending swap, then updates the active scene.
    pub fn update(
        &mut self,
        device: &dyn GraphicsDevice,
        targets: &SceneTargets<'_>,
        delta_time: f32,
        width: u32,
        height: u32,
    ) -> Result<(), RenderError> {
        if let Some(next) = self.next.take() {
            log::info!(
                "switching scene '{}' -> '{}'",
                self.current.name(),
                next.name()
            );
            self.current.unload(device, ReloadFlags::ALL);
            self.current.exit(device);

            self.current = next;

            self.current.init(device, self.frame_count)?;
            self.current.load(device, ReloadFlags::ALL, targets)?;
        }

        self.current.update(delta_time, width, height);
        Ok(())
    }

    /// Forwards `load` to the active scene.
    pub fn load(
        &mut self,
        device: &dyn GraphicsDevice,
        reload: ReloadFlags,
        targets: &SceneTargets<'_>,
    ) -> Result<(), RenderError> {
        self.current.load(device, reload, targets)
    }

    /// Forwards `unload` to the active scene.
    pub fn unload(&mut self, device: &dyn GraphicsDevice, reload: ReloadFlags) {
        self.current.unload(device, reload);
    }

    /// Forwards `pre_draw` to the active scene.
    pub fn pre_draw(
        &self,
        device: &dyn GraphicsDevice,
        frame_index: u32,
    ) -> Result<(), RenderError> {
        self.current.pre_draw(device, frame_index)
    }

    /// Forwards `draw` to the active scene.
    pub fn draw(
        &self,
        encoder: &mut dyn CommandEncoder,
        targets: &SceneTargets<'_>,
        frame_index: u32,
    ) -> Result<(), RenderError> {
        self.current.draw(encoder, targets, frame_index)
    }
}
