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

//! The application shell: owns the device, the frame targets, the scene
//! manager, and the post-processing chain, and drives the per-frame
//! contract (update, pre-draw, record, submit) with a cycling
//! frame-in-flight index.

use std::borrow::Cow;

use vantage_core::event::EventBus;
use vantage_core::math::{Extent2D, LinearRgba};
use vantage_core::renderer::api::{
    ClearValue, RenderTarget, RenderTargetBarrier, RenderTargetDescriptor, ResourceState,
    SampleCount, TextureFormat,
};
use vantage_core::renderer::error::RenderError;
use vantage_core::renderer::reload::ReloadFlags;
use vantage_core::renderer::traits::{CommandEncoder as _, GraphicsDevice};
use vantage_fx::smaa::SmaaLookupTables;
use vantage_fx::{PostProcessChain, PostProcessOptions};
use vantage_infra::HeadlessGraphicsDevice;
use vantage_scenes::scenes::{QuadsScene, ShadowScene, StarfieldScene};
use vantage_scenes::{Scene, SceneManager, SceneTargets};

use crate::assets;
use crate::config::{AppConfig, SceneSelection};

/// Events the shell reacts to between frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEvent {
    /// A reload of the given kinds was requested.
    ReloadRequested(ReloadFlags),
    /// The output surface changed size.
    Resized {
        /// The new output width.
        width: u32,
        /// The new output height.
        height: u32,
    },
}

struct FrameTargets {
    backbuffer: RenderTarget,
    depth: RenderTarget,
    /// The offscreen target scenes render into when post-processing is
    /// active; the chain reads it and writes the backbuffer.
    scene_color: Option<RenderTarget>,
}

/// The sandbox application.
pub struct App {
    device: HeadlessGraphicsDevice,
    config: AppConfig,
    events: EventBus<AppEvent>,
    manager: SceneManager,
    chain: PostProcessChain,
    targets: Option<FrameTargets>,
    extent: Extent2D,
    frame_index: u32,
}

impl App {
    /// Builds the device, the configured scene, and the post-process chain.
    pub fn new(config: AppConfig) -> Result<Self, RenderError> {
        let device = HeadlessGraphicsDevice::new();

        let scene: Box<dyn Scene> = match config.scene {
            SceneSelection::Starfield => Box::new(StarfieldScene::new(config.seed)),
            SceneSelection::Shadow => Box::new(ShadowScene::new()),
            SceneSelection::Quads => Box::new(QuadsScene::new([
                assets::checkerboard(128, 8),
                assets::gradient(128),
            ])),
        };
        let manager = SceneManager::new(scene, config.frames_in_flight);

        // The repository ships no binary assets, so the lookup inputs are
        // generated: a neutral identity LUT and zeroed SMAA tables.
        let chain = PostProcessChain::new(
            &device,
            PostProcessOptions {
                enable_smaa: config.post.smaa,
                enable_color_grading: config.post.color_grading,
                smaa_tables: config.post.smaa.then(SmaaLookupTables::zeroed),
                color_grading_lut: config.post.color_grading.then(|| assets::identity_lut(16)),
            },
        )?;

        let extent = Extent2D::new(config.width, config.height);
        Ok(Self {
            device,
            config,
            events: EventBus::new(),
            manager,
            chain,
            targets: None,
            extent,
            frame_index: 0,
        })
    }

    /// Initializes the scene and performs the initial full load.
    pub fn init(&mut self) -> Result<(), RenderError> {
        self.create_targets()?;
        self.manager.init(&self.device)?;
        self.load(ReloadFlags::ALL)?;
        Ok(())
    }

    fn create_targets(&mut self) -> Result<(), RenderError> {
        let backbuffer = self.device.create_render_target(&RenderTargetDescriptor {
            label: Some(Cow::Borrowed("backbuffer")),
            extent: self.extent,
            format: TextureFormat::Rgba8Unorm,
            sample_count: SampleCount::X1,
            clear_value: ClearValue::Color(LinearRgba::BLACK),
            initial_state: ResourceState::Present,
        })?;
        let depth = self.device.create_render_target(&RenderTargetDescriptor {
            label: Some(Cow::Borrowed("depth buffer")),
            extent: self.extent,
            format: TextureFormat::Depth32Float,
            sample_count: SampleCount::X1,
            clear_value: ClearValue::Depth(0.0),
            initial_state: ResourceState::DepthWrite,
        })?;
        let scene_color = if self.chain.stage_count() > 0 {
            Some(self.device.create_render_target(&RenderTargetDescriptor {
                label: Some(Cow::Borrowed("scene color")),
                extent: self.extent,
                format: TextureFormat::Rgba8Unorm,
                sample_count: SampleCount::X1,
                clear_value: ClearValue::Color(LinearRgba::BLACK),
                initial_state: ResourceState::ShaderResource,
            })?)
        } else {
            None
        };

        self.targets = Some(FrameTargets {
            backbuffer,
            depth,
            scene_color,
        });
        Ok(())
    }

    fn destroy_targets(&mut self) {
        let Some(targets) = self.targets.take() else {
            return;
        };
        let ids = [
            Some(targets.backbuffer.id),
            Some(targets.depth.id),
            targets.scene_color.map(|t| t.id),
        ];
        for id in ids.into_iter().flatten() {
            if let Err(e) = self.device.destroy_render_target(id) {
                log::warn!("failed to destroy frame target: {e}");
            }
        }
    }

    fn load(&mut self, reload: ReloadFlags) -> Result<(), RenderError> {
        let targets = self.targets.as_ref().ok_or_else(|| {
            RenderError::InitializationFailed("frame targets missing".to_string())
        })?;
        let scene_targets = SceneTargets {
            color: targets.scene_color.as_ref().unwrap_or(&targets.backbuffer),
            depth: Some(&targets.depth),
        };
        self.manager.load(&self.device, reload, &scene_targets)?;

        if let Some(scene_color) = targets.scene_color.as_ref() {
            self.chain
                .load(&self.device, reload, &targets.backbuffer, scene_color.texture)?;
        }
        Ok(())
    }

    fn unload(&mut self, reload: ReloadFlags) {
        self.manager.unload(&self.device, reload);
        if self.chain.stage_count() > 0 {
            self.chain.unload(&self.device, reload);
        }
    }

    /// Requests a resize; takes effect at the top of the next frame.
    pub fn request_resize(&self, width: u32, height: u32) {
        self.events.publish(AppEvent::Resized { width, height });
    }

    fn drain_events(&mut self) -> Result<(), RenderError> {
        let pending: Vec<AppEvent> = self.events.receiver().try_iter().collect();
        for event in pending {
            match event {
                AppEvent::Resized { width, height } => {
                    log::info!(
                        "resizing {}x{} -> {width}x{height}",
                        self.extent.width,
                        self.extent.height
                    );
                    self.unload(ReloadFlags::RESIZE);
                    self.destroy_targets();
                    self.extent = Extent2D::new(width, height);
                    self.create_targets()?;
                    self.load(ReloadFlags::RESIZE)?;
                }
                AppEvent::ReloadRequested(reload) => {
                    log::info!("reload requested: {reload:?}");
                    self.unload(reload);
                    self.load(reload)?;
                }
            }
        }
        Ok(())
    }

    fn record_frame(&self) -> Result<(), RenderError> {
        let targets = self.targets.as_ref().ok_or_else(|| {
            RenderError::RenderingFailed("frame targets missing".to_string())
        })?;
        let scene_targets = SceneTargets {
            color: targets.scene_color.as_ref().unwrap_or(&targets.backbuffer),
            depth: Some(&targets.depth),
        };

        let mut encoder = self.device.create_command_encoder(Some("frame"));
        encoder.resource_barrier(&[RenderTargetBarrier::new(
            targets.backbuffer.id,
            ResourceState::Present,
            ResourceState::RenderTarget,
        )]);

        if let Some(scene_color) = targets.scene_color.as_ref() {
            // Scene renders offscreen, then the chain reads it and writes
            // the backbuffer.
            encoder.resource_barrier(&[RenderTargetBarrier::new(
                scene_color.id,
                ResourceState::ShaderResource,
                ResourceState::RenderTarget,
            )]);
            self.manager
                .draw(encoder.as_mut(), &scene_targets, self.frame_index)?;
            encoder.resource_barrier(&[RenderTargetBarrier::new(
                scene_color.id,
                ResourceState::RenderTarget,
                ResourceState::ShaderResource,
            )]);

            self.chain.draw(encoder.as_mut(), &targets.backbuffer)?;
        } else {
            self.manager
                .draw(encoder.as_mut(), &scene_targets, self.frame_index)?;
        }

        encoder.resource_barrier(&[RenderTargetBarrier::new(
            targets.backbuffer.id,
            ResourceState::RenderTarget,
            ResourceState::Present,
        )]);

        let buffer = encoder.finish();
        self.device.submit_command_buffer(buffer);
        Ok(())
    }

    /// Runs the configured number of frames.
    pub fn run(&mut self) -> Result<(), RenderError> {
        for frame in 0..self.config.frames {
            if let Some(resize) = self.config.resize {
                if resize.at_frame == frame {
                    self.request_resize(resize.width, resize.height);
                }
            }
            if self.config.reload_shaders_at == Some(frame) {
                self.events
                    .publish(AppEvent::ReloadRequested(ReloadFlags::SHADER));
            }
            self.drain_events()?;

            let targets = self.targets.as_ref().ok_or_else(|| {
                RenderError::RenderingFailed("frame targets missing".to_string())
            })?;
            let scene_targets = SceneTargets {
                color: targets.scene_color.as_ref().unwrap_or(&targets.backbuffer),
                depth: Some(&targets.depth),
            };
            self.manager.update(
                &self.device,
                &scene_targets,
                1.0 / 60.0,
                self.extent.width,
                self.extent.height,
            )?;
            self.manager.pre_draw(&self.device, self.frame_index)?;

            self.record_frame()?;

            let violations = self.device.take_state_violations();
            if !violations.is_empty() {
                return Err(RenderError::RenderingFailed(format!(
                    "frame {frame}: {} resource state violation(s), first: {}",
                    violations.len(),
                    violations[0]
                )));
            }

            self.frame_index = (self.frame_index + 1) % self.config.frames_in_flight;
        }
        log::info!(
            "simulated {} frame(s) in scene '{}'",
            self.config.frames,
            self.manager.current_name()
        );
        Ok(())
    }

    /// Tears everything down and reports leaks.
    pub fn shutdown(&mut self) {
        self.unload(ReloadFlags::ALL);
        self.manager.exit(&self.device);
        self.chain.exit(&self.device);
        self.destroy_targets();

        let live = self.device.live_resource_count();
        if live == 0 {
            log::info!("shutdown clean: no live GPU resources");
        } else {
            log::warn!("shutdown leaked {live} GPU resource(s)");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_config(config: AppConfig) {
        let mut app = App::new(config).expect("app");
        app.init().expect("init");
        app.run().expect("run");
        app.shutdown();
    }

    #[test]
    fn starfield_with_full_chain_runs_clean() {
        run_config(AppConfig {
            frames: 3,
            ..Default::default()
        });
    }

    #[test]
    fn shadow_scene_without_post_runs_clean() {
        run_config(AppConfig {
            scene: SceneSelection::Shadow,
            frames: 3,
            post: crate::config::PostConfig {
                smaa: false,
                color_grading: false,
            },
            ..Default::default()
        });
    }

    #[test]
    fn mid_run_resize_reloads_sized_targets() {
        run_config(AppConfig {
            frames: 6,
            resize: Some(crate::config::ResizeConfig {
                at_frame: 3,
                width: 640,
                height: 360,
            }),
            ..Default::default()
        });
    }

    #[test]
    fn shader_hot_reload_mid_run() {
        run_config(AppConfig {
            frames: 6,
            reload_shaders_at: Some(2),
            ..Default::default()
        });
    }

    #[test]
    fn quads_scene_runs_clean() {
        run_config(AppConfig {
            scene: SceneSelection::Quads,
            frames: 2,
            ..Default::default()
        });
    }
}
