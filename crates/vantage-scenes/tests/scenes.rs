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

//! Scene lifecycle and frame-contract tests against the headless backend.

use std::borrow::Cow;

use vantage_core::math::{Extent2D, Extent3D, LinearRgba};
use vantage_core::renderer::api::{
    ClearValue, CpuTexture, RenderTarget, RenderTargetDescriptor, ResourceState, SampleCount,
    TextureFormat,
};
use vantage_core::renderer::reload::ReloadFlags;
use vantage_core::renderer::traits::{CommandEncoder as _, GraphicsDevice};
use vantage_infra::{HeadlessGraphicsDevice, RecordedCommand};
use vantage_scenes::scenes::{QuadsScene, ShadowScene, StarfieldScene};
use vantage_scenes::{Scene, SceneManager, SceneTargets};

const FRAME_COUNT: u32 = 3;

fn color_target(device: &HeadlessGraphicsDevice) -> RenderTarget {
    device
        .create_render_target(&RenderTargetDescriptor {
            label: Some(Cow::Borrowed("backbuffer")),
            extent: Extent2D::new(800, 600),
            format: TextureFormat::Rgba8Unorm,
            sample_count: SampleCount::X1,
            clear_value: ClearValue::Color(LinearRgba::BLACK),
            initial_state: ResourceState::RenderTarget,
        })
        .expect("color target")
}

fn depth_target(device: &HeadlessGraphicsDevice) -> RenderTarget {
    device
        .create_render_target(&RenderTargetDescriptor {
            label: Some(Cow::Borrowed("depth")),
            extent: Extent2D::new(800, 600),
            format: TextureFormat::Depth32Float,
            sample_count: SampleCount::X1,
            clear_value: ClearValue::Depth(0.0),
            initial_state: ResourceState::DepthWrite,
        })
        .expect("depth target")
}

fn checkerboard(size: u32) -> CpuTexture {
    let mut pixels = Vec::with_capacity((size * size * 4) as usize);
    for y in 0..size {
        for x in 0..size {
            let on = (x / 4 + y / 4) % 2 == 0;
            let value = if on { 0xFF } else { 0x20 };
            pixels.extend_from_slice(&[value, value, value, 0xFF]);
        }
    }
    CpuTexture {
        pixels,
        size: Extent3D {
            width: size,
            height: size,
            depth_or_array_layers: 1,
        },
        format: TextureFormat::Rgba8Unorm,
    }
}

fn run_one_frame(
    device: &HeadlessGraphicsDevice,
    scene: &mut dyn Scene,
    targets: &SceneTargets<'_>,
) -> Vec<RecordedCommand> {
    scene.update(0.016, 800, 600);
    scene.pre_draw(device, 0).expect("pre_draw");

    let mut encoder = device.create_command_encoder(Some("frame"));
    scene.draw(encoder.as_mut(), targets, 0).expect("draw");
    let buffer = encoder.finish();
    device.submit_command_buffer(buffer);
    device.command_stream(buffer).expect("command stream")
}

fn full_lifecycle(scene: &mut dyn Scene) -> Vec<RecordedCommand> {
    let device = HeadlessGraphicsDevice::new();
    let color = color_target(&device);
    let depth = depth_target(&device);
    let ambient = device.live_resource_count();
    let targets = SceneTargets {
        color: &color,
        depth: Some(&depth),
    };

    scene.init(&device, FRAME_COUNT).expect("init");
    scene.load(&device, ReloadFlags::ALL, &targets).expect("load");

    let stream = run_one_frame(&device, scene, &targets);
    assert!(
        device.take_state_violations().is_empty(),
        "scene '{}' violated resource states",
        scene.name()
    );

    scene.unload(&device, ReloadFlags::ALL);
    scene.exit(&device);
    assert_eq!(
        device.live_resource_count(),
        ambient,
        "scene '{}' leaked resources",
        scene.name()
    );
    stream
}

fn pass_count(stream: &[RecordedCommand]) -> usize {
    stream
        .iter()
        .filter(|c| matches!(c, RecordedCommand::BeginPass { .. }))
        .count()
}

#[test]
fn starfield_lifecycle_is_leak_free() {
    let mut scene = StarfieldScene::new(7);
    let stream = full_lifecycle(&mut scene);
    assert_eq!(pass_count(&stream), 1);
    // One instanced draw covering the whole field.
    assert!(stream.iter().any(|c| matches!(
        c,
        RecordedCommand::Draw { instances, .. } if instances.end == 768
    )));
}

#[test]
fn shadow_scene_records_shadow_then_main_pass() {
    let mut scene = ShadowScene::new();
    let stream = full_lifecycle(&mut scene);
    assert_eq!(pass_count(&stream), 2);

    // The first pass is depth-only (the shadow map), the second has a color
    // attachment.
    let passes: Vec<_> = stream
        .iter()
        .filter_map(|c| match c {
            RecordedCommand::BeginPass {
                color_targets,
                depth_target,
                ..
            } => Some((color_targets.len(), depth_target.is_some())),
            _ => None,
        })
        .collect();
    assert_eq!(passes[0], (0, true));
    assert_eq!(passes[1], (1, true));
}

#[test]
fn quads_scene_draws_both_quads() {
    let mut scene = QuadsScene::new([checkerboard(32), checkerboard(32)]);
    let stream = full_lifecycle(&mut scene);
    assert_eq!(pass_count(&stream), 1);
    let draws = stream
        .iter()
        .filter(|c| matches!(c, RecordedCommand::Draw { .. }))
        .count();
    assert_eq!(draws, 2);
}

#[test]
fn manager_swaps_scene_between_frames() {
    let device = HeadlessGraphicsDevice::new();
    let color = color_target(&device);
    let depth = depth_target(&device);
    let targets = SceneTargets {
        color: &color,
        depth: Some(&depth),
    };

    let mut manager = SceneManager::new(Box::new(StarfieldScene::new(1)), FRAME_COUNT);
    manager.init(&device).expect("init");
    manager
        .load(&device, ReloadFlags::ALL, &targets)
        .expect("load");
    assert_eq!(manager.current_name(), "starfield");

    manager.set_next(Box::new(QuadsScene::new([
        checkerboard(16),
        checkerboard(16),
    ])));
    manager
        .update(&device, &targets, 0.016, 800, 600)
        .expect("swap update");
    assert_eq!(manager.current_name(), "quads");

    // The swapped-in scene is immediately drawable.
    manager.pre_draw(&device, 0).expect("pre_draw");
    let mut encoder = device.create_command_encoder(None);
    manager.draw(encoder.as_mut(), &targets, 0).expect("draw");
    let buffer = encoder.finish();
    device.submit_command_buffer(buffer);
    assert!(device.take_state_violations().is_empty());

    manager.unload(&device, ReloadFlags::ALL);
    manager.exit(&device);
}
