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

//! Structural contracts of the post-processing chain, exercised against the
//! headless backend.

use std::borrow::Cow;

use vantage_core::math::{Extent2D, Extent3D, LinearRgba};
use vantage_core::renderer::api::{
    ClearValue, CpuTexture, RenderTarget, RenderTargetDescriptor, ResourceState, SampleCount,
    TextureDescriptor, TextureFormat, TextureId, TextureUsage,
};
use vantage_core::renderer::reload::ReloadFlags;
use vantage_core::renderer::traits::{CommandEncoder as _, GraphicsDevice};
use vantage_fx::chain::INTERMEDIATE_FORMAT;
use vantage_fx::smaa::SmaaLookupTables;
use vantage_fx::{PostProcessChain, PostProcessOptions, StageKind};
use vantage_infra::HeadlessGraphicsDevice;

fn lut_strip() -> CpuTexture {
    // A 16-slice LUT strip; contents are irrelevant to the chain contract.
    let size = Extent3D {
        width: 16 * 16,
        height: 16,
        depth_or_array_layers: 1,
    };
    CpuTexture {
        pixels: vec![0; (size.width * size.height * 4) as usize],
        size,
        format: TextureFormat::Rgba8Unorm,
    }
}

fn both_stages() -> PostProcessOptions {
    PostProcessOptions {
        enable_smaa: true,
        enable_color_grading: true,
        smaa_tables: Some(SmaaLookupTables::zeroed()),
        color_grading_lut: Some(lut_strip()),
    }
}

fn make_output(device: &HeadlessGraphicsDevice, width: u32, height: u32) -> RenderTarget {
    device
        .create_render_target(&RenderTargetDescriptor {
            label: Some(Cow::Borrowed("chain output")),
            extent: Extent2D::new(width, height),
            format: TextureFormat::Rgba8Unorm,
            sample_count: SampleCount::X1,
            clear_value: ClearValue::Color(LinearRgba::BLACK),
            initial_state: ResourceState::RenderTarget,
        })
        .expect("output target")
}

fn make_input(device: &HeadlessGraphicsDevice, width: u32, height: u32) -> TextureId {
    device
        .create_texture(&TextureDescriptor {
            label: Some(Cow::Borrowed("scene color")),
            size: Extent3D {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: SampleCount::X1,
            format: TextureFormat::Rgba8Unorm,
            usage: TextureUsage::TEXTURE_BINDING | TextureUsage::RENDER_ATTACHMENT,
        })
        .expect("input texture")
}

#[test]
fn disabled_chain_has_no_stages_and_no_intermediates() {
    let device = HeadlessGraphicsDevice::new();
    let output = make_output(&device, 640, 480);
    let input = make_input(&device, 640, 480);

    let mut chain = PostProcessChain::new(&device, PostProcessOptions::default()).unwrap();
    chain
        .load(&device, ReloadFlags::ALL, &output, input)
        .unwrap();

    assert_eq!(chain.stage_count(), 0);
    assert_eq!(chain.intermediate_count(), 0);

    chain.unload(&device, ReloadFlags::ALL);
    chain.exit(&device);
}

#[test]
fn single_stage_reads_input_and_writes_output_directly() {
    let device = HeadlessGraphicsDevice::new();
    let output = make_output(&device, 640, 480);
    let input = make_input(&device, 640, 480);

    let options = PostProcessOptions {
        enable_color_grading: true,
        color_grading_lut: Some(lut_strip()),
        ..Default::default()
    };
    let mut chain = PostProcessChain::new(&device, options).unwrap();
    chain
        .load(&device, ReloadFlags::ALL, &output, input)
        .unwrap();

    assert_eq!(chain.stage_count(), 1);
    assert_eq!(chain.intermediate_count(), 0);
    assert_eq!(chain.stage_io(0), Some((input, output.id)));

    chain.unload(&device, ReloadFlags::ALL);
    chain.exit(&device);
}

#[test]
fn both_stages_share_one_intermediate_in_fixed_order() {
    let device = HeadlessGraphicsDevice::new();
    let output = make_output(&device, 640, 480);
    let input = make_input(&device, 640, 480);

    let mut chain = PostProcessChain::new(&device, both_stages()).unwrap();
    chain
        .load(&device, ReloadFlags::ALL, &output, input)
        .unwrap();

    assert_eq!(chain.stage_count(), 2);
    assert_eq!(
        chain.stage_kinds(),
        vec![StageKind::Smaa, StageKind::ColorGrading]
    );
    assert_eq!(chain.intermediate_count(), 1);

    let intermediate = chain.intermediates()[0];
    assert_eq!(chain.stage_io(0), Some((input, intermediate.id)));
    assert_eq!(
        chain.stage_io(1),
        Some((intermediate.texture, output.id))
    );

    chain.unload(&device, ReloadFlags::ALL);
    chain.exit(&device);
}

#[test]
fn enabling_a_stage_without_its_inputs_fails() {
    let device = HeadlessGraphicsDevice::new();

    let smaa_only = PostProcessOptions {
        enable_smaa: true,
        ..Default::default()
    };
    assert!(PostProcessChain::new(&device, smaa_only).is_err());

    let grading_only = PostProcessOptions {
        enable_color_grading: true,
        ..Default::default()
    };
    assert!(PostProcessChain::new(&device, grading_only).is_err());
}

#[test]
fn draw_leaves_every_intermediate_shader_readable() {
    let device = HeadlessGraphicsDevice::new();
    let output = make_output(&device, 1920, 1080);
    let input = make_input(&device, 1920, 1080);

    let mut chain = PostProcessChain::new(&device, both_stages()).unwrap();
    chain
        .load(&device, ReloadFlags::ALL, &output, input)
        .unwrap();

    // End-to-end 1080p contract: exactly one intermediate, matching the
    // output dimensions, 8-bit RGBA.
    assert_eq!(chain.intermediate_count(), 1);
    let intermediate = chain.intermediates()[0];
    assert_eq!(intermediate.extent, Extent2D::new(1920, 1080));
    assert_eq!(intermediate.format, INTERMEDIATE_FORMAT);
    assert_eq!(
        device.render_target_extent(intermediate.id),
        Some(Extent2D::new(1920, 1080))
    );

    let mut encoder = device.create_command_encoder(Some("post"));
    chain.draw(encoder.as_mut(), &output).unwrap();
    let buffer = encoder.finish();
    device.submit_command_buffer(buffer);

    // Balanced transitions: the intermediate and both SMAA-internal buffers
    // end the frame shader-readable, and no mismatch was recorded.
    assert_eq!(
        device.render_target_state(intermediate.id),
        Some(ResourceState::ShaderResource)
    );
    assert!(device.take_state_violations().is_empty());

    chain.unload(&device, ReloadFlags::ALL);
    chain.exit(&device);
}

#[test]
fn resize_only_reload_preserves_pipelines_and_recreates_targets() {
    let device = HeadlessGraphicsDevice::new();
    let output = make_output(&device, 1280, 720);
    let input = make_input(&device, 1280, 720);

    let mut chain = PostProcessChain::new(&device, both_stages()).unwrap();
    chain
        .load(&device, ReloadFlags::ALL, &output, input)
        .unwrap();

    let smaa_pipelines = chain.stage_pipelines(0);
    let grading_pipelines = chain.stage_pipelines(1);
    assert_eq!(smaa_pipelines.len(), 3);
    assert_eq!(grading_pipelines.len(), 1);
    let old_intermediate = chain.intermediates()[0].id;

    // Simulated window resize: only the sized targets may change.
    chain.unload(&device, ReloadFlags::RESIZE);
    let resized_output = make_output(&device, 2560, 1440);
    let resized_input = make_input(&device, 2560, 1440);
    chain
        .load(&device, ReloadFlags::RESIZE, &resized_output, resized_input)
        .unwrap();

    assert_eq!(chain.stage_pipelines(0), smaa_pipelines);
    assert_eq!(chain.stage_pipelines(1), grading_pipelines);

    let new_intermediate = chain.intermediates()[0];
    assert_ne!(new_intermediate.id, old_intermediate);
    assert_eq!(new_intermediate.extent, Extent2D::new(2560, 1440));

    chain.unload(&device, ReloadFlags::ALL);
    chain.exit(&device);
}

#[test]
fn full_lifecycle_releases_every_resource() {
    let device = HeadlessGraphicsDevice::new();
    let output = make_output(&device, 320, 200);
    let input = make_input(&device, 320, 200);
    // The caller-owned output (plus its texture) and input.
    let ambient = device.live_resource_count();

    let mut chain = PostProcessChain::new(&device, both_stages()).unwrap();
    chain
        .load(&device, ReloadFlags::ALL, &output, input)
        .unwrap();
    assert!(device.live_resource_count() > ambient);

    chain.unload(&device, ReloadFlags::ALL);
    chain.exit(&device);
    assert_eq!(device.live_resource_count(), ambient);
}
