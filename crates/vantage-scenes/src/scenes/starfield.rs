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

//! A field of drifting stars, each an instanced sphere.

use std::borrow::Cow;
use std::mem;

use vantage_core::math::{LinearRgba, Mat4, Vec3, FRAC_PI_2};
use vantage_core::renderer::api::*;
use vantage_core::renderer::error::{RenderError, ResourceError};
use vantage_core::renderer::reload::ReloadFlags;
use vantage_core::renderer::traits::{CommandEncoder, GraphicsDevice, RenderPass as _};

use crate::camera::FpsCamera;
use crate::rng::SplitMix64;
use crate::scene::{Scene, SceneTargets};
use crate::shaders;
use crate::shapes;

/// Number of star instances in the field.
pub const MAX_STARS: usize = 768;

const FIELD_HALF_EXTENT: f32 = 100.0;
const DRIFT_SPEED: f32 = 100.0;

/// The per-frame uniform block. One copy per frame in flight.
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
struct StarfieldUniform {
    project_view: Mat4,
    world: [Mat4; MAX_STARS],
    color: [LinearRgba; MAX_STARS],
    light_position: [f32; 4],
    light_color: [f32; 4],
}

/// The star-field demo scene.
pub struct StarfieldScene {
    camera: FpsCamera,
    rng: SplitMix64,
    positions: Vec<Vec3>,
    colors: Vec<LinearRgba>,
    uniform: Box<StarfieldUniform>,

    vertex_count: u32,
    sphere_buffer: Option<BufferId>,
    uniform_buffers: Vec<BufferId>,

    // Gated by ReloadFlags::SHADER.
    vertex_shader: Option<ShaderModuleId>,
    fragment_shader: Option<ShaderModuleId>,
    bind_group_layout: Option<BindGroupLayoutId>,
    pipeline_layout: Option<PipelineLayoutId>,
    bind_groups: Vec<BindGroupId>,

    // Gated by ReloadFlags::SHADER | ReloadFlags::RENDER_TARGET.
    pipeline: Option<RenderPipelineId>,
}

impl StarfieldScene {
    /// Creates the scene with a deterministic star layout.
    pub fn new(seed: u64) -> Self {
        Self {
            camera: FpsCamera::new(Vec3::new(0.0, 0.0, 20.0), Vec3::ZERO),
            rng: SplitMix64::new(seed),
            positions: Vec::new(),
            colors: Vec::new(),
            uniform: Box::new(StarfieldUniform {
                project_view: Mat4::IDENTITY,
                world: [Mat4::IDENTITY; MAX_STARS],
                color: [LinearRgba::WHITE; MAX_STARS],
                light_position: [1.0, 0.0, 0.0, 1.0],
                light_color: [0.9, 0.9, 0.7, 1.0],
            }),
            vertex_count: 0,
            sphere_buffer: None,
            uniform_buffers: Vec::new(),
            vertex_shader: None,
            fragment_shader: None,
            bind_group_layout: None,
            pipeline_layout: None,
            bind_groups: Vec::new(),
            pipeline: None,
        }
    }
}

impl Scene for StarfieldScene {
    fn name(&self) -> &str {
        "starfield"
    }

    fn init(&mut self, device: &dyn GraphicsDevice, frame_count: u32) -> Result<(), RenderError> {
        let sphere = shapes::generate_sphere(24);
        self.vertex_count = sphere.len() as u32;
        self.sphere_buffer = Some(device.create_buffer_with_data(
            &BufferDescriptor {
                label: Some(Cow::Borrowed("star sphere")),
                size: mem::size_of_val(sphere.as_slice()) as u64,
                usage: BufferUsage::VERTEX | BufferUsage::COPY_DST,
            },
            bytemuck::cast_slice(&sphere),
        )?);

        for index in 0..frame_count {
            self.uniform_buffers
                .push(device.create_buffer(&BufferDescriptor {
                    label: Some(Cow::Owned(format!("starfield uniform {index}"))),
                    size: mem::size_of::<StarfieldUniform>() as u64,
                    usage: BufferUsage::UNIFORM | BufferUsage::COPY_DST,
                })?);
        }

        self.positions.clear();
        self.colors.clear();
        for _ in 0..MAX_STARS {
            self.positions.push(Vec3::new(
                self.rng.range_f32(-FIELD_HALF_EXTENT, FIELD_HALF_EXTENT),
                self.rng.range_f32(-FIELD_HALF_EXTENT, FIELD_HALF_EXTENT),
                self.rng.range_f32(-FIELD_HALF_EXTENT, FIELD_HALF_EXTENT),
            ));
            self.colors.push(LinearRgba::new(
                self.rng.next_f32(),
                self.rng.next_f32(),
                self.rng.next_f32(),
                1.0,
            ));
        }
        Ok(())
    }

    fn exit(&mut self, device: &dyn GraphicsDevice) {
        if let Some(buffer) = self.sphere_buffer.take() {
            if let Err(e) = device.destroy_buffer(buffer) {
                log::warn!("failed to destroy star sphere buffer: {e}");
            }
        }
        for buffer in self.uniform_buffers.drain(..) {
            if let Err(e) = device.destroy_buffer(buffer) {
                log::warn!("failed to destroy starfield uniform buffer: {e}");
            }
        }
    }

    fn load(
        &mut self,
        device: &dyn GraphicsDevice,
        reload: ReloadFlags,
        targets: &SceneTargets<'_>,
    ) -> Result<(), RenderError> {
        if reload.affects_shaders() {
            self.vertex_shader = Some(device.create_shader_module(&ShaderModuleDescriptor {
                label: Some("starfield vs"),
                source: ShaderSourceData::Wgsl(Cow::Borrowed(shaders::STARFIELD_WGSL)),
                stage: ShaderStage::Vertex,
                entry_point: "vs_main",
            })?);
            self.fragment_shader = Some(device.create_shader_module(&ShaderModuleDescriptor {
                label: Some("starfield fs"),
                source: ShaderSourceData::Wgsl(Cow::Borrowed(shaders::STARFIELD_WGSL)),
                stage: ShaderStage::Fragment,
                entry_point: "fs_main",
            })?);

            let layout = device.create_bind_group_layout(&BindGroupLayoutDescriptor {
                label: Some("starfield uniforms"),
                entries: &[BindGroupLayoutEntry {
                    binding: 0,
                    visibility: ShaderStageFlags::VERTEX_FRAGMENT,
                    ty: BindingType::Buffer {
                        ty: BufferBindingType::Uniform,
                    },
                }],
            })?;
            self.pipeline_layout = Some(device.create_pipeline_layout(&PipelineLayoutDescriptor {
                label: Some(Cow::Borrowed("starfield layout")),
                bind_group_layouts: Cow::Owned(vec![layout]),
            })?);
            self.bind_group_layout = Some(layout);

            for buffer in &self.uniform_buffers {
                self.bind_groups
                    .push(device.create_bind_group(&BindGroupDescriptor {
                        label: Some("starfield uniforms"),
                        layout,
                        entries: &[BindGroupEntry {
                            binding: 0,
                            resource: BindingResource::Buffer(*buffer),
                        }],
                    })?);
            }
        }

        if reload.affects_shaders() || reload.contains(ReloadFlags::RENDER_TARGET) {
            let vertex_shader = self.vertex_shader.ok_or(ResourceError::NotFound)?;
            let fragment_shader = self.fragment_shader.ok_or(ResourceError::NotFound)?;
            let pipeline_layout = self.pipeline_layout.ok_or(ResourceError::NotFound)?;

            let depth_format = targets
                .depth
                .map(|d| d.format)
                .unwrap_or(TextureFormat::Depth32Float);

            self.pipeline = Some(device.create_render_pipeline(&RenderPipelineDescriptor {
                label: Some(Cow::Borrowed("starfield")),
                layout: pipeline_layout,
                vertex_shader_module: vertex_shader,
                fragment_shader_module: Some(fragment_shader),
                vertex_buffers_layout: Cow::Owned(vec![shapes::ShapeLibrary::vertex_layout()]),
                primitive_state: PrimitiveStateDescriptor {
                    topology: PrimitiveTopology::TriangleList,
                    cull_mode: Some(CullMode::Front),
                },
                depth_stencil_state: Some(DepthStencilStateDescriptor {
                    format: depth_format,
                    depth_write_enabled: true,
                    depth_compare: CompareFunction::GreaterEqual,
                }),
                color_target_states: Cow::Owned(vec![ColorTargetStateDescriptor::opaque(
                    targets.color.format,
                )]),
                multisample_state: MultisampleStateDescriptor::default(),
            })?);
        }
        Ok(())
    }

    fn unload(&mut self, device: &dyn GraphicsDevice, reload: ReloadFlags) {
        if reload.affects_shaders() || reload.contains(ReloadFlags::RENDER_TARGET) {
            if let Some(pipeline) = self.pipeline.take() {
                if let Err(e) = device.destroy_render_pipeline(pipeline) {
                    log::warn!("failed to destroy starfield pipeline: {e}");
                }
            }
        }

        if reload.affects_shaders() {
            for bind_group in self.bind_groups.drain(..) {
                if let Err(e) = device.destroy_bind_group(bind_group) {
                    log::warn!("failed to destroy starfield bind group: {e}");
                }
            }
            let results = [
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
            ];
            for result in results.into_iter().flatten() {
                if let Err(e) = result {
                    log::warn!("failed to destroy starfield resource: {e}");
                }
            }
        }
    }

    fn update(&mut self, delta_time: f32, width: u32, height: u32) {
        let aspect = width as f32 / height.max(1) as f32;
        // Reversed-Z projection: swapped planes, cleared to 0.0, GreaterEqual.
        let projection = Mat4::perspective_rh_zo(FRAC_PI_2, aspect, 1000.0, 0.1);
        self.uniform.project_view = projection * self.camera.view_matrix();

        for (index, position) in self.positions.iter_mut().enumerate() {
            position.z += delta_time * DRIFT_SPEED;
            if position.z > FIELD_HALF_EXTENT {
                position.z = self.rng.range_f32(-FIELD_HALF_EXTENT, FIELD_HALF_EXTENT);
            }
            self.uniform.world[index] = Mat4::from_translation(*position);
            self.uniform.color[index] = self.colors[index];
        }
    }

    fn pre_draw(&self, device: &dyn GraphicsDevice, frame_index: u32) -> Result<(), RenderError> {
        let buffer = self
            .uniform_buffers
            .get(frame_index as usize)
            .ok_or(ResourceError::NotFound)?;
        device.write_buffer(*buffer, 0, bytemuck::bytes_of(&*self.uniform))?;
        Ok(())
    }

    fn draw(
        &self,
        encoder: &mut dyn CommandEncoder,
        targets: &SceneTargets<'_>,
        frame_index: u32,
    ) -> Result<(), RenderError> {
        let pipeline = self.pipeline.as_ref().ok_or_else(not_loaded)?;
        let bind_group = self
            .bind_groups
            .get(frame_index as usize)
            .ok_or_else(not_loaded)?;
        let sphere_buffer = self.sphere_buffer.as_ref().ok_or_else(not_loaded)?;

        let depth_attachment = targets.depth.map(|depth| RenderPassDepthAttachment {
            target: &depth.id,
            depth_ops: Operations::clear(0.0),
        });

        let mut pass = encoder.begin_render_pass(&RenderPassDescriptor {
            label: Some("starfield"),
            color_attachments: &[RenderPassColorAttachment {
                target: &targets.color.id,
                ops: Operations::clear(LinearRgba::BLACK),
            }],
            depth_attachment,
        });
        pass.set_viewport(Viewport::covering(
            targets.color.extent.width,
            targets.color.extent.height,
        ));
        pass.set_scissor(ScissorRect::covering(
            targets.color.extent.width,
            targets.color.extent.height,
        ));
        pass.set_pipeline(pipeline);
        pass.set_bind_group(0, bind_group);
        pass.set_vertex_buffer(0, sphere_buffer, 0);
        pass.draw(0..self.vertex_count, 0..MAX_STARS as u32);

        Ok(())
    }
}

fn not_loaded() -> RenderError {
    RenderError::RenderingFailed("starfield scene drawn before load".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stars_wrap_at_field_boundary() {
        let mut scene = StarfieldScene::new(1);
        // Fill star state without touching a device.
        for _ in 0..MAX_STARS {
            scene.positions.push(Vec3::new(0.0, 0.0, 99.5));
            scene.colors.push(LinearRgba::WHITE);
        }

        scene.update(0.1, 1280, 720);
        for position in &scene.positions {
            assert!(position.z <= FIELD_HALF_EXTENT);
        }
    }

    #[test]
    fn same_seed_builds_identical_fields() {
        let mut a = StarfieldScene::new(99);
        let mut b = StarfieldScene::new(99);
        for _ in 0..4 {
            a.positions.push(Vec3::new(
                a.rng.range_f32(-1.0, 1.0),
                a.rng.range_f32(-1.0, 1.0),
                a.rng.range_f32(-1.0, 1.0),
            ));
            b.positions.push(Vec3::new(
                b.rng.range_f32(-1.0, 1.0),
                b.rng.range_f32(-1.0, 1.0),
                b.rng.range_f32(-1.0, 1.0),
            ));
        }
        assert_eq!(a.positions, b.positions);
    }
}
