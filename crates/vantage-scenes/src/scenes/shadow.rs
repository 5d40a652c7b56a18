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

//! Shadow-mapped shapes under two directional lights.
//!
//! Per frame: a depth-only pass into the shadow map from light 0's point of
//! view, the main lit pass, unlit markers at the light positions, and a
//! small debug viewport in the corner re-rendering the scene through the
//! shadow-viewport pipeline.

use std::borrow::Cow;
use std::mem;

use vantage_core::math::{Extent2D, LinearRgba, Mat4, Vec3, FRAC_PI_2};
use vantage_core::renderer::api::*;
use vantage_core::renderer::error::{RenderError, ResourceError};
use vantage_core::renderer::reload::ReloadFlags;
use vantage_core::renderer::traits::{CommandEncoder, GraphicsDevice, RenderPass};

use crate::camera::FpsCamera;
use crate::scene::{Scene, SceneTargets};
use crate::shaders;
use crate::shapes::{ShapeKind, ShapeLibrary};

/// Number of shapes in the scene.
pub const OBJECT_COUNT: usize = 3;
/// Number of directional lights.
pub const DIRECTIONAL_LIGHT_COUNT: usize = 2;

const SHADOW_MAP_DIMENSION: u32 = 1024;
const SHADOW_VIEWPORT: u32 = 512;
const LIGHT_DISTANCE: f32 = 30.0;

/// Per-object uniform block, one slot per (frame, object).
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
struct ObjectUniform {
    transform: Mat4,
    color: LinearRgba,
}

/// Per-frame scene uniform block.
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
struct SceneUniform {
    camera_position: [f32; 4],
    project_view: Mat4,
    light_direction: [[f32; 4]; DIRECTIONAL_LIGHT_COUNT],
    light_color: [[f32; 4]; DIRECTIONAL_LIGHT_COUNT],
    light_ambient: [[f32; 4]; DIRECTIONAL_LIGHT_COUNT],
    light_intensity: [[f32; 4]; DIRECTIONAL_LIGHT_COUNT],
    shadow_transform: Mat4,
}

impl Default for SceneUniform {
    fn default() -> Self {
        Self {
            camera_position: [0.0; 4],
            project_view: Mat4::IDENTITY,
            light_direction: [[0.0; 4]; DIRECTIONAL_LIGHT_COUNT],
            light_color: [[0.0; 4]; DIRECTIONAL_LIGHT_COUNT],
            light_ambient: [[0.0; 4]; DIRECTIONAL_LIGHT_COUNT],
            light_intensity: [[0.0; 4]; DIRECTIONAL_LIGHT_COUNT],
            shadow_transform: Mat4::IDENTITY,
        }
    }
}

/// The shadow-mapping demo scene.
pub struct ShadowScene {
    camera: FpsCamera,
    scene: SceneUniform,
    objects: [ObjectUniform; OBJECT_COUNT],
    object_shapes: [ShapeKind; OBJECT_COUNT],
    light_sources: [ObjectUniform; DIRECTIONAL_LIGHT_COUNT],
    light_position: Vec3,

    shapes: Option<ShapeLibrary>,
    ub_objects: Vec<BufferId>,
    ub_scene: Vec<BufferId>,
    ub_lights: Vec<BufferId>,

    // Gated by ReloadFlags::SHADER.
    object_vs: Option<ShaderModuleId>,
    object_fs: Option<ShaderModuleId>,
    shadow_vs: Option<ShaderModuleId>,
    lit_vs: Option<ShaderModuleId>,
    lit_fs: Option<ShaderModuleId>,
    shadow_sampler: Option<SamplerId>,
    scene_layout: Option<BindGroupLayoutId>,
    object_layout: Option<BindGroupLayoutId>,
    texture_layout: Option<BindGroupLayoutId>,
    lit_pipeline_layout: Option<PipelineLayoutId>,
    depth_pipeline_layout: Option<PipelineLayoutId>,
    scene_bind_groups: Vec<BindGroupId>,
    object_bind_groups: Vec<BindGroupId>,
    light_bind_groups: Vec<BindGroupId>,
    shadow_map_bind_group: Option<BindGroupId>,

    // Gated by ReloadFlags::SHADER | ReloadFlags::RENDER_TARGET, like the
    // shadow map itself whose format they depend on.
    shadow_map: Option<RenderTarget>,
    objects_pipeline: Option<RenderPipelineId>,
    shadow_pipeline: Option<RenderPipelineId>,
    light_pipeline: Option<RenderPipelineId>,
    viewport_pipeline: Option<RenderPipelineId>,
}

impl ShadowScene {
    /// Creates the scene with the default object and light setup.
    pub fn new() -> Self {
        let mut scene = Self {
            camera: FpsCamera::new(Vec3::new(0.0, 0.0, -5.0), Vec3::ZERO),
            scene: SceneUniform::default(),
            objects: [ObjectUniform {
                transform: Mat4::IDENTITY,
                color: LinearRgba::WHITE,
            }; OBJECT_COUNT],
            object_shapes: [ShapeKind::Cube; OBJECT_COUNT],
            light_sources: [ObjectUniform {
                transform: Mat4::IDENTITY,
                color: LinearRgba::WHITE,
            }; DIRECTIONAL_LIGHT_COUNT],
            light_position: Vec3::ZERO,
            shapes: None,
            ub_objects: Vec::new(),
            ub_scene: Vec::new(),
            ub_lights: Vec::new(),
            object_vs: None,
            object_fs: None,
            shadow_vs: None,
            lit_vs: None,
            lit_fs: None,
            shadow_sampler: None,
            scene_layout: None,
            object_layout: None,
            texture_layout: None,
            lit_pipeline_layout: None,
            depth_pipeline_layout: None,
            scene_bind_groups: Vec::new(),
            object_bind_groups: Vec::new(),
            light_bind_groups: Vec::new(),
            shadow_map_bind_group: None,
            shadow_map: None,
            objects_pipeline: None,
            shadow_pipeline: None,
            light_pipeline: None,
            viewport_pipeline: None,
        };

        // Floor slab, red sphere, tilted green cube.
        scene.object_shapes[0] = ShapeKind::Cube;
        scene.objects[0].color = LinearRgba::WHITE;
        scene.objects[0].transform = Mat4::from_translation(Vec3::new(0.0, -2.0, 0.0))
            * Mat4::from_scale(Vec3::new(1000.0, 1.0, 1000.0));

        scene.object_shapes[1] = ShapeKind::Sphere;
        scene.objects[1].color = LinearRgba::RED;
        scene.objects[1].transform = Mat4::IDENTITY;

        scene.object_shapes[2] = ShapeKind::Cube;
        scene.objects[2].color = LinearRgba::new(0.0, 0.70, 0.4, 1.0);
        scene.objects[2].transform = Mat4::from_translation(Vec3::new(4.0, 0.0, 0.0))
            * Mat4::from_rotation_z(0.75 * vantage_core::math::PI)
            * Mat4::from_rotation_x(0.75 * vantage_core::math::PI)
            * Mat4::from_scale(Vec3::splat(3.0));

        scene.reset_light_settings();
        scene
    }

    /// Restores the two lights to their default directions and colors.
    pub fn reset_light_settings(&mut self) {
        self.scene.light_direction[0] = [0.5, -0.25, -0.5, 1.0];
        self.scene.light_color[0] = [1.0, 0.5, 0.25, 0.4];
        self.scene.light_ambient[0] = [0.1, 0.0, 0.0, 0.0];
        self.scene.light_intensity[0] = [0.4, 0.0, 0.0, 0.0];

        self.scene.light_direction[1] = [-1.0, -0.5, 0.0, 1.0];
        self.scene.light_color[1] = [0.0, 0.5, 0.75, 0.4];
        self.scene.light_ambient[1] = [0.1, 0.0, 0.0, 0.0];
        self.scene.light_intensity[1] = [0.4, 0.0, 0.0, 0.0];
    }

    /// Moves the camera to light 0's position, aimed at the origin.
    pub fn move_camera_to_light(&mut self) {
        self.camera.move_to(self.light_position);
        self.camera.look_at(Vec3::ZERO);
    }

    fn object_slot(&self, frame_index: u32, object: usize) -> usize {
        frame_index as usize * OBJECT_COUNT + object
    }

    fn light_slot(&self, frame_index: u32, light: usize) -> usize {
        frame_index as usize * DIRECTIONAL_LIGHT_COUNT + light
    }

    fn draw_objects<'pass>(
        &'pass self,
        pass: &mut (dyn RenderPass<'pass> + '_),
        shapes: &'pass ShapeLibrary,
        frame_index: u32,
        with_shadow_map: bool,
    ) -> Result<(), RenderError> {
        let scene_bind_group = self
            .scene_bind_groups
            .get(frame_index as usize)
            .ok_or_else(not_loaded)?;

        for object in 0..OBJECT_COUNT {
            let object_bind_group = self
                .object_bind_groups
                .get(self.object_slot(frame_index, object))
                .ok_or_else(not_loaded)?;
            pass.set_bind_group(0, scene_bind_group);
            pass.set_bind_group(1, object_bind_group);
            if with_shadow_map {
                let shadow_bind_group =
                    self.shadow_map_bind_group.as_ref().ok_or_else(not_loaded)?;
                pass.set_bind_group(2, shadow_bind_group);
            }
            shapes.draw(pass, self.object_shapes[object]);
        }
        Ok(())
    }
}

impl Default for ShadowScene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene for ShadowScene {
    fn name(&self) -> &str {
        "shadow"
    }

    fn init(&mut self, device: &dyn GraphicsDevice, frame_count: u32) -> Result<(), RenderError> {
        self.shapes = Some(ShapeLibrary::new(device)?);

        let object_size = mem::size_of::<ObjectUniform>() as u64;
        for index in 0..frame_count as usize * OBJECT_COUNT {
            self.ub_objects.push(device.create_buffer(&BufferDescriptor {
                label: Some(Cow::Owned(format!("object uniform {index}"))),
                size: object_size,
                usage: BufferUsage::UNIFORM | BufferUsage::COPY_DST,
            })?);
        }
        for index in 0..frame_count as usize * DIRECTIONAL_LIGHT_COUNT {
            self.ub_lights.push(device.create_buffer(&BufferDescriptor {
                label: Some(Cow::Owned(format!("light source uniform {index}"))),
                size: object_size,
                usage: BufferUsage::UNIFORM | BufferUsage::COPY_DST,
            })?);
        }
        for index in 0..frame_count {
            self.ub_scene.push(device.create_buffer(&BufferDescriptor {
                label: Some(Cow::Owned(format!("scene uniform {index}"))),
                size: mem::size_of::<SceneUniform>() as u64,
                usage: BufferUsage::UNIFORM | BufferUsage::COPY_DST,
            })?);
        }
        Ok(())
    }

    fn exit(&mut self, device: &dyn GraphicsDevice) {
        if let Some(shapes) = self.shapes.take() {
            shapes.destroy(device);
        }
        for buffer in self
            .ub_objects
            .drain(..)
            .chain(self.ub_lights.drain(..))
            .chain(self.ub_scene.drain(..))
        {
            if let Err(e) = device.destroy_buffer(buffer) {
                log::warn!("failed to destroy shadow scene buffer: {e}");
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
            self.object_vs = Some(create_shader(device, "object vs", shaders::OBJECT_WGSL, ShaderStage::Vertex)?);
            self.object_fs = Some(create_shader(device, "object fs", shaders::OBJECT_WGSL, ShaderStage::Fragment)?);
            self.shadow_vs = Some(create_shader(device, "shadow vs", shaders::SHADOW_WGSL, ShaderStage::Vertex)?);
            self.lit_vs = Some(create_shader(device, "lit vs", shaders::LIT_WGSL, ShaderStage::Vertex)?);
            self.lit_fs = Some(create_shader(device, "lit fs", shaders::LIT_WGSL, ShaderStage::Fragment)?);

            self.shadow_sampler = Some(device.create_sampler(&SamplerDescriptor::clamped(
                "shadow sampler",
                FilterMode::Nearest,
            ))?);

            let uniform_entry = |visibility| BindGroupLayoutEntry {
                binding: 0,
                visibility,
                ty: BindingType::Buffer {
                    ty: BufferBindingType::Uniform,
                },
            };
            let scene_layout = device.create_bind_group_layout(&BindGroupLayoutDescriptor {
                label: Some("scene uniforms"),
                entries: &[uniform_entry(ShaderStageFlags::VERTEX_FRAGMENT)],
            })?;
            let object_layout = device.create_bind_group_layout(&BindGroupLayoutDescriptor {
                label: Some("object uniforms"),
                entries: &[uniform_entry(ShaderStageFlags::VERTEX_FRAGMENT)],
            })?;
            let texture_layout = device.create_bind_group_layout(&BindGroupLayoutDescriptor {
                label: Some("shadow map"),
                entries: &[
                    BindGroupLayoutEntry {
                        binding: 0,
                        visibility: ShaderStageFlags::FRAGMENT,
                        ty: BindingType::Texture {
                            sample_type: TextureSampleType::Float { filterable: false },
                        },
                    },
                    BindGroupLayoutEntry {
                        binding: 1,
                        visibility: ShaderStageFlags::FRAGMENT,
                        ty: BindingType::Sampler(SamplerBindingType::NonFiltering),
                    },
                ],
            })?;

            self.lit_pipeline_layout = Some(device.create_pipeline_layout(&PipelineLayoutDescriptor {
                label: Some(Cow::Borrowed("lit layout")),
                bind_group_layouts: Cow::Owned(vec![scene_layout, object_layout, texture_layout]),
            })?);
            self.depth_pipeline_layout =
                Some(device.create_pipeline_layout(&PipelineLayoutDescriptor {
                    label: Some(Cow::Borrowed("depth-only layout")),
                    bind_group_layouts: Cow::Owned(vec![scene_layout, object_layout]),
                })?);

            self.scene_layout = Some(scene_layout);
            self.object_layout = Some(object_layout);
            self.texture_layout = Some(texture_layout);

            for buffer in &self.ub_scene {
                self.scene_bind_groups
                    .push(uniform_bind_group(device, scene_layout, *buffer)?);
            }
            for buffer in &self.ub_objects {
                self.object_bind_groups
                    .push(uniform_bind_group(device, object_layout, *buffer)?);
            }
            for buffer in &self.ub_lights {
                self.light_bind_groups
                    .push(uniform_bind_group(device, object_layout, *buffer)?);
            }
        }

        if reload.affects_shaders() || reload.contains(ReloadFlags::RENDER_TARGET) {
            self.shadow_map = Some(device.create_render_target(&RenderTargetDescriptor {
                label: Some(Cow::Borrowed("shadow map")),
                extent: Extent2D::new(SHADOW_MAP_DIMENSION, SHADOW_MAP_DIMENSION),
                format: TextureFormat::Depth32Float,
                sample_count: SampleCount::X1,
                clear_value: ClearValue::Depth(0.0),
                initial_state: ResourceState::ShaderResource,
            })?);

            let depth_format = targets
                .depth
                .map(|d| d.format)
                .unwrap_or(TextureFormat::Depth32Float);
            let color_format = targets.color.format;
            let shapes_layout = ShapeLibrary::vertex_layout();

            let lit_layout = self.lit_pipeline_layout.ok_or(ResourceError::NotFound)?;
            let depth_layout = self.depth_pipeline_layout.ok_or(ResourceError::NotFound)?;
            let object_vs = self.object_vs.ok_or(ResourceError::NotFound)?;
            let object_fs = self.object_fs.ok_or(ResourceError::NotFound)?;
            let shadow_vs = self.shadow_vs.ok_or(ResourceError::NotFound)?;
            let lit_vs = self.lit_vs.ok_or(ResourceError::NotFound)?;
            let lit_fs = self.lit_fs.ok_or(ResourceError::NotFound)?;

            let depth_state = |format| DepthStencilStateDescriptor {
                format,
                depth_write_enabled: true,
                depth_compare: CompareFunction::GreaterEqual,
            };

            self.objects_pipeline = Some(device.create_render_pipeline(&RenderPipelineDescriptor {
                label: Some(Cow::Borrowed("lit objects")),
                layout: lit_layout,
                vertex_shader_module: object_vs,
                fragment_shader_module: Some(object_fs),
                vertex_buffers_layout: Cow::Owned(vec![shapes_layout.clone()]),
                primitive_state: PrimitiveStateDescriptor {
                    topology: PrimitiveTopology::TriangleList,
                    cull_mode: Some(CullMode::Front),
                },
                depth_stencil_state: Some(depth_state(depth_format)),
                color_target_states: Cow::Owned(vec![ColorTargetStateDescriptor::opaque(
                    color_format,
                )]),
                multisample_state: MultisampleStateDescriptor::default(),
            })?);

            self.shadow_pipeline = Some(device.create_render_pipeline(&RenderPipelineDescriptor {
                label: Some(Cow::Borrowed("shadow depth")),
                layout: depth_layout,
                vertex_shader_module: shadow_vs,
                fragment_shader_module: None,
                vertex_buffers_layout: Cow::Owned(vec![shapes_layout.clone()]),
                primitive_state: PrimitiveStateDescriptor {
                    topology: PrimitiveTopology::TriangleList,
                    cull_mode: None,
                },
                depth_stencil_state: Some(depth_state(TextureFormat::Depth32Float)),
                color_target_states: Cow::Owned(Vec::new()),
                multisample_state: MultisampleStateDescriptor::default(),
            })?);

            self.light_pipeline = Some(device.create_render_pipeline(&RenderPipelineDescriptor {
                label: Some(Cow::Borrowed("light markers")),
                layout: depth_layout,
                vertex_shader_module: lit_vs,
                fragment_shader_module: Some(lit_fs),
                vertex_buffers_layout: Cow::Owned(vec![shapes_layout.clone()]),
                primitive_state: PrimitiveStateDescriptor {
                    topology: PrimitiveTopology::TriangleList,
                    cull_mode: Some(CullMode::Front),
                },
                depth_stencil_state: Some(depth_state(depth_format)),
                color_target_states: Cow::Owned(vec![ColorTargetStateDescriptor::opaque(
                    color_format,
                )]),
                multisample_state: MultisampleStateDescriptor::default(),
            })?);

            self.viewport_pipeline = Some(device.create_render_pipeline(&RenderPipelineDescriptor {
                label: Some(Cow::Borrowed("shadow viewport")),
                layout: lit_layout,
                vertex_shader_module: object_vs,
                fragment_shader_module: Some(object_fs),
                vertex_buffers_layout: Cow::Owned(vec![shapes_layout]),
                primitive_state: PrimitiveStateDescriptor {
                    topology: PrimitiveTopology::TriangleList,
                    cull_mode: Some(CullMode::Front),
                },
                depth_stencil_state: Some(depth_state(depth_format)),
                color_target_states: Cow::Owned(vec![ColorTargetStateDescriptor::opaque(
                    color_format,
                )]),
                multisample_state: MultisampleStateDescriptor::default(),
            })?);
        }

        // The shadow-map bind group references the freshly created target.
        if let Some(old) = self.shadow_map_bind_group.take() {
            device.destroy_bind_group(old)?;
        }
        let texture_layout = self.texture_layout.ok_or(ResourceError::NotFound)?;
        let sampler = self.shadow_sampler.ok_or(ResourceError::NotFound)?;
        let shadow_map = self.shadow_map.as_ref().ok_or(ResourceError::NotFound)?;
        self.shadow_map_bind_group = Some(device.create_bind_group(&BindGroupDescriptor {
            label: Some("shadow map"),
            layout: texture_layout,
            entries: &[
                BindGroupEntry {
                    binding: 0,
                    resource: BindingResource::Texture(shadow_map.texture),
                },
                BindGroupEntry {
                    binding: 1,
                    resource: BindingResource::Sampler(sampler),
                },
            ],
        })?);

        Ok(())
    }

    fn unload(&mut self, device: &dyn GraphicsDevice, reload: ReloadFlags) {
        if let Some(bind_group) = self.shadow_map_bind_group.take() {
            destroy_or_warn(device.destroy_bind_group(bind_group), "shadow map bind group");
        }

        if reload.affects_shaders() || reload.contains(ReloadFlags::RENDER_TARGET) {
            for pipeline in [
                self.objects_pipeline.take(),
                self.shadow_pipeline.take(),
                self.light_pipeline.take(),
                self.viewport_pipeline.take(),
            ]
            .into_iter()
            .flatten()
            {
                destroy_or_warn(device.destroy_render_pipeline(pipeline), "shadow pipeline");
            }
            if let Some(target) = self.shadow_map.take() {
                destroy_or_warn(device.destroy_render_target(target.id), "shadow map");
            }
        }

        if reload.affects_shaders() {
            for bind_group in self
                .scene_bind_groups
                .drain(..)
                .chain(self.object_bind_groups.drain(..))
                .chain(self.light_bind_groups.drain(..))
            {
                destroy_or_warn(device.destroy_bind_group(bind_group), "uniform bind group");
            }
            for layout in [
                self.lit_pipeline_layout.take(),
                self.depth_pipeline_layout.take(),
            ]
            .into_iter()
            .flatten()
            {
                destroy_or_warn(device.destroy_pipeline_layout(layout), "pipeline layout");
            }
            for layout in [
                self.scene_layout.take(),
                self.object_layout.take(),
                self.texture_layout.take(),
            ]
            .into_iter()
            .flatten()
            {
                destroy_or_warn(device.destroy_bind_group_layout(layout), "bind group layout");
            }
            for shader in [
                self.object_vs.take(),
                self.object_fs.take(),
                self.shadow_vs.take(),
                self.lit_vs.take(),
                self.lit_fs.take(),
            ]
            .into_iter()
            .flatten()
            {
                destroy_or_warn(device.destroy_shader_module(shader), "shader");
            }
            if let Some(sampler) = self.shadow_sampler.take() {
                destroy_or_warn(device.destroy_sampler(sampler), "shadow sampler");
            }
        }
    }

    fn update(&mut self, _delta_time: f32, width: u32, height: u32) {
        let aspect = width as f32 / height.max(1) as f32;
        // Reversed-Z projection throughout (cleared to 0.0, GreaterEqual).
        let projection = Mat4::perspective_rh_zo(FRAC_PI_2, aspect, 1000.0, 0.1);
        let view = self.camera.view_matrix();

        let position = self.camera.position();
        self.scene.camera_position = [position.x, position.y, position.z, 1.0];
        self.scene.project_view = projection * view;

        let light_dir = Vec3::new(
            self.scene.light_direction[0][0],
            self.scene.light_direction[0][1],
            self.scene.light_direction[0][2],
        );
        self.light_position = -light_dir * LIGHT_DISTANCE;
        let light_view = Mat4::look_at_rh(self.light_position, Vec3::ZERO, Vec3::Y)
            .unwrap_or(Mat4::IDENTITY);
        self.scene.shadow_transform =
            Mat4::perspective_rh_zo(FRAC_PI_2, 1.0, 1000.0, 0.1) * light_view;

        for light in 0..DIRECTIONAL_LIGHT_COUNT {
            let direction = Vec3::new(
                self.scene.light_direction[light][0],
                self.scene.light_direction[light][1],
                self.scene.light_direction[light][2],
            );
            let color = self.scene.light_color[light];
            self.light_sources[light].color = LinearRgba::new(color[0], color[1], color[2], color[3]);
            self.light_sources[light].transform =
                Mat4::from_translation(-direction * LIGHT_DISTANCE);
        }
    }

    fn pre_draw(&self, device: &dyn GraphicsDevice, frame_index: u32) -> Result<(), RenderError> {
        let scene_buffer = self
            .ub_scene
            .get(frame_index as usize)
            .ok_or(ResourceError::NotFound)?;
        device.write_buffer(*scene_buffer, 0, bytemuck::bytes_of(&self.scene))?;

        for object in 0..OBJECT_COUNT {
            let buffer = self
                .ub_objects
                .get(self.object_slot(frame_index, object))
                .ok_or(ResourceError::NotFound)?;
            device.write_buffer(*buffer, 0, bytemuck::bytes_of(&self.objects[object]))?;
        }

        for light in 0..DIRECTIONAL_LIGHT_COUNT {
            let buffer = self
                .ub_lights
                .get(self.light_slot(frame_index, light))
                .ok_or(ResourceError::NotFound)?;
            device.write_buffer(*buffer, 0, bytemuck::bytes_of(&self.light_sources[light]))?;
        }
        Ok(())
    }

    fn draw(
        &self,
        encoder: &mut dyn CommandEncoder,
        targets: &SceneTargets<'_>,
        frame_index: u32,
    ) -> Result<(), RenderError> {
        let shapes = self.shapes.as_ref().ok_or_else(not_loaded)?;
        let shadow_map = self.shadow_map.as_ref().ok_or_else(not_loaded)?;
        let objects_pipeline = self.objects_pipeline.as_ref().ok_or_else(not_loaded)?;
        let shadow_pipeline = self.shadow_pipeline.as_ref().ok_or_else(not_loaded)?;
        let light_pipeline = self.light_pipeline.as_ref().ok_or_else(not_loaded)?;
        let viewport_pipeline = self.viewport_pipeline.as_ref().ok_or_else(not_loaded)?;

        let width = targets.color.extent.width;
        let height = targets.color.extent.height;

        // Shadow pass from light 0's point of view.
        encoder.resource_barrier(&[RenderTargetBarrier::new(
            shadow_map.id,
            ResourceState::ShaderResource,
            ResourceState::DepthWrite,
        )]);
        {
            let mut pass = encoder.begin_render_pass(&RenderPassDescriptor {
                label: Some("shadow map"),
                color_attachments: &[],
                depth_attachment: Some(RenderPassDepthAttachment {
                    target: &shadow_map.id,
                    depth_ops: Operations::clear(0.0),
                }),
            });
            pass.set_viewport(Viewport::covering(
                SHADOW_MAP_DIMENSION,
                SHADOW_MAP_DIMENSION,
            ));
            pass.set_scissor(ScissorRect::covering(
                SHADOW_MAP_DIMENSION,
                SHADOW_MAP_DIMENSION,
            ));
            pass.set_pipeline(shadow_pipeline);
            self.draw_objects(pass.as_mut(), shapes, frame_index, false)?;
        }
        encoder.resource_barrier(&[RenderTargetBarrier::new(
            shadow_map.id,
            ResourceState::DepthWrite,
            ResourceState::ShaderResource,
        )]);

        // Main lit pass plus light markers plus the corner debug viewport.
        let depth_attachment = targets.depth.map(|depth| RenderPassDepthAttachment {
            target: &depth.id,
            depth_ops: Operations::clear(0.0),
        });
        {
            let mut pass = encoder.begin_render_pass(&RenderPassDescriptor {
                label: Some("shadowed objects"),
                color_attachments: &[RenderPassColorAttachment {
                    target: &targets.color.id,
                    ops: Operations::clear(LinearRgba::BLACK),
                }],
                depth_attachment,
            });
            pass.set_viewport(Viewport::covering(width, height));
            pass.set_scissor(ScissorRect::covering(width, height));

            pass.set_pipeline(objects_pipeline);
            self.draw_objects(pass.as_mut(), shapes, frame_index, true)?;

            pass.set_pipeline(light_pipeline);
            for light in 0..DIRECTIONAL_LIGHT_COUNT {
                let scene_bind_group = self
                    .scene_bind_groups
                    .get(frame_index as usize)
                    .ok_or_else(not_loaded)?;
                let light_bind_group = self
                    .light_bind_groups
                    .get(self.light_slot(frame_index, light))
                    .ok_or_else(not_loaded)?;
                pass.set_bind_group(0, scene_bind_group);
                pass.set_bind_group(1, light_bind_group);
                shapes.draw(pass.as_mut(), ShapeKind::Cube);
            }

            // Shadow-map debug view in the bottom-right corner.
            if width > SHADOW_VIEWPORT && height > SHADOW_VIEWPORT {
                pass.set_viewport(Viewport {
                    x: (width - SHADOW_VIEWPORT) as f32,
                    y: (height - SHADOW_VIEWPORT) as f32,
                    width: SHADOW_VIEWPORT as f32,
                    height: SHADOW_VIEWPORT as f32,
                    min_depth: 0.0,
                    max_depth: 1.0,
                });
                pass.set_scissor(ScissorRect {
                    x: width - SHADOW_VIEWPORT,
                    y: height - SHADOW_VIEWPORT,
                    width: SHADOW_VIEWPORT,
                    height: SHADOW_VIEWPORT,
                });
                pass.set_pipeline(viewport_pipeline);
                self.draw_objects(pass.as_mut(), shapes, frame_index, true)?;
            }
        }

        Ok(())
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

fn uniform_bind_group(
    device: &dyn GraphicsDevice,
    layout: BindGroupLayoutId,
    buffer: BufferId,
) -> Result<BindGroupId, ResourceError> {
    device.create_bind_group(&BindGroupDescriptor {
        label: None,
        layout,
        entries: &[BindGroupEntry {
            binding: 0,
            resource: BindingResource::Buffer(buffer),
        }],
    })
}

fn destroy_or_warn(result: Result<(), ResourceError>, what: &str) {
    if let Err(e) = result {
        log::warn!("failed to destroy {what}: {e}");
    }
}

fn not_loaded() -> RenderError {
    RenderError::RenderingFailed("shadow scene drawn before load".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_lights_match_reset() {
        let mut scene = ShadowScene::new();
        scene.scene.light_direction[0] = [9.0; 4];
        scene.reset_light_settings();
        assert_eq!(scene.scene.light_direction[0], [0.5, -0.25, -0.5, 1.0]);
        assert_eq!(scene.scene.light_color[1], [0.0, 0.5, 0.75, 0.4]);
    }

    #[test]
    fn update_places_light_opposite_its_direction() {
        let mut scene = ShadowScene::new();
        scene.update(0.016, 1280, 720);
        // Light 0 points (0.5, -0.25, -0.5); its marker sits on the other
        // side of the origin.
        assert!(scene.light_position.x < 0.0);
        assert!(scene.light_position.y > 0.0);
        assert!(scene.light_position.z > 0.0);
    }

    #[test]
    fn move_to_light_re_aims_camera() {
        let mut scene = ShadowScene::new();
        scene.update(0.016, 800, 600);
        scene.move_camera_to_light();
        assert_eq!(scene.camera.position(), scene.light_position);
    }
}
