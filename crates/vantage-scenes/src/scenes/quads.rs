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

//! Two textured quads over a cleared background.

use std::borrow::Cow;

use vantage_core::math::{LinearRgba, Mat4, Vec3};
use vantage_core::renderer::api::{
    CpuTexture, Operations, RenderPassColorAttachment, RenderPassDescriptor, ScissorRect,
    TextureId, Viewport,
};
use vantage_core::renderer::error::{RenderError, ResourceError};
use vantage_core::renderer::reload::ReloadFlags;
use vantage_core::renderer::traits::{CommandEncoder, GraphicsDevice, RenderPass as _};

use crate::quad_draw::{Quad, QuadRenderer};
use crate::scene::{Scene, SceneTargets};

/// Number of quads the scene shows.
pub const QUAD_COUNT: usize = 2;

/// The textured-quads demo scene.
pub struct QuadsScene {
    images: [CpuTexture; QUAD_COUNT],
    textures: Vec<TextureId>,
    renderer: Option<QuadRenderer>,
    quads: Vec<Quad>,
}

impl QuadsScene {
    /// Creates the scene around two CPU-side images supplied by the shell.
    pub fn new(images: [CpuTexture; QUAD_COUNT]) -> Self {
        Self {
            images,
            textures: Vec::new(),
            renderer: None,
            quads: Vec::new(),
        }
    }
}

impl Scene for QuadsScene {
    fn name(&self) -> &str {
        "quads"
    }

    fn init(&mut self, device: &dyn GraphicsDevice, frame_count: u32) -> Result<(), RenderError> {
        self.renderer = Some(QuadRenderer::new(device)?);

        for (index, image) in self.images.iter().enumerate() {
            if !image.is_consistent() {
                return Err(RenderError::from(ResourceError::InvalidDescriptor(
                    format!("quad image {index} pixel data does not match its extent"),
                )));
            }
            let texture = device
                .create_texture(&image.to_descriptor(Some(Cow::Owned(format!("quad {index}")))))?;
            device.write_texture(texture, &image.pixels, None, Default::default(), image.size)?;
            self.textures.push(texture);
        }

        let transforms = [
            Mat4::from_translation(Vec3::new(0.25, 0.25, 0.0))
                * Mat4::from_scale(Vec3::new(0.25, 0.25, 1.0)),
            Mat4::from_translation(Vec3::new(-0.25, -0.25, 0.0))
                * Mat4::from_scale(Vec3::new(0.25, 0.25, 1.0)),
        ];
        for (texture, transform) in self.textures.iter().zip(transforms) {
            let mut quad = Quad::new(*texture);
            quad.transform = transform;
            quad.init(device, frame_count)?;
            self.quads.push(quad);
        }
        Ok(())
    }

    fn exit(&mut self, device: &dyn GraphicsDevice) {
        for quad in &mut self.quads {
            quad.exit(device);
        }
        self.quads.clear();
        for texture in self.textures.drain(..) {
            if let Err(e) = device.destroy_texture(texture) {
                log::warn!("failed to destroy quad texture: {e}");
            }
        }
        if let Some(renderer) = self.renderer.take() {
            renderer.exit(device);
        }
    }

    fn load(
        &mut self,
        device: &dyn GraphicsDevice,
        reload: ReloadFlags,
        targets: &SceneTargets<'_>,
    ) -> Result<(), RenderError> {
        let renderer = self.renderer.as_mut().ok_or(ResourceError::NotFound)?;
        renderer.load(device, reload, targets.color.format)?;
        for quad in &mut self.quads {
            quad.load(device, renderer, reload)?;
        }
        Ok(())
    }

    fn unload(&mut self, device: &dyn GraphicsDevice, reload: ReloadFlags) {
        for quad in &mut self.quads {
            quad.unload(device, reload);
        }
        if let Some(renderer) = self.renderer.as_mut() {
            renderer.unload(device, reload);
        }
    }

    fn update(&mut self, _delta_time: f32, _width: u32, _height: u32) {}

    fn pre_draw(&self, device: &dyn GraphicsDevice, frame_index: u32) -> Result<(), RenderError> {
        for quad in &self.quads {
            quad.pre_draw(device, frame_index)?;
        }
        Ok(())
    }

    fn draw(
        &self,
        encoder: &mut dyn CommandEncoder,
        targets: &SceneTargets<'_>,
        frame_index: u32,
    ) -> Result<(), RenderError> {
        let renderer = self.renderer.as_ref().ok_or_else(|| {
            RenderError::RenderingFailed("quads scene drawn before init".to_string())
        })?;

        let mut pass = encoder.begin_render_pass(&RenderPassDescriptor {
            label: Some("quads"),
            color_attachments: &[RenderPassColorAttachment {
                target: &targets.color.id,
                ops: Operations::clear(LinearRgba::BLACK),
            }],
            depth_attachment: None,
        });
        pass.set_viewport(Viewport::covering(
            targets.color.extent.width,
            targets.color.extent.height,
        ));
        pass.set_scissor(ScissorRect::covering(
            targets.color.extent.width,
            targets.color.extent.height,
        ));

        for quad in &self.quads {
            quad.draw(pass.as_mut(), renderer, frame_index)?;
        }
        Ok(())
    }
}
