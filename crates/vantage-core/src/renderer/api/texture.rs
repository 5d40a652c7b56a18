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

//! Defines data structures related to GPU texture and sampler resources.

use crate::math::Extent3D;
use crate::renderer::api::common::{SampleCount, TextureFormat};
use crate::vantage_bitflags;
use std::borrow::Cow;

/// Defines how texture coordinates are handled outside the `[0, 1]` range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AddressMode {
    /// Coordinates wrap around. `1.1` becomes `0.1`.
    Repeat,
    /// Coordinates are clamped to the edge. `1.1` becomes `1.0`.
    ClampToEdge,
}

/// Defines the filtering mode for texture sampling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterMode {
    /// Point sampling. Returns the value of the nearest texel.
    Nearest,
    /// Linear interpolation over the four nearest texels.
    Linear,
}

vantage_bitflags! {
    /// A set of flags describing the allowed usages of a [`TextureId`].
    pub struct TextureUsage: u32 {
        /// The texture can be used as the destination of a copy or write.
        const COPY_DST = 1 << 0;
        /// The texture can be bound in a shader for sampling.
        const TEXTURE_BINDING = 1 << 1;
        /// The texture can be used as a color attachment in a render pass.
        const RENDER_ATTACHMENT = 1 << 2;
    }
}

/// A descriptor used to create a [`TextureId`].
#[derive(Debug, Clone)]
pub struct TextureDescriptor<'a> {
    /// An optional debug label.
    pub label: Option<Cow<'a, str>>,
    /// The dimensions (width, height, depth/layers) of the texture.
    pub size: Extent3D,
    /// The number of mipmap levels for the texture.
    pub mip_level_count: u32,
    /// The number of samples per pixel (for multisampling).
    pub sample_count: SampleCount,
    /// The format of the texels in the texture.
    pub format: TextureFormat,
    /// A bitmask of [`TextureUsage`] flags describing how the texture will be used.
    pub usage: TextureUsage,
}

/// A descriptor used to create a [`SamplerId`].
///
/// A sampler defines how a shader reads from a texture.
#[derive(Debug, Clone)]
pub struct SamplerDescriptor<'a> {
    /// An optional debug label.
    pub label: Option<Cow<'a, str>>,
    /// The address mode for the U (or S) texture coordinate.
    pub address_mode_u: AddressMode,
    /// The address mode for the V (or T) texture coordinate.
    pub address_mode_v: AddressMode,
    /// The filter mode for magnification.
    pub mag_filter: FilterMode,
    /// The filter mode for minification.
    pub min_filter: FilterMode,
}

impl<'a> SamplerDescriptor<'a> {
    /// A clamp-to-edge sampler filtering with the given mode on both axes.
    pub fn clamped(label: &'a str, filter: FilterMode) -> Self {
        Self {
            label: Some(Cow::Borrowed(label)),
            address_mode_u: AddressMode::ClampToEdge,
            address_mode_v: AddressMode::ClampToEdge,
            mag_filter: filter,
            min_filter: filter,
        }
    }
}

/// A CPU-side texture, decoded and ready to be uploaded to the GPU.
#[derive(Debug, Clone)]
pub struct CpuTexture {
    /// The raw pixel data, tightly packed row by row.
    pub pixels: Vec<u8>,
    /// The size of the texture.
    pub size: Extent3D,
    /// The format of the pixel data.
    pub format: TextureFormat,
}

impl CpuTexture {
    /// Creates a texture descriptor for uploading this CPU texture as a
    /// sampled texture.
    pub fn to_descriptor<'a>(&self, label: Option<Cow<'a, str>>) -> TextureDescriptor<'a> {
        TextureDescriptor {
            label,
            size: self.size,
            mip_level_count: 1,
            sample_count: SampleCount::X1,
            format: self.format,
            usage: TextureUsage::TEXTURE_BINDING | TextureUsage::COPY_DST,
        }
    }

    /// Returns the row size in bytes (relevant for upload alignment).
    pub fn row_size(&self) -> usize {
        self.size.width as usize * self.format.bytes_per_pixel() as usize
    }

    /// Returns `true` if `pixels` holds exactly one tightly packed image of
    /// `size` texels.
    pub fn is_consistent(&self) -> bool {
        let expected = self.row_size()
            * self.size.height as usize
            * self.size.depth_or_array_layers.max(1) as usize;
        self.pixels.len() == expected
    }
}

/// An opaque handle to a GPU texture resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureId(pub usize);

/// An opaque handle to a GPU sampler resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SamplerId(pub usize);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cpu_texture_consistency() {
        let tex = CpuTexture {
            pixels: vec![0; 4 * 4 * 2],
            size: Extent3D {
                width: 4,
                height: 4,
                depth_or_array_layers: 1,
            },
            format: TextureFormat::Rg8Unorm,
        };
        assert!(tex.is_consistent());
        assert_eq!(tex.row_size(), 8);

        let short = CpuTexture {
            pixels: vec![0; 3],
            ..tex
        };
        assert!(!short.is_consistent());
    }
}
