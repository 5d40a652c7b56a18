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

//! A linear-space RGBA color type.

use serde::{Deserialize, Serialize};

use super::Vec4;

/// An RGBA color in linear color space with `f32` components.
///
/// Linear space is what shaders and blending operate in; conversion to and
/// from sRGB is the presentation layer's concern.
#[derive(
    Debug, Default, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable, Serialize, Deserialize,
)]
#[repr(C)]
pub struct LinearRgba {
    /// The red channel, typically in `[0.0, 1.0]`.
    pub r: f32,
    /// The green channel, typically in `[0.0, 1.0]`.
    pub g: f32,
    /// The blue channel, typically in `[0.0, 1.0]`.
    pub b: f32,
    /// The alpha (opacity) channel, typically in `[0.0, 1.0]`.
    pub a: f32,
}

impl LinearRgba {
    /// Opaque white.
    pub const WHITE: Self = Self::rgb(1.0, 1.0, 1.0);
    /// Opaque black.
    pub const BLACK: Self = Self::rgb(0.0, 0.0, 0.0);
    /// Fully transparent black.
    pub const TRANSPARENT: Self = Self::new(0.0, 0.0, 0.0, 0.0);
    /// Opaque red.
    pub const RED: Self = Self::rgb(1.0, 0.0, 0.0);

    /// Creates a new color from its components.
    #[inline]
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Creates a fully opaque color from RGB components.
    #[inline]
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    /// Returns the components as an `[r, g, b, a]` array.
    #[inline]
    pub const fn to_array(&self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }

    /// Returns the color as a `Vec4` (`x = r`, ..., `w = a`).
    #[inline]
    pub fn to_vec4(&self) -> Vec4 {
        Vec4::new(self.r, self.g, self.b, self.a)
    }

    /// Returns a copy of the color with the alpha channel replaced.
    #[inline]
    pub fn with_alpha(&self, a: f32) -> Self {
        Self { a, ..*self }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rgb_is_opaque() {
        assert_eq!(LinearRgba::rgb(0.2, 0.4, 0.6).a, 1.0);
    }

    #[test]
    fn to_array_round_trip() {
        let c = LinearRgba::new(0.1, 0.2, 0.3, 0.4);
        assert_eq!(c.to_array(), [0.1, 0.2, 0.3, 0.4]);
        assert_eq!(c.to_vec4().truncate().x, 0.1);
    }

    #[test]
    fn with_alpha_keeps_rgb() {
        let c = LinearRgba::RED.with_alpha(0.5);
        assert_eq!(c.r, 1.0);
        assert_eq!(c.a, 0.5);
    }
}
