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

//! Procedurally generated stand-ins for the binary assets the repository
//! does not ship: a neutral color-grading LUT and two quad textures.

use vantage_core::math::Extent3D;
use vantage_core::renderer::api::{CpuTexture, TextureFormat};

/// Builds an identity color LUT: a horizontal strip of `size` slices, each
/// `size` x `size`, mapping every input color to itself. Grading with it is
/// a no-op, which is the right neutral default for a headless run.
pub fn identity_lut(size: u32) -> CpuTexture {
    let width = size * size;
    let height = size;
    let mut pixels = Vec::with_capacity((width * height * 4) as usize);
    let scale = 255.0 / (size - 1) as f32;

    for g in 0..height {
        for x in 0..width {
            let b = x / size;
            let r = x % size;
            pixels.push((r as f32 * scale) as u8);
            pixels.push((g as f32 * scale) as u8);
            pixels.push((b as f32 * scale) as u8);
            pixels.push(0xFF);
        }
    }

    CpuTexture {
        pixels,
        size: Extent3D {
            width,
            height,
            depth_or_array_layers: 1,
        },
        format: TextureFormat::Rgba8Unorm,
    }
}

/// A black-and-white checkerboard.
pub fn checkerboard(size: u32, cell: u32) -> CpuTexture {
    let mut pixels = Vec::with_capacity((size * size * 4) as usize);
    for y in 0..size {
        for x in 0..size {
            let on = (x / cell + y / cell) % 2 == 0;
            let value = if on { 0xF0 } else { 0x10 };
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

/// A horizontal color gradient with a soft alpha falloff.
pub fn gradient(size: u32) -> CpuTexture {
    let mut pixels = Vec::with_capacity((size * size * 4) as usize);
    for y in 0..size {
        for x in 0..size {
            let t = x as f32 / (size - 1) as f32;
            pixels.push((t * 255.0) as u8);
            pixels.push((y as f32 / (size - 1) as f32 * 255.0) as u8);
            pixels.push(((1.0 - t) * 255.0) as u8);
            pixels.push(0xC0);
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_textures_are_consistent() {
        assert!(identity_lut(16).is_consistent());
        assert!(checkerboard(64, 8).is_consistent());
        assert!(gradient(64).is_consistent());
    }

    #[test]
    fn identity_lut_maps_extremes_to_themselves() {
        let lut = identity_lut(16);
        // First texel: black.
        assert_eq!(&lut.pixels[0..3], &[0, 0, 0]);
        // Last texel of the last row and slice: white.
        let last = lut.pixels.len() - 4;
        assert_eq!(&lut.pixels[last..last + 3], &[255, 255, 255]);
    }
}
