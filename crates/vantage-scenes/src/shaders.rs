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

//! The embedded WGSL sources for the demo scenes.

/// Instanced star-field rendering.
pub const STARFIELD_WGSL: &str = include_str!("shaders/starfield.wgsl");

/// Lit objects with two directional lights and shadow sampling.
pub const OBJECT_WGSL: &str = include_str!("shaders/object.wgsl");

/// Depth-only shadow-map pass.
pub const SHADOW_WGSL: &str = include_str!("shaders/shadow.wgsl");

/// Unlit emissive light-source markers.
pub const LIT_WGSL: &str = include_str!("shaders/lit.wgsl");

/// Alpha-blended textured quads.
pub const QUAD_WGSL: &str = include_str!("shaders/quad.wgsl");
