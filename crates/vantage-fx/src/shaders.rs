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

//! The embedded WGSL sources for the post-processing passes.
//!
//! Compiling these is entirely the graphics backend's concern; this crate
//! only hands the strings over through `ShaderModuleDescriptor`.

/// SMAA edge detection (pass 1 of 3).
pub const SMAA_EDGES_WGSL: &str = include_str!("shaders/smaa_edges.wgsl");

/// SMAA blending-weight calculation (pass 2 of 3).
pub const SMAA_WEIGHTS_WGSL: &str = include_str!("shaders/smaa_weights.wgsl");

/// SMAA neighborhood blending (pass 3 of 3).
pub const SMAA_BLEND_WGSL: &str = include_str!("shaders/smaa_blend.wgsl");

/// Color grading LUT application.
pub const COLOR_GRADING_WGSL: &str = include_str!("shaders/color_grading.wgsl");
