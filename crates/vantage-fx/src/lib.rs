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

//! # Vantage Fx
//!
//! The post-processing stage chain: an ordered, configuration-driven
//! sequence of full-screen image-processing stages with the intermediate
//! render targets and resource-state transitions that route image data
//! between them.
//!
//! Two stages exist: SMAA anti-aliasing (three sub-passes) and color
//! grading (a single LUT pass). The [`chain::PostProcessChain`] composes
//! whichever subset is enabled, always in that order.

#![warn(missing_docs)]

pub mod chain;
pub mod color_grading;
pub mod quad;
pub mod shaders;
pub mod smaa;

pub use chain::{PostProcessChain, PostProcessOptions, StageKind};
pub use quad::ScreenQuad;
