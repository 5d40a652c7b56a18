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

//! # Vantage Scenes
//!
//! The demo-scene layer: a uniform four-phase per-frame contract
//! ([`scene::Scene`]), a manager that swaps scenes between frames, shared
//! drawing helpers (shape meshes, textured quads, a first-person camera),
//! and the three demo scenes themselves.

#![warn(missing_docs)]

pub mod camera;
pub mod manager;
pub mod quad_draw;
mod rng;
pub mod scene;
pub mod scenes;
pub mod shaders;
pub mod shapes;

pub use manager::SceneManager;
pub use scene::{Scene, SceneTargets};
