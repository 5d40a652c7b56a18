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

//! Backend-agnostic rendering API.
//!
//! Organized into several logical sub-modules:
//!
//! - **[`buffer`]**: GPU buffer handles and descriptors.
//! - **[`texture`]**: Texture and sampler handles and descriptors.
//! - **[`shader`]**: Shader module sources and handles.
//! - **[`pipeline`]**: Static pipeline state, layouts, and configuration.
//! - **[`bind_group`]**: Resource binding layouts and groups.
//! - **[`target`]**: Render targets, resource states, and barriers.
//! - **[`command`]**: Command buffers and render pass descriptions.

pub mod bind_group;
pub mod buffer;
pub mod command;
pub mod common;
pub mod pipeline;
pub mod shader;
pub mod target;
pub mod texture;

pub use bind_group::*;
pub use buffer::*;
pub use command::*;
pub use common::*;
pub use pipeline::*;
pub use shader::*;
pub use target::*;
pub use texture::*;
