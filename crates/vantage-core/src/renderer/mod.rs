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

//! The public, backend-agnostic rendering contracts.
//!
//! This module defines the "common language" for all rendering operations:
//! the abstract traits (like [`GraphicsDevice`]), the descriptor structures
//! (like [`BufferDescriptor`]), and the error types that form the stable API
//! surface. The 'how' is provided by a concrete backend in `vantage-infra`
//! which implements these traits; the fx and scene crates use the traits
//! without knowing anything about the backend.

pub mod api;
pub mod error;
pub mod reload;
pub mod traits;

pub use self::api::*;
pub use self::error::{PipelineError, RenderError, ResourceError, ShaderError};
pub use self::reload::ReloadFlags;
pub use self::traits::{CommandEncoder, GraphicsDevice, RenderPass};
