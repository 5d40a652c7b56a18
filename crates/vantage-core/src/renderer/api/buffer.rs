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

//! Defines data structures related to GPU buffer resources.

use crate::vantage_bitflags;
use std::borrow::Cow;

vantage_bitflags! {
    /// A set of flags describing the allowed usages of a [`BufferId`].
    ///
    /// The graphics driver uses these to place the buffer in the most
    /// suitable memory type and to validate usage at runtime.
    pub struct BufferUsage: u32 {
        /// The buffer can be used as the source of a copy operation.
        const COPY_SRC = 1 << 0;
        /// The buffer can be used as the destination of a copy operation.
        const COPY_DST = 1 << 1;
        /// The buffer can be bound as a vertex buffer.
        const VERTEX = 1 << 2;
        /// The buffer can be bound as an index buffer.
        const INDEX = 1 << 3;
        /// The buffer can be bound as a uniform buffer.
        const UNIFORM = 1 << 4;
    }
}

/// A descriptor used to create a [`BufferId`].
#[derive(Debug, Clone)]
pub struct BufferDescriptor<'a> {
    /// An optional debug label for the buffer.
    pub label: Option<Cow<'a, str>>,
    /// The total size of the buffer in bytes.
    pub size: u64,
    /// A bitmask of [`BufferUsage`] flags describing how the buffer will be used.
    pub usage: BufferUsage,
}

/// An opaque handle to a GPU buffer resource.
///
/// Returned by `GraphicsDevice::create_buffer` and used to reference the
/// buffer in all subsequent operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BufferId(pub usize);
