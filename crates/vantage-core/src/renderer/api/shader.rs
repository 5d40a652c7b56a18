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

//! Shader module sources, descriptors, and handles.

use crate::renderer::api::common::ShaderStage;
use std::borrow::Cow;

/// Represents the source data for a shader module.
///
/// Sources are embedded WGSL strings; compiling them is entirely the
/// backend's concern, this layer never parses shader code.
#[derive(Debug, Clone)]
pub enum ShaderSourceData<'a> {
    /// WGSL source text.
    Wgsl(Cow<'a, str>),
}

/// Describes a shader module to be created by the `GraphicsDevice`.
#[derive(Debug, Clone)]
pub struct ShaderModuleDescriptor<'a> {
    /// An optional debug label.
    pub label: Option<&'a str>,
    /// The shader source.
    pub source: ShaderSourceData<'a>,
    /// The pipeline stage this module is compiled for.
    pub stage: ShaderStage,
    /// The entry point function name.
    pub entry_point: &'a str,
}

/// An opaque handle representing a compiled shader module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ShaderModuleId(pub usize);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn descriptor_holds_source() {
        let descriptor = ShaderModuleDescriptor {
            label: Some("fullscreen"),
            source: ShaderSourceData::Wgsl(Cow::Borrowed("fn vs_main() {}")),
            stage: ShaderStage::Vertex,
            entry_point: "vs_main",
        };
        let ShaderSourceData::Wgsl(ref src) = descriptor.source;
        assert!(src.contains("vs_main"));
        assert_eq!(descriptor.entry_point, "vs_main");
    }
}
