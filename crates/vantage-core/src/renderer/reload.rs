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

//! The reload-event protocol that gates `load`/`unload` sub-steps.

use crate::vantage_bitflags;

vantage_bitflags! {
    /// Describes which kinds of GPU objects a `load`/`unload` cycle affects.
    ///
    /// Every reload-aware component partitions its resources by flag:
    ///
    /// - [`ReloadFlags::SHADER`] gates shader modules, samplers, pipelines,
    ///   and bind-group layouts. A shader reload recompiles and rebuilds
    ///   those, and only those.
    /// - [`ReloadFlags::RENDER_TARGET`] gates render targets whose format or
    ///   usage depends on the output target (swap-chain-like changes).
    /// - [`ReloadFlags::RESIZE`] gates render targets sized to the output
    ///   (depth buffers, post-processing intermediates). A resize must not
    ///   recompile shaders or rebuild pipelines.
    ///
    /// Bind groups reference resources from both partitions, so they are
    /// refreshed on every `load` regardless of which flags are set.
    pub struct ReloadFlags: u32 {
        /// Shader-affecting reload (recompile and rebuild pipelines).
        const SHADER = 1 << 0;
        /// Output-target-affecting reload (recreate dependent targets).
        const RENDER_TARGET = 1 << 1;
        /// Dimension-affecting reload (recreate output-sized targets).
        const RESIZE = 1 << 2;
        /// Everything at once; used for initial load and full teardown.
        const ALL = Self::SHADER.bits() | Self::RENDER_TARGET.bits() | Self::RESIZE.bits();
    }
}

impl ReloadFlags {
    /// Returns `true` if this reload affects output-sized render targets.
    pub const fn affects_sized_targets(&self) -> bool {
        self.intersects(Self::from_bits_truncate(
            Self::RENDER_TARGET.bits() | Self::RESIZE.bits(),
        ))
    }

    /// Returns `true` if this reload affects shaders and pipeline objects.
    pub const fn affects_shaders(&self) -> bool {
        self.intersects(Self::SHADER)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_contains_every_flag() {
        assert!(ReloadFlags::ALL.contains(ReloadFlags::SHADER));
        assert!(ReloadFlags::ALL.contains(ReloadFlags::RENDER_TARGET));
        assert!(ReloadFlags::ALL.contains(ReloadFlags::RESIZE));
    }

    #[test]
    fn resize_only_skips_shader_work() {
        let reload = ReloadFlags::RESIZE;
        assert!(reload.affects_sized_targets());
        assert!(!reload.affects_shaders());
    }

    #[test]
    fn shader_only_skips_sized_targets() {
        let reload = ReloadFlags::SHADER;
        assert!(reload.affects_shaders());
        assert!(!reload.affects_sized_targets());
    }
}
