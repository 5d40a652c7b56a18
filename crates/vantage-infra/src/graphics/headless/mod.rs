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

//! A GPU-less backend that implements the full device contract.
//!
//! Commands are recorded, not executed; resource-state transitions are
//! applied and validated at record time, which is what makes the barrier
//! discipline of the post-processing chain and the scenes observable from
//! tests.

mod command;
mod device;

pub use command::{HeadlessCommandEncoder, RecordedCommand};
pub use device::HeadlessGraphicsDevice;
