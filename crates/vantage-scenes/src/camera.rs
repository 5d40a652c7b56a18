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

//! A minimal first-person camera for the demo scenes.

use vantage_core::math::{Mat4, Vec3};

/// Position-plus-target camera producing a right-handed view matrix.
#[derive(Debug, Clone, Copy)]
pub struct FpsCamera {
    position: Vec3,
    target: Vec3,
}

impl FpsCamera {
    /// Creates a camera at `position` looking at `target`.
    pub fn new(position: Vec3, target: Vec3) -> Self {
        Self { position, target }
    }

    /// The camera's world-space position.
    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Teleports the camera, keeping its target.
    pub fn move_to(&mut self, position: Vec3) {
        self.position = position;
    }

    /// Re-aims the camera at `target`.
    pub fn look_at(&mut self, target: Vec3) {
        self.target = target;
    }

    /// The view matrix for the current position and target.
    ///
    /// Falls back to looking down negative Z when position and target
    /// coincide or the view direction is vertical.
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, Vec3::Y)
            .or_else(|| {
                Mat4::look_at_rh(
                    self.position,
                    self.position + Vec3::new(0.0, 0.0, -1.0),
                    Vec3::Y,
                )
            })
            .unwrap_or(Mat4::IDENTITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vantage_core::math::{approx_eq, Vec4};

    #[test]
    fn view_matrix_moves_target_onto_negative_z() {
        let camera = FpsCamera::new(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO);
        let view = camera.view_matrix();
        let target_in_view = view * Vec4::new(0.0, 0.0, 0.0, 1.0);
        assert!(approx_eq(target_in_view.x, 0.0));
        assert!(approx_eq(target_in_view.y, 0.0));
        assert!(approx_eq(target_in_view.z, -5.0));
    }

    #[test]
    fn degenerate_aim_falls_back() {
        let camera = FpsCamera::new(Vec3::ZERO, Vec3::ZERO);
        // Looking at itself; must still produce a usable matrix.
        assert_ne!(camera.view_matrix(), Mat4::from_scale(Vec3::ZERO));
    }
}
