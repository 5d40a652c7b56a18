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

//! Provides a 4x4 column-major matrix for 3D transformations.

use super::vector::{Vec3, Vec4};
use std::ops::Mul;

/// A 4x4 column-major matrix, used for 3D affine transformations.
///
/// This is the primary type for representing transformations (translation,
/// rotation, scale) in 3D space, and for camera view and projection matrices.
/// The memory layout is column-major, matching modern graphics APIs.
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
#[repr(C)]
pub struct Mat4 {
    /// The columns of the matrix. `cols[0]` is the first column, and so on.
    pub cols: [Vec4; 4],
}

impl Mat4 {
    /// The 4x4 identity matrix.
    pub const IDENTITY: Self = Self {
        cols: [Vec4::X, Vec4::Y, Vec4::Z, Vec4::W],
    };

    /// Creates a new matrix from four column vectors.
    #[inline]
    pub const fn from_cols(c0: Vec4, c1: Vec4, c2: Vec4, c3: Vec4) -> Self {
        Self {
            cols: [c0, c1, c2, c3],
        }
    }

    /// Creates a translation matrix.
    #[inline]
    pub fn from_translation(v: Vec3) -> Self {
        Self::from_cols(
            Vec4::X,
            Vec4::Y,
            Vec4::Z,
            Vec4::new(v.x, v.y, v.z, 1.0),
        )
    }

    /// Creates a non-uniform scaling matrix.
    #[inline]
    pub fn from_scale(scale: Vec3) -> Self {
        Self::from_cols(
            Vec4::new(scale.x, 0.0, 0.0, 0.0),
            Vec4::new(0.0, scale.y, 0.0, 0.0),
            Vec4::new(0.0, 0.0, scale.z, 0.0),
            Vec4::W,
        )
    }

    /// Creates a matrix for a rotation around the X-axis.
    ///
    /// `angle` is in radians.
    #[inline]
    pub fn from_rotation_x(angle: f32) -> Self {
        let c = angle.cos();
        let s = angle.sin();
        Self::from_cols(
            Vec4::X,
            Vec4::new(0.0, c, s, 0.0),
            Vec4::new(0.0, -s, c, 0.0),
            Vec4::W,
        )
    }

    /// Creates a matrix for a rotation around the Y-axis.
    #[inline]
    pub fn from_rotation_y(angle: f32) -> Self {
        let c = angle.cos();
        let s = angle.sin();
        Self::from_cols(
            Vec4::new(c, 0.0, -s, 0.0),
            Vec4::Y,
            Vec4::new(s, 0.0, c, 0.0),
            Vec4::W,
        )
    }

    /// Creates a matrix for a rotation around the Z-axis.
    #[inline]
    pub fn from_rotation_z(angle: f32) -> Self {
        let c = angle.cos();
        let s = angle.sin();
        Self::from_cols(
            Vec4::new(c, s, 0.0, 0.0),
            Vec4::new(-s, c, 0.0, 0.0),
            Vec4::Z,
            Vec4::W,
        )
    }

    /// Creates a right-handed perspective projection matrix with a `[0, 1]`
    /// depth range.
    ///
    /// Passing `z_near > z_far` produces a reversed-Z projection (depth 1.0
    /// at the near plane, 0.0 at the far plane), which the demo scenes use
    /// together with a `GreaterEqual` depth test.
    #[inline]
    pub fn perspective_rh_zo(
        fov_y_radians: f32,
        aspect_ratio: f32,
        z_near: f32,
        z_far: f32,
    ) -> Self {
        debug_assert!(z_near > 0.0 && z_far > 0.0 && z_near != z_far);
        let f = 1.0 / (fov_y_radians / 2.0).tan();
        let aa = f / aspect_ratio;
        let cc = z_far / (z_near - z_far);
        let dd = (z_near * z_far) / (z_near - z_far);

        Self::from_cols(
            Vec4::new(aa, 0.0, 0.0, 0.0),
            Vec4::new(0.0, f, 0.0, 0.0),
            Vec4::new(0.0, 0.0, cc, -1.0),
            Vec4::new(0.0, 0.0, dd, 0.0),
        )
    }

    /// Creates a right-handed view matrix for a camera looking from `eye`
    /// towards `target`.
    ///
    /// Returns `None` if `eye` and `target` are too close, or if `up` is
    /// parallel to the view direction.
    #[inline]
    pub fn look_at_rh(eye: Vec3, target: Vec3, up: Vec3) -> Option<Self> {
        let forward = target - eye;
        if forward.length_squared() < super::EPSILON * super::EPSILON {
            return None;
        }
        let f = forward.normalize();
        let s = f.cross(up);
        if s.length_squared() < super::EPSILON * super::EPSILON {
            return None;
        }
        let s = s.normalize();
        let u = s.cross(f);

        Some(Self::from_cols(
            Vec4::new(s.x, u.x, -f.x, 0.0),
            Vec4::new(s.y, u.y, -f.y, 0.0),
            Vec4::new(s.z, u.z, -f.z, 0.0),
            Vec4::new(-eye.dot(s), -eye.dot(u), eye.dot(f), 1.0),
        ))
    }

    /// Returns a row of the matrix as a `Vec4`.
    #[inline]
    pub fn row(&self, index: usize) -> Vec4 {
        match index {
            0 => Vec4::new(self.cols[0].x, self.cols[1].x, self.cols[2].x, self.cols[3].x),
            1 => Vec4::new(self.cols[0].y, self.cols[1].y, self.cols[2].y, self.cols[3].y),
            2 => Vec4::new(self.cols[0].z, self.cols[1].z, self.cols[2].z, self.cols[3].z),
            3 => Vec4::new(self.cols[0].w, self.cols[1].w, self.cols[2].w, self.cols[3].w),
            _ => panic!("Mat4 row index out of range: {index}"),
        }
    }

    /// Returns the transpose of the matrix.
    #[inline]
    pub fn transpose(&self) -> Self {
        Self::from_cols(self.row(0), self.row(1), self.row(2), self.row(3))
    }
}

impl Default for Mat4 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mul for Mat4 {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        let mut cols = [Vec4::ZERO; 4];
        for (i, col) in cols.iter_mut().enumerate() {
            *col = self * rhs.cols[i];
        }
        Self { cols }
    }
}

impl Mul<Vec4> for Mat4 {
    type Output = Vec4;

    fn mul(self, v: Vec4) -> Vec4 {
        self.cols[0] * v.x + self.cols[1] * v.y + self.cols[2] * v.z + self.cols[3] * v.w
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::{approx_eq, FRAC_PI_2};

    #[test]
    fn identity_is_neutral_for_multiplication() {
        let m = Mat4::from_translation(Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(Mat4::IDENTITY * m, m);
        assert_eq!(m * Mat4::IDENTITY, m);
    }

    #[test]
    fn translation_moves_points_not_directions() {
        let m = Mat4::from_translation(Vec3::new(5.0, 0.0, 0.0));
        let point = m * Vec4::new(1.0, 1.0, 1.0, 1.0);
        let dir = m * Vec4::new(1.0, 1.0, 1.0, 0.0);
        assert_eq!(point.truncate(), Vec3::new(6.0, 1.0, 1.0));
        assert_eq!(dir.truncate(), Vec3::new(1.0, 1.0, 1.0));
    }

    #[test]
    fn rotation_z_quarter_turn() {
        let m = Mat4::from_rotation_z(FRAC_PI_2);
        let v = m * Vec4::new(1.0, 0.0, 0.0, 0.0);
        assert!(approx_eq(v.x, 0.0));
        assert!(approx_eq(v.y, 1.0));
    }

    #[test]
    fn transpose_is_involutive() {
        let m = Mat4::from_rotation_x(0.3) * Mat4::from_translation(Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(m.transpose().transpose(), m);
    }

    #[test]
    fn look_at_rejects_degenerate_input() {
        let eye = Vec3::new(0.0, 0.0, 5.0);
        assert!(Mat4::look_at_rh(eye, eye, Vec3::Y).is_none());
        assert!(Mat4::look_at_rh(eye, Vec3::ZERO, Vec3::new(0.0, 0.0, 1.0)).is_none());
    }

    #[test]
    fn reversed_z_projection_maps_near_to_one() {
        // Near and far swapped: the demo scenes clear depth to 0.0 and use a
        // GreaterEqual depth test.
        let m = Mat4::perspective_rh_zo(FRAC_PI_2, 1.0, 1000.0, 0.1);
        let near = m * Vec4::new(0.0, 0.0, -0.1, 1.0);
        let far = m * Vec4::new(0.0, 0.0, -1000.0, 1.0);
        assert!(approx_eq(near.z / near.w, 1.0));
        assert!(approx_eq_abs(far.z / far.w, 0.0, 1e-3));
    }

    fn approx_eq_abs(a: f32, b: f32, eps: f32) -> bool {
        (a - b).abs() < eps
    }
}
