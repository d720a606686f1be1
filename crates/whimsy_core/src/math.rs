//! Vector and matrix types
//!
//! Matrices are column-major (`cols[column][row]`) and multiply column
//! vectors, so `a.mul(&b)` applies `b` first, then `a`.

use bytemuck::{Pod, Zeroable};
use std::ops::{Add, Mul, Neg, Sub};

/// Compare two floats with an absolute tolerance
#[inline]
pub fn approx_eq(a: f32, b: f32, epsilon: f32) -> bool {
    (a - b).abs() <= epsilon
}

// ─────────────────────────────────────────────────────────────────────────────
// Vectors
// ─────────────────────────────────────────────────────────────────────────────

/// 2D vector
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };
    pub const ONE: Vec2 = Vec2 { x: 1.0, y: 1.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn length(&self) -> f32 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    pub fn distance(&self, other: Vec2) -> f32 {
        Vec2::new(self.x - other.x, self.y - other.y).length()
    }
}

/// 3D vector
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3::new(0.0, 0.0, 0.0);
    pub const ONE: Vec3 = Vec3::new(1.0, 1.0, 1.0);
    pub const UP: Vec3 = Vec3::new(0.0, 1.0, 0.0);
    pub const FORWARD: Vec3 = Vec3::new(0.0, 0.0, -1.0);

    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn length(&self) -> f32 {
        self.dot(*self).sqrt()
    }

    /// Unit vector in the same direction, or zero for a zero-length vector
    pub fn normalize(&self) -> Self {
        let len = self.length();
        if len > 0.0 {
            Self::new(self.x / len, self.y / len, self.z / len)
        } else {
            Self::ZERO
        }
    }

    pub fn dot(&self, other: Vec3) -> f32 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    pub fn cross(&self, other: Vec3) -> Vec3 {
        Vec3::new(
            self.y * other.z - self.z * other.y,
            self.z * other.x - self.x * other.z,
            self.x * other.y - self.y * other.x,
        )
    }

    pub fn lerp(&self, other: Vec3, t: f32) -> Vec3 {
        *self + (other - *self) * t
    }

    pub fn extend(&self, w: f32) -> Vec4 {
        Vec4::new(self.x, self.y, self.z, w)
    }
}

impl Add for Vec3 {
    type Output = Vec3;

    fn add(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Vec3 {
    type Output = Vec3;

    fn sub(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Mul<f32> for Vec3 {
    type Output = Vec3;

    fn mul(self, rhs: f32) -> Vec3 {
        Vec3::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

impl Neg for Vec3 {
    type Output = Vec3;

    fn neg(self) -> Vec3 {
        Vec3::new(-self.x, -self.y, -self.z)
    }
}

/// Homogeneous 4D vector
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct Vec4 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

impl Vec4 {
    pub const fn new(x: f32, y: f32, z: f32, w: f32) -> Self {
        Self { x, y, z, w }
    }

    pub fn truncate(&self) -> Vec3 {
        Vec3::new(self.x, self.y, self.z)
    }

    /// Perspective divide. Returns `None` when `w` is zero or not finite.
    pub fn to_cartesian(&self) -> Option<Vec3> {
        if self.w == 0.0 || !self.w.is_finite() {
            return None;
        }
        let p = Vec3::new(self.x / self.w, self.y / self.w, self.z / self.w);
        (p.x.is_finite() && p.y.is_finite() && p.z.is_finite()).then_some(p)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Mat4
// ─────────────────────────────────────────────────────────────────────────────

/// 4x4 transformation matrix (column-major)
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct Mat4 {
    pub cols: [[f32; 4]; 4],
}

impl Default for Mat4 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mat4 {
    pub const IDENTITY: Mat4 = Mat4 {
        cols: [
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ],
    };

    pub fn translation(x: f32, y: f32, z: f32) -> Self {
        Self {
            cols: [
                [1.0, 0.0, 0.0, 0.0],
                [0.0, 1.0, 0.0, 0.0],
                [0.0, 0.0, 1.0, 0.0],
                [x, y, z, 1.0],
            ],
        }
    }

    pub fn scale(x: f32, y: f32, z: f32) -> Self {
        Self {
            cols: [
                [x, 0.0, 0.0, 0.0],
                [0.0, y, 0.0, 0.0],
                [0.0, 0.0, z, 0.0],
                [0.0, 0.0, 0.0, 1.0],
            ],
        }
    }

    pub fn rotation_x(angle: f32) -> Self {
        let (s, c) = angle.sin_cos();
        Self {
            cols: [
                [1.0, 0.0, 0.0, 0.0],
                [0.0, c, s, 0.0],
                [0.0, -s, c, 0.0],
                [0.0, 0.0, 0.0, 1.0],
            ],
        }
    }

    pub fn rotation_y(angle: f32) -> Self {
        let (s, c) = angle.sin_cos();
        Self {
            cols: [
                [c, 0.0, -s, 0.0],
                [0.0, 1.0, 0.0, 0.0],
                [s, 0.0, c, 0.0],
                [0.0, 0.0, 0.0, 1.0],
            ],
        }
    }

    pub fn rotation_z(angle: f32) -> Self {
        let (s, c) = angle.sin_cos();
        Self {
            cols: [
                [c, s, 0.0, 0.0],
                [-s, c, 0.0, 0.0],
                [0.0, 0.0, 1.0, 0.0],
                [0.0, 0.0, 0.0, 1.0],
            ],
        }
    }

    /// Right-handed perspective projection with depth mapped to 0..1
    pub fn perspective_rh(fov_y: f32, aspect: f32, near: f32, far: f32) -> Self {
        let h = 1.0 / (fov_y * 0.5).tan();
        let w = h / aspect;
        let r = far / (near - far);

        Self {
            cols: [
                [w, 0.0, 0.0, 0.0],
                [0.0, h, 0.0, 0.0],
                [0.0, 0.0, r, -1.0],
                [0.0, 0.0, near * r, 0.0],
            ],
        }
    }

    /// Right-handed orthographic projection with depth mapped to 0..1
    pub fn orthographic_rh(left: f32, right: f32, bottom: f32, top: f32, near: f32, far: f32) -> Self {
        let rml = right - left;
        let tmb = top - bottom;
        let fmn = far - near;

        Self {
            cols: [
                [2.0 / rml, 0.0, 0.0, 0.0],
                [0.0, 2.0 / tmb, 0.0, 0.0],
                [0.0, 0.0, -1.0 / fmn, 0.0],
                [-(right + left) / rml, -(top + bottom) / tmb, -near / fmn, 1.0],
            ],
        }
    }

    /// Right-handed look-at view matrix.
    ///
    /// When `up` is parallel to the view direction the world X axis is used as
    /// the side vector so the result stays invertible.
    pub fn look_at_rh(eye: Vec3, target: Vec3, up: Vec3) -> Self {
        let f = (target - eye).normalize();
        let mut s = f.cross(up).normalize();
        if s == Vec3::ZERO {
            s = Vec3::new(1.0, 0.0, 0.0);
        }
        let u = s.cross(f);

        Self {
            cols: [
                [s.x, u.x, -f.x, 0.0],
                [s.y, u.y, -f.y, 0.0],
                [s.z, u.z, -f.z, 0.0],
                [-s.dot(eye), -u.dot(eye), f.dot(eye), 1.0],
            ],
        }
    }

    /// Multiply two matrices (`self * other`)
    pub fn mul(&self, other: &Mat4) -> Mat4 {
        let mut result = [[0.0f32; 4]; 4];
        for (i, col) in result.iter_mut().enumerate() {
            for (j, cell) in col.iter_mut().enumerate() {
                for k in 0..4 {
                    *cell += self.cols[k][j] * other.cols[i][k];
                }
            }
        }
        Mat4 { cols: result }
    }

    pub fn transform_vec4(&self, v: Vec4) -> Vec4 {
        let c = &self.cols;
        Vec4::new(
            c[0][0] * v.x + c[1][0] * v.y + c[2][0] * v.z + c[3][0] * v.w,
            c[0][1] * v.x + c[1][1] * v.y + c[2][1] * v.z + c[3][1] * v.w,
            c[0][2] * v.x + c[1][2] * v.y + c[2][2] * v.z + c[3][2] * v.w,
            c[0][3] * v.x + c[1][3] * v.y + c[2][3] * v.z + c[3][3] * v.w,
        )
    }

    /// Transform a point, ignoring the projective row
    pub fn transform_point(&self, p: Vec3) -> Vec3 {
        self.transform_vec4(p.extend(1.0)).truncate()
    }

    /// Transform a point including the perspective divide
    pub fn project_point(&self, p: Vec3) -> Option<Vec3> {
        self.transform_vec4(p.extend(1.0)).to_cartesian()
    }

    pub fn transpose(&self) -> Mat4 {
        let c = &self.cols;
        Mat4 {
            cols: [
                [c[0][0], c[1][0], c[2][0], c[3][0]],
                [c[0][1], c[1][1], c[2][1], c[3][1]],
                [c[0][2], c[1][2], c[2][2], c[3][2]],
                [c[0][3], c[1][3], c[2][3], c[3][3]],
            ],
        }
    }

    pub fn to_cols_array(&self) -> [f32; 16] {
        bytemuck::cast(self.cols)
    }

    pub fn is_finite(&self) -> bool {
        self.cols.iter().flatten().all(|v| v.is_finite())
    }

    pub fn determinant(&self) -> f32 {
        DMat4::from(*self).determinant() as f32
    }

    /// Inverse by cofactor expansion, computed in double precision.
    ///
    /// Returns `None` for singular matrices and for matrices holding
    /// non-finite entries (e.g. a projection built from `near == far`).
    pub fn try_inverse(&self) -> Option<Mat4> {
        DMat4::from(*self).try_inverse().map(Mat4::from).filter(Mat4::is_finite)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Double precision
// ─────────────────────────────────────────────────────────────────────────────

/// Double precision 4x4 matrix, same layout as [`Mat4`].
///
/// A perspective projection with a far/near ratio in the thousands leaves
/// its f32 inverse with only a few significant bits, so screen unprojection
/// runs through this type end to end.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DMat4 {
    pub cols: [[f64; 4]; 4],
}

impl From<Mat4> for DMat4 {
    fn from(m: Mat4) -> Self {
        Self {
            cols: m.cols.map(|col| col.map(f64::from)),
        }
    }
}

impl From<DMat4> for Mat4 {
    fn from(m: DMat4) -> Self {
        Self {
            cols: m.cols.map(|col| col.map(|v| v as f32)),
        }
    }
}

impl DMat4 {
    /// Multiply two matrices (`self * other`)
    pub fn mul(&self, other: &DMat4) -> DMat4 {
        let mut result = [[0.0f64; 4]; 4];
        for (i, col) in result.iter_mut().enumerate() {
            for (j, cell) in col.iter_mut().enumerate() {
                for k in 0..4 {
                    *cell += self.cols[k][j] * other.cols[i][k];
                }
            }
        }
        DMat4 { cols: result }
    }

    /// Transform a point including the perspective divide
    pub fn project_point(&self, p: Vec3) -> Option<Vec3> {
        let c = &self.cols;
        let (x, y, z) = (f64::from(p.x), f64::from(p.y), f64::from(p.z));
        let row = |r: usize| c[0][r] * x + c[1][r] * y + c[2][r] * z + c[3][r];
        let w = row(3);
        if w == 0.0 || !w.is_finite() {
            return None;
        }
        let p = Vec3::new((row(0) / w) as f32, (row(1) / w) as f32, (row(2) / w) as f32);
        (p.x.is_finite() && p.y.is_finite() && p.z.is_finite()).then_some(p)
    }

    pub fn is_finite(&self) -> bool {
        self.cols.iter().flatten().all(|v| v.is_finite())
    }

    pub fn determinant(&self) -> f64 {
        self.cofactors().1
    }

    pub fn try_inverse(&self) -> Option<DMat4> {
        let (adj, det) = self.cofactors();
        if det == 0.0 || !det.is_finite() {
            return None;
        }
        let inv_det = 1.0 / det;
        let mut cols = adj;
        for v in cols.iter_mut().flatten() {
            *v *= inv_det;
        }
        let inverse = DMat4 { cols };
        inverse.is_finite().then_some(inverse)
    }

    /// Adjugate (in storage order) and determinant
    fn cofactors(&self) -> ([[f64; 4]; 4], f64) {
        let m = &self.cols;

        let a2323 = m[2][2] * m[3][3] - m[2][3] * m[3][2];
        let a1323 = m[2][1] * m[3][3] - m[2][3] * m[3][1];
        let a1223 = m[2][1] * m[3][2] - m[2][2] * m[3][1];
        let a0323 = m[2][0] * m[3][3] - m[2][3] * m[3][0];
        let a0223 = m[2][0] * m[3][2] - m[2][2] * m[3][0];
        let a0123 = m[2][0] * m[3][1] - m[2][1] * m[3][0];
        let a2313 = m[1][2] * m[3][3] - m[1][3] * m[3][2];
        let a1313 = m[1][1] * m[3][3] - m[1][3] * m[3][1];
        let a1213 = m[1][1] * m[3][2] - m[1][2] * m[3][1];
        let a2312 = m[1][2] * m[2][3] - m[1][3] * m[2][2];
        let a1312 = m[1][1] * m[2][3] - m[1][3] * m[2][1];
        let a1212 = m[1][1] * m[2][2] - m[1][2] * m[2][1];
        let a0313 = m[1][0] * m[3][3] - m[1][3] * m[3][0];
        let a0213 = m[1][0] * m[3][2] - m[1][2] * m[3][0];
        let a0312 = m[1][0] * m[2][3] - m[1][3] * m[2][0];
        let a0212 = m[1][0] * m[2][2] - m[1][2] * m[2][0];
        let a0113 = m[1][0] * m[3][1] - m[1][1] * m[3][0];
        let a0112 = m[1][0] * m[2][1] - m[1][1] * m[2][0];

        let c00 = m[1][1] * a2323 - m[1][2] * a1323 + m[1][3] * a1223;
        let c01 = m[1][0] * a2323 - m[1][2] * a0323 + m[1][3] * a0223;
        let c02 = m[1][0] * a1323 - m[1][1] * a0323 + m[1][3] * a0123;
        let c03 = m[1][0] * a1223 - m[1][1] * a0223 + m[1][2] * a0123;

        let det = m[0][0] * c00 - m[0][1] * c01 + m[0][2] * c02 - m[0][3] * c03;

        let adj = [
            [
                c00,
                -(m[0][1] * a2323 - m[0][2] * a1323 + m[0][3] * a1223),
                m[0][1] * a2313 - m[0][2] * a1313 + m[0][3] * a1213,
                -(m[0][1] * a2312 - m[0][2] * a1312 + m[0][3] * a1212),
            ],
            [
                -c01,
                m[0][0] * a2323 - m[0][2] * a0323 + m[0][3] * a0223,
                -(m[0][0] * a2313 - m[0][2] * a0313 + m[0][3] * a0213),
                m[0][0] * a2312 - m[0][2] * a0312 + m[0][3] * a0212,
            ],
            [
                c02,
                -(m[0][0] * a1323 - m[0][1] * a0323 + m[0][3] * a0123),
                m[0][0] * a1313 - m[0][1] * a0313 + m[0][3] * a0113,
                -(m[0][0] * a1312 - m[0][1] * a0312 + m[0][3] * a0112),
            ],
            [
                -c03,
                m[0][0] * a1223 - m[0][1] * a0223 + m[0][2] * a0123,
                -(m[0][0] * a1213 - m[0][1] * a0213 + m[0][2] * a0113),
                m[0][0] * a1212 - m[0][1] * a0212 + m[0][2] * a0112,
            ],
        ];

        (adj, det)
    }
}
