//! Whimsy Core
//!
//! Small, dependency-light math for the Whimsy gallery:
//!
//! - **Vectors**: `Vec2`, `Vec3`, `Vec4` with the handful of operations the
//!   camera and card transforms need
//! - **Matrices**: column-major `Mat4` with translation / rotation / scale
//!   builders, right-handed perspective, orthographic and look-at builders
//! - **Fallible inverse**: `Mat4::try_inverse` reports singular matrices
//!   instead of returning garbage
//! - **Double precision**: `DMat4` for unprojecting through deep frustums
//!
//! The f32 types are `#[repr(C)]` and `bytemuck::Pod`, so a renderer can
//! upload them as uniforms without conversion.
//!
//! # Example
//!
//! ```rust
//! use whimsy_core::{Mat4, Vec3};
//!
//! let view = Mat4::look_at_rh(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO, Vec3::UP);
//! let inv = view.try_inverse().unwrap();
//! let p = inv.transform_point(view.transform_point(Vec3::new(1.0, 2.0, 3.0)));
//! assert!((p.x - 1.0).abs() < 1e-4);
//! ```

pub mod math;

pub use math::{approx_eq, DMat4, Mat4, Vec2, Vec3, Vec4};
