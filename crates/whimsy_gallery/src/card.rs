//! Cards
//!
//! A card is a flat quad in its own local space, centered on the origin and
//! facing +Z. Its transform is relative to the owning stack.

use whimsy_animation::{Animatable, TweenProperty};
use whimsy_core::{Mat4, Vec2, Vec3};

use crate::camera::Camera;
use crate::error::CameraError;

#[derive(Clone, Debug, PartialEq)]
pub struct Card {
    /// Caller-assigned identity (e.g. an image index)
    pub id: u32,
    /// Size in world units
    pub width: f32,
    pub height: f32,

    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub rx: f32,
    pub ry: f32,
    pub rz: f32,
    pub sx: f32,
    pub sy: f32,
    pub sz: f32,
    alpha_modifier: f32,
}

impl Card {
    pub fn new(id: u32, width: f32, height: f32) -> Self {
        Self {
            id,
            width,
            height,
            x: 0.0,
            y: 0.0,
            z: 0.0,
            rx: 0.0,
            ry: 0.0,
            rz: 0.0,
            sx: 1.0,
            sy: 1.0,
            sz: 1.0,
            alpha_modifier: 0.0,
        }
    }

    pub fn set_origin(&mut self, x: f32, y: f32, z: f32) {
        self.x = x;
        self.y = y;
        self.z = z;
    }

    /// Additive alpha dial in `-1.0..=1.0`
    pub fn alpha_modifier(&self) -> f32 {
        self.alpha_modifier
    }

    pub fn set_alpha_modifier(&mut self, value: f32) {
        self.alpha_modifier = value.clamp(-1.0, 1.0);
    }

    /// Local transform: translate * rotate(z, y, x) * scale
    pub fn model_matrix(&self) -> Mat4 {
        Mat4::translation(self.x, self.y, self.z)
            .mul(&Mat4::rotation_z(self.rz))
            .mul(&Mat4::rotation_y(self.ry))
            .mul(&Mat4::rotation_x(self.rx))
            .mul(&Mat4::scale(self.sx, self.sy, self.sz))
    }

    /// Hit test a screen point against this card drawn under `parent`
    ///
    /// Cards seen edge-on or with a collapsed scale are never hit.
    pub fn contains_screen_point(&self, parent: &Mat4, camera: &Camera, screen: Vec2) -> Result<bool, CameraError> {
        let (origin, direction) = camera.screen_ray(screen)?;
        let Some(to_local) = parent.mul(&self.model_matrix()).try_inverse() else {
            return Ok(false);
        };

        let local_origin = to_local.transform_point(origin);
        let local_direction = to_local.transform_point(origin + direction) - local_origin;
        if local_direction.z.abs() <= f32::EPSILON {
            return Ok(false);
        }

        let t = -local_origin.z / local_direction.z;
        if t < 0.0 {
            return Ok(false);
        }
        let hit: Vec3 = local_origin + local_direction * t;
        Ok(hit.x.abs() <= self.width / 2.0 && hit.y.abs() <= self.height / 2.0)
    }
}

impl Animatable for Card {
    fn property(&self, property: TweenProperty) -> Option<f32> {
        Some(match property {
            TweenProperty::X => self.x,
            TweenProperty::Y => self.y,
            TweenProperty::Z => self.z,
            TweenProperty::Rx => self.rx,
            TweenProperty::Ry => self.ry,
            TweenProperty::Rz => self.rz,
            TweenProperty::Sx => self.sx,
            TweenProperty::Sy => self.sy,
            TweenProperty::Sz => self.sz,
            TweenProperty::AlphaModifier => self.alpha_modifier,
        })
    }

    fn set_property(&mut self, property: TweenProperty, value: f32) {
        match property {
            TweenProperty::X => self.x = value,
            TweenProperty::Y => self.y = value,
            TweenProperty::Z => self.z = value,
            TweenProperty::Rx => self.rx = value,
            TweenProperty::Ry => self.ry = value,
            TweenProperty::Rz => self.rz = value,
            TweenProperty::Sx => self.sx = value,
            TweenProperty::Sy => self.sy = value,
            TweenProperty::Sz => self.sz = value,
            TweenProperty::AlphaModifier => self.set_alpha_modifier(value),
        }
    }
}
