//! Animator configuration
//!
//! Loaded from TOML; every field has a default so a partial file works.
//!
//! ```toml
//! flip_duration = 0.6
//! flip_easing = 27
//! jump_duration = 0.45
//!
//! [stack]
//! step_z = 48.0
//! ```

use serde::{Deserialize, Serialize};
use whimsy_animation::Easing;

use crate::card_stack::StackLayout;
use crate::error::ConfigError;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimatorConfig {
    /// Curve applied to caller-supplied scrub percentages
    pub scrub_easing: Easing,

    /// Seconds for the rotation of a flipping card
    pub flip_duration: f32,
    pub flip_easing: Easing,
    /// Curve of the z arc a flipping card travels
    pub flip_arc_easing: Easing,

    pub jump_duration: f32,
    /// Curve of the vertical leg of a jump
    pub jump_easing_y: Easing,
    /// Curve of the depth leg of a jump
    pub jump_easing_z: Easing,

    /// Center stack scale at full focus
    pub focus_scale: f32,
    /// How far the focused stack moves toward the viewer
    pub zoom_depth: f32,
    /// How far the camera dollies in at full focus
    pub camera_pull: f32,
    /// Side stack slide at full focus, as a fraction of screen width
    pub side_slide: f32,

    /// Lift of the front card at the end of a vertical scrub
    pub lift: f32,
    /// Tilt (radians) of the front card at the end of a vertical scrub
    pub tilt: f32,
    /// Fraction of the lift applied to side stacks
    pub parallax: f32,

    /// Seconds for a released scrub to ease back
    pub settle_duration: f32,
    pub settle_easing: Easing,

    pub stack: StackLayout,
}

impl Default for AnimatorConfig {
    fn default() -> Self {
        Self {
            scrub_easing: Easing::SineOut,
            flip_duration: 0.6,
            flip_easing: Easing::SineInOut,
            flip_arc_easing: Easing::BackIn,
            jump_duration: 0.45,
            jump_easing_y: Easing::SineInOut,
            jump_easing_z: Easing::CubicInOut,
            focus_scale: 1.15,
            zoom_depth: 120.0,
            camera_pull: 80.0,
            side_slide: 0.6,
            lift: 60.0,
            tilt: 0.35,
            parallax: 0.25,
            settle_duration: 0.3,
            settle_easing: Easing::CubicOut,
            stack: StackLayout::default(),
        }
    }
}

impl AnimatorConfig {
    /// Parse and validate a TOML document
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: AnimatorConfig = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let durations = [
            ("flip_duration", self.flip_duration),
            ("jump_duration", self.jump_duration),
            ("settle_duration", self.settle_duration),
        ];
        for (field, value) in durations {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::InvalidDuration { field, value });
            }
        }

        let finite = [
            ("focus_scale", self.focus_scale),
            ("zoom_depth", self.zoom_depth),
            ("camera_pull", self.camera_pull),
            ("side_slide", self.side_slide),
            ("lift", self.lift),
            ("tilt", self.tilt),
            ("parallax", self.parallax),
            ("stack.step_y", self.stack.step_y),
            ("stack.step_z", self.stack.step_z),
            ("stack.fade", self.stack.fade),
        ];
        for (field, value) in finite {
            if !value.is_finite() {
                return Err(ConfigError::InvalidValue { field, value });
            }
        }
        Ok(())
    }
}
