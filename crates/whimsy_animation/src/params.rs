//! Tween parameters
//!
//! [`TweenParams`] is the typed request the engine consumes. It can be built
//! directly, from a loose key/value bag, or deserialized from a
//! [`TweenSpec`] in a configuration file.
//!
//! Recognized bag keys: `delay`, `duration`, `easing`, and one key per
//! [`TweenProperty`]. Unknown keys are ignored; a missing property key means
//! the property is left alone.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::easing::Easing;
use crate::error::{Result, TweenError};
use crate::property::TweenProperty;

/// Property targets of a single tween
pub type Targets = SmallVec<[(TweenProperty, f32); 4]>;

/// A fully resolved tween request
#[derive(Clone, Debug, PartialEq)]
pub struct TweenParams {
    /// Seconds before the tween starts writing
    pub delay: f32,
    /// Seconds from first write to completion
    pub duration: f32,
    pub easing: Easing,
    /// End value per property
    pub targets: Targets,
}

impl TweenParams {
    pub fn new(duration: f32) -> Self {
        Self {
            delay: 0.0,
            duration,
            easing: Easing::Linear,
            targets: SmallVec::new(),
        }
    }

    pub fn delay(mut self, delay: f32) -> Self {
        self.delay = delay;
        self
    }

    pub fn easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    /// Animate `property` to `value`. A repeated property keeps the last value.
    pub fn to(mut self, property: TweenProperty, value: f32) -> Self {
        match self.targets.iter_mut().find(|(p, _)| *p == property) {
            Some(slot) => slot.1 = value,
            None => self.targets.push((property, value)),
        }
        self
    }

    /// End value requested for `property`, if any
    pub fn target(&self, property: TweenProperty) -> Option<f32> {
        self.targets.iter().find(|(p, _)| *p == property).map(|(_, v)| *v)
    }

    /// Build from a named-parameter bag
    ///
    /// A bag without `duration` yields a zero duration, which the engine
    /// rejects at schedule time.
    pub fn from_bag<I, K>(bag: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, f64)>,
        K: AsRef<str>,
    {
        let mut params = TweenParams::new(0.0);
        for (key, value) in bag {
            match key.as_ref() {
                "delay" => params.delay = value as f32,
                "duration" => params.duration = value as f32,
                "easing" => params.easing = easing_from_f64(value)?,
                other => match TweenProperty::from_key(other) {
                    Some(property) => params = params.to(property, value as f32),
                    None => tracing::trace!(key = other, "ignoring unknown tween parameter"),
                },
            }
        }
        Ok(params)
    }
}

fn easing_from_f64(value: f64) -> Result<Easing> {
    if value.fract() != 0.0 || value < 0.0 || value > u32::MAX as f64 {
        return Err(TweenError::UnknownCurveId(value as i64));
    }
    Easing::from_id(value as u32)
}

/// Serializable form of a tween request
///
/// ```toml
/// duration = 0.4
/// delay = 0.1
/// easing = 27
/// x = 120.0
/// alphaModifier = -0.5
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TweenSpec {
    pub delay: Option<f32>,
    pub duration: Option<f32>,
    /// Stable curve id
    pub easing: Option<u32>,
    pub x: Option<f32>,
    pub y: Option<f32>,
    pub z: Option<f32>,
    pub rx: Option<f32>,
    pub ry: Option<f32>,
    pub rz: Option<f32>,
    pub sx: Option<f32>,
    pub sy: Option<f32>,
    pub sz: Option<f32>,
    #[serde(rename = "alphaModifier")]
    pub alpha_modifier: Option<f32>,
}

impl TweenSpec {
    /// Resolve into engine parameters, validating the curve id
    pub fn to_params(&self) -> Result<TweenParams> {
        let easing = match self.easing {
            Some(id) => Easing::from_id(id)?,
            None => Easing::Linear,
        };
        let mut params = TweenParams::new(self.duration.unwrap_or(0.0))
            .delay(self.delay.unwrap_or(0.0))
            .easing(easing);

        let fields = [
            (TweenProperty::X, self.x),
            (TweenProperty::Y, self.y),
            (TweenProperty::Z, self.z),
            (TweenProperty::Rx, self.rx),
            (TweenProperty::Ry, self.ry),
            (TweenProperty::Rz, self.rz),
            (TweenProperty::Sx, self.sx),
            (TweenProperty::Sy, self.sy),
            (TweenProperty::Sz, self.sz),
            (TweenProperty::AlphaModifier, self.alpha_modifier),
        ];
        for (property, value) in fields {
            if let Some(value) = value {
                params = params.to(property, value);
            }
        }
        Ok(params)
    }
}
