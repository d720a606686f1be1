//! Easing curves
//!
//! Every curve has the classic `(t, b, c, d)` shape: elapsed time, base value,
//! change in value and total duration. Curves are pure and assume `d > 0`;
//! the tween engine rejects zero durations before a curve is ever evaluated.
//!
//! Curves are addressed by a stable integer id so they can be stored in
//! configuration files. The ids below are persisted and must never be
//! reordered; new curves are appended.
//!
//! | id | curve | id | curve | id | curve |
//! |----|-------|----|-------|----|-------|
//! | 0 | Linear | 11 | CubicOut | 22 | QuintIn |
//! | 1 | BackIn | 12 | CubicInOut | 23 | QuintOut |
//! | 2 | BackOut | 13 | ElasticIn | 24 | QuintInOut |
//! | 3 | BackInOut | 14 | ElasticOut | 25 | SineIn |
//! | 4 | BounceIn | 15 | ElasticInOut | 26 | SineOut |
//! | 5 | BounceOut | 16 | ExpoIn | 27 | SineInOut |
//! | 6 | BounceInOut | 17 | ExpoOut | 28 | QuadIn |
//! | 7 | CircIn | 18 | ExpoInOut | 29 | QuadOut |
//! | 8 | CircOut | 19 | QuartIn | 30 | QuadInOut |
//! | 9 | CircInOut | 20 | QuartOut | | |
//! | 10 | CubicIn | 21 | QuartInOut | | |
//!
//! Back and elastic curves overshoot `[b, b + c]` on purpose.

use std::f32::consts::{FRAC_PI_2, PI, TAU};

use serde::{Deserialize, Serialize};

use crate::error::TweenError;

/// Overshoot amount used by the back curves (10% overshoot)
const BACK_OVERSHOOT: f32 = 1.70158;

/// Easing curve selector
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
#[repr(u32)]
pub enum Easing {
    #[default]
    Linear = 0,
    BackIn = 1,
    BackOut = 2,
    BackInOut = 3,
    BounceIn = 4,
    BounceOut = 5,
    BounceInOut = 6,
    CircIn = 7,
    CircOut = 8,
    CircInOut = 9,
    CubicIn = 10,
    CubicOut = 11,
    CubicInOut = 12,
    ElasticIn = 13,
    ElasticOut = 14,
    ElasticInOut = 15,
    ExpoIn = 16,
    ExpoOut = 17,
    ExpoInOut = 18,
    QuartIn = 19,
    QuartOut = 20,
    QuartInOut = 21,
    QuintIn = 22,
    QuintOut = 23,
    QuintInOut = 24,
    SineIn = 25,
    SineOut = 26,
    SineInOut = 27,
    QuadIn = 28,
    QuadOut = 29,
    QuadInOut = 30,
}

impl Easing {
    /// All curves, indexed by id
    pub const ALL: [Easing; 31] = [
        Easing::Linear,
        Easing::BackIn,
        Easing::BackOut,
        Easing::BackInOut,
        Easing::BounceIn,
        Easing::BounceOut,
        Easing::BounceInOut,
        Easing::CircIn,
        Easing::CircOut,
        Easing::CircInOut,
        Easing::CubicIn,
        Easing::CubicOut,
        Easing::CubicInOut,
        Easing::ElasticIn,
        Easing::ElasticOut,
        Easing::ElasticInOut,
        Easing::ExpoIn,
        Easing::ExpoOut,
        Easing::ExpoInOut,
        Easing::QuartIn,
        Easing::QuartOut,
        Easing::QuartInOut,
        Easing::QuintIn,
        Easing::QuintOut,
        Easing::QuintInOut,
        Easing::SineIn,
        Easing::SineOut,
        Easing::SineInOut,
        Easing::QuadIn,
        Easing::QuadOut,
        Easing::QuadInOut,
    ];

    /// Stable id of this curve
    pub fn id(self) -> u32 {
        self as u32
    }

    /// Look up a curve by its stable id
    pub fn from_id(id: u32) -> Result<Easing, TweenError> {
        Self::ALL
            .get(id as usize)
            .copied()
            .ok_or(TweenError::UnknownCurveId(id as i64))
    }

    pub fn name(self) -> &'static str {
        match self {
            Easing::Linear => "linear",
            Easing::BackIn => "back-in",
            Easing::BackOut => "back-out",
            Easing::BackInOut => "back-in-out",
            Easing::BounceIn => "bounce-in",
            Easing::BounceOut => "bounce-out",
            Easing::BounceInOut => "bounce-in-out",
            Easing::CircIn => "circ-in",
            Easing::CircOut => "circ-out",
            Easing::CircInOut => "circ-in-out",
            Easing::CubicIn => "cubic-in",
            Easing::CubicOut => "cubic-out",
            Easing::CubicInOut => "cubic-in-out",
            Easing::ElasticIn => "elastic-in",
            Easing::ElasticOut => "elastic-out",
            Easing::ElasticInOut => "elastic-in-out",
            Easing::ExpoIn => "expo-in",
            Easing::ExpoOut => "expo-out",
            Easing::ExpoInOut => "expo-in-out",
            Easing::QuartIn => "quart-in",
            Easing::QuartOut => "quart-out",
            Easing::QuartInOut => "quart-in-out",
            Easing::QuintIn => "quint-in",
            Easing::QuintOut => "quint-out",
            Easing::QuintInOut => "quint-in-out",
            Easing::SineIn => "sine-in",
            Easing::SineOut => "sine-out",
            Easing::SineInOut => "sine-in-out",
            Easing::QuadIn => "quad-in",
            Easing::QuadOut => "quad-out",
            Easing::QuadInOut => "quad-in-out",
        }
    }

    /// Whether the curve intentionally leaves `[b, b + c]` mid-flight
    pub fn overshoots(self) -> bool {
        matches!(
            self,
            Easing::BackIn
                | Easing::BackOut
                | Easing::BackInOut
                | Easing::ElasticIn
                | Easing::ElasticOut
                | Easing::ElasticInOut
        )
    }

    /// Evaluate the curve at elapsed time `t` of `d`, from `b` by `c`
    pub fn apply(self, t: f32, b: f32, c: f32, d: f32) -> f32 {
        match self {
            Easing::Linear => linear(t, b, c, d),
            Easing::BackIn => back_in(t, b, c, d),
            Easing::BackOut => back_out(t, b, c, d),
            Easing::BackInOut => back_in_out(t, b, c, d),
            Easing::BounceIn => bounce_in(t, b, c, d),
            Easing::BounceOut => bounce_out(t, b, c, d),
            Easing::BounceInOut => bounce_in_out(t, b, c, d),
            Easing::CircIn => circ_in(t, b, c, d),
            Easing::CircOut => circ_out(t, b, c, d),
            Easing::CircInOut => circ_in_out(t, b, c, d),
            Easing::CubicIn => cubic_in(t, b, c, d),
            Easing::CubicOut => cubic_out(t, b, c, d),
            Easing::CubicInOut => cubic_in_out(t, b, c, d),
            Easing::ElasticIn => elastic_in(t, b, c, d),
            Easing::ElasticOut => elastic_out(t, b, c, d),
            Easing::ElasticInOut => elastic_in_out(t, b, c, d),
            Easing::ExpoIn => expo_in(t, b, c, d),
            Easing::ExpoOut => expo_out(t, b, c, d),
            Easing::ExpoInOut => expo_in_out(t, b, c, d),
            Easing::QuartIn => quart_in(t, b, c, d),
            Easing::QuartOut => quart_out(t, b, c, d),
            Easing::QuartInOut => quart_in_out(t, b, c, d),
            Easing::QuintIn => quint_in(t, b, c, d),
            Easing::QuintOut => quint_out(t, b, c, d),
            Easing::QuintInOut => quint_in_out(t, b, c, d),
            Easing::SineIn => sine_in(t, b, c, d),
            Easing::SineOut => sine_out(t, b, c, d),
            Easing::SineInOut => sine_in_out(t, b, c, d),
            Easing::QuadIn => quad_in(t, b, c, d),
            Easing::QuadOut => quad_out(t, b, c, d),
            Easing::QuadInOut => quad_in_out(t, b, c, d),
        }
    }

    /// Normalized form: maps progress `0..=1` to eased progress
    pub fn ease(self, progress: f32) -> f32 {
        self.apply(progress.clamp(0.0, 1.0), 0.0, 1.0, 1.0)
    }
}

impl From<Easing> for u32 {
    fn from(easing: Easing) -> u32 {
        easing.id()
    }
}

impl TryFrom<u32> for Easing {
    type Error = TweenError;

    fn try_from(id: u32) -> Result<Self, Self::Error> {
        Easing::from_id(id)
    }
}

// ============================================================================
// Curves
// ============================================================================

pub fn linear(t: f32, b: f32, c: f32, d: f32) -> f32 {
    c * t / d + b
}

pub fn back_in(t: f32, b: f32, c: f32, d: f32) -> f32 {
    let s = BACK_OVERSHOOT;
    let t = t / d;
    c * t * t * ((s + 1.0) * t - s) + b
}

pub fn back_out(t: f32, b: f32, c: f32, d: f32) -> f32 {
    let s = BACK_OVERSHOOT;
    let t = t / d - 1.0;
    c * (t * t * ((s + 1.0) * t + s) + 1.0) + b
}

pub fn back_in_out(t: f32, b: f32, c: f32, d: f32) -> f32 {
    let s = BACK_OVERSHOOT * 1.525;
    let t = t / (d / 2.0);
    if t < 1.0 {
        c / 2.0 * (t * t * ((s + 1.0) * t - s)) + b
    } else {
        let t = t - 2.0;
        c / 2.0 * (t * t * ((s + 1.0) * t + s) + 2.0) + b
    }
}

pub fn bounce_out(t: f32, b: f32, c: f32, d: f32) -> f32 {
    let t = t / d;
    if t < 1.0 / 2.75 {
        c * (7.5625 * t * t) + b
    } else if t < 2.0 / 2.75 {
        let t = t - 1.5 / 2.75;
        c * (7.5625 * t * t + 0.75) + b
    } else if t < 2.5 / 2.75 {
        let t = t - 2.25 / 2.75;
        c * (7.5625 * t * t + 0.9375) + b
    } else {
        let t = t - 2.625 / 2.75;
        c * (7.5625 * t * t + 0.984375) + b
    }
}

pub fn bounce_in(t: f32, b: f32, c: f32, d: f32) -> f32 {
    c - bounce_out(d - t, 0.0, c, d) + b
}

pub fn bounce_in_out(t: f32, b: f32, c: f32, d: f32) -> f32 {
    if t < d / 2.0 {
        bounce_in(t * 2.0, 0.0, c, d) * 0.5 + b
    } else {
        bounce_out(t * 2.0 - d, 0.0, c, d) * 0.5 + c * 0.5 + b
    }
}

pub fn circ_in(t: f32, b: f32, c: f32, d: f32) -> f32 {
    let t = t / d;
    -c * ((1.0 - t * t).max(0.0).sqrt() - 1.0) + b
}

pub fn circ_out(t: f32, b: f32, c: f32, d: f32) -> f32 {
    let t = t / d - 1.0;
    c * (1.0 - t * t).max(0.0).sqrt() + b
}

pub fn circ_in_out(t: f32, b: f32, c: f32, d: f32) -> f32 {
    let t = t / (d / 2.0);
    if t < 1.0 {
        -c / 2.0 * ((1.0 - t * t).max(0.0).sqrt() - 1.0) + b
    } else {
        let t = t - 2.0;
        c / 2.0 * ((1.0 - t * t).max(0.0).sqrt() + 1.0) + b
    }
}

pub fn cubic_in(t: f32, b: f32, c: f32, d: f32) -> f32 {
    let t = t / d;
    c * t * t * t + b
}

pub fn cubic_out(t: f32, b: f32, c: f32, d: f32) -> f32 {
    let t = t / d - 1.0;
    c * (t * t * t + 1.0) + b
}

pub fn cubic_in_out(t: f32, b: f32, c: f32, d: f32) -> f32 {
    let t = t / (d / 2.0);
    if t < 1.0 {
        c / 2.0 * t * t * t + b
    } else {
        let t = t - 2.0;
        c / 2.0 * (t * t * t + 2.0) + b
    }
}

pub fn elastic_in(t: f32, b: f32, c: f32, d: f32) -> f32 {
    if t == 0.0 {
        return b;
    }
    let t = t / d;
    if t == 1.0 {
        return b + c;
    }
    let p = d * 0.3;
    let s = p / 4.0;
    let t = t - 1.0;
    -(c * 2f32.powf(10.0 * t) * ((t * d - s) * TAU / p).sin()) + b
}

pub fn elastic_out(t: f32, b: f32, c: f32, d: f32) -> f32 {
    if t == 0.0 {
        return b;
    }
    let t = t / d;
    if t == 1.0 {
        return b + c;
    }
    let p = d * 0.3;
    let s = p / 4.0;
    c * 2f32.powf(-10.0 * t) * ((t * d - s) * TAU / p).sin() + c + b
}

pub fn elastic_in_out(t: f32, b: f32, c: f32, d: f32) -> f32 {
    if t == 0.0 {
        return b;
    }
    let t = t / (d / 2.0);
    if t == 2.0 {
        return b + c;
    }
    let p = d * (0.3 * 1.5);
    let s = p / 4.0;
    let t = t - 1.0;
    let wave = ((t * d - s) * TAU / p).sin();
    if t < 0.0 {
        -0.5 * (c * 2f32.powf(10.0 * t) * wave) + b
    } else {
        c * 2f32.powf(-10.0 * t) * wave * 0.5 + c + b
    }
}

pub fn expo_in(t: f32, b: f32, c: f32, d: f32) -> f32 {
    if t == 0.0 {
        b
    } else {
        c * 2f32.powf(10.0 * (t / d - 1.0)) + b
    }
}

pub fn expo_out(t: f32, b: f32, c: f32, d: f32) -> f32 {
    if t == d {
        b + c
    } else {
        c * (1.0 - 2f32.powf(-10.0 * t / d)) + b
    }
}

pub fn expo_in_out(t: f32, b: f32, c: f32, d: f32) -> f32 {
    if t == 0.0 {
        return b;
    }
    if t == d {
        return b + c;
    }
    let t = t / (d / 2.0);
    if t < 1.0 {
        c / 2.0 * 2f32.powf(10.0 * (t - 1.0)) + b
    } else {
        c / 2.0 * (2.0 - 2f32.powf(-10.0 * (t - 1.0))) + b
    }
}

pub fn quad_in(t: f32, b: f32, c: f32, d: f32) -> f32 {
    let t = t / d;
    c * t * t + b
}

pub fn quad_out(t: f32, b: f32, c: f32, d: f32) -> f32 {
    let t = t / d;
    -c * t * (t - 2.0) + b
}

pub fn quad_in_out(t: f32, b: f32, c: f32, d: f32) -> f32 {
    let t = t / (d / 2.0);
    if t < 1.0 {
        c / 2.0 * t * t + b
    } else {
        let t = t - 1.0;
        -c / 2.0 * (t * (t - 2.0) - 1.0) + b
    }
}

pub fn quart_in(t: f32, b: f32, c: f32, d: f32) -> f32 {
    let t = t / d;
    c * t * t * t * t + b
}

pub fn quart_out(t: f32, b: f32, c: f32, d: f32) -> f32 {
    let t = t / d - 1.0;
    -c * (t * t * t * t - 1.0) + b
}

pub fn quart_in_out(t: f32, b: f32, c: f32, d: f32) -> f32 {
    let t = t / (d / 2.0);
    if t < 1.0 {
        c / 2.0 * t * t * t * t + b
    } else {
        let t = t - 2.0;
        -c / 2.0 * (t * t * t * t - 2.0) + b
    }
}

pub fn quint_in(t: f32, b: f32, c: f32, d: f32) -> f32 {
    let t = t / d;
    c * t * t * t * t * t + b
}

pub fn quint_out(t: f32, b: f32, c: f32, d: f32) -> f32 {
    let t = t / d - 1.0;
    c * (t * t * t * t * t + 1.0) + b
}

pub fn quint_in_out(t: f32, b: f32, c: f32, d: f32) -> f32 {
    let t = t / (d / 2.0);
    if t < 1.0 {
        c / 2.0 * t * t * t * t * t + b
    } else {
        let t = t - 2.0;
        c / 2.0 * (t * t * t * t * t + 2.0) + b
    }
}

pub fn sine_in(t: f32, b: f32, c: f32, d: f32) -> f32 {
    -c * (t / d * FRAC_PI_2).cos() + c + b
}

pub fn sine_out(t: f32, b: f32, c: f32, d: f32) -> f32 {
    c * (t / d * FRAC_PI_2).sin() + b
}

pub fn sine_in_out(t: f32, b: f32, c: f32, d: f32) -> f32 {
    -c / 2.0 * ((PI * t / d).cos() - 1.0) + b
}
