//! Animatable targets
//!
//! The tween engine writes into a closed set of numeric properties. A target
//! exposes the ones it supports through [`Animatable`]; anything it returns
//! `None` for is skipped when a tween is scheduled.

use std::cell::RefCell;
use std::rc::Rc;

/// A numeric property the tween engine can drive
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TweenProperty {
    X,
    Y,
    Z,
    /// Rotation around the x axis, radians
    Rx,
    /// Rotation around the y axis, radians
    Ry,
    /// Rotation around the z axis, radians
    Rz,
    Sx,
    Sy,
    Sz,
    /// Additive alpha in `-1.0..=1.0`
    AlphaModifier,
}

impl TweenProperty {
    pub const ALL: [TweenProperty; 10] = [
        TweenProperty::X,
        TweenProperty::Y,
        TweenProperty::Z,
        TweenProperty::Rx,
        TweenProperty::Ry,
        TweenProperty::Rz,
        TweenProperty::Sx,
        TweenProperty::Sy,
        TweenProperty::Sz,
        TweenProperty::AlphaModifier,
    ];

    /// Key used for this property in a parameter bag
    pub fn key(self) -> &'static str {
        match self {
            TweenProperty::X => "x",
            TweenProperty::Y => "y",
            TweenProperty::Z => "z",
            TweenProperty::Rx => "rx",
            TweenProperty::Ry => "ry",
            TweenProperty::Rz => "rz",
            TweenProperty::Sx => "sx",
            TweenProperty::Sy => "sy",
            TweenProperty::Sz => "sz",
            TweenProperty::AlphaModifier => "alphaModifier",
        }
    }

    pub fn from_key(key: &str) -> Option<TweenProperty> {
        Self::ALL.iter().copied().find(|p| p.key() == key)
    }
}

impl std::fmt::Display for TweenProperty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

/// Capability interface for anything the tween engine can write into
pub trait Animatable {
    /// Current value of `property`, or `None` if the target does not have it
    fn property(&self, property: TweenProperty) -> Option<f32>;

    /// Write `value` into `property`. Unsupported properties are ignored.
    fn set_property(&mut self, property: TweenProperty, value: f32);

    fn supports(&self, property: TweenProperty) -> bool {
        self.property(property).is_some()
    }
}

/// Shared, interior-mutable animation target
///
/// The engine only keeps a weak reference; the owner decides the lifetime.
pub type SharedTarget = Rc<RefCell<dyn Animatable>>;

/// Identity of a shared target, used to key per-property ownership
pub(crate) fn target_key<T: ?Sized>(target: &Rc<RefCell<T>>) -> usize {
    Rc::as_ptr(target) as *const () as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Dot {
        x: f32,
        alpha: f32,
    }

    impl Animatable for Dot {
        fn property(&self, property: TweenProperty) -> Option<f32> {
            match property {
                TweenProperty::X => Some(self.x),
                TweenProperty::AlphaModifier => Some(self.alpha),
                _ => None,
            }
        }

        fn set_property(&mut self, property: TweenProperty, value: f32) {
            match property {
                TweenProperty::X => self.x = value,
                TweenProperty::AlphaModifier => self.alpha = value,
                _ => {}
            }
        }
    }

    #[test]
    fn test_keys_round_trip() {
        for property in TweenProperty::ALL {
            assert_eq!(TweenProperty::from_key(property.key()), Some(property));
        }
        assert_eq!(TweenProperty::from_key("alphaModifier"), Some(TweenProperty::AlphaModifier));
        assert_eq!(TweenProperty::from_key("alpha"), None);
        assert_eq!(TweenProperty::from_key("X"), None);
    }

    #[test]
    fn test_supports_follows_property() {
        let dot = Dot::default();
        assert!(dot.supports(TweenProperty::X));
        assert!(!dot.supports(TweenProperty::Ry));
    }

    #[test]
    fn test_target_key_is_identity() {
        let a: SharedTarget = Rc::new(RefCell::new(Dot::default()));
        let b: SharedTarget = Rc::new(RefCell::new(Dot::default()));
        let a2 = a.clone();
        assert_eq!(target_key(&a), target_key(&a2));
        assert_ne!(target_key(&a), target_key(&b));
    }
}
