//! Whimsy Animation
//!
//! Frame-driven property tweens with classic easing curves.
//!
//! # Features
//!
//! - **Easing**: the 31-curve table (`linear`, `back`, `bounce`, `circ`,
//!   `cubic`, `elastic`, `expo`, `quad`, `quart`, `quint`, `sine`) addressed by
//!   stable integer ids
//! - **Animatable targets**: a closed set of numeric properties exposed through
//!   a small capability trait
//! - **Tween engine**: delay / duration / easing per tween, per-property
//!   supersession, cancellation, completions fired after the frame's writes
//! - **Batches**: one completion for a group of tweens with mixed timings
//! - **Parameter bags**: build tweens from key/value pairs or TOML
//!
//! # Example
//!
//! ```rust
//! use std::{cell::RefCell, rc::Rc};
//! use whimsy_animation::{Animatable, Easing, TweenEngine, TweenParams, TweenProperty};
//!
//! #[derive(Default)]
//! struct Dot { x: f32 }
//!
//! impl Animatable for Dot {
//!     fn property(&self, p: TweenProperty) -> Option<f32> {
//!         (p == TweenProperty::X).then_some(self.x)
//!     }
//!     fn set_property(&mut self, p: TweenProperty, v: f32) {
//!         if p == TweenProperty::X { self.x = v; }
//!     }
//! }
//!
//! let engine = TweenEngine::new();
//! let dot = Rc::new(RefCell::new(Dot::default()));
//! engine
//!     .schedule(dot.clone(), TweenParams::new(2.0).easing(Easing::Linear).to(TweenProperty::X, 100.0))
//!     .unwrap();
//!
//! engine.advance(1.0);
//! assert!((dot.borrow().x - 50.0).abs() < 1e-4);
//! ```

pub mod batch;
pub mod easing;
pub mod engine;
pub mod error;
pub mod params;
pub mod property;

pub use batch::TweenBatch;
pub use easing::Easing;
pub use engine::{Completion, EngineHandle, Scheduler, TweenEngine, TweenId};
pub use error::{Result, TweenError};
pub use params::{Targets, TweenParams, TweenSpec};
pub use property::{Animatable, SharedTarget, TweenProperty};
