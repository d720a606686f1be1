//! Whimsy Gallery
//!
//! A 3D camera, cards and card stacks, and the gesture animator that scrubs,
//! flips and jumps the stacks through the tween engine.
//!
//! # Example
//!
//! ```
//! use whimsy_gallery::{AnimatorConfig, FlipDir, Gallery, GalleryEvent};
//!
//! let mut gallery = Gallery::new(1024.0, 768.0, 3, AnimatorConfig::default()).unwrap();
//! gallery.request_flip(FlipDir::Up);
//! for _ in 0..60 {
//!     gallery.update(1.0 / 60.0).unwrap();
//! }
//! assert_eq!(gallery.drain_events(), vec![GalleryEvent::FlipFinished(FlipDir::Up)]);
//! assert_eq!(gallery.center().borrow().order(), vec![1, 2, 0]);
//! ```

pub mod camera;
pub mod card;
pub mod card_stack;
pub mod config;
pub mod error;
pub mod gallery;
pub mod gesture;
pub mod stack_anim;

pub use camera::{Camera, ProjectionMode};
pub use card::Card;
pub use card_stack::{CardStack, SharedCard, ShiftDir, StackId, StackLayout};
pub use config::AnimatorConfig;
pub use error::{CameraError, ConfigError, GalleryError, Result};
pub use gallery::{FrameClock, Gallery, GalleryEvent, CENTER_STACK, LEFT_STACK, RIGHT_STACK};
pub use gesture::{FlipDir, GestureState, JumpDir, ScrubDir};
pub use stack_anim::{CardStackAnimator, StackPose};
