//! Error types for whimsy_gallery

use thiserror::Error;
use whimsy_animation::TweenError;

/// Camera configuration problems surfaced by screen/world mapping
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CameraError {
    /// View or projection cannot be inverted
    #[error("degenerate camera: {reason}")]
    DegenerateCamera { reason: &'static str },

    /// The screen ray never meets the requested plane
    #[error("screen ray is parallel to the plane z = {z}")]
    NoIntersection { z: f32 },
}

/// Animator configuration problems
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to parse animator config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("{field} must be positive and finite, got {value}")]
    InvalidDuration { field: &'static str, value: f32 },

    #[error("{field} must be finite, got {value}")]
    InvalidValue { field: &'static str, value: f32 },
}

/// Errors raised by the gallery
#[derive(Error, Debug)]
pub enum GalleryError {
    #[error(transparent)]
    Tween(#[from] TweenError),

    #[error(transparent)]
    Camera(#[from] CameraError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Result type for whimsy_gallery operations
pub type Result<T> = std::result::Result<T, GalleryError>;
