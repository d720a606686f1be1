//! Error types for whimsy_animation

use thiserror::Error;

/// Errors returned when a tween is requested
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TweenError {
    /// Duration was zero, negative or not finite
    #[error("tween duration must be positive and finite, got {0}")]
    InvalidDuration(f32),

    /// Easing id outside the fixed curve table
    #[error("unknown easing curve id {0}")]
    UnknownCurveId(i64),

    /// The engine behind a weak handle no longer exists
    #[error("tween engine has been dropped")]
    EngineDropped,

    /// Scheduling was attempted from inside a property write
    #[error("tween engine is busy writing properties")]
    EngineBusy,

    /// The target was mutably borrowed while its start values were read
    #[error("tween target is already borrowed")]
    TargetBusy,
}

/// Result type for whimsy_animation operations
pub type Result<T> = std::result::Result<T, TweenError>;
