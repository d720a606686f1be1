//! Gesture vocabulary and per-stack gesture state

use whimsy_animation::TweenBatch;

use crate::card_stack::ShiftDir;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ScrubDir {
    /// Pull the center stack into focus
    In,
    /// Release focus
    Out,
    Up,
    Down,
}

impl ScrubDir {
    pub fn is_depth(self) -> bool {
        matches!(self, ScrubDir::In | ScrubDir::Out)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FlipDir {
    /// Front card flips over the top to the back
    Up,
    /// Back card flips down to the front
    Down,
}

impl FlipDir {
    pub fn shift(self) -> ShiftDir {
        match self {
            FlipDir::Up => ShiftDir::Forward,
            FlipDir::Down => ShiftDir::Backward,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum JumpDir {
    /// The stack advances one slot; the front card goes to the back
    Forward,
    /// The stack retreats one slot; the back card comes to the front
    Backward,
}

impl JumpDir {
    pub fn shift(self) -> ShiftDir {
        match self {
            JumpDir::Forward => ShiftDir::Forward,
            JumpDir::Backward => ShiftDir::Backward,
        }
    }

    /// +1 moving toward the viewer, -1 away
    pub fn sign(self) -> f32 {
        match self {
            JumpDir::Forward => 1.0,
            JumpDir::Backward => -1.0,
        }
    }
}

/// What a stack is doing right now
#[derive(Clone, Debug, Default)]
pub enum GestureState {
    #[default]
    Idle,
    /// Caller-driven; `pct` in `0.0..=1.0`
    Scrubbing { dir: ScrubDir, pct: f32 },
    Flipping { dir: FlipDir, batch: TweenBatch },
    Jumping { dir: JumpDir, batch: TweenBatch },
    /// Easing back to the settled pose after a released scrub
    Settling { batch: TweenBatch },
}

impl GestureState {
    pub fn is_idle(&self) -> bool {
        matches!(self, GestureState::Idle)
    }

    /// Tween batch driving the gesture, if any
    pub fn batch(&self) -> Option<&TweenBatch> {
        match self {
            GestureState::Flipping { batch, .. }
            | GestureState::Jumping { batch, .. }
            | GestureState::Settling { batch } => Some(batch),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            GestureState::Idle => "idle",
            GestureState::Scrubbing { .. } => "scrubbing",
            GestureState::Flipping { .. } => "flipping",
            GestureState::Jumping { .. } => "jumping",
            GestureState::Settling { .. } => "settling",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_directions_map_to_shifts() {
        assert_eq!(FlipDir::Up.shift(), ShiftDir::Forward);
        assert_eq!(FlipDir::Down.shift(), ShiftDir::Backward);
        assert_eq!(JumpDir::Forward.shift(), ShiftDir::Forward);
        assert_eq!(JumpDir::Backward.sign(), -1.0);
    }

    #[test]
    fn test_state_batch_access() {
        assert!(GestureState::default().is_idle());
        let scrub = GestureState::Scrubbing { dir: ScrubDir::In, pct: 0.5 };
        assert!(scrub.batch().is_none());
        assert_eq!(scrub.name(), "scrubbing");

        let flip = GestureState::Flipping {
            dir: FlipDir::Up,
            batch: TweenBatch::silent(),
        };
        assert!(flip.batch().is_some());
    }
}
