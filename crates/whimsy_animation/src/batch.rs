//! Batch completion join
//!
//! A [`TweenBatch`] groups tweens that together form one visual step and
//! fires a single callback once every member has finished. Members may have
//! different delays and durations.
//!
//! ```rust
//! use std::{cell::Cell, rc::Rc};
//! use whimsy_animation::{TweenBatch, TweenEngine};
//!
//! let engine = TweenEngine::new();
//! let done = Rc::new(Cell::new(false));
//! let flag = done.clone();
//! let batch = TweenBatch::new(move || flag.set(true));
//! batch.timer(&engine, 0.0, 0.25).unwrap();
//! batch.timer(&engine, 0.1, 0.5).unwrap();
//!
//! engine.advance(0.3);
//! assert!(!done.get());
//! engine.advance(0.5);
//! assert!(done.get());
//! ```

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use smallvec::SmallVec;
use tracing::debug;

use crate::engine::{Completion, Scheduler, TweenId};
use crate::error::Result;
use crate::params::TweenParams;
use crate::property::SharedTarget;

struct BatchInner {
    members: RefCell<SmallVec<[TweenId; 4]>>,
    pending: Cell<usize>,
    on_complete: RefCell<Option<Completion>>,
    cancelled: Cell<bool>,
}

/// Join over several tweens with one completion
///
/// A member whose every property is superseded by another tween never
/// finishes, so the batch stays open until cancelled.
#[derive(Clone)]
pub struct TweenBatch {
    inner: Rc<BatchInner>,
}

impl TweenBatch {
    pub fn new(on_complete: impl FnOnce() + 'static) -> Self {
        Self {
            inner: Rc::new(BatchInner {
                members: RefCell::new(SmallVec::new()),
                pending: Cell::new(0),
                on_complete: RefCell::new(Some(Box::new(on_complete))),
                cancelled: Cell::new(false),
            }),
        }
    }

    /// A batch with no callback, useful only as a join handle
    pub fn silent() -> Self {
        Self::new(|| {})
    }

    /// Schedule a member tween on `target`
    pub fn schedule(&self, engine: &impl Scheduler, target: SharedTarget, params: TweenParams) -> Result<TweenId> {
        self.add(engine, Some(target), params)
    }

    /// Add a member that only waits, keeping the batch open
    pub fn timer(&self, engine: &impl Scheduler, delay: f32, duration: f32) -> Result<TweenId> {
        self.add(engine, None, TweenParams::new(duration).delay(delay))
    }

    fn add(&self, engine: &impl Scheduler, target: Option<SharedTarget>, params: TweenParams) -> Result<TweenId> {
        let inner = Rc::clone(&self.inner);
        let member_done: Completion = Box::new(move || member_finished(&inner));

        self.inner.pending.set(self.inner.pending.get() + 1);
        match engine.submit(target, params, Some(member_done)) {
            Ok(id) => {
                self.inner.members.borrow_mut().push(id);
                Ok(id)
            }
            Err(err) => {
                self.inner.pending.set(self.inner.pending.get() - 1);
                Err(err)
            }
        }
    }

    /// Cancel every member; the batch callback never fires
    pub fn cancel(&self, engine: &impl Scheduler) {
        if self.inner.cancelled.replace(true) {
            return;
        }
        let members = std::mem::take(&mut *self.inner.members.borrow_mut());
        let cancelled = members.into_iter().filter(|id| engine.cancel(*id)).count();
        self.inner.on_complete.borrow_mut().take();
        debug!(cancelled, "tween batch cancelled");
    }

    /// Whether the batch callback has fired
    pub fn is_complete(&self) -> bool {
        !self.inner.cancelled.get() && self.inner.pending.get() == 0 && self.inner.on_complete.borrow().is_none()
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.get()
    }

    /// Members still running
    pub fn pending(&self) -> usize {
        self.inner.pending.get()
    }

    pub fn members(&self) -> SmallVec<[TweenId; 4]> {
        self.inner.members.borrow().clone()
    }
}

impl std::fmt::Debug for TweenBatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TweenBatch")
            .field("pending", &self.inner.pending.get())
            .field("cancelled", &self.inner.cancelled.get())
            .finish()
    }
}

fn member_finished(inner: &BatchInner) {
    let remaining = inner.pending.get().saturating_sub(1);
    inner.pending.set(remaining);
    if remaining > 0 || inner.cancelled.get() {
        return;
    }
    // Release the borrow before running user code
    let on_complete = inner.on_complete.borrow_mut().take();
    if let Some(on_complete) = on_complete {
        on_complete();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::property::{Animatable, TweenProperty};
    use crate::{TweenEngine, TweenError};

    #[derive(Default)]
    struct Flipper {
        rx: f32,
        z: f32,
    }

    impl Animatable for Flipper {
        fn property(&self, property: TweenProperty) -> Option<f32> {
            match property {
                TweenProperty::Rx => Some(self.rx),
                TweenProperty::Z => Some(self.z),
                _ => None,
            }
        }

        fn set_property(&mut self, property: TweenProperty, value: f32) {
            match property {
                TweenProperty::Rx => self.rx = value,
                TweenProperty::Z => self.z = value,
                _ => {}
            }
        }
    }

    fn counting_batch() -> (Rc<Cell<u32>>, TweenBatch) {
        let count = Rc::new(Cell::new(0));
        let inner = count.clone();
        (count, TweenBatch::new(move || inner.set(inner.get() + 1)))
    }

    #[test]
    fn test_fires_once_after_slowest_member() {
        let engine = TweenEngine::new();
        let card = Rc::new(RefCell::new(Flipper::default()));
        let (fired, batch) = counting_batch();

        batch
            .schedule(&engine, card.clone(), TweenParams::new(0.5).to(TweenProperty::Rx, 1.5))
            .unwrap();
        batch
            .schedule(&engine, card.clone(), TweenParams::new(0.8).to(TweenProperty::Z, -40.0))
            .unwrap();
        assert_eq!(batch.pending(), 2);

        engine.advance(0.5);
        assert_eq!(card.borrow().rx, 1.5);
        assert_eq!(batch.pending(), 1);
        assert_eq!(fired.get(), 0);

        engine.advance(0.3);
        assert_eq!(card.borrow().z, -40.0);
        assert_eq!(fired.get(), 1);
        assert!(batch.is_complete());

        engine.advance(1.0);
        assert_eq!(fired.get(), 1);
    }

    #[test]
    fn test_cancel_suppresses_callback() {
        let engine = TweenEngine::new();
        let card = Rc::new(RefCell::new(Flipper::default()));
        let (fired, batch) = counting_batch();
        batch
            .schedule(&engine, card.clone(), TweenParams::new(1.0).to(TweenProperty::Rx, 1.0))
            .unwrap();
        batch.timer(&engine, 0.0, 0.2).unwrap();

        engine.advance(0.5);
        batch.cancel(&engine);
        batch.cancel(&engine);
        assert!(engine.is_empty());

        engine.advance(1.0);
        assert_eq!(fired.get(), 0);
        assert!(batch.is_cancelled());
        assert!(!batch.is_complete());
    }

    #[test]
    fn test_failed_member_does_not_hold_batch_open() {
        let engine = TweenEngine::new();
        let (fired, batch) = counting_batch();

        assert!(matches!(batch.timer(&engine, 0.0, 0.0), Err(TweenError::InvalidDuration(_))));
        batch.timer(&engine, 0.0, 0.1).unwrap();
        assert_eq!(batch.pending(), 1);

        engine.advance(0.1);
        assert_eq!(fired.get(), 1);
    }
}
