//! Tween engine
//!
//! Owns every active property tween and advances them once per frame.
//!
//! - Tweens are registered with [`TweenEngine::schedule`] and addressed by a
//!   generation-checked [`TweenId`], so stale ids are harmless.
//! - Each (target, property) pair has at most one owning tween. Scheduling a
//!   new tween for a property removes that property from the previous owner;
//!   an owner left with nothing to animate is dropped without completing.
//! - Targets are held weakly. A tween whose target was dropped is retired
//!   silently.
//!
//! # Frame semantics
//!
//! [`TweenEngine::advance`] works in two phases. First every tween is stepped
//! and its properties written, in scheduling order. Then, with the engine no
//! longer borrowed, completions fire in the same order. A completion may
//! schedule or cancel tweens (through the engine or an [`EngineHandle`]);
//! tweens scheduled there are first stepped by the next `advance`.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use rustc_hash::FxHashMap;
use slotmap::{new_key_type, SlotMap};
use smallvec::SmallVec;
use tracing::{debug, trace, warn};

use crate::easing::Easing;
use crate::error::{Result, TweenError};
use crate::params::TweenParams;
use crate::property::{target_key, Animatable, SharedTarget, TweenProperty};

new_key_type! {
    /// Handle to a scheduled tween
    pub struct TweenId;
}

/// Callback fired once when a tween reaches its end
pub type Completion = Box<dyn FnOnce() + 'static>;

/// One animated property of a tween
#[derive(Clone, Copy, Debug)]
struct Track {
    property: TweenProperty,
    start: f32,
    end: f32,
}

struct Tween {
    /// `None` for pure timers
    target: Option<Weak<RefCell<dyn Animatable>>>,
    target_key: usize,
    tracks: SmallVec<[Track; 4]>,
    delay: f32,
    duration: f32,
    elapsed: f32,
    easing: Easing,
    completion: Option<Completion>,
}

impl Tween {
    /// Active time clamped to `0..=duration`
    fn local_time(&self) -> f32 {
        (self.elapsed - self.delay).clamp(0.0, self.duration)
    }
}

#[derive(Default)]
struct EngineInner {
    tweens: SlotMap<TweenId, Tween>,
    /// Scheduling order; may hold ids already removed
    order: Vec<TweenId>,
    /// Current owner of each (target, property) pair
    owners: FxHashMap<(usize, TweenProperty), TweenId>,
    frame: u64,
}

impl EngineInner {
    fn schedule(
        &mut self,
        target: Option<SharedTarget>,
        params: TweenParams,
        completion: Option<Completion>,
    ) -> Result<TweenId> {
        if !(params.duration.is_finite() && params.duration > 0.0) {
            return Err(TweenError::InvalidDuration(params.duration));
        }
        let delay = if params.delay.is_finite() { params.delay.max(0.0) } else { 0.0 };

        let mut tracks = SmallVec::new();
        let key = target.as_ref().map(target_key).unwrap_or(0);
        if let Some(target) = &target {
            let current = target.try_borrow().map_err(|_| TweenError::TargetBusy)?;
            for &(property, end) in &params.targets {
                match current.property(property) {
                    Some(start) => tracks.push(Track { property, start, end }),
                    None => warn!(%property, "target does not support property, skipped"),
                }
            }
        }

        let id = self.tweens.insert(Tween {
            target: target.as_ref().map(Rc::downgrade),
            target_key: key,
            tracks,
            delay,
            duration: params.duration,
            elapsed: 0.0,
            easing: params.easing,
            completion,
        });

        let properties: SmallVec<[TweenProperty; 4]> =
            self.tweens[id].tracks.iter().map(|track| track.property).collect();
        for property in properties {
            if let Some(previous) = self.owners.insert((key, property), id) {
                self.supersede(previous, property);
            }
        }

        self.order.push(id);
        trace!(
            ?id,
            duration = params.duration,
            delay,
            easing = params.easing.name(),
            "tween scheduled"
        );
        Ok(id)
    }

    /// Drop `property` from `previous`; an emptied tween is removed silently
    fn supersede(&mut self, previous: TweenId, property: TweenProperty) {
        let Some(tween) = self.tweens.get_mut(previous) else {
            return;
        };
        tween.tracks.retain(|track| track.property != property);
        debug!(?previous, %property, "property superseded");
        if tween.tracks.is_empty() {
            self.tweens.remove(previous);
            debug!(?previous, "tween superseded entirely");
        }
    }

    /// Remove a tween and its ownership entries, returning its completion
    fn retire(&mut self, id: TweenId) -> Option<Option<Completion>> {
        let tween = self.tweens.remove(id)?;
        for track in &tween.tracks {
            let slot = (tween.target_key, track.property);
            if self.owners.get(&slot) == Some(&id) {
                self.owners.remove(&slot);
            }
        }
        Some(tween.completion)
    }

    fn progress(&self, id: TweenId) -> Option<f32> {
        self.tweens.get(id).map(|tween| tween.local_time() / tween.duration)
    }

    fn cancel(&mut self, id: TweenId) -> bool {
        let cancelled = self.retire(id).is_some();
        if cancelled {
            debug!(?id, "tween cancelled");
        }
        cancelled
    }

    fn compact(&mut self) {
        let EngineInner { tweens, order, .. } = self;
        order.retain(|id| tweens.contains_key(*id));
    }

    /// Phase one of a frame: step, write, and collect finished completions
    fn step(&mut self, dt: f32) -> Vec<Completion> {
        self.frame += 1;
        let mut finished = Vec::new();
        let mut dead = Vec::new();

        for index in 0..self.order.len() {
            let id = self.order[index];
            let Some(tween) = self.tweens.get_mut(id) else {
                continue;
            };

            tween.elapsed += dt;
            if tween.elapsed < tween.delay {
                continue;
            }
            let t = tween.local_time();
            let done = t >= tween.duration;

            if let Some(weak) = &tween.target {
                let Some(target) = weak.upgrade() else {
                    dead.push(id);
                    continue;
                };
                match target.try_borrow_mut() {
                    Ok(mut target) => {
                        for track in &tween.tracks {
                            let value = if done {
                                track.end
                            } else {
                                tween.easing.apply(t, track.start, track.end - track.start, tween.duration)
                            };
                            target.set_property(track.property, value);
                        }
                    }
                    Err(_) => warn!(?id, "tween target is borrowed, write skipped"),
                };
            }

            if done {
                finished.push(id);
            }
        }

        for id in dead {
            if self.retire(id).is_some() {
                debug!(?id, "tween target dropped, retired");
            }
        }

        let mut completions = Vec::with_capacity(finished.len());
        for id in finished {
            if let Some(completion) = self.retire(id) {
                trace!(?id, frame = self.frame, "tween finished");
                completions.extend(completion);
            }
        }

        self.compact();
        completions
    }
}

/// Frame-driven property tween engine
///
/// Single-threaded; all calls happen on the frame loop. Cloning is not
/// offered, share access through [`TweenEngine::handle`].
#[derive(Default)]
pub struct TweenEngine {
    inner: Rc<RefCell<EngineInner>>,
}

impl TweenEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Weak handle for use inside completions and long-lived owners
    pub fn handle(&self) -> EngineHandle {
        EngineHandle {
            inner: Rc::downgrade(&self.inner),
        }
    }

    /// Schedule a tween on `target`
    ///
    /// Start values are read from the target now. Properties the target does
    /// not support are skipped.
    pub fn schedule(&self, target: SharedTarget, params: TweenParams) -> Result<TweenId> {
        schedule_into(&self.inner, Some(target), params, None)
    }

    /// Schedule a tween on `target` and call `on_complete` once it finishes
    pub fn schedule_with(
        &self,
        target: SharedTarget,
        params: TweenParams,
        on_complete: impl FnOnce() + 'static,
    ) -> Result<TweenId> {
        schedule_into(&self.inner, Some(target), params, Some(Box::new(on_complete)))
    }

    /// A tween with no target: waits `delay + duration`, then completes
    pub fn timer(&self, delay: f32, duration: f32, on_complete: impl FnOnce() + 'static) -> Result<TweenId> {
        let params = TweenParams::new(duration).delay(delay);
        schedule_into(&self.inner, None, params, Some(Box::new(on_complete)))
    }

    /// Advance every tween by `dt` seconds and fire completions
    ///
    /// Returns whether tweens remain active afterwards.
    pub fn advance(&self, dt: f32) -> bool {
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };

        let completions = match self.inner.try_borrow_mut() {
            Ok(mut inner) => inner.step(dt),
            Err(_) => {
                warn!("advance called while the engine is busy, frame skipped");
                return self.has_active();
            }
        };

        for completion in completions {
            completion();
        }

        self.has_active()
    }

    /// Cancel a tween without firing its completion
    ///
    /// Properties keep their last written values. Returns `false` if the
    /// tween already finished or was cancelled.
    pub fn cancel(&self, id: TweenId) -> bool {
        cancel_in(&self.inner, id)
    }

    /// Cancel every tween writing to `target`
    pub fn cancel_target<T: ?Sized>(&self, target: &Rc<RefCell<T>>) -> usize {
        let key = target_key(target);
        let Ok(mut inner) = self.inner.try_borrow_mut() else {
            warn!("cancel_target during property writes ignored");
            return 0;
        };
        let ids: Vec<TweenId> = inner
            .tweens
            .iter()
            .filter(|(_, tween)| tween.target.is_some() && tween.target_key == key)
            .map(|(id, _)| id)
            .collect();
        ids.into_iter().filter(|id| inner.cancel(*id)).count()
    }

    pub fn cancel_all(&self) {
        let Ok(mut inner) = self.inner.try_borrow_mut() else {
            warn!("cancel_all during property writes ignored");
            return;
        };
        let count = inner.tweens.len();
        inner.tweens.clear();
        inner.order.clear();
        inner.owners.clear();
        debug!(count, "all tweens cancelled");
    }

    /// Queries made while the engine is writing properties see nothing
    pub fn is_active(&self, id: TweenId) -> bool {
        peek(&self.inner, |inner| inner.tweens.contains_key(id)).unwrap_or(false)
    }

    /// Linear progress of a tween in `0.0..=1.0`, ignoring easing
    pub fn progress(&self, id: TweenId) -> Option<f32> {
        peek(&self.inner, |inner| inner.progress(id)).flatten()
    }

    pub fn len(&self) -> usize {
        peek(&self.inner, |inner| inner.tweens.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn has_active(&self) -> bool {
        !self.is_empty()
    }

    /// Number of `advance` calls so far
    pub fn frame(&self) -> u64 {
        peek(&self.inner, |inner| inner.frame).unwrap_or(0)
    }
}

/// Read the engine unless it is mid-step
fn peek<R>(inner: &RefCell<EngineInner>, read: impl FnOnce(&EngineInner) -> R) -> Option<R> {
    match inner.try_borrow() {
        Ok(inner) => Some(read(&inner)),
        Err(_) => {
            warn!("engine queried during property writes");
            None
        }
    }
}

fn cancel_in(inner: &RefCell<EngineInner>, id: TweenId) -> bool {
    match inner.try_borrow_mut() {
        Ok(mut inner) => inner.cancel(id),
        Err(_) => {
            warn!(?id, "cancel during property writes ignored");
            false
        }
    }
}

fn schedule_into(
    inner: &RefCell<EngineInner>,
    target: Option<SharedTarget>,
    params: TweenParams,
    completion: Option<Completion>,
) -> Result<TweenId> {
    inner
        .try_borrow_mut()
        .map_err(|_| TweenError::EngineBusy)?
        .schedule(target, params, completion)
}

/// Weak handle to a [`TweenEngine`]
///
/// Safe to capture in completions; it never keeps the engine alive.
#[derive(Clone, Default)]
pub struct EngineHandle {
    inner: Weak<RefCell<EngineInner>>,
}

impl EngineHandle {
    fn upgrade(&self) -> Result<Rc<RefCell<EngineInner>>> {
        self.inner.upgrade().ok_or(TweenError::EngineDropped)
    }

    pub fn schedule(&self, target: SharedTarget, params: TweenParams) -> Result<TweenId> {
        schedule_into(&*self.upgrade()?, Some(target), params, None)
    }

    pub fn schedule_with(
        &self,
        target: SharedTarget,
        params: TweenParams,
        on_complete: impl FnOnce() + 'static,
    ) -> Result<TweenId> {
        schedule_into(&*self.upgrade()?, Some(target), params, Some(Box::new(on_complete)))
    }

    pub fn timer(&self, delay: f32, duration: f32, on_complete: impl FnOnce() + 'static) -> Result<TweenId> {
        let params = TweenParams::new(duration).delay(delay);
        schedule_into(&*self.upgrade()?, None, params, Some(Box::new(on_complete)))
    }

    /// Cancel a tween; a dropped engine has nothing to cancel
    pub fn cancel(&self, id: TweenId) -> bool {
        self.inner.upgrade().map(|inner| cancel_in(&inner, id)).unwrap_or(false)
    }

    pub fn progress(&self, id: TweenId) -> Option<f32> {
        let inner = self.inner.upgrade()?;
        peek(&inner, |inner| inner.progress(id)).flatten()
    }

    pub fn is_active(&self, id: TweenId) -> bool {
        let Some(inner) = self.inner.upgrade() else {
            return false;
        };
        peek(&inner, |inner| inner.tweens.contains_key(id)).unwrap_or(false)
    }

    pub fn is_alive(&self) -> bool {
        self.inner.strong_count() > 0
    }
}

/// Anything tweens can be submitted to
///
/// Implemented by the engine itself and by its weak handle, so helpers such
/// as [`crate::TweenBatch`] work with either.
pub trait Scheduler {
    fn submit(&self, target: Option<SharedTarget>, params: TweenParams, completion: Option<Completion>) -> Result<TweenId>;

    fn cancel(&self, id: TweenId) -> bool;
}

impl Scheduler for TweenEngine {
    fn submit(&self, target: Option<SharedTarget>, params: TweenParams, completion: Option<Completion>) -> Result<TweenId> {
        schedule_into(&self.inner, target, params, completion)
    }

    fn cancel(&self, id: TweenId) -> bool {
        cancel_in(&self.inner, id)
    }
}

impl Scheduler for EngineHandle {
    fn submit(&self, target: Option<SharedTarget>, params: TweenParams, completion: Option<Completion>) -> Result<TweenId> {
        schedule_into(&*self.upgrade()?, target, params, completion)
    }

    fn cancel(&self, id: TweenId) -> bool {
        EngineHandle::cancel(self, id)
    }
}
