//! Card stack gesture animator
//!
//! Turns scrub, flip and jump gestures into property writes on three card
//! stacks (center, left, right) and the camera.
//!
//! - **Scrub** gestures are caller-driven: every call maps a percentage to a
//!   pose and writes it immediately. Nothing is scheduled.
//! - **Flip** and **jump** gestures schedule a [`TweenBatch`] and report
//!   completion once the whole batch has finished. The card order is shifted
//!   in that completion, after the last frame of motion, so the new order
//!   lines up with where the cards visually came to rest.
//!
//! Each stack carries one [`GestureState`]. Starting any gesture on a stack
//! cancels the batch of the gesture in flight (its callback never fires), or
//! drops an unfinished scrub, and returns the stack to its settled pose
//! before the new gesture begins. A cancelled settle that was easing the
//! camera puts the camera back at rest too.

use std::cell::RefCell;
use std::f32::consts::TAU;
use std::rc::{Rc, Weak};

use rustc_hash::FxHashMap;
use tracing::debug;
use whimsy_animation::{Easing, EngineHandle, TweenBatch, TweenParams, TweenProperty};

use crate::camera::Camera;
use crate::card_stack::{CardStack, ShiftDir, SharedCard, StackId, StackLayout};
use crate::config::AnimatorConfig;
use crate::error::Result;
use crate::gesture::{FlipDir, GestureState, JumpDir, ScrubDir};

/// Group transform of a stack
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StackPose {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub sx: f32,
    pub sy: f32,
}

impl StackPose {
    pub fn of(stack: &CardStack) -> Self {
        Self {
            x: stack.x,
            y: stack.y,
            z: stack.z,
            sx: stack.sx,
            sy: stack.sy,
        }
    }

    pub fn apply(&self, stack: &mut CardStack) {
        stack.x = self.x;
        stack.y = self.y;
        stack.z = self.z;
        stack.sx = self.sx;
        stack.sy = self.sy;
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Role {
    Center,
    Left,
    Right,
}

type Sessions = Rc<RefCell<FxHashMap<StackId, GestureState>>>;

fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

pub struct CardStackAnimator {
    engine: EngineHandle,
    config: AnimatorConfig,
    screen_width: f32,
    screen_height: f32,
    sessions: Sessions,
    bases: FxHashMap<StackId, StackPose>,
    roles: FxHashMap<StackId, Role>,
    center: Option<StackId>,
    camera_rest_z: Option<f32>,
    /// Camera eased by the settle running on the given stack
    settle_camera: Option<(StackId, Weak<RefCell<Camera>>)>,
    /// Selected offsets `(y, z)` when the current settle or flip began
    offsets_from: (f32, f32),
    /// Committed focus of the center stack, 0 (at rest) to 1 (focused)
    settled_focus: f32,
}

impl CardStackAnimator {
    pub fn new(screen_width: f32, screen_height: f32, engine: EngineHandle, config: AnimatorConfig) -> Self {
        Self {
            engine,
            config,
            screen_width,
            screen_height,
            sessions: Rc::new(RefCell::new(FxHashMap::default())),
            bases: FxHashMap::default(),
            roles: FxHashMap::default(),
            center: None,
            camera_rest_z: None,
            settle_camera: None,
            offsets_from: (0.0, 0.0),
            settled_focus: 0.0,
        }
    }

    pub fn config(&self) -> &AnimatorConfig {
        &self.config
    }

    pub fn screen_size(&self) -> (f32, f32) {
        (self.screen_width, self.screen_height)
    }

    pub fn settled_focus(&self) -> f32 {
        self.settled_focus
    }

    /// Record the resting poses of the three stacks the gestures act on
    ///
    /// Call with the stacks at rest; later poses are derived from these.
    pub fn prepare_anim_for(&mut self, center: &CardStack, left: &CardStack, right: &CardStack) {
        for (stack, role) in [(center, Role::Center), (left, Role::Left), (right, Role::Right)] {
            self.bases.insert(stack.id(), StackPose::of(stack));
            self.roles.insert(stack.id(), role);
        }
        self.center = Some(center.id());
        self.camera_rest_z = None;
        debug!(center = center.id().0, left = left.id().0, right = right.id().0, "animator prepared");
    }

    pub fn gesture_state(&self, stack: StackId) -> GestureState {
        self.sessions.borrow().get(&stack).cloned().unwrap_or_default()
    }

    /// Whether a tween batch is currently driving `stack`
    pub fn is_animating(&self, stack: StackId) -> bool {
        self.sessions
            .borrow()
            .get(&stack)
            .is_some_and(|state| state.batch().is_some())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Session bookkeeping
    // ─────────────────────────────────────────────────────────────────────────

    fn base_for(&mut self, stack: &CardStack) -> StackPose {
        *self.bases.entry(stack.id()).or_insert_with(|| StackPose::of(stack))
    }

    /// Replace the stack's gesture
    ///
    /// A batch in flight is cancelled and an unfinished scrub is dropped; in
    /// both cases the stack snaps to its settled pose. Returns whether
    /// anything was interrupted.
    fn begin(&mut self, stack: &mut CardStack, next: GestureState) -> bool {
        let scrubbing = matches!(next, GestureState::Scrubbing { .. });
        let previous = self.sessions.borrow_mut().insert(stack.id(), next);
        let camera = match self.settle_camera.take() {
            Some((owner, camera)) if owner == stack.id() => Some(camera),
            other => {
                self.settle_camera = other;
                None
            }
        };

        let interrupted = match previous.as_ref() {
            Some(GestureState::Scrubbing { .. }) => !scrubbing,
            Some(state) => match state.batch() {
                Some(batch) => {
                    batch.cancel(&self.engine);
                    true
                }
                None => false,
            },
            None => false,
        };
        if !interrupted {
            return false;
        }

        self.settle_stack(stack);
        if let Some(camera) = camera.and_then(|camera| camera.upgrade()) {
            // A scrub holding the camera rewrites it itself
            if let Ok(mut camera) = camera.try_borrow_mut() {
                self.settle_camera(&mut camera);
            }
        }
        debug!(
            stack = stack.id().0,
            previous = previous.as_ref().map(GestureState::name),
            "in-flight gesture cancelled"
        );
        true
    }

    /// Selected offsets implied by where the center stack currently is
    fn pose_offsets(&self, stack: &CardStack) -> (f32, f32) {
        let base_z = self.bases.get(&stack.id()).map_or(stack.z, |base| base.z);
        let lift = stack
            .front()
            .map_or(0.0, |front| front.borrow().y - stack.layout.slot_y(0));
        (lift, stack.z - base_z)
    }

    fn set_idle(&self, stack: StackId) {
        self.sessions.borrow_mut().insert(stack, GestureState::Idle);
    }

    /// Focus implied by a depth scrub at eased progress `e`
    fn focus(&self, dir: ScrubDir, e: f32) -> f32 {
        match dir {
            ScrubDir::In => lerp(self.settled_focus, 1.0, e),
            ScrubDir::Out => lerp(self.settled_focus, 0.0, e),
            ScrubDir::Up | ScrubDir::Down => self.settled_focus,
        }
    }

    fn depth_pose(&self, role: Role, base: StackPose, focus: f32) -> StackPose {
        let slide = self.screen_width * self.config.side_slide * focus;
        match role {
            Role::Center => {
                let scale = lerp(1.0, self.config.focus_scale, focus);
                StackPose {
                    z: base.z + self.config.zoom_depth * focus,
                    sx: base.sx * scale,
                    sy: base.sy * scale,
                    ..base
                }
            }
            Role::Left => StackPose { x: base.x - slide, ..base },
            Role::Right => StackPose { x: base.x + slide, ..base },
        }
    }

    /// Return `stack` to its settled pose with every card at rest
    pub fn settle_stack(&mut self, stack: &mut CardStack) {
        let role = self.roles.get(&stack.id()).copied().unwrap_or(Role::Center);
        let base = self.base_for(stack);
        self.depth_pose(role, base, self.settled_focus).apply(stack);
        stack.layout_cards();
    }

    /// Return the camera to the depth matching the settled focus
    pub fn settle_camera(&self, camera: &mut Camera) {
        if let Some(rest) = self.camera_rest_z {
            camera.set_z(rest - self.config.camera_pull * self.settled_focus);
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Scrub
    // ─────────────────────────────────────────────────────────────────────────

    fn scrub_progress(&self, pct: f32) -> (f32, f32) {
        let pct = if pct.is_nan() { 0.0 } else { pct.clamp(0.0, 1.0) };
        (pct, self.config.scrub_easing.ease(pct))
    }

    pub fn scrub_left_stack(&mut self, left: &mut CardStack, dir: ScrubDir, pct: f32) {
        self.scrub_side(left, Role::Left, dir, pct);
    }

    pub fn scrub_right_stack(&mut self, right: &mut CardStack, dir: ScrubDir, pct: f32) {
        self.scrub_side(right, Role::Right, dir, pct);
    }

    fn scrub_side(&mut self, stack: &mut CardStack, role: Role, dir: ScrubDir, pct: f32) {
        let (pct, e) = self.scrub_progress(pct);
        self.roles.insert(stack.id(), role);
        self.begin(stack, GestureState::Scrubbing { dir, pct });
        let base = self.base_for(stack);

        let mut pose = self.depth_pose(role, base, self.focus(dir, e));
        match dir {
            ScrubDir::Up => pose.y += self.config.lift * self.config.parallax * e,
            ScrubDir::Down => pose.y -= self.config.lift * self.config.parallax * e,
            ScrubDir::In | ScrubDir::Out => {}
        }
        pose.apply(stack);
    }

    pub fn scrub_center_stack(&mut self, center: &mut CardStack, dir: ScrubDir, pct: f32, camera: &mut Camera) {
        let (pct, e) = self.scrub_progress(pct);
        self.roles.insert(center.id(), Role::Center);
        self.center.get_or_insert(center.id());
        self.begin(center, GestureState::Scrubbing { dir, pct });
        let base = self.base_for(center);
        let pull = self.config.camera_pull;
        let rest_z = *self.camera_rest_z.get_or_insert(camera.z() + pull * self.settled_focus);

        let focus = self.focus(dir, e);
        self.depth_pose(Role::Center, base, focus).apply(center);
        camera.set_z(rest_z - pull * focus);

        if let (Some(front), false) = (center.front(), dir.is_depth()) {
            let sign = if dir == ScrubDir::Up { 1.0 } else { -1.0 };
            let mut card = front.borrow_mut();
            card.y = center.layout.slot_y(0) + sign * self.config.lift * e;
            card.rx = -sign * self.config.tilt * e;
        }
    }

    /// Finish a scrub on `stack`
    ///
    /// Returns `true` when the scrub had reached 100%. A committed depth
    /// scrub on the center stack becomes the new settled focus. The stack is
    /// left where the scrub put it either way; use
    /// [`CardStackAnimator::settle_stack`] to snap back.
    pub fn commit_scrub(&mut self, stack: StackId) -> bool {
        let state = self.gesture_state(stack);
        let GestureState::Scrubbing { dir, pct } = state else {
            return false;
        };
        self.set_idle(stack);

        let committed = pct >= 1.0;
        if committed && dir.is_depth() && self.center == Some(stack) {
            self.settled_focus = if dir == ScrubDir::In { 1.0 } else { 0.0 };
        }
        debug!(stack = stack.0, ?dir, pct, committed, "scrub finished");
        committed
    }

    /// Cancel whatever `stack` is doing and snap it to its settled pose
    pub fn abort_gesture(&mut self, stack: &mut CardStack) -> bool {
        let was_active = !self.gesture_state(stack.id()).is_idle();
        self.begin(stack, GestureState::Idle);
        self.settle_stack(stack);
        was_active
    }

    /// Ease `stack` (and `camera`, if given) back to the settled pose
    ///
    /// Used when a scrub is released short of completion. The return runs as
    /// a tracked gesture, so a new gesture on the stack interrupts it.
    pub fn settle_stack_animated(
        &mut self,
        stack: &Rc<RefCell<CardStack>>,
        camera: Option<&Rc<RefCell<Camera>>>,
    ) -> Result<()> {
        let sessions = Rc::downgrade(&self.sessions);
        let id = stack.borrow().id();
        let batch = TweenBatch::new(move || {
            if let Some(sessions) = sessions.upgrade() {
                sessions.borrow_mut().insert(id, GestureState::Idle);
            }
            debug!(stack = id.0, "stack settled");
        });

        let (pose, cards, layout) = {
            let mut stack = stack.borrow_mut();
            self.begin(&mut stack, GestureState::Settling { batch: batch.clone() });
            if self.center == Some(id) {
                self.offsets_from = self.pose_offsets(&stack);
            }
            let role = self.roles.get(&id).copied().unwrap_or(Role::Center);
            let base = self.base_for(&stack);
            (self.depth_pose(role, base, self.settled_focus), stack.cards().to_vec(), stack.layout)
        };

        if let Some(camera) = camera {
            self.settle_camera = Some((id, Rc::downgrade(camera)));
        }
        let scheduled = self.schedule_settle(&batch, stack, camera, pose, &cards, &layout);
        self.unwind_on_error(id, &batch, scheduled)
    }

    fn schedule_settle(
        &self,
        batch: &TweenBatch,
        stack: &Rc<RefCell<CardStack>>,
        camera: Option<&Rc<RefCell<Camera>>>,
        pose: StackPose,
        cards: &[SharedCard],
        layout: &StackLayout,
    ) -> Result<()> {
        let duration = self.config.settle_duration;
        let easing = self.config.settle_easing;
        let params = || TweenParams::new(duration).easing(easing);

        batch.schedule(
            &self.engine,
            stack.clone(),
            params()
                .to(TweenProperty::X, pose.x)
                .to(TweenProperty::Y, pose.y)
                .to(TweenProperty::Z, pose.z)
                .to(TweenProperty::Sx, pose.sx)
                .to(TweenProperty::Sy, pose.sy),
        )?;
        for (slot, card) in cards.iter().enumerate() {
            batch.schedule(
                &self.engine,
                card.clone(),
                slot_params(layout, slot, duration, easing).to(TweenProperty::Rx, 0.0),
            )?;
        }
        if let (Some(camera), Some(rest)) = (camera, self.camera_rest_z) {
            batch.schedule(
                &self.engine,
                camera.clone(),
                params().to(TweenProperty::Z, rest - self.config.camera_pull * self.settled_focus),
            )?;
        }
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Flip
    // ─────────────────────────────────────────────────────────────────────────

    /// Flip the front card over the top to the back (`Up`) or the back card
    /// down to the front (`Down`), then shift the card order
    pub fn flip_center_stack_card(
        &mut self,
        center: &Rc<RefCell<CardStack>>,
        dir: FlipDir,
        on_complete: impl FnOnce() + 'static,
    ) -> Result<()> {
        let batch = self.finishing_batch(center, dir.shift(), None, on_complete);
        let (id, cards, layout) = {
            let mut stack = center.borrow_mut();
            self.begin(&mut stack, GestureState::Flipping { dir, batch: batch.clone() });
            self.offsets_from = self.pose_offsets(&stack);
            (stack.id(), stack.cards().to_vec(), stack.layout)
        };
        debug!(stack = id.0, ?dir, cards = cards.len(), "flip started");

        let scheduled = self.schedule_flip(&batch, &cards, &layout, dir);
        self.unwind_on_error(id, &batch, scheduled)
    }

    fn schedule_flip(&self, batch: &TweenBatch, cards: &[SharedCard], layout: &StackLayout, dir: FlipDir) -> Result<()> {
        let duration = self.config.flip_duration;
        let n = cards.len();
        if n == 0 {
            batch.timer(&self.engine, 0.0, duration)?;
            return Ok(());
        }

        let (flipper, landing, turn) = match dir {
            FlipDir::Up => (0, n - 1, -TAU),
            FlipDir::Down => (n - 1, 0, TAU),
        };

        batch.schedule(
            &self.engine,
            cards[flipper].clone(),
            TweenParams::new(duration)
                .easing(self.config.flip_easing)
                .to(TweenProperty::Rx, turn),
        )?;
        batch.schedule(
            &self.engine,
            cards[flipper].clone(),
            TweenParams::new(duration * 0.85)
                .delay(duration * 0.15)
                .easing(self.config.flip_arc_easing)
                .to(TweenProperty::Y, layout.slot_y(landing))
                .to(TweenProperty::Z, layout.slot_z(landing))
                .to(TweenProperty::AlphaModifier, layout.slot_alpha(landing)),
        )?;

        for (index, card) in cards.iter().enumerate().filter(|(index, _)| *index != flipper) {
            let slot = match dir {
                FlipDir::Up => index - 1,
                FlipDir::Down => index + 1,
            };
            batch.schedule(&self.engine, card.clone(), slot_params(layout, slot, duration, self.config.flip_easing))?;
        }
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Jump
    // ─────────────────────────────────────────────────────────────────────────

    /// Move the whole center stack one slot and shift its order at the end
    pub fn center_stack_jump(
        &mut self,
        center: &Rc<RefCell<CardStack>>,
        dir: JumpDir,
        on_complete: impl FnOnce() + 'static,
    ) -> Result<()> {
        // Filled in once the stack has settled
        let batch_pose = Rc::new(RefCell::new(None));
        let batch = self.finishing_batch(center, dir.shift(), Some(batch_pose.clone()), on_complete);
        let (id, cards, layout, pose) = {
            let mut stack = center.borrow_mut();
            self.begin(&mut stack, GestureState::Jumping { dir, batch: batch.clone() });
            (stack.id(), stack.cards().to_vec(), stack.layout, StackPose::of(&stack))
        };
        *batch_pose.borrow_mut() = Some(pose);
        debug!(stack = id.0, ?dir, cards = cards.len(), "jump started");

        let scheduled = self.schedule_jump(&batch, center, &cards, &layout, pose, dir);
        self.unwind_on_error(id, &batch, scheduled)
    }

    fn schedule_jump(
        &self,
        batch: &TweenBatch,
        center: &Rc<RefCell<CardStack>>,
        cards: &[SharedCard],
        layout: &StackLayout,
        pose: StackPose,
        dir: JumpDir,
    ) -> Result<()> {
        let duration = self.config.jump_duration;
        let sign = dir.sign();

        // Vertical leg first: its progress feeds the selected offsets
        batch.schedule(
            &self.engine,
            center.clone(),
            TweenParams::new(duration)
                .easing(self.config.jump_easing_y)
                .to(TweenProperty::Y, pose.y - sign * layout.step_y * pose.sy),
        )?;
        batch.schedule(
            &self.engine,
            center.clone(),
            TweenParams::new(duration)
                .easing(self.config.jump_easing_z)
                .to(TweenProperty::Z, pose.z + sign * layout.step_z),
        )?;

        let n = cards.len();
        if n < 2 {
            return Ok(());
        }

        // The travelling card heads for the slot it will occupy after the
        // shift, measured against where the group ends up
        let (traveller, local_y, local_z, landing) = match dir {
            JumpDir::Forward => (0, layout.slot_y(n), layout.slot_z(n), n - 1),
            JumpDir::Backward => (n - 1, -layout.step_y, layout.step_z, 0),
        };
        batch.schedule(
            &self.engine,
            cards[traveller].clone(),
            TweenParams::new(duration)
                .easing(self.config.jump_easing_z)
                .to(TweenProperty::Y, local_y)
                .to(TweenProperty::Z, local_z)
                .to(TweenProperty::AlphaModifier, layout.slot_alpha(landing)),
        )?;

        for (index, card) in cards.iter().enumerate().filter(|(index, _)| *index != traveller) {
            let slot = match dir {
                JumpDir::Forward => index - 1,
                JumpDir::Backward => index + 1,
            };
            batch.schedule(
                &self.engine,
                card.clone(),
                TweenParams::new(duration)
                    .easing(self.config.jump_easing_z)
                    .to(TweenProperty::AlphaModifier, layout.slot_alpha(slot)),
            )?;
        }
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Batch plumbing
    // ─────────────────────────────────────────────────────────────────────────

    /// Batch whose completion shifts the stack, lays it out, restores the
    /// group pose (jumps only) and hands over to the caller
    fn finishing_batch(
        &self,
        center: &Rc<RefCell<CardStack>>,
        shift: ShiftDir,
        restore: Option<Rc<RefCell<Option<StackPose>>>>,
        on_complete: impl FnOnce() + 'static,
    ) -> TweenBatch {
        let stack: Weak<RefCell<CardStack>> = Rc::downgrade(center);
        let sessions = Rc::downgrade(&self.sessions);

        TweenBatch::new(move || {
            if let Some(stack) = stack.upgrade() {
                let mut stack = stack.borrow_mut();
                stack.shift_cards(shift);
                if let Some(pose) = restore.as_ref().and_then(|pose| *pose.borrow()) {
                    pose.apply(&mut stack);
                }
                stack.layout_cards();
                if let Some(sessions) = sessions.upgrade() {
                    sessions.borrow_mut().insert(stack.id(), GestureState::Idle);
                }
                debug!(stack = stack.id().0, ?shift, order = ?stack.order(), "gesture finished");
            }
            on_complete();
        })
    }

    fn unwind_on_error(&self, stack: StackId, batch: &TweenBatch, scheduled: Result<()>) -> Result<()> {
        if scheduled.is_err() {
            batch.cancel(&self.engine);
            self.set_idle(stack);
        }
        scheduled
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Selected stack offsets
    // ─────────────────────────────────────────────────────────────────────────

    /// Eased progress of the first member of a batch
    fn batch_progress(&self, batch: &TweenBatch, easing: Easing) -> f32 {
        let Some(id) = batch.members().first().copied() else {
            return 0.0;
        };
        easing.ease(self.engine.progress(id).unwrap_or(1.0))
    }

    fn center_state(&self) -> GestureState {
        self.center.map(|id| self.gesture_state(id)).unwrap_or_default()
    }

    /// Vertical offset of the selected (center) stack for the current gesture
    pub fn selected_stack_offset_y(&self) -> f32 {
        match self.center_state() {
            GestureState::Scrubbing { dir: ScrubDir::Up, pct } => self.config.lift * self.scrub_progress(pct).1,
            GestureState::Scrubbing { dir: ScrubDir::Down, pct } => -self.config.lift * self.scrub_progress(pct).1,
            GestureState::Jumping { dir, batch } => {
                let scale = lerp(1.0, self.config.focus_scale, self.settled_focus);
                -dir.sign() * self.config.stack.step_y * scale * self.batch_progress(&batch, self.config.jump_easing_y)
            }
            GestureState::Settling { batch } => {
                lerp(self.offsets_from.0, 0.0, self.batch_progress(&batch, self.config.settle_easing))
            }
            GestureState::Flipping { batch, .. } => {
                lerp(self.offsets_from.0, 0.0, self.batch_progress(&batch, self.config.flip_easing))
            }
            _ => 0.0,
        }
    }

    /// Depth offset of the selected (center) stack for the current gesture
    pub fn selected_stack_offset_z(&self) -> f32 {
        let zoom = self.config.zoom_depth;
        match self.center_state() {
            GestureState::Scrubbing { dir, pct } if dir.is_depth() => zoom * self.focus(dir, self.scrub_progress(pct).1),
            GestureState::Jumping { dir, batch } => {
                zoom * self.settled_focus
                    + dir.sign() * self.config.stack.step_z * self.batch_progress(&batch, self.config.jump_easing_z)
            }
            GestureState::Settling { batch } => lerp(
                self.offsets_from.1,
                zoom * self.settled_focus,
                self.batch_progress(&batch, self.config.settle_easing),
            ),
            _ => zoom * self.settled_focus,
        }
    }
}

/// Tween a card to rest at `slot`
fn slot_params(layout: &StackLayout, slot: usize, duration: f32, easing: Easing) -> TweenParams {
    TweenParams::new(duration)
        .easing(easing)
        .to(TweenProperty::Y, layout.slot_y(slot))
        .to(TweenProperty::Z, layout.slot_z(slot))
        .to(TweenProperty::AlphaModifier, layout.slot_alpha(slot))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use whimsy_animation::TweenEngine;
    use whimsy_core::approx_eq;

    const EPSILON: f32 = 1e-3;

    struct Rig {
        engine: TweenEngine,
        animator: CardStackAnimator,
        camera: Camera,
        center: Rc<RefCell<CardStack>>,
        left: Rc<RefCell<CardStack>>,
        right: Rc<RefCell<CardStack>>,
    }

    fn rig(cards: u32) -> Rig {
        let engine = TweenEngine::new();
        let config = AnimatorConfig::default();
        let make = |id, x| {
            let mut stack = CardStack::with_cards(StackId(id), config.stack, cards, 300.0, 200.0);
            stack.x = x;
            Rc::new(RefCell::new(stack))
        };
        let center = make(0, 0.0);
        let left = make(1, -400.0);
        let right = make(2, 400.0);

        let mut animator = CardStackAnimator::new(1024.0, 768.0, engine.handle(), config);
        animator.prepare_anim_for(&center.borrow(), &left.borrow(), &right.borrow());
        Rig {
            camera: Camera::new(1024.0, 768.0, 1.0).unwrap(),
            engine,
            animator,
            center,
            left,
            right,
        }
    }

    fn counter() -> (Rc<Cell<u32>>, impl FnOnce() + 'static) {
        let count = Rc::new(Cell::new(0));
        let inner = count.clone();
        (count, move || inner.set(inner.get() + 1))
    }

    fn run(engine: &TweenEngine, seconds: f32) {
        let frames = (seconds * 60.0).ceil() as usize;
        for _ in 0..frames {
            engine.advance(1.0 / 60.0);
        }
    }

    #[test]
    fn test_scrub_in_writes_directly() {
        let mut rig = rig(3);
        let rest_z = rig.camera.z();
        let config = rig.animator.config().clone();

        rig.animator
            .scrub_center_stack(&mut rig.center.borrow_mut(), ScrubDir::In, 1.0, &mut rig.camera);
        rig.animator.scrub_left_stack(&mut rig.left.borrow_mut(), ScrubDir::In, 1.0);
        rig.animator.scrub_right_stack(&mut rig.right.borrow_mut(), ScrubDir::In, 0.0);

        let center = rig.center.borrow();
        assert!(approx_eq(center.sx, config.focus_scale, EPSILON));
        assert!(approx_eq(center.z, config.zoom_depth, EPSILON));
        assert!(approx_eq(rig.camera.z(), rest_z - config.camera_pull, EPSILON));
        assert!(approx_eq(rig.left.borrow().x, -400.0 - 1024.0 * config.side_slide, EPSILON));
        assert_eq!(rig.right.borrow().x, 400.0);
        assert!(rig.engine.is_empty());
        assert!(approx_eq(rig.animator.selected_stack_offset_z(), config.zoom_depth, EPSILON));
    }

    #[test]
    fn test_commit_scrub_requires_full_progress() {
        let mut rig = rig(3);
        let id = rig.center.borrow().id();

        rig.animator
            .scrub_center_stack(&mut rig.center.borrow_mut(), ScrubDir::In, 0.6, &mut rig.camera);
        assert!(!rig.animator.commit_scrub(id));
        assert_eq!(rig.animator.settled_focus(), 0.0);

        rig.animator
            .scrub_center_stack(&mut rig.center.borrow_mut(), ScrubDir::In, 1.0, &mut rig.camera);
        assert!(rig.animator.commit_scrub(id));
        assert_eq!(rig.animator.settled_focus(), 1.0);
        assert!(rig.animator.gesture_state(id).is_idle());

        // Scrubbing out from focus starts at the focused pose
        rig.animator
            .scrub_center_stack(&mut rig.center.borrow_mut(), ScrubDir::Out, 0.0, &mut rig.camera);
        let config = rig.animator.config().clone();
        assert!(approx_eq(rig.center.borrow().sx, config.focus_scale, EPSILON));
    }

    #[test]
    fn test_vertical_scrub_lifts_front_card() {
        let mut rig = rig(3);
        let config = rig.animator.config().clone();
        rig.animator
            .scrub_center_stack(&mut rig.center.borrow_mut(), ScrubDir::Up, 1.0, &mut rig.camera);

        let front = rig.center.borrow().front().unwrap().clone();
        assert!(approx_eq(front.borrow().y, config.lift, EPSILON));
        assert!(approx_eq(front.borrow().rx, -config.tilt, EPSILON));
        assert!(approx_eq(rig.animator.selected_stack_offset_y(), config.lift, EPSILON));
    }

    #[test]
    fn test_released_scrub_eases_back() {
        let mut rig = rig(3);
        let rest_z = rig.camera.z();
        rig.animator
            .scrub_center_stack(&mut rig.center.borrow_mut(), ScrubDir::Up, 0.5, &mut rig.camera);
        assert!(!rig.animator.commit_scrub(StackId(0)));

        let camera = Rc::new(RefCell::new(rig.camera.clone()));
        rig.animator.settle_stack_animated(&rig.center, Some(&camera)).unwrap();
        assert_eq!(rig.animator.gesture_state(StackId(0)).name(), "settling");

        run(&rig.engine, rig.animator.config().settle_duration + 0.05);
        assert!(rig.animator.gesture_state(StackId(0)).is_idle());
        let front = rig.center.borrow().front().unwrap().clone();
        assert_eq!(front.borrow().y, 0.0);
        assert_eq!(front.borrow().rx, 0.0);
        assert_eq!(camera.borrow().z(), rest_z);
    }

    #[test]
    fn test_flip_fires_once_after_whole_batch() {
        let rig = rig(4);
        let mut animator = rig.animator;
        let (fired, on_complete) = counter();

        animator
            .flip_center_stack_card(&rig.center, FlipDir::Up, on_complete)
            .unwrap();
        assert!(animator.is_animating(StackId(0)));

        // Halfway: nothing has landed yet
        run(&rig.engine, animator.config().flip_duration * 0.5);
        assert_eq!(fired.get(), 0);
        assert_eq!(rig.center.borrow().order(), vec![0, 1, 2, 3]);

        run(&rig.engine, animator.config().flip_duration);
        assert_eq!(fired.get(), 1);
        assert_eq!(rig.center.borrow().order(), vec![1, 2, 3, 0]);
        assert!(animator.gesture_state(StackId(0)).is_idle());

        let back = rig.center.borrow().back().unwrap().clone();
        assert_eq!(back.borrow().rx, 0.0);
        assert_eq!(back.borrow().z, rig.center.borrow().layout.slot_z(3));
    }

    #[test]
    fn test_flip_down_brings_back_card_forward() {
        let rig = rig(3);
        let mut animator = rig.animator;
        animator.flip_center_stack_card(&rig.center, FlipDir::Down, || {}).unwrap();
        run(&rig.engine, animator.config().flip_duration + 0.1);
        assert_eq!(rig.center.borrow().order(), vec![2, 0, 1]);
    }

    #[test]
    fn test_new_gesture_cancels_in_flight_batch() {
        let rig = rig(3);
        let mut animator = rig.animator;
        let (first, first_done) = counter();
        let (second, second_done) = counter();

        animator.flip_center_stack_card(&rig.center, FlipDir::Up, first_done).unwrap();
        run(&rig.engine, 0.1);
        animator.center_stack_jump(&rig.center, JumpDir::Forward, second_done).unwrap();

        run(&rig.engine, 2.0);
        assert_eq!(first.get(), 0);
        assert_eq!(second.get(), 1);
        // Only the jump shifted the order
        assert_eq!(rig.center.borrow().order(), vec![1, 2, 0]);
    }

    #[test]
    fn test_jump_lands_without_popping() {
        let rig = rig(3);
        let mut animator = rig.animator;
        let (fired, on_complete) = counter();
        let layout = rig.center.borrow().layout;

        animator.center_stack_jump(&rig.center, JumpDir::Forward, on_complete).unwrap();

        // World position of card 1 just before the end
        let duration = animator.config().jump_duration;
        rig.engine.advance(duration - 1e-3);
        let card1 = rig.center.borrow().card(1).unwrap().clone();
        let before = {
            let stack = rig.center.borrow();
            let card = card1.borrow();
            (stack.y + card.y * stack.sy, stack.z + card.z)
        };
        assert!(animator.selected_stack_offset_y() < 0.0);
        assert!(animator.selected_stack_offset_z() > 0.0);

        rig.engine.advance(1e-2);
        assert_eq!(fired.get(), 1);

        let stack = rig.center.borrow();
        assert_eq!(stack.order(), vec![1, 2, 0]);
        assert_eq!((stack.y, stack.z), (0.0, 0.0));
        let card = card1.borrow();
        assert_eq!(card.y, layout.slot_y(0));
        assert!(approx_eq(before.0, stack.y + card.y, 0.05));
        assert!(approx_eq(before.1, stack.z + card.z, 0.05));
    }

    #[test]
    fn test_abort_settles_stack() {
        let rig = rig(3);
        let mut animator = rig.animator;
        let (fired, on_complete) = counter();
        animator.center_stack_jump(&rig.center, JumpDir::Backward, on_complete).unwrap();
        run(&rig.engine, 0.2);

        assert!(animator.abort_gesture(&mut rig.center.borrow_mut()));
        assert!(rig.engine.is_empty());
        run(&rig.engine, 1.0);
        assert_eq!(fired.get(), 0);

        let stack = rig.center.borrow();
        assert_eq!(stack.order(), vec![0, 1, 2]);
        assert_eq!((stack.y, stack.z), (0.0, 0.0));
        drop(stack);
        assert!(!animator.abort_gesture(&mut rig.center.borrow_mut()));
    }

    #[test]
    fn test_empty_stack_flip_still_completes() {
        let rig = rig(0);
        let mut animator = rig.animator;
        let (fired, on_complete) = counter();
        animator.flip_center_stack_card(&rig.center, FlipDir::Up, on_complete).unwrap();
        run(&rig.engine, animator.config().flip_duration + 0.05);
        assert_eq!(fired.get(), 1);
    }

    #[test]
    fn test_dropped_engine_surfaces_error() {
        let rig = rig(2);
        let mut animator = rig.animator;
        drop(rig.engine);

        let result = animator.flip_center_stack_card(&rig.center, FlipDir::Up, || {});
        assert!(result.is_err());
        assert!(animator.gesture_state(StackId(0)).is_idle());
    }

    #[test]
    fn test_gesture_over_scrub_starts_from_settled_pose() {
        let mut rig = rig(3);
        rig.animator
            .scrub_center_stack(&mut rig.center.borrow_mut(), ScrubDir::In, 0.5, &mut rig.camera);
        assert!(rig.center.borrow().sx > 1.0);

        let mut animator = rig.animator;
        animator.center_stack_jump(&rig.center, JumpDir::Forward, || {}).unwrap();
        assert_eq!(rig.center.borrow().sx, 1.0);
        assert_eq!(rig.center.borrow().z, 0.0);

        run(&rig.engine, animator.config().jump_duration + 0.05);
        let stack = rig.center.borrow();
        assert_eq!((stack.y, stack.z, stack.sx), (0.0, 0.0, 1.0));
        assert!(animator.gesture_state(StackId(0)).is_idle());
    }

    #[test]
    fn test_cancelled_settle_puts_camera_back() {
        let mut rig = rig(3);
        let rest_z = rig.camera.z();
        rig.animator
            .scrub_center_stack(&mut rig.center.borrow_mut(), ScrubDir::In, 0.8, &mut rig.camera);
        assert!(!rig.animator.commit_scrub(StackId(0)));

        let camera = Rc::new(RefCell::new(rig.camera.clone()));
        rig.animator.settle_stack_animated(&rig.center, Some(&camera)).unwrap();
        rig.engine.advance(2.0 / 60.0);
        assert!(camera.borrow().z() < rest_z - 1.0);

        rig.animator.flip_center_stack_card(&rig.center, FlipDir::Up, || {}).unwrap();
        assert!(approx_eq(camera.borrow().z(), rest_z, EPSILON));
        run(&rig.engine, 1.0);
        assert!(approx_eq(camera.borrow().z(), rest_z, EPSILON));
    }

    #[test]
    fn test_settle_offsets_ease_from_release() {
        let mut rig = rig(3);
        let config = rig.animator.config().clone();
        rig.animator
            .scrub_center_stack(&mut rig.center.borrow_mut(), ScrubDir::In, 0.8, &mut rig.camera);
        let held = rig.animator.selected_stack_offset_z();
        rig.animator.commit_scrub(StackId(0));

        rig.animator.settle_stack_animated(&rig.center, None).unwrap();
        assert!(approx_eq(rig.animator.selected_stack_offset_z(), held, EPSILON));

        rig.engine.advance(config.settle_duration * 0.5);
        let z = rig.animator.selected_stack_offset_z();
        assert!(z > 0.0 && z < held);
        assert!(approx_eq(z, rig.center.borrow().z, EPSILON));

        run(&rig.engine, config.settle_duration);
        assert_eq!(rig.animator.selected_stack_offset_z(), 0.0);
    }

    #[test]
    fn test_flip_offset_drops_lift_gradually() {
        let mut rig = rig(3);
        let config = rig.animator.config().clone();
        rig.animator
            .scrub_center_stack(&mut rig.center.borrow_mut(), ScrubDir::Up, 1.0, &mut rig.camera);
        assert!(rig.animator.commit_scrub(StackId(0)));

        rig.animator.flip_center_stack_card(&rig.center, FlipDir::Up, || {}).unwrap();
        assert!(approx_eq(rig.animator.selected_stack_offset_y(), config.lift, EPSILON));

        rig.engine.advance(config.flip_duration * 0.5);
        let y = rig.animator.selected_stack_offset_y();
        assert!(y > 0.0 && y < config.lift);

        run(&rig.engine, config.flip_duration);
        assert_eq!(rig.animator.selected_stack_offset_y(), 0.0);
    }
}
