//! Frame driver
//!
//! [`Gallery`] owns the tween engine, the camera, the animator and the three
//! card stacks. Input is latched between frames and applied at the start of
//! [`Gallery::update`], which then runs the frame in a fixed order:
//!
//! 1. gesture input → animator
//! 2. tween engine advance
//! 3. camera view matrix update
//!
//! Rendering happens after `update` and is not part of this crate.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Instant;

use tracing::{debug, info};
use whimsy_animation::TweenEngine;
use whimsy_core::Vec2;

use crate::camera::Camera;
use crate::card_stack::{CardStack, StackId};
use crate::config::AnimatorConfig;
use crate::error::Result;
use crate::gesture::{FlipDir, GestureState, JumpDir, ScrubDir};
use crate::stack_anim::CardStackAnimator;

/// Stack ids used by the gallery
pub const CENTER_STACK: StackId = StackId(0);
pub const LEFT_STACK: StackId = StackId(1);
pub const RIGHT_STACK: StackId = StackId(2);

/// Something that finished during a frame
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GalleryEvent {
    FlipFinished(FlipDir),
    JumpFinished(JumpDir),
}

#[derive(Clone, Copy, Debug, Default)]
struct PendingInput {
    scrub: Option<(ScrubDir, f32)>,
    commit: bool,
    flip: Option<FlipDir>,
    jump: Option<JumpDir>,
}

pub struct Gallery {
    engine: TweenEngine,
    camera: Rc<RefCell<Camera>>,
    animator: CardStackAnimator,
    center: Rc<RefCell<CardStack>>,
    left: Rc<RefCell<CardStack>>,
    right: Rc<RefCell<CardStack>>,
    input: PendingInput,
    events: Rc<RefCell<Vec<GalleryEvent>>>,
}

impl Gallery {
    /// Build a gallery of three stacks of `cards` cards each
    pub fn new(width: f32, height: f32, cards: u32, config: AnimatorConfig) -> Result<Self> {
        let engine = TweenEngine::new();
        let camera = Camera::new(width, height, 1.0)?;

        let card_width = width * 0.28;
        let card_height = card_width * 0.7;
        let make = |id: StackId, x: f32| {
            let mut stack = CardStack::with_cards(id, config.stack, cards, card_width, card_height);
            stack.x = x;
            Rc::new(RefCell::new(stack))
        };
        let center = make(CENTER_STACK, 0.0);
        let left = make(LEFT_STACK, -width * 0.36);
        let right = make(RIGHT_STACK, width * 0.36);

        let mut animator = CardStackAnimator::new(width, height, engine.handle(), config);
        animator.prepare_anim_for(&center.borrow(), &left.borrow(), &right.borrow());
        info!(width, height, cards, "gallery ready");

        Ok(Self {
            engine,
            camera: Rc::new(RefCell::new(camera)),
            animator,
            center,
            left,
            right,
            input: PendingInput::default(),
            events: Rc::new(RefCell::new(Vec::new())),
        })
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Input (latched until the next update)
    // ─────────────────────────────────────────────────────────────────────────

    /// Drive a scrub to `pct` on the next frame
    pub fn set_scrub(&mut self, dir: ScrubDir, pct: f32) {
        self.input.scrub = Some((dir, pct));
    }

    /// Release the current scrub on the next frame
    ///
    /// A scrub released at 100% commits: depth scrubs keep their focus,
    /// vertical scrubs turn into a flip. Anything short of that eases back.
    pub fn commit_scrub(&mut self) {
        self.input.commit = true;
    }

    pub fn request_flip(&mut self, dir: FlipDir) {
        self.input.flip = Some(dir);
    }

    pub fn request_jump(&mut self, dir: JumpDir) {
        self.input.jump = Some(dir);
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Frame
    // ─────────────────────────────────────────────────────────────────────────

    /// Run one frame; returns whether tweens are still running
    pub fn update(&mut self, dt: f32) -> Result<bool> {
        self.apply_input()?;
        let active = self.engine.advance(dt);
        self.camera.borrow_mut().update_view_matrix();
        Ok(active)
    }

    fn apply_input(&mut self) -> Result<()> {
        let input = std::mem::take(&mut self.input);

        if let Some((dir, pct)) = input.scrub {
            let mut camera = self.camera.borrow_mut();
            self.animator
                .scrub_center_stack(&mut self.center.borrow_mut(), dir, pct, &mut camera);
            self.animator.scrub_left_stack(&mut self.left.borrow_mut(), dir, pct);
            self.animator.scrub_right_stack(&mut self.right.borrow_mut(), dir, pct);
        }
        if input.commit {
            self.release_scrub()?;
        }
        if let Some(dir) = input.flip {
            self.flip(dir)?;
        }
        if let Some(dir) = input.jump {
            self.jump(dir)?;
        }
        Ok(())
    }

    fn release_scrub(&mut self) -> Result<()> {
        let GestureState::Scrubbing { dir, .. } = self.animator.gesture_state(CENTER_STACK) else {
            return Ok(());
        };
        let committed = self.animator.commit_scrub(CENTER_STACK);
        self.animator.commit_scrub(LEFT_STACK);
        self.animator.commit_scrub(RIGHT_STACK);
        debug!(?dir, committed, "scrub released");

        match (committed, dir) {
            (true, ScrubDir::In | ScrubDir::Out) => Ok(()),
            (true, ScrubDir::Up | ScrubDir::Down) => {
                self.animator.settle_stack_animated(&self.left, None)?;
                self.animator.settle_stack_animated(&self.right, None)?;
                self.flip(if dir == ScrubDir::Up { FlipDir::Up } else { FlipDir::Down })
            }
            (false, _) => {
                self.animator.settle_stack_animated(&self.center, Some(&self.camera))?;
                self.animator.settle_stack_animated(&self.left, None)?;
                self.animator.settle_stack_animated(&self.right, None)
            }
        }
    }

    /// Center gestures started mid-scrub put the side stacks and the camera
    /// back at rest; the animator settles the center itself
    fn drop_scrub(&mut self) {
        let center_scrubbing = matches!(self.animator.gesture_state(CENTER_STACK), GestureState::Scrubbing { .. });
        for side in [&self.left, &self.right] {
            let id = side.borrow().id();
            if matches!(self.animator.gesture_state(id), GestureState::Scrubbing { .. }) {
                self.animator.abort_gesture(&mut side.borrow_mut());
            }
        }
        if center_scrubbing {
            self.animator.settle_camera(&mut self.camera.borrow_mut());
            debug!("unfinished scrub dropped");
        }
    }

    fn flip(&mut self, dir: FlipDir) -> Result<()> {
        self.drop_scrub();
        let events = Rc::downgrade(&self.events);
        self.animator.flip_center_stack_card(&self.center, dir, move || {
            if let Some(events) = events.upgrade() {
                events.borrow_mut().push(GalleryEvent::FlipFinished(dir));
            }
        })
    }

    fn jump(&mut self, dir: JumpDir) -> Result<()> {
        self.drop_scrub();
        let events = Rc::downgrade(&self.events);
        self.animator.center_stack_jump(&self.center, dir, move || {
            if let Some(events) = events.upgrade() {
                events.borrow_mut().push(GalleryEvent::JumpFinished(dir));
            }
        })
    }

    /// Events raised since the last call, oldest first
    pub fn drain_events(&mut self) -> Vec<GalleryEvent> {
        std::mem::take(&mut *self.events.borrow_mut())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Queries
    // ─────────────────────────────────────────────────────────────────────────

    pub fn engine(&self) -> &TweenEngine {
        &self.engine
    }

    pub fn camera(&self) -> &Rc<RefCell<Camera>> {
        &self.camera
    }

    pub fn animator(&self) -> &CardStackAnimator {
        &self.animator
    }

    pub fn center(&self) -> &Rc<RefCell<CardStack>> {
        &self.center
    }

    pub fn left(&self) -> &Rc<RefCell<CardStack>> {
        &self.left
    }

    pub fn right(&self) -> &Rc<RefCell<CardStack>> {
        &self.right
    }

    pub fn stacks(&self) -> [&Rc<RefCell<CardStack>>; 3] {
        [&self.center, &self.left, &self.right]
    }

    pub fn is_animating(&self) -> bool {
        self.engine.has_active()
    }

    /// Front-most card under a screen point, as `(stack, card id)`
    ///
    /// The center stack is tested first since it is drawn on top.
    pub fn hit_test(&self, screen: Vec2) -> Result<Option<(StackId, u32)>> {
        let camera = self.camera.borrow();
        for stack in self.stacks() {
            let stack = stack.borrow();
            let parent = stack.matrix();
            for card in stack.cards() {
                let card = card.borrow();
                if card.contains_screen_point(&parent, &camera, screen)? {
                    return Ok(Some((stack.id(), card.id)));
                }
            }
        }
        Ok(None)
    }
}

/// Turns wall-clock instants into frame deltas
#[derive(Clone, Copy, Debug)]
pub struct FrameClock {
    last: Option<Instant>,
    /// Upper bound on a single delta, so a stall does not skip animations
    max_dt: f32,
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new(0.1)
    }
}

impl FrameClock {
    pub fn new(max_dt: f32) -> Self {
        Self { last: None, max_dt }
    }

    /// Seconds since the previous tick; the first tick yields 0
    pub fn tick(&mut self, now: Instant) -> f32 {
        let dt = self
            .last
            .map(|last| now.saturating_duration_since(last).as_secs_f32())
            .unwrap_or(0.0);
        self.last = Some(now);
        dt.min(self.max_dt)
    }

    pub fn reset(&mut self) {
        self.last = None;
    }
}
