//! Card stacks
//!
//! An ordered pile of cards with a group transform. Index 0 is the front
//! card; deeper cards sit further back and a little higher, fading with
//! depth.

use std::cell::RefCell;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use whimsy_animation::{Animatable, TweenProperty};
use whimsy_core::Mat4;

use crate::card::Card;

/// Stable identity of a stack
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StackId(pub u32);

/// Rotation direction for [`CardStack::shift_cards`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShiftDir {
    /// Front card moves to the back
    Forward,
    /// Back card moves to the front
    Backward,
}

/// Resting offsets between cards of a stack
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StackLayout {
    /// Local y step per slot
    pub step_y: f32,
    /// Local z step per slot (slots recede along -Z)
    pub step_z: f32,
    /// Alpha removed per slot
    pub fade: f32,
}

impl Default for StackLayout {
    fn default() -> Self {
        Self {
            step_y: 14.0,
            step_z: 40.0,
            fade: 0.18,
        }
    }
}

impl StackLayout {
    pub fn slot_y(&self, slot: usize) -> f32 {
        slot as f32 * self.step_y
    }

    pub fn slot_z(&self, slot: usize) -> f32 {
        -(slot as f32) * self.step_z
    }

    pub fn slot_alpha(&self, slot: usize) -> f32 {
        -(slot as f32 * self.fade).min(1.0)
    }
}

pub type SharedCard = Rc<RefCell<Card>>;

pub struct CardStack {
    id: StackId,
    cards: Vec<SharedCard>,
    pub layout: StackLayout,

    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub sx: f32,
    pub sy: f32,
}

impl CardStack {
    pub fn new(id: StackId, layout: StackLayout) -> Self {
        Self {
            id,
            cards: Vec::new(),
            layout,
            x: 0.0,
            y: 0.0,
            z: 0.0,
            sx: 1.0,
            sy: 1.0,
        }
    }

    /// Build a stack of `count` cards sized `width` x `height`, laid out
    pub fn with_cards(id: StackId, layout: StackLayout, count: u32, width: f32, height: f32) -> Self {
        let mut stack = Self::new(id, layout);
        for card_id in 0..count {
            stack.push_card(Card::new(card_id, width, height));
        }
        stack.layout_cards();
        stack
    }

    pub fn id(&self) -> StackId {
        self.id
    }

    pub fn push_card(&mut self, card: Card) -> SharedCard {
        let card = Rc::new(RefCell::new(card));
        self.cards.push(card.clone());
        card
    }

    pub fn cards(&self) -> &[SharedCard] {
        &self.cards
    }

    pub fn card(&self, index: usize) -> Option<&SharedCard> {
        self.cards.get(index)
    }

    pub fn front(&self) -> Option<&SharedCard> {
        self.cards.first()
    }

    pub fn back(&self) -> Option<&SharedCard> {
        self.cards.last()
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Ids of the cards, front to back
    pub fn order(&self) -> Vec<u32> {
        self.cards.iter().map(|card| card.borrow().id).collect()
    }

    /// Rotate the card order by one
    pub fn shift_cards(&mut self, dir: ShiftDir) {
        if self.cards.len() < 2 {
            return;
        }
        match dir {
            ShiftDir::Forward => self.cards.rotate_left(1),
            ShiftDir::Backward => self.cards.rotate_right(1),
        }
        tracing::trace!(stack = self.id.0, ?dir, "cards shifted");
    }

    /// Put every card at its resting slot, clearing rotation and scale
    pub fn layout_cards(&mut self) {
        for (slot, card) in self.cards.iter().enumerate() {
            let mut card = card.borrow_mut();
            card.set_origin(0.0, self.layout.slot_y(slot), self.layout.slot_z(slot));
            card.rx = 0.0;
            card.ry = 0.0;
            card.rz = 0.0;
            card.sx = 1.0;
            card.sy = 1.0;
            card.sz = 1.0;
            card.set_alpha_modifier(self.layout.slot_alpha(slot));
        }
    }

    /// Local z a card at `index` rests at
    pub fn selected_card_offset_z(&self, index: usize) -> f32 {
        self.layout.slot_z(index)
    }

    /// Group transform: translate * scale
    pub fn matrix(&self) -> Mat4 {
        Mat4::translation(self.x, self.y, self.z).mul(&Mat4::scale(self.sx, self.sy, 1.0))
    }

    pub fn card_world_matrix(&self, index: usize) -> Option<Mat4> {
        self.cards
            .get(index)
            .map(|card| self.matrix().mul(&card.borrow().model_matrix()))
    }
}

impl Animatable for CardStack {
    fn property(&self, property: TweenProperty) -> Option<f32> {
        match property {
            TweenProperty::X => Some(self.x),
            TweenProperty::Y => Some(self.y),
            TweenProperty::Z => Some(self.z),
            TweenProperty::Sx => Some(self.sx),
            TweenProperty::Sy => Some(self.sy),
            _ => None,
        }
    }

    fn set_property(&mut self, property: TweenProperty, value: f32) {
        match property {
            TweenProperty::X => self.x = value,
            TweenProperty::Y => self.y = value,
            TweenProperty::Z => self.z = value,
            TweenProperty::Sx => self.sx = value,
            TweenProperty::Sy => self.sy = value,
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use whimsy_core::{approx_eq, Vec3};

    fn make_stack(count: u32) -> CardStack {
        CardStack::with_cards(StackId(1), StackLayout::default(), count, 300.0, 200.0)
    }

    #[test]
    fn test_shift_rotates_by_one() {
        let mut stack = make_stack(4);
        stack.shift_cards(ShiftDir::Forward);
        assert_eq!(stack.order(), vec![1, 2, 3, 0]);
        stack.shift_cards(ShiftDir::Backward);
        stack.shift_cards(ShiftDir::Backward);
        assert_eq!(stack.order(), vec![3, 0, 1, 2]);
    }

    #[test]
    fn test_shift_small_stacks_is_noop() {
        let mut stack = make_stack(1);
        stack.shift_cards(ShiftDir::Forward);
        assert_eq!(stack.order(), vec![0]);

        let mut empty = make_stack(0);
        empty.shift_cards(ShiftDir::Backward);
        assert!(empty.is_empty());
    }

    #[test]
    fn test_layout_slots() {
        let mut stack = make_stack(3);
        stack.shift_cards(ShiftDir::Forward);
        stack.layout_cards();

        let layout = stack.layout;
        for (slot, card) in stack.cards().iter().enumerate() {
            let card = card.borrow();
            assert_eq!(card.y, layout.slot_y(slot));
            assert_eq!(card.z, stack.selected_card_offset_z(slot));
            assert_eq!(card.alpha_modifier(), layout.slot_alpha(slot));
        }
        assert_eq!(stack.front().unwrap().borrow().id, 1);
        assert_eq!(stack.back().unwrap().borrow().id, 0);
    }

    #[test]
    fn test_card_world_matrix_applies_group() {
        let mut stack = make_stack(2);
        stack.x = 100.0;
        stack.sx = 2.0;
        let world = stack.card_world_matrix(1).unwrap();
        let p = world.transform_point(Vec3::new(1.0, 0.0, 0.0));
        assert!(approx_eq(p.x, 102.0, 1e-4));
        assert!(approx_eq(p.z, stack.layout.slot_z(1), 1e-4));
        assert!(stack.card_world_matrix(5).is_none());
    }

    #[test]
    fn test_group_properties_only() {
        let mut stack = make_stack(1);
        stack.set_property(TweenProperty::Sy, 1.5);
        stack.set_property(TweenProperty::Rx, 1.0);
        assert_eq!(stack.property(TweenProperty::Sy), Some(1.5));
        assert_eq!(stack.property(TweenProperty::Rx), None);
    }
}
