//! Controller input samples.
//!
//! Input devices are not handled here: whoever owns them (client keyboard/mouse,
//! sandbox script) writes [`ControllerInput`] messages, and the controller folds
//! them into an [`InputFrame`] that the frame and physics systems read.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Press state of a button action.
///
/// `performed` is only true on the sample delivered when the press starts;
/// later samples for the same press (and releases) carry `performed: false`.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct ButtonSample {
    pub held: bool,
    pub performed: bool,
}

impl ButtonSample {
    pub const PRESSED: Self = Self {
        held: true,
        performed: true,
    };
    pub const HELD: Self = Self {
        held: true,
        performed: false,
    };
    pub const RELEASED: Self = Self {
        held: false,
        performed: false,
    };
}

/// One input channel sample
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub enum ControllerAction {
    Move(Vec2),
    Look(Vec2),
    Jump(ButtonSample),
    Fire(ButtonSample),
    Fire2(ButtonSample),
}

/// Input sample delivered to every [`crate::PlayerController`]
#[derive(Message, Clone, Copy, Debug, PartialEq)]
pub struct ControllerInput(pub ControllerAction);

/// Latest input state seen by a controller
#[derive(Component, Clone, Debug, Default, PartialEq)]
pub struct InputFrame {
    pub move_axis: Vec2,
    pub look_axis: Vec2,
    pub jump_held: bool,
    pub fire_held: bool,
    /// Rising-edge latch for fire; cleared only by [`InputFrame::take_fire_pressed`]
    pub fire_pressed: bool,
    pub fire2_held: bool,
}

impl InputFrame {
    /// Fold one sample into the frame. Axis values are stored unchecked.
    pub fn apply(&mut self, action: ControllerAction) {
        match action {
            ControllerAction::Move(axis) => self.move_axis = axis,
            ControllerAction::Look(delta) => self.look_axis = delta,
            ControllerAction::Jump(sample) => self.jump_held = sample.held,
            ControllerAction::Fire(sample) => {
                self.fire_held = sample.held;
                if sample.performed {
                    self.fire_pressed = true;
                }
            }
            ControllerAction::Fire2(sample) => self.fire2_held = sample.held,
        }
    }

    /// Consume the fire edge. Returns true at most once per press.
    pub fn take_fire_pressed(&mut self) -> bool {
        std::mem::take(&mut self.fire_pressed)
    }
}
