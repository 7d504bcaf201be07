use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A player intent, decoupled from whatever key produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    TurnLeft,
    TurnRight,
    MoveForward,
    MoveBackward,
}

impl Action {
    pub const ALL: [Action; 4] = [
        Action::TurnLeft,
        Action::TurnRight,
        Action::MoveForward,
        Action::MoveBackward,
    ];

    fn bit(self) -> u8 {
        match self {
            Action::TurnLeft => 1,
            Action::TurnRight => 1 << 1,
            Action::MoveForward => 1 << 2,
            Action::MoveBackward => 1 << 3,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Action::TurnLeft => "left",
            Action::TurnRight => "right",
            Action::MoveForward => "forward",
            Action::MoveBackward => "backward",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown action {0:?} (expected forward, backward, left or right)")]
pub struct ParseActionError(pub String);

impl FromStr for Action {
    type Err = ParseActionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "left" | "turn-left" | "turn_left" => Ok(Action::TurnLeft),
            "right" | "turn-right" | "turn_right" => Ok(Action::TurnRight),
            "forward" | "move-forward" | "move_forward" => Ok(Action::MoveForward),
            "backward" | "move-backward" | "move_backward" => Ok(Action::MoveBackward),
            other => Err(ParseActionError(other.to_string())),
        }
    }
}

/// The set of actions currently held down.
///
/// `Copy`, so a frame loop can take a consistent snapshot by value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct HeldActions(u8);

impl HeldActions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn press(&mut self, action: Action) {
        self.0 |= action.bit();
    }

    pub fn release(&mut self, action: Action) {
        self.0 &= !action.bit();
    }

    /// Press or release depending on `pressed`.
    pub fn set(&mut self, action: Action, pressed: bool) {
        if pressed {
            self.press(action);
        } else {
            self.release(action);
        }
    }

    pub fn is_held(&self, action: Action) -> bool {
        self.0 & action.bit() != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn clear(&mut self) {
        self.0 = 0;
    }

    pub fn iter(&self) -> impl Iterator<Item = Action> + '_ {
        Action::ALL.into_iter().filter(|a| self.is_held(*a))
    }

    /// +1 for turn-left, -1 for turn-right, summed.
    pub fn turn_axis(&self) -> f32 {
        axis(
            self.is_held(Action::TurnLeft),
            self.is_held(Action::TurnRight),
        )
    }

    /// +1 for move-forward, -1 for move-backward, summed.
    pub fn forward_axis(&self) -> f32 {
        axis(
            self.is_held(Action::MoveForward),
            self.is_held(Action::MoveBackward),
        )
    }
}

fn axis(positive: bool, negative: bool) -> f32 {
    f32::from(u8::from(positive)) - f32::from(u8::from(negative))
}

impl FromIterator<Action> for HeldActions {
    fn from_iter<I: IntoIterator<Item = Action>>(iter: I) -> Self {
        let mut held = Self::new();
        for action in iter {
            held.press(action);
        }
        held
    }
}
