//! Three-button input mapped onto life counter gestures.
//!
//! The board has UP, DOWN and SELECT instead of a touch panel:
//!
//! | Button | Short press                   | Long press           |
//! |--------|-------------------------------|----------------------|
//! | UP     | tap top (of the active side)  | long-press top       |
//! | DOWN   | tap bottom                    | long-press bottom    |
//! | SELECT | amp tap / switch active side  | reset the counter    |

use crate::config::LONG_PRESS_MS;
use crate::gesture::Gesture;
use crate::player::PlayerMode;

/// Physical button events (after debouncing).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ButtonEvent {
    Up,
    Down,
    Select,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PressKind {
    Short,
    Long,
}

/// A debounced press and how long it was held.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ButtonPress {
    pub button: ButtonEvent,
    pub kind: PressKind,
}

/// Side UP/DOWN act on in two-player mode.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Side {
    #[default]
    Left,
    Right,
}

impl Side {
    pub fn toggled(self) -> Self {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ButtonCommand {
    Gesture(Gesture),
    ToggleSide,
    Reset,
}

/// Classify a press by hold time.
pub fn press_kind(held_ms: u64) -> PressKind {
    if held_ms >= LONG_PRESS_MS {
        PressKind::Long
    } else {
        PressKind::Short
    }
}

/// What a button press means for the current layout.
pub fn command_for(mode: PlayerMode, side: Side, press: ButtonPress) -> ButtonCommand {
    use ButtonEvent::{Down, Select, Up};
    use PressKind::{Long, Short};

    let gesture = match (mode, side, press.button, press.kind) {
        (_, _, Select, Long) => return ButtonCommand::Reset,
        (PlayerMode::OnePlayer, _, Select, Short) => Gesture::AmpTap,
        (PlayerMode::TwoPlayer, _, Select, Short) => return ButtonCommand::ToggleSide,

        (PlayerMode::OnePlayer, _, Up, Short) => Gesture::TapTop,
        (PlayerMode::OnePlayer, _, Up, Long) => Gesture::LongPressTop,
        (PlayerMode::OnePlayer, _, Down, Short) => Gesture::TapBottom,
        (PlayerMode::OnePlayer, _, Down, Long) => Gesture::LongPressBottom,

        (PlayerMode::TwoPlayer, Side::Left, Up, Short) => Gesture::TapTopLeft,
        (PlayerMode::TwoPlayer, Side::Left, Up, Long) => Gesture::LongPressTopLeft,
        (PlayerMode::TwoPlayer, Side::Left, Down, Short) => Gesture::TapBottomLeft,
        (PlayerMode::TwoPlayer, Side::Left, Down, Long) => Gesture::LongPressBottomLeft,
        (PlayerMode::TwoPlayer, Side::Right, Up, Short) => Gesture::TapTopRight,
        (PlayerMode::TwoPlayer, Side::Right, Up, Long) => Gesture::LongPressTopRight,
        (PlayerMode::TwoPlayer, Side::Right, Down, Short) => Gesture::TapBottomRight,
        (PlayerMode::TwoPlayer, Side::Right, Down, Long) => Gesture::LongPressBottomRight,
    };
    ButtonCommand::Gesture(gesture)
}
