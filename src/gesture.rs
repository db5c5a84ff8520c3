//! Input gestures and what they do on the life screen.
//!
//! Recognising gestures is the job of the input driver (touch panel or
//! buttons); this module only maps a recognised gesture to an action.

use crate::player::{PlayerMode, PlayerSlot};
use crate::settings::{Settings, StepSize};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Gesture {
    TapTop,
    TapBottom,
    TapTopLeft,
    TapTopRight,
    TapBottomLeft,
    TapBottomRight,
    SwipeUp,
    SwipeDown,
    LongPressTop,
    LongPressBottom,
    LongPressTopLeft,
    LongPressBottomLeft,
    LongPressTopRight,
    LongPressBottomRight,
    LongPressCenter,
    /// Tap on the amp button.
    AmpTap,
    /// Long press on the amp button.
    AmpLongPress,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum GestureAction {
    /// Queue `delta` on the grouper of `slot`.
    ChangeLife { slot: PlayerSlot, delta: i32 },
    OpenMenu,
    AmpIncrement,
    AmpClear,
    Ignore,
}

/// Which way a life gesture moves the total.
#[derive(Clone, Copy)]
enum Direction {
    Up,
    Down,
}

fn change(slot: PlayerSlot, dir: Direction, size: StepSize, settings: &Settings) -> GestureAction {
    let step = settings.step(size);
    let delta = match dir {
        Direction::Up => step,
        Direction::Down => step.saturating_neg(),
    };
    GestureAction::ChangeLife { slot, delta }
}

/// Map `gesture` to an action for the current layout.
///
/// Single player reacts to the top and bottom halves. Two players react
/// to the quadrants, left side for player 1 and right side for player 2.
/// The amp button only exists in single-player mode with amp enabled.
pub fn dispatch(mode: PlayerMode, gesture: Gesture, settings: &Settings) -> GestureAction {
    use Direction::{Down, Up};
    use Gesture as G;
    use StepSize::{Large, Small};

    match (mode, gesture) {
        (_, G::SwipeDown | G::LongPressCenter) => GestureAction::OpenMenu,

        (PlayerMode::OnePlayer, g) => {
            let slot = PlayerSlot::Single;
            match g {
                G::TapTop => change(slot, Up, Small, settings),
                G::TapBottom => change(slot, Down, Small, settings),
                G::LongPressTop => change(slot, Up, Large, settings),
                G::LongPressBottom => change(slot, Down, Large, settings),
                G::AmpTap if settings.amp_enabled => GestureAction::AmpIncrement,
                G::AmpLongPress if settings.amp_enabled => GestureAction::AmpClear,
                _ => GestureAction::Ignore,
            }
        }

        (PlayerMode::TwoPlayer, g) => {
            let (p1, p2) = (PlayerSlot::One, PlayerSlot::Two);
            match g {
                G::TapTopLeft => change(p1, Up, Small, settings),
                G::TapBottomLeft => change(p1, Down, Small, settings),
                G::LongPressTopLeft => change(p1, Up, Large, settings),
                G::LongPressBottomLeft => change(p1, Down, Large, settings),
                G::TapTopRight => change(p2, Up, Small, settings),
                G::TapBottomRight => change(p2, Down, Small, settings),
                G::LongPressTopRight => change(p2, Up, Large, settings),
                G::LongPressBottomRight => change(p2, Down, Large, settings),
                _ => GestureAction::Ignore,
            }
        }
    }
}
