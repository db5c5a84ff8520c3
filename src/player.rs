//! Player slots and play modes.

/// Which life total a grouper, arc or stored value belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PlayerSlot {
    /// The only player in single-player mode.
    Single,
    /// Left side in two-player mode.
    One,
    /// Right side in two-player mode.
    Two,
}

impl PlayerSlot {
    /// Numeric id used in history rows (0, 1 or 2).
    pub const fn id(self) -> u8 {
        match self {
            PlayerSlot::Single => 0,
            PlayerSlot::One => 1,
            PlayerSlot::Two => 2,
        }
    }

    pub const fn from_id(id: u8) -> Option<Self> {
        match id {
            0 => Some(PlayerSlot::Single),
            1 => Some(PlayerSlot::One),
            2 => Some(PlayerSlot::Two),
            _ => None,
        }
    }
}

/// Single or two-player screen layout.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PlayerMode {
    #[default]
    OnePlayer,
    TwoPlayer,
}

impl PlayerMode {
    /// Decode the stored value; anything unknown falls back to one player.
    pub const fn from_store(value: i32) -> Self {
        match value {
            1 => PlayerMode::TwoPlayer,
            _ => PlayerMode::OnePlayer,
        }
    }

    pub const fn to_store(self) -> i32 {
        match self {
            PlayerMode::OnePlayer => 0,
            PlayerMode::TwoPlayer => 1,
        }
    }

    pub const fn toggled(self) -> Self {
        match self {
            PlayerMode::OnePlayer => PlayerMode::TwoPlayer,
            PlayerMode::TwoPlayer => PlayerMode::OnePlayer,
        }
    }

    /// Slots that hold a life total in this mode.
    pub const fn slots(self) -> &'static [PlayerSlot] {
        match self {
            PlayerMode::OnePlayer => &[PlayerSlot::Single],
            PlayerMode::TwoPlayer => &[PlayerSlot::One, PlayerSlot::Two],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slot_ids_roundtrip() {
        for slot in [PlayerSlot::Single, PlayerSlot::One, PlayerSlot::Two] {
            assert_eq!(PlayerSlot::from_id(slot.id()), Some(slot));
        }
        assert_eq!(PlayerSlot::from_id(3), None);
    }

    #[test]
    fn unknown_stored_mode_is_one_player() {
        assert_eq!(PlayerMode::from_store(1), PlayerMode::TwoPlayer);
        assert_eq!(PlayerMode::from_store(0), PlayerMode::OnePlayer);
        assert_eq!(PlayerMode::from_store(7), PlayerMode::OnePlayer);
        assert_eq!(PlayerMode::from_store(-1), PlayerMode::OnePlayer);
    }

    #[test]
    fn mode_slots() {
        assert_eq!(PlayerMode::OnePlayer.slots(), &[PlayerSlot::Single]);
        assert_eq!(
            PlayerMode::TwoPlayer.slots(),
            &[PlayerSlot::One, PlayerSlot::Two]
        );
        assert_eq!(PlayerMode::OnePlayer.toggled(), PlayerMode::TwoPlayer);
    }
}
