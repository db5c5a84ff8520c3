//! Runtime settings stored in the key-value store.

use crate::config::{
    DEFAULT_LIFE_INCREMENT_LARGE, DEFAULT_LIFE_INCREMENT_SMALL, DEFAULT_LIFE_MAX, KEY_AMP_MODE,
    KEY_LIFE_MAX, KEY_LIFE_STEP_LARGE, KEY_LIFE_STEP_SMALL, KEY_PLAYER_MODE,
};
use crate::error::Error;
use crate::player::PlayerMode;
use crate::store::KeyValueStore;

/// Which configured increment a gesture applies.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StepSize {
    /// Tap.
    Small,
    /// Long press.
    Large,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Settings {
    pub max_life: i32,
    pub small_step: i32,
    pub large_step: i32,
    pub player_mode: PlayerMode,
    /// Show the amp counter in single-player mode.
    pub amp_enabled: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            max_life: DEFAULT_LIFE_MAX,
            small_step: DEFAULT_LIFE_INCREMENT_SMALL,
            large_step: DEFAULT_LIFE_INCREMENT_LARGE,
            player_mode: PlayerMode::OnePlayer,
            amp_enabled: false,
        }
    }
}

impl Settings {
    pub fn load<S>(store: &mut S) -> Self
    where
        S: KeyValueStore + ?Sized,
    {
        let settings = Self {
            max_life: store.get_int(KEY_LIFE_MAX, DEFAULT_LIFE_MAX),
            small_step: store.get_int(KEY_LIFE_STEP_SMALL, DEFAULT_LIFE_INCREMENT_SMALL),
            large_step: store.get_int(KEY_LIFE_STEP_LARGE, DEFAULT_LIFE_INCREMENT_LARGE),
            player_mode: PlayerMode::from_store(store.get_int(KEY_PLAYER_MODE, 0)),
            amp_enabled: store.get_int(KEY_AMP_MODE, 0) == 1,
        };
        debug!("settings: {:?}", settings);
        settings
    }

    pub fn step(&self, size: StepSize) -> i32 {
        match size {
            StepSize::Small => self.small_step,
            StepSize::Large => self.large_step,
        }
    }

    /// Flip between one and two players and persist the new mode.
    pub fn toggle_player_mode<S>(&mut self, store: &mut S) -> Result<PlayerMode, Error>
    where
        S: KeyValueStore + ?Sized,
    {
        let mode = self.player_mode.toggled();
        store.put_int(KEY_PLAYER_MODE, mode.to_store())?;
        self.player_mode = mode;
        info!("player mode -> {:?}", mode);
        Ok(mode)
    }

    pub fn set_amp_enabled<S>(&mut self, store: &mut S, enabled: bool) -> Result<(), Error>
    where
        S: KeyValueStore + ?Sized,
    {
        store.put_int(KEY_AMP_MODE, enabled as i32)?;
        self.amp_enabled = enabled;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[test]
    fn empty_store_gives_defaults() {
        let mut store = MemoryStore::new();
        assert_eq!(Settings::load(&mut store), Settings::default());
    }

    #[test]
    fn loads_stored_values() {
        let mut store = MemoryStore::new();
        store.put_int(KEY_LIFE_MAX, 8000).unwrap();
        store.put_int(KEY_LIFE_STEP_SMALL, 50).unwrap();
        store.put_int(KEY_LIFE_STEP_LARGE, 500).unwrap();
        store.put_int(KEY_PLAYER_MODE, 1).unwrap();
        store.put_int(KEY_AMP_MODE, 1).unwrap();

        let s = Settings::load(&mut store);
        assert_eq!(s.max_life, 8000);
        assert_eq!(s.step(StepSize::Small), 50);
        assert_eq!(s.step(StepSize::Large), 500);
        assert_eq!(s.player_mode, PlayerMode::TwoPlayer);
        assert!(s.amp_enabled);
    }

    #[test]
    fn toggle_persists_mode() {
        let mut store = MemoryStore::new();
        let mut s = Settings::load(&mut store);

        assert_eq!(s.toggle_player_mode(&mut store), Ok(PlayerMode::TwoPlayer));
        assert_eq!(store.get_int(KEY_PLAYER_MODE, -1), 1);
        assert_eq!(Settings::load(&mut store).player_mode, PlayerMode::TwoPlayer);

        assert_eq!(s.toggle_player_mode(&mut store), Ok(PlayerMode::OnePlayer));
        assert_eq!(store.get_int(KEY_PLAYER_MODE, -1), 0);
    }

    #[test]
    fn amp_flag_roundtrips() {
        let mut store = MemoryStore::new();
        let mut s = Settings::default();
        s.set_amp_enabled(&mut store, true).unwrap();
        assert!(Settings::load(&mut store).amp_enabled);
    }
}
