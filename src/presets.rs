//! Trading card game presets.
//!
//! Ten slots with factory defaults. A slot is overridden from the store
//! only if its stored name is non-empty, so an empty store yields the
//! defaults.

use core::fmt::Write;

use heapless::String;

use crate::config::{KEY_LIFE_MAX, KEY_LIFE_STEP_LARGE, KEY_LIFE_STEP_SMALL, KEY_PRESET_INDEX};
use crate::error::Error;
use crate::store::{KeyValueStore, MAX_KEY_LEN};

pub const PRESET_COUNT: usize = 10;

/// Longest preset name accepted when saving (characters).
pub const PRESET_NAME_MAX_CHARS: usize = 20;

pub type PresetName = String<32>;

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TcgPreset {
    pub name: PresetName,
    pub starting_life: i32,
    pub small_step: i32,
    pub large_step: i32,
}

impl TcgPreset {
    fn new(name: &str, starting_life: i32, small_step: i32, large_step: i32) -> Self {
        Self {
            name: truncate_name(name),
            starting_life,
            small_step,
            large_step,
        }
    }
}

const FACTORY: [(&str, i32, i32, i32); PRESET_COUNT] = [
    ("MTG Standard", 20, 1, 5),
    ("MTG Commander", 40, 1, 10),
    ("Pokemon TCG", 60, 10, 30),
    ("Yu-Gi-Oh!", 8000, 50, 500),
    ("Flesh & Blood", 40, 1, 5),
    ("Lorcana", 20, 1, 5),
    ("One Piece TCG", 5, 1, 2),
    ("Custom 8", 20, 1, 5),
    ("Custom 9", 20, 1, 5),
    ("Custom 10", 20, 1, 5),
];

/// First [`PRESET_NAME_MAX_CHARS`] characters of `name`.
pub fn truncate_name(name: &str) -> PresetName {
    let mut out = PresetName::new();
    for c in name.chars().take(PRESET_NAME_MAX_CHARS) {
        if out.push(c).is_err() {
            break;
        }
    }
    out
}

#[derive(Clone, Copy)]
enum Field {
    Name,
    Life,
    Small,
    Large,
}

fn preset_key(index: usize, field: Field) -> String<MAX_KEY_LEN> {
    let suffix = match field {
        Field::Name => "name",
        Field::Life => "life",
        Field::Small => "small",
        Field::Large => "large",
    };
    let mut key = String::new();
    // "preset_9_small" is the longest key and fits.
    let _ = write!(key, "preset_{}_{}", index, suffix);
    key
}

/// All presets plus the active index.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PresetTable {
    presets: [TcgPreset; PRESET_COUNT],
    active: usize,
}

impl Default for PresetTable {
    fn default() -> Self {
        Self {
            presets: FACTORY.map(|(name, life, small, large)| TcgPreset::new(name, life, small, large)),
            active: 0,
        }
    }
}

impl PresetTable {
    /// Factory defaults overlaid with stored presets and the stored active index.
    pub fn load<S>(store: &mut S) -> Self
    where
        S: KeyValueStore + ?Sized,
    {
        let mut table = Self::default();

        for (i, preset) in table.presets.iter_mut().enumerate() {
            let name = store.get_string(&preset_key(i, Field::Name), "");
            if name.is_empty() {
                continue;
            }
            preset.name = truncate_name(&name);
            preset.starting_life = store.get_int(&preset_key(i, Field::Life), preset.starting_life);
            preset.small_step = store.get_int(&preset_key(i, Field::Small), preset.small_step);
            preset.large_step = store.get_int(&preset_key(i, Field::Large), preset.large_step);
            debug!("preset {=usize} loaded from store", i);
        }

        let idx = store.get_int(KEY_PRESET_INDEX, 0);
        table.active = if (0..PRESET_COUNT as i32).contains(&idx) {
            idx as usize
        } else {
            warn!("invalid preset index {=i32}, using 0", idx);
            0
        };
        table
    }

    pub fn get(&self, index: usize) -> Option<&TcgPreset> {
        self.presets.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &TcgPreset> {
        self.presets.iter()
    }

    pub fn active_index(&self) -> usize {
        self.active
    }

    pub fn active(&self) -> &TcgPreset {
        &self.presets[self.active]
    }

    /// Replace slot `index` and write it to the store.
    ///
    /// The name is cut to [`PRESET_NAME_MAX_CHARS`]. An empty name is
    /// stored as-is and makes the slot fall back to its default on the
    /// next load.
    pub fn save<S>(&mut self, store: &mut S, index: usize, preset: TcgPreset) -> Result<(), Error>
    where
        S: KeyValueStore + ?Sized,
    {
        let slot = self.presets.get_mut(index).ok_or(Error::InvalidIndex)?;
        let preset = TcgPreset {
            name: truncate_name(&preset.name),
            ..preset
        };

        store.put_string(&preset_key(index, Field::Name), &preset.name)?;
        store.put_int(&preset_key(index, Field::Life), preset.starting_life)?;
        store.put_int(&preset_key(index, Field::Small), preset.small_step)?;
        store.put_int(&preset_key(index, Field::Large), preset.large_step)?;

        info!(
            "preset {=usize} saved: {=str} ({=i32}/{=i32}/{=i32})",
            index,
            preset.name.as_str(),
            preset.starting_life,
            preset.small_step,
            preset.large_step
        );
        *slot = preset;
        Ok(())
    }

    /// Make `index` the active preset and write its life and steps as the
    /// current settings. Returns the preset; out-of-range indices are
    /// rejected without touching the store.
    pub fn select<S>(&mut self, store: &mut S, index: usize) -> Result<&TcgPreset, Error>
    where
        S: KeyValueStore + ?Sized,
    {
        if index >= PRESET_COUNT {
            return Err(Error::InvalidIndex);
        }
        self.active = index;
        let preset = &self.presets[index];

        store.put_int(KEY_PRESET_INDEX, index as i32)?;
        store.put_int(KEY_LIFE_MAX, preset.starting_life)?;
        store.put_int(KEY_LIFE_STEP_SMALL, preset.small_step)?;
        store.put_int(KEY_LIFE_STEP_LARGE, preset.large_step)?;

        info!(
            "applied preset {=str} with {=i32} life",
            preset.name.as_str(),
            preset.starting_life
        );
        Ok(preset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[test]
    fn factory_defaults() {
        let table = PresetTable::default();
        let yugioh = table.get(3).unwrap();
        assert_eq!(yugioh.name.as_str(), "Yu-Gi-Oh!");
        assert_eq!((yugioh.starting_life, yugioh.small_step, yugioh.large_step), (8000, 50, 500));
        assert_eq!(table.get(6).unwrap().starting_life, 5);
        assert_eq!(table.get(9).unwrap().name.as_str(), "Custom 10");
        assert!(table.get(10).is_none());
        assert_eq!(table.active_index(), 0);
        assert_eq!(table.iter().count(), PRESET_COUNT);
    }

    #[test]
    fn keys_fit_store_limit() {
        assert_eq!(preset_key(9, Field::Small).as_str(), "preset_9_small");
        assert_eq!(preset_key(0, Field::Name).as_str(), "preset_0_name");
    }

    #[test]
    fn stored_override_requires_name() {
        let mut store = MemoryStore::new();
        // Values without a name are ignored.
        store.put_int("preset_0_life", 99).unwrap();
        store.put_string("preset_7_name", "Star Wars").unwrap();
        store.put_int("preset_7_life", 25).unwrap();

        let table = PresetTable::load(&mut store);
        assert_eq!(table.get(0).unwrap().starting_life, 20);
        let custom = table.get(7).unwrap();
        assert_eq!(custom.name.as_str(), "Star Wars");
        assert_eq!(custom.starting_life, 25);
        // Missing step keys keep the defaults.
        assert_eq!((custom.small_step, custom.large_step), (1, 5));
    }

    #[test]
    fn save_truncates_name_and_reloads() {
        let mut store = MemoryStore::new();
        let mut table = PresetTable::load(&mut store);
        let preset = TcgPreset {
            name: truncate_name("A very long preset name indeed"),
            starting_life: 30,
            small_step: 2,
            large_step: 6,
        };
        assert_eq!(preset.name.chars().count(), 20);

        let mut long = PresetName::new();
        long.push_str("A very long preset name indeed").unwrap();
        table
            .save(&mut store, 8, TcgPreset { name: long, ..preset.clone() })
            .unwrap();

        assert_eq!(table.get(8), Some(&preset));
        assert_eq!(PresetTable::load(&mut store).get(8), Some(&preset));
        assert!(table.save(&mut store, 10, preset).is_err());
    }

    #[test]
    fn invalid_active_index_falls_back() {
        let mut store = MemoryStore::new();
        store.put_int(KEY_PRESET_INDEX, 12).unwrap();
        assert_eq!(PresetTable::load(&mut store).active_index(), 0);
        store.put_int(KEY_PRESET_INDEX, -1).unwrap();
        assert_eq!(PresetTable::load(&mut store).active_index(), 0);
        store.put_int(KEY_PRESET_INDEX, 4).unwrap();
        let table = PresetTable::load(&mut store);
        assert_eq!(table.active().name.as_str(), "Flesh & Blood");
    }

    #[test]
    fn select_writes_settings() {
        let mut store = MemoryStore::new();
        let mut table = PresetTable::load(&mut store);
        let life = table.select(&mut store, 2).unwrap().starting_life;
        assert_eq!(life, 60);
        assert_eq!(store.get_int(KEY_PRESET_INDEX, -1), 2);
        assert_eq!(store.get_int(KEY_LIFE_MAX, -1), 60);
        assert_eq!(store.get_int(KEY_LIFE_STEP_SMALL, -1), 10);
        assert_eq!(store.get_int(KEY_LIFE_STEP_LARGE, -1), 30);
        assert_eq!(table.active_index(), 2);

        assert!(table.select(&mut store, PRESET_COUNT).is_err());
        assert_eq!(table.active_index(), 2);
    }
}
