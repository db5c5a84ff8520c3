//! Saved life totals.
//!
//! Totals survive a reboot only while `life_save_valid` is 1. A reset or
//! preset change clears the flag so the next boot starts from max life.

use core::cell::RefCell;

use crate::config::{
    DEFAULT_LIFE_MAX, KEY_LIFE_MAX, KEY_LIFE_SAVE_VALID, KEY_SAVED_LIFE_P1, KEY_SAVED_LIFE_P2,
};
use crate::error::Error;
use crate::grouper::{CommitObserver, LifeHistoryEvent};
use crate::player::PlayerSlot;
use crate::store::KeyValueStore;

fn saved_key(slot: PlayerSlot) -> &'static str {
    match slot {
        PlayerSlot::Two => KEY_SAVED_LIFE_P2,
        PlayerSlot::Single | PlayerSlot::One => KEY_SAVED_LIFE_P1,
    }
}

/// Persist `total` for `slot` and mark the saved totals valid.
pub fn save_life<S>(store: &mut S, slot: PlayerSlot, total: i32) -> Result<(), Error>
where
    S: KeyValueStore + ?Sized,
{
    store.put_int(saved_key(slot), total)?;
    store.put_int(KEY_LIFE_SAVE_VALID, 1)
}

/// Life total to start `slot` with: the saved one if valid, max life otherwise.
pub fn load_life<S>(store: &mut S, slot: PlayerSlot) -> i32
where
    S: KeyValueStore + ?Sized,
{
    let max_life = store.get_int(KEY_LIFE_MAX, DEFAULT_LIFE_MAX);
    if store.get_int(KEY_LIFE_SAVE_VALID, 0) != 1 {
        return max_life;
    }
    store.get_int(saved_key(slot), max_life)
}

/// Forget both saved totals.
pub fn clear_saved_life<S>(store: &mut S) -> Result<(), Error>
where
    S: KeyValueStore + ?Sized,
{
    store.put_int(KEY_LIFE_SAVE_VALID, 0)?;
    store.put_int(KEY_SAVED_LIFE_P1, 0)?;
    store.put_int(KEY_SAVED_LIFE_P2, 0)
}

/// Commit observer that writes every committed total to the store.
///
/// Write failures are logged and dropped; the grouper has already
/// committed and the next commit will try again.
pub struct LifeSaver<'a, S> {
    store: &'a RefCell<S>,
    failures: u32,
}

impl<'a, S: KeyValueStore> LifeSaver<'a, S> {
    pub fn new(store: &'a RefCell<S>) -> Self {
        Self { store, failures: 0 }
    }

    /// Number of commits that could not be persisted.
    pub fn failures(&self) -> u32 {
        self.failures
    }

    fn save(&self, event: &LifeHistoryEvent) -> Result<(), Error> {
        let slot = event.slot().unwrap_or(PlayerSlot::Single);
        let mut store = self.store.try_borrow_mut().map_err(|_| Error::Busy)?;
        save_life(&mut *store, slot, event.life_total)
    }
}

impl<S: KeyValueStore> CommitObserver for LifeSaver<'_, S> {
    fn on_commit(&mut self, event: &LifeHistoryEvent) {
        if let Err(e) = self.save(event) {
            self.failures = self.failures.saturating_add(1);
            warn!(
                "P{=u8}: failed to save life {=i32}: {:?}",
                event.player_id,
                event.life_total,
                e
            );
        }
    }
}
