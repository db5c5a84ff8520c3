//! The life screen controller.
//!
//! Ties the groupers, the store, the reveal animation and the surface
//! together for the active player mode:
//!
//! ```text
//!  gesture ─► dispatch ─► Grouper::handle_change ─► label + ghost label
//!  tick    ─► Reveal::step            (while initializing)
//!          └► Grouper::tick ─► LifeSaver ─► store
//!                          └► label + ring, ghost label hidden
//! ```
//!
//! Everything runs on one executor task; the store is shared with the
//! commit observers through a `RefCell`.

use core::cell::RefCell;

use heapless::Vec;

use crate::amp::AmpCounter;
use crate::arc::ArcMapper;
use crate::config::{DANGER_COLOR, HEALTHY_COLOR};
use crate::error::Error;
use crate::gesture::{dispatch, Gesture, GestureAction};
use crate::grouper::{Grouper, LifeHistoryEvent};
use crate::persist::{clear_saved_life, load_life, LifeSaver};
use crate::player::{PlayerMode, PlayerSlot};
use crate::presets::PresetTable;
use crate::reveal::{Reveal, RevealStatus};
use crate::settings::Settings;
use crate::store::KeyValueStore;
use crate::surface::{render_life, LifeSurface};
use crate::text::{self, HistoryCell};

/// Groupers live at most two at a time (two-player mode).
const MAX_SLOTS: usize = 2;

pub type SlotGrouper<'a, S> = Grouper<LifeSaver<'a, S>>;

/// One row of the history table. In single-player mode `right` is
/// always empty; in two-player mode either side may be blank.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HistoryRow {
    pub left: HistoryCell,
    pub right: HistoryCell,
}

pub struct LifeCounter<'a, S: KeyValueStore> {
    store: &'a RefCell<S>,
    settings: Settings,
    presets: PresetTable,
    mapper: ArcMapper,
    groupers: Vec<SlotGrouper<'a, S>, MAX_SLOTS>,
    reveals: Vec<Reveal, MAX_SLOTS>,
    amp: AmpCounter,
    initializing: bool,
}

impl<'a, S: KeyValueStore> LifeCounter<'a, S> {
    /// Build an idle counter. Nothing is shown until [`init`](Self::init).
    pub fn new(store: &'a RefCell<S>, mapper: ArcMapper) -> Self {
        let mut kv = store;
        Self {
            store,
            settings: Settings::load(&mut kv),
            presets: PresetTable::load(&mut kv),
            mapper,
            groupers: Vec::new(),
            reveals: Vec::new(),
            amp: AmpCounter::new(),
            initializing: true,
        }
    }

    /// (Re)build the screen for the stored player mode.
    ///
    /// Each slot starts from its saved total (or max life) and sweeps up to
    /// it; gestures are ignored until every sweep has finished.
    pub fn init<D>(&mut self, now_ms: u64, surface: &mut D)
    where
        D: LifeSurface + ?Sized,
    {
        let mut kv = self.store;
        self.settings = Settings::load(&mut kv);
        self.presets = PresetTable::load(&mut kv);
        self.initializing = true;
        self.groupers.clear();
        self.reveals.clear();

        for &slot in self.settings.player_mode.slots() {
            let mut grouper = Grouper::new(slot, self.settings.max_life, LifeSaver::new(self.store));
            grouper.reset_history(load_life(&mut kv, slot));

            let reveal = Reveal::new(slot, grouper.life_total(), now_ms);
            surface.hide_pending_change(slot);
            // Capacity is the number of slots per mode.
            let _ = self.reveals.push(reveal);
            let _ = self.groupers.push(grouper);
        }

        if self.amp_visible() {
            self.amp.render(surface, self.mapper.depth());
        }

        info!(
            "life counter init: {:?}, max life {=i32}",
            self.settings.player_mode,
            self.settings.max_life
        );
        self.step_reveals(now_ms, surface);
    }

    /// Drive animations and commit windows. Call on every loop iteration.
    ///
    /// Returns the rows committed during this call.
    pub fn tick<D>(&mut self, now_ms: u64, surface: &mut D) -> Vec<LifeHistoryEvent, MAX_SLOTS>
    where
        D: LifeSurface + ?Sized,
    {
        let mut committed = Vec::new();
        if self.initializing {
            self.step_reveals(now_ms, surface);
            return committed;
        }

        for grouper in self.groupers.iter_mut() {
            if let Some(event) = grouper.tick(now_ms) {
                let slot = grouper.slot();
                render_life(surface, &self.mapper, slot, grouper.life_total(), grouper.max_life());
                surface.hide_pending_change(slot);
                let _ = committed.push(event);
            }
        }
        committed
    }

    fn step_reveals<D>(&mut self, now_ms: u64, surface: &mut D)
    where
        D: LifeSurface + ?Sized,
    {
        let mut done = true;
        for reveal in self.reveals.iter_mut() {
            let status = reveal.step(now_ms, &self.mapper, self.settings.max_life, surface);
            done &= status == RevealStatus::Finished;
        }
        if done {
            self.reveals.clear();
            self.initializing = false;
            debug!("reveal finished, input enabled");
        }
    }

    /// Apply a recognised gesture. Returns the action taken; menu
    /// requests are left to the caller.
    pub fn handle_gesture<D>(&mut self, gesture: Gesture, now_ms: u64, surface: &mut D) -> GestureAction
    where
        D: LifeSurface + ?Sized,
    {
        if self.initializing {
            trace!("gesture {:?} ignored while initializing", gesture);
            return GestureAction::Ignore;
        }

        let action = dispatch(self.settings.player_mode, gesture, &self.settings);
        match action {
            GestureAction::ChangeLife { slot, delta } => {
                self.change_life(slot, delta, now_ms, surface);
            }
            GestureAction::AmpIncrement => {
                self.amp.increment();
                self.amp.render(surface, self.mapper.depth());
            }
            GestureAction::AmpClear => {
                self.amp.clear();
                self.amp.render(surface, self.mapper.depth());
            }
            GestureAction::OpenMenu | GestureAction::Ignore => {}
        }
        action
    }

    fn change_life<D>(&mut self, slot: PlayerSlot, delta: i32, now_ms: u64, surface: &mut D)
    where
        D: LifeSurface + ?Sized,
    {
        let Some(grouper) = self.groupers.iter_mut().find(|g| g.slot() == slot) else {
            warn!("no grouper for P{=u8}", slot.id());
            return;
        };

        grouper.handle_change(delta, now_ms);
        if !grouper.is_commit_pending() {
            return;
        }

        render_life(surface, &self.mapper, slot, grouper.displayed_total(), grouper.max_life());
        let pending = grouper.pending_change();
        let color = if pending >= 0 { HEALTHY_COLOR } else { DANGER_COLOR };
        surface.show_pending_change(slot, &text::signed_delta(pending), color);
    }

    /// Start a new game: every slot back to max life, saved totals and
    /// amp cleared. Pending changes are dropped.
    pub fn reset<D>(&mut self, surface: &mut D)
    where
        D: LifeSurface + ?Sized,
    {
        let max_life = self.settings.max_life;
        for grouper in self.groupers.iter_mut() {
            grouper.set_max_life(max_life);
            grouper.reset_history(max_life);
            render_life(surface, &self.mapper, grouper.slot(), max_life, max_life);
            surface.hide_pending_change(grouper.slot());
        }

        let mut kv = self.store;
        if let Err(e) = clear_saved_life(&mut kv) {
            warn!("failed to clear saved life: {:?}", e);
        }

        self.amp.clear();
        if self.amp_visible() {
            self.amp.render(surface, self.mapper.depth());
        }
        info!("life counter reset to {=i32}", max_life);
    }

    /// Activate preset `index`, start a fresh game with its life total
    /// and replay the reveal.
    pub fn apply_preset<D>(&mut self, index: usize, now_ms: u64, surface: &mut D) -> Result<(), Error>
    where
        D: LifeSurface + ?Sized,
    {
        let mut kv = self.store;
        self.presets.select(&mut kv, index)?;
        self.settings = Settings::load(&mut kv);
        self.reset(surface);
        self.init(now_ms, surface);
        Ok(())
    }

    /// Switch between one and two players. Life totals are reset.
    pub fn toggle_player_mode<D>(&mut self, now_ms: u64, surface: &mut D) -> Result<PlayerMode, Error>
    where
        D: LifeSurface + ?Sized,
    {
        let mut kv = self.store;
        let mode = self.settings.toggle_player_mode(&mut kv)?;
        self.reset(surface);
        self.init(now_ms, surface);
        Ok(mode)
    }

    /// History table, oldest row first.
    pub fn history_rows(&self) -> HistoryRows<'_, 'a, S> {
        let left = self.groupers.first();
        let right = self.groupers.get(1);
        let len = |g: Option<&SlotGrouper<'a, S>>| g.map_or(0, |g| g.history_len());
        HistoryRows {
            rows: len(left).max(len(right)),
            left,
            right,
            next: 0,
        }
    }

    pub fn is_initializing(&self) -> bool {
        self.initializing
    }

    pub fn mode(&self) -> PlayerMode {
        self.settings.player_mode
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn presets(&self) -> &PresetTable {
        &self.presets
    }

    pub fn amp(&self) -> &AmpCounter {
        &self.amp
    }

    pub fn mapper(&self) -> &ArcMapper {
        &self.mapper
    }

    pub fn grouper(&self, slot: PlayerSlot) -> Option<&SlotGrouper<'a, S>> {
        self.groupers.iter().find(|g| g.slot() == slot)
    }

    /// Earliest open commit deadline, to sleep until it.
    pub fn next_deadline(&self) -> Option<u64> {
        self.groupers.iter().filter_map(|g| g.deadline()).min()
    }

    fn amp_visible(&self) -> bool {
        self.settings.amp_enabled && self.settings.player_mode == PlayerMode::OnePlayer
    }
}

/// Iterator over [`HistoryRow`]s, see [`LifeCounter::history_rows`].
pub struct HistoryRows<'c, 'a, S: KeyValueStore> {
    left: Option<&'c SlotGrouper<'a, S>>,
    right: Option<&'c SlotGrouper<'a, S>>,
    rows: usize,
    next: usize,
}

impl<S: KeyValueStore> HistoryRows<'_, '_, S> {
    fn cell(grouper: Option<&SlotGrouper<'_, S>>, index: usize) -> HistoryCell {
        grouper
            .and_then(|g| g.history().nth(index))
            .map(text::history_cell)
            .unwrap_or_default()
    }
}

impl<S: KeyValueStore> Iterator for HistoryRows<'_, '_, S> {
    type Item = HistoryRow;

    fn next(&mut self) -> Option<HistoryRow> {
        if self.next >= self.rows {
            return None;
        }
        let i = self.next;
        self.next += 1;
        Some(HistoryRow {
            left: Self::cell(self.left, i),
            right: Self::cell(self.right, i),
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.rows - self.next;
        (n, Some(n))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{KEY_AMP_MODE, KEY_LIFE_MAX, KEY_PLAYER_MODE};
    use crate::persist::save_life;
    use crate::store::MemoryStore;
    use crate::surface::SurfaceState;

    const REVEAL_DONE: u64 = 300;

    fn started<'a>(
        store: &'a RefCell<MemoryStore>,
        surface: &mut SurfaceState,
    ) -> LifeCounter<'a, MemoryStore> {
        let mut counter = LifeCounter::new(store, ArcMapper::default());
        counter.init(0, surface);
        counter.tick(REVEAL_DONE, surface);
        assert!(!counter.is_initializing());
        counter
    }

    #[test]
    fn gestures_ignored_during_reveal() {
        let store = RefCell::new(MemoryStore::new());
        let mut surface = SurfaceState::default();
        let mut counter = LifeCounter::new(&store, ArcMapper::default());
        counter.init(0, &mut surface);

        assert!(counter.is_initializing());
        assert_eq!(surface.slot(PlayerSlot::Single).label.as_str(), "0");
        assert_eq!(
            counter.handle_gesture(Gesture::TapTop, 10, &mut surface),
            GestureAction::Ignore
        );
        assert!(counter.grouper(PlayerSlot::Single).unwrap().deadline().is_none());

        counter.tick(150, &mut surface);
        assert_eq!(surface.slot(PlayerSlot::Single).label.as_str(), "20");
        counter.tick(REVEAL_DONE, &mut surface);
        assert!(!counter.is_initializing());
        assert_eq!(surface.slot(PlayerSlot::Single).label.as_str(), "40");
    }

    #[test]
    fn taps_show_ghost_then_commit() {
        let store = RefCell::new(MemoryStore::new());
        let mut surface = SurfaceState::default();
        let mut counter = started(&store, &mut surface);

        counter.handle_gesture(Gesture::TapBottom, 1000, &mut surface);
        counter.handle_gesture(Gesture::LongPressBottom, 1200, &mut surface);

        let w = surface.slot(PlayerSlot::Single);
        assert_eq!(w.label.as_str(), "34");
        let (ghost, color) = w.pending.clone().unwrap();
        assert_eq!(ghost.as_str(), "-6");
        assert_eq!(color, DANGER_COLOR);

        assert!(counter.tick(3199, &mut surface).is_empty());
        let committed = counter.tick(3200, &mut surface);
        assert_eq!(committed.len(), 1);
        assert_eq!(committed[0].net_life_change, -6);
        assert_eq!(committed[0].life_total, 34);
        assert!(surface.slot(PlayerSlot::Single).pending.is_none());

        assert_eq!(load_life(&mut *store.borrow_mut(), PlayerSlot::Single), 34);
    }

    #[test]
    fn positive_ghost_is_green() {
        let store = RefCell::new(MemoryStore::new());
        let mut surface = SurfaceState::default();
        let mut counter = started(&store, &mut surface);

        counter.handle_gesture(Gesture::TapTop, 1000, &mut surface);
        counter.handle_gesture(Gesture::TapTop, 1100, &mut surface);
        let (ghost, color) = surface.slot(PlayerSlot::Single).pending.clone().unwrap();
        assert_eq!(ghost.as_str(), "+2");
        assert_eq!(color, HEALTHY_COLOR);
    }

    #[test]
    fn init_restores_saved_life() {
        let store = RefCell::new(MemoryStore::new());
        save_life(&mut *store.borrow_mut(), PlayerSlot::Single, 17).unwrap();
        let mut surface = SurfaceState::default();
        let counter = started(&store, &mut surface);

        assert_eq!(counter.grouper(PlayerSlot::Single).unwrap().life_total(), 17);
        assert_eq!(surface.slot(PlayerSlot::Single).label.as_str(), "17");
    }

    #[test]
    fn reset_restores_max_and_clears_saved_life() {
        let store = RefCell::new(MemoryStore::new());
        let mut surface = SurfaceState::default();
        let mut counter = started(&store, &mut surface);

        counter.handle_gesture(Gesture::TapBottom, 1000, &mut surface);
        counter.tick(3000, &mut surface);
        counter.handle_gesture(Gesture::TapBottom, 4000, &mut surface);
        counter.reset(&mut surface);

        let g = counter.grouper(PlayerSlot::Single).unwrap();
        assert_eq!(g.life_total(), 40);
        assert_eq!(g.history_len(), 0);
        assert!(!g.is_commit_pending());
        assert_eq!(surface.slot(PlayerSlot::Single).label.as_str(), "40");
        assert!(surface.slot(PlayerSlot::Single).pending.is_none());
        assert_eq!(store.borrow_mut().get_int("life_save_valid", -1), 0);

        // The dropped tap never commits.
        assert!(counter.tick(10_000, &mut surface).is_empty());
    }

    #[test]
    fn two_player_mode_drives_both_sides() {
        let store = RefCell::new(MemoryStore::new());
        store.borrow_mut().put_int(KEY_PLAYER_MODE, 1).unwrap();
        store.borrow_mut().put_int(KEY_LIFE_MAX, 20).unwrap();
        let mut surface = SurfaceState::default();
        let mut counter = started(&store, &mut surface);

        assert_eq!(counter.mode(), PlayerMode::TwoPlayer);
        assert!(counter.grouper(PlayerSlot::Single).is_none());
        assert_eq!(surface.slot(PlayerSlot::One).arc, Some((120, 270)));
        assert_eq!(surface.slot(PlayerSlot::Two).arc, Some((270, 60)));

        counter.handle_gesture(Gesture::TapBottomLeft, 1000, &mut surface);
        counter.handle_gesture(Gesture::LongPressTopRight, 1000, &mut surface);
        let committed = counter.tick(3000, &mut surface);
        assert_eq!(committed.len(), 2);

        assert_eq!(counter.grouper(PlayerSlot::One).unwrap().life_total(), 19);
        assert_eq!(counter.grouper(PlayerSlot::Two).unwrap().life_total(), 25);
        assert_eq!(load_life(&mut *store.borrow_mut(), PlayerSlot::One), 19);
        assert_eq!(load_life(&mut *store.borrow_mut(), PlayerSlot::Two), 25);
    }

    #[test]
    fn history_rows_pair_players() {
        let store = RefCell::new(MemoryStore::new());
        store.borrow_mut().put_int(KEY_PLAYER_MODE, 1).unwrap();
        store.borrow_mut().put_int(KEY_LIFE_MAX, 20).unwrap();
        let mut surface = SurfaceState::default();
        let mut counter = started(&store, &mut surface);

        counter.handle_gesture(Gesture::TapTopLeft, 1000, &mut surface);
        counter.handle_gesture(Gesture::TapBottomRight, 1000, &mut surface);
        counter.tick(3000, &mut surface);
        counter.handle_gesture(Gesture::LongPressBottomLeft, 4000, &mut surface);
        counter.tick(6000, &mut surface);

        let rows: std::vec::Vec<HistoryRow> = counter.history_rows().collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].left.as_str(), "+1 [21]");
        assert_eq!(rows[0].right.as_str(), "-1 [19]");
        assert_eq!(rows[1].left.as_str(), "-5 [16]");
        assert_eq!(rows[1].right.as_str(), "");
    }

    #[test]
    fn toggle_mode_resets_and_replays_reveal() {
        let store = RefCell::new(MemoryStore::new());
        let mut surface = SurfaceState::default();
        let mut counter = started(&store, &mut surface);

        assert_eq!(counter.toggle_player_mode(1000, &mut surface), Ok(PlayerMode::TwoPlayer));
        assert!(counter.is_initializing());
        assert_eq!(store.borrow_mut().get_int(KEY_PLAYER_MODE, -1), 1);

        counter.tick(1000 + REVEAL_DONE, &mut surface);
        assert!(!counter.is_initializing());
        assert_eq!(counter.grouper(PlayerSlot::One).unwrap().life_total(), 40);
        assert_eq!(counter.grouper(PlayerSlot::Two).unwrap().life_total(), 40);
    }

    #[test]
    fn apply_preset_starts_new_game() {
        let store = RefCell::new(MemoryStore::new());
        let mut surface = SurfaceState::default();
        let mut counter = started(&store, &mut surface);
        counter.handle_gesture(Gesture::TapBottom, 1000, &mut surface);
        counter.tick(3000, &mut surface);

        counter.apply_preset(3, 5000, &mut surface).unwrap();
        counter.tick(5000 + REVEAL_DONE, &mut surface);

        assert_eq!(counter.settings().max_life, 8000);
        assert_eq!(counter.presets().active_index(), 3);
        assert_eq!(counter.grouper(PlayerSlot::Single).unwrap().life_total(), 8000);
        assert_eq!(surface.slot(PlayerSlot::Single).label.as_str(), "8000");

        counter.handle_gesture(Gesture::LongPressBottom, 6000, &mut surface);
        assert_eq!(surface.slot(PlayerSlot::Single).label.as_str(), "7500");

        assert_eq!(counter.apply_preset(10, 7000, &mut surface), Err(Error::InvalidIndex));
    }

    #[test]
    fn amp_counts_when_enabled() {
        let store = RefCell::new(MemoryStore::new());
        store.borrow_mut().put_int(KEY_AMP_MODE, 1).unwrap();
        let mut surface = SurfaceState::default();
        let mut counter = started(&store, &mut surface);
        assert_eq!(surface.amp_text.as_str(), "0");

        counter.handle_gesture(Gesture::AmpTap, 1000, &mut surface);
        counter.handle_gesture(Gesture::AmpTap, 1100, &mut surface);
        assert_eq!(surface.amp_text.as_str(), "+2");
        assert_eq!(counter.amp().value(), 2);

        counter.reset(&mut surface);
        assert_eq!(surface.amp_text.as_str(), "0");
    }

    #[test]
    fn next_deadline_tracks_open_windows() {
        let store = RefCell::new(MemoryStore::new());
        let mut surface = SurfaceState::default();
        let mut counter = started(&store, &mut surface);
        assert_eq!(counter.next_deadline(), None);
        counter.handle_gesture(Gesture::TapTop, 1000, &mut surface);
        assert_eq!(counter.next_deadline(), Some(3000));
    }
}
