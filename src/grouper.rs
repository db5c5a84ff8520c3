//! Coalescing aggregator for one player's life total.
//!
//! Every tap adds to a pending delta and (re)arms a trailing debounce
//! window. Only when input has been quiet for a full window does the
//! delta get committed: the total is updated, one history row is
//! appended and the [`CommitObserver`] is notified once. A flurry of taps
//! therefore costs one storage write and one history entry.
//!
//! ```text
//!  t=0    +1  ──┐ window opens, deadline = 2000
//!  t=500  +4  ──┤ deadline refreshed to 2500
//!  t=2500 tick ─┘ commit {+5}
//! ```
//!
//! The grouper is driven from a single cooperative loop and holds no
//! locks. A multi-threaded host must wrap it in one mutex covering
//! `handle_change`, `tick` and the getters.

use heapless::Deque;

use crate::config::{GROUPER_WINDOW_MS, HISTORY_CAPACITY};
use crate::player::PlayerSlot;

/// One committed burst of life changes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LifeHistoryEvent {
    /// Sum of the deltas in the burst.
    pub net_life_change: i32,
    /// Total after the commit.
    pub life_total: i32,
    /// 0 (single), 1 or 2.
    pub player_id: u8,
}

impl LifeHistoryEvent {
    pub fn slot(&self) -> Option<PlayerSlot> {
        PlayerSlot::from_id(self.player_id)
    }
}

/// Receives every committed burst, e.g. to persist the new total.
pub trait CommitObserver {
    fn on_commit(&mut self, event: &LifeHistoryEvent);
}

impl<F> CommitObserver for F
where
    F: FnMut(&LifeHistoryEvent),
{
    fn on_commit(&mut self, event: &LifeHistoryEvent) {
        self(event)
    }
}

/// Observer that ignores commits.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopObserver;

impl CommitObserver for NoopObserver {
    fn on_commit(&mut self, _event: &LifeHistoryEvent) {}
}

/// What to do when a window closes with a net change of zero
/// (e.g. +1 then -1 inside one window).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ZeroCommitPolicy {
    /// Commit anyway: append a `{0, total}` row and notify the observer.
    #[default]
    Record,
    /// Close the window without a history row or notification.
    Suppress,
}

/// Per-slot life state with a trailing commit window.
pub struct Grouper<O, const N: usize = HISTORY_CAPACITY> {
    slot: PlayerSlot,
    window_ms: u64,
    max_life: i32,
    life_total: i32,
    pending_delta: i32,
    window_deadline: Option<u64>,
    zero_policy: ZeroCommitPolicy,
    history: Deque<LifeHistoryEvent, N>,
    observer: O,
}

impl<O: CommitObserver> Grouper<O> {
    /// Create a grouper with the default window and history capacity.
    ///
    /// The committed total starts at 0; seed it with
    /// [`reset_history`](Grouper::reset_history).
    pub fn new(slot: PlayerSlot, max_life: i32, observer: O) -> Self {
        Self::bounded(slot, max_life, observer)
    }
}

impl<O: CommitObserver, const N: usize> Grouper<O, N> {
    /// Create a grouper keeping at most `N` history rows.
    pub fn bounded(slot: PlayerSlot, max_life: i32, observer: O) -> Self {
        Self {
            slot,
            window_ms: GROUPER_WINDOW_MS,
            max_life,
            life_total: 0,
            pending_delta: 0,
            window_deadline: None,
            zero_policy: ZeroCommitPolicy::default(),
            history: Deque::new(),
            observer,
        }
    }

    pub fn with_window(mut self, window_ms: u64) -> Self {
        self.window_ms = window_ms;
        self
    }

    pub fn with_zero_policy(mut self, policy: ZeroCommitPolicy) -> Self {
        self.zero_policy = policy;
        self
    }

    /// Queue a life change.
    ///
    /// Opens the commit window, or pushes an open one out to
    /// `now_ms + window`. Nothing is persisted or recorded here. A zero
    /// delta is ignored and does not touch the window.
    pub fn handle_change(&mut self, delta: i32, now_ms: u64) {
        if delta == 0 {
            return;
        }

        self.pending_delta = self.pending_delta.saturating_add(delta);
        self.window_deadline = Some(now_ms.saturating_add(self.window_ms));

        trace!(
            "P{=u8}: queued {=i32}, pending {=i32}",
            self.slot.id(),
            delta,
            self.pending_delta
        );
    }

    /// `true` while a commit window is open.
    pub fn is_commit_pending(&self) -> bool {
        self.window_deadline.is_some()
    }

    /// When the open window will commit, if any.
    pub fn deadline(&self) -> Option<u64> {
        self.window_deadline
    }

    /// Commit the pending delta if its window has elapsed.
    ///
    /// Call this every loop iteration. Fires at or after the deadline,
    /// never before, and at most once per window.
    pub fn tick(&mut self, now_ms: u64) -> Option<LifeHistoryEvent> {
        let deadline = self.window_deadline?;
        if now_ms < deadline {
            return None;
        }

        let delta = core::mem::take(&mut self.pending_delta);
        self.window_deadline = None;

        if delta == 0 && self.zero_policy == ZeroCommitPolicy::Suppress {
            debug!("P{=u8}: net-zero window dropped", self.slot.id());
            return None;
        }

        self.life_total = self.life_total.saturating_add(delta);
        let event = LifeHistoryEvent {
            net_life_change: delta,
            life_total: self.life_total,
            player_id: self.slot.id(),
        };
        self.push_history(event);

        info!(
            "P{=u8}: commit {=i32} -> {=i32}",
            event.player_id,
            event.net_life_change,
            event.life_total
        );
        self.observer.on_commit(&event);

        Some(event)
    }

    fn push_history(&mut self, event: LifeHistoryEvent) {
        if self.history.is_full() {
            warn!("P{=u8}: history full - evicting oldest row", self.slot.id());
            self.history.pop_front();
        }
        // Cannot fail: a slot was freed above.
        let _ = self.history.push_back(event);
    }

    /// Uncommitted delta, for the "+3" ghost label.
    pub fn pending_change(&self) -> i32 {
        self.pending_delta
    }

    /// Last committed total (excludes the pending delta).
    pub fn life_total(&self) -> i32 {
        self.life_total
    }

    /// What the label should show right now: committed + pending.
    pub fn displayed_total(&self) -> i32 {
        self.life_total.saturating_add(self.pending_delta)
    }

    /// Start a new game at `new_total`.
    ///
    /// Clears the history and discards any pending delta without
    /// committing it.
    pub fn reset_history(&mut self, new_total: i32) {
        if self.is_commit_pending() {
            debug!(
                "P{=u8}: reset discards pending {=i32}",
                self.slot.id(),
                self.pending_delta
            );
        }
        self.history.clear();
        self.pending_delta = 0;
        self.window_deadline = None;
        self.life_total = new_total;
    }

    /// Committed rows, oldest first.
    pub fn history(&self) -> impl Iterator<Item = &LifeHistoryEvent> {
        self.history.iter()
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    pub fn last_event(&self) -> Option<&LifeHistoryEvent> {
        self.history.back()
    }

    pub fn slot(&self) -> PlayerSlot {
        self.slot
    }

    pub fn max_life(&self) -> i32 {
        self.max_life
    }

    pub fn set_max_life(&mut self, max_life: i32) {
        self.max_life = max_life;
    }

    pub fn window_ms(&self) -> u64 {
        self.window_ms
    }

    pub fn observer(&self) -> &O {
        &self.observer
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Unit Tests
// ═══════════════════════════════════════════════════════════════════════════
