//! Game timer: a stopwatch, or a countdown over the configured round time.
//!
//! Time is tracked in milliseconds from the caller's clock and shown in
//! whole seconds as `MM:SS`. A countdown stops by itself at zero; starting
//! it again needs a [`GameTimer::reset`].

use core::fmt::Write;

use heapless::String;

use crate::config::{
    DEFAULT_ROUND_TIME_S, KEY_ROUND_TIME, KEY_SHOW_TIMER, KEY_TIMER_MODE, MAX_ROUND_TIME_S,
};
use crate::error::Error;
use crate::store::KeyValueStore;

/// `MM:SS`, with minutes widening past 99.
pub type TimerText = String<16>;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TimerMode {
    #[default]
    Stopwatch,
    Countdown,
}

impl TimerMode {
    /// Unknown values read as stopwatch.
    pub const fn from_store(value: i32) -> Self {
        match value {
            1 => TimerMode::Countdown,
            _ => TimerMode::Stopwatch,
        }
    }

    pub const fn to_store(self) -> i32 {
        match self {
            TimerMode::Stopwatch => 0,
            TimerMode::Countdown => 1,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GameTimer {
    mode: TimerMode,
    round_time_s: i32,
    /// Time run before the current start.
    banked_ms: u64,
    started_at: Option<u64>,
}

impl Default for GameTimer {
    fn default() -> Self {
        Self::new(TimerMode::Stopwatch, DEFAULT_ROUND_TIME_S)
    }
}

fn valid_round_time(seconds: i32) -> bool {
    (1..=MAX_ROUND_TIME_S).contains(&seconds)
}

impl GameTimer {
    /// A stopped timer at zero. An invalid round time falls back to the default.
    pub fn new(mode: TimerMode, round_time_s: i32) -> Self {
        let round_time_s = if valid_round_time(round_time_s) {
            round_time_s
        } else {
            DEFAULT_ROUND_TIME_S
        };
        Self {
            mode,
            round_time_s,
            banked_ms: 0,
            started_at: None,
        }
    }

    pub fn load<S>(store: &mut S) -> Self
    where
        S: KeyValueStore + ?Sized,
    {
        let timer = Self::new(
            TimerMode::from_store(store.get_int(KEY_TIMER_MODE, 0)),
            store.get_int(KEY_ROUND_TIME, DEFAULT_ROUND_TIME_S),
        );
        debug!(
            "timer: {:?}, round {=i32} s",
            timer.mode,
            timer.round_time_s
        );
        timer
    }

    pub fn mode(&self) -> TimerMode {
        self.mode
    }

    pub fn round_time_s(&self) -> i32 {
        self.round_time_s
    }

    pub fn is_running(&self) -> bool {
        self.started_at.is_some()
    }

    fn round_ms(&self) -> u64 {
        self.round_time_s as u64 * 1000
    }

    /// Run time so far, capped at the round time in countdown mode.
    pub fn elapsed_ms(&self, now_ms: u64) -> u64 {
        let running = self
            .started_at
            .map_or(0, |start| now_ms.saturating_sub(start));
        let elapsed = self.banked_ms.saturating_add(running);
        match self.mode {
            TimerMode::Stopwatch => elapsed,
            TimerMode::Countdown => elapsed.min(self.round_ms()),
        }
    }

    /// `true` once a countdown has reached zero.
    pub fn is_expired(&self, now_ms: u64) -> bool {
        self.mode == TimerMode::Countdown && self.elapsed_ms(now_ms) >= self.round_ms()
    }

    /// Start or pause. Returns whether the timer is now running; an
    /// expired countdown stays stopped.
    pub fn toggle_running(&mut self, now_ms: u64) -> bool {
        if self.is_running() {
            self.banked_ms = self.elapsed_ms(now_ms);
            self.started_at = None;
        } else if !self.is_expired(now_ms) {
            self.started_at = Some(now_ms);
        }
        trace!("timer running: {}", self.is_running());
        self.is_running()
    }

    /// Stop an expired countdown. Returns `true` on the tick it expires.
    pub fn tick(&mut self, now_ms: u64) -> bool {
        if self.started_at.is_none() || !self.is_expired(now_ms) {
            return false;
        }
        self.started_at = None;
        self.banked_ms = self.round_ms();
        info!("countdown finished");
        true
    }

    /// Stop and go back to zero.
    pub fn reset(&mut self) {
        self.banked_ms = 0;
        self.started_at = None;
    }

    /// Seconds to show: elapsed for a stopwatch, remaining for a countdown.
    pub fn display_seconds(&self, now_ms: u64) -> u64 {
        let elapsed_s = self.elapsed_ms(now_ms) / 1000;
        match self.mode {
            TimerMode::Stopwatch => elapsed_s,
            TimerMode::Countdown => (self.round_time_s as u64).saturating_sub(elapsed_s),
        }
    }

    pub fn label(&self, now_ms: u64) -> TimerText {
        let seconds = self.display_seconds(now_ms);
        let mut text = TimerText::new();
        let _ = write!(text, "{:02}:{:02}", seconds / 60, seconds % 60);
        text
    }

    /// Persist a new mode and reset.
    pub fn set_mode<S>(&mut self, store: &mut S, mode: TimerMode) -> Result<(), Error>
    where
        S: KeyValueStore + ?Sized,
    {
        store.put_int(KEY_TIMER_MODE, mode.to_store())?;
        self.mode = mode;
        self.reset();
        info!("timer mode -> {:?}", mode);
        Ok(())
    }

    /// Persist a new countdown length (1 s to 999 min) and reset.
    pub fn set_round_time<S>(&mut self, store: &mut S, seconds: i32) -> Result<(), Error>
    where
        S: KeyValueStore + ?Sized,
    {
        if !valid_round_time(seconds) {
            return Err(Error::OutOfRange);
        }
        store.put_int(KEY_ROUND_TIME, seconds)?;
        self.round_time_s = seconds;
        self.reset();
        Ok(())
    }
}

/// Flip the "show timer" flag. Returns the new value.
pub fn toggle_show_timer<S>(store: &mut S) -> Result<bool, Error>
where
    S: KeyValueStore + ?Sized,
{
    let show = store.get_int(KEY_SHOW_TIMER, 0) == 0;
    store.put_int(KEY_SHOW_TIMER, show as i32)?;
    Ok(show)
}
