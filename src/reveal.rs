//! Startup sweep from zero to the loaded life total.
//!
//! The committed total does not change during the sweep; the reveal only
//! pushes intermediate values to the label and ring. Input must stay
//! disabled until [`Reveal::is_finished`].

use crate::arc::{ArcMapper, ArcSegment};
use crate::config::{ARC_ANIMATION_DURATION_MS, SMOOTH_ARC_STEPS};
use crate::player::PlayerSlot;
use crate::surface::{render_life, LifeSurface};

/// `floor(progress * target / steps)`, kept between 0 and `target`.
pub fn interpolate(progress: u32, target: i32, steps: u32) -> i32 {
    if steps == 0 {
        return target;
    }
    let progress = progress.min(steps) as i64;
    let value = (progress * target as i64).div_euclid(steps as i64);
    let (lo, hi) = if target >= 0 {
        (0, target as i64)
    } else {
        (target as i64, 0)
    };
    value.clamp(lo, hi) as i32
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RevealStatus {
    Running,
    Finished,
}

/// One slot's reveal animation, driven by the main tick.
#[derive(Clone, Debug)]
pub struct Reveal {
    slot: PlayerSlot,
    target_life: i32,
    started_at_ms: u64,
    duration_ms: u64,
    steps: u32,
    finished: bool,
}

impl Reveal {
    pub fn new(slot: PlayerSlot, target_life: i32, started_at_ms: u64) -> Self {
        Self {
            slot,
            target_life,
            started_at_ms,
            duration_ms: ARC_ANIMATION_DURATION_MS,
            steps: SMOOTH_ARC_STEPS,
            finished: false,
        }
    }

    pub fn with_timing(mut self, duration_ms: u64, steps: u32) -> Self {
        self.duration_ms = duration_ms;
        self.steps = steps;
        self
    }

    /// Linear progress in `0..=steps` at `now_ms`.
    pub fn progress_at(&self, now_ms: u64) -> u32 {
        if self.duration_ms == 0 {
            return self.steps;
        }
        let elapsed = now_ms.saturating_sub(self.started_at_ms);
        let progress = elapsed.saturating_mul(self.steps as u64) / self.duration_ms;
        progress.min(self.steps as u64) as u32
    }

    pub fn value_at(&self, progress: u32) -> i32 {
        interpolate(progress, self.target_life, self.steps)
    }

    /// Render the frame for `progress` and return its segment.
    pub fn apply<D>(
        &self,
        progress: u32,
        mapper: &ArcMapper,
        max_life: i32,
        surface: &mut D,
    ) -> ArcSegment
    where
        D: LifeSurface + ?Sized,
    {
        let value = self.value_at(progress);
        render_life(surface, mapper, self.slot, value, max_life)
    }

    /// Advance to `now_ms`. Renders every call until the final frame has
    /// been drawn, then reports `Finished` without drawing again.
    pub fn step<D>(
        &mut self,
        now_ms: u64,
        mapper: &ArcMapper,
        max_life: i32,
        surface: &mut D,
    ) -> RevealStatus
    where
        D: LifeSurface + ?Sized,
    {
        if self.finished {
            return RevealStatus::Finished;
        }

        let progress = self.progress_at(now_ms);
        self.apply(progress, mapper, max_life, surface);

        if progress >= self.steps {
            self.finished = true;
            debug!(
                "P{=u8}: reveal done at {=i32}",
                self.slot.id(),
                self.target_life
            );
            RevealStatus::Finished
        } else {
            RevealStatus::Running
        }
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn target_life(&self) -> i32 {
        self.target_life
    }

    pub fn slot(&self) -> PlayerSlot {
        self.slot
    }
}
