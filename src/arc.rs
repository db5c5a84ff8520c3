//! Life total → ring segment mapping.
//!
//! Angles use the display convention (0° at 3 o'clock, clockwise).
//!
//! Single player: one ring with a gap centred at the bottom (90°). The
//! filled segment grows clockwise from the gap's left edge.
//!
//! ```text
//!              270°
//!          ╭────●────╮
//!   start ╱           ╲  end (full)
//!   122° ╲             ╱ 58°
//!          ╰──  gap  ──╯
//!               90°
//! ```
//!
//! Two players: two half rings separated by a gap at the top and bottom.
//! Player 1 (left) grows clockwise from 120° towards 270°, player 2
//! (right) grows counter-clockwise from 60° towards 270°.

use core::f32::consts::PI;

use embedded_graphics::pixelcolor::Rgb888;

use crate::color::{life_color, sanitize_max_life, ColorDepth};
use crate::config::{ARC_GAP_PX, SCREEN_DIAMETER_PX, SPLIT_ARC_GAP_DEG};
use crate::player::PlayerSlot;

/// A renderable ring segment. Angles are in `[0, 360)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ArcSegment {
    pub start_angle: u16,
    pub end_angle: u16,
    pub color: Rgb888,
}

impl ArcSegment {
    /// Clockwise extent from start to end.
    pub fn sweep_degrees(&self) -> u16 {
        (self.end_angle as i32 - self.start_angle as i32).rem_euclid(360) as u16
    }
}

/// Which part of the ring a slot occupies.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ArcLayout {
    /// Full ring minus the bottom gap.
    Ring,
    /// Left half, growing clockwise.
    LeftHalf,
    /// Right half, growing counter-clockwise.
    RightHalf,
}

impl From<PlayerSlot> for ArcLayout {
    fn from(slot: PlayerSlot) -> Self {
        match slot {
            PlayerSlot::Single => ArcLayout::Ring,
            PlayerSlot::One => ArcLayout::LeftHalf,
            PlayerSlot::Two => ArcLayout::RightHalf,
        }
    }
}

/// Ring geometry plus color depth.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ArcMapper {
    diameter_px: f32,
    gap_px: f32,
    split_gap_deg: u16,
    depth: ColorDepth,
}

impl Default for ArcMapper {
    fn default() -> Self {
        Self {
            diameter_px: SCREEN_DIAMETER_PX,
            gap_px: ARC_GAP_PX,
            split_gap_deg: SPLIT_ARC_GAP_DEG,
            depth: ColorDepth::Full,
        }
    }
}

impl ArcMapper {
    pub fn new(diameter_px: f32, gap_px: f32, split_gap_deg: u16) -> Self {
        Self {
            diameter_px,
            gap_px,
            split_gap_deg: split_gap_deg.min(180),
            depth: ColorDepth::Full,
        }
    }

    pub fn with_depth(mut self, depth: ColorDepth) -> Self {
        self.depth = depth;
        self
    }

    pub fn depth(&self) -> ColorDepth {
        self.depth
    }

    /// Map a life total for `layout`. Never panics; `max_life <= 0` is
    /// treated as the default max.
    pub fn map(&self, layout: ArcLayout, life_total: i32, max_life: i32) -> ArcSegment {
        let max_life = sanitize_max_life(max_life);
        let color = life_color(life_total, max_life, self.depth);
        match layout {
            ArcLayout::Ring => self.map_ring(life_total, max_life, color),
            ArcLayout::LeftHalf => self.map_left(life_total, max_life, color),
            ArcLayout::RightHalf => self.map_right(life_total, max_life, color),
        }
    }

    /// Convenience for [`map`](Self::map) with the slot's layout.
    pub fn map_slot(&self, slot: PlayerSlot, life_total: i32, max_life: i32) -> ArcSegment {
        self.map(slot.into(), life_total, max_life)
    }

    /// Background ring: `(start_angle, span_degrees)`.
    pub fn ring_bounds(&self) -> (u16, f32) {
        let circumference = PI * self.diameter_px;
        let gap_deg = (self.gap_px / circumference) * 360.0;
        let span = (360.0 - gap_deg).clamp(0.0, 360.0);
        let start = (270.0 - span / 2.0 + 0.5) as i32;
        (start.rem_euclid(360) as u16, span)
    }

    /// Background of a half ring: `(start_angle, end_angle)` drawn clockwise.
    pub fn half_bounds(&self, layout: ArcLayout) -> (u16, u16) {
        let half_gap = self.split_gap_deg / 2;
        match layout {
            ArcLayout::LeftHalf => (90 + half_gap, 270),
            ArcLayout::RightHalf => (270, 90 - half_gap),
            ArcLayout::Ring => {
                let (start, span) = self.ring_bounds();
                (start, (start as i32 + span as i32).rem_euclid(360) as u16)
            }
        }
    }

    fn map_ring(&self, life: i32, max_life: i32, color: Rgb888) -> ArcSegment {
        let (start, span) = self.ring_bounds();
        let sweep = if life <= 0 {
            0
        } else if life >= max_life {
            (span + 0.5) as i32
        } else {
            (span * (life as f32 / max_life as f32) + 0.5) as i32
        };
        ArcSegment {
            start_angle: start,
            end_angle: (start as i32 + sweep).rem_euclid(360) as u16,
            color,
        }
    }

    fn map_left(&self, life: i32, max_life: i32, color: Rgb888) -> ArcSegment {
        let (start, end) = self.half_bounds(ArcLayout::LeftHalf);
        let span = (end - start) as i32;
        let sweep = half_sweep(span, life, max_life);
        ArcSegment {
            start_angle: start,
            end_angle: (start as i32 + sweep) as u16,
            color,
        }
    }

    fn map_right(&self, life: i32, max_life: i32, color: Rgb888) -> ArcSegment {
        let (start, end) = self.half_bounds(ArcLayout::RightHalf);
        let span = (end as i32 - start as i32).rem_euclid(360);
        let sweep = half_sweep(span, life, max_life);
        ArcSegment {
            start_angle: (end as i32 - sweep).rem_euclid(360) as u16,
            end_angle: end,
            color,
        }
    }
}

fn half_sweep(span: i32, life: i32, max_life: i32) -> i32 {
    let life = life.clamp(0, max_life);
    let sweep = (span as f32 * (life as f32 / max_life as f32) + 0.5) as i32;
    sweep.min(span)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DANGER_COLOR, HEALTHY_COLOR};

    #[test]
    fn ring_geometry_defaults() {
        let mapper = ArcMapper::default();
        let (start, span) = mapper.ring_bounds();
        assert_eq!(start, 122);
        assert!((span - 296.34).abs() < 0.01);
        assert_eq!(mapper.half_bounds(ArcLayout::Ring), (122, 58));
    }

    #[test]
    fn ring_full_and_over_max() {
        let mapper = ArcMapper::default();
        let full = mapper.map(ArcLayout::Ring, 40, 40);
        assert_eq!((full.start_angle, full.end_angle), (122, 58));
        assert_eq!(full.sweep_degrees(), 296);
        assert_eq!(full.color, HEALTHY_COLOR);

        let over = mapper.map(ArcLayout::Ring, 95, 40);
        assert_eq!(over, full);
    }

    #[test]
    fn ring_empty_at_or_below_zero() {
        let mapper = ArcMapper::default();
        for life in [0, -1, -40] {
            let seg = mapper.map(ArcLayout::Ring, life, 40);
            assert_eq!(seg.start_angle, 122);
            assert_eq!(seg.end_angle, 122);
            assert_eq!(seg.sweep_degrees(), 0);
            assert_eq!(seg.color, DANGER_COLOR);
        }
    }

    #[test]
    fn ring_half_life() {
        let seg = ArcMapper::default().map(ArcLayout::Ring, 20, 40);
        // 296.34 * 0.5 + 0.5 = 148.67 -> 148
        assert_eq!(seg.sweep_degrees(), 148);
        assert_eq!(seg.end_angle, 270);
    }

    #[test]
    fn ring_sweep_is_monotonic_and_saturates() {
        let mapper = ArcMapper::default();
        for max in [1, 5, 20, 40, 60, 8000] {
            let mut prev = 0;
            for life in 0..=max {
                let sweep = mapper.map(ArcLayout::Ring, life, max).sweep_degrees();
                assert!(sweep >= prev, "max {} life {}", max, life);
                prev = sweep;
            }
            for life in [max + 1, max * 2, i32::MAX] {
                assert_eq!(mapper.map(ArcLayout::Ring, life, max).sweep_degrees(), prev);
            }
        }
    }

    #[test]
    fn invalid_max_life_falls_back() {
        let mapper = ArcMapper::default();
        assert_eq!(mapper.map(ArcLayout::Ring, 20, 0), mapper.map(ArcLayout::Ring, 20, 40));
        assert_eq!(
            mapper.map(ArcLayout::LeftHalf, 10, -3),
            mapper.map(ArcLayout::LeftHalf, 10, 40)
        );
    }

    #[test]
    fn player_one_full_span_is_healthy() {
        let seg = ArcMapper::default().map_slot(PlayerSlot::One, 20, 20);
        assert_eq!((seg.start_angle, seg.end_angle), (120, 270));
        assert_eq!(seg.sweep_degrees(), 150);
        assert_eq!(seg.color, HEALTHY_COLOR);
    }

    #[test]
    fn player_one_grows_clockwise() {
        let mapper = ArcMapper::default();
        let seg = mapper.map(ArcLayout::LeftHalf, 10, 20);
        assert_eq!((seg.start_angle, seg.end_angle), (120, 195));
        assert_eq!(mapper.map(ArcLayout::LeftHalf, -4, 20).end_angle, 120);
        assert_eq!(mapper.map(ArcLayout::LeftHalf, 50, 20).end_angle, 270);
    }

    #[test]
    fn player_two_mirrors_player_one() {
        let mapper = ArcMapper::default();
        let full = mapper.map(ArcLayout::RightHalf, 20, 20);
        assert_eq!((full.start_angle, full.end_angle), (270, 60));
        assert_eq!(full.sweep_degrees(), 150);

        let half = mapper.map(ArcLayout::RightHalf, 10, 20);
        assert_eq!((half.start_angle, half.end_angle), (345, 60));
        assert_eq!(half.sweep_degrees(), 75);

        let empty = mapper.map(ArcLayout::RightHalf, 0, 20);
        assert_eq!((empty.start_angle, empty.end_angle), (60, 60));

        for life in 0..=25 {
            assert_eq!(
                mapper.map(ArcLayout::LeftHalf, life, 20).sweep_degrees(),
                mapper.map(ArcLayout::RightHalf, life, 20).sweep_degrees()
            );
        }
    }

    #[test]
    fn slots_pick_layouts() {
        assert_eq!(ArcLayout::from(PlayerSlot::Single), ArcLayout::Ring);
        assert_eq!(ArcLayout::from(PlayerSlot::One), ArcLayout::LeftHalf);
        assert_eq!(ArcLayout::from(PlayerSlot::Two), ArcLayout::RightHalf);
    }

    #[test]
    fn custom_geometry_without_gap() {
        let mapper = ArcMapper::new(360.0, 0.0, 0);
        let (start, span) = mapper.ring_bounds();
        assert_eq!(start, 90);
        assert_eq!(span, 360.0);
        assert_eq!(mapper.half_bounds(ArcLayout::LeftHalf), (90, 270));
        assert_eq!(mapper.map(ArcLayout::LeftHalf, 1, 1).sweep_degrees(), 180);
    }
}
