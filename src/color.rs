//! Life gradient colors.
//!
//! The ring color moves from danger (red) through caution (yellow) to
//! healthy (green) as the life ratio rises:
//!
//! ```text
//!  ratio   0 ── 0.25 ────── 0.55 ────────── 0.875 ── ∞
//!  color   danger │ danger→caution │ caution→healthy │ healthy
//! ```
//!
//! Interpolation is done in full 8-bit precision by default. The panel
//! natively takes RGB565; [`ColorDepth::Rgb565`] reproduces the
//! reduced-depth arithmetic of the original firmware bit for bit, banding
//! included.

use embedded_graphics::pixelcolor::{Rgb565, Rgb888, RgbColor};

use crate::config::{
    CAUTION_COLOR, CAUTION_THRESHOLD, DANGER_COLOR, DANGER_THRESHOLD, DEFAULT_LIFE_MAX,
    HEALTHY_COLOR, HEALTHY_THRESHOLD,
};

/// Precision used for gradient interpolation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ColorDepth {
    /// 8 bits per channel, rounded once at the end.
    #[default]
    Full,
    /// Endpoints reduced to RGB565, integer `t` in `0..=255`.
    Rgb565,
}

/// Replace a non-positive max life with the default so nothing divides by zero.
pub fn sanitize_max_life(max_life: i32) -> i32 {
    if max_life <= 0 {
        DEFAULT_LIFE_MAX
    } else {
        max_life
    }
}

/// `life / max_life`, never negative.
pub fn life_ratio(life_total: i32, max_life: i32) -> f32 {
    let max_life = sanitize_max_life(max_life);
    (life_total.max(0) as f32) / (max_life as f32)
}

/// Linear blend `from → to` at `t ∈ [0, 1]`, per channel, rounded.
pub fn lerp_color(from: Rgb888, to: Rgb888, t: f32) -> Rgb888 {
    let t = t.clamp(0.0, 1.0);
    let mix = |a: u8, b: u8| -> u8 {
        let v = a as f32 + (b as f32 - a as f32) * t;
        // Channel values are non-negative, so +0.5 and truncation rounds.
        (v + 0.5).clamp(0.0, 255.0) as u8
    };
    Rgb888::new(
        mix(from.r(), to.r()),
        mix(from.g(), to.g()),
        mix(from.b(), to.b()),
    )
}

/// Gradient color for a life ratio (full precision).
pub fn gradient_color(ratio: f32) -> Rgb888 {
    let ratio = ratio.max(0.0);
    if ratio >= HEALTHY_THRESHOLD {
        HEALTHY_COLOR
    } else if ratio >= CAUTION_THRESHOLD {
        let t = (ratio - CAUTION_THRESHOLD) / (HEALTHY_THRESHOLD - CAUTION_THRESHOLD);
        lerp_color(CAUTION_COLOR, HEALTHY_COLOR, t)
    } else if ratio >= DANGER_THRESHOLD {
        let t = (ratio - DANGER_THRESHOLD) / (CAUTION_THRESHOLD - DANGER_THRESHOLD);
        lerp_color(DANGER_COLOR, CAUTION_COLOR, t)
    } else {
        DANGER_COLOR
    }
}

/// Gradient color for a life total at the requested depth.
pub fn life_color(life_total: i32, max_life: i32, depth: ColorDepth) -> Rgb888 {
    match depth {
        ColorDepth::Full => gradient_color(life_ratio(life_total, max_life)),
        ColorDepth::Rgb565 => life_color_565(life_total.max(0), sanitize_max_life(max_life)),
    }
}

/// Quantize to the panel's native format.
pub fn to_native(color: Rgb888) -> Rgb565 {
    Rgb565::from(color)
}

/// Pack to RGB565 and expand back with bit replication.
pub fn quantize_565(color: Rgb888) -> Rgb888 {
    let r5 = color.r() >> 3;
    let g6 = color.g() >> 2;
    let b5 = color.b() >> 3;
    Rgb888::new(
        (r5 << 3) | (r5 >> 2),
        (g6 << 2) | (g6 >> 4),
        (b5 << 3) | (b5 >> 2),
    )
}

/// Integer blend on RGB565-expanded endpoints, `t` out of 255.
pub fn lerp_color_565(from: Rgb888, to: Rgb888, t: u8) -> Rgb888 {
    let from = quantize_565(from);
    let to = quantize_565(to);
    let mix = |a: u8, b: u8| -> u8 {
        let (a, b) = (a as i32, b as i32);
        (a + (b - a) * t as i32 / 255) as u8
    };
    Rgb888::new(
        mix(from.r(), to.r()),
        mix(from.g(), to.g()),
        mix(from.b(), to.b()),
    )
}

fn life_color_565(life: i32, max_life: i32) -> Rgb888 {
    let threshold = |k: f32| (k * max_life as f32) as i32;
    let healthy = threshold(HEALTHY_THRESHOLD);
    let caution = threshold(CAUTION_THRESHOLD);
    let danger = threshold(DANGER_THRESHOLD);

    // Position within `[lo, hi)` out of 255. i64 so wide bands cannot overflow.
    let blend = |lo: i32, hi: i32| {
        ((life as i64 - lo as i64) * 255 / (hi as i64 - lo as i64)) as u8
    };

    // Small max values collapse the integer thresholds; an empty band
    // falls through to the next one.
    if life >= healthy {
        quantize_565(HEALTHY_COLOR)
    } else if life >= caution && healthy > caution {
        lerp_color_565(CAUTION_COLOR, HEALTHY_COLOR, blend(caution, healthy))
    } else if life >= danger && caution > danger {
        lerp_color_565(DANGER_COLOR, CAUTION_COLOR, blend(danger, caution))
    } else {
        quantize_565(DANGER_COLOR)
    }
}
