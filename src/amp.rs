//! Amp counter shown next to the single-player ring.
//!
//! Each tap adds one; the button fill moves from caution to danger and
//! stays there from [`AMP_PEAK`] on. A long press clears it.

use embedded_graphics::pixelcolor::Rgb888;

use crate::color::{lerp_color, lerp_color_565, ColorDepth};
use crate::config::{AMP_PEAK, CAUTION_COLOR, DANGER_COLOR};
use crate::surface::LifeSurface;
use crate::text::{self, NumberText};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AmpCounter {
    value: i32,
}

impl AmpCounter {
    pub const fn new() -> Self {
        Self { value: 0 }
    }

    pub fn value(&self) -> i32 {
        self.value
    }

    pub fn increment(&mut self) -> i32 {
        self.value = self.value.saturating_add(1);
        self.value
    }

    pub fn clear(&mut self) {
        self.value = 0;
    }

    /// `"+n"` once counting, `"0"` when cleared.
    pub fn label(&self) -> NumberText {
        if self.value == 0 {
            text::number(0)
        } else {
            text::signed_delta(self.value)
        }
    }

    /// Blend position out of 255, saturating at the peak.
    pub fn blend(&self) -> u8 {
        let v = self.value.clamp(0, AMP_PEAK);
        (v * 255 / AMP_PEAK) as u8
    }

    pub fn color(&self, depth: ColorDepth) -> Rgb888 {
        if self.value == 0 {
            return CAUTION_COLOR;
        }
        let t = self.blend();
        match depth {
            ColorDepth::Full => lerp_color(CAUTION_COLOR, DANGER_COLOR, t as f32 / 255.0),
            ColorDepth::Rgb565 => lerp_color_565(CAUTION_COLOR, DANGER_COLOR, t),
        }
    }

    pub fn render<D>(&self, surface: &mut D, depth: ColorDepth)
    where
        D: LifeSurface + ?Sized,
    {
        surface.set_amp(&self.label(), self.color(depth));
    }
}
