//! SSD1306 OLED rendering of the life counter.
//!
//! The panel is monochrome, so arc colors are recorded but not drawn.
//! Widget updates from the counter land in a [`SurfaceState`]; the main
//! loop calls [`OledSurface::render`] when something changed.

use embedded_graphics::mono_font::ascii::{FONT_10X20, FONT_6X10};
use embedded_graphics::mono_font::{MonoFont, MonoTextStyle, MonoTextStyleBuilder};
use embedded_graphics::pixelcolor::{BinaryColor, Rgb888};
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{Arc, PrimitiveStyle};
use embedded_graphics::text::{Alignment, Text};
use lifering::arc::{ArcLayout, ArcMapper};
use lifering::player::{PlayerMode, PlayerSlot};
use lifering::surface::{LifeSurface, SurfaceState};
use ssd1306::mode::BufferedGraphicsMode;
use ssd1306::prelude::*;
use ssd1306::I2CDisplayInterface;
use ssd1306::Ssd1306;

/// Type alias for the concrete display driver.
///
/// Generic over the I²C implementation so callers pass in their HAL's
/// I²C peripheral.
pub type Display<I2C> =
    Ssd1306<I2CInterface<I2C>, DisplaySize128x64, BufferedGraphicsMode<DisplaySize128x64>>;

const RING_CENTER: Point = Point::new(64, 32);
const RING_DIAMETER: u32 = 62;
const RING_STROKE: u32 = 4;

/// Initialise the SSD1306 display and clear the screen.
pub fn init<I2C>(i2c: I2C) -> Display<I2C>
where
    I2C: embedded_hal::i2c::I2c,
{
    let interface = I2CDisplayInterface::new(i2c);
    let mut display = Ssd1306::new(interface, DisplaySize128x64, DisplayRotation::Rotate0)
        .into_buffered_graphics_mode();
    let _ = display.init();
    display.clear_buffer();
    let _ = display.flush();
    display
}

fn text_style(font: &'static MonoFont<'static>) -> MonoTextStyle<'static, BinaryColor> {
    MonoTextStyleBuilder::new()
        .font(font)
        .text_color(BinaryColor::On)
        .build()
}

fn sweep(start: u16, end: u16) -> i32 {
    (end as i32 - start as i32).rem_euclid(360)
}

/// The life screen on the OLED.
pub struct OledSurface<I2C> {
    display: Display<I2C>,
    state: SurfaceState,
    dirty: bool,
}

impl<I2C> OledSurface<I2C>
where
    I2C: embedded_hal::i2c::I2c,
{
    pub fn new(display: Display<I2C>) -> Self {
        Self {
            display,
            state: SurfaceState::default(),
            dirty: true,
        }
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Redraw the slots of `mode` and flush.
    pub fn render(&mut self, mode: PlayerMode, mapper: &ArcMapper) {
        self.display.clear_buffer();

        for &slot in mode.slots() {
            self.draw_background(mapper, slot.into());
            self.draw_slot(mode, slot);
        }

        if mode == PlayerMode::OnePlayer && !self.state.amp_text.is_empty() {
            let _ = Text::with_alignment(
                self.state.amp_text.as_str(),
                Point::new(127, 8),
                text_style(&FONT_6X10),
                Alignment::Right,
            )
            .draw(&mut self.display);
        }

        let _ = self.display.flush();
        self.dirty = false;
    }

    fn draw_background(&mut self, mapper: &ArcMapper, layout: ArcLayout) {
        let (start, end) = mapper.half_bounds(layout);
        let _ = Arc::with_center(
            RING_CENTER,
            RING_DIAMETER,
            (start as f32).deg(),
            (sweep(start, end) as f32).deg(),
        )
        .into_styled(PrimitiveStyle::with_stroke(BinaryColor::On, 1))
        .draw(&mut self.display);
    }

    fn draw_slot(&mut self, mode: PlayerMode, slot: PlayerSlot) {
        let widgets = self.state.slot(slot);

        if let Some((start, end)) = widgets.arc {
            let sweep = sweep(start, end);
            if sweep > 0 {
                let _ = Arc::with_center(
                    RING_CENTER,
                    RING_DIAMETER,
                    (start as f32).deg(),
                    (sweep as f32).deg(),
                )
                .into_styled(PrimitiveStyle::with_stroke(BinaryColor::On, RING_STROKE))
                .draw(&mut self.display);
            }
        }

        let (label_at, pending_at, font) = match (mode, slot) {
            (PlayerMode::TwoPlayer, PlayerSlot::One) => {
                (Point::new(48, 36), Point::new(48, 50), &FONT_6X10)
            }
            (PlayerMode::TwoPlayer, _) => (Point::new(80, 36), Point::new(80, 50), &FONT_6X10),
            _ => (Point::new(64, 38), Point::new(64, 54), &FONT_10X20),
        };

        let _ = Text::with_alignment(
            widgets.label.as_str(),
            label_at,
            text_style(font),
            Alignment::Center,
        )
        .draw(&mut self.display);

        if let Some((text, _)) = &widgets.pending {
            let _ = Text::with_alignment(
                text.as_str(),
                pending_at,
                text_style(&FONT_6X10),
                Alignment::Center,
            )
            .draw(&mut self.display);
        }
    }
}

impl<I2C> LifeSurface for OledSurface<I2C> {
    fn set_arc_angles(&mut self, slot: PlayerSlot, start: u16, end: u16) {
        self.state.set_arc_angles(slot, start, end);
        self.dirty = true;
    }

    fn set_arc_color(&mut self, slot: PlayerSlot, color: Rgb888) {
        self.state.set_arc_color(slot, color);
    }

    fn set_label_text(&mut self, slot: PlayerSlot, text: &str) {
        self.state.set_label_text(slot, text);
        self.dirty = true;
    }

    fn show_pending_change(&mut self, slot: PlayerSlot, text: &str, color: Rgb888) {
        self.state.show_pending_change(slot, text, color);
        self.dirty = true;
    }

    fn hide_pending_change(&mut self, slot: PlayerSlot) {
        self.state.hide_pending_change(slot);
        self.dirty = true;
    }

    fn set_amp(&mut self, text: &str, color: Rgb888) {
        self.state.set_amp(text, color);
        self.dirty = true;
    }
}
