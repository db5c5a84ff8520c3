//! Display side of the life counter.
//!
//! The widget toolkit is out of reach of this crate; everything the core
//! needs from it goes through [`LifeSurface`].

use embedded_graphics::pixelcolor::Rgb888;

use crate::arc::{ArcMapper, ArcSegment};
use crate::player::PlayerSlot;
use crate::text;

/// Widgets the life counter draws into.
pub trait LifeSurface {
    fn set_arc_angles(&mut self, slot: PlayerSlot, start: u16, end: u16);

    fn set_arc_color(&mut self, slot: PlayerSlot, color: Rgb888);

    fn set_label_text(&mut self, slot: PlayerSlot, text: &str);

    /// Show the transient "+3" label next to the total.
    fn show_pending_change(&mut self, _slot: PlayerSlot, _text: &str, _color: Rgb888) {}

    fn hide_pending_change(&mut self, _slot: PlayerSlot) {}

    /// Amp button label and fill.
    fn set_amp(&mut self, _text: &str, _color: Rgb888) {}
}

/// Push a life value to the label and the ring of `slot`.
pub fn render_life<D>(
    surface: &mut D,
    mapper: &ArcMapper,
    slot: PlayerSlot,
    life_total: i32,
    max_life: i32,
) -> ArcSegment
where
    D: LifeSurface + ?Sized,
{
    surface.set_label_text(slot, &text::number(life_total));
    let seg = mapper.map_slot(slot, life_total, max_life);
    surface.set_arc_angles(slot, seg.start_angle, seg.end_angle);
    surface.set_arc_color(slot, seg.color);
    seg
}

/// Surface that remembers the last value pushed to each widget.
///
/// Used by the host tests and handy for headless runs.
#[derive(Clone, Debug, Default)]
pub struct SurfaceState {
    slots: [SlotWidgets; 3],
    pub amp_text: heapless::String<12>,
    pub amp_color: Option<Rgb888>,
    /// Number of label updates across all slots.
    pub label_updates: u32,
}

/// Widgets of one player slot.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SlotWidgets {
    pub label: heapless::String<12>,
    pub arc: Option<(u16, u16)>,
    pub arc_color: Option<Rgb888>,
    pub pending: Option<(heapless::String<12>, Rgb888)>,
}

impl SurfaceState {
    pub fn slot(&self, slot: PlayerSlot) -> &SlotWidgets {
        &self.slots[slot.id() as usize]
    }

    fn slot_mut(&mut self, slot: PlayerSlot) -> &mut SlotWidgets {
        &mut self.slots[slot.id() as usize]
    }
}

fn truncated(text: &str) -> heapless::String<12> {
    let mut s = heapless::String::new();
    for c in text.chars() {
        if s.push(c).is_err() {
            break;
        }
    }
    s
}

impl LifeSurface for SurfaceState {
    fn set_arc_angles(&mut self, slot: PlayerSlot, start: u16, end: u16) {
        self.slot_mut(slot).arc = Some((start, end));
    }

    fn set_arc_color(&mut self, slot: PlayerSlot, color: Rgb888) {
        self.slot_mut(slot).arc_color = Some(color);
    }

    fn set_label_text(&mut self, slot: PlayerSlot, text: &str) {
        self.slot_mut(slot).label = truncated(text);
        self.label_updates += 1;
    }

    fn show_pending_change(&mut self, slot: PlayerSlot, text: &str, color: Rgb888) {
        self.slot_mut(slot).pending = Some((truncated(text), color));
    }

    fn hide_pending_change(&mut self, slot: PlayerSlot) {
        self.slot_mut(slot).pending = None;
    }

    fn set_amp(&mut self, text: &str, color: Rgb888) {
        self.amp_text = truncated(text);
        self.amp_color = Some(color);
    }
}
