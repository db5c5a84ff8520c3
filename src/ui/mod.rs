//! User interface subsystem - OLED display + physical buttons.
//!
//! The main task feeds button presses into the life counter and redraws
//! the OLED whenever the counter pushed new widget values.
//!
//! ## Components
//!
//! - **Display**: SSD1306 128×64 OLED via I²C, ring + labels
//! - **Buttons**: 3 tactile switches with debouncing and long press (UP, DOWN, SELECT)

pub mod buttons;
pub mod display;

pub use lifering::ui::input_logic::{ButtonEvent, ButtonPress, PressKind};
