//! Application-wide constants and compile-time configuration.
//!
//! Timing parameters, ring geometry, colors and persistent-store keys
//! live here so they can be tuned in one place.

use embedded_graphics::pixelcolor::Rgb888;

// Grouper

/// Trailing debounce window for coalescing life changes (ms).
pub const GROUPER_WINDOW_MS: u64 = 2000;

/// Number of committed history rows kept per player slot.
///
/// The oldest row is evicted once the ring is full. This departs from the
/// touch-screen firmware, whose history grows without bound; a `no_std`
/// target needs a fixed capacity.
pub const HISTORY_CAPACITY: usize = 128;

// Life defaults

/// Starting / maximum life when nothing is configured.
pub const DEFAULT_LIFE_MAX: i32 = 40;

/// Default tap step.
pub const DEFAULT_LIFE_INCREMENT_SMALL: i32 = 1;

/// Default long-press step.
pub const DEFAULT_LIFE_INCREMENT_LARGE: i32 = 5;

// Ring geometry
//
// Angles follow the display convention: 0° at 3 o'clock, growing
// clockwise, so 90° is the bottom of the screen and 270° the top.

/// Diameter of the life ring (px). The panel is 360×360.
pub const SCREEN_DIAMETER_PX: f32 = 360.0;

/// Gap at the bottom of the single-player ring, measured along the
/// circumference (px).
pub const ARC_GAP_PX: f32 = 200.0;

/// Gap between the two half rings in two-player mode (degrees, per side).
pub const SPLIT_ARC_GAP_DEG: u16 = 60;

// Reveal animation

/// Resolution of the reveal sweep.
pub const SMOOTH_ARC_STEPS: u32 = 1000;

/// Duration of the reveal sweep (ms).
pub const ARC_ANIMATION_DURATION_MS: u64 = 300;

// Colors

/// Life at or above 87.5 % of max.
pub const HEALTHY_COLOR: Rgb888 = Rgb888::new(0x00, 0xe3, 0x1f);

/// Mid-range life.
pub const CAUTION_COLOR: Rgb888 = Rgb888::new(0xeb, 0xf7, 0x00);

/// Life below 25 % of max.
pub const DANGER_COLOR: Rgb888 = Rgb888::new(0xe8, 0x00, 0x00);

/// Gradient thresholds as fractions of max life.
pub const HEALTHY_THRESHOLD: f32 = 0.875;
pub const CAUTION_THRESHOLD: f32 = 0.55;
pub const DANGER_THRESHOLD: f32 = 0.25;

// Amp counter

/// Amp value at which the amp button reaches its final color.
pub const AMP_PEAK: i32 = 8;

// Persistent store keys

pub const KEY_LIFE_MAX: &str = "life";
pub const KEY_PLAYER_MODE: &str = "player_mode";
pub const KEY_AMP_MODE: &str = "amp_mode";
pub const KEY_LIFE_STEP_SMALL: &str = "life_step_small";
pub const KEY_LIFE_STEP_LARGE: &str = "life_step_large";
pub const KEY_PRESET_INDEX: &str = "preset_idx";

/// Saved total for the single player or player 1.
pub const KEY_SAVED_LIFE_P1: &str = "saved_life_p1";
/// Saved total for player 2.
pub const KEY_SAVED_LIFE_P2: &str = "saved_life_p2";
/// 1 if the saved totals should be trusted on the next boot.
pub const KEY_LIFE_SAVE_VALID: &str = "life_save_valid";

pub const KEY_TIMER_MODE: &str = "timer_mode";
/// Countdown length in seconds.
pub const KEY_ROUND_TIME: &str = "round_time";
pub const KEY_SHOW_TIMER: &str = "show_timer";

// Game timer

/// Countdown length when nothing is configured (s).
pub const DEFAULT_ROUND_TIME_S: i32 = 300;

/// Longest accepted countdown, 999 minutes (s).
pub const MAX_ROUND_TIME_S: i32 = 59_940;

// GPIO pin assignments (nRF52840-DK defaults)
//
// Peripherals are taken in `main.rs`; adjust there for a custom PCB.
//
//   Button UP      → P0.11
//   Button DOWN    → P0.12
//   Button SELECT  → P0.24
//   I²C SDA        → P0.26
//   I²C SCL        → P0.27

// Firmware timing

/// Main loop tick (ms). Commit deadlines are honoured within one tick.
pub const TICK_INTERVAL_MS: u64 = 20;

/// Button debounce time (ms).
pub const BUTTON_DEBOUNCE_MS: u64 = 50;

/// Hold time that turns a press into a long press (ms).
pub const LONG_PRESS_MS: u64 = 500;

/// Minimum interval between flash writes of the settings record (ms).
pub const STORE_FLUSH_INTERVAL_MS: u64 = 5000;

// Settings storage

/// Flash page index where the settings record starts (4 KB per page on nRF52840).
pub const STORAGE_FLASH_PAGE_START: u32 = 240;

/// Number of flash pages reserved for the settings record.
pub const STORAGE_FLASH_PAGE_COUNT: u32 = 4;
