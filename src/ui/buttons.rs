//! GPIO button input with async debouncing and long-press detection.
//!
//! Three physical buttons (active-low with internal pull-up):
//!   - UP     - raise life (top / top of the active side)
//!   - DOWN   - lower life
//!   - SELECT - amp / switch side, hold to reset
//!
//! Each button is handled by an async task that waits for a GPIO edge,
//! debounces it, times the hold and sends a `ButtonPress` to the UI
//! channel. A long press is reported as soon as the threshold is reached,
//! without waiting for release.

use crate::ui::{ButtonEvent, ButtonPress, PressKind};
use defmt::info;
use embassy_futures::select::{select, Either};
use embassy_nrf::gpio::{AnyPin, Input, Pull};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Sender;
use embassy_time::{Duration, Timer};
use lifering::config::{BUTTON_DEBOUNCE_MS, LONG_PRESS_MS};

pub type PressSender = Sender<'static, CriticalSectionRawMutex, ButtonPress, 4>;

/// Run a single button polling loop.
#[embassy_executor::task(pool_size = 3)]
pub async fn button_task(pin: AnyPin, button: ButtonEvent, tx: PressSender) -> ! {
    let mut btn = Input::new(pin, Pull::Up);

    loop {
        // Wait for falling edge (button press, active-low).
        btn.wait_for_falling_edge().await;

        // Debounce: wait and re-check.
        Timer::after(Duration::from_millis(BUTTON_DEBOUNCE_MS)).await;
        if !btn.is_high() {
            let hold = Duration::from_millis(LONG_PRESS_MS - BUTTON_DEBOUNCE_MS);
            let kind = match select(btn.wait_for_rising_edge(), Timer::after(hold)).await {
                Either::First(()) => PressKind::Short,
                Either::Second(()) => PressKind::Long,
            };

            let press = ButtonPress { button, kind };
            info!("Button: {}", press);
            tx.send(press).await;

            // Wait for release to avoid repeat triggers.
            if kind == PressKind::Long {
                btn.wait_for_high().await;
            }
            Timer::after(Duration::from_millis(BUTTON_DEBOUNCE_MS)).await;
        }
    }
}
