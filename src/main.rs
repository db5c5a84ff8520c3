//! lifering firmware - life counter on an nRF52840 with an SSD1306 OLED.
//!
//! ```text
//!  UP / DOWN / SELECT ──► button tasks ──► channel ─┐
//!                                                   ▼
//!  20 ms ticker ─────────────────────────────► main loop ─► LifeCounter ─► OLED
//!                                                   │
//!                                                   └─► FlashStore ─► NVMC (every 5 s if dirty)
//! ```

#![no_std]
#![no_main]

mod storage;
mod ui;

use core::cell::RefCell;

use defmt::info;
use defmt_rtt as _;
use embassy_embedded_hal::adapter::BlockingAsync;
use embassy_executor::Spawner;
use embassy_futures::select::{select, Either};
use embassy_nrf::gpio::Pin;
use embassy_nrf::nvmc::Nvmc;
use embassy_nrf::twim::{self, Twim};
use embassy_nrf::{bind_interrupts, peripherals};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embassy_time::{Duration, Instant, Ticker};
use embedded_storage_async::nor_flash::NorFlash;
use lifering::config::{STORE_FLUSH_INTERVAL_MS, TICK_INTERVAL_MS};
use lifering::store::MAX_RECORD_SIZE;
use lifering::ui::input_logic::{command_for, ButtonCommand, Side};
use lifering::{ArcMapper, LifeCounter};
use panic_probe as _;
use static_cell::StaticCell;

use crate::storage::{FlashStore, Record};
use crate::ui::buttons::button_task;
use crate::ui::display::{self, OledSurface};
use crate::ui::{ButtonEvent, ButtonPress};

bind_interrupts!(struct Irqs {
    TWISPI0 => twim::InterruptHandler<peripherals::TWISPI0>;
});

static BUTTONS: Channel<CriticalSectionRawMutex, ButtonPress, 4> = Channel::new();
static STORE: StaticCell<RefCell<FlashStore>> = StaticCell::new();

fn now_ms() -> u64 {
    Instant::now().as_millis()
}

/// Write the settings record if it changed since the last write.
async fn flush(store: &RefCell<FlashStore>, flash: &mut impl NorFlash) {
    let mut record: Record = [0u8; MAX_RECORD_SIZE];
    let Some(len) = store.borrow().snapshot(&mut record) else {
        return;
    };
    if storage::write_record(flash, &record[..len]).await.is_ok() {
        store.borrow_mut().mark_clean();
    }
}

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    let p = embassy_nrf::init(Default::default());
    info!("lifering starting");

    // Settings and saved life totals.
    let mut flash = BlockingAsync::new(Nvmc::new(p.NVMC));
    let mut flash_store = FlashStore::new();
    flash_store.load_from_flash(&mut flash).await;
    let store: &'static RefCell<FlashStore> = STORE.init(RefCell::new(flash_store));

    // OLED on TWIM0 (SDA P0.26, SCL P0.27).
    let i2c = Twim::new(p.TWISPI0, Irqs, p.P0_26, p.P0_27, twim::Config::default());
    let mut surface = OledSurface::new(display::init(i2c));

    // Buttons: UP P0.11, DOWN P0.12, SELECT P0.24.
    spawner.must_spawn(button_task(p.P0_11.degrade(), ButtonEvent::Up, BUTTONS.sender()));
    spawner.must_spawn(button_task(p.P0_12.degrade(), ButtonEvent::Down, BUTTONS.sender()));
    spawner.must_spawn(button_task(p.P0_24.degrade(), ButtonEvent::Select, BUTTONS.sender()));

    let mut counter = LifeCounter::new(store, ArcMapper::default());
    counter.init(now_ms(), &mut surface);

    let mut side = Side::default();
    let mut ticker = Ticker::every(Duration::from_millis(TICK_INTERVAL_MS));
    let mut last_flush = Instant::now();
    let presses = BUTTONS.receiver();

    loop {
        match select(ticker.next(), presses.receive()).await {
            Either::First(()) => {
                counter.tick(now_ms(), &mut surface);
            }
            Either::Second(press) => match command_for(counter.mode(), side, press) {
                ButtonCommand::Gesture(gesture) => {
                    counter.handle_gesture(gesture, now_ms(), &mut surface);
                }
                ButtonCommand::ToggleSide => {
                    side = side.toggled();
                    info!("Buttons now control {}", side);
                }
                ButtonCommand::Reset => counter.reset(&mut surface),
            },
        }

        if surface.is_dirty() {
            surface.render(counter.mode(), counter.mapper());
        }

        if last_flush.elapsed() >= Duration::from_millis(STORE_FLUSH_INTERVAL_MS) {
            flush(store, &mut flash).await;
            last_flush = Instant::now();
        }
    }
}
