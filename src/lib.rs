//! Life-total tracker for tabletop card games.
//!
//! Everything here is pure logic that runs on the host as well as on the
//! nRF52840: the coalescing life [`grouper`], the [`arc`] mapper for the
//! round display, the startup [`reveal`], persistence through a
//! [`store::KeyValueStore`] and the [`counter::LifeCounter`] screen
//! controller that ties them together. The [`timer`] and [`dice`] tools
//! sit beside it.
//!
//! Usage: `cargo test` (host) or `cargo run --release --features embedded --target thumbv7em-none-eabihf`
//! (target, via probe-rs).
//!
//! Note: The embedded binary uses main.rs with #![no_std] and #![no_main]
//! and adds the hardware modules (flash storage, buttons, OLED).

#![cfg_attr(not(test), no_std)]

#[macro_use]
mod fmt;

pub mod amp;
pub mod arc;
pub mod color;
pub mod config;
pub mod counter;
pub mod dice;
pub mod error;
pub mod gesture;
pub mod grouper;
pub mod persist;
pub mod player;
pub mod presets;
pub mod reveal;
pub mod settings;
pub mod store;
pub mod surface;
pub mod text;
pub mod timer;

#[path = "ui/input_logic.rs"]
mod ui_input_logic_impl;

pub mod ui {
    pub mod input_logic {
        pub use crate::ui_input_logic_impl::*;
    }
}

pub use arc::{ArcLayout, ArcMapper, ArcSegment};
pub use counter::{HistoryRow, LifeCounter};
pub use dice::{flip_coin, CoinFace, Die};
pub use error::Error;
pub use gesture::{Gesture, GestureAction};
pub use grouper::{CommitObserver, Grouper, LifeHistoryEvent, ZeroCommitPolicy};
pub use player::{PlayerMode, PlayerSlot};
pub use store::{KeyValueStore, MemoryStore};
pub use surface::{LifeSurface, SurfaceState};
pub use timer::{GameTimer, TimerMode};
