//! Settings and life totals in internal flash.
//!
//! The whole key-value store is kept in RAM (`MemoryStore`) and written
//! to the nRF52840's flash as one `sequential-storage` map item. The
//! crate handles wear levelling and GC across the reserved pages.
//!
//! Writes are not done on every commit: the main loop calls
//! [`write_record`] at most every `STORE_FLUSH_INTERVAL_MS` while the
//! cache is dirty.

use defmt::{debug, error, info, warn};
use embedded_storage_async::nor_flash::NorFlash;
use lifering::config::{STORAGE_FLASH_PAGE_COUNT, STORAGE_FLASH_PAGE_START};
use lifering::store::{KeyValueStore, MemoryStore, StoreString, MAX_RECORD_SIZE};
use lifering::Error;

/// Flash page size for nRF52840 (4 KB).
const FLASH_PAGE_SIZE: u32 = 4096;

/// Start address of our storage region.
const STORAGE_START: u32 = STORAGE_FLASH_PAGE_START * FLASH_PAGE_SIZE;

/// End address (exclusive) of our storage region.
const STORAGE_END: u32 = (STORAGE_FLASH_PAGE_START + STORAGE_FLASH_PAGE_COUNT) * FLASH_PAGE_SIZE;

/// Key of the settings record in the map storage.
const KEY_SETTINGS: u8 = 0x01;

/// Scratch buffer for sequential-storage: record plus item header.
const ITEM_BUF_SIZE: usize = MAX_RECORD_SIZE + 32;

pub type Record = [u8; MAX_RECORD_SIZE];

/// In-memory cache of the key-value store, synced with flash.
pub struct FlashStore {
    cache: MemoryStore,
}

impl FlashStore {
    pub const fn new() -> Self {
        Self {
            cache: MemoryStore::new(),
        }
    }

    /// Async load from flash. Starts empty if nothing (valid) is stored.
    pub async fn load_from_flash(&mut self, flash: &mut impl NorFlash) {
        let mut buf = [0u8; ITEM_BUF_SIZE];

        match sequential_storage::map::fetch_item::<u8, &[u8], _>(
            flash,
            STORAGE_START..STORAGE_END,
            &mut sequential_storage::cache::NoCache::new(),
            &mut buf,
            &KEY_SETTINGS,
        )
        .await
        {
            Ok(Some(data)) => match MemoryStore::deserialize(data) {
                Ok(cache) => {
                    self.cache = cache;
                    info!("Loaded {} settings from flash", self.cache.len());
                }
                Err(e) => {
                    warn!("Settings record unreadable ({}), using defaults", e);
                    self.cache = MemoryStore::new();
                }
            },
            Ok(None) => {
                info!("No settings in flash");
                self.cache = MemoryStore::new();
            }
            Err(e) => {
                error!("Flash read error: {:?}", defmt::Debug2Format(&e));
                self.cache = MemoryStore::new();
            }
        }
    }

    pub fn is_dirty(&self) -> bool {
        self.cache.is_dirty()
    }

    /// Serialize the cache for [`write_record`]; `None` if nothing changed.
    pub fn snapshot(&self, record: &mut Record) -> Option<usize> {
        if !self.cache.is_dirty() {
            debug!("FlashStore: no changes to save");
            return None;
        }
        match self.cache.serialize(record) {
            Ok(len) => Some(len),
            Err(e) => {
                error!("Settings serialize failed: {}", e);
                None
            }
        }
    }

    /// Call after the snapshot has been written.
    pub fn mark_clean(&mut self) {
        self.cache.mark_clean();
    }
}

impl KeyValueStore for FlashStore {
    fn get_int(&mut self, key: &str, default: i32) -> i32 {
        self.cache.get_int(key, default)
    }

    fn put_int(&mut self, key: &str, value: i32) -> Result<(), Error> {
        self.cache.put_int(key, value)
    }

    fn get_string(&mut self, key: &str, default: &str) -> StoreString {
        self.cache.get_string(key, default)
    }

    fn put_string(&mut self, key: &str, value: &str) -> Result<(), Error> {
        self.cache.put_string(key, value)
    }
}

/// Persist a serialized settings record.
pub async fn write_record(flash: &mut impl NorFlash, record: &[u8]) -> Result<(), Error> {
    let mut buf = [0u8; ITEM_BUF_SIZE];

    match sequential_storage::map::store_item::<u8, &[u8], _>(
        flash,
        STORAGE_START..STORAGE_END,
        &mut sequential_storage::cache::NoCache::new(),
        &mut buf,
        &KEY_SETTINGS,
        &record,
    )
    .await
    {
        Ok(_) => {
            info!("Saved settings to flash ({} bytes)", record.len());
            Ok(())
        }
        Err(e) => {
            error!("Flash write error: {:?}", defmt::Debug2Format(&e));
            Err(Error::Storage)
        }
    }
}
