//! Namespaced integer/string key-value store.
//!
//! [`KeyValueStore`] is the contract the life counter persists through.
//! [`MemoryStore`] is a bounded RAM implementation with a dirty flag;
//! the firmware keeps one as a cache and writes it to flash as a single
//! serialized record.
//!
//! Record layout (little-endian):
//! ```text
//! [count]
//! repeated count times:
//!   [key_len][key bytes][tag]
//!   tag 0: [i32; 4 bytes]
//!   tag 1: [str_len][str bytes]
//! ```

use core::cell::RefCell;

use heapless::{String, Vec};

use crate::error::Error;

/// Longest key accepted by [`MemoryStore`].
pub const MAX_KEY_LEN: usize = 16;

/// Longest string value accepted by [`MemoryStore`].
pub const MAX_STRING_LEN: usize = 32;

/// Number of keys [`MemoryStore`] can hold.
pub const MAX_ENTRIES: usize = 64;

/// Upper bound of a serialized [`MemoryStore`].
pub const MAX_RECORD_SIZE: usize = 1 + MAX_ENTRIES * (1 + MAX_KEY_LEN + 1 + 1 + MAX_STRING_LEN);

pub type StoreString = String<MAX_STRING_LEN>;

/// Persistent settings storage.
///
/// Reads never fail: a missing or unreadable key yields `default`.
pub trait KeyValueStore {
    fn get_int(&mut self, key: &str, default: i32) -> i32;

    fn put_int(&mut self, key: &str, value: i32) -> Result<(), Error>;

    fn get_string(&mut self, key: &str, default: &str) -> StoreString;

    fn put_string(&mut self, key: &str, value: &str) -> Result<(), Error>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for &mut S {
    fn get_int(&mut self, key: &str, default: i32) -> i32 {
        (**self).get_int(key, default)
    }

    fn put_int(&mut self, key: &str, value: i32) -> Result<(), Error> {
        (**self).put_int(key, value)
    }

    fn get_string(&mut self, key: &str, default: &str) -> StoreString {
        (**self).get_string(key, default)
    }

    fn put_string(&mut self, key: &str, value: &str) -> Result<(), Error> {
        (**self).put_string(key, value)
    }
}

/// Shared store on a single thread. A re-entrant borrow reads the
/// default and fails writes with [`Error::Busy`] instead of panicking.
impl<S: KeyValueStore> KeyValueStore for &RefCell<S> {
    fn get_int(&mut self, key: &str, default: i32) -> i32 {
        match self.try_borrow_mut() {
            Ok(mut s) => s.get_int(key, default),
            Err(_) => default,
        }
    }

    fn put_int(&mut self, key: &str, value: i32) -> Result<(), Error> {
        self.try_borrow_mut()
            .map_err(|_| Error::Busy)?
            .put_int(key, value)
    }

    fn get_string(&mut self, key: &str, default: &str) -> StoreString {
        match self.try_borrow_mut() {
            Ok(mut s) => s.get_string(key, default),
            Err(_) => truncate(default),
        }
    }

    fn put_string(&mut self, key: &str, value: &str) -> Result<(), Error> {
        self.try_borrow_mut()
            .map_err(|_| Error::Busy)?
            .put_string(key, value)
    }
}

/// Cut `s` to the longest prefix that fits [`MAX_STRING_LEN`] bytes on
/// a char boundary.
pub fn truncate(s: &str) -> StoreString {
    let mut out = StoreString::new();
    for c in s.chars() {
        if out.push(c).is_err() {
            break;
        }
    }
    out
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StoredValue {
    Int(i32),
    Str(StoreString),
}

const TAG_INT: u8 = 0;
const TAG_STR: u8 = 1;

#[derive(Clone, Debug, PartialEq, Eq)]
struct Entry {
    key: String<MAX_KEY_LEN>,
    value: StoredValue,
}

/// Bounded in-RAM store.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    entries: Vec<Entry, MAX_ENTRIES>,
    /// True if the contents differ from what was last loaded or saved.
    dirty: bool,
}

impl MemoryStore {
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
            dirty: false,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Call after the contents have been written out.
    pub fn mark_clean(&mut self) {
        self.dirty = false;
    }

    pub fn get(&self, key: &str) -> Option<&StoredValue> {
        self.entries
            .iter()
            .find(|e| e.key.as_str() == key)
            .map(|e| &e.value)
    }

    pub fn remove(&mut self, key: &str) -> Option<StoredValue> {
        let idx = self.entries.iter().position(|e| e.key.as_str() == key)?;
        self.dirty = true;
        Some(self.entries.swap_remove(idx).value)
    }

    fn put(&mut self, key: &str, value: StoredValue) -> Result<(), Error> {
        if let Some(entry) = self.entries.iter_mut().find(|e| e.key.as_str() == key) {
            if entry.value != value {
                entry.value = value;
                self.dirty = true;
            }
            return Ok(());
        }

        let mut k = String::new();
        k.push_str(key).map_err(|_| Error::KeyTooLong)?;
        self.entries
            .push(Entry { key: k, value })
            .map_err(|_| Error::StoreFull)?;
        self.dirty = true;
        Ok(())
    }

    /// Serialize all entries into `buf`; returns the number of bytes used.
    pub fn serialize(&self, buf: &mut [u8]) -> Result<usize, Error> {
        let mut w = Writer { buf, pos: 0 };
        w.byte(self.entries.len() as u8)?;
        for entry in &self.entries {
            w.byte(entry.key.len() as u8)?;
            w.bytes(entry.key.as_bytes())?;
            match &entry.value {
                StoredValue::Int(v) => {
                    w.byte(TAG_INT)?;
                    w.bytes(&v.to_le_bytes())?;
                }
                StoredValue::Str(s) => {
                    w.byte(TAG_STR)?;
                    w.byte(s.len() as u8)?;
                    w.bytes(s.as_bytes())?;
                }
            }
        }
        Ok(w.pos)
    }

    /// Decode a record produced by [`serialize`](Self::serialize).
    ///
    /// The result is clean. Any structural problem rejects the whole
    /// record so a torn write never yields half the settings.
    pub fn deserialize(data: &[u8]) -> Result<Self, Error> {
        let mut r = Reader { data, pos: 0 };
        let count = r.byte()? as usize;
        if count > MAX_ENTRIES {
            return Err(Error::Corrupt);
        }

        let mut store = Self::new();
        for _ in 0..count {
            let key_len = r.byte()? as usize;
            let key = core::str::from_utf8(r.take(key_len)?).map_err(|_| Error::Corrupt)?;
            let value = match r.byte()? {
                TAG_INT => {
                    let raw = r.take(4)?;
                    StoredValue::Int(i32::from_le_bytes([raw[0], raw[1], raw[2], raw[3]]))
                }
                TAG_STR => {
                    let len = r.byte()? as usize;
                    let s = core::str::from_utf8(r.take(len)?).map_err(|_| Error::Corrupt)?;
                    let mut value = StoreString::new();
                    value.push_str(s).map_err(|_| Error::Corrupt)?;
                    StoredValue::Str(value)
                }
                _ => return Err(Error::Corrupt),
            };
            store.put(key, value).map_err(|_| Error::Corrupt)?;
        }

        store.dirty = false;
        Ok(store)
    }
}

impl KeyValueStore for MemoryStore {
    fn get_int(&mut self, key: &str, default: i32) -> i32 {
        match self.get(key) {
            Some(StoredValue::Int(v)) => *v,
            _ => default,
        }
    }

    fn put_int(&mut self, key: &str, value: i32) -> Result<(), Error> {
        self.put(key, StoredValue::Int(value))
    }

    fn get_string(&mut self, key: &str, default: &str) -> StoreString {
        match self.get(key) {
            Some(StoredValue::Str(s)) => s.clone(),
            _ => truncate(default),
        }
    }

    fn put_string(&mut self, key: &str, value: &str) -> Result<(), Error> {
        let mut s = StoreString::new();
        s.push_str(value).map_err(|_| Error::ValueTooLong)?;
        self.put(key, StoredValue::Str(s))
    }
}

struct Writer<'a> {
    buf: &'a mut [u8],
    pos: usize,
}

impl Writer<'_> {
    fn byte(&mut self, b: u8) -> Result<(), Error> {
        self.bytes(&[b])
    }

    fn bytes(&mut self, data: &[u8]) -> Result<(), Error> {
        let end = self.pos + data.len();
        if end > self.buf.len() {
            return Err(Error::BufferOverflow);
        }
        self.buf[self.pos..end].copy_from_slice(data);
        self.pos = end;
        Ok(())
    }
}

struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn byte(&mut self) -> Result<u8, Error> {
        Ok(self.take(1)?[0])
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8], Error> {
        let end = self.pos + len;
        if end > self.data.len() {
            return Err(Error::Corrupt);
        }
        let out = &self.data[self.pos..end];
        self.pos = end;
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_keys_yield_defaults() {
        let mut store = MemoryStore::new();
        assert_eq!(store.get_int("life", 40), 40);
        assert_eq!(store.get_string("preset_0_name", "").as_str(), "");
        assert!(!store.is_dirty());
    }

    #[test]
    fn put_then_get() {
        let mut store = MemoryStore::new();
        store.put_int("life", 20).unwrap();
        store.put_string("preset_0_name", "Commander").unwrap();
        assert_eq!(store.get_int("life", 40), 20);
        assert_eq!(store.get_string("preset_0_name", "").as_str(), "Commander");
        assert_eq!(store.len(), 2);
        assert!(store.is_dirty());
    }

    #[test]
    fn type_mismatch_reads_default() {
        let mut store = MemoryStore::new();
        store.put_string("life", "twenty").unwrap();
        assert_eq!(store.get_int("life", 40), 40);
        store.put_int("name", 3).unwrap();
        assert_eq!(store.get_string("name", "x").as_str(), "x");
    }

    #[test]
    fn overwrite_keeps_one_entry_and_tracks_dirty() {
        let mut store = MemoryStore::new();
        store.put_int("life", 20).unwrap();
        store.mark_clean();

        store.put_int("life", 20).unwrap();
        assert!(!store.is_dirty(), "same value must not dirty the store");

        store.put_int("life", 21).unwrap();
        assert!(store.is_dirty());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn limits_are_reported() {
        let mut store = MemoryStore::new();
        assert_eq!(
            store.put_int("this_key_is_far_too_long", 1),
            Err(Error::KeyTooLong)
        );
        assert_eq!(
            store.put_string("k", "0123456789012345678901234567890123"),
            Err(Error::ValueTooLong)
        );

        for i in 0..MAX_ENTRIES {
            let mut key: String<MAX_KEY_LEN> = String::new();
            core::fmt::Write::write_fmt(&mut key, format_args!("k{}", i)).unwrap();
            store.put_int(&key, i as i32).unwrap();
        }
        assert_eq!(store.put_int("one_more", 1), Err(Error::StoreFull));
        // Updating an existing key still works when full.
        assert_eq!(store.put_int("k0", 99), Ok(()));
    }

    #[test]
    fn record_roundtrip_is_clean() {
        let mut store = MemoryStore::new();
        store.put_int("saved_life_p1", -7).unwrap();
        store.put_int("life_save_valid", 1).unwrap();
        store.put_string("preset_3_name", "Yu-Gi-Oh!").unwrap();

        let mut buf = [0u8; MAX_RECORD_SIZE];
        let len = store.serialize(&mut buf).unwrap();
        let mut loaded = MemoryStore::deserialize(&buf[..len]).unwrap();

        assert!(!loaded.is_dirty());
        assert_eq!(loaded.len(), 3);
        assert_eq!(loaded.get_int("saved_life_p1", 0), -7);
        assert_eq!(loaded.get_int("life_save_valid", 0), 1);
        assert_eq!(loaded.get_string("preset_3_name", "").as_str(), "Yu-Gi-Oh!");
    }

    #[test]
    fn full_store_fits_max_record() {
        let mut store = MemoryStore::new();
        for i in 0..MAX_ENTRIES {
            let mut key: String<MAX_KEY_LEN> = String::new();
            core::fmt::Write::write_fmt(&mut key, format_args!("key_{:012}", i)).unwrap();
            store
                .put_string(&key, "01234567890123456789012345678901")
                .unwrap();
        }
        let mut buf = [0u8; MAX_RECORD_SIZE];
        assert_eq!(store.serialize(&mut buf), Ok(MAX_RECORD_SIZE));
    }

    #[test]
    fn small_buffer_overflows() {
        let mut store = MemoryStore::new();
        store.put_int("life", 40).unwrap();
        let mut buf = [0u8; 4];
        assert_eq!(store.serialize(&mut buf), Err(Error::BufferOverflow));
    }

    #[test]
    fn corrupt_records_are_rejected() {
        assert_eq!(MemoryStore::deserialize(&[]).unwrap_err(), Error::Corrupt);
        // One entry announced, nothing follows.
        assert_eq!(MemoryStore::deserialize(&[1]).unwrap_err(), Error::Corrupt);
        // Unknown tag.
        assert_eq!(
            MemoryStore::deserialize(&[1, 1, b'a', 9, 0, 0, 0, 0]).unwrap_err(),
            Error::Corrupt
        );
        // Truncated int.
        assert_eq!(
            MemoryStore::deserialize(&[1, 1, b'a', TAG_INT, 1, 2]).unwrap_err(),
            Error::Corrupt
        );
        // Invalid UTF-8 key.
        assert_eq!(
            MemoryStore::deserialize(&[1, 1, 0xff, TAG_INT, 0, 0, 0, 0]).unwrap_err(),
            Error::Corrupt
        );
        // Too many entries.
        assert_eq!(MemoryStore::deserialize(&[255]).unwrap_err(), Error::Corrupt);
    }

    #[test]
    fn empty_record_is_valid() {
        let store = MemoryStore::deserialize(&[0]).unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn shared_store_through_refcell() {
        let cell = RefCell::new(MemoryStore::new());
        let mut handle = &cell;
        handle.put_int("life", 33).unwrap();
        assert_eq!(handle.get_int("life", 0), 33);

        let _guard = cell.borrow_mut();
        let mut handle = &cell;
        assert_eq!(handle.get_int("life", 7), 7);
        assert_eq!(handle.put_int("life", 1), Err(Error::Busy));
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        let long = "ääääääääääääääääää"; // 18 × 2 bytes
        let t = truncate(long);
        assert_eq!(t.len(), 32);
        assert!(t.chars().all(|c| c == 'ä'));
    }

    #[test]
    fn remove_marks_dirty() {
        let mut store = MemoryStore::new();
        store.put_int("a", 1).unwrap();
        store.mark_clean();
        assert_eq!(store.remove("a"), Some(StoredValue::Int(1)));
        assert!(store.is_dirty());
        assert_eq!(store.remove("a"), None);
    }
}
