//! Unified error type for lifering.
//!
//! We avoid `alloc` - all error variants carry only fixed-size data.
//! Implements `defmt::Format` for efficient on-target logging.

/// Top-level error type used across the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    // Storage
    /// Flash read/write/erase failed.
    Storage,

    /// The key-value store has no free entry for a new key.
    StoreFull,

    /// Key longer than the store supports.
    KeyTooLong,

    /// String value longer than the store supports.
    ValueTooLong,

    /// A serialized store record could not be decoded.
    Corrupt,

    /// The store is already borrowed by another caller on this thread.
    Busy,

    /// Preset or player index out of range.
    InvalidIndex,

    /// Setting value outside its accepted range.
    OutOfRange,

    // Generic
    /// Buffer too small for the requested operation.
    BufferOverflow,
}
