//! # ekos-allocator: Report number allocation for `EKOS`
//!
//! Issues `PK<YYYY><CCC><NNN>` numbers that are unique within their
//! `(year, city)` partition even when many callers allocate at once.
//!
//! # How numbers are issued
//!
//! ```text
//! allocate("Ankara")
//!   │
//!   ├── CityDirectory::code_for ──► ANK   (unknown city: XXX + warning)
//!   ├── Clock::now_utc ───────────► 2025
//!   │
//!   ├── counter for PK2025ANK absent?
//!   │     └── latest_sequence (prefix scan) ──► init_if_absent(last)
//!   │
//!   └── CounterStore::increment ──► 7 ──► PK2025ANK007
//! ```
//!
//! The increment happens inside the store, so there is no read-then-write
//! window between two allocators. Numbers are never handed back: a
//! deleted report, or a caller that allocates and then gives up, leaves
//! a gap.
//!
//! ```
//! use std::sync::Arc;
//!
//! use chrono::{TimeZone, Utc};
//! use ekos_allocator::{CounterAllocator, FixedClock, NumberAllocator};
//! use ekos_directory::CityDirectory;
//! use ekos_store::MemoryStore;
//!
//! let clock = FixedClock::new(Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap());
//! let allocator = CounterAllocator::new(
//!     Arc::new(MemoryStore::new()),
//!     Arc::new(CityDirectory::turkey()),
//!     clock,
//! );
//!
//! assert_eq!(allocator.allocate("Ankara")?.to_string(), "PK2025ANK001");
//! assert_eq!(allocator.allocate("Ankara")?.to_string(), "PK2025ANK002");
//! assert_eq!(allocator.allocate("Atlantis")?.to_string(), "PK2025XXX001");
//! # Ok::<(), ekos_allocator::AllocationError>(())
//! ```

use ekos_store::StoreError;
use ekos_types::{CityCode, Partition, ReportNumber};

mod clock;
mod counter;
mod retry;
mod scan;

pub use clock::{Clock, FixedClock, SystemClock};
pub use counter::CounterAllocator;
pub use retry::{DEFAULT_MAX_ATTEMPTS, insert_with_retry};
pub use scan::latest_sequence;

/// Produces report numbers.
pub trait NumberAllocator: Send + Sync {
    /// Looks up the city code `city_name` allocates under, if known.
    fn city_code(&self, city_name: &str) -> Option<CityCode>;

    /// Allocates the next number for `city_name`.
    ///
    /// Unknown cities are numbered under [`CityCode::FALLBACK`]. Callers
    /// that must reject them should check [`Self::city_code`] first or
    /// use [`Self::allocate_strict`].
    fn allocate(&self, city_name: &str) -> Result<ReportNumber, AllocationError>;

    /// Like [`Self::allocate`], but fails with
    /// [`AllocationError::UnknownCity`] instead of falling back.
    fn allocate_strict(&self, city_name: &str) -> Result<ReportNumber, AllocationError>;
}

/// Errors that can occur while allocating a report number.
#[derive(thiserror::Error, Debug)]
pub enum AllocationError {
    /// The store could not be read or written.
    #[error("report store unavailable: {0}")]
    StoreUnavailable(#[source] StoreError),

    /// The store's unique index rejected the number on insert.
    #[error("report number already exists: {0}")]
    DuplicateNumber(ReportNumber),

    /// The newest record in the partition has a number that does not parse.
    #[error("existing report number '{number}' is malformed")]
    MalformedExistingNumber { number: String },

    /// The partition has issued all 999 sequence numbers.
    #[error("partition {partition} has no sequence numbers left")]
    SequenceExhausted { partition: Partition },

    /// The clock reports a year that does not fit four digits.
    #[error("year {0} cannot be encoded in a report number")]
    YearOutOfRange(i32),

    /// Strict allocation for a city the directory does not know.
    #[error("unknown city: {0}")]
    UnknownCity(String),

    /// Every attempt collided with an existing number.
    #[error("report number still taken after {attempts} attempts")]
    RetriesExhausted { attempts: u32 },
}

impl From<StoreError> for AllocationError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateNumber(number) => AllocationError::DuplicateNumber(number),
            other => AllocationError::StoreUnavailable(other),
        }
    }
}

#[cfg(test)]
mod tests;
