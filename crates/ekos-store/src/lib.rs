//! # ekos-store: Report storage for `EKOS`
//!
//! Two storage contracts back report numbering:
//!
//! - [`RecordStore`] holds report records under a unique index on the
//!   report number. Inserting a number that already exists fails with
//!   [`StoreError::DuplicateNumber`] instead of overwriting.
//! - [`CounterStore`] holds one counter per [`Partition`] with a single
//!   atomic increment-and-fetch.
//!
//! Both guarantees must be enforced by the store itself, not by callers:
//! several service instances may allocate against the same store.
//!
//! A third contract, [`CatalogStore`], holds the admin-managed projects
//! and equipment categories.
//!
//! # Implementations
//!
//! - [`MemoryStore`]: everything behind one mutex. For tests and
//!   single-process development.
//! - [`FileStore`]: the same state as a JSON snapshot. Every operation
//!   runs under an advisory lock on the data directory and re-reads the
//!   snapshot, so any number of processes can share one directory.
//!
//! ```
//! use ekos_store::{CounterStore, MemoryStore};
//! use ekos_types::{CityCode, Partition, Year};
//!
//! let store = MemoryStore::new();
//! let partition = Partition::new(Year::new(2025)?, CityCode::new("ANK")?);
//!
//! assert_eq!(store.increment(partition)?, 1);
//! assert_eq!(store.increment(partition)?, 2);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use chrono::{DateTime, Utc};
use ekos_types::{Category, Partition, Project, Report, ReportId, ReportNumber};

mod file;
mod memory;
mod query;
mod state;

pub use file::FileStore;
pub use memory::MemoryStore;
pub use query::ReportQuery;

/// The newest record in a partition, as seen by a prefix scan.
///
/// The number is kept as raw text: the scan must be able to report
/// records whose number no longer parses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LatestRecord {
    pub report_number: String,
    pub created_at: DateTime<Utc>,
}

/// Persistent collection of report records.
///
/// Methods take `&self`; implementations synchronize internally so one
/// store can be shared across threads.
pub trait RecordStore: Send + Sync {
    /// Returns the most recently created record whose number starts with
    /// `prefix`, or `None`.
    ///
    /// Ordering is by `created_at` descending; records created at the same
    /// instant are ordered by number text descending.
    fn find_latest_by_prefix(&self, prefix: &str) -> Result<Option<LatestRecord>, StoreError>;

    /// Inserts a new record.
    ///
    /// # Errors
    ///
    /// - [`StoreError::DuplicateNumber`] if the report number is taken
    /// - [`StoreError::DuplicateId`] if the id is taken
    fn insert_with_unique_number(&self, report: Report) -> Result<(), StoreError>;

    /// Looks a record up by id.
    fn get(&self, id: ReportId) -> Result<Option<Report>, StoreError>;

    /// Overwrites an existing record.
    ///
    /// # Errors
    ///
    /// - [`StoreError::NotFound`] if no record has this id
    /// - [`StoreError::ImmutableNumber`] if the report number differs from
    ///   the stored one
    fn replace(&self, report: Report) -> Result<(), StoreError>;

    /// Deletes a record, returning it if it existed.
    ///
    /// Deleting never frees the report number for reuse.
    fn remove(&self, id: ReportId) -> Result<Option<Report>, StoreError>;

    /// Returns records matching `query`, newest first.
    fn list(&self, query: &ReportQuery) -> Result<Vec<Report>, StoreError>;

    /// Returns every record, newest first.
    fn all(&self) -> Result<Vec<Report>, StoreError>;
}

/// Per-partition counters holding the last issued sequence value.
pub trait CounterStore: Send + Sync {
    /// Returns the last issued value, or `None` if the partition has no counter.
    fn current(&self, partition: Partition) -> Result<Option<u32>, StoreError>;

    /// Creates the counter with `value` unless it already exists.
    ///
    /// Returns `true` if this call created it. Concurrent seeders race
    /// safely: exactly one wins and the rest observe `false`.
    fn init_if_absent(&self, partition: Partition, value: u32) -> Result<bool, StoreError>;

    /// Atomically increments the counter and returns the new value.
    ///
    /// An absent counter counts from 0, so the first call returns 1.
    /// Counters stop one past [`Sequence::MAX`](ekos_types::Sequence::MAX):
    /// once there, further calls return that value and change nothing.
    fn increment(&self, partition: Partition) -> Result<u32, StoreError>;
}

/// Projects and equipment categories.
///
/// Names are unique within each collection. Listings are sorted by name.
pub trait CatalogStore: Send + Sync {
    /// Adds a project.
    ///
    /// # Errors
    ///
    /// - [`StoreError::DuplicateEntry`] if the id or name is taken
    fn insert_project(&self, project: Project) -> Result<(), StoreError>;

    fn project(&self, id: &str) -> Result<Option<Project>, StoreError>;

    fn projects(&self) -> Result<Vec<Project>, StoreError>;

    /// Deletes a project, returning it if it existed. Reports filed under
    /// it keep their denormalized reference.
    fn remove_project(&self, id: &str) -> Result<Option<Project>, StoreError>;

    /// Adds a category.
    ///
    /// # Errors
    ///
    /// - [`StoreError::DuplicateEntry`] if the id or name is taken
    fn insert_category(&self, category: Category) -> Result<(), StoreError>;

    fn categories(&self) -> Result<Vec<Category>, StoreError>;

    fn remove_category(&self, id: &str) -> Result<Option<Category>, StoreError>;
}

/// Errors returned by store implementations.
#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    /// The unique index on report numbers rejected an insert.
    #[error("report number already exists: {0}")]
    DuplicateNumber(ReportNumber),

    /// A record with this id already exists.
    #[error("report id already exists: {0}")]
    DuplicateId(ReportId),

    /// No record with this id exists.
    #[error("report not found: {0}")]
    NotFound(ReportId),

    /// An update tried to change a report number.
    #[error("report number of {0} cannot be changed")]
    ImmutableNumber(ReportId),

    /// A catalog entry with this id or name already exists.
    #[error("catalog entry already exists: {0}")]
    DuplicateEntry(String),

    /// A thread panicked while holding the store lock.
    #[error("store lock poisoned")]
    Poisoned,

    /// Reading or writing the backing file failed.
    #[error("store I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Persisted data could not be decoded or violates an invariant.
    #[error("store data is corrupt: {0}")]
    Corrupt(String),
}

impl StoreError {
    /// Returns whether this is a unique-index violation on the report number.
    pub fn is_duplicate_number(&self) -> bool {
        matches!(self, StoreError::DuplicateNumber(_))
    }
}
