//! # EKOS
//!
//! Equipment inspection report registry.
//!
//! Every report gets a human-readable number `PK<YYYY><CCC><NNN>` when it
//! is created: the UTC year, a three-letter city code and a sequence that
//! is unique within that `(year, city)` partition. Numbers are issued by
//! a store-held atomic counter, so concurrent creators (threads or whole
//! service instances) never receive the same number, and a number is
//! never handed out twice, even after its report is deleted.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                       ReportRegistry                         │
//! │  Principal ─► RBAC check ─► CounterAllocator ─► RecordStore  │
//! │                              │        │                      │
//! │                       CityDirectory  Clock                   │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Quick Start
//!
//! ```
//! use ekos::{MemoryRegistry, NewReport, Principal, Role};
//!
//! let registry = MemoryRegistry::in_memory();
//! let admin = Principal::new("u-1", "admin", Role::Admin);
//! let project = registry.create_project(&admin, "Bridge Works", None)?;
//!
//! let report = registry.create(
//!     &admin,
//!     NewReport::new(project.reference(), "Ankara", "Tower crane", "Lifting", "ACME"),
//! )?;
//! assert!(report.report_number.to_string().starts_with("PK"));
//! assert!(report.report_number.to_string().ends_with("ANK001"));
//! # Ok::<(), ekos::RegistryError>(())
//! ```
//!
//! # Modules
//!
//! - **Registry**: [`ReportRegistry`], [`ImportRow`], [`DashboardStats`]
//! - **Catalog**: [`Project`], [`Category`], managed through the registry
//! - **Numbering**: [`CounterAllocator`], [`NumberAllocator`], [`insert_with_retry`]
//! - **Storage**: [`RecordStore`], [`CounterStore`], [`CatalogStore`], [`MemoryStore`], [`FileStore`]

mod catalog;
mod error;
mod import;
mod registry;
mod stats;

// Registry
pub use error::{RegistryError, Result};
pub use import::{ImportRow, ImportSummary};
pub use registry::{MemoryRegistry, ReportRegistry};
pub use stats::{CategoryCount, DashboardStats, TOP_CATEGORIES, parse_validity_date};

// Re-export core types
pub use ekos_types::{
    Category, CityCode, Conformity, NewReport, Partition, Project, ProjectRef, Report, ReportId,
    ReportNumber, ReportNumberError, ReportStatus, ReportUpdate, Sequence, Year,
};

// Re-export numbering
pub use ekos_allocator::{
    AllocationError, Clock, CounterAllocator, DEFAULT_MAX_ATTEMPTS, FixedClock, NumberAllocator,
    SystemClock, insert_with_retry, latest_sequence,
};
pub use ekos_directory::{City, CityDirectory, DirectoryError};

// Re-export storage
pub use ekos_store::{
    CatalogStore, CounterStore, FileStore, LatestRecord, MemoryStore, RecordStore, ReportQuery,
    StoreError,
};

// Re-export access control
pub use ekos_rbac::{AccessError, Permission, Principal, Role};
