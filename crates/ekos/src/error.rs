//! Error types for registry operations.

use ekos_allocator::AllocationError;
use ekos_rbac::AccessError;
use ekos_store::StoreError;
use ekos_types::ReportId;

/// Result type for registry operations.
pub type Result<T, E = RegistryError> = std::result::Result<T, E>;

/// Errors that can occur during registry operations.
#[derive(thiserror::Error, Debug)]
pub enum RegistryError {
    /// The caller's role does not allow the operation.
    #[error("forbidden: {0}")]
    Forbidden(#[from] AccessError),

    /// No report with this id is visible to the caller.
    #[error("report not found: {0}")]
    NotFound(ReportId),

    /// No project with this id is in the catalog.
    #[error("project not found: {0}")]
    ProjectNotFound(String),

    /// No category with this id is in the catalog.
    #[error("category not found: {0}")]
    CategoryNotFound(String),

    /// A catalog entry was given a blank name.
    #[error("{0} name must not be empty")]
    EmptyName(&'static str),

    /// The city is not in the directory.
    #[error("invalid city: {0}")]
    InvalidCity(String),

    /// A report number could not be allocated.
    #[error(transparent)]
    Allocation(#[from] AllocationError),

    /// Storage layer error.
    #[error(transparent)]
    Store(#[from] StoreError),
}
