//! Allocate-and-insert with a bounded retry on number collisions.

use ekos_store::RecordStore;
use ekos_types::{Report, ReportNumber};
use tracing::warn;

use crate::{AllocationError, NumberAllocator};

/// Default number of attempts for [`insert_with_retry`].
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

/// Allocates a number for `city_name`, builds the record with it and
/// inserts it, retrying with a fresh number if the store reports the
/// number as taken.
///
/// A collision means a record was written without going through the
/// counter (an import, a restored backup). The colliding number is
/// consumed and never retried.
///
/// Returns the stored record.
///
/// # Errors
///
/// - [`AllocationError::RetriesExhausted`] after `max_attempts` collisions
/// - any allocation error, or [`AllocationError::StoreUnavailable`] if
///   the insert fails for a reason other than a collision
pub fn insert_with_retry<A, S, F>(
    allocator: &A,
    store: &S,
    city_name: &str,
    max_attempts: u32,
    mut build: F,
) -> Result<Report, AllocationError>
where
    A: NumberAllocator + ?Sized,
    S: RecordStore + ?Sized,
    F: FnMut(ReportNumber) -> Report,
{
    for attempt in 1..=max_attempts {
        let number = allocator.allocate(city_name)?;
        let report = build(number);

        match store.insert_with_unique_number(report.clone()) {
            Ok(()) => return Ok(report),
            Err(e) if e.is_duplicate_number() => {
                warn!(%number, attempt, max_attempts, "report number already taken, retrying");
            }
            Err(e) => return Err(e.into()),
        }
    }

    Err(AllocationError::RetriesExhausted {
        attempts: max_attempts,
    })
}
