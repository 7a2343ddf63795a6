//! Prefix scan over existing records.

use ekos_store::RecordStore;
use ekos_types::{Partition, ReportNumber, Sequence};

use crate::AllocationError;

/// Returns the sequence of the newest record in `partition`, or `None`
/// if the partition has no records.
///
/// "Newest" is by creation time, as defined by
/// [`RecordStore::find_latest_by_prefix`]. This is what a counter is
/// seeded from the first time a partition is allocated in.
///
/// # Errors
///
/// - [`AllocationError::StoreUnavailable`] if the lookup fails
/// - [`AllocationError::MalformedExistingNumber`] if the newest record's
///   number is not `prefix` followed by a three-digit sequence
pub fn latest_sequence<S>(
    store: &S,
    partition: Partition,
) -> Result<Option<Sequence>, AllocationError>
where
    S: RecordStore + ?Sized,
{
    let prefix = partition.prefix();
    let Some(latest) = store.find_latest_by_prefix(&prefix)? else {
        return Ok(None);
    };

    match ReportNumber::parse(&latest.report_number) {
        Ok(number) if number.partition() == partition => Ok(Some(number.sequence())),
        _ => Err(AllocationError::MalformedExistingNumber {
            number: latest.report_number,
        }),
    }
}
