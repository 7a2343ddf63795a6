//! Atomic-counter allocation.

use std::sync::Arc;

use chrono::Datelike;
use ekos_directory::CityDirectory;
use ekos_store::{CounterStore, RecordStore};
use ekos_types::{CityCode, Partition, ReportNumber, Sequence, Year};
use tracing::{debug, warn};

use crate::{AllocationError, Clock, NumberAllocator, latest_sequence};

/// Allocates numbers from one store-held counter per partition.
///
/// The store's increment-and-fetch is the only point of coordination, so
/// any number of allocators (in this process or others) may share a store.
/// A partition's counter is created on first use, seeded from the newest
/// existing record so that data written before counters existed is
/// continued rather than collided with.
#[derive(Debug)]
pub struct CounterAllocator<S, C> {
    store: Arc<S>,
    directory: Arc<CityDirectory>,
    clock: C,
}

impl<S, C> CounterAllocator<S, C>
where
    S: RecordStore + CounterStore,
    C: Clock,
{
    pub fn new(store: Arc<S>, directory: Arc<CityDirectory>, clock: C) -> Self {
        Self {
            store,
            directory,
            clock,
        }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub fn directory(&self) -> &CityDirectory {
        &self.directory
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Returns the partition `city` allocates into right now.
    pub fn partition_for(&self, city: CityCode) -> Result<Partition, AllocationError> {
        let now = self.clock.now_utc();
        let year =
            Year::from_datetime(now).map_err(|_| AllocationError::YearOutOfRange(now.year()))?;
        Ok(Partition::new(year, city))
    }

    /// Issues the next number in `partition`.
    ///
    /// # Errors
    ///
    /// - [`AllocationError::StoreUnavailable`] if the store fails
    /// - [`AllocationError::MalformedExistingNumber`] if seeding finds a
    ///   record it cannot parse
    /// - [`AllocationError::SequenceExhausted`] once 999 numbers have been
    ///   issued in the partition
    pub fn allocate_in(&self, partition: Partition) -> Result<ReportNumber, AllocationError> {
        if self.store.current(partition)?.is_none() {
            self.seed(partition)?;
        }

        let value = self.store.increment(partition)?;
        let sequence =
            Sequence::new(value).map_err(|_| AllocationError::SequenceExhausted { partition })?;

        let number = ReportNumber::new(partition, sequence);
        debug!(%partition, %number, "allocated report number");
        Ok(number)
    }

    fn seed(&self, partition: Partition) -> Result<(), AllocationError> {
        let last = latest_sequence(self.store.as_ref(), partition)?.map_or(0, Sequence::as_u32);
        if self.store.init_if_absent(partition, last)? {
            debug!(%partition, last, "seeded partition counter");
        }
        Ok(())
    }
}

impl<S, C> NumberAllocator for CounterAllocator<S, C>
where
    S: RecordStore + CounterStore,
    C: Clock,
{
    fn city_code(&self, city_name: &str) -> Option<CityCode> {
        self.directory.code_for(city_name)
    }

    fn allocate(&self, city_name: &str) -> Result<ReportNumber, AllocationError> {
        let city = self.city_code(city_name).unwrap_or_else(|| {
            warn!(city = city_name, "unknown city, using fallback code");
            CityCode::FALLBACK
        });
        self.allocate_in(self.partition_for(city)?)
    }

    fn allocate_strict(&self, city_name: &str) -> Result<ReportNumber, AllocationError> {
        let city = self
            .city_code(city_name)
            .ok_or_else(|| AllocationError::UnknownCity(city_name.to_string()))?;
        self.allocate_in(self.partition_for(city)?)
    }
}
