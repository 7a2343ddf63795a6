//! In-memory store for testing and development.

use std::sync::{Mutex, MutexGuard};

use ekos_types::{Category, Partition, Project, Report, ReportId};

use crate::state::StoreState;
use crate::{CatalogStore, CounterStore, LatestRecord, RecordStore, ReportQuery, StoreError};

/// Records and counters behind a single mutex.
///
/// Not suitable for production - data is lost on restart.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<StoreState>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, StoreState>, StoreError> {
        self.state.lock().map_err(|_| StoreError::Poisoned)
    }
}

impl RecordStore for MemoryStore {
    fn find_latest_by_prefix(&self, prefix: &str) -> Result<Option<LatestRecord>, StoreError> {
        Ok(self.lock()?.latest_by_prefix(prefix))
    }

    fn insert_with_unique_number(&self, report: Report) -> Result<(), StoreError> {
        self.lock()?.insert(report)
    }

    fn get(&self, id: ReportId) -> Result<Option<Report>, StoreError> {
        Ok(self.lock()?.get(id))
    }

    fn replace(&self, report: Report) -> Result<(), StoreError> {
        self.lock()?.replace(report)
    }

    fn remove(&self, id: ReportId) -> Result<Option<Report>, StoreError> {
        Ok(self.lock()?.remove(id))
    }

    fn list(&self, query: &ReportQuery) -> Result<Vec<Report>, StoreError> {
        Ok(self.lock()?.list(query))
    }

    fn all(&self) -> Result<Vec<Report>, StoreError> {
        Ok(self.lock()?.all())
    }
}

impl CounterStore for MemoryStore {
    fn current(&self, partition: Partition) -> Result<Option<u32>, StoreError> {
        Ok(self.lock()?.counter(partition))
    }

    fn init_if_absent(&self, partition: Partition, value: u32) -> Result<bool, StoreError> {
        Ok(self.lock()?.init_counter(partition, value))
    }

    fn increment(&self, partition: Partition) -> Result<u32, StoreError> {
        Ok(self.lock()?.increment_counter(partition))
    }
}

impl CatalogStore for MemoryStore {
    fn insert_project(&self, project: Project) -> Result<(), StoreError> {
        self.lock()?.insert_project(project)
    }

    fn project(&self, id: &str) -> Result<Option<Project>, StoreError> {
        Ok(self.lock()?.project(id))
    }

    fn projects(&self) -> Result<Vec<Project>, StoreError> {
        Ok(self.lock()?.projects())
    }

    fn remove_project(&self, id: &str) -> Result<Option<Project>, StoreError> {
        Ok(self.lock()?.remove_project(id))
    }

    fn insert_category(&self, category: Category) -> Result<(), StoreError> {
        self.lock()?.insert_category(category)
    }

    fn categories(&self) -> Result<Vec<Category>, StoreError> {
        Ok(self.lock()?.categories())
    }

    fn remove_category(&self, id: &str) -> Result<Option<Category>, StoreError> {
        Ok(self.lock()?.remove_category(id))
    }
}
