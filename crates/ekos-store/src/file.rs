//! JSON-snapshot store.
//!
//! # File Layout
//!
//! ```text
//! {data_dir}/
//! ├── store.json       <- current snapshot (reports, counters, catalog)
//! ├── store.json.tmp   <- transient, renamed over store.json
//! └── store.lock       <- advisory lock, never holds data
//! ```
//!
//! The snapshot on disk is the only copy of the state. Every operation
//! locks `store.lock` (shared for reads, exclusive for mutations) and
//! re-reads `store.json` under that lock, so processes sharing a data
//! directory see each other's writes and the counters and unique indexes
//! hold across all of them.
//!
//! A mutation is applied to the freshly read state, written to
//! `store.json.tmp` and renamed into place before the lock is released.
//! Mutations that fail or change nothing leave the file untouched.

use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use ekos_types::{Category, Partition, Project, Report, ReportId};
use fd_lock::RwLock;
use tracing::{debug, info};

use crate::state::{Snapshot, StoreState};
use crate::{CatalogStore, CounterStore, LatestRecord, RecordStore, ReportQuery, StoreError};

/// Snapshot filename inside the data directory.
const SNAPSHOT_FILENAME: &str = "store.json";

/// Temporary filename used for atomic replacement.
const SNAPSHOT_TMP_FILENAME: &str = "store.json.tmp";

/// Lock filename inside the data directory.
const LOCK_FILENAME: &str = "store.lock";

/// File-backed store with the same semantics as [`MemoryStore`](crate::MemoryStore).
///
/// Several `FileStore`s, in one process or many, may open the same
/// directory.
#[derive(Debug)]
pub struct FileStore {
    data_dir: PathBuf,
}

impl FileStore {
    /// Opens the store in `data_dir`, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// - [`StoreError::Io`] if the directory or snapshot cannot be read
    /// - [`StoreError::Corrupt`] if the snapshot does not decode or holds
    ///   duplicate numbers, ids, counters or catalog names
    pub fn open(data_dir: impl AsRef<Path>) -> Result<Self, StoreError> {
        let data_dir = data_dir.as_ref().to_path_buf();
        fs::create_dir_all(&data_dir)?;

        let store = Self { data_dir };
        let reports = store.read(|state| state.all().len())?;

        info!(path = %store.snapshot_path().display(), reports, "opened report store");
        Ok(store)
    }

    /// Returns the directory holding the snapshot.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    fn snapshot_path(&self) -> PathBuf {
        self.data_dir.join(SNAPSHOT_FILENAME)
    }

    fn lock_file(&self) -> Result<RwLock<File>, StoreError> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(self.data_dir.join(LOCK_FILENAME))?;
        Ok(RwLock::new(file))
    }

    /// Reads the snapshot; a missing file is an empty store.
    fn load(&self) -> Result<StoreState, StoreError> {
        let path = self.snapshot_path();
        let json = match fs::read(&path) {
            Ok(json) => json,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(StoreState::default()),
            Err(e) => return Err(e.into()),
        };

        let snapshot: Snapshot = serde_json::from_slice(&json)
            .map_err(|e| StoreError::Corrupt(format!("{}: {e}", path.display())))?;
        StoreState::from_snapshot(snapshot)
    }

    /// Runs `f` over the current snapshot under a shared lock.
    fn read<T>(&self, f: impl FnOnce(&StoreState) -> T) -> Result<T, StoreError> {
        let lock = self.lock_file()?;
        let _guard = lock.read()?;
        let state = self.load()?;
        Ok(f(&state))
    }

    /// Applies `f` to the current snapshot under an exclusive lock and
    /// persists the result if `f` changed anything.
    fn mutate<T>(
        &self,
        f: impl FnOnce(&mut StoreState) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let mut lock = self.lock_file()?;
        let _guard = lock.write()?;

        let mut state = self.load()?;
        let out = f(&mut state)?;
        if state.is_dirty() {
            self.persist(&state)?;
        }
        Ok(out)
    }

    fn persist(&self, state: &StoreState) -> Result<(), StoreError> {
        let tmp_path = self.data_dir.join(SNAPSHOT_TMP_FILENAME);
        let path = self.snapshot_path();

        let json = serde_json::to_vec_pretty(&state.to_snapshot())
            .map_err(|e| StoreError::Corrupt(format!("failed to encode snapshot: {e}")))?;

        let file = File::create(&tmp_path)?;
        let mut writer = BufWriter::new(file);
        writer.write_all(&json)?;
        writer.flush()?;
        writer.get_ref().sync_all()?;
        fs::rename(&tmp_path, &path)?;

        debug!(path = %path.display(), bytes = json.len(), "persisted store snapshot");
        Ok(())
    }
}

impl RecordStore for FileStore {
    fn find_latest_by_prefix(&self, prefix: &str) -> Result<Option<LatestRecord>, StoreError> {
        self.read(|state| state.latest_by_prefix(prefix))
    }

    fn insert_with_unique_number(&self, report: Report) -> Result<(), StoreError> {
        self.mutate(|state| state.insert(report))
    }

    fn get(&self, id: ReportId) -> Result<Option<Report>, StoreError> {
        self.read(|state| state.get(id))
    }

    fn replace(&self, report: Report) -> Result<(), StoreError> {
        self.mutate(|state| state.replace(report))
    }

    fn remove(&self, id: ReportId) -> Result<Option<Report>, StoreError> {
        self.mutate(|state| Ok(state.remove(id)))
    }

    fn list(&self, query: &ReportQuery) -> Result<Vec<Report>, StoreError> {
        self.read(|state| state.list(query))
    }

    fn all(&self) -> Result<Vec<Report>, StoreError> {
        self.read(StoreState::all)
    }
}

impl CounterStore for FileStore {
    fn current(&self, partition: Partition) -> Result<Option<u32>, StoreError> {
        self.read(|state| state.counter(partition))
    }

    fn init_if_absent(&self, partition: Partition, value: u32) -> Result<bool, StoreError> {
        self.mutate(|state| Ok(state.init_counter(partition, value)))
    }

    fn increment(&self, partition: Partition) -> Result<u32, StoreError> {
        self.mutate(|state| Ok(state.increment_counter(partition)))
    }
}

impl CatalogStore for FileStore {
    fn insert_project(&self, project: Project) -> Result<(), StoreError> {
        self.mutate(|state| state.insert_project(project))
    }

    fn project(&self, id: &str) -> Result<Option<Project>, StoreError> {
        self.read(|state| state.project(id))
    }

    fn projects(&self) -> Result<Vec<Project>, StoreError> {
        self.read(StoreState::projects)
    }

    fn remove_project(&self, id: &str) -> Result<Option<Project>, StoreError> {
        self.mutate(|state| Ok(state.remove_project(id)))
    }

    fn insert_category(&self, category: Category) -> Result<(), StoreError> {
        self.mutate(|state| state.insert_category(category))
    }

    fn categories(&self) -> Result<Vec<Category>, StoreError> {
        self.read(StoreState::categories)
    }

    fn remove_category(&self, id: &str) -> Result<Option<Category>, StoreError> {
        self.mutate(|state| Ok(state.remove_category(id)))
    }
}
