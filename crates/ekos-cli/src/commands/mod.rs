//! CLI command implementations.

pub mod allocate;
pub mod catalog;
pub mod cities;
pub mod config;
pub mod report;
pub mod stats;
pub mod version;

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use ekos::{CounterAllocator, FileStore, Principal, ReportRegistry, Role, SystemClock};
use ekos_config::EkosConfig;

/// Registry over the project's on-disk store.
pub type FileRegistry =
    ReportRegistry<FileStore, CounterAllocator<FileStore, SystemClock>, SystemClock>;

/// Loads the project configuration and opens its store.
pub fn open_registry(project: &Path) -> Result<FileRegistry> {
    let config =
        EkosConfig::load_from_dir(project).context("Failed to load configuration")?;
    let directory = config.directory().context("Invalid city configuration")?;

    let store = Arc::new(FileStore::open(&config.store.data_dir).with_context(|| {
        format!(
            "Failed to open report store at {}",
            config.store.data_dir.display()
        )
    })?);
    let allocator = CounterAllocator::new(Arc::clone(&store), Arc::new(directory), SystemClock);

    Ok(ReportRegistry::new(store, allocator, SystemClock)
        .with_max_attempts(config.allocator.max_attempts))
}

/// The identity CLI commands run as.
pub fn operator() -> Principal {
    Principal::new("cli", "cli", Role::Admin)
}
