//! Configuration management for EKOS
//!
//! Provides hierarchical configuration loading from multiple sources:
//! 1. Environment variables (`EKOS_*` prefix, highest precedence)
//! 2. ekos.local.toml (gitignored, local overrides)
//! 3. ekos.toml (git-tracked, project config)
//! 4. ~/.config/ekos/config.toml (user defaults)
//! 5. Built-in defaults (lowest precedence)
//!
//! ```toml
//! [store]
//! data_dir = ".ekos/data"
//!
//! [allocator]
//! max_attempts = 5
//!
//! [[cities.extra]]
//! name = "Kuzey Kıbrıs"
//! code = "KKT"
//! ```

use anyhow::Result;
use ekos_directory::CityDirectory;
use ekos_types::CityCode;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

mod error;
mod loader;
mod paths;

pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use paths::Paths;

/// Main EKOS configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EkosConfig {
    pub store: StoreConfig,
    pub allocator: AllocatorConfig,
    pub cities: CitiesConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub data_dir: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(".ekos/data"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AllocatorConfig {
    /// Insert attempts before a number collision is reported as fatal.
    pub max_attempts: u32,
}

impl Default for AllocatorConfig {
    fn default() -> Self {
        Self { max_attempts: 5 }
    }
}

/// Cities added on top of the built-in province table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CitiesConfig {
    pub extra: Vec<CityEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CityEntry {
    pub name: String,
    pub code: String,
}

impl EkosConfig {
    /// Load configuration from default locations
    pub fn load() -> Result<Self> {
        ConfigLoader::new().load()
    }

    /// Load configuration from specific project directory
    pub fn load_from_dir(project_dir: impl AsRef<Path>) -> Result<Self> {
        ConfigLoader::new().with_project_dir(project_dir).load()
    }

    /// Read a single TOML file, without merging any other source
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::ReadError {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::ParseError {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Render as TOML
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Resolve relative paths to absolute
    pub fn resolve_paths(&mut self, base_dir: impl AsRef<Path>) {
        let base = base_dir.as_ref();

        if self.store.data_dir.is_relative() {
            self.store.data_dir = base.join(&self.store.data_dir);
        }
    }

    /// Check values the type system cannot
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.allocator.max_attempts == 0 {
            return Err(ConfigError::ValidationError(
                "allocator.max_attempts must be at least 1".to_string(),
            ));
        }

        for entry in &self.cities.extra {
            if entry.name.trim().is_empty() {
                return Err(ConfigError::ValidationError(
                    "cities.extra entries need a name".to_string(),
                ));
            }
            CityCode::new(&entry.code).map_err(|e| {
                ConfigError::ValidationError(format!("cities.extra '{}': {e}", entry.name))
            })?;
        }

        Ok(())
    }

    /// Build the city directory: the built-in table plus `cities.extra`
    ///
    /// Extra entries replace built-in ones with the same name.
    pub fn directory(&self) -> Result<CityDirectory, ConfigError> {
        self.cities
            .extra
            .iter()
            .try_fold(CityDirectory::turkey(), |directory, entry| {
                let code = CityCode::new(&entry.code).map_err(|e| {
                    ConfigError::ValidationError(format!("cities.extra '{}': {e}", entry.name))
                })?;
                Ok(directory.with_city(entry.name.clone(), code))
            })
    }
}
