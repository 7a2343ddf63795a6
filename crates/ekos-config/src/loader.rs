//! Configuration loader with multi-source merging

use crate::{EkosConfig, Paths};
use anyhow::{Context, Result};
use std::env;
use std::path::{Path, PathBuf};

/// Configuration loader with builder pattern
pub struct ConfigLoader {
    project_dir: PathBuf,
    env_prefix: String,
}

impl ConfigLoader {
    /// Create a new config loader with default project directory (current dir)
    pub fn new() -> Self {
        Self {
            project_dir: env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            env_prefix: "EKOS".to_string(),
        }
    }

    /// Set the project directory
    pub fn with_project_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.project_dir = dir.as_ref().to_path_buf();
        self
    }

    /// Set the environment variable prefix (default: "EKOS")
    pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = prefix.into();
        self
    }

    /// Load configuration from all sources with proper precedence
    ///
    /// Environment keys use `__` between section and field, so
    /// `EKOS_ALLOCATOR__MAX_ATTEMPTS=8` sets `allocator.max_attempts`.
    pub fn load(self) -> Result<EkosConfig> {
        let mut builder = config::Config::builder();

        // 1. Start with built-in defaults
        let defaults = EkosConfig::default();
        builder = builder.add_source(config::Config::try_from(&defaults)?);

        // 2. User config (~/.config/ekos/config.toml)
        let paths = Paths::new();
        if let Ok(user_config_file) = paths.user_config_file()
            && user_config_file.exists()
        {
            builder = builder.add_source(toml_file(user_config_file));
        }

        // 3. Project config (ekos.toml)
        let project_config_file = Paths::project_config_file(&self.project_dir);
        if project_config_file.exists() {
            builder = builder.add_source(toml_file(project_config_file));
        }

        // 4. Local config (ekos.local.toml, gitignored)
        let local_config_file = Paths::local_config_file(&self.project_dir);
        if local_config_file.exists() {
            builder = builder.add_source(toml_file(local_config_file));
        }

        // 5. Environment variables (EKOS_*)
        builder = builder.add_source(
            config::Environment::with_prefix(&self.env_prefix)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build().context("Failed to build configuration")?;

        let mut ekos_config: EkosConfig = config
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        ekos_config.resolve_paths(&self.project_dir);
        ekos_config
            .validate()
            .context("Configuration failed validation")?;

        Ok(ekos_config)
    }

    /// Load configuration or return defaults if not found
    pub fn load_or_default(self) -> EkosConfig {
        self.load().unwrap_or_default()
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

fn toml_file(path: PathBuf) -> config::File<config::FileSourceFile, config::FileFormat> {
    config::File::from(path)
        .required(false)
        .format(config::FileFormat::Toml)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_load_defaults() {
        let temp_dir = tempdir().expect("Failed to create temp dir");
        let config = ConfigLoader::new()
            .with_project_dir(temp_dir.path())
            .with_env_prefix("EKOS_TEST_DEFAULTS")
            .load()
            .expect("Failed to load config");

        assert_eq!(config.allocator.max_attempts, 5);
        assert_eq!(config.store.data_dir, temp_dir.path().join(".ekos/data"));
    }

    #[test]
    fn test_load_project_config() {
        let temp_dir = tempdir().expect("Failed to create temp dir");
        let project_dir = temp_dir.path();

        let config_content = r#"
[store]
data_dir = "reports"

[allocator]
max_attempts = 8

[[cities.extra]]
name = "Lefkoşa"
code = "LFK"
"#;
        fs::write(project_dir.join("ekos.toml"), config_content)
            .expect("Failed to write config");

        let config = ConfigLoader::new()
            .with_project_dir(project_dir)
            .with_env_prefix("EKOS_TEST_PROJECT")
            .load()
            .expect("Failed to load config");

        assert_eq!(config.store.data_dir, project_dir.join("reports"));
        assert_eq!(config.allocator.max_attempts, 8);
        assert_eq!(config.cities.extra.len(), 1);
        assert_eq!(config.cities.extra[0].code, "LFK");
    }

    #[test]
    fn test_local_overrides() {
        let temp_dir = tempdir().expect("Failed to create temp dir");
        let project_dir = temp_dir.path();

        fs::write(
            project_dir.join("ekos.toml"),
            r"
[allocator]
max_attempts = 3
",
        )
        .expect("Failed to write project config");

        fs::write(
            project_dir.join("ekos.local.toml"),
            r"
[allocator]
max_attempts = 7
",
        )
        .expect("Failed to write local config");

        let config = ConfigLoader::new()
            .with_project_dir(project_dir)
            .with_env_prefix("EKOS_TEST_LOCAL")
            .load()
            .expect("Failed to load config");

        assert_eq!(config.allocator.max_attempts, 7);
    }

    #[test]
    fn test_invalid_values_fail_to_load() {
        let temp_dir = tempdir().expect("Failed to create temp dir");
        let project_dir = temp_dir.path();

        fs::write(
            project_dir.join("ekos.toml"),
            "[allocator]\nmax_attempts = 0\n",
        )
        .expect("Failed to write config");

        let result = ConfigLoader::new()
            .with_project_dir(project_dir)
            .with_env_prefix("EKOS_TEST_INVALID")
            .load();

        assert!(result.is_err());
    }

    #[test]
    fn test_load_or_default_falls_back() {
        let temp_dir = tempdir().expect("Failed to create temp dir");
        fs::write(temp_dir.path().join("ekos.toml"), "not = [valid")
            .expect("Failed to write config");

        let config = ConfigLoader::new()
            .with_project_dir(temp_dir.path())
            .with_env_prefix("EKOS_TEST_FALLBACK")
            .load_or_default();

        assert_eq!(config, EkosConfig::default());
    }
}
