//! Configuration management commands.

use std::path::Path;

use anyhow::{Context, Result};
use ekos_config::EkosConfig;

use crate::Format;
use crate::style::SemanticStyle;

/// Show current configuration.
pub fn show(project: &Path, format: Format) -> Result<()> {
    let config = EkosConfig::load_from_dir(project).context("Failed to load configuration")?;

    match format {
        Format::Json => {
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
        Format::Toml => {
            println!("{}", config.to_toml()?);
        }
        Format::Text => {
            println!("{}", "EKOS Configuration".header());
            println!("==================\n");

            println!("Store:");
            println!("  Data directory: {}", config.store.data_dir.display());
            println!();

            println!("Allocator:");
            println!("  Max attempts: {}", config.allocator.max_attempts);
            println!();

            println!("Cities:");
            if config.cities.extra.is_empty() {
                println!("  Extra: none");
            }
            for city in &config.cities.extra {
                println!("  {} = {}", city.name, city.code);
            }
        }
    }

    Ok(())
}

/// Validate configuration files.
pub fn validate(project: &Path) -> Result<()> {
    println!("Validating configuration in {}...", project.display());

    match EkosConfig::load_from_dir(project) {
        Ok(_) => {
            println!("{}", "✓ Configuration is valid".success());
            Ok(())
        }
        Err(e) => {
            println!("✗ Configuration validation failed:");
            println!("  {e:#}");
            Err(e)
        }
    }
}
