//! City directory listing.

use std::path::Path;

use anyhow::{Context, Result};
use ekos_config::EkosConfig;

use crate::style::print_table;

pub fn run(project: &Path) -> Result<()> {
    let config = EkosConfig::load_from_dir(project).context("Failed to load configuration")?;
    let directory = config.directory().context("Invalid city configuration")?;

    let rows: Vec<Vec<String>> = directory
        .cities()
        .into_iter()
        .map(|city| vec![city.name, city.code.to_string()])
        .collect();
    print_table(&["City", "Code"], &rows);
    Ok(())
}
