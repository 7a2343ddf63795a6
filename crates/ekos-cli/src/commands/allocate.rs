//! Stand-alone number allocation.

use std::path::Path;

use anyhow::Result;
use ekos::NumberAllocator;

use crate::commands::open_registry;
use crate::style::SemanticStyle;

pub fn run(project: &Path, city: &str, strict: bool) -> Result<()> {
    let registry = open_registry(project)?;
    let allocator = registry.allocator();

    let number = if strict {
        allocator.allocate_strict(city)?
    } else {
        allocator.allocate(city)?
    };

    if number.partition().city.is_fallback() {
        eprintln!(
            "{}",
            format!("'{city}' is not a known city; numbered under XXX").warning()
        );
    }
    println!("{}", number.to_string().code());
    Ok(())
}
