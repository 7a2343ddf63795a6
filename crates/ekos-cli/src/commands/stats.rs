//! Dashboard statistics.

use std::path::Path;

use anyhow::Result;

use crate::commands::{open_registry, operator};
use crate::style::{SemanticStyle, print_info_table, print_table};

pub fn run(project: &Path, json: bool) -> Result<()> {
    let registry = open_registry(project)?;
    let stats = registry.stats(&operator())?;

    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }

    print_info_table(&[
        ("Total reports", stats.total.to_string()),
        ("Created this month", stats.monthly.to_string()),
        ("Conforming", stats.conforming.to_string()),
        ("Non-conforming", stats.non_conforming.to_string()),
        ("Expiring in 30 days", stats.expiring_30_days.to_string()),
        ("Expiring in 7 days", stats.expiring_7_days.to_string()),
    ]);

    if !stats.top_categories.is_empty() {
        println!();
        println!("{}", "Top categories".header());
        let rows: Vec<Vec<String>> = stats
            .top_categories
            .iter()
            .map(|c| vec![c.category.clone(), c.count.to_string()])
            .collect();
        print_table(&["Category", "Reports"], &rows);
    }
    Ok(())
}
