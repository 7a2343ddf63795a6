//! Project and category catalog commands.

use std::path::Path;

use anyhow::Result;

use crate::commands::{open_registry, operator};
use crate::style::{SemanticStyle, print_table};

pub fn project_create(project: &Path, name: &str, description: Option<String>) -> Result<()> {
    let registry = open_registry(project)?;
    let created = registry.create_project(&operator(), name, description)?;

    println!("{} project {}", "Created".success(), created.name.header());
    println!("{}", format!("id {}", created.id).muted());
    Ok(())
}

pub fn project_list(project: &Path, json: bool) -> Result<()> {
    let registry = open_registry(project)?;
    let projects = registry.projects(&operator())?;

    if json {
        println!("{}", serde_json::to_string_pretty(&projects)?);
        return Ok(());
    }

    let rows: Vec<Vec<String>> = projects
        .into_iter()
        .map(|p| {
            vec![
                p.name,
                p.description.unwrap_or_else(|| "-".to_string()),
                p.id,
            ]
        })
        .collect();
    print_table(&["Project", "Description", "Id"], &rows);
    Ok(())
}

pub fn project_delete(project: &Path, id: &str) -> Result<()> {
    let registry = open_registry(project)?;
    let deleted = registry.delete_project(&operator(), id)?;

    println!("{} project {}", "Deleted".success(), deleted.name.header());
    Ok(())
}

pub fn category_create(
    project: &Path,
    name: &str,
    subcategories: Vec<String>,
    description: Option<String>,
) -> Result<()> {
    let registry = open_registry(project)?;
    let created = registry.create_category(&operator(), name, subcategories, description)?;

    println!("{} category {}", "Created".success(), created.name.header());
    println!("{}", format!("id {}", created.id).muted());
    Ok(())
}

pub fn category_list(project: &Path, json: bool) -> Result<()> {
    let registry = open_registry(project)?;
    let categories = registry.categories(&operator())?;

    if json {
        println!("{}", serde_json::to_string_pretty(&categories)?);
        return Ok(());
    }

    let rows: Vec<Vec<String>> = categories
        .into_iter()
        .map(|c| vec![c.name, c.subcategories.join(", "), c.id])
        .collect();
    print_table(&["Category", "Subcategories", "Id"], &rows);
    Ok(())
}

pub fn category_delete(project: &Path, id: &str) -> Result<()> {
    let registry = open_registry(project)?;
    let deleted = registry.delete_category(&operator(), id)?;

    println!("{} category {}", "Deleted".success(), deleted.name.header());
    Ok(())
}
