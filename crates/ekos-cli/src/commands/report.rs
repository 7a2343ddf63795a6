//! Report management commands.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use ekos::{Conformity, ImportRow, NewReport, ProjectRef, Report, ReportId, ReportQuery};

use crate::commands::{FileRegistry, open_registry, operator};
use crate::style::{SemanticStyle, print_info_table, print_table};

#[derive(Args)]
pub struct CreateArgs {
    /// City name; must be in the city directory.
    #[arg(long)]
    city: String,

    #[arg(long)]
    equipment: String,

    #[arg(long)]
    category: String,

    #[arg(long)]
    company: String,

    #[command(flatten)]
    target: ProjectArgs,

    #[arg(long)]
    subcategory: Option<String>,

    #[arg(long)]
    location: Option<String>,

    #[arg(long)]
    brand_model: Option<String>,

    #[arg(long)]
    serial_number: Option<String>,

    /// Inspection interval, e.g. "12 months".
    #[arg(long)]
    period: Option<String>,

    /// Validity date, YYYY-MM-DD.
    #[arg(long)]
    valid_until: Option<String>,

    #[arg(long, value_enum)]
    conformity: Option<ConformityArg>,

    #[arg(long)]
    notes: Option<String>,
}

/// Selects the project reports are filed under.
#[derive(Args)]
pub struct ProjectArgs {
    /// Project id from `ekos project list`.
    #[arg(long, conflicts_with = "project_name")]
    project_id: Option<String>,

    /// Project name; created if it does not exist yet.
    #[arg(long, default_value = "Default")]
    project_name: String,
}

#[derive(Args)]
pub struct ListArgs {
    /// Case-insensitive match on number, equipment or company.
    #[arg(short, long)]
    search: Option<String>,

    #[arg(long)]
    category: Option<String>,

    #[arg(long)]
    company: Option<String>,

    #[arg(long, value_enum)]
    conformity: Option<ConformityArg>,

    #[arg(long, default_value_t = 0)]
    skip: usize,

    #[arg(long, default_value_t = ReportQuery::DEFAULT_LIMIT)]
    limit: usize,

    /// Print JSON instead of a table.
    #[arg(long)]
    json: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum ConformityArg {
    Conforming,
    NonConforming,
}

impl From<ConformityArg> for Conformity {
    fn from(arg: ConformityArg) -> Self {
        match arg {
            ConformityArg::Conforming => Conformity::Conforming,
            ConformityArg::NonConforming => Conformity::NonConforming,
        }
    }
}

impl ProjectArgs {
    /// An id is passed through for the registry to check against the
    /// catalog; a name is looked up or created.
    fn resolve(&self, registry: &FileRegistry) -> Result<ProjectRef> {
        match &self.project_id {
            Some(id) => Ok(ProjectRef {
                id: id.clone(),
                name: String::new(),
            }),
            None => Ok(registry
                .ensure_project(&operator(), &self.project_name)?
                .reference()),
        }
    }
}

fn parse_id(id: &str) -> Result<ReportId> {
    id.parse()
        .with_context(|| format!("'{id}' is not a valid report id"))
}

pub fn create(project: &Path, args: CreateArgs) -> Result<()> {
    let registry = open_registry(project)?;

    let mut input = NewReport::new(
        args.target.resolve(&registry)?,
        args.city,
        args.equipment,
        args.category,
        args.company,
    );
    input.subcategory = args.subcategory;
    input.location = args.location;
    input.brand_model = args.brand_model;
    input.serial_number = args.serial_number;
    input.period = args.period;
    input.valid_until = args.valid_until;
    input.conformity = args.conformity.map(Into::into);
    input.notes = args.notes;

    let report = registry.create(&operator(), input)?;

    println!(
        "{} {}",
        "Created".success(),
        report.report_number.to_string().code()
    );
    println!("{}", format!("id {}", report.id).muted());
    Ok(())
}

pub fn list(project: &Path, args: &ListArgs) -> Result<()> {
    let registry = open_registry(project)?;

    let mut query = ReportQuery::new().page(args.skip, args.limit);
    query.search.clone_from(&args.search);
    query.category.clone_from(&args.category);
    query.company.clone_from(&args.company);
    query.conformity = args.conformity.map(Into::into);

    let reports = registry.list(&operator(), query)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
        return Ok(());
    }

    let rows: Vec<Vec<String>> = reports
        .iter()
        .map(|r| {
            vec![
                r.report_number.to_string(),
                r.equipment_name.clone(),
                r.category.clone(),
                r.company.clone(),
                r.city.clone(),
                conformity_label(r.conformity).to_string(),
                format!("{:?}", r.status),
                r.id.to_string(),
            ]
        })
        .collect();
    print_table(
        &[
            "Number",
            "Equipment",
            "Category",
            "Company",
            "City",
            "Conformity",
            "Status",
            "Id",
        ],
        &rows,
    );
    Ok(())
}

pub fn show(project: &Path, id: &str, json: bool) -> Result<()> {
    let registry = open_registry(project)?;
    let report = registry.get(&operator(), parse_id(id)?)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }
    Ok(())
}

pub fn delete(project: &Path, ids: &[String]) -> Result<()> {
    let registry = open_registry(project)?;
    let ids = ids
        .iter()
        .map(|id| parse_id(id))
        .collect::<Result<Vec<_>>>()?;

    let deleted = registry.bulk_delete(&operator(), &ids)?;
    println!("{} {deleted} of {} report(s)", "Deleted".success(), ids.len());
    Ok(())
}

pub fn toggle(project: &Path, id: &str) -> Result<()> {
    let registry = open_registry(project)?;
    let status = registry.toggle_status(&operator(), parse_id(id)?)?;
    println!("Status is now {}", format!("{status:?}").header());
    Ok(())
}

pub fn import(project: &Path, file: &Path, target: &ProjectArgs) -> Result<()> {
    let registry = open_registry(project)?;

    let content = fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let rows: Vec<ImportRow> = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse rows in {}", file.display()))?;

    let project_id = target.resolve(&registry)?.id;
    let summary = registry.import_rows(&operator(), &project_id, rows)?;

    println!("{} {} report(s)", "Imported".success(), summary.imported);
    for error in &summary.errors {
        println!("  {}", error.warning());
    }
    Ok(())
}

fn conformity_label(conformity: Option<Conformity>) -> &'static str {
    match conformity {
        Some(Conformity::Conforming) => "conforming",
        Some(Conformity::NonConforming) => "non-conforming",
        None => "-",
    }
}

fn print_report(report: &Report) {
    let optional = |value: &Option<String>| value.clone().unwrap_or_else(|| "-".to_string());

    print_info_table(&[
        ("Number", report.report_number.to_string()),
        ("Id", report.id.to_string()),
        ("Project", report.project.name.clone()),
        ("City", format!("{} ({})", report.city, report.city_code)),
        ("Equipment", report.equipment_name.clone()),
        ("Category", report.category.clone()),
        ("Subcategory", optional(&report.subcategory)),
        ("Company", report.company.clone()),
        ("Location", optional(&report.location)),
        ("Brand / model", optional(&report.brand_model)),
        ("Serial number", optional(&report.serial_number)),
        ("Period", optional(&report.period)),
        ("Valid until", optional(&report.valid_until)),
        ("Conformity", conformity_label(report.conformity).to_string()),
        ("Status", format!("{:?}", report.status)),
        ("Notes", optional(&report.notes)),
        ("Created by", report.created_by_username.clone()),
        ("Created at", report.created_at.to_rfc3339()),
        ("Updated at", report.updated_at.to_rfc3339()),
    ]);
}
