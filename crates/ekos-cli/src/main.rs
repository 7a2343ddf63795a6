//! EKOS command-line interface.
//!
//! Manages inspection reports in a local data directory.
//!
//! # Quick Start
//!
//! ```bash
//! # Create a report; its number is allocated automatically
//! ekos report create --city Ankara --equipment "Tower crane" \
//!     --category Lifting --company ACME
//!
//! # File under a named project instead of "Default"
//! ekos project create "Bridge Works"
//! ekos report create --city İzmir --equipment Hoist --category Lifting \
//!     --company ACME --project-name "Bridge Works"
//!
//! # List and inspect
//! ekos report list --search pk2025ank
//! ekos stats
//! ```

mod commands;
mod style;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};

/// EKOS - equipment inspection reports with collision-free numbering.
#[derive(Parser)]
#[command(name = "ekos")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Project directory holding ekos.toml.
    #[arg(short, long, global = true, default_value = ".")]
    project: PathBuf,

    /// Disable colored output.
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show version information.
    Version,

    /// List known cities and their report-number codes.
    Cities,

    /// Allocate a report number without creating a report.
    ///
    /// The number is consumed even though no report uses it.
    Allocate {
        /// City name, e.g. "İstanbul".
        city: String,

        /// Fail on unknown cities instead of using the XXX code.
        #[arg(long)]
        strict: bool,
    },

    /// Report management commands.
    #[command(subcommand)]
    Report(ReportCommands),

    /// Project catalog commands.
    #[command(subcommand)]
    Project(ProjectCommands),

    /// Equipment category commands.
    #[command(subcommand)]
    Category(CategoryCommands),

    /// Show dashboard statistics.
    Stats {
        /// Print JSON instead of a table.
        #[arg(long)]
        json: bool,
    },

    /// Configuration commands.
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Subcommand)]
enum ReportCommands {
    /// Create a report.
    Create(commands::report::CreateArgs),

    /// List reports, newest first.
    List(commands::report::ListArgs),

    /// Show one report.
    Show {
        /// Report id.
        id: String,

        /// Print JSON instead of a table.
        #[arg(long)]
        json: bool,
    },

    /// Delete one or more reports.
    Delete {
        /// Report ids.
        #[arg(required = true)]
        ids: Vec<String>,
    },

    /// Toggle a report between active and passive.
    Toggle {
        /// Report id.
        id: String,
    },

    /// Import rows from a JSON array of row objects.
    Import {
        /// Path to the JSON file.
        file: PathBuf,

        #[command(flatten)]
        target: commands::report::ProjectArgs,
    },
}

#[derive(Subcommand)]
enum ProjectCommands {
    /// Add a project.
    Create {
        name: String,

        #[arg(long)]
        description: Option<String>,
    },

    /// List projects.
    List {
        /// Print JSON instead of a table.
        #[arg(long)]
        json: bool,
    },

    /// Delete a project. Its reports are kept.
    Delete {
        /// Project id.
        id: String,
    },
}

#[derive(Subcommand)]
enum CategoryCommands {
    /// Add an equipment category.
    Create {
        name: String,

        /// Subcategory; repeat for several.
        #[arg(long = "sub")]
        subcategories: Vec<String>,

        #[arg(long)]
        description: Option<String>,
    },

    /// List categories.
    List {
        /// Print JSON instead of a table.
        #[arg(long)]
        json: bool,
    },

    /// Delete a category.
    Delete {
        /// Category id.
        id: String,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show the merged configuration.
    Show {
        /// Output format.
        #[arg(short, long, value_enum, default_value_t = Format::Text)]
        format: Format,
    },

    /// Validate configuration files.
    Validate,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Text,
    Json,
    Toml,
}

fn main() -> Result<()> {
    // Logs go to stderr so JSON output stays parseable
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();
    style::set_no_color(cli.no_color);
    let project = cli.project.as_path();

    match cli.command {
        Commands::Version => {
            commands::version::run();
            Ok(())
        }
        Commands::Cities => commands::cities::run(project),
        Commands::Allocate { city, strict } => commands::allocate::run(project, &city, strict),
        Commands::Report(cmd) => match cmd {
            ReportCommands::Create(args) => commands::report::create(project, args),
            ReportCommands::List(args) => commands::report::list(project, &args),
            ReportCommands::Show { id, json } => commands::report::show(project, &id, json),
            ReportCommands::Delete { ids } => commands::report::delete(project, &ids),
            ReportCommands::Toggle { id } => commands::report::toggle(project, &id),
            ReportCommands::Import { file, target } => {
                commands::report::import(project, &file, &target)
            }
        },
        Commands::Project(cmd) => match cmd {
            ProjectCommands::Create { name, description } => {
                commands::catalog::project_create(project, &name, description)
            }
            ProjectCommands::List { json } => commands::catalog::project_list(project, json),
            ProjectCommands::Delete { id } => commands::catalog::project_delete(project, &id),
        },
        Commands::Category(cmd) => match cmd {
            CategoryCommands::Create {
                name,
                subcategories,
                description,
            } => commands::catalog::category_create(project, &name, subcategories, description),
            CategoryCommands::List { json } => commands::catalog::category_list(project, json),
            CategoryCommands::Delete { id } => commands::catalog::category_delete(project, &id),
        },
        Commands::Stats { json } => commands::stats::run(project, json),
        Commands::Config(cmd) => match cmd {
            ConfigCommands::Show { format } => commands::config::show(project, format),
            ConfigCommands::Validate => commands::config::validate(project),
        },
    }
}
