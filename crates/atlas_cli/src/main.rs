//! `atlas` command-line entry point.
//!
//! # Responsibility
//! - Expose project library, validation, taxonomy and feedback use-cases.
//! - Resolve configuration from the environment, then apply flag overrides.

mod delivery;

use anyhow::{bail, Context, Result};
use atlas_core::logging::parse_level;
use atlas_core::taxonomy::EntityKind;
use atlas_core::validation::{parse_project, ValidationResult};
use atlas_core::{
    build_route_metadata, init_logging, open_db, render_metadata_json, sanitize_string,
    unresolved_references, validate_file, validate_json, AtlasConfig, Catalog, FeedbackCategory,
    FeedbackOutcome, FeedbackService, FileCandidate, Project, ProjectService, SqliteStorage,
    StorageProjectRepository, ValidationReport,
};
use clap::{Parser, Subcommand};
use delivery::{HttpTransport, StdoutClipboard};
use log::info;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "atlas")]
#[command(about = "AI Interaction Atlas project library and taxonomy tools", long_about = None)]
#[command(version)]
struct Cli {
    /// SQLite file holding saved projects
    #[arg(long, global = true, env = "ATLAS_DB_PATH")]
    db: Option<PathBuf>,
    /// Directory for rotating log files
    #[arg(long, global = true, env = "ATLAS_LOG_DIR")]
    log_dir: Option<PathBuf>,
    /// trace|debug|info|warn|error
    #[arg(long, global = true)]
    log_level: Option<String>,
    /// Byte quota for stored keys plus values
    #[arg(long, global = true)]
    quota: Option<usize>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a project file without importing it
    CheckFile { path: PathBuf },
    /// Validate and save a project file
    Import { path: PathBuf },
    /// List saved projects, newest first
    List,
    /// Print a saved project and any unresolved taxonomy references
    Show { id: String },
    /// Write a saved project as pretty JSON
    Export {
        id: String,
        /// Output file; stdout when omitted
        #[arg(long, short)]
        out: Option<PathBuf>,
    },
    /// Delete a saved project
    Delete { id: String },
    /// Create an empty project
    Create {
        #[arg(required = true)]
        name: Vec<String>,
    },
    /// Rename a saved project
    Rename {
        id: String,
        #[arg(required = true)]
        name: Vec<String>,
    },
    /// Validate a taxonomy catalog and print a summary
    Taxonomy {
        /// Catalog JSON file; the built-in catalog when omitted
        #[arg(long)]
        file: Option<PathBuf>,
    },
    /// Generate per-route page metadata as JSON
    Metadata {
        #[arg(long, short)]
        out: Option<PathBuf>,
    },
    /// Send feedback, or print it for copying when no endpoint works
    Feedback {
        /// bug|feature|content|usability|other (repeatable)
        #[arg(long = "category", short)]
        categories: Vec<String>,
        #[arg(required = true)]
        message: Vec<String>,
    },
    /// Print the sanitized form of a string
    Sanitize {
        text: String,
        #[arg(long, default_value_t = atlas_core::validation::DEFAULT_MAX_LENGTH)]
        max: usize,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = resolve_config(&cli)?;

    if let Some(log_dir) = &config.log_dir {
        let log_dir = absolute(log_dir)?;
        init_logging(config.log_level, &log_dir).context("failed to initialize logging")?;
    }
    info!("event=cli_command module=cli status=start");

    match cli.command {
        Commands::CheckFile { path } => check_file(&path),
        Commands::Import { path } => with_projects(&config, |service| {
            let imported = service.import_file(&path)?;
            println!(
                "{:?} project {} ({})",
                imported.outcome, imported.project.id, imported.project.name
            );
            Ok(())
        }),
        Commands::List => with_projects(&config, |service| {
            for project in service.list_projects()? {
                print_summary(&project);
            }
            Ok(())
        }),
        Commands::Show { id } => with_projects(&config, |service| {
            let Some(project) = service.get_project(&id)? else {
                bail!("project not found: {id}");
            };
            println!("{}", serde_json::to_string_pretty(&project)?);
            let catalog = Catalog::builtin()?;
            for unresolved in unresolved_references(catalog, &project) {
                eprintln!(
                    "warning: node {} ({}) references unknown `{}`",
                    unresolved.node_id,
                    unresolved.node_type.as_str(),
                    unresolved.ref_id
                );
            }
            Ok(())
        }),
        Commands::Export { id, out } => with_projects(&config, |service| {
            let json = service.export_project(&id)?;
            write_output(out.as_deref(), &json)
        }),
        Commands::Delete { id } => with_projects(&config, |service| {
            service.delete_project(&id)?;
            println!("deleted {id}");
            Ok(())
        }),
        Commands::Create { name } => with_projects(&config, |service| {
            let project = service.create_project(&name.join(" "))?;
            print_summary(&project);
            Ok(())
        }),
        Commands::Rename { id, name } => with_projects(&config, |service| {
            let project = service.rename_project(&id, &name.join(" "))?;
            print_summary(&project);
            Ok(())
        }),
        Commands::Taxonomy { file } => taxonomy_summary(file.as_deref()),
        Commands::Metadata { out } => {
            let routes = build_route_metadata(Catalog::builtin()?);
            write_output(out.as_deref(), &render_metadata_json(&routes)?)
        }
        Commands::Feedback {
            categories,
            message,
        } => send_feedback(&config, &categories, &message.join(" ")),
        Commands::Sanitize { text, max } => {
            println!("{}", sanitize_string(&text, max));
            Ok(())
        }
    }
}

fn resolve_config(cli: &Cli) -> Result<AtlasConfig> {
    let mut config = AtlasConfig::from_env()?;
    if let Some(db) = &cli.db {
        config.db_path = db.clone();
    }
    if let Some(log_dir) = &cli.log_dir {
        config.log_dir = Some(log_dir.clone());
    }
    if let Some(level) = &cli.log_level {
        config.log_level = parse_level(level)?;
    }
    if let Some(quota) = cli.quota {
        config.storage_quota_bytes = Some(quota);
    }
    Ok(config)
}

fn absolute(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    Ok(std::env::current_dir()?.join(path))
}

type CliProjectService<'conn> = ProjectService<StorageProjectRepository<SqliteStorage<'conn>>>;

fn with_projects(
    config: &AtlasConfig,
    run: impl FnOnce(&CliProjectService<'_>) -> Result<()>,
) -> Result<()> {
    let conn = open_db(&config.db_path)
        .with_context(|| format!("failed to open {}", config.db_path.display()))?;
    let storage = match config.storage_quota_bytes {
        Some(quota) => SqliteStorage::with_quota(&conn, quota),
        None => SqliteStorage::new(&conn),
    };
    let service = ProjectService::new(StorageProjectRepository::new(storage));
    run(&service)
}

fn check_file(path: &Path) -> Result<()> {
    let result = validate_path(path)?;
    let report = ValidationReport::from_result(&result);
    println!("{}", serde_json::to_string_pretty(&report)?);
    if !report.valid {
        std::process::exit(1);
    }
    Ok(())
}

/// Runs the import checks without saving.
fn validate_path(path: &Path) -> Result<ValidationResult<Project>> {
    let candidate = match FileCandidate::from_path(path) {
        Ok(candidate) => Some(candidate),
        Err(err) if err.kind() == ErrorKind::NotFound => None,
        Err(err) => {
            return Err(err).with_context(|| format!("failed to inspect {}", path.display()))
        }
    };
    if let Err(err) = validate_file(candidate.as_ref()) {
        return Ok(Err(err));
    }
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    Ok(validate_json(&text).and_then(parse_project))
}

fn taxonomy_summary(file: Option<&Path>) -> Result<()> {
    let owned;
    let catalog = match file {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            owned = Catalog::from_json(&text)?;
            &owned
        }
        None => Catalog::builtin()?,
    };

    println!("catalog ok: {} entries", catalog.entity_count());
    for kind in EntityKind::ALL {
        println!("  {:<14} {}", kind.as_str(), catalog.count_of(kind));
    }
    for layer in catalog.ordered_layers() {
        println!(
            "  layer {} ({} tasks)",
            layer.id,
            catalog.tasks_in_layer(&layer.id).count()
        );
    }
    Ok(())
}

fn send_feedback(config: &AtlasConfig, categories: &[String], message: &str) -> Result<()> {
    let categories = categories
        .iter()
        .map(|value| value.parse::<FeedbackCategory>())
        .collect::<Result<Vec<_>, _>>()?;
    let service = FeedbackService::new(
        config.feedback_endpoint.clone(),
        HttpTransport::new()?,
        StdoutClipboard,
    );
    match service.submit(message, &categories)? {
        FeedbackOutcome::Sent => println!("feedback sent, thank you"),
        FeedbackOutcome::CopiedToClipboard => {
            eprintln!("feedback was not sent; copy the message above instead")
        }
    }
    Ok(())
}

fn print_summary(project: &Project) {
    println!(
        "{}  {}  modified={}  nodes={} edges={} personas={}",
        project.id,
        project.name,
        project.last_modified,
        project.data.nodes.len(),
        project.data.edges.len(),
        project.data.personas.len()
    );
}

fn write_output(out: Option<&Path>, contents: &str) -> Result<()> {
    match out {
        Some(path) => std::fs::write(path, contents)
            .with_context(|| format!("failed to write {}", path.display())),
        None => {
            println!("{contents}");
            Ok(())
        }
    }
}
