//! Command-line surface.
//!
//! Each subcommand loads its config from the environment, lets the flags
//! override it, wires the concrete adapters into one use case and reports
//! whether the run succeeded.

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use arangomig_domain::{CategorySpec, HierarchySpec, LanguageCode};
use clap::{Parser, Subcommand};

use crate::infrastructure::arango::ArangoClient;
use crate::infrastructure::clock::SystemClock;
use crate::infrastructure::config::{
    ConnectionConfig, ExportConfig, ImportConfig, DEFAULT_DATABASE, DEFAULT_IMPORT_DATABASE,
};
use crate::infrastructure::ports::{ClockPort, RunLog};
use crate::infrastructure::run_log::BufferedRunLog;
use crate::infrastructure::translate::GoogleTranslateClient;
use crate::use_cases::hierarchy::{ExportHierarchy, ImportHierarchy};
use crate::use_cases::schema::{
    read_schema_file, write_schema_file, CreateSchema, ExtractSchema, DEFAULT_SCHEMA_FILE,
    SCHEMA_LOG_FILE,
};
use crate::use_cases::seed::{CreateHierarchy, CreateTranslations};

#[derive(Parser)]
#[command(author, version, about = "ArangoDB schema and hierarchy migration tools", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Extract the schema of a database into a JSON file
    Extract {
        /// Output file
        #[arg(default_value = DEFAULT_SCHEMA_FILE)]
        output: PathBuf,
        /// Overwrite an existing file without asking
        #[arg(short, long)]
        yes: bool,
        #[arg(short, long)]
        database: Option<String>,
    },
    /// Apply a schema file to a database
    Create {
        /// Schema file written by `extract`
        file: PathBuf,
        /// Do not ask for confirmation
        #[arg(short, long)]
        yes: bool,
        #[arg(short, long)]
        database: Option<String>,
    },
    /// Export the category/service hierarchy
    Export {
        /// Do not ask for confirmation
        #[arg(short, long)]
        yes: bool,
        #[arg(short, long)]
        database: Option<String>,
        /// Output directory
        #[arg(short, long, env = "EXPORT_DIR")]
        output_dir: Option<PathBuf>,
        #[arg(short, long, env = "EXPORT_FILENAME")]
        filename: Option<String>,
    },
    /// Import a hierarchy export file
    Import {
        /// Export file (defaults to IMPORT_FILE)
        file: Option<PathBuf>,
        /// Do not ask for confirmation
        #[arg(short, long)]
        yes: bool,
        #[arg(short, long)]
        database: Option<String>,
    },
    /// Create categories and services from a file or interactive prompts
    CreateHierarchy {
        /// JSON file: [{"category": "...", "services": ["..."]}]
        #[arg(short, long)]
        file: Option<PathBuf>,
        /// Do not ask for confirmation
        #[arg(short, long)]
        yes: bool,
        #[arg(short, long)]
        database: Option<String>,
    },
    /// Machine-translate category and service names into a language
    CreateTranslations {
        /// Target language code, e.g. FR
        language: String,
        /// Do not ask for confirmation
        #[arg(short, long)]
        yes: bool,
        #[arg(short, long)]
        database: Option<String>,
    },
}

/// Run one command. `Ok(false)` means the command ran but did not succeed.
pub async fn run(cli: Cli) -> Result<bool> {
    let clock: Arc<dyn ClockPort> = Arc::new(SystemClock::new());

    match cli.command {
        Commands::Extract {
            output,
            yes,
            database,
        } => {
            if output.exists()
                && !yes
                && !confirm(&format!("{} exists. Overwrite? (y/N): ", output.display()), false)?
            {
                println!("Cancelled");
                return Ok(true);
            }
            let Some(client) = connect(DEFAULT_DATABASE, database, yes).await? else {
                return Ok(true);
            };
            let schema = ExtractSchema::new(client.clone())
                .execute(client.database())
                .await?;
            write_schema_file(&schema, &output)
                .await
                .with_context(|| format!("writing {}", output.display()))?;
            tracing::info!(path = %output.display(), "Schema written");
            Ok(true)
        }

        Commands::Create {
            file,
            yes,
            database,
        } => {
            let schema = read_schema_file(&file)
                .await
                .with_context(|| format!("reading {}", file.display()))?;
            println!(
                "Schema from '{}': {} collections, {} graphs, {} views, {} analyzers, {} functions",
                schema.database,
                schema.collections.len(),
                schema.graphs.len(),
                schema.views.len(),
                schema.analyzers.len(),
                schema.functions.len()
            );
            let Some(client) = connect(DEFAULT_DATABASE, database, yes).await? else {
                return Ok(true);
            };

            let log = Arc::new(BufferedRunLog::new(clock));
            let report = CreateSchema::new(client, log.clone())
                .execute(&schema)
                .await;
            log.flush(Path::new(SCHEMA_LOG_FILE))
                .with_context(|| format!("writing {SCHEMA_LOG_FILE}"))?;
            if report.failures() > 0 {
                tracing::warn!(failures = report.failures(), log = SCHEMA_LOG_FILE, "Some entities could not be created");
            }
            Ok(true)
        }

        Commands::Export {
            yes,
            database,
            output_dir,
            filename,
        } => {
            let Some(client) = connect(DEFAULT_DATABASE, database, yes).await? else {
                return Ok(true);
            };
            let mut config = ExportConfig::from_env(clock.now());
            if let Some(dir) = output_dir {
                config.output_dir = dir;
            }
            if let Some(name) = filename.filter(|n| !n.trim().is_empty()) {
                config.filename = name;
            }

            let source_database = client.database().to_string();
            let source_url = client.url().to_string();
            let outcome = ExportHierarchy::new(client, clock, source_database, source_url)
                .execute(&config)
                .await?;
            for warning in &outcome.warnings {
                tracing::warn!("{warning}");
            }
            tracing::info!(
                path = %outcome.path.display(),
                summary = %outcome.summary_path.display(),
                total = outcome.metadata.total_documents,
                "Export complete"
            );
            Ok(true)
        }

        Commands::Import {
            file,
            yes,
            database,
        } => {
            let config = ImportConfig::from_env(file.as_deref())?;
            println!("Import file: {}", config.file.display());
            let Some(client) = connect(DEFAULT_IMPORT_DATABASE, database, yes).await? else {
                return Ok(true);
            };
            let target = client.database().to_string();
            let report = ImportHierarchy::new(client, clock, target)
                .execute(&config)
                .await?;

            for (collection, stats) in &report.stats {
                println!(
                    "{:<34} imported {:>5}  skipped {:>5}  failed {:>5}",
                    collection.name(),
                    stats.imported,
                    stats.skipped,
                    stats.failed
                );
            }
            for error in &report.errors {
                tracing::error!("{error}");
            }
            if !report.verification.passed() {
                tracing::error!("Verification failed: not every sampled record was found");
            }
            Ok(report.is_success())
        }

        Commands::CreateHierarchy {
            file,
            yes,
            database,
        } => {
            let spec = match file {
                Some(path) => read_hierarchy_file(&path).await?,
                None => {
                    let stdin = io::stdin();
                    let entries = prompt_hierarchy(&mut stdin.lock(), &mut io::stdout())?;
                    HierarchySpec::new(entries)?
                }
            };
            if spec.is_empty() {
                println!("Nothing to create");
                return Ok(true);
            }

            let Some(client) = connect(DEFAULT_DATABASE, database, yes).await? else {
                return Ok(true);
            };
            let report = CreateHierarchy::new(client, clock).execute(&spec).await?;
            println!("{report}");
            Ok(true)
        }

        Commands::CreateTranslations {
            language,
            yes,
            database,
        } => {
            let language = LanguageCode::parse(&language)?;
            let Some(client) = connect(DEFAULT_DATABASE, database, yes).await? else {
                return Ok(true);
            };
            let translator = Arc::new(GoogleTranslateClient::from_env());
            let report = CreateTranslations::new(client, translator, clock)
                .execute(&language)
                .await?;
            println!("Categories: {}", report.categories);
            println!("Services:   {}", report.services);
            Ok(true)
        }
    }
}

/// Show the connection, ask to proceed unless `yes`, then check the server.
/// `None` when the user declines.
async fn connect(
    default_database: &str,
    database: Option<String>,
    yes: bool,
) -> Result<Option<Arc<ArangoClient>>> {
    let config = ConnectionConfig::from_env(default_database).with_database(database);
    let stdin = io::stdin();
    if !confirm_connection(&config, yes, &mut stdin.lock(), &mut io::stdout())? {
        println!("Cancelled");
        return Ok(None);
    }

    let client = ArangoClient::new(&config);
    let version = client
        .ping()
        .await
        .with_context(|| format!("connecting to ArangoDB at {}", config.url))?;
    tracing::info!(url = %config.url, database = %config.database, version = %version, "Connected");
    Ok(Some(Arc::new(client)))
}

async fn read_hierarchy_file(path: &Path) -> Result<HierarchySpec> {
    let contents = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("reading {}", path.display()))?;
    let value: serde_json::Value = serde_json::from_str(&contents)
        .with_context(|| format!("parsing {}", path.display()))?;
    Ok(HierarchySpec::parse(&value)?)
}

fn confirm(prompt: &str, default: bool) -> io::Result<bool> {
    let stdin = io::stdin();
    let answer = ask(&mut stdin.lock(), &mut io::stdout(), prompt)?;
    Ok(is_yes(answer.as_deref(), default))
}

/// Print the connection settings and ask `Proceed? (Y/n)`.
pub fn confirm_connection<R: BufRead, W: Write>(
    config: &ConnectionConfig,
    yes: bool,
    input: &mut R,
    output: &mut W,
) -> io::Result<bool> {
    if yes {
        return Ok(true);
    }
    writeln!(output, "ArangoDB connection:")?;
    writeln!(output, "  URL:      {}", config.url)?;
    writeln!(output, "  Database: {}", config.database)?;
    writeln!(output, "  User:     {}", config.username)?;
    let answer = ask(input, output, "Proceed? (Y/n): ")?;
    Ok(is_yes(answer.as_deref(), true))
}

/// Blank input takes `default`; end of input declines.
fn is_yes(answer: Option<&str>, default: bool) -> bool {
    match answer {
        None => false,
        Some("") => default,
        Some(answer) => answer.eq_ignore_ascii_case("y") || answer.eq_ignore_ascii_case("yes"),
    }
}

/// Ask for a category, then its services until a blank line, then whether
/// to add another category.
pub fn prompt_hierarchy<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
) -> io::Result<Vec<CategorySpec>> {
    let mut entries = Vec::new();
    loop {
        let Some(category) = ask(input, output, "Category name: ")? else {
            break;
        };
        if category.is_empty() {
            writeln!(output, "Category name cannot be empty")?;
            continue;
        }

        let mut services = Vec::new();
        while let Some(service) = ask(input, output, "  Service name (blank to finish): ")? {
            if service.is_empty() {
                break;
            }
            services.push(service);
        }
        entries.push(CategorySpec::new(category, services));

        match ask(input, output, "Add another category? (y/N): ")? {
            Some(answer) if answer.eq_ignore_ascii_case("y") => continue,
            _ => break,
        }
    }
    Ok(entries)
}

/// `None` at end of input.
fn ask<R: BufRead, W: Write>(input: &mut R, output: &mut W, prompt: &str) -> io::Result<Option<String>> {
    write!(output, "{prompt}")?;
    output.flush()?;
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}
