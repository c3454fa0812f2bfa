//! entity-gen - generate C# entity classes from a live database schema
//!
//! Reads the table and column catalog of a PostgreSQL, MySQL or SQLite database
//! and writes one entity file per table that has a primary key.

mod codegen;
mod config;
mod db;
mod error;
mod logging;

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;

use codegen::CodeGenerator;
use config::GeneratorConfig;

#[derive(Parser)]
#[command(name = "entity-gen")]
#[command(about = "Generate entity classes from a database schema", long_about = None)]
struct Cli {
    /// JSON config file (defaults to <config dir>/entity-gen/config.json when present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Database connection string (falls back to DATABASE_URL)
    #[arg(long)]
    connection_string: Option<String>,

    /// Database type: postgresql, mysql, sqlite or sqlserver
    #[arg(long)]
    db_type: Option<String>,

    /// Output directory for generated entities
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Namespace of the generated classes
    #[arg(long)]
    namespace: Option<String>,

    /// Author written into the file header
    #[arg(long)]
    author: Option<String>,

    /// PostgreSQL schema to read
    #[arg(long)]
    schema: Option<String>,

    /// Directory with a ModelTemplate.txt replacing the built-in template
    #[arg(long)]
    template_dir: Option<PathBuf>,

    /// Only generate these tables (repeatable)
    #[arg(long = "table")]
    tables: Vec<String>,

    /// Never generate these tables (repeatable)
    #[arg(long)]
    exclude: Vec<String>,

    /// Keep entity files that already exist
    #[arg(long)]
    no_overwrite: bool,

    /// Log level used when RUST_LOG is not set
    #[arg(long, default_value = "info")]
    log_level: String,
}

impl Cli {
    fn apply(self, mut config: GeneratorConfig) -> GeneratorConfig {
        if let Some(connection_string) = self.connection_string {
            config.connection_string = connection_string;
        }
        if config.connection_string.trim().is_empty() {
            if let Ok(url) = std::env::var("DATABASE_URL") {
                config.connection_string = url;
            }
        }
        if let Some(db_type) = self.db_type {
            config.db_type = db_type;
        }
        if self.output.is_some() {
            config.output_path = self.output;
        }
        if let Some(namespace) = self.namespace {
            config.models_namespace = namespace;
        }
        if let Some(author) = self.author {
            config.author = author;
        }
        if self.schema.is_some() {
            config.schema = self.schema;
        }
        if self.template_dir.is_some() {
            config.template_dir = self.template_dir;
        }
        if !self.tables.is_empty() {
            config.tables = self.tables;
        }
        if !self.exclude.is_empty() {
            config.exclude = self.exclude;
        }
        config
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_tracing(&cli.log_level);

    let overwrite = !cli.no_overwrite;
    let file_config = GeneratorConfig::load(cli.config.as_deref())?;
    let config = cli.apply(file_config);

    let generator = CodeGenerator::new(config).context("invalid configuration")?;
    println!("📤 Output: {}", generator.options().output_path.display());

    let report = generator
        .generate_all_models(overwrite)
        .await
        .context("failed to read database schema")?;

    println!(
        "✨ Generated {} entit{} ({} skipped, {} excluded)",
        report.written.len(),
        if report.written.len() == 1 { "y" } else { "ies" },
        report.skipped.len(),
        report.excluded.len()
    );

    if !report.is_success() {
        for (table, error) in &report.failed {
            eprintln!("❌ {}: {}", table, error);
        }
        anyhow::bail!("{} table(s) failed to generate", report.failed.len());
    }

    Ok(())
}
