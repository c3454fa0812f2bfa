use std::path::PathBuf;

use crate::codegen::entity::{EntityGenerator, EntityOutcome};
use crate::codegen::template::{DirectoryTemplates, EmbeddedTemplates, TemplateProvider};
use crate::config::{CodeGenerateOptions, GeneratorConfig};
use crate::db::{list_tables_scoped, Table};
use crate::error::{ConfigError, Result};

/// What a generation run did, table by table.
#[derive(Debug, Default)]
pub struct GenerationReport {
    pub written: Vec<PathBuf>,
    pub skipped: Vec<PathBuf>,
    /// Tables left out by the filters or for having no primary key.
    pub excluded: Vec<String>,
    pub failed: Vec<(String, String)>,
}

impl GenerationReport {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Generates one entity file per table of a database.
pub struct CodeGenerator {
    options: CodeGenerateOptions,
    templates: Box<dyn TemplateProvider>,
}

impl CodeGenerator {
    /// Validates the configuration; uses `template_dir` when set, the built-in templates otherwise.
    pub fn new(config: GeneratorConfig) -> std::result::Result<Self, ConfigError> {
        let templates: Box<dyn TemplateProvider> = match &config.template_dir {
            Some(dir) => Box::new(DirectoryTemplates::new(dir.clone())),
            None => Box::new(EmbeddedTemplates),
        };
        Self::with_templates(config, templates)
    }

    /// Like [`CodeGenerator::new`], but with a caller-supplied template source.
    pub fn with_templates(
        config: GeneratorConfig,
        templates: Box<dyn TemplateProvider>,
    ) -> std::result::Result<Self, ConfigError> {
        let options = CodeGenerateOptions::try_from(config)?;
        Ok(Self { options, templates })
    }

    pub fn options(&self) -> &CodeGenerateOptions {
        &self.options
    }

    /// Reads the catalog (holding the connection only for that) and generates every eligible table.
    pub async fn generate_all_models(&self, overwrite: bool) -> Result<GenerationReport> {
        let tables = list_tables_scoped(
            self.options.dialect,
            &self.options.connection_string,
            &self.options.schema,
        )
        .await?;
        tracing::info!(count = tables.len(), dialect = %self.options.dialect, "read database schema");

        Ok(self.generate_models(&tables, overwrite))
    }

    /// Generates each table independently; one table failing does not stop the others.
    pub fn generate_models(&self, tables: &[Table], overwrite: bool) -> GenerationReport {
        let entity_generator = EntityGenerator::new(&self.options, self.templates.as_ref());
        let mut report = GenerationReport::default();

        for table in tables {
            if !self.options.selects_table(&table.name) {
                tracing::debug!(table = %table.name, "excluded by table filter");
                report.excluded.push(table.name.clone());
                continue;
            }
            if !table.has_primary_key() {
                tracing::debug!(table = %table.name, "no primary key, not generating");
                report.excluded.push(table.name.clone());
                continue;
            }

            match entity_generator.generate_entity(table, overwrite) {
                Ok(EntityOutcome::Written(path)) => report.written.push(path),
                Ok(EntityOutcome::Skipped(path)) => report.skipped.push(path),
                Err(e) => {
                    tracing::error!(table = %table.name, error = %e, "failed to generate entity");
                    report.failed.push((table.name.clone(), e.to_string()));
                }
            }
        }

        report
    }
}
