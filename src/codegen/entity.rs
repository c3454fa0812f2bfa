use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::codegen::property::render_property;
use crate::codegen::template::{TemplateProvider, MODEL_TEMPLATE};
use crate::config::CodeGenerateOptions;
use crate::db::Table;
use crate::error::{GenerateError, Result};

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntityOutcome {
    Written(PathBuf),
    /// The file already existed and overwriting was off.
    Skipped(PathBuf),
}

/// Renders one table into an entity file.
pub struct EntityGenerator<'a> {
    options: &'a CodeGenerateOptions,
    templates: &'a dyn TemplateProvider,
}

impl<'a> EntityGenerator<'a> {
    pub fn new(options: &'a CodeGenerateOptions, templates: &'a dyn TemplateProvider) -> Self {
        Self { options, templates }
    }

    pub fn entity_path(&self, table: &Table) -> PathBuf {
        self.options
            .output_path
            .join(format!("{}{}", table.name, self.options.file_extension))
    }

    pub fn generate_entity(&self, table: &Table, overwrite: bool) -> Result<EntityOutcome> {
        ensure_single_key(table)?;

        fs::create_dir_all(&self.options.output_path)?;

        let path = self.entity_path(table);
        if path.exists() && !overwrite {
            tracing::debug!(table = %table.name, path = %path.display(), "entity exists, skipping");
            return Ok(EntityOutcome::Skipped(path));
        }

        let generated_at = chrono::Local::now().format(TIMESTAMP_FORMAT).to_string();
        let content = self.render_entity(table, &generated_at)?;
        write_and_save(&path, &content)?;

        tracing::info!(table = %table.name, path = %path.display(), "generated entity");
        Ok(EntityOutcome::Written(path))
    }

    /// Substitutes the table into the model template. Properties keep column order,
    /// each followed by a blank line.
    pub fn render_entity(&self, table: &Table, generated_at: &str) -> Result<String> {
        let mut properties = String::new();
        for column in &table.columns {
            properties.push_str(&render_property(table, column));
            properties.push('\n');
        }

        let template = self.templates.load_template(MODEL_TEMPLATE)?;
        Ok(template
            .replace("{GeneratorTime}", generated_at)
            .replace("{ModelsNamespace}", &self.options.models_namespace)
            .replace("{Author}", &self.options.author)
            .replace("{Comment}", &table.comment)
            .replace("{ModelName}", &table.name)
            .replace("{ModelProperties}", &properties))
    }
}

/// Several key columns would all render as `Id`; such tables are refused.
fn ensure_single_key(table: &Table) -> Result<()> {
    let keys: Vec<String> = table.primary_key_columns().map(|c| c.name.clone()).collect();
    if keys.len() > 1 {
        return Err(GenerateError::CompositeKey {
            table: table.name.clone(),
            columns: keys,
        });
    }
    Ok(())
}

fn write_and_save(path: &Path, content: &str) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    writer.write_all(content.as_bytes())?;
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codegen::template::{DirectoryTemplates, EmbeddedTemplates};
    use crate::db::{Column, Dialect};

    fn options(output: &Path) -> CodeGenerateOptions {
        CodeGenerateOptions {
            connection_string: "sqlite::memory:".to_string(),
            dialect: Dialect::PostgreSql,
            output_path: output.to_path_buf(),
            models_namespace: "Shop.Models".to_string(),
            author: "jdoe".to_string(),
            schema: "public".to_string(),
            template_dir: None,
            file_extension: ".cs".to_string(),
            tables: Vec::new(),
            exclude: Vec::new(),
        }
    }

    fn user_table() -> Table {
        let mut table = Table::new("User", "Registered users");
        table.columns = vec![
            Column::new(Dialect::PostgreSql, "UserId", "int4").primary_key(),
            Column::new(Dialect::PostgreSql, "Name", "text"),
            Column::new(Dialect::PostgreSql, "Age", "int4"),
        ];
        table
    }

    #[test]
    fn test_render_user_scenario() {
        let dir = tempfile::tempdir().unwrap();
        let opts = options(dir.path());
        let generator = EntityGenerator::new(&opts, &EmbeddedTemplates);

        let content = generator.render_entity(&user_table(), "2024-01-02 03:04:05").unwrap();
        assert!(content.contains("namespace Shop.Models"));
        assert!(content.contains("public class User"));
        assert!(content.contains("/// Registered users"));
        assert!(content.contains("2024-01-02 03:04:05"));
        assert!(content.contains("jdoe"));
        assert!(content.contains("\t\t[Key]\n\t\tpublic int Id {get;set;}\n\n"));
        assert!(content.contains("\t\tpublic string Name {get;set;}\n"));
        assert!(content.contains("\t\tpublic int? Age {get;set;}\n"));
        assert!(!content.contains("UserId"));

        let id = content.find("public int Id").unwrap();
        let name = content.find("public string Name").unwrap();
        let age = content.find("public int? Age").unwrap();
        assert!(id < name && name < age);
    }

    #[test]
    fn test_render_replaces_every_placeholder() {
        let dir = tempfile::tempdir().unwrap();
        let opts = options(dir.path());
        let generator = EntityGenerator::new(&opts, &EmbeddedTemplates);

        let content = generator.render_entity(&user_table(), "now").unwrap();
        for token in ["{GeneratorTime}", "{ModelsNamespace}", "{Author}", "{Comment}", "{ModelName}", "{ModelProperties}"] {
            assert!(!content.contains(token), "{token} left in output");
        }
    }

    #[test]
    fn test_generate_writes_file_and_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("nested").join("models");
        let opts = options(&out);
        let generator = EntityGenerator::new(&opts, &EmbeddedTemplates);

        let outcome = generator.generate_entity(&user_table(), true).unwrap();
        let expected = out.join("User.cs");
        assert_eq!(outcome, EntityOutcome::Written(expected.clone()));
        assert!(fs::read_to_string(expected).unwrap().contains("public class User"));
    }

    #[test]
    fn test_existing_file_is_left_alone_without_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let opts = options(dir.path());
        let generator = EntityGenerator::new(&opts, &EmbeddedTemplates);
        let path = dir.path().join("User.cs");
        fs::write(&path, "hand written").unwrap();

        let outcome = generator.generate_entity(&user_table(), false).unwrap();
        assert_eq!(outcome, EntityOutcome::Skipped(path.clone()));
        assert_eq!(fs::read_to_string(&path).unwrap(), "hand written");

        generator.generate_entity(&user_table(), true).unwrap();
        assert!(fs::read_to_string(&path).unwrap().contains("public class User"));
    }

    #[test]
    fn test_regeneration_differs_only_in_timestamp() {
        let dir = tempfile::tempdir().unwrap();
        let opts = options(dir.path());
        let generator = EntityGenerator::new(&opts, &EmbeddedTemplates);
        let path = dir.path().join("User.cs");

        let strip_time = |s: String| {
            s.lines()
                .filter(|l| !l.contains("Generated by entity-gen at"))
                .collect::<Vec<_>>()
                .join("\n")
        };

        generator.generate_entity(&user_table(), true).unwrap();
        let first = strip_time(fs::read_to_string(&path).unwrap());
        generator.generate_entity(&user_table(), true).unwrap();
        let second = strip_time(fs::read_to_string(&path).unwrap());
        assert_eq!(first, second);
    }

    #[test]
    fn test_composite_key_is_rejected_before_writing() {
        let dir = tempfile::tempdir().unwrap();
        let opts = options(dir.path());
        let generator = EntityGenerator::new(&opts, &EmbeddedTemplates);

        let mut table = Table::new("OrderLine", "");
        table.columns = vec![
            Column::new(Dialect::PostgreSql, "OrderId", "int4").primary_key(),
            Column::new(Dialect::PostgreSql, "LineNo", "int4").primary_key(),
        ];

        match generator.generate_entity(&table, true) {
            Err(GenerateError::CompositeKey { table, columns }) => {
                assert_eq!(table, "OrderLine");
                assert_eq!(columns, ["OrderId", "LineNo"]);
            }
            other => panic!("expected composite key error, got {other:?}"),
        }
        assert!(!dir.path().join("OrderLine.cs").exists());
    }

    #[test]
    fn test_custom_template_directory() {
        let dir = tempfile::tempdir().unwrap();
        let templates = DirectoryTemplates::new(dir.path());
        fs::write(
            dir.path().join(MODEL_TEMPLATE),
            "// {Author}\nclass {ModelName} {\n{ModelProperties}}\n",
        )
        .unwrap();
        let opts = options(dir.path());
        let generator = EntityGenerator::new(&opts, &templates);

        let mut table = Table::new("Tag", "");
        table.columns = vec![Column::new(Dialect::PostgreSql, "Id", "int8").primary_key()];

        let content = generator.render_entity(&table, "t").unwrap();
        assert_eq!(content, "// jdoe\nclass Tag {\n\t\t[Key]\n\t\tpublic long Id {get;set;}\n\n}\n");
    }
}
