use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::db::Dialect;
use crate::error::ConfigError;

/// Raw configuration as read from the JSON file and overlaid with CLI flags.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub connection_string: String,
    pub db_type: String,
    pub output_path: Option<PathBuf>,
    pub models_namespace: String,
    pub author: String,
    pub schema: Option<String>,
    pub template_dir: Option<PathBuf>,
    pub file_extension: String,
    pub tables: Vec<String>,
    pub exclude: Vec<String>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            connection_string: String::new(),
            db_type: String::new(),
            output_path: None,
            models_namespace: "Models".to_string(),
            author: String::new(),
            schema: None,
            template_dir: None,
            file_extension: ".cs".to_string(),
            tables: Vec::new(),
            exclude: Vec::new(),
        }
    }
}

impl GeneratorConfig {
    /// Loads the given file, or the per-user config file when no path is given.
    /// A missing per-user file yields the defaults; a missing explicit file is an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = match path {
            Some(path) => path.to_path_buf(),
            None => {
                let default_path = Self::get_config_path()?;
                if !default_path.exists() {
                    return Ok(Self::default());
                }
                default_path
            }
        };

        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("failed to read config file {}", config_path.display()))?;
        let config: GeneratorConfig = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse config file {}", config_path.display()))?;
        Ok(config)
    }

    fn get_config_path() -> Result<PathBuf> {
        let dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(dir.join("entity-gen").join("config.json"))
    }
}

/// Validated, immutable settings for one generation run.
#[derive(Debug, Clone)]
pub struct CodeGenerateOptions {
    pub connection_string: String,
    pub dialect: Dialect,
    pub output_path: PathBuf,
    pub models_namespace: String,
    pub author: String,
    pub schema: String,
    pub template_dir: Option<PathBuf>,
    pub file_extension: String,
    pub tables: Vec<String>,
    pub exclude: Vec<String>,
}

impl CodeGenerateOptions {
    /// Whether the include/exclude lists let `table` through. Comparison ignores case.
    pub fn selects_table(&self, table: &str) -> bool {
        let listed = |names: &[String]| names.iter().any(|n| n.eq_ignore_ascii_case(table));
        (self.tables.is_empty() || listed(&self.tables)) && !listed(&self.exclude)
    }
}

impl TryFrom<GeneratorConfig> for CodeGenerateOptions {
    type Error = ConfigError;

    fn try_from(config: GeneratorConfig) -> Result<Self, Self::Error> {
        if config.connection_string.trim().is_empty() {
            return Err(ConfigError::MissingConnectionString);
        }
        let dialect: Dialect = config.db_type.parse()?;

        // a blank path counts as unset
        let output_path = config
            .output_path
            .filter(|p| !p.as_os_str().to_string_lossy().trim().is_empty())
            .unwrap_or_else(base_directory);
        let file_extension = match config.file_extension.trim() {
            "" => ".cs".to_string(),
            ext if ext.starts_with('.') => ext.to_string(),
            ext => format!(".{ext}"),
        };

        Ok(Self {
            connection_string: config.connection_string,
            dialect,
            output_path,
            models_namespace: config.models_namespace,
            author: config.author,
            schema: config
                .schema
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| dialect.default_schema().to_string()),
            template_dir: config.template_dir,
            file_extension,
            tables: config.tables,
            exclude: config.exclude,
        })
    }
}

/// Directory of the running executable, falling back to the working directory.
fn base_directory() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
        .or_else(|| std::env::current_dir().ok())
        .unwrap_or_else(|| PathBuf::from("."))
}
