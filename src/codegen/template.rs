use rust_embed::RustEmbed;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use crate::error::{GenerateError, Result};

pub const MODEL_TEMPLATE: &str = "ModelTemplate.txt";

/// Source of the text templates entities are rendered from.
pub trait TemplateProvider: Send + Sync {
    fn load_template(&self, name: &str) -> Result<String>;
}

#[derive(RustEmbed)]
#[folder = "templates/"]
struct Assets;

/// Templates compiled into the binary from `templates/`.
#[derive(Debug, Default, Clone, Copy)]
pub struct EmbeddedTemplates;

impl TemplateProvider for EmbeddedTemplates {
    fn load_template(&self, name: &str) -> Result<String> {
        let file = Assets::get(name).ok_or_else(|| GenerateError::TemplateNotFound(name.to_string()))?;
        Ok(String::from_utf8_lossy(&file.data).into_owned())
    }
}

/// Templates read from a directory on disk, for projects that ship their own.
#[derive(Debug, Clone)]
pub struct DirectoryTemplates {
    root: PathBuf,
}

impl DirectoryTemplates {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl TemplateProvider for DirectoryTemplates {
    fn load_template(&self, name: &str) -> Result<String> {
        let path = self.root.join(name);
        match fs::read_to_string(&path) {
            Ok(content) => Ok(content),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(GenerateError::TemplateNotFound(path.display().to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedded_model_template_has_all_placeholders() {
        let content = EmbeddedTemplates.load_template(MODEL_TEMPLATE).unwrap();
        for token in [
            "{GeneratorTime}",
            "{ModelsNamespace}",
            "{Author}",
            "{Comment}",
            "{ModelName}",
            "{ModelProperties}",
        ] {
            assert!(content.contains(token), "missing {token}");
        }
    }

    #[test]
    fn test_embedded_missing_template() {
        assert!(matches!(
            EmbeddedTemplates.load_template("Nope.txt"),
            Err(GenerateError::TemplateNotFound(name)) if name == "Nope.txt"
        ));
    }

    #[test]
    fn test_directory_templates() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(MODEL_TEMPLATE), "class {ModelName} {}").unwrap();

        let provider = DirectoryTemplates::new(dir.path());
        assert_eq!(provider.load_template(MODEL_TEMPLATE).unwrap(), "class {ModelName} {}");
        assert!(matches!(
            provider.load_template("Other.txt"),
            Err(GenerateError::TemplateNotFound(_))
        ));
    }
}
