//! Project defaults from `stratus.toml`.
//!
//! ```toml
//! [build]
//! format = "yaml"
//! output = "template.yaml"
//!
//! [import]
//! output = "src/stack"
//! schema = "CloudFormationResourceSpecification.json"
//! package = "stratus_cfn"
//! ```
//!
//! Command-line flags take precedence over every value here.

use std::path::{Path, PathBuf};

use eyre::{Context, Result};
use serde::Deserialize;
use stratus_template::Format;

/// Looked up in the working directory when `--config` is not given.
pub const CONFIG_FILE: &str = "stratus.toml";

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub build: BuildConfig,
    #[serde(default)]
    pub import: ImportConfig,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BuildConfig {
    pub format: Option<Format>,
    pub output: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ImportConfig {
    pub output: Option<PathBuf>,
    pub schema: Option<PathBuf>,
    pub package: Option<String>,
}

impl Config {
    /// Load an explicit config file, or `stratus.toml` if it exists.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => {
                let default = PathBuf::from(CONFIG_FILE);
                if !default.exists() {
                    return Ok(Self::default());
                }
                default
            }
        };

        let content = std::fs::read_to_string(&path)
            .wrap_err_with(|| format!("failed to read '{}'", path.display()))?;
        let config = Self::parse(&content)
            .wrap_err_with(|| format!("invalid config '{}'", path.display()))?;
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_sections() {
        let config = Config::parse(
            r#"
            [build]
            format = "yaml"

            [import]
            output = "src/stack"
            package = "acme_cfn"
            "#,
        )
        .unwrap();

        assert_eq!(config.build.format, Some(Format::Yaml));
        assert_eq!(config.build.output, None);
        assert_eq!(config.import.output, Some(PathBuf::from("src/stack")));
        assert_eq!(config.import.package.as_deref(), Some("acme_cfn"));
    }

    #[test]
    fn test_empty_is_default() {
        let config = Config::parse("").unwrap();
        assert!(config.build.format.is_none());
        assert!(config.import.schema.is_none());
    }

    #[test]
    fn test_unknown_keys_rejected() {
        assert!(Config::parse("[build]\nlanguage = \"rust\"\n").is_err());
        assert!(Config::parse("[build]\nformat = \"xml\"\n").is_err());
    }

    #[test]
    fn test_load_explicit_file() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("custom.toml");
        std::fs::write(&path, "[import]\nschema = \"spec.json\"\n").unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.import.schema, Some(PathBuf::from("spec.json")));
    }

    #[test]
    fn test_load_missing_explicit_file_fails() {
        let temp = tempfile::TempDir::new().unwrap();
        assert!(Config::load(Some(&temp.path().join("missing.toml"))).is_err());
    }
}
