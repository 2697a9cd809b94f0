//! # CLI Configuration
//!
//! Optional YAML file passed with `--config`:
//!
//! ```yaml
//! data_dir: ./data
//! id_field: member_info.member_id
//! status_field: jkwi_info.status
//! division_field: jkwi_info.division
//! ```
//!
//! `--data-dir` (or `JKWI_DATA_DIR`) overrides `data_dir` from the file.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use jkwi_records::{EngineConfig, FieldPath};
use serde::Deserialize;

/// Data directory used when neither the flag nor the file names one.
pub const DEFAULT_DATA_DIR: &str = "./data";

/// Resolved CLI configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct CliConfig {
    pub data_dir: PathBuf,
    pub engine: EngineConfig,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    data_dir: Option<PathBuf>,
    id_field: Option<String>,
    status_field: Option<String>,
    division_field: Option<String>,
}

impl CliConfig {
    /// Merge the optional config file with the `--data-dir` override.
    pub fn load(file: Option<&Path>, data_dir: Option<PathBuf>) -> Result<Self> {
        let parsed = match file {
            Some(path) => {
                let content = std::fs::read_to_string(path)
                    .with_context(|| format!("failed to read config {}", path.display()))?;
                Self::parse_yaml(&content)
                    .with_context(|| format!("invalid config {}", path.display()))?
            }
            None => ConfigFile::default(),
        };
        Self::resolve(parsed, data_dir)
    }

    /// Parse a YAML config document with no command-line override.
    pub fn from_yaml(content: &str) -> Result<Self> {
        Self::resolve(Self::parse_yaml(content)?, None)
    }

    fn parse_yaml(content: &str) -> Result<ConfigFile> {
        if content.trim().is_empty() {
            return Ok(ConfigFile::default());
        }
        Ok(serde_yaml::from_str(content)?)
    }

    fn resolve(file: ConfigFile, data_dir: Option<PathBuf>) -> Result<Self> {
        let mut engine = EngineConfig::default();
        if let Some(path) = file.id_field {
            engine.id_field = FieldPath::parse(&path).context("invalid id_field")?;
        }
        if let Some(path) = file.status_field {
            engine.status_field = FieldPath::parse(&path).context("invalid status_field")?;
        }
        if let Some(path) = file.division_field {
            engine.division_field = FieldPath::parse(&path).context("invalid division_field")?;
        }
        let data_dir = data_dir
            .or(file.data_dir)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR));
        Ok(Self { data_dir, engine })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_without_file() {
        let config = CliConfig::load(None, None).unwrap();
        assert_eq!(config.data_dir, PathBuf::from(DEFAULT_DATA_DIR));
        assert_eq!(config.engine, EngineConfig::default());
    }

    #[test]
    fn yaml_overrides_field_paths() {
        let config = CliConfig::from_yaml(
            "data_dir: /srv/jkwi\nid_field: company_info.company_id\nstatus_field: company_info.status\n",
        )
        .unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/srv/jkwi"));
        assert_eq!(config.engine.id_field.to_string(), "company_info.company_id");
        assert_eq!(config.engine.status_field.to_string(), "company_info.status");
        assert_eq!(
            config.engine.division_field,
            EngineConfig::default().division_field
        );
    }

    #[test]
    fn flag_wins_over_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("jkwi.yaml");
        std::fs::write(&path, "data_dir: /from/file\n").unwrap();
        let config = CliConfig::load(Some(&path), Some(PathBuf::from("/from/flag"))).unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/from/flag"));
    }

    #[test]
    fn rejects_unknown_keys_and_bad_paths() {
        assert!(CliConfig::from_yaml("colour: blue\n").is_err());
        assert!(CliConfig::from_yaml("id_field: member_info..id\n").is_err());
    }

    #[test]
    fn empty_file_is_default() {
        let config = CliConfig::from_yaml("").unwrap();
        assert_eq!(config.engine, EngineConfig::default());
    }
}
