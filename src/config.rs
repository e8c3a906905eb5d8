//! Application configuration management.

use std::path::{Path, PathBuf};

use color_eyre::Result;
use serde::Deserialize;
use thiserror::Error;
use tracing::warn;

use crate::library::TagKey;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// UI configuration
    #[serde(default)]
    pub ui: UiConfig,

    /// Candidate table columns, in display order
    #[serde(default = "default_columns")]
    pub columns: Vec<ColumnSpec>,
}

/// UI configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct UiConfig {
    /// Narrowest terminal the table is drawn in
    #[serde(default = "default_min_width")]
    pub min_width: u16,

    /// Shortest terminal the table is drawn in
    #[serde(default = "default_min_height")]
    pub min_height: u16,

    /// Width held back from column distribution for borders and padding
    #[serde(default = "default_margin")]
    pub margin: u16,

    /// Tag shown when previewing the selected file
    #[serde(default = "default_preview_field")]
    pub preview_field: TagKey,

    /// Text put in front of the previewed value
    #[serde(default = "default_preview_prefix")]
    pub preview_prefix: String,
}

/// Where a column takes its cell values from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnSource {
    /// The file name itself
    FilePath,
    /// A metadata tag
    Tag(TagKey),
}

/// One candidate table column.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ColumnSpec {
    /// Header text
    pub name: String,

    /// Share of the width relative to the other enabled columns
    pub weight: f64,

    /// Whether the column is shown
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Cell value source
    pub source: ColumnSource,
}

impl ColumnSpec {
    pub fn new(name: &str, weight: f64, enabled: bool, source: ColumnSource) -> Self {
        Self {
            name: name.to_string(),
            weight,
            enabled,
            source,
        }
    }
}

/// Reasons a configuration cannot be used.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("at least one column must be enabled")]
    NoEnabledColumns,

    #[error("column {name:?} has an invalid weight {weight}")]
    InvalidWeight { name: String, weight: f64 },

    #[error("min_width ({min_width}) must be larger than margin ({margin})")]
    MarginTooWide { min_width: u16, margin: u16 },
}

/// The built-in column registry.
pub fn default_columns() -> Vec<ColumnSpec> {
    vec![
        ColumnSpec::new("File", 0.20, true, ColumnSource::FilePath),
        ColumnSpec::new("Title", 0.30, true, ColumnSource::Tag(TagKey::Title)),
        ColumnSpec::new("Album", 0.20, true, ColumnSource::Tag(TagKey::Album)),
        ColumnSpec::new(
            "DiscNumber",
            0.20,
            false,
            ColumnSource::Tag(TagKey::DiscNumber),
        ),
    ]
}

fn default_min_width() -> u16 {
    20
}

fn default_min_height() -> u16 {
    8
}

fn default_margin() -> u16 {
    10
}

fn default_preview_field() -> TagKey {
    TagKey::Title
}

fn default_preview_prefix() -> String {
    String::from("Edit song: ")
}

fn default_true() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ui: UiConfig::default(),
            columns: default_columns(),
        }
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            min_width: default_min_width(),
            min_height: default_min_height(),
            margin: default_margin(),
            preview_field: default_preview_field(),
            preview_prefix: default_preview_prefix(),
        }
    }
}

impl Config {
    /// Get the configuration file path.
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("tagtable").join("config.toml"))
    }

    /// Load configuration from `path`, falling back to the defaults.
    ///
    /// A missing file is silently replaced; an unreadable or invalid one is
    /// logged first.
    pub fn load_or_default(path: Option<&Path>) -> Self {
        let Some(path) = path.filter(|p| p.exists()) else {
            return Self::default();
        };

        Self::read(path).unwrap_or_else(|e| {
            warn!("Using default configuration: {}", e);
            Self::default()
        })
    }

    /// Load and validate configuration from `path`.
    pub fn load_from(path: &Path) -> Result<Self> {
        Ok(Self::read(path)?)
    }

    fn read(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Config = toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        config.validate()?;

        Ok(config)
    }

    /// Check that the table can always be laid out with this configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.columns.iter().any(|c| c.enabled) {
            return Err(ConfigError::NoEnabledColumns);
        }

        if let Some(bad) = self
            .columns
            .iter()
            .find(|c| !(c.weight.is_finite() && c.weight > 0.0))
        {
            return Err(ConfigError::InvalidWeight {
                name: bad.name.clone(),
                weight: bad.weight,
            });
        }

        if self.ui.min_width <= self.ui.margin {
            return Err(ConfigError::MarginTooWide {
                min_width: self.ui.min_width,
                margin: self.ui.margin,
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.columns.iter().any(|c| c.enabled));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_default_columns() {
        let names: Vec<_> = default_columns()
            .iter()
            .filter(|c| c.enabled)
            .map(|c| c.name.clone())
            .collect();
        assert_eq!(names, vec!["File", "Title", "Album"]);
    }

    #[test]
    fn test_parse_partial_config() {
        let config: Config = toml::from_str(
            r#"
            [ui]
            margin = 4

            [[columns]]
            name = "Name"
            weight = 1.0
            source = "file_path"

            [[columns]]
            name = "Artist"
            weight = 2.0
            enabled = false
            source = { tag = "artist" }
            "#,
        )
        .unwrap();

        assert_eq!(config.ui.margin, 4);
        assert_eq!(config.ui.min_width, 20);
        assert_eq!(config.ui.preview_field, TagKey::Title);
        assert_eq!(config.columns.len(), 2);
        assert!(config.columns[0].enabled);
        assert_eq!(config.columns[0].source, ColumnSource::FilePath);
        assert_eq!(config.columns[1].source, ColumnSource::Tag(TagKey::Artist));
        assert!(!config.columns[1].enabled);
    }

    #[test]
    fn test_missing_columns_use_registry() {
        let config: Config = toml::from_str("[ui]\nmin_height = 12\n").unwrap();
        assert_eq!(config.columns, default_columns());
        assert_eq!(config.ui.min_height, 12);
    }

    #[test]
    fn test_validate_rejects_all_disabled() {
        let mut config = Config::default();
        for column in &mut config.columns {
            column.enabled = false;
        }
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NoEnabledColumns)
        ));
    }

    #[test]
    fn test_validate_rejects_bad_weight() {
        let mut config = Config::default();
        config.columns[1].weight = 0.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidWeight { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_wide_margin() {
        let mut config = Config::default();
        config.ui.margin = 20;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::MarginTooWide { .. })
        ));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[[columns]]\nname = \"File\"\nweight = 1.0\nenabled = false\nsource = \"file_path\"\n",
        )
        .unwrap();

        assert!(Config::load_from(&path).is_err());
    }

    #[test]
    fn test_read_reports_parse_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[ui\nmargin = ").unwrap();

        assert!(matches!(
            Config::read(&path),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn test_load_or_default_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let missing = Config::load_or_default(Some(path.as_path()));
        assert_eq!(missing.columns, default_columns());
        assert_eq!(Config::load_or_default(None).ui.margin, 10);

        std::fs::write(&path, "[ui]\nmargin = 30\n").unwrap();
        let invalid = Config::load_or_default(Some(path.as_path()));
        assert_eq!(invalid.ui.margin, 10);

        std::fs::write(&path, "[ui]\nmargin = 4\n").unwrap();
        assert_eq!(Config::load_or_default(Some(path.as_path())).ui.margin, 4);
    }
}
