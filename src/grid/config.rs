// src/grid/config.rs

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::core::meta::DisplayHints;

/// Errors produced while loading or validating display configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file could not be read or written.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Config file is not valid TOML for this schema.
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    /// A value parsed but is out of its allowed range.
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Default file name written by `tgrid init`.
pub const DEFAULT_CONFIG_FILE: &str = "tgrid.toml";

/// File layout: everything lives under a `[display]` table.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct ConfigFile {
    #[serde(default)]
    display: GridConfig,
}

/// How tensors are printed as 2-D grids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// Fold an odd outer dimension into rows (true) or columns (false).
    pub fold_into_rows: bool,
    /// Decimal places for floats; `None` prints the shortest exact form.
    pub precision: Option<usize>,
    /// Tensors with more values than this print only their label.
    pub max_cells: usize,
    /// Draw row 0 at the top.
    pub top_zero: bool,
    /// Colored row labels and separators.
    pub color: bool,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            fold_into_rows: true,
            precision: None,
            max_cells: 1000,
            top_zero: true,
            color: true,
        }
    }
}

impl GridConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let file: ConfigFile = toml::from_str(text)?;
        file.display.validate()?;
        Ok(file.display)
    }

    /// Loads `path`; a missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            warn!(path = %path.display(), "config file not found, using defaults");
            return Ok(Self::default());
        }
        let text = fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        let file = ConfigFile {
            display: self.clone(),
        };
        Ok(toml::to_string_pretty(&file)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_cells == 0 {
            return Err(ConfigError::Invalid("max_cells must be >= 1".into()));
        }
        if let Some(p) = self.precision {
            if p > 17 {
                return Err(ConfigError::Invalid(format!(
                    "precision must be in 0..=17, got {}",
                    p
                )));
            }
        }
        Ok(())
    }

    /// Per-tensor metadata hints override the file settings.
    pub fn with_hints(&self, hints: &DisplayHints) -> Self {
        let mut cfg = self.clone();
        if let Some(odd_row) = hints.odd_row {
            cfg.fold_into_rows = odd_row;
        }
        if let Some(top_zero) = hints.top_zero {
            cfg.top_zero = top_zero;
        }
        if let Some(p) = hints.precision.filter(|&p| p <= 17) {
            cfg.precision = Some(p);
        }
        cfg
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_empty_file() {
        let cfg = GridConfig::from_toml_str("").unwrap();
        assert_eq!(cfg, GridConfig::default());
    }

    #[test]
    fn test_partial_display_table() {
        let cfg = GridConfig::from_toml_str("[display]\nfold_into_rows = false\nprecision = 3\n")
            .unwrap();
        assert!(!cfg.fold_into_rows);
        assert_eq!(cfg.precision, Some(3));
        assert_eq!(cfg.max_cells, 1000);
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(matches!(
            GridConfig::from_toml_str("[display]\nmax_cells = 0\n"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            GridConfig::from_toml_str("[display]\nmax_cells = \"lots\"\n"),
            Err(ConfigError::Toml(_))
        ));
    }

    #[test]
    fn test_to_toml_round_trip() {
        let cfg = GridConfig {
            precision: Some(4),
            color: false,
            ..GridConfig::default()
        };
        let text = cfg.to_toml().unwrap();
        assert!(text.contains("[display]"));
        assert_eq!(GridConfig::from_toml_str(&text).unwrap(), cfg);
    }

    #[test]
    fn test_hints_override() {
        let hints = DisplayHints {
            odd_row: Some(false),
            top_zero: Some(false),
            precision: Some(2),
            ..DisplayHints::default()
        };
        let cfg = GridConfig::default().with_hints(&hints);
        assert!(!cfg.fold_into_rows);
        assert!(!cfg.top_zero);
        assert_eq!(cfg.precision, Some(2));
    }
}
