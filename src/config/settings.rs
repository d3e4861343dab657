//! TOML-based configuration for starpath.
//!
//! Supports a config file (starpath.toml) with environment variable expansion.
//!
//! Example configuration:
//! ```toml
//! [compiler]
//! dialect = "${WAREHOUSE_DIALECT}"
//! max_pivot_span = 500
//! surrogate_key = "id"
//!
//! [pivot]
//! value_key = "value"
//! check_sorted = false
//! ```

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::sql::Dialect;

/// Error type for settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Unsupported dialect: {0}")]
    UnsupportedDialect(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    /// Reference resolution and SQL rendering.
    pub compiler: CompilerSettings,

    /// Crosstab reshaping of result rows.
    pub pivot: PivotSettings,
}

/// Compiler settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CompilerSettings {
    /// Target dialect (duckdb, postgres, mysql, tsql). Supports ${ENV_VAR} expansion.
    pub dialect: String,

    /// Largest integer range a pivot column may enumerate.
    pub max_pivot_span: u64,

    /// Dimension primary key used in join predicates, and for grouping
    /// dimensions that have no original key.
    pub surrogate_key: String,
}

impl Default for CompilerSettings {
    fn default() -> Self {
        Self {
            dialect: "postgres".to_string(),
            max_pivot_span: 500,
            surrogate_key: "id".to_string(),
        }
    }
}

impl CompilerSettings {
    /// Get the dialect with environment variables expanded.
    pub fn dialect(&self) -> Result<Dialect, SettingsError> {
        let name = expand_env_vars(&self.dialect)?;
        name.parse()
            .map_err(|_| SettingsError::UnsupportedDialect(name.clone()))
    }
}

/// Pivot settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PivotSettings {
    /// Row key holding the cell value.
    pub value_key: String,

    /// Fail instead of fragmenting when input blocks are not contiguous.
    pub check_sorted: bool,
}

impl Default for PivotSettings {
    fn default() -> Self {
        Self {
            value_key: "value".to_string(),
            check_sorted: false,
        }
    }
}

impl Settings {
    /// Load settings from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(SettingsError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse and validate settings from TOML text.
    pub fn from_toml(content: &str) -> Result<Self, SettingsError> {
        let settings: Settings = toml::from_str(content)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from the default config file locations.
    ///
    /// Searches in order:
    /// 1. Environment variable `STARPATH_CONFIG`
    /// 2. `./starpath.toml`
    /// 3. `~/.config/starpath/config.toml`
    pub fn load() -> Result<Self, SettingsError> {
        if let Ok(path) = env::var("STARPATH_CONFIG") {
            return Self::from_file(&path);
        }

        let local_config = PathBuf::from("starpath.toml");
        if local_config.exists() {
            return Self::from_file(&local_config);
        }

        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("starpath").join("config.toml");
            if user_config.exists() {
                return Self::from_file(&user_config);
            }
        }

        Ok(Settings::default())
    }

    fn validate(&self) -> Result<(), SettingsError> {
        if self.compiler.surrogate_key.trim().is_empty() {
            return Err(SettingsError::InvalidConfig(
                "compiler.surrogate_key must not be empty".to_string(),
            ));
        }
        if self.pivot.value_key.is_empty() {
            return Err(SettingsError::InvalidConfig(
                "pivot.value_key must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Expand environment variables in a string.
///
/// Supports `${VAR}` and `$VAR` syntax.
pub fn expand_env_vars(s: &str) -> Result<String, SettingsError> {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '$' {
            result.push(c);
            continue;
        }

        let mut var_name = String::new();
        if chars.next_if_eq(&'{').is_some() {
            for ch in chars.by_ref() {
                if ch == '}' {
                    break;
                }
                var_name.push(ch);
            }
        } else {
            while let Some(ch) = chars.next_if(|ch| ch.is_alphanumeric() || *ch == '_') {
                var_name.push(ch);
            }
            if var_name.is_empty() {
                // Just a lone $, keep it
                result.push('$');
                continue;
            }
        }

        let value = env::var(&var_name).map_err(|_| SettingsError::MissingEnvVar(var_name))?;
        result.push_str(&value);
    }

    Ok(result)
}
