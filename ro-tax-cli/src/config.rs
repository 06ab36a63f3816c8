//! `ro-tax.toml` settings.
//!
//! ```toml
//! [database]
//! backend = "sqlite"
//! connection_string = "work_days.db"
//!
//! [logging]
//! level = "info"
//! file = "ro-tax.log"
//!
//! [[rules]]
//! tax_year = 2025
//! income_tax_rate = "0.10"
//! health_insurance_rate = "0.10"
//! social_insurance_rate = "0.25"
//! personal_deduction_annual = "3000"
//! social_insurance_ceiling = "140000"
//! ```
//!
//! Every section is optional.

use std::fs;
use std::path::{Path, PathBuf};

use ro_tax_core::{DbConfig, TaxRatesConfig, TaxRatesError, TaxRuleBook};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Looked up in the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "ro-tax.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid [[rules]] entry: {0}")]
    Rules(#[from] TaxRatesError),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub database: DbConfig,
    pub logging: LoggingConfig,
    pub rules: Vec<TaxRatesConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Bare level or full `EnvFilter` directive.
    pub level: Option<String>,
    /// Log file, appended to.
    pub file: Option<PathBuf>,
}

fn default_database() -> DbConfig {
    DbConfig {
        backend: "sqlite".to_string(),
        connection_string: "work_days.db".to_string(),
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database: default_database(),
            logging: LoggingConfig::default(),
            rules: Vec::new(),
        }
    }
}

impl AppConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Reads `path`, or [`DEFAULT_CONFIG_FILE`] when `path` is `None`.
    ///
    /// A missing default file yields the defaults; a missing explicit file
    /// is an error.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let (path, required) = match path {
            Some(path) => (path, true),
            None => (Path::new(DEFAULT_CONFIG_FILE), false),
        };

        if !required && !path.exists() {
            return Ok(Self::default());
        }

        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// The embedded rule book extended with every `[[rules]]` table.
    pub fn rule_book(&self) -> Result<TaxRuleBook, ConfigError> {
        self.rules
            .iter()
            .cloned()
            .try_fold(TaxRuleBook::default(), |book, table| book.with_table(table))
            .map_err(ConfigError::from)
    }
}
