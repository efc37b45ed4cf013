//! Server configuration from environment variables
//!
//! | Variable                   | Default         |
//! |----------------------------|-----------------|
//! | `TAXFLOW_ADDR`             | `0.0.0.0:8787`  |
//! | `TAXFLOW_OUTPUT_DIR`       | `./returns`     |
//! | `TAXFLOW_CATALOG`          | builtin catalog |
//! | `TAXFLOW_CAPABILITIES`     | builtin table   |
//! | `TAXFLOW_TEMPLATES`        | builtin set     |
//! | `TAXFLOW_ACTIVE_YEAR`      | none            |
//! | `TAXFLOW_SECONDARY_ERRORS` | `surface`       |

use std::path::PathBuf;
use taxflow_core::TaxYear;
use taxflow_returns::SecondaryErrorPolicy;
use thiserror::Error;

pub const DEFAULT_ADDR: &str = "0.0.0.0:8787";
pub const DEFAULT_OUTPUT_DIR: &str = "returns";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("CONFIG/INVALID/{name}: {value}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    pub addr: String,
    pub output_dir: PathBuf,
    pub catalog: Option<PathBuf>,
    pub capabilities: Option<PathBuf>,
    pub templates: Option<String>,
    pub active_year: Option<TaxYear>,
    pub secondary_errors: SecondaryErrorPolicy,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            addr: DEFAULT_ADDR.to_string(),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            catalog: None,
            capabilities: None,
            templates: None,
            active_year: None,
            secondary_errors: SecondaryErrorPolicy::default(),
        }
    }
}

impl ApiConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from any variable source; unset and empty values take defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let active_year = match var("TAXFLOW_ACTIVE_YEAR") {
            Some(raw) => Some(
                raw.trim()
                    .parse::<u16>()
                    .map(TaxYear)
                    .map_err(|_| ConfigError::Invalid {
                        name: "TAXFLOW_ACTIVE_YEAR",
                        value: raw.clone(),
                    })?,
            ),
            None => None,
        };

        let secondary_errors = match var("TAXFLOW_SECONDARY_ERRORS").as_deref().map(str::trim) {
            None => defaults.secondary_errors,
            Some("surface") => SecondaryErrorPolicy::Surface,
            Some("silent") => SecondaryErrorPolicy::Silent,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    name: "TAXFLOW_SECONDARY_ERRORS",
                    value: other.to_string(),
                })
            }
        };

        Ok(Self {
            addr: var("TAXFLOW_ADDR").unwrap_or(defaults.addr),
            output_dir: var("TAXFLOW_OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.output_dir),
            catalog: var("TAXFLOW_CATALOG").map(PathBuf::from),
            capabilities: var("TAXFLOW_CAPABILITIES").map(PathBuf::from),
            templates: var("TAXFLOW_TEMPLATES"),
            active_year,
            secondary_errors,
        })
    }
}
