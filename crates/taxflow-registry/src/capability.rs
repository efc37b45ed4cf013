//! Capability Table
//!
//! Static lookup of which artifact pipelines exist. A secondary (state)
//! pipeline is only ever reported available when the primary (federal)
//! pipeline for the same year is.
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use taxflow_core::TaxYear;
use thiserror::Error;

use crate::offer::{Offer, Offers};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("REGISTRY/IO/{0}")]
    Io(String),

    #[error("REGISTRY/PARSE/{0}")]
    Parse(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilityTable {
    /// Years with a primary-artifact pipeline
    #[serde(default)]
    pub primary_years: BTreeSet<TaxYear>,
    /// Jurisdiction -> years with a secondary-artifact pipeline
    #[serde(default)]
    pub secondary: BTreeMap<String, BTreeSet<TaxYear>>,
}

impl CapabilityTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_primary(mut self, year: TaxYear) -> Self {
        self.primary_years.insert(year);
        self
    }

    pub fn with_secondary(mut self, jurisdiction: impl Into<String>, year: TaxYear) -> Self {
        self.secondary.entry(jurisdiction.into()).or_default().insert(year);
        self
    }

    pub fn primary_available(&self, year: TaxYear) -> bool {
        self.primary_years.contains(&year)
    }

    pub fn secondary_available(&self, year: TaxYear, jurisdiction: &str) -> bool {
        self.primary_available(year)
            && self
                .secondary
                .get(jurisdiction)
                .map(|years| years.contains(&year))
                .unwrap_or(false)
    }

    /// Offers for `year`; a missing jurisdiction never offers a secondary return.
    pub fn offers(&self, year: TaxYear, jurisdiction: Option<&str>) -> Offers {
        let secondary = jurisdiction
            .map(|j| self.secondary_available(year, j))
            .unwrap_or(false);

        Offers {
            year,
            jurisdiction: jurisdiction.map(str::to_string),
            primary: Offer::primary(self.primary_available(year), year),
            secondary: Offer::secondary(secondary, year, jurisdiction),
        }
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, RegistryError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| RegistryError::Io(format!("{}: {}", path.display(), e)))?;

        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => serde_json::from_str(&content)
                .map_err(|e| RegistryError::Parse(e.to_string())),
            _ => Self::from_yaml(&content),
        }
    }

    pub fn from_yaml(yaml: &str) -> Result<Self, RegistryError> {
        serde_yaml::from_str(yaml).map_err(|e| RegistryError::Parse(e.to_string()))
    }

    /// Pipelines shipped with the default build
    pub fn builtin() -> Self {
        Self::new()
            .with_primary(TaxYear(2020))
            .with_primary(TaxYear(2021))
            .with_secondary("IL", TaxYear(2021))
    }
}
