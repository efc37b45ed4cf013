//! Question catalog
//!
//! Fixed, ordered table of questions. Order is the order questions are
//! presented in; tags are unique across the catalog.

use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;

use crate::error::CatalogError;
use crate::question::{Applicability, QuestionDescriptor};

/// Catalog file format
#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    version: Option<String>,
    questions: Vec<QuestionDescriptor>,
}

#[derive(Debug, Clone)]
pub struct Catalog {
    version: String,
    questions: Vec<QuestionDescriptor>,
}

impl Catalog {
    /// Build a catalog, rejecting duplicate tags.
    pub fn new(questions: Vec<QuestionDescriptor>) -> Result<Self, CatalogError> {
        let mut seen = HashSet::new();
        for q in &questions {
            if q.tag.is_empty() {
                return Err(CatalogError::EmptyTag(q.text.clone()));
            }
            if !seen.insert(q.tag.as_str()) {
                return Err(CatalogError::DuplicateTag(q.tag.clone()));
            }
        }
        Ok(Self {
            version: "1.0".to_string(),
            questions,
        })
    }

    /// Load from a YAML or JSON file (chosen by extension, YAML otherwise)
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| CatalogError::Io(format!("{}: {}", path.display(), e)))?;

        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json(&content),
            _ => Self::from_yaml(&content),
        }
    }

    pub fn from_yaml(yaml: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile =
            serde_yaml::from_str(yaml).map_err(|e| CatalogError::Parse(e.to_string()))?;
        Self::from_file(file)
    }

    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile =
            serde_json::from_str(json).map_err(|e| CatalogError::Parse(e.to_string()))?;
        Self::from_file(file)
    }

    fn from_file(file: CatalogFile) -> Result<Self, CatalogError> {
        let mut catalog = Self::new(file.questions)?;
        if let Some(version) = file.version {
            catalog.version = version;
        }
        Ok(catalog)
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn get(&self, tag: &str) -> Option<&QuestionDescriptor> {
        self.questions.iter().find(|q| q.tag == tag)
    }

    /// Questions in declared order
    pub fn iter(&self) -> impl Iterator<Item = &QuestionDescriptor> {
        self.questions.iter()
    }

    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.questions.iter().map(|q| q.tag.as_str())
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }
}

impl Default for Catalog {
    fn default() -> Self {
        default_catalog()
    }
}

/// Filing status fact read by the spouse question
pub const FILING_STATUS: &str = "taxpayer.filingStatus";

/// Informational questions asked during the interview
pub fn default_catalog() -> Catalog {
    let questions = vec![
        QuestionDescriptor::boolean(
            "CRYPTO",
            "Do you have any crypto-currency?",
        ),
        QuestionDescriptor::boolean(
            "FOREIGN_ACCOUNT_EXISTS",
            "At any time during this year, did you have a financial interest in or \
             signature authority over a financial account such as a bank account, \
             securities account, or brokerage account located in a foreign country?",
        ),
        QuestionDescriptor::boolean(
            "FINCEN_114",
            "Are you required to file FinCEN Form 114, Report of Foreign Bank and \
             Financial Accounts (FBAR), to report that financial interest or \
             signature authority?",
        )
        .when(Applicability::answer_true("FOREIGN_ACCOUNT_EXISTS")),
        QuestionDescriptor::text(
            "FINCEN_114_ACCOUNT_COUNTRY",
            "Enter the name of the foreign country where the financial account is located",
        )
        .when(Applicability::answer_true("FINCEN_114")),
        QuestionDescriptor::boolean(
            "FOREIGN_TRUST_RELATIONSHIP",
            "During this tax year, did you receive a distribution from, or were you \
             the grantor of, or transferor to, a foreign trust?",
        ),
        QuestionDescriptor::boolean(
            "LIVE_APART_FROM_SPOUSE",
            "Did you live apart from your spouse for all of the tax year?",
        )
        .when(Applicability::fact_is(FILING_STATUS, "MFS")),
    ];

    // Tags above are distinct literals.
    Catalog {
        version: "1.0".to_string(),
        questions,
    }
}
