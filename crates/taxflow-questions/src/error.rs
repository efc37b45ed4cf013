//! Catalog errors
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    #[error("CATALOG/DUPLICATE_TAG/{0}")]
    DuplicateTag(String),

    #[error("CATALOG/EMPTY_TAG: question \"{0}\" has no tag")]
    EmptyTag(String),

    #[error("CATALOG/IO/{0}")]
    Io(String),

    #[error("CATALOG/PARSE/{0}")]
    Parse(String),
}
