//! Taxflow Questions: catalog, dependency resolver and response reconciler
//!
//! # Flow
//!
//! ```text
//! FactSet (+ tentative answers) ──resolve──▶ required questions ──▶ form
//!                                                                    │
//! FactStore ◀──merge(tombstones)── reconcile ◀──submit(final answers)┘
//! ```
//!
//! # Example
//!
//! ```
//! use taxflow_core::{FactSet, ResponseMap};
//! use taxflow_questions::{default_catalog, reconcile, required_tags};
//!
//! let catalog = default_catalog();
//! let answers = ResponseMap::new()
//!     .with("FOREIGN_ACCOUNT_EXISTS", false)
//!     .with("FINCEN_114", true);
//! let snapshot = FactSet::new().with_responses(answers.clone());
//!
//! assert!(!required_tags(&catalog, &snapshot).contains(&"FINCEN_114"));
//!
//! let result = reconcile(&catalog, &answers, &snapshot);
//! assert_eq!(result.cleared, vec!["FINCEN_114"]);
//! ```

pub mod catalog;
pub mod error;
pub mod question;
pub mod reconciler;
pub mod resolver;

pub use catalog::{default_catalog, Catalog, FILING_STATUS};
pub use error::CatalogError;
pub use question::{Applicability, QuestionDescriptor, ValueKind};
pub use reconciler::{reconcile, submit, Reconciliation, Submission};
pub use resolver::{preview, required_tags, resolve, views, QuestionView};
