//! TAXFLOW-OUT: Document rendering and persistence
//!
//! Concrete collaborators for the return pipelines:
//!
//! ```text
//! ComputedReturn ──► TemplateRenderer ──► bytes ──► DirectorySaver ──► <dir>/<filename>
//! ```
//!
//! The renderer picks the `primary` or `secondary` template by artifact
//! kind; the saver writes into a single output directory.

pub mod renderer;
pub mod saver;
pub mod templates;

pub use renderer::TemplateRenderer;
pub use saver::DirectorySaver;
pub use templates::{Template, TemplatesFile};

use thiserror::Error;

/// Errors that can occur during rendering
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Template load failed: {0}")]
    Template(String),
    #[error("Template not found: {0}")]
    MissingTemplate(String),
    #[error("Render failed: {0}")]
    Render(String),
}
