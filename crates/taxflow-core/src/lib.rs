//! Taxflow Core: fact model, response patches and the fact store contract
//!
//! Everything the interview learns lives in one `FactSet`. The question
//! resolver reads snapshots of it, the reconciler writes `FactPatch`es to
//! it through a `FactStore`, and the return pipeline only ever reads it.

pub mod context;
pub mod error;
pub mod facts;
pub mod store;

pub use context::RunContext;
pub use error::StoreError;
pub use facts::{keys, FactPatch, FactSet, FactValue, PatchValue, ResponseMap, TaxYear};
pub use store::{FactStore, InterviewStage, MemoryFactStore, PatchFn};

/// Taxflow engine version
pub const TAXFLOW_VERSION: &str = env!("CARGO_PKG_VERSION");
