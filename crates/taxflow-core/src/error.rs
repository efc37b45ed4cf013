//! Unified Error Model
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("STORE/CLOSED: fact store actor is no longer running")]
    Closed,
}
