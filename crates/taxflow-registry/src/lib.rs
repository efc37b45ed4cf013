//! Taxflow Registry: which return pipelines exist for a year and jurisdiction
pub mod capability;
pub mod offer;

pub use capability::{CapabilityTable, RegistryError};
pub use offer::{Offer, Offers};
