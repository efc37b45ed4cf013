//! Offers: what the shell may show for each artifact action
use serde::{Deserialize, Serialize};
use taxflow_core::TaxYear;

/// Either an action the user can trigger or an informational notice.
/// Unavailability is not an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Offer {
    Available { label: String },
    Unavailable { notice: String },
}

impl Offer {
    pub fn is_available(&self) -> bool {
        matches!(self, Offer::Available { .. })
    }

    pub fn notice(&self) -> Option<&str> {
        match self {
            Offer::Unavailable { notice } => Some(notice),
            Offer::Available { .. } => None,
        }
    }

    pub(crate) fn primary(available: bool, year: TaxYear) -> Self {
        if available {
            Offer::Available {
                label: "Create Federal 1040".to_string(),
            }
        } else {
            Offer::Unavailable {
                notice: format!("Support for federal return for {} is not yet available.", year),
            }
        }
    }

    pub(crate) fn secondary(available: bool, year: TaxYear, jurisdiction: Option<&str>) -> Self {
        match jurisdiction {
            Some(j) if available => Offer::Available {
                label: format!("Create {} Return", j),
            },
            _ => Offer::Unavailable {
                notice: format!(
                    "Support for {} return, year {} not yet available.",
                    jurisdiction.unwrap_or("state"),
                    year
                ),
            },
        }
    }
}

/// Both actions for one year/jurisdiction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Offers {
    pub year: TaxYear,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jurisdiction: Option<String>,
    pub primary: Offer,
    pub secondary: Offer,
}
