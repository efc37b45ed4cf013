//! Demonstration return computer
//!
//! Produces a fact sheet rather than a real tax computation: every stored
//! fact and answer becomes one line of the document. It exists so the
//! server can run end to end without a domain engine plugged in.

use async_trait::async_trait;
use serde_json::{json, Map, Value};
use taxflow_core::{FactSet, TaxYear};
use taxflow_returns::{ComputedReturn, ReturnComputer};

pub const MISSING_SURNAME: &str = "Primary taxpayer last name is required.";

#[derive(Debug, Clone, Default)]
pub struct FactSheetComputer;

impl FactSheetComputer {
    pub fn new() -> Self {
        Self
    }

    fn lines(facts: &FactSet) -> Value {
        let mut lines = Map::new();
        for (key, value) in &facts.facts {
            lines.insert(key.clone(), json!(value));
        }
        for (tag, value) in facts.responses.iter() {
            lines.insert(tag.to_string(), json!(value));
        }
        Value::Object(lines)
    }
}

#[async_trait]
impl ReturnComputer for FactSheetComputer {
    fn compute_primary(&self, facts: &FactSet) -> Result<ComputedReturn, Vec<String>> {
        let surname = match facts.surname() {
            Some(s) if !s.trim().is_empty() => s,
            _ => return Err(vec![MISSING_SURNAME.to_string()]),
        };

        Ok(ComputedReturn(json!({
            "form": "1040",
            "year": facts.active_year,
            "surname": surname,
            "lines": Self::lines(facts),
        })))
    }

    async fn compute_secondary(
        &self,
        facts: &FactSet,
        primary: &ComputedReturn,
        year: TaxYear,
    ) -> anyhow::Result<Option<ComputedReturn>> {
        let Some(jurisdiction) = facts.residency() else {
            return Ok(None);
        };

        Ok(Some(ComputedReturn(json!({
            "form": format!("{}-1040", jurisdiction),
            "year": year,
            "surname": primary.0["surname"],
            "jurisdiction": jurisdiction,
            "lines": primary.0["lines"],
        }))))
    }
}
