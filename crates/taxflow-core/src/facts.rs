//! Fact model: FactSet, ResponseMap, FactPatch
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Well-known fact keys read by the return pipeline.
pub mod keys {
    /// Surname of the primary taxpayer (used in artifact filenames)
    pub const PRIMARY_SURNAME: &str = "taxpayer.primary.lastName";
    /// First state of residency (the secondary jurisdiction)
    pub const STATE_RESIDENCY: &str = "stateResidencies.0.state";
}

/// A single fact or answer value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FactValue {
    Bool(bool),
    Text(String),
    Record(BTreeMap<String, FactValue>),
}

impl FactValue {
    pub fn text(value: impl Into<String>) -> Self {
        FactValue::Text(value.into())
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FactValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FactValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl From<bool> for FactValue {
    fn from(value: bool) -> Self {
        FactValue::Bool(value)
    }
}

impl From<&str> for FactValue {
    fn from(value: &str) -> Self {
        FactValue::Text(value.to_string())
    }
}

impl From<String> for FactValue {
    fn from(value: String) -> Self {
        FactValue::Text(value)
    }
}

/// Tax year the interview is collecting facts for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaxYear(pub u16);

impl fmt::Display for TaxYear {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Answers keyed by question tag.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResponseMap(BTreeMap<String, FactValue>);

impl ResponseMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, tag: impl Into<String>, value: impl Into<FactValue>) -> Self {
        self.insert(tag, value);
        self
    }

    pub fn insert(&mut self, tag: impl Into<String>, value: impl Into<FactValue>) {
        self.0.insert(tag.into(), value.into());
    }

    pub fn get(&self, tag: &str) -> Option<&FactValue> {
        self.0.get(tag)
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.0.contains_key(tag)
    }

    pub fn remove(&mut self, tag: &str) -> Option<FactValue> {
        self.0.remove(tag)
    }

    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FactValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Overlay `other` on top of `self`; keys in `other` win.
    pub fn overlay(&self, other: &ResponseMap) -> ResponseMap {
        let mut merged = self.0.clone();
        merged.extend(other.0.iter().map(|(k, v)| (k.clone(), v.clone())));
        ResponseMap(merged)
    }
}

impl FromIterator<(String, FactValue)> for ResponseMap {
    fn from_iter<I: IntoIterator<Item = (String, FactValue)>>(iter: I) -> Self {
        ResponseMap(iter.into_iter().collect())
    }
}

/// Patch entry. `Clear` is an explicit tombstone and serializes as `null`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PatchValue {
    Clear,
    Set(FactValue),
}

impl PatchValue {
    pub fn is_clear(&self) -> bool {
        matches!(self, PatchValue::Clear)
    }
}

/// Mergeable change set for the fact store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactPatch {
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub facts: BTreeMap<String, PatchValue>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub responses: BTreeMap<String, PatchValue>,
}

impl FactPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_fact(mut self, key: impl Into<String>, value: impl Into<FactValue>) -> Self {
        self.facts.insert(key.into(), PatchValue::Set(value.into()));
        self
    }

    pub fn clear_fact(mut self, key: impl Into<String>) -> Self {
        self.facts.insert(key.into(), PatchValue::Clear);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.facts.is_empty() && self.responses.is_empty()
    }
}

/// Snapshot of everything collected so far.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactSet {
    #[serde(default)]
    pub active_year: Option<TaxYear>,
    #[serde(default)]
    pub facts: BTreeMap<String, FactValue>,
    #[serde(default)]
    pub responses: ResponseMap,
}

impl FactSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn for_year(year: TaxYear) -> Self {
        Self {
            active_year: Some(year),
            ..Default::default()
        }
    }

    pub fn with_fact(mut self, key: impl Into<String>, value: impl Into<FactValue>) -> Self {
        self.facts.insert(key.into(), value.into());
        self
    }

    pub fn with_responses(mut self, responses: ResponseMap) -> Self {
        self.responses = responses;
        self
    }

    pub fn fact(&self, key: &str) -> Option<&FactValue> {
        self.facts.get(key)
    }

    pub fn answer(&self, tag: &str) -> Option<&FactValue> {
        self.responses.get(tag)
    }

    pub fn surname(&self) -> Option<&str> {
        self.fact(keys::PRIMARY_SURNAME).and_then(FactValue::as_str)
    }

    pub fn residency(&self) -> Option<&str> {
        self.fact(keys::STATE_RESIDENCY).and_then(FactValue::as_str)
    }

    /// Copy of this snapshot with uncommitted answers shadowing stored ones.
    pub fn with_tentative(&self, tentative: &ResponseMap) -> FactSet {
        FactSet {
            active_year: self.active_year,
            facts: self.facts.clone(),
            responses: self.responses.overlay(tentative),
        }
    }

    /// Merge a patch: `Set` overwrites, `Clear` deletes.
    pub fn apply(&mut self, patch: &FactPatch) {
        for (key, value) in &patch.facts {
            match value {
                PatchValue::Set(v) => {
                    self.facts.insert(key.clone(), v.clone());
                }
                PatchValue::Clear => {
                    self.facts.remove(key);
                }
            }
        }
        for (tag, value) in &patch.responses {
            match value {
                PatchValue::Set(v) => self.responses.insert(tag.clone(), v.clone()),
                PatchValue::Clear => {
                    self.responses.remove(tag);
                }
            }
        }
    }
}
