//! Question descriptors and applicability predicates
//!
//! A question is asked only while its `Applicability` holds against the
//! current fact set. Predicates may read other questions' answers; the
//! catalog author keeps those references acyclic.

use serde::{Deserialize, Serialize};
use taxflow_core::{FactSet, FactValue};

/// Declared kind of an answer. Only the presentation shell dispatches on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    Boolean,
    Text,
}

/// Static definition of one interview question
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionDescriptor {
    /// Unique tag; also the key of the answer in the response map
    pub tag: String,

    /// Text shown to the user
    pub text: String,

    /// Kind of value the answer holds
    #[serde(rename = "valueKind", alias = "value_kind")]
    pub value_kind: ValueKind,

    /// When this question must be asked
    #[serde(rename = "appliesWhen", alias = "applies_when", default)]
    pub applies_when: Applicability,
}

impl QuestionDescriptor {
    pub fn new(tag: impl Into<String>, text: impl Into<String>, value_kind: ValueKind) -> Self {
        Self {
            tag: tag.into(),
            text: text.into(),
            value_kind,
            applies_when: Applicability::Always,
        }
    }

    pub fn boolean(tag: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(tag, text, ValueKind::Boolean)
    }

    pub fn text(tag: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(tag, text, ValueKind::Text)
    }

    pub fn when(mut self, condition: Applicability) -> Self {
        self.applies_when = condition;
        self
    }

    /// Whether this question is required for `facts`
    pub fn applies(&self, facts: &FactSet) -> bool {
        self.applies_when.holds(facts)
    }
}

/// Predicate over a fact set
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Applicability {
    /// Always asked
    #[default]
    Always,
    /// Another question's answer equals `value`
    AnswerIs { tag: String, value: FactValue },
    /// Another question was answered `true`
    AnswerTrue { tag: String },
    /// A fact equals `value`
    FactIs { key: String, value: FactValue },
    /// A fact is present
    FactPresent { key: String },
    /// Every condition holds
    All { of: Vec<Applicability> },
    /// At least one condition holds
    Any { of: Vec<Applicability> },
    /// The condition does not hold
    Not { condition: Box<Applicability> },
    /// Code-defined predicate (not serializable)
    #[serde(skip)]
    Custom(fn(&FactSet) -> bool),
}

impl Applicability {
    pub fn answer_true(tag: impl Into<String>) -> Self {
        Applicability::AnswerTrue { tag: tag.into() }
    }

    pub fn answer_is(tag: impl Into<String>, value: impl Into<FactValue>) -> Self {
        Applicability::AnswerIs {
            tag: tag.into(),
            value: value.into(),
        }
    }

    pub fn fact_is(key: impl Into<String>, value: impl Into<FactValue>) -> Self {
        Applicability::FactIs {
            key: key.into(),
            value: value.into(),
        }
    }

    pub fn fact_present(key: impl Into<String>) -> Self {
        Applicability::FactPresent { key: key.into() }
    }

    pub fn negate(self) -> Self {
        Applicability::Not {
            condition: Box::new(self),
        }
    }

    /// Evaluate against `facts`. Missing answers and facts never match.
    pub fn holds(&self, facts: &FactSet) -> bool {
        match self {
            Applicability::Always => true,
            Applicability::AnswerIs { tag, value } => facts.answer(tag) == Some(value),
            Applicability::AnswerTrue { tag } => {
                facts.answer(tag).and_then(FactValue::as_bool) == Some(true)
            }
            Applicability::FactIs { key, value } => facts.fact(key) == Some(value),
            Applicability::FactPresent { key } => facts.fact(key).is_some(),
            Applicability::All { of } => of.iter().all(|c| c.holds(facts)),
            Applicability::Any { of } => of.iter().any(|c| c.holds(facts)),
            Applicability::Not { condition } => !condition.holds(facts),
            Applicability::Custom(predicate) => predicate(facts),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use taxflow_core::ResponseMap;

    fn answered(tag: &str, value: impl Into<FactValue>) -> FactSet {
        FactSet::new().with_responses(ResponseMap::new().with(tag, value))
    }

    #[test]
    fn test_answer_true_requires_boolean_true() {
        let cond = Applicability::answer_true("FOREIGN_ACCOUNT_EXISTS");

        assert!(cond.holds(&answered("FOREIGN_ACCOUNT_EXISTS", true)));
        assert!(!cond.holds(&answered("FOREIGN_ACCOUNT_EXISTS", false)));
        assert!(!cond.holds(&answered("FOREIGN_ACCOUNT_EXISTS", "true")));
        assert!(!cond.holds(&FactSet::new()));
    }

    #[test]
    fn test_combinators() {
        let facts = answered("a", true).with_fact("filingStatus", "MFS");

        let all = Applicability::All {
            of: vec![
                Applicability::answer_true("a"),
                Applicability::fact_is("filingStatus", "MFS"),
            ],
        };
        let any = Applicability::Any {
            of: vec![
                Applicability::answer_true("missing"),
                Applicability::fact_present("filingStatus"),
            ],
        };

        assert!(all.holds(&facts));
        assert!(any.holds(&facts));
        assert!(!all.clone().negate().holds(&facts));
    }

    #[test]
    fn test_custom_predicate() {
        fn has_surname(facts: &FactSet) -> bool {
            facts.surname().is_some()
        }
        let cond = Applicability::Custom(has_surname);

        assert!(!cond.holds(&FactSet::new()));
        assert!(cond.holds(&FactSet::new().with_fact(taxflow_core::keys::PRIMARY_SURNAME, "Doe")));
    }

    #[test]
    fn test_descriptor_from_yaml() {
        let yaml = r#"
tag: FINCEN_114
text: Are you required to file FinCEN Form 114?
valueKind: boolean
appliesWhen:
  type: answer_true
  tag: FOREIGN_ACCOUNT_EXISTS
"#;
        let q: QuestionDescriptor = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(q.value_kind, ValueKind::Boolean);
        assert!(q.applies(&answered("FOREIGN_ACCOUNT_EXISTS", true)));
        assert!(!q.applies(&FactSet::new()));
    }
}
