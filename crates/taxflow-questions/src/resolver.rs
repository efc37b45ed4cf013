//! Question dependency resolver
//!
//! Computes which catalog questions are required for a fact snapshot.
//! Pure and synchronous: it is re-run by the shell on every edit, so the
//! same snapshot must always yield the same list in the same order.

use serde::Serialize;
use taxflow_core::{FactSet, ResponseMap};

use crate::catalog::Catalog;
use crate::question::{QuestionDescriptor, ValueKind};

/// Required questions for `facts`, in catalog order.
pub fn resolve<'c>(catalog: &'c Catalog, facts: &FactSet) -> Vec<&'c QuestionDescriptor> {
    catalog.iter().filter(|q| q.applies(facts)).collect()
}

/// Tags of the required questions, in catalog order.
pub fn required_tags<'c>(catalog: &'c Catalog, facts: &FactSet) -> Vec<&'c str> {
    resolve(catalog, facts)
        .into_iter()
        .map(|q| q.tag.as_str())
        .collect()
}

/// Resolve against stored facts with uncommitted answers layered on top.
pub fn preview<'c>(
    catalog: &'c Catalog,
    stored: &FactSet,
    tentative: &ResponseMap,
) -> Vec<&'c QuestionDescriptor> {
    resolve(catalog, &stored.with_tentative(tentative))
}

/// What the presentation shell needs to draw one required question.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuestionView {
    pub tag: String,
    pub text: String,
    #[serde(rename = "valueKind")]
    pub value_kind: ValueKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub answer: Option<taxflow_core::FactValue>,
}

/// Required questions paired with their current answers.
pub fn views(catalog: &Catalog, facts: &FactSet) -> Vec<QuestionView> {
    resolve(catalog, facts)
        .into_iter()
        .map(|q| QuestionView {
            tag: q.tag.clone(),
            text: q.text.clone(),
            value_kind: q.value_kind,
            answer: facts.answer(&q.tag).cloned(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{default_catalog, FILING_STATUS};

    #[test]
    fn test_default_catalog_initial_questions() {
        let catalog = default_catalog();
        let tags = required_tags(&catalog, &FactSet::new());

        assert_eq!(
            tags,
            vec!["CRYPTO", "FOREIGN_ACCOUNT_EXISTS", "FOREIGN_TRUST_RELATIONSHIP"]
        );
    }

    #[test]
    fn test_chain_unlocks_in_order() {
        let catalog = default_catalog();
        let facts = FactSet::new().with_responses(
            ResponseMap::new()
                .with("FOREIGN_ACCOUNT_EXISTS", true)
                .with("FINCEN_114", true),
        );

        let tags = required_tags(&catalog, &facts);
        assert_eq!(
            tags,
            vec![
                "CRYPTO",
                "FOREIGN_ACCOUNT_EXISTS",
                "FINCEN_114",
                "FINCEN_114_ACCOUNT_COUNTRY",
                "FOREIGN_TRUST_RELATIONSHIP",
            ]
        );
    }

    #[test]
    fn test_preview_uses_tentative_answers() {
        let catalog = default_catalog();
        let stored = FactSet::new()
            .with_responses(ResponseMap::new().with("FOREIGN_ACCOUNT_EXISTS", false));

        let tentative = ResponseMap::new().with("FOREIGN_ACCOUNT_EXISTS", true);
        let live = preview(&catalog, &stored, &tentative);

        assert!(live.iter().any(|q| q.tag == "FINCEN_114"));
        assert!(!required_tags(&catalog, &stored).contains(&"FINCEN_114"));
    }

    #[test]
    fn test_fact_driven_question() {
        let catalog = default_catalog();
        let facts = FactSet::new().with_fact(FILING_STATUS, "MFS");

        assert!(required_tags(&catalog, &facts).contains(&"LIVE_APART_FROM_SPOUSE"));
    }

    #[test]
    fn test_views_carry_answers() {
        let catalog = default_catalog();
        let facts = FactSet::new().with_responses(ResponseMap::new().with("CRYPTO", true));

        let views = views(&catalog, &facts);
        assert_eq!(views[0].tag, "CRYPTO");
        assert_eq!(views[0].answer, Some(true.into()));
        assert_eq!(views[1].answer, None);
    }
}
