//! Response reconciler
//!
//! On submit, answers to questions that are no longer required are not
//! dropped silently: they are turned into explicit tombstones so the merge
//! also removes any value previously stored under the same tag.

use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use taxflow_core::{FactPatch, FactSet, FactStore, InterviewStage, PatchValue, ResponseMap, StoreError};

use crate::catalog::Catalog;
use crate::resolver::required_tags;

/// Result of pruning a set of final responses
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reconciliation {
    /// Responses with every unrequired tag set to `Clear`
    pub responses: BTreeMap<String, PatchValue>,
    /// Tags that were cleared, in tag order
    pub cleared: Vec<String>,
}

impl Reconciliation {
    /// Recover the reconciliation from the response half of a merged patch.
    pub fn from_patch(patch: FactPatch) -> Self {
        let cleared = patch
            .responses
            .iter()
            .filter(|(_, value)| value.is_clear())
            .map(|(tag, _)| tag.clone())
            .collect();
        Self {
            responses: patch.responses,
            cleared,
        }
    }

    pub fn into_patch(self) -> FactPatch {
        FactPatch {
            facts: BTreeMap::new(),
            responses: self.responses,
        }
    }
}

/// Prune `final_responses` against the questions required for `snapshot`.
///
/// `snapshot` must already include `final_responses`. Clearing an answer can
/// make further questions inapplicable (a follow-up whose trigger was just
/// cleared), so pruning repeats until the surviving answers are all required
/// by the snapshot that contains exactly those answers.
pub fn reconcile(
    catalog: &Catalog,
    final_responses: &ResponseMap,
    snapshot: &FactSet,
) -> Reconciliation {
    let mut working = snapshot.clone();
    let mut pruned: HashSet<String> = HashSet::new();

    loop {
        let required: HashSet<&str> = required_tags(catalog, &working).into_iter().collect();
        let stale: Vec<String> = final_responses
            .tags()
            .filter(|tag| !pruned.contains(*tag) && !required.contains(tag))
            .map(str::to_string)
            .collect();

        if stale.is_empty() {
            break;
        }
        for tag in stale {
            working.responses.remove(&tag);
            pruned.insert(tag);
        }
    }

    let mut responses = BTreeMap::new();
    let mut cleared = Vec::new();

    for (tag, value) in final_responses.iter() {
        if pruned.contains(tag) {
            responses.insert(tag.to_string(), PatchValue::Clear);
            cleared.push(tag.to_string());
        } else {
            responses.insert(tag.to_string(), PatchValue::Set(value.clone()));
        }
    }

    Reconciliation { responses, cleared }
}

/// Outcome of a submitted interview page
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Submission {
    pub reconciliation: Reconciliation,
    pub stage: InterviewStage,
}

/// Reconcile `submitted` answers, merge them into `store` and advance.
///
/// The form is seeded with the stored answers, so the final responses are
/// the stored ones overlaid with whatever the user submitted. Reading the
/// stored answers and merging the pruned ones happen in a single store
/// update, so overlapping submissions each reconcile against the answers
/// the other one left behind.
pub async fn submit<S>(
    store: &S,
    catalog: &Catalog,
    submitted: &ResponseMap,
) -> Result<Submission, StoreError>
where
    S: FactStore + ?Sized,
{
    let catalog = catalog.clone();
    let submitted = submitted.clone();
    let applied = store
        .update(Box::new(move |stored: &FactSet| {
            let final_responses = stored.responses.overlay(&submitted);
            let snapshot = stored.with_tentative(&final_responses);
            reconcile(&catalog, &final_responses, &snapshot).into_patch()
        }))
        .await?;

    let reconciliation = Reconciliation::from_patch(applied);
    if !reconciliation.cleared.is_empty() {
        tracing::info!(cleared = ?reconciliation.cleared, "pruned unrequired answers");
    }

    let stage = store.advance_stage().await?;

    Ok(Submission {
        reconciliation,
        stage,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::default_catalog;

    #[test]
    fn test_keeps_required_answers() {
        let catalog = default_catalog();
        let responses = ResponseMap::new()
            .with("CRYPTO", false)
            .with("FOREIGN_ACCOUNT_EXISTS", true)
            .with("FINCEN_114", false);
        let snapshot = FactSet::new().with_responses(responses.clone());

        let result = reconcile(&catalog, &responses, &snapshot);
        assert!(result.cleared.is_empty());
        assert_eq!(result.responses.len(), 3);
    }

    #[test]
    fn test_clears_dependent_chain() {
        let catalog = default_catalog();
        let responses = ResponseMap::new()
            .with("FOREIGN_ACCOUNT_EXISTS", false)
            .with("FINCEN_114", true)
            .with("FINCEN_114_ACCOUNT_COUNTRY", "France");
        let snapshot = FactSet::new().with_responses(responses.clone());

        let result = reconcile(&catalog, &responses, &snapshot);
        assert_eq!(result.cleared, vec!["FINCEN_114", "FINCEN_114_ACCOUNT_COUNTRY"]);
        assert_eq!(result.responses["FINCEN_114"], PatchValue::Clear);
        assert_eq!(
            result.responses["FOREIGN_ACCOUNT_EXISTS"],
            PatchValue::Set(false.into())
        );
    }

    #[test]
    fn test_unknown_tags_are_cleared() {
        let catalog = default_catalog();
        let responses = ResponseMap::new().with("NOT_A_QUESTION", true);
        let snapshot = FactSet::new().with_responses(responses.clone());

        let result = reconcile(&catalog, &responses, &snapshot);
        assert_eq!(result.cleared, vec!["NOT_A_QUESTION"]);
    }
}
