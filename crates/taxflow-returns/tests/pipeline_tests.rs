//! Integration tests for the return generation orchestrator.
//!
//! Collaborators are recording fakes so each test can assert exactly
//! which stages were called.

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::json;
use std::sync::Arc;
use taxflow_core::{keys, FactSet, TaxYear};
use taxflow_registry::CapabilityTable;
use taxflow_returns::{
    ArtifactKind, ArtifactReceipt, ComputedReturn, DocumentRenderer, DocumentSaver, Orchestrator,
    PipelineError, PipelineState, PrimaryTrigger, ReturnComputer, RunOutcome,
    SecondaryErrorPolicy, TriggerFailure,
};

// =============================================================================
// Fakes
// =============================================================================

#[derive(Default)]
struct Calls {
    primary: usize,
    secondary: usize,
    rendered: Vec<ArtifactKind>,
    saved: Vec<String>,
}

type Log = Arc<Mutex<Calls>>;

struct FakeComputer {
    log: Log,
    primary: Result<ComputedReturn, Vec<String>>,
    secondary: Option<ComputedReturn>,
    secondary_fault: bool,
}

#[async_trait]
impl ReturnComputer for FakeComputer {
    fn compute_primary(&self, _facts: &FactSet) -> Result<ComputedReturn, Vec<String>> {
        self.log.lock().primary += 1;
        self.primary.clone()
    }

    async fn compute_secondary(
        &self,
        _facts: &FactSet,
        primary: &ComputedReturn,
        year: TaxYear,
    ) -> anyhow::Result<Option<ComputedReturn>> {
        self.log.lock().secondary += 1;
        if self.secondary_fault {
            anyhow::bail!("state table missing for {}", year);
        }
        assert_eq!(primary.0["form"], "1040");
        Ok(self.secondary.clone())
    }
}

struct FakeRenderer {
    log: Log,
}

#[async_trait]
impl DocumentRenderer for FakeRenderer {
    async fn render(&self, kind: ArtifactKind, object: &ComputedReturn) -> anyhow::Result<Vec<u8>> {
        self.log.lock().rendered.push(kind);
        Ok(object.0.to_string().into_bytes())
    }
}

struct FakeSaver {
    log: Log,
    fail: bool,
}

#[async_trait]
impl DocumentSaver for FakeSaver {
    async fn save(&self, _bytes: &[u8], filename: &str) -> anyhow::Result<()> {
        if self.fail {
            anyhow::bail!("disk full");
        }
        self.log.lock().saved.push(filename.to_string());
        Ok(())
    }
}

struct FailingTrigger {
    failure: fn() -> TriggerFailure,
}

#[async_trait]
impl PrimaryTrigger for FailingTrigger {
    async fn create(&self, _facts: &FactSet, _filename: &str) -> Result<ArtifactReceipt, TriggerFailure> {
        Err((self.failure)())
    }
}

struct Harness {
    log: Log,
    orchestrator: Orchestrator,
}

fn harness(
    table: CapabilityTable,
    primary: Result<ComputedReturn, Vec<String>>,
    secondary: Option<ComputedReturn>,
) -> Harness {
    build(table, primary, secondary, false, false)
}

fn build(
    table: CapabilityTable,
    primary: Result<ComputedReturn, Vec<String>>,
    secondary: Option<ComputedReturn>,
    secondary_fault: bool,
    save_fails: bool,
) -> Harness {
    let log: Log = Arc::default();
    let orchestrator = Orchestrator::new(
        table,
        Arc::new(FakeComputer {
            log: log.clone(),
            primary,
            secondary,
            secondary_fault,
        }),
        Arc::new(FakeRenderer { log: log.clone() }),
        Arc::new(FakeSaver {
            log: log.clone(),
            fail: save_fails,
        }),
    );
    Harness { log, orchestrator }
}

fn federal() -> ComputedReturn {
    ComputedReturn(json!({ "form": "1040", "refund": 120 }))
}

fn state_return() -> ComputedReturn {
    ComputedReturn(json!({ "form": "IL-1040" }))
}

fn supported() -> CapabilityTable {
    CapabilityTable::new()
        .with_primary(TaxYear(2021))
        .with_secondary("IL", TaxYear(2021))
}

fn facts(year: u16, state: &str) -> FactSet {
    FactSet::for_year(TaxYear(year))
        .with_fact(keys::PRIMARY_SURNAME, "Doe")
        .with_fact(keys::STATE_RESIDENCY, state)
}

// =============================================================================
// Primary pipeline
// =============================================================================

#[tokio::test]
async fn test_primary_persists_under_surname() {
    let h = harness(supported(), Ok(federal()), None);

    let report = h.orchestrator.run_primary(&facts(2021, "IL")).await.unwrap();

    match &report.outcome {
        RunOutcome::Persisted { receipt } => assert_eq!(receipt.filename, "Doe-1040.pdf"),
        other => panic!("unexpected outcome {:?}", other),
    }
    assert_eq!(
        report.path,
        vec![
            PipelineState::Idle,
            PipelineState::ComputingPrimary,
            PipelineState::Persisted,
            PipelineState::Idle,
        ]
    );
    assert_eq!(h.log.lock().saved, vec!["Doe-1040.pdf"]);
}

#[tokio::test]
async fn test_primary_validation_errors_are_shown_and_nothing_is_saved() {
    let h = harness(supported(), Err(vec!["SSN missing".to_string()]), None);

    let report = h.orchestrator.run_primary(&facts(2021, "IL")).await.unwrap();

    assert_eq!(report.errors(), ["SSN missing"]);
    assert!(report.path.contains(&PipelineState::PrimaryFailed));
    assert_eq!(report.path.last(), Some(&PipelineState::Idle));
    assert!(h.log.lock().saved.is_empty());
    assert!(h.log.lock().rendered.is_empty());
    assert_eq!(
        h.orchestrator.board().errors(ArtifactKind::Primary),
        vec!["SSN missing"]
    );
}

#[tokio::test]
async fn test_primary_trigger_fault_is_propagated() {
    let h = harness(supported(), Ok(federal()), None);
    let orchestrator = h.orchestrator.with_trigger(Arc::new(FailingTrigger {
        failure: || TriggerFailure::Fault(anyhow::anyhow!("popup blocked")),
    }));

    let err = orchestrator.run_primary(&facts(2021, "IL")).await.unwrap_err();

    assert!(err.is_fault());
    assert!(err.to_string().contains("popup blocked"));
    assert!(orchestrator.board().errors(ArtifactKind::Primary).is_empty());
}

#[tokio::test]
async fn test_fault_clears_previously_displayed_errors() {
    let h = harness(supported(), Err(vec!["SSN missing".to_string()]), None);
    h.orchestrator.run_primary(&facts(2021, "IL")).await.unwrap();
    assert_eq!(h.orchestrator.board().errors(ArtifactKind::Primary), vec!["SSN missing"]);

    let orchestrator = h.orchestrator.with_trigger(Arc::new(FailingTrigger {
        failure: || TriggerFailure::Fault(anyhow::anyhow!("printer offline")),
    }));
    assert!(orchestrator.run_primary(&facts(2021, "IL")).await.is_err());

    assert!(orchestrator.board().errors(ArtifactKind::Primary).is_empty());
}

#[tokio::test]
async fn test_empty_validation_list_is_a_fault() {
    let h = harness(supported(), Ok(federal()), None);
    let orchestrator = h.orchestrator.with_trigger(Arc::new(FailingTrigger {
        failure: || TriggerFailure::Validation(vec![]),
    }));

    let err = orchestrator.run_primary(&facts(2021, "IL")).await.unwrap_err();
    assert!(matches!(err, PipelineError::Fault { stage: "primary", .. }));
}

#[tokio::test]
async fn test_primary_unavailable_for_unsupported_year() {
    let h = harness(supported(), Ok(federal()), None);

    let report = h.orchestrator.run_primary(&facts(2023, "IL")).await.unwrap();

    assert_eq!(
        report.outcome,
        RunOutcome::Unavailable {
            notice: "Support for federal return for 2023 is not yet available.".into()
        }
    );
    assert_eq!(report.path, vec![PipelineState::Idle]);
    assert_eq!(h.log.lock().primary, 0);
}

// =============================================================================
// Secondary pipeline
// =============================================================================

#[tokio::test]
async fn test_secondary_renders_and_persists() {
    let h = harness(supported(), Ok(federal()), Some(state_return()));

    let report = h.orchestrator.run_secondary(&facts(2021, "IL")).await.unwrap();

    match &report.outcome {
        RunOutcome::Persisted { receipt } => {
            assert_eq!(receipt.filename, "Doe-IL.pdf");
            assert_eq!(receipt.kind, ArtifactKind::Secondary);
        }
        other => panic!("unexpected outcome {:?}", other),
    }
    assert_eq!(
        report.path,
        vec![
            PipelineState::Idle,
            PipelineState::ComputingPrimary,
            PipelineState::ComputingSecondary,
            PipelineState::Rendering,
            PipelineState::Persisted,
            PipelineState::Idle,
        ]
    );
    assert_eq!(h.log.lock().rendered, vec![ArtifactKind::Secondary]);
}

#[tokio::test]
async fn test_secondary_not_offered_makes_no_calls() {
    let table = CapabilityTable::new().with_primary(TaxYear(2023));
    let h = harness(table, Ok(federal()), Some(state_return()));

    let offers = h.orchestrator.offers(&facts(2023, "TX")).unwrap();
    assert!(offers.primary.is_available());
    assert!(!offers.secondary.is_available());

    let report = h.orchestrator.run_secondary(&facts(2023, "TX")).await.unwrap();
    assert_eq!(
        report.outcome,
        RunOutcome::Unavailable {
            notice: "Support for TX return, year 2023 not yet available.".into()
        }
    );

    let calls = h.log.lock();
    assert_eq!(calls.primary, 0);
    assert_eq!(calls.secondary, 0);
}

#[tokio::test]
async fn test_no_secondary_object_is_silent() {
    let h = harness(supported(), Ok(federal()), None);

    let report = h.orchestrator.run_secondary(&facts(2021, "IL")).await.unwrap();

    assert_eq!(report.outcome, RunOutcome::Skipped);
    assert!(report.errors().is_empty());
    let calls = h.log.lock();
    assert_eq!(calls.secondary, 1);
    assert!(calls.rendered.is_empty());
    assert!(calls.saved.is_empty());
}

#[tokio::test]
async fn test_secondary_surfaces_primary_errors_by_default() {
    let h = harness(supported(), Err(vec!["W-2 wages missing".into()]), Some(state_return()));

    let report = h.orchestrator.run_secondary(&facts(2021, "IL")).await.unwrap();

    assert_eq!(report.errors(), ["W-2 wages missing"]);
    assert_eq!(h.log.lock().secondary, 0);
    assert_eq!(
        h.orchestrator.board().errors(ArtifactKind::Secondary),
        vec!["W-2 wages missing"]
    );
}

#[tokio::test]
async fn test_secondary_silent_policy_skips_without_errors() {
    let h = harness(supported(), Err(vec!["W-2 wages missing".into()]), Some(state_return()));
    let orchestrator = h.orchestrator.with_policy(SecondaryErrorPolicy::Silent);

    let report = orchestrator.run_secondary(&facts(2021, "IL")).await.unwrap();

    assert_eq!(report.outcome, RunOutcome::Skipped);
    assert!(orchestrator.board().errors(ArtifactKind::Secondary).is_empty());
    assert!(h.log.lock().saved.is_empty());
}

#[tokio::test]
async fn test_secondary_compute_fault_is_propagated() {
    let h = build(supported(), Ok(federal()), None, true, false);

    let err = h.orchestrator.run_secondary(&facts(2021, "IL")).await.unwrap_err();
    assert!(matches!(err, PipelineError::Fault { stage: "compute_secondary", .. }));
}

#[tokio::test]
async fn test_save_fault_is_propagated() {
    let h = build(supported(), Ok(federal()), Some(state_return()), false, true);

    let err = h.orchestrator.run_secondary(&facts(2021, "IL")).await.unwrap_err();
    assert!(matches!(err, PipelineError::Fault { stage: "save", .. }));
}

// =============================================================================
// Independence
// =============================================================================

#[tokio::test]
async fn test_both_pipelines_run_concurrently_with_separate_errors() {
    let h = harness(supported(), Err(vec!["SSN missing".into()]), None);
    let facts = facts(2021, "IL");

    let (primary, secondary) = tokio::join!(
        h.orchestrator.run_primary(&facts),
        h.orchestrator.run_secondary(&facts)
    );
    let primary = primary.unwrap();
    let secondary = secondary.unwrap();

    assert_ne!(primary.trace_id, secondary.trace_id);
    assert_eq!(primary.kind, ArtifactKind::Primary);
    assert_eq!(secondary.kind, ArtifactKind::Secondary);
    assert_eq!(primary.errors(), ["SSN missing"]);
    assert_eq!(secondary.errors(), ["SSN missing"]);
}
