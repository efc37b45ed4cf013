//! Prometheus registry for pipeline runs
use prometheus::{Encoder, IntCounterVec, Opts, Registry, TextEncoder};
use taxflow_returns::{ArtifactKind, RunOutcome};

#[derive(Clone)]
pub struct Metrics {
    registry: Registry,
    runs: IntCounterVec,
}

impl Metrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();
        let runs = IntCounterVec::new(
            Opts::new("taxflow_pipeline_runs_total", "Return pipeline invocations"),
            &["kind", "outcome"],
        )?;
        registry.register(Box::new(runs.clone()))?;
        Ok(Self { registry, runs })
    }

    pub fn record(&self, kind: ArtifactKind, outcome: &str) {
        let kind = kind.to_string();
        self.runs.with_label_values(&[kind.as_str(), outcome]).inc();
    }

    pub fn count(&self, kind: ArtifactKind, outcome: &str) -> u64 {
        let kind = kind.to_string();
        self.runs.with_label_values(&[kind.as_str(), outcome]).get()
    }

    pub fn encode(&self) -> Result<String, prometheus::Error> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).to_string())
    }
}

/// Metric label for a finished run
pub fn outcome_label(outcome: &RunOutcome) -> &'static str {
    match outcome {
        RunOutcome::Unavailable { .. } => "unavailable",
        RunOutcome::Failed { .. } => "failed",
        RunOutcome::Skipped => "skipped",
        RunOutcome::Persisted { .. } => "persisted",
    }
}

pub const FAULT: &str = "fault";
