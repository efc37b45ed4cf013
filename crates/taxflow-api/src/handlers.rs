//! API Handlers
use axum::{extract::State, http::StatusCode, Json};
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use taxflow_core::{FactPatch, FactSet, PatchValue, ResponseMap, TAXFLOW_VERSION};
use taxflow_questions::{submit, views};
use taxflow_returns::{ArtifactKind, PipelineError, RunOutcome, RunReport};

use crate::metrics::{outcome_label, FAULT};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ResponsesRequest {
    #[serde(default)]
    pub responses: ResponseMap,
}

#[derive(Debug, Deserialize)]
pub struct FactsRequest {
    pub facts: BTreeMap<String, PatchValue>,
}

type Reply = (StatusCode, Json<Value>);

fn internal(error: impl std::fmt::Display) -> Reply {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": error.to_string() })),
    )
}

async fn snapshot(state: &AppState) -> Result<FactSet, Reply> {
    state.store.snapshot().await.map_err(internal)
}

pub async fn health(State(state): State<AppState>) -> Reply {
    (
        StatusCode::OK,
        Json(json!({
            "status": "ok",
            "version": TAXFLOW_VERSION,
            "catalog": state.catalog.version(),
        })),
    )
}

/// Questions required by the stored facts, with their stored answers
pub async fn list_questions(State(state): State<AppState>) -> Reply {
    let facts = match snapshot(&state).await {
        Ok(facts) => facts,
        Err(reply) => return reply,
    };
    (
        StatusCode::OK,
        Json(json!({ "questions": views(&state.catalog, &facts) })),
    )
}

/// Questions required once uncommitted answers are taken into account
pub async fn preview_questions(
    State(state): State<AppState>,
    Json(payload): Json<ResponsesRequest>,
) -> Reply {
    let stored = match snapshot(&state).await {
        Ok(facts) => facts,
        Err(reply) => return reply,
    };
    let tentative = stored.with_tentative(&payload.responses);
    (
        StatusCode::OK,
        Json(json!({ "questions": views(&state.catalog, &tentative) })),
    )
}

pub async fn submit_responses(
    State(state): State<AppState>,
    Json(payload): Json<ResponsesRequest>,
) -> Reply {
    let submission = match submit(state.store.as_ref(), &state.catalog, &payload.responses).await {
        Ok(submission) => submission,
        Err(e) => return internal(e),
    };
    let facts = match snapshot(&state).await {
        Ok(facts) => facts,
        Err(reply) => return reply,
    };

    (
        StatusCode::OK,
        Json(json!({
            "stage": submission.stage,
            "cleared": submission.reconciliation.cleared,
            "questions": views(&state.catalog, &facts),
        })),
    )
}

/// Fact writes from outside the interview (profile edits, imports)
pub async fn put_facts(
    State(state): State<AppState>,
    Json(payload): Json<FactsRequest>,
) -> Reply {
    let patch = FactPatch {
        facts: payload.facts,
        ..FactPatch::default()
    };
    if let Err(e) = state.store.merge(patch).await {
        return internal(e);
    }
    let facts = match snapshot(&state).await {
        Ok(facts) => facts,
        Err(reply) => return reply,
    };
    (
        StatusCode::OK,
        Json(json!({
            "facts": facts.facts,
            "questions": views(&state.catalog, &facts),
        })),
    )
}

pub async fn offers(State(state): State<AppState>) -> Reply {
    let facts = match snapshot(&state).await {
        Ok(facts) => facts,
        Err(reply) => return reply,
    };
    match state.orchestrator.offers(&facts) {
        Some(offers) => (StatusCode::OK, Json(json!(offers))),
        None => (
            StatusCode::OK,
            Json(json!({ "status": "unavailable", "notice": "No tax year is selected." })),
        ),
    }
}

pub async fn create_primary(State(state): State<AppState>) -> Reply {
    let facts = match snapshot(&state).await {
        Ok(facts) => facts,
        Err(reply) => return reply,
    };
    let result = state.orchestrator.run_primary(&facts).await;
    report_reply(&state, ArtifactKind::Primary, result)
}

pub async fn create_secondary(State(state): State<AppState>) -> Reply {
    let facts = match snapshot(&state).await {
        Ok(facts) => facts,
        Err(reply) => return reply,
    };
    let result = state.orchestrator.run_secondary(&facts).await;
    report_reply(&state, ArtifactKind::Secondary, result)
}

/// Error lists currently shown next to each action
pub async fn displayed_errors(State(state): State<AppState>) -> Reply {
    let board = state.orchestrator.board();
    (
        StatusCode::OK,
        Json(json!({
            "primary": board.errors(ArtifactKind::Primary),
            "secondary": board.errors(ArtifactKind::Secondary),
        })),
    )
}

pub async fn metrics(State(state): State<AppState>) -> (StatusCode, String) {
    match state.metrics.encode() {
        Ok(text) => (StatusCode::OK, text),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    }
}

fn report_reply(
    state: &AppState,
    kind: ArtifactKind,
    result: Result<RunReport, PipelineError>,
) -> Reply {
    match result {
        Ok(report) => {
            state.metrics.record(kind, outcome_label(&report.outcome));
            let status = match report.outcome {
                RunOutcome::Failed { .. } => StatusCode::UNPROCESSABLE_ENTITY,
                _ => StatusCode::OK,
            };
            (status, Json(json!(report)))
        }
        Err(e) => {
            state.metrics.record(kind, FAULT);
            internal(e)
        }
    }
}
