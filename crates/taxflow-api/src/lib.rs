//! TAXFLOW API /v1: REST endpoints
//!
//! ```text
//! GET  /v1/health
//! GET  /v1/questions            required questions for stored facts
//! POST /v1/questions/preview    ... with uncommitted answers layered on
//! POST /v1/responses            reconcile, merge, advance
//! PUT  /v1/facts                external fact writes
//! GET  /v1/returns/offers       capability check, no side effects
//! POST /v1/returns/primary      federal pipeline
//! POST /v1/returns/secondary    state pipeline
//! GET  /v1/returns/errors       error lists on display
//! GET  /metrics
//! ```
pub mod computer;
pub mod config;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod state;

pub use computer::FactSheetComputer;
pub use config::{ApiConfig, ConfigError};
pub use state::AppState;

use axum::{
    routing::{get, post, put},
    Router,
};

pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route("/v1/health", get(handlers::health))
        .route("/v1/questions", get(handlers::list_questions))
        .route("/v1/questions/preview", post(handlers::preview_questions))
        .route("/v1/responses", post(handlers::submit_responses))
        .route("/v1/facts", put(handlers::put_facts))
        .route("/v1/returns/offers", get(handlers::offers))
        .route("/v1/returns/primary", post(handlers::create_primary))
        .route("/v1/returns/secondary", post(handlers::create_secondary))
        .route("/v1/returns/errors", get(handlers::displayed_errors))
        .route("/metrics", get(handlers::metrics))
        .layer(middleware::cors())
        .layer(middleware::trace())
        .with_state(state)
}

pub async fn run(config: ApiConfig) -> anyhow::Result<()> {
    let state = AppState::from_config(&config)?;
    let app = create_app(state);
    let listener = tokio::net::TcpListener::bind(&config.addr).await?;

    tracing::info!("Taxflow API listening on {}", config.addr);
    axum::serve(listener, app).await?;
    Ok(())
}
