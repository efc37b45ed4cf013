//! Router layers
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tower_http::classify::{ServerErrorsAsFailures, SharedClassifier};

pub fn cors() -> CorsLayer {
    CorsLayer::permissive()
}

pub fn trace() -> TraceLayer<SharedClassifier<ServerErrorsAsFailures>> {
    TraceLayer::new_for_http()
}
