//! Run Context: identity and timing of one pipeline invocation
use chrono::{DateTime, Utc};
use crate::facts::TaxYear;

#[derive(Debug, Clone)]
pub struct RunContext {
    pub trace_id: String,
    pub year: Option<TaxYear>,
    pub started_at: DateTime<Utc>,
}

impl RunContext {
    pub fn new(year: Option<TaxYear>) -> Self {
        Self {
            trace_id: uuid::Uuid::new_v4().to_string(),
            year,
            started_at: Utc::now(),
        }
    }

    pub fn elapsed_ms(&self) -> u64 {
        (Utc::now() - self.started_at).num_milliseconds().max(0) as u64
    }
}
