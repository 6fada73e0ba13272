pub mod health;
pub mod jobs;
pub mod salaries;

use axum::{routing::get, Router};
use serde_json::{json, Value};

use crate::state::AppState;

/// Case-insensitive partial match selector.
pub(crate) fn contains(pattern: &str) -> Value {
    json!({ "$regex": format!("(?i){pattern}") })
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(health::root_handler))
        .route("/health", get(health::health_handler))
        .route("/jobs/search", get(jobs::search_jobs))
        .route("/jobs/:doc_id", get(jobs::get_job_by_id))
        .route("/salaries/by-location", get(salaries::by_location))
        .route("/salaries/by-experience", get(salaries::by_experience))
        .route("/salaries/by-company", get(salaries::by_company))
        .route("/salaries/compare", get(salaries::compare))
        .with_state(state)
}
