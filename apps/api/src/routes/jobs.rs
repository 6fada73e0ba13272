//! Job search endpoints over the canonical `job_post` documents.

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use super::contains;
use crate::errors::AppError;
use crate::models::job::{JobDetail, JobSearchResponse, JobSummary};
use crate::state::AppState;

const SUMMARY_FIELDS: [&str; 9] = [
    "_id",
    "title_raw",
    "company_name",
    "locations",
    "categories",
    "levels",
    "posted_at",
    "url",
    "source",
];

const MAX_LIMIT: usize = 100;

fn default_limit() -> usize {
    25
}

#[derive(Debug, Deserialize)]
pub struct JobSearchParams {
    pub title: Option<String>,
    pub company: Option<String>,
    pub location: Option<String>,
    pub category: Option<String>,
    pub level: Option<String>,
    #[serde(default = "default_limit")]
    pub limit: usize,
    #[serde(default)]
    pub skip: usize,
}

fn search_selector(params: &JobSearchParams) -> Value {
    let mut selector = json!({ "type": "job_post" });
    if let Some(title) = &params.title {
        selector["title_raw"] = contains(title);
    }
    if let Some(company) = &params.company {
        selector["company_name"] = contains(company);
    }
    if let Some(location) = &params.location {
        selector["locations"] = json!({ "$elemMatch": contains(location) });
    }
    if let Some(category) = &params.category {
        selector["categories"] = json!({ "$elemMatch": contains(category) });
    }
    if let Some(level) = &params.level {
        selector["levels"] = json!({ "$elemMatch": contains(level) });
    }
    selector
}

/// GET /jobs/search
pub async fn search_jobs(
    State(state): State<AppState>,
    Query(params): Query<JobSearchParams>,
) -> Result<Json<JobSearchResponse>, AppError> {
    if params.limit == 0 || params.limit > MAX_LIMIT {
        return Err(AppError::Validation(format!(
            "limit must be between 1 and {MAX_LIMIT}"
        )));
    }

    let docs = state
        .store
        .find(
            search_selector(&params),
            Some(SUMMARY_FIELDS.as_slice()),
            params.limit,
            params.skip,
        )
        .await?;
    let jobs: Vec<JobSummary> = docs.iter().map(JobSummary::from_doc).collect();

    Ok(Json(JobSearchResponse {
        total_results: jobs.len(),
        jobs,
        limit: params.limit,
        skip: params.skip,
    }))
}

/// GET /jobs/:doc_id
pub async fn get_job_by_id(
    State(state): State<AppState>,
    Path(doc_id): Path<String>,
) -> Result<Json<JobDetail>, AppError> {
    let doc = state
        .store
        .get(&doc_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Job not found".to_string()))?;
    Ok(Json(JobDetail::from_doc(&doc)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> JobSearchParams {
        JobSearchParams {
            title: None,
            company: None,
            location: None,
            category: None,
            level: None,
            limit: 25,
            skip: 0,
        }
    }

    #[test]
    fn test_selector_without_filters_is_type_only() {
        let selector = search_selector(&params());
        assert_eq!(selector, json!({ "type": "job_post" }));
    }

    #[test]
    fn test_selector_with_filters() {
        let mut p = params();
        p.title = Some("Data Scientist".to_string());
        p.location = Some("New York".to_string());
        let selector = search_selector(&p);
        assert_eq!(selector["title_raw"]["$regex"], "(?i)Data Scientist");
        assert_eq!(
            selector["locations"]["$elemMatch"]["$regex"],
            "(?i)New York"
        );
    }
}
