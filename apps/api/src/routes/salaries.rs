//! Salary benchmark endpoints over the stored salary documents.

use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use super::contains;
use crate::errors::AppError;
use crate::models::salary::{SalaryRecord, SalaryResponse};
use crate::state::AppState;

const QUERY_LIMIT: usize = 200;

#[derive(Debug, Deserialize)]
pub struct ByLocationParams {
    pub job_title: String,
    pub location: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ByExperienceParams {
    pub job_title: String,
    pub location: Option<String>,
    pub years_of_experience: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ByCompanyParams {
    pub job_title: String,
    pub company: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CompareParams {
    pub job_title: String,
    /// Comma-separated city names.
    pub locations: Option<String>,
    /// Comma-separated company names.
    pub companies: Option<String>,
}

async fn query_salaries(state: &AppState, selector: Value) -> Result<SalaryResponse, AppError> {
    let docs = state.store.find(selector, None, QUERY_LIMIT, 0).await?;
    let records: Vec<SalaryRecord> = docs.iter().map(SalaryRecord::from_doc).collect();
    Ok(SalaryResponse {
        count: records.len(),
        data: records,
    })
}

fn by_location_selector(params: &ByLocationParams) -> Value {
    let mut selector = json!({
        "type": "salary_by_location",
        "job_title": contains(&params.job_title),
    });
    if let Some(location) = &params.location {
        selector["location"] = contains(location);
    }
    selector
}

fn by_experience_selector(params: &ByExperienceParams) -> Value {
    let mut selector = json!({
        "type": "salary_by_experience",
        "job_title": contains(&params.job_title),
    });
    // Experience brackets are canonical enum strings, matched exactly.
    if let Some(years) = &params.years_of_experience {
        selector["years_of_experience"] = json!(years);
    }
    if let Some(location) = &params.location {
        selector["location"] = contains(location);
    }
    selector
}

fn by_company_selector(params: &ByCompanyParams) -> Value {
    let mut selector = json!({
        "type": "salary_by_company",
        "job_title": contains(&params.job_title),
    });
    if let Some(company) = &params.company {
        selector["company"] = contains(company);
    }
    selector
}

/// Splits a comma-separated query value into trimmed, non-empty names.
fn split_names(raw: Option<&str>) -> Vec<String> {
    raw.map(|value| {
        value
            .split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .collect()
    })
    .unwrap_or_default()
}

fn compare_selector(params: &CompareParams) -> Result<Value, AppError> {
    let locations = split_names(params.locations.as_deref());
    let companies = split_names(params.companies.as_deref());
    if locations.is_empty() && companies.is_empty() {
        return Err(AppError::Validation(
            "Provide at least one of 'locations' or 'companies'".to_string(),
        ));
    }

    let mut clauses = Vec::new();
    if !locations.is_empty() {
        clauses.push(json!({
            "type": "salary_by_location",
            "job_title": contains(&params.job_title),
            "location": { "$in": locations },
        }));
    }
    if !companies.is_empty() {
        clauses.push(json!({
            "type": "salary_by_company",
            "job_title": contains(&params.job_title),
            "company": { "$in": companies },
        }));
    }

    Ok(if clauses.len() > 1 {
        json!({ "$or": clauses })
    } else {
        clauses.remove(0)
    })
}

/// GET /salaries/by-location. Omit `location` to compare all cities.
pub async fn by_location(
    State(state): State<AppState>,
    Query(params): Query<ByLocationParams>,
) -> Result<Json<SalaryResponse>, AppError> {
    Ok(Json(query_salaries(&state, by_location_selector(&params)).await?))
}

/// GET /salaries/by-experience. Omit filters to compare progression bands.
pub async fn by_experience(
    State(state): State<AppState>,
    Query(params): Query<ByExperienceParams>,
) -> Result<Json<SalaryResponse>, AppError> {
    Ok(Json(query_salaries(&state, by_experience_selector(&params)).await?))
}

/// GET /salaries/by-company. Omit `company` to compare all companies.
pub async fn by_company(
    State(state): State<AppState>,
    Query(params): Query<ByCompanyParams>,
) -> Result<Json<SalaryResponse>, AppError> {
    Ok(Json(query_salaries(&state, by_company_selector(&params)).await?))
}

/// GET /salaries/compare. Side-by-side lookup across cities and/or companies
/// for one role; rejects requests naming neither.
pub async fn compare(
    State(state): State<AppState>,
    Query(params): Query<CompareParams>,
) -> Result<Json<SalaryResponse>, AppError> {
    let selector = compare_selector(&params)?;
    Ok(Json(query_salaries(&state, selector).await?))
}
