//! Canonical `job_post` document and the API response shapes built from it.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Canonical job posting document. One per external listing, immutable once
/// stored; `_id = job_post:<source>:<external_id>` keeps re-runs idempotent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobPost {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "type")]
    pub doc_type: String,
    pub source: String,
    pub external_id: String,
    pub company_id: String,
    pub company_name: String,
    pub role_id: String,
    pub title_raw: String,
    pub description_raw: String,
    pub url: String,
    pub posted_at: String,
    pub fetched_at: String,
    pub locations: Vec<String>,
    pub categories: Vec<String>,
    pub levels: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub job_types: Vec<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub remote: bool,
}

impl JobPost {
    pub fn doc_id(source: &str, external_id: &str) -> String {
        format!("job_post:{source}:{external_id}")
    }
}

/// Compact listing returned by `/jobs/search`.
#[derive(Debug, Clone, Serialize)]
pub struct JobSummary {
    pub id: String,
    pub title: String,
    pub company: String,
    pub locations: Vec<String>,
    pub categories: Vec<String>,
    pub levels: Vec<String>,
    pub publication_date: String,
    pub landing_page_url: String,
}

/// Full listing returned by `/jobs/:id`, including the description text.
#[derive(Debug, Clone, Serialize)]
pub struct JobDetail {
    #[serde(flatten)]
    pub summary: JobSummary,
    pub description: String,
    pub source: String,
}

#[derive(Debug, Serialize)]
pub struct JobSearchResponse {
    pub total_results: usize,
    pub jobs: Vec<JobSummary>,
    pub limit: usize,
    pub skip: usize,
}

fn str_field(doc: &Value, key: &str) -> String {
    doc.get(key)
        .and_then(|v| v.as_str())
        .unwrap_or_default()
        .to_string()
}

fn list_field(doc: &Value, key: &str) -> Vec<String> {
    doc.get(key)
        .and_then(|v| v.as_array())
        .map(|items| {
            items
                .iter()
                .filter_map(|v| v.as_str())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

impl JobSummary {
    pub fn from_doc(doc: &Value) -> Self {
        JobSummary {
            id: str_field(doc, "_id"),
            title: str_field(doc, "title_raw"),
            company: str_field(doc, "company_name"),
            locations: list_field(doc, "locations"),
            categories: list_field(doc, "categories"),
            levels: list_field(doc, "levels"),
            publication_date: str_field(doc, "posted_at"),
            landing_page_url: str_field(doc, "url"),
        }
    }
}

impl JobDetail {
    pub fn from_doc(doc: &Value) -> Self {
        JobDetail {
            summary: JobSummary::from_doc(doc),
            description: str_field(doc, "description_raw"),
            source: str_field(doc, "source"),
        }
    }
}
