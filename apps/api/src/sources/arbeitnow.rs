//! The Arbeitnow job-board API. Public, no auth; `?limit=100&page=N` with
//! 1-based pages and a `links.next` cursor; timestamps are unix epochs.

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use reqwest::Client;
use serde::Deserialize;

use crate::ingest::companies;
use crate::ingest::planner::JobQuery;
use crate::ingest::roles::map_title_to_role_id;
use crate::ingest::text::strip_html;
use crate::models::JobPost;
use crate::sources::{JobFeed, JobPage, NoAuth, RequestAuth, SourceError};

pub const ARBEITNOW_API_URL: &str = "https://www.arbeitnow.com/api/job-board-api";
const PAGE_LIMIT: u32 = 100;

#[derive(Debug, Deserialize)]
struct ArbeitnowResponse {
    #[serde(default)]
    data: Vec<ArbeitnowJob>,
    links: Option<ArbeitnowLinks>,
}

#[derive(Debug, Deserialize)]
struct ArbeitnowLinks {
    next: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ArbeitnowJob {
    slug: Option<String>,
    #[serde(default)]
    title: String,
    #[serde(default)]
    description: String,
    company_name: Option<String>,
    location: Option<String>,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default)]
    job_types: Vec<String>,
    #[serde(default)]
    remote: bool,
    url: Option<String>,
    created_at: Option<i64>,
}

/// Converts a unix timestamp to ISO 8601, or empty when out of range.
fn unix_to_iso(ts: Option<i64>) -> String {
    match ts {
        Some(ts) => Utc
            .timestamp_opt(ts, 0)
            .single()
            .map(|dt| dt.format("%Y-%m-%dT%H:%M:%SZ").to_string())
            .unwrap_or_default(),
        None => String::new(),
    }
}

/// Transforms one Arbeitnow job into the canonical `job_post` document.
/// Jobs without a slug are unusable and yield `None`.
fn job_to_doc(job: ArbeitnowJob, fetched_at: &str) -> Option<JobPost> {
    let slug = job.slug.filter(|s| !s.is_empty())?;
    let company_name = job
        .company_name
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| "Unknown".to_string());
    Some(JobPost {
        id: JobPost::doc_id("arbeitnow", &slug),
        doc_type: "job_post".to_string(),
        source: "arbeitnow".to_string(),
        company_id: companies::company_id(&company_name),
        company_name,
        role_id: map_title_to_role_id(&job.title),
        title_raw: job.title,
        description_raw: strip_html(&job.description),
        url: job.url.unwrap_or_default(),
        posted_at: unix_to_iso(job.created_at),
        fetched_at: fetched_at.to_string(),
        locations: job.location.filter(|l| !l.is_empty()).into_iter().collect(),
        categories: job.tags,
        // Arbeitnow has no seniority field; job_types carries employment type.
        levels: Vec::new(),
        job_types: job.job_types,
        remote: job.remote,
        external_id: slug,
    })
}

pub struct ArbeitnowClient {
    http: Client,
    auth: NoAuth,
    base_url: String,
}

impl ArbeitnowClient {
    pub fn new(http: Client) -> Self {
        Self {
            http,
            auth: NoAuth,
            base_url: ARBEITNOW_API_URL.to_string(),
        }
    }
}

#[async_trait]
impl JobFeed for ArbeitnowClient {
    fn name(&self) -> &'static str {
        "arbeitnow"
    }

    fn first_page(&self) -> u32 {
        1
    }

    async fn fetch_page(
        &self,
        _query: &JobQuery,
        page: u32,
        fetched_at: &str,
    ) -> Result<JobPage, SourceError> {
        let request = self
            .http
            .get(&self.base_url)
            .query(&[("limit", PAGE_LIMIT), ("page", page)]);
        let resp = self.auth.apply(request).send().await?;
        if !resp.status().is_success() {
            return Err(SourceError::Status(resp.status().as_u16()));
        }
        let payload: ArbeitnowResponse = resp
            .json()
            .await
            .map_err(|e| SourceError::Payload(e.to_string()))?;

        let has_next = payload
            .links
            .as_ref()
            .and_then(|l| l.next.as_ref())
            .is_some();
        Ok(JobPage {
            docs: payload
                .data
                .into_iter()
                .filter_map(|job| job_to_doc(job, fetched_at))
                .collect(),
            page_count: None,
            has_next,
            total: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE_FIXTURE: &str = r#"{
        "data": [
            {
                "slug": "rust-engineer-berlin-42",
                "title": "Rust Engineer",
                "description": "<p>Ship &amp; maintain crates</p>",
                "company_name": "  Ferrous GmbH ",
                "location": "Berlin",
                "tags": ["Backend", "Rust"],
                "job_types": ["full time"],
                "remote": true,
                "url": "https://example.com/rust-engineer-berlin-42",
                "created_at": 1762128000
            },
            {
                "slug": null,
                "title": "Broken entry"
            }
        ],
        "links": {"next": "https://www.arbeitnow.com/api/job-board-api?page=2"},
        "meta": {"current_page": 1}
    }"#;

    #[test]
    fn test_page_fixture_normalizes() {
        let payload: ArbeitnowResponse = serde_json::from_str(PAGE_FIXTURE).unwrap();
        assert!(payload.links.as_ref().unwrap().next.is_some());

        let docs: Vec<JobPost> = payload
            .data
            .into_iter()
            .filter_map(|j| job_to_doc(j, "2025-11-03T00:00:00Z"))
            .collect();
        assert_eq!(docs.len(), 1); // slug-less entry dropped

        let doc = &docs[0];
        assert_eq!(doc.id, "job_post:arbeitnow:rust-engineer-berlin-42");
        assert_eq!(doc.company_name, "Ferrous GmbH");
        assert_eq!(doc.company_id, "company:ferrous-gmbh");
        assert_eq!(doc.description_raw, "Ship & maintain crates");
        assert_eq!(doc.posted_at, "2025-11-03T00:00:00Z");
        assert_eq!(doc.locations, vec!["Berlin"]);
        assert_eq!(doc.categories, vec!["Backend", "Rust"]);
        assert!(doc.levels.is_empty());
        assert!(doc.remote);
    }

    #[test]
    fn test_unix_to_iso() {
        assert_eq!(unix_to_iso(Some(0)), "1970-01-01T00:00:00Z");
        assert_eq!(unix_to_iso(None), "");
    }
}
