//! The Muse public jobs API. No auth; repeated `category=`/`level=`/
//! `location=` query params; 0-based pages with a hard cap, page >= 100 is
//! rejected with 400 Bad Request.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::ingest::companies;
use crate::ingest::planner::JobQuery;
use crate::ingest::roles::map_title_to_role_id;
use crate::ingest::text::strip_html;
use crate::models::JobPost;
use crate::sources::{JobFeed, JobPage, NoAuth, RequestAuth, SourceError};

pub const MUSE_API_URL: &str = "https://www.themuse.com/api/public/jobs";
/// The Muse API rejects page >= 100 with 400 Bad Request.
pub const MAX_API_PAGE: u32 = 99;

#[derive(Debug, Deserialize)]
struct MuseResponse {
    #[serde(default)]
    page_count: u32,
    #[serde(default)]
    total: u64,
    #[serde(default)]
    results: Vec<MuseJob>,
}

#[derive(Debug, Deserialize)]
struct MuseJob {
    id: Option<u64>,
    #[serde(default)]
    name: String,
    #[serde(default)]
    contents: String,
    #[serde(default)]
    publication_date: String,
    company: Option<MuseCompany>,
    refs: Option<MuseRefs>,
    #[serde(default)]
    locations: Vec<MuseNamed>,
    #[serde(default)]
    categories: Vec<MuseNamed>,
    #[serde(default)]
    levels: Vec<MuseNamed>,
}

#[derive(Debug, Deserialize)]
struct MuseCompany {
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MuseRefs {
    landing_page: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MuseNamed {
    name: Option<String>,
}

pub struct MuseClient {
    http: Client,
    auth: NoAuth,
    base_url: String,
}

impl MuseClient {
    pub fn new(http: Client) -> Self {
        Self {
            http,
            auth: NoAuth,
            base_url: MUSE_API_URL.to_string(),
        }
    }
}

fn names(items: Vec<MuseNamed>) -> Vec<String> {
    items.into_iter().filter_map(|n| n.name).filter(|n| !n.is_empty()).collect()
}

/// Transforms one Muse job into the canonical `job_post` document. Jobs
/// without an id are unusable and yield `None`.
fn job_to_doc(job: MuseJob, fetched_at: &str) -> Option<JobPost> {
    let muse_id = job.id?;
    let company_name = job
        .company
        .and_then(|c| c.name)
        .filter(|n| !n.trim().is_empty())
        .unwrap_or_else(|| "Unknown".to_string());
    Some(JobPost {
        id: JobPost::doc_id("themuse", &muse_id.to_string()),
        doc_type: "job_post".to_string(),
        source: "themuse".to_string(),
        external_id: muse_id.to_string(),
        company_id: companies::company_id(&company_name),
        role_id: map_title_to_role_id(&job.name),
        title_raw: job.name,
        description_raw: strip_html(&job.contents),
        url: job.refs.and_then(|r| r.landing_page).unwrap_or_default(),
        posted_at: job.publication_date,
        fetched_at: fetched_at.to_string(),
        locations: names(job.locations),
        categories: names(job.categories),
        levels: names(job.levels),
        job_types: Vec::new(),
        remote: false,
        company_name,
    })
}

#[async_trait]
impl JobFeed for MuseClient {
    fn name(&self) -> &'static str {
        "themuse"
    }

    fn first_page(&self) -> u32 {
        0
    }

    fn page_ceiling(&self) -> Option<u32> {
        Some(MAX_API_PAGE)
    }

    async fn fetch_page(
        &self,
        query: &JobQuery,
        page: u32,
        fetched_at: &str,
    ) -> Result<JobPage, SourceError> {
        if page > MAX_API_PAGE {
            return Err(SourceError::PageCeiling);
        }

        // The API accepts repeated category/level/location params.
        let mut params: Vec<(&str, String)> = vec![("page", page.to_string())];
        for c in &query.categories {
            params.push(("category", c.clone()));
        }
        for l in &query.levels {
            params.push(("level", l.clone()));
        }
        for loc in &query.locations {
            params.push(("location", loc.clone()));
        }

        let request = self.http.get(&self.base_url).query(&params);
        let resp = self.auth.apply(request).send().await?;
        if !resp.status().is_success() {
            return Err(SourceError::Status(resp.status().as_u16()));
        }
        let payload: MuseResponse = resp
            .json()
            .await
            .map_err(|e| SourceError::Payload(e.to_string()))?;

        Ok(JobPage {
            docs: payload
                .results
                .into_iter()
                .filter_map(|job| job_to_doc(job, fetched_at))
                .collect(),
            page_count: Some(payload.page_count.max(1)),
            has_next: false,
            total: Some(payload.total),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE_FIXTURE: &str = r#"{
        "page_count": 142,
        "total": 2830,
        "results": [
            {
                "id": 12345,
                "name": "Senior Backend Engineer",
                "contents": "<p>Build &amp; run services</p>",
                "publication_date": "2025-11-02T09:00:00Z",
                "company": {"name": "Acme Corp"},
                "refs": {"landing_page": "https://example.com/job/12345"},
                "locations": [{"name": "New York, NY"}],
                "categories": [{"name": "Software Engineering"}],
                "levels": [{"name": "Senior Level"}]
            },
            {
                "id": null,
                "name": "Ghost listing"
            },
            {
                "id": 999,
                "name": "Data Scientist",
                "company": null
            }
        ]
    }"#;

    #[test]
    fn test_page_fixture_normalizes() {
        let payload: MuseResponse = serde_json::from_str(PAGE_FIXTURE).unwrap();
        assert_eq!(payload.page_count, 142);
        let docs: Vec<JobPost> = payload
            .results
            .into_iter()
            .filter_map(|j| job_to_doc(j, "2025-11-03T00:00:00Z"))
            .collect();
        // The id-less listing is dropped.
        assert_eq!(docs.len(), 2);

        let first = &docs[0];
        assert_eq!(first.id, "job_post:themuse:12345");
        assert_eq!(first.company_id, "company:acme-corp");
        assert_eq!(first.role_id, "role:software-engineer");
        assert_eq!(first.description_raw, "Build & run services");
        assert_eq!(first.levels, vec!["Senior Level"]);

        // Missing company falls back to Unknown.
        let second = &docs[1];
        assert_eq!(second.company_name, "Unknown");
        assert_eq!(second.company_id, "company:unknown");
        assert_eq!(second.role_id, "role:data-scientist");
    }

    #[tokio::test]
    async fn test_page_past_ceiling_is_rejected_locally() {
        let client = MuseClient::new(Client::new());
        let query = JobQuery {
            categories: vec!["Software Engineering".to_string()],
            levels: vec![],
            locations: vec![],
        };
        let err = client
            .fetch_page(&query, MAX_API_PAGE + 1, "2025-11-03T00:00:00Z")
            .await
            .unwrap_err();
        assert!(matches!(err, SourceError::PageCeiling));
    }
}
