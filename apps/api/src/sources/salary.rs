//! The salary benchmark API (key required). Two endpoints: role + location
//! queries, and role + company queries. The loop never paginates here;
//! each query is a single shot.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;

use crate::ingest::planner::{SalaryKind, SalaryQuery};
use crate::sources::{ApiKeyAuth, RequestAuth, SalaryFeed, SourceError};

pub const SALARY_API_URL: &str = "https://api.openwebninja.com/job-salary-data/job-salary";
pub const COMPANY_SALARY_API_URL: &str =
    "https://api.openwebninja.com/job-salary-data/company-job-salary";

#[derive(Debug, Deserialize)]
struct SalaryApiResponse {
    #[serde(default)]
    status: String,
    #[serde(default)]
    data: Vec<Value>,
}

pub struct SalaryClient {
    http: Client,
    auth: ApiKeyAuth,
    salary_url: String,
    company_url: String,
}

impl SalaryClient {
    pub fn new(http: Client, api_key: impl Into<String>) -> Self {
        Self {
            http,
            auth: ApiKeyAuth::new(api_key),
            salary_url: SALARY_API_URL.to_string(),
            company_url: COMPANY_SALARY_API_URL.to_string(),
        }
    }

    fn params(query: &SalaryQuery) -> Vec<(&'static str, String)> {
        match query.kind {
            SalaryKind::ByCompany => vec![
                ("job_title", query.job_title.clone()),
                ("company", query.company.clone().unwrap_or_default()),
            ],
            _ => {
                let location = query.location.clone().unwrap_or_default();
                let location_type = if location == "Remote" { "COUNTRY" } else { "CITY" };
                vec![
                    ("job_title", query.job_title.clone()),
                    ("location", location),
                    ("location_type", location_type.to_string()),
                    (
                        "years_of_experience",
                        query
                            .years_of_experience
                            .clone()
                            .unwrap_or_else(|| "ONE_TO_THREE".to_string()),
                    ),
                ]
            }
        }
    }
}

#[async_trait]
impl SalaryFeed for SalaryClient {
    async fn fetch(&self, query: &SalaryQuery) -> Result<Option<Value>, SourceError> {
        let url = match query.kind {
            SalaryKind::ByCompany => &self.company_url,
            _ => &self.salary_url,
        };
        let request = self.http.get(url).query(&Self::params(query));
        let resp = self.auth.apply(request).send().await?;
        if !resp.status().is_success() {
            return Err(SourceError::Status(resp.status().as_u16()));
        }
        let payload: SalaryApiResponse = resp
            .json()
            .await
            .map_err(|e| SourceError::Payload(e.to_string()))?;

        if payload.status != "OK" {
            return Ok(None);
        }
        Ok(payload.data.into_iter().next())
    }
}
