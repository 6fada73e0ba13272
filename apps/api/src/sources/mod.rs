//! External data source clients. The run loop only sees the `JobFeed` and
//! `SalaryFeed` traits; concrete clients differ in endpoint shape, auth,
//! and pagination style.

pub mod arbeitnow;
pub mod muse;
pub mod salary;

use async_trait::async_trait;
use reqwest::RequestBuilder;
use serde_json::Value;
use thiserror::Error;

use crate::ingest::planner::{JobQuery, SalaryQuery};
use crate::models::JobPost;

pub use arbeitnow::ArbeitnowClient;
pub use muse::MuseClient;
pub use salary::SalaryClient;

/// Recoverable per-request failures. None of these abort a batch.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API returned status {0}")]
    Status(u16),

    #[error("Unexpected payload: {0}")]
    Payload(String),

    /// The API refuses page indexes past its hard ceiling. Normal terminal
    /// condition for one descriptor's pagination, not a failure.
    #[error("Page index past the API ceiling")]
    PageCeiling,
}

/// How a client authenticates requests. Selected at configuration time:
/// the job boards are public, the salary API wants an api key header.
pub trait RequestAuth: Send + Sync {
    fn apply(&self, request: RequestBuilder) -> RequestBuilder;
}

pub struct NoAuth;

impl RequestAuth for NoAuth {
    fn apply(&self, request: RequestBuilder) -> RequestBuilder {
        request
    }
}

pub struct ApiKeyAuth {
    key: String,
}

impl ApiKeyAuth {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }
}

impl RequestAuth for ApiKeyAuth {
    fn apply(&self, request: RequestBuilder) -> RequestBuilder {
        request.header("x-api-key", &self.key).header("Accept", "*/*")
    }
}

/// One page of normalized job documents plus whatever the source tells us
/// about the remaining pages.
#[derive(Debug, Clone)]
pub struct JobPage {
    pub docs: Vec<JobPost>,
    /// Total page count when the source reports one (Muse does).
    pub page_count: Option<u32>,
    /// Link-style "is there a next page" signal (Arbeitnow).
    pub has_next: bool,
    /// Total result count as reported by the source, if any.
    pub total: Option<u64>,
}

/// A paginated job board returning canonical `JobPost` documents.
#[async_trait]
pub trait JobFeed: Send + Sync {
    fn name(&self) -> &'static str;

    /// First valid page index for this source.
    fn first_page(&self) -> u32;

    /// Highest page index the source accepts, if it has a hard cap.
    fn page_ceiling(&self) -> Option<u32> {
        None
    }

    async fn fetch_page(
        &self,
        query: &JobQuery,
        page: u32,
        fetched_at: &str,
    ) -> Result<JobPage, SourceError>;
}

/// A salary benchmark source. A successful call may still carry no usable
/// data, which is a normal zero-document outcome.
#[async_trait]
pub trait SalaryFeed: Send + Sync {
    async fn fetch(&self, query: &SalaryQuery) -> Result<Option<Value>, SourceError>;
}
