//! The ingestion workflow: a planned sequence of external requests is
//! processed strictly in order, each response is normalized into canonical
//! documents, and every document is inserted only if its id is not already
//! present. Per-item failures are logged and counted, never fatal.

pub mod companies;
pub mod planner;
pub mod roles;
pub mod text;

use std::time::Duration;

use chrono::Utc;
use serde_json::Value;
use tracing::{info, warn};

use crate::errors::ConfigError;
use crate::ingest::planner::{JobQuery, RequestDescriptor, SalaryQuery};
use crate::models::{JobPost, SalaryDoc};
use crate::sources::{JobFeed, JobPage, SalaryFeed, SourceError};
use crate::store::{DocumentStore, StoreError};

pub fn now_iso() -> String {
    Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

/// Aggregate outcome of one batch run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunStats {
    /// Raw results successfully fetched from the external API.
    pub fetched: u64,
    /// New documents written to the collection.
    pub inserted: u64,
    /// Candidate documents whose id was already present.
    pub skipped: u64,
    /// Requests or document writes (company docs included) that failed and
    /// were passed over.
    pub failed: u64,
}

/// The source clients a run may need. A jobs-only run leaves `salaries`
/// unset and vice versa; using a descriptor with no matching client is a
/// configuration error.
#[derive(Default)]
pub struct Feeds<'a> {
    pub jobs: Option<&'a dyn JobFeed>,
    pub salaries: Option<&'a dyn SalaryFeed>,
}

/// Sequential fetch-dedupe-store executor for a planned request sequence.
pub struct BatchRunner {
    dry_run: bool,
    max_pages: Option<u32>,
    start_page: Option<u32>,
    page_pause: Duration,
    fetched_at: String,
}

impl BatchRunner {
    pub fn new(dry_run: bool, max_pages: Option<u32>) -> Self {
        Self {
            dry_run,
            max_pages,
            start_page: None,
            page_pause: Duration::from_secs(1),
            fetched_at: now_iso(),
        }
    }

    /// Overrides the feed's first page (resuming a partial crawl).
    pub fn start_page(mut self, page: u32) -> Self {
        self.start_page = Some(page);
        self
    }

    /// Pause between consecutive external requests. The sources are
    /// rate-limited per credential, so the default is a full second.
    pub fn page_pause(mut self, pause: Duration) -> Self {
        self.page_pause = pause;
        self
    }

    /// Processes the plan in order. A dry run logs each planned request and
    /// returns without touching the network or the store; `store` may then
    /// be `None`.
    pub async fn run(
        &self,
        plan: &[RequestDescriptor],
        feeds: &Feeds<'_>,
        store: Option<&dyn DocumentStore>,
    ) -> Result<RunStats, ConfigError> {
        let mut stats = RunStats::default();
        let total = plan.len();
        info!("Running {total} planned request(s)");

        if self.dry_run {
            for (i, descriptor) in plan.iter().enumerate() {
                info!("[{}/{total}] would fetch: {}", i + 1, descriptor.label());
            }
            info!("Dry run complete. No requests issued, nothing stored.");
            return Ok(stats);
        }

        let store = store.ok_or(ConfigError::MissingClient("document store"))?;

        for (i, descriptor) in plan.iter().enumerate() {
            info!("[{}/{total}] {}", i + 1, descriptor.label());
            match descriptor {
                RequestDescriptor::JobSearch(query) => {
                    let feed = feeds.jobs.ok_or(ConfigError::MissingClient("job feed"))?;
                    self.run_job_query(feed, query, store, &mut stats).await;
                }
                RequestDescriptor::Salary(query) => {
                    let feed = feeds
                        .salaries
                        .ok_or(ConfigError::MissingClient("salary feed"))?;
                    self.run_salary_query(feed, query, store, &mut stats).await;
                    if i + 1 < total {
                        tokio::time::sleep(self.page_pause).await;
                    }
                }
            }
        }

        info!(
            "Done. fetched={} inserted={} skipped={} failed={}",
            stats.fetched, stats.inserted, stats.skipped, stats.failed
        );
        Ok(stats)
    }

    async fn run_job_query(
        &self,
        feed: &dyn JobFeed,
        query: &JobQuery,
        store: &dyn DocumentStore,
        stats: &mut RunStats,
    ) {
        let start = self.start_page.unwrap_or_else(|| feed.first_page());
        let first = match feed.fetch_page(query, start, &self.fetched_at).await {
            Ok(page) => page,
            Err(e) => {
                warn!("  failed to fetch first page: {e}");
                stats.failed += 1;
                return;
            }
        };

        match first.page_count {
            Some(page_count) => {
                self.paginate_counted(feed, query, store, stats, first, page_count, start)
                    .await
            }
            None => self.paginate_cursor(feed, query, store, stats, first, start).await,
        }
    }

    /// Counted pagination: the first page reports the total page count,
    /// which we clamp to the API's page ceiling and the run's page cap.
    #[allow(clippy::too_many_arguments)]
    async fn paginate_counted(
        &self,
        feed: &dyn JobFeed,
        query: &JobQuery,
        store: &dyn DocumentStore,
        stats: &mut RunStats,
        first: JobPage,
        page_count: u32,
        start: u32,
    ) {
        let mut pages = page_count;
        if let Some(ceiling) = feed.page_ceiling() {
            // Pages start..=ceiling are the reachable window.
            let window = ceiling.saturating_sub(start) + 1;
            if pages > window {
                info!(
                    "  page ceiling at {ceiling}: {} page(s) unreachable",
                    pages - window
                );
            }
            pages = pages.min(window);
        }
        if let Some(max) = self.max_pages {
            pages = pages.min(max);
        }
        if let Some(total) = first.total {
            info!("  available: {total} result(s) across {page_count} page(s), fetching {pages}");
        }

        let mut first = Some(first);
        for offset in 0..pages {
            let page = match first.take() {
                Some(page) => page,
                None => {
                    tokio::time::sleep(self.page_pause).await;
                    match feed.fetch_page(query, start + offset, &self.fetched_at).await {
                        Ok(page) => page,
                        Err(SourceError::PageCeiling) => {
                            info!("  page ceiling reached, moving on");
                            break;
                        }
                        Err(e) => {
                            warn!("  [page {}/{pages}] {e}", offset + 1);
                            stats.failed += 1;
                            continue;
                        }
                    }
                }
            };
            self.store_jobs(page.docs, store, stats).await;
        }
    }

    /// Cursor pagination: keep following `has_next` until it goes away or
    /// the page cap is hit.
    async fn paginate_cursor(
        &self,
        feed: &dyn JobFeed,
        query: &JobQuery,
        store: &dyn DocumentStore,
        stats: &mut RunStats,
        first: JobPage,
        start: u32,
    ) {
        let mut next = Some(first);
        let mut pages_done: u32 = 0;
        while let Some(page) = next.take() {
            pages_done += 1;
            let JobPage { docs, has_next, .. } = page;
            self.store_jobs(docs, store, stats).await;

            if !has_next {
                break;
            }
            if self.max_pages.is_some_and(|max| pages_done >= max) {
                break;
            }
            let next_index = start + pages_done;
            if feed.page_ceiling().is_some_and(|ceiling| next_index > ceiling) {
                info!("  page ceiling reached, moving on");
                break;
            }
            tokio::time::sleep(self.page_pause).await;
            match feed.fetch_page(query, next_index, &self.fetched_at).await {
                Ok(page) => next = Some(page),
                Err(SourceError::PageCeiling) => {
                    info!("  page ceiling reached, moving on");
                    break;
                }
                Err(e) => {
                    warn!("  [page {next_index}] {e}");
                    stats.failed += 1;
                    break;
                }
            }
        }
    }

    async fn store_jobs(
        &self,
        docs: Vec<JobPost>,
        store: &dyn DocumentStore,
        stats: &mut RunStats,
    ) {
        for doc in docs {
            stats.fetched += 1;
            // The job document still goes in; the miss is counted so the
            // totals cover every store write.
            if let Err(e) = self.ensure_company(&doc, store).await {
                warn!("  {}: {e}", doc.company_id);
                stats.failed += 1;
            }
            let value = match serde_json::to_value(&doc) {
                Ok(value) => value,
                Err(e) => {
                    warn!("  {}: {e}", doc.id);
                    stats.failed += 1;
                    continue;
                }
            };
            match insert_if_absent(store, &doc.id, &value).await {
                Ok(true) => stats.inserted += 1,
                Ok(false) => stats.skipped += 1,
                Err(e) => {
                    warn!("  {}: {e}", doc.id);
                    stats.failed += 1;
                }
            }
        }
    }

    async fn ensure_company(
        &self,
        doc: &JobPost,
        store: &dyn DocumentStore,
    ) -> Result<(), StoreError> {
        let (doc_id, company) = companies::company_doc(&doc.company_name, &self.fetched_at);
        insert_if_absent(store, &doc_id, &company).await.map(|_| ())
    }

    async fn run_salary_query(
        &self,
        feed: &dyn SalaryFeed,
        query: &SalaryQuery,
        store: &dyn DocumentStore,
        stats: &mut RunStats,
    ) {
        let api_response = match feed.fetch(query).await {
            Ok(Some(api_response)) => api_response,
            Ok(None) => {
                // Fetched fine, just nothing usable in it.
                info!("  no data");
                stats.fetched += 1;
                return;
            }
            Err(e) => {
                warn!("  {e}");
                stats.failed += 1;
                return;
            }
        };
        stats.fetched += 1;

        let doc = SalaryDoc {
            id: query.doc_id(),
            doc_type: query.kind.doc_type().to_string(),
            job_title: query.job_title.clone(),
            location: query.location.clone(),
            years_of_experience: query.years_of_experience.clone(),
            company: query.company.clone(),
            api_response,
            fetched_at: self.fetched_at.clone(),
        };
        let value = match serde_json::to_value(&doc) {
            Ok(value) => value,
            Err(e) => {
                warn!("  {}: {e}", doc.id);
                stats.failed += 1;
                return;
            }
        };
        match insert_if_absent(store, &doc.id, &value).await {
            Ok(true) => stats.inserted += 1,
            Ok(false) => stats.skipped += 1,
            Err(e) => {
                warn!("  {}: {e}", doc.id);
                stats.failed += 1;
            }
        }
    }
}

/// The dedupe primitive: query for the id, insert only when absent.
/// Two concurrent runs can both see "absent" and race the insert; the
/// loser's `Conflict` is folded into the duplicate case.
async fn insert_if_absent(
    store: &dyn DocumentStore,
    doc_id: &str,
    doc: &Value,
) -> Result<bool, StoreError> {
    if store.exists(doc_id).await? {
        return Ok(false);
    }
    match store.insert(doc_id, doc).await {
        Ok(()) => Ok(true),
        Err(StoreError::Conflict(_)) => Ok(false),
        Err(e) => Err(e),
    }
}

/// Writes any missing canonical role documents. Existing ones are left
/// untouched. Returns how many were created.
pub async fn ensure_roles(store: &dyn DocumentStore) -> Result<usize, StoreError> {
    let now = now_iso();
    let mut created = 0;
    for role in &roles::DEFAULT_ROLES {
        let (doc_id, doc) = roles::role_doc(role, &now);
        if insert_if_absent(store, &doc_id, &doc).await? {
            created += 1;
        }
    }
    Ok(created)
}
