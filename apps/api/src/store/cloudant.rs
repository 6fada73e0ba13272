//! Cloudant REST client. Authenticates with an IBM Cloud IAM apikey,
//! exchanging it for a bearer token that is cached until close to expiry.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::sync::Mutex;
use tracing::debug;

use crate::config::CloudantConfig;
use crate::store::{DocumentStore, StoreError};

const IAM_TOKEN_URL: &str = "https://iam.cloud.ibm.com/identity/token";
const IAM_GRANT_TYPE: &str = "urn:ibm:params:oauth:grant-type:apikey";
/// Refresh the cached token this long before IAM says it expires.
const TOKEN_EXPIRY_SLACK: Duration = Duration::from_secs(60);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(45);

#[derive(Debug, Deserialize)]
struct IamTokenResponse {
    access_token: String,
    expires_in: u64,
}

#[derive(Debug, Deserialize)]
struct FindResponse {
    #[serde(default)]
    docs: Vec<Value>,
}

struct CachedToken {
    token: String,
    expires_at: Instant,
}

pub struct CloudantStore {
    client: Client,
    service_url: String,
    apikey: String,
    db_name: String,
    token: Mutex<Option<CachedToken>>,
}

impl CloudantStore {
    pub fn new(config: &CloudantConfig) -> Result<Self, StoreError> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            service_url: config.url.trim_end_matches('/').to_string(),
            apikey: config.apikey.clone(),
            db_name: config.db_name.clone(),
            token: Mutex::new(None),
        })
    }

    pub fn db_name(&self) -> &str {
        &self.db_name
    }

    fn doc_url(&self, doc_id: &str) -> String {
        // Document ids contain ':' which is fine unescaped, but '/' is not.
        let escaped = doc_id.replace('/', "%2F");
        format!("{}/{}/{}", self.service_url, self.db_name, escaped)
    }

    async fn bearer_token(&self) -> Result<String, StoreError> {
        let mut cached = self.token.lock().await;
        if let Some(t) = cached.as_ref() {
            if Instant::now() < t.expires_at {
                return Ok(t.token.clone());
            }
        }

        debug!("Exchanging Cloudant apikey for IAM bearer token");
        let resp = self
            .client
            .post(IAM_TOKEN_URL)
            .form(&[("grant_type", IAM_GRANT_TYPE), ("apikey", &self.apikey)])
            .send()
            .await?;
        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(StoreError::Auth(format!(
                "IAM token exchange failed (status {status}): {body}"
            )));
        }
        let token: IamTokenResponse = resp.json().await?;
        let lifetime = Duration::from_secs(token.expires_in)
            .saturating_sub(TOKEN_EXPIRY_SLACK);
        let value = token.access_token.clone();
        *cached = Some(CachedToken {
            token: token.access_token,
            expires_at: Instant::now() + lifetime,
        });
        Ok(value)
    }

    async fn error_from(resp: reqwest::Response) -> StoreError {
        let status = resp.status().as_u16();
        let body = resp.text().await.unwrap_or_default();
        StoreError::Status { status, body }
    }
}

#[async_trait]
impl DocumentStore for CloudantStore {
    async fn ensure_database(&self) -> Result<(), StoreError> {
        let token = self.bearer_token().await?;
        let url = format!("{}/{}", self.service_url, self.db_name);
        let resp = self.client.put(&url).bearer_auth(&token).send().await?;
        match resp.status() {
            s if s.is_success() => {
                tracing::info!("Created database: {}", self.db_name);
                Ok(())
            }
            // 412 Precondition Failed: database already exists.
            StatusCode::PRECONDITION_FAILED => Ok(()),
            _ => Err(Self::error_from(resp).await),
        }
    }

    async fn exists(&self, doc_id: &str) -> Result<bool, StoreError> {
        let token = self.bearer_token().await?;
        let resp = self
            .client
            .head(self.doc_url(doc_id))
            .bearer_auth(&token)
            .send()
            .await?;
        match resp.status() {
            s if s.is_success() => Ok(true),
            StatusCode::NOT_FOUND => Ok(false),
            _ => Err(Self::error_from(resp).await),
        }
    }

    async fn insert(&self, doc_id: &str, doc: &Value) -> Result<(), StoreError> {
        let token = self.bearer_token().await?;
        let resp = self
            .client
            .put(self.doc_url(doc_id))
            .bearer_auth(&token)
            .json(doc)
            .send()
            .await?;
        match resp.status() {
            s if s.is_success() => Ok(()),
            StatusCode::CONFLICT => Err(StoreError::Conflict(doc_id.to_string())),
            _ => Err(Self::error_from(resp).await),
        }
    }

    async fn get(&self, doc_id: &str) -> Result<Option<Value>, StoreError> {
        let token = self.bearer_token().await?;
        let resp = self
            .client
            .get(self.doc_url(doc_id))
            .bearer_auth(&token)
            .send()
            .await?;
        match resp.status() {
            s if s.is_success() => Ok(Some(resp.json().await?)),
            StatusCode::NOT_FOUND => Ok(None),
            _ => Err(Self::error_from(resp).await),
        }
    }

    async fn find(
        &self,
        selector: Value,
        fields: Option<&[&str]>,
        limit: usize,
        skip: usize,
    ) -> Result<Vec<Value>, StoreError> {
        let token = self.bearer_token().await?;
        let mut body = json!({
            "selector": selector,
            "limit": limit,
            "skip": skip,
        });
        if let Some(fields) = fields {
            body["fields"] = json!(fields);
        }
        let url = format!("{}/{}/_find", self.service_url, self.db_name);
        let resp = self
            .client
            .post(&url)
            .bearer_auth(&token)
            .json(&body)
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(Self::error_from(resp).await);
        }
        let found: FindResponse = resp.json().await?;
        Ok(found.docs)
    }
}
