// src/clients/apify.rs
//! Minimal Apify REST client: start an actor run, long-poll it, read its dataset.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use crate::config::SearchSettings;

pub type ApifyResult<T> = std::result::Result<T, ApifyError>;

#[derive(Debug, Error)]
pub enum ApifyError {
    #[error("apify transport: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("apify responded {status}: {body}")]
    Status { status: u16, body: String },

    #[error("apify payload: {0}")]
    Payload(#[from] serde_json::Error),

    #[error("actor run {run_id} ended as {status}")]
    RunEnded { run_id: String, status: String },
}

/// Structured scrape capability: run a named actor with a JSON input, get its records.
#[async_trait]
pub trait ActorRunner: Send + Sync {
    async fn run_actor(&self, actor_id: &str, input: &Value) -> anyhow::Result<Vec<Value>>;
}

#[derive(Debug, Clone, Deserialize)]
struct ApiResponse<T> {
    data: T,
}

/// Apify actor run metadata.
#[derive(Debug, Clone, Deserialize)]
pub struct RunData {
    pub id: String,
    pub status: String,
    #[serde(rename = "defaultDatasetId")]
    pub default_dataset_id: String,
}

pub struct ApifyClient {
    client: reqwest::Client,
    token: String,
    base_url: String,
}

impl ApifyClient {
    pub fn new(token: &str, settings: &SearchSettings) -> ApifyResult<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(settings.http_timeout_secs))
            .build()?;
        Ok(Self {
            client,
            token: token.to_string(),
            base_url: settings.apify_base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn check<T: serde::de::DeserializeOwned>(resp: reqwest::Response) -> ApifyResult<T> {
        let status = resp.status();
        if !status.is_success() {
            return Err(ApifyError::Status {
                status: status.as_u16(),
                body: resp.text().await.unwrap_or_default(),
            });
        }
        let bytes = resp.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Start an actor run. Returns immediately with run metadata.
    pub async fn start_run(&self, actor_id: &str, input: &Value) -> ApifyResult<RunData> {
        let url = format!("{}/acts/{}/runs", self.base_url, actor_id);
        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.token)
            .json(input)
            .send()
            .await?;
        let api: ApiResponse<RunData> = Self::check(resp).await?;
        Ok(api.data)
    }

    /// Poll until a run completes. Uses `waitForFinish=60` for long-polling.
    pub async fn wait_for_run(&self, run_id: &str) -> ApifyResult<RunData> {
        loop {
            let url = format!("{}/actor-runs/{}?waitForFinish=60", self.base_url, run_id);
            let resp = self
                .client
                .get(&url)
                .bearer_auth(&self.token)
                .send()
                .await?;
            let api: ApiResponse<RunData> = Self::check(resp).await?;
            match api.data.status.as_str() {
                "SUCCEEDED" => return Ok(api.data),
                "FAILED" | "ABORTED" | "TIMED-OUT" => {
                    return Err(ApifyError::RunEnded {
                        run_id: run_id.to_string(),
                        status: api.data.status,
                    });
                }
                _ => {
                    tracing::debug!(run_id, status = %api.data.status, "run still in progress");
                }
            }
        }
    }

    /// Fetch dataset items of a completed run as raw JSON records.
    pub async fn dataset_items(&self, dataset_id: &str) -> ApifyResult<Vec<Value>> {
        let url = format!("{}/datasets/{}/items?format=json", self.base_url, dataset_id);
        let resp = self
            .client
            .get(&url)
            .bearer_auth(&self.token)
            .send()
            .await?;
        Self::check(resp).await
    }
}

#[async_trait]
impl ActorRunner for ApifyClient {
    async fn run_actor(&self, actor_id: &str, input: &Value) -> anyhow::Result<Vec<Value>> {
        let run = self.start_run(actor_id, input).await?;
        tracing::info!(actor_id, run_id = %run.id, "apify run started");

        let done = self.wait_for_run(&run.id).await?;
        let items = self.dataset_items(&done.default_dataset_id).await?;
        tracing::info!(actor_id, count = items.len(), "apify dataset fetched");
        Ok(items)
    }
}
