// src/clients/claude.rs
//! Anthropic Messages API client with the server-side web search tool enabled.

use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::SearchSettings;

const ANTHROPIC_VERSION: &str = "2023-06-01";
const WEB_SEARCH_TOOL: &str = "web_search_20250305";

/// One bounded instruction for the LLM search capability.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebSearchTask {
    pub system: String,
    pub prompt: String,
    pub max_tokens: u32,
}

/// LLM capability that can search the web and answers with free text.
#[async_trait]
pub trait WebSearch: Send + Sync {
    /// Returns all text blocks of the answer joined by newlines.
    async fn search(&self, task: &WebSearchTask) -> Result<String>;
}

pub struct ClaudeClient {
    api_key: String,
    http: reqwest::Client,
    base_url: String,
    model: String,
    max_searches: u32,
}

impl ClaudeClient {
    pub fn new(api_key: &str, settings: &SearchSettings) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("repost-finder/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(settings.http_timeout_secs))
            .build()
            .context("building anthropic http client")?;
        Ok(Self {
            api_key: api_key.to_string(),
            http,
            base_url: settings.anthropic_base_url.trim_end_matches('/').to_string(),
            model: settings.model.clone(),
            max_searches: settings.web_search_max_uses,
        })
    }

    fn headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert("x-api-key", HeaderValue::from_str(&self.api_key)?);
        headers.insert(
            "anthropic-version",
            HeaderValue::from_static(ANTHROPIC_VERSION),
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Ok(headers)
    }

    fn request<'a>(&'a self, task: &'a WebSearchTask) -> MessagesRequest<'a> {
        MessagesRequest {
            model: &self.model,
            max_tokens: task.max_tokens,
            system: &task.system,
            messages: vec![Message {
                role: "user",
                content: &task.prompt,
            }],
            tools: vec![WebSearchTool {
                kind: WEB_SEARCH_TOOL,
                name: "web_search",
                max_uses: self.max_searches,
            }],
        }
    }
}

#[async_trait]
impl WebSearch for ClaudeClient {
    async fn search(&self, task: &WebSearchTask) -> Result<String> {
        let url = format!("{}/messages", self.base_url);
        debug!(model = %self.model, max_tokens = task.max_tokens, "claude web search request");

        let response = self
            .http
            .post(&url)
            .headers(self.headers()?)
            .json(&self.request(task))
            .send()
            .await
            .context("claude request")?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(anyhow!("Claude API error ({}): {}", status, error_text));
        }

        let body: MessagesResponse = response.json().await.context("claude response body")?;
        Ok(body.joined_text())
    }
}

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: Vec<Message<'a>>,
    tools: Vec<WebSearchTool>,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct WebSearchTool {
    #[serde(rename = "type")]
    kind: &'static str,
    name: &'static str,
    max_uses: u32,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

/// Only text blocks matter; tool-use and search-result blocks are skipped.
#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
enum ContentBlock {
    #[serde(rename = "text")]
    Text { text: String },
    #[serde(other)]
    Other,
}

impl MessagesResponse {
    fn joined_text(&self) -> String {
        self.content
            .iter()
            .filter_map(|block| match block {
                ContentBlock::Text { text } => Some(text.as_str()),
                ContentBlock::Other => None,
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}
