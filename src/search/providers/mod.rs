// src/search/providers/mod.rs
//! Provider adapters: each turns one external capability's output into `RepostResult`s.

pub mod enrichment;
pub mod scrape;
pub mod web_search;

use anyhow::Result;
use chrono::NaiveDate;

use crate::search::types::{clean_handle, RepostResult, VideoInfo, VideoQuery};

pub use enrichment::EnrichmentAdapter;
pub use scrape::{ScrapeAdapter, ScrapeTarget};
pub use web_search::{SearchStrategy, WebSearchAdapter};

/// Everything an adapter may read. Shared read-only across the fan-out.
#[derive(Debug, Clone)]
pub struct SearchContext {
    pub query: VideoQuery,
    pub info: VideoInfo,
    /// Extracted id of the original video ("" when unknown).
    pub video_id: String,
    /// Used for records that carry no date.
    pub today: NaiveDate,
}

impl SearchContext {
    pub fn new(query: VideoQuery, info: VideoInfo, video_id: String) -> Self {
        Self {
            query,
            info,
            video_id,
            today: chrono::Utc::now().date_naive(),
        }
    }
}

/// What one adapter produced.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Harvest {
    pub results: Vec<RepostResult>,
    /// Free text the adapter could not parse, kept for diagnostics.
    pub raw_text: Option<String>,
}

impl Harvest {
    pub fn results(results: Vec<RepostResult>) -> Self {
        Self {
            results,
            raw_text: None,
        }
    }

    pub fn unparsed(raw_text: String) -> Self {
        Self {
            results: Vec::new(),
            raw_text: Some(raw_text),
        }
    }
}

#[async_trait::async_trait]
pub trait RepostProvider: Send + Sync {
    async fn find(&self, ctx: &SearchContext) -> Result<Harvest>;
    fn name(&self) -> &'static str;
}

/// Adapter-local self filter: drop records posted by the original author.
/// Comparison ignores case and a leading `@`.
pub fn drop_self_authored(results: Vec<RepostResult>, query: &VideoQuery) -> Vec<RepostResult> {
    let Some(author) = query.author_handle() else {
        return results;
    };
    results
        .into_iter()
        .filter(|r| clean_handle(&r.account_name) != author)
        .collect()
}
