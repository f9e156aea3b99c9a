// src/search/providers/scrape.rs
//! Structured scrape adapters (Apify). Records arrive as JSON already; only field
//! remapping is needed. Active only when a scraper token is configured.

use std::collections::HashSet;
use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Serialize;

use crate::clients::apify::ActorRunner;
use crate::search::fields::{FieldMap, RecordDefaults, INSTAGRAM_FIELDS, TIKTOK_FIELDS};
use crate::search::providers::{drop_self_authored, Harvest, RepostProvider, SearchContext};
use crate::search::types::{Confidence, Platform};

const MAX_QUERIES: usize = 3;

/// Input for the clockworks/tiktok-scraper actor (keyword + hashtag search).
#[derive(Debug, Clone, Serialize)]
pub struct TikTokSearchInput {
    #[serde(rename = "searchQueries")]
    pub search_queries: Vec<String>,
    pub hashtags: Vec<String>,
    #[serde(rename = "resultsPerPage")]
    pub results_per_page: u32,
    #[serde(rename = "shouldDownloadVideos")]
    pub should_download_videos: bool,
}

/// Input for the apify/instagram-hashtag-scraper actor.
#[derive(Debug, Clone, Serialize)]
pub struct InstagramHashtagInput {
    pub hashtags: Vec<String>,
    #[serde(rename = "resultsLimit")]
    pub results_limit: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrapeTarget {
    TiktokSearch,
    InstagramHashtags,
}

impl ScrapeTarget {
    pub const ALL: [ScrapeTarget; 2] = [ScrapeTarget::TiktokSearch, ScrapeTarget::InstagramHashtags];

    pub fn actor_id(&self) -> &'static str {
        match self {
            ScrapeTarget::TiktokSearch => "clockworks~tiktok-scraper",
            ScrapeTarget::InstagramHashtags => "apify~instagram-hashtag-scraper",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ScrapeTarget::TiktokSearch => "apify:tiktok",
            ScrapeTarget::InstagramHashtags => "apify:instagram",
        }
    }

    fn platform(&self) -> Platform {
        match self {
            ScrapeTarget::TiktokSearch => Platform::Tiktok,
            ScrapeTarget::InstagramHashtags => Platform::Instagram,
        }
    }

    fn fields(&self) -> &'static FieldMap {
        match self {
            ScrapeTarget::TiktokSearch => &TIKTOK_FIELDS,
            ScrapeTarget::InstagramHashtags => &INSTAGRAM_FIELDS,
        }
    }

    /// Actor input for this video, or `None` when there is nothing to search for.
    pub fn input(&self, ctx: &SearchContext, limit: u32) -> Result<Option<serde_json::Value>> {
        let tags = hashtag_terms(ctx);
        let value = match self {
            ScrapeTarget::TiktokSearch => {
                let mut queries: Vec<String> = ctx.info.title.iter().cloned().collect();
                queries.extend(ctx.info.keywords.iter().cloned());
                queries.truncate(MAX_QUERIES);
                if queries.is_empty() && tags.is_empty() {
                    return Ok(None);
                }
                serde_json::to_value(TikTokSearchInput {
                    search_queries: queries,
                    hashtags: tags,
                    results_per_page: limit,
                    should_download_videos: false,
                })
            }
            ScrapeTarget::InstagramHashtags => {
                if tags.is_empty() {
                    return Ok(None);
                }
                serde_json::to_value(InstagramHashtagInput {
                    hashtags: tags,
                    results_limit: limit,
                })
            }
        };
        Ok(Some(value.context("serializing actor input")?))
    }
}

/// Hashtags without `#`; keywords squashed into tags when the video has none.
fn hashtag_terms(ctx: &SearchContext) -> Vec<String> {
    let source = if ctx.info.hashtags.is_empty() {
        &ctx.info.keywords
    } else {
        &ctx.info.hashtags
    };
    let mut seen = HashSet::new();
    source
        .iter()
        .map(|t| {
            t.chars()
                .filter(|c| c.is_alphanumeric() || *c == '_')
                .collect::<String>()
                .to_lowercase()
        })
        .filter(|t| !t.is_empty() && seen.insert(t.clone()))
        .take(MAX_QUERIES)
        .collect()
}

pub struct ScrapeAdapter {
    runner: Arc<dyn ActorRunner>,
    target: ScrapeTarget,
    limit: u32,
}

impl ScrapeAdapter {
    pub fn new(runner: Arc<dyn ActorRunner>, target: ScrapeTarget, limit: u32) -> Self {
        Self {
            runner,
            target,
            limit,
        }
    }
}

#[async_trait]
impl RepostProvider for ScrapeAdapter {
    async fn find(&self, ctx: &SearchContext) -> Result<Harvest> {
        let Some(input) = self.target.input(ctx, self.limit)? else {
            tracing::debug!(provider = self.name(), "no search terms, skipping actor run");
            return Ok(Harvest::default());
        };

        let records = self
            .runner
            .run_actor(self.target.actor_id(), &input)
            .await
            .with_context(|| format!("apify actor {}", self.target.actor_id()))?;

        let defaults = RecordDefaults {
            platform: self.target.platform(),
            confidence: Confidence::Medium,
            today: ctx.today,
        };
        let fields = self.target.fields();
        let results = records
            .iter()
            .filter_map(|rec| fields.to_result(rec, &defaults))
            .collect();

        Ok(Harvest::results(drop_self_authored(results, &ctx.query)))
    }

    fn name(&self) -> &'static str {
        self.target.name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::types::{VideoInfo, VideoQuery};
    use serde_json::{json, Value};
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder {
        calls: Mutex<Vec<(String, Value)>>,
        reply: Vec<Value>,
    }

    #[async_trait]
    impl ActorRunner for Recorder {
        async fn run_actor(&self, actor_id: &str, input: &Value) -> Result<Vec<Value>> {
            self.calls
                .lock()
                .unwrap()
                .push((actor_id.to_string(), input.clone()));
            Ok(self.reply.clone())
        }
    }

    fn ctx(hashtags: Vec<&str>) -> SearchContext {
        let q = VideoQuery::new("https://www.tiktok.com/@orig/video/1", Platform::Tiktok)
            .with_author("orig");
        let info = VideoInfo {
            description: "d".into(),
            keywords: vec!["cat piano".into()],
            hashtags: hashtags.into_iter().map(String::from).collect(),
            title: None,
        };
        SearchContext::new(q, info, "1".into())
    }

    #[tokio::test]
    async fn tiktok_records_are_remapped_and_self_filtered() {
        let runner = Arc::new(Recorder {
            reply: vec![
                json!({"webVideoUrl": "https://www.tiktok.com/@copy/video/2", "authorMeta": {"name": "copy"}, "playCount": 900}),
                json!({"webVideoUrl": "https://www.tiktok.com/@orig/video/3", "authorMeta": {"name": "Orig"}}),
                json!({"authorMeta": {"name": "no_url"}}),
            ],
            ..Default::default()
        });
        let adapter = ScrapeAdapter::new(runner.clone(), ScrapeTarget::TiktokSearch, 25);
        let h = adapter.find(&ctx(vec!["#CatPiano"])).await.unwrap();

        assert_eq!(h.results.len(), 1);
        assert_eq!(h.results[0].account_name, "copy");
        assert_eq!(h.results[0].views, 900);
        assert_eq!(h.results[0].confidence, Confidence::Medium);

        let calls = runner.calls.lock().unwrap();
        assert_eq!(calls[0].0, "clockworks~tiktok-scraper");
        assert_eq!(calls[0].1["hashtags"], json!(["catpiano"]));
        assert_eq!(calls[0].1["searchQueries"], json!(["cat piano"]));
        assert_eq!(calls[0].1["resultsPerPage"], 25);
    }

    #[tokio::test]
    async fn instagram_uses_keywords_when_no_hashtags() {
        let runner = Arc::new(Recorder::default());
        let adapter = ScrapeAdapter::new(runner.clone(), ScrapeTarget::InstagramHashtags, 10);
        let h = adapter.find(&ctx(vec![])).await.unwrap();
        assert!(h.results.is_empty());
        let calls = runner.calls.lock().unwrap();
        assert_eq!(calls[0].1["hashtags"], json!(["catpiano"]));
        assert_eq!(calls[0].1["resultsLimit"], 10);
    }

    #[test]
    fn repeated_tags_are_sent_once() {
        let c = ctx(vec!["#cat", "#dog", "#Cat"]);
        assert_eq!(hashtag_terms(&c), vec!["cat".to_string(), "dog".to_string()]);
    }

    #[tokio::test]
    async fn nothing_to_search_skips_the_actor() {
        let runner = Arc::new(Recorder::default());
        let adapter = ScrapeAdapter::new(runner.clone(), ScrapeTarget::InstagramHashtags, 10);
        let mut c = ctx(vec![]);
        c.info.keywords.clear();
        let h = adapter.find(&c).await.unwrap();
        assert_eq!(h, Harvest::default());
        assert!(runner.calls.lock().unwrap().is_empty());
    }
}
