// src/search/providers/enrichment.rs
//! Enrichment: one LLM call summarizing the original video (keywords, hashtags,
//! description). Never fails; falls back to a synthetic summary.

use std::sync::Arc;

use metrics::counter;
use serde_json::{Map, Value};

use crate::clients::claude::{WebSearch, WebSearchTask};
use crate::search::extract::{extract_json_object, Extracted};
use crate::search::types::{VideoInfo, VideoQuery};

const SYSTEM_PROMPT: &str = "You identify short-form videos. Look up the given video on the web and describe it so that copies of it can be found later.

Return ONLY a JSON object with:
- \"title\": the video's title or caption, if known
- \"description\": one sentence describing what happens in the video
- \"keywords\": 3 to 6 distinctive search keywords
- \"hashtags\": hashtags used with the video, each starting with #
No other text.";

const MAX_TERMS: usize = 8;

pub struct EnrichmentAdapter {
    client: Arc<dyn WebSearch>,
    max_tokens: u32,
}

impl EnrichmentAdapter {
    pub fn new(client: Arc<dyn WebSearch>, max_tokens: u32) -> Self {
        Self { client, max_tokens }
    }

    pub fn task(&self, query: &VideoQuery) -> WebSearchTask {
        WebSearchTask {
            system: SYSTEM_PROMPT.to_string(),
            prompt: format!(
                "Describe this video:\n\nURL: {}\nPlatform: {}\nTitle/Description: {}\nAuthor: {}",
                query.url,
                query.platform,
                query.title_display(),
                query.author_display()
            ),
            max_tokens: self.max_tokens,
        }
    }

    /// `describe` on its own task: a panic in the client also yields the fallback.
    pub async fn describe_in_task(self, query: &VideoQuery) -> VideoInfo {
        let owned = query.clone();
        match tokio::spawn(async move { self.describe(&owned).await }).await {
            Ok(info) => info,
            Err(e) => {
                tracing::warn!(error = %e, provider = "enrichment", "enrichment task aborted");
                counter!("repost_provider_errors_total", "provider" => "enrichment").increment(1);
                VideoInfo::fallback(query)
            }
        }
    }

    /// Summarize the source video. Any failure yields `VideoInfo::fallback`.
    pub async fn describe(&self, query: &VideoQuery) -> VideoInfo {
        let text = match self.client.search(&self.task(query)).await {
            Ok(t) => t,
            Err(e) => {
                tracing::warn!(error = ?e, provider = "enrichment", "enrichment call failed");
                return VideoInfo::fallback(query);
            }
        };
        match extract_json_object(&text) {
            Extracted::Parsed(map) => info_from_map(&map, query),
            Extracted::Unparsed(_) => {
                tracing::warn!(provider = "enrichment", "no JSON object in enrichment answer");
                VideoInfo::fallback(query)
            }
        }
    }
}

fn info_from_map(map: &Map<String, Value>, query: &VideoQuery) -> VideoInfo {
    let fallback = VideoInfo::fallback(query);

    let description = map
        .get("description")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .unwrap_or(fallback.description);

    let mut keywords = terms(map.get("keywords"));
    if keywords.is_empty() {
        keywords = fallback.keywords;
    }

    let hashtags = terms(map.get("hashtags"))
        .into_iter()
        .map(|t| format!("#{}", t.trim_start_matches('#')))
        .collect();

    let title = map
        .get("title")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .or(fallback.title);

    VideoInfo {
        description,
        keywords,
        hashtags,
        title,
    }
}

/// Accepts an array of strings or a single comma/space separated string.
fn terms(v: Option<&Value>) -> Vec<String> {
    let raw: Vec<String> = match v {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect(),
        Some(Value::String(s)) => s.split(',').map(str::to_string).collect(),
        _ => Vec::new(),
    };
    let mut out: Vec<String> = Vec::new();
    for t in raw {
        let t = t.trim();
        if t.is_empty() || t == "#" || out.iter().any(|o| o.eq_ignore_ascii_case(t)) {
            continue;
        }
        out.push(t.to_string());
        if out.len() == MAX_TERMS {
            break;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::types::Platform;
    use anyhow::{anyhow, Result};
    use async_trait::async_trait;

    struct Reply(Result<&'static str, &'static str>);

    #[async_trait]
    impl WebSearch for Reply {
        async fn search(&self, _task: &WebSearchTask) -> Result<String> {
            self.0.map(str::to_string).map_err(|e| anyhow!(e))
        }
    }

    fn query() -> VideoQuery {
        VideoQuery::new("https://www.instagram.com/reel/Cx1/", Platform::Instagram)
            .with_author("@dancer")
    }

    #[tokio::test]
    async fn parses_summary_object() {
        let text = r##"Here you go: {"title":"Rooftop dance","description":"A dancer on a rooftop at sunset","keywords":["rooftop dance","sunset", "Sunset"],"hashtags":["dance","#rooftop"]}"##;
        let adapter = EnrichmentAdapter::new(std::sync::Arc::new(Reply(Ok(text))), 300);
        let info = adapter.describe(&query()).await;
        assert_eq!(info.title.as_deref(), Some("Rooftop dance"));
        assert_eq!(info.keywords, vec!["rooftop dance".to_string(), "sunset".to_string()]);
        assert_eq!(info.hashtags, vec!["#dance".to_string(), "#rooftop".to_string()]);
    }

    #[tokio::test]
    async fn network_error_falls_back() {
        let adapter = EnrichmentAdapter::new(std::sync::Arc::new(Reply(Err("timeout"))), 300);
        let q = query();
        assert_eq!(adapter.describe(&q).await, VideoInfo::fallback(&q));
    }

    #[tokio::test]
    async fn prose_falls_back() {
        let adapter = EnrichmentAdapter::new(std::sync::Arc::new(Reply(Ok("I can't access that."))), 300);
        let q = query();
        assert_eq!(adapter.describe(&q).await, VideoInfo::fallback(&q));
    }

    struct Explodes;

    #[async_trait]
    impl WebSearch for Explodes {
        async fn search(&self, _task: &WebSearchTask) -> Result<String> {
            panic!("malformed upstream frame")
        }
    }

    #[tokio::test]
    async fn panicking_client_falls_back_when_run_in_task() {
        let adapter = EnrichmentAdapter::new(std::sync::Arc::new(Explodes), 300);
        let q = query();
        assert_eq!(adapter.describe_in_task(&q).await, VideoInfo::fallback(&q));
    }

    #[test]
    fn comma_separated_keywords_are_split() {
        let v = Value::String("cat, piano , ,cat".into());
        assert_eq!(terms(Some(&v)), vec!["cat".to_string(), "piano".to_string()]);
    }
}
