// src/search/mod.rs
//! Repost search pipeline: enrichment, fan-out, merge & rank.

pub mod canonical;
pub mod extract;
pub mod fields;
pub mod identity;
pub mod merge;
pub mod orchestrator;
pub mod providers;
pub mod types;

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

use metrics::{counter, describe_counter, describe_histogram, histogram};
use once_cell::sync::OnceCell;
use serde::Serialize;

use crate::config::SearchSettings;
use crate::search::identity::extract_video_id;
use crate::search::merge::merge_and_rank;
use crate::search::orchestrator::{fan_out, flatten, plan_adapters, BranchOutcome};
use crate::search::providers::{EnrichmentAdapter, SearchContext};

pub use crate::search::orchestrator::Backends;
pub use crate::search::types::{
    Confidence, Platform, RepostResult, RepostType, VideoInfo, VideoMetadata, VideoQuery,
};

/// One-time metrics registration (so series show up on /metrics).
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!(
            "repost_search_requests_total",
            "Inbound repost search requests."
        );
        describe_counter!(
            "repost_provider_results_total",
            "Results returned per provider before merging."
        );
        describe_counter!(
            "repost_provider_errors_total",
            "Provider calls that failed and were replaced by an empty result."
        );
        describe_counter!(
            "repost_unparsed_answers_total",
            "LLM answers without a parseable JSON array."
        );
        describe_counter!(
            "repost_results_kept_total",
            "Results returned to callers after merge & rank."
        );
        describe_counter!(
            "repost_dedup_dropped_total",
            "Results removed as duplicates by canonical URL."
        );
        describe_counter!(
            "repost_self_refs_dropped_total",
            "Results removed as the original video or author."
        );
        describe_histogram!("repost_search_ms", "End-to-end pipeline time in milliseconds.");
        describe_histogram!("repost_provider_ms", "Per-provider call time in milliseconds.");
    });
}

/// Successful response body.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SearchResponse {
    pub results: Vec<RepostResult>,
    /// Unparsed LLM text, only when nothing structured survived.
    #[serde(rename = "rawText", skip_serializing_if = "Option::is_none")]
    pub raw_text: Option<String>,
    /// Which sources were active for this request.
    pub sources: BTreeMap<&'static str, bool>,
}

/// Run the full pipeline for one request. Adapter failures never surface here.
pub async fn find_reposts(
    query: VideoQuery,
    backends: Backends,
    settings: &SearchSettings,
) -> SearchResponse {
    ensure_metrics_described();
    let t0 = Instant::now();

    let video_id = extract_video_id(&query.url, query.platform);
    if video_id.is_empty() {
        tracing::debug!(url = %query.url, "no video id extracted, self-exclusion disabled");
    }

    let info = EnrichmentAdapter::new(backends.web.clone(), settings.enrich_max_tokens)
        .describe_in_task(&query)
        .await;

    let author = query.author_handle();
    let ctx = Arc::new(SearchContext::new(query, info, video_id));
    let adapters = plan_adapters(&backends, settings);
    let outcomes = fan_out(adapters, ctx.clone()).await;

    let raw = flatten(&outcomes);
    let raw_count = raw.len();
    let merged = merge_and_rank(raw, &ctx.video_id, author.as_deref());

    let raw_text = if merged.results.is_empty() {
        collect_raw_text(&outcomes)
    } else {
        None
    };

    let mut sources = BTreeMap::new();
    sources.insert("claude", true);
    sources.insert("apify", backends.scraper.is_some());

    let ms = t0.elapsed().as_secs_f64() * 1_000.0;
    histogram!("repost_search_ms").record(ms);
    counter!("repost_results_kept_total").increment(merged.results.len() as u64);
    counter!("repost_dedup_dropped_total").increment(merged.duplicates as u64);
    counter!("repost_self_refs_dropped_total")
        .increment((merged.self_refs + merged.author_refs) as u64);

    tracing::info!(
        target: "search",
        providers = outcomes.len(),
        failed = outcomes.iter().filter(|o| o.failed).count(),
        raw = raw_count,
        kept = merged.results.len(),
        dedup = merged.duplicates,
        self_refs = merged.self_refs,
        author_refs = merged.author_refs,
        ms = ms as u64,
        "repost search finished"
    );

    SearchResponse {
        results: merged.results,
        raw_text,
        sources,
    }
}

fn collect_raw_text(outcomes: &[BranchOutcome]) -> Option<String> {
    let parts: Vec<&str> = outcomes
        .iter()
        .filter_map(|o| o.harvest.raw_text.as_deref())
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect();
    if parts.is_empty() {
        None
    } else {
        Some(parts.join("\n\n"))
    }
}
