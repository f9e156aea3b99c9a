// src/search/orchestrator.rs
//! Fan-out: run every applicable adapter concurrently, await all, fail soft per branch.

use std::sync::Arc;
use std::time::Instant;

use futures::future::join_all;
use metrics::{counter, histogram};

use crate::clients::apify::ActorRunner;
use crate::clients::claude::WebSearch;
use crate::config::SearchSettings;
use crate::search::providers::{
    Harvest, RepostProvider, ScrapeAdapter, ScrapeTarget, SearchContext, SearchStrategy,
    WebSearchAdapter,
};
use crate::search::types::RepostResult;

/// Live capability handles for one request.
#[derive(Clone)]
pub struct Backends {
    pub web: Arc<dyn WebSearch>,
    /// Present only when a scraper credential is configured.
    pub scraper: Option<Arc<dyn ActorRunner>>,
}

/// Settled outcome of one branch. Failures are values, never errors.
#[derive(Debug, Clone)]
pub struct BranchOutcome {
    pub provider: &'static str,
    pub harvest: Harvest,
    pub failed: bool,
}

/// Adapter invocations for this request, in a fixed order.
/// Scrape adapters are included only when a scraper is available.
pub fn plan_adapters(backends: &Backends, settings: &SearchSettings) -> Vec<Arc<dyn RepostProvider>> {
    let mut adapters: Vec<Arc<dyn RepostProvider>> = SearchStrategy::ALL
        .iter()
        .map(|s| {
            Arc::new(WebSearchAdapter::new(
                backends.web.clone(),
                *s,
                settings.search_max_tokens,
            )) as Arc<dyn RepostProvider>
        })
        .collect();

    if let Some(scraper) = &backends.scraper {
        adapters.extend(ScrapeTarget::ALL.iter().map(|t| {
            Arc::new(ScrapeAdapter::new(
                scraper.clone(),
                *t,
                settings.scrape_results_limit,
            )) as Arc<dyn RepostProvider>
        }));
    }
    adapters
}

/// Run all adapters concurrently and wait for every one to settle.
/// Output order matches `adapters`, regardless of completion order.
pub async fn fan_out(
    adapters: Vec<Arc<dyn RepostProvider>>,
    ctx: Arc<SearchContext>,
) -> Vec<BranchOutcome> {
    let handles = adapters.into_iter().map(|adapter| {
        let ctx = ctx.clone();
        let provider = adapter.name();
        let handle = tokio::spawn(async move {
            let t0 = Instant::now();
            let out = adapter.find(&ctx).await;
            histogram!("repost_provider_ms", "provider" => provider)
                .record(t0.elapsed().as_secs_f64() * 1_000.0);
            out
        });
        async move {
            match handle.await {
                Ok(Ok(harvest)) => {
                    counter!("repost_provider_results_total", "provider" => provider)
                        .increment(harvest.results.len() as u64);
                    BranchOutcome {
                        provider,
                        harvest,
                        failed: false,
                    }
                }
                Ok(Err(e)) => {
                    tracing::warn!(error = ?e, provider, "provider error");
                    soft_failure(provider)
                }
                Err(e) => {
                    tracing::warn!(error = %e, provider, "provider task aborted");
                    soft_failure(provider)
                }
            }
        }
    });
    join_all(handles).await
}

fn soft_failure(provider: &'static str) -> BranchOutcome {
    counter!("repost_provider_errors_total", "provider" => provider).increment(1);
    BranchOutcome {
        provider,
        harvest: Harvest::default(),
        failed: true,
    }
}

/// Concatenate results in invocation order, then per-adapter list order.
pub fn flatten(outcomes: &[BranchOutcome]) -> Vec<RepostResult> {
    outcomes
        .iter()
        .flat_map(|o| o.harvest.results.iter().cloned())
        .collect()
}
