// src/config/search.rs
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const ENV_CONFIG_PATH: &str = "REPOST_CONFIG_PATH";
pub const DEFAULT_CONFIG_PATH: &str = "config/search.toml";

fn default_model() -> String {
    "claude-sonnet-4-20250514".to_string()
}
fn default_search_max_tokens() -> u32 {
    1500
}
fn default_enrich_max_tokens() -> u32 {
    600
}
fn default_web_search_max_uses() -> u32 {
    5
}
fn default_scrape_results_limit() -> u32 {
    30
}
fn default_http_timeout_secs() -> u64 {
    120
}
fn default_anthropic_base_url() -> String {
    "https://api.anthropic.com/v1".to_string()
}
fn default_apify_base_url() -> String {
    "https://api.apify.com/v2".to_string()
}

/// Tunables for the search pipeline. Credentials live in `Capabilities`, not here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchSettings {
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_search_max_tokens")]
    pub search_max_tokens: u32,
    #[serde(default = "default_enrich_max_tokens")]
    pub enrich_max_tokens: u32,
    /// Upper bound on web searches the LLM may run per instruction.
    #[serde(default = "default_web_search_max_uses")]
    pub web_search_max_uses: u32,
    /// Result cap passed to each scraper actor.
    #[serde(default = "default_scrape_results_limit")]
    pub scrape_results_limit: u32,
    #[serde(default = "default_http_timeout_secs")]
    pub http_timeout_secs: u64,
    #[serde(default = "default_anthropic_base_url")]
    pub anthropic_base_url: String,
    #[serde(default = "default_apify_base_url")]
    pub apify_base_url: String,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            model: default_model(),
            search_max_tokens: default_search_max_tokens(),
            enrich_max_tokens: default_enrich_max_tokens(),
            web_search_max_uses: default_web_search_max_uses(),
            scrape_results_limit: default_scrape_results_limit(),
            http_timeout_secs: default_http_timeout_secs(),
            anthropic_base_url: default_anthropic_base_url(),
            apify_base_url: default_apify_base_url(),
        }
    }
}

impl SearchSettings {
    /// Load from an explicit TOML file.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let data = fs::read_to_string(path)
            .with_context(|| format!("reading search config from {}", path.display()))?;
        let cfg: SearchSettings = toml::from_str(&data)
            .with_context(|| format!("parsing search config {}", path.display()))?;
        Ok(cfg.sanitized())
    }

    /// Load using env var + fallbacks:
    /// 1) $REPOST_CONFIG_PATH (must exist)
    /// 2) config/search.toml
    /// 3) built-in defaults
    pub fn load_default() -> Result<Self> {
        if let Ok(p) = std::env::var(ENV_CONFIG_PATH) {
            let pb = PathBuf::from(p);
            if pb.exists() {
                return Self::load_from_file(&pb);
            }
            return Err(anyhow!("{ENV_CONFIG_PATH} points to non-existent path"));
        }
        let p = PathBuf::from(DEFAULT_CONFIG_PATH);
        if p.exists() {
            return Self::load_from_file(&p);
        }
        Ok(Self::default())
    }

    fn sanitized(mut self) -> Self {
        if self.model.trim().is_empty() {
            self.model = default_model();
        }
        self.search_max_tokens = self.search_max_tokens.clamp(256, 8192);
        self.enrich_max_tokens = self.enrich_max_tokens.clamp(128, 4096);
        self.web_search_max_uses = self.web_search_max_uses.clamp(1, 20);
        self.scrape_results_limit = self.scrape_results_limit.clamp(1, 200);
        if self.http_timeout_secs == 0 {
            self.http_timeout_secs = default_http_timeout_secs();
        }
        self
    }
}
