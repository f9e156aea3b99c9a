// src/config/credentials.rs
//! Credential resolution, done once per request. The result is an immutable
//! `Capabilities` value that decides which adapters the orchestrator may run.

use std::collections::HashMap;

use crate::error::FinderError;

pub const ENV_ANTHROPIC_API_KEY: &str = "ANTHROPIC_API_KEY";
pub const ENV_APIFY_API_TOKEN: &str = "APIFY_API_TOKEN";

/// Where credentials come from.
#[derive(Debug, Clone, Default)]
pub enum CredentialSource {
    /// Process environment (after `.env` was loaded at startup).
    #[default]
    Env,
    /// Fixed values, for tests and embedding.
    Static(HashMap<String, String>),
}

impl CredentialSource {
    pub fn fixed<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self::Static(
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Non-blank value for `key`.
    pub fn get(&self, key: &str) -> Option<String> {
        let raw = match self {
            CredentialSource::Env => std::env::var(key).ok(),
            CredentialSource::Static(map) => map.get(key).cloned(),
        };
        raw.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct Capabilities {
    pub anthropic_api_key: String,
    pub apify_token: Option<String>,
}

// Keys stay out of logs.
impl std::fmt::Debug for Capabilities {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Capabilities")
            .field("anthropic_key_len", &self.anthropic_api_key.len())
            .field("apify", &self.apify_token.is_some())
            .finish()
    }
}

impl Capabilities {
    /// The LLM key is required; the scraper token is optional.
    pub fn resolve(source: &CredentialSource) -> Result<Self, FinderError> {
        let anthropic_api_key = source
            .get(ENV_ANTHROPIC_API_KEY)
            .ok_or(FinderError::MissingCredential(ENV_ANTHROPIC_API_KEY))?;
        Ok(Self {
            anthropic_api_key,
            apify_token: source.get(ENV_APIFY_API_TOKEN),
        })
    }

    pub fn scraping_enabled(&self) -> bool {
        self.apify_token.is_some()
    }
}
