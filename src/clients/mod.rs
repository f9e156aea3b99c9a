// src/clients/mod.rs
//! External capability clients and the factory that wires them per request.

pub mod apify;
pub mod claude;

use std::sync::Arc;

use anyhow::Result;

use crate::config::{Capabilities, SearchSettings};
use crate::search::Backends;

pub use apify::{ActorRunner, ApifyClient};
pub use claude::{ClaudeClient, WebSearch, WebSearchTask};

/// Builds capability handles from resolved credentials.
pub trait Connector: Send + Sync {
    fn connect(&self, caps: &Capabilities, settings: &SearchSettings) -> Result<Backends>;
}

/// Real HTTP clients (Anthropic + optional Apify).
pub struct LiveConnector;

impl Connector for LiveConnector {
    fn connect(&self, caps: &Capabilities, settings: &SearchSettings) -> Result<Backends> {
        let web: Arc<dyn WebSearch> = Arc::new(ClaudeClient::new(&caps.anthropic_api_key, settings)?);
        let scraper = match caps.apify_token.as_deref() {
            Some(token) => Some(Arc::new(ApifyClient::new(token, settings)?) as Arc<dyn ActorRunner>),
            None => None,
        };
        Ok(Backends { web, scraper })
    }
}
