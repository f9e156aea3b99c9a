use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    routing::{get, post},
    Json, Router,
};
use metrics::counter;
use serde::Deserialize;
use tower_http::cors::CorsLayer;

use crate::clients::{Connector, LiveConnector};
use crate::config::{Capabilities, CredentialSource, SearchSettings};
use crate::error::{FinderError, MISSING_FIELDS};
use crate::search::{self, Platform, SearchResponse, VideoMetadata, VideoQuery};

#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<SearchSettings>,
    pub credentials: Arc<CredentialSource>,
    pub connector: Arc<dyn Connector>,
}

impl AppState {
    /// Production wiring: env credentials, real HTTP clients.
    pub fn live(settings: SearchSettings) -> Self {
        Self {
            settings: Arc::new(settings),
            credentials: Arc::new(CredentialSource::Env),
            connector: Arc::new(LiveConnector),
        }
    }

    pub fn with_credentials(mut self, credentials: CredentialSource) -> Self {
        self.credentials = Arc::new(credentials);
        self
    }

    pub fn with_connector(mut self, connector: Arc<dyn Connector>) -> Self {
        self.connector = connector;
        self
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/search", post(search_reposts))
        .route("/api/search", post(search_reposts))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

/// Inbound body. Fields are optional here so that missing ones map to our own 400.
#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub platform: Option<String>,
    #[serde(default)]
    pub metadata: Option<VideoMetadata>,
}

impl SearchRequest {
    pub fn into_query(self) -> Result<VideoQuery, FinderError> {
        let url = self.url.map(|u| u.trim().to_string()).unwrap_or_default();
        let platform = self.platform.map(|p| p.trim().to_string()).unwrap_or_default();
        if url.is_empty() || platform.is_empty() {
            return Err(FinderError::InvalidRequest(MISSING_FIELDS.to_string()));
        }
        Ok(VideoQuery {
            url,
            platform: Platform::parse_lenient(&platform),
            metadata: self.metadata.unwrap_or_default(),
        })
    }
}

async fn search_reposts(
    State(state): State<AppState>,
    payload: Result<Json<SearchRequest>, JsonRejection>,
) -> Result<Json<SearchResponse>, FinderError> {
    counter!("repost_search_requests_total").increment(1);

    // Credentials first: a misconfigured service rejects every request the same way.
    let caps = Capabilities::resolve(&state.credentials)?;

    let Json(body) = payload.map_err(|e| {
        tracing::debug!(error = %e, "rejected search body");
        FinderError::InvalidRequest(MISSING_FIELDS.to_string())
    })?;
    let query = body.into_query()?;

    let connector = state.connector.clone();
    let settings = state.settings.clone();

    tracing::info!(
        url = %query.url,
        platform = %query.platform,
        scraping = caps.scraping_enabled(),
        "repost search started"
    );

    // A panic anywhere in the pipeline becomes a generic 500, not a dropped connection.
    let task = tokio::spawn(async move {
        let backends = connector.connect(&caps, &settings)?;
        anyhow::Ok(search::find_reposts(query, backends, &settings).await)
    });
    let response = task
        .await
        .map_err(|e| FinderError::Internal(anyhow::anyhow!("search task failed: {e}")))??;

    Ok(Json(response))
}
