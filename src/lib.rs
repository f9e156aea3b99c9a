// src/lib.rs
// Public library surface for the binary and integration tests.

pub mod api;
pub mod clients;
pub mod config;
pub mod error;
pub mod metrics;
pub mod search;

// ---- Re-exports for stable public API ----
pub use crate::api::{router, AppState};
pub use crate::config::{Capabilities, CredentialSource, SearchSettings};
pub use crate::error::FinderError;
pub use crate::search::{find_reposts, Backends, SearchResponse};

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Install the tracing subscriber. Safe to call twice; the second call is a no-op.
///
/// `LOG_FORMAT=json` switches to JSON lines; `RUST_LOG` overrides the default filter.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("repost_finder=info,search=info,warn"));

    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(filter);
    let _ = if json {
        registry.with(fmt::layer().json()).try_init()
    } else {
        registry.with(fmt::layer().compact()).try_init()
    };
}

/// Build the full in-process app (search routes + `/metrics`) from env and config files.
pub fn app() -> anyhow::Result<axum::Router> {
    let settings = SearchSettings::load_default()?;
    let metrics = crate::metrics::Metrics::init(&settings)?;
    Ok(router(AppState::live(settings)).merge(metrics.router()))
}
