//! Repost Finder: binary entrypoint
//! Boots the Axum HTTP server with the repost search routes and `/metrics`.

use shuttle_axum::ShuttleAxum;

#[shuttle_runtime::main]
async fn axum() -> ShuttleAxum {
    // Load .env in local/dev; no-op in prod environments.
    // ANTHROPIC_API_KEY / APIFY_API_TOKEN are read per request from the process env.
    let _ = dotenvy::dotenv();

    repost_finder::init_tracing();

    let router = repost_finder::app()?;
    tracing::info!("repost finder ready");

    Ok(router.into())
}
