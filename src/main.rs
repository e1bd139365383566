//! Rider alerts bot: binary entrypoint.
//! Runs one polling pass and exits; an external scheduler triggers it every few minutes.

use std::sync::Arc;

use anyhow::Context;
use rider_alerts_bot::{
    config::AppConfig, telemetry, AlertProcessor, FileSettingsStore, GraphThreadsClient,
    Publisher, RiderAlertsFeed, RunOptions,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env in local/dev; no-op when the file is absent.
    let _ = dotenvy::dotenv();

    let cfg = AppConfig::from_env()?;
    telemetry::init_tracing(&cfg.log)?;
    tracing::debug!(config = ?cfg, "configuration loaded");

    let http = reqwest::Client::builder()
        .timeout(cfg.http_timeout)
        .build()
        .context("building http client")?;

    let store = Arc::new(FileSettingsStore::new(cfg.settings_path.clone()));
    let api = Arc::new(GraphThreadsClient::new(
        http.clone(),
        cfg.threads_api_url.clone(),
        cfg.threads_user_id.clone(),
        cfg.access_token.clone(),
    ));
    let feed = Arc::new(RiderAlertsFeed::from_url(cfg.feed_url.clone(), http));

    let publisher = Publisher::new(api, store.clone(), cfg.poll_policy());
    let processor = AlertProcessor::new(
        feed,
        publisher,
        store,
        RunOptions {
            auto_reply: cfg.auto_reply,
            auto_publish: cfg.auto_publish,
        },
    );

    let outcome = processor.run_once().await?;
    tracing::trace!(?outcome, "application finished");
    Ok(())
}
