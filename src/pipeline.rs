// src/pipeline.rs
//! One polling run: settings gate -> fetch -> filter -> publish -> persist.

use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge};
use once_cell::sync::OnceCell;

use crate::feed::{Alert, AlertFeed, FetchedAlerts};
use crate::settings::SettingsStore;
use crate::threads::Publisher;
use crate::watermark;

/// One-time metric descriptions.
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("alerts_fetched_total", "Alerts parsed from the rider alerts feed.");
        describe_counter!("alerts_new_total", "Alerts newer than the stored watermark.");
        describe_counter!("alerts_published_total", "Posts and replies created on Threads.");
        describe_counter!("publish_failures_total", "Publish attempts that produced no post.");
        describe_counter!("replies_published_total", "Follow-up replies created.");
        describe_counter!("account_paused_total", "Times the destination blocked posting.");
        describe_counter!("feed_errors_total", "Feed fetch/parse errors.");
        describe_histogram!("feed_parse_ms", "Feed parse time in milliseconds.");
        describe_gauge!("pipeline_last_run_ts", "Unix ts when the pipeline last ran.");
    });
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    pub auto_reply: bool,
    /// ORed with `Settings::auto_publish`.
    pub auto_publish: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    Disabled,
    Paused { until: Option<DateTime<Utc>> },
    NoAlerts,
    NoNewAlerts { watermark: String },
    Completed { published: usize, halted: bool },
}

pub struct AlertProcessor {
    feed: Arc<dyn AlertFeed>,
    publisher: Publisher,
    store: Arc<dyn SettingsStore>,
    options: RunOptions,
}

/// Alerts strictly newer than the watermark, in feed order.
pub fn select_new_alerts(fetched: FetchedAlerts, watermark: Option<&str>) -> Vec<Alert> {
    fetched
        .into_alerts()
        .into_iter()
        .filter(|a| watermark::is_new(&a.message_stamp, watermark))
        .collect()
}

impl AlertProcessor {
    pub fn new(
        feed: Arc<dyn AlertFeed>,
        publisher: Publisher,
        store: Arc<dyn SettingsStore>,
        options: RunOptions,
    ) -> Self {
        Self {
            feed,
            publisher,
            store,
            options,
        }
    }

    pub async fn run_once(&self) -> Result<RunOutcome> {
        ensure_metrics_described();
        tracing::trace!("starting run");
        let now = Utc::now();
        gauge!("pipeline_last_run_ts").set(now.timestamp().max(0) as f64);

        let mut settings = self.store.load().await;

        if !settings.enabled {
            tracing::info!("application is disabled, exiting");
            return Ok(RunOutcome::Disabled);
        }

        if settings.paused {
            if settings.is_paused_at(now) {
                tracing::info!(
                    paused_until = ?settings.paused_until.map(|t| t.to_rfc3339()),
                    "application is paused, exiting"
                );
                return Ok(RunOutcome::Paused {
                    until: settings.paused_until,
                });
            }
            settings.clear_pause();
            self.store
                .save(&settings)
                .await
                .context("persisting unpause")?;
            tracing::info!("application is unpaused");
        }

        let fetched = match self.feed.fetch_alerts().await {
            Ok(Some(f)) if !f.is_empty() => f,
            Ok(_) => {
                tracing::info!(feed = self.feed.name(), "no alerts found");
                return Ok(RunOutcome::NoAlerts);
            }
            Err(e) => {
                counter!("feed_errors_total").increment(1);
                tracing::error!(feed = self.feed.name(), error = %format!("{e:#}"), "error fetching rider alerts");
                return Ok(RunOutcome::NoAlerts);
            }
        };

        let stored = settings.last_processed_alert_timestamp.clone();
        let new_alerts = select_new_alerts(fetched, stored.as_deref());
        if new_alerts.is_empty() {
            let watermark = watermark::effective(stored.as_deref()).to_string();
            tracing::info!(watermark = %watermark, "no new alerts detected");
            return Ok(RunOutcome::NoNewAlerts { watermark });
        }
        counter!("alerts_new_total").increment(new_alerts.len() as u64);

        let auto_publish = self.options.auto_publish || settings.auto_publish;
        let mut latest = stored;
        let mut published = 0usize;
        let mut halted = false;

        for alert in &new_alerts {
            let post_id = self
                .publisher
                .publish_alert(alert, &mut settings, auto_publish, self.options.auto_reply)
                .await;
            if post_id.is_none() {
                tracing::warn!(
                    alert_id = %alert.message_id,
                    remaining = new_alerts.len() - published,
                    "publish failed, stopping this run"
                );
                halted = true;
                break;
            }
            published += 1;
            latest = Some(watermark::advance(&alert.message_stamp, latest.as_deref()));
        }

        settings.last_processed_alert_timestamp = latest;
        self.store
            .save(&settings)
            .await
            .context("persisting watermark")?;

        tracing::info!(
            published,
            halted,
            watermark = ?settings.last_processed_alert_timestamp,
            "run finished"
        );
        Ok(RunOutcome::Completed { published, halted })
    }
}
