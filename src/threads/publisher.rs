// src/threads/publisher.rs
use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use metrics::counter;

use crate::config::{LOCATION_ID, PAUSE_COOLDOWN, REPLY_TEXT};
use crate::feed::Alert;
use crate::format::format_post;
use crate::retry::RetryPolicy;
use crate::settings::{Settings, SettingsStore};
use crate::threads::poller::wait_for_container_ready;
use crate::threads::types::{classify_failure, ApiError, CreateContainer, FailureKind, ThreadsApi};

/// Drives create -> (wait -> publish) -> details against the Threads API.
pub struct Publisher {
    api: Arc<dyn ThreadsApi>,
    store: Arc<dyn SettingsStore>,
    poll_policy: RetryPolicy,
    location_id: String,
    reply_text: String,
}

impl Publisher {
    pub fn new(
        api: Arc<dyn ThreadsApi>,
        store: Arc<dyn SettingsStore>,
        poll_policy: RetryPolicy,
    ) -> Self {
        Self {
            api,
            store,
            poll_policy,
            location_id: LOCATION_ID.to_string(),
            reply_text: REPLY_TEXT.to_string(),
        }
    }

    pub fn with_reply_text(mut self, text: impl Into<String>) -> Self {
        self.reply_text = text.into();
        self
    }

    /// Post one alert, then the follow-up reply when `auto_reply` is on.
    /// The reply never changes the returned top-level post id.
    pub async fn publish_alert(
        &self,
        alert: &Alert,
        settings: &mut Settings,
        auto_publish: bool,
        auto_reply: bool,
    ) -> Option<String> {
        tracing::info!(
            alert_id = %alert.message_id,
            stamp = %alert.message_stamp,
            message = %alert.message,
            "new alert detected"
        );

        let text = format_post(alert);
        let post_id = self.publish(&text, settings, auto_publish, None).await?;

        if auto_reply {
            match self
                .publish(&self.reply_text, settings, auto_publish, Some(post_id.as_str()))
                .await
            {
                Some(reply_id) => {
                    counter!("replies_published_total").increment(1);
                    tracing::debug!(post_id = %post_id, reply_id = %reply_id, "reply posted");
                }
                None => tracing::warn!(post_id = %post_id, "reply failed; top-level post stands"),
            }
        }

        Some(post_id)
    }

    /// One post (or reply). `None` on any failure before a post id exists.
    pub async fn publish(
        &self,
        text: &str,
        settings: &mut Settings,
        auto_publish: bool,
        reply_to: Option<&str>,
    ) -> Option<String> {
        let kind = if reply_to.is_some() { "reply" } else { "top-level post" };
        tracing::debug!(auto_publish, kind, "starting publishing flow");

        let post_id = match self.create_and_publish(text, auto_publish, reply_to).await {
            Ok(Some(id)) => id,
            Ok(None) => {
                counter!("publish_failures_total").increment(1);
                return None;
            }
            Err(e) => {
                counter!("publish_failures_total").increment(1);
                tracing::error!(error = %e, kind, "error posting to threads");
                self.handle_failure(&e, settings).await;
                return None;
            }
        };

        tracing::info!(post_id = %post_id, kind, "post created");
        counter!("alerts_published_total").increment(1);

        tracing::debug!(post_id = %post_id, "getting post details");
        match self.api.post_details(&post_id).await {
            Ok(details) => tracing::info!(
                post_id = %details.id,
                permalink = details.permalink.as_deref().unwrap_or_default(),
                "alert posted to threads"
            ),
            Err(e) => tracing::warn!(post_id = %post_id, error = %e, "fetching post details failed"),
        }

        Some(post_id)
    }

    /// `Ok(None)` means the container never became ready.
    async fn create_and_publish(
        &self,
        text: &str,
        auto_publish: bool,
        reply_to: Option<&str>,
    ) -> Result<Option<String>, ApiError> {
        let mut req = CreateContainer::text(text, &self.location_id);
        req.reply_to_id = reply_to.map(str::to_string);
        req.auto_publish_text = auto_publish;

        let started = Instant::now();
        let created = self.api.create_container(&req).await?;

        if auto_publish {
            tracing::debug!(
                elapsed_ms = started.elapsed().as_millis() as u64,
                "time taken to post"
            );
            return Ok(Some(created));
        }

        tracing::info!(container_id = %created, "container created");
        let wait_started = Instant::now();
        if !wait_for_container_ready(&*self.api, &created, &self.poll_policy).await {
            tracing::error!(container_id = %created, "container not ready for publishing, aborting post");
            return Ok(None);
        }
        let waited = wait_started.elapsed();

        tracing::debug!(container_id = %created, "publishing container");
        let publish_started = Instant::now();
        let post_id = self.api.publish_container(&created).await?;
        tracing::debug!(
            publish_ms = publish_started.elapsed().as_millis() as u64,
            post_ms = started.elapsed().saturating_sub(waited).as_millis() as u64,
            "time taken to publish (excluding container wait)"
        );
        Ok(Some(post_id))
    }

    async fn handle_failure(&self, err: &ApiError, settings: &mut Settings) {
        match classify_failure(err) {
            FailureKind::Throttled => {
                let cooldown = chrono::Duration::from_std(PAUSE_COOLDOWN)
                    .unwrap_or_else(|_| chrono::Duration::hours(1));
                let until = Utc::now() + cooldown;
                tracing::warn!(paused_until = %until.to_rfc3339(), "action blocked, pausing posting");
                counter!("account_paused_total").increment(1);
                settings.pause_until(until);
                if let Err(e) = self.store.save(settings).await {
                    tracing::error!(error = %format!("{e:#}"), "saving pause state failed");
                }
            }
            FailureKind::Transient => tracing::debug!("transient failure, will retry next run"),
            FailureKind::Unknown => {}
        }
    }
}
