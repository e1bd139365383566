// src/feed/types.rs
use anyhow::Result;
use serde::{Deserialize, Serialize};

/// One rider alert as published by the transit feed.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Alert {
    #[serde(rename = "MessageID", default)]
    pub message_id: String,
    /// 14-digit `YYYYMMDDHHMMSS`, feed-local wall clock.
    #[serde(rename = "MessageStamp", default)]
    pub message_stamp: String,
    /// Raw category label, e.g. "Bus", "Train", "MetroMover".
    #[serde(rename = "Type", default)]
    pub kind: String,
    #[serde(rename = "Message", default)]
    pub message: String,
}

/// The feed yields a bare record when exactly one alert exists and a list
/// otherwise. Both shapes stop here; callers only ever see `into_alerts()`.
/// The XML adapter always yields `Many` (quick-xml folds a lone `<Record>` into
/// the list); `One` comes from JSON payloads and hand-built inputs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum FetchedAlerts {
    Many(Vec<Alert>),
    One(Alert),
}

impl FetchedAlerts {
    /// Uniform sequence in feed order.
    pub fn into_alerts(self) -> Vec<Alert> {
        match self {
            FetchedAlerts::One(a) => vec![a],
            FetchedAlerts::Many(v) => v,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, FetchedAlerts::Many(v) if v.is_empty())
    }
}

impl From<Alert> for FetchedAlerts {
    fn from(a: Alert) -> Self {
        FetchedAlerts::One(a)
    }
}

impl From<Vec<Alert>> for FetchedAlerts {
    fn from(v: Vec<Alert>) -> Self {
        FetchedAlerts::Many(v)
    }
}

#[async_trait::async_trait]
pub trait AlertFeed: Send + Sync {
    /// `Ok(None)` means the feed had nothing to offer this run.
    async fn fetch_alerts(&self) -> Result<Option<FetchedAlerts>>;
    fn name(&self) -> &'static str;
}
