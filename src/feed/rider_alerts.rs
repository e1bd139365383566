// src/feed/rider_alerts.rs
use anyhow::{Context, Result};
use async_trait::async_trait;
use metrics::{counter, histogram};
use once_cell::sync::OnceCell;
use quick_xml::de::from_str;
use regex::{Captures, Regex};
use serde::Deserialize;
use std::borrow::Cow;

use crate::feed::normalize_message;
use crate::feed::types::{Alert, AlertFeed, FetchedAlerts};

#[derive(Debug, Deserialize)]
struct RecordSet {
    #[serde(rename = "Record", default)]
    record: Vec<Alert>,
}

/// Miami-Dade Transit rider alerts (`<RecordSet><Record>…</Record></RecordSet>`).
pub struct RiderAlertsFeed {
    mode: Mode,
}

enum Mode {
    Fixture(String),
    Http { url: String, client: reqwest::Client },
}

impl RiderAlertsFeed {
    pub fn from_fixture_str(s: &str) -> Self {
        Self {
            mode: Mode::Fixture(s.to_string()),
        }
    }

    pub fn from_url(url: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            mode: Mode::Http {
                url: url.into(),
                client,
            },
        }
    }

    pub fn parse_records(s: &str) -> Result<Vec<Alert>> {
        let t0 = std::time::Instant::now();
        let xml_clean = scrub_html_entities_for_xml(s);
        let set: RecordSet = from_str(&xml_clean).context("parsing rider alerts xml")?;

        let out: Vec<Alert> = set
            .record
            .into_iter()
            .map(|mut a| {
                a.message = normalize_message(&a.message);
                a.message_stamp = a.message_stamp.trim().to_string();
                a.kind = a.kind.trim().to_string();
                a
            })
            .collect();

        let ms = t0.elapsed().as_secs_f64() * 1_000.0;
        histogram!("feed_parse_ms").record(ms);
        counter!("alerts_fetched_total").increment(out.len() as u64);
        Ok(out)
    }
}

#[async_trait]
impl AlertFeed for RiderAlertsFeed {
    async fn fetch_alerts(&self) -> Result<Option<FetchedAlerts>> {
        let body = match &self.mode {
            Mode::Fixture(s) => s.clone(),
            Mode::Http { url, client } => {
                tracing::debug!(url = %url, "fetching rider alerts");
                let resp = client
                    .get(url.as_str())
                    .send()
                    .await
                    .context("rider alerts http get()")?
                    .error_for_status()
                    .context("rider alerts non-2xx")?;
                let body = resp.text().await.context("rider alerts http .text()")?;
                tracing::debug!(bytes = body.len(), "rider alerts fetched");
                body
            }
        };

        if body.trim().is_empty() {
            return Ok(None);
        }
        let records = Self::parse_records(&body)?;
        Ok(Some(FetchedAlerts::from(records)))
    }

    fn name(&self) -> &'static str {
        "RiderAlerts"
    }
}

/// The feed embeds HTML named entities (`&nbsp;`, `&rsquo;`, ...) that XML does
/// not define. Rewrite them as numeric references; unknown names become literal text.
fn scrub_html_entities_for_xml(s: &str) -> Cow<'_, str> {
    static RE_NAMED: OnceCell<Regex> = OnceCell::new();
    let re = RE_NAMED.get_or_init(|| Regex::new(r"&([A-Za-z][A-Za-z0-9]*);").unwrap());
    re.replace_all(s, |caps: &Captures| {
        let whole = &caps[0];
        if matches!(&caps[1], "amp" | "lt" | "gt" | "quot" | "apos") {
            return whole.to_string();
        }
        let decoded = html_escape::decode_html_entities(whole);
        if decoded == whole {
            format!("&amp;{}", &whole[1..])
        } else {
            decoded.chars().map(|c| format!("&#{};", c as u32)).collect()
        }
    })
}
