// src/settings.rs
//! Process-wide settings persisted between runs.

use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::fs;

fn default_enabled() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default)]
    pub paused: bool,
    #[serde(default, with = "paused_until_format")]
    pub paused_until: Option<DateTime<Utc>>,
    /// Watermark: stamp of the newest alert published so far.
    #[serde(default)]
    pub last_processed_alert_timestamp: Option<String>,
    #[serde(default)]
    pub auto_publish: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            enabled: true,
            paused: false,
            paused_until: None,
            last_processed_alert_timestamp: None,
            auto_publish: false,
        }
    }
}

impl Settings {
    /// Still inside a cooldown at `now`. A pause without a deadline counts as elapsed.
    pub fn is_paused_at(&self, now: DateTime<Utc>) -> bool {
        self.paused && self.paused_until.is_some_and(|until| until > now)
    }

    pub fn pause_until(&mut self, until: DateTime<Utc>) {
        self.paused = true;
        self.paused_until = Some(until);
    }

    pub fn clear_pause(&mut self) {
        self.paused = false;
        self.paused_until = None;
    }
}

/// Written as RFC 3339; read from RFC 3339 or RFC 2822 (`Date.toUTCString()`-style
/// files). Anything unreadable becomes `None`.
mod paused_until_format {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(v: &Option<DateTime<Utc>>, s: S) -> Result<S::Ok, S::Error> {
        match v {
            Some(dt) => s.serialize_str(&dt.to_rfc3339()),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<DateTime<Utc>>, D::Error> {
        let raw: Option<String> = Option::deserialize(d)?;
        Ok(raw.as_deref().and_then(parse))
    }

    pub fn parse(s: &str) -> Option<DateTime<Utc>> {
        let s = s.trim();
        DateTime::parse_from_rfc3339(s)
            .or_else(|_| DateTime::parse_from_rfc2822(s))
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }
}

#[async_trait::async_trait]
pub trait SettingsStore: Send + Sync {
    /// Never fails: absent or unreadable state yields defaults.
    async fn load(&self) -> Settings;
    /// Whole-document overwrite.
    async fn save(&self, settings: &Settings) -> Result<()>;
}

/// JSON file on disk, replaced atomically via a sibling temp file.
#[derive(Debug, Clone)]
pub struct FileSettingsStore {
    path: PathBuf,
}

impl FileSettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "settings.json".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait::async_trait]
impl SettingsStore for FileSettingsStore {
    async fn load(&self) -> Settings {
        let raw = match fs::read_to_string(&self.path).await {
            Ok(s) => s,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = %self.path.display(), "settings file not found, using defaults");
                return Settings::default();
            }
            Err(e) => {
                tracing::error!(path = %self.path.display(), error = %e, "reading settings failed, using defaults");
                return Settings::default();
            }
        };
        match serde_json::from_str(&raw) {
            Ok(s) => s,
            Err(e) => {
                tracing::error!(path = %self.path.display(), error = %e, "settings unparseable, using defaults");
                Settings::default()
            }
        }
    }

    async fn save(&self, settings: &Settings) -> Result<()> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)
                .await
                .with_context(|| format!("creating settings dir {}", dir.display()))?;
        }
        let body = serde_json::to_vec_pretty(settings).context("serializing settings")?;
        let tmp = self.tmp_path();
        fs::write(&tmp, &body)
            .await
            .with_context(|| format!("writing {}", tmp.display()))?;
        fs::rename(&tmp, &self.path)
            .await
            .with_context(|| format!("replacing {}", self.path.display()))?;
        tracing::debug!(path = %self.path.display(), "settings saved");
        Ok(())
    }
}

/// In-process store; keeps every saved snapshot for inspection.
#[derive(Debug, Default)]
pub struct MemorySettingsStore {
    initial: Option<Settings>,
    saves: Mutex<Vec<Settings>>,
}

impl MemorySettingsStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_settings(settings: Settings) -> Self {
        Self {
            initial: Some(settings),
            saves: Mutex::new(Vec::new()),
        }
    }

    pub fn saves(&self) -> Vec<Settings> {
        self.saves.lock().map(|v| v.clone()).unwrap_or_default()
    }

    /// Last saved state, or the initial one if nothing was saved.
    pub fn current(&self) -> Settings {
        self.saves()
            .pop()
            .or_else(|| self.initial.clone())
            .unwrap_or_default()
    }
}

#[async_trait::async_trait]
impl SettingsStore for MemorySettingsStore {
    async fn load(&self) -> Settings {
        self.current()
    }

    async fn save(&self, settings: &Settings) -> Result<()> {
        self.saves
            .lock()
            .map_err(|_| anyhow::anyhow!("settings store mutex poisoned"))?
            .push(settings.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    #[test]
    fn defaults_fill_missing_fields() {
        let s: Settings = serde_json::from_str("{}").unwrap();
        assert_eq!(s, Settings::default());
        assert!(s.enabled);
    }

    #[test]
    fn paused_until_accepts_utc_string_form() {
        let s: Settings = serde_json::from_str(
            r#"{"enabled":true,"paused":true,"pausedUntil":"Mon, 01 Jan 2024 05:00:00 GMT"}"#,
        )
        .unwrap();
        assert_eq!(
            s.paused_until,
            Some(Utc.with_ymd_and_hms(2024, 1, 1, 5, 0, 0).unwrap())
        );
    }

    #[test]
    fn unreadable_paused_until_counts_as_elapsed() {
        let s: Settings =
            serde_json::from_str(r#"{"paused":true,"pausedUntil":"not a date"}"#).unwrap();
        assert!(s.paused);
        assert!(s.paused_until.is_none());
        assert!(!s.is_paused_at(Utc::now()));
    }

    #[test]
    fn pause_window() {
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        let mut s = Settings::default();
        s.pause_until(now + Duration::hours(1));
        assert!(s.is_paused_at(now));
        assert!(!s.is_paused_at(now + Duration::hours(2)));
        s.clear_pause();
        assert!(!s.paused && s.paused_until.is_none());
    }

    #[test]
    fn serializes_camel_case() {
        let mut s = Settings::default();
        s.last_processed_alert_timestamp = Some("20240101000000".into());
        let v = serde_json::to_value(&s).unwrap();
        assert_eq!(v["lastProcessedAlertTimestamp"], "20240101000000");
        assert!(v["pausedUntil"].is_null());
        assert_eq!(v["autoPublish"], false);
    }
}
