// src/config.rs
use std::env;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{anyhow, Result};

use crate::retry::RetryPolicy;

pub const DEFAULT_FEED_URL: &str = "https://www.miamidade.gov/transit/WebServices/RiderAlerts/";
pub const DEFAULT_THREADS_API_URL: &str = "https://graph.threads.net";
pub const DEFAULT_THREADS_USER_ID: &str = "me";
pub const DEFAULT_SETTINGS_PATH: &str = "data/settings.json";
pub const DEFAULT_LOG_LEVEL: &str = "info";
pub const DEFAULT_MAX_CONTAINER_STATUS_ATTEMPTS: u32 = 5;
pub const DEFAULT_CONTAINER_STATUS_INITIAL_WAIT_MS: u64 = 1_000;
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

/// Miami, FL place id attached to every post.
pub const LOCATION_ID: &str = "1209084156595889";
pub const REPLY_TEXT: &str =
    "Follow this account to get up to date information about Miami Dade Transit. (Unofficial account)";

/// Graph API `(code, error_subcode)` for "action blocked".
pub const ACTION_BLOCKED_CODE: i64 = 1;
pub const ACTION_BLOCKED_SUBCODE: i64 = 2_207_051;
pub const PAUSE_COOLDOWN: Duration = Duration::from_secs(60 * 60);

#[derive(Debug, Clone)]
pub struct LogConfig {
    pub level: String,
    pub file: Option<PathBuf>,
}

#[derive(Clone)]
pub struct AppConfig {
    pub access_token: String,
    pub threads_api_url: String,
    pub threads_user_id: String,
    pub feed_url: String,
    pub settings_path: PathBuf,
    pub auto_reply: bool,
    pub auto_publish: bool,
    pub max_container_status_attempts: u32,
    pub container_status_initial_wait: Duration,
    pub http_timeout: Duration,
    pub log: LogConfig,
}

// Keeps the token out of logs.
impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("access_token_len", &self.access_token.len())
            .field("threads_api_url", &self.threads_api_url)
            .field("threads_user_id", &self.threads_user_id)
            .field("feed_url", &self.feed_url)
            .field("settings_path", &self.settings_path)
            .field("auto_reply", &self.auto_reply)
            .field("auto_publish", &self.auto_publish)
            .field("max_container_status_attempts", &self.max_container_status_attempts)
            .field("container_status_initial_wait", &self.container_status_initial_wait)
            .field("http_timeout", &self.http_timeout)
            .field("log", &self.log)
            .finish()
    }
}

fn var_or(key: &str, default: &str) -> String {
    env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn parsed_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

/// Only the exact string `true` enables a flag.
fn flag(key: &str) -> bool {
    env::var(key).map(|v| v == "true").unwrap_or(false)
}

impl LogConfig {
    pub fn from_env() -> Self {
        Self {
            level: var_or("LOG_LEVEL", DEFAULT_LOG_LEVEL),
            file: env::var("LOG_FILE")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        let access_token = env::var("ACCESS_TOKEN")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| anyhow!("Missing ACCESS_TOKEN env var"))?;

        // Zero or garbage falls back to the defaults.
        let attempts = parsed_or(
            "MAX_CONTAINER_STATUS_ATTEMPTS",
            DEFAULT_MAX_CONTAINER_STATUS_ATTEMPTS,
        );
        let wait_ms = parsed_or(
            "CONTAINER_STATUS_INITIAL_WAIT_MS",
            DEFAULT_CONTAINER_STATUS_INITIAL_WAIT_MS,
        );

        Ok(Self {
            access_token,
            threads_api_url: var_or("THREADS_API_URL", DEFAULT_THREADS_API_URL)
                .trim_end_matches('/')
                .to_string(),
            threads_user_id: var_or("THREADS_USER_ID", DEFAULT_THREADS_USER_ID),
            feed_url: var_or("RIDER_ALERTS_FEED_URL", DEFAULT_FEED_URL),
            settings_path: PathBuf::from(var_or("SETTINGS_FILE_PATH", DEFAULT_SETTINGS_PATH)),
            auto_reply: flag("AUTO_REPLY"),
            auto_publish: flag("AUTO_PUBLISH"),
            max_container_status_attempts: if attempts == 0 {
                DEFAULT_MAX_CONTAINER_STATUS_ATTEMPTS
            } else {
                attempts
            },
            container_status_initial_wait: Duration::from_millis(if wait_ms == 0 {
                DEFAULT_CONTAINER_STATUS_INITIAL_WAIT_MS
            } else {
                wait_ms
            }),
            http_timeout: Duration::from_secs(parsed_or(
                "HTTP_TIMEOUT_SECS",
                DEFAULT_HTTP_TIMEOUT_SECS,
            )),
            log: LogConfig::from_env(),
        })
    }

    pub fn poll_policy(&self) -> RetryPolicy {
        RetryPolicy::exponential(
            self.max_container_status_attempts,
            self.container_status_initial_wait,
        )
    }
}
