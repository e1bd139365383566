// src/lib.rs
//! Rider alerts bot: republishes new Miami-Dade Transit rider alerts to Threads.
//!
//! One call to [`pipeline::AlertProcessor::run_once`] is one scheduled run.

pub mod config;
pub mod feed;
pub mod format;
pub mod pipeline;
pub mod retry;
pub mod settings;
pub mod telemetry;
pub mod threads;
pub mod watermark;

pub use crate::feed::{Alert, AlertFeed, FetchedAlerts, RiderAlertsFeed};
pub use crate::pipeline::{AlertProcessor, RunOptions, RunOutcome};
pub use crate::settings::{FileSettingsStore, MemorySettingsStore, Settings, SettingsStore};
pub use crate::threads::{GraphThreadsClient, Publisher, ThreadsApi};
