// tests/common/mod.rs
#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::Result;
use rider_alerts_bot::feed::{Alert, AlertFeed, FetchedAlerts};
use rider_alerts_bot::retry::RetryPolicy;
use rider_alerts_bot::settings::{MemorySettingsStore, Settings};
use rider_alerts_bot::threads::{
    ApiError, ContainerStatus, CreateContainer, GraphError, PostDetails, Publisher, ThreadsApi,
};
use rider_alerts_bot::{AlertProcessor, RunOptions};

pub fn alert(id: &str, stamp: &str, kind: &str) -> Alert {
    Alert {
        message_id: id.into(),
        message_stamp: stamp.into(),
        kind: kind.into(),
        message: format!("alert {id}"),
    }
}

pub fn blocked_error() -> ApiError {
    ApiError::Graph {
        status: 400,
        error: GraphError {
            message: "Action is blocked".into(),
            code: Some(1),
            error_subcode: Some(2_207_051),
            ..Default::default()
        },
    }
}

pub fn other_graph_error() -> ApiError {
    ApiError::Graph {
        status: 400,
        error: GraphError {
            message: "Invalid parameter".into(),
            code: Some(100),
            ..Default::default()
        },
    }
}

/// Feed returning a fixed value and counting calls.
pub struct StaticFeed {
    result: Mutex<Option<Result<Option<FetchedAlerts>>>>,
    pub calls: Mutex<usize>,
}

impl StaticFeed {
    pub fn new(fetched: Option<FetchedAlerts>) -> Self {
        Self {
            result: Mutex::new(Some(Ok(fetched))),
            calls: Mutex::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            result: Mutex::new(Some(Err(anyhow::anyhow!("connection refused")))),
            calls: Mutex::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

#[async_trait::async_trait]
impl AlertFeed for StaticFeed {
    async fn fetch_alerts(&self) -> Result<Option<FetchedAlerts>> {
        *self.calls.lock().unwrap() += 1;
        self.result
            .lock()
            .unwrap()
            .take()
            .unwrap_or_else(|| Ok(None))
    }

    fn name(&self) -> &'static str {
        "Static"
    }
}

/// Scripted Threads API. Each queue is consumed front to back; an empty
/// queue falls back to a success.
#[derive(Default)]
pub struct FakeThreadsApi {
    pub creates: Mutex<Vec<CreateContainer>>,
    pub status_queries: Mutex<Vec<String>>,
    pub publishes: Mutex<Vec<String>>,
    pub detail_queries: Mutex<Vec<String>>,
    create_script: Mutex<VecDeque<Result<String, ApiError>>>,
    status_script: Mutex<VecDeque<Result<ContainerStatus, ApiError>>>,
    publish_script: Mutex<VecDeque<Result<String, ApiError>>>,
    pub details_fail: Mutex<bool>,
    counter: Mutex<u32>,
}

impl FakeThreadsApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_create(&self, r: Result<String, ApiError>) -> &Self {
        self.create_script.lock().unwrap().push_back(r);
        self
    }

    pub fn push_status(&self, r: Result<ContainerStatus, ApiError>) -> &Self {
        self.status_script.lock().unwrap().push_back(r);
        self
    }

    pub fn push_publish(&self, r: Result<String, ApiError>) -> &Self {
        self.publish_script.lock().unwrap().push_back(r);
        self
    }

    pub fn fail_details(&self) {
        *self.details_fail.lock().unwrap() = true;
    }

    pub fn creates(&self) -> Vec<CreateContainer> {
        self.creates.lock().unwrap().clone()
    }

    pub fn status_count(&self) -> usize {
        self.status_queries.lock().unwrap().len()
    }

    pub fn publish_count(&self) -> usize {
        self.publishes.lock().unwrap().len()
    }

    fn next_id(&self, prefix: &str) -> String {
        let mut c = self.counter.lock().unwrap();
        *c += 1;
        format!("{prefix}-{c}")
    }
}

#[async_trait::async_trait]
impl ThreadsApi for FakeThreadsApi {
    async fn create_container(&self, req: &CreateContainer) -> Result<String, ApiError> {
        self.creates.lock().unwrap().push(req.clone());
        let scripted = self.create_script.lock().unwrap().pop_front();
        match scripted {
            Some(r) => r,
            None if req.auto_publish_text => Ok(self.next_id("post")),
            None => Ok(self.next_id("container")),
        }
    }

    async fn container_status(&self, container_id: &str) -> Result<ContainerStatus, ApiError> {
        self.status_queries
            .lock()
            .unwrap()
            .push(container_id.to_string());
        let scripted = self.status_script.lock().unwrap().pop_front();
        scripted.unwrap_or(Ok(ContainerStatus::Finished))
    }

    async fn publish_container(&self, container_id: &str) -> Result<String, ApiError> {
        self.publishes.lock().unwrap().push(container_id.to_string());
        let scripted = self.publish_script.lock().unwrap().pop_front();
        scripted.unwrap_or_else(|| Ok(self.next_id("post")))
    }

    async fn post_details(&self, post_id: &str) -> Result<PostDetails, ApiError> {
        self.detail_queries
            .lock()
            .unwrap()
            .push(post_id.to_string());
        if *self.details_fail.lock().unwrap() {
            return Err(ApiError::Unexpected {
                status: 500,
                body: "boom".into(),
            });
        }
        Ok(PostDetails {
            id: post_id.to_string(),
            permalink: Some(format!("https://www.threads.net/@bot/post/{post_id}")),
        })
    }
}

pub fn fast_policy() -> RetryPolicy {
    RetryPolicy::exponential(3, Duration::from_millis(10))
}

pub struct Harness {
    pub api: Arc<FakeThreadsApi>,
    pub store: Arc<MemorySettingsStore>,
    pub feed: Arc<StaticFeed>,
    pub processor: AlertProcessor,
}

pub fn harness(settings: Settings, feed: StaticFeed, options: RunOptions) -> Harness {
    let api = Arc::new(FakeThreadsApi::new());
    harness_with_api(settings, feed, options, api)
}

pub fn harness_with_api(
    settings: Settings,
    feed: StaticFeed,
    options: RunOptions,
    api: Arc<FakeThreadsApi>,
) -> Harness {
    let store = Arc::new(MemorySettingsStore::with_settings(settings));
    let feed = Arc::new(feed);
    let publisher = Publisher::new(api.clone(), store.clone(), fast_policy());
    let processor = AlertProcessor::new(feed.clone(), publisher, store.clone(), options);
    Harness {
        api,
        store,
        feed,
        processor,
    }
}
