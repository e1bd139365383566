// src/threads/types.rs
use serde::{Deserialize, Serialize};

use crate::config::{ACTION_BLOCKED_CODE, ACTION_BLOCKED_SUBCODE};

/// Body of `POST /{user}/threads`.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct CreateContainer {
    pub media_type: &'static str,
    pub text: String,
    pub location_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_to_id: Option<String>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub auto_publish_text: bool,
}

impl CreateContainer {
    pub fn text(text: &str, location_id: &str) -> Self {
        Self {
            media_type: "TEXT",
            text: text.to_string(),
            location_id: location_id.to_string(),
            reply_to_id: None,
            auto_publish_text: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContainerStatus {
    Finished,
    InProgress,
    Published,
    Expired,
    Error,
    Other(String),
}

impl ContainerStatus {
    pub fn parse(s: &str) -> Self {
        match s {
            "FINISHED" => ContainerStatus::Finished,
            "IN_PROGRESS" => ContainerStatus::InProgress,
            "PUBLISHED" => ContainerStatus::Published,
            "EXPIRED" => ContainerStatus::Expired,
            "ERROR" => ContainerStatus::Error,
            other => ContainerStatus::Other(other.to_string()),
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, ContainerStatus::Finished)
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct PostDetails {
    pub id: String,
    #[serde(default)]
    pub permalink: Option<String>,
}

/// `error` object of a Graph API failure response.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct GraphError {
    #[serde(default)]
    pub message: String,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub code: Option<i64>,
    #[serde(default)]
    pub error_subcode: Option<i64>,
    #[serde(default)]
    pub fbtrace_id: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("graph api error (http {status}): {}", error.message)]
    Graph { status: u16, error: GraphError },
    #[error("unexpected response (http {status}): {body}")]
    Unexpected { status: u16, body: String },
    #[error("response had no id: {0}")]
    MissingId(String),
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Network trouble or a server-side hiccup; nothing to remember.
    Transient,
    /// The destination blocked the account; pause posting.
    Throttled,
    Unknown,
}

pub fn classify_failure(err: &ApiError) -> FailureKind {
    match err {
        ApiError::Graph { error, .. }
            if error.code == Some(ACTION_BLOCKED_CODE)
                && error.error_subcode == Some(ACTION_BLOCKED_SUBCODE) =>
        {
            FailureKind::Throttled
        }
        ApiError::Graph { status, .. } | ApiError::Unexpected { status, .. }
            if *status >= 500 || *status == 429 =>
        {
            FailureKind::Transient
        }
        ApiError::Transport(_) => FailureKind::Transient,
        _ => FailureKind::Unknown,
    }
}

#[async_trait::async_trait]
pub trait ThreadsApi: Send + Sync {
    /// Returns a container id, or the post id when `auto_publish_text` is set.
    async fn create_container(&self, req: &CreateContainer) -> Result<String, ApiError>;
    async fn container_status(&self, container_id: &str) -> Result<ContainerStatus, ApiError>;
    /// Returns the post id.
    async fn publish_container(&self, container_id: &str) -> Result<String, ApiError>;
    async fn post_details(&self, post_id: &str) -> Result<PostDetails, ApiError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph(status: u16, code: Option<i64>, sub: Option<i64>) -> ApiError {
        ApiError::Graph {
            status,
            error: GraphError {
                code,
                error_subcode: sub,
                ..Default::default()
            },
        }
    }

    #[test]
    fn action_blocked_pair_is_throttled() {
        let body = r#"{"message":"Action is blocked","type":"OAuthException","code":1,"error_subcode":2207051,"fbtrace_id":"A1"}"#;
        let error: GraphError = serde_json::from_str(body).unwrap();
        let err = ApiError::Graph { status: 400, error };
        assert_eq!(classify_failure(&err), FailureKind::Throttled);
    }

    #[test]
    fn other_graph_errors_are_not_throttled() {
        assert_eq!(
            classify_failure(&graph(400, Some(1), Some(99))),
            FailureKind::Unknown
        );
        assert_eq!(
            classify_failure(&graph(400, Some(190), None)),
            FailureKind::Unknown
        );
        assert_eq!(
            classify_failure(&graph(503, Some(2), None)),
            FailureKind::Transient
        );
        assert_eq!(
            classify_failure(&ApiError::MissingId("{}".into())),
            FailureKind::Unknown
        );
    }

    #[test]
    fn create_body_omits_optional_fields() {
        let v = serde_json::to_value(CreateContainer::text("hi", "123")).unwrap();
        assert_eq!(v["media_type"], "TEXT");
        assert!(v.get("reply_to_id").is_none());
        assert!(v.get("auto_publish_text").is_none());
    }
}
