// src/threads/client.rs
use reqwest::{Client, Response};
use serde::Deserialize;

use crate::threads::types::{
    ApiError, ContainerStatus, CreateContainer, GraphError, PostDetails, ThreadsApi,
};

/// Threads Graph API over HTTPS.
#[derive(Clone)]
pub struct GraphThreadsClient {
    base_url: String,
    user_id: String,
    access_token: String,
    client: Client,
}

#[derive(Deserialize)]
struct IdResponse {
    id: Option<String>,
}

#[derive(Deserialize)]
struct StatusResponse {
    status: Option<String>,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: GraphError,
}

impl GraphThreadsClient {
    pub fn new(
        client: Client,
        base_url: impl Into<String>,
        user_id: impl Into<String>,
        access_token: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            user_id: user_id.into(),
            access_token: access_token.into(),
            client,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path)
    }

    /// 2xx -> body text; otherwise the Graph `error` object if there is one.
    async fn read_body(resp: Response) -> Result<String, ApiError> {
        let status = resp.status();
        let body = resp.text().await?;
        if status.is_success() {
            return Ok(body);
        }
        match serde_json::from_str::<ErrorEnvelope>(&body) {
            Ok(env) => Err(ApiError::Graph {
                status: status.as_u16(),
                error: env.error,
            }),
            Err(_) => Err(ApiError::Unexpected {
                status: status.as_u16(),
                body,
            }),
        }
    }

    fn parse_id(body: &str) -> Result<String, ApiError> {
        serde_json::from_str::<IdResponse>(body)
            .ok()
            .and_then(|r| r.id)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| ApiError::MissingId(body.to_string()))
    }
}

#[async_trait::async_trait]
impl ThreadsApi for GraphThreadsClient {
    async fn create_container(&self, req: &CreateContainer) -> Result<String, ApiError> {
        let resp = self
            .client
            .post(self.url(&format!("{}/threads", self.user_id)))
            .bearer_auth(&self.access_token)
            .json(req)
            .send()
            .await?;
        let body = Self::read_body(resp).await?;
        tracing::debug!(body = %body, "create container response");
        Self::parse_id(&body)
    }

    async fn container_status(&self, container_id: &str) -> Result<ContainerStatus, ApiError> {
        let resp = self
            .client
            .get(self.url(container_id))
            .query(&[("fields", "status")])
            .bearer_auth(&self.access_token)
            .send()
            .await?;
        let body = Self::read_body(resp).await?;
        let status = serde_json::from_str::<StatusResponse>(&body)
            .ok()
            .and_then(|r| r.status)
            .unwrap_or_default();
        Ok(ContainerStatus::parse(&status))
    }

    async fn publish_container(&self, container_id: &str) -> Result<String, ApiError> {
        let resp = self
            .client
            .post(self.url(&format!("{}/threads_publish", self.user_id)))
            .query(&[("creation_id", container_id)])
            .bearer_auth(&self.access_token)
            .send()
            .await?;
        let body = Self::read_body(resp).await?;
        tracing::debug!(body = %body, "publish response");
        Self::parse_id(&body)
    }

    async fn post_details(&self, post_id: &str) -> Result<PostDetails, ApiError> {
        let resp = self
            .client
            .get(self.url(post_id))
            .query(&[("fields", "id,permalink")])
            .bearer_auth(&self.access_token)
            .send()
            .await?;
        let body = Self::read_body(resp).await?;
        serde_json::from_str(&body).map_err(|_| ApiError::MissingId(body))
    }
}
