// src/threads/mod.rs
pub mod client;
pub mod poller;
pub mod publisher;
pub mod types;

pub use client::GraphThreadsClient;
pub use poller::wait_for_container_ready;
pub use publisher::Publisher;
pub use types::{
    classify_failure, ApiError, ContainerStatus, CreateContainer, FailureKind, GraphError,
    PostDetails, ThreadsApi,
};
