// src/threads/poller.rs
use crate::retry::{retry_until, RetryOutcome, RetryPolicy};
use crate::threads::types::ThreadsApi;

/// Poll a media container until it reports `FINISHED`.
///
/// Status-query errors count as "not ready yet"; only running out of attempts
/// is reported, as `false`.
pub async fn wait_for_container_ready<A>(api: &A, container_id: &str, policy: &RetryPolicy) -> bool
where
    A: ThreadsApi + ?Sized,
{
    let outcome = retry_until(policy, move |attempt| async move {
        tracing::debug!(
            container_id,
            attempt,
            max_attempts = policy.max_attempts,
            "checking container status"
        );
        match api.container_status(container_id).await {
            Ok(status) => {
                tracing::info!(container_id, ?status, "container status");
                status.is_ready().then_some(())
            }
            Err(e) => {
                tracing::warn!(container_id, error = %e, "error fetching container status");
                None
            }
        }
    })
    .await;

    match outcome {
        RetryOutcome::Ready { attempts, .. } => {
            tracing::debug!(container_id, attempts, "container ready");
            true
        }
        RetryOutcome::Exhausted { attempts } => {
            tracing::error!(container_id, attempts, "container was not ready after maximum attempts");
            false
        }
    }
}
