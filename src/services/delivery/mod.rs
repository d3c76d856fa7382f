pub mod log;
pub mod webhook;

use async_trait::async_trait;

use crate::models::Submission;

/// Where submitted forms end up.
#[async_trait]
pub trait LeadDelivery: Send + Sync {
    async fn deliver(&self, submission: &Submission) -> anyhow::Result<()>;
}

/// Hands a submission over, giving up after `timeout`. Returns whether it was accepted.
pub async fn deliver_with_timeout(
    delivery: &dyn LeadDelivery,
    submission: &Submission,
    timeout: std::time::Duration,
) -> bool {
    match tokio::time::timeout(timeout, delivery.deliver(submission)).await {
        Ok(Ok(())) => true,
        Ok(Err(e)) => {
            tracing::error!(submission_id = %submission.id, error = %e, "lead delivery failed");
            false
        }
        Err(_) => {
            tracing::error!(submission_id = %submission.id, ?timeout, "lead delivery timed out");
            false
        }
    }
}
