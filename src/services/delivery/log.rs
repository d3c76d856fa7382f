use async_trait::async_trait;

use super::LeadDelivery;
use crate::models::Submission;

/// Writes each submission to the log. Used when no webhook is configured.
pub struct LogDelivery;

#[async_trait]
impl LeadDelivery for LogDelivery {
    async fn deliver(&self, submission: &Submission) -> anyhow::Result<()> {
        let payload = serde_json::to_string(submission)?;
        tracing::info!(
            submission_id = %submission.id,
            kind = submission.kind.as_str(),
            %payload,
            "lead received"
        );
        Ok(())
    }
}
