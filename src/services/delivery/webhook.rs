use anyhow::Context;
use async_trait::async_trait;

use super::LeadDelivery;
use crate::models::Submission;

/// Posts each submission as JSON to an operator-supplied URL.
pub struct WebhookDelivery {
    url: String,
    client: reqwest::Client,
}

impl WebhookDelivery {
    pub fn new(url: String) -> Self {
        Self {
            url,
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl LeadDelivery for WebhookDelivery {
    async fn deliver(&self, submission: &Submission) -> anyhow::Result<()> {
        self.client
            .post(&self.url)
            .json(submission)
            .send()
            .await
            .context("failed to post lead to webhook")?
            .error_for_status()
            .context("lead webhook returned error")?;

        tracing::info!(submission_id = %submission.id, kind = submission.kind.as_str(), "lead delivered to webhook");
        Ok(())
    }
}
