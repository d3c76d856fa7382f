use std::time::Duration;

use serde::Serialize;
use uuid::Uuid;

use crate::models::{FieldError, Submission, SubmissionKind, TradeApplication};
use crate::services::delivery::{deliver_with_timeout, LeadDelivery};

#[derive(Debug, Clone, Serialize)]
pub struct ApplicationReceipt {
    pub submission_id: Uuid,
    pub delivered: bool,
}

pub async fn submit_application(
    delivery: &dyn LeadDelivery,
    delivery_timeout: Duration,
    application: TradeApplication,
) -> Result<ApplicationReceipt, Vec<FieldError>> {
    application.validate()?;

    let submission = Submission::new(SubmissionKind::Application(application));
    let delivered = deliver_with_timeout(delivery, &submission, delivery_timeout).await;

    tracing::info!(submission_id = %submission.id, delivered, "trade application received");

    Ok(ApplicationReceipt {
        submission_id: submission.id,
        delivered,
    })
}
