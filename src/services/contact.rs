use std::time::Duration;

use chrono::Utc;
use serde::Serialize;

use crate::models::{
    Confirmation, DraftPatch, FieldRequirements, ServiceId, Submission, SubmissionKind,
};
use crate::services::delivery::{deliver_with_timeout, LeadDelivery};
use crate::services::flow::{FlowError, LeadFlow};

#[derive(Debug, Clone, Serialize)]
pub struct ContactOutcome {
    pub confirmation: Confirmation,
    /// How long the page should show its "request sent" notice before
    /// offering the form again.
    pub display_for_ms: u64,
}

/// Handles the contact page's standalone form: the same draft and
/// validation as the booking flow, without a coordinator around it.
pub async fn submit_contact(
    delivery: &dyn LeadDelivery,
    requirements: FieldRequirements,
    delivery_timeout: Duration,
    display_for: Duration,
    form: DraftPatch,
) -> Result<ContactOutcome, FlowError> {
    let mut flow = LeadFlow::embedded(ServiceId::NotSure, requirements);
    flow.apply(form)?;
    let lead = flow.begin_submit()?;

    let submission = Submission::new(SubmissionKind::Contact(lead.clone()));
    let delivered = deliver_with_timeout(delivery, &submission, delivery_timeout).await;

    let confirmation = Confirmation {
        submission_id: submission.id,
        lead,
        delivered,
        confirmed_at: Utc::now(),
    };
    flow.complete(confirmation.clone())?;

    tracing::info!(submission_id = %submission.id, delivered, "contact request received");

    Ok(ContactOutcome {
        confirmation,
        display_for_ms: display_for.as_millis() as u64,
    })
}
