use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::application::TradeApplication;
use super::lead::LeadRequest;

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "kind", content = "payload", rename_all = "snake_case")]
pub enum SubmissionKind {
    Booking(LeadRequest),
    Contact(LeadRequest),
    Application(TradeApplication),
}

impl SubmissionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubmissionKind::Booking(_) => "booking",
            SubmissionKind::Contact(_) => "contact",
            SubmissionKind::Application(_) => "application",
        }
    }
}

/// A submitted form on its way to lead delivery.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Submission {
    pub id: Uuid,
    pub submitted_at: DateTime<Utc>,
    #[serde(flatten)]
    pub kind: SubmissionKind,
}

impl Submission {
    pub fn new(kind: SubmissionKind) -> Self {
        Self {
            id: Uuid::new_v4(),
            submitted_at: Utc::now(),
            kind,
        }
    }
}
