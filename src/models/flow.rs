use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::lead::LeadRequest;
use super::service::ServiceId;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FlowState {
    Hidden,
    SelectingService,
    EnteringDetails,
    Submitting,
    Confirmed,
}

impl FlowState {
    pub fn as_str(&self) -> &'static str {
        match self {
            FlowState::Hidden => "hidden",
            FlowState::SelectingService => "selecting_service",
            FlowState::EnteringDetails => "entering_details",
            FlowState::Submitting => "submitting",
            FlowState::Confirmed => "confirmed",
        }
    }
}

/// What the visitor sees once a request has gone through.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Confirmation {
    pub submission_id: Uuid,
    pub lead: LeadRequest,
    pub delivered: bool,
    pub confirmed_at: DateTime<Utc>,
}

/// Broadcast to anything observing a session (SSE clients, the voice listener).
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FlowEvent {
    Opened {
        state: FlowState,
        service: Option<ServiceId>,
    },
    ServiceSelected {
        service: ServiceId,
    },
    Submitting,
    Confirmed {
        confirmation: Confirmation,
    },
    Closed,
    Reset,
}
