use serde::Serialize;

use crate::models::{
    Confirmation, DraftPatch, FieldError, FieldRequirements, FlowState, LeadRequest, ServiceId,
};
use crate::services::catalog;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FlowError {
    #[error("cannot {action} while {}", .state.as_str())]
    InvalidTransition {
        action: &'static str,
        state: FlowState,
    },

    #[error("missing required fields")]
    Validation(Vec<FieldError>),
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct FlowSnapshot {
    pub state: FlowState,
    pub draft: LeadRequest,
    pub details_edited: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub field_errors: Vec<FieldError>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confirmation: Option<Confirmation>,
}

/// The lead capture wizard: service selection, then details, then confirmation.
///
/// Purely synchronous. Timers and delivery live in the coordinator; this type
/// only enforces which transitions are legal and keeps the draft consistent
/// with the catalog.
#[derive(Debug, Clone)]
pub struct LeadFlow {
    state: FlowState,
    draft: LeadRequest,
    default_service: ServiceId,
    requirements: FieldRequirements,
    details_edited: bool,
    pending_override: Option<String>,
    field_errors: Vec<FieldError>,
    confirmation: Option<Confirmation>,
}

impl LeadFlow {
    pub fn new(default_service: ServiceId, requirements: FieldRequirements) -> Self {
        Self {
            state: FlowState::Hidden,
            draft: LeadRequest::empty(default_service),
            default_service,
            requirements,
            details_edited: false,
            pending_override: None,
            field_errors: Vec::new(),
            confirmation: None,
        }
    }

    /// A flow embedded directly in a page: already on the form, never hidden.
    pub fn embedded(service: ServiceId, requirements: FieldRequirements) -> Self {
        let mut flow = Self::new(service, requirements);
        flow.open(Some(service), None);
        flow
    }

    pub fn state(&self) -> FlowState {
        self.state
    }

    pub fn draft(&self) -> &LeadRequest {
        &self.draft
    }

    pub fn confirmation(&self) -> Option<&Confirmation> {
        self.confirmation.as_ref()
    }

    pub fn is_open(&self) -> bool {
        self.state != FlowState::Hidden
    }

    pub fn snapshot(&self) -> FlowSnapshot {
        FlowSnapshot {
            state: self.state,
            draft: self.draft.clone(),
            details_edited: self.details_edited,
            field_errors: self.field_errors.clone(),
            confirmation: self.confirmation.clone(),
        }
    }

    /// Starts (or restarts) the wizard. Re-opening an open flow re-seeds the draft.
    pub fn open(&mut self, service: Option<ServiceId>, details_override: Option<String>) {
        self.reset();
        match service {
            Some(service) => {
                self.seed_service(service, details_override);
                self.state = FlowState::EnteringDetails;
            }
            None => {
                self.pending_override = details_override;
                self.state = FlowState::SelectingService;
            }
        }
    }

    pub fn select_service(&mut self, service: ServiceId) -> Result<(), FlowError> {
        self.expect(FlowState::SelectingService, "select a service")?;
        let details_override = self.pending_override.take();
        self.seed_service(service, details_override);
        self.state = FlowState::EnteringDetails;
        Ok(())
    }

    /// Applies field edits. A service change re-derives `details` from the
    /// catalog, overwriting anything typed so far; an explicit `details` in the
    /// same patch wins over the template.
    pub fn apply(&mut self, patch: DraftPatch) -> Result<(), FlowError> {
        self.expect(FlowState::EnteringDetails, "edit the request")?;

        if let Some(service) = patch.service_type {
            if service != self.draft.service_type {
                if self.details_edited {
                    tracing::warn!(
                        from = self.draft.service_type.as_str(),
                        to = service.as_str(),
                        "service changed after details were edited, replacing details with template"
                    );
                }
                self.draft.service_type = service;
                self.draft.details = catalog::template_for(service).to_string();
                self.details_edited = false;
            }
        }

        if let Some(details) = patch.details {
            self.draft.details = details;
            self.details_edited = true;
        }
        if let Some(name) = patch.name {
            self.draft.name = name;
        }
        if let Some(phone) = patch.phone {
            self.draft.phone = phone;
        }
        if let Some(email) = patch.email {
            self.draft.email = email;
        }
        if let Some(location) = patch.location {
            self.draft.location = location;
        }
        if let Some(prefers) = patch.prefers_messaging_channel {
            self.draft.prefers_messaging_channel = prefers;
        }
        if let Some(preferred_time) = patch.preferred_time {
            self.draft.preferred_time = preferred_time;
        }

        self.field_errors.clear();
        Ok(())
    }

    /// Validates the draft and moves to `Submitting`, returning what should be delivered.
    pub fn begin_submit(&mut self) -> Result<LeadRequest, FlowError> {
        self.expect(FlowState::EnteringDetails, "submit")?;

        if let Err(errors) = self.draft.validate(&self.requirements) {
            self.field_errors = errors.clone();
            return Err(FlowError::Validation(errors));
        }

        self.field_errors.clear();
        self.state = FlowState::Submitting;
        Ok(self.draft.clone())
    }

    pub fn complete(&mut self, confirmation: Confirmation) -> Result<(), FlowError> {
        self.expect(FlowState::Submitting, "confirm")?;
        self.confirmation = Some(confirmation);
        self.state = FlowState::Confirmed;
        Ok(())
    }

    pub fn mark_delivered(&mut self) {
        if let Some(confirmation) = self.confirmation.as_mut() {
            confirmation.delivered = true;
        }
    }

    pub fn dismiss(&mut self) -> Result<(), FlowError> {
        self.expect(FlowState::Confirmed, "dismiss")?;
        self.state = FlowState::Hidden;
        Ok(())
    }

    /// Hides the flow from any state. Returns whether anything changed.
    pub fn hide(&mut self) -> bool {
        let was_open = self.is_open();
        self.state = FlowState::Hidden;
        was_open
    }

    /// Wipes the draft and everything derived from it. The state is left alone.
    pub fn reset(&mut self) {
        self.draft = LeadRequest::empty(self.default_service);
        self.details_edited = false;
        self.pending_override = None;
        self.field_errors.clear();
        self.confirmation = None;
    }

    fn seed_service(&mut self, service: ServiceId, details_override: Option<String>) {
        self.draft.service_type = service;
        self.draft.details =
            details_override.unwrap_or_else(|| catalog::template_for(service).to_string());
        self.details_edited = false;
    }

    fn expect(&self, state: FlowState, action: &'static str) -> Result<(), FlowError> {
        if self.state == state {
            Ok(())
        } else {
            Err(FlowError::InvalidTransition {
                action,
                state: self.state,
            })
        }
    }
}
