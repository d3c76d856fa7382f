use serde::{Deserialize, Serialize};

use super::service::ServiceId;

/// The in-progress request a visitor fills in.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LeadRequest {
    pub name: String,
    pub phone: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub location: String,
    pub service_type: ServiceId,
    #[serde(default)]
    pub details: String,
    #[serde(default)]
    pub prefers_messaging_channel: bool,
    #[serde(default)]
    pub preferred_time: String,
}

impl LeadRequest {
    pub fn empty(service_type: ServiceId) -> Self {
        Self {
            name: String::new(),
            phone: String::new(),
            email: String::new(),
            location: String::new(),
            service_type,
            details: String::new(),
            prefers_messaging_channel: false,
            preferred_time: String::new(),
        }
    }

    /// Checks required fields. `name` and `phone` are always required.
    pub fn validate(&self, required: &FieldRequirements) -> Result<(), Vec<FieldError>> {
        let mut errors = Vec::new();

        if is_blank(&self.name) {
            errors.push(FieldError::required(LeadField::Name));
        }
        if is_blank(&self.phone) {
            errors.push(FieldError::required(LeadField::Phone));
        }
        if required.email && is_blank(&self.email) {
            errors.push(FieldError::required(LeadField::Email));
        }
        if required.location && is_blank(&self.location) {
            errors.push(FieldError::required(LeadField::Location));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// A partial update to a draft. Absent fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DraftPatch {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub location: Option<String>,
    pub service_type: Option<ServiceId>,
    pub details: Option<String>,
    pub prefers_messaging_channel: Option<bool>,
    pub preferred_time: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct FieldRequirements {
    #[serde(default)]
    pub email: bool,
    #[serde(default)]
    pub location: bool,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LeadField {
    Name,
    Phone,
    Email,
    Location,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &str, message: &str) -> Self {
        Self {
            field: field.to_string(),
            message: message.to_string(),
        }
    }

    pub fn required(field: LeadField) -> Self {
        let (name, message) = match field {
            LeadField::Name => ("name", "please enter your name"),
            LeadField::Phone => ("phone", "please enter a phone number we can reach you on"),
            LeadField::Email => ("email", "please enter your email address"),
            LeadField::Location => ("location", "please tell us where the job is"),
        };
        Self::new(name, message)
    }
}

pub(crate) fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}
