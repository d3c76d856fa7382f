use std::env;

use crate::models::{FieldRequirements, ServiceId};

const DEFAULT_PHRASE: &str = "Request sent. We will be in touch shortly.";

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub port: u16,
    pub default_service: ServiceId,
    pub submit_delay_ms: u64,
    pub reset_delay_ms: u64,
    pub delivery_timeout_ms: u64,
    pub contact_display_ms: u64,
    pub session_ttl_secs: u64,
    pub require_email: bool,
    pub require_location: bool,
    pub contact_require_email: bool,
    pub contact_require_location: bool,
    pub lead_webhook_url: Option<String>,
    pub gemini_api_key: String,
    pub gemini_tts_model: String,
    pub gemini_voice: String,
    pub confirmation_phrase: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let number = |key: &str, default: u64| {
            lookup(key)
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(default)
        };
        let flag = |key: &str| {
            lookup(key)
                .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
                .unwrap_or(false)
        };

        let default_service = match lookup("DEFAULT_SERVICE") {
            Some(raw) => raw.parse::<ServiceId>().unwrap_or_else(|e| {
                tracing::warn!(error = %e, "ignoring DEFAULT_SERVICE, falling back to handyman");
                ServiceId::Handyman
            }),
            None => ServiceId::Handyman,
        };

        Self {
            port: lookup("PORT")
                .and_then(|v| v.parse().ok())
                .unwrap_or(3000),
            default_service,
            submit_delay_ms: number("SUBMIT_DELAY_MS", 500),
            reset_delay_ms: number("RESET_DELAY_MS", 300),
            delivery_timeout_ms: number("DELIVERY_TIMEOUT_MS", 5000),
            contact_display_ms: number("CONTACT_DISPLAY_MS", 5000),
            session_ttl_secs: number("SESSION_TTL_SECS", 1800),
            require_email: flag("REQUIRE_EMAIL"),
            require_location: flag("REQUIRE_LOCATION"),
            contact_require_email: flag("CONTACT_REQUIRE_EMAIL"),
            contact_require_location: flag("CONTACT_REQUIRE_LOCATION"),
            lead_webhook_url: lookup("LEAD_WEBHOOK_URL").filter(|v| !v.trim().is_empty()),
            gemini_api_key: lookup("GEMINI_API_KEY").unwrap_or_default(),
            gemini_tts_model: lookup("GEMINI_TTS_MODEL")
                .unwrap_or_else(|| "gemini-2.5-flash-preview-tts".to_string()),
            gemini_voice: lookup("GEMINI_VOICE").unwrap_or_else(|| "Kore".to_string()),
            confirmation_phrase: lookup("CONFIRMATION_PHRASE")
                .unwrap_or_else(|| DEFAULT_PHRASE.to_string()),
        }
    }

    /// Required fields for the booking flow.
    pub fn booking_requirements(&self) -> FieldRequirements {
        FieldRequirements {
            email: self.require_email,
            location: self.require_location,
        }
    }

    /// Required fields for the contact page's form, set independently of the booking flow.
    pub fn contact_requirements(&self) -> FieldRequirements {
        FieldRequirements {
            email: self.contact_require_email,
            location: self.contact_require_location,
        }
    }
}
