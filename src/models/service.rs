use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum ServiceId {
    Handyman,
    MoveIn,
    Renovation,
    Emergency,
    NotSure,
}

impl ServiceId {
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceId::Handyman => "handyman",
            ServiceId::MoveIn => "move-in",
            ServiceId::Renovation => "renovation",
            ServiceId::Emergency => "emergency",
            ServiceId::NotSure => "not-sure",
        }
    }
}

impl fmt::Display for ServiceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown service: {0}")]
pub struct UnknownService(pub String);

impl FromStr for ServiceId {
    type Err = UnknownService;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "handyman" => Ok(ServiceId::Handyman),
            "move-in" | "movein" => Ok(ServiceId::MoveIn),
            "renovation" => Ok(ServiceId::Renovation),
            "emergency" => Ok(ServiceId::Emergency),
            "not-sure" => Ok(ServiceId::NotSure),
            other => Err(UnknownService(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ServiceOption {
    pub id: ServiceId,
    pub label: &'static str,
    pub description_template: &'static str,
}
