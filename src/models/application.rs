use serde::{Deserialize, Serialize};

use super::lead::{is_blank, FieldError};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum Trade {
    Plumber,
    Electrician,
    Carpenter,
    Painter,
    AcTechnician,
    Cleaner,
    Other,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ToolOwnership {
    Yes,
    No,
}

/// A tradesperson's request to join the network.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TradeApplication {
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub phone: String,
    pub trade: Option<Trade>,
    #[serde(default)]
    pub other_trade: String,
    pub own_tools: Option<ToolOwnership>,
    #[serde(default)]
    pub area: String,
}

impl TradeApplication {
    pub fn validate(&self) -> Result<(), Vec<FieldError>> {
        let mut errors = Vec::new();

        if is_blank(&self.full_name) {
            errors.push(FieldError::new("full_name", "please enter your full name"));
        }
        if is_blank(&self.phone) {
            errors.push(FieldError::new("phone", "please enter your phone number"));
        }
        match self.trade {
            None => errors.push(FieldError::new("trade", "please select your trade")),
            Some(Trade::Other) if is_blank(&self.other_trade) => {
                errors.push(FieldError::new("other_trade", "please specify your trade"))
            }
            Some(_) => {}
        }
        if self.own_tools.is_none() {
            errors.push(FieldError::new("own_tools", "please tell us if you own your tools"));
        }
        if is_blank(&self.area) {
            errors.push(FieldError::new("area", "please enter your area of operation"));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn application() -> TradeApplication {
        TradeApplication {
            full_name: "Chidi Okafor".to_string(),
            phone: "08033334444".to_string(),
            trade: Some(Trade::Electrician),
            other_trade: String::new(),
            own_tools: Some(ToolOwnership::Yes),
            area: "Lekki".to_string(),
        }
    }

    #[test]
    fn test_complete_application_is_valid() {
        assert!(application().validate().is_ok());
    }

    #[test]
    fn test_other_trade_needs_specifying() {
        let app = TradeApplication {
            trade: Some(Trade::Other),
            ..application()
        };
        let errors = app.validate().unwrap_err();
        assert_eq!(errors, vec![FieldError::new("other_trade", "please specify your trade")]);

        let app = TradeApplication {
            trade: Some(Trade::Other),
            other_trade: "Tiler".to_string(),
            ..application()
        };
        assert!(app.validate().is_ok());
    }

    #[test]
    fn test_missing_fields_reported_individually() {
        let app: TradeApplication = serde_json::from_str(r#"{"trade":null,"own_tools":null}"#).unwrap();
        let fields: Vec<_> = app
            .validate()
            .unwrap_err()
            .into_iter()
            .map(|e| e.field)
            .collect();
        assert_eq!(fields, vec!["full_name", "phone", "trade", "own_tools", "area"]);
    }

    #[test]
    fn test_trade_parses_kebab_case() {
        let trade: Trade = serde_json::from_str(r#""ac-technician""#).unwrap();
        assert_eq!(trade, Trade::AcTechnician);
    }
}
