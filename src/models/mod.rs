pub mod application;
pub mod flow;
pub mod lead;
pub mod service;
pub mod submission;

pub use application::{ToolOwnership, Trade, TradeApplication};
pub use flow::{Confirmation, FlowEvent, FlowState};
pub use lead::{DraftPatch, FieldError, FieldRequirements, LeadField, LeadRequest};
pub use service::{ServiceId, ServiceOption, UnknownService};
pub use submission::{Submission, SubmissionKind};
