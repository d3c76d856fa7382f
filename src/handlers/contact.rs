use std::sync::Arc;
use std::time::Duration;

use axum::extract::State;
use axum::Json;

use crate::errors::AppError;
use crate::models::DraftPatch;
use crate::services::contact::{submit_contact, ContactOutcome};
use crate::state::AppState;

// POST /api/contact
pub async fn contact(
    State(state): State<Arc<AppState>>,
    Json(form): Json<DraftPatch>,
) -> Result<Json<ContactOutcome>, AppError> {
    let settings = state.sessions.settings();

    let outcome = submit_contact(
        state.sessions.delivery().as_ref(),
        state.config.contact_requirements(),
        settings.delivery_timeout,
        Duration::from_millis(state.config.contact_display_ms),
        form,
    )
    .await?;

    Ok(Json(outcome))
}
