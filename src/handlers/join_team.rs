use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;

use crate::errors::AppError;
use crate::models::TradeApplication;
use crate::services::applications::{submit_application, ApplicationReceipt};
use crate::state::AppState;

// POST /api/join-team
pub async fn join_team(
    State(state): State<Arc<AppState>>,
    Json(application): Json<TradeApplication>,
) -> Result<(StatusCode, Json<ApplicationReceipt>), AppError> {
    let receipt = submit_application(
        state.sessions.delivery().as_ref(),
        state.sessions.settings().delivery_timeout,
        application,
    )
    .await
    .map_err(AppError::Validation)?;

    Ok((StatusCode::CREATED, Json(receipt)))
}
