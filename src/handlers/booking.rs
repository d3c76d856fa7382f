use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::sse::{Event, Sse};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tokio_stream::wrappers::{BroadcastStream, IntervalStream};
use tokio_stream::StreamExt;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::{DraftPatch, ServiceId};
use crate::services::coordinator::{BookingCoordinator, SessionSnapshot};
use crate::state::AppState;

const KEEPALIVE: Duration = Duration::from_secs(30);

fn session(state: &AppState, id: Uuid) -> Result<Arc<BookingCoordinator>, AppError> {
    state
        .sessions
        .get(id)
        .ok_or_else(|| AppError::SessionNotFound(id.to_string()))
}

fn parse_service(raw: &str) -> Result<ServiceId, AppError> {
    raw.parse()
        .map_err(|e: crate::models::UnknownService| AppError::BadRequest(e.to_string()))
}

// POST /api/sessions
pub async fn create_session(
    State(state): State<Arc<AppState>>,
) -> (StatusCode, Json<SessionSnapshot>) {
    let coordinator = state.sessions.create();
    (StatusCode::CREATED, Json(coordinator.snapshot()))
}

// GET /api/sessions/:id
pub async fn get_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionSnapshot>, AppError> {
    Ok(Json(session(&state, id)?.snapshot()))
}

// DELETE /api/sessions/:id
pub async fn end_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if state.sessions.remove(id) {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::SessionNotFound(id.to_string()))
    }
}

// POST /api/sessions/:id/open
#[derive(Debug, Default, Deserialize)]
pub struct OpenRequest {
    pub service: Option<String>,
    pub details: Option<String>,
}

pub async fn open_flow(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    body: Bytes,
) -> Result<Json<SessionSnapshot>, AppError> {
    let coordinator = session(&state, id)?;

    // An empty body means "open without a service"; anything else must parse
    let request: OpenRequest = if body.iter().all(u8::is_ascii_whitespace) {
        OpenRequest::default()
    } else {
        serde_json::from_slice(&body)
            .map_err(|e| AppError::BadRequest(format!("invalid open request: {e}")))?
    };

    let service = request
        .service
        .as_deref()
        .filter(|s| !s.trim().is_empty())
        .map(parse_service)
        .transpose()?;

    coordinator.open(service, request.details);
    Ok(Json(coordinator.snapshot()))
}

// POST /api/sessions/:id/close
pub async fn close_flow(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionSnapshot>, AppError> {
    let coordinator = session(&state, id)?;
    coordinator.close();
    Ok(Json(coordinator.snapshot()))
}

// POST /api/sessions/:id/select
#[derive(Debug, Deserialize)]
pub struct SelectRequest {
    pub service: String,
}

pub async fn select_service(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(request): Json<SelectRequest>,
) -> Result<Json<SessionSnapshot>, AppError> {
    let coordinator = session(&state, id)?;
    coordinator.select_service(parse_service(&request.service)?)?;
    Ok(Json(coordinator.snapshot()))
}

// PATCH /api/sessions/:id/draft
pub async fn update_draft(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(patch): Json<DraftPatch>,
) -> Result<Json<SessionSnapshot>, AppError> {
    let coordinator = session(&state, id)?;
    coordinator.update(patch)?;
    Ok(Json(coordinator.snapshot()))
}

// POST /api/sessions/:id/submit
pub async fn submit(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<(StatusCode, Json<SessionSnapshot>), AppError> {
    let coordinator = session(&state, id)?;
    coordinator.submit()?;
    Ok((StatusCode::ACCEPTED, Json(coordinator.snapshot())))
}

// POST /api/sessions/:id/dismiss
pub async fn dismiss(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionSnapshot>, AppError> {
    let coordinator = session(&state, id)?;
    coordinator.dismiss()?;
    Ok(Json(coordinator.snapshot()))
}

// POST /api/sessions/:id/resend
pub async fn resend(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    let coordinator = session(&state, id)?;
    let delivered = coordinator.resend().await?;
    Ok(Json(serde_json::json!({
        "delivered": delivered,
        "session": coordinator.snapshot(),
    })))
}

// GET /api/sessions/:id/voice
pub async fn voice_clip(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    session(&state, id)?;
    let clip = state
        .sessions
        .clips()
        .latest(id)
        .ok_or_else(|| AppError::NotFound("no confirmation audio yet".to_string()))?;

    Ok(([(header::CONTENT_TYPE, clip.mime_type)], clip.data).into_response())
}

// GET /api/sessions/:id/events — SSE stream
pub async fn events_stream(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Sse<impl tokio_stream::Stream<Item = Result<Event, Infallible>>>, AppError> {
    let coordinator = session(&state, id)?;

    // Current state first so a reconnecting page can render straight away
    let snapshot = serde_json::to_string(&coordinator.snapshot()).unwrap_or_default();
    let initial = tokio_stream::once(Ok::<_, Infallible>(
        Event::default().data(snapshot).event("snapshot"),
    ));

    let live = BroadcastStream::new(coordinator.subscribe()).filter_map(|result| match result {
        Ok(event) => {
            let data = serde_json::to_string(&event).unwrap_or_default();
            Some(Ok(Event::default().data(data).event("flow_event")))
        }
        Err(BroadcastStreamRecvError::Lagged(_)) => None,
    });

    let keepalive = tokio_stream::StreamExt::map(
        IntervalStream::new(tokio::time::interval_at(
            tokio::time::Instant::now() + KEEPALIVE,
            KEEPALIVE,
        )),
        |_| Ok(Event::default().comment("keepalive")),
    );

    Ok(Sse::new(StreamExt::merge(initial.chain(live), keepalive)))
}
