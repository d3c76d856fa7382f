use std::sync::Arc;

use axum::routing::{get, patch, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(handlers::health::health))
        .route("/api/services", get(handlers::catalog::list_services))
        .route("/api/sessions", post(handlers::booking::create_session))
        .route(
            "/api/sessions/:id",
            get(handlers::booking::get_session).delete(handlers::booking::end_session),
        )
        .route("/api/sessions/:id/open", post(handlers::booking::open_flow))
        .route("/api/sessions/:id/close", post(handlers::booking::close_flow))
        .route(
            "/api/sessions/:id/select",
            post(handlers::booking::select_service),
        )
        .route(
            "/api/sessions/:id/draft",
            patch(handlers::booking::update_draft),
        )
        .route("/api/sessions/:id/submit", post(handlers::booking::submit))
        .route("/api/sessions/:id/dismiss", post(handlers::booking::dismiss))
        .route("/api/sessions/:id/resend", post(handlers::booking::resend))
        .route(
            "/api/sessions/:id/events",
            get(handlers::booking::events_stream),
        )
        .route("/api/sessions/:id/voice", get(handlers::booking::voice_clip))
        .route("/api/contact", post(handlers::contact::contact))
        .route("/api/join-team", post(handlers::join_team::join_team))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
