use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use tokio_stream::StreamExt;
use tower::ServiceExt;

use leadline::config::AppConfig;
use leadline::models::Submission;
use leadline::routes;
use leadline::services::coordinator::FlowSettings;
use leadline::services::delivery::LeadDelivery;
use leadline::services::sessions::SessionRegistry;
use leadline::services::voice::{AudioClip, ClipStore, VoiceSynthesizer};
use leadline::state::AppState;

// ── Mock Providers ──

struct MockDelivery {
    received: Arc<Mutex<Vec<Submission>>>,
}

#[async_trait]
impl LeadDelivery for MockDelivery {
    async fn deliver(&self, submission: &Submission) -> anyhow::Result<()> {
        self.received.lock().unwrap().push(submission.clone());
        Ok(())
    }
}

struct MockVoice;

#[async_trait]
impl VoiceSynthesizer for MockVoice {
    async fn synthesize(&self, phrase: &str) -> anyhow::Result<AudioClip> {
        Ok(AudioClip {
            mime_type: "audio/wav".to_string(),
            data: phrase.as_bytes().to_vec(),
        })
    }
}

// ── Helpers ──

fn test_config() -> AppConfig {
    AppConfig::from_lookup(|_| None)
}

fn test_state_with_received() -> (Arc<AppState>, Arc<Mutex<Vec<Submission>>>) {
    test_state_with_config(test_config())
}

fn test_state_with_config(config: AppConfig) -> (Arc<AppState>, Arc<Mutex<Vec<Submission>>>) {
    let received = Arc::new(Mutex::new(vec![]));
    let delivery = MockDelivery {
        received: Arc::clone(&received),
    };
    let sessions = SessionRegistry::new(
        FlowSettings::from_config(&config),
        Arc::new(delivery),
        Arc::new(MockVoice),
        Arc::new(ClipStore::default()),
        config.confirmation_phrase.clone(),
    );
    let state = Arc::new(AppState { config, sessions });
    (state, received)
}

fn test_state() -> Arc<AppState> {
    test_state_with_received().0
}

fn test_app(state: Arc<AppState>) -> Router {
    routes::router(state)
}

fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("Content-Type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn empty_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

async fn send(state: &Arc<AppState>, req: Request<Body>) -> (StatusCode, serde_json::Value) {
    let res = test_app(state.clone()).oneshot(req).await.unwrap();
    let status = res.status();
    let body = axum::body::to_bytes(res.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null);
    (status, json)
}

async fn new_session(state: &Arc<AppState>) -> String {
    let (status, json) = send(state, empty_request("POST", "/api/sessions")).await;
    assert_eq!(status, StatusCode::CREATED);
    json["id"].as_str().unwrap().to_string()
}

// ── Basics ──

#[tokio::test]
async fn test_health() {
    let state = test_state();
    let (status, json) = send(&state, empty_request("GET", "/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
}

#[tokio::test]
async fn test_list_services() {
    let state = test_state();
    let (status, json) = send(&state, empty_request("GET", "/api/services")).await;
    assert_eq!(status, StatusCode::OK);
    let ids: Vec<&str> = json
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["id"].as_str().unwrap())
        .collect();
    assert!(ids.contains(&"handyman"));
    assert!(ids.contains(&"move-in"));
    assert!(ids.contains(&"renovation"));
    assert!(ids.contains(&"emergency"));
}

#[tokio::test]
async fn test_new_session_starts_hidden() {
    let state = test_state();
    let (status, json) = send(&state, empty_request("POST", "/api/sessions")).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["state"], "hidden");
    assert_eq!(json["scroll_locked"], false);
    assert_eq!(json["draft"]["service_type"], "handyman");
}

#[tokio::test]
async fn test_unknown_session_is_404() {
    let state = test_state();
    let uri = format!("/api/sessions/{}", uuid::Uuid::new_v4());
    let (status, _) = send(&state, empty_request("GET", &uri)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// ── Booking Flow ──

#[tokio::test]
async fn test_open_with_service_skips_selection() {
    let state = test_state();
    let id = new_session(&state).await;

    let (status, json) = send(
        &state,
        json_request(
            "POST",
            &format!("/api/sessions/{id}/open"),
            serde_json::json!({"service": "renovation"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["state"], "entering_details");
    assert_eq!(json["draft"]["service_type"], "renovation");
    assert_eq!(
        json["draft"]["details"],
        leadline::services::catalog::template_for(leadline::models::ServiceId::Renovation)
    );
    assert_eq!(json["scroll_locked"], true);
}

#[tokio::test]
async fn test_open_with_details_override() {
    let state = test_state();
    let id = new_session(&state).await;

    let (_, json) = send(
        &state,
        json_request(
            "POST",
            &format!("/api/sessions/{id}/open"),
            serde_json::json!({"service": "move-in", "details": "Imperial Collection package"}),
        ),
    )
    .await;
    assert_eq!(json["draft"]["details"], "Imperial Collection package");
}

#[tokio::test]
async fn test_open_without_service_then_pick_move_in() {
    let state = test_state();
    let id = new_session(&state).await;

    let (status, json) = send(&state, empty_request("POST", &format!("/api/sessions/{id}/open"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["state"], "selecting_service");

    let (status, json) = send(
        &state,
        json_request(
            "POST",
            &format!("/api/sessions/{id}/select"),
            serde_json::json!({"service": "move-in"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["state"], "entering_details");
    assert_eq!(json["draft"]["service_type"], "move-in");
    assert_eq!(
        json["draft"]["details"],
        leadline::services::catalog::template_for(leadline::models::ServiceId::MoveIn)
    );
}

#[tokio::test]
async fn test_open_with_unknown_service_is_rejected() {
    let state = test_state();
    let id = new_session(&state).await;

    let (status, json) = send(
        &state,
        json_request(
            "POST",
            &format!("/api/sessions/{id}/open"),
            serde_json::json!({"service": "gardening"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].as_str().unwrap().contains("gardening"));
}

#[tokio::test]
async fn test_open_with_malformed_body_is_rejected() {
    let state = test_state();
    let id = new_session(&state).await;
    let uri = format!("/api/sessions/{id}/open");

    let (status, _) = send(&state, json_request("POST", &uri, serde_json::json!({"service": 7}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let req = Request::builder()
        .method("POST")
        .uri(&uri)
        .header("Content-Type", "application/json")
        .body(Body::from("{\"service\": "))
        .unwrap();
    let (status, _) = send(&state, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // nothing was opened by the rejected requests
    let (_, json) = send(&state, empty_request("GET", &format!("/api/sessions/{id}"))).await;
    assert_eq!(json["state"], "hidden");
}

#[tokio::test]
async fn test_open_without_content_type_still_honours_service() {
    let state = test_state();
    let id = new_session(&state).await;

    let req = Request::builder()
        .method("POST")
        .uri(format!("/api/sessions/{id}/open"))
        .body(Body::from(r#"{"service":"renovation"}"#))
        .unwrap();
    let (status, json) = send(&state, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["state"], "entering_details");
    assert_eq!(json["draft"]["service_type"], "renovation");
}

#[tokio::test]
async fn test_events_stream_starts_with_snapshot() {
    let state = test_state();
    let id = new_session(&state).await;

    let res = test_app(state.clone())
        .oneshot(empty_request("GET", &format!("/api/sessions/{id}/events")))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert!(res.headers()["content-type"]
        .to_str()
        .unwrap()
        .starts_with("text/event-stream"));

    let mut frames = res.into_body().into_data_stream();
    let frame = frames.next().await.unwrap().unwrap();
    let frame = String::from_utf8(frame.to_vec()).unwrap();
    assert!(frame.contains("event: snapshot"));
    assert!(frame.contains(r#""state":"hidden""#));
    assert!(frame.contains(&id));
}

#[tokio::test]
async fn test_edit_while_hidden_conflicts() {
    let state = test_state();
    let id = new_session(&state).await;

    let (status, _) = send(
        &state,
        json_request(
            "PATCH",
            &format!("/api/sessions/{id}/draft"),
            serde_json::json!({"name": "Ada"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_submit_with_empty_phone_stays_on_form() {
    let (state, received) = test_state_with_received();
    let id = new_session(&state).await;

    send(
        &state,
        json_request(
            "POST",
            &format!("/api/sessions/{id}/open"),
            serde_json::json!({"service": "handyman"}),
        ),
    )
    .await;
    send(
        &state,
        json_request(
            "PATCH",
            &format!("/api/sessions/{id}/draft"),
            serde_json::json!({"name": "Ada", "phone": ""}),
        ),
    )
    .await;

    let (status, json) = send(&state, empty_request("POST", &format!("/api/sessions/{id}/submit"))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(json["fields"][0]["field"], "phone");

    let (_, json) = send(&state, empty_request("GET", &format!("/api/sessions/{id}"))).await;
    assert_eq!(json["state"], "entering_details");
    assert_eq!(json["field_errors"][0]["field"], "phone");
    assert!(received.lock().unwrap().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_renovation_request_is_confirmed() {
    let (state, received) = test_state_with_received();
    let id = new_session(&state).await;

    send(
        &state,
        json_request(
            "POST",
            &format!("/api/sessions/{id}/open"),
            serde_json::json!({"service": "renovation"}),
        ),
    )
    .await;
    let (status, _) = send(
        &state,
        json_request(
            "PATCH",
            &format!("/api/sessions/{id}/draft"),
            serde_json::json!({"name": "Ada", "phone": "08011112222"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, json) = send(&state, empty_request("POST", &format!("/api/sessions/{id}/submit"))).await;
    assert_eq!(status, StatusCode::ACCEPTED);
    assert_eq!(json["state"], "submitting");

    tokio::time::sleep(Duration::from_millis(600)).await;

    let (_, json) = send(&state, empty_request("GET", &format!("/api/sessions/{id}"))).await;
    assert_eq!(json["state"], "confirmed");
    assert_eq!(json["confirmation"]["lead"]["name"], "Ada");
    assert_eq!(json["confirmation"]["lead"]["phone"], "08011112222");
    assert_eq!(json["confirmation"]["delivered"], true);

    let received = received.lock().unwrap().clone();
    assert_eq!(received.len(), 1);
    assert_eq!(received[0].kind.as_str(), "booking");

    // voice confirmation arrives on its own
    tokio::time::sleep(Duration::from_millis(10)).await;
    let res = test_app(state.clone())
        .oneshot(empty_request("GET", &format!("/api/sessions/{id}/voice")))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.headers()["content-type"], "audio/wav");
}

#[tokio::test(start_paused = true)]
async fn test_close_twice_and_reset() {
    let state = test_state();
    let id = new_session(&state).await;

    send(
        &state,
        json_request(
            "POST",
            &format!("/api/sessions/{id}/open"),
            serde_json::json!({"service": "emergency"}),
        ),
    )
    .await;
    send(
        &state,
        json_request(
            "PATCH",
            &format!("/api/sessions/{id}/draft"),
            serde_json::json!({"name": "Ada"}),
        ),
    )
    .await;

    let (status, json) = send(&state, empty_request("POST", &format!("/api/sessions/{id}/close"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["state"], "hidden");
    assert_eq!(json["scroll_locked"], false);

    let (status, json) = send(&state, empty_request("POST", &format!("/api/sessions/{id}/close"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["state"], "hidden");

    tokio::time::sleep(Duration::from_millis(400)).await;
    let (_, json) = send(&state, empty_request("GET", &format!("/api/sessions/{id}"))).await;
    assert_eq!(json["draft"]["name"], "");
    assert_eq!(json["draft"]["service_type"], "handyman");
}

#[tokio::test]
async fn test_end_session() {
    let state = test_state();
    let id = new_session(&state).await;

    let (status, _) = send(&state, empty_request("DELETE", &format!("/api/sessions/{id}"))).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&state, empty_request("GET", &format!("/api/sessions/{id}"))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(state.sessions.is_empty());
}

// ── Contact & Join Team ──

#[tokio::test]
async fn test_contact_form() {
    let (state, received) = test_state_with_received();

    let (status, json) = send(
        &state,
        json_request(
            "POST",
            "/api/contact",
            serde_json::json!({
                "name": "Ada",
                "phone": "08011112222",
                "email": "ada@example.com",
                "details": "Two bathrooms need retiling",
                "preferred_time": "Tomorrow morning"
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["display_for_ms"], 5000);
    assert_eq!(json["confirmation"]["lead"]["details"], "Two bathrooms need retiling");
    assert_eq!(received.lock().unwrap()[0].kind.as_str(), "contact");
}

#[tokio::test]
async fn test_contact_form_requires_name_and_phone() {
    let state = test_state();

    let (status, json) = send(
        &state,
        json_request("POST", "/api/contact", serde_json::json!({"email": "ada@example.com"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(json["fields"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_contact_requirements_independent_of_booking() {
    let config = AppConfig::from_lookup(|key| match key {
        "CONTACT_REQUIRE_LOCATION" => Some("true".to_string()),
        _ => None,
    });
    let (state, _) = test_state_with_config(config);
    let contact = serde_json::json!({"name": "Ada", "phone": "08011112222"});

    let (status, json) = send(&state, json_request("POST", "/api/contact", contact.clone())).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(json["fields"][0]["field"], "location");

    // the booking flow keeps its own requirements
    let id = new_session(&state).await;
    send(
        &state,
        json_request(
            "POST",
            &format!("/api/sessions/{id}/open"),
            serde_json::json!({"service": "handyman"}),
        ),
    )
    .await;
    send(&state, json_request("PATCH", &format!("/api/sessions/{id}/draft"), contact)).await;
    let (status, _) = send(&state, empty_request("POST", &format!("/api/sessions/{id}/submit"))).await;
    assert_eq!(status, StatusCode::ACCEPTED);
}

#[tokio::test]
async fn test_join_team_application() {
    let (state, received) = test_state_with_received();

    let (status, json) = send(
        &state,
        json_request(
            "POST",
            "/api/join-team",
            serde_json::json!({
                "full_name": "Chidi Okafor",
                "phone": "08033334444",
                "trade": "plumber",
                "own_tools": "yes",
                "area": "Ikeja"
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["delivered"], true);
    assert_eq!(received.lock().unwrap()[0].kind.as_str(), "application");
}

#[tokio::test]
async fn test_join_team_other_trade_must_be_specified() {
    let state = test_state();

    let (status, json) = send(
        &state,
        json_request(
            "POST",
            "/api/join-team",
            serde_json::json!({
                "full_name": "Chidi Okafor",
                "phone": "08033334444",
                "trade": "other",
                "own_tools": "no",
                "area": "Lekki"
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(json["fields"][0]["field"], "other_trade");
}
