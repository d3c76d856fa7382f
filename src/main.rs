use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::EnvFilter;

use leadline::config::AppConfig;
use leadline::routes;
use leadline::services::coordinator::FlowSettings;
use leadline::services::delivery::log::LogDelivery;
use leadline::services::delivery::webhook::WebhookDelivery;
use leadline::services::delivery::LeadDelivery;
use leadline::services::sessions::SessionRegistry;
use leadline::services::voice::gemini::GeminiVoice;
use leadline::services::voice::{ClipStore, DisabledVoice, VoiceSynthesizer};
use leadline::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = AppConfig::from_env();

    let delivery: Arc<dyn LeadDelivery> = match &config.lead_webhook_url {
        Some(url) => {
            tracing::info!("delivering leads to webhook (url: {url})");
            Arc::new(WebhookDelivery::new(url.clone()))
        }
        None => {
            tracing::info!("no LEAD_WEBHOOK_URL set, leads will be logged only");
            Arc::new(LogDelivery)
        }
    };

    let voice: Arc<dyn VoiceSynthesizer> = if config.gemini_api_key.is_empty() {
        tracing::info!("GEMINI_API_KEY not set, voice confirmation disabled");
        Arc::new(DisabledVoice)
    } else {
        tracing::info!("using Gemini voice confirmation (model: {})", config.gemini_tts_model);
        Arc::new(GeminiVoice::new(
            config.gemini_api_key.clone(),
            config.gemini_tts_model.clone(),
            config.gemini_voice.clone(),
        ))
    };

    let sessions = SessionRegistry::new(
        FlowSettings::from_config(&config),
        delivery,
        voice,
        Arc::new(ClipStore::default()),
        config.confirmation_phrase.clone(),
    );

    let state = Arc::new(AppState {
        config: config.clone(),
        sessions,
    });

    // Sweep abandoned sessions
    let ttl = Duration::from_secs(config.session_ttl_secs);
    let sweeper_state = Arc::clone(&state);
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(60));
        loop {
            interval.tick().await;
            let expired = sweeper_state.sessions.expire_idle(ttl);
            if expired > 0 {
                tracing::info!(expired, "expired idle sessions");
            }
        }
    });

    let app = routes::router(state);

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("starting server on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
