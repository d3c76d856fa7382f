use std::sync::Arc;

use tokio::sync::broadcast::{self, error::RecvError};
use tokio::task::JoinHandle;
use uuid::Uuid;

use super::{AudioSink, VoiceSynthesizer};
use crate::models::FlowEvent;

/// Speaks the confirmation phrase whenever the session's flow is confirmed.
///
/// Synthesis never feeds back into the flow. An in-flight synthesis is
/// abandoned as soon as the flow is opened again or closed. The listener exits
/// when the session's event channel closes.
pub fn spawn_voice_listener(
    session: Uuid,
    mut events: broadcast::Receiver<FlowEvent>,
    voice: Arc<dyn VoiceSynthesizer>,
    sink: Arc<dyn AudioSink>,
    phrase: String,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut pending: Option<JoinHandle<()>> = None;

        loop {
            match events.recv().await {
                Ok(FlowEvent::Confirmed { .. }) => {
                    if let Some(task) = pending.take() {
                        task.abort();
                    }
                    let voice = Arc::clone(&voice);
                    let sink = Arc::clone(&sink);
                    let phrase = phrase.clone();
                    pending = Some(tokio::spawn(async move {
                        match voice.synthesize(&phrase).await {
                            Ok(clip) => {
                                tracing::debug!(%session, bytes = clip.data.len(), "confirmation audio ready");
                                sink.play(session, clip);
                            }
                            Err(e) => {
                                tracing::warn!(%session, error = %e, "voice confirmation failed");
                            }
                        }
                    }));
                }
                Ok(FlowEvent::Opened { .. }) | Ok(FlowEvent::Closed) => {
                    if let Some(task) = pending.take() {
                        task.abort();
                    }
                }
                Ok(_) => {}
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(%session, skipped, "voice listener lagged behind flow events");
                }
                Err(RecvError::Closed) => break,
            }
        }

        if let Some(task) = pending.take() {
            task.abort();
        }
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::time::Duration;

    use async_trait::async_trait;
    use chrono::Utc;

    use super::*;
    use crate::models::{Confirmation, LeadRequest, ServiceId};
    use crate::services::voice::{AudioClip, ClipStore, DisabledVoice};

    struct SlowVoice {
        delay: Duration,
        calls: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl VoiceSynthesizer for SlowVoice {
        async fn synthesize(&self, phrase: &str) -> anyhow::Result<AudioClip> {
            self.calls.lock().unwrap().push(phrase.to_string());
            tokio::time::sleep(self.delay).await;
            Ok(AudioClip {
                mime_type: "audio/wav".to_string(),
                data: vec![1, 2, 3],
            })
        }
    }

    fn confirmed() -> FlowEvent {
        FlowEvent::Confirmed {
            confirmation: Confirmation {
                submission_id: Uuid::new_v4(),
                lead: LeadRequest::empty(ServiceId::Handyman),
                delivered: true,
                confirmed_at: Utc::now(),
            },
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_confirmation_produces_clip() {
        let (tx, rx) = broadcast::channel(16);
        let session = Uuid::new_v4();
        let voice = Arc::new(SlowVoice {
            delay: Duration::from_millis(200),
            calls: Mutex::new(Vec::new()),
        });
        let clips = Arc::new(ClipStore::default());
        spawn_voice_listener(session, rx, voice.clone(), clips.clone(), "Request sent".to_string());

        tx.send(confirmed()).unwrap();
        tokio::time::sleep(Duration::from_millis(300)).await;

        assert_eq!(voice.calls.lock().unwrap().as_slice(), ["Request sent"]);
        assert_eq!(clips.latest(session).unwrap().data, vec![1, 2, 3]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_close_abandons_pending_audio() {
        let (tx, rx) = broadcast::channel(16);
        let session = Uuid::new_v4();
        let voice = Arc::new(SlowVoice {
            delay: Duration::from_millis(200),
            calls: Mutex::new(Vec::new()),
        });
        let clips = Arc::new(ClipStore::default());
        spawn_voice_listener(session, rx, voice, clips.clone(), "Request sent".to_string());

        tx.send(confirmed()).unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;
        tx.send(FlowEvent::Closed).unwrap();
        tokio::time::sleep(Duration::from_millis(300)).await;

        assert!(clips.latest(session).is_none());
    }

    #[tokio::test]
    async fn test_synthesis_failure_is_swallowed() {
        let (tx, rx) = broadcast::channel(16);
        let session = Uuid::new_v4();
        let clips = Arc::new(ClipStore::default());
        let listener = spawn_voice_listener(
            session,
            rx,
            Arc::new(DisabledVoice),
            clips.clone(),
            "Request sent".to_string(),
        );

        tx.send(confirmed()).unwrap();
        drop(tx);
        listener.await.unwrap();
        assert!(clips.latest(session).is_none());
    }
}
