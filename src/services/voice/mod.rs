pub mod gemini;
pub mod listener;

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq)]
pub struct AudioClip {
    pub mime_type: String,
    pub data: Vec<u8>,
}

#[async_trait]
pub trait VoiceSynthesizer: Send + Sync {
    async fn synthesize(&self, phrase: &str) -> anyhow::Result<AudioClip>;
}

/// Used when no text-to-speech credentials are configured.
pub struct DisabledVoice;

#[async_trait]
impl VoiceSynthesizer for DisabledVoice {
    async fn synthesize(&self, _phrase: &str) -> anyhow::Result<AudioClip> {
        anyhow::bail!("voice confirmation is not configured")
    }
}

/// Receives synthesized clips for playback.
pub trait AudioSink: Send + Sync {
    fn play(&self, session: Uuid, clip: AudioClip);
}

/// Keeps the latest clip per session until the front-end fetches it.
#[derive(Default)]
pub struct ClipStore {
    clips: Mutex<HashMap<Uuid, AudioClip>>,
}

impl ClipStore {
    pub fn latest(&self, session: Uuid) -> Option<AudioClip> {
        self.clips
            .lock()
            .ok()
            .and_then(|clips| clips.get(&session).cloned())
    }

    pub fn forget(&self, session: Uuid) {
        if let Ok(mut clips) = self.clips.lock() {
            clips.remove(&session);
        }
    }
}

impl AudioSink for ClipStore {
    fn play(&self, session: Uuid, clip: AudioClip) {
        if let Ok(mut clips) = self.clips.lock() {
            clips.insert(session, clip);
        }
    }
}
