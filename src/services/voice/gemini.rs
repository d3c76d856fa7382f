use anyhow::Context;
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde_json::json;

use super::{AudioClip, VoiceSynthesizer};

pub struct GeminiVoice {
    api_key: String,
    model: String,
    voice: String,
    client: reqwest::Client,
}

impl GeminiVoice {
    pub fn new(api_key: String, model: String, voice: String) -> Self {
        Self {
            api_key,
            model,
            voice,
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl VoiceSynthesizer for GeminiVoice {
    async fn synthesize(&self, phrase: &str) -> anyhow::Result<AudioClip> {
        let url = format!(
            "https://generativelanguage.googleapis.com/v1beta/models/{}:generateContent",
            self.model
        );

        let body = json!({
            "contents": [{ "parts": [{ "text": phrase }] }],
            "generationConfig": {
                "responseModalities": ["AUDIO"],
                "speechConfig": {
                    "voiceConfig": {
                        "prebuiltVoiceConfig": { "voiceName": self.voice }
                    }
                }
            }
        });

        let resp = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .context("failed to call Gemini TTS API")?;

        let status = resp.status();
        let data: serde_json::Value = resp
            .json()
            .await
            .context("failed to parse Gemini TTS response")?;

        if !status.is_success() {
            anyhow::bail!("Gemini TTS error ({}): {}", status, data);
        }

        let inline = &data["candidates"][0]["content"]["parts"][0]["inlineData"];
        let encoded = inline["data"]
            .as_str()
            .ok_or_else(|| anyhow::anyhow!("missing audio in Gemini TTS response"))?;
        let mime_type = inline["mimeType"]
            .as_str()
            .unwrap_or("audio/L16;rate=24000")
            .to_string();

        let audio = STANDARD
            .decode(encoded)
            .context("Gemini TTS returned invalid base64 audio")?;

        Ok(AudioClip {
            mime_type,
            data: audio,
        })
    }
}
