use crate::error::{AppError, Result};
use base64::{engine::general_purpose, Engine as _};
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

const TTS_API_URL: &str = "https://texttospeech.googleapis.com/v1/text:synthesize";

/// Google Cloud Text-to-Speech client. Synthesizes short spoken intros as MP3.
#[derive(Debug, Clone)]
pub struct TtsClient {
    api_key: String,
    voice: String,
    language_code: String,
    client: Client,
}

#[derive(Debug, Deserialize)]
struct SynthesizeResponse {
    #[serde(rename = "audioContent")]
    audio_content: String,
}

impl TtsClient {
    pub fn new(api_key: String, voice: String, language_code: String) -> Self {
        Self {
            api_key,
            voice,
            language_code,
            client: Client::new(),
        }
    }

    pub async fn synthesize(&self, text: &str) -> Result<Vec<u8>> {
        let response = self
            .client
            .post(TTS_API_URL)
            .query(&[("key", self.api_key.as_str())])
            .json(&json!({
                "input": { "text": text },
                "voice": {
                    "languageCode": self.language_code,
                    "name": self.voice,
                },
                "audioConfig": { "audioEncoding": "MP3" },
            }))
            .send()
            .await
            .map_err(|e| AppError::Tts(format!("TTS request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Tts(format!("TTS API error {}: {}", status, body)));
        }

        let synthesized: SynthesizeResponse = response
            .json()
            .await
            .map_err(|e| AppError::Tts(format!("Failed to parse TTS response: {}", e)))?;

        general_purpose::STANDARD
            .decode(&synthesized.audio_content)
            .map_err(|e| AppError::Tts(format!("Invalid base64 audio content: {}", e)))
    }

    /// Synthesize and re-encode for inline JSON delivery.
    pub async fn synthesize_base64(&self, text: &str) -> Result<String> {
        let audio = self.synthesize(text).await?;
        Ok(general_purpose::STANDARD.encode(audio))
    }
}
