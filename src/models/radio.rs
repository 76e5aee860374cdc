use crate::models::TrackInfo;
use serde::{Deserialize, Serialize};

/// Body of `POST /api/radio`. Every field is optional; an empty or missing
/// request falls back to the default topic.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RadioRequest {
    pub request: Option<String>,
    #[serde(rename = "userName")]
    pub user_name: Option<String>,
    pub language: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RadioResponse {
    #[serde(rename = "speechText")]
    pub speech_text: String,
    pub playlist: String,
    pub tracks: Vec<TrackInfo>,
    /// URL of the first selected track, kept for clients that play one song.
    #[serde(rename = "musicUrl")]
    pub music_url: String,
    /// Base64 MP3 of the spoken intro; present only when TTS is configured.
    #[serde(rename = "speechAudio", skip_serializing_if = "Option::is_none")]
    pub speech_audio: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GreetingRequest {
    #[serde(rename = "userName")]
    pub user_name: Option<String>,
    pub language: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct GreetingResponse {
    #[serde(rename = "speechText")]
    pub speech_text: String,
    #[serde(rename = "speechAudio", skip_serializing_if = "Option::is_none")]
    pub speech_audio: Option<String>,
}
