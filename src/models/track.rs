use serde::{Deserialize, Serialize};

/// A single catalog entry loaded from the spreadsheet. Read-only from this
/// service's perspective.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Track {
    pub id: String,
    pub title: String,
    pub artist: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mood: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(rename = "musicUrl")]
    pub music_url: String,
    /// Optional per-row language tag for localized catalogs.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

impl Track {
    /// One prompt line per track: the table the AI selects from.
    pub fn prompt_line(&self) -> String {
        format!(
            "ID: {} | \"{}\" by {} | Genre: {} | Mood: {} | Tags: {} | {}",
            self.id,
            self.title,
            self.artist,
            self.genre.as_deref().unwrap_or("-"),
            self.mood.as_deref().unwrap_or("-"),
            if self.tags.is_empty() {
                "-".to_string()
            } else {
                self.tags.join(", ")
            },
            self.description.as_deref().unwrap_or(""),
        )
    }
}

/// The shape returned to clients inside a radio response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackInfo {
    pub id: String,
    pub title: String,
    pub artist: String,
    #[serde(rename = "musicUrl")]
    pub music_url: String,
}

impl From<&Track> for TrackInfo {
    fn from(track: &Track) -> Self {
        TrackInfo {
            id: track.id.clone(),
            title: track.title.clone(),
            artist: track.artist.clone(),
            music_url: track.music_url.clone(),
        }
    }
}
