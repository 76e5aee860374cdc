use crate::models::Track;
use serde::{Deserialize, Serialize};

/// A named group of tracks: one spreadsheet sheet. The descriptive metadata
/// comes from the optional `playlists` sheet and is used only as prompt
/// context.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Playlist {
    /// Sheet title; also the identifier the AI picks by.
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    pub tracks: Vec<Track>,
}

impl Playlist {
    /// One prompt line per playlist: the table the AI selects a sheet from.
    pub fn prompt_line(&self) -> String {
        format!(
            "Playlist: {} | Tags: {} | {} ({} tracks)",
            self.name,
            if self.tags.is_empty() {
                "-".to_string()
            } else {
                self.tags.join(", ")
            },
            self.description.as_deref().unwrap_or(""),
            self.tracks.len(),
        )
    }
}

/// Descriptive metadata for one sheet, parsed from the `playlists` sheet.
#[derive(Debug, Clone, Default)]
pub struct PlaylistMeta {
    pub description: Option<String>,
    pub tags: Vec<String>,
}
