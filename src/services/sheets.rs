use crate::error::{AppError, Result};
use crate::models::{Playlist, PlaylistMeta, Track};
use reqwest::{Client, Url};
use serde::Deserialize;
use std::collections::HashMap;

const SHEETS_API_BASE: &str = "https://sheets.googleapis.com/v4/spreadsheets";

/// Name of the optional sheet holding per-playlist metadata instead of tracks.
const META_SHEET: &str = "playlists";

/// Read-only client for the spreadsheet that backs the track catalog.
/// Data is fetched fresh on every call; nothing is cached.
#[derive(Debug, Clone)]
pub struct SheetsClient {
    api_key: String,
    spreadsheet_id: String,
    client: Client,
}

#[derive(Debug, Deserialize)]
struct SpreadsheetMeta {
    #[serde(default)]
    sheets: Vec<SheetEntry>,
}

#[derive(Debug, Deserialize)]
struct SheetEntry {
    properties: SheetProperties,
}

#[derive(Debug, Deserialize)]
struct SheetProperties {
    title: String,
}

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<String>>,
}

impl SheetsClient {
    pub fn new(api_key: String, spreadsheet_id: String) -> Self {
        Self {
            api_key,
            spreadsheet_id,
            client: Client::new(),
        }
    }

    /// URL for the spreadsheet itself, with extra path segments appended.
    /// Segments are percent-encoded, so sheet titles with `?`, `#` or `/`
    /// stay part of the path.
    fn api_url(&self, segments: &[&str]) -> Result<Url> {
        let mut url = Url::parse(SHEETS_API_BASE)
            .map_err(|e| AppError::Sheets(format!("Invalid API base URL: {}", e)))?;
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|_| AppError::Sheets("Invalid API base URL".to_string()))?;
            path.push(&self.spreadsheet_id);
            path.extend(segments);
        }
        Ok(url)
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: Url) -> Result<T> {
        let response = self
            .client
            .get(url)
            .query(&[("key", self.api_key.as_str())])
            .send()
            .await
            .map_err(|e| AppError::Sheets(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Sheets(format!(
                "API returned status: {} - {}",
                status, body
            )));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::Sheets(format!("Failed to parse response: {}", e)))
    }

    /// Titles of all sheets in the spreadsheet, in document order.
    pub async fn list_sheets(&self) -> Result<Vec<String>> {
        let url = self.api_url(&[])?;
        let meta: SpreadsheetMeta = self.get_json(url).await?;

        Ok(meta
            .sheets
            .into_iter()
            .map(|s| s.properties.title)
            .collect())
    }

    /// One sheet's rows parsed as tracks. The first row is a header; columns
    /// are matched by name, so their order in the sheet does not matter.
    pub async fn fetch_sheet(&self, title: &str) -> Result<Vec<Track>> {
        let url = self.api_url(&["values", title])?;
        let range: ValueRange = self.get_json(url).await?;

        tracing::debug!("Sheet '{}' returned {} rows", title, range.values.len());

        Ok(parse_tracks(&range.values))
    }

    /// The whole catalog: every sheet as a playlist, enriched with metadata
    /// from the `playlists` sheet when one exists.
    pub async fn fetch_catalog(&self) -> Result<Vec<Playlist>> {
        let titles = self.list_sheets().await?;

        let mut meta: HashMap<String, PlaylistMeta> = HashMap::new();
        if let Some(meta_title) = titles
            .iter()
            .find(|t| t.eq_ignore_ascii_case(META_SHEET))
            .cloned()
        {
            let url = self.api_url(&["values", &meta_title])?;
            let range: ValueRange = self.get_json(url).await?;
            meta = parse_playlist_meta(&range.values);
        }

        let mut playlists = Vec::new();
        for title in titles {
            if title.eq_ignore_ascii_case(META_SHEET) {
                continue;
            }
            let tracks = self.fetch_sheet(&title).await?;
            let entry = meta.remove(&normalize(&title)).unwrap_or_default();
            playlists.push(Playlist {
                name: title,
                description: entry.description,
                tags: entry.tags,
                tracks,
            });
        }

        Ok(playlists)
    }
}

fn normalize(s: &str) -> String {
    s.trim().to_lowercase()
}

/// Map a header row to column indices by normalized name.
fn header_indices(header: &[String]) -> HashMap<String, usize> {
    header
        .iter()
        .enumerate()
        .map(|(i, name)| (normalize(name), i))
        .collect()
}

fn cell<'a>(row: &'a [String], idx: Option<&usize>) -> Option<&'a str> {
    idx.and_then(|&i| row.get(i))
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
}

fn split_tags(raw: Option<&str>) -> Vec<String> {
    raw.map(|s| {
        s.split(',')
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect()
    })
    .unwrap_or_default()
}

/// Parse a sheet's row grid into tracks. Rows without an id or a playable
/// URL are skipped with a warning rather than failing the whole fetch.
pub fn parse_tracks(values: &[Vec<String>]) -> Vec<Track> {
    let Some((header, rows)) = values.split_first() else {
        return Vec::new();
    };
    let cols = header_indices(header);

    let id_col = cols.get("id");
    let title_col = cols.get("title");
    let artist_col = cols.get("artist");
    let genre_col = cols.get("genre");
    let mood_col = cols.get("mood");
    let desc_col = cols.get("description");
    let tags_col = cols.get("tags");
    let lang_col = cols.get("language");
    let url_col = cols
        .get("musicurl")
        .or_else(|| cols.get("music url"))
        .or_else(|| cols.get("url"));

    let mut tracks = Vec::new();
    for (row_num, row) in rows.iter().enumerate() {
        let id = cell(row, id_col);
        let url = cell(row, url_col);
        let (Some(id), Some(url)) = (id, url) else {
            tracing::warn!("Skipping row {}: missing id or music url", row_num + 2);
            continue;
        };

        tracks.push(Track {
            id: id.to_string(),
            title: cell(row, title_col).unwrap_or("Unknown").to_string(),
            artist: cell(row, artist_col).unwrap_or("Unknown").to_string(),
            genre: cell(row, genre_col).map(str::to_string),
            mood: cell(row, mood_col).map(str::to_string),
            description: cell(row, desc_col).map(str::to_string),
            tags: split_tags(cell(row, tags_col)),
            music_url: url.to_string(),
            language: cell(row, lang_col).map(str::to_string),
        });
    }

    tracks
}

/// Parse the `playlists` metadata sheet. Keyed by normalized sheet name.
pub fn parse_playlist_meta(values: &[Vec<String>]) -> HashMap<String, PlaylistMeta> {
    let Some((header, rows)) = values.split_first() else {
        return HashMap::new();
    };
    let cols = header_indices(header);

    let name_col = cols.get("name").or_else(|| cols.get("playlist"));
    let desc_col = cols.get("description");
    let tags_col = cols.get("tags");

    let mut meta = HashMap::new();
    for row in rows {
        let Some(name) = cell(row, name_col) else {
            continue;
        };
        meta.insert(
            normalize(name),
            PlaylistMeta {
                description: cell(row, desc_col).map(str::to_string),
                tags: split_tags(cell(row, tags_col)),
            },
        );
    }

    meta
}
