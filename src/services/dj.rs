use crate::error::{AppError, Result};
use crate::models::{
    GreetingRequest, GreetingResponse, Playlist, RadioRequest, RadioResponse, Track, TrackInfo,
};
use crate::services::coerce::extract_json;
use crate::services::{GeminiClient, SheetsClient, TtsClient};
use rand::{seq::SliceRandom, Rng};
use serde::Deserialize;
use std::sync::Arc;

/// Topic used when the listener sends an empty request.
const DEFAULT_TOPIC: &str = "something calm and pleasant";

const DEFAULT_USER: &str = "Гость";
const DEFAULT_LANGUAGE: &str = "ru";

/// How many tracks one radio answer carries.
const TRACKS_PER_RESPONSE: usize = 3;

/// The radio host: fetches the catalog, runs the two-stage AI selection
/// (pick a playlist, then pick tracks and write an intro) and falls back to
/// random choices whenever the AI's output does not match known data.
pub struct RadioDj {
    sheets: Arc<SheetsClient>,
    gemini: Arc<GeminiClient>,
    tts: Option<Arc<TtsClient>>,
}

/// Stage-1 answer shape. Aliases cover the model's habit of renaming keys.
#[derive(Debug, Deserialize)]
struct PlaylistPick {
    #[serde(alias = "name", alias = "playlistName")]
    playlist: String,
}

/// Stage-2 answer shape.
#[derive(Debug, Deserialize)]
struct TrackPick {
    #[serde(default, rename = "trackIds", alias = "track_ids", alias = "tracks")]
    track_ids: Vec<String>,
    #[serde(default, rename = "speechText", alias = "speech_text", alias = "intro")]
    speech_text: String,
}

impl RadioDj {
    pub fn new(
        sheets: Arc<SheetsClient>,
        gemini: Arc<GeminiClient>,
        tts: Option<Arc<TtsClient>>,
    ) -> Self {
        Self { sheets, gemini, tts }
    }

    /// The whole catalog flattened, for `GET /api/tracks`.
    pub async fn all_tracks(&self) -> Result<Vec<Track>> {
        let catalog = self.sheets.fetch_catalog().await?;
        Ok(catalog.into_iter().flat_map(|p| p.tracks).collect())
    }

    pub async fn suggest(&self, request: RadioRequest) -> Result<RadioResponse> {
        let topic = request
            .request
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_TOPIC)
            .to_string();
        let user_name = request
            .user_name
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_USER)
            .to_string();
        let language = request
            .language
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_LANGUAGE)
            .to_string();

        tracing::info!("Radio request: topic='{}' user='{}' lang='{}'", topic, user_name, language);

        let mut catalog = self.sheets.fetch_catalog().await?;
        catalog.retain(|p| !p.tracks.is_empty());
        if catalog.is_empty() {
            return Err(AppError::NotFound("Track catalog is empty".to_string()));
        }

        // Stage 1: pick a playlist
        let playlist = self.pick_playlist(catalog, &topic).await?;
        tracing::info!("Selected playlist '{}'", playlist.name);

        // Stage 2: pick tracks within it and write the intro
        let playable = language_slice(&playlist.tracks, &language);
        let (tracks, speech_text) = self
            .pick_tracks(&playlist, playable, &topic, &user_name, &language)
            .await?;

        let speech_audio = self.maybe_synthesize(&speech_text).await;

        let music_url = tracks
            .first()
            .map(|t| t.music_url.clone())
            .unwrap_or_default();

        Ok(RadioResponse {
            speech_text,
            playlist: playlist.name,
            music_url,
            tracks: tracks.iter().map(TrackInfo::from).collect(),
            speech_audio,
        })
    }

    /// Fixed spoken greeting for the start of a session.
    pub async fn greet(&self, request: GreetingRequest) -> Result<GreetingResponse> {
        let user_name = request
            .user_name
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_USER);
        let language = request.language.as_deref().unwrap_or(DEFAULT_LANGUAGE);

        let speech_text = greeting_text(user_name, language);
        let speech_audio = self.maybe_synthesize(&speech_text).await;

        Ok(GreetingResponse {
            speech_text,
            speech_audio,
        })
    }

    async fn pick_playlist(&self, mut catalog: Vec<Playlist>, topic: &str) -> Result<Playlist> {
        if catalog.len() == 1 {
            return Ok(catalog.remove(0));
        }

        let prompt = playlist_prompt(&catalog, topic);
        let text = self.gemini.generate(&prompt).await?;

        let index = match extract_json::<PlaylistPick>(&text) {
            Ok(pick) => match_playlist(&catalog, &pick.playlist),
            Err(e) => {
                tracing::warn!("Unparseable playlist pick, falling back to random: {}", e);
                None
            }
        };

        let index = index.unwrap_or_else(|| {
            let i = rand::thread_rng().gen_range(0..catalog.len());
            tracing::warn!("AI playlist pick unknown, random fallback: '{}'", catalog[i].name);
            i
        });

        Ok(catalog.swap_remove(index))
    }

    async fn pick_tracks(
        &self,
        playlist: &Playlist,
        playable: Vec<&Track>,
        topic: &str,
        user_name: &str,
        language: &str,
    ) -> Result<(Vec<Track>, String)> {
        let prompt = track_prompt(&playlist.name, &playable, topic, user_name, language);
        let text = self.gemini.generate(&prompt).await?;

        let pick = extract_json::<TrackPick>(&text).unwrap_or_else(|e| {
            tracing::warn!("Unparseable track pick, falling back to random: {}", e);
            TrackPick {
                track_ids: Vec::new(),
                speech_text: String::new(),
            }
        });

        let mut tracks = match_tracks(&playable, &pick.track_ids);
        if tracks.is_empty() {
            tracing::warn!(
                "No AI track ids matched ({} requested), random fallback",
                pick.track_ids.len()
            );
            tracks = random_tracks(&playable, TRACKS_PER_RESPONSE);
        }
        if tracks.is_empty() {
            return Err(AppError::NotFound(format!(
                "Playlist '{}' has no playable tracks",
                playlist.name
            )));
        }

        let speech_text = if pick.speech_text.trim().is_empty() {
            default_intro(&tracks[0])
        } else {
            pick.speech_text.trim().to_string()
        };

        Ok((tracks, speech_text))
    }

    /// TTS is best-effort: a synthesis failure degrades the response to
    /// text-only instead of failing the request.
    async fn maybe_synthesize(&self, text: &str) -> Option<String> {
        let tts = self.tts.as_ref()?;
        match tts.synthesize_base64(text).await {
            Ok(audio) => Some(audio),
            Err(e) => {
                tracing::error!("Speech synthesis failed: {}", e);
                None
            }
        }
    }
}

fn normalize(s: &str) -> String {
    s.trim().to_lowercase()
}

/// Tracks usable for the given language: untagged rows always qualify,
/// tagged rows only when the tag matches. A catalog localized for other
/// languages only falls back to the full playlist.
fn language_slice<'a>(tracks: &'a [Track], language: &str) -> Vec<&'a Track> {
    let lang = normalize(language);
    let matching: Vec<&Track> = tracks
        .iter()
        .filter(|t| {
            t.language
                .as_deref()
                .map(|l| normalize(l) == lang)
                .unwrap_or(true)
        })
        .collect();

    if matching.is_empty() {
        tracks.iter().collect()
    } else {
        matching
    }
}

/// Match the AI's playlist name against known sheets, normalized.
fn match_playlist(catalog: &[Playlist], name: &str) -> Option<usize> {
    let wanted = normalize(name);
    catalog.iter().position(|p| normalize(&p.name) == wanted)
}

/// Look up AI-returned ids in the playlist, dropping unknown ones. Order
/// follows the AI's answer; duplicates are kept once.
fn match_tracks(playable: &[&Track], ids: &[String]) -> Vec<Track> {
    let mut seen = Vec::new();
    let mut tracks = Vec::new();
    for id in ids {
        let wanted = normalize(id);
        if wanted.is_empty() || seen.contains(&wanted) {
            continue;
        }
        if let Some(track) = playable.iter().find(|t| normalize(&t.id) == wanted) {
            seen.push(wanted);
            tracks.push((*track).clone());
        } else {
            tracing::warn!("AI returned unknown track id '{}', dropping", id);
        }
    }
    tracks
}

fn random_tracks(playable: &[&Track], count: usize) -> Vec<Track> {
    playable
        .choose_multiple(&mut rand::thread_rng(), count.min(playable.len()))
        .map(|t| (*t).clone())
        .collect()
}

fn default_intro(track: &Track) -> String {
    format!(
        "Here is \"{}\" by {}. Enjoy the music!",
        track.title, track.artist
    )
}

fn greeting_text(user_name: &str, language: &str) -> String {
    if normalize(language).starts_with("ru") {
        format!(
            "Привет, {}! Что ты хочешь послушать? Можешь написать или подожди немного — я сам что-нибудь включу.",
            user_name
        )
    } else {
        format!(
            "Hi, {}! What would you like to listen to? Type a request, or wait a moment and I will put something on myself.",
            user_name
        )
    }
}

fn playlist_prompt(catalog: &[Playlist], topic: &str) -> String {
    let lines: Vec<String> = catalog.iter().map(|p| p.prompt_line()).collect();

    format!(
        r#"You are a radio DJ choosing which playlist fits a listener's request.

LISTENER REQUEST: "{}"

AVAILABLE PLAYLISTS:
{}

Pick the single best matching playlist.

Respond with ONLY a JSON object:
{{
  "playlist": "exact playlist name from the list"
}}"#,
        topic,
        lines.join("\n"),
    )
}

fn track_prompt(
    playlist_name: &str,
    playable: &[&Track],
    topic: &str,
    user_name: &str,
    language: &str,
) -> String {
    let lines: Vec<String> = playable.iter().map(|t| t.prompt_line()).collect();

    format!(
        r#"You are a radio DJ hosting for a listener named {}.

LISTENER REQUEST: "{}"

TRACKS IN PLAYLIST "{}":
{}

Select up to {} tracks that best fit the request, and write a short friendly
spoken introduction for them in the language "{}", addressing the listener
by name.

Respond with ONLY a JSON object:
{{
  "trackIds": ["id1", "id2"],
  "speechText": "the spoken introduction"
}}"#,
        user_name,
        topic,
        playlist_name,
        lines.join("\n"),
        TRACKS_PER_RESPONSE,
        language,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn track(id: &str, title: &str, language: Option<&str>) -> Track {
        Track {
            id: id.to_string(),
            title: title.to_string(),
            artist: "Artist".to_string(),
            genre: Some("Ambient".to_string()),
            mood: None,
            description: None,
            tags: vec![],
            music_url: format!("https://cdn/{}.mp3", id),
            language: language.map(str::to_string),
        }
    }

    fn playlist(name: &str, tracks: Vec<Track>) -> Playlist {
        Playlist {
            name: name.to_string(),
            description: None,
            tags: vec![],
            tracks,
        }
    }

    #[test]
    fn test_match_playlist_normalized() {
        let catalog = vec![
            playlist("Chill", vec![]),
            playlist("Workout Mix", vec![]),
        ];
        assert_eq!(match_playlist(&catalog, "  workout mix "), Some(1));
        assert_eq!(match_playlist(&catalog, "CHILL"), Some(0));
        assert_eq!(match_playlist(&catalog, "Jazz"), None);
    }

    #[test]
    fn test_match_tracks_drops_unknown_and_duplicates() {
        let a = track("T1", "One", None);
        let b = track("t2", "Two", None);
        let playable: Vec<&Track> = vec![&a, &b];

        let ids = vec![
            " t1 ".to_string(),
            "bogus".to_string(),
            "T1".to_string(),
            "T2".to_string(),
        ];
        let matched = match_tracks(&playable, &ids);
        let titles: Vec<_> = matched.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["One", "Two"]);
    }

    #[test]
    fn test_match_tracks_empty_ids() {
        let a = track("t1", "One", None);
        let playable: Vec<&Track> = vec![&a];
        assert!(match_tracks(&playable, &[]).is_empty());
    }

    #[test]
    fn test_random_tracks_bounded() {
        let a = track("t1", "One", None);
        let b = track("t2", "Two", None);
        let playable: Vec<&Track> = vec![&a, &b];

        assert_eq!(random_tracks(&playable, 5).len(), 2);
        assert_eq!(random_tracks(&playable, 1).len(), 1);
        assert!(random_tracks(&[], 3).is_empty());
    }

    #[test]
    fn test_language_slice_prefers_matching_rows() {
        let ru = track("t1", "Ru", Some("ru"));
        let en = track("t2", "En", Some("en"));
        let any = track("t3", "Any", None);
        let tracks = vec![ru, en, any];

        let ids: Vec<_> = language_slice(&tracks, "RU").iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["t1", "t3"]);

        // No row matches: the whole playlist qualifies
        let de = track("t4", "De", Some("de"));
        let only_de = vec![de];
        assert_eq!(language_slice(&only_de, "fr").len(), 1);
    }

    #[test]
    fn test_prompts_carry_request_context() {
        let a = track("t1", "One", None);
        let playable: Vec<&Track> = vec![&a];
        let prompt = track_prompt("Chill", &playable, "rainy evening", "Alex", "en");

        assert!(prompt.contains("rainy evening"));
        assert!(prompt.contains("Alex"));
        assert!(prompt.contains("\"en\""));
        assert!(prompt.contains("ID: t1"));

        let catalog = vec![playlist("Chill", vec![a.clone()])];
        let prompt = playlist_prompt(&catalog, "rainy evening");
        assert!(prompt.contains("Playlist: Chill"));
        assert!(prompt.contains("rainy evening"));
    }

    #[test]
    fn test_track_pick_accepts_alias_keys() {
        let pick: TrackPick =
            crate::services::coerce::extract_json(r#"{"track_ids": ["a"], "intro": "hi"}"#)
                .unwrap();
        assert_eq!(pick.track_ids, vec!["a"]);
        assert_eq!(pick.speech_text, "hi");
    }

    #[test]
    fn test_greeting_localized() {
        assert!(greeting_text("Маша", "ru-RU").starts_with("Привет, Маша"));
        assert!(greeting_text("Alex", "en").starts_with("Hi, Alex"));
    }
}
