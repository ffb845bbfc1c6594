//! Track catalog
//!
//! Tracks are described by an explicit record built once at ingestion time.
//! Filename conventions are only used while ingesting, never at playback.

pub mod naming;
pub mod source;

pub use naming::NamingConvention;
pub use source::{DirSource, ObjectSource};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::config::LibraryConfig;
use crate::lyrics::{LrcTags, PLACEHOLDER};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackRecord {
    /// Object key of the audio file
    pub id: String,
    pub title: String,
    pub artist: String,
    pub audio_url: String,
    /// Object key the lyrics came from, if there was one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lyrics_ref: Option<String>,
    /// LRC text
    pub lyrics: String,
}

impl TrackRecord {
    pub fn display_name(&self) -> String {
        format!("{} - {}", self.title, self.artist)
    }
}

/// Build track records for every audio object in `source`.
///
/// Each audio object is paired with the object of the same name and the
/// lyrics extension. Tracks without one get placeholder lyrics.
pub fn ingest(source: &dyn ObjectSource, lib: &LibraryConfig) -> anyhow::Result<Vec<TrackRecord>> {
    let audio_exts: Vec<&str> = lib.audio_extensions.iter().map(String::as_str).collect();
    let mut strip_exts = audio_exts.clone();
    strip_exts.push(lib.lyrics_extension.as_str());

    let mut keys: Vec<String> = source
        .list()?
        .into_iter()
        .filter(|k| {
            naming::extension(k).is_some_and(|ext| audio_exts.iter().any(|a| a.eq_ignore_ascii_case(ext)))
        })
        .collect();
    keys.sort();

    let mut tracks = Vec::with_capacity(keys.len());
    for key in keys {
        let lyrics_key = naming::sibling_key(&key, &lib.lyrics_extension);
        let (lyrics, lyrics_ref) = match source.get_text(&lyrics_key)? {
            Some(text) => (text, Some(lyrics_key)),
            None => {
                tracing::warn!("lyrics not found for {key}");
                (PLACEHOLDER.to_string(), None)
            }
        };

        let (mut title, artist) = lib.naming.split(&key, &strip_exts);
        let artist = match artist {
            Some(a) => a,
            None => {
                let tags = LrcTags::parse(&lyrics);
                if let Some(t) = tags.title {
                    title = t;
                }
                tags.artist.unwrap_or_else(|| naming::UNKNOWN_ARTIST.to_string())
            }
        };

        let audio_url = match lib.public_url_prefix.as_deref() {
            Some(prefix) => format!("{}/{key}", prefix.trim_end_matches('/')),
            None => source.locate(&key),
        };

        tracing::debug!("ingested {key} as {title:?} by {artist:?}");
        tracks.push(TrackRecord {
            id: key,
            title,
            artist,
            audio_url,
            lyrics_ref,
            lyrics,
        });
    }

    tracing::info!("ingested {} tracks", tracks.len());
    Ok(tracks)
}

/// Check a JSON track listing and turn it into records.
///
/// Every item needs a non-empty `id`, `audioUrl` and `lyrics`. Title and
/// artist fall back to the key and "Unknown Artist".
pub fn validate_listing(raw: &str) -> anyhow::Result<Vec<TrackRecord>> {
    let v: serde_json::Value = serde_json::from_str(raw).context("listing is not valid JSON")?;
    let Some(items) = v.as_array() else {
        anyhow::bail!("listing is not in the expected format: expected an array");
    };

    let mut tracks = Vec::with_capacity(items.len());
    for (i, item) in items.iter().enumerate() {
        let field = |name: &str| str_field(item, name);
        let (Some(id), Some(audio_url), Some(lyrics)) = (field("id"), field("audioUrl"), field("lyrics")) else {
            anyhow::bail!("listing is not in the expected format: item {i} needs id, audioUrl and lyrics");
        };

        tracks.push(TrackRecord {
            id: id.to_string(),
            title: field("title").unwrap_or(id).to_string(),
            artist: field("artist").unwrap_or(naming::UNKNOWN_ARTIST).to_string(),
            audio_url: audio_url.to_string(),
            lyrics_ref: field("lyricsRef").map(str::to_string),
            lyrics: lyrics.to_string(),
        });
    }
    Ok(tracks)
}

fn str_field<'a>(item: &'a serde_json::Value, name: &str) -> Option<&'a str> {
    item.get(name)
        .and_then(|x| x.as_str())
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[derive(Default)]
    struct MemorySource(BTreeMap<String, String>);

    impl MemorySource {
        fn with(mut self, key: &str, body: &str) -> Self {
            self.0.insert(key.to_string(), body.to_string());
            self
        }
    }

    impl ObjectSource for MemorySource {
        fn list(&self) -> anyhow::Result<Vec<String>> {
            Ok(self.0.keys().rev().cloned().collect())
        }

        fn get_text(&self, key: &str) -> anyhow::Result<Option<String>> {
            Ok(self.0.get(key).cloned())
        }

        fn locate(&self, key: &str) -> String {
            format!("mem://{key}")
        }
    }

    fn lib() -> LibraryConfig {
        LibraryConfig::default()
    }

    #[test]
    fn test_pairs_audio_with_lyrics() {
        let src = MemorySource::default()
            .with("Artist - Song.flac", "")
            .with("Artist - Song.lrc", "[00:01.00]hello")
            .with("cover.jpg", "");

        let tracks = ingest(&src, &lib()).unwrap();
        assert_eq!(tracks.len(), 1);
        let t = &tracks[0];
        assert_eq!(t.id, "Artist - Song.flac");
        assert_eq!(t.title, "Song");
        assert_eq!(t.artist, "Artist");
        assert_eq!(t.audio_url, "mem://Artist - Song.flac");
        assert_eq!(t.lyrics_ref.as_deref(), Some("Artist - Song.lrc"));
        assert_eq!(t.lyrics, "[00:01.00]hello");
    }

    #[test]
    fn test_missing_lyrics_get_placeholder() {
        let src = MemorySource::default().with("Lonely - Track.FLAC", "");

        let tracks = ingest(&src, &lib()).unwrap();
        assert_eq!(tracks[0].lyrics, PLACEHOLDER);
        assert_eq!(tracks[0].lyrics_ref, None);
    }

    #[test]
    fn test_sorted_by_key_and_prefixed_url() {
        let src = MemorySource::default().with("b.flac", "").with("a.flac", "");
        let mut lib = lib();
        lib.public_url_prefix = Some("https://pub.example.dev/".into());

        let tracks = ingest(&src, &lib).unwrap();
        let ids: Vec<&str> = tracks.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["a.flac", "b.flac"]);
        assert_eq!(tracks[0].audio_url, "https://pub.example.dev/a.flac");
        assert_eq!(tracks[0].artist, naming::UNKNOWN_ARTIST);
    }

    #[test]
    fn test_title_artist_convention() {
        let src = MemorySource::default().with("Song - Artist.flac", "");
        let mut lib = lib();
        lib.naming = NamingConvention::TitleArtist;

        let tracks = ingest(&src, &lib).unwrap();
        assert_eq!(tracks[0].title, "Song");
        assert_eq!(tracks[0].artist, "Artist");
    }

    #[test]
    fn test_falls_back_to_lrc_tags() {
        let src = MemorySource::default()
            .with("track01.flac", "")
            .with("track01.lrc", "[ti:Real Title]\n[ar:Real Artist]\n[00:01.00]x");

        let tracks = ingest(&src, &lib()).unwrap();
        assert_eq!(tracks[0].title, "Real Title");
        assert_eq!(tracks[0].artist, "Real Artist");
    }

    #[test]
    fn test_extra_audio_extensions() {
        let src = MemorySource::default().with("a.mp3", "").with("b.flac", "");
        let mut lib = lib();
        lib.audio_extensions = vec!["mp3".into()];

        let tracks = ingest(&src, &lib).unwrap();
        assert_eq!(tracks.len(), 1);
        assert_eq!(tracks[0].title, "a");
    }

    #[test]
    fn test_json_uses_camel_case() {
        let t = TrackRecord {
            id: "k".into(),
            title: "t".into(),
            artist: "a".into(),
            audio_url: "u".into(),
            lyrics_ref: None,
            lyrics: "l".into(),
        };
        let v = serde_json::to_value(&t).unwrap();
        assert_eq!(v["audioUrl"], "u");
        assert!(v.get("lyricsRef").is_none());
    }

    #[test]
    fn test_validate_listing() {
        let raw = r#"[
            {"id": "1", "title": "Sample", "artist": "Someone", "audioUrl": "https://x/1.mp3", "lyrics": "[00:05.50]Hello"},
            {"id": "2", "audioUrl": "https://x/2.mp3", "lyrics": "[00:01.00]Hi"}
        ]"#;
        let tracks = validate_listing(raw).unwrap();
        assert_eq!(tracks.len(), 2);
        assert_eq!(tracks[0].display_name(), "Sample - Someone");
        assert_eq!(tracks[1].title, "2");
        assert_eq!(tracks[1].artist, naming::UNKNOWN_ARTIST);
    }

    #[test]
    fn test_validate_listing_rejects_bad_shapes() {
        assert!(validate_listing("{}").is_err());
        assert!(validate_listing("not json").is_err());
        assert!(validate_listing(r#"[{"id": "1", "audioUrl": "u"}]"#).is_err());
        assert!(validate_listing(r#"[{"id": "", "audioUrl": "u", "lyrics": "l"}]"#).is_err());
    }
}
