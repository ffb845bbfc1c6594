//! LRC format parser
//!
//! Parses synchronized lyrics in LRC format:
//! [mm:ss.xx] Lyrics line here
//!
//! Example:
//! [00:12.34] Hello world
//! [00:15.00][00:42.50] Chorus line, shown twice
//!
//! Parsing never fails. Anything that is not a well-formed timestamp tag is
//! treated as text, and lines without a tag are dropped.

use once_cell::sync::Lazy;
use regex::Regex;

/// `[mm:ss.f]`, `[mm:ss.ff]` or `[mm:ss.fff]`, anywhere on a line.
static TIME_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[([0-9]{2}):([0-9]{2})\.([0-9]{1,3})\]").unwrap());

/// ID tags such as `[ar:Artist]`. Only matched on lines that are nothing else.
static ID_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\[([A-Za-z]+):(.*)\]$").unwrap());

/// A single line of lyrics with timestamp
#[derive(Debug, Clone, PartialEq)]
pub struct LyricLine {
    /// Seconds from the start of the track
    pub time_secs: f64,
    /// The lyrics text, never empty
    pub text: String,
}

impl LyricLine {
    pub fn new(time_secs: f64, text: String) -> Self {
        Self { time_secs, text }
    }
}

/// Parsed lyrics, sorted by timestamp
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Lyrics {
    pub lines: Vec<LyricLine>,
}

impl Lyrics {
    /// Parse an LRC document.
    pub fn parse(content: &str) -> Self {
        let mut lines = Vec::new();

        // `\r\n` yields an extra empty piece here, which has no tags and is skipped.
        for line in content.split(['\n', '\r']) {
            let times: Vec<f64> = TIME_TAG
                .captures_iter(line)
                .filter_map(|cap| tag_seconds(&cap[1], &cap[2], &cap[3]))
                .collect();
            if times.is_empty() {
                continue;
            }

            let text = TIME_TAG.replace_all(line, "");
            let text = text.trim();
            if text.is_empty() {
                continue;
            }

            lines.extend(times.into_iter().map(|t| LyricLine::new(t, text.to_string())));
        }

        // Vec::sort_by is stable, so equal timestamps keep document order.
        lines.sort_by(|a, b| a.time_secs.total_cmp(&b.time_secs));

        Self { lines }
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }
}

/// Convert the captured parts of a time tag into seconds.
///
/// The fraction is right-padded to three digits, so `5`, `50` and `500` all
/// mean half a second.
fn tag_seconds(min: &str, sec: &str, frac: &str) -> Option<f64> {
    let min: u32 = min.parse().ok()?;
    let sec: u32 = sec.parse().ok()?;
    let ms: u32 = format!("{frac:0<3}").parse().ok()?;
    Some(f64::from(min) * 60.0 + f64::from(sec) + f64::from(ms) / 1000.0)
}

/// ID tags found in an LRC header
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LrcTags {
    pub title: Option<String>,
    pub artist: Option<String>,
    pub album: Option<String>,
    pub author: Option<String>,
    /// `[offset:]` in milliseconds
    pub offset_ms: Option<i64>,
}

impl LrcTags {
    /// Collect the ID tags that `Lyrics::parse` drops.
    pub fn parse(content: &str) -> Self {
        let mut tags = Self::default();

        for line in content.lines() {
            let Some(cap) = ID_TAG.captures(line.trim()) else {
                continue;
            };
            let value = cap[2].trim();
            if value.is_empty() {
                continue;
            }
            match cap[1].to_ascii_lowercase().as_str() {
                "ti" => tags.title = Some(value.to_string()),
                "ar" => tags.artist = Some(value.to_string()),
                "al" => tags.album = Some(value.to_string()),
                "by" => tags.author = Some(value.to_string()),
                "offset" => tags.offset_ms = value.trim_start_matches('+').parse().ok(),
                _ => {}
            }
        }

        tags
    }
}
