use serde::{Deserialize, Serialize};

pub const UNKNOWN_ARTIST: &str = "Unknown Artist";

const SEPARATOR: &str = " - ";

/// How a `"A - B"` filename maps onto title and artist.
///
/// Both orders turn up in real libraries, so this is a setting rather than a
/// fixed rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NamingConvention {
    /// `Artist - Title.flac`
    #[default]
    ArtistTitle,
    /// `Title - Artist.flac`
    TitleArtist,
}

impl NamingConvention {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "artist-title" => Some(Self::ArtistTitle),
            "title-artist" => Some(Self::TitleArtist),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::ArtistTitle => "artist-title",
            Self::TitleArtist => "title-artist",
        }
    }

    /// Split an object key into `(title, artist)`.
    ///
    /// Only the last path segment is considered, and any extension listed in
    /// `extensions` is stripped first. The artist is `None` unless the name
    /// has exactly one separator.
    pub fn split(self, key: &str, extensions: &[&str]) -> (String, Option<String>) {
        let name = key.rsplit('/').next().unwrap_or(key);
        let stem = strip_extension(name, extensions);

        let parts: Vec<&str> = stem.split(SEPARATOR).collect();
        if let [a, b] = parts.as_slice() {
            let (title, artist) = match self {
                Self::ArtistTitle => (b.trim(), a.trim()),
                Self::TitleArtist => (a.trim(), b.trim()),
            };
            return (title.to_string(), Some(artist.to_string()));
        }

        (stem.to_string(), None)
    }
}

/// Extension of the last path segment, without the dot.
pub fn extension(key: &str) -> Option<&str> {
    let name = key.rsplit('/').next().unwrap_or(key);
    let (stem, ext) = name.rsplit_once('.')?;
    if stem.is_empty() { None } else { Some(ext) }
}

/// `name` without a trailing `.ext` when `ext` is one of `extensions`
/// (case-insensitive).
pub fn strip_extension<'a>(name: &'a str, extensions: &[&str]) -> &'a str {
    match name.rsplit_once('.') {
        Some((stem, ext)) if extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)) => stem,
        _ => name,
    }
}

/// Key of the sibling object with extension `ext`.
pub fn sibling_key(key: &str, ext: &str) -> String {
    match extension(key) {
        Some(old) => format!("{}.{ext}", &key[..key.len() - old.len() - 1]),
        None => format!("{key}.{ext}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EXT: &[&str] = &["flac", "lrc"];

    #[test]
    fn test_artist_title() {
        let (title, artist) = NamingConvention::ArtistTitle.split("Daft Punk - One More Time.flac", EXT);
        assert_eq!(title, "One More Time");
        assert_eq!(artist.as_deref(), Some("Daft Punk"));
    }

    #[test]
    fn test_title_artist() {
        let (title, artist) = NamingConvention::TitleArtist.split("One More Time - Daft Punk.FLAC", EXT);
        assert_eq!(title, "One More Time");
        assert_eq!(artist.as_deref(), Some("Daft Punk"));
    }

    #[test]
    fn test_no_separator_or_too_many() {
        let (title, artist) = NamingConvention::ArtistTitle.split("untitled.flac", EXT);
        assert_eq!(title, "untitled");
        assert_eq!(artist, None);

        let (title, artist) = NamingConvention::ArtistTitle.split("a - b - c.flac", EXT);
        assert_eq!(title, "a - b - c");
        assert_eq!(artist, None);
    }

    #[test]
    fn test_uses_last_segment() {
        let (title, artist) = NamingConvention::ArtistTitle.split("albums/2001/Artist - Song.flac", EXT);
        assert_eq!(title, "Song");
        assert_eq!(artist.as_deref(), Some("Artist"));
    }

    #[test]
    fn test_unknown_extension_is_kept() {
        let (title, _) = NamingConvention::ArtistTitle.split("notes.txt", EXT);
        assert_eq!(title, "notes.txt");
    }

    #[test]
    fn test_sibling_key() {
        assert_eq!(sibling_key("a/Artist - Song.FLAC", "lrc"), "a/Artist - Song.lrc");
        assert_eq!(sibling_key("noext", "lrc"), "noext.lrc");
        assert_eq!(sibling_key("dir.v2/song", "lrc"), "dir.v2/song.lrc");
    }

    #[test]
    fn test_extension() {
        assert_eq!(extension("dir.v2/song.flac"), Some("flac"));
        assert_eq!(extension("dir.v2/song"), None);
        assert_eq!(extension(".hidden"), None);
    }

    #[test]
    fn test_parse_label() {
        for c in [NamingConvention::ArtistTitle, NamingConvention::TitleArtist] {
            assert_eq!(NamingConvention::parse(c.label()), Some(c));
        }
        assert_eq!(NamingConvention::parse("sideways"), None);
    }
}
