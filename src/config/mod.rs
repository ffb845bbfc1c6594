use anyhow::Context;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::catalog::NamingConvention;
use crate::playlist::PlaybackMode;

pub mod defaults;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub paths: PathsConfig,
    pub library: LibraryConfig,
    pub player: PlayerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    pub data_dir: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LibraryConfig {
    /// Directory scanned by `cadence scan` when none is given.
    pub dir: Option<PathBuf>,
    /// Extensions treated as audio (case-insensitive, without the dot).
    pub audio_extensions: Vec<String>,
    /// Extension of the lyrics file next to each audio file.
    pub lyrics_extension: String,
    /// Public URL prefix for audio objects. Local paths are used when unset.
    pub public_url_prefix: Option<String>,
    /// How "A - B" filenames map to title and artist.
    pub naming: NamingConvention,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// mpv audio device name (see `mpv --audio-device=help`)
    pub audio_device: Option<String>,
    /// Volume level (0-100)
    pub volume: u8,
    /// Playback mode used when `play` is not given one
    pub mode: PlaybackMode,
}

impl Default for Config {
    fn default() -> Self {
        defaults::defaults()
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            data_dir: defaults::data_dir(),
        }
    }
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self {
            dir: None,
            audio_extensions: vec![defaults::AUDIO_EXTENSION.to_string()],
            lyrics_extension: defaults::LYRICS_EXTENSION.to_string(),
            public_url_prefix: None,
            naming: NamingConvention::default(),
        }
    }
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            audio_device: None,
            volume: defaults::VOLUME,
            mode: PlaybackMode::default(),
        }
    }
}

impl Config {
    pub fn catalog_path(&self) -> PathBuf {
        self.paths.data_dir.join("catalog.sqlite3")
    }
}

pub fn default_config_path() -> anyhow::Result<PathBuf> {
    let proj = ProjectDirs::from("dev", "cadence", "cadence").context("ProjectDirs unavailable")?;
    Ok(proj.config_dir().join("config.toml"))
}

pub fn save(cfg: &Config, override_path: Option<&Path>) -> anyhow::Result<()> {
    let path = match override_path {
        Some(p) => p.to_path_buf(),
        None => default_config_path()?,
    };
    let raw = toml::to_string_pretty(cfg).context("serialize config")?;
    write_private(&path, &raw)
}

pub fn load(override_path: Option<&Path>) -> anyhow::Result<Config> {
    let path = match override_path {
        Some(p) => p.to_path_buf(),
        None => default_config_path()?,
    };

    if !path.exists() {
        let cfg = defaults::defaults();
        let raw = toml::to_string_pretty(&cfg).context("serialize default config")?;
        write_private(&path, &raw)?;
        tracing::info!("wrote default config to {}", path.display());
        return Ok(cfg);
    }

    let raw = fs::read_to_string(&path).with_context(|| format!("read {}", path.display()))?;
    let cfg = toml::from_str::<Config>(&raw).with_context(|| format!("parse {}", path.display()))?;
    if cfg.player.volume > 100 {
        anyhow::bail!("player.volume must be 0-100, got {}", cfg.player.volume);
    }
    Ok(cfg)
}

fn write_private(path: &Path, raw: &str) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).with_context(|| format!("create dir {}", parent.display()))?;
    }
    fs::write(path, raw).with_context(|| format!("write {}", path.display()))?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let _ = fs::set_permissions(path, fs::Permissions::from_mode(0o600));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_creates_default_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let cfg = load(Some(&path)).unwrap();
        assert!(path.exists());
        assert_eq!(cfg.player.volume, defaults::VOLUME);
        assert_eq!(cfg.library.audio_extensions, vec!["flac".to_string()]);
        assert_eq!(cfg.library.naming, NamingConvention::ArtistTitle);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[library]\nnaming = \"title-artist\"\n\n[player]\nmode = \"repeat-one\"\n").unwrap();

        let cfg = load(Some(&path)).unwrap();
        assert_eq!(cfg.library.naming, NamingConvention::TitleArtist);
        assert_eq!(cfg.library.lyrics_extension, "lrc");
        assert_eq!(cfg.player.mode, PlaybackMode::RepeatOne);
        assert_eq!(cfg.player.volume, defaults::VOLUME);
    }

    #[test]
    fn test_save_round_trips_changes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut cfg = load(Some(&path)).unwrap();
        cfg.player.audio_device = Some("pulse/sink".into());
        cfg.library.public_url_prefix = Some("https://cdn.example.com".into());
        save(&cfg, Some(&path)).unwrap();

        let back = load(Some(&path)).unwrap();
        assert_eq!(back.player.audio_device.as_deref(), Some("pulse/sink"));
        assert_eq!(back.library.public_url_prefix.as_deref(), Some("https://cdn.example.com"));
    }

    #[test]
    fn test_rejects_out_of_range_volume() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[player]\nvolume = 150\n").unwrap();
        assert!(load(Some(&path)).is_err());
    }
}
