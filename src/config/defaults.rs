use directories::ProjectDirs;
use std::path::PathBuf;

use super::{Config, LibraryConfig, PathsConfig, PlayerConfig};

pub const AUDIO_EXTENSION: &str = "flac";
pub const LYRICS_EXTENSION: &str = "lrc";
pub const VOLUME: u8 = 50;

pub fn data_dir() -> PathBuf {
    ProjectDirs::from("dev", "cadence", "cadence")
        .map(|p| p.data_dir().to_path_buf())
        .unwrap_or_else(|| std::env::temp_dir().join("cadence"))
}

pub fn defaults() -> Config {
    Config {
        paths: PathsConfig::default(),
        library: LibraryConfig::default(),
        player: PlayerConfig::default(),
    }
}
