mod app;
mod catalog;
mod config;
mod input;
mod lyrics;
mod player;
mod playlist;
mod storage;

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use catalog::{NamingConvention, TrackRecord};
use playlist::{PlaybackMode, Playlist, Step};
use storage::Storage;

#[derive(Debug, Parser)]
#[command(name = "cadence", version, about = "Music player with synchronized lyrics")]
struct Cli {
    /// Override config file path.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log debug messages.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the timed lines of an LRC file.
    Lyrics {
        file: PathBuf,
        /// Only show the lines around this position (seconds).
        #[arg(long)]
        at: Option<f64>,
        /// Lines shown before and after the active one with --at.
        #[arg(long, default_value_t = 1)]
        context: usize,
    },
    /// Add every audio file in a library directory to the catalog.
    Scan {
        /// Library directory (defaults to library.dir from the config).
        dir: Option<PathBuf>,
        /// Also drop catalog entries that were not found in this scan.
        #[arg(long)]
        prune: bool,
    },
    /// Import a JSON track listing into the catalog.
    Import { file: PathBuf },
    /// List the catalog.
    Tracks {
        /// Print the listing as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Play the catalog with live lyrics (needs mpv).
    Play {
        /// Track number to start from (as shown by `tracks`).
        #[arg(long, default_value_t = 1)]
        index: usize,
        /// sequential, loop or repeat-one
        #[arg(long, value_parser = parse_mode)]
        mode: Option<PlaybackMode>,
        /// Load the first track without starting it.
        #[arg(long)]
        paused: bool,
    },
    /// Inspect or change settings.
    Config {
        #[command(subcommand)]
        cmd: ConfigCommand,
    },
}

#[derive(Debug, Subcommand)]
enum ConfigCommand {
    /// Print the effective config.
    Show,
    /// Filename convention used by scan: artist-title or title-artist.
    Naming {
        #[arg(value_parser = parse_naming)]
        convention: NamingConvention,
    },
    /// Default playback mode: sequential, loop or repeat-one.
    Mode {
        #[arg(value_parser = parse_mode)]
        mode: PlaybackMode,
    },
    /// Set the mpv audio device, or clear it when no name is given.
    AudioDevice { device: Option<String> },
}

fn parse_mode(s: &str) -> Result<PlaybackMode, String> {
    PlaybackMode::parse(s).ok_or_else(|| format!("unknown mode {s:?} (sequential, loop, repeat-one)"))
}

fn parse_naming(s: &str) -> Result<NamingConvention, String> {
    NamingConvention::parse(s).ok_or_else(|| format!("unknown convention {s:?} (artist-title, title-artist)"))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // stdout belongs to the console session.
    tracing_subscriber::fmt()
        .with_max_level(if cli.verbose { tracing::Level::DEBUG } else { tracing::Level::INFO })
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_level(true)
        .init();

    let cfg = config::load(cli.config.as_deref()).context("load config")?;

    match cli.command {
        Command::Lyrics { file, at, context } => {
            let raw = std::fs::read_to_string(&file).with_context(|| format!("read {}", file.display()))?;
            print_lyrics(&raw, at, context);
        }
        Command::Scan { dir, prune } => {
            let dir = dir
                .or_else(|| cfg.library.dir.clone())
                .context("no library directory given and library.dir is not set")?;
            let source = catalog::DirSource::open(&dir)?;
            let tracks = catalog::ingest(&source, &cfg.library)?;

            let mut storage = open_storage(&cfg)?;
            storage.upsert_tracks(&tracks, now_unix())?;
            if prune {
                let keep: Vec<&str> = tracks.iter().map(|t| t.id.as_str()).collect();
                let removed = storage.retain_tracks(&keep)?;
                println!("Removed {removed} stale tracks.");
            }
            println!("Catalogued {} tracks from {}.", tracks.len(), dir.display());
        }
        Command::Import { file } => {
            let raw = std::fs::read_to_string(&file).with_context(|| format!("read {}", file.display()))?;
            let tracks = catalog::validate_listing(&raw)?;
            open_storage(&cfg)?.upsert_tracks(&tracks, now_unix())?;
            println!("Imported {} tracks.", tracks.len());
        }
        Command::Tracks { json } => {
            let tracks = open_storage(&cfg)?.tracks()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&tracks)?);
            } else {
                print_tracks(&tracks);
            }
        }
        Command::Play { index, mode, paused } => {
            let tracks = open_storage(&cfg)?.tracks()?;
            let mut playlist = Playlist::new(tracks, mode.unwrap_or(cfg.player.mode));
            if index != 1 && (index == 0 || playlist.select(index - 1) == Step::None) {
                anyhow::bail!("no track {index} in a catalog of {}", playlist.len());
            }
            let mut app = app::App::new(cfg, cli.config.clone(), playlist);
            let res = app.run(!paused).await;
            // Stops mpv.
            drop(app);
            // The stdin reader may still be blocked in a read, and runtime
            // shutdown would wait for it.
            if let Err(e) = res {
                eprintln!("Error: {e:?}");
                std::process::exit(1);
            }
            std::process::exit(0);
        }
        Command::Config { cmd } => {
            let mut cfg = cfg;
            match cmd {
                ConfigCommand::Show => {
                    print!("{}", toml::to_string_pretty(&cfg).context("serialize config")?);
                    return Ok(());
                }
                ConfigCommand::Naming { convention } => {
                    cfg.library.naming = convention;
                    println!("Filename convention: {}", convention.label());
                }
                ConfigCommand::Mode { mode } => {
                    cfg.player.mode = mode;
                    println!("{}", mode.label());
                }
                ConfigCommand::AudioDevice { device } => {
                    match &device {
                        Some(d) => println!("Audio device: {d}"),
                        None => println!("Cleared audio device override."),
                    }
                    cfg.player.audio_device = device;
                }
            }
            config::save(&cfg, cli.config.as_deref()).context("save config")?;
        }
    }

    Ok(())
}

fn open_storage(cfg: &config::Config) -> anyhow::Result<Storage> {
    Storage::open(&cfg.catalog_path())
}

fn now_unix() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

fn print_tracks(tracks: &[TrackRecord]) {
    if tracks.is_empty() {
        println!("Catalog is empty.");
        return;
    }
    for (i, t) in tracks.iter().enumerate() {
        println!("{:02}. {}  ({})", i + 1, t.display_name(), t.id);
    }
}

fn print_lyrics(raw: &str, at: Option<f64>, context: usize) {
    let tags = lyrics::LrcTags::parse(raw);
    if let Some(title) = &tags.title {
        match &tags.artist {
            Some(artist) => println!("{title} - {artist}"),
            None => println!("{title}"),
        }
    }
    if let Some(album) = &tags.album {
        println!("Album: {album}");
    }
    if let Some(author) = &tags.author {
        println!("LRC by {author}");
    }
    if let Some(offset) = tags.offset_ms {
        println!("Offset: {offset:+}ms (not applied)");
    }

    let parsed = lyrics::Lyrics::parse(raw);
    if parsed.is_empty() {
        println!("No lyrics available.");
        return;
    }

    let (range, active) = match at {
        Some(pos) => {
            let active = parsed.active_index(pos);
            (lyrics::window(active, parsed.len(), context, context), active)
        }
        None => (0..parsed.len(), None),
    };

    for i in range {
        let line = &parsed.lines[i];
        let prefix = if Some(i) == active { "♪ " } else { "  " };
        println!("{prefix}{:>7}  {}", player::format_time(line.time_secs), line.text);
    }
}
