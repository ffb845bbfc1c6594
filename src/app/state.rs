use super::actions::{Action, Effect};
use super::events::{Event, PlayerEvent};
use crate::lyrics::Lyrics;
use crate::player::{PlayerState, format_time};
use crate::playlist::{EndAction, Playlist, Step, Transport};

const VOLUME_STEP: u8 = 5;

/// Lyrics parsed for one track, dropped when the track changes.
#[derive(Debug, Clone)]
pub struct LoadedLyrics {
    pub track_id: String,
    pub lyrics: Lyrics,
    /// Last line announced, so each line is shown once.
    pub shown: Option<usize>,
}

pub struct AppState {
    pub should_quit: bool,
    pub playlist: Playlist,
    pub player: PlayerState,
    pub lyrics: Option<LoadedLyrics>,
    /// Whether the backend holds the current track. False after it ran out.
    pub loaded: bool,
    /// A load or seek was sent and the backend has not restarted playback
    /// yet. Positions received meanwhile are stale.
    pub awaiting_restart: bool,
}

impl AppState {
    pub fn new(playlist: Playlist, volume: u8) -> Self {
        Self {
            should_quit: false,
            playlist,
            player: PlayerState::new(volume),
            lyrics: None,
            loaded: false,
            awaiting_restart: false,
        }
    }

    /// Effects to run once the backend is up.
    pub fn start(&mut self, autoplay: bool) -> Vec<Effect> {
        let mut fx = vec![Effect::SetVolume(self.player.volume)];
        if self.playlist.is_empty() {
            fx.push(Effect::Say("Catalog is empty. Run `cadence scan` first.".into()));
            return fx;
        }
        fx.extend(self.load_current(autoplay));
        fx
    }

    pub fn handle_event(&mut self, ev: Event) -> Vec<Effect> {
        match ev {
            Event::Input(line) => match crate::input::parse_command(&line) {
                Some(action) => self.handle_action(action),
                None if line.trim().is_empty() => Vec::new(),
                None => vec![Effect::Say(format!("Unknown command {:?}. Type h for help.", line.trim()))],
            },
            // Nobody is left to type `q`.
            Event::InputClosed => self.handle_action(Action::Quit),
            Event::Player(pe) => self.handle_player(pe),
        }
    }

    pub fn handle_action(&mut self, action: Action) -> Vec<Effect> {
        match action {
            Action::Quit => {
                self.should_quit = true;
                vec![Effect::Quit]
            }
            Action::TogglePause => {
                if self.playlist.is_empty() {
                    return Vec::new();
                }
                match self.playlist.toggle() {
                    Transport::Playing if !self.loaded => self.load_current(true),
                    Transport::Playing => vec![Effect::SetPause(false)],
                    Transport::Paused | Transport::Stopped => vec![Effect::SetPause(true)],
                }
            }
            Action::PlayNext => {
                let step = self.playlist.next();
                self.after_step(step)
            }
            Action::PlayPrev => {
                let step = self.playlist.previous();
                self.after_step(step)
            }
            Action::PlayIndex(i) => match self.playlist.select(i) {
                Step::None => vec![Effect::Say(format!("No track {}", i + 1))],
                step => self.after_step(step),
            },
            Action::CyclePlaybackMode => {
                let mode = self.playlist.cycle_mode();
                vec![Effect::Say(mode.label().into())]
            }
            Action::SeekTo(t) => self.seek(t),
            Action::SeekBy(d) => self.seek(self.player.position_secs + d),
            Action::VolumeUp => {
                self.player.set_volume(self.player.volume.saturating_add(VOLUME_STEP));
                self.volume_effects()
            }
            Action::VolumeDown => {
                self.player.set_volume(self.player.volume.saturating_sub(VOLUME_STEP));
                self.volume_effects()
            }
            Action::ToggleMute => {
                let muted = self.player.toggle_mute();
                vec![Effect::SetMute(muted), Effect::Say(if muted { "Muted" } else { "Unmuted" }.into())]
            }
            Action::Status => vec![Effect::Say(self.status_line())],
            Action::List => vec![Effect::Say(self.track_list())],
            Action::Help => vec![Effect::Say(crate::input::HELP.into())],
        }
    }

    pub fn handle_player(&mut self, ev: PlayerEvent) -> Vec<Effect> {
        if self.awaiting_restart && matches!(ev, PlayerEvent::Position { .. }) {
            return Vec::new();
        }
        self.player.apply(&ev);
        match ev {
            PlayerEvent::Position { .. } => self.announce_lyric(),
            PlayerEvent::Duration { .. } => Vec::new(),
            PlayerEvent::Restarted => {
                self.awaiting_restart = false;
                Vec::new()
            }
            PlayerEvent::Started => {
                if self.loaded {
                    self.playlist.play();
                }
                Vec::new()
            }
            PlayerEvent::Paused => {
                self.playlist.pause();
                Vec::new()
            }
            PlayerEvent::Ended => match self.playlist.track_ended() {
                EndAction::Restart => self.load_current(true),
                EndAction::PlayNext(_) => self.load_current(true),
                EndAction::Stop => {
                    self.loaded = false;
                    vec![Effect::Say("End of playlist".into())]
                }
            },
            PlayerEvent::Error(e) => {
                tracing::warn!("{e}");
                // A failed load never restarts.
                self.awaiting_restart = false;
                Vec::new()
            }
        }
    }

    fn after_step(&mut self, step: Step) -> Vec<Effect> {
        match step {
            Step::None => Vec::new(),
            // Changing tracks by hand loads the track without starting it.
            Step::Moved(_) => self.load_current(false),
            Step::Stopped => {
                self.player.seek(0.0);
                self.awaiting_restart = true;
                self.reset_shown();
                vec![
                    Effect::SetPause(true),
                    Effect::Seek(0.0),
                    Effect::Say("End of playlist".into()),
                ]
            }
        }
    }

    /// Load the current track into the backend and reparse its lyrics.
    fn load_current(&mut self, autoplay: bool) -> Vec<Effect> {
        let Some(track) = self.playlist.current_track().cloned() else {
            return Vec::new();
        };

        self.player.load_track();
        self.loaded = true;
        self.awaiting_restart = true;
        if autoplay {
            self.playlist.play();
        } else {
            self.playlist.stop();
        }

        if self.lyrics.as_ref().is_some_and(|l| l.track_id == track.id) {
            self.reset_shown();
        } else {
            self.lyrics = Some(LoadedLyrics {
                track_id: track.id.clone(),
                lyrics: Lyrics::parse(&track.lyrics),
                shown: None,
            });
        }

        let mut fx = vec![
            Effect::SetPause(!autoplay),
            Effect::Load(track.audio_url.clone()),
            Effect::Say(format!("{} {}", if autoplay { "▶" } else { "■" }, track.display_name())),
        ];
        if self.lyrics.as_ref().is_some_and(|l| l.lyrics.is_empty()) {
            fx.push(Effect::Say("No lyrics available.".into()));
        }
        fx
    }

    fn seek(&mut self, secs: f64) -> Vec<Effect> {
        if !self.loaded {
            return Vec::new();
        }
        let t = self.player.seek(secs);
        self.awaiting_restart = true;
        let mut fx = vec![Effect::Seek(t)];
        fx.extend(self.announce_lyric());
        fx
    }

    fn volume_effects(&self) -> Vec<Effect> {
        vec![
            Effect::SetVolume(self.player.volume),
            Effect::SetMute(self.player.muted),
            Effect::Say(format!("Volume: {}", self.player.volume)),
        ]
    }

    /// Resolve the active line for the current position and announce it when
    /// it changed.
    fn announce_lyric(&mut self) -> Vec<Effect> {
        let position = self.player.position_secs;
        let Some(loaded) = &mut self.lyrics else {
            return Vec::new();
        };

        let active = loaded.lyrics.active_index(position);
        if active == loaded.shown {
            return Vec::new();
        }
        loaded.shown = active;

        match active {
            Some(i) => vec![Effect::Say(format!("♪ {}", loaded.lyrics.lines[i].text))],
            None => Vec::new(),
        }
    }

    fn reset_shown(&mut self) {
        if let Some(l) = &mut self.lyrics {
            l.shown = None;
        }
    }

    pub fn status_line(&self) -> String {
        let Some(track) = self.playlist.current_track() else {
            return "Nothing loaded".into();
        };
        let transport = match self.playlist.transport() {
            Transport::Playing => "playing",
            Transport::Paused => "paused",
            Transport::Stopped => "stopped",
        };
        let volume = if self.player.muted {
            "muted".to_string()
        } else {
            format!("vol {}", self.player.volume)
        };
        format!(
            "{} [{}] {} / {} | {} | {}",
            track.display_name(),
            transport,
            format_time(self.player.position_secs),
            format_time(self.player.duration_secs),
            self.playlist.mode().label(),
            volume,
        )
    }

    pub fn track_list(&self) -> String {
        self.playlist
            .tracks()
            .iter()
            .enumerate()
            .map(|(i, t)| {
                let marker = if Some(i) == self.playlist.current_index() { '>' } else { ' ' };
                format!("{marker}{:02}. {}", i + 1, t.display_name())
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}
