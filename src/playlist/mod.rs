use serde::{Deserialize, Serialize};

use crate::catalog::TrackRecord;

/// What happens when the current track ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PlaybackMode {
    /// Advance, stop after the last track.
    #[default]
    Sequential,
    /// Advance, wrap from the last track to the first.
    Loop,
    /// Play the current track again.
    RepeatOne,
}

impl PlaybackMode {
    pub fn next(self) -> Self {
        match self {
            PlaybackMode::Sequential => PlaybackMode::Loop,
            PlaybackMode::Loop => PlaybackMode::RepeatOne,
            PlaybackMode::RepeatOne => PlaybackMode::Sequential,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PlaybackMode::Sequential => "Mode: Sequential",
            PlaybackMode::Loop => "Mode: Loop",
            PlaybackMode::RepeatOne => "Mode: Repeat One",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sequential" => Some(PlaybackMode::Sequential),
            "loop" => Some(PlaybackMode::Loop),
            "repeat-one" => Some(PlaybackMode::RepeatOne),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Transport {
    #[default]
    Stopped,
    Playing,
    Paused,
}

/// Result of a track-changing transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Nothing changed.
    None,
    /// The current track is now at this index.
    Moved(usize),
    /// Ran off the end: stays on the last track, stopped.
    Stopped,
}

/// What the player should do after a track finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndAction {
    /// Rewind and play the same track.
    Restart,
    /// Start the track at this index.
    PlayNext(usize),
    /// End of the list.
    Stop,
}

#[derive(Debug, Clone, Default)]
pub struct Playlist {
    tracks: Vec<TrackRecord>,
    current: Option<usize>,
    mode: PlaybackMode,
    transport: Transport,
}

impl Playlist {
    pub fn new(tracks: Vec<TrackRecord>, mode: PlaybackMode) -> Self {
        let mut p = Self {
            mode,
            ..Self::default()
        };
        p.replace(tracks);
        p
    }

    /// Replace the track list and go back to the first track, stopped.
    pub fn replace(&mut self, tracks: Vec<TrackRecord>) {
        self.tracks = tracks;
        self.current = if self.tracks.is_empty() { None } else { Some(0) };
        self.transport = Transport::Stopped;
    }

    pub fn tracks(&self) -> &[TrackRecord] {
        &self.tracks
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current
    }

    pub fn current_track(&self) -> Option<&TrackRecord> {
        self.current.and_then(|i| self.tracks.get(i))
    }

    pub fn mode(&self) -> PlaybackMode {
        self.mode
    }

    pub fn cycle_mode(&mut self) -> PlaybackMode {
        self.mode = self.mode.next();
        self.mode
    }

    pub fn transport(&self) -> Transport {
        self.transport
    }

    /// Start playback. No-op without tracks.
    pub fn play(&mut self) {
        if self.current.is_some() {
            self.transport = Transport::Playing;
        }
    }

    pub fn pause(&mut self) {
        if self.transport == Transport::Playing {
            self.transport = Transport::Paused;
        }
    }

    pub fn stop(&mut self) {
        self.transport = Transport::Stopped;
    }

    /// Play when not playing, pause when playing.
    pub fn toggle(&mut self) -> Transport {
        match self.transport {
            Transport::Playing => self.pause(),
            Transport::Paused | Transport::Stopped => self.play(),
        }
        self.transport
    }

    /// Move to the next track according to the playback mode.
    ///
    /// Past the end only `Loop` wraps around. Every other mode stays on the
    /// last track and stops.
    pub fn next(&mut self) -> Step {
        let Some(current) = self.current else {
            return Step::None;
        };

        let next = current + 1;
        if next < self.tracks.len() {
            self.current = Some(next);
            return Step::Moved(next);
        }

        if self.mode == PlaybackMode::Loop {
            self.current = Some(0);
            Step::Moved(0)
        } else {
            self.current = Some(self.tracks.len() - 1);
            self.transport = Transport::Stopped;
            Step::Stopped
        }
    }

    /// Move to the previous track, wrapping from the first to the last.
    pub fn previous(&mut self) -> Step {
        let Some(current) = self.current else {
            return Step::None;
        };

        let prev = if current == 0 { self.tracks.len() - 1 } else { current - 1 };
        self.current = Some(prev);
        Step::Moved(prev)
    }

    /// Jump to a track. Out of range indices are ignored.
    pub fn select(&mut self, index: usize) -> Step {
        if index >= self.tracks.len() {
            return Step::None;
        }
        self.current = Some(index);
        Step::Moved(index)
    }

    /// The current track reached its end.
    pub fn track_ended(&mut self) -> EndAction {
        let Some(current) = self.current else {
            self.transport = Transport::Stopped;
            return EndAction::Stop;
        };

        if self.mode == PlaybackMode::RepeatOne {
            self.transport = Transport::Playing;
            return EndAction::Restart;
        }

        if self.mode == PlaybackMode::Sequential && current + 1 == self.tracks.len() {
            self.transport = Transport::Stopped;
            return EndAction::Stop;
        }

        match self.next() {
            Step::Moved(i) => {
                self.transport = Transport::Playing;
                EndAction::PlayNext(i)
            }
            Step::None | Step::Stopped => EndAction::Stop,
        }
    }
}
