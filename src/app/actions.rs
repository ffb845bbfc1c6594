#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Quit,
    TogglePause,
    PlayNext,
    PlayPrev,
    PlayIndex(usize),
    CyclePlaybackMode,
    SeekTo(f64),
    SeekBy(f64),
    VolumeUp,
    VolumeDown,
    ToggleMute,
    Status,
    List,
    Help,
}

/// Output of a state transition, carried out by the event loop.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Load(String),
    SetPause(bool),
    Seek(f64),
    SetVolume(u8),
    SetMute(bool),
    Say(String),
    Quit,
}
