#[derive(Debug, Clone)]
pub enum Event {
    /// One line typed on the console.
    Input(String),
    /// stdin reached its end.
    InputClosed,
    Player(PlayerEvent),
}

#[derive(Debug, Clone)]
pub enum PlayerEvent {
    Started,
    Paused,
    Position { seconds: f64 },
    Duration { seconds: f64 },
    /// Playback resumed after a load or a seek. Positions before this one
    /// belong to the old file or the old spot.
    Restarted,
    Ended,
    Error(String),
}
