pub mod mpv;

use crate::app::events::PlayerEvent;

/// Volume, mute and position of the media element.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerState {
    pub position_secs: f64,
    pub duration_secs: f64,
    /// 0-100
    pub volume: u8,
    pub muted: bool,
}

impl PlayerState {
    pub fn new(volume: u8) -> Self {
        Self {
            position_secs: 0.0,
            duration_secs: 0.0,
            volume: volume.min(100),
            muted: false,
        }
    }

    /// A new track was loaded.
    pub fn load_track(&mut self) {
        self.position_secs = 0.0;
        self.duration_secs = 0.0;
    }

    /// Set the volume. Any audible level also unmutes.
    pub fn set_volume(&mut self, volume: u8) {
        self.volume = volume.min(100);
        if self.volume > 0 {
            self.muted = false;
        }
    }

    pub fn toggle_mute(&mut self) -> bool {
        self.muted = !self.muted;
        self.muted
    }

    pub fn seek(&mut self, secs: f64) -> f64 {
        self.position_secs = if secs.is_finite() { secs.max(0.0) } else { 0.0 };
        self.position_secs
    }

    pub fn apply(&mut self, ev: &PlayerEvent) {
        match ev {
            PlayerEvent::Position { seconds } => self.position_secs = *seconds,
            PlayerEvent::Duration { seconds } => self.duration_secs = *seconds,
            PlayerEvent::Ended => self.position_secs = 0.0,
            PlayerEvent::Started | PlayerEvent::Paused | PlayerEvent::Restarted | PlayerEvent::Error(_) => {}
        }
    }
}

/// `m:ss`
pub fn format_time(secs: f64) -> String {
    if !secs.is_finite() || secs < 0.0 {
        return "0:00".to_string();
    }
    let total = secs.floor() as u64;
    format!("{}:{:02}", total / 60, total % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_time() {
        assert_eq!(format_time(0.0), "0:00");
        assert_eq!(format_time(5.9), "0:05");
        assert_eq!(format_time(65.0), "1:05");
        assert_eq!(format_time(3600.0), "60:00");
        assert_eq!(format_time(-1.0), "0:00");
        assert_eq!(format_time(f64::NAN), "0:00");
    }

    #[test]
    fn test_volume_unmutes() {
        let mut p = PlayerState::new(50);
        assert!(p.toggle_mute());
        p.set_volume(0);
        assert!(p.muted);
        p.set_volume(30);
        assert!(!p.muted);
        assert_eq!(p.volume, 30);
        p.set_volume(250);
        assert_eq!(p.volume, 100);
    }

    #[test]
    fn test_apply_events() {
        let mut p = PlayerState::new(50);
        p.apply(&PlayerEvent::Duration { seconds: 180.0 });
        p.apply(&PlayerEvent::Position { seconds: 12.5 });
        assert_eq!(p.position_secs, 12.5);
        assert_eq!(p.duration_secs, 180.0);
        p.load_track();
        assert_eq!(p.position_secs, 0.0);
        assert_eq!(p.duration_secs, 0.0);
    }

    #[test]
    fn test_seek_clamps() {
        let mut p = PlayerState::new(50);
        assert_eq!(p.seek(-3.0), 0.0);
        assert_eq!(p.seek(42.0), 42.0);
    }
}
