//! Active line lookup for a playback position.

use std::ops::Range;

use super::parser::{LyricLine, Lyrics};

/// Index of the last line whose timestamp has been reached, if any.
///
/// `lines` must be sorted by time, which `Lyrics::parse` guarantees. The scan
/// stops at the first line that lies in the future.
pub fn active_index(lines: &[LyricLine], position_secs: f64) -> Option<usize> {
    let mut active = None;
    for (i, line) in lines.iter().enumerate() {
        if line.time_secs > position_secs {
            break;
        }
        active = Some(i);
    }
    active
}

/// Range of lines to show around the active one.
pub fn window(active: Option<usize>, len: usize, before: usize, after: usize) -> Range<usize> {
    let center = active.unwrap_or(0);
    let start = center.saturating_sub(before).min(len);
    let end = center.saturating_add(after).saturating_add(1).min(len);
    start..end
}

impl Lyrics {
    pub fn active_index(&self, position_secs: f64) -> Option<usize> {
        active_index(&self.lines, position_secs)
    }
}
