//! Synchronized lyrics
//!
//! This module provides:
//! - LRC format parser for synchronized lyrics
//! - Active line lookup for the current playback position

pub mod active;
pub mod parser;

pub use active::window;
pub use parser::{LrcTags, Lyrics};

/// Shown in place of lyrics for tracks that have no `.lrc` companion.
pub const PLACEHOLDER: &str = "[00:00.00]No lyrics found for this track.";
