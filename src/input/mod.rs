use crate::app::{actions::Action, events::Event};
use std::io::BufRead;
use tokio::sync::mpsc;

pub const HELP: &str = "\
p        play / pause
n / b    next / previous track
<N>      play track N from the list
m        cycle playback mode
s <t>    seek to t (seconds or m:ss)
f / r    skip forward / back 10s
+ / -    volume up / down
u        mute / unmute
i        status
l        list tracks
q        quit";

/// Forward console lines to the event loop until stdin closes.
///
/// The read blocks a pool thread that cannot be cancelled, so the process
/// has to exit without waiting for it.
pub fn spawn_input_task(tx: mpsc::Sender<Event>) {
    tokio::task::spawn_blocking(move || forward_lines(std::io::stdin().lock(), &tx));
}

/// Send every line of `reader` as input, then `InputClosed` once it ends.
fn forward_lines(reader: impl BufRead, tx: &mpsc::Sender<Event>) {
    for line in reader.lines() {
        match line {
            Ok(line) => {
                if tx.blocking_send(Event::Input(line)).is_err() {
                    return;
                }
            }
            Err(e) => {
                tracing::warn!("read stdin: {e}");
                break;
            }
        }
    }
    tracing::debug!("stdin closed");
    let _ = tx.blocking_send(Event::InputClosed);
}

pub fn parse_command(line: &str) -> Option<Action> {
    let line = line.trim();
    let (cmd, arg) = match line.split_once(char::is_whitespace) {
        Some((c, a)) => (c, a.trim()),
        None => (line, ""),
    };

    let action = match cmd {
        "q" | "quit" => Action::Quit,
        "p" | "play" | "pause" => Action::TogglePause,
        "n" | "next" => Action::PlayNext,
        "b" | "prev" => Action::PlayPrev,
        "m" | "mode" => Action::CyclePlaybackMode,
        "s" | "seek" => Action::SeekTo(parse_position(arg)?),
        "f" => Action::SeekBy(10.0),
        "r" => Action::SeekBy(-10.0),
        "+" => Action::VolumeUp,
        "-" => Action::VolumeDown,
        "u" | "mute" => Action::ToggleMute,
        "i" | "status" => Action::Status,
        "l" | "list" => Action::List,
        "h" | "?" | "help" => Action::Help,
        n => {
            // Track numbers are shown 1-based.
            let n: usize = n.parse().ok()?;
            Action::PlayIndex(n.checked_sub(1)?)
        }
    };
    Some(action)
}

/// `90`, `90.5` or `1:30`. Seconds after a colon must be below 60.
fn parse_position(s: &str) -> Option<f64> {
    let secs = match s.split_once(':') {
        Some((m, rest)) => {
            let sec = rest.parse::<f64>().ok()?;
            if !(0.0..60.0).contains(&sec) {
                return None;
            }
            m.parse::<u32>().ok()? as f64 * 60.0 + sec
        }
        None => s.parse::<f64>().ok()?,
    };
    (secs.is_finite() && secs >= 0.0).then_some(secs)
}
