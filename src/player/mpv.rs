use crate::app::events::{Event, PlayerEvent};
use anyhow::Context;
use serde_json::{Value, json};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::{
    io::{AsyncBufReadExt, AsyncWriteExt, BufReader},
    net::UnixStream,
    process::{Child, Command},
    sync::mpsc,
};

/// An idle mpv process driven over its JSON IPC socket.
///
/// Property changes come back as `PlayerEvent`s on the channel given to
/// `spawn`.
pub struct MpvHandle {
    child: Child,
    socket_path: PathBuf,
    writer: tokio::sync::Mutex<tokio::io::WriteHalf<UnixStream>>,
    request_id: AtomicU64,
}

impl MpvHandle {
    pub async fn spawn(
        event_tx: mpsc::Sender<Event>,
        audio_device: Option<&str>,
        log_file: Option<&Path>,
    ) -> anyhow::Result<Self> {
        let socket_path = std::env::temp_dir().join(format!("cadence-mpv-{}.sock", std::process::id()));
        let _ = std::fs::remove_file(&socket_path);

        let mut cmd = Command::new("mpv");
        cmd.args(["--no-video", "--idle=yes", "--input-terminal=no", "--really-quiet"]);
        if let Some(dev) = audio_device {
            cmd.arg(format!("--audio-device={dev}"));
        }
        if let Some(p) = log_file {
            cmd.arg(format!("--log-file={}", p.display()));
        }
        let child = cmd
            .arg(format!("--input-ipc-server={}", socket_path.display()))
            .stdin(std::process::Stdio::null())
            .stdout(std::process::Stdio::null())
            .stderr(std::process::Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .context("spawn mpv")?;

        let stream = connect_with_retry(&socket_path).await?;
        let (reader, writer) = tokio::io::split(stream);
        tokio::spawn(read_events_loop(reader, event_tx));

        let this = Self {
            child,
            socket_path,
            writer: tokio::sync::Mutex::new(writer),
            request_id: AtomicU64::new(1),
        };

        this.command(json!({"command": ["request_log_messages", "warn"]})).await?;
        for (id, prop) in [(1, "time-pos"), (2, "duration"), (3, "pause")] {
            this.command(json!({"command": ["observe_property", id, prop]})).await?;
        }
        tracing::debug!("mpv ready on {}", this.socket_path.display());

        Ok(this)
    }

    pub async fn load(&self, url: &str) -> anyhow::Result<()> {
        self.command(json!({"command": ["loadfile", url, "replace"]})).await
    }

    pub async fn set_pause(&self, paused: bool) -> anyhow::Result<()> {
        self.command(json!({"command": ["set_property", "pause", paused]})).await
    }

    pub async fn seek_absolute(&self, seconds: f64) -> anyhow::Result<()> {
        self.command(json!({"command": ["seek", seconds, "absolute"]})).await
    }

    pub async fn set_volume(&self, volume_0_100: u8) -> anyhow::Result<()> {
        self.command(json!({"command": ["set_property", "volume", volume_0_100]})).await
    }

    pub async fn set_mute(&self, muted: bool) -> anyhow::Result<()> {
        self.command(json!({"command": ["set_property", "mute", muted]})).await
    }

    async fn command(&self, mut v: Value) -> anyhow::Result<()> {
        // Tagged requests get their errors reported back on the event stream.
        if let Value::Object(ref mut o) = v {
            let id = self.request_id.fetch_add(1, Ordering::Relaxed);
            o.entry("request_id").or_insert_with(|| Value::from(id));
        }
        let mut line = serde_json::to_vec(&v).context("encode mpv json")?;
        line.push(b'\n');

        let mut w = self.writer.lock().await;
        w.write_all(&line).await.context("write mpv ipc")?;
        w.flush().await.context("flush mpv ipc")?;
        Ok(())
    }
}

impl Drop for MpvHandle {
    fn drop(&mut self) {
        let _ = self.child.start_kill();
        let _ = std::fs::remove_file(&self.socket_path);
    }
}

async fn connect_with_retry(path: &Path) -> anyhow::Result<UnixStream> {
    let deadline = tokio::time::Instant::now() + std::time::Duration::from_secs(5);
    loop {
        match UnixStream::connect(path).await {
            Ok(s) => return Ok(s),
            Err(e) if tokio::time::Instant::now() > deadline => {
                return Err(e).with_context(|| format!("connect to mpv ipc {}", path.display()));
            }
            Err(_) => tokio::time::sleep(std::time::Duration::from_millis(50)).await,
        }
    }
}

async fn read_events_loop(reader: tokio::io::ReadHalf<UnixStream>, event_tx: mpsc::Sender<Event>) {
    let mut lines = BufReader::new(reader).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        let Ok(v) = serde_json::from_str::<Value>(&line) else {
            continue;
        };
        if let Some(pe) = map_mpv_message(&v)
            && event_tx.send(Event::Player(pe)).await.is_err()
        {
            break;
        }
    }
    tracing::debug!("mpv event stream closed");
}

/// Translate one IPC message into a player notification.
fn map_mpv_message(v: &Value) -> Option<PlayerEvent> {
    // Command replies: {"request_id": .., "error": ".."}
    if v.get("request_id").is_some() {
        let err = v.get("error")?.as_str()?;
        return (err != "success").then(|| PlayerEvent::Error(format!("mpv ipc error: {err}")));
    }

    match v.get("event")?.as_str()? {
        "property-change" => {
            // `data` is absent or null while idle.
            let data = v.get("data")?;
            match v.get("name")?.as_str()? {
                "time-pos" => Some(PlayerEvent::Position { seconds: data.as_f64()? }),
                "duration" => Some(PlayerEvent::Duration { seconds: data.as_f64()? }),
                "pause" => Some(if data.as_bool()? { PlayerEvent::Paused } else { PlayerEvent::Started }),
                _ => None,
            }
        }
        "playback-restart" => Some(PlayerEvent::Restarted),
        // Only a natural end counts. `stop` comes from replacing the file.
        "end-file" => match v.get("reason").and_then(Value::as_str).unwrap_or("") {
            "eof" => Some(PlayerEvent::Ended),
            "error" => {
                let err = v.get("file_error").or_else(|| v.get("error")).and_then(Value::as_str).unwrap_or("unknown");
                Some(PlayerEvent::Error(format!("mpv end-file error: {err}")))
            }
            _ => None,
        },
        "log-message" => {
            let level = v.get("level")?.as_str()?;
            let text = v.get("text")?.as_str()?.trim();
            ((level == "warn" || level == "error") && !text.is_empty())
                .then(|| PlayerEvent::Error(format!("mpv {level}: {text}")))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(raw: &str) -> Option<PlayerEvent> {
        map_mpv_message(&serde_json::from_str(raw).unwrap())
    }

    #[test]
    fn test_property_changes() {
        assert!(matches!(
            map(r#"{"event":"property-change","id":1,"name":"time-pos","data":12.5}"#),
            Some(PlayerEvent::Position { seconds }) if seconds == 12.5
        ));
        assert!(matches!(
            map(r#"{"event":"property-change","id":2,"name":"duration","data":200.0}"#),
            Some(PlayerEvent::Duration { seconds }) if seconds == 200.0
        ));
        assert!(matches!(
            map(r#"{"event":"property-change","id":3,"name":"pause","data":true}"#),
            Some(PlayerEvent::Paused)
        ));
        assert!(matches!(
            map(r#"{"event":"property-change","id":3,"name":"pause","data":false}"#),
            Some(PlayerEvent::Started)
        ));
    }

    #[test]
    fn test_idle_position_is_ignored() {
        assert!(map(r#"{"event":"property-change","id":1,"name":"time-pos","data":null}"#).is_none());
        assert!(map(r#"{"event":"property-change","id":1,"name":"time-pos"}"#).is_none());
    }

    #[test]
    fn test_end_file_reasons() {
        assert!(matches!(map(r#"{"event":"end-file","reason":"eof"}"#), Some(PlayerEvent::Ended)));
        assert!(map(r#"{"event":"end-file","reason":"stop"}"#).is_none());
        assert!(matches!(
            map(r#"{"event":"end-file","reason":"error","file_error":"loading failed"}"#),
            Some(PlayerEvent::Error(e)) if e.contains("loading failed")
        ));
    }

    #[test]
    fn test_playback_restart() {
        assert!(matches!(map(r#"{"event":"playback-restart"}"#), Some(PlayerEvent::Restarted)));
        assert!(map(r#"{"event":"file-loaded"}"#).is_none());
    }

    #[test]
    fn test_command_replies() {
        assert!(map(r#"{"request_id":4,"error":"success"}"#).is_none());
        assert!(matches!(
            map(r#"{"request_id":4,"error":"property not found"}"#),
            Some(PlayerEvent::Error(e)) if e.contains("property not found")
        ));
    }

    #[test]
    fn test_log_messages() {
        assert!(map(r#"{"event":"log-message","level":"info","text":"hello"}"#).is_none());
        assert!(matches!(
            map(r#"{"event":"log-message","level":"error","text":"no audio\n"}"#),
            Some(PlayerEvent::Error(e)) if e == "mpv error: no audio"
        ));
    }
}
