pub mod actions;
pub mod events;
pub mod state;

use crate::config::{self, Config};
use crate::input;
use crate::player::mpv::MpvHandle;
use crate::playlist::Playlist;
use actions::Effect;
use anyhow::Context;
use events::Event;
use state::AppState;
use std::path::PathBuf;
use tokio::sync::mpsc;

pub struct App {
    cfg: Config,
    config_path: Option<PathBuf>,
    state: AppState,
}

impl App {
    pub fn new(cfg: Config, config_path: Option<PathBuf>, playlist: Playlist) -> Self {
        let state = AppState::new(playlist, cfg.player.volume);
        Self {
            cfg,
            config_path,
            state,
        }
    }

    pub async fn run(&mut self, autoplay: bool) -> anyhow::Result<()> {
        let (tx, mut rx) = mpsc::channel::<Event>(256);

        let data_dir = &self.cfg.paths.data_dir;
        std::fs::create_dir_all(data_dir).with_context(|| format!("create dir {}", data_dir.display()))?;
        let mpv = MpvHandle::spawn(
            tx.clone(),
            self.cfg.player.audio_device.as_deref(),
            Some(&data_dir.join("mpv.log")),
        )
        .await
        .context("start mpv")?;

        input::spawn_input_task(tx);
        println!("Type h for help.");

        let fx = self.state.start(autoplay);
        apply(&mpv, fx).await;

        loop {
            let ev = tokio::select! {
                ev = rx.recv() => ev,
                _ = tokio::signal::ctrl_c() => None,
            };
            let Some(ev) = ev else {
                break;
            };

            let fx = self.state.handle_event(ev);
            apply(&mpv, fx).await;

            if self.state.should_quit {
                break;
            }
        }

        self.save_state_on_quit();
        Ok(())
    }

    /// Remember volume and mode for the next session.
    fn save_state_on_quit(&mut self) {
        self.cfg.player.volume = self.state.player.volume;
        self.cfg.player.mode = self.state.playlist.mode();
        if let Err(e) = config::save(&self.cfg, self.config_path.as_deref()) {
            tracing::warn!("save config: {e:#}");
        }
    }
}

async fn apply(mpv: &MpvHandle, effects: Vec<Effect>) {
    for effect in effects {
        let res = match effect {
            Effect::Load(url) => mpv.load(&url).await,
            Effect::SetPause(paused) => mpv.set_pause(paused).await,
            Effect::Seek(secs) => mpv.seek_absolute(secs).await,
            Effect::SetVolume(v) => mpv.set_volume(v).await,
            Effect::SetMute(m) => mpv.set_mute(m).await,
            Effect::Say(msg) => {
                println!("{msg}");
                Ok(())
            }
            Effect::Quit => Ok(()),
        };
        if let Err(e) = res {
            tracing::warn!("mpv error: {e:#}");
        }
    }
}
