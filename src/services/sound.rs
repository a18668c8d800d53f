//! Sound cue boundary and per-cue volume gating

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// One-shot sound cues
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Cue {
    Windup,
    Ding,
}

/// Plays one-shot cues and a looping ambient tick
pub trait SoundPlayer: Send + Sync {
    fn play_cue(&self, cue: Cue, volume: f32) -> anyhow::Result<()>;
    fn start_ambient(&self, volume: f32) -> anyhow::Result<()>;
    /// Change the volume of the ambient tick while it plays
    fn set_ambient_volume(&self, volume: f32) -> anyhow::Result<()>;
    fn stop_ambient(&self) -> anyhow::Result<()>;
}

/// Volume per cue, 0.0 (muted) to 1.0
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Volumes {
    pub windup: f32,
    pub ding: f32,
    pub ticking: f32,
}

impl Volumes {
    pub fn for_cue(&self, cue: Cue) -> f32 {
        match cue {
            Cue::Windup => self.windup,
            Cue::Ding => self.ding,
        }
    }
}

impl Default for Volumes {
    fn default() -> Self {
        Self {
            windup: 1.0,
            ding: 1.0,
            ticking: 1.0,
        }
    }
}

/// Wraps a [`SoundPlayer`] so muted cues never reach it
///
/// Stopping the ambient loop is always forwarded, whatever the volume. While
/// the ambient tick is wanted, ticking volume changes reach the player at
/// once: muting stops the loop and unmuting starts it again.
pub struct GatedSound {
    player: Arc<dyn SoundPlayer>,
    volumes: Volumes,
    ambient_wanted: bool,
}

impl GatedSound {
    pub fn new(player: Arc<dyn SoundPlayer>, volumes: Volumes) -> Self {
        Self {
            player,
            volumes,
            ambient_wanted: false,
        }
    }

    pub fn set_volumes(&mut self, volumes: Volumes) -> anyhow::Result<()> {
        let previous = std::mem::replace(&mut self.volumes, volumes).ticking;
        let ticking = self.volumes.ticking;
        if !self.ambient_wanted || previous == ticking {
            return Ok(());
        }

        match (previous > 0.0, ticking > 0.0) {
            (true, true) => self.player.set_ambient_volume(ticking),
            (true, false) => {
                debug!("Ticking muted while playing");
                self.player.stop_ambient()
            }
            (false, true) => self.player.start_ambient(ticking),
            (false, false) => Ok(()),
        }
    }

    pub fn play_cue(&self, cue: Cue) -> anyhow::Result<()> {
        let volume = self.volumes.for_cue(cue);
        if volume <= 0.0 {
            debug!("Cue {:?} muted", cue);
            return Ok(());
        }
        self.player.play_cue(cue, volume)
    }

    pub fn start_ambient(&mut self) -> anyhow::Result<()> {
        self.ambient_wanted = true;
        if self.volumes.ticking <= 0.0 {
            debug!("Ticking muted");
            return Ok(());
        }
        self.player.start_ambient(self.volumes.ticking)
    }

    pub fn stop_ambient(&mut self) -> anyhow::Result<()> {
        self.ambient_wanted = false;
        self.player.stop_ambient()
    }
}

/// Sound stand-in for headless runs: reports cues to the log
#[derive(Debug, Default)]
pub struct LogSound;

impl SoundPlayer for LogSound {
    fn play_cue(&self, cue: Cue, volume: f32) -> anyhow::Result<()> {
        info!("Playing {:?} at volume {:.2}", cue, volume);
        Ok(())
    }

    fn start_ambient(&self, volume: f32) -> anyhow::Result<()> {
        debug!("Ticking started at volume {:.2}", volume);
        Ok(())
    }

    fn set_ambient_volume(&self, volume: f32) -> anyhow::Result<()> {
        debug!("Ticking volume set to {:.2}", volume);
        Ok(())
    }

    fn stop_ambient(&self) -> anyhow::Result<()> {
        debug!("Ticking stopped");
        Ok(())
    }
}
