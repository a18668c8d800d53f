#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use anyhow::bail;
use tomato_bar::{
    clock::ManualClock,
    services::{Collaborators, Cue, IconName, Notification, Notifier, SoundPlayer, TrayIcon},
    settings::{MemorySettingsStore, Settings},
    tasks::CountdownSignals,
    timer::Timer,
};

/// Records every call the timer makes into its collaborators
#[derive(Default)]
pub struct Recorder {
    calls: Mutex<Vec<String>>,
    pub fail_icons: bool,
    pub fail_notifications: bool,
}

impl Recorder {
    pub fn failing() -> Self {
        Self {
            fail_icons: true,
            fail_notifications: true,
            ..Self::default()
        }
    }

    fn push(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn take(&self) -> Vec<String> {
        std::mem::take(&mut *self.calls.lock().unwrap())
    }

    pub fn icons(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| call.strip_prefix("icon:").map(str::to_string))
            .collect()
    }

    pub fn notifications(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|call| call.starts_with("notify:"))
            .collect()
    }
}

impl TrayIcon for Recorder {
    fn set_icon(&self, icon: IconName) -> anyhow::Result<()> {
        self.push(format!("icon:{}", icon));
        if self.fail_icons {
            bail!("icon {} not found", icon);
        }
        Ok(())
    }

    fn set_title(&self, title: Option<&str>) -> anyhow::Result<()> {
        self.push(format!("title:{}", title.unwrap_or("-")));
        Ok(())
    }
}

impl SoundPlayer for Recorder {
    fn play_cue(&self, cue: Cue, _volume: f32) -> anyhow::Result<()> {
        self.push(format!("cue:{:?}", cue).to_lowercase());
        Ok(())
    }

    fn start_ambient(&self, _volume: f32) -> anyhow::Result<()> {
        self.push("ambient:start".to_string());
        Ok(())
    }

    fn set_ambient_volume(&self, volume: f32) -> anyhow::Result<()> {
        self.push(format!("ambient:volume:{}", volume));
        Ok(())
    }

    fn stop_ambient(&self) -> anyhow::Result<()> {
        self.push("ambient:stop".to_string());
        Ok(())
    }
}

impl Notifier for Recorder {
    fn send(&self, notification: &Notification) -> anyhow::Result<()> {
        self.push(format!("notify:{}", notification.body));
        if self.fail_notifications {
            bail!("notification daemon unavailable");
        }
        Ok(())
    }
}

pub struct Harness {
    pub timer: Timer,
    pub signals: CountdownSignals,
    pub recorder: Arc<Recorder>,
    pub clock: Arc<ManualClock>,
    pub store: Arc<MemorySettingsStore>,
}

pub fn harness(settings: Settings) -> Harness {
    harness_with(settings, Recorder::default())
}

pub fn harness_with(settings: Settings, recorder: Recorder) -> Harness {
    let recorder = Arc::new(recorder);
    let clock = Arc::new(ManualClock::default());
    let store = Arc::new(MemorySettingsStore::new());
    let collaborators = Collaborators {
        tray: recorder.clone(),
        sound: recorder.clone(),
        notifier: recorder.clone(),
    };

    let (timer, signals) =
        Timer::new(settings, store.clone(), collaborators, clock.clone());
    Harness {
        timer,
        signals,
        recorder,
        clock,
        store,
    }
}
