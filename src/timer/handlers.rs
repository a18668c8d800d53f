//! Side effects run on state entry and exit

use std::sync::Arc;

use anyhow::Context;
use tracing::{info, warn};

use super::PomodoroState;
use crate::{
    clock::format_time_left,
    services::{Collaborators, Cue, GatedSound, IconName, Notification, Notifier, TrayIcon},
    settings::Settings,
    tasks::countdown::Countdown,
};

/// Everything the transition handlers read and mutate
pub struct TimerCore {
    settings: Settings,
    consecutive_work_intervals: u32,
    countdown: Countdown,
    time_left: String,
    tray: Arc<dyn TrayIcon>,
    sound: GatedSound,
    notifier: Arc<dyn Notifier>,
}

impl TimerCore {
    pub(super) fn new(
        settings: Settings,
        collaborators: Collaborators,
        countdown: Countdown,
    ) -> Self {
        let sound = GatedSound::new(collaborators.sound, settings.volumes());
        Self {
            settings,
            consecutive_work_intervals: 0,
            countdown,
            time_left: String::new(),
            tray: collaborators.tray,
            sound,
            notifier: collaborators.notifier,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn consecutive_work_intervals(&self) -> u32 {
        self.consecutive_work_intervals
    }

    /// Last published `MM:SS`, empty while no countdown runs
    pub fn time_left(&self) -> &str {
        &self.time_left
    }

    pub fn countdown(&self) -> &Countdown {
        &self.countdown
    }

    pub(super) fn stop_after_break(&self) -> bool {
        self.settings.stop_after_break
    }

    pub(super) fn apply_settings(&mut self, settings: Settings) {
        log_fault("apply sound volumes", self.sound.set_volumes(settings.volumes()));
        self.settings = settings;
        self.refresh_title();
    }

    pub(super) fn set_icon(&self, icon: IconName) {
        log_fault("set tray icon", self.tray.set_icon(icon));
    }

    pub(super) fn start_countdown(&mut self, seconds: u64) {
        self.countdown.start(seconds);
        self.update_time_left(seconds as f64);
    }

    /// Cancel polling, silence the ticking and clear the displayed time
    pub fn stop_countdown(&mut self) {
        self.countdown.stop();
        log_fault("stop ticking", self.sound.stop_ambient());
        self.time_left.clear();
        self.refresh_title();
    }

    pub(super) fn finish_countdown(&mut self, generation: u64) -> bool {
        self.countdown.complete(generation)
    }

    pub(super) fn update_time_left(&mut self, remaining: f64) {
        self.time_left = format_time_left(remaining);
        self.refresh_title();
    }

    fn refresh_title(&self) {
        let title = (self.countdown.is_running() && self.settings.show_timer_in_menu_bar)
            .then_some(self.time_left.as_str());
        log_fault("set tray title", self.tray.set_title(title));
    }

    // (*, Work)
    pub(super) fn on_work_start(
        &mut self,
        _from: PomodoroState,
        _to: PomodoroState,
    ) -> anyhow::Result<()> {
        self.set_icon(IconName::Work);
        log_fault("play windup", self.sound.play_cue(Cue::Windup));
        log_fault("start ticking", self.sound.start_ambient());
        self.start_countdown(minutes(self.settings.work_interval_length));
        Ok(())
    }

    // (Work, Rest)
    pub(super) fn on_work_finish(
        &mut self,
        _from: PomodoroState,
        _to: PomodoroState,
    ) -> anyhow::Result<()> {
        self.consecutive_work_intervals += 1;
        info!("Completed work intervals in set: {}", self.consecutive_work_intervals);
        self.sound.play_cue(Cue::Ding).context("failed to play completion cue")
    }

    // (Work, *)
    pub(super) fn on_work_end(
        &mut self,
        _from: PomodoroState,
        _to: PomodoroState,
    ) -> anyhow::Result<()> {
        self.sound.stop_ambient().context("failed to stop ticking")
    }

    // (*, Rest)
    pub(super) fn on_rest_start(
        &mut self,
        _from: PomodoroState,
        _to: PomodoroState,
    ) -> anyhow::Result<()> {
        let long = self.consecutive_work_intervals >= self.settings.work_intervals_in_set;
        let (length, icon) = if long {
            self.consecutive_work_intervals = 0;
            (self.settings.long_rest_interval_length, IconName::LongRest)
        } else {
            (self.settings.short_rest_interval_length, IconName::ShortRest)
        };
        info!(
            "Starting {} rest of {} minutes",
            if long { "long" } else { "short" },
            length
        );

        self.set_icon(icon);
        log_fault("stop ticking", self.sound.stop_ambient());
        log_fault(
            "send rest notification",
            self.notifier.send(&Notification::rest_started(long)),
        );
        self.start_countdown(minutes(length));
        Ok(())
    }

    // (Rest, Work)
    pub(super) fn on_rest_finish(
        &mut self,
        _from: PomodoroState,
        _to: PomodoroState,
    ) -> anyhow::Result<()> {
        self.notifier
            .send(&Notification::rest_finished())
            .context("failed to send break-over notification")
    }

    // (*, Idle)
    pub(super) fn on_idle_start(
        &mut self,
        _from: PomodoroState,
        _to: PomodoroState,
    ) -> anyhow::Result<()> {
        self.stop_countdown();
        self.set_icon(IconName::Idle);
        self.consecutive_work_intervals = 0;
        Ok(())
    }
}

fn minutes(length: u32) -> u64 {
    u64::from(length) * 60
}

fn log_fault(action: &str, result: anyhow::Result<()>) {
    if let Err(e) = result {
        warn!("Failed to {}: {:#}", action, e);
    }
}
