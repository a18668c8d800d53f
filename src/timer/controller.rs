//! The `Timer` controller: transition table, countdown signals and settings

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, info, warn};

use super::{PomodoroEvent, PomodoroState, TimerCore};
use crate::{
    clock::Clock,
    error::TimerError,
    machine::{StateMachine, StatePattern},
    services::{Collaborators, IconName, Journal, JournalEntry, NotificationAction},
    settings::{Settings, SettingsPatch, SettingsStore},
    state::TimerSnapshot,
    tasks::countdown::{Countdown, CountdownSignal, CountdownSignals},
};

type PomodoroMachine = StateMachine<PomodoroState, PomodoroEvent, TimerCore>;

const ANY: StatePattern<PomodoroState> = StatePattern::Any;

/// Owns the interval state machine and everything its handlers touch
///
/// All methods must run on one task; [`crate::tasks::run_timer_loop`]
/// serializes outside requests and countdown signals onto it.
pub struct Timer {
    machine: PomodoroMachine,
    core: TimerCore,
    store: Arc<dyn SettingsStore>,
    clock: Arc<dyn Clock>,
    snapshots: watch::Sender<TimerSnapshot>,
}

impl Timer {
    /// Build an idle timer; the returned receiver carries its countdown signals
    pub fn new(
        settings: Settings,
        store: Arc<dyn SettingsStore>,
        collaborators: Collaborators,
        clock: Arc<dyn Clock>,
    ) -> (Self, CountdownSignals) {
        let (countdown, signals) = Countdown::new(Arc::clone(&clock));
        let core = TimerCore::new(settings, collaborators, countdown);
        core.set_icon(IconName::Idle);

        let (snapshots, _) = watch::channel(TimerSnapshot::idle());
        let timer = Self {
            machine: pomodoro_machine(),
            core,
            store,
            clock,
            snapshots,
        };
        (timer, signals)
    }

    /// Append every committed transition to `journal`
    pub fn with_journal(mut self, journal: Journal) -> Self {
        let clock = Arc::clone(&self.clock);
        self.machine.observe(move |transition| {
            journal.append(&JournalEntry::transition(transition, clock.now()));
        });
        self
    }

    pub fn state(&self) -> PomodoroState {
        self.machine.current_state()
    }

    pub fn settings(&self) -> &Settings {
        self.core.settings()
    }

    pub fn consecutive_work_intervals(&self) -> u32 {
        self.core.consecutive_work_intervals()
    }

    pub fn time_left(&self) -> &str {
        self.core.time_left()
    }

    pub fn snapshot(&self) -> TimerSnapshot {
        let countdown = self.core.countdown();
        TimerSnapshot {
            state: self.state(),
            active: countdown.is_running(),
            remaining_seconds: countdown
                .remaining()
                .map(|remaining| remaining.max(0.0).trunc() as u64),
            time_left: self.core.time_left().to_string(),
            finish_time: countdown.finish_time(),
            consecutive_work_intervals: self.core.consecutive_work_intervals(),
        }
    }

    /// Receiver of the snapshot published after every change
    pub fn subscribe(&self) -> watch::Receiver<TimerSnapshot> {
        self.snapshots.subscribe()
    }

    fn publish(&self) {
        self.snapshots.send_replace(self.snapshot());
    }

    /// Feed one event to the state machine; `false` when nothing changed
    pub fn handle_event(&mut self, event: PomodoroEvent) -> bool {
        let changed = self.machine.handle_event(&mut self.core, event);
        if changed {
            self.publish();
        }
        changed
    }

    pub fn start_stop(&mut self) -> bool {
        self.handle_event(PomodoroEvent::StartStop)
    }

    /// Only routes while resting
    pub fn skip_rest(&mut self) -> bool {
        self.handle_event(PomodoroEvent::SkipRest)
    }

    pub fn on_notification_action(&mut self, action: NotificationAction) -> bool {
        match action {
            NotificationAction::SkipRest if self.state() == PomodoroState::Rest => {
                self.skip_rest()
            }
            NotificationAction::SkipRest => {
                debug!("Ignoring skip-rest action while {}", self.state());
                false
            }
        }
    }

    /// React to a countdown reaching zero
    ///
    /// A countdown that completed further past its deadline than the overrun
    /// limit (the machine slept through it, say) stops the timer instead of
    /// advancing it.
    pub fn handle_timer_complete(&mut self, raw_remaining: f64) -> bool {
        if raw_remaining < self.core.settings().overrun_time_limit {
            warn!(
                "Countdown overran by {:.1}s, stopping instead of advancing",
                -raw_remaining
            );
            self.handle_event(PomodoroEvent::StartStop)
        } else {
            self.handle_event(PomodoroEvent::TimerFired)
        }
    }

    pub fn on_countdown_signal(&mut self, signal: CountdownSignal) {
        match signal {
            CountdownSignal::Tick {
                generation,
                remaining,
            } => {
                if !self.core.countdown().is_current(generation) {
                    debug!("Dropping tick from stale countdown {}", generation);
                    return;
                }
                self.core.update_time_left(remaining);
                self.publish();
            }
            CountdownSignal::Completed {
                generation,
                raw_remaining,
            } => {
                if !self.core.finish_countdown(generation) {
                    debug!("Dropping completion from stale countdown {}", generation);
                    return;
                }
                self.handle_timer_complete(raw_remaining);
            }
        }
    }

    /// Validate, persist and apply a settings change
    ///
    /// Lengths only affect countdowns started afterwards.
    pub fn update_settings(&mut self, patch: &SettingsPatch) -> Result<Settings, TimerError> {
        let mut settings = self.core.settings().clone();
        patch.apply(&mut settings);
        settings.validate()?;
        self.store.save(&settings)?;

        info!("Settings updated: {:?}", patch);
        self.core.apply_settings(settings.clone());
        self.publish();
        Ok(settings)
    }

    /// Cancel any countdown and silence sounds, leaving the state as is
    pub fn shutdown(&mut self) {
        self.core.stop_countdown();
        self.publish();
    }
}

fn pomodoro_machine() -> PomodoroMachine {
    use PomodoroEvent::*;
    use PomodoroState::*;

    let mut machine = StateMachine::new(Idle);

    machine.add_route(StartStop, Idle, Work);
    machine.add_route(StartStop, Work, Idle);
    machine.add_route(StartStop, Rest, Idle);
    machine.add_route(TimerFired, Work, Rest);
    machine.add_guarded_route(TimerFired, Rest, Idle, |core: &TimerCore| {
        core.stop_after_break()
    });
    machine.add_guarded_route(TimerFired, Rest, Work, |core: &TimerCore| {
        !core.stop_after_break()
    });
    machine.add_route(SkipRest, Rest, Work);

    machine.add_handler(ANY, Work, TimerCore::on_work_start);
    machine.add_handler(Work, Rest, TimerCore::on_work_finish);
    machine.add_handler(Work, ANY, TimerCore::on_work_end);
    machine.add_handler(ANY, Rest, TimerCore::on_rest_start);
    machine.add_handler(Rest, Work, TimerCore::on_rest_finish);
    machine.add_handler(ANY, Idle, TimerCore::on_idle_start);

    machine
}
