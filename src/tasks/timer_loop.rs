//! Single-consumer loop that owns the timer
//!
//! Requests from the outside world and countdown signals are queued and
//! applied one at a time, so a transition's handlers always finish before
//! the next event is routed.

use tokio::{
    sync::{mpsc, oneshot, watch},
    task::JoinHandle,
};
use tracing::{debug, info};

use super::countdown::CountdownSignals;
use crate::{
    error::TimerError,
    services::NotificationAction,
    settings::{Settings, SettingsPatch},
    state::TimerSnapshot,
    timer::Timer,
};

const COMMAND_BUFFER: usize = 32;

/// Requests accepted by the timer loop
#[derive(Debug)]
pub enum Command {
    StartStop {
        reply: oneshot::Sender<bool>,
    },
    SkipRest {
        reply: oneshot::Sender<bool>,
    },
    NotificationAction {
        action: NotificationAction,
        reply: oneshot::Sender<bool>,
    },
    UpdateSettings {
        patch: SettingsPatch,
        reply: oneshot::Sender<Result<Settings, TimerError>>,
    },
    GetSettings {
        reply: oneshot::Sender<Settings>,
    },
    Shutdown,
}

/// Cloneable handle for talking to a running timer loop
#[derive(Debug, Clone)]
pub struct TimerHandle {
    commands: mpsc::Sender<Command>,
    snapshots: watch::Receiver<TimerSnapshot>,
}

impl TimerHandle {
    async fn request<T>(
        &self,
        command: impl FnOnce(oneshot::Sender<T>) -> Command,
    ) -> Result<T, TimerError> {
        let (reply, response) = oneshot::channel();
        self.commands
            .send(command(reply))
            .await
            .map_err(|_| TimerError::LoopClosed)?;
        response.await.map_err(|_| TimerError::LoopClosed)
    }

    /// Returns whether the state changed
    pub async fn start_stop(&self) -> Result<bool, TimerError> {
        self.request(|reply| Command::StartStop { reply }).await
    }

    pub async fn skip_rest(&self) -> Result<bool, TimerError> {
        self.request(|reply| Command::SkipRest { reply }).await
    }

    pub async fn notification_action(
        &self,
        action: NotificationAction,
    ) -> Result<bool, TimerError> {
        self.request(|reply| Command::NotificationAction { action, reply })
            .await
    }

    pub async fn update_settings(&self, patch: SettingsPatch) -> Result<Settings, TimerError> {
        self.request(|reply| Command::UpdateSettings { patch, reply })
            .await?
    }

    pub async fn settings(&self) -> Result<Settings, TimerError> {
        self.request(|reply| Command::GetSettings { reply }).await
    }

    /// Latest published snapshot
    pub fn snapshot(&self) -> TimerSnapshot {
        self.snapshots.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<TimerSnapshot> {
        self.snapshots.clone()
    }

    /// Ask the loop to stop its countdown and exit
    pub async fn shutdown(&self) -> Result<(), TimerError> {
        self.commands
            .send(Command::Shutdown)
            .await
            .map_err(|_| TimerError::LoopClosed)
    }
}

/// Spawn the timer loop on the current runtime
pub fn spawn_timer_loop(timer: Timer, signals: CountdownSignals) -> (TimerHandle, JoinHandle<()>) {
    let (commands, receiver) = mpsc::channel(COMMAND_BUFFER);
    let handle = TimerHandle {
        commands,
        snapshots: timer.subscribe(),
    };
    let task = tokio::spawn(run_timer_loop(timer, receiver, signals));
    (handle, task)
}

/// Apply commands and countdown signals to `timer` until shut down
pub async fn run_timer_loop(
    mut timer: Timer,
    mut commands: mpsc::Receiver<Command>,
    mut signals: CountdownSignals,
) {
    info!("Starting timer loop");

    loop {
        tokio::select! {
            command = commands.recv() => match command {
                Some(Command::Shutdown) | None => break,
                Some(command) => apply_command(&mut timer, command),
            },
            Some(signal) = signals.recv() => timer.on_countdown_signal(signal),
        }
    }

    timer.shutdown();
    info!("Timer loop stopped");
}

fn apply_command(timer: &mut Timer, command: Command) {
    debug!("Timer loop received {:?}", command);

    let delivered = match command {
        Command::StartStop { reply } => reply.send(timer.start_stop()).is_ok(),
        Command::SkipRest { reply } => reply.send(timer.skip_rest()).is_ok(),
        Command::NotificationAction { action, reply } => {
            reply.send(timer.on_notification_action(action)).is_ok()
        }
        Command::UpdateSettings { patch, reply } => {
            reply.send(timer.update_settings(&patch)).is_ok()
        }
        Command::GetSettings { reply } => reply.send(timer.settings().clone()).is_ok(),
        Command::Shutdown => true,
    };

    if !delivered {
        debug!("Requester went away before the reply was sent");
    }
}
