//! Countdown polling task
//!
//! A countdown keeps an absolute wall-clock deadline and polls it on a short
//! interval, reporting what is left on every tick. Once nothing is left it
//! stops polling, waits a short debounce, and reports completion exactly
//! once with the raw (possibly negative) remaining seconds.

use std::{sync::Arc, time::Duration};

use chrono::{DateTime, Utc};
use tokio::{
    sync::mpsc,
    task::JoinHandle,
    time::{interval, sleep, MissedTickBehavior},
};
use tracing::debug;

use crate::clock::{remaining_seconds, Clock};

pub const POLL_INTERVAL: Duration = Duration::from_millis(250);
pub const COMPLETION_DEBOUNCE: Duration = Duration::from_millis(100);

/// Messages from a running countdown back to its owner
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CountdownSignal {
    Tick { generation: u64, remaining: f64 },
    Completed { generation: u64, raw_remaining: f64 },
}

pub type CountdownSignals = mpsc::UnboundedReceiver<CountdownSignal>;

#[derive(Debug)]
struct CountdownSession {
    generation: u64,
    finish_time: DateTime<Utc>,
    task: JoinHandle<()>,
}

/// At most one active countdown; starting a new one replaces the old
pub struct Countdown {
    clock: Arc<dyn Clock>,
    signals: mpsc::UnboundedSender<CountdownSignal>,
    next_generation: u64,
    session: Option<CountdownSession>,
}

impl Countdown {
    pub fn new(clock: Arc<dyn Clock>) -> (Self, CountdownSignals) {
        let (signals, receiver) = mpsc::unbounded_channel();
        let countdown = Self {
            clock,
            signals,
            next_generation: 1,
            session: None,
        };
        (countdown, receiver)
    }

    /// Start counting down `seconds` from now, cancelling any running countdown
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(&mut self, seconds: u64) -> DateTime<Utc> {
        self.stop();

        let generation = self.next_generation;
        self.next_generation += 1;

        let finish_time = self.clock.now() + chrono::Duration::seconds(seconds as i64);
        let task = tokio::spawn(poll_deadline(
            generation,
            finish_time,
            Arc::clone(&self.clock),
            self.signals.clone(),
        ));

        debug!("Countdown {} started, finishing at {}", generation, finish_time);
        self.session = Some(CountdownSession {
            generation,
            finish_time,
            task,
        });
        finish_time
    }

    /// Cancel the active countdown, if any; returns whether one was running
    pub fn stop(&mut self) -> bool {
        match self.session.take() {
            Some(session) => {
                session.task.abort();
                debug!("Countdown {} cancelled", session.generation);
                true
            }
            None => false,
        }
    }

    pub fn is_running(&self) -> bool {
        self.session.is_some()
    }

    pub fn finish_time(&self) -> Option<DateTime<Utc>> {
        self.session.as_ref().map(|session| session.finish_time)
    }

    /// Seconds left on the active countdown, negative once overdue
    pub fn remaining(&self) -> Option<f64> {
        self.finish_time()
            .map(|finish_time| remaining_seconds(finish_time, self.clock.now()))
    }

    /// Whether `generation` belongs to the active countdown
    pub fn is_current(&self, generation: u64) -> bool {
        self.session
            .as_ref()
            .is_some_and(|session| session.generation == generation)
    }

    /// Close the session a completion signal belongs to
    ///
    /// Returns `false` for completions of countdowns that were cancelled or
    /// replaced after the signal was sent.
    pub fn complete(&mut self, generation: u64) -> bool {
        if !self.is_current(generation) {
            return false;
        }
        self.session = None;
        true
    }
}

impl Drop for Countdown {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn poll_deadline(
    generation: u64,
    finish_time: DateTime<Utc>,
    clock: Arc<dyn Clock>,
    signals: mpsc::UnboundedSender<CountdownSignal>,
) {
    let mut ticker = interval(POLL_INTERVAL);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let raw_remaining = loop {
        ticker.tick().await;

        let remaining = remaining_seconds(finish_time, clock.now());
        if signals
            .send(CountdownSignal::Tick {
                generation,
                remaining,
            })
            .is_err()
        {
            return;
        }

        if remaining <= 0.0 {
            break remaining;
        }
    };

    // Polling has stopped; completion is reported once, after the debounce
    sleep(COMPLETION_DEBOUNCE).await;
    let _ = signals.send(CountdownSignal::Completed {
        generation,
        raw_remaining,
    });
}
