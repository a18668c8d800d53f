//! Property-based tests for the Pomodoro transition table.

mod common;

use common::harness;
use proptest::prelude::*;
use tomato_bar::{
    settings::Settings,
    timer::{PomodoroEvent, PomodoroState},
};

fn arbitrary_event() -> impl Strategy<Value = PomodoroEvent> {
    prop_oneof![
        Just(PomodoroEvent::StartStop),
        Just(PomodoroEvent::TimerFired),
        Just(PomodoroEvent::SkipRest),
    ]
}

/// The transition table, written out independently of the machine
fn expected_next(
    state: PomodoroState,
    event: PomodoroEvent,
    stop_after_break: bool,
) -> Option<PomodoroState> {
    use PomodoroEvent::*;
    use PomodoroState::*;

    match (event, state) {
        (StartStop, Idle) => Some(Work),
        (StartStop, Work) | (StartStop, Rest) => Some(Idle),
        (TimerFired, Work) => Some(Rest),
        (TimerFired, Rest) if stop_after_break => Some(Idle),
        (TimerFired, Rest) => Some(Work),
        (SkipRest, Rest) => Some(Work),
        _ => None,
    }
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
}

proptest! {
    #[test]
    fn timer_follows_the_table(
        events in prop::collection::vec(arbitrary_event(), 0..40),
        stop_after_break in any::<bool>(),
        set_size in 1u32..6,
    ) {
        runtime().block_on(async {
            let mut h = harness(Settings {
                stop_after_break,
                work_intervals_in_set: set_size,
                ..Settings::default()
            });

            for event in events {
                let before = h.timer.state();
                let expected = expected_next(before, event, stop_after_break);

                let changed = h.timer.handle_event(event);

                prop_assert_eq!(changed, expected.is_some());
                prop_assert_eq!(h.timer.state(), expected.unwrap_or(before));
                prop_assert!(h.timer.consecutive_work_intervals() < set_size);
                prop_assert_eq!(
                    h.timer.snapshot().active,
                    h.timer.state() != PomodoroState::Idle
                );
                if h.timer.state() == PomodoroState::Idle {
                    prop_assert_eq!(h.timer.consecutive_work_intervals(), 0);
                }
            }
            Ok(())
        })?;
    }
}
