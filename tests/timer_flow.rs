mod common;

use chrono::Duration;
use common::{harness, harness_with, Recorder};
use tomato_bar::{
    error::{SettingsError, TimerError},
    services::{Journal, NotificationAction},
    settings::{Settings, SettingsPatch},
    tasks::CountdownSignal,
    timer::{PomodoroEvent, PomodoroState},
};

use PomodoroEvent::*;
use PomodoroState::*;

#[tokio::test]
async fn full_cycle_follows_the_transition_table() {
    let mut h = harness(Settings::default());

    let mut states = vec![h.timer.state()];
    for event in [StartStop, TimerFired, TimerFired, TimerFired] {
        assert!(h.timer.handle_event(event));
        states.push(h.timer.state());
    }

    h.timer
        .update_settings(&SettingsPatch {
            stop_after_break: Some(true),
            ..SettingsPatch::default()
        })
        .unwrap();
    assert!(h.timer.handle_event(TimerFired));
    states.push(h.timer.state());

    assert_eq!(states, vec![Idle, Work, Rest, Work, Rest, Idle]);
    assert!(h.store.saved().unwrap().stop_after_break);
}

#[tokio::test]
async fn unrouted_events_change_nothing() {
    let mut h = harness(Settings::default());
    h.recorder.take();

    assert!(!h.timer.handle_event(TimerFired));
    assert!(!h.timer.handle_event(SkipRest));
    assert_eq!(h.timer.state(), Idle);

    h.timer.start_stop();
    h.recorder.take();
    assert!(!h.timer.handle_event(SkipRest));
    assert_eq!(h.timer.state(), Work);
    assert!(h.recorder.calls().is_empty());
}

#[tokio::test]
async fn work_start_winds_up_and_starts_countdown() {
    let mut h = harness(Settings::default());
    assert_eq!(h.recorder.take(), vec!["icon:idle"]);

    assert!(h.timer.start_stop());

    assert_eq!(
        h.recorder.take(),
        vec!["icon:work", "cue:windup", "ambient:start", "title:25:00"]
    );
    let snapshot = h.timer.snapshot();
    assert!(snapshot.active);
    assert_eq!(snapshot.remaining_seconds, Some(25 * 60));
    assert_eq!(snapshot.time_left, "25:00");
}

#[tokio::test]
async fn finishing_work_runs_handlers_in_tier_order() {
    let mut h = harness(Settings::default());
    h.timer.start_stop();
    h.recorder.take();

    assert!(h.timer.handle_event(TimerFired));

    assert_eq!(
        h.recorder.take(),
        vec![
            "cue:ding",
            "icon:shortrest",
            "ambient:stop",
            "notify:It's time for a short break!",
            "title:05:00",
            "ambient:stop",
        ]
    );
}

#[tokio::test]
async fn every_fourth_rest_is_long() {
    let mut h = harness(Settings::default());
    h.timer.start_stop();

    let mut counts = Vec::new();
    let mut rest_lengths = Vec::new();
    for _ in 0..4 {
        assert!(h.timer.handle_event(TimerFired));
        counts.push(h.timer.consecutive_work_intervals());
        rest_lengths.push(h.timer.snapshot().remaining_seconds);
        assert!(h.timer.skip_rest());
    }

    assert_eq!(counts, vec![1, 2, 3, 0]);
    assert_eq!(
        rest_lengths,
        vec![Some(300), Some(300), Some(300), Some(900)]
    );
    let rest_icons: Vec<String> = h
        .recorder
        .icons()
        .into_iter()
        .filter(|icon| icon.ends_with("rest"))
        .collect();
    assert_eq!(rest_icons, vec!["shortrest", "shortrest", "shortrest", "longrest"]);
    assert!(h
        .recorder
        .notifications()
        .contains(&"notify:It's time for a long break!".to_string()));
}

#[tokio::test]
async fn set_size_of_one_makes_every_rest_long() {
    let mut h = harness(Settings {
        work_intervals_in_set: 1,
        ..Settings::default()
    });
    h.timer.start_stop();

    h.timer.handle_event(TimerFired);
    assert_eq!(h.timer.snapshot().remaining_seconds, Some(15 * 60));
    assert_eq!(h.timer.consecutive_work_intervals(), 0);
}

#[tokio::test]
async fn skip_rest_only_routes_from_rest() {
    let mut h = harness(Settings::default());

    assert!(!h.timer.skip_rest());
    h.timer.start_stop();
    assert!(!h.timer.skip_rest());
    h.timer.handle_event(TimerFired);
    h.recorder.take();

    assert!(h.timer.skip_rest());
    assert_eq!(h.timer.state(), Work);
    assert_eq!(h.recorder.notifications(), vec!["notify:Keep up the good work!"]);
}

#[tokio::test]
async fn break_over_notification_is_not_sent_when_stopping_from_rest() {
    let mut h = harness(Settings {
        stop_after_break: true,
        ..Settings::default()
    });
    h.timer.start_stop();
    h.timer.handle_event(TimerFired);
    h.recorder.take();

    assert!(h.timer.handle_event(TimerFired));
    assert_eq!(h.timer.state(), Idle);
    assert!(h.recorder.notifications().is_empty());
}

#[tokio::test]
async fn notification_action_skips_only_while_resting() {
    let mut h = harness(Settings::default());
    h.timer.start_stop();

    assert!(!h.timer.on_notification_action(NotificationAction::SkipRest));
    assert_eq!(h.timer.state(), Work);

    h.timer.handle_event(TimerFired);
    assert!(h.timer.on_notification_action(NotificationAction::SkipRest));
    assert_eq!(h.timer.state(), Work);
}

#[tokio::test]
async fn large_overrun_stops_instead_of_advancing() {
    let mut h = harness(Settings::default());

    h.timer.start_stop();
    assert!(h.timer.handle_timer_complete(-61.0));
    assert_eq!(h.timer.state(), Idle);

    h.timer.start_stop();
    assert!(h.timer.handle_timer_complete(-30.0));
    assert_eq!(h.timer.state(), Rest);

    assert!(h.timer.handle_timer_complete(-61.0));
    assert_eq!(h.timer.state(), Idle);
}

#[tokio::test]
async fn overrun_limit_is_exclusive() {
    let mut h = harness(Settings::default());
    h.timer.start_stop();

    assert!(h.timer.handle_timer_complete(-60.0));
    assert_eq!(h.timer.state(), Rest);
}

#[tokio::test]
async fn entering_idle_resets_the_set_and_clears_the_countdown() {
    let mut h = harness(Settings::default());
    h.timer.start_stop();
    h.timer.handle_event(TimerFired);
    assert_eq!(h.timer.consecutive_work_intervals(), 1);
    h.recorder.take();

    assert!(h.timer.start_stop());

    assert_eq!(h.timer.state(), Idle);
    assert_eq!(h.timer.consecutive_work_intervals(), 0);
    assert_eq!(h.timer.time_left(), "");
    let snapshot = h.timer.snapshot();
    assert!(!snapshot.active);
    assert_eq!(snapshot.remaining_seconds, None);
    assert_eq!(h.recorder.take(), vec!["ambient:stop", "title:-", "icon:idle"]);
}

#[tokio::test]
async fn stopping_twice_is_harmless() {
    let mut h = harness(Settings::default());

    h.timer.shutdown();
    h.timer.shutdown();
    assert_eq!(h.timer.state(), Idle);

    h.timer.start_stop();
    h.timer.shutdown();
    h.timer.shutdown();
    assert_eq!(h.timer.state(), Work);
    assert!(!h.timer.snapshot().active);
}

#[tokio::test]
async fn collaborator_failures_do_not_stall_the_timer() {
    let mut h = harness_with(Settings::default(), Recorder::failing());

    assert!(h.timer.start_stop());
    assert!(h.timer.snapshot().active);

    assert!(h.timer.handle_event(TimerFired));
    assert_eq!(h.timer.state(), Rest);
    assert!(h.timer.snapshot().active);
    assert_eq!(h.timer.consecutive_work_intervals(), 1);

    assert!(h.timer.skip_rest());
    assert_eq!(h.timer.state(), Work);
}

#[tokio::test]
async fn muted_cues_and_hidden_title() {
    let mut h = harness(Settings {
        windup_volume: 0.0,
        ticking_volume: 0.0,
        show_timer_in_menu_bar: false,
        ..Settings::default()
    });
    h.recorder.take();

    h.timer.start_stop();

    assert_eq!(h.recorder.take(), vec!["icon:work", "title:-"]);
    assert_eq!(h.timer.time_left(), "25:00");
}

#[tokio::test]
async fn ticking_volume_changes_reach_the_playing_tick() {
    let mut h = harness(Settings::default());
    let ticking = |volume| SettingsPatch {
        ticking_volume: Some(volume),
        ..SettingsPatch::default()
    };

    h.timer.start_stop();
    h.recorder.take();

    h.timer.update_settings(&ticking(0.0)).unwrap();
    assert_eq!(h.recorder.take(), vec!["ambient:stop", "title:25:00"]);

    h.timer.update_settings(&ticking(0.4)).unwrap();
    assert_eq!(h.recorder.take(), vec!["ambient:start", "title:25:00"]);

    h.timer.update_settings(&ticking(0.2)).unwrap();
    assert_eq!(h.recorder.take(), vec!["ambient:volume:0.2", "title:25:00"]);

    h.timer.handle_event(TimerFired);
    h.recorder.take();
    h.timer.update_settings(&ticking(1.0)).unwrap();
    assert_eq!(h.recorder.take(), vec!["title:05:00"]);
}

#[tokio::test(start_paused = true)]
async fn ticks_refresh_the_time_left() {
    let mut h = harness(Settings::default());
    h.timer.start_stop();
    let mut updates = h.timer.subscribe();

    let first = h.signals.recv().await.unwrap();
    h.timer.on_countdown_signal(first);
    assert_eq!(h.timer.time_left(), "25:00");

    h.clock.advance(Duration::seconds(65));
    let second = h.signals.recv().await.unwrap();
    h.timer.on_countdown_signal(second);

    assert_eq!(h.timer.time_left(), "23:55");
    assert!(updates.has_changed().unwrap());
    assert_eq!(updates.borrow_and_update().time_left, "23:55");
}

#[tokio::test(start_paused = true)]
async fn completion_signal_advances_once() {
    let mut h = harness(Settings::default());
    h.timer.start_stop();

    h.clock.advance(Duration::minutes(25) + Duration::seconds(2));
    let completed = loop {
        let signal = h.signals.recv().await.unwrap();
        if let CountdownSignal::Completed { .. } = signal {
            break signal;
        }
        h.timer.on_countdown_signal(signal);
    };
    assert_eq!(h.timer.time_left(), "00:00");

    h.timer.on_countdown_signal(completed);
    assert_eq!(h.timer.state(), Rest);

    h.timer.on_countdown_signal(completed);
    assert_eq!(h.timer.state(), Rest);
}

#[tokio::test(start_paused = true)]
async fn completion_from_a_cancelled_countdown_is_ignored() {
    let mut h = harness(Settings::default());
    h.timer.start_stop();

    h.clock.advance(Duration::minutes(26));
    let stale = loop {
        let signal = h.signals.recv().await.unwrap();
        if let CountdownSignal::Completed { .. } = signal {
            break signal;
        }
    };

    h.timer.start_stop();
    h.timer.start_stop();
    assert_eq!(h.timer.state(), Work);

    h.timer.on_countdown_signal(stale);
    assert_eq!(h.timer.state(), Work);
}

#[tokio::test]
async fn invalid_settings_are_rejected_and_not_saved() {
    let mut h = harness(Settings::default());

    let result = h.timer.update_settings(&SettingsPatch {
        work_intervals_in_set: Some(0),
        ..SettingsPatch::default()
    });

    assert!(matches!(
        result,
        Err(TimerError::Settings(SettingsError::Invalid(_)))
    ));
    assert_eq!(h.timer.settings().work_intervals_in_set, 4);
    assert!(h.store.saved().is_none());
}

#[tokio::test]
async fn new_lengths_apply_to_the_next_countdown() {
    let mut h = harness(Settings::default());
    h.timer.start_stop();

    h.timer
        .update_settings(&SettingsPatch {
            short_rest_interval_length: Some(7),
            ..SettingsPatch::default()
        })
        .unwrap();
    assert_eq!(h.timer.snapshot().remaining_seconds, Some(25 * 60));

    h.timer.handle_event(TimerFired);
    assert_eq!(h.timer.snapshot().remaining_seconds, Some(7 * 60));
}

#[tokio::test]
async fn journal_records_each_transition() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("journal.log");
    let h = harness(Settings::default());
    let mut timer = h.timer.with_journal(Journal::new(&path));

    timer.start_stop();
    timer.skip_rest();
    timer.start_stop();

    let contents = std::fs::read_to_string(&path).unwrap();
    let entries: Vec<serde_json::Value> = contents
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();

    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0]["type"], "transition");
    assert_eq!(entries[0]["event"], "start_stop");
    assert_eq!(entries[0]["fromState"], "idle");
    assert_eq!(entries[0]["toState"], "work");
    assert_eq!(entries[1]["fromState"], "work");
    assert_eq!(entries[1]["toState"], "idle");
}
