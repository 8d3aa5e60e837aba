use std::time::{Duration, Instant};

use form_snapshot::extract::extractor::ExtractOptions;
use form_snapshot::watch::watcher::LiveWatcher;

use crate::common::pages::{form_page, many_inputs, text_input};
use serde_json::json;

mod common;

fn watcher() -> LiveWatcher {
    LiveWatcher::new(ExtractOptions::default(), Duration::from_millis(300))
}

fn ms(start: Instant, ms: u64) -> Instant {
    start + Duration::from_millis(ms)
}

#[test]
fn nothing_is_scanned_before_the_first_mutation() {
    let mut w = watcher();
    let doc = many_inputs(3);
    assert!(!w.tick(Instant::now(), &doc).unwrap());
    assert!(w.current().is_none());
    assert_eq!(w.rescans(), 0);
}

#[test]
fn mutation_burst_rescans_once_after_quiet_window() {
    let start = Instant::now();
    let mut w = watcher();
    let doc = many_inputs(3);

    for t in [0, 100, 200] {
        w.on_mutation(ms(start, t));
    }
    assert!(!w.tick(ms(start, 350), &doc).unwrap());
    assert!(w.tick(ms(start, 500), &doc).unwrap());
    assert!(!w.tick(ms(start, 900), &doc).unwrap());

    assert_eq!(w.rescans(), 1);
    assert_eq!(w.current().unwrap().value_control_count(), 3);
}

#[test]
fn later_tick_sees_the_changed_page() {
    let start = Instant::now();
    let mut w = watcher();

    w.on_mutation(start);
    w.tick(ms(start, 300), &form_page(json!([text_input("a", "1")])))
        .unwrap();
    assert_eq!(w.current().unwrap().value_control_count(), 1);

    w.on_mutation(ms(start, 1000));
    w.tick(ms(start, 1300), &many_inputs(4)).unwrap();
    assert_eq!(w.current().unwrap().value_control_count(), 4);
    assert_eq!(w.rescans(), 2);
}

#[test]
fn explicit_rescan_drops_the_pending_one() {
    let start = Instant::now();
    let mut w = watcher();
    let doc = many_inputs(2);

    w.on_mutation(start);
    w.rescan(&doc).unwrap();
    assert!(!w.tick(ms(start, 1000), &doc).unwrap());
    assert_eq!(w.rescans(), 1);
}

#[test]
fn rescan_errors_leave_the_last_good_extraction() {
    let start = Instant::now();
    let options = ExtractOptions {
        max_controls: 3,
        ..ExtractOptions::default()
    };
    let mut w = LiveWatcher::new(options, Duration::from_millis(300));

    w.rescan(&many_inputs(1)).unwrap();
    w.on_mutation(start);
    assert!(w.tick(ms(start, 300), &many_inputs(10)).is_err());
    assert_eq!(w.current().unwrap().value_control_count(), 1);
}
