//! Observation loop tests
//!
//! Tests for mount settling, resize debouncing, data/page settle delays,
//! the window-resize fallback and teardown.
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]

mod common;

use cf_table::{
    ContainerMetrics, HostRequest, SizeSource, TableOptions, Timings, Trigger,
};
use common::{armed_timers, book_table, books};
use test_case::test_case;

#[test]
fn test_mount_arms_settle_timer() {
    let (mut table, _) = book_table(1000.0);
    assert_eq!(table.mount(true), Some(SizeSource::ResizeObserver));
    let timers = armed_timers(&table.take_requests());
    assert_eq!(timers.len(), 1);
    assert_eq!(timers[0].0, Trigger::Mount);
    assert_eq!(timers[0].2, 200.0);
    assert!(table.mount(true).is_none(), "mount happens once");
}

#[test]
fn test_fallback_without_native_observer() {
    let (mut table, _) = book_table(1000.0);
    assert_eq!(table.mount(false), Some(SizeSource::WindowResize));
}

#[test]
fn test_resize_storm_single_recompute() {
    let (mut table, clock) = book_table(1000.0);
    for _ in 0..20 {
        table.notify_container_resized();
        clock.advance(10.0);
    }
    assert!(table.poll_timers().is_empty());
    assert_eq!(table.surface().apply_count, 0);

    clock.advance(150.0);
    assert_eq!(table.poll_timers(), vec![Trigger::Resized]);
    assert_eq!(table.surface().apply_count, 1);
    assert!(table.poll_timers().is_empty());
}

#[test]
fn test_resize_storm_cancels_replaced_timers() {
    let (mut table, _) = book_table(1000.0);
    table.notify_container_resized();
    table.notify_container_resized();
    let requests = table.take_requests();
    let timers = armed_timers(&requests);
    assert_eq!(timers.len(), 2);
    assert!(requests.contains(&HostRequest::CancelTimer {
        trigger: Trigger::Resized,
        token: timers[0].1,
    }));
    assert!(!table.fire_timer(Trigger::Resized, timers[0].1));
    assert!(table.fire_timer(Trigger::Resized, timers[1].1));
}

#[test]
fn test_container_shrink_relayouts_after_debounce() {
    let (mut table, clock) = book_table(1000.0);
    table.recompute();
    assert_eq!(table.column_width("actions"), "510px");

    table.surface_mut().metrics = Some(ContainerMetrics::new(600.0, 400.0));
    table.notify_container_resized();
    clock.advance(150.0);
    table.poll_timers();
    assert_eq!(table.column_width("actions"), "150px");
}

#[test_case(Trigger::DataLoaded, 100.0 ; "data load")]
#[test_case(Trigger::PageChanged, 50.0 ; "page change")]
fn test_settle_delays(trigger: Trigger, delay: f64) {
    let (mut table, _) = book_table(1000.0);
    table.set_data(books());
    table.take_requests();
    match trigger {
        Trigger::PageChanged => {
            let mut config = common::book_config();
            config.show_pagination = true;
            config.page_size_options = vec![2];
            table.set_config(config).unwrap();
            table.set_data(books());
            table.take_requests();
            assert!(table.next_page());
        }
        _ => table.set_data(books()),
    }
    let timers = armed_timers(&table.take_requests());
    assert_eq!(timers, vec![(trigger, timers[0].1, delay)]);
}

#[test]
fn test_next_timer_due() {
    let (mut table, clock) = book_table(1000.0);
    clock.set(1000.0);
    table.mount(true);
    table.set_data(books());
    assert_eq!(table.next_timer_due_ms(), Some(1100.0));
}

#[test]
fn test_custom_timings() {
    let (mut table, _) = book_table(1000.0);
    table.set_options(TableOptions {
        timings: Timings {
            resize_debounce_ms: 30.0,
            ..Timings::default()
        },
        ..TableOptions::default()
    });
    table.notify_container_resized();
    let timers = armed_timers(&table.take_requests());
    assert_eq!(timers[0].2, 30.0);
}

#[test]
fn test_teardown_stops_everything() {
    let (mut table, clock) = book_table(1000.0);
    table.mount(true);
    table.notify_container_resized();
    let timers = armed_timers(&table.take_requests());
    table.teardown();

    let cancelled: Vec<_> = table
        .take_requests()
        .into_iter()
        .filter(|r| matches!(r, HostRequest::CancelTimer { .. }))
        .collect();
    assert_eq!(cancelled.len(), 2);

    clock.advance(1000.0);
    assert!(table.poll_timers().is_empty());
    for (trigger, token, _) in timers {
        assert!(!table.fire_timer(trigger, token));
    }
    table.notify_container_resized();
    assert!(table.take_requests().is_empty());
    assert_eq!(table.surface().apply_count, 0);
    assert!(table.is_torn_down());
}

#[test]
fn test_unrendered_surface_survives_triggers() {
    let (mut table, clock) = book_table(1000.0);
    table.surface_mut().metrics = None;
    table.mount(true);
    clock.advance(500.0);
    assert_eq!(table.poll_timers(), vec![Trigger::Mount]);
    assert!(table.last_plan().is_none());
}
