//! Drag-to-resize tests
//!
//! Tests for the drag session lifecycle, per-frame coalescing of recomputes
//! and the width floors under drag.
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]

mod common;

use cf_table::{HostRequest, TableOptions, TableWidth};
use common::{applied_widths, book_table, frame_tokens};
use test_case::test_case;

#[test]
fn test_drag_session_attaches_and_detaches_listeners() {
    let (mut table, _) = book_table(1000.0);
    let session = table.start_resize("author", 500.0).unwrap();
    assert_eq!(
        table.take_requests(),
        vec![HostRequest::AttachDragListeners { session }]
    );
    assert!(table.pointer_up(session));
    assert_eq!(
        table.take_requests(),
        vec![HostRequest::DetachDragListeners { session }]
    );
    assert!(!table.is_resizing());
}

#[test]
fn test_unknown_column_does_not_start() {
    let (mut table, _) = book_table(1000.0);
    assert!(table.start_resize("isbn", 0.0).is_none());
    assert!(table.take_requests().is_empty());
}

#[test]
fn test_moves_within_frame_recompute_once() {
    let (mut table, _) = book_table(1000.0);
    table.recompute();
    let before = table.surface().apply_count;

    let session = table.start_resize("title", 0.0).unwrap();
    for x in [5.0, 10.0, 20.0, 40.0, 80.0] {
        table.pointer_move(session, x);
    }
    assert_eq!(table.surface().apply_count, before, "no recompute before the frame");
    assert!(table.has_pending_frame());

    assert!(table.flush_frame());
    assert_eq!(table.surface().apply_count, before + 1);
    assert_eq!(applied_widths(&table), vec![280.0, 150.0, 140.0, 430.0]);
    assert!(!table.flush_frame());
}

#[test]
fn test_only_latest_frame_token_fires() {
    let (mut table, _) = book_table(1000.0);
    let session = table.start_resize("title", 0.0).unwrap();
    table.pointer_move(session, 10.0);
    table.pointer_move(session, 20.0);
    let tokens = frame_tokens(&table.take_requests());
    assert_eq!(tokens.len(), 2);
    assert!(!table.fire_frame(tokens[0]));
    assert!(table.fire_frame(tokens[1]));
    assert!(!table.fire_frame(tokens[1]));
}

#[test_case(-1000.0, 80.0 ; "far left clamps to min width")]
#[test_case(-120.0, 80.0 ; "just past min")]
#[test_case(-100.0, 100.0 ; "shrink")]
#[test_case(0.0, 200.0 ; "no movement")]
#[test_case(300.0, 500.0 ; "grow")]
fn test_drag_width(dx: f32, expected: f32) {
    let (mut table, _) = book_table(1000.0);
    let session = table.start_resize("title", 400.0).unwrap();
    assert_eq!(table.pointer_move(session, 400.0 + dx), Some(expected));
    assert_eq!(table.columns().width("title"), Some(expected));
}

#[test]
fn test_drag_width_monotonic_in_pointer() {
    let (mut table, _) = book_table(1000.0);
    let session = table.start_resize("author", 0.0).unwrap();
    let mut previous = f32::MIN;
    for x in (-200..=200).step_by(10) {
        let width = table.pointer_move(session, x as f32).unwrap();
        assert!(width >= previous);
        previous = width;
    }
}

#[test]
fn test_growing_column_makes_table_scroll() {
    let (mut table, _) = book_table(800.0);
    let session = table.start_resize("author", 0.0).unwrap();
    table.pointer_move(session, 300.0);
    table.flush_frame();
    let plan = table.last_plan().unwrap();
    assert_eq!(plan.last_column_width(), Some(150.0));
    assert_eq!(plan.table_width, TableWidth::Fixed(940.0));
}

#[test]
fn test_stale_session_callbacks_ignored() {
    let (mut table, _) = book_table(1000.0);
    let first = table.start_resize("title", 0.0).unwrap();
    table.pointer_up(first);
    let second = table.start_resize("author", 0.0).unwrap();

    assert_eq!(table.pointer_move(first, 90.0), None);
    assert!(!table.pointer_up(first));
    assert_eq!(table.columns().width("title"), Some(200.0));
    assert!(table.is_resizing());
    assert!(table.pointer_up(second));
}

#[test]
fn test_new_drag_cancels_pending_frame() {
    let (mut table, _) = book_table(1000.0);
    let session = table.start_resize("title", 0.0).unwrap();
    table.pointer_move(session, 30.0);
    let token = frame_tokens(&table.take_requests())[0];
    table.pointer_up(session);
    table.take_requests();

    table.start_resize("author", 0.0).unwrap();
    let requests = table.take_requests();
    assert!(requests.contains(&HostRequest::CancelFrame { token }));
    assert!(!table.fire_frame(token));
}

#[test]
fn test_new_drag_applies_previous_drag_width() {
    let (mut table, _) = book_table(1000.0);
    table.recompute();
    let first = table.start_resize("title", 0.0).unwrap();
    table.pointer_move(first, 30.0);
    table.pointer_up(first);

    // Mouse-down again before the frame runs
    let second = table.start_resize("author", 0.0).unwrap();
    table.pointer_up(second);

    assert_eq!(table.columns().width("title"), Some(230.0));
    assert_eq!(table.column_width("title"), "230px");
    assert_eq!(table.column_width("actions"), "480px");
    assert_eq!(applied_widths(&table), vec![230.0, 150.0, 140.0, 480.0]);
}

#[test]
fn test_options_change_ends_drag() {
    let (mut table, _) = book_table(1000.0);
    let session = table.start_resize("title", 0.0).unwrap();
    table.pointer_move(session, 40.0);
    let token = frame_tokens(&table.take_requests())[0];

    table.set_options(TableOptions::default());
    let requests = table.take_requests();
    assert!(requests.contains(&HostRequest::DetachDragListeners { session }));
    assert!(requests.contains(&HostRequest::CancelFrame { token }));
    assert!(!table.is_resizing());
    assert_eq!(table.pointer_move(session, 90.0), None);
    assert_eq!(table.columns().width("title"), Some(200.0));
}

#[test]
fn test_last_column_drag_raises_its_floor() {
    let (mut table, _) = book_table(1000.0);
    table.recompute();
    let session = table.start_resize("actions", 0.0).unwrap();
    table.pointer_move(session, 100.0);
    table.flush_frame();
    // Current width 250 is below the available slack, so the slack still wins
    assert_eq!(table.last_plan().unwrap().last_column_width(), Some(510.0));
}
