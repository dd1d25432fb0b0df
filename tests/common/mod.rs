//! Common test utilities for cf-table integration tests.
//!
//! Builders for the book-list column config used throughout the tests and a
//! headless table driven by a [`ManualClock`].
#![allow(
    dead_code,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]

use cf_table::{
    Column, ContainerMetrics, HostRequest, ManualClock, MemorySurface, Table, TableConfig,
    TaskToken, Trigger,
};
use serde_json::{json, Value};

// ============================================================================
// Configs and rows
// ============================================================================

/// `[title:200, author:150, status:140, actions:?]`
#[must_use]
pub fn book_columns() -> Vec<Column> {
    vec![
        Column::new("title", "Title").with_width(200.0).sortable(),
        Column::new("author", "Author").with_width(150.0).sortable(),
        Column::new("status", "Status").with_width(140.0).custom(),
        Column::new("actions", "Actions").custom(),
    ]
}

#[must_use]
pub fn book_config() -> TableConfig {
    TableConfig::new(book_columns())
}

#[must_use]
pub fn books() -> Vec<Value> {
    vec![
        json!({"id": 1, "title": "Dune", "author": "Frank Herbert", "read": true}),
        json!({"id": 2, "title": "Neuromancer", "author": "William Gibson", "read": false}),
        json!({"id": 3, "title": "Hyperion", "author": "Dan Simmons", "read": true}),
        json!({"id": 4, "title": "Foundation", "author": "Isaac Asimov", "read": false}),
        json!({"id": 5, "title": "Solaris", "author": "Stanislaw Lem", "read": true}),
        json!({"id": 6, "title": "Ubik", "author": "Philip K. Dick", "read": false}),
        json!({"id": 7, "title": "Gateway", "author": "Frederik Pohl", "read": true}),
    ]
}

// ============================================================================
// Headless table
// ============================================================================

/// Table over a surface of `width` x 400 with the book config installed
#[must_use]
pub fn book_table(width: f32) -> (Table<MemorySurface>, ManualClock) {
    table_with(book_config(), ContainerMetrics::new(width, 400.0))
}

#[must_use]
pub fn table_with(config: TableConfig, metrics: ContainerMetrics) -> (Table<MemorySurface>, ManualClock) {
    let clock = ManualClock::new();
    let mut table = Table::new(MemorySurface::with_metrics(metrics), clock.clone());
    table.set_config(config).unwrap();
    (table, clock)
}

/// Displayed widths of the last applied layout, in column order
#[must_use]
pub fn applied_widths(table: &Table<MemorySurface>) -> Vec<f32> {
    table
        .surface()
        .applied
        .as_ref()
        .map(|plan| plan.widths.widths())
        .unwrap_or_default()
}

/// Tokens of every `RequestFrame` in `requests`
#[must_use]
pub fn frame_tokens(requests: &[HostRequest]) -> Vec<TaskToken> {
    requests
        .iter()
        .filter_map(|r| match r {
            HostRequest::RequestFrame { token } => Some(*token),
            _ => None,
        })
        .collect()
}

/// Armed timers in `requests` as `(trigger, token, delay)`
#[must_use]
pub fn armed_timers(requests: &[HostRequest]) -> Vec<(Trigger, TaskToken, f64)> {
    requests
        .iter()
        .filter_map(|r| match r {
            HostRequest::ArmTimer {
                trigger,
                token,
                delay_ms,
            } => Some((*trigger, *token, *delay_ms)),
            _ => None,
        })
        .collect()
}
