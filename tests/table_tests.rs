//! Grid component tests
//!
//! Tests for header scroll sync, configuration changes, filtering, sorting,
//! pagination, row actions and custom cell rendering.
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]

mod common;

use cf_table::{
    CellContent, CellRenderer, CfTableError, Column, ContainerMetrics, MemorySurface, RowAction,
    SortDirection, Table, TableConfig, TableEvent, Trigger,
};
use common::{armed_timers, book_config, book_table, books};
use serde_json::{json, Value};

// ============================================================================
// Scroll sync
// ============================================================================

#[test]
fn test_header_follows_body_scroll() {
    let (mut table, _) = book_table(400.0);
    table.surface_mut().body_scroll_left = 120.0;
    table.on_body_scroll();
    assert_eq!(table.surface().header_scroll_left, 120.0);

    table.surface_mut().body_scroll_left = 0.0;
    table.on_body_scroll();
    assert_eq!(table.surface().header_scroll_left, 0.0);
}

#[test]
fn test_scroll_without_rendered_body_is_noop() {
    let mut table = Table::new(MemorySurface::unmounted(), cf_table::ManualClock::new());
    table.set_config(book_config()).unwrap();
    table.on_body_scroll();
    assert_eq!(table.surface().header_scroll_left, 0.0);
}

// ============================================================================
// Configuration
// ============================================================================

#[test]
fn test_invalid_config_keeps_previous() {
    let (mut table, _) = book_table(1000.0);
    let err = table
        .set_config(TableConfig::new(vec![
            Column::new("a", "A"),
            Column::new("a", "Again"),
        ]))
        .unwrap_err();
    assert!(matches!(err, CfTableError::InvalidConfig(_)));
    assert_eq!(table.displayed_columns(), vec!["title", "author", "status", "actions"]);
}

#[test]
fn test_config_from_json() {
    let config = TableConfig::from_json(
        r#"{
            "columns": [
                {"key": "title", "label": "Title", "width": 220, "sortable": true},
                {"key": "actions", "label": "", "type": "custom"}
            ],
            "showSearch": true,
            "showPagination": true,
            "pageSizeOptions": [25, 50]
        }"#,
    )
    .unwrap();
    assert_eq!(config.initial_page_size(), 25);
    assert_eq!(config.search_placeholder, "Search");
    let (mut table, _) = common::table_with(config, ContainerMetrics::new(1000.0, 400.0));
    assert_eq!(table.recompute().unwrap().last_column_width(), Some(780.0));
}

#[test]
fn test_recompute_after_mount_applies_new_config_immediately() {
    let (mut table, _) = book_table(1000.0);
    table.mount(true);
    table
        .set_config(TableConfig::new(vec![
            Column::new("title", "Title").with_width(300.0),
            Column::new("actions", "Actions"),
        ]))
        .unwrap();
    assert_eq!(table.column_width("actions"), "700px");
    assert_eq!(table.column("title").unwrap().label, "Title");
    assert_eq!(table.column_width("isbn"), "150px");
}

#[test]
fn test_loading_flag() {
    let (mut table, _) = book_table(1000.0);
    assert!(!table.is_loading());
    table.set_loading(true);
    assert!(table.is_loading());
}

// ============================================================================
// Filtering
// ============================================================================

#[test]
fn test_filter_emits_search_and_schedules_recompute() {
    let (mut table, _) = book_table(1000.0);
    table.set_data(books());
    table.take_requests();

    table.apply_filter("  GIBSON ");
    assert_eq!(
        table.take_events(),
        vec![TableEvent::SearchChanged {
            filter: "gibson".into()
        }]
    );
    let timers = armed_timers(&table.take_requests());
    assert_eq!(timers[0].0, Trigger::DataLoaded);
    let rows = table.visible_rows();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["title"], "Neuromancer");
}

#[test]
fn test_new_config_clears_filter_and_reports_it() {
    let (mut table, _) = book_table(1000.0);
    table.set_data(books());
    table.apply_filter("dune");
    table.take_events();

    table.set_config(book_config()).unwrap();
    assert_eq!(
        table.take_events(),
        vec![TableEvent::SearchChanged {
            filter: String::new()
        }]
    );
    assert_eq!(table.visible_rows().len(), 7);

    table.set_config(book_config()).unwrap();
    assert!(table.take_events().is_empty(), "no event when nothing was filtered");
}

#[test]
fn test_filter_returns_to_first_page() {
    let mut config = book_config();
    config.show_pagination = true;
    config.page_size_options = vec![2, 5];
    let (mut table, _) = common::table_with(config, ContainerMetrics::new(1000.0, 400.0));
    table.set_data(books());
    table.set_page(2);
    table.apply_filter("a");
    assert_eq!(table.page().page_index, 0);
}

// ============================================================================
// Pagination
// ============================================================================

#[test]
fn test_pagination_pages() {
    let mut config = book_config();
    config.show_pagination = true;
    config.page_size_options = vec![3, 5];
    let (mut table, _) = common::table_with(config, ContainerMetrics::new(1000.0, 400.0));
    table.set_data(books());

    let page = table.page();
    assert_eq!((page.page_size, page.length, page.page_count), (3, 7, 3));
    assert_eq!(table.visible_rows().len(), 3);

    assert!(table.set_page(2));
    assert_eq!(table.visible_rows().len(), 1);
    assert!(!table.next_page());
    assert!(table.previous_page());

    assert!(table.set_page_size(5));
    assert_eq!(table.page().page_index, 0);
    assert_eq!(table.visible_rows().len(), 5);
}

#[test]
fn test_pagination_disabled_shows_everything() {
    let (mut table, _) = book_table(1000.0);
    table.set_data(books());
    assert_eq!(table.visible_rows().len(), 7);
    assert!(!table.next_page());
}

#[test]
fn test_empty_page_size_options_fall_back() {
    let mut config = book_config();
    config.show_pagination = true;
    config.page_size_options = Vec::new();
    assert_eq!(config.initial_page_size(), 10);
}

// ============================================================================
// Sorting
// ============================================================================

#[test]
fn test_sort_cycle() {
    let (mut table, _) = book_table(1000.0);
    table.set_data(books());

    assert!(table.sort_by("title"));
    assert_eq!(table.visible_rows()[0]["title"], "Dune");
    assert!(table.sort_by("title"));
    assert_eq!(
        table.data().sort().unwrap().direction,
        SortDirection::Descending
    );
    assert_eq!(table.visible_rows()[0]["title"], "Ubik");
    assert!(table.sort_by("title"));
    assert!(table.data().sort().is_none());
    assert_eq!(table.visible_rows()[0]["id"], 1);
}

#[test]
fn test_sort_ignores_unsortable() {
    let (mut table, _) = book_table(1000.0);
    assert!(!table.sort_by("status"));
    assert!(!table.sort_by("isbn"));
    assert!(table.data().sort().is_none());
}

// ============================================================================
// Rows and cells
// ============================================================================

struct ReadBadge;

impl CellRenderer for ReadBadge {
    fn render(&self, row: &Value, column: &Column) -> String {
        let state = if row["read"] == json!(true) { "read" } else { "unread" };
        format!("<span class=\"{}-{state}\">{state}</span>", column.key)
    }
}

#[test]
fn test_row_action_uses_current_page() {
    let mut config = book_config();
    config.show_pagination = true;
    config.page_size_options = vec![5];
    let (mut table, _) = common::table_with(config, ContainerMetrics::new(1000.0, 400.0));
    table.set_data(books());
    table.next_page();

    assert!(table.row_action("edit", 1));
    assert!(!table.row_action("edit", 2));
    assert_eq!(
        table.take_events(),
        vec![TableEvent::RowAction(RowAction {
            action: "edit".into(),
            row: books()[6].clone(),
        })]
    );
}

#[test]
fn test_row_action_event_json() {
    let event = TableEvent::RowAction(RowAction {
        action: "delete".into(),
        row: json!({"id": 3}),
    });
    let value = serde_json::to_value(&event).unwrap();
    assert_eq!(value["type"], "rowAction");
    assert_eq!(value["action"], "delete");
    assert_eq!(value["row"]["id"], 3);
}

#[test]
fn test_cell_content() {
    let (mut table, _) = book_table(1000.0);
    table.register_renderer("status", Box::new(ReadBadge));
    assert!(table.has_renderer("status"));
    let row = json!({"title": "Dune", "author": null, "read": true});

    assert_eq!(table.cell_content(&row, "title"), CellContent::Text("Dune".into()));
    assert_eq!(table.cell_content(&row, "author"), CellContent::Text(String::new()));
    assert_eq!(
        table.cell_content(&row, "status"),
        CellContent::Custom("<span class=\"status-read\">read</span>".into())
    );
    assert_eq!(table.cell_content(&row, "actions"), CellContent::Text(String::new()));
    assert_eq!(table.cell_content(&row, "isbn"), CellContent::Text(String::new()));
}
