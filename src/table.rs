//! The grid component core.
//!
//! [`Table`] owns the column width state and the drag session exclusively and
//! ties the pieces together:
//!
//! ```text
//! config -> ColumnModel -> LayoutEngine -> GridSurface::apply_layout
//!              ^   ^
//!              |   +-- ResizeController (pointer drag, one recompute per frame)
//!              +------ ObservationLoop (resize debounce, settle delays)
//! body scroll -> ScrollSync -> header scroll
//! ```
//!
//! It is driven by the host: every interaction may queue [`HostRequest`]s
//! (timers, frames, drag listeners) and [`TableEvent`]s, which the host drains
//! with [`Table::take_requests`] and [`Table::take_events`].

use std::collections::HashMap;

use serde::Serialize;
use serde_json::Value;

use crate::data::{value_text, DataSource, PageState, SortDirection, SortState};
use crate::error::Result;
use crate::layout::{ColumnModel, GridSurface, LayoutEngine, LayoutPlan, ScrollSync};
use crate::observe::{ObservationLoop, SizeSource, Trigger};
use crate::resize::{ResizeController, SessionId};
use crate::schedule::{Clock, FrameScheduler, Scheduled, TaskToken};
use crate::types::{Column, ColumnKind, RowAction, TableConfig, TableEvent, TableOptions};

/// Renders the content of a custom column's cell
pub trait CellRenderer {
    fn render(&self, row: &Value, column: &Column) -> String;
}

/// Content of one cell
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "camelCase")]
pub enum CellContent {
    /// Plain text, to be escaped by the renderer
    Text(String),
    /// Output of a custom renderer, inserted as-is
    Custom(String),
}

/// Work the host must carry out on the table's behalf
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum HostRequest {
    /// Call [`Table::fire_timer`] with `trigger` and `token` after `delay_ms`
    ArmTimer {
        trigger: Trigger,
        token: TaskToken,
        delay_ms: f64,
    },
    /// The timer armed for `token` must not fire
    CancelTimer { trigger: Trigger, token: TaskToken },
    /// Call [`Table::fire_frame`] with `token` on the next animation frame
    RequestFrame { token: TaskToken },
    /// The frame requested for `token` must not fire
    CancelFrame { token: TaskToken },
    /// Listen for pointer move/up at document level for `session`
    AttachDragListeners { session: SessionId },
    /// Remove the listeners attached for `session`
    DetachDragListeners { session: SessionId },
}

/// Data-grid component driving a [`GridSurface`]
pub struct Table<S: GridSurface> {
    surface: S,
    clock: Box<dyn Clock>,
    options: TableOptions,
    config: Option<TableConfig>,
    columns: ColumnModel,
    engine: LayoutEngine,
    resize: ResizeController,
    frames: FrameScheduler,
    observer: ObservationLoop,
    scroll: ScrollSync,
    data: DataSource,
    renderers: HashMap<String, Box<dyn CellRenderer>>,
    loading: bool,
    mounted: bool,
    torn_down: bool,
    recomputing: bool,
    last_plan: Option<LayoutPlan>,
    requests: Vec<HostRequest>,
    events: Vec<TableEvent>,
}

impl<S: GridSurface> Table<S> {
    /// Create a table with default options
    pub fn new(surface: S, clock: impl Clock + 'static) -> Self {
        Self::with_options(surface, clock, TableOptions::default())
    }

    pub fn with_options(surface: S, clock: impl Clock + 'static, options: TableOptions) -> Self {
        Self {
            surface,
            clock: Box::new(clock),
            options,
            config: None,
            columns: ColumnModel::default(),
            engine: LayoutEngine::new(options.layout),
            resize: ResizeController::new(),
            frames: FrameScheduler::new(),
            observer: ObservationLoop::new(&options.timings),
            scroll: ScrollSync::new(),
            data: DataSource::new(),
            renderers: HashMap::new(),
            loading: false,
            mounted: false,
            torn_down: false,
            recomputing: false,
            last_plan: None,
            requests: Vec::new(),
            events: Vec::new(),
        }
    }

    // ------------------------------------------------------------------
    // Inputs
    // ------------------------------------------------------------------

    /// Replace the tuning options. Column widths are re-initialized when a
    /// config is present.
    pub fn set_options(&mut self, options: TableOptions) {
        self.options = options;
        self.engine = LayoutEngine::new(options.layout);
        self.observer.set_timings(&options.timings);
        if self.config.is_none() {
            return;
        }
        self.end_drag();
        if let Some(token) = self.frames.cancel() {
            self.requests.push(HostRequest::CancelFrame { token });
        }
        if let Some(config) = &self.config {
            self.columns = ColumnModel::initialize(&config.columns, &options.layout);
        }
    }

    pub fn options(&self) -> &TableOptions {
        &self.options
    }

    /// Install a new config, re-initializing every column width.
    ///
    /// # Errors
    /// Returns `InvalidConfig` for empty or duplicate column keys; the
    /// previous config stays in place.
    pub fn set_config(&mut self, config: TableConfig) -> Result<()> {
        config.validate()?;
        log::info!("table config: {} columns", config.columns.len());

        self.end_drag();
        if let Some(token) = self.frames.cancel() {
            self.requests.push(HostRequest::CancelFrame { token });
        }

        self.columns = ColumnModel::initialize(&config.columns, &self.options.layout);
        self.data
            .configure_paging(config.show_pagination, config.initial_page_size());
        let stale_sort = self
            .data
            .sort()
            .is_some_and(|s| !self.columns.column(&s.key).is_some_and(|c| c.sortable));
        if stale_sort {
            self.data.set_sort(None);
        }
        if !self.data.filter().is_empty() {
            self.data.set_filter("");
            self.events.push(TableEvent::SearchChanged {
                filter: String::new(),
            });
        }
        self.scroll.reset();
        self.last_plan = None;
        self.config = Some(config);

        if self.mounted {
            self.recompute();
        }
        Ok(())
    }

    pub fn config(&self) -> Option<&TableConfig> {
        self.config.as_ref()
    }

    /// Replace the rows and schedule a recompute once they are rendered
    pub fn set_data(&mut self, rows: Vec<Value>) {
        self.data.set_rows(rows);
        self.schedule(Trigger::DataLoaded);
    }

    pub fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Use `renderer` for the cells of the custom column `key`
    pub fn register_renderer(&mut self, key: impl Into<String>, renderer: Box<dyn CellRenderer>) {
        self.renderers.insert(key.into(), renderer);
    }

    pub fn has_renderer(&self, key: &str) -> bool {
        self.renderers.contains_key(key)
    }

    // ------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------

    /// The grid is rendered. Returns the size source the host must install.
    pub fn mount(&mut self, native_observer_available: bool) -> Option<SizeSource> {
        if self.torn_down || self.mounted {
            return None;
        }
        self.mounted = true;
        let now = self.clock.now_ms();
        let (source, task) = self.observer.mount(native_observer_available, now);
        self.push_scheduled(Trigger::Mount, task);
        Some(source)
    }

    /// The grid is going away: cancel everything pending and go inert
    pub fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        self.end_drag();
        if let Some(token) = self.frames.cancel() {
            self.requests.push(HostRequest::CancelFrame { token });
        }
        for (trigger, token) in self.observer.teardown() {
            self.requests.push(HostRequest::CancelTimer { trigger, token });
        }
        self.torn_down = true;
        self.mounted = false;
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    // ------------------------------------------------------------------
    // Layout
    // ------------------------------------------------------------------

    /// Recompute every column's width and apply it to the surface.
    ///
    /// No-op without a config, without columns, before the surface is
    /// rendered, after teardown, or when called from inside a recompute.
    pub fn recompute(&mut self) -> Option<&LayoutPlan> {
        if self.torn_down || self.recomputing || self.config.is_none() {
            return None;
        }
        let metrics = self.surface.body_metrics()?;
        let plan = self.engine.compute(&self.columns, &metrics)?;

        log::debug!(
            "layout: available={} total={} container={} scrollable={}",
            plan.available_width,
            plan.total_width,
            plan.container_width,
            plan.is_scrollable()
        );

        self.recomputing = true;
        self.columns.set_displayed(&plan.widths);
        self.surface.apply_layout(&plan);
        self.recomputing = false;

        self.last_plan = Some(plan);
        self.last_plan.as_ref()
    }

    /// Most recently applied layout
    pub fn last_plan(&self) -> Option<&LayoutPlan> {
        self.last_plan.as_ref()
    }

    /// The observed container changed size
    pub fn notify_container_resized(&mut self) {
        self.schedule(Trigger::Resized);
    }

    /// A host timer fired
    pub fn fire_timer(&mut self, trigger: Trigger, token: TaskToken) -> bool {
        if self.torn_down || !self.observer.fire(trigger, token) {
            return false;
        }
        self.recompute();
        true
    }

    /// Run every trigger that is due according to the table's clock
    pub fn poll_timers(&mut self) -> Vec<Trigger> {
        if self.torn_down {
            return Vec::new();
        }
        let due = self.observer.poll(self.clock.now_ms());
        if !due.is_empty() {
            self.recompute();
        }
        due
    }

    /// Earliest pending trigger due time
    pub fn next_timer_due_ms(&self) -> Option<f64> {
        self.observer.next_due_ms()
    }

    /// A host animation frame fired
    pub fn fire_frame(&mut self, token: TaskToken) -> bool {
        if self.torn_down || !self.frames.fire(token) {
            return false;
        }
        self.recompute();
        true
    }

    /// Run the pending frame, for hosts that drive frames themselves
    pub fn flush_frame(&mut self) -> bool {
        if self.torn_down || !self.frames.flush() {
            return false;
        }
        self.recompute();
        true
    }

    pub fn has_pending_frame(&self) -> bool {
        self.frames.is_pending()
    }

    // ------------------------------------------------------------------
    // Column resize
    // ------------------------------------------------------------------

    /// Pointer pressed on the resize handle of `key`
    pub fn start_resize(&mut self, key: &str, pointer_x: f32) -> Option<SessionId> {
        if self.torn_down || self.config.is_none() {
            return None;
        }
        if let Some(token) = self.frames.cancel() {
            self.requests.push(HostRequest::CancelFrame { token });
            // The previous drag's last width has not been laid out yet
            self.recompute();
        }
        let start = self.resize.start(&self.columns, key, pointer_x)?;
        if let Some(ended) = start.ended {
            self.requests
                .push(HostRequest::DetachDragListeners { session: ended });
        }
        self.requests.push(HostRequest::AttachDragListeners {
            session: start.session,
        });
        Some(start.session)
    }

    /// Pointer moved while dragging; at most one recompute per frame
    pub fn pointer_move(&mut self, session: SessionId, pointer_x: f32) -> Option<f32> {
        let width = self.resize.drag(session, pointer_x, &mut self.columns)?;
        let frame = self.frames.request();
        if let Some(token) = frame.replaced {
            self.requests.push(HostRequest::CancelFrame { token });
        }
        self.requests
            .push(HostRequest::RequestFrame { token: frame.token });
        Some(width)
    }

    /// Pointer released
    pub fn pointer_up(&mut self, session: SessionId) -> bool {
        if !self.resize.end(session) {
            return false;
        }
        self.requests
            .push(HostRequest::DetachDragListeners { session });
        true
    }

    /// True while a column border is being dragged
    pub fn is_resizing(&self) -> bool {
        self.resize.is_resizing()
    }

    fn end_drag(&mut self) {
        if let Some(session) = self.resize.cancel() {
            self.requests
                .push(HostRequest::DetachDragListeners { session });
        }
    }

    // ------------------------------------------------------------------
    // Scroll
    // ------------------------------------------------------------------

    /// The body region scrolled; mirror its horizontal offset onto the header
    pub fn on_body_scroll(&mut self) {
        if self.torn_down {
            return;
        }
        let Some(left) = self.surface.body_scroll_left() else {
            return;
        };
        if let Some(offset) = self.scroll.on_body_scroll(left) {
            self.surface.set_header_scroll_left(offset);
        }
    }

    // ------------------------------------------------------------------
    // Data interaction
    // ------------------------------------------------------------------

    /// Filter input changed
    pub fn apply_filter(&mut self, raw: &str) {
        self.data.set_filter(raw);
        let filter = self.data.filter().to_string();
        self.events.push(TableEvent::SearchChanged { filter });
        self.schedule(Trigger::DataLoaded);
    }

    /// A caller-defined action was invoked on row `index` of the current page
    pub fn row_action(&mut self, action: &str, index: usize) -> bool {
        let Some(row) = self.data.visible_row(index) else {
            return false;
        };
        self.events.push(TableEvent::RowAction(RowAction {
            action: action.to_string(),
            row: row.clone(),
        }));
        true
    }

    /// Cycle the sort of `key`: ascending, descending, none
    pub fn sort_by(&mut self, key: &str) -> bool {
        if !self.columns.column(key).is_some_and(|c| c.sortable) {
            return false;
        }
        let next = match self.data.sort() {
            Some(s) if s.key == key => match s.direction {
                SortDirection::Ascending => Some(SortDirection::Descending),
                SortDirection::Descending => None,
            },
            _ => Some(SortDirection::Ascending),
        };
        self.data.set_sort(next.map(|direction| SortState {
            key: key.to_string(),
            direction,
        }));
        true
    }

    pub fn set_page(&mut self, index: usize) -> bool {
        let changed = self.data.set_page(index);
        self.page_changed(changed)
    }

    pub fn next_page(&mut self) -> bool {
        let changed = self.data.next_page();
        self.page_changed(changed)
    }

    pub fn previous_page(&mut self) -> bool {
        let changed = self.data.previous_page();
        self.page_changed(changed)
    }

    pub fn set_page_size(&mut self, size: usize) -> bool {
        let changed = self.data.set_page_size(size);
        self.page_changed(changed)
    }

    fn page_changed(&mut self, changed: bool) -> bool {
        if changed {
            self.schedule(Trigger::PageChanged);
        }
        changed
    }

    pub fn page(&self) -> PageState {
        self.data.page()
    }

    pub fn data(&self) -> &DataSource {
        &self.data
    }

    /// Rows of the current page
    pub fn visible_rows(&self) -> Vec<&Value> {
        self.data.visible_rows()
    }

    /// Content of the cell of `row` in column `key`
    pub fn cell_content(&self, row: &Value, key: &str) -> CellContent {
        let Some(column) = self.columns.column(key) else {
            return CellContent::Text(String::new());
        };
        if column.kind == ColumnKind::Custom {
            if let Some(renderer) = self.renderers.get(key) {
                return CellContent::Custom(renderer.render(row, column));
            }
        }
        CellContent::Text(row.get(key).map(value_text).unwrap_or_default())
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    /// Displayed width of `key` formatted for styles (`"150px"` if unknown)
    pub fn column_width(&self, key: &str) -> String {
        self.columns.formatted_width(key)
    }

    pub fn column(&self, key: &str) -> Option<&Column> {
        self.columns.column(key)
    }

    pub fn columns(&self) -> &ColumnModel {
        &self.columns
    }

    /// Keys of the displayed columns in order
    pub fn displayed_columns(&self) -> Vec<&str> {
        self.columns.keys().collect()
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    /// Drain pending host requests
    pub fn take_requests(&mut self) -> Vec<HostRequest> {
        std::mem::take(&mut self.requests)
    }

    /// Drain emitted events
    pub fn take_events(&mut self) -> Vec<TableEvent> {
        std::mem::take(&mut self.events)
    }

    fn schedule(&mut self, trigger: Trigger) {
        if self.torn_down {
            return;
        }
        let now = self.clock.now_ms();
        let task = self.observer.notify(trigger, now);
        self.push_scheduled(trigger, task);
    }

    fn push_scheduled(&mut self, trigger: Trigger, task: Scheduled) {
        if let Some(token) = task.replaced {
            self.requests
                .push(HostRequest::CancelTimer { trigger, token });
        }
        self.requests.push(HostRequest::ArmTimer {
            trigger,
            token: task.token,
            delay_ms: task.delay_ms,
        });
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::float_cmp,
    clippy::indexing_slicing,
    clippy::unreachable
)]
mod tests {
    use super::*;
    use crate::layout::{ContainerMetrics, MemorySurface, TableWidth};
    use crate::schedule::ManualClock;
    use serde_json::json;

    fn config() -> TableConfig {
        TableConfig::new(vec![
            Column::new("title", "Title").with_width(200.0).sortable(),
            Column::new("author", "Author").with_width(150.0),
            Column::new("status", "Status").with_width(140.0).custom(),
            Column::new("actions", "Actions").custom(),
        ])
    }

    fn table(width: f32) -> (Table<MemorySurface>, ManualClock) {
        let clock = ManualClock::new();
        let surface = MemorySurface::with_metrics(ContainerMetrics::new(width, 400.0));
        let mut table = Table::new(surface, clock.clone());
        table.set_config(config()).unwrap();
        (table, clock)
    }

    struct Badge;

    impl CellRenderer for Badge {
        fn render(&self, row: &Value, _column: &Column) -> String {
            if row["read"].as_bool() == Some(true) {
                "<span class=\"badge\">read</span>".into()
            } else {
                "<span class=\"badge\">unread</span>".into()
            }
        }
    }

    #[test]
    fn test_recompute_without_config_is_noop() {
        let surface = MemorySurface::with_metrics(ContainerMetrics::new(800.0, 400.0));
        let mut table = Table::new(surface, ManualClock::new());
        assert!(table.recompute().is_none());
        assert_eq!(table.surface().apply_count, 0);
    }

    #[test]
    fn test_recompute_before_render_is_noop() {
        let mut table = Table::new(MemorySurface::unmounted(), ManualClock::new());
        table.set_config(config()).unwrap();
        assert!(table.recompute().is_none());
    }

    #[test]
    fn test_mount_settles_then_lays_out() {
        let (mut table, clock) = table(1000.0);
        assert_eq!(table.mount(true), Some(SizeSource::ResizeObserver));
        assert!(table.poll_timers().is_empty());
        clock.advance(200.0);
        assert_eq!(table.poll_timers(), vec![Trigger::Mount]);
        let plan = table.last_plan().unwrap();
        assert_eq!(plan.last_column_width(), Some(510.0));
        assert_eq!(table.column_width("actions"), "510px");
    }

    #[test]
    fn test_drag_coalesced_per_frame() {
        let (mut table, _) = table(1000.0);
        table.recompute();
        table.take_requests();

        let session = table.start_resize("title", 100.0).unwrap();
        assert!(table.is_resizing());
        table.pointer_move(session, 110.0);
        table.pointer_move(session, 130.0);
        let requests = table.take_requests();
        let frames: Vec<_> = requests
            .iter()
            .filter(|r| matches!(r, HostRequest::RequestFrame { .. }))
            .collect();
        let cancels: Vec<_> = requests
            .iter()
            .filter(|r| matches!(r, HostRequest::CancelFrame { .. }))
            .collect();
        assert_eq!(frames.len(), 2);
        assert_eq!(cancels.len(), 1);
        assert_eq!(requests[0], HostRequest::AttachDragListeners { session });

        let HostRequest::RequestFrame { token } = frames[1] else {
            unreachable!()
        };
        let HostRequest::RequestFrame { token: stale } = frames[0] else {
            unreachable!()
        };
        assert!(!table.fire_frame(*stale));
        assert!(table.fire_frame(*token));
        let plan = table.last_plan().unwrap();
        assert_eq!(plan.widths.get("title"), Some(230.0));
        assert_eq!(plan.widths.get("actions"), Some(480.0));

        assert!(table.pointer_up(session));
        assert!(!table.is_resizing());
        assert_eq!(
            table.take_requests(),
            vec![HostRequest::DetachDragListeners { session }]
        );
    }

    #[test]
    fn test_new_config_ends_drag_and_reinitializes() {
        let (mut table, _) = table(1000.0);
        let session = table.start_resize("title", 0.0).unwrap();
        table.pointer_move(session, 50.0);
        table.take_requests();
        table.set_config(config()).unwrap();
        assert!(!table.is_resizing());
        assert_eq!(table.columns().width("title"), Some(200.0));
        let requests = table.take_requests();
        assert!(requests.contains(&HostRequest::DetachDragListeners { session }));
        assert!(requests
            .iter()
            .any(|r| matches!(r, HostRequest::CancelFrame { .. })));
    }

    #[test]
    fn test_teardown_cancels_and_goes_inert() {
        let (mut table, clock) = table(1000.0);
        table.mount(true);
        table.set_data(vec![json!({"title": "Dune"})]);
        table.take_requests();
        table.teardown();
        let requests = table.take_requests();
        assert_eq!(
            requests
                .iter()
                .filter(|r| matches!(r, HostRequest::CancelTimer { .. }))
                .count(),
            2
        );
        clock.advance(1000.0);
        assert!(table.poll_timers().is_empty());
        assert!(table.recompute().is_none());
        assert!(table.start_resize("title", 0.0).is_none());
    }

    #[test]
    fn test_filter_emits_normalized_search() {
        let (mut table, _) = table(1000.0);
        table.apply_filter("  Dune ");
        assert_eq!(
            table.take_events(),
            vec![TableEvent::SearchChanged {
                filter: "dune".into()
            }]
        );
    }

    #[test]
    fn test_row_action_emits_row() {
        let (mut table, _) = table(1000.0);
        table.set_data(vec![json!({"id": 7, "title": "Dune"})]);
        assert!(table.row_action("delete", 0));
        assert!(!table.row_action("delete", 1));
        let events = table.take_events();
        assert_eq!(events.len(), 1);
        let TableEvent::RowAction(action) = &events[0] else {
            unreachable!()
        };
        assert_eq!(action.action, "delete");
        assert_eq!(action.row["id"], 7);
    }

    #[test]
    fn test_cell_content_uses_renderer_for_custom_columns() {
        let (mut table, _) = table(1000.0);
        table.register_renderer("status", Box::new(Badge));
        let row = json!({"title": "Dune", "status": "x", "read": true});
        assert_eq!(table.cell_content(&row, "title"), CellContent::Text("Dune".into()));
        assert_eq!(
            table.cell_content(&row, "status"),
            CellContent::Custom("<span class=\"badge\">read</span>".into())
        );
        // Custom column without a renderer falls back to text
        assert_eq!(table.cell_content(&row, "actions"), CellContent::Text(String::new()));
    }

    #[test]
    fn test_sort_only_sortable_columns() {
        let (mut table, _) = table(1000.0);
        assert!(!table.sort_by("author"));
        assert!(table.sort_by("title"));
        assert_eq!(
            table.data().sort().map(|s| s.direction),
            Some(SortDirection::Ascending)
        );
        table.sort_by("title");
        table.sort_by("title");
        assert!(table.data().sort().is_none());
    }

    #[test]
    fn test_narrow_container_table_width_fixed() {
        let (mut table, _) = table(400.0);
        let plan = table.recompute().unwrap();
        assert_eq!(plan.table_width, TableWidth::Fixed(640.0));
    }
}
