//! `CfTable` - the WASM-exported grid component.
//!
//! This module wires the platform-neutral [`Table`] core to the browser:
//! - Builds the header/body DOM inside a host container
//! - Observes the body region with `ResizeObserver`, or window resize events
//!   where that is unavailable
//! - Mirrors body scroll onto the header
//! - Drives column resize from pointer events, one recompute per animation frame
//! - Forwards row actions and filter changes to JavaScript callbacks
//!
//! # Usage (JavaScript)
//!
//! ```javascript
//! import init, { CfTable } from 'cf-table';
//! await init();
//! const table = new CfTable(document.getElementById('books'));
//! table.setRowActionCallback(({ action, row }) => console.log(action, row));
//! table.setConfig({ columns: [{ key: 'title', label: 'Title', width: 200 }] });
//! table.setData(books);
//! ```

mod dom;
mod events;
mod host;

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use js_sys::{Function, Reflect};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use web_sys::{HtmlElement, ResizeObserver};

use crate::observe::{SizeSource, Trigger};
use crate::schedule::{Clock, TaskToken};
use crate::table::{CellContent, CellRenderer, Table};
use crate::types::{Column, TableConfig, TableOptions};

use dom::DomSurface;
use events::{DragListeners, Listener};

/// Milliseconds from the page's performance clock
pub(crate) fn now_ms() -> f64 {
    if let Some(window) = web_sys::window() {
        if let Some(perf) = window.performance() {
            return perf.now();
        }
    }
    js_sys::Date::now()
}

/// [`Clock`] backed by `performance.now()`
#[derive(Debug, Clone, Copy, Default)]
pub struct PerformanceClock;

impl Clock for PerformanceClock {
    fn now_ms(&self) -> f64 {
        now_ms()
    }
}

/// Cell renderer implemented by a JS function `(row, column) => html`
struct JsRenderer(Function);

impl CellRenderer for JsRenderer {
    fn render(&self, row: &serde_json::Value, column: &Column) -> String {
        let serializer = serde_wasm_bindgen::Serializer::json_compatible();
        let (Ok(row), Ok(column)) = (
            serde::Serialize::serialize(row, &serializer),
            serde::Serialize::serialize(column, &serializer),
        ) else {
            return String::new();
        };
        self.0
            .call2(&JsValue::NULL, &row, &column)
            .ok()
            .and_then(|value| value.as_string())
            .unwrap_or_default()
    }
}

/// Installed container size observation
enum SizeWatch {
    Observer {
        observer: ResizeObserver,
        _callback: Closure<dyn FnMut(JsValue)>,
    },
    Window(#[allow(dead_code)] Listener),
}

impl Drop for SizeWatch {
    fn drop(&mut self) {
        if let Self::Observer { observer, .. } = self {
            observer.disconnect();
        }
    }
}

/// Shared state that can be accessed by event handlers
pub(crate) struct SharedState {
    pub(crate) table: Table<DomSurface>,
    pub(crate) row_action_callback: Option<Function>,
    pub(crate) search_change_callback: Option<Function>,
    /// Armed `setTimeout` handles by trigger
    pub(crate) timers: HashMap<Trigger, (TaskToken, i32)>,
    pub(crate) timer_closure: Option<Closure<dyn FnMut(JsValue, JsValue)>>,
    /// Armed `requestAnimationFrame` handle
    pub(crate) frame: Option<(TaskToken, i32)>,
    pub(crate) frame_closure: Option<Closure<dyn FnMut(f64)>>,
    pub(crate) drag: Option<DragListeners>,
    /// Set when a drag ends so the click that follows it does not sort
    pub(crate) suppress_header_click: bool,
}

/// The grid component exported to JavaScript
#[wasm_bindgen]
pub struct CfTable {
    state: Rc<RefCell<SharedState>>,
    listeners: Vec<Listener>,
    size_watch: Option<SizeWatch>,
}

#[wasm_bindgen]
impl CfTable {
    /// Build the grid inside `container` and start observing it
    #[wasm_bindgen(constructor)]
    pub fn new(container: HtmlElement) -> Result<CfTable, JsValue> {
        console_error_panic_hook::set_once();

        let surface = DomSurface::build(&container)?;
        let state = Rc::new(RefCell::new(SharedState {
            table: Table::new(surface, PerformanceClock),
            row_action_callback: None,
            search_change_callback: None,
            timers: HashMap::new(),
            timer_closure: None,
            frame: None,
            frame_closure: None,
            drag: None,
            suppress_header_click: false,
        }));

        let listeners = Self::attach_listeners(&state);
        let native = web_sys::window().is_some_and(|window| {
            Reflect::has(window.as_ref(), &JsValue::from_str("ResizeObserver")).unwrap_or(false)
        });
        let source = state.borrow_mut().table.mount(native);
        let size_watch = source.and_then(|source| Self::watch_size(&state, source));
        Self::pump(&state);

        Ok(CfTable {
            state,
            listeners,
            size_watch,
        })
    }

    /// Install a column configuration; widths are re-initialized
    #[wasm_bindgen(js_name = setConfig)]
    pub fn set_config(&mut self, config: JsValue) -> Result<(), JsValue> {
        let config: TableConfig = serde_wasm_bindgen::from_value(config)
            .map_err(crate::error::CfTableError::from)?;
        config.validate()?;
        {
            let mut s = self.state.borrow_mut();
            let widths: Vec<String> = config
                .columns
                .iter()
                .map(|column| {
                    crate::layout::format_px(
                        column.configured_width_or(s.table.options().layout.default_width),
                    )
                })
                .collect();
            let surface = s.table.surface_mut();
            surface.configure(&config);
            surface.render_header(&config.columns, &widths)?;
            s.table.set_config(config)?;
        }
        Self::refresh_rows(&self.state);
        Ok(())
    }

    /// Replace the rows; an array of plain objects
    #[wasm_bindgen(js_name = setData)]
    pub fn set_data(&mut self, rows: JsValue) -> Result<(), JsValue> {
        let rows: Vec<serde_json::Value> = serde_wasm_bindgen::from_value(rows)
            .map_err(crate::error::CfTableError::from)?;
        if let Ok(mut s) = self.state.try_borrow_mut() {
            s.table.set_data(rows);
        }
        Self::refresh_rows(&self.state);
        Ok(())
    }

    /// Override widths and timings
    #[wasm_bindgen(js_name = setOptions)]
    pub fn set_options(&mut self, options: JsValue) -> Result<(), JsValue> {
        let options: TableOptions = serde_wasm_bindgen::from_value(options)
            .map_err(crate::error::CfTableError::from)?;
        if let Ok(mut s) = self.state.try_borrow_mut() {
            s.table.set_options(options);
            s.table.recompute();
        }
        Ok(())
    }

    #[wasm_bindgen(js_name = setLoading)]
    pub fn set_loading(&mut self, loading: bool) {
        if let Ok(mut s) = self.state.try_borrow_mut() {
            s.table.set_loading(loading);
            s.table.surface().set_loading(loading);
        }
    }

    /// Render cells of the custom column `key` with `renderer(row, column)`
    #[wasm_bindgen(js_name = registerRenderer)]
    pub fn register_renderer(&mut self, key: &str, renderer: Function) {
        if let Ok(mut s) = self.state.try_borrow_mut() {
            s.table.register_renderer(key, Box::new(JsRenderer(renderer)));
        }
        Self::refresh_rows(&self.state);
    }

    /// Called with `{ action, row }` when an element with `data-action` is clicked
    #[wasm_bindgen(js_name = setRowActionCallback)]
    pub fn set_row_action_callback(&mut self, callback: Option<Function>) {
        self.state.borrow_mut().row_action_callback = callback;
    }

    /// Called with the normalized filter text when the search input changes
    #[wasm_bindgen(js_name = setSearchChangeCallback)]
    pub fn set_search_change_callback(&mut self, callback: Option<Function>) {
        self.state.borrow_mut().search_change_callback = callback;
    }

    /// Filter rows as if `text` was typed into the search input
    #[wasm_bindgen(js_name = applyFilter)]
    pub fn apply_filter(&mut self, text: &str) {
        Self::apply_filter_value(&self.state, text);
    }

    /// Recompute column widths now
    pub fn recompute(&mut self) {
        if let Ok(mut s) = self.state.try_borrow_mut() {
            s.table.recompute();
        }
    }

    /// Displayed width of `key`, e.g. `"150px"`
    #[wasm_bindgen(js_name = columnWidth)]
    pub fn column_width(&self, key: &str) -> String {
        self.state.borrow().table.column_width(key)
    }

    #[wasm_bindgen(js_name = isResizing)]
    pub fn is_resizing(&self) -> bool {
        self.state.borrow().table.is_resizing()
    }

    /// Most recent layout as a plain object, or undefined before the first one
    #[wasm_bindgen(js_name = lastLayout)]
    pub fn last_layout(&self) -> Result<JsValue, JsValue> {
        let s = self.state.borrow();
        match s.table.last_plan() {
            Some(plan) => Ok(serde_wasm_bindgen::to_value(plan)
                .map_err(crate::error::CfTableError::from)?),
            None => Ok(JsValue::UNDEFINED),
        }
    }

    /// Stop observing, cancel pending work and remove the grid from the page
    pub fn destroy(&mut self) {
        self.teardown();
    }
}

impl CfTable {
    fn watch_size(state: &Rc<RefCell<SharedState>>, source: SizeSource) -> Option<SizeWatch> {
        let weak = Rc::downgrade(state);
        let on_resize = move || {
            if let Some(state) = weak.upgrade() {
                if let Ok(mut s) = state.try_borrow_mut() {
                    s.table.notify_container_resized();
                }
                CfTable::pump(&state);
            }
        };

        match source {
            SizeSource::ResizeObserver => {
                let callback = Closure::wrap(Box::new(move |_entries: JsValue| on_resize())
                    as Box<dyn FnMut(JsValue)>);
                let observer = ResizeObserver::new(callback.as_ref().unchecked_ref()).ok()?;
                observer.observe(state.borrow().table.surface().body_section());
                Some(SizeWatch::Observer {
                    observer,
                    _callback: callback,
                })
            }
            SizeSource::WindowResize => {
                let window = web_sys::window()?;
                Listener::attach(window.as_ref(), "resize", move |_event| on_resize())
                    .map(SizeWatch::Window)
            }
        }
    }

    /// Re-render the body and pagination from the table's current page
    pub(crate) fn refresh_rows(state: &Rc<RefCell<SharedState>>) {
        {
            let Ok(mut s) = state.try_borrow_mut() else {
                return;
            };
            let table = &mut s.table;
            let keys: Vec<String> = table
                .displayed_columns()
                .into_iter()
                .map(str::to_string)
                .collect();
            let rows: Vec<Vec<CellContent>> = table
                .visible_rows()
                .into_iter()
                .map(|row| keys.iter().map(|key| table.cell_content(row, key)).collect())
                .collect();
            let widths: Vec<String> = keys.iter().map(|key| table.column_width(key)).collect();
            let page = table.page();
            let paginated = table.data().is_paginated();
            let size_options = table
                .config()
                .map(|c| c.page_size_options.clone())
                .unwrap_or_default();
            let sort = table.data().sort().cloned();

            let surface = table.surface_mut();
            if let Err(e) = surface.render_body(&keys, &rows, &widths) {
                log::warn!("could not render rows: {e:?}");
            }
            if let Err(e) = surface.render_pagination(paginated, page, &size_options) {
                log::warn!("could not render pagination: {e:?}");
            }
            surface.show_sort(sort.as_ref());
            table.recompute();
        }
        Self::pump(state);
    }

    pub(crate) fn apply_filter_value(state: &Rc<RefCell<SharedState>>, text: &str) {
        if let Ok(mut s) = state.try_borrow_mut() {
            s.table.apply_filter(text);
        }
        Self::refresh_rows(state);
    }

    pub(crate) fn change_page(
        state: &Rc<RefCell<SharedState>>,
        change: impl FnOnce(&mut Table<DomSurface>) -> bool,
    ) {
        let changed = match state.try_borrow_mut() {
            Ok(mut s) => change(&mut s.table),
            Err(_) => false,
        };
        if changed {
            Self::refresh_rows(state);
        }
    }

    fn teardown(&mut self) {
        self.size_watch = None;
        self.listeners.clear();
        if let Ok(mut s) = self.state.try_borrow_mut() {
            s.table.teardown();
            // Host tasks are cleared wholesale below
            let _ = s.table.take_requests();
            Self::clear_host_tasks(&mut s);
            s.table.surface_mut().remove();
        }
    }
}

impl Drop for CfTable {
    fn drop(&mut self) {
        self.teardown();
    }
}
