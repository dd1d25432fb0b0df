//! cf-table - data-grid layout engine for the web
//!
//! Keeps a grid's header and body columns aligned while the container
//! resizes, rows arrive and the user drags column borders:
//! - Configured widths for every column but the last, which fills the
//!   remaining space (never below 150px)
//! - Vertical scrollbar compensation so header and body line up
//! - Header scroll follows body scroll
//! - Drag-to-resize with one recompute per animation frame
//! - Filtering, sorting and pagination of opaque JSON rows
//!
//! The core ([`Table`]) is platform-neutral and runs natively against a
//! [`GridSurface`]; on `wasm32` the [`viewer`] module drives a DOM grid.
//!
//! # Usage (Rust)
//!
//! ```
//! use cf_table::{Column, ContainerMetrics, ManualClock, MemorySurface, Table, TableConfig};
//!
//! let surface = MemorySurface::with_metrics(ContainerMetrics::new(1000.0, 400.0));
//! let mut table = Table::new(surface, ManualClock::new());
//! table
//!     .set_config(TableConfig::new(vec![
//!         Column::new("title", "Title").with_width(200.0),
//!         Column::new("actions", "Actions"),
//!     ]))
//!     .ok();
//! let plan = table.recompute().map(|p| p.total_width);
//! assert_eq!(plan, Some(1000.0));
//! ```

pub mod data;
pub mod error;
pub mod layout;
pub mod observe;
pub mod resize;
pub mod schedule;
pub mod table;
pub mod types;

#[cfg(target_arch = "wasm32")]
pub mod viewer;

use wasm_bindgen::prelude::*;

pub use data::{DataSource, PageState, SortDirection, SortState};
pub use error::{CfTableError, Result};
pub use layout::{
    ColumnModel, ContainerMetrics, GridSurface, LastColumnFit, LayoutEngine, LayoutPlan,
    MemorySurface, ScrollSync, TableWidth,
};
pub use observe::{ObservationLoop, SizeSource, Trigger};
pub use resize::{ResizeController, SessionId};
pub use schedule::{Clock, ManualClock, TaskToken};
#[cfg(not(target_arch = "wasm32"))]
pub use schedule::SystemClock;
pub use table::{CellContent, CellRenderer, HostRequest, Table};
pub use types::*;

#[cfg(target_arch = "wasm32")]
pub use viewer::CfTable;

/// Lay out `config` (JSON) for a container of the given size and return the
/// plan as JSON. Stateless; meant for hosts that render the grid themselves.
///
/// # Errors
/// Returns an error if the config is malformed or invalid.
#[wasm_bindgen(js_name = layoutJson)]
pub fn layout_json(
    config: &str,
    client_width: f32,
    client_height: f32,
    scroll_height: f32,
) -> std::result::Result<String, JsValue> {
    compute_layout_json(config, client_width, client_height, scroll_height)
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

fn compute_layout_json(
    config: &str,
    client_width: f32,
    client_height: f32,
    scroll_height: f32,
) -> Result<String> {
    let config = TableConfig::from_json(config)?;
    let columns = ColumnModel::initialize(&config.columns, &LayoutOptions::default());
    let metrics = ContainerMetrics::new(client_width, client_height).with_scroll_height(scroll_height);
    let plan = LayoutEngine::default().compute(&columns, &metrics);
    Ok(serde_json::to_string(&plan)?)
}

/// Get the library version
#[must_use]
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
