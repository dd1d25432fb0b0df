//! Layout engine for computing column widths and keeping the header aligned.
//!
//! This module handles:
//! - Per-column current/displayed width state
//! - Last-column filler width computation with scrollbar compensation
//! - One-directional header scroll synchronization
//! - The measurement/mutation seam to the rendered grid

mod columns;
mod engine;
mod scroll_sync;
mod surface;

pub use columns::{format_px, ColumnModel, WidthEntry, WidthState};
pub use engine::{ContainerMetrics, LastColumnFit, LayoutEngine, LayoutPlan, TableWidth};
pub use scroll_sync::ScrollSync;
pub use surface::{GridSurface, MemorySurface};
