//! The seam between the layout engine and whatever renders the grid.
//!
//! A surface measures the body region and applies computed widths. Every
//! measurement is optional: a surface whose regions are not rendered yet
//! returns None and the caller treats the operation as a no-op.

use super::engine::{ContainerMetrics, LayoutPlan};

/// Rendered grid as seen by the layout engine
pub trait GridSurface {
    /// Measure the scrollable body region; None if the header or body region
    /// is not rendered
    fn body_metrics(&self) -> Option<ContainerMetrics>;

    /// Write widths, fit classes, scrollbar compensation and table width.
    ///
    /// Must not resize the observed body region itself.
    fn apply_layout(&mut self, plan: &LayoutPlan);

    /// Current horizontal scroll offset of the body region
    fn body_scroll_left(&self) -> Option<f64>;

    /// Scroll the header region horizontally
    fn set_header_scroll_left(&mut self, offset: f64);
}

/// Headless surface with fixed measurements that records what was applied.
///
/// Used by the CLI and by native hosts that lay out without a DOM.
#[derive(Debug, Clone, Default)]
pub struct MemorySurface {
    pub metrics: Option<ContainerMetrics>,
    pub body_scroll_left: f64,
    pub header_scroll_left: f64,
    /// Last plan applied
    pub applied: Option<LayoutPlan>,
    /// Number of plans applied so far
    pub apply_count: usize,
}

impl MemorySurface {
    /// Surface whose regions are not rendered yet
    pub fn unmounted() -> Self {
        Self::default()
    }

    /// Surface with the given body measurements
    pub fn with_metrics(metrics: ContainerMetrics) -> Self {
        Self {
            metrics: Some(metrics),
            ..Self::default()
        }
    }
}

impl GridSurface for MemorySurface {
    fn body_metrics(&self) -> Option<ContainerMetrics> {
        self.metrics
    }

    fn apply_layout(&mut self, plan: &LayoutPlan) {
        self.applied = Some(plan.clone());
        self.apply_count += 1;
    }

    fn body_scroll_left(&self) -> Option<f64> {
        self.metrics.map(|_| self.body_scroll_left)
    }

    fn set_header_scroll_left(&mut self, offset: f64) {
        self.header_scroll_left = offset;
    }
}
