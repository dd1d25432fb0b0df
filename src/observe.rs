//! Recompute triggers: container resizes and post-change settle delays.
//!
//! Each trigger owns a debounced slot, so a burst of the same trigger yields
//! a single recompute once the burst is over. Settle delays after mount, data
//! load and page changes give the host time to commit its layout before
//! widths are measured; recomputing more often than needed is harmless.

use serde::Serialize;

use crate::schedule::{Debouncer, Scheduled, TaskToken};
use crate::types::Timings;

/// Why a recompute was scheduled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Trigger {
    /// First layout after the grid is mounted
    Mount,
    /// New rows (or a new filter) changed the body content
    DataLoaded,
    /// Pagination changed the row count
    PageChanged,
    /// The observed container changed size
    Resized,
}

impl Trigger {
    pub const ALL: [Trigger; 4] = [
        Trigger::Mount,
        Trigger::DataLoaded,
        Trigger::PageChanged,
        Trigger::Resized,
    ];

    /// Stable name used at the JS boundary
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Mount => "mount",
            Self::DataLoaded => "dataLoaded",
            Self::PageChanged => "pageChanged",
            Self::Resized => "resized",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == name)
    }
}

/// How container size changes are observed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SizeSource {
    /// Native element resize observation of the body region
    ResizeObserver,
    /// Coarser window resize events, when native observation is unavailable
    WindowResize,
}

/// Debounced recompute scheduling for every [`Trigger`]
#[derive(Debug)]
pub struct ObservationLoop {
    mount: Debouncer,
    data: Debouncer,
    page: Debouncer,
    resize: Debouncer,
    source: Option<SizeSource>,
}

impl Default for ObservationLoop {
    fn default() -> Self {
        Self::new(&Timings::default())
    }
}

impl ObservationLoop {
    pub fn new(timings: &Timings) -> Self {
        Self {
            mount: Debouncer::new(timings.mount_settle_ms),
            data: Debouncer::new(timings.data_settle_ms),
            page: Debouncer::new(timings.page_settle_ms),
            resize: Debouncer::new(timings.resize_debounce_ms),
            source: None,
        }
    }

    /// Apply new delays; pending tasks keep their original due time
    pub fn set_timings(&mut self, timings: &Timings) {
        self.mount.set_delay_ms(timings.mount_settle_ms);
        self.data.set_delay_ms(timings.data_settle_ms);
        self.page.set_delay_ms(timings.page_settle_ms);
        self.resize.set_delay_ms(timings.resize_debounce_ms);
    }

    fn slot(&mut self, trigger: Trigger) -> &mut Debouncer {
        match trigger {
            Trigger::Mount => &mut self.mount,
            Trigger::DataLoaded => &mut self.data,
            Trigger::PageChanged => &mut self.page,
            Trigger::Resized => &mut self.resize,
        }
    }

    /// Start observing. Picks the size source and schedules the mount settle.
    pub fn mount(&mut self, native_observer_available: bool, now_ms: f64) -> (SizeSource, Scheduled) {
        let source = if native_observer_available {
            SizeSource::ResizeObserver
        } else {
            log::warn!("element resize observation unavailable, falling back to window resize");
            SizeSource::WindowResize
        };
        self.source = Some(source);
        (source, self.mount.notify(now_ms))
    }

    /// Currently installed size source, None before mount or after teardown
    pub fn source(&self) -> Option<SizeSource> {
        self.source
    }

    /// Schedule (or push back) a recompute for `trigger`
    pub fn notify(&mut self, trigger: Trigger, now_ms: f64) -> Scheduled {
        self.slot(trigger).notify(now_ms)
    }

    /// Timer for `trigger` fired; false if `token` is stale
    pub fn fire(&mut self, trigger: Trigger, token: TaskToken) -> bool {
        let fired = self.slot(trigger).fire(token);
        if fired {
            log::trace!("recompute trigger fired: {}", trigger.as_str());
        }
        fired
    }

    /// Consume every trigger due at `now_ms`
    pub fn poll(&mut self, now_ms: f64) -> Vec<Trigger> {
        Trigger::ALL
            .into_iter()
            .filter(|&t| self.slot(t).poll(now_ms))
            .collect()
    }

    /// Earliest due time among pending triggers
    pub fn next_due_ms(&self) -> Option<f64> {
        [&self.mount, &self.data, &self.page, &self.resize]
            .into_iter()
            .filter_map(Debouncer::due_ms)
            .reduce(f64::min)
    }

    pub fn is_pending(&self, trigger: Trigger) -> bool {
        match trigger {
            Trigger::Mount => self.mount.is_pending(),
            Trigger::DataLoaded => self.data.is_pending(),
            Trigger::PageChanged => self.page.is_pending(),
            Trigger::Resized => self.resize.is_pending(),
        }
    }

    /// Cancel every pending trigger and stop observing.
    ///
    /// Returns the cancelled tasks so the host can clear its timers.
    pub fn teardown(&mut self) -> Vec<(Trigger, TaskToken)> {
        self.source = None;
        Trigger::ALL
            .into_iter()
            .filter_map(|t| self.slot(t).cancel().map(|token| (t, token)))
            .collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn test_mount_prefers_native_observer() {
        let mut obs = ObservationLoop::default();
        let (source, task) = obs.mount(true, 0.0);
        assert_eq!(source, SizeSource::ResizeObserver);
        assert_eq!(task.delay_ms, 200.0);
        assert!(obs.is_pending(Trigger::Mount));
    }

    #[test]
    fn test_mount_falls_back_to_window_resize() {
        let mut obs = ObservationLoop::default();
        let (source, _) = obs.mount(false, 0.0);
        assert_eq!(source, SizeSource::WindowResize);
        assert_eq!(obs.source(), Some(SizeSource::WindowResize));
    }

    #[test]
    fn test_resize_storm_debounced() {
        let mut obs = ObservationLoop::default();
        let mut last = None;
        for i in 0..10 {
            last = Some(obs.notify(Trigger::Resized, f64::from(i) * 20.0));
        }
        let last = last.unwrap();
        assert_eq!(obs.poll(300.0), Vec::<Trigger>::new());
        assert_eq!(obs.poll(330.0), vec![Trigger::Resized]);
        assert!(!obs.fire(Trigger::Resized, last.token));
    }

    #[test]
    fn test_triggers_are_independent() {
        let mut obs = ObservationLoop::default();
        obs.mount(true, 0.0);
        obs.notify(Trigger::DataLoaded, 0.0);
        obs.notify(Trigger::PageChanged, 0.0);
        assert_eq!(obs.next_due_ms(), Some(50.0));
        assert_eq!(obs.poll(100.0), vec![Trigger::DataLoaded, Trigger::PageChanged]);
        assert_eq!(obs.poll(200.0), vec![Trigger::Mount]);
    }

    #[test]
    fn test_teardown_cancels_everything() {
        let mut obs = ObservationLoop::default();
        let (_, mount) = obs.mount(true, 0.0);
        let resize = obs.notify(Trigger::Resized, 0.0);
        let cancelled = obs.teardown();
        assert_eq!(
            cancelled,
            vec![(Trigger::Mount, mount.token), (Trigger::Resized, resize.token)]
        );
        assert!(obs.source().is_none());
        assert!(!obs.fire(Trigger::Mount, mount.token));
        assert!(obs.poll(f64::MAX).is_empty());
    }

    #[test]
    fn test_trigger_names_round_trip() {
        for t in Trigger::ALL {
            assert_eq!(Trigger::from_name(t.as_str()), Some(t));
        }
        assert_eq!(Trigger::from_name("nope"), None);
    }
}
