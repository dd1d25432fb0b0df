//! Header/body horizontal scroll synchronization.
//!
//! The body region drives; the header region is never scrolled by the user.

/// Mirrors the body's horizontal scroll offset onto the detached header
#[derive(Debug, Clone, Default)]
pub struct ScrollSync {
    header_scroll_left: f64,
}

impl ScrollSync {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle a body scroll event.
    ///
    /// Returns the offset to write to the header when it differs from the
    /// last offset written, None otherwise.
    pub fn on_body_scroll(&mut self, body_scroll_left: f64) -> Option<f64> {
        if !body_scroll_left.is_finite() {
            return None;
        }
        if (body_scroll_left - self.header_scroll_left).abs() <= f64::EPSILON {
            return None;
        }
        self.header_scroll_left = body_scroll_left;
        Some(body_scroll_left)
    }

    /// Last offset written to the header
    pub fn header_scroll_left(&self) -> f64 {
        self.header_scroll_left
    }

    /// Forget the last written offset (the header was re-rendered)
    pub fn reset(&mut self) {
        self.header_scroll_left = 0.0;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn test_body_scroll_copied_to_header() {
        let mut sync = ScrollSync::new();
        assert_eq!(sync.on_body_scroll(120.0), Some(120.0));
        assert_eq!(sync.header_scroll_left(), 120.0);
        assert_eq!(sync.on_body_scroll(0.0), Some(0.0));
    }

    #[test]
    fn test_unchanged_offset_skipped() {
        let mut sync = ScrollSync::new();
        assert_eq!(sync.on_body_scroll(0.0), None);
        sync.on_body_scroll(42.5);
        assert_eq!(sync.on_body_scroll(42.5), None);
    }

    #[test]
    fn test_non_finite_ignored() {
        let mut sync = ScrollSync::new();
        assert_eq!(sync.on_body_scroll(f64::NAN), None);
        assert_eq!(sync.header_scroll_left(), 0.0);
    }
}
