//! Bidirectional Sync Scrolling for the Source and Preview panes
//!
//! This module keeps the two panes of the surface visually aligned. It provides:
//!
//! - Scroll fraction computation from raw pane measurements
//! - Pluggable fraction mapping (proportional by default, line-aware optional)
//! - Bidirectional scroll synchronization
//! - Feedback loop prevention
//!
//! # Architecture
//!
//! The sync scrolling system uses a per-pane "expected echo" token to prevent
//! feedback loops. When the surface programmatically scrolls a pane it records
//! an echo for that pane; the next scroll event reported from that pane is
//! consumed instead of triggering a sync pass in the opposite direction.
//!
//! # Usage
//!
//! ```ignore
//! let mut sync = ScrollSynchronizer::new();
//!
//! // When the source pane scrolls
//! if let Some(target) = sync.on_scroll(ScrollOrigin::Source, &source_extent) {
//!     let offset = preview_extent.offset_for(target);
//!     // Apply offset to the preview pane, then:
//!     sync.expect_echo(ScrollOrigin::Preview);
//! }
//! ```

use log::debug;

use crate::markdown::LineHeightEstimate;

/// Clamp a fraction into [0, 1], mapping NaN to 0.
pub fn clamp_fraction(fraction: f32) -> f32 {
    if fraction.is_nan() {
        0.0
    } else {
        fraction.clamp(0.0, 1.0)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Scroll Extent
// ─────────────────────────────────────────────────────────────────────────────

/// Measurements of a scrollable pane, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScrollExtent {
    /// Current distance scrolled from the top
    pub scroll_top: f32,
    /// Total height of the scrollable content
    pub scroll_height: f32,
    /// Visible height of the pane
    pub client_height: f32,
}

impl ScrollExtent {
    /// Create a new extent.
    pub fn new(scroll_top: f32, scroll_height: f32, client_height: f32) -> Self {
        Self {
            scroll_top,
            scroll_height,
            client_height,
        }
    }

    /// Largest possible `scroll_top`; 0 when the content fits.
    pub fn max_scroll(&self) -> f32 {
        let max = self.scroll_height - self.client_height;
        if max.is_nan() || max <= 0.0 {
            0.0
        } else {
            max
        }
    }

    /// Whether the pane cannot scroll at all.
    pub fn is_degenerate(&self) -> bool {
        self.max_scroll() <= 0.0
    }

    /// Current scroll position as a fraction in [0, 1].
    pub fn fraction(&self) -> f32 {
        let max = self.max_scroll();
        if max <= 0.0 {
            return 0.0;
        }
        clamp_fraction(self.scroll_top / max)
    }

    /// `scroll_top` that places this pane at `fraction`.
    pub fn offset_for(&self, fraction: f32) -> f32 {
        clamp_fraction(fraction) * self.max_scroll()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Scroll Origin
// ─────────────────────────────────────────────────────────────────────────────

/// Pane a scroll event came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollOrigin {
    /// The raw markdown editor
    Source,
    /// The rendered preview
    Preview,
}

impl ScrollOrigin {
    /// The pane that follows this one.
    pub fn opposite(self) -> Self {
        match self {
            ScrollOrigin::Source => ScrollOrigin::Preview,
            ScrollOrigin::Preview => ScrollOrigin::Source,
        }
    }

    fn index(self) -> usize {
        match self {
            ScrollOrigin::Source => 0,
            ScrollOrigin::Preview => 1,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Mapping Strategies
// ─────────────────────────────────────────────────────────────────────────────

/// Strategy translating a scroll fraction from one pane to the other.
///
/// Inputs are already clamped to [0, 1]; outputs are clamped again by the
/// synchronizer.
pub trait ScrollMapping: std::fmt::Debug {
    /// Preview fraction for a source fraction.
    fn source_to_preview(&self, source_fraction: f32) -> f32;
    /// Source fraction for a preview fraction.
    fn preview_to_source(&self, preview_fraction: f32) -> f32;
}

/// Same fraction in both panes.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProportionalMapping;

impl ScrollMapping for ProportionalMapping {
    fn source_to_preview(&self, source_fraction: f32) -> f32 {
        source_fraction
    }

    fn preview_to_source(&self, preview_fraction: f32) -> f32 {
        preview_fraction
    }
}

/// Mapping that accounts for lines rendering taller than others.
///
/// The source pane is treated as uniform lines; the preview is treated as the
/// cumulative estimated heights from a [`LineHeightEstimate`]. A source
/// fraction picks a (fractional) top line, whose estimated offset becomes the
/// preview fraction. The inverse walks the same piecewise-linear curve back.
#[derive(Debug, Clone)]
pub struct LineAwareMapping {
    estimate: LineHeightEstimate,
}

impl LineAwareMapping {
    /// Create a mapping from a document's height estimate.
    pub fn new(estimate: LineHeightEstimate) -> Self {
        Self { estimate }
    }

    /// Estimated units spanned by `line`.
    fn span(&self, line: usize) -> (f32, f32) {
        let start = self.estimate.offset(line);
        let end = if line + 1 < self.estimate.line_count() {
            self.estimate.offset(line + 1)
        } else {
            self.estimate.total()
        };
        (start as f32, end as f32)
    }
}

impl ScrollMapping for LineAwareMapping {
    fn source_to_preview(&self, source_fraction: f32) -> f32 {
        let total = self.estimate.total() as f32;
        if total <= 0.0 {
            return source_fraction;
        }
        let lines = self.estimate.line_count();
        let position = source_fraction * lines as f32;
        let line = (position.floor() as usize).min(lines - 1);
        let within = (position - line as f32).clamp(0.0, 1.0);
        let (start, end) = self.span(line);
        (start + within * (end - start)) / total
    }

    fn preview_to_source(&self, preview_fraction: f32) -> f32 {
        let total = self.estimate.total() as f32;
        if total <= 0.0 {
            return preview_fraction;
        }
        let units = preview_fraction * total;
        let line = self.estimate.line_at_offset(units);
        let (start, end) = self.span(line);
        let within = if end > start {
            ((units - start) / (end - start)).clamp(0.0, 1.0)
        } else {
            0.0
        };
        (line as f32 + within) / self.estimate.line_count() as f32
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Scroll Synchronizer
// ─────────────────────────────────────────────────────────────────────────────

/// State machine for managing synchronized scrolling between panes.
#[derive(Debug)]
pub struct ScrollSynchronizer {
    /// Whether sync scrolling is enabled
    enabled: bool,
    /// Active mapping strategy
    mapping: Box<dyn ScrollMapping>,
    /// Pending programmatic scroll per pane, indexed by `ScrollOrigin::index`
    expected_echo: [bool; 2],
    /// Pane that initiated the last synced scroll
    last_origin: Option<ScrollOrigin>,
}

impl Default for ScrollSynchronizer {
    fn default() -> Self {
        Self::new()
    }
}

impl ScrollSynchronizer {
    /// Create an enabled synchronizer with proportional mapping.
    pub fn new() -> Self {
        Self {
            enabled: true,
            mapping: Box::new(ProportionalMapping),
            expected_echo: [false; 2],
            last_origin: None,
        }
    }

    /// Replace the mapping strategy.
    pub fn set_mapping(&mut self, mapping: Box<dyn ScrollMapping>) {
        debug!("Scroll mapping set to {:?}", mapping);
        self.mapping = mapping;
    }

    /// Set whether sync scrolling is enabled.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        if !enabled {
            self.clear_echoes();
        }
    }

    /// Toggle sync scrolling on/off.
    pub fn toggle(&mut self) -> bool {
        self.set_enabled(!self.enabled);
        self.enabled
    }

    /// Whether sync scrolling is enabled.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Pane that initiated the last synced scroll.
    pub fn last_origin(&self) -> Option<ScrollOrigin> {
        self.last_origin
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Fraction Mapping
    // ─────────────────────────────────────────────────────────────────────────

    /// Preview fraction for the source pane at `source_fraction`.
    pub fn from_source(&self, source_fraction: f32, source_extent: &ScrollExtent) -> f32 {
        if source_extent.is_degenerate() {
            return 0.0;
        }
        clamp_fraction(self.mapping.source_to_preview(clamp_fraction(source_fraction)))
    }

    /// Source fraction for the preview pane at `preview_fraction`.
    pub fn from_preview(&self, preview_fraction: f32, preview_extent: &ScrollExtent) -> f32 {
        if preview_extent.is_degenerate() {
            return 0.0;
        }
        clamp_fraction(self.mapping.preview_to_source(clamp_fraction(preview_fraction)))
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Feedback Loop Prevention
    // ─────────────────────────────────────────────────────────────────────────

    /// Record that `pane` is about to be scrolled programmatically.
    pub fn expect_echo(&mut self, pane: ScrollOrigin) {
        self.expected_echo[pane.index()] = true;
    }

    /// Whether an echo is pending for `pane`.
    pub fn is_echo_pending(&self, pane: ScrollOrigin) -> bool {
        self.expected_echo[pane.index()]
    }

    /// Drop all pending echoes.
    pub fn clear_echoes(&mut self) {
        self.expected_echo = [false; 2];
    }

    /// Handle a scroll event reported by `origin`.
    ///
    /// Returns the fraction the opposite pane should move to, or `None` when
    /// the event is an echo of a programmatic scroll or syncing is off.
    pub fn on_scroll(&mut self, origin: ScrollOrigin, extent: &ScrollExtent) -> Option<f32> {
        if std::mem::take(&mut self.expected_echo[origin.index()]) {
            debug!("Consumed scroll echo from {:?}", origin);
            return None;
        }
        if !self.enabled {
            return None;
        }

        self.last_origin = Some(origin);
        let fraction = extent.fraction();
        Some(match origin {
            ScrollOrigin::Source => self.from_source(fraction, extent),
            ScrollOrigin::Preview => self.from_preview(fraction, extent),
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn extent(top: f32) -> ScrollExtent {
        ScrollExtent::new(top, 1000.0, 200.0)
    }

    #[test]
    fn test_synchronizer_new() {
        let sync = ScrollSynchronizer::new();
        assert!(sync.is_enabled());
        assert_eq!(sync.last_origin(), None);
        assert!(!sync.is_echo_pending(ScrollOrigin::Source));
        assert!(!sync.is_echo_pending(ScrollOrigin::Preview));
    }

    #[test]
    fn test_toggle_sync() {
        let mut sync = ScrollSynchronizer::new();
        assert!(!sync.toggle());
        assert!(!sync.is_enabled());
        assert!(sync.toggle());
        assert!(sync.is_enabled());
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Extent Tests
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_extent_fraction() {
        assert_eq!(extent(0.0).fraction(), 0.0);
        assert_eq!(extent(400.0).fraction(), 0.5);
        assert_eq!(extent(800.0).fraction(), 1.0);
        assert_eq!(extent(5000.0).fraction(), 1.0);
        assert_eq!(extent(-10.0).fraction(), 0.0);
    }

    #[test]
    fn test_degenerate_extent() {
        let fits = ScrollExtent::new(0.0, 200.0, 200.0);
        assert!(fits.is_degenerate());
        assert_eq!(fits.max_scroll(), 0.0);
        assert_eq!(fits.fraction(), 0.0);
        assert_eq!(ScrollExtent::new(0.0, 100.0, 200.0).fraction(), 0.0);
        assert_eq!(ScrollExtent::new(f32::NAN, f32::NAN, 1.0).fraction(), 0.0);
    }

    #[test]
    fn test_offset_for() {
        let e = extent(0.0);
        assert_eq!(e.offset_for(0.5), 400.0);
        assert_eq!(e.offset_for(2.0), 800.0);
        assert_eq!(e.offset_for(f32::NAN), 0.0);
    }

    #[test]
    fn test_clamp_fraction() {
        assert_eq!(clamp_fraction(-1.0), 0.0);
        assert_eq!(clamp_fraction(0.25), 0.25);
        assert_eq!(clamp_fraction(7.0), 1.0);
        assert_eq!(clamp_fraction(f32::NAN), 0.0);
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Mapping Tests
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_proportional_mapping() {
        let sync = ScrollSynchronizer::new();
        assert_eq!(sync.from_source(0.3, &extent(240.0)), 0.3);
        assert_eq!(sync.from_preview(0.75, &extent(600.0)), 0.75);
        assert_eq!(sync.from_source(1.5, &extent(0.0)), 1.0);
    }

    #[test]
    fn test_degenerate_source_maps_to_zero() {
        let sync = ScrollSynchronizer::new();
        let fits = ScrollExtent::new(0.0, 100.0, 100.0);
        assert_eq!(sync.from_source(0.8, &fits), 0.0);
        assert_eq!(sync.from_preview(0.8, &fits), 0.0);
    }

    #[test]
    fn test_line_aware_mapping() {
        // Heading weighs 2 units, three ordinary lines weigh 1 each: total 5
        let estimate = LineHeightEstimate::from_text("# Title\na\nb\nc");
        let mapping = LineAwareMapping::new(estimate);

        assert_eq!(mapping.source_to_preview(0.0), 0.0);
        assert_eq!(mapping.source_to_preview(1.0), 1.0);
        // Top of line 1 is 1/4 of the source but 2/5 of the preview
        assert!((mapping.source_to_preview(0.25) - 0.4).abs() < 1e-6);
        assert!((mapping.preview_to_source(0.4) - 0.25).abs() < 1e-6);
        assert!((mapping.preview_to_source(1.0) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_set_mapping() {
        let mut sync = ScrollSynchronizer::new();
        sync.set_mapping(Box::new(LineAwareMapping::new(
            LineHeightEstimate::from_text("# Title\na\nb\nc"),
        )));
        assert!((sync.from_source(0.25, &extent(0.0)) - 0.4).abs() < 1e-6);
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Event Tests
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_on_scroll_returns_target() {
        let mut sync = ScrollSynchronizer::new();
        assert_eq!(sync.on_scroll(ScrollOrigin::Source, &extent(400.0)), Some(0.5));
        assert_eq!(sync.last_origin(), Some(ScrollOrigin::Source));
        assert_eq!(sync.on_scroll(ScrollOrigin::Preview, &extent(200.0)), Some(0.25));
        assert_eq!(sync.last_origin(), Some(ScrollOrigin::Preview));
    }

    #[test]
    fn test_echo_is_consumed_once() {
        let mut sync = ScrollSynchronizer::new();
        assert!(sync.on_scroll(ScrollOrigin::Source, &extent(400.0)).is_some());

        sync.expect_echo(ScrollOrigin::Preview);
        assert!(sync.is_echo_pending(ScrollOrigin::Preview));
        assert_eq!(sync.on_scroll(ScrollOrigin::Preview, &extent(400.0)), None);

        // A later genuine scroll on the preview syncs again
        assert_eq!(sync.on_scroll(ScrollOrigin::Preview, &extent(800.0)), Some(1.0));
    }

    #[test]
    fn test_echo_does_not_block_other_pane() {
        let mut sync = ScrollSynchronizer::new();
        sync.expect_echo(ScrollOrigin::Preview);
        assert_eq!(sync.on_scroll(ScrollOrigin::Source, &extent(0.0)), Some(0.0));
        assert!(sync.is_echo_pending(ScrollOrigin::Preview));
    }

    #[test]
    fn test_disabled_sync_reports_none() {
        let mut sync = ScrollSynchronizer::new();
        sync.expect_echo(ScrollOrigin::Source);
        sync.set_enabled(false);
        assert!(!sync.is_echo_pending(ScrollOrigin::Source));
        assert_eq!(sync.on_scroll(ScrollOrigin::Source, &extent(400.0)), None);
        assert_eq!(sync.last_origin(), None);
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn fractions_stay_in_unit_range(
                top in -1.0e6f32..1.0e6,
                height in -1.0e6f32..1.0e6,
                client in -1.0e6f32..1.0e6,
                fraction in -10.0f32..10.0,
            ) {
                let e = ScrollExtent::new(top, height, client);
                let sync = ScrollSynchronizer::new();
                let values = [
                    e.fraction(),
                    sync.from_source(fraction, &e),
                    sync.from_preview(fraction, &e),
                ];
                for value in values {
                    prop_assert!((0.0..=1.0).contains(&value));
                }
            }

            #[test]
            fn degenerate_extents_yield_zero(
                client in 0.0f32..1.0e6,
                shortfall in 0.0f32..1.0e6,
                top in -1.0e6f32..1.0e6,
                fraction in 0.0f32..1.0,
            ) {
                let e = ScrollExtent::new(top, client - shortfall, client);
                let sync = ScrollSynchronizer::new();
                prop_assert_eq!(e.fraction(), 0.0);
                prop_assert_eq!(sync.from_source(fraction, &e), 0.0);
                prop_assert_eq!(sync.from_preview(fraction, &e), 0.0);
            }

            #[test]
            fn line_aware_mapping_stays_in_unit_range(
                text in "[#a` \n]{0,80}",
                fraction in 0.0f32..=1.0,
            ) {
                let mapping = LineAwareMapping::new(LineHeightEstimate::from_text(&text));
                let forward = mapping.source_to_preview(fraction);
                let backward = mapping.preview_to_source(fraction);
                prop_assert!((0.0..=1.0 + 1e-5).contains(&forward));
                prop_assert!((0.0..=1.0 + 1e-5).contains(&backward));
            }
        }
    }
}
