//! Resizable split between the editor and preview panes.
//!
//! The controller is a two-state machine (`Idle`, `Dragging`) over a clamped
//! [`SplitRatio`]. A drag session begins when the pointer goes down on the
//! divider and ends on pointer-up, on [`SplitLayoutController::teardown`], or
//! when the controller is dropped. While a session is active the host is asked
//! to show the resize affordance (cursor shape, no text selection, pointer
//! capture) through [`DragHost`].
//!
//! ## Usage
//!
//! ```ignore
//! let mut split = SplitLayoutController::new(SplitRatio::default());
//! if split.pointer_down(event.x, container_bounds) {
//!     // swallow the event
//! }
//! if let Some(ratio) = split.pointer_move(event.x) {
//!     apply_widths(split.layout(container_bounds.width));
//! }
//! split.pointer_up();
//! ```

use log::debug;

/// Default divider thickness in logical pixels.
pub const DIVIDER_THICKNESS: f32 = 6.0;

/// Extra grab area on each side of the divider.
const DIVIDER_GRAB_MARGIN: f32 = 2.0;

// ─────────────────────────────────────────────────────────────────────────────
// Split Ratio
// ─────────────────────────────────────────────────────────────────────────────

/// Percentage width of the left pane, always within
/// [`SplitRatio::MIN`]..=[`SplitRatio::MAX`].
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct SplitRatio(f32);

impl SplitRatio {
    /// Smallest allowed left pane percentage.
    pub const MIN: f32 = 20.0;
    /// Largest allowed left pane percentage.
    pub const MAX: f32 = 80.0;
    /// Even split.
    pub const DEFAULT: f32 = 50.0;

    /// Create a ratio, clamping into range. NaN becomes the default.
    pub fn new(percent: f32) -> Self {
        if percent.is_nan() {
            Self(Self::DEFAULT)
        } else {
            Self(percent.clamp(Self::MIN, Self::MAX))
        }
    }

    /// Left pane percentage.
    pub fn value(self) -> f32 {
        self.0
    }

    /// Right pane percentage.
    pub fn right(self) -> f32 {
        100.0 - self.0
    }
}

impl Default for SplitRatio {
    fn default() -> Self {
        Self(Self::DEFAULT)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Geometry
// ─────────────────────────────────────────────────────────────────────────────

/// Horizontal bounds of the split container, measured by the host.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ContainerBounds {
    /// X coordinate of the container's left edge
    pub left: f32,
    /// Container width
    pub width: f32,
}

impl ContainerBounds {
    /// Create new bounds.
    pub fn new(left: f32, width: f32) -> Self {
        Self { left, width }
    }

    /// Whether the bounds can produce a ratio.
    pub fn is_usable(&self) -> bool {
        self.width > 0.0 && self.left.is_finite() && self.width.is_finite()
    }
}

/// Pixel widths for the two panes and the divider between them.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PaneWidths {
    /// Editor pane width
    pub left: f32,
    /// Divider width
    pub divider: f32,
    /// Preview pane width
    pub right: f32,
}

// ─────────────────────────────────────────────────────────────────────────────
// Drag Host
// ─────────────────────────────────────────────────────────────────────────────

/// Host-side effects of an active resize.
pub trait DragHost {
    /// Show the resize cursor, suppress selection, capture the pointer.
    fn begin_resize(&mut self);
    /// Undo everything `begin_resize` did.
    fn end_resize(&mut self);
}

/// Host without any resize affordance (headless use).
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopDragHost;

impl DragHost for NoopDragHost {
    fn begin_resize(&mut self) {}
    fn end_resize(&mut self) {}
}

// ─────────────────────────────────────────────────────────────────────────────
// Controller
// ─────────────────────────────────────────────────────────────────────────────

/// An active drag, alive only while `Dragging`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragSession {
    /// Container bounds captured when the drag began
    pub bounds: ContainerBounds,
}

/// State of the split controller.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum DragState {
    /// No drag in progress
    #[default]
    Idle,
    /// Pointer is held on the divider
    Dragging(DragSession),
}

/// State machine for resizing the editor/preview split.
pub struct SplitLayoutController {
    ratio: SplitRatio,
    state: DragState,
    host: Box<dyn DragHost>,
    divider_thickness: f32,
}

impl std::fmt::Debug for SplitLayoutController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SplitLayoutController")
            .field("ratio", &self.ratio)
            .field("state", &self.state)
            .field("divider_thickness", &self.divider_thickness)
            .finish()
    }
}

impl Default for SplitLayoutController {
    fn default() -> Self {
        Self::new(SplitRatio::default())
    }
}

impl SplitLayoutController {
    /// Create an idle controller without a drag host.
    pub fn new(ratio: SplitRatio) -> Self {
        Self::with_host(ratio, Box::new(NoopDragHost))
    }

    /// Create an idle controller that drives `host` during drags.
    pub fn with_host(ratio: SplitRatio, host: Box<dyn DragHost>) -> Self {
        Self {
            ratio,
            state: DragState::Idle,
            host,
            divider_thickness: DIVIDER_THICKNESS,
        }
    }

    /// Override the divider thickness (negative values become 0).
    pub fn with_divider_thickness(mut self, thickness: f32) -> Self {
        self.divider_thickness = if thickness.is_nan() { 0.0 } else { thickness.max(0.0) };
        self
    }

    /// Current split ratio.
    pub fn ratio(&self) -> SplitRatio {
        self.ratio
    }

    /// Current drag state.
    pub fn state(&self) -> DragState {
        self.state
    }

    /// Check if a drag is in progress.
    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging(_))
    }

    /// Divider thickness in pixels.
    pub fn divider_thickness(&self) -> f32 {
        self.divider_thickness
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Pointer Events
    // ─────────────────────────────────────────────────────────────────────────

    /// Start a drag if `pointer_x` hits the divider. Returns whether one started.
    pub fn pointer_down(&mut self, pointer_x: f32, bounds: ContainerBounds) -> bool {
        if self.is_dragging() || !self.hits_divider(pointer_x, bounds) {
            return false;
        }
        self.begin_drag(bounds);
        true
    }

    /// Start a drag without hit-testing. Ignored while already dragging.
    pub fn begin_drag(&mut self, bounds: ContainerBounds) {
        if self.is_dragging() {
            return;
        }
        debug!("Split drag started (ratio {:.1})", self.ratio.value());
        self.state = DragState::Dragging(DragSession { bounds });
        self.host.begin_resize();
    }

    /// Update the ratio from the pointer position while dragging.
    ///
    /// Returns the new ratio, or `None` when idle or the bounds are unusable.
    pub fn pointer_move(&mut self, pointer_x: f32) -> Option<SplitRatio> {
        let DragState::Dragging(session) = self.state else {
            return None;
        };
        let bounds = session.bounds;
        if !bounds.is_usable() || pointer_x.is_nan() {
            return None;
        }
        self.ratio = SplitRatio::new(100.0 * (pointer_x - bounds.left) / bounds.width);
        Some(self.ratio)
    }

    /// End the drag, if any.
    pub fn pointer_up(&mut self) {
        self.end_drag();
    }

    /// Release any active session. Later pointer events are no-ops until the
    /// next `pointer_down`.
    pub fn teardown(&mut self) {
        self.end_drag();
    }

    fn end_drag(&mut self) {
        if let DragState::Dragging(_) = std::mem::take(&mut self.state) {
            debug!("Split drag ended (ratio {:.1})", self.ratio.value());
            self.host.end_resize();
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Layout
    // ─────────────────────────────────────────────────────────────────────────

    /// Pane widths for a container `container_width` pixels wide.
    pub fn layout(&self, container_width: f32) -> PaneWidths {
        if container_width.is_nan() || container_width <= 0.0 {
            return PaneWidths::default();
        }
        let divider = self.divider_thickness.min(container_width);
        let available = container_width - divider;
        let left = available * self.ratio.value() / 100.0;
        PaneWidths {
            left,
            divider,
            right: available - left,
        }
    }

    /// Check whether `pointer_x` lies on the divider within `bounds`.
    pub fn hits_divider(&self, pointer_x: f32, bounds: ContainerBounds) -> bool {
        if !bounds.is_usable() {
            return false;
        }
        let widths = self.layout(bounds.width);
        let start = bounds.left + widths.left - DIVIDER_GRAB_MARGIN;
        let end = bounds.left + widths.left + widths.divider + DIVIDER_GRAB_MARGIN;
        pointer_x >= start && pointer_x <= end
    }
}

impl Drop for SplitLayoutController {
    fn drop(&mut self) {
        self.end_drag();
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
