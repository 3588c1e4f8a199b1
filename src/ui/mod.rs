//! UI components for mdpane
//!
//! This module contains the host-independent layout logic of the surface.

mod split;

pub use split::{
    ContainerBounds, DragHost, DragSession, DragState, NoopDragHost, PaneWidths,
    SplitLayoutController, SplitRatio, DIVIDER_THICKNESS,
};
