//! Preview and sync scrolling module
//!
//! This module provides synchronized scrolling between the source editor and
//! the rendered preview, allowing users to see corresponding content in both panes.

mod sync_scroll;

pub use sync_scroll::{
    clamp_fraction, LineAwareMapping, ProportionalMapping, ScrollExtent, ScrollMapping,
    ScrollOrigin, ScrollSynchronizer,
};
