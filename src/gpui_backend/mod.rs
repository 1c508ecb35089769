//! GPUI integration for timeline charts.
//!
//! This module provides a GPUI view that hosts one
//! [`TimelineWidget`](crate::widget::TimelineWidget), ticks it every frame,
//! paints its render list, and forwards selection drags, clicks, and scroll
//! input to it.

mod config;
mod paint;
mod view;

pub use config::TimelineViewConfig;
pub use view::{GpuiTimelineView, TimelineWidgetHandle};
