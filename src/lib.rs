//! timeline-xychart renders time-range driven XY charts for trace timelines.
//! A full-range overview and a visible-range detail chart follow a shared
//! view context, request series renders from a provider at a resolution
//! matched to their pixel width, and repaint only when their inputs change.

#![forbid(unsafe_code)]

pub mod axis;
pub mod config;
pub mod context;
pub mod dispatch;
pub mod error;
pub mod geom;
pub mod interaction;
pub mod provider;
pub mod render;
pub mod resolution;
pub mod series;
pub mod task;
pub mod time;
pub mod timeline;
pub mod timestamp_format;
mod transform;
pub mod widget;
pub mod worker;

#[cfg(feature = "gpui")]
pub mod gpui_backend;

pub use axis::AxisBounds;
pub use config::ChartConfig;
pub use context::{ContextSnapshot, ProjectId, TraceProject, ViewContext};
pub use dispatch::{DispatchOutcome, RenderBatch, request_renders};
pub use error::{ChartError, TimeRangeError, TimestampParseError};
pub use geom::{Point, ScreenPoint, ScreenRect, ValueRange};
pub use interaction::ScrollInput;
pub use provider::{FilterSupport, RenderFilter, RenderProvider};
pub use render::{
    Color, LineSegment, LineStyle, MarkerShape, MarkerStyle, RectStyle, RenderCommand, RenderList,
    TextStyle,
};
pub use resolution::{DEFAULT_DENSITY_FACTOR, ResolutionPolicy, compute_resolution};
pub use series::{DisplayedSeries, SeriesDescriptor, SeriesKind, SeriesRender};
pub use task::{UpdateOutcome, Watermark};
pub use time::{TimeRange, Timestamp};
pub use timeline::{TickReport, Timeline};
pub use timestamp_format::TimestampFormat;
pub use widget::{
    ApplySummary, DisplayState, FullRangeChart, Overlay, TimelineWidget, VisibleRangeChart,
};
pub use worker::ExecutionMode;

#[cfg(feature = "gpui")]
pub use gpui_backend::{GpuiTimelineView, TimelineViewConfig, TimelineWidgetHandle};
