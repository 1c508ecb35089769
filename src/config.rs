//! Chart configuration.

use crate::render::{Color, LineStyle, MarkerShape, MarkerStyle, RectStyle, TextStyle};
use crate::resolution::DEFAULT_DENSITY_FACTOR;
use crate::timestamp_format::TimestampFormat;
use crate::worker::ExecutionMode;

/// Configuration shared by the timeline charts.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ChartConfig {
    /// Samples per pixel requested by the visible-range chart.
    pub density_factor: f64,
    /// Preferred height of the full-range chart in pixels.
    pub full_range_height_px: f32,
    /// Preferred height of the visible-range chart in pixels.
    pub visible_range_height_px: f32,
    /// Horizontal shift applied to the visible-range highlight.
    pub highlight_offset_px: f32,
    /// Pixel threshold for starting a drag.
    pub drag_threshold_px: f32,
    /// Fraction of the visible range panned per scroll line.
    pub scroll_pan_fraction: f64,
    /// Visible-range scale applied per zoom-in step.
    pub zoom_step: f64,
    /// Where provider requests run. Defaults to a background worker so that
    /// ticking never waits on the provider.
    pub execution_mode: ExecutionMode,
    /// Highlight of the visible range on the full-range chart.
    pub visible_range_style: RectStyle,
    /// Selection rectangle.
    pub selection_style: RectStyle,
    /// Series lines.
    pub series_line: LineStyle,
    /// Series markers on the visible-range chart.
    pub series_marker: MarkerStyle,
    /// Opacity of the area under full-range series.
    pub area_alpha: f32,
    /// Chart name label.
    pub label_style: TextStyle,
    /// Format of timestamps shown to the user.
    pub timestamp_format: TimestampFormat,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            density_factor: DEFAULT_DENSITY_FACTOR,
            full_range_height_px: 50.0,
            visible_range_height_px: 200.0,
            highlight_offset_px: 0.0,
            drag_threshold_px: 4.0,
            scroll_pan_fraction: 0.1,
            zoom_step: 0.8,
            execution_mode: ExecutionMode::Background,
            visible_range_style: RectStyle {
                fill: Color::LIGHT_GRAY.with_alpha(0.6),
                stroke: Color::GRAY,
                stroke_width: 4.0,
                corner_radius: 5.0,
            },
            selection_style: RectStyle {
                fill: Color::new(0.26, 0.52, 0.96, 0.25),
                stroke: Color::new(0.26, 0.52, 0.96, 0.9),
                stroke_width: 1.0,
                corner_radius: 0.0,
            },
            series_line: LineStyle::default(),
            series_marker: MarkerStyle {
                color: Color::BLACK,
                size: 4.0,
                shape: MarkerShape::Circle,
            },
            area_alpha: 0.3,
            label_style: TextStyle::default(),
            timestamp_format: TimestampFormat::default(),
        }
    }
}

impl ChartConfig {
    /// Same configuration, with requests served on the ticking thread.
    ///
    /// Only suitable for providers that answer without blocking, such as
    /// in-memory data or headless use.
    pub fn inline(mut self) -> Self {
        self.execution_mode = ExecutionMode::Inline;
        self
    }
}
