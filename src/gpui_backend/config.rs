use crate::render::Color;

/// Configuration for the GPUI timeline view.
#[derive(Debug, Clone)]
pub struct TimelineViewConfig {
    /// Background behind the chart.
    pub background: Color,
    /// Pixels per scroll line when the platform reports pixel deltas.
    pub scroll_line_px: f32,
    /// Keep ticking the chart every frame. When false, the chart only ticks
    /// when GPUI redraws the view for another reason.
    pub continuous_ticks: bool,
}

impl Default for TimelineViewConfig {
    fn default() -> Self {
        Self {
            background: Color::WHITE,
            scroll_line_px: 16.0,
            continuous_ticks: true,
        }
    }
}
