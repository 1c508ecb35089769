//! Chart of the range the main view currently shows.

use std::sync::Arc;
use std::time::Duration;

use crate::config::ChartConfig;
use crate::context::{ContextSnapshot, ProjectId, ViewContext};
use crate::error::ChartError;
use crate::interaction::{ScrollInput, pan_range, zoom_factor, zoom_range};
use crate::provider::{FilterSupport, RenderFilter, RenderProvider};
use crate::render::RenderList;
use crate::resolution::ResolutionPolicy;
use crate::series::SeriesKind;
use crate::task::UpdateOutcome;
use crate::time::{TimeRange, Timestamp};

use super::{ApplySummary, DisplayState, Overlay, PointerRelease, TimelineWidget, XyChart};

/// What a visible-range paint depends on.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VisibleRangeKey {
    /// Project painted.
    pub project: ProjectId,
    /// Range requested.
    pub visible_range: TimeRange,
    /// Filter applied to the request.
    pub filter: Option<RenderFilter>,
}

/// Detail chart following the main view's visible range.
///
/// Requests are oversampled by the configured density factor; series are
/// drawn as lines with markers under the provider's name.
pub struct VisibleRangeChart {
    chart: XyChart<VisibleRangeKey>,
    filter: Option<Arc<dyn FilterSupport>>,
    weight: i32,
}

impl VisibleRangeChart {
    /// Create a chart for `provider`, following `context`.
    ///
    /// The provider's filter capability is looked up once, here.
    pub fn new(
        provider: Arc<dyn RenderProvider>,
        context: ViewContext,
        config: ChartConfig,
        weight: i32,
    ) -> Result<Self, ChartError> {
        let filter = provider.filter_support();
        let policy = ResolutionPolicy::Oversampled {
            density: config.density_factor,
        };
        let kind = SeriesKind::LineWithMarkers(config.series_line, config.series_marker);
        let chart = XyChart::new(provider, context, config, policy, kind, true)?;
        Ok(Self {
            chart,
            filter,
            weight,
        })
    }

    fn key(&self, snapshot: &ContextSnapshot) -> Option<VisibleRangeKey> {
        let project = snapshot.project.as_ref()?;
        let filter = self
            .filter
            .as_ref()
            .and_then(|filter| filter.current_filter(snapshot));
        Some(VisibleRangeKey {
            project: project.id(),
            visible_range: snapshot.visible_range,
            filter,
        })
    }

    fn seek(&mut self, target: TimeRange) {
        let applied = self.chart.context.request_visible_range(target);
        self.seek_visible_range(applied);
    }

    #[cfg(test)]
    fn watermark(&self) -> &crate::task::Watermark<VisibleRangeKey> {
        self.chart.redraw().watermark()
    }
}

impl TimelineWidget for VisibleRangeChart {
    fn name(&self) -> &str {
        self.chart.name()
    }

    fn weight(&self) -> i32 {
        self.weight
    }

    fn run_update(&mut self) -> UpdateOutcome {
        let snapshot = self.chart.context.snapshot();
        let key = self.key(&snapshot);
        let filter = key.as_ref().and_then(|key| key.filter.clone());
        let outcome =
            self.chart
                .run_update(snapshot.listener_freeze, key, snapshot.visible_range, filter);
        match outcome {
            UpdateOutcome::Frozen | UpdateOutcome::Cleared => {}
            UpdateOutcome::Painted => self.chart.refresh_selection(),
            _ if snapshot.project.is_some() => {
                self.chart.sync_selection(snapshot.selection_range);
            }
            _ => {}
        }
        outcome
    }

    fn apply_pending(&mut self) -> ApplySummary {
        let snapshot = self.chart.context.snapshot();
        let key = self.key(&snapshot);
        let summary = self.chart.apply_pending(key.as_ref());
        if summary.painted > 0 {
            self.chart.refresh_selection();
        }
        summary
    }

    fn wait_pending(&mut self, timeout: Duration) -> ApplySummary {
        let snapshot = self.chart.context.snapshot();
        let key = self.key(&snapshot);
        let summary = self.chart.wait_pending(timeout, key.as_ref());
        if summary.painted > 0 {
            self.chart.refresh_selection();
        }
        summary
    }

    fn clear(&mut self) {
        self.chart.clear();
        self.chart.overlay.set_selection_span(None);
    }

    fn dispose(&mut self) {
        self.chart.dispose();
    }

    fn seek_visible_range(&mut self, _range: TimeRange) {
        // The data follows on the next tick; the selection moves now.
        self.chart.refresh_selection();
    }

    fn widget_time_range(&self) -> TimeRange {
        self.chart.context.visible_range()
    }

    fn set_size(&mut self, width: f32, height: f32) {
        self.chart.set_size(width, height);
        self.chart.refresh_selection();
    }

    fn preferred_height(&self) -> f32 {
        self.chart.config.visible_range_height_px
    }

    fn display(&self) -> &DisplayState {
        self.chart.display()
    }

    fn overlay(&self) -> &Overlay {
        &self.chart.overlay
    }

    fn map_time_to_pixel(&self, ts: Timestamp) -> f64 {
        self.chart.map_time_to_pixel(ts)
    }

    fn map_pixel_to_time(&self, x: f64) -> Timestamp {
        self.chart.map_pixel_to_time(x, self.widget_time_range())
    }

    fn build_frame(&self) -> RenderList {
        let snapshot = self.chart.context.snapshot();
        let label = snapshot.project.as_ref().map(|_| snapshot.visible_range);
        self.chart.build_frame(label)
    }

    fn on_pointer_down(&mut self, x: f32) {
        self.chart.pointer_down(x);
    }

    fn on_pointer_move(&mut self, x: f32) {
        self.chart.pointer_move(x);
    }

    fn on_pointer_up(&mut self, x: f32) {
        let range = self.widget_time_range();
        if let PointerRelease::Click(ts) = self.chart.pointer_up(x, range) {
            self.chart.context.set_selection_range(TimeRange::new(ts, ts));
            self.chart.refresh_selection();
        }
    }

    fn on_scroll(&mut self, input: ScrollInput) {
        let snapshot = self.chart.context.snapshot();
        if snapshot.project.is_none() || snapshot.visible_range.is_uninitialized() {
            return;
        }
        let visible = snapshot.visible_range;
        let full = snapshot.full_range();
        let target = if input.zoom {
            let center = self.map_pixel_to_time(f64::from(input.position_x));
            let factor = zoom_factor(-f64::from(input.delta_y), self.chart.config.zoom_step);
            zoom_range(visible, center, factor, full)
        } else {
            let lines = if input.delta_x != 0.0 {
                input.delta_x
            } else {
                input.delta_y
            };
            pan_range(
                visible,
                f64::from(lines),
                self.chart.config.scroll_pan_fraction,
                full,
            )
        };
        if target != visible {
            self.seek(target);
        }
    }
}
