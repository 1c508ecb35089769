//! Chart of the whole trace, with the visible range highlighted.

use std::sync::Arc;
use std::time::Duration;

use crate::config::ChartConfig;
use crate::context::{ContextSnapshot, ProjectId, ViewContext};
use crate::error::ChartError;
use crate::interaction::{ScrollInput, recenter_range};
use crate::provider::RenderProvider;
use crate::render::RenderList;
use crate::resolution::ResolutionPolicy;
use crate::series::SeriesKind;
use crate::task::UpdateOutcome;
use crate::time::{TimeRange, Timestamp};

use super::{
    ApplySummary, DisplayState, Overlay, PointerRelease, TimelineWidget, XyChart, overlay_span,
};

/// What a full-range paint depends on.
///
/// The full range is part of the key so that a trace still being recorded
/// repaints as it grows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FullRangeKey {
    /// Project painted.
    pub project: ProjectId,
    /// Its full range at paint time.
    pub full_range: TimeRange,
}

impl FullRangeKey {
    fn of(snapshot: &ContextSnapshot) -> Option<Self> {
        snapshot.project.as_ref().map(|project| Self {
            project: project.id(),
            full_range: project.full_range(),
        })
    }
}

/// Navigation chart spanning the whole trace.
///
/// Series are drawn as filled areas without markers, one sample per pixel.
/// A rectangle marks the range the main view currently shows; clicking
/// recenters that range.
pub struct FullRangeChart {
    chart: XyChart<FullRangeKey>,
    weight: i32,
    highlighted: TimeRange,
}

impl FullRangeChart {
    /// Create a chart for `provider`, following `context`.
    pub fn new(
        provider: Arc<dyn RenderProvider>,
        context: ViewContext,
        config: ChartConfig,
        weight: i32,
    ) -> Result<Self, ChartError> {
        let kind = SeriesKind::Area(config.series_line);
        let chart = XyChart::new(
            provider,
            context,
            config,
            ResolutionPolicy::OnePerPixel,
            kind,
            false,
        )?;
        Ok(Self {
            chart,
            weight,
            highlighted: TimeRange::UNINITIALIZED,
        })
    }

    fn refresh_overlay(&mut self, visible_range: TimeRange) {
        let offset = f64::from(self.chart.config.highlight_offset_px);
        let span = overlay_span(|ts| self.chart.map_time_to_pixel(ts), visible_range);
        if let Some((left, width)) = span {
            self.chart
                .overlay
                .set_visible_range_span(Some((left + offset, width)));
            self.highlighted = visible_range;
        }
        self.chart.refresh_selection();
    }

    /// Follow visible range and selection changes made through the context
    /// since the last tick. Geometry only, the provider is not called.
    fn sync_overlay(&mut self, snapshot: &ContextSnapshot) {
        if snapshot.project.is_none() {
            return;
        }
        if snapshot.visible_range != self.highlighted {
            self.refresh_overlay(snapshot.visible_range);
        } else {
            self.chart.sync_selection(snapshot.selection_range);
        }
    }

    #[cfg(test)]
    fn watermark(&self) -> &crate::task::Watermark<FullRangeKey> {
        self.chart.redraw().watermark()
    }
}

impl TimelineWidget for FullRangeChart {
    fn name(&self) -> &str {
        self.chart.name()
    }

    fn weight(&self) -> i32 {
        self.weight
    }

    fn run_update(&mut self) -> UpdateOutcome {
        let snapshot = self.chart.context.snapshot();
        let outcome = self.chart.run_update(
            snapshot.listener_freeze,
            FullRangeKey::of(&snapshot),
            snapshot.full_range(),
            None,
        );
        match outcome {
            UpdateOutcome::Frozen => {}
            UpdateOutcome::Cleared => self.highlighted = TimeRange::UNINITIALIZED,
            UpdateOutcome::Painted => self.refresh_overlay(snapshot.visible_range),
            _ => self.sync_overlay(&snapshot),
        }
        outcome
    }

    fn apply_pending(&mut self) -> ApplySummary {
        let snapshot = self.chart.context.snapshot();
        let summary = self.chart.apply_pending(FullRangeKey::of(&snapshot).as_ref());
        if summary.painted > 0 {
            self.refresh_overlay(snapshot.visible_range);
        }
        summary
    }

    fn wait_pending(&mut self, timeout: Duration) -> ApplySummary {
        let snapshot = self.chart.context.snapshot();
        let summary = self
            .chart
            .wait_pending(timeout, FullRangeKey::of(&snapshot).as_ref());
        if summary.painted > 0 {
            self.refresh_overlay(snapshot.visible_range);
        }
        summary
    }

    fn clear(&mut self) {
        self.chart.clear();
        self.chart.overlay.set_visible_range_span(None);
        self.chart.overlay.set_selection_span(None);
        self.highlighted = TimeRange::UNINITIALIZED;
    }

    fn dispose(&mut self) {
        self.chart.dispose();
    }

    fn seek_visible_range(&mut self, range: TimeRange) {
        self.refresh_overlay(range);
    }

    fn widget_time_range(&self) -> TimeRange {
        self.chart.context.full_range()
    }

    fn set_size(&mut self, width: f32, height: f32) {
        self.chart.set_size(width, height);
        let visible_range = self.chart.context.visible_range();
        self.refresh_overlay(visible_range);
    }

    fn preferred_height(&self) -> f32 {
        self.chart.config.full_range_height_px
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
        self.chart.build_frame(None)
    }

    fn on_pointer_down(&mut self, x: f32) {
        self.chart.pointer_down(x);
    }

    fn on_pointer_move(&mut self, x: f32) {
        self.chart.pointer_move(x);
    }

    fn on_pointer_up(&mut self, x: f32) {
        let range = self.widget_time_range();
        let PointerRelease::Click(center) = self.chart.pointer_up(x, range) else {
            return;
        };
        let snapshot = self.chart.context.snapshot();
        if snapshot.visible_range.is_uninitialized() {
            return;
        }
        let target = recenter_range(snapshot.visible_range, center, snapshot.full_range());
        let applied = self.chart.context.request_visible_range(target);
        log::debug!("{}: recentered visible range to {}", self.chart.name(), applied);
        self.seek_visible_range(applied);
    }

    fn on_scroll(&mut self, _input: ScrollInput) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::TraceProject;
    use crate::provider::testing::StubProvider;
    use crate::task::Watermark;
    use crate::widget::testing::tick_until_settled;

    const FULL: i64 = 1_000_000_000;

    fn setup(config: ChartConfig) -> (Arc<StubProvider>, ViewContext, FullRangeChart) {
        let provider = Arc::new(StubProvider::new(&["cpu", "mem"]));
        let context = ViewContext::with_initial_range_offset(FULL / 2);
        let mut chart =
            FullRangeChart::new(provider.clone(), context.clone(), config, 10).expect("chart");
        chart.set_size(500.0, 50.0);
        (provider, context, chart)
    }

    fn load(context: &ViewContext) -> TraceProject {
        let project = TraceProject::new("trace", TimeRange::new(0, FULL));
        context.set_project(Some(project.clone()));
        project
    }

    #[test]
    fn paints_full_range_at_one_sample_per_pixel() {
        let (provider, context, mut chart) = setup(ChartConfig::default().inline());
        load(&context);
        assert_eq!(chart.run_update(), UpdateOutcome::Painted);
        let requests = provider.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].range, TimeRange::new(0, FULL));
        assert_eq!(requests[0].resolution, 2_000_000);
        assert!(requests[0].filter.is_none());
        assert_eq!(chart.display().series().len(), 2);
        assert_eq!(chart.display().axis().tick_unit, FULL as f64);
    }

    #[test]
    fn repeated_ticks_make_no_provider_calls() {
        let (provider, context, mut chart) = setup(ChartConfig::default().inline());
        load(&context);
        assert_eq!(chart.run_update(), UpdateOutcome::Painted);
        for _ in 0..5 {
            assert_eq!(chart.run_update(), UpdateOutcome::Unchanged);
        }
        // Seeking does not change what the full-range chart depends on.
        context.request_visible_range(TimeRange::new(100, 200));
        assert_eq!(chart.run_update(), UpdateOutcome::Unchanged);
        assert_eq!(provider.calls(), 1);
    }

    #[test]
    fn empty_renders_do_not_advance_the_watermark() {
        let (provider, context, mut chart) = setup(ChartConfig::default().inline());
        provider.set_ready(false);
        load(&context);
        assert_eq!(chart.run_update(), UpdateOutcome::NotPainted);
        assert_eq!(chart.watermark(), &Watermark::Uninitialized);
        assert!(chart.display().is_empty());

        provider.set_ready(true);
        assert_eq!(chart.run_update(), UpdateOutcome::Painted);
        assert_eq!(provider.calls(), 2);
    }

    #[test]
    fn closing_the_project_clears_series_and_overlay() {
        let (_provider, context, mut chart) = setup(ChartConfig::default().inline());
        load(&context);
        chart.run_update();
        assert!(chart.overlay().is_visible());
        assert!(chart.overlay().visible_range_span().is_some());

        context.set_project(None);
        assert_eq!(chart.run_update(), UpdateOutcome::Cleared);
        assert!(chart.display().is_empty());
        assert!(!chart.overlay().is_visible());
        assert_eq!(chart.watermark(), &Watermark::NoProject);
        assert_eq!(chart.run_update(), UpdateOutcome::Unchanged);
    }

    #[test]
    fn highlight_follows_visible_range() {
        let (_provider, context, mut chart) = setup(ChartConfig::default().inline());
        load(&context);
        chart.run_update();
        assert_eq!(chart.overlay().visible_range_span(), Some((0.0, 250.0)));

        let applied = context.request_visible_range(TimeRange::new(FULL / 2, FULL));
        chart.seek_visible_range(applied);
        assert_eq!(chart.overlay().visible_range_span(), Some((250.0, 250.0)));
    }

    #[test]
    fn tick_follows_visible_range_moved_elsewhere() {
        let (provider, context, mut chart) = setup(ChartConfig::default().inline());
        load(&context);
        chart.run_update();
        context.request_visible_range(TimeRange::new(FULL / 2, FULL));
        assert_eq!(chart.overlay().visible_range_span(), Some((0.0, 250.0)));

        assert_eq!(chart.run_update(), UpdateOutcome::Unchanged);
        assert_eq!(chart.overlay().visible_range_span(), Some((250.0, 250.0)));
        assert_eq!(provider.calls(), 1);
    }

    #[test]
    fn highlight_offset_shifts_rectangle() {
        let config = ChartConfig {
            highlight_offset_px: 10.0,
            ..ChartConfig::default().inline()
        };
        let (_provider, context, mut chart) = setup(config);
        load(&context);
        chart.run_update();
        assert_eq!(chart.overlay().visible_range_span(), Some((10.0, 250.0)));
    }

    #[test]
    fn seek_before_first_paint_is_skipped() {
        let (_provider, context, mut chart) = setup(ChartConfig::default().inline());
        load(&context);
        chart.seek_visible_range(TimeRange::new(0, 100));
        assert!(chart.overlay().visible_range_span().is_none());
    }

    #[test]
    fn frozen_context_skips_ticks() {
        let (provider, context, mut chart) = setup(ChartConfig::default().inline());
        load(&context);
        context.set_listener_freeze(true);
        assert_eq!(chart.run_update(), UpdateOutcome::Frozen);
        assert_eq!(provider.calls(), 0);
        context.set_listener_freeze(false);
        assert_eq!(chart.run_update(), UpdateOutcome::Painted);
    }

    #[test]
    fn growing_trace_repaints() {
        let (provider, context, mut chart) = setup(ChartConfig::default().inline());
        load(&context);
        chart.run_update();
        context.update_full_range(TimeRange::new(0, 2 * FULL));
        assert_eq!(chart.run_update(), UpdateOutcome::Painted);
        assert_eq!(provider.requests()[1].range, TimeRange::new(0, 2 * FULL));
    }

    #[test]
    fn zero_width_skips_without_calls() {
        let (provider, context, mut chart) = setup(ChartConfig::default().inline());
        chart.set_size(0.0, 50.0);
        load(&context);
        assert_eq!(chart.run_update(), UpdateOutcome::Skipped);
        assert_eq!(provider.calls(), 0);
        chart.set_size(500.0, 50.0);
        assert_eq!(chart.run_update(), UpdateOutcome::Painted);
    }

    #[test]
    fn click_recenters_visible_range() {
        let provider = Arc::new(StubProvider::new(&["cpu"]));
        let context = ViewContext::with_initial_range_offset(FULL / 10);
        let config = ChartConfig::default().inline();
        let mut chart = FullRangeChart::new(provider, context.clone(), config, 0).expect("chart");
        chart.set_size(500.0, 50.0);
        load(&context);
        chart.run_update();

        chart.on_pointer_down(250.0);
        chart.on_pointer_up(250.0);
        assert_eq!(
            context.visible_range(),
            TimeRange::new(FULL / 2 - FULL / 20, FULL / 2 + FULL / 20)
        );
        let (left, width) = chart.overlay().visible_range_span().expect("highlight");
        assert!((left - 225.0).abs() < 1e-6);
        assert!((width - 50.0).abs() < 1e-6);
    }

    #[test]
    fn clear_forces_repaint() {
        let (provider, context, mut chart) = setup(ChartConfig::default().inline());
        load(&context);
        chart.run_update();
        chart.clear();
        assert!(chart.display().is_empty());
        assert_eq!(chart.run_update(), UpdateOutcome::Painted);
        assert_eq!(provider.calls(), 2);
    }

    #[test]
    fn background_mode_paints_on_delivery() {
        let (provider, context, mut chart) = setup(ChartConfig::default());
        load(&context);
        assert_eq!(chart.run_update(), UpdateOutcome::Requested);
        assert_eq!(tick_until_settled(&mut chart), UpdateOutcome::Painted);
        assert_eq!(chart.run_update(), UpdateOutcome::Unchanged);
        assert_eq!(provider.calls(), 1);
        chart.dispose();
    }
}
