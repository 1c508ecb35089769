//! Chart widgets of the timeline.
//!
//! Two variants share one core: [`FullRangeChart`] shows the whole trace
//! with the visible range highlighted, [`VisibleRangeChart`] shows the
//! range the main view is looking at. Both repaint only when their key (what
//! they depend on in the [`ViewContext`]) changes, and both swap their
//! [`DisplayState`] in one assignment.

pub mod full_range;
pub mod overlay;
pub mod visible_range;

use std::sync::Arc;
use std::time::Duration;

use crate::axis::AxisBounds;
use crate::config::ChartConfig;
use crate::context::ViewContext;
use crate::dispatch::{DispatchOutcome, RenderBatch};
use crate::error::ChartError;
use crate::geom::{ScreenPoint, ScreenRect, ValueRange};
use crate::interaction::{DragState, ScrollInput, span_between};
use crate::provider::{RenderFilter, RenderProvider};
use crate::render::{
    RenderCommand, RenderList, build_area, build_line_segments, build_scatter_points,
};
use crate::resolution::ResolutionPolicy;
use crate::series::{DisplayedSeries, SeriesKind};
use crate::task::{RedrawState, TickDecision, UpdateOutcome};
use crate::time::{TimeRange, Timestamp};
use crate::transform::Transform;
use crate::worker::{Executor, RenderRequest, RenderResult};

pub use full_range::FullRangeChart;
pub use overlay::{Overlay, overlay_span};
pub use visible_range::VisibleRangeChart;

/// What a chart currently shows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DisplayState {
    series: Vec<DisplayedSeries>,
    axis: AxisBounds,
    value_range: Option<ValueRange>,
}

impl DisplayState {
    /// Display state for a batch of renders. The axis spans the batch's
    /// display range with a single tick unit.
    pub fn from_batch(batch: RenderBatch, kind: SeriesKind) -> Self {
        let axis = AxisBounds::from_range(batch.display_range());
        let series: Vec<DisplayedSeries> = batch
            .into_renders()
            .into_iter()
            .map(|render| DisplayedSeries::from_render(render, kind))
            .collect();
        let value_range = series
            .iter()
            .filter_map(DisplayedSeries::value_range)
            .reduce(|a, b| ValueRange::new(a.min.min(b.min), a.max.max(b.max)));
        Self {
            series,
            axis,
            value_range,
        }
    }

    /// Displayed series.
    pub fn series(&self) -> &[DisplayedSeries] {
        &self.series
    }

    /// Time axis bounds; unset until the first paint.
    pub fn axis(&self) -> AxisBounds {
        self.axis
    }

    /// Range of the displayed values.
    pub fn value_range(&self) -> Option<ValueRange> {
        self.value_range
    }

    /// Check whether nothing is displayed.
    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}

/// Counts from applying delivered results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ApplySummary {
    /// Results that replaced the display.
    pub painted: usize,
    /// Results that had nothing to paint.
    pub not_painted: usize,
    /// Results dropped because a newer state superseded them.
    pub stale: usize,
}

impl ApplySummary {
    /// Check whether no result was delivered.
    pub fn is_empty(&self) -> bool {
        self.painted == 0 && self.not_painted == 0 && self.stale == 0
    }

    fn outcome(&self) -> UpdateOutcome {
        if self.painted > 0 {
            UpdateOutcome::Painted
        } else {
            UpdateOutcome::NotPainted
        }
    }
}

/// A chart that lives in a timeline.
///
/// Ticks and pointer input arrive on the UI thread. Provider calls happen on
/// the chart's worker thread when it runs in background mode.
pub trait TimelineWidget: Send {
    /// Name shown to the user; the provider name.
    fn name(&self) -> &str;

    /// Sort key inside a timeline. Lower comes first.
    fn weight(&self) -> i32;

    /// Run the chart's update task once.
    fn run_update(&mut self) -> UpdateOutcome;

    /// Apply results delivered by the worker since the last call.
    fn apply_pending(&mut self) -> ApplySummary;

    /// Wait up to `timeout` for the request in flight, then apply every
    /// delivered result.
    fn wait_pending(&mut self, timeout: Duration) -> ApplySummary;

    /// Drop the displayed data; the next tick repaints.
    fn clear(&mut self);

    /// Stop the worker. The chart stays usable for drawing but never
    /// repaints again.
    fn dispose(&mut self);

    /// React to a new visible range. Only overlay geometry is recomputed.
    fn seek_visible_range(&mut self, range: TimeRange);

    /// Time range the chart's horizontal axis covers.
    fn widget_time_range(&self) -> TimeRange;

    /// Set the size given by the host layout.
    fn set_size(&mut self, width: f32, height: f32);

    /// Height the chart would like to have.
    fn preferred_height(&self) -> f32;

    /// Current display state.
    fn display(&self) -> &DisplayState;

    /// Current overlay state.
    fn overlay(&self) -> &Overlay;

    /// Pixel position of `ts`, NaN until the first paint.
    fn map_time_to_pixel(&self, ts: Timestamp) -> f64;

    /// Timestamp at pixel `x`, always inside [`TimelineWidget::widget_time_range`].
    fn map_pixel_to_time(&self, x: f64) -> Timestamp;

    /// Describe the current frame.
    fn build_frame(&self) -> RenderList;

    /// Primary button pressed at `x`.
    fn on_pointer_down(&mut self, x: f32);

    /// Pointer moved to `x`.
    fn on_pointer_move(&mut self, x: f32);

    /// Primary button released at `x`.
    fn on_pointer_up(&mut self, x: f32);

    /// Scroll over the chart.
    fn on_scroll(&mut self, input: ScrollInput);
}

/// Result of a pointer release.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PointerRelease {
    /// No press was tracked.
    None,
    /// Press and release without a drag.
    Click(Timestamp),
    /// A drag selected this range.
    Selection(TimeRange),
}

/// State and behavior shared by both chart variants.
pub(crate) struct XyChart<K> {
    name: String,
    pub(crate) context: ViewContext,
    pub(crate) config: ChartConfig,
    policy: ResolutionPolicy,
    kind: SeriesKind,
    show_label: bool,
    display: DisplayState,
    redraw: RedrawState<K>,
    executor: Executor<K>,
    pub(crate) overlay: Overlay,
    shown_selection: TimeRange,
    width: f32,
    height: f32,
    drag: Option<DragState>,
}

impl<K: Clone + PartialEq + Send + 'static> XyChart<K> {
    pub(crate) fn new(
        provider: Arc<dyn RenderProvider>,
        context: ViewContext,
        config: ChartConfig,
        policy: ResolutionPolicy,
        kind: SeriesKind,
        show_label: bool,
    ) -> Result<Self, ChartError> {
        let executor = Executor::new(config.execution_mode, Arc::clone(&provider))?;
        Ok(Self {
            name: provider.provider_name().to_string(),
            context,
            config,
            policy,
            kind,
            show_label,
            display: DisplayState::default(),
            redraw: RedrawState::new(),
            executor,
            overlay: Overlay::default(),
            shown_selection: TimeRange::UNINITIALIZED,
            width: 0.0,
            height: 0.0,
            drag: None,
        })
    }

    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn display(&self) -> &DisplayState {
        &self.display
    }

    #[cfg(test)]
    pub(crate) fn redraw(&self) -> &RedrawState<K> {
        &self.redraw
    }

    /// Run one tick for the state described by `key`, requesting `range`.
    ///
    /// `key` is `None` when no project is active.
    pub(crate) fn run_update(
        &mut self,
        frozen: bool,
        key: Option<K>,
        range: TimeRange,
        filter: Option<RenderFilter>,
    ) -> UpdateOutcome {
        if !frozen {
            self.overlay.set_visible(key.is_some());
        }
        let key = match self.redraw.evaluate(frozen, key) {
            TickDecision::Frozen => return UpdateOutcome::Frozen,
            TickDecision::Unchanged => return UpdateOutcome::Unchanged,
            TickDecision::InFlight => return UpdateOutcome::InFlight,
            TickDecision::Clear => {
                log::debug!("{}: no active project, clearing", self.name);
                self.display = DisplayState::default();
                self.drag = None;
                self.shown_selection = TimeRange::UNINITIALIZED;
                return UpdateOutcome::Cleared;
            }
            TickDecision::Repaint(key) => key,
        };
        let Some(resolution) = self.policy.resolve(range, f64::from(self.width)) else {
            log::trace!("{}: width {} not usable, skipping", self.name, self.width);
            return UpdateOutcome::Skipped;
        };
        let ticket = self.redraw.start(key.clone());
        let request = RenderRequest {
            ticket,
            key: key.clone(),
            range,
            resolution,
            filter,
        };
        if !self.executor.submit(request) {
            self.redraw.abandon(ticket);
            return UpdateOutcome::Skipped;
        }
        if self.executor.is_background() {
            return UpdateOutcome::Requested;
        }
        self.apply_pending(Some(&key)).outcome()
    }

    /// Apply delivered results, dropping those that no longer match `current`.
    pub(crate) fn apply_pending(&mut self, current: Option<&K>) -> ApplySummary {
        let results = self.executor.drain();
        self.apply_results(results, current)
    }

    pub(crate) fn wait_pending(&mut self, timeout: Duration, current: Option<&K>) -> ApplySummary {
        if self.redraw.pending().is_none() {
            return self.apply_pending(current);
        }
        let mut results: Vec<RenderResult<K>> = self.executor.wait(timeout).into_iter().collect();
        results.extend(self.executor.drain());
        self.apply_results(results, current)
    }

    fn apply_results(
        &mut self,
        results: Vec<RenderResult<K>>,
        current: Option<&K>,
    ) -> ApplySummary {
        let mut summary = ApplySummary::default();
        for result in results {
            let matches_context = current.is_some_and(|key| *key == result.key);
            if !matches_context || !self.redraw.is_pending(result.ticket) {
                log::trace!("{}: dropping stale result {}", self.name, result.ticket);
                if !matches_context {
                    self.redraw.abandon(result.ticket);
                }
                summary.stale += 1;
                continue;
            }
            let painted = match result.outcome {
                DispatchOutcome::Painted(batch) => self.paint(batch),
                DispatchOutcome::NothingToPaint => false,
            };
            self.redraw.complete(result.ticket, painted);
            if painted {
                summary.painted += 1;
            } else {
                summary.not_painted += 1;
            }
        }
        summary
    }

    /// Replace the display with `batch`. Returns whether something was
    /// painted.
    pub(crate) fn paint(&mut self, batch: RenderBatch) -> bool {
        let display = DisplayState::from_batch(batch, self.kind);
        log::trace!(
            "{}: painting {} series over [{}, {}]",
            self.name,
            display.series.len(),
            display.axis.lower_bound,
            display.axis.upper_bound
        );
        self.display = display;
        true
    }

    /// Drop the display and forget the watermark.
    pub(crate) fn clear(&mut self) {
        self.display = DisplayState::default();
        self.redraw.reset();
        self.drag = None;
        self.shown_selection = TimeRange::UNINITIALIZED;
        self.overlay.set_ongoing_span(None);
    }

    pub(crate) fn dispose(&mut self) {
        log::debug!("{}: disposing", self.name);
        self.executor.dispose();
    }

    pub(crate) fn set_size(&mut self, width: f32, height: f32) {
        self.width = if width.is_finite() { width.max(0.0) } else { 0.0 };
        self.height = if height.is_finite() { height.max(0.0) } else { 0.0 };
    }

    pub(crate) fn map_time_to_pixel(&self, ts: Timestamp) -> f64 {
        self.display
            .axis
            .display_position(ts as f64, f64::from(self.width))
    }

    /// Inverse of [`XyChart::map_time_to_pixel`], clamped to `range`.
    ///
    /// Before the first paint the position is mapped linearly over `range`.
    pub(crate) fn map_pixel_to_time(&self, x: f64, range: TimeRange) -> Timestamp {
        if self.width < 1.0 || !x.is_finite() {
            return range.start();
        }
        let width = f64::from(self.width);
        let mut value = self.display.axis.value_for_display(x, width);
        if !value.is_finite() {
            value = range.start() as f64 + x / width * range.duration() as f64;
        }
        range.clamp(value.round() as Timestamp)
    }

    /// Recompute the selection highlight from the context.
    pub(crate) fn refresh_selection(&mut self) {
        let selection = self.context.selection_range();
        let span = overlay_span(|ts| self.map_time_to_pixel(ts), selection);
        self.overlay.set_selection_span(span);
        self.shown_selection = selection;
    }

    /// Recompute the selection highlight if `selection` is not the one
    /// currently drawn.
    pub(crate) fn sync_selection(&mut self, selection: TimeRange) {
        if selection != self.shown_selection {
            self.refresh_selection();
        }
    }

    pub(crate) fn pointer_down(&mut self, x: f32) {
        if self.context.current_project().is_none() {
            return;
        }
        self.drag = Some(DragState::new(x));
    }

    pub(crate) fn pointer_move(&mut self, x: f32) {
        let threshold = self.config.drag_threshold_px;
        let Some(drag) = self.drag.as_mut() else {
            return;
        };
        drag.track(x, threshold);
        if drag.active {
            let span = drag.span();
            self.overlay.set_ongoing_span(Some(span));
        }
    }

    /// Finish a press. Drags become the context's selection.
    pub(crate) fn pointer_up(&mut self, x: f32, range: TimeRange) -> PointerRelease {
        let Some(mut drag) = self.drag.take() else {
            return PointerRelease::None;
        };
        drag.track(x, self.config.drag_threshold_px);
        self.overlay.set_ongoing_span(None);
        if !drag.active {
            return PointerRelease::Click(self.map_pixel_to_time(f64::from(x), range));
        }
        let selection = span_between(
            self.map_pixel_to_time(f64::from(drag.start), range),
            self.map_pixel_to_time(f64::from(drag.last), range),
        );
        self.context.set_selection_range(selection);
        self.refresh_selection();
        PointerRelease::Selection(selection)
    }

    /// Text shown for `range`, in the configured timestamp format.
    pub(crate) fn range_text(&self, range: TimeRange) -> String {
        let format = self.config.timestamp_format;
        format!("{} - {}", format.format(range.start()), format.format(range.end()))
    }

    /// Build the chart's frame. `range_label`, when set, is written along
    /// the bottom edge.
    pub(crate) fn build_frame(&self, range_label: Option<TimeRange>) -> RenderList {
        let mut list = RenderList::new();
        let rect = ScreenRect::from_size(self.width, self.height);
        if !rect.is_valid() {
            return list;
        }
        list.push(RenderCommand::ClipRect(rect));
        self.push_series(&mut list, rect);
        self.overlay.push_commands(
            &mut list,
            self.height,
            self.config.visible_range_style,
            self.config.selection_style,
        );
        if self.show_label && !self.name.is_empty() {
            list.push(RenderCommand::Text {
                position: ScreenPoint::new(4.0, 2.0),
                text: self.name.clone(),
                style: self.config.label_style.clone(),
            });
        }
        if let Some(range) = range_label.filter(|range| !range.is_uninitialized()) {
            let style = self.config.label_style.clone();
            let y = (self.height - style.size - 2.0).max(0.0);
            list.push(RenderCommand::Text {
                position: ScreenPoint::new(4.0, y),
                text: self.range_text(range),
                style,
            });
        }
        list.push(RenderCommand::ClipEnd);
        list
    }

    fn push_series(&self, list: &mut RenderList, rect: ScreenRect) {
        let mut values = self
            .display
            .value_range
            .unwrap_or_else(|| ValueRange::new(0.0, 1.0));
        values.expand_to_include(0.0);
        let Some(transform) = Transform::new(self.display.axis, values, rect) else {
            return;
        };
        let mut segments = Vec::new();
        let mut screen_points = Vec::new();
        for series in &self.display.series {
            match *series.kind() {
                SeriesKind::Area(line) => {
                    build_area(series.points(), &transform, rect, &mut screen_points);
                    if !screen_points.is_empty() {
                        list.push(RenderCommand::Area {
                            vertices: std::mem::take(&mut screen_points),
                            fill: line.color.with_alpha(self.config.area_alpha),
                        });
                    }
                    build_line_segments(series.points(), &transform, rect, &mut segments);
                    if !segments.is_empty() {
                        list.push(RenderCommand::LineSegments {
                            segments: std::mem::take(&mut segments),
                            style: line,
                        });
                    }
                }
                SeriesKind::LineWithMarkers(line, marker) => {
                    build_line_segments(series.points(), &transform, rect, &mut segments);
                    if !segments.is_empty() {
                        list.push(RenderCommand::LineSegments {
                            segments: std::mem::take(&mut segments),
                            style: line,
                        });
                    }
                    build_scatter_points(series.points(), &transform, rect, &mut screen_points);
                    if !screen_points.is_empty() {
                        list.push(RenderCommand::Points {
                            points: std::mem::take(&mut screen_points),
                            style: marker,
                        });
                    }
                }
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::time::{Duration, Instant};

    use super::{ApplySummary, TimelineWidget};
    use crate::task::UpdateOutcome;

    /// Tick a background chart until its request is delivered.
    pub(crate) fn tick_until_settled(widget: &mut dyn TimelineWidget) -> UpdateOutcome {
        let deadline = Instant::now() + Duration::from_secs(5);
        loop {
            let outcome = widget.run_update();
            if !matches!(outcome, UpdateOutcome::Requested | UpdateOutcome::InFlight) {
                return outcome;
            }
            let summary: ApplySummary = widget.wait_pending(Duration::from_millis(200));
            if summary.painted > 0 {
                return UpdateOutcome::Painted;
            }
            if summary.not_painted > 0 {
                return UpdateOutcome::NotPainted;
            }
            if Instant::now() > deadline {
                return outcome;
            }
        }
    }
}
