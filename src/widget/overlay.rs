//! Highlight rectangles drawn over a chart.
//!
//! Rectangles are derived from time ranges through the chart's own
//! time-to-pixel mapping, so they line up with the data exactly.

use crate::geom::{ScreenPoint, ScreenRect};
use crate::render::{RectStyle, RenderCommand, RenderList};
use crate::time::{TimeRange, Timestamp};

/// Horizontal pixel span `(left, width)` of `range`, or `None` when either
/// endpoint does not map to a finite position.
pub fn overlay_span(map: impl Fn(Timestamp) -> f64, range: TimeRange) -> Option<(f64, f64)> {
    if range.is_uninitialized() {
        return None;
    }
    let start = map(range.start());
    let end = map(range.end());
    if !start.is_finite() || !end.is_finite() {
        return None;
    }
    Some((start.min(end), (end - start).abs()))
}

/// Overlay state of one chart.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Overlay {
    visible: bool,
    visible_range: Option<(f64, f64)>,
    selection: Option<(f64, f64)>,
    ongoing: Option<(f32, f32)>,
}

impl Overlay {
    /// Whether the overlay is drawn at all. True exactly while a project is
    /// active.
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Span of the visible-range highlight.
    pub fn visible_range_span(&self) -> Option<(f64, f64)> {
        self.visible_range
    }

    /// Span of the selection highlight.
    pub fn selection_span(&self) -> Option<(f64, f64)> {
        self.selection
    }

    /// Span of the selection being dragged.
    pub fn ongoing_span(&self) -> Option<(f32, f32)> {
        self.ongoing
    }

    pub(crate) fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
        if !visible {
            self.visible_range = None;
            self.selection = None;
            self.ongoing = None;
        }
    }

    pub(crate) fn set_visible_range_span(&mut self, span: Option<(f64, f64)>) {
        self.visible_range = span;
    }

    pub(crate) fn set_selection_span(&mut self, span: Option<(f64, f64)>) {
        self.selection = span;
    }

    pub(crate) fn set_ongoing_span(&mut self, span: Option<(f32, f32)>) {
        self.ongoing = span;
    }

    /// Append the overlay rectangles for a chart `height` pixels tall.
    pub(crate) fn push_commands(
        &self,
        list: &mut RenderList,
        height: f32,
        visible_range_style: RectStyle,
        selection_style: RectStyle,
    ) {
        if !self.visible {
            return;
        }
        // The visible-range stroke stays inside the chart.
        let inset = (height - visible_range_style.stroke_width).max(0.0);
        let spans = [
            (self.visible_range, visible_range_style, inset),
            (self.selection, selection_style, height),
            (
                self.ongoing
                    .map(|(left, width)| (left as f64, width as f64)),
                selection_style,
                height,
            ),
        ];
        for (span, style, bottom) in spans {
            let Some((left, width)) = span else {
                continue;
            };
            let left = left as f32;
            let rect = ScreenRect::new(
                ScreenPoint::new(left, 0.0),
                ScreenPoint::new(left + width as f32, bottom),
            );
            list.push(RenderCommand::Rect { rect, style });
        }
    }
}
