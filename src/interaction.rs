//! Interaction helpers for selection drags, panning, and zooming time ranges.
//!
//! Charts call these from their pointer handlers so that both chart kinds
//! agree on thresholds and clamping.

use crate::time::{TimeRange, Timestamp};

/// Scroll input delivered to a chart, in lines.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollInput {
    /// Pointer position along the time axis, in pixels from the chart's left
    /// edge.
    pub position_x: f32,
    /// Horizontal scroll; positive moves toward later timestamps.
    pub delta_x: f32,
    /// Vertical scroll; positive is toward the user.
    pub delta_y: f32,
    /// Whether the zoom modifier is held.
    pub zoom: bool,
}

impl ScrollInput {
    /// Plain wheel input without modifiers.
    pub fn wheel(position_x: f32, delta_y: f32) -> Self {
        Self {
            position_x,
            delta_x: 0.0,
            delta_y,
            zoom: false,
        }
    }

    /// Wheel input with the zoom modifier held.
    pub fn zoom(position_x: f32, delta_y: f32) -> Self {
        Self {
            zoom: true,
            ..Self::wheel(position_x, delta_y)
        }
    }
}

/// Pointer press being tracked by a chart.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct DragState {
    pub(crate) start: f32,
    pub(crate) last: f32,
    pub(crate) active: bool,
}

impl DragState {
    pub(crate) fn new(start: f32) -> Self {
        Self {
            start,
            last: start,
            active: false,
        }
    }

    /// Follow the pointer; the drag becomes active once it moved further
    /// than `threshold` pixels from the press.
    pub(crate) fn track(&mut self, x: f32, threshold: f32) {
        if !self.active && (x - self.start).abs() > threshold {
            self.active = true;
        }
        self.last = x;
    }

    /// Pixel span covered by the drag, as `(left, width)`.
    pub(crate) fn span(&self) -> (f32, f32) {
        let left = self.start.min(self.last);
        (left, (self.last - self.start).abs())
    }
}

/// Range between two timestamps, in either order.
pub(crate) fn span_between(a: Timestamp, b: Timestamp) -> TimeRange {
    TimeRange::new(a, b)
}

/// Pan `range` by a number of scroll lines, each worth `fraction` of its
/// duration, staying inside `bounds`.
pub(crate) fn pan_range(range: TimeRange, lines: f64, fraction: f64, bounds: TimeRange) -> TimeRange {
    let delta = (range.duration() as f64 * fraction * lines).round();
    if !delta.is_finite() {
        return range;
    }
    range.shifted_within(delta as i64, bounds)
}

/// Scale `range` around `center` by `factor`, clamped to `bounds`.
///
/// The result is never shorter than one time unit.
pub(crate) fn zoom_range(
    range: TimeRange,
    center: Timestamp,
    factor: f64,
    bounds: TimeRange,
) -> TimeRange {
    if !(factor > 0.0) || !factor.is_finite() {
        return range;
    }
    let center = range.clamp(center);
    let before = ((center - range.start()) as f64 * factor).round() as i64;
    let after = ((range.end() - center) as f64 * factor).round() as i64;
    let mut start = bounds.clamp(center.saturating_sub(before));
    let mut end = bounds.clamp(center.saturating_add(after));
    if end.saturating_sub(start) < 1 {
        end = bounds.clamp(start.saturating_add(1));
        start = bounds.clamp(end.saturating_sub(1));
    }
    TimeRange::new(start, end)
}

/// Move `range` so that it is centered on `center`, keeping its duration
/// and staying inside `bounds`.
pub(crate) fn recenter_range(range: TimeRange, center: Timestamp, bounds: TimeRange) -> TimeRange {
    let current = range.start() + range.duration() / 2;
    range.shifted_within(center.saturating_sub(current), bounds)
}

/// Zoom factor for a number of zoom-in steps. Negative steps zoom out.
pub(crate) fn zoom_factor(steps: f64, step: f64) -> f64 {
    if !(step > 0.0) || !steps.is_finite() {
        return 1.0;
    }
    step.powf(steps).clamp(0.1, 10.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drag_activates_past_threshold() {
        let mut drag = DragState::new(100.0);
        drag.track(103.0, 4.0);
        assert!(!drag.active);
        drag.track(90.0, 4.0);
        assert!(drag.active);
        assert_eq!(drag.span(), (90.0, 10.0));
    }

    #[test]
    fn pan_stays_inside_bounds() {
        let bounds = TimeRange::new(0, 1_000);
        let range = TimeRange::new(800, 900);
        assert_eq!(pan_range(range, 1.0, 0.1, bounds), TimeRange::new(810, 910));
        assert_eq!(pan_range(range, 50.0, 0.1, bounds), TimeRange::new(900, 1_000));
        assert_eq!(pan_range(range, -100.0, 0.1, bounds), TimeRange::new(0, 100));
    }

    #[test]
    fn zoom_keeps_center_and_clamps() {
        let bounds = TimeRange::new(0, 1_000);
        let range = TimeRange::new(200, 600);
        assert_eq!(zoom_range(range, 400, 0.5, bounds), TimeRange::new(300, 500));
        assert_eq!(zoom_range(range, 400, 10.0, bounds), TimeRange::new(0, 1_000));
        let tiny = zoom_range(TimeRange::new(10, 11), 10, 0.001, bounds);
        assert!(tiny.duration() >= 1);
    }

    #[test]
    fn zoom_out_of_very_wide_range_saturates_to_bounds() {
        let bounds = TimeRange::new(0, 4_000_000_000_000_000_000);
        let zoomed = zoom_range(bounds, 2_000_000_000_000_000_000, 10.0, bounds);
        assert_eq!(zoomed, bounds);
    }

    #[test]
    fn zoom_at_the_end_of_bounds_keeps_one_unit() {
        let bounds = TimeRange::new(0, 1_000);
        let zoomed = zoom_range(TimeRange::new(999, 1_000), 1_000, 0.001, bounds);
        assert_eq!(zoomed, TimeRange::new(999, 1_000));
    }

    #[test]
    fn recenter_preserves_duration() {
        let bounds = TimeRange::new(0, 1_000);
        let range = TimeRange::new(0, 100);
        assert_eq!(recenter_range(range, 500, bounds), TimeRange::new(450, 550));
        assert_eq!(recenter_range(range, 990, bounds), TimeRange::new(900, 1_000));
    }

    #[test]
    fn zoom_factor_is_bounded() {
        assert!((zoom_factor(1.0, 0.8) - 0.8).abs() < 1e-12);
        assert!((zoom_factor(-1.0, 0.8) - 1.25).abs() < 1e-12);
        assert_eq!(zoom_factor(100.0, 0.8), 0.1);
        assert_eq!(zoom_factor(1.0, 0.0), 1.0);
    }
}
