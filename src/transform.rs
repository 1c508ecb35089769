//! Coordinate transforms between data and screen space.

use crate::axis::AxisBounds;
use crate::geom::{Point, ScreenPoint, ScreenRect, ValueRange};

const MIN_VALUE_SPAN: f64 = 1e-12;

/// Transform from data coordinates into screen coordinates.
#[derive(Debug, Clone)]
pub(crate) struct Transform {
    x_axis: AxisBounds,
    y_axis: ValueRange,
    screen: ScreenRect,
}

impl Transform {
    /// Create a transform, or `None` if the axis was never painted or the
    /// screen rectangle is empty.
    pub(crate) fn new(x_axis: AxisBounds, y_axis: ValueRange, screen: ScreenRect) -> Option<Self> {
        if !screen.is_valid() || !x_axis.is_set() {
            return None;
        }
        Some(Self {
            x_axis,
            y_axis: y_axis.with_min_span(MIN_VALUE_SPAN),
            screen,
        })
    }

    /// Access the screen rectangle.
    pub(crate) fn screen(&self) -> ScreenRect {
        self.screen
    }

    /// Map a data point into screen space.
    pub(crate) fn data_to_screen(&self, point: Point) -> Option<ScreenPoint> {
        if !point.y.is_finite() {
            return None;
        }
        let width = self.screen.width() as f64;
        let sx = self.x_axis.display_position(point.x, width);
        if !sx.is_finite() {
            return None;
        }
        let y_norm = (point.y - self.y_axis.min) / self.y_axis.span();
        let sx = self.screen.min.x as f64 + sx;
        let sy = self.screen.max.y as f64 - y_norm * self.screen.height() as f64;
        Some(ScreenPoint::new(sx as f32, sy as f32))
    }

    /// Map a screen point into data space.
    pub(crate) fn screen_to_data(&self, point: ScreenPoint) -> Option<Point> {
        let width = self.screen.width() as f64;
        let x = self
            .x_axis
            .value_for_display(point.x as f64 - self.screen.min.x as f64, width);
        if !x.is_finite() {
            return None;
        }
        let y_norm = (self.screen.max.y as f64 - point.y as f64) / self.screen.height() as f64;
        let y = self.y_axis.min + y_norm * self.y_axis.span();
        Some(Point::new(x, y))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::TimeRange;

    #[test]
    fn linear_roundtrip() {
        let x_axis = AxisBounds::from_range(TimeRange::new(0, 10));
        let screen = ScreenRect::from_size(100.0, 100.0);
        let transform =
            Transform::new(x_axis, ValueRange::new(0.0, 10.0), screen).expect("valid transform");
        let point = Point::new(5.0, 7.5);
        let screen_point = transform.data_to_screen(point).expect("finite point");
        let roundtrip = transform.screen_to_data(screen_point).expect("inside screen");
        assert!((roundtrip.x - point.x).abs() < 1e-6);
        assert!((roundtrip.y - point.y).abs() < 1e-6);
    }

    #[test]
    fn unset_axis_has_no_transform() {
        let screen = ScreenRect::from_size(100.0, 100.0);
        let transform = Transform::new(AxisBounds::UNSET, ValueRange::new(0.0, 1.0), screen);
        assert!(transform.is_none());
    }
}
