//! Time axis bounds and their pixel mapping.

use crate::time::TimeRange;

/// Smallest span used when mapping, so a zero-length range still maps.
const MIN_SPAN: f64 = 1.0;

/// Bounds of the time axis of a chart.
///
/// Until the first paint the bounds are NaN and every mapping returns NaN,
/// which callers treat as "skip this draw".
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisBounds {
    /// Timestamp at the left edge of the plot area.
    pub lower_bound: f64,
    /// Timestamp at the right edge of the plot area.
    pub upper_bound: f64,
    /// Distance between major ticks; the whole displayed range.
    pub tick_unit: f64,
}

impl AxisBounds {
    /// Bounds of an axis that has never been painted.
    pub const UNSET: Self = Self {
        lower_bound: f64::NAN,
        upper_bound: f64::NAN,
        tick_unit: f64::NAN,
    };

    /// Axis spanning the given range, with a single tick unit.
    pub fn from_range(range: TimeRange) -> Self {
        Self {
            lower_bound: range.start() as f64,
            upper_bound: range.end() as f64,
            tick_unit: range.duration() as f64,
        }
    }

    /// Check whether the bounds come from a paint.
    pub fn is_set(&self) -> bool {
        self.lower_bound.is_finite()
            && self.upper_bound.is_finite()
            && self.upper_bound >= self.lower_bound
    }

    fn span(&self) -> f64 {
        (self.upper_bound - self.lower_bound).max(MIN_SPAN)
    }

    /// Pixel position of `value` on an axis `length` pixels long.
    pub fn display_position(&self, value: f64, length: f64) -> f64 {
        if !self.is_set() || !value.is_finite() || !(length > 0.0) {
            return f64::NAN;
        }
        (value - self.lower_bound) / self.span() * length
    }

    /// Axis value at pixel `position` on an axis `length` pixels long.
    pub fn value_for_display(&self, position: f64, length: f64) -> f64 {
        if !self.is_set() || !position.is_finite() || !(length > 0.0) {
            return f64::NAN;
        }
        self.lower_bound + position / length * self.span()
    }
}

impl Default for AxisBounds {
    fn default() -> Self {
        Self::UNSET
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_axis_maps_to_nan() {
        let axis = AxisBounds::UNSET;
        assert!(!axis.is_set());
        assert!(axis.display_position(10.0, 100.0).is_nan());
        assert!(axis.value_for_display(10.0, 100.0).is_nan());
    }

    #[test]
    fn display_position_roundtrip() {
        let axis = AxisBounds::from_range(TimeRange::new(1_000, 2_000));
        assert_eq!(axis.tick_unit, 1_000.0);
        let x = axis.display_position(1_250.0, 400.0);
        assert!((x - 100.0).abs() < 1e-9);
        let value = axis.value_for_display(x, 400.0);
        assert!((value - 1_250.0).abs() < 1e-9);
    }

    #[test]
    fn zero_width_axis_maps_to_nan() {
        let axis = AxisBounds::from_range(TimeRange::new(0, 10));
        assert!(axis.display_position(5.0, 0.0).is_nan());
    }
}
