//! Trace time model.
//!
//! Timestamps are nanoseconds since the epoch. A [`TimeRange`] is an
//! immutable, inclusive interval compared by value.

use std::fmt;

use crate::error::TimeRangeError;

/// Nanosecond timestamp.
pub type Timestamp = i64;

/// Inclusive time interval, `start <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TimeRange {
    start: Timestamp,
    end: Timestamp,
}

impl TimeRange {
    /// Marker for "no range observed yet".
    ///
    /// Constructors never produce negative bounds, so this value can never be
    /// equal to a real range.
    pub const UNINITIALIZED: Self = Self { start: -1, end: -1 };

    /// Create a range, swapping reversed bounds and clamping negative ones to
    /// zero.
    pub fn new(start: Timestamp, end: Timestamp) -> Self {
        let (start, end) = if start > end { (end, start) } else { (start, end) };
        Self {
            start: start.max(0),
            end: end.max(0),
        }
    }

    /// Create a range, rejecting reversed or negative bounds.
    pub fn try_new(start: Timestamp, end: Timestamp) -> Result<Self, TimeRangeError> {
        if start > end {
            return Err(TimeRangeError::Reversed { start, end });
        }
        if start < 0 || end < 0 {
            return Err(TimeRangeError::Negative { start, end });
        }
        Ok(Self { start, end })
    }

    /// Start of the range.
    pub fn start(&self) -> Timestamp {
        self.start
    }

    /// End of the range.
    pub fn end(&self) -> Timestamp {
        self.end
    }

    /// Length of the range. Zero for [`TimeRange::UNINITIALIZED`].
    pub fn duration(&self) -> i64 {
        self.end - self.start
    }

    /// Check whether this is the uninitialized marker.
    pub fn is_uninitialized(&self) -> bool {
        *self == Self::UNINITIALIZED
    }

    /// Check whether the timestamp lies inside the range.
    pub fn contains(&self, ts: Timestamp) -> bool {
        ts >= self.start && ts <= self.end
    }

    /// Clamp a timestamp into the range.
    pub fn clamp(&self, ts: Timestamp) -> Timestamp {
        ts.clamp(self.start, self.end)
    }

    /// Smallest range covering both inputs.
    pub fn union(a: Self, b: Self) -> Self {
        Self {
            start: a.start.min(b.start),
            end: a.end.max(b.end),
        }
    }

    /// Move the range by `delta`, keeping it inside `bounds` and preserving
    /// its duration when possible.
    pub fn shifted_within(&self, delta: i64, bounds: TimeRange) -> Self {
        let duration = self.duration().min(bounds.duration());
        let start = self
            .start
            .saturating_add(delta)
            .clamp(bounds.start, bounds.end - duration);
        Self {
            start,
            end: start + duration,
        }
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_uninitialized() {
            write!(f, "[uninitialized]")
        } else {
            write!(f, "[{}, {}]", self.start, self.end)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_swaps_and_clamps() {
        let range = TimeRange::new(20, 10);
        assert_eq!((range.start(), range.end()), (10, 20));
        let range = TimeRange::new(-5, -1);
        assert_eq!((range.start(), range.end()), (0, 0));
    }

    #[test]
    fn uninitialized_never_equals_constructed_range() {
        assert_ne!(TimeRange::new(-1, -1), TimeRange::UNINITIALIZED);
        assert!(TimeRange::try_new(-1, -1).is_err());
        assert_eq!(TimeRange::UNINITIALIZED.duration(), 0);
    }

    #[test]
    fn try_new_rejects_reversed_bounds() {
        assert_eq!(
            TimeRange::try_new(5, 1),
            Err(TimeRangeError::Reversed { start: 5, end: 1 })
        );
        assert_eq!(TimeRange::try_new(1, 5), Ok(TimeRange::new(1, 5)));
    }

    #[test]
    fn union_covers_both_ranges() {
        let union = TimeRange::union(TimeRange::new(10, 20), TimeRange::new(5, 15));
        assert_eq!(union, TimeRange::new(5, 20));
    }

    #[test]
    fn shifted_within_stays_inside_bounds() {
        let bounds = TimeRange::new(0, 100);
        let range = TimeRange::new(10, 30);
        assert_eq!(range.shifted_within(50, bounds), TimeRange::new(60, 80));
        assert_eq!(range.shifted_within(500, bounds), TimeRange::new(80, 100));
        assert_eq!(range.shifted_within(-500, bounds), TimeRange::new(0, 20));
    }
}
