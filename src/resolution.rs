//! Sampling resolution from time range and pixel width.

use crate::time::TimeRange;

/// Density factor used by visible-range charts.
pub const DEFAULT_DENSITY_FACTOR: f64 = 10.0;

/// Time units per sample for `range` drawn over `pixel_width` pixels.
///
/// The result is never below 1. A non-positive or non-finite width degrades
/// to 1; callers are expected to skip the repaint instead of relying on it.
pub fn compute_resolution(range: TimeRange, pixel_width: f64, density_factor: f64) -> i64 {
    if !(pixel_width > 0.0) || !pixel_width.is_finite() {
        return 1;
    }
    let resolution = (range.duration() as f64 / pixel_width) * density_factor;
    if resolution.is_finite() {
        (resolution as i64).max(1)
    } else {
        1
    }
}

/// How a chart turns its width into a resolution.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ResolutionPolicy {
    /// One sample per pixel.
    OnePerPixel,
    /// `density` samples per pixel; the rendering surface reduces them.
    Oversampled {
        /// Samples per pixel.
        density: f64,
    },
}

impl ResolutionPolicy {
    /// Density factor applied by this policy.
    pub fn density(self) -> f64 {
        match self {
            Self::OnePerPixel => 1.0,
            Self::Oversampled { density } => density,
        }
    }

    /// Resolution for `range` at `pixel_width`, or `None` when the width is
    /// not usable (widget not laid out yet).
    pub fn resolve(self, range: TimeRange, pixel_width: f64) -> Option<i64> {
        if !(pixel_width > 0.0) || !pixel_width.is_finite() {
            return None;
        }
        Some(compute_resolution(range, pixel_width, self.density()))
    }
}

impl Default for ResolutionPolicy {
    fn default() -> Self {
        Self::Oversampled {
            density: DEFAULT_DENSITY_FACTOR,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_range_is_one_sample_per_pixel() {
        let range = TimeRange::new(0, 1_000_000_000);
        assert_eq!(
            ResolutionPolicy::OnePerPixel.resolve(range, 500.0),
            Some(2_000_000)
        );
    }

    #[test]
    fn oversampled_small_range_clamps_to_one() {
        let range = TimeRange::new(100, 200);
        assert_eq!(compute_resolution(range, 1000.0, DEFAULT_DENSITY_FACTOR), 1);
    }

    #[test]
    fn oversampled_multiplies_density() {
        let range = TimeRange::new(0, 1_000_000);
        assert_eq!(compute_resolution(range, 1000.0, 10.0), 10_000);
    }

    #[test]
    fn resolution_is_at_least_one() {
        let widths = [0.5, 1.0, 3.0, 999.0, 1e9];
        let ranges = [
            TimeRange::new(0, 0),
            TimeRange::new(0, 1),
            TimeRange::new(5, 17),
            TimeRange::new(0, i64::MAX / 2),
        ];
        for range in ranges {
            for width in widths {
                for density in [1.0, 10.0] {
                    assert!(compute_resolution(range, width, density) >= 1);
                }
            }
        }
    }

    #[test]
    fn invalid_width_is_rejected() {
        let range = TimeRange::new(0, 100);
        assert_eq!(ResolutionPolicy::OnePerPixel.resolve(range, 0.0), None);
        assert_eq!(ResolutionPolicy::default().resolve(range, -4.0), None);
        assert_eq!(ResolutionPolicy::default().resolve(range, f64::NAN), None);
        assert_eq!(compute_resolution(range, 0.0, 10.0), 1);
    }
}
