//! Series renders produced by providers, and series as displayed by charts.

use crate::geom::{Point, ValueRange};
use crate::render::{Color, LineStyle, MarkerStyle};
use crate::time::TimeRange;

/// Description of one series a provider can render.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SeriesDescriptor {
    /// Display name.
    pub name: String,
    /// Preferred line color, if the provider has one.
    pub color: Option<[u8; 3]>,
}

impl SeriesDescriptor {
    /// Create a descriptor without a preferred color.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            color: None,
        }
    }

    /// Set the preferred color.
    pub fn with_color(mut self, rgb: [u8; 3]) -> Self {
        self.color = Some(rgb);
        self
    }
}

/// Resolution-bounded samples of one series over a time range.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesRender {
    /// Series this render belongs to.
    pub name: String,
    /// Range actually covered, possibly tighter than the request.
    pub range: TimeRange,
    /// Samples, ordered by timestamp.
    pub points: Vec<Point>,
    /// Preferred color, forwarded from the series descriptor.
    pub color: Option<[u8; 3]>,
}

impl SeriesRender {
    /// Marker for "no data for this request".
    pub const EMPTY: Self = Self {
        name: String::new(),
        range: TimeRange::UNINITIALIZED,
        points: Vec::new(),
        color: None,
    };

    /// Create a render for a series.
    pub fn new(series: &SeriesDescriptor, range: TimeRange, points: Vec<Point>) -> Self {
        Self {
            name: series.name.clone(),
            range,
            points,
            color: series.color,
        }
    }

    /// Check whether this render carries no data: the [`SeriesRender::EMPTY`]
    /// marker, or any render with no points over an uninitialized range.
    pub fn is_empty_render(&self) -> bool {
        *self == Self::EMPTY || (self.range.is_uninitialized() && self.points.is_empty())
    }
}

/// How a displayed series is drawn.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SeriesKind {
    /// Polyline with visible sample markers.
    LineWithMarkers(LineStyle, MarkerStyle),
    /// Polyline over a translucent area, markers hidden.
    Area(LineStyle),
}

impl SeriesKind {
    /// Line styling of the series.
    pub fn line(&self) -> LineStyle {
        match self {
            Self::LineWithMarkers(line, _) | Self::Area(line) => *line,
        }
    }
}

/// A series held by a chart's display state.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayedSeries {
    name: String,
    kind: SeriesKind,
    points: Vec<Point>,
}

impl DisplayedSeries {
    /// Build a displayed series from a render.
    pub(crate) fn from_render(render: SeriesRender, kind: SeriesKind) -> Self {
        let kind = match render.color {
            Some(rgb) => recolor(kind, Color::from_rgb8(rgb)),
            None => kind,
        };
        Self {
            name: render.name,
            kind,
            points: render.points,
        }
    }

    /// Series name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Drawing style.
    pub fn kind(&self) -> &SeriesKind {
        &self.kind
    }

    /// Displayed samples.
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Range of the sample values.
    pub fn value_range(&self) -> Option<ValueRange> {
        ValueRange::of_values(self.points.iter().map(|point| point.y))
    }
}

fn recolor(kind: SeriesKind, color: Color) -> SeriesKind {
    match kind {
        SeriesKind::LineWithMarkers(line, marker) => SeriesKind::LineWithMarkers(
            LineStyle { color, ..line },
            MarkerStyle { color, ..marker },
        ),
        SeriesKind::Area(line) => SeriesKind::Area(LineStyle { color, ..line }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_marker_is_detected_by_value() {
        assert!(SeriesRender::EMPTY.is_empty_render());
        assert!(SeriesRender::EMPTY.clone().is_empty_render());

        let series = SeriesDescriptor::new("cpu");
        let render = SeriesRender::new(&series, TimeRange::new(0, 10), Vec::new());
        assert!(!render.is_empty_render());
    }

    #[test]
    fn provider_color_overrides_style() {
        let series = SeriesDescriptor::new("cpu").with_color([255, 0, 0]);
        let render = SeriesRender::new(&series, TimeRange::new(0, 10), vec![Point::new(0.0, 1.0)]);
        let displayed = DisplayedSeries::from_render(render, SeriesKind::Area(LineStyle::default()));
        assert_eq!(displayed.kind().line().color, Color::new(1.0, 0.0, 0.0, 1.0));
        assert_eq!(displayed.value_range(), Some(ValueRange::new(1.0, 1.0)));
    }
}
