//! Render requests and their post-processing.

use crate::provider::{RenderFilter, RenderProvider};
use crate::series::SeriesRender;
use crate::time::TimeRange;

/// Non-empty renders returned for one request.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderBatch {
    renders: Vec<SeriesRender>,
    display_range: TimeRange,
}

impl RenderBatch {
    /// Build a batch, or `None` if `renders` has no real render left once
    /// [`SeriesRender::EMPTY`] entries are removed.
    pub fn from_renders(renders: Vec<SeriesRender>) -> Option<Self> {
        let renders: Vec<SeriesRender> = renders
            .into_iter()
            .filter(|render| !render.is_empty_render())
            .collect();
        let display_range = renders
            .iter()
            .map(|render| render.range)
            .reduce(TimeRange::union)?;
        Some(Self {
            renders,
            display_range,
        })
    }

    /// Renders in provider order.
    pub fn renders(&self) -> &[SeriesRender] {
        &self.renders
    }

    /// Union of the ranges actually covered by the renders.
    pub fn display_range(&self) -> TimeRange {
        self.display_range
    }

    /// Take the renders out of the batch.
    pub fn into_renders(self) -> Vec<SeriesRender> {
        self.renders
    }
}

/// Result of a render request.
#[derive(Debug, Clone, PartialEq)]
pub enum DispatchOutcome {
    /// The provider produced data.
    Painted(RenderBatch),
    /// Only empty renders came back; analysis results are not ready.
    NothingToPaint,
}

impl DispatchOutcome {
    /// Check whether the outcome carries data.
    pub fn is_painted(&self) -> bool {
        matches!(self, Self::Painted(_))
    }
}

/// Ask `provider` for every series over `range` at `resolution`.
///
/// This may block for as long as the analysis takes; call it from a worker
/// thread when the provider is expensive.
pub fn request_renders(
    provider: &dyn RenderProvider,
    range: TimeRange,
    resolution: i64,
    filter: Option<&RenderFilter>,
) -> DispatchOutcome {
    let renders = provider.generate_series_renders(range, resolution, filter);
    let returned = renders.len();
    match RenderBatch::from_renders(renders) {
        Some(batch) => {
            log::trace!(
                "{}: {} of {} renders over {} at resolution {}",
                provider.provider_name(),
                batch.renders().len(),
                returned,
                range,
                resolution
            );
            DispatchOutcome::Painted(batch)
        }
        None => {
            log::debug!(
                "{}: nothing to paint over {} ({} empty renders)",
                provider.provider_name(),
                range,
                returned
            );
            DispatchOutcome::NothingToPaint
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::Point;
    use crate::provider::testing::StubProvider;
    use crate::series::SeriesDescriptor;

    fn render(name: &str, start: i64, end: i64) -> SeriesRender {
        SeriesRender::new(
            &SeriesDescriptor::new(name),
            TimeRange::new(start, end),
            vec![Point::new(start as f64, 1.0)],
        )
    }

    #[test]
    fn empty_renders_are_dropped_and_others_kept() {
        let renders = vec![
            SeriesRender::EMPTY,
            render("a", 10, 20),
            SeriesRender::EMPTY,
            render("b", 5, 15),
        ];
        let batch = RenderBatch::from_renders(renders).expect("two real renders");
        let names: Vec<_> = batch.renders().iter().map(|render| render.name.as_str()).collect();
        assert_eq!(names, ["a", "b"]);
        assert_eq!(batch.display_range(), TimeRange::new(5, 20));
        assert!(batch.display_range().start() <= batch.display_range().end());
    }

    #[test]
    fn only_empty_renders_is_nothing_to_paint() {
        assert!(RenderBatch::from_renders(vec![SeriesRender::EMPTY, SeriesRender::EMPTY]).is_none());
        assert!(RenderBatch::from_renders(Vec::new()).is_none());
    }

    #[test]
    fn named_render_without_data_does_not_widen_display_range() {
        let placeholder =
            SeriesRender::new(&SeriesDescriptor::new("b"), TimeRange::UNINITIALIZED, Vec::new());
        let batch =
            RenderBatch::from_renders(vec![render("a", 10, 20), placeholder]).expect("real render");
        assert_eq!(batch.renders().len(), 1);
        assert_eq!(batch.display_range(), TimeRange::new(10, 20));
    }

    #[test]
    fn display_range_may_be_tighter_than_request() {
        let batch = RenderBatch::from_renders(vec![render("a", 40, 60)]).expect("real render");
        assert_eq!(batch.display_range(), TimeRange::new(40, 60));
    }

    #[test]
    fn request_renders_reports_not_ready_provider() {
        let provider = StubProvider::new(&["cpu", "mem"]);
        provider.set_ready(false);
        let outcome = request_renders(&provider, TimeRange::new(0, 100), 1, None);
        assert_eq!(outcome, DispatchOutcome::NothingToPaint);

        provider.set_ready(true);
        let outcome = request_renders(&provider, TimeRange::new(0, 100), 1, None);
        assert!(outcome.is_painted());
        assert_eq!(provider.calls(), 2);
    }
}
