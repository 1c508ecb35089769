//! Interface to the trace-analysis engine producing series renders.

use std::collections::BTreeSet;
use std::sync::Arc;

use crate::context::ContextSnapshot;
use crate::series::{SeriesDescriptor, SeriesRender};
use crate::time::TimeRange;

/// Extra constraints a provider may apply while aggregating.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct RenderFilter {
    event_types: BTreeSet<String>,
}

impl RenderFilter {
    /// Filter keeping only the given event types.
    pub fn with_event_types<I, S>(event_types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            event_types: event_types.into_iter().map(Into::into).collect(),
        }
    }

    /// Event types kept by the filter. Empty means everything.
    pub fn event_types(&self) -> &BTreeSet<String> {
        &self.event_types
    }

    /// Check whether an event type passes the filter.
    pub fn allows(&self, event_type: &str) -> bool {
        self.event_types.is_empty() || self.event_types.contains(event_type)
    }
}

/// Produces aggregated series data for a time range and resolution.
///
/// Implementations must accept any range, wider or narrower than whatever
/// they have cached, and return [`SeriesRender::EMPTY`] rather than failing
/// when no data exists yet. Calls may come from a worker thread.
pub trait RenderProvider: Send + Sync {
    /// Name shown in chart headers.
    fn provider_name(&self) -> &str;

    /// Series this provider renders.
    fn series(&self) -> Vec<SeriesDescriptor>;

    /// Render one series.
    fn generate_render(
        &self,
        series: &SeriesDescriptor,
        range: TimeRange,
        resolution: i64,
        filter: Option<&RenderFilter>,
    ) -> SeriesRender;

    /// Render every series.
    fn generate_series_renders(
        &self,
        range: TimeRange,
        resolution: i64,
        filter: Option<&RenderFilter>,
    ) -> Vec<SeriesRender> {
        self.series()
            .iter()
            .map(|series| self.generate_render(series, range, resolution, filter))
            .collect()
    }

    /// Filter capability, for providers whose requests can be narrowed.
    ///
    /// Queried once when a visible-range chart is built.
    fn filter_support(&self) -> Option<Arc<dyn FilterSupport>> {
        None
    }
}

/// Capability of providers that accept a [`RenderFilter`].
pub trait FilterSupport: Send + Sync {
    /// Filter to apply to the next request, given the current view state.
    fn current_filter(&self, context: &ContextSnapshot) -> Option<RenderFilter>;
}
